// src/services/auth.rs

use std::sync::Arc;

use bcrypt::{hash, verify};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    models::auth::{Claims, FederatedClaims, Role, Session, UserProfile},
};

#[derive(Debug, Clone)]
pub struct AuthSettings {
    pub jwt_secret: String,
    pub token_ttl: Duration,
    pub bcrypt_cost: u32,
    /// E-mails que já nascem com papel de administrador.
    pub admin_emails: Vec<String>,
    /// Segredo compartilhado com o provedor federado. `None` desabilita o login federado.
    pub federation_secret: Option<String>,
}

// O provedor de sessão: contas, tokens e o principal atual.
#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    settings: Arc<AuthSettings>,
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

impl AuthService {
    pub fn new(user_repo: UserRepository, settings: AuthSettings) -> Self {
        Self {
            user_repo,
            settings: Arc::new(settings),
        }
    }

    fn role_for(&self, email: &str) -> Role {
        if self
            .settings
            .admin_emails
            .iter()
            .any(|admin| normalize_email(admin) == email)
        {
            Role::Admin
        } else {
            Role::User
        }
    }

    /// Cria a conta e o perfil. Não abre sessão: o usuário faz login em seguida.
    pub async fn register_user(
        &self,
        nickname: &str,
        email: &str,
        password: &str,
    ) -> Result<UserProfile, AppError> {
        let email = normalize_email(email);

        if self.user_repo.find_by_email(&email).await?.is_some() {
            return Err(AppError::EmailAlreadyExists);
        }

        // 1. Hashing fora do runtime assíncrono
        let password_clone = password.to_owned();
        let cost = self.settings.bcrypt_cost;
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password_clone, cost))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        // 2. Credenciais e perfil
        let user_id = Uuid::new_v4();
        self.user_repo
            .create_credentials(user_id, &email, &hashed_password)
            .await?;
        let profile = self
            .user_repo
            .create_profile(user_id, nickname.trim(), &email, self.role_for(&email))
            .await?;

        tracing::info!("👤 Conta criada: {} ({:?})", profile.id, profile.role);
        Ok(profile)
    }

    pub async fn login_user(
        &self,
        email: &str,
        password: &str,
    ) -> Result<(String, UserProfile), AppError> {
        let email = normalize_email(email);
        let credentials = self
            .user_repo
            .find_credentials_by_email(&email)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = credentials.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid =
            tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
                .await
                .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        let user = self
            .user_repo
            .find_by_id(credentials.id)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let token = self.create_token(user.id)?;
        Ok((token, user))
    }

    /// Login com uma asserção assinada (HS256) pelo provedor de identidade.
    /// Primeiro acesso cria o perfil e vincula a identidade externa.
    pub async fn federated_sign_in(
        &self,
        assertion: &str,
    ) -> Result<(String, UserProfile), AppError> {
        let secret = self
            .settings
            .federation_secret
            .as_deref()
            .ok_or(AppError::FederationDisabled)?;

        let mut validation = Validation::default();
        validation.set_required_spec_claims(&["exp", "iss", "sub"]);
        let claims = decode::<FederatedClaims>(
            assertion,
            &DecodingKey::from_secret(secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidFederatedAssertion)?
        .claims;

        let user = match self
            .user_repo
            .find_federated_user(&claims.iss, &claims.sub)
            .await?
        {
            Some(user_id) => self
                .user_repo
                .find_by_id(user_id)
                .await?
                .ok_or(AppError::UserNotFound)?,
            None => {
                let email = normalize_email(&claims.email);
                let user = match self.user_repo.find_by_email(&email).await? {
                    Some(existing) => existing,
                    None => {
                        let nickname = claims
                            .name
                            .clone()
                            .filter(|n| !n.trim().is_empty())
                            .unwrap_or_else(|| {
                                email.split('@').next().unwrap_or("player").to_string()
                            });
                        self.user_repo
                            .create_profile(Uuid::new_v4(), &nickname, &email, self.role_for(&email))
                            .await?
                    }
                };
                self.user_repo
                    .link_federated_user(&claims.iss, &claims.sub, user.id)
                    .await?;
                tracing::info!("🔗 Identidade {} vinculada ao usuário {}", claims.iss, user.id);
                user
            }
        };

        let token = self.create_token(user.id)?;
        Ok((token, user))
    }

    pub async fn logout(&self, session: &Session) -> Result<(), AppError> {
        self.user_repo
            .revoke_session(session.token_id, session.user.id, session.expires_at)
            .await
    }

    pub async fn validate_token(&self, token: &str) -> Result<Session, AppError> {
        let validation = Validation::default();
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.settings.jwt_secret.as_ref()),
            &validation,
        )
        .map_err(|_| AppError::InvalidToken)?;

        let claims = token_data.claims;
        if self.user_repo.is_session_revoked(claims.jti).await? {
            return Err(AppError::InvalidToken);
        }

        let user = self
            .user_repo
            .find_by_id(claims.sub)
            .await?
            .ok_or(AppError::UserNotFound)?;

        let expires_at = DateTime::<Utc>::from_timestamp(claims.exp as i64, 0)
            .ok_or(AppError::InvalidToken)?;

        Ok(Session {
            user,
            token_id: claims.jti,
            expires_at,
        })
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + self.settings.token_ttl;

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4(),
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.settings.jwt_secret.as_ref()),
        )?)
    }
}
