use std::sync::Arc;

use chrono::{DateTime, SubsecRound, Utc};
use serde_json::json;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::store::{to_fields, DocumentStore, Query},
    models::auth::{Credentials, NewUserProfile, Role, UserProfile},
};

const USERS: &str = "users";
const CREDENTIALS: &str = "credentials";
const FEDERATED_IDENTITIES: &str = "federated_identities";
const REVOKED_SESSIONS: &str = "revoked_sessions";

// O repositório de usuários: perfis, credenciais, identidades federadas e sessões revogadas
#[derive(Clone)]
pub struct UserRepository {
    store: Arc<dyn DocumentStore>,
}

impl UserRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // Busca um perfil pelo id do principal
    pub async fn find_by_id(&self, id: Uuid) -> Result<Option<UserProfile>, AppError> {
        match self.store.get(USERS, &id.to_string()).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    // Busca um perfil pelo e-mail (já normalizado)
    pub async fn find_by_email(&self, email: &str) -> Result<Option<UserProfile>, AppError> {
        let docs = self
            .store
            .query(USERS, &Query::new().where_eq("email", email))
            .await?;
        match docs.into_iter().next() {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    pub async fn find_credentials_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Credentials>, AppError> {
        let docs = self
            .store
            .query(CREDENTIALS, &Query::new().where_eq("email", email))
            .await?;
        match docs.into_iter().next() {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    /// Grava o perfil na chave do principal. Criado uma única vez.
    pub async fn create_profile(
        &self,
        id: Uuid,
        nickname: &str,
        email: &str,
        role: Role,
    ) -> Result<UserProfile, AppError> {
        // O documento guarda milissegundos; o perfil devolvido precisa bater com ele
        let created_at = Utc::now().trunc_subsecs(3);
        let profile = NewUserProfile {
            nickname,
            email,
            role,
            created_at,
        };
        self.store
            .set(USERS, &id.to_string(), to_fields(&profile)?)
            .await?;

        Ok(UserProfile {
            id,
            nickname: nickname.to_string(),
            email: email.to_string(),
            role,
            created_at,
        })
    }

    pub async fn create_credentials(
        &self,
        id: Uuid,
        email: &str,
        password_hash: &str,
    ) -> Result<(), AppError> {
        let credentials = Credentials {
            id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
        };
        self.store
            .set(CREDENTIALS, &id.to_string(), to_fields(&credentials)?)
            .await?;
        Ok(())
    }

    // --- Identidades federadas ---

    fn federated_key(provider: &str, subject: &str) -> String {
        format!("{}:{}", provider, subject)
    }

    pub async fn find_federated_user(
        &self,
        provider: &str,
        subject: &str,
    ) -> Result<Option<Uuid>, AppError> {
        let doc = self
            .store
            .get(FEDERATED_IDENTITIES, &Self::federated_key(provider, subject))
            .await?;

        let user_id = doc
            .and_then(|doc| doc.data.get("userId").cloned())
            .and_then(|value| serde_json::from_value::<Uuid>(value).ok());
        Ok(user_id)
    }

    pub async fn link_federated_user(
        &self,
        provider: &str,
        subject: &str,
        user_id: Uuid,
    ) -> Result<(), AppError> {
        let fields = to_fields(&json!({
            "provider": provider,
            "subject": subject,
            "userId": user_id,
            "linkedAt": Utc::now().timestamp_millis(),
        }))?;
        self.store
            .set(
                FEDERATED_IDENTITIES,
                &Self::federated_key(provider, subject),
                fields,
            )
            .await?;
        Ok(())
    }

    // --- Sessões ---

    pub async fn revoke_session(
        &self,
        token_id: Uuid,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        let fields = to_fields(&json!({
            "userId": user_id,
            "revokedAt": Utc::now().timestamp_millis(),
            "expiresAt": expires_at.timestamp_millis(),
        }))?;
        self.store
            .set(REVOKED_SESSIONS, &token_id.to_string(), fields)
            .await?;
        Ok(())
    }

    pub async fn is_session_revoked(&self, token_id: Uuid) -> Result<bool, AppError> {
        Ok(self
            .store
            .get(REVOKED_SESSIONS, &token_id.to_string())
            .await?
            .is_some())
    }
}
