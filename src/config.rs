// src/config.rs

use std::{env, sync::Arc};

use anyhow::Context;

use crate::{
    common::i18n::{I18nStore, DEFAULT_LOCALE},
    db::{DocumentStore, MemoryDocumentStore, PgDocumentStore, TournamentRepository, UserRepository},
    services::{
        auth::{AuthService, AuthSettings},
        registration::RegistrationService,
        tournament_service::TournamentService,
    },
};

// Configuração lida do ambiente (.env)
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    /// Sem URL o servidor roda com o armazenamento em memória.
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub bcrypt_cost: u32,
    pub admin_emails: Vec<String>,
    pub federation_secret: Option<String>,
    pub default_locale: String,
}

fn optional_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

fn parsed_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_var(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{key} inválido: '{raw}'")),
        None => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let jwt_secret = optional_var("JWT_SECRET").context("JWT_SECRET deve ser definido")?;

        let admin_emails = optional_var("ADMIN_EMAILS")
            .map(|raw| {
                raw.split(',')
                    .map(|email| email.trim().to_lowercase())
                    .filter(|email| !email.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            bind_addr: optional_var("BIND_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string()),
            database_url: optional_var("DATABASE_URL"),
            db_max_connections: parsed_var("DB_MAX_CONNECTIONS", 5)?,
            jwt_secret,
            token_ttl_days: parsed_var("TOKEN_TTL_DAYS", 7)?,
            bcrypt_cost: parsed_var("BCRYPT_COST", bcrypt::DEFAULT_COST)?,
            admin_emails,
            federation_secret: optional_var("FEDERATION_SECRET"),
            default_locale: optional_var("DEFAULT_LOCALE")
                .unwrap_or_else(|| DEFAULT_LOCALE.to_string()),
        })
    }

    /// Configuração mínima, sem banco, para testes e desenvolvimento.
    pub fn in_memory(jwt_secret: &str) -> Self {
        Self {
            bind_addr: "127.0.0.1:0".to_string(),
            database_url: None,
            db_max_connections: 5,
            jwt_secret: jwt_secret.to_string(),
            token_ttl_days: 7,
            bcrypt_cost: bcrypt::DEFAULT_COST,
            admin_emails: Vec::new(),
            federation_secret: None,
            default_locale: DEFAULT_LOCALE.to_string(),
        }
    }

    fn auth_settings(&self) -> AuthSettings {
        AuthSettings {
            jwt_secret: self.jwt_secret.clone(),
            token_ttl: chrono::Duration::days(self.token_ttl_days),
            bcrypt_cost: self.bcrypt_cost,
            admin_emails: self.admin_emails.clone(),
            federation_secret: self.federation_secret.clone(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub i18n_store: Arc<I18nStore>,
    pub auth_service: AuthService,
    pub tournament_service: TournamentService,
    pub registration_service: RegistrationService,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        let store: Arc<dyn DocumentStore> = match &config.database_url {
            Some(url) => Arc::new(
                PgDocumentStore::connect(url, config.db_max_connections)
                    .await
                    .context("Falha ao conectar ao banco de dados")?,
            ),
            None => {
                tracing::warn!("⚠️ DATABASE_URL ausente: usando armazenamento em memória (dados não persistem)");
                Arc::new(MemoryDocumentStore::new())
            }
        };

        Ok(Self::with_store(config, store))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_store(config: Config, store: Arc<dyn DocumentStore>) -> Self {
        let user_repo = UserRepository::new(store.clone());
        let tournament_repo = TournamentRepository::new(store);

        let auth_service = AuthService::new(user_repo, config.auth_settings());
        let registration_service = RegistrationService::new(tournament_repo.clone());
        let tournament_service =
            TournamentService::new(tournament_repo, registration_service.clone());
        let i18n_store = Arc::new(I18nStore::new(&config.default_locale));

        Self {
            i18n_store,
            auth_service,
            tournament_service,
            registration_service,
        }
    }
}
