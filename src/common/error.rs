use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::common::i18n::I18nStore;
use crate::db::StoreError;
use crate::middleware::i18n::Locale;

// Erros de domínio e infraestrutura. A conversão para HTTP fica em `to_api_error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Usuário não encontrado")]
    UserNotFound,

    #[error("Ação restrita a administradores")]
    AdminRequired,

    #[error("Torneio não encontrado: {0}")]
    TournamentNotFound(String),

    #[error("Inscrição não encontrada: {0}")]
    TeamNotFound(String),

    #[error("Torneio lotado")]
    TournamentFull,

    #[error("Torneio não está aberto para inscrições")]
    TournamentNotOpen,

    #[error("Capitão já inscrito neste torneio")]
    AlreadyRegistered,

    #[error("Apenas o capitão pode cancelar a inscrição")]
    NotTeamCaptain,

    #[error("Line-up obrigatória para este modo de jogo")]
    LineupRequired,

    #[error("Login federado desabilitado")]
    FederationDisabled,

    #[error("Asserção federada inválida")]
    InvalidFederatedAssertion,

    #[error("Erro do document store: {0}")]
    StoreError(#[from] StoreError),

    // Variante genérica para qualquer outro erro inesperado
    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

impl AppError {
    /// Status HTTP e chave da mensagem no catálogo de traduções.
    fn status_and_key(&self) -> (StatusCode, &'static str) {
        match self {
            AppError::ValidationError(_) => (StatusCode::BAD_REQUEST, "validation_failed"),
            AppError::LineupRequired => (StatusCode::BAD_REQUEST, "lineup_required"),
            AppError::EmailAlreadyExists => (StatusCode::CONFLICT, "email_already_exists"),
            AppError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "invalid_credentials"),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "invalid_token"),
            AppError::InvalidFederatedAssertion => {
                (StatusCode::UNAUTHORIZED, "invalid_federated_assertion")
            }
            AppError::UserNotFound => (StatusCode::NOT_FOUND, "user_not_found"),
            AppError::AdminRequired => (StatusCode::FORBIDDEN, "admin_required"),
            AppError::NotTeamCaptain => (StatusCode::FORBIDDEN, "not_team_captain"),
            AppError::TournamentNotFound(_) => (StatusCode::NOT_FOUND, "tournament_not_found"),
            AppError::TeamNotFound(_) => (StatusCode::NOT_FOUND, "team_not_found"),
            AppError::TournamentFull => (StatusCode::CONFLICT, "tournament_full"),
            AppError::TournamentNotOpen => (StatusCode::CONFLICT, "tournament_not_open"),
            AppError::AlreadyRegistered => (StatusCode::CONFLICT, "already_registered"),
            AppError::FederationDisabled => (StatusCode::NOT_IMPLEMENTED, "federation_disabled"),
            AppError::StoreError(StoreError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, "document_not_found")
            }
            AppError::StoreError(StoreError::Unavailable(_))
            | AppError::StoreError(StoreError::Database(_)) => {
                (StatusCode::SERVICE_UNAVAILABLE, "store_unavailable")
            }
            _ => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error"),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status_and_key().0
    }

    /// Converte o erro na resposta HTTP, com a mensagem no idioma do cliente.
    pub fn to_api_error(&self, locale: &Locale, i18n: &I18nStore) -> ApiError {
        let (status, key) = self.status_and_key();

        if status.is_server_error() {
            // Falhas transitórias ou inesperadas: logamos o detalhe, o cliente recebe só o alerta.
            tracing::error!("Erro Interno do Servidor: {}", self);
        }

        let details = match self {
            AppError::ValidationError(errors) => {
                let mut details = serde_json::Map::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<Value> = field_errors
                        .iter()
                        .map(|e| {
                            Value::String(
                                e.message
                                    .as_ref()
                                    .map(|m| m.to_string())
                                    .unwrap_or_else(|| e.code.to_string()),
                            )
                        })
                        .collect();
                    details.insert(field.to_string(), Value::Array(messages));
                }
                Some(Value::Object(details))
            }
            _ => None,
        };

        ApiError {
            status,
            error: i18n.translate(&locale.0, key),
            details,
        }
    }
}

// O formato de erro que sai na API
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

// Usado por extratores, que não têm acesso ao idioma negociado.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let i18n = I18nStore::global();
        self.to_api_error(&Locale(i18n.default_locale().to_string()), i18n)
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::Validate;

    #[derive(Validate)]
    struct Form {
        #[validate(length(min = 1, message = "obrigatório"))]
        name: String,
    }

    fn pt() -> Locale {
        Locale("pt".into())
    }

    #[test]
    fn domain_errors_map_to_expected_status() {
        assert_eq!(AppError::TournamentFull.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::AlreadyRegistered.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotTeamCaptain.status(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::AdminRequired.status(), StatusCode::FORBIDDEN);
        assert_eq!(
            AppError::TournamentNotFound("x".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::StoreError(StoreError::Unavailable("quota".into())).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn validation_errors_carry_field_details() {
        let errors = Form { name: String::new() }.validate().unwrap_err();
        let api = AppError::ValidationError(errors).to_api_error(&pt(), I18nStore::global());

        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        let details = api.details.unwrap();
        assert_eq!(details["name"][0], "obrigatório");
    }

    #[test]
    fn messages_follow_the_locale() {
        let i18n = I18nStore::global();
        let pt = AppError::TournamentFull.to_api_error(&pt(), i18n);
        let en = AppError::TournamentFull.to_api_error(&Locale("en".into()), i18n);
        assert_ne!(pt.error, en.error);
        assert_eq!(en.error, "This tournament has no seats left.");
    }
}
