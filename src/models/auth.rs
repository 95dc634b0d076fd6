// src/models/auth.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

// Perfil público do usuário (coleção `users`, chave = id do principal)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: Uuid,

    #[schema(example = "ProPlayer")]
    pub nickname: String,

    #[schema(example = "jogador@email.com")]
    pub email: String,

    pub role: Role,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub created_at: DateTime<Utc>,
}

impl UserProfile {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

// Corpo do documento de perfil (sem o id, que é a chave)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewUserProfile<'a> {
    pub nickname: &'a str,
    pub email: &'a str,
    pub role: Role,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

// Credenciais (coleção `credentials`, chave = id do principal). Nunca sai pela API.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credentials {
    #[serde(skip_serializing)]
    pub id: Uuid,
    pub email: String,
    pub password_hash: String,
}

// Dados para criação de conta
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct RegisterUserPayload {
    #[validate(length(min = 3, max = 32, message = "O nickname deve ter entre 3 e 32 caracteres."))]
    #[schema(example = "ProPlayer")]
    pub nickname: String,
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    #[schema(example = "jogador@email.com")]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Dados para login
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct LoginUserPayload {
    #[validate(email(message = "O e-mail fornecido é inválido."))]
    pub email: String,
    #[validate(length(min = 6, message = "A senha deve ter no mínimo 6 caracteres."))]
    pub password: String,
}

// Login federado: a asserção assinada pelo provedor de identidade
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct FederatedLoginPayload {
    #[validate(length(min = 1, message = "A asserção de identidade é obrigatória."))]
    pub assertion: String,
}

// Resposta de autenticação com o token
#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

// Estrutura de dados ("claims") dentro do JWT
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,  // Subject (ID do usuário)
    pub exp: usize, // Expiration time
    pub iat: usize, // Issued At
    pub jti: Uuid,  // ID da sessão, usado no logout
}

// Claims da asserção emitida pelo provedor federado
#[derive(Debug, Serialize, Deserialize)]
pub struct FederatedClaims {
    pub iss: String,
    pub sub: String,
    pub email: String,
    #[serde(default)]
    pub name: Option<String>,
    pub exp: usize,
}

/// Sessão validada a partir do bearer token.
#[derive(Debug, Clone)]
pub struct Session {
    pub user: UserProfile,
    pub token_id: Uuid,
    pub expires_at: DateTime<Utc>,
}
