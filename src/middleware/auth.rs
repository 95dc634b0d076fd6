use axum::{
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};

use crate::{
    common::error::AppError,
    config::AppState,
    models::auth::{Session, UserProfile},
};

// Exige um bearer token válido e injeta a sessão nas extensions da requisição.
pub async fn auth_guard(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let TypedHeader(Authorization(bearer)) = bearer.ok_or(AppError::InvalidToken)?;

    let session = app_state.auth_service.validate_token(bearer.token()).await?;
    request.extensions_mut().insert(AuthenticatedUser(session));
    Ok(next.run(request).await)
}

// Rotas públicas que mudam de acordo com quem está vendo.
// Sem token segue anônimo; token inválido é rejeitado.
pub async fn optional_auth(
    State(app_state): State<AppState>,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(TypedHeader(Authorization(bearer))) = bearer {
        let session = app_state.auth_service.validate_token(bearer.token()).await?;
        request.extensions_mut().insert(AuthenticatedUser(session));
    }
    Ok(next.run(request).await)
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub Session);

impl AuthenticatedUser {
    pub fn profile(&self) -> &UserProfile {
        &self.0.user
    }
}

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedUser>()
            .cloned()
            .ok_or(AppError::InvalidToken)
    }
}

// O principal atual, se houver
#[derive(Debug, Clone)]
pub struct MaybeUser(pub Option<UserProfile>);

impl<S> FromRequestParts<S> for MaybeUser
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeUser(
            parts
                .extensions
                .get::<AuthenticatedUser>()
                .map(|user| user.0.user.clone()),
        ))
    }
}
