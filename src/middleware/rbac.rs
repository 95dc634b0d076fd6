// src/middleware/rbac.rs

use axum::{extract::FromRequestParts, http::request::Parts};
use std::marker::PhantomData;

use crate::{
    common::error::AppError,
    middleware::auth::AuthenticatedUser,
    models::auth::{Role, UserProfile},
};

/// 1. O Trait que define quem pode passar
pub trait RoleDef: Send + Sync + 'static {
    fn allows(role: Role) -> bool;
}

/// 2. O Extractor (Guardião). Depende do `auth_guard` ter rodado antes.
pub struct RequireRole<T>(pub UserProfile, PhantomData<T>);

impl<T> RequireRole<T> {
    pub fn profile(&self) -> &UserProfile {
        &self.0
    }
}

impl<T, S> FromRequestParts<S> for RequireRole<T>
where
    T: RoleDef,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<AuthenticatedUser>()
            .ok_or(AppError::InvalidToken)?;

        let profile = user.profile();
        if !T::allows(profile.role) {
            tracing::warn!("Acesso negado a {} ({:?})", profile.id, profile.role);
            return Err(AppError::AdminRequired);
        }

        Ok(RequireRole(profile.clone(), PhantomData))
    }
}

// ---
// DEFINIÇÃO DOS PAPÉIS
// ---

pub struct Admin;
impl RoleDef for Admin {
    fn allows(role: Role) -> bool {
        role == Role::Admin
    }
}

pub type AdminOnly = RequireRole<Admin>;
