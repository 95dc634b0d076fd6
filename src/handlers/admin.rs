// src/handlers/admin.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};

use crate::{
    common::error::ApiError,
    config::AppState,
    middleware::{i18n::Locale, rbac::AdminOnly},
    models::tournament::Tournament,
};

#[utoipa::path(
    get,
    path = "/api/admin/tournaments/pending",
    tag = "Admin",
    responses(
        (status = 200, description = "Sugestões aguardando aprovação, mais recentes primeiro", body = Vec<Tournament>),
        (status = 403, description = "Apenas administradores")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_pending(
    State(app_state): State<AppState>,
    locale: Locale,
    _admin: AdminOnly,
) -> Result<Json<Vec<Tournament>>, ApiError> {
    let pending = app_state
        .tournament_service
        .list_pending_tournaments()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(pending))
}

#[utoipa::path(
    post,
    path = "/api/admin/tournaments/{id}/approve",
    tag = "Admin",
    params(
        ("id" = String, Path, description = "ID do torneio")
    ),
    responses(
        (status = 200, description = "Torneio aberto para inscrições", body = Tournament),
        (status = 403, description = "Apenas administradores"),
        (status = 404, description = "Torneio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn approve_tournament(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: AdminOnly,
    Path(id): Path<String>,
) -> Result<Json<Tournament>, ApiError> {
    let tournament = app_state
        .tournament_service
        .approve_tournament(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("Torneio {} aprovado por {}", id, admin.profile().id);
    Ok(Json(tournament))
}

// Rejeitar sugestão e excluir torneio aberto são a mesma operação
#[utoipa::path(
    delete,
    path = "/api/admin/tournaments/{id}",
    tag = "Admin",
    params(
        ("id" = String, Path, description = "ID do torneio")
    ),
    responses(
        (status = 204, description = "Torneio removido; as equipes inscritas não são apagadas"),
        (status = 403, description = "Apenas administradores"),
        (status = 404, description = "Torneio não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_tournament(
    State(app_state): State<AppState>,
    locale: Locale,
    admin: AdminOnly,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app_state
        .tournament_service
        .delete_tournament(&id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::info!("Torneio {} removido por {}", id, admin.profile().id);
    Ok(StatusCode::NO_CONTENT)
}
