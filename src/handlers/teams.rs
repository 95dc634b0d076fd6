// src/handlers/teams.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::team::{RegisterTeamPayload, Team},
};

#[utoipa::path(
    post,
    path = "/api/tournaments/{id}/teams",
    tag = "Teams",
    request_body = RegisterTeamPayload,
    params(
        ("id" = String, Path, description = "ID do torneio")
    ),
    responses(
        (status = 201, description = "Equipe inscrita; o usuário logado é o capitão", body = Team),
        (status = 400, description = "Dados inválidos ou escalação ausente"),
        (status = 404, description = "Torneio não encontrado"),
        (status = 409, description = "Torneio lotado, fechado ou capitão já inscrito")
    ),
    security(("api_jwt" = []))
)]
pub async fn register_team(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path(tournament_id): Path<String>,
    Json(payload): Json<RegisterTeamPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let team = app_state
        .registration_service
        .register_team(&tournament_id, user.profile().id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(team)))
}

#[utoipa::path(
    delete,
    path = "/api/tournaments/{id}/teams/{team_id}",
    tag = "Teams",
    params(
        ("id" = String, Path, description = "ID do torneio"),
        ("team_id" = String, Path, description = "ID da equipe")
    ),
    responses(
        (status = 204, description = "Inscrição cancelada e vaga liberada"),
        (status = 403, description = "Só o capitão pode cancelar"),
        (status = 404, description = "Equipe não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn cancel_registration(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Path((tournament_id, team_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    app_state
        .registration_service
        .cancel_registration(&tournament_id, &team_id, user.profile().id)
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(StatusCode::NO_CONTENT)
}
