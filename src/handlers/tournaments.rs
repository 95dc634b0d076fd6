// src/handlers/tournaments.rs

use std::convert::Infallible;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures_util::stream::{self, Stream};
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{
        auth::{AuthenticatedUser, MaybeUser},
        i18n::Locale,
    },
    models::{
        team::Team,
        tournament::{CreateTournamentPayload, CreatedTournament, Tournament, TournamentDetail},
    },
};

#[utoipa::path(
    get,
    path = "/api/tournaments",
    tag = "Tournaments",
    responses(
        (status = 200, description = "Torneios abertos, mais recentes primeiro", body = Vec<Tournament>)
    )
)]
pub async fn list_tournaments(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<Tournament>>, ApiError> {
    let tournaments = app_state
        .tournament_service
        .list_open_tournaments()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(tournaments))
}

/// Cada evento `tournaments` carrega a lista completa de torneios abertos.
#[utoipa::path(
    get,
    path = "/api/tournaments/live",
    tag = "Tournaments",
    responses(
        (status = 200, description = "Stream SSE com a lista de torneios abertos a cada mudança", body = String, content_type = "text/event-stream")
    )
)]
pub async fn live_tournaments(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    let feed = app_state
        .tournament_service
        .open_tournament_feed()
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    tracing::debug!("📡 Novo ouvinte da lista de torneios");

    // O feed é solto quando o cliente desconecta e o stream é descartado
    let events = stream::unfold((feed, true), |(mut feed, first)| async move {
        let snapshot = if first {
            feed.current()
        } else {
            feed.changed().await?
        };
        Some((Ok(snapshot_event(&snapshot)), (feed, false)))
    });

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}

fn snapshot_event(tournaments: &[Tournament]) -> Event {
    let visible: Vec<Tournament> = tournaments
        .iter()
        .cloned()
        .map(|t| t.for_viewer(false))
        .collect();

    match Event::default().event("tournaments").json_data(&visible) {
        Ok(event) => event,
        Err(e) => {
            tracing::error!("Falha ao serializar a lista de torneios: {}", e);
            Event::default().event("error").data("serialization_failed")
        }
    }
}

#[utoipa::path(
    post,
    path = "/api/tournaments",
    tag = "Tournaments",
    request_body = CreateTournamentPayload,
    responses(
        (status = 201, description = "Admin: torneio aberto. Usuário: sugestão pendente", body = CreatedTournament),
        (status = 400, description = "Dados inválidos"),
        (status = 401, description = "Token ausente ou inválido")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_tournament(
    State(app_state): State<AppState>,
    locale: Locale,
    user: AuthenticatedUser,
    Json(payload): Json<CreateTournamentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale, &app_state.i18n_store))?;

    let created = app_state
        .tournament_service
        .create_tournament(payload, user.profile())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok((StatusCode::CREATED, Json(created)))
}

#[utoipa::path(
    get,
    path = "/api/tournaments/{id}",
    tag = "Tournaments",
    params(
        ("id" = String, Path, description = "ID do torneio")
    ),
    responses(
        (status = 200, description = "Torneio, equipes e estado da inscrição para quem está vendo", body = TournamentDetail),
        (status = 404, description = "Torneio não encontrado")
    )
)]
pub async fn get_tournament(
    State(app_state): State<AppState>,
    locale: Locale,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<TournamentDetail>, ApiError> {
    let detail = app_state
        .tournament_service
        .tournament_detail(&id, viewer.as_ref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(detail))
}

#[utoipa::path(
    get,
    path = "/api/tournaments/{id}/teams",
    tag = "Teams",
    params(
        ("id" = String, Path, description = "ID do torneio")
    ),
    responses(
        (status = 200, description = "Equipes inscritas", body = Vec<Team>),
        (status = 404, description = "Torneio não encontrado")
    )
)]
pub async fn list_teams(
    State(app_state): State<AppState>,
    locale: Locale,
    MaybeUser(viewer): MaybeUser,
    Path(id): Path<String>,
) -> Result<Json<Vec<Team>>, ApiError> {
    let teams = app_state
        .tournament_service
        .list_teams(&id, viewer.as_ref())
        .await
        .map_err(|e| e.to_api_error(&locale, &app_state.i18n_store))?;

    Ok(Json(teams))
}
