// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::services;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,
        handlers::auth::federated_login,
        handlers::auth::logout,

        // --- Users ---
        handlers::auth::get_me,

        // --- Tournaments ---
        handlers::tournaments::list_tournaments,
        handlers::tournaments::live_tournaments,
        handlers::tournaments::create_tournament,
        handlers::tournaments::get_tournament,

        // --- Teams ---
        handlers::tournaments::list_teams,
        handlers::teams::register_team,
        handlers::teams::cancel_registration,

        // --- Admin ---
        handlers::admin::list_pending,
        handlers::admin::approve_tournament,
        handlers::admin::delete_tournament,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::Role,
            models::auth::UserProfile,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::FederatedLoginPayload,
            models::auth::AuthResponse,

            // --- Tournaments ---
            models::tournament::GameMode,
            models::tournament::TournamentStatus,
            models::tournament::Tournament,
            models::tournament::CreateTournamentPayload,
            models::tournament::CreatedTournament,
            models::tournament::TournamentDetail,

            // --- Teams ---
            models::team::TeamStatus,
            models::team::Team,
            models::team::RegisterTeamPayload,

            // --- Registration ---
            models::registration::RegistrationBlock,
            models::registration::RegistrationState,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Perfil"),
        (name = "Tournaments", description = "Listagem, detalhes e sugestões de torneios"),
        (name = "Teams", description = "Inscrição e cancelamento de equipes"),
        (name = "Admin", description = "Aprovação e remoção de torneios")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}
