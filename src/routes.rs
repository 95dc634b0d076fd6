// src/routes.rs

use axum::{
    middleware as axum_middleware,
    routing::{delete, get, post},
    Router,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::AppState,
    docs::ApiDoc,
    handlers,
    middleware::auth::{auth_guard, optional_auth},
};

pub fn create_router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login))
        .route("/federated", post(handlers::auth::federated_login))
        .merge(
            Router::new()
                .route("/logout", post(handlers::auth::logout))
                .route_layer(axum_middleware::from_fn_with_state(
                    app_state.clone(),
                    auth_guard,
                )),
        );

    // Rotas de usuário (protegidas pelo middleware)
    let user_routes = Router::new()
        .route("/me", get(handlers::auth::get_me))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Leitura pública; o token, se vier, muda o que é exibido
    let public_tournament_routes = Router::new()
        .route("/", get(handlers::tournaments::list_tournaments))
        .route("/live", get(handlers::tournaments::live_tournaments))
        .route("/{id}", get(handlers::tournaments::get_tournament))
        .route("/{id}/teams", get(handlers::tournaments::list_teams))
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            optional_auth,
        ));

    let member_tournament_routes = Router::new()
        .route("/", post(handlers::tournaments::create_tournament))
        .route("/{id}/teams", post(handlers::teams::register_team))
        .route(
            "/{id}/teams/{team_id}",
            delete(handlers::teams::cancel_registration),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // O papel de admin é conferido pelo extrator AdminOnly em cada handler
    let admin_routes = Router::new()
        .route(
            "/tournaments/pending",
            get(handlers::admin::list_pending),
        )
        .route(
            "/tournaments/{id}/approve",
            post(handlers::admin::approve_tournament),
        )
        .route(
            "/tournaments/{id}",
            delete(handlers::admin::delete_tournament),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            auth_guard,
        ));

    // Combina tudo no router principal
    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest(
            "/api/tournaments",
            public_tournament_routes.merge(member_tournament_routes),
        )
        .nest("/api/admin", admin_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .with_state(app_state)
}
