//! Testes de ponta a ponta das rotas HTTP sobre o armazenamento em memória.

use std::{sync::Arc, time::Duration};

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt; // Para o método `oneshot`

use tournament_hub::{
    config::{AppState, Config},
    db::MemoryDocumentStore,
    models::auth::FederatedClaims,
    routes::create_router,
};

const ADMIN_EMAIL: &str = "admin@torneios.gg";
const FEDERATION_SECRET: &str = "segredo_do_provedor";

fn test_config() -> Config {
    let mut config = Config::in_memory("test_secret_key_for_testing_only");
    config.bcrypt_cost = 4;
    config.admin_emails = vec![ADMIN_EMAIL.to_string()];
    config.federation_secret = Some(FEDERATION_SECRET.to_string());
    config
}

fn create_test_app(config: Config) -> Router {
    let state = AppState::with_store(config, Arc::new(MemoryDocumentStore::new()));
    create_router(state)
}

struct Call<'a> {
    method: Method,
    uri: &'a str,
    token: Option<&'a str>,
    lang: Option<&'a str>,
    body: Option<Value>,
}

impl<'a> Call<'a> {
    fn new(method: Method, uri: &'a str) -> Self {
        Self {
            method,
            uri,
            token: None,
            lang: None,
            body: None,
        }
    }

    fn token(mut self, token: &'a str) -> Self {
        self.token = Some(token);
        self
    }

    fn lang(mut self, lang: &'a str) -> Self {
        self.lang = Some(lang);
        self
    }

    fn json(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    async fn send(self, app: &Router) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(self.method).uri(self.uri);
        if let Some(token) = self.token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        if let Some(lang) = self.lang {
            builder = builder.header("accept-language", lang);
        }

        let request = match self.body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| {
                Value::String(String::from_utf8_lossy(&bytes).into_owned())
            })
        };
        (status, body)
    }
}

/// Cria a conta e faz login, devolvendo o token.
async fn sign_up(app: &Router, nickname: &str, email: &str) -> String {
    let (status, _) = Call::new(Method::POST, "/api/auth/register")
        .json(json!({ "nickname": nickname, "email": email, "password": "senha123" }))
        .send(app)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, body) = Call::new(Method::POST, "/api/auth/login")
        .json(json!({ "email": email, "password": "senha123" }))
        .send(app)
        .await;
    assert_eq!(status, StatusCode::OK);
    body["token"].as_str().unwrap().to_string()
}

fn tournament_body(title: &str, max_teams: u32) -> Value {
    json!({
        "title": title,
        "description": "Melhor de 3",
        "gameMode": "5v5",
        "maxTeams": max_teams,
        "startDate": "2026-11-20T19:00",
        "entryFee": 0,
        "prizePool": "5000 Diamantes",
        "contactInfo": "Discord: org#1234"
    })
}

fn team_body(name: &str) -> Value {
    json!({
        "teamName": name,
        "contact": "WhatsApp (11) 99999-9999",
        "lineup": "a, b, c, d, e"
    })
}

async fn create_open_tournament(app: &Router, admin_token: &str, max_teams: u32) -> String {
    let (status, body) = Call::new(Method::POST, "/api/tournaments")
        .token(admin_token)
        .json(tournament_body("Copa Oficial", max_teams))
        .send(app)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "open");
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_health_check_endpoint() {
    let app = create_test_app(test_config());
    let (status, body) = Call::new(Method::GET, "/api/health").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, "OK");
}

#[tokio::test]
async fn test_live_feed_streams_open_tournaments() {
    let app = create_test_app(test_config());
    let admin = sign_up(&app, "Organizador", ADMIN_EMAIL).await;
    let id = create_open_tournament(&app, &admin, 16).await;

    let request = Request::builder()
        .uri("/api/tournaments/live")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response.headers()["content-type"].to_str().unwrap();
    assert!(content_type.starts_with("text/event-stream"));

    // O primeiro evento sai sem esperar mudança alguma
    let mut body = response.into_body();
    let mut text = String::new();
    while !text.contains("\n\n") {
        let frame = tokio::time::timeout(Duration::from_secs(2), body.frame())
            .await
            .expect("nenhum evento no stream")
            .expect("stream encerrado")
            .unwrap();
        if let Ok(data) = frame.into_data() {
            text.push_str(&String::from_utf8_lossy(&data));
        }
    }

    assert!(text.contains("event: tournaments"));
    assert!(text.contains(&id));
    assert!(!text.contains("Discord: org#1234"));
}

#[tokio::test]
async fn test_register_does_not_sign_in() {
    let app = create_test_app(test_config());

    let (status, body) = Call::new(Method::POST, "/api/auth/register")
        .json(json!({ "nickname": "ProPlayer", "email": "Pro@Email.com", "password": "senha123" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body.get("token").is_none());
    assert_eq!(body["email"], "pro@email.com");
    assert_eq!(body["role"], "user");

    let (status, _) = Call::new(Method::POST, "/api/auth/register")
        .json(json!({ "nickname": "Outro", "email": "pro@email.com", "password": "senha123" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_login_and_current_user() {
    let app = create_test_app(test_config());
    let token = sign_up(&app, "ProPlayer", "pro@email.com").await;

    let (status, body) = Call::new(Method::GET, "/api/users/me")
        .token(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["nickname"], "ProPlayer");

    let (status, _) = Call::new(Method::POST, "/api/auth/login")
        .json(json!({ "email": "pro@email.com", "password": "errada1" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let app = create_test_app(test_config());

    let (status, body) = Call::new(Method::GET, "/api/users/me").send(&app).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Token de autenticação inválido ou ausente.");

    let (status, _) = Call::new(Method::POST, "/api/tournaments")
        .json(tournament_body("Copa", 4))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Token inválido em rota pública é rejeitado, ausência não
    let (status, _) = Call::new(Method::GET, "/api/tournaments")
        .token("nao-e-um-jwt")
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = Call::new(Method::GET, "/api/tournaments").send(&app).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_logout_revokes_the_session() {
    let app = create_test_app(test_config());
    let token = sign_up(&app, "ProPlayer", "pro@email.com").await;

    let (status, _) = Call::new(Method::POST, "/api/auth/logout")
        .token(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = Call::new(Method::GET, "/api/users/me")
        .token(&token)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_suggestion_flow_until_approval() {
    let app = create_test_app(test_config());
    let admin = sign_up(&app, "Organizador", ADMIN_EMAIL).await;
    let member = sign_up(&app, "ProPlayer", "pro@email.com").await;

    let (status, body) = Call::new(Method::POST, "/api/tournaments")
        .token(&member)
        .json(tournament_body("Sugestão", 8))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    let suggestion_id = body["id"].as_str().unwrap().to_string();

    // Pendente não aparece na lista pública
    let (_, listing) = Call::new(Method::GET, "/api/tournaments").send(&app).await;
    assert_eq!(listing.as_array().unwrap().len(), 0);

    // Só admin vê a fila de aprovação
    let (status, _) = Call::new(Method::GET, "/api/admin/tournaments/pending")
        .token(&member)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, pending) = Call::new(Method::GET, "/api/admin/tournaments/pending")
        .token(&admin)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(pending[0]["id"], suggestion_id.as_str());
    assert_eq!(pending[0]["contactInfo"], "Discord: org#1234");

    let approve_uri = format!("/api/admin/tournaments/{suggestion_id}/approve");
    let (status, _) = Call::new(Method::POST, &approve_uri)
        .token(&member)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, approved) = Call::new(Method::POST, &approve_uri)
        .token(&admin)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["status"], "open");

    let (_, listing) = Call::new(Method::GET, "/api/tournaments").send(&app).await;
    let listing = listing.as_array().unwrap();
    assert_eq!(listing.len(), 1);
    assert!(listing[0].get("contactInfo").is_none());
}

#[tokio::test]
async fn test_invalid_tournament_reports_field_details() {
    let app = create_test_app(test_config());
    let member = sign_up(&app, "ProPlayer", "pro@email.com").await;

    let mut body = tournament_body("", 8);
    body["startDate"] = json!("amanhã");

    let (status, error) = Call::new(Method::POST, "/api/tournaments")
        .token(&member)
        .json(body)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(error["details"]["title"].is_array());
    assert!(error["details"]["start_date"].is_array());
}

#[tokio::test]
async fn test_capacity_and_cancellation() {
    let app = create_test_app(test_config());
    let admin = sign_up(&app, "Organizador", ADMIN_EMAIL).await;
    let captain_a = sign_up(&app, "CapitaoA", "a@email.com").await;
    let captain_b = sign_up(&app, "CapitaoB", "b@email.com").await;
    let tournament_id = create_open_tournament(&app, &admin, 1).await;
    let teams_uri = format!("/api/tournaments/{tournament_id}/teams");
    let detail_uri = format!("/api/tournaments/{tournament_id}");

    let (status, team) = Call::new(Method::POST, &teams_uri)
        .token(&captain_a)
        .json(team_body("Kings"))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let team_id = team["id"].as_str().unwrap().to_string();

    let (status, error) = Call::new(Method::POST, &teams_uri)
        .token(&captain_b)
        .lang("en-US,en;q=0.9")
        .json(team_body("Queens"))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error["error"], "This tournament has no seats left.");

    let (_, detail) = Call::new(Method::GET, &detail_uri)
        .token(&captain_a)
        .send(&app)
        .await;
    assert_eq!(detail["tournament"]["currentTeams"], 1);
    assert_eq!(detail["registration"]["myTeamId"], team_id.as_str());
    assert_eq!(detail["registration"]["canCancel"], true);
    assert_eq!(detail["teams"][0]["contact"], "WhatsApp (11) 99999-9999");

    // Outros espectadores não veem o contato do capitão
    let (_, detail) = Call::new(Method::GET, &detail_uri)
        .token(&captain_b)
        .send(&app)
        .await;
    assert!(detail["teams"][0].get("contact").is_none());
    assert_eq!(detail["registration"]["isFull"], true);
    assert_eq!(detail["registration"]["canRegister"], false);

    let cancel_uri = format!("{teams_uri}/{team_id}");
    let (status, _) = Call::new(Method::DELETE, &cancel_uri)
        .token(&captain_b)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = Call::new(Method::DELETE, &cancel_uri)
        .token(&captain_a)
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = Call::new(Method::POST, &teams_uri)
        .token(&captain_b)
        .json(team_body("Queens"))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, teams) = Call::new(Method::GET, &teams_uri).send(&app).await;
    assert_eq!(teams.as_array().unwrap().len(), 1);
    assert_eq!(teams[0]["teamName"], "Queens");
}

#[tokio::test]
async fn test_admin_deletes_tournament() {
    let app = create_test_app(test_config());
    let admin = sign_up(&app, "Organizador", ADMIN_EMAIL).await;
    let tournament_id = create_open_tournament(&app, &admin, 4).await;
    let uri = format!("/api/admin/tournaments/{tournament_id}");

    let (status, _) = Call::new(Method::DELETE, &uri).token(&admin).send(&app).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = Call::new(Method::GET, &format!("/api/tournaments/{tournament_id}"))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Torneio não encontrado!");

    let (status, _) = Call::new(Method::DELETE, &uri).token(&admin).send(&app).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

fn assertion(subject: &str, email: &str) -> String {
    let claims = FederatedClaims {
        iss: "https://id.provedor.gg".to_string(),
        sub: subject.to_string(),
        email: email.to_string(),
        name: Some("Jogador Federado".to_string()),
        exp: (chrono::Utc::now().timestamp() + 300) as usize,
    };
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(FEDERATION_SECRET.as_bytes()),
    )
    .unwrap()
}

#[tokio::test]
async fn test_federated_sign_in_reuses_linked_profile() {
    let app = create_test_app(test_config());

    let (status, first) = Call::new(Method::POST, "/api/auth/federated")
        .json(json!({ "assertion": assertion("ext-42", "fed@email.com") }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["user"]["nickname"], "Jogador Federado");

    let (status, second) = Call::new(Method::POST, "/api/auth/federated")
        .json(json!({ "assertion": assertion("ext-42", "fed@email.com") }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["user"]["id"], second["user"]["id"]);

    let token = second["token"].as_str().unwrap();
    let (status, _) = Call::new(Method::GET, "/api/users/me").token(token).send(&app).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = Call::new(Method::POST, "/api/auth/federated")
        .json(json!({ "assertion": "forjada" }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_federated_sign_in_disabled_without_secret() {
    let mut config = test_config();
    config.federation_secret = None;
    let app = create_test_app(config);

    let (status, _) = Call::new(Method::POST, "/api/auth/federated")
        .json(json!({ "assertion": assertion("ext-42", "fed@email.com") }))
        .send(&app)
        .await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = create_test_app(test_config());
    let (status, doc) = Call::new(Method::GET, "/api-docs/openapi.json").send(&app).await;
    assert_eq!(status, StatusCode::OK);
    assert!(doc["paths"].get("/api/tournaments/{id}/teams").is_some());
}
