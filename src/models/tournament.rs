// src/models/tournament.rs

use chrono::{DateTime, NaiveDateTime, SubsecRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::models::team::Team;
use crate::models::registration::RegistrationState;

// ---
// 1. Enums
// ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub enum GameMode {
    #[serde(rename = "5v5")]
    FiveVsFive,
    #[serde(rename = "1v1")]
    OneVsOne,
    #[serde(rename = "TFT")]
    Tft,
}

impl GameMode {
    /// Só modos em equipe exigem line-up.
    pub fn requires_lineup(self) -> bool {
        !matches!(self, GameMode::OneVsOne)
    }
}

/// `ongoing`, `finished` e `cancelled` existem no modelo mas nenhum fluxo chega neles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TournamentStatus {
    Pending,
    Open,
    Ongoing,
    Finished,
    Cancelled,
}

impl TournamentStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            TournamentStatus::Pending => "pending",
            TournamentStatus::Open => "open",
            TournamentStatus::Ongoing => "ongoing",
            TournamentStatus::Finished => "finished",
            TournamentStatus::Cancelled => "cancelled",
        }
    }
}

// ---
// 2. Tournament (o que sai do store)
// ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Tournament {
    #[schema(example = "3f2c1b8e-6a9d-4a54-9d0e-1f0b2b7f3c11")]
    pub id: String,

    #[schema(example = "Copa Universal Season 1")]
    pub title: String,

    pub description: String,

    pub game_mode: GameMode,

    #[schema(example = 16)]
    pub max_teams: u32,

    /// Vazio significa "a definir".
    #[serde(default)]
    #[schema(example = "2026-11-20T19:00")]
    pub start_date: String,

    pub status: TournamentStatus,

    #[serde(default)]
    #[schema(value_type = f64, example = 0)]
    pub entry_fee: Decimal,

    #[serde(default)]
    #[schema(example = "5000 Diamantes")]
    pub prize_pool: String,

    pub created_by: Uuid,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,

    /// Só é serializado para administradores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact_info: Option<String>,

    #[serde(default)]
    pub wants_broadcast: bool,

    #[serde(default)]
    pub wants_caster: bool,

    /// Contador desnormalizado de vagas ocupadas.
    #[serde(default)]
    pub current_teams: i64,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub created_at: DateTime<Utc>,
}

impl Tournament {
    pub fn is_full(&self) -> bool {
        self.current_teams >= i64::from(self.max_teams)
    }

    pub fn seats_left(&self) -> i64 {
        (i64::from(self.max_teams) - self.current_teams).max(0)
    }

    /// Versão do torneio que um espectador pode ver.
    pub fn for_viewer(mut self, viewer_is_admin: bool) -> Self {
        if !viewer_is_admin {
            self.contact_info = None;
        }
        self
    }
}

// ---
// 3. Documento gravado na criação
// ---
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTournament {
    pub title: String,
    pub description: String,
    pub game_mode: GameMode,
    pub max_teams: u32,
    pub start_date: String,
    pub status: TournamentStatus,
    pub entry_fee: Decimal,
    pub prize_pool: String,
    pub created_by: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub banner_url: Option<String>,
    pub contact_info: String,
    pub wants_broadcast: bool,
    pub wants_caster: bool,
    pub current_teams: i64,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl NewTournament {
    /// Administradores publicam direto; os demais enviam sugestões pendentes.
    pub fn from_payload(payload: CreateTournamentPayload, created_by: Uuid, by_admin: bool) -> Self {
        Self {
            title: payload.title.trim().to_string(),
            description: payload.description.trim().to_string(),
            game_mode: payload.game_mode,
            max_teams: payload.max_teams,
            start_date: payload.start_date,
            status: if by_admin {
                TournamentStatus::Open
            } else {
                TournamentStatus::Pending
            },
            entry_fee: payload.entry_fee,
            prize_pool: payload.prize_pool,
            created_by,
            banner_url: payload.banner_url,
            contact_info: payload.contact_info.trim().to_string(),
            wants_broadcast: payload.wants_broadcast,
            wants_caster: payload.wants_caster,
            current_teams: 0,
            created_at: Utc::now().trunc_subsecs(3),
        }
    }
}

// ---
// 4. Payload de criação / sugestão
// ---
fn default_max_teams() -> u32 {
    16
}

fn default_game_mode() -> GameMode {
    GameMode::FiveVsFive
}

/// Obrigatório de verdade: só espaços conta como vazio.
pub fn validate_not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("blank"));
    }
    Ok(())
}

/// Aceita o formato do `datetime-local` ("2026-11-20T19:00") e RFC 3339.
pub fn validate_start_date(value: &str) -> Result<(), ValidationError> {
    const LOCAL_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"];

    let value = value.trim();
    let parses = DateTime::parse_from_rfc3339(value).is_ok()
        || LOCAL_FORMATS
            .iter()
            .any(|fmt| NaiveDateTime::parse_from_str(value, fmt).is_ok());

    if parses {
        Ok(())
    } else {
        let mut err = ValidationError::new("start_date_format");
        err.message = Some("A data de início deve estar no formato ISO-8601.".into());
        Err(err)
    }
}

fn validate_entry_fee(value: &Decimal) -> Result<(), ValidationError> {
    if value.is_sign_negative() && !value.is_zero() {
        let mut err = ValidationError::new("entry_fee_negative");
        err.message = Some("O valor da inscrição não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateTournamentPayload {
    #[validate(custom(function = "validate_not_blank", message = "O título é obrigatório."))]
    #[schema(example = "Copa Universal Season 1")]
    pub title: String,

    #[validate(custom(function = "validate_not_blank", message = "A descrição é obrigatória."))]
    #[schema(example = "Melhor de 3, chaveamento simples.")]
    pub description: String,

    #[serde(default = "default_game_mode")]
    pub game_mode: GameMode,

    #[serde(default = "default_max_teams")]
    #[validate(range(min = 1, message = "O torneio precisa de pelo menos 1 vaga."))]
    #[schema(example = 16)]
    pub max_teams: u32,

    #[validate(
        length(min = 1, message = "A data de início é obrigatória."),
        custom(function = "validate_start_date")
    )]
    #[schema(example = "2026-11-20T19:00")]
    pub start_date: String,

    #[serde(default)]
    #[validate(custom(function = "validate_entry_fee"))]
    #[schema(value_type = f64, example = 0)]
    pub entry_fee: Decimal,

    #[serde(default)]
    #[schema(example = "5000 Diamantes")]
    pub prize_pool: String,

    #[validate(url(message = "A URL do banner é inválida."))]
    pub banner_url: Option<String>,

    #[validate(custom(
        function = "validate_not_blank",
        message = "O contato para negociação é obrigatório."
    ))]
    #[schema(example = "Discord: organizador#1234")]
    pub contact_info: String,

    #[serde(default)]
    pub wants_broadcast: bool,

    #[serde(default)]
    pub wants_caster: bool,
}

// ---
// 5. Respostas
// ---
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatedTournament {
    pub id: String,
    pub status: TournamentStatus,
}

/// A página de detalhes: torneio, equipes e o que o espectador pode fazer.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TournamentDetail {
    pub tournament: Tournament,
    pub teams: Vec<Team>,
    pub registration: RegistrationState,
}
