// src/models/registration.rs

use serde::Serialize;
use utoipa::ToSchema;

/// Motivo pelo qual o espectador não pode se inscrever agora.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum RegistrationBlock {
    NotAuthenticated,
    NotOpen,
    Full,
    AlreadyRegistered,
}

/// O que a página de detalhes oferece: inscrever ou cancelar.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegistrationState {
    /// A equipe do espectador, se ele for capitão de alguma.
    pub my_team_id: Option<String>,
    pub seats_taken: i64,
    pub max_teams: u32,
    pub seats_left: i64,
    pub is_full: bool,
    pub can_register: bool,
    pub can_cancel: bool,
    pub blocked_by: Option<RegistrationBlock>,
}
