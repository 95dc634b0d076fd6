// src/models/team.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::models::tournament::validate_not_blank;

/// Toda inscrição nasce aprovada; não há etapa de revisão.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum TeamStatus {
    Approved,
}

// Inscrição de uma equipe, filha de exatamente um torneio
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,

    #[schema(example = "Kings of Mobile")]
    pub team_name: String,

    #[serde(default)]
    #[schema(example = "nick1, nick2, nick3, nick4, nick5")]
    pub lineup: String,

    /// Visível só para administradores e para o próprio capitão.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,

    pub captain_id: Uuid,

    #[serde(with = "chrono::serde::ts_milliseconds")]
    #[schema(value_type = i64)]
    pub registered_at: DateTime<Utc>,

    pub status: TeamStatus,
}

impl Team {
    pub fn for_viewer(mut self, viewer: Option<Uuid>, viewer_is_admin: bool) -> Self {
        if !viewer_is_admin && viewer != Some(self.captain_id) {
            self.contact = None;
        }
        self
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTeam {
    pub team_name: String,
    pub lineup: String,
    pub contact: String,
    pub captain_id: Uuid,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub registered_at: DateTime<Utc>,
    pub status: TeamStatus,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RegisterTeamPayload {
    #[validate(custom(function = "validate_not_blank", message = "O nome da equipe é obrigatório."))]
    #[schema(example = "Kings of Mobile")]
    pub team_name: String,

    #[validate(custom(function = "validate_not_blank", message = "O contato do capitão é obrigatório."))]
    #[schema(example = "WhatsApp (11) 99999-9999")]
    pub contact: String,

    /// Obrigatório exceto em torneios 1v1.
    #[serde(default)]
    pub lineup: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn team(captain: Uuid) -> Team {
        Team {
            id: "t".into(),
            team_name: "Kings".into(),
            lineup: String::new(),
            contact: Some("discord".into()),
            captain_id: captain,
            registered_at: Utc::now(),
            status: TeamStatus::Approved,
        }
    }

    #[test]
    fn contact_is_hidden_from_other_members() {
        let captain = Uuid::new_v4();
        assert!(team(captain).for_viewer(Some(Uuid::new_v4()), false).contact.is_none());
        assert!(team(captain).for_viewer(None, false).contact.is_none());
    }

    #[test]
    fn whitespace_only_name_and_contact_are_rejected() {
        let payload = RegisterTeamPayload {
            team_name: "   ".into(),
            contact: "\t".into(),
            lineup: String::new(),
        };
        let errors = payload.validate().unwrap_err();
        let fields = errors.field_errors();
        assert!(fields.contains_key("team_name"));
        assert!(fields.contains_key("contact"));
    }

    #[test]
    fn contact_is_visible_to_captain_and_admins() {
        let captain = Uuid::new_v4();
        assert!(team(captain).for_viewer(Some(captain), false).contact.is_some());
        assert!(team(captain).for_viewer(None, true).contact.is_some());
    }
}
