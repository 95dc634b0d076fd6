// src/services/registration.rs

//! Fluxo de inscrição de equipes: estado da inscrição para quem está vendo,
//! trava de capacidade e os pares "inserir + incrementar" / "remover + decrementar".
//!
//! Os dois passos de cada par NÃO formam uma transação, e a capacidade é conferida
//! apenas quando o formulário é aberto. Duas inscrições concorrentes que viram a
//! última vaga livre passam ambas, deixando `currentTeams > maxTeams`.

use chrono::{SubsecRound, Utc};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::AppError,
    db::TournamentRepository,
    models::{
        registration::{RegistrationBlock, RegistrationState},
        team::{NewTeam, RegisterTeamPayload, Team, TeamStatus},
        tournament::{GameMode, Tournament, TournamentStatus},
    },
};

impl From<RegistrationBlock> for AppError {
    fn from(block: RegistrationBlock) -> Self {
        match block {
            RegistrationBlock::NotAuthenticated => AppError::InvalidToken,
            RegistrationBlock::NotOpen => AppError::TournamentNotOpen,
            RegistrationBlock::Full => AppError::TournamentFull,
            RegistrationBlock::AlreadyRegistered => AppError::AlreadyRegistered,
        }
    }
}

/// Varre a lista de equipes procurando uma cujo capitão é o espectador.
pub fn find_captain_team<'a>(teams: &'a [Team], viewer: Uuid) -> Option<&'a Team> {
    teams.iter().find(|team| team.captain_id == viewer)
}

/// Estado da inscrição a partir do torneio e da lista de equipes já carregados.
/// Nenhuma leitura nova é feita aqui.
pub fn determine_state(
    tournament: &Tournament,
    teams: &[Team],
    viewer: Option<Uuid>,
) -> RegistrationState {
    let my_team = viewer.and_then(|viewer| find_captain_team(teams, viewer));
    let is_full = tournament.is_full();

    let blocked_by = if viewer.is_none() {
        Some(RegistrationBlock::NotAuthenticated)
    } else if my_team.is_some() {
        Some(RegistrationBlock::AlreadyRegistered)
    } else if tournament.status != TournamentStatus::Open {
        Some(RegistrationBlock::NotOpen)
    } else if is_full {
        Some(RegistrationBlock::Full)
    } else {
        None
    };

    RegistrationState {
        my_team_id: my_team.map(|team| team.id.clone()),
        seats_taken: tournament.current_teams,
        max_teams: tournament.max_teams,
        seats_left: tournament.seats_left(),
        is_full,
        can_register: blocked_by.is_none(),
        can_cancel: my_team.is_some(),
        blocked_by,
    }
}

/// Formulário de inscrição aberto: guarda o que foi observado na leitura
/// que liberou a inscrição. Só pode ser criado por [`RegistrationService::open_registration_form`].
#[derive(Debug, Clone)]
pub struct RegistrationTicket {
    tournament_id: String,
    captain_id: Uuid,
    game_mode: GameMode,
    observed_seats: i64,
    max_teams: u32,
}

impl RegistrationTicket {
    /// Vagas ocupadas no momento em que o formulário foi aberto.
    pub fn observed_seats(&self) -> i64 {
        self.observed_seats
    }
}

#[derive(Clone)]
pub struct RegistrationService {
    repo: TournamentRepository,
}

impl RegistrationService {
    pub fn new(repo: TournamentRepository) -> Self {
        Self { repo }
    }

    /// Carrega torneio e equipes e calcula o estado para o espectador.
    pub async fn load(
        &self,
        tournament_id: &str,
        viewer: Option<Uuid>,
    ) -> Result<(Tournament, Vec<Team>, RegistrationState), AppError> {
        let tournament = self.repo.get_tournament(tournament_id).await?;
        let teams = self.repo.list_teams(tournament_id).await?;
        let state = determine_state(&tournament, &teams, viewer);
        Ok((tournament, teams, state))
    }

    /// Leitura fresca + trava de capacidade antes de abrir o formulário.
    pub async fn open_registration_form(
        &self,
        tournament_id: &str,
        captain_id: Uuid,
    ) -> Result<RegistrationTicket, AppError> {
        let (tournament, _, state) = self.load(tournament_id, Some(captain_id)).await?;

        if let Some(block) = state.blocked_by {
            tracing::debug!(
                "Inscrição bloqueada em {} para {}: {:?}",
                tournament_id,
                captain_id,
                block
            );
            return Err(block.into());
        }

        Ok(RegistrationTicket {
            tournament_id: tournament.id,
            captain_id,
            game_mode: tournament.game_mode,
            observed_seats: tournament.current_teams,
            max_teams: tournament.max_teams,
        })
    }

    /// Envia o formulário: insere a equipe e depois incrementa o contador.
    /// A capacidade não é conferida de novo aqui.
    pub async fn submit_registration(
        &self,
        ticket: RegistrationTicket,
        payload: RegisterTeamPayload,
    ) -> Result<Team, AppError> {
        payload.validate()?;
        if ticket.game_mode.requires_lineup() && payload.lineup.trim().is_empty() {
            return Err(AppError::LineupRequired);
        }

        let new_team = NewTeam {
            team_name: payload.team_name.trim().to_string(),
            lineup: payload.lineup,
            contact: payload.contact,
            captain_id: ticket.captain_id,
            registered_at: Utc::now().trunc_subsecs(3),
            status: TeamStatus::Approved,
        };

        // 1. Insere a equipe
        let team_id = self.repo.insert_team(&ticket.tournament_id, &new_team).await?;

        // 2. Incrementa o contador (operação separada, sem rollback do passo 1)
        if let Err(e) = self.repo.adjust_seat_counter(&ticket.tournament_id, 1).await {
            tracing::error!(
                "Equipe {} inscrita em {} mas o contador não foi incrementado: {}",
                team_id,
                ticket.tournament_id,
                e
            );
            return Err(e);
        }

        tracing::info!(
            "✅ Equipe '{}' inscrita no torneio {} (vagas vistas: {}/{})",
            new_team.team_name,
            ticket.tournament_id,
            ticket.observed_seats + 1,
            ticket.max_teams
        );

        Ok(Team {
            id: team_id,
            team_name: new_team.team_name,
            lineup: new_team.lineup,
            contact: Some(new_team.contact),
            captain_id: new_team.captain_id,
            registered_at: new_team.registered_at,
            status: new_team.status,
        })
    }

    /// Abrir o formulário e enviá-lo em seguida.
    pub async fn register_team(
        &self,
        tournament_id: &str,
        captain_id: Uuid,
        payload: RegisterTeamPayload,
    ) -> Result<Team, AppError> {
        let ticket = self.open_registration_form(tournament_id, captain_id).await?;
        self.submit_registration(ticket, payload).await
    }

    /// Cancela a inscrição do próprio capitão: remove a equipe e depois decrementa.
    pub async fn cancel_registration(
        &self,
        tournament_id: &str,
        team_id: &str,
        viewer: Uuid,
    ) -> Result<(), AppError> {
        let team = self
            .repo
            .find_team(tournament_id, team_id)
            .await?
            .ok_or_else(|| AppError::TeamNotFound(team_id.to_string()))?;

        if team.captain_id != viewer {
            return Err(AppError::NotTeamCaptain);
        }

        self.repo.delete_team(tournament_id, team_id).await?;

        if let Err(e) = self.repo.adjust_seat_counter(tournament_id, -1).await {
            tracing::error!(
                "Equipe {} removida de {} mas o contador não foi decrementado: {}",
                team_id,
                tournament_id,
                e
            );
            return Err(e);
        }

        tracing::info!("🗑️ Inscrição {} cancelada no torneio {}", team_id, tournament_id);
        Ok(())
    }
}
