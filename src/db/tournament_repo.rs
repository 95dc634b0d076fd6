// src/db/tournament_repo.rs

use std::sync::Arc;

use serde_json::json;
use tokio::sync::{broadcast::error::RecvError, watch};
use tokio::task::JoinHandle;

use crate::common::error::AppError;
use crate::db::store::{to_fields, Direction, DocumentStore, Query, StoreError};
use crate::models::team::{NewTeam, Team};
use crate::models::tournament::{NewTournament, Tournament, TournamentStatus};

pub const TOURNAMENTS: &str = "tournaments";
pub const SEAT_COUNTER: &str = "currentTeams";

pub fn teams_collection(tournament_id: &str) -> String {
    format!("{}/{}/teams", TOURNAMENTS, tournament_id)
}

// O repositório de torneios: coleção `tournaments` e a sub-coleção `teams` de cada um.
// Não verifica papéis nem capacidade; isso fica com quem chama.
#[derive(Clone)]
pub struct TournamentRepository {
    store: Arc<dyn DocumentStore>,
}

impl TournamentRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    // --- LEITURAS ---

    /// Torneios abertos, do mais novo para o mais antigo. Consulta única.
    pub async fn open_tournaments_snapshot(&self) -> Result<Vec<Tournament>, AppError> {
        // Busca tudo ordenado por data e filtra no cliente, como a listagem sempre fez
        let docs = self
            .store
            .query(
                TOURNAMENTS,
                &Query::new().order_by("createdAt", Direction::Descending),
            )
            .await?;

        let mut open = Vec::new();
        for doc in docs {
            let tournament: Tournament = doc.decode()?;
            if tournament.status == TournamentStatus::Open {
                open.push(tournament);
            }
        }
        Ok(open)
    }

    /// Assinatura ao vivo da lista de torneios abertos.
    /// A lista é republicada a cada mudança na coleção até o feed ser descartado.
    pub async fn list_open_tournaments(&self) -> Result<TournamentFeed, AppError> {
        // Assina antes do snapshot para não perder mudanças no intervalo
        let mut events = self.store.watch();
        let initial = self.open_tournaments_snapshot().await?;
        let (tx, rx) = watch::channel(initial);

        let repo = self.clone();
        let task = tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = tx.closed() => break,
                    event = events.recv() => match event {
                        Ok(event) if event.collection != TOURNAMENTS => continue,
                        Ok(_) => {}
                        Err(RecvError::Lagged(skipped)) => {
                            tracing::debug!("Feed de torneios atrasado em {} eventos", skipped);
                        }
                        Err(RecvError::Closed) => break,
                    },
                }

                match repo.open_tournaments_snapshot().await {
                    Ok(list) => {
                        if tx.send(list).is_err() {
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("Falha ao atualizar feed de torneios: {}", e),
                }
            }
            tracing::debug!("Feed de torneios encerrado");
        });

        Ok(TournamentFeed {
            rx,
            task: Some(task),
        })
    }

    /// Sugestões aguardando aprovação, da mais nova para a mais antiga.
    pub async fn list_pending_tournaments(&self) -> Result<Vec<Tournament>, AppError> {
        let docs = self
            .store
            .query(
                TOURNAMENTS,
                &Query::new()
                    .where_eq("status", TournamentStatus::Pending.as_str())
                    .order_by("createdAt", Direction::Descending),
            )
            .await?;

        docs.into_iter()
            .map(|doc| doc.decode().map_err(AppError::from))
            .collect()
    }

    pub async fn find_tournament(&self, id: &str) -> Result<Option<Tournament>, AppError> {
        match self.store.get(TOURNAMENTS, id).await? {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    pub async fn get_tournament(&self, id: &str) -> Result<Tournament, AppError> {
        self.find_tournament(id)
            .await?
            .ok_or_else(|| AppError::TournamentNotFound(id.to_string()))
    }

    /// Equipes inscritas, na ordem de inscrição.
    pub async fn list_teams(&self, tournament_id: &str) -> Result<Vec<Team>, AppError> {
        let docs = self
            .store
            .query(&teams_collection(tournament_id), &Query::new())
            .await?;

        docs.into_iter()
            .map(|doc| doc.decode().map_err(AppError::from))
            .collect()
    }

    /// Busca direta por chave; funciona mesmo se o torneio pai já foi excluído.
    pub async fn find_team(
        &self,
        tournament_id: &str,
        team_id: &str,
    ) -> Result<Option<Team>, AppError> {
        match self
            .store
            .get(&teams_collection(tournament_id), team_id)
            .await?
        {
            Some(doc) => Ok(Some(doc.decode()?)),
            None => Ok(None),
        }
    }

    // --- ESCRITAS ---

    pub async fn create_tournament(&self, tournament: &NewTournament) -> Result<String, AppError> {
        let id = self
            .store
            .insert(TOURNAMENTS, to_fields(tournament)?)
            .await?;
        Ok(id)
    }

    pub async fn set_status(&self, id: &str, status: TournamentStatus) -> Result<(), AppError> {
        let fields = to_fields(&json!({ "status": status }))?;
        self.store
            .update(TOURNAMENTS, id, fields)
            .await
            .map_err(|e| match e {
                StoreError::NotFound { .. } => {
                    AppError::TournamentNotFound(id.to_string())
                }
                other => other.into(),
            })
    }

    /// Remove só o documento do torneio. A sub-coleção `teams` fica órfã.
    pub async fn delete_tournament(&self, id: &str) -> Result<(), AppError> {
        self.store.delete(TOURNAMENTS, id).await?;
        Ok(())
    }

    pub async fn insert_team(&self, tournament_id: &str, team: &NewTeam) -> Result<String, AppError> {
        let id = self
            .store
            .insert(&teams_collection(tournament_id), to_fields(team)?)
            .await?;
        Ok(id)
    }

    pub async fn delete_team(&self, tournament_id: &str, team_id: &str) -> Result<(), AppError> {
        self.store
            .delete(&teams_collection(tournament_id), team_id)
            .await?;
        Ok(())
    }

    /// Incremento atômico do contador de vagas (+1 inscrição, -1 cancelamento).
    pub async fn adjust_seat_counter(&self, tournament_id: &str, delta: i64) -> Result<(), AppError> {
        self.store
            .increment(TOURNAMENTS, tournament_id, SEAT_COUNTER, delta)
            .await?;
        Ok(())
    }
}

/// Lista ao vivo de torneios abertos. Descartar o feed cancela a assinatura.
pub struct TournamentFeed {
    rx: watch::Receiver<Vec<Tournament>>,
    task: Option<JoinHandle<()>>,
}

impl TournamentFeed {
    pub fn current(&self) -> Vec<Tournament> {
        self.rx.borrow().clone()
    }

    /// Espera a próxima publicação. `None` quando o feed terminou.
    pub async fn changed(&mut self) -> Option<Vec<Tournament>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Cancela a assinatura e espera a tarefa terminar.
    pub async fn cancel(mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl Drop for TournamentFeed {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
