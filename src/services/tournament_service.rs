// src/services/tournament_service.rs

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{TournamentFeed, TournamentRepository},
    models::{
        auth::UserProfile,
        team::Team,
        tournament::{
            CreateTournamentPayload, CreatedTournament, NewTournament, Tournament,
            TournamentDetail, TournamentStatus,
        },
    },
    services::registration::RegistrationService,
};

#[derive(Clone)]
pub struct TournamentService {
    repo: TournamentRepository,
    registration: RegistrationService,
}

impl TournamentService {
    pub fn new(repo: TournamentRepository, registration: RegistrationService) -> Self {
        Self { repo, registration }
    }

    /// Criação oficial (admin, já aberta) ou sugestão (usuário, pendente).
    /// Os campos obrigatórios já chegam validados pelo handler.
    pub async fn create_tournament(
        &self,
        payload: CreateTournamentPayload,
        submitter: &UserProfile,
    ) -> Result<CreatedTournament, AppError> {
        let tournament = NewTournament::from_payload(payload, submitter.id, submitter.is_admin());
        let id = self.repo.create_tournament(&tournament).await?;

        match tournament.status {
            TournamentStatus::Open => {
                tracing::info!("🏆 Torneio oficial {} criado por {}", id, submitter.id)
            }
            _ => tracing::info!("💡 Sugestão de torneio {} enviada por {}", id, submitter.id),
        }

        Ok(CreatedTournament {
            id,
            status: tournament.status,
        })
    }

    /// Aprovar é idempotente: um torneio já aberto continua aberto.
    pub async fn approve_tournament(&self, id: &str) -> Result<Tournament, AppError> {
        self.repo.set_status(id, TournamentStatus::Open).await?;
        tracing::info!("✅ Torneio {} aprovado", id);
        self.repo.get_tournament(id).await
    }

    /// Rejeitar uma sugestão ou excluir um torneio aberto.
    /// As inscrições da sub-coleção não são removidas.
    pub async fn delete_tournament(&self, id: &str) -> Result<(), AppError> {
        let tournament = self.repo.get_tournament(id).await?;
        self.repo.delete_tournament(id).await?;

        if tournament.current_teams > 0 {
            tracing::warn!(
                "Torneio {} excluído com {} inscrições que ficam órfãs",
                id,
                tournament.current_teams
            );
        } else {
            tracing::info!("🗑️ Torneio {} excluído", id);
        }
        Ok(())
    }

    pub async fn list_open_tournaments(&self) -> Result<Vec<Tournament>, AppError> {
        let tournaments = self.repo.open_tournaments_snapshot().await?;
        Ok(tournaments
            .into_iter()
            .map(|t| t.for_viewer(false))
            .collect())
    }

    pub async fn open_tournament_feed(&self) -> Result<TournamentFeed, AppError> {
        self.repo.list_open_tournaments().await
    }

    pub async fn list_pending_tournaments(&self) -> Result<Vec<Tournament>, AppError> {
        self.repo.list_pending_tournaments().await
    }

    /// Detalhes como o espectador deve vê-los.
    pub async fn tournament_detail(
        &self,
        id: &str,
        viewer: Option<&UserProfile>,
    ) -> Result<TournamentDetail, AppError> {
        let viewer_id = viewer.map(|u| u.id);
        let is_admin = viewer.is_some_and(UserProfile::is_admin);

        let (tournament, teams, registration) = self.registration.load(id, viewer_id).await?;

        Ok(TournamentDetail {
            tournament: tournament.for_viewer(is_admin),
            teams: teams
                .into_iter()
                .map(|team| team.for_viewer(viewer_id, is_admin))
                .collect(),
            registration,
        })
    }

    pub async fn list_teams(
        &self,
        id: &str,
        viewer: Option<&UserProfile>,
    ) -> Result<Vec<Team>, AppError> {
        // 404 se o torneio não existe, como na página de detalhes
        self.repo.get_tournament(id).await?;

        let viewer_id: Option<Uuid> = viewer.map(|u| u.id);
        let is_admin = viewer.is_some_and(UserProfile::is_admin);
        Ok(self
            .repo
            .list_teams(id)
            .await?
            .into_iter()
            .map(|team| team.for_viewer(viewer_id, is_admin))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDocumentStore;
    use crate::models::auth::Role;
    use crate::models::team::RegisterTeamPayload;
    use chrono::Utc;
    use std::sync::Arc;
    use std::time::Duration;

    struct Fixture {
        service: TournamentService,
        registration: RegistrationService,
        repo: TournamentRepository,
        store: Arc<MemoryDocumentStore>,
    }

    fn fixture() -> Fixture {
        let store = Arc::new(MemoryDocumentStore::new());
        let repo = TournamentRepository::new(store.clone());
        let registration = RegistrationService::new(repo.clone());
        Fixture {
            service: TournamentService::new(repo.clone(), registration.clone()),
            registration,
            repo,
            store,
        }
    }

    fn user(role: Role) -> UserProfile {
        UserProfile {
            id: Uuid::new_v4(),
            nickname: "nick".into(),
            email: "nick@email.com".into(),
            role,
            created_at: Utc::now(),
        }
    }

    fn payload(title: &str) -> CreateTournamentPayload {
        serde_json::from_value(serde_json::json!({
            "title": title,
            "description": "Regras",
            "maxTeams": 4,
            "startDate": "2026-11-20T19:00",
            "contactInfo": "wa: 11 99999-9999"
        }))
        .unwrap()
    }

    async fn next_snapshot(feed: &mut TournamentFeed) -> Vec<Tournament> {
        tokio::time::timeout(Duration::from_secs(2), feed.changed())
            .await
            .expect("feed não publicou a tempo")
            .expect("feed encerrado")
    }

    #[tokio::test]
    async fn status_on_creation_depends_on_role() {
        let f = fixture();
        let by_user = f
            .service
            .create_tournament(payload("Sugestão"), &user(Role::User))
            .await
            .unwrap();
        let by_admin = f
            .service
            .create_tournament(payload("Oficial"), &user(Role::Admin))
            .await
            .unwrap();

        assert_eq!(by_user.status, TournamentStatus::Pending);
        assert_eq!(by_admin.status, TournamentStatus::Open);
        assert_eq!(
            f.repo.get_tournament(&by_user.id).await.unwrap().status,
            TournamentStatus::Pending
        );
    }

    #[tokio::test]
    async fn approving_twice_is_idempotent() {
        let f = fixture();
        let created = f
            .service
            .create_tournament(payload("Sugestão"), &user(Role::User))
            .await
            .unwrap();

        let first = f.service.approve_tournament(&created.id).await.unwrap();
        let second = f.service.approve_tournament(&created.id).await.unwrap();
        assert_eq!(first.status, TournamentStatus::Open);
        assert_eq!(first, second);
        assert!(f.service.list_pending_tournaments().await.unwrap().is_empty());
        assert_eq!(f.service.list_open_tournaments().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn approving_missing_tournament_is_not_found() {
        let err = fixture().service.approve_tournament("nope").await.unwrap_err();
        assert!(matches!(err, AppError::TournamentNotFound(_)));
    }

    #[tokio::test]
    async fn deleting_leaves_orphaned_teams() {
        let f = fixture();
        let created = f
            .service
            .create_tournament(payload("Oficial"), &user(Role::Admin))
            .await
            .unwrap();
        let team = f
            .registration
            .register_team(
                &created.id,
                Uuid::new_v4(),
                RegisterTeamPayload {
                    team_name: "Kings".into(),
                    contact: "discord".into(),
                    lineup: "a, b, c, d, e".into(),
                },
            )
            .await
            .unwrap();

        f.service.delete_tournament(&created.id).await.unwrap();

        assert!(f.repo.find_tournament(&created.id).await.unwrap().is_none());
        let orphan = f.repo.find_team(&created.id, &team.id).await.unwrap();
        assert_eq!(orphan.map(|t| t.team_name), Some("Kings".to_string()));
    }

    #[tokio::test]
    async fn listing_shows_only_open_newest_first_without_contact() {
        let f = fixture();
        let admin = user(Role::Admin);
        // Sem pausas: criações no mesmo milissegundo também saem do mais novo ao mais antigo
        let older = f.service.create_tournament(payload("Antigo"), &admin).await.unwrap();
        f.service
            .create_tournament(payload("Sugestão"), &user(Role::User))
            .await
            .unwrap();
        let newer = f.service.create_tournament(payload("Novo"), &admin).await.unwrap();

        let open = f.service.list_open_tournaments().await.unwrap();
        let ids: Vec<_> = open.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec![newer.id, older.id]);
        assert!(open.iter().all(|t| t.contact_info.is_none()));
    }

    #[tokio::test]
    async fn pending_queue_is_newest_first() {
        let f = fixture();
        let member = user(Role::User);
        let first = f.service.create_tournament(payload("Primeira"), &member).await.unwrap();
        let second = f.service.create_tournament(payload("Segunda"), &member).await.unwrap();
        f.service
            .create_tournament(payload("Oficial"), &user(Role::Admin))
            .await
            .unwrap();

        let pending = f.service.list_pending_tournaments().await.unwrap();
        let ids: Vec<_> = pending.iter().map(|t| t.id.clone()).collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[tokio::test]
    async fn detail_hides_contact_from_non_admins() {
        let f = fixture();
        let created = f
            .service
            .create_tournament(payload("Oficial"), &user(Role::Admin))
            .await
            .unwrap();

        let as_member = f
            .service
            .tournament_detail(&created.id, Some(&user(Role::User)))
            .await
            .unwrap();
        let as_admin = f
            .service
            .tournament_detail(&created.id, Some(&user(Role::Admin)))
            .await
            .unwrap();
        let anonymous = f.service.tournament_detail(&created.id, None).await.unwrap();

        assert!(as_member.tournament.contact_info.is_none());
        assert!(anonymous.tournament.contact_info.is_none());
        assert_eq!(
            as_admin.tournament.contact_info.as_deref(),
            Some("wa: 11 99999-9999")
        );
    }

    #[tokio::test]
    async fn live_feed_follows_approvals_and_registrations() {
        let f = fixture();
        let mut feed = f.service.open_tournament_feed().await.unwrap();
        assert!(feed.current().is_empty());

        let suggestion = f
            .service
            .create_tournament(payload("Sugestão"), &user(Role::User))
            .await
            .unwrap();
        f.service.approve_tournament(&suggestion.id).await.unwrap();

        let mut snapshot = next_snapshot(&mut feed).await;
        while snapshot.is_empty() {
            snapshot = next_snapshot(&mut feed).await;
        }
        assert_eq!(snapshot[0].id, suggestion.id);

        f.registration
            .register_team(
                &suggestion.id,
                Uuid::new_v4(),
                RegisterTeamPayload {
                    team_name: "Kings".into(),
                    contact: "discord".into(),
                    lineup: "a, b, c, d, e".into(),
                },
            )
            .await
            .unwrap();

        let mut snapshot = next_snapshot(&mut feed).await;
        while snapshot[0].current_teams == 0 {
            snapshot = next_snapshot(&mut feed).await;
        }
        assert_eq!(snapshot[0].current_teams, 1);
    }

    #[tokio::test]
    async fn cancelling_the_feed_detaches_from_the_store() {
        let f = fixture();
        let feed = f.service.open_tournament_feed().await.unwrap();
        assert_eq!(f.store.watcher_count(), 1);

        feed.cancel().await;
        assert_eq!(f.store.watcher_count(), 0);

        // Escritas seguem funcionando sem ouvintes
        f.service
            .create_tournament(payload("Oficial"), &user(Role::Admin))
            .await
            .unwrap();
    }
}
