//! League loading, command execution and saving

use anyhow::{Context, Result};
use league_engine::{
    compute_lineup_total, rank_player_pool, validate_roster, League, LeagueHub, ManagerId, Week,
};
use league_persistence::{LeagueSnapshot, LocalPersistence, PersistenceBackend, PersistenceError};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

use crate::commands::{Command, PoolEntry, Report};
use crate::config::ServiceConfig;
use crate::feed;

/// Outcome of one command
#[derive(Debug, Clone, PartialEq)]
pub struct CommandOutput {
    pub report: Report,

    /// League state changed and needs saving
    pub mutated: bool,
}

/// Times a mutating command is replayed on a freshly loaded league when
/// another writer saved first
pub const MAX_SAVE_ATTEMPTS: usize = 3;

/// The configured league together with its storage
pub struct LeagueService {
    config: ServiceConfig,
    hub: LeagueHub,
    persistence: Arc<dyn PersistenceBackend>,

    /// Revision the in-memory league was loaded from or last saved as
    revision: AtomicU64,
}

impl LeagueService {
    /// Open the configured league from local snapshot files
    pub async fn open(config: ServiceConfig) -> Result<Self> {
        let mut backend = LocalPersistence::new(config.persistence.clone())
            .context("Failed to create persistence backend")?;
        backend.initialize().await.context("Failed to initialize persistence backend")?;

        Self::with_backend(config, Arc::new(backend)).await
    }

    /// Open the configured league from the latest snapshot in `persistence`,
    /// or start an empty one at the configured starting week
    pub async fn with_backend(config: ServiceConfig, persistence: Arc<dyn PersistenceBackend>) -> Result<Self> {
        let service = Self { config, hub: LeagueHub::new(), persistence, revision: AtomicU64::new(0) };
        service.reload().await?;
        Ok(service)
    }

    /// Replace the in-memory league with the latest saved revision
    async fn reload(&self) -> Result<()> {
        let name = self.config.league.name.as_str();

        match self
            .persistence
            .load_latest_snapshot(name)
            .await
            .with_context(|| format!("Failed to load league {name}"))?
        {
            Some(snapshot) => {
                info!(league = name, revision = snapshot.revision, "Restoring league from snapshot");
                self.hub.restore(name, snapshot.state);
                self.revision.store(snapshot.revision, Ordering::SeqCst);
            }
            None => {
                let week = self.config.league.starting_week;
                info!(league = name, week, "Starting new league");
                self.hub.remove(name);
                self.hub
                    .get_or_create(name)
                    .set_current_week(week)
                    .with_context(|| format!("Invalid starting week for league {name}"))?;
                self.revision.store(0, Ordering::SeqCst);
            }
        }

        Ok(())
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn league(&self) -> Arc<League> {
        self.hub.get_or_create(&self.config.league.name)
    }

    /// Revision the in-memory league is based on, 0 if never saved
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Write the current state as the revision after the one it was loaded
    /// from. Fails if another writer saved the league in the meantime.
    pub async fn save(&self) -> Result<LeagueSnapshot> {
        let name = self.config.league.name.as_str();
        self.commit().await.with_context(|| format!("Failed to save league {name}"))
    }

    async fn commit(&self) -> Result<LeagueSnapshot, PersistenceError> {
        let league = self.league();
        let snapshot = self
            .persistence
            .save_snapshot(league.name(), self.revision(), league.snapshot_state())
            .await?;
        self.revision.store(snapshot.revision, Ordering::SeqCst);
        Ok(snapshot)
    }

    /// Run one command, then save if it changed the league.
    ///
    /// When another writer saved first, the league is reloaded and the command
    /// replayed on top of that revision, up to [`MAX_SAVE_ATTEMPTS`] times.
    pub async fn run(&self, command: &Command) -> Result<CommandOutput> {
        let name = self.config.league.name.as_str();
        let mut attempt = 1;

        loop {
            let output = self.execute(command).await?;
            if !output.mutated {
                return Ok(output);
            }

            match self.commit().await {
                Ok(snapshot) => {
                    info!(league = %snapshot.league_name, revision = snapshot.revision, "League saved");
                    return Ok(output);
                }
                Err(e @ PersistenceError::Conflict { .. }) if attempt < MAX_SAVE_ATTEMPTS => {
                    warn!(league = name, attempt, error = %e, "League changed underneath, replaying command");
                    self.reload().await?;
                    attempt += 1;
                }
                Err(e) => return Err(e).with_context(|| format!("Failed to save league {name}")),
            }
        }
    }

    /// Run one command against the in-memory league without saving
    pub async fn execute(&self, command: &Command) -> Result<CommandOutput> {
        let league = self.league();
        let week_or_current = |week: &Option<Week>| week.unwrap_or_else(|| league.current_week());

        let report = match command {
            Command::AddManager { id, name, team } => {
                league.add_manager(id.as_str(), name.as_str(), team.as_str())?;
                let manager = league.manager(&ManagerId::from(id.as_str()));
                Report::message(format!(
                    "Added {id} ({})",
                    manager.map(|m| m.team_name).unwrap_or_default()
                ))
            }
            Command::RemoveManager { id } => {
                league.remove_manager(&ManagerId::from(id.as_str()))?;
                Report::message(format!("Removed {id}"))
            }
            Command::Managers => Report::Managers { managers: league.managers() },
            Command::ValidateRoster { file } => {
                let players = feed::load_roster(file).await?;
                match validate_roster(&players) {
                    Ok(()) => Report::RosterCheck { valid: true, error: None },
                    Err(e) => Report::RosterCheck { valid: false, error: Some(e.to_string()) },
                }
            }
            Command::SetLineup { manager, file, week } => {
                let week = week_or_current(week);
                let players = feed::load_roster(file).await?;
                league
                    .submit_lineup(&ManagerId::from(manager.as_str()), week, players)
                    .with_context(|| format!("Lineup for {manager} in week {week} was not saved"))?;
                Report::message(format!("Lineup saved for {manager} in week {week}"))
            }
            Command::Lineup { manager, week, stats } => {
                let week = week_or_current(week);
                let manager = ManagerId::from(manager.as_str());
                let lineup = league.lineup(&manager, week);
                let score = match (&lineup, stats) {
                    (Some(lineup), Some(path)) => {
                        let index = feed::load_stats_index(path).await?;
                        Some(compute_lineup_total(&lineup.roster, &index))
                    }
                    _ => None,
                };
                Report::Lineup { manager, week, lineup, score }
            }
            Command::Schedule { week } => {
                let week = week_or_current(week);
                Report::Matchups { week, matchups: league.schedule_week(week) }
            }
            Command::Matchups { week } => {
                let week = week_or_current(week);
                Report::Matchups { week, matchups: league.weekly_matchups(week) }
            }
            Command::Score { stats, week } => {
                let week = week_or_current(week);
                let index = feed::load_stats_index(stats).await?;
                let totals = league.post_weekly_scores(week, &index);
                Report::Scores { week, totals, matchups: league.weekly_matchups(week) }
            }
            Command::Standings => Report::Standings { standings: league.standings() },
            Command::PlayerPool { stats, limit } => {
                let records = feed::load_statistics(stats).await?;
                let players = rank_player_pool(&records)
                    .into_iter()
                    .take(limit.unwrap_or(usize::MAX))
                    .enumerate()
                    .map(|(i, r)| PoolEntry {
                        rank: i + 1,
                        name: r.name.clone(),
                        team_code: r.team_code.clone(),
                        position: r.position,
                        points: r.fantasy_points(),
                        goals: r.goals,
                        assists: r.assists,
                        match_label: r.match_label.clone(),
                    })
                    .collect();
                Report::PlayerPool { players }
            }
            Command::AdvanceWeek => Report::Week { week: league.advance_week()? },
        };

        Ok(CommandOutput { report, mutated: command.mutates() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use league_persistence::InMemoryPersistence;
    use std::path::PathBuf;
    use tempfile::TempDir;

    const ROSTER: &str = r#"[
        {"name": "GLUSAC Milan", "team_code": "NBG", "position": "goalkeeper"},
        {"name": "CUK Milos (C)", "team_code": "NBG", "position": "center"},
        {"name": "TRTOVIC Dusan", "team_code": "NBG", "position": "field"},
        {"name": "RASOVIC Strahinja", "team_code": "NBG", "position": "field"},
        {"name": "JAKSIC Nikola", "team_code": "NBG", "position": "field"},
        {"name": "VICO Vasilije", "team_code": "NBG", "position": "field"},
        {"name": "DOBUD Marko", "team_code": "NBG", "position": "field"},
        {"name": "PERKOVIC Luka", "team_code": "NBG", "position": "field"},
        {"name": "PAJKOVIC Dejan", "team_code": "NBG", "position": "gk"}
    ]"#;

    const STATS: &str = r#"[
        {"jersey": "5", "name": "CUK Milos (C)", "team_code": "NBG", "team_name": "VK Novi Beograd",
         "goals": 4, "position": "center", "match_id": "nbg_jsp", "match_label": "NBG vs JSP"},
        {"jersey": "1", "name": "GLUSAC Milan", "team_code": "NBG", "team_name": "VK Novi Beograd",
         "saves": 6, "position": "goalkeeper", "match_id": "nbg_jsp", "match_label": "NBG vs JSP"}
    ]"#;

    async fn service() -> LeagueService {
        let mut backend = InMemoryPersistence::with_default_config();
        backend.initialize().await.unwrap();
        LeagueService::with_backend(ServiceConfig::default(), Arc::new(backend)).await.unwrap()
    }

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_new_league_starts_at_configured_week() {
        let mut backend = InMemoryPersistence::with_default_config();
        backend.initialize().await.unwrap();
        let mut config = ServiceConfig::default();
        config.league.starting_week = 4;

        let service = LeagueService::with_backend(config, Arc::new(backend)).await.unwrap();
        assert_eq!(service.league().current_week(), 4);
    }

    #[tokio::test]
    async fn test_week_defaults_to_current() {
        let service = service().await;
        for id in ["ana", "ben", "cid"] {
            service
                .execute(&Command::AddManager { id: id.into(), name: id.into(), team: String::new() })
                .await
                .unwrap();
        }

        service.execute(&Command::AdvanceWeek).await.unwrap();
        let output = service.execute(&Command::Schedule { week: None }).await.unwrap();
        assert!(output.mutated);
        match output.report {
            Report::Matchups { week, matchups } => {
                assert_eq!(week, 2);
                assert_eq!(matchups.len(), 2);
                assert!(matchups[0].is_bye());
            }
            other => panic!("unexpected report: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_lineup_and_score_flow() {
        let dir = TempDir::new().unwrap();
        let roster = write(&dir, "roster.json", ROSTER);
        let stats = write(&dir, "stats.json", STATS);
        let service = service().await;

        service
            .execute(&Command::AddManager { id: "ana".into(), name: "Ana".into(), team: String::new() })
            .await
            .unwrap();
        service
            .execute(&Command::SetLineup { manager: "ana".into(), file: roster, week: Some(1) })
            .await
            .unwrap();

        let output = service
            .execute(&Command::Lineup { manager: "ana".into(), week: Some(1), stats: Some(stats.clone()) })
            .await
            .unwrap();
        match &output.report {
            Report::Lineup { lineup: Some(_), score: Some(score), .. } => assert_eq!(score.total, 32),
            other => panic!("unexpected report: {other:?}"),
        }
        assert!(!output.mutated);

        let output = service.execute(&Command::Score { stats, week: Some(1) }).await.unwrap();
        match output.report {
            Report::Scores { totals, .. } => assert_eq!(totals[&ManagerId::from("ana")], 32),
            other => panic!("unexpected report: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_invalid_roster_is_reported_not_stored() {
        let dir = TempDir::new().unwrap();
        let short = write(&dir, "short.json", r#"[{"name": "A", "team_code": "NBG", "position": "gk"}]"#);
        let service = service().await;

        let output = service.execute(&Command::ValidateRoster { file: short.clone() }).await.unwrap();
        assert!(output.report.is_failure());
        assert!(output.report.to_string().contains("Need exactly 9 players, got 1"));

        service
            .execute(&Command::AddManager { id: "ana".into(), name: "Ana".into(), team: String::new() })
            .await
            .unwrap();
        let err = service
            .execute(&Command::SetLineup { manager: "ana".into(), file: short, week: None })
            .await
            .unwrap_err();
        assert!(format!("{err:#}").contains("Need exactly 9 players"));
        assert!(service.league().lineup(&ManagerId::from("ana"), 1).is_none());
    }

    #[tokio::test]
    async fn test_player_pool_ranking() {
        let dir = TempDir::new().unwrap();
        let stats = write(&dir, "stats.json", STATS);
        let service = service().await;

        let output = service.execute(&Command::PlayerPool { stats, limit: Some(1) }).await.unwrap();
        match output.report {
            Report::PlayerPool { players } => {
                assert_eq!(players.len(), 1);
                assert_eq!(players[0].name, "CUK Milos (C)");
                assert_eq!(players[0].points, 20);
            }
            other => panic!("unexpected report: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_run_saves_only_mutations() {
        let mut backend = InMemoryPersistence::with_default_config();
        backend.initialize().await.unwrap();
        let backend = Arc::new(backend);
        let service = LeagueService::with_backend(ServiceConfig::default(), backend.clone()).await.unwrap();
        let name = service.config().league.name.clone();

        service.run(&Command::Standings).await.unwrap();
        assert_eq!(backend.snapshot_count(&name).await, 0);

        service
            .run(&Command::AddManager { id: "ana".into(), name: "Ana".into(), team: String::new() })
            .await
            .unwrap();
        assert_eq!(backend.snapshot_count(&name).await, 1);

        // A failed mutation saves nothing
        assert!(service.run(&Command::RemoveManager { id: "nobody".into() }).await.is_err());
        assert_eq!(backend.snapshot_count(&name).await, 1);

        let reopened = LeagueService::with_backend(ServiceConfig::default(), backend).await.unwrap();
        assert_eq!(reopened.league().managers().len(), 1);
        assert_eq!(reopened.revision(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_writers_keep_both_updates() {
        let dir = TempDir::new().unwrap();
        let mut config = ServiceConfig::default();
        config.persistence.data_dir = dir.path().to_path_buf();

        // Both open the same empty league before either saves
        let first = LeagueService::open(config.clone()).await.unwrap();
        let second = LeagueService::open(config.clone()).await.unwrap();

        first
            .run(&Command::AddManager { id: "ana".into(), name: "Ana".into(), team: String::new() })
            .await
            .unwrap();
        second
            .run(&Command::AddManager { id: "ben".into(), name: "Ben".into(), team: String::new() })
            .await
            .unwrap();
        assert_eq!(second.revision(), 2);

        let reopened = LeagueService::open(config).await.unwrap();
        let ids: Vec<String> = reopened.league().managers().iter().map(|m| m.id.to_string()).collect();
        assert_eq!(ids, vec!["ana", "ben"]);
    }

    #[tokio::test]
    async fn test_stale_save_is_rejected() {
        let mut backend = InMemoryPersistence::with_default_config();
        backend.initialize().await.unwrap();
        let backend = Arc::new(backend);

        let first = LeagueService::with_backend(ServiceConfig::default(), backend.clone()).await.unwrap();
        let second = LeagueService::with_backend(ServiceConfig::default(), backend.clone()).await.unwrap();

        first.execute(&Command::AdvanceWeek).await.unwrap();
        first.save().await.unwrap();
        second.execute(&Command::AdvanceWeek).await.unwrap();

        let err = second.save().await.unwrap_err();
        assert!(matches!(err.downcast_ref::<PersistenceError>(), Some(PersistenceError::Conflict { .. })));
        assert_eq!(backend.snapshot_count(&ServiceConfig::default().league.name).await, 1);
    }

    #[tokio::test]
    async fn test_replayed_command_can_fail_on_new_state() {
        let mut backend = InMemoryPersistence::with_default_config();
        backend.initialize().await.unwrap();
        let backend = Arc::new(backend);

        let first = LeagueService::with_backend(ServiceConfig::default(), backend.clone()).await.unwrap();
        let second = LeagueService::with_backend(ServiceConfig::default(), backend).await.unwrap();
        let add_ana = Command::AddManager { id: "ana".into(), name: "Ana".into(), team: String::new() };

        first.run(&add_ana).await.unwrap();
        let err = second.run(&add_ana).await.unwrap_err();
        assert!(format!("{err:#}").contains("ana"));
        assert_eq!(second.revision(), 1);
    }
}
