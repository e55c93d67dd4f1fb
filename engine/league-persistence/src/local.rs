//! Local file-based persistence constructors

use crate::backend::LocalPersistence;
use crate::config::PersistenceConfig;
use crate::error::Result;

/// Local persistence in `data_dir` with default snapshot settings
pub fn create_local_persistence(data_dir: impl Into<std::path::PathBuf>) -> Result<LocalPersistence> {
    LocalPersistence::with_default_config(data_dir)
}

pub fn create_local_persistence_with_config(config: PersistenceConfig) -> Result<LocalPersistence> {
    LocalPersistence::new(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::PersistenceBackend;
    use crate::error::PersistenceError;
    use league_engine::{League, ManagerId, PlayerRef, Position, StatsIndex};
    use tempfile::TempDir;

    fn lineup(team: &str) -> Vec<PlayerRef> {
        let positions = [
            Position::Goalkeeper,
            Position::Center,
            Position::Field,
            Position::Field,
            Position::Field,
            Position::Field,
            Position::Field,
            Position::Field,
            Position::Goalkeeper,
        ];
        positions
            .iter()
            .enumerate()
            .map(|(i, position)| PlayerRef::new(format!("{team} {i}"), team, *position))
            .collect()
    }

    #[tokio::test]
    async fn test_local_persistence_initialization() {
        let temp_dir = TempDir::new().unwrap();

        let mut persistence = create_local_persistence(temp_dir.path()).unwrap();
        persistence.initialize().await.unwrap();

        assert_eq!(persistence.data_dir(), &temp_dir.path().to_path_buf());
        assert!(persistence.data_dir().join("snapshots").exists());
    }

    #[tokio::test]
    async fn test_uninitialized_backend_rejects_saves() {
        let temp_dir = TempDir::new().unwrap();
        let persistence = create_local_persistence(temp_dir.path()).unwrap();

        let err = persistence.save_snapshot("north", 0, Default::default()).await.unwrap_err();
        assert!(matches!(err, PersistenceError::InvalidOperation(_)));
    }

    #[test]
    fn test_invalid_config_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = PersistenceConfig::new(temp_dir.path());
        config.snapshot.max_snapshots = 0;

        assert!(matches!(
            create_local_persistence_with_config(config),
            Err(PersistenceError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_league_survives_restart() {
        let temp_dir = TempDir::new().unwrap();

        let league = League::new("north");
        league.add_manager("home", "Home", "").unwrap();
        league.add_manager("away", "Away", "Away Seven").unwrap();
        league.submit_lineup(&ManagerId::from("home"), 1, lineup("NBG")).unwrap();
        league.submit_lineup(&ManagerId::from("away"), 1, lineup("JSP")).unwrap();
        league.schedule_week(1);

        let mut stats = StatsIndex::new();
        stats.insert(lineup("NBG")[0].key(), 14, "NBG vs JSP");
        league.post_weekly_scores(1, &stats);
        league.advance_week().unwrap();

        {
            let mut persistence = create_local_persistence(temp_dir.path()).unwrap();
            persistence.initialize().await.unwrap();
            persistence.save_snapshot(league.name(), 0, league.snapshot_state()).await.unwrap();
            persistence.shutdown().await.unwrap();
        }

        let mut persistence = create_local_persistence(temp_dir.path()).unwrap();
        persistence.initialize().await.unwrap();
        let snapshot = persistence.load_latest_snapshot("north").await.unwrap().unwrap();
        assert_eq!(snapshot.revision, 1);
        assert_eq!(snapshot.metadata.current_week, 2);

        let restored = League::from_state(snapshot.league_name.clone(), snapshot.state);
        assert_eq!(restored.snapshot_state(), league.snapshot_state());
        assert_eq!(restored.standings(), league.standings());
        assert_eq!(restored.manager(&ManagerId::from("home")).unwrap().team_name, "Home's Team");
    }
}
