//! Persistence backend trait and implementations

use crate::config::PersistenceConfig;
use crate::error::{PersistenceError, Result};
use crate::snapshot::{LeagueSnapshot, SnapshotManager};
use league_engine::LeagueState;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

/// Storage for league snapshots
#[async_trait::async_trait]
pub trait PersistenceBackend: Send + Sync {
    /// Prepare storage; calling it twice is harmless
    async fn initialize(&mut self) -> Result<()>;

    async fn shutdown(&mut self) -> Result<()>;

    /// Save `state` as revision `base_revision + 1`.
    ///
    /// `base_revision` is the revision the state was loaded from, 0 for a new
    /// league. Fails with [`PersistenceError::Conflict`] if the league has
    /// moved on since then.
    async fn save_snapshot(
        &self,
        league_name: &str,
        base_revision: u64,
        state: LeagueState,
    ) -> Result<LeagueSnapshot>;

    /// Highest revision saved for a league
    async fn load_latest_snapshot(&self, league_name: &str) -> Result<Option<LeagueSnapshot>>;

    async fn load_snapshot_by_id(&self, snapshot_id: Uuid) -> Result<Option<LeagueSnapshot>>;

    fn config(&self) -> &PersistenceConfig;

    fn data_dir(&self) -> &PathBuf {
        &self.config().data_dir
    }
}

/// Snapshot files under `<data_dir>/snapshots/<league>`
pub struct LocalPersistence {
    config: PersistenceConfig,
    snapshot_manager: SnapshotManager,
    initialized: bool,
}

impl LocalPersistence {
    pub fn new(config: PersistenceConfig) -> Result<Self> {
        config.validate().map_err(PersistenceError::config)?;

        let snapshot_manager = SnapshotManager::new(config.snapshot.clone(), config.snapshots_dir())?;

        Ok(Self { config, snapshot_manager, initialized: false })
    }

    pub fn with_default_config(data_dir: impl Into<PathBuf>) -> Result<Self> {
        Self::new(PersistenceConfig::new(data_dir))
    }

    pub fn snapshot_manager(&self) -> &SnapshotManager {
        &self.snapshot_manager
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(PersistenceError::not_initialized())
        }
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for LocalPersistence {
    async fn initialize(&mut self) -> Result<()> {
        if self.initialized {
            return Ok(());
        }

        tokio::fs::create_dir_all(self.config.snapshots_dir()).await?;
        self.initialized = true;

        tracing::info!(data_dir = ?self.config.data_dir, "Local persistence backend initialized");
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        if self.initialized {
            self.initialized = false;
            tracing::info!("Local persistence backend shutdown complete");
        }
        Ok(())
    }

    async fn save_snapshot(
        &self,
        league_name: &str,
        base_revision: u64,
        state: LeagueState,
    ) -> Result<LeagueSnapshot> {
        self.ensure_initialized()?;
        self.snapshot_manager.create_snapshot(league_name, base_revision, state).await
    }

    async fn load_latest_snapshot(&self, league_name: &str) -> Result<Option<LeagueSnapshot>> {
        self.ensure_initialized()?;
        self.snapshot_manager.load_latest_snapshot(league_name).await
    }

    async fn load_snapshot_by_id(&self, snapshot_id: Uuid) -> Result<Option<LeagueSnapshot>> {
        self.ensure_initialized()?;
        self.snapshot_manager.load_snapshot_by_id(snapshot_id).await
    }

    fn config(&self) -> &PersistenceConfig {
        &self.config
    }
}

/// In-memory persistence backend (for testing)
pub struct InMemoryPersistence {
    config: PersistenceConfig,
    snapshots: Arc<Mutex<HashMap<Uuid, LeagueSnapshot>>>,
    initialized: bool,
}

impl InMemoryPersistence {
    pub fn new(config: PersistenceConfig) -> Self {
        Self { config, snapshots: Arc::new(Mutex::new(HashMap::new())), initialized: false }
    }

    pub fn with_default_config() -> Self {
        Self::new(PersistenceConfig::default())
    }

    /// Number of snapshots held for a league
    pub async fn snapshot_count(&self, league_name: &str) -> usize {
        self.snapshots.lock().await.values().filter(|s| s.league_name == league_name).count()
    }

    fn ensure_initialized(&self) -> Result<()> {
        if self.initialized {
            Ok(())
        } else {
            Err(PersistenceError::not_initialized())
        }
    }
}

#[async_trait::async_trait]
impl PersistenceBackend for InMemoryPersistence {
    async fn initialize(&mut self) -> Result<()> {
        if !self.initialized {
            self.initialized = true;
            tracing::info!("In-memory persistence backend initialized");
        }
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        self.initialized = false;
        Ok(())
    }

    async fn save_snapshot(
        &self,
        league_name: &str,
        base_revision: u64,
        state: LeagueState,
    ) -> Result<LeagueSnapshot> {
        self.ensure_initialized()?;

        let mut snapshots = self.snapshots.lock().await;
        let latest = snapshots
            .values()
            .filter(|s| s.league_name == league_name)
            .map(|s| s.revision)
            .max()
            .unwrap_or(0);
        if latest != base_revision {
            return Err(PersistenceError::conflict(league_name, base_revision, latest));
        }

        let revision = base_revision + 1;
        let snapshot = LeagueSnapshot::new(league_name, revision, state);
        snapshots.insert(snapshot.id, snapshot.clone());

        // Same retention as the file backend
        let mut revisions: Vec<(u64, Uuid)> = snapshots
            .values()
            .filter(|s| s.league_name == league_name)
            .map(|s| (s.revision, s.id))
            .collect();
        revisions.sort_unstable();
        let excess = revisions.len().saturating_sub(self.config.snapshot.max_snapshots);
        for (_, id) in revisions.into_iter().take(excess) {
            snapshots.remove(&id);
        }

        Ok(snapshot)
    }

    async fn load_latest_snapshot(&self, league_name: &str) -> Result<Option<LeagueSnapshot>> {
        self.ensure_initialized()?;

        let snapshots = self.snapshots.lock().await;
        Ok(snapshots
            .values()
            .filter(|s| s.league_name == league_name)
            .max_by_key(|s| s.revision)
            .cloned())
    }

    async fn load_snapshot_by_id(&self, snapshot_id: Uuid) -> Result<Option<LeagueSnapshot>> {
        self.ensure_initialized()?;
        Ok(self.snapshots.lock().await.get(&snapshot_id).cloned())
    }

    fn config(&self) -> &PersistenceConfig {
        &self.config
    }
}
