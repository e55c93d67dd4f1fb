//! # League Persistence
//!
//! Durable storage for fantasy leagues. Each save writes a complete snapshot
//! of a [`LeagueState`](league_engine::LeagueState) as a new revision; loading
//! picks the highest revision for the league. A save names the revision it
//! started from and fails with [`PersistenceError::Conflict`] if another
//! writer saved in between.
//!
//! - **PersistenceBackend**: trait shared by every storage backend
//! - **LocalPersistence**: JSON snapshot files under `<data_dir>/snapshots/<league>`
//! - **InMemoryPersistence**: same contract, kept in memory for tests
//!
//! ## Usage
//!
//! ```rust
//! use league_engine::League;
//! use league_persistence::{create_local_persistence, PersistenceBackend};
//! use tempfile::TempDir;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let temp_dir = TempDir::new()?;
//!     let mut persistence = create_local_persistence(temp_dir.path())?;
//!     persistence.initialize().await?;
//!
//!     let league = League::new("Adriatic");
//!     league.add_manager("m1", "Ana", "")?;
//!     persistence.save_snapshot(league.name(), 0, league.snapshot_state()).await?;
//!
//!     let snapshot = persistence.load_latest_snapshot("Adriatic").await?;
//!     assert_eq!(snapshot.map(|s| s.state.managers.len()), Some(1));
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod local;
pub mod snapshot;

pub use backend::{InMemoryPersistence, LocalPersistence, PersistenceBackend};
pub use config::{PersistenceConfig, SnapshotConfig};
pub use error::{PersistenceError, Result};
pub use local::{create_local_persistence, create_local_persistence_with_config};
pub use snapshot::{
    league_dir_name, LeagueSnapshot, SnapshotFileInfo, SnapshotManager, SnapshotMetadata,
};

pub use uuid::Uuid;
