//! Configuration for the persistence layer

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Configuration for the persistence layer
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistenceConfig {
    /// Base directory for persistence files
    pub data_dir: PathBuf,

    pub snapshot: SnapshotConfig,
}

/// Snapshot configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Snapshots kept on disk per league; older revisions are pruned after each save
    pub max_snapshots: usize,

    /// Write indented JSON
    pub pretty: bool,
}

impl Default for PersistenceConfig {
    fn default() -> Self {
        Self { data_dir: PathBuf::from("./data"), snapshot: SnapshotConfig::default() }
    }
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self { max_snapshots: 10, pretty: true }
    }
}

impl PersistenceConfig {
    /// Create a new configuration with custom data directory
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self { data_dir: data_dir.into(), ..Default::default() }
    }

    pub fn snapshots_dir(&self) -> PathBuf {
        self.data_dir.join("snapshots")
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.data_dir.as_os_str().is_empty() {
            return Err("data_dir must not be empty".to_string());
        }

        if self.snapshot.max_snapshots == 0 {
            return Err("Snapshot max_snapshots must be greater than 0".to_string());
        }

        Ok(())
    }
}
