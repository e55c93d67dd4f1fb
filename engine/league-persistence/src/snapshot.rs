//! Snapshot files of the full league state
//!
//! Each league has its own directory of `snapshot_<revision:016x>.snapshot`
//! files. The highest revision is the current state. A save names the
//! revision its state was loaded from and commits the next one, so two
//! writers working from the same revision cannot both succeed.

use crate::config::SnapshotConfig;
use crate::error::{PersistenceError, Result};
use chrono::{DateTime, Utc};
use league_engine::{LeagueState, Week};
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// On-disk format version
pub const SNAPSHOT_VERSION: &str = "1.0";

const FILE_PREFIX: &str = "snapshot_";
const FILE_EXTENSION: &str = "snapshot";

/// A saved league
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueSnapshot {
    pub id: Uuid,

    /// When the snapshot was taken
    pub timestamp: DateTime<Utc>,

    /// Monotonic per league, starting at 1
    pub revision: u64,

    pub league_name: String,

    pub state: LeagueState,

    pub metadata: SnapshotMetadata,
}

/// Summary recorded alongside the state, readable without walking it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotMetadata {
    pub version: String,
    pub managers: usize,
    pub matchups: usize,
    pub current_week: Week,
}

impl LeagueSnapshot {
    pub fn new(league_name: impl Into<String>, revision: u64, state: LeagueState) -> Self {
        let metadata = SnapshotMetadata {
            version: SNAPSHOT_VERSION.to_string(),
            managers: state.managers.len(),
            matchups: state.matchups.len(),
            current_week: state.current_week,
        };

        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            revision,
            league_name: league_name.into(),
            state,
            metadata,
        }
    }

    pub fn file_name(&self) -> String {
        snapshot_file_name(self.revision)
    }
}

/// `snapshot_<revision:016x>.snapshot`
pub fn snapshot_file_name(revision: u64) -> String {
    format!("{FILE_PREFIX}{revision:016x}.{FILE_EXTENSION}")
}

/// Revision encoded in a snapshot file name, if the name is one of ours
pub fn revision_from_file_name(file_name: &str) -> Option<u64> {
    let revision = file_name.strip_prefix(FILE_PREFIX)?.strip_suffix(".snapshot")?;
    if revision.len() != 16 {
        return None;
    }
    u64::from_str_radix(revision, 16).ok()
}

/// Directory name for a league. Lowercase letters, digits and `-` are kept;
/// every other byte becomes `_xx`, so distinct names never share a directory.
pub fn league_dir_name(league_name: &str) -> String {
    let mut dir = String::with_capacity(league_name.len());
    for byte in league_name.bytes() {
        match byte {
            b'a'..=b'z' | b'0'..=b'9' | b'-' => dir.push(char::from(byte)),
            _ => dir.push_str(&format!("_{byte:02x}")),
        }
    }
    dir
}

/// A snapshot file found by name; the file itself is not read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnapshotFileInfo {
    pub path: PathBuf,
    pub size: u64,
    pub revision: u64,
}

/// Reads, writes and prunes snapshot files under one directory
#[derive(Debug, Clone)]
pub struct SnapshotManager {
    config: SnapshotConfig,
    snapshots_dir: PathBuf,
}

impl SnapshotManager {
    pub fn new(config: SnapshotConfig, snapshots_dir: PathBuf) -> Result<Self> {
        std::fs::create_dir_all(&snapshots_dir)?;
        Ok(Self { config, snapshots_dir })
    }

    pub fn snapshots_dir(&self) -> &Path {
        &self.snapshots_dir
    }

    pub fn league_dir(&self, league_name: &str) -> PathBuf {
        self.snapshots_dir.join(league_dir_name(league_name))
    }

    /// Commit `base_revision + 1` for a league, then prune old revisions.
    ///
    /// `base_revision` is the revision `state` was loaded from, 0 for a league
    /// that has never been saved. Fails with [`PersistenceError::Conflict`]
    /// when another writer got there first.
    pub async fn create_snapshot(
        &self,
        league_name: &str,
        base_revision: u64,
        state: LeagueState,
    ) -> Result<LeagueSnapshot> {
        let dir = self.league_dir(league_name);
        tokio::fs::create_dir_all(&dir).await?;

        let latest = self.latest_revision(league_name).await?.unwrap_or(0);
        if latest != base_revision {
            return Err(PersistenceError::conflict(league_name, base_revision, latest));
        }

        let revision = base_revision
            .checked_add(1)
            .ok_or_else(|| PersistenceError::invalid_operation("Revision counter exhausted"))?;
        let snapshot = LeagueSnapshot::new(league_name, revision, state);

        let path = self.write_snapshot_file(&dir, &snapshot).await?;
        info!(
            league = league_name,
            revision,
            snapshot_id = %snapshot.id,
            managers = snapshot.metadata.managers,
            path = ?path,
            "Created snapshot"
        );

        self.cleanup_old_snapshots(league_name).await?;
        Ok(snapshot)
    }

    /// Highest revision saved for a league. A latest file that cannot be read
    /// is an error, never a silent fallback to an older revision.
    pub async fn load_latest_snapshot(&self, league_name: &str) -> Result<Option<LeagueSnapshot>> {
        let snapshots = self.list_snapshots(league_name).await?;

        let Some(latest) = snapshots.last() else {
            info!(league = league_name, "No snapshots found, starting with clean state");
            return Ok(None);
        };

        let snapshot = self.load_snapshot(&latest.path).await?;
        if snapshot.league_name != league_name {
            return Err(PersistenceError::corruption(format!(
                "{} belongs to league {}",
                latest.path.display(),
                snapshot.league_name
            )));
        }

        info!(
            league = league_name,
            revision = snapshot.revision,
            snapshot_id = %snapshot.id,
            managers = snapshot.metadata.managers,
            "Loaded latest snapshot"
        );
        Ok(Some(snapshot))
    }

    /// Search every league for a snapshot id; unreadable files are skipped
    pub async fn load_snapshot_by_id(&self, snapshot_id: Uuid) -> Result<Option<LeagueSnapshot>> {
        let mut leagues = tokio::fs::read_dir(&self.snapshots_dir).await?;

        while let Some(entry) = leagues.next_entry().await? {
            if !entry.file_type().await?.is_dir() {
                continue;
            }
            for info in self.list_dir(&entry.path()).await? {
                match self.load_snapshot(&info.path).await {
                    Ok(snapshot) if snapshot.id == snapshot_id => return Ok(Some(snapshot)),
                    Ok(_) => {}
                    Err(e) => warn!(path = ?info.path, error = %e, "Skipping unreadable snapshot"),
                }
            }
        }

        Ok(None)
    }

    /// Snapshot files of one league, oldest revision first
    pub async fn list_snapshots(&self, league_name: &str) -> Result<Vec<SnapshotFileInfo>> {
        let dir = self.league_dir(league_name);
        if !tokio::fs::try_exists(&dir).await? {
            return Ok(Vec::new());
        }
        self.list_dir(&dir).await
    }

    pub async fn latest_revision(&self, league_name: &str) -> Result<Option<u64>> {
        Ok(self.list_snapshots(league_name).await?.last().map(|s| s.revision))
    }

    /// Remove the oldest revisions beyond `max_snapshots`; returns how many were removed
    pub async fn cleanup_old_snapshots(&self, league_name: &str) -> Result<usize> {
        let snapshots = self.list_snapshots(league_name).await?;
        if snapshots.len() <= self.config.max_snapshots {
            return Ok(0);
        }

        let excess = snapshots.len() - self.config.max_snapshots;
        for snapshot in snapshots.iter().take(excess) {
            tokio::fs::remove_file(&snapshot.path).await?;
            debug!(league = league_name, revision = snapshot.revision, "Removed old snapshot");
        }

        info!(league = league_name, removed = excess, kept = self.config.max_snapshots, "Pruned snapshots");
        Ok(excess)
    }

    async fn list_dir(&self, dir: &Path) -> Result<Vec<SnapshotFileInfo>> {
        let mut snapshots = Vec::new();
        let mut entries = tokio::fs::read_dir(dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let Some(revision) = entry.file_name().to_str().and_then(revision_from_file_name) else {
                continue;
            };
            let size = entry.metadata().await?.len();
            snapshots.push(SnapshotFileInfo { path: entry.path(), size, revision });
        }

        snapshots.sort_by_key(|s| s.revision);
        Ok(snapshots)
    }

    async fn write_snapshot_file(&self, dir: &Path, snapshot: &LeagueSnapshot) -> Result<PathBuf> {
        let bytes = if self.config.pretty {
            serde_json::to_vec_pretty(snapshot)?
        } else {
            serde_json::to_vec(snapshot)?
        };

        // Linking fails if the revision exists, so exactly one writer commits it
        let file_path = dir.join(snapshot.file_name());
        let tmp_path = dir.join(format!("{}.tmp", snapshot.id));
        tokio::fs::write(&tmp_path, bytes).await?;
        let linked = tokio::fs::hard_link(&tmp_path, &file_path).await;
        tokio::fs::remove_file(&tmp_path).await?;

        match linked {
            Ok(()) => Ok(file_path),
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Err(PersistenceError::conflict(
                snapshot.league_name.clone(),
                snapshot.revision - 1,
                snapshot.revision,
            )),
            Err(e) => Err(e.into()),
        }
    }

    async fn load_snapshot(&self, path: &Path) -> Result<LeagueSnapshot> {
        let bytes = tokio::fs::read(path).await?;
        let snapshot: LeagueSnapshot = serde_json::from_slice(&bytes)?;

        let named_revision = path
            .file_name()
            .and_then(|name| name.to_str())
            .and_then(revision_from_file_name);
        if named_revision != Some(snapshot.revision) {
            return Err(PersistenceError::corruption(format!(
                "{} holds revision {}",
                path.display(),
                snapshot.revision
            )));
        }

        Ok(snapshot)
    }
}
