//! JSON inputs: statistics feeds and roster selections

use anyhow::{Context, Result};
use league_engine::{PlayerRef, PlayerStatisticRecord, StatsIndex};
use std::path::Path;
use tracing::info;

/// Load a statistics feed: a JSON array of player records in feed order
pub async fn load_statistics<P: AsRef<Path>>(path: P) -> Result<Vec<PlayerStatisticRecord>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read statistics feed: {path:?}"))?;
    let records: Vec<PlayerStatisticRecord> = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse statistics feed: {path:?}"))?;

    info!(path = ?path, records = records.len(), "Loaded statistics feed");
    Ok(records)
}

/// Load a feed and index it for scoring; later records for a player replace earlier ones
pub async fn load_stats_index<P: AsRef<Path>>(path: P) -> Result<StatsIndex> {
    let records = load_statistics(path).await?;
    Ok(StatsIndex::from_records(&records))
}

/// Load a roster selection: a JSON array of nine players, starters first.
///
/// The selection is not validated here.
pub async fn load_roster<P: AsRef<Path>>(path: P) -> Result<Vec<PlayerRef>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read roster: {path:?}"))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse roster: {path:?}"))
}
