//! Box-score statistics supplied by the statistics feed

use crate::scoring::compute_fantasy_points;
use crate::types::{PlayerKey, Points, Position};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One player's counters for one match
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerStatisticRecord {
    /// Cap number; not unique across teams or matches
    pub jersey: String,

    /// Full name (e.g., "GLUSAC Milan")
    pub name: String,

    /// Team code (e.g., "NBG")
    pub team_code: String,

    /// Team full name (e.g., "VK Novi Beograd")
    pub team_name: String,

    #[serde(default)]
    pub goals: u32,
    #[serde(default)]
    pub assists: u32,
    #[serde(default)]
    pub steals: u32,
    #[serde(default)]
    pub blocks: u32,
    #[serde(default)]
    pub saves: u32,

    pub position: Position,

    /// Match identifier (e.g., "nbg_jsp")
    pub match_id: String,

    /// Human-readable match label (e.g., "NBG vs JSP")
    pub match_label: String,
}

impl PlayerStatisticRecord {
    pub fn key(&self) -> PlayerKey {
        PlayerKey::new(self.name.clone(), self.team_code.clone())
    }

    pub fn fantasy_points(&self) -> Points {
        compute_fantasy_points(self)
    }
}

/// Points for one player in the current scoring period
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatEntry {
    pub points: Points,
    pub match_label: String,
}

/// Fantasy points per player, keyed by (name, team code)
#[derive(Debug, Clone, Default)]
pub struct StatsIndex {
    entries: HashMap<PlayerKey, StatEntry>,
}

impl StatsIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an index from a feed. A later record for the same player replaces an earlier one.
    pub fn from_records<'a>(records: impl IntoIterator<Item = &'a PlayerStatisticRecord>) -> Self {
        let mut index = Self::new();
        for record in records {
            index.insert(record.key(), record.fantasy_points(), record.match_label.clone());
        }
        index
    }

    pub fn insert(&mut self, key: PlayerKey, points: Points, match_label: impl Into<String>) {
        self.entries.insert(key, StatEntry { points, match_label: match_label.into() });
    }

    pub fn get(&self, key: &PlayerKey) -> Option<&StatEntry> {
        self.entries.get(key)
    }

    /// Points for a player, 0 when the feed has no line for them
    pub fn points_for(&self, key: &PlayerKey) -> Points {
        self.get(key).map(|e| e.points).unwrap_or(0)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Order the player pool for selection: fantasy points, then goals, then assists, all descending
pub fn rank_player_pool(records: &[PlayerStatisticRecord]) -> Vec<&PlayerStatisticRecord> {
    let mut pool: Vec<&PlayerStatisticRecord> = records.iter().collect();
    pool.sort_by(|a, b| {
        b.fantasy_points()
            .cmp(&a.fantasy_points())
            .then_with(|| b.goals.cmp(&a.goals))
            .then_with(|| b.assists.cmp(&a.assists))
    });
    pool
}
