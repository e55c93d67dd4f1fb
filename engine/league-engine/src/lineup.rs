//! Weekly lineup history for a single manager

use crate::roster::Roster;
use crate::types::Week;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A roster as stored for one week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineup {
    pub roster: Roster,

    /// When the manager last set this week's roster
    pub set_at: DateTime<Utc>,
}

/// Lineups keyed by week. Weeks are never removed; setting a week again
/// replaces that week's roster.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineupStore {
    by_week: BTreeMap<Week, Lineup>,
}

impl LineupStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `roster` for `week`, returning the lineup it replaced
    pub fn set(&mut self, week: Week, roster: Roster, set_at: DateTime<Utc>) -> Option<Lineup> {
        self.by_week.insert(week, Lineup { roster, set_at })
    }

    pub fn get(&self, week: Week) -> Option<&Lineup> {
        self.by_week.get(&week)
    }

    /// Weeks with a stored lineup, ascending
    pub fn weeks(&self) -> impl Iterator<Item = Week> + '_ {
        self.by_week.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.by_week.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_week.is_empty()
    }
}
