//! Weekly matchup generation
//!
//! Managers are paired positionally in the order given: (0,1), (2,3), ...
//! With an odd count the last manager sits out on a bye. This is a single
//! week's pairing, not a season-long round robin.

use crate::types::{ManagerId, Matchup, Week};
use chrono::{DateTime, Utc};

/// Generate one week's matchups. Pure: the caller replaces any existing
/// matchups for `week` with the result.
pub fn schedule_week(manager_ids: &[ManagerId], week: Week, created_at: DateTime<Utc>) -> Vec<Matchup> {
    let mut matchups = Vec::with_capacity(manager_ids.len() / 2 + 1);

    let paired = match manager_ids.split_last() {
        Some((last, rest)) if manager_ids.len() % 2 == 1 => {
            matchups.push(Matchup::bye(week, last.clone(), created_at));
            rest
        }
        _ => manager_ids,
    };

    for pair in paired.chunks_exact(2) {
        matchups.push(Matchup::pairing(week, pair[0].clone(), pair[1].clone(), created_at));
    }

    matchups
}
