//! Fantasy scoring
//!
//! Points = goals*5 + assists*3 + steals*2 + blocks*2 + saves*2.

use crate::roster::Roster;
use crate::stats::{PlayerStatisticRecord, StatsIndex};
use crate::types::{Matchup, Points, Position};
use serde::Serialize;
use tracing::debug;

/// Point weight per counted statistic
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringRules {
    pub goal: Points,
    pub assist: Points,
    pub steal: Points,
    pub block: Points,
    pub save: Points,
}

impl ScoringRules {
    /// The league's fixed rule set
    pub const STANDARD: ScoringRules = ScoringRules { goal: 5, assist: 3, steal: 2, block: 2, save: 2 };

    /// Score one box-score line. Saturates instead of overflowing.
    pub fn score(&self, record: &PlayerStatisticRecord) -> Points {
        [
            (record.goals, self.goal),
            (record.assists, self.assist),
            (record.steals, self.steal),
            (record.blocks, self.block),
            (record.saves, self.save),
        ]
        .into_iter()
        .fold(0, |total: Points, (count, weight)| total.saturating_add(count.saturating_mul(weight)))
    }
}

impl Default for ScoringRules {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Fantasy points for one statistic record under the standard rules
pub fn compute_fantasy_points(record: &PlayerStatisticRecord) -> Points {
    ScoringRules::STANDARD.score(record)
}

/// Points credited to one rostered player
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlayerPoints {
    pub name: String,
    pub team_code: String,
    pub position: Position,
    pub points: Points,

    /// Label of the match the points came from; `None` when the player has no stats
    pub match_label: Option<String>,
}

/// Weekly total for a roster with its per-player breakdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LineupScore {
    pub total: Points,
    pub breakdown: Vec<PlayerPoints>,
}

/// Sum fantasy points over every rostered player, bench included.
///
/// A player missing from the index contributes 0.
pub fn compute_lineup_total(roster: &Roster, stats: &StatsIndex) -> LineupScore {
    let mut score = LineupScore::default();

    for player in roster {
        let entry = stats.get(&player.key());
        let points = entry.map(|e| e.points).unwrap_or(0);

        if entry.is_none() {
            debug!("No statistics for {} ({}), scoring 0", player.name, player.team_code);
        }

        score.total = score.total.saturating_add(points);
        score.breakdown.push(PlayerPoints {
            name: player.name.clone(),
            team_code: player.team_code.clone(),
            position: player.position,
            points,
            match_label: entry.map(|e| e.match_label.clone()),
        });
    }

    score
}

/// Record both sides' totals on a matchup.
///
/// Only a matchup with a second side becomes completed here; byes are
/// completed when scheduled.
pub fn post_matchup_scores(mut matchup: Matchup, team1_total: Points, team2_total: Points) -> Matchup {
    matchup.team1_score = team1_total;
    if matchup.team2.is_some() {
        matchup.team2_score = team2_total;
        matchup.completed = true;
    }
    matchup
}
