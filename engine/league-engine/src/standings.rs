//! Standings calculation
//!
//! Wins and losses come only from completed matchups with two sides; ties
//! count for neither. Cumulative points sum every posted week.
//! Ordering: wins desc, points desc, manager id asc.

use crate::types::{Manager, ManagerId, Matchup, Points, SeasonRecord, Standing, Week};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};

/// Fold matchups and weekly scores into per-manager season records
pub fn season_records(
    managers: &[Manager],
    matchups: &[Matchup],
    scores_by_week: &BTreeMap<Week, BTreeMap<ManagerId, Points>>,
) -> HashMap<ManagerId, SeasonRecord> {
    let mut records: HashMap<ManagerId, SeasonRecord> =
        managers.iter().map(|m| (m.id.clone(), SeasonRecord::default())).collect();

    for week_scores in scores_by_week.values() {
        for (manager_id, points) in week_scores {
            if let Some(record) = records.get_mut(manager_id) {
                record.total_points += u64::from(*points);
            }
        }
    }

    for (winner, loser) in matchups.iter().filter_map(Matchup::decision) {
        if let Some(record) = records.get_mut(winner) {
            record.wins += 1;
        }
        if let Some(record) = records.get_mut(loser) {
            record.losses += 1;
        }
    }

    records
}

/// Win percentage with the denominator floored at 1
pub fn win_pct(wins: u32, losses: u32) -> f64 {
    f64::from(wins) / f64::from((wins + losses).max(1))
}

fn standing_order(a: &Standing, b: &Standing) -> Ordering {
    b.wins
        .cmp(&a.wins)
        .then_with(|| b.total_points.cmp(&a.total_points))
        .then_with(|| a.manager_id.cmp(&b.manager_id))
}

/// Ranked standings table
pub fn compute_standings(
    managers: &[Manager],
    matchups: &[Matchup],
    scores_by_week: &BTreeMap<Week, BTreeMap<ManagerId, Points>>,
) -> Vec<Standing> {
    let records = season_records(managers, matchups, scores_by_week);

    let mut standings: Vec<Standing> = managers
        .iter()
        .map(|manager| {
            let record = records.get(&manager.id).copied().unwrap_or_default();
            Standing {
                rank: 0,
                manager_id: manager.id.clone(),
                name: manager.name.clone(),
                team_name: manager.team_name.clone(),
                wins: record.wins,
                losses: record.losses,
                win_pct: win_pct(record.wins, record.losses),
                total_points: record.total_points,
            }
        })
        .collect();

    standings.sort_by(standing_order);
    for (index, standing) in standings.iter_mut().enumerate() {
        standing.rank = index + 1;
    }

    standings
}
