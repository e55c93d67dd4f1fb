//! League service object
//!
//! [`LeagueState`] is the whole durable footprint of a league. [`League`]
//! owns one state behind a lock: every write holds the write lock for its
//! full read-modify-write, queries share the read lock.

use crate::error::LeagueError;
use crate::lineup::Lineup;
use crate::roster::Roster;
use crate::scheduler::schedule_week;
use crate::scoring::{compute_lineup_total, post_matchup_scores};
use crate::standings::{compute_standings, season_records};
use crate::stats::StatsIndex;
use crate::types::{Manager, ManagerId, Matchup, PlayerRef, Points, Standing, Week};
use crate::DEFAULT_STARTING_WEEK;
use chrono::Utc;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};

/// Managers, matchups and posted scores for one league
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueState {
    /// Managers in registration order
    pub managers: Vec<Manager>,

    pub matchups: Vec<Matchup>,

    /// Posted weekly totals: week -> manager -> points
    pub scores_by_week: BTreeMap<Week, BTreeMap<ManagerId, Points>>,

    pub current_week: Week,
}

impl Default for LeagueState {
    fn default() -> Self {
        Self {
            managers: Vec::new(),
            matchups: Vec::new(),
            scores_by_week: BTreeMap::new(),
            current_week: DEFAULT_STARTING_WEEK,
        }
    }
}

impl LeagueState {
    pub fn manager(&self, manager_id: &ManagerId) -> Option<&Manager> {
        self.managers.iter().find(|m| m.id == *manager_id)
    }

    fn manager_mut(&mut self, manager_id: &ManagerId) -> Option<&mut Manager> {
        self.managers.iter_mut().find(|m| m.id == *manager_id)
    }

    /// Manager ids in registration order
    pub fn manager_ids(&self) -> Vec<ManagerId> {
        self.managers.iter().map(|m| m.id.clone()).collect()
    }

    pub fn add_manager(&mut self, manager: Manager) -> Result<(), LeagueError> {
        if self.manager(&manager.id).is_some() {
            return Err(LeagueError::ManagerAlreadyExists(manager.id));
        }
        self.managers.push(manager);
        Ok(())
    }

    pub fn remove_manager(&mut self, manager_id: &ManagerId) -> Result<Manager, LeagueError> {
        let index = self
            .managers
            .iter()
            .position(|m| m.id == *manager_id)
            .ok_or_else(|| LeagueError::UnknownManager(manager_id.clone()))?;
        Ok(self.managers.remove(index))
    }

    pub fn set_lineup(&mut self, manager_id: &ManagerId, week: Week, roster: Roster) -> Result<(), LeagueError> {
        let manager = self
            .manager_mut(manager_id)
            .ok_or_else(|| LeagueError::UnknownManager(manager_id.clone()))?;
        manager.lineups.set(week, roster, Utc::now());
        Ok(())
    }

    pub fn lineup(&self, manager_id: &ManagerId, week: Week) -> Option<&Lineup> {
        self.manager(manager_id)?.lineups.get(week)
    }

    /// Replace `week`'s matchups with a fresh schedule
    pub fn schedule_week(&mut self, week: Week) -> Vec<Matchup> {
        let matchups = schedule_week(&self.manager_ids(), week, Utc::now());
        self.matchups.retain(|m| m.week != week);
        self.matchups.extend(matchups.iter().cloned());
        matchups
    }

    pub fn weekly_matchups(&self, week: Week) -> Vec<&Matchup> {
        self.matchups.iter().filter(|m| m.week == week).collect()
    }

    /// Score every manager's lineup for `week`, store the totals and post them to the week's matchups
    pub fn post_weekly_scores(&mut self, week: Week, stats: &StatsIndex) -> BTreeMap<ManagerId, Points> {
        let totals: BTreeMap<ManagerId, Points> = self
            .managers
            .iter()
            .map(|manager| {
                let total = manager
                    .lineups
                    .get(week)
                    .map(|lineup| compute_lineup_total(&lineup.roster, stats).total)
                    .unwrap_or(0);
                (manager.id.clone(), total)
            })
            .collect();

        let week_scores = self.scores_by_week.entry(week).or_default();
        week_scores.extend(totals.iter().map(|(id, points)| (id.clone(), *points)));
        let week_scores = week_scores.clone();

        let score_of = |id: &ManagerId| week_scores.get(id).copied().unwrap_or(0);
        for matchup in self.matchups.iter_mut().filter(|m| m.week == week) {
            let team1_total = score_of(&matchup.team1);
            let team2_total = matchup.team2.as_ref().map(&score_of).unwrap_or(0);
            *matchup = post_matchup_scores(matchup.clone(), team1_total, team2_total);
        }

        self.refresh_season_records();
        totals
    }

    fn refresh_season_records(&mut self) {
        let records = season_records(&self.managers, &self.matchups, &self.scores_by_week);
        for manager in &mut self.managers {
            if let Some(record) = records.get(&manager.id) {
                manager.season = *record;
            }
        }
    }

    pub fn standings(&self) -> Vec<Standing> {
        compute_standings(&self.managers, &self.matchups, &self.scores_by_week)
    }
}

/// One league's state with all mutation routed through a lock
#[derive(Debug)]
pub struct League {
    name: String,
    state: RwLock<LeagueState>,
}

impl League {
    /// Create an empty league starting at week 1
    pub fn new(name: impl Into<String>) -> Self {
        Self::from_state(name, LeagueState::default())
    }

    /// Restore a league from previously saved state
    pub fn from_state(name: impl Into<String>, state: LeagueState) -> Self {
        Self { name: name.into(), state: RwLock::new(state) }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Copy of the full state for saving
    pub fn snapshot_state(&self) -> LeagueState {
        self.state.read().clone()
    }

    /// Register a manager. An empty `team_name` becomes "<name>'s Team".
    pub fn add_manager(
        &self,
        id: impl Into<ManagerId>,
        name: impl Into<String>,
        team_name: impl Into<String>,
    ) -> Result<(), LeagueError> {
        let manager = Manager::new(id.into(), name, team_name);
        let manager_id = manager.id.clone();

        let result = self.state.write().add_manager(manager);
        match &result {
            Ok(()) => info!(league = %self.name, manager = %manager_id, "Manager added"),
            Err(e) => warn!(league = %self.name, "Rejected manager: {}", e),
        }
        result
    }

    pub fn remove_manager(&self, manager_id: &ManagerId) -> Result<(), LeagueError> {
        let removed = self.state.write().remove_manager(manager_id)?;
        info!(league = %self.name, manager = %removed.id, "Manager removed");
        Ok(())
    }

    pub fn manager(&self, manager_id: &ManagerId) -> Option<Manager> {
        self.state.read().manager(manager_id).cloned()
    }

    /// All managers in registration order
    pub fn managers(&self) -> Vec<Manager> {
        self.state.read().managers.clone()
    }

    /// Store an already validated roster for a week
    pub fn set_lineup(&self, manager_id: &ManagerId, week: Week, roster: Roster) -> Result<(), LeagueError> {
        let result = self.state.write().set_lineup(manager_id, week, roster);
        match &result {
            Ok(()) => info!(league = %self.name, manager = %manager_id, week, "Lineup saved"),
            Err(e) => warn!(league = %self.name, week, "Lineup not saved: {}", e),
        }
        result
    }

    /// Validate a candidate selection and store it
    pub fn submit_lineup(
        &self,
        manager_id: &ManagerId,
        week: Week,
        players: Vec<PlayerRef>,
    ) -> Result<(), LeagueError> {
        let roster = Roster::new(players).map_err(|e| {
            warn!(league = %self.name, manager = %manager_id, week, "Roster rejected: {}", e);
            LeagueError::InvalidRoster(e)
        })?;
        self.set_lineup(manager_id, week, roster)
    }

    pub fn lineup(&self, manager_id: &ManagerId, week: Week) -> Option<Lineup> {
        self.state.read().lineup(manager_id, week).cloned()
    }

    /// Every manager's stored lineup for `week`, in registration order
    pub fn all_lineups(&self, week: Week) -> Vec<(ManagerId, Lineup)> {
        let state = self.state.read();
        state
            .managers
            .iter()
            .filter_map(|m| m.lineups.get(week).map(|l| (m.id.clone(), l.clone())))
            .collect()
    }

    /// Schedule `week`, discarding any matchups already scheduled for it
    pub fn schedule_week(&self, week: Week) -> Vec<Matchup> {
        let matchups = self.state.write().schedule_week(week);
        info!(
            league = %self.name,
            week,
            matchups = matchups.len(),
            byes = matchups.iter().filter(|m| m.is_bye()).count(),
            "Week scheduled"
        );
        matchups
    }

    pub fn weekly_matchups(&self, week: Week) -> Vec<Matchup> {
        self.state.read().weekly_matchups(week).into_iter().cloned().collect()
    }

    /// First matchup in `week` that involves the manager
    pub fn manager_matchup(&self, manager_id: &ManagerId, week: Week) -> Option<Matchup> {
        let state = self.state.read();
        state.matchups.iter().find(|m| m.week == week && m.involves(manager_id)).cloned()
    }

    /// Compute and store every manager's total for `week`, then update that week's matchups
    pub fn post_weekly_scores(&self, week: Week, stats: &StatsIndex) -> BTreeMap<ManagerId, Points> {
        let totals = self.state.write().post_weekly_scores(week, stats);
        info!(league = %self.name, week, managers = totals.len(), "Weekly scores posted");
        totals
    }

    pub fn standings(&self) -> Vec<Standing> {
        self.state.read().standings()
    }

    pub fn current_week(&self) -> Week {
        self.state.read().current_week
    }

    /// Set the current week; week 0 is rejected
    pub fn set_current_week(&self, week: Week) -> Result<(), LeagueError> {
        if week == 0 {
            return Err(LeagueError::WeekOutOfRange(0));
        }
        self.state.write().current_week = week;
        info!(league = %self.name, week, "Current week set");
        Ok(())
    }

    /// Move to the next week and return it
    pub fn advance_week(&self) -> Result<Week, LeagueError> {
        let mut state = self.state.write();
        let next = state
            .current_week
            .checked_add(1)
            .ok_or(LeagueError::WeekOutOfRange(u64::from(state.current_week) + 1))?;
        state.current_week = next;
        info!(league = %self.name, week = next, "Advanced to next week");
        Ok(next)
    }
}
