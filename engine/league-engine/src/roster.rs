//! Roster validation
//!
//! A roster is nine players: the first seven are starters and must be exactly
//! one goalkeeper, one center and five field players; the last two are bench
//! slots of any position. Across all nine, no position may exceed its cap.

use crate::error::RosterError;
use crate::types::{PlayerRef, Position};
use crate::{BENCH, ROSTER_SIZE, STARTERS};
use serde::{Deserialize, Serialize};

/// Per-position player counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PositionCounts {
    pub goalkeeper: usize,
    pub center: usize,
    pub field: usize,
}

impl PositionCounts {
    /// Exact starter requirement
    pub const STARTER_QUOTA: PositionCounts = PositionCounts { goalkeeper: 1, center: 1, field: 5 };

    /// Maximum per position across starters and bench
    pub const ROSTER_CAP: PositionCounts = PositionCounts { goalkeeper: 2, center: 2, field: 7 };

    pub fn tally<'a>(players: impl IntoIterator<Item = &'a PlayerRef>) -> Self {
        let mut counts = Self::default();
        for player in players {
            *counts.get_mut(player.position) += 1;
        }
        counts
    }

    pub fn get(&self, position: Position) -> usize {
        match position {
            Position::Goalkeeper => self.goalkeeper,
            Position::Center => self.center,
            Position::Field => self.field,
        }
    }

    fn get_mut(&mut self, position: Position) -> &mut usize {
        match position {
            Position::Goalkeeper => &mut self.goalkeeper,
            Position::Center => &mut self.center,
            Position::Field => &mut self.field,
        }
    }
}

/// Validate a full nine-player roster (7 starters followed by 2 bench)
pub fn validate_roster(players: &[PlayerRef]) -> Result<(), RosterError> {
    if players.len() != ROSTER_SIZE {
        return Err(RosterError::WrongSize { expected: ROSTER_SIZE, found: players.len() });
    }

    check_starter_quota(&players[..STARTERS])?;

    let totals = PositionCounts::tally(players);
    for position in Position::ALL {
        let cap = PositionCounts::ROSTER_CAP.get(position);
        let found = totals.get(position);
        if found > cap {
            return Err(RosterError::PositionCapExceeded { position, cap, found });
        }
    }

    Ok(())
}

/// Validate a starters-only selection, used before bench slots are picked
pub fn validate_starters_only(players: &[PlayerRef]) -> Result<(), RosterError> {
    if players.len() != STARTERS {
        return Err(RosterError::WrongSize { expected: STARTERS, found: players.len() });
    }

    check_starter_quota(players)
}

fn check_starter_quota(starters: &[PlayerRef]) -> Result<(), RosterError> {
    let counts = PositionCounts::tally(starters);
    for position in Position::ALL {
        let required = PositionCounts::STARTER_QUOTA.get(position);
        let found = counts.get(position);
        if found != required {
            return Err(RosterError::StarterQuotaViolation { position, required, found });
        }
    }
    Ok(())
}

/// A roster that has passed [`validate_roster`].
///
/// Deserialisation re-validates, so a stored roster can never come back
/// with the wrong shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PlayerRef>", into = "Vec<PlayerRef>")]
pub struct Roster {
    players: Vec<PlayerRef>,
}

impl Roster {
    pub fn new(players: Vec<PlayerRef>) -> Result<Self, RosterError> {
        validate_roster(&players)?;
        Ok(Self { players })
    }

    /// All nine players in slot order
    pub fn players(&self) -> &[PlayerRef] {
        &self.players
    }

    pub fn starters(&self) -> &[PlayerRef] {
        &self.players[..STARTERS]
    }

    pub fn bench(&self) -> &[PlayerRef] {
        &self.players[STARTERS..STARTERS + BENCH]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PlayerRef> {
        self.players.iter()
    }
}

impl TryFrom<Vec<PlayerRef>> for Roster {
    type Error = RosterError;

    fn try_from(players: Vec<PlayerRef>) -> Result<Self, Self::Error> {
        Roster::new(players)
    }
}

impl From<Roster> for Vec<PlayerRef> {
    fn from(roster: Roster) -> Self {
        roster.players
    }
}

impl<'a> IntoIterator for &'a Roster {
    type Item = &'a PlayerRef;
    type IntoIter = std::slice::Iter<'a, PlayerRef>;

    fn into_iter(self) -> Self::IntoIter {
        self.players.iter()
    }
}
