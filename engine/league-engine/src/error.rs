//! Error types for the league engine

use crate::types::{ManagerId, Position};
use thiserror::Error;

/// A roster rule that a candidate set of players broke.
///
/// Messages name the rule, the position involved and the observed count so a
/// manager can fix the selection without guessing.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    #[error("Need exactly {expected} players, got {found}")]
    WrongSize { expected: usize, found: usize },

    #[error("Starters need exactly {required} {position}(s), got {found}")]
    StarterQuotaViolation { position: Position, required: usize, found: usize },

    #[error("Maximum {cap} {position}(s) allowed, got {found}")]
    PositionCapExceeded { position: Position, cap: usize, found: usize },
}

/// Fieldless discriminant of [`RosterError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RosterErrorKind {
    WrongSize,
    StarterQuotaViolation,
    PositionCapExceeded,
}

impl RosterError {
    /// Which rule was violated
    pub fn kind(&self) -> RosterErrorKind {
        match self {
            RosterError::WrongSize { .. } => RosterErrorKind::WrongSize,
            RosterError::StarterQuotaViolation { .. } => RosterErrorKind::StarterQuotaViolation,
            RosterError::PositionCapExceeded { .. } => RosterErrorKind::PositionCapExceeded,
        }
    }
}

/// Errors returned by league write operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LeagueError {
    #[error("Invalid roster: {0}")]
    InvalidRoster(#[from] RosterError),

    #[error("Manager not found: {0}")]
    UnknownManager(ManagerId),

    #[error("Manager already exists: {0}")]
    ManagerAlreadyExists(ManagerId),

    /// Weeks start at 1 and stop at `Week::MAX`
    #[error("Week out of range: {0}")]
    WeekOutOfRange(u64),
}

/// Unrecognised position tag
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("Unknown position '{0}' (expected goalkeeper, center or field)")]
pub struct ParsePositionError(pub String);
