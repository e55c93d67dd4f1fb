//! # League Engine
//!
//! Season-long head-to-head fantasy competition over water polo box scores.
//!
//! Managers submit a weekly roster of players, the engine checks it against the
//! positional quotas, pairs managers into weekly matchups, turns raw player
//! statistics into fantasy points and folds everything into a standings table.
//!
//! ## Components
//!
//! - **roster**: `validate_roster` / `validate_starters_only` and the validated [`Roster`] type
//! - **lineup**: per-manager weekly lineup history ([`LineupStore`])
//! - **scheduler**: positional weekly pairing with a bye for odd counts
//! - **scoring**: fantasy point rules, lineup totals and matchup score posting
//! - **standings**: wins/losses/points fold with a total ordering
//! - **league**: the [`League`] service object owning one league's state behind a lock
//! - **hub**: [`LeagueHub`], one independently locked [`League`] per league name
//!
//! ## Usage
//!
//! ```rust
//! use league_engine::{League, ManagerId};
//!
//! let league = League::new("Sunday League");
//! league.add_manager("ana", "Ana", "Sharks").unwrap();
//! league.add_manager("ben", "Ben", "").unwrap();
//!
//! let matchups = league.schedule_week(1);
//! assert_eq!(matchups.len(), 1);
//! assert_eq!(league.manager(&ManagerId::from("ben")).unwrap().team_name, "Ben's Team");
//! ```

pub mod error;
pub mod hub;
pub mod league;
pub mod lineup;
pub mod roster;
pub mod scheduler;
pub mod scoring;
pub mod standings;
pub mod stats;
pub mod types;

pub use error::{LeagueError, ParsePositionError, RosterError, RosterErrorKind};
pub use hub::LeagueHub;
pub use league::{League, LeagueState};
pub use lineup::{Lineup, LineupStore};
pub use roster::{validate_roster, validate_starters_only, PositionCounts, Roster};
pub use scheduler::schedule_week;
pub use scoring::{
    compute_fantasy_points, compute_lineup_total, post_matchup_scores, LineupScore, PlayerPoints,
    ScoringRules,
};
pub use standings::compute_standings;
pub use stats::{rank_player_pool, PlayerStatisticRecord, StatEntry, StatsIndex};
pub use types::{
    Manager, ManagerId, Matchup, PlayerKey, PlayerRef, Points, Position, SeasonRecord, Standing,
    Week,
};

/// Number of starters in a roster
pub const STARTERS: usize = 7;

/// Number of bench slots in a roster
pub const BENCH: usize = 2;

/// Total roster size (starters + bench)
pub const ROSTER_SIZE: usize = STARTERS + BENCH;

/// Week a fresh league starts in
pub const DEFAULT_STARTING_WEEK: Week = 1;

/// League name used when none is configured
pub const DEFAULT_LEAGUE_NAME: &str = "Fantasy Water Polo League";
