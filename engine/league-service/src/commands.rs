//! Command-line operations and their reports

use clap::Subcommand;
use league_engine::{
    Lineup, LineupScore, Manager, ManagerId, Matchup, Points, Position, Standing, Week,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// One logical league operation
#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Register a manager
    AddManager {
        id: String,
        name: String,

        /// Team name; defaults to "<name>'s Team"
        #[arg(long, default_value = "")]
        team: String,
    },

    /// Remove a manager
    RemoveManager { id: String },

    /// List managers in registration order
    Managers,

    /// Check a roster file without storing it
    ValidateRoster { file: PathBuf },

    /// Validate a roster file and store it as a manager's lineup
    SetLineup {
        manager: String,
        file: PathBuf,

        /// Defaults to the current week
        #[arg(long)]
        week: Option<Week>,
    },

    /// Show a manager's stored lineup
    Lineup {
        manager: String,

        #[arg(long)]
        week: Option<Week>,

        /// Statistics feed to score the lineup against
        #[arg(long)]
        stats: Option<PathBuf>,
    },

    /// Pair managers for a week, replacing that week's matchups
    Schedule {
        #[arg(long)]
        week: Option<Week>,
    },

    /// Show a week's matchups
    Matchups {
        #[arg(long)]
        week: Option<Week>,
    },

    /// Score every lineup for a week from a statistics feed and post the results
    Score {
        stats: PathBuf,

        #[arg(long)]
        week: Option<Week>,
    },

    /// Show the standings table
    Standings,

    /// Rank the players of a statistics feed by fantasy points
    PlayerPool {
        stats: PathBuf,

        /// Show at most this many players
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Move the league to the next week
    AdvanceWeek,
}

impl Command {
    /// Whether a successful run changes league state
    pub fn mutates(&self) -> bool {
        matches!(
            self,
            Command::AddManager { .. }
                | Command::RemoveManager { .. }
                | Command::SetLineup { .. }
                | Command::Schedule { .. }
                | Command::Score { .. }
                | Command::AdvanceWeek
        )
    }
}

/// A ranked row of the player pool
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PoolEntry {
    pub rank: usize,
    pub name: String,
    pub team_code: String,
    pub position: Position,
    pub points: Points,
    pub goals: u32,
    pub assists: u32,
    pub match_label: String,
}

/// Result of a command, printable as text or JSON
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum Report {
    Message { message: String },
    Managers { managers: Vec<Manager> },
    RosterCheck { valid: bool, error: Option<String> },
    Lineup {
        manager: ManagerId,
        week: Week,
        lineup: Option<Lineup>,
        score: Option<LineupScore>,
    },
    Matchups { week: Week, matchups: Vec<Matchup> },
    Scores { week: Week, totals: BTreeMap<ManagerId, Points>, matchups: Vec<Matchup> },
    Standings { standings: Vec<Standing> },
    PlayerPool { players: Vec<PoolEntry> },
    Week { week: Week },
}

impl Report {
    pub fn message(message: impl Into<String>) -> Self {
        Report::Message { message: message.into() }
    }

    /// A report describing a rejected input
    pub fn is_failure(&self) -> bool {
        matches!(self, Report::RosterCheck { valid: false, .. })
    }
}

fn write_matchup(f: &mut fmt::Formatter<'_>, m: &Matchup) -> fmt::Result {
    match &m.team2 {
        None => writeln!(f, "  {} (bye)", m.team1),
        Some(team2) if m.completed => {
            writeln!(f, "  {} {} - {} {}", m.team1, m.team1_score, m.team2_score, team2)
        }
        Some(team2) => writeln!(f, "  {} vs {}", m.team1, team2),
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Report::Message { message } => writeln!(f, "{message}"),
            Report::Managers { managers } => {
                if managers.is_empty() {
                    return writeln!(f, "No managers");
                }
                for m in managers {
                    writeln!(
                        f,
                        "{:<12} {:<20} {:<24} {}-{} {:>5} pts",
                        m.id, m.name, m.team_name, m.season.wins, m.season.losses, m.season.total_points
                    )?;
                }
                Ok(())
            }
            Report::RosterCheck { valid: true, .. } => writeln!(f, "Roster is valid"),
            Report::RosterCheck { error, .. } => {
                writeln!(f, "Invalid roster: {}", error.as_deref().unwrap_or("unknown error"))
            }
            Report::Lineup { manager, week, lineup: None, .. } => {
                writeln!(f, "No lineup for {manager} in week {week}")
            }
            Report::Lineup { manager, week, lineup: Some(lineup), score } => {
                writeln!(f, "{manager}, week {week} (set {})", lineup.set_at.format("%Y-%m-%d %H:%M"))?;
                for (slot, player) in lineup.roster.iter().enumerate() {
                    let role = if slot < league_engine::STARTERS { "starter" } else { "bench" };
                    let points = score
                        .as_ref()
                        .and_then(|s| s.breakdown.get(slot))
                        .map(|p| format!(" {:>4} pts", p.points))
                        .unwrap_or_default();
                    writeln!(
                        f,
                        "  {:<8} {:<28} {:<5} {:<10}{points}",
                        role, player.name, player.team_code, player.position
                    )?;
                }
                if let Some(score) = score {
                    writeln!(f, "  total {} pts", score.total)?;
                }
                Ok(())
            }
            Report::Matchups { week, matchups } => {
                writeln!(f, "Week {week}")?;
                if matchups.is_empty() {
                    writeln!(f, "  nothing scheduled")?;
                }
                matchups.iter().try_for_each(|m| write_matchup(f, m))
            }
            Report::Scores { week, totals, matchups } => {
                writeln!(f, "Week {week} scores")?;
                for (manager, points) in totals {
                    writeln!(f, "  {manager:<12} {points:>5}")?;
                }
                matchups.iter().try_for_each(|m| write_matchup(f, m))
            }
            Report::Standings { standings } => {
                writeln!(f, "{:>4} {:<12} {:<24} {:>3} {:>3} {:>6} {:>7}", "#", "manager", "team", "W", "L", "pct", "points")?;
                for s in standings {
                    writeln!(
                        f,
                        "{:>4} {:<12} {:<24} {:>3} {:>3} {:>6.3} {:>7}",
                        s.rank, s.manager_id, s.team_name, s.wins, s.losses, s.win_pct, s.total_points
                    )?;
                }
                Ok(())
            }
            Report::PlayerPool { players } => {
                for p in players {
                    writeln!(
                        f,
                        "{:>4} {:<28} {:<5} {:<10} {:>4} pts  ({})",
                        p.rank, p.name, p.team_code, p.position, p.points, p.match_label
                    )?;
                }
                Ok(())
            }
            Report::Week { week } => writeln!(f, "Current week: {week}"),
        }
    }
}
