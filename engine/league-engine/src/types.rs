use crate::error::ParsePositionError;
use crate::lineup::LineupStore;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Week number within a season (1-based)
pub type Week = u32;

/// Fantasy points for a single player or a single manager-week
pub type Points = u32;

/// Stable identifier of a manager within a league
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ManagerId(String);

impl ManagerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ManagerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}

impl From<&str> for ManagerId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ManagerId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Playing position of a water polo player.
///
/// Serialises lowercase; deserialises through [`FromStr`], so feeds and
/// rosters may use any case and the short tags `gk`, `c`, `f`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum Position {
    Goalkeeper,
    Center,
    Field,
}

impl Position {
    /// All positions, in the order rules are checked and reported
    pub const ALL: [Position; 3] = [Position::Goalkeeper, Position::Center, Position::Field];

    pub fn as_str(&self) -> &'static str {
        match self {
            Position::Goalkeeper => "goalkeeper",
            Position::Center => "center",
            Position::Field => "field",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl TryFrom<String> for Position {
    type Error = ParsePositionError;

    fn try_from(tag: String) -> Result<Self, Self::Error> {
        tag.parse()
    }
}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "goalkeeper" | "gk" => Ok(Position::Goalkeeper),
            "center" | "c" => Ok(Position::Center),
            "field" | "f" => Ok(Position::Field),
            _ => Err(ParsePositionError(s.to_string())),
        }
    }
}

/// Join key between rosters and the statistics feed.
///
/// Jersey numbers repeat across teams and matches, so players are identified
/// by (name, team code).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerKey {
    pub name: String,
    pub team_code: String,
}

impl PlayerKey {
    pub fn new(name: impl Into<String>, team_code: impl Into<String>) -> Self {
        Self { name: name.into(), team_code: team_code.into() }
    }
}

/// A player placed in a roster slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    /// Full name as printed in the box score (e.g., "CUK Milos (C)")
    pub name: String,

    /// Team code (e.g., "NBG")
    pub team_code: String,

    pub position: Position,
}

impl PlayerRef {
    pub fn new(name: impl Into<String>, team_code: impl Into<String>, position: Position) -> Self {
        Self { name: name.into(), team_code: team_code.into(), position }
    }

    pub fn key(&self) -> PlayerKey {
        PlayerKey::new(self.name.clone(), self.team_code.clone())
    }
}

/// Accumulated season totals for a manager
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonRecord {
    pub wins: u32,
    pub losses: u32,
    pub total_points: u64,
}

/// A league participant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Manager {
    pub id: ManagerId,
    pub name: String,
    pub team_name: String,

    /// Weekly lineups, keyed by week
    #[serde(default)]
    pub lineups: LineupStore,

    /// Mirrors the manager's standing as of the last posted week
    #[serde(default)]
    pub season: SeasonRecord,
}

impl Manager {
    /// Create a manager; an empty team name becomes "<name>'s Team"
    pub fn new(id: ManagerId, name: impl Into<String>, team_name: impl Into<String>) -> Self {
        let name = name.into();
        let mut team_name = team_name.into();
        if team_name.trim().is_empty() {
            team_name = format!("{name}'s Team");
        }

        Self { id, name, team_name, lineups: LineupStore::default(), season: SeasonRecord::default() }
    }
}

/// A head-to-head pairing for one week, or a bye when `team2` is absent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Matchup {
    pub week: Week,
    pub team1: ManagerId,
    pub team2: Option<ManagerId>,
    pub team1_score: Points,
    pub team2_score: Points,
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

impl Matchup {
    /// A pairing that has not been scored yet
    pub fn pairing(week: Week, team1: ManagerId, team2: ManagerId, created_at: DateTime<Utc>) -> Self {
        Self {
            week,
            team1,
            team2: Some(team2),
            team1_score: 0,
            team2_score: 0,
            completed: false,
            created_at,
        }
    }

    /// A bye; completed at creation and never decided
    pub fn bye(week: Week, team1: ManagerId, created_at: DateTime<Utc>) -> Self {
        Self {
            week,
            team1,
            team2: None,
            team1_score: 0,
            team2_score: 0,
            completed: true,
            created_at,
        }
    }

    pub fn is_bye(&self) -> bool {
        self.team2.is_none()
    }

    pub fn involves(&self, manager_id: &ManagerId) -> bool {
        self.team1 == *manager_id || self.team2.as_ref() == Some(manager_id)
    }

    /// Winner and loser of a completed, decided matchup. Byes and ties have no decision.
    pub fn decision(&self) -> Option<(&ManagerId, &ManagerId)> {
        if !self.completed {
            return None;
        }
        let team2 = self.team2.as_ref()?;

        match self.team1_score.cmp(&self.team2_score) {
            std::cmp::Ordering::Greater => Some((&self.team1, team2)),
            std::cmp::Ordering::Less => Some((team2, &self.team1)),
            std::cmp::Ordering::Equal => None,
        }
    }
}

/// One row of the standings table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Standing {
    /// 1-based rank
    pub rank: usize,
    pub manager_id: ManagerId,
    pub name: String,
    pub team_name: String,
    pub wins: u32,
    pub losses: u32,
    pub win_pct: f64,
    pub total_points: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_position_parsing() {
        assert_eq!("goalkeeper".parse::<Position>().unwrap(), Position::Goalkeeper);
        assert_eq!(" GK ".parse::<Position>().unwrap(), Position::Goalkeeper);
        assert_eq!("Center".parse::<Position>().unwrap(), Position::Center);
        assert_eq!("f".parse::<Position>().unwrap(), Position::Field);
        assert!("striker".parse::<Position>().is_err());
    }

    #[test]
    fn test_position_serde_any_case() {
        for (tag, expected) in [
            ("\"gk\"", Position::Goalkeeper),
            ("\"GOALKEEPER\"", Position::Goalkeeper),
            ("\"Gk\"", Position::Goalkeeper),
            ("\"CENTER\"", Position::Center),
            ("\"c\"", Position::Center),
            ("\"FIELD\"", Position::Field),
            ("\"Field\"", Position::Field),
        ] {
            assert_eq!(serde_json::from_str::<Position>(tag).unwrap(), expected, "{tag}");
        }
        assert!(serde_json::from_str::<Position>("\"striker\"").is_err());
        assert_eq!(serde_json::to_string(&Position::Center).unwrap(), "\"center\"");
    }

    #[test]
    fn test_default_team_name() {
        let manager = Manager::new(ManagerId::from("m1"), "Marta", "");
        assert_eq!(manager.team_name, "Marta's Team");

        let manager = Manager::new(ManagerId::from("m2"), "Ivo", "Split Sharks");
        assert_eq!(manager.team_name, "Split Sharks");
    }

    #[test]
    fn test_matchup_decision() {
        let now = Utc::now();
        let mut matchup = Matchup::pairing(1, "a".into(), "b".into(), now);
        assert_eq!(matchup.decision(), None);

        matchup.team1_score = 12;
        matchup.team2_score = 30;
        matchup.completed = true;
        let (winner, loser) = matchup.decision().unwrap();
        assert_eq!(winner.as_str(), "b");
        assert_eq!(loser.as_str(), "a");

        matchup.team1_score = 30;
        assert_eq!(matchup.decision(), None);

        let bye = Matchup::bye(1, "c".into(), now);
        assert!(bye.completed);
        assert!(bye.is_bye());
        assert_eq!(bye.decision(), None);
    }
}
