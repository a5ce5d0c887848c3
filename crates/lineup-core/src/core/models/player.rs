use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Unrecognized position '{0}'. Expected one of QB, RB, WR, TE, DST.")]
pub struct ParsePositionError(pub String);

/// A roster position as listed on the slate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Position {
    QB,
    RB,
    WR,
    TE,
    DST,
}

impl Position {
    pub const ALL: [Position; 5] = [
        Position::QB,
        Position::RB,
        Position::WR,
        Position::TE,
        Position::DST,
    ];

    /// Whether a player at this position may fill the FLEX slot.
    #[inline]
    pub fn is_flex_eligible(self) -> bool {
        matches!(self, Position::RB | Position::WR | Position::TE)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Position::QB => "QB",
            Position::RB => "RB",
            Position::WR => "WR",
            Position::TE => "TE",
            Position::DST => "DST",
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Position {
    type Err = ParsePositionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "QB" => Ok(Position::QB),
            "RB" => Ok(Position::RB),
            "WR" => Ok(Position::WR),
            "TE" => Ok(Position::TE),
            "DST" | "D/ST" | "DEF" => Ok(Position::DST),
            _ => Err(ParsePositionError(s.to_string())),
        }
    }
}

/// One eligible player on the slate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub name: String,
    pub position: Position,
    /// Lower-cased team abbreviation.
    pub team: String,
    pub salary: u32,
    pub projected_points: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub floor: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ceiling: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub variance: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ownership_projection: Option<f64>,
    /// Site-specific identifier used for upload files, when the input carried one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_id: Option<String>,
}

impl Player {
    pub fn new(
        name: impl Into<String>,
        position: Position,
        team: impl Into<String>,
        salary: u32,
        projected_points: f64,
    ) -> Self {
        Self {
            name: name.into(),
            position,
            team: team.into().to_lowercase(),
            salary,
            projected_points,
            floor: None,
            ceiling: None,
            variance: None,
            ownership_projection: None,
            site_id: None,
        }
    }

    /// Projected points per $1000 of salary.
    pub fn points_per_thousand(&self) -> f64 {
        self.projected_points / (self.salary as f64 / 1000.0)
    }
}

#[derive(Debug, Error, PartialEq, Clone)]
pub enum PoolError {
    #[error("Player pool is empty")]
    Empty,
    #[error("Duplicate player name '{0}' in pool")]
    DuplicateName(String),
    #[error("Player '{name}' has a non-positive salary")]
    InvalidSalary { name: String },
    #[error("Player '{name}' has an invalid projection: {value}")]
    InvalidProjection { name: String, value: f64 },
}

/// The immutable per-run player pool, indexed by player name.
#[derive(Debug, Clone)]
pub struct PlayerPool {
    players: Vec<Player>,
    by_name: HashMap<String, usize>,
}

impl PlayerPool {
    pub fn new(players: Vec<Player>) -> Result<Self, PoolError> {
        if players.is_empty() {
            return Err(PoolError::Empty);
        }
        let mut by_name = HashMap::with_capacity(players.len());
        for (idx, player) in players.iter().enumerate() {
            if player.salary == 0 {
                return Err(PoolError::InvalidSalary {
                    name: player.name.clone(),
                });
            }
            if !player.projected_points.is_finite() || player.projected_points < 0.0 {
                return Err(PoolError::InvalidProjection {
                    name: player.name.clone(),
                    value: player.projected_points,
                });
            }
            if by_name.insert(player.name.clone(), idx).is_some() {
                return Err(PoolError::DuplicateName(player.name.clone()));
            }
        }
        Ok(Self { players, by_name })
    }

    #[inline]
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.players.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    #[inline]
    pub fn get(&self, idx: usize) -> Option<&Player> {
        self.players.get(idx)
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.by_name.get(name).copied()
    }

    pub fn by_name(&self, name: &str) -> Option<&Player> {
        self.index_of(name).map(|idx| &self.players[idx])
    }

    pub fn iter(&self) -> impl Iterator<Item = &Player> {
        self.players.iter()
    }

    /// Indices of all players at `position`, in pool order.
    pub fn indices_at(&self, position: Position) -> impl Iterator<Item = usize> + '_ {
        self.players
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.position == position)
            .map(|(idx, _)| idx)
    }

    pub fn has_team(&self, team: &str) -> bool {
        let team = team.to_lowercase();
        self.players.iter().any(|p| p.team == team)
    }
}
