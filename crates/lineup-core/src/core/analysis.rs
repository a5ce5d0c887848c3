//! Pre-run projection analysis on the unperturbed pool.
//!
//! The analysis finds value plays and QB/receiver stacks and turns them, together with the
//! caller's stack preferences and contest type, into a [`StrategyBoosts`] table that the scenario
//! generator applies as a `(1 + boost)` factor.

use crate::core::models::player::{Player, PlayerPool, Position};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Z-score above which a player is a value play.
pub const VALUE_ZSCORE_THRESHOLD: f64 = 1.0;
/// Points per $1000 above which a player is a value play.
pub const VALUE_POINTS_PER_THOUSAND: f64 = 1.5;
pub const MAX_BOOST: f64 = 0.15;

pub const STACK_SALARY_LIMIT: u32 = 15_000;
pub const STACK_RECEIVER_BONUS: f64 = 0.1;
pub const TOP_STACKS: usize = 5;
pub const STACK_QB_BOOST: f64 = 0.10;
pub const STACK_RECEIVER_BOOST: f64 = 0.08;
pub const PREFERRED_TEAM_BOOST: f64 = 0.05;

/// The contest style a run is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineupType {
    /// Head-to-head and 50/50 contests: favor high floors.
    Cash,
    #[default]
    Balanced,
    /// Tournaments: favor high ceilings.
    Gpp,
}

impl fmt::Display for LineupType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LineupType::Cash => "cash",
            LineupType::Balanced => "balanced",
            LineupType::Gpp => "gpp",
        })
    }
}

impl FromStr for LineupType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cash" => Ok(LineupType::Cash),
            "balanced" => Ok(LineupType::Balanced),
            "gpp" | "tournament" => Ok(LineupType::Gpp),
            other => Err(format!(
                "unknown lineup type '{other}' (expected cash, balanced or gpp)"
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValuePlay {
    pub name: String,
    pub position: Position,
    pub salary: u32,
    pub projected_points: f64,
    pub points_per_thousand: f64,
    pub points_zscore: f64,
}

impl ValuePlay {
    pub fn boost(&self) -> f64 {
        (self.points_zscore * 0.1).min(MAX_BOOST)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Stack {
    pub team: String,
    pub qb: String,
    pub receiver: String,
    pub salary: u32,
    pub projection: f64,
    /// Stack projection per $1000 of combined salary.
    pub value: f64,
}

/// Value plays grouped by position, best points-per-$1000 first.
pub fn value_plays(pool: &PlayerPool) -> BTreeMap<Position, Vec<ValuePlay>> {
    let mut result = BTreeMap::new();
    for position in Position::ALL {
        let players: Vec<&Player> = pool.iter().filter(|p| p.position == position).collect();
        let zscores = zscores(&players);
        let mut plays: Vec<ValuePlay> = players
            .iter()
            .zip(zscores)
            .filter(|(p, z)| {
                *z > VALUE_ZSCORE_THRESHOLD || p.points_per_thousand() > VALUE_POINTS_PER_THOUSAND
            })
            .map(|(p, z)| ValuePlay {
                name: p.name.clone(),
                position,
                salary: p.salary,
                projected_points: p.projected_points,
                points_per_thousand: p.points_per_thousand(),
                points_zscore: z,
            })
            .collect();
        plays.sort_by(|a, b| b.points_per_thousand.total_cmp(&a.points_per_thousand));
        if !plays.is_empty() {
            result.insert(position, plays);
        }
    }
    result
}

/// Position-relative z-scores of projected points, using the sample standard deviation.
fn zscores(players: &[&Player]) -> Vec<f64> {
    let n = players.len();
    if n < 2 {
        return vec![0.0; n];
    }
    let mean = players.iter().map(|p| p.projected_points).sum::<f64>() / n as f64;
    let var = players
        .iter()
        .map(|p| (p.projected_points - mean).powi(2))
        .sum::<f64>()
        / (n - 1) as f64;
    let std = var.sqrt();
    if std <= f64::EPSILON {
        return vec![0.0; n];
    }
    players
        .iter()
        .map(|p| (p.projected_points - mean) / std)
        .collect()
}

/// Affordable QB + same-team WR/TE pairs, best value first.
pub fn find_stacks(pool: &PlayerPool) -> Vec<Stack> {
    let mut stacks = Vec::new();
    for qb in pool.iter().filter(|p| p.position == Position::QB) {
        for receiver in pool.iter().filter(|p| {
            matches!(p.position, Position::WR | Position::TE) && p.team == qb.team
        }) {
            let salary = qb.salary + receiver.salary;
            if salary > STACK_SALARY_LIMIT {
                continue;
            }
            let projection = qb.projected_points
                + receiver.projected_points
                + STACK_RECEIVER_BONUS * receiver.projected_points;
            stacks.push(Stack {
                team: qb.team.clone(),
                qb: qb.name.clone(),
                receiver: receiver.name.clone(),
                salary,
                projection,
                value: projection / (salary as f64 / 1000.0),
            });
        }
    }
    stacks.sort_by(|a, b| b.value.total_cmp(&a.value));
    stacks
}

/// Top `top_n` players per position by projected points per salary dollar.
pub fn undervalued_by_position(pool: &PlayerPool, top_n: usize) -> BTreeMap<Position, Vec<&Player>> {
    Position::ALL
        .iter()
        .map(|&position| {
            let mut players: Vec<&Player> =
                pool.iter().filter(|p| p.position == position).collect();
            players.sort_by(|a, b| b.points_per_thousand().total_cmp(&a.points_per_thousand()));
            players.truncate(top_n);
            (position, players)
        })
        .filter(|(_, players)| !players.is_empty())
        .collect()
}

/// Per-player projection boosts. Boosts from different sources never add up; the largest wins.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StrategyBoosts {
    boosts: HashMap<String, f64>,
}

impl StrategyBoosts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the full table for a run.
    pub fn analyze(pool: &PlayerPool, stack_teams: &[String], lineup_type: LineupType) -> Self {
        let mut boosts = Self::new();

        for plays in value_plays(pool).values() {
            for play in plays {
                boosts.raise(&play.name, play.boost());
            }
        }

        for stack in find_stacks(pool).iter().take(TOP_STACKS) {
            boosts.raise(&stack.qb, STACK_QB_BOOST);
            boosts.raise(&stack.receiver, STACK_RECEIVER_BOOST);
        }

        let preferred: HashSet<String> = stack_teams.iter().map(|t| t.to_lowercase()).collect();
        if !preferred.is_empty() {
            for player in pool.iter().filter(|p| {
                preferred.contains(&p.team)
                    && matches!(p.position, Position::QB | Position::WR | Position::TE)
            }) {
                boosts.raise(&player.name, PREFERRED_TEAM_BOOST);
            }
        }

        for player in pool.iter() {
            if let Some(boost) = contest_boost(player, lineup_type) {
                boosts.raise(&player.name, boost);
            }
        }

        boosts
    }

    /// Records `boost` for `name` unless a larger boost is already present.
    pub fn raise(&mut self, name: &str, boost: f64) {
        if !boost.is_finite() {
            return;
        }
        let entry = self.boosts.entry(name.to_string()).or_insert(0.0);
        if boost > *entry {
            *entry = boost;
        }
    }

    pub fn get(&self, name: &str) -> f64 {
        self.boosts.get(name).copied().unwrap_or(0.0)
    }

    pub fn len(&self) -> usize {
        self.boosts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boosts.is_empty()
    }
}

/// Ceiling upside for tournaments, floor safety for cash games.
fn contest_boost(player: &Player, lineup_type: LineupType) -> Option<f64> {
    if player.projected_points <= 0.0 {
        return None;
    }
    let boost = match lineup_type {
        LineupType::Balanced => return None,
        LineupType::Gpp => {
            let upside = (player.ceiling? - player.projected_points) / player.projected_points;
            0.25 * upside
        }
        LineupType::Cash => {
            let safety = (player.floor? / player.projected_points).clamp(0.0, 1.0);
            0.25 * (safety - 0.5)
        }
    };
    (boost > 0.0).then(|| boost.min(MAX_BOOST))
}
