use super::player::{Player, Position};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

/// Number of roster slots in a classic lineup.
pub const ROSTER_SIZE: usize = 9;

/// A named roster slot. Declaration order is the upload column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Slot {
    QB,
    RB1,
    RB2,
    WR1,
    WR2,
    WR3,
    TE,
    FLEX,
    DST,
}

impl Slot {
    pub const ALL: [Slot; ROSTER_SIZE] = [
        Slot::QB,
        Slot::RB1,
        Slot::RB2,
        Slot::WR1,
        Slot::WR2,
        Slot::WR3,
        Slot::TE,
        Slot::FLEX,
        Slot::DST,
    ];

    /// The position a base slot accepts; `None` for FLEX.
    pub fn base_position(self) -> Option<Position> {
        match self {
            Slot::QB => Some(Position::QB),
            Slot::RB1 | Slot::RB2 => Some(Position::RB),
            Slot::WR1 | Slot::WR2 | Slot::WR3 => Some(Position::WR),
            Slot::TE => Some(Position::TE),
            Slot::DST => Some(Position::DST),
            Slot::FLEX => None,
        }
    }

    pub fn accepts(self, position: Position) -> bool {
        match self.base_position() {
            Some(p) => p == position,
            None => position.is_flex_eligible(),
        }
    }

    /// Base slots for a position, in fill order.
    pub fn base_slots_for(position: Position) -> &'static [Slot] {
        match position {
            Position::QB => &[Slot::QB],
            Position::RB => &[Slot::RB1, Slot::RB2],
            Position::WR => &[Slot::WR1, Slot::WR2, Slot::WR3],
            Position::TE => &[Slot::TE],
            Position::DST => &[Slot::DST],
        }
    }

    /// Column label used in upload files (`RB1` and `RB2` both become `RB`).
    pub fn upload_label(self) -> &'static str {
        match self {
            Slot::FLEX => "FLEX",
            other => other
                .base_position()
                .map(Position::as_str)
                .unwrap_or("FLEX"),
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A roster built from one solved scenario.
///
/// `score` is the sum of the players' projections *in the scenario that produced the lineup*;
/// it is what the search loop ranks candidates by. [`Lineup::projected_points`] gives the
/// unperturbed total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lineup {
    slots: BTreeMap<Slot, Player>,
    score: f64,
}

impl Lineup {
    pub fn new(slots: BTreeMap<Slot, Player>, score: f64) -> Self {
        Self { slots, score }
    }

    #[inline]
    pub fn slots(&self) -> &BTreeMap<Slot, Player> {
        &self.slots
    }

    #[inline]
    pub fn player(&self, slot: Slot) -> Option<&Player> {
        self.slots.get(&slot)
    }

    #[inline]
    pub fn score(&self) -> f64 {
        self.score
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.slots.values()
    }

    pub fn total_salary(&self) -> u32 {
        self.slots.values().map(|p| p.salary).sum()
    }

    pub fn projected_points(&self) -> f64 {
        self.slots.values().map(|p| p.projected_points).sum()
    }

    /// The set of player names, used to tell distinct rosters apart.
    pub fn player_set(&self) -> BTreeSet<&str> {
        self.slots.values().map(|p| p.name.as_str()).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.values().any(|p| p.name == name)
    }

    pub fn quarterback(&self) -> Option<&Player> {
        self.player(Slot::QB)
    }

    /// Team concentration: Σ n·(n−1) over per-team player counts, divided by roster size.
    pub fn correlation_score(&self) -> f64 {
        if self.slots.is_empty() {
            return 0.0;
        }
        let mut team_counts: HashMap<&str, usize> = HashMap::new();
        for player in self.slots.values() {
            *team_counts.entry(player.team.as_str()).or_default() += 1;
        }
        let pairs: usize = team_counts.values().map(|&n| n * (n - 1)).sum();
        pairs as f64 / self.slots.len() as f64
    }
}
