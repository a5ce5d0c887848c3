use super::config::RosterRules;
use super::solver::Assignment;
use crate::core::models::lineup::{Lineup, ROSTER_SIZE, Slot};
use crate::core::models::player::{PlayerPool, Position};
use std::collections::{BTreeMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum LineupViolation {
    #[error("expected 9 players, found {found}")]
    WrongSize { found: usize },
    #[error("slot {0} is empty")]
    MissingSlot(Slot),
    #[error("more {0} players selected than base slots")]
    SlotOverflow(Position),
    #[error("{name} ({position}) cannot fill slot {slot}")]
    IneligiblePlayer {
        name: String,
        position: Position,
        slot: Slot,
    },
    #[error("{0} appears more than once")]
    DuplicatePlayer(String),
    #[error("total salary {total} outside [{min}, {max}]")]
    SalaryOutOfRange { total: u32, min: u32, max: u32 },
    #[error("unknown player index {0}")]
    UnknownPlayer(usize),
}

/// Turns a solver assignment into a named roster and validates it.
///
/// When several FLEX candidates come back selected, the one with the highest scenario projection
/// is kept, ties going to the higher unperturbed projection. The lineup's score is the sum of its
/// players' scenario projections.
pub fn assemble(
    pool: &PlayerPool,
    projections: &[f64],
    assignment: &Assignment,
    roster: &RosterRules,
) -> Result<Lineup, LineupViolation> {
    let mut slots = BTreeMap::new();
    let mut score = 0.0;

    for &idx in &assignment.base {
        let player = pool.get(idx).ok_or(LineupViolation::UnknownPlayer(idx))?;
        let slot = Slot::base_slots_for(player.position)
            .iter()
            .copied()
            .find(|s| !slots.contains_key(s))
            .ok_or(LineupViolation::SlotOverflow(player.position))?;
        slots.insert(slot, player.clone());
        score += projections[idx];
    }

    let flex = assignment
        .flex
        .iter()
        .copied()
        .filter(|idx| !assignment.base.contains(idx))
        .filter_map(|idx| pool.get(idx).map(|p| (idx, p)))
        .filter(|(_, p)| p.position.is_flex_eligible())
        .max_by(|(a, pa), (b, pb)| {
            projections[*a]
                .total_cmp(&projections[*b])
                .then(pa.projected_points.total_cmp(&pb.projected_points))
        });
    let (flex_idx, flex_player) = flex.ok_or(LineupViolation::MissingSlot(Slot::FLEX))?;
    slots.insert(Slot::FLEX, flex_player.clone());
    score += projections[flex_idx];

    let lineup = Lineup::new(slots, score);
    validate_lineup(&lineup, roster)?;
    Ok(lineup)
}

/// Structural checks for a finished lineup. Safe to re-run on any accepted lineup.
pub fn validate_lineup(lineup: &Lineup, roster: &RosterRules) -> Result<(), LineupViolation> {
    if lineup.len() != ROSTER_SIZE {
        return Err(LineupViolation::WrongSize {
            found: lineup.len(),
        });
    }
    let mut names = HashSet::with_capacity(ROSTER_SIZE);
    for slot in Slot::ALL {
        let player = lineup
            .player(slot)
            .ok_or(LineupViolation::MissingSlot(slot))?;
        if !slot.accepts(player.position) {
            return Err(LineupViolation::IneligiblePlayer {
                name: player.name.clone(),
                position: player.position,
                slot,
            });
        }
        if !names.insert(player.name.as_str()) {
            return Err(LineupViolation::DuplicatePlayer(player.name.clone()));
        }
    }
    let total = lineup.total_salary();
    if total > roster.salary_cap || total < roster.min_salary {
        return Err(LineupViolation::SalaryOutOfRange {
            total,
            min: roster.min_salary,
            max: roster.salary_cap,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::player::Player;

    // Indices: 0 QB, 1-2 RB, 3-5 WR, 6 TE, 7 DST, 8 RB, 9 WR, 10 TE.
    fn pool() -> PlayerPool {
        PlayerPool::new(vec![
            Player::new("QB", Position::QB, "kc", 7000, 20.0),
            Player::new("RB1", Position::RB, "kc", 6000, 15.0),
            Player::new("RB2", Position::RB, "kc", 6000, 14.0),
            Player::new("WR1", Position::WR, "kc", 5500, 13.0),
            Player::new("WR2", Position::WR, "kc", 5500, 12.0),
            Player::new("WR3", Position::WR, "kc", 5500, 11.0),
            Player::new("TE", Position::TE, "kc", 4000, 8.0),
            Player::new("DST", Position::DST, "kc", 3000, 6.0),
            Player::new("RB3", Position::RB, "kc", 4500, 9.0),
            Player::new("WR4", Position::WR, "kc", 4500, 9.0),
            Player::new("TE2", Position::TE, "kc", 3000, 5.0),
        ])
        .unwrap()
    }

    fn raw(pool: &PlayerPool) -> Vec<f64> {
        pool.iter().map(|p| p.projected_points).collect()
    }

    #[test]
    fn assembles_slots_in_fill_order() {
        let pool = pool();
        let assignment = Assignment {
            base: (0..8).collect(),
            flex: vec![8],
        };
        let lineup = assemble(&pool, &raw(&pool), &assignment, &RosterRules::default()).unwrap();
        assert_eq!(lineup.player(Slot::RB1).unwrap().name, "RB1");
        assert_eq!(lineup.player(Slot::RB2).unwrap().name, "RB2");
        assert_eq!(lineup.player(Slot::WR3).unwrap().name, "WR3");
        assert_eq!(lineup.player(Slot::FLEX).unwrap().name, "RB3");
        assert_eq!(lineup.total_salary(), 47_000);
        assert!((lineup.score() - 108.0).abs() < 1e-9);
        assert!(validate_lineup(&lineup, &RosterRules::default()).is_ok());
    }

    #[test]
    fn multiple_flex_candidates_keep_the_best_with_raw_tiebreak() {
        let pool = pool();
        let mut projections = raw(&pool);
        // RB3 and WR4 tie in the scenario; TE2 is lower.
        projections[8] = 10.0;
        projections[9] = 10.0;
        let assignment = Assignment {
            base: (0..8).collect(),
            flex: vec![10, 8, 9],
        };
        let lineup = assemble(&pool, &projections, &assignment, &RosterRules::default()).unwrap();
        let flex = lineup.player(Slot::FLEX).unwrap();
        assert!(flex.name == "RB3" || flex.name == "WR4");

        let mut pool_players: Vec<Player> = pool.players().to_vec();
        pool_players[8].projected_points = 9.5;
        let pool = PlayerPool::new(pool_players).unwrap();
        let lineup = assemble(&pool, &projections, &assignment, &RosterRules::default()).unwrap();
        assert_eq!(lineup.player(Slot::FLEX).unwrap().name, "RB3");
    }

    #[test]
    fn overflowing_a_position_is_a_violation() {
        let pool = pool();
        let assignment = Assignment {
            base: vec![0, 1, 2, 8, 3, 4, 5, 6, 7],
            flex: vec![9],
        };
        assert_eq!(
            assemble(&pool, &raw(&pool), &assignment, &RosterRules::default()),
            Err(LineupViolation::SlotOverflow(Position::RB))
        );
    }

    #[test]
    fn missing_flex_or_salary_breach_is_a_violation() {
        let pool = pool();
        let no_flex = Assignment {
            base: (0..8).collect(),
            flex: vec![],
        };
        assert_eq!(
            assemble(&pool, &raw(&pool), &no_flex, &RosterRules::default()),
            Err(LineupViolation::MissingSlot(Slot::FLEX))
        );

        let strict = RosterRules {
            salary_cap: 46_000,
            min_salary: 45_000,
        };
        let assignment = Assignment {
            base: (0..8).collect(),
            flex: vec![8],
        };
        assert!(matches!(
            assemble(&pool, &raw(&pool), &assignment, &strict),
            Err(LineupViolation::SalaryOutOfRange { total: 47_000, .. })
        ));
    }

    #[test]
    fn validation_rejects_incomplete_lineups() {
        let mut slots = BTreeMap::new();
        slots.insert(
            Slot::QB,
            Player::new("QB", Position::QB, "kc", 7000, 20.0),
        );
        let lineup = Lineup::new(slots, 20.0);
        assert_eq!(
            validate_lineup(&lineup, &RosterRules::default()),
            Err(LineupViolation::WrongSize { found: 1 })
        );
    }
}
