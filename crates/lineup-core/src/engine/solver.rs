use super::config::RosterRules;
use super::error::ScenarioFailure;
use crate::core::models::lineup::Slot;
use crate::core::models::player::{PlayerPool, Position};
use good_lp::solvers::microlp::microlp;
use good_lp::{
    Expression, ProblemVariables, ResolutionError, Solution, SolverModel, Variable, constraint,
    variable,
};
use std::collections::BTreeSet;
use tracing::{instrument, trace};

/// One scenario's selection problem: which players start, and who fills FLEX.
#[derive(Debug, Clone, Copy)]
pub struct SelectionProblem<'a> {
    pub pool: &'a PlayerPool,
    /// Objective coefficients, aligned with pool indices.
    pub projections: &'a [f64],
    pub roster: &'a RosterRules,
    pub include: &'a BTreeSet<usize>,
    pub exclude: &'a BTreeSet<usize>,
}

/// Raw solver output as pool indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Assignment {
    pub base: Vec<usize>,
    /// Normally exactly one entry; assembly tolerates more.
    pub flex: Vec<usize>,
}

/// The seam between the engine and a mixed-integer backend.
pub trait LineupSolver: Send + Sync {
    fn solve(&self, problem: &SelectionProblem<'_>) -> Result<Assignment, ScenarioFailure>;
}

/// Pure-Rust branch-and-bound backend.
#[derive(Debug, Clone, Copy, Default)]
pub struct MicrolpSolver;

const SELECTED: f64 = 0.5;

impl LineupSolver for MicrolpSolver {
    #[instrument(level = "trace", skip_all, name = "microlp_solve")]
    fn solve(&self, problem: &SelectionProblem<'_>) -> Result<Assignment, ScenarioFailure> {
        // A player that is both required and excluded can never be satisfied.
        if problem.include.iter().any(|i| problem.exclude.contains(i)) {
            return Err(ScenarioFailure::Infeasible);
        }

        let pool = problem.pool;
        let n = pool.len();

        let mut vars = ProblemVariables::new();
        let base: Vec<Variable> = (0..n).map(|_| vars.add(variable().binary())).collect();
        let flex: Vec<Option<Variable>> = pool
            .iter()
            .map(|p| {
                p.position
                    .is_flex_eligible()
                    .then(|| vars.add(variable().binary()))
            })
            .collect();

        let mut objective = Expression::with_capacity(2 * n);
        let mut salary = Expression::with_capacity(2 * n);
        for (idx, player) in pool.iter().enumerate() {
            let points = problem.projections[idx];
            let cost = player.salary as f64;
            objective.add_mul(points, base[idx]);
            salary.add_mul(cost, base[idx]);
            if let Some(f) = flex[idx] {
                objective.add_mul(points, f);
                salary.add_mul(cost, f);
            }
        }

        let cap = problem.roster.salary_cap as f64;
        let floor = problem.roster.min_salary as f64;
        let mut model = vars
            .maximise(objective)
            .using(microlp)
            .with(constraint!(salary.clone() <= cap))
            .with(constraint!(salary >= floor));

        for position in Position::ALL {
            let required = Slot::base_slots_for(position).len() as f64;
            let count: Expression = pool.indices_at(position).map(|i| base[i]).sum();
            model = model.with(constraint!(count == required));
        }

        let flex_count: Expression = flex.iter().flatten().copied().sum();
        model = model.with(constraint!(flex_count == 1.0));

        for (idx, f) in flex.iter().enumerate() {
            if let Some(f) = *f {
                model = model.with(constraint!(base[idx] + f <= 1.0));
            }
        }

        let selection = |idx: usize| -> Expression {
            match flex[idx] {
                Some(f) => base[idx] + f,
                None => Expression::from(base[idx]),
            }
        };
        for &idx in problem.include {
            model = model.with(constraint!(selection(idx) == 1.0));
        }
        for &idx in problem.exclude {
            model = model.with(constraint!(selection(idx) == 0.0));
        }
        let solution = match model.solve() {
            Ok(solution) => solution,
            Err(ResolutionError::Infeasible) => {
                trace!("Scenario infeasible.");
                return Err(ScenarioFailure::Infeasible);
            }
            Err(e) => return Err(ScenarioFailure::Solver(e.to_string())),
        };

        let mut assignment = Assignment::default();
        for idx in 0..n {
            if solution.value(base[idx]) > SELECTED {
                assignment.base.push(idx);
            }
            if let Some(f) = flex[idx] {
                if solution.value(f) > SELECTED {
                    assignment.flex.push(idx);
                }
            }
        }
        Ok(assignment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::player::Player;

    fn pool() -> PlayerPool {
        let mut players = vec![
            Player::new("QB1", Position::QB, "kc", 7000, 22.0),
            Player::new("QB2", Position::QB, "buf", 6500, 18.0),
            Player::new("TE1", Position::TE, "kc", 5000, 9.0),
            Player::new("TE2", Position::TE, "buf", 4000, 6.0),
            Player::new("DST1", Position::DST, "kc", 3000, 7.0),
        ];
        for i in 0..4 {
            players.push(Player::new(
                format!("RB{i}"),
                Position::RB,
                "kc",
                5500,
                12.0 - i as f64,
            ));
        }
        for i in 0..5 {
            players.push(Player::new(
                format!("WR{i}"),
                Position::WR,
                "buf",
                5000,
                14.0 - i as f64,
            ));
        }
        PlayerPool::new(players).unwrap()
    }

    fn solve(
        pool: &PlayerPool,
        include: BTreeSet<usize>,
        exclude: BTreeSet<usize>,
    ) -> Result<Assignment, ScenarioFailure> {
        let projections: Vec<f64> = pool.iter().map(|p| p.projected_points).collect();
        let roster = RosterRules::default();
        MicrolpSolver.solve(&SelectionProblem {
            pool,
            projections: &projections,
            roster: &roster,
            include: &include,
            exclude: &exclude,
        })
    }

    #[test]
    fn selects_full_roster_within_salary_bounds() {
        let pool = pool();
        let assignment = solve(&pool, BTreeSet::new(), BTreeSet::new()).unwrap();
        assert_eq!(assignment.base.len(), 8);
        assert_eq!(assignment.flex.len(), 1);
        assert!(!assignment.base.contains(&assignment.flex[0]));

        let salary: u32 = assignment
            .base
            .iter()
            .chain(&assignment.flex)
            .map(|&i| pool.get(i).unwrap().salary)
            .sum();
        assert!((45_000..=50_000).contains(&salary));
        assert!(assignment.base.contains(&pool.index_of("QB1").unwrap()));
    }

    #[test]
    fn honours_include_and_exclude() {
        let pool = pool();
        let qb2 = pool.index_of("QB2").unwrap();
        let wr0 = pool.index_of("WR0").unwrap();
        let assignment = solve(&pool, BTreeSet::from([qb2]), BTreeSet::from([wr0])).unwrap();
        assert!(assignment.base.contains(&qb2));
        assert!(!assignment.base.contains(&wr0));
        assert!(!assignment.flex.contains(&wr0));
    }

    #[test]
    fn overlapping_include_and_exclude_is_infeasible() {
        let pool = pool();
        let qb1 = pool.index_of("QB1").unwrap();
        assert_eq!(
            solve(&pool, BTreeSet::from([qb1]), BTreeSet::from([qb1])),
            Err(ScenarioFailure::Infeasible)
        );
    }

    #[test]
    fn salary_floor_can_make_problem_infeasible() {
        let players = vec![
            Player::new("QB", Position::QB, "kc", 3000, 20.0),
            Player::new("RB1", Position::RB, "kc", 3000, 10.0),
            Player::new("RB2", Position::RB, "kc", 3000, 10.0),
            Player::new("WR1", Position::WR, "kc", 3000, 10.0),
            Player::new("WR2", Position::WR, "kc", 3000, 10.0),
            Player::new("WR3", Position::WR, "kc", 3000, 10.0),
            Player::new("WR4", Position::WR, "kc", 3000, 10.0),
            Player::new("TE", Position::TE, "kc", 3000, 5.0),
            Player::new("DST", Position::DST, "kc", 3000, 5.0),
        ];
        let pool = PlayerPool::new(players).unwrap();
        assert_eq!(
            solve(&pool, BTreeSet::new(), BTreeSet::new()),
            Err(ScenarioFailure::Infeasible)
        );
    }
}
