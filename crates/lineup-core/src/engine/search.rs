use super::assembler::assemble;
use super::config::{RosterRules, SearchConfig};
use super::error::ScenarioFailure;
use super::scenario::ScenarioGenerator;
use super::solver::{LineupSolver, SelectionProblem};
use crate::core::models::lineup::Lineup;
use crate::core::models::player::PlayerPool;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::{BTreeSet, HashSet};
use std::time::Instant;
use tracing::{debug, info, instrument, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Derives an independent child seed. Distinct `(seed, stream)` pairs give unrelated outputs.
pub fn derive_seed(seed: u64, stream: u64) -> u64 {
    let mut z = seed
        .wrapping_add(stream.wrapping_add(1).wrapping_mul(0x9E37_79B9_7F4A_7C15));
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    Converged,
    ScenarioCap,
    TimeBudget,
}

/// Inputs shared by every scenario of one lineup search.
pub struct SearchContext<'a> {
    pub pool: &'a PlayerPool,
    pub generator: &'a ScenarioGenerator,
    pub solver: &'a dyn LineupSolver,
    pub roster: &'a RosterRules,
    pub config: &'a SearchConfig,
    pub include: &'a BTreeSet<usize>,
    pub exclude: &'a BTreeSet<usize>,
}

#[derive(Debug, Clone)]
pub struct SearchSummary {
    /// Highest-scoring distinct lineup, first found on ties.
    pub best: Option<Lineup>,
    pub scenarios_run: usize,
    pub valid_lineups: usize,
    pub distinct_lineups: usize,
    pub infeasible: usize,
    pub invalid: usize,
    pub stop: StopReason,
}

impl SearchContext<'_> {
    fn run_scenario(&self, seed: u64) -> Result<Lineup, ScenarioFailure> {
        let mut rng = StdRng::seed_from_u64(seed);
        let scenario = self.generator.generate(&mut rng);
        let problem = SelectionProblem {
            pool: self.pool,
            projections: scenario.projections(),
            roster: self.roster,
            include: self.include,
            exclude: self.exclude,
        };
        let assignment = self.solver.solve(&problem)?;
        Ok(assemble(
            self.pool,
            scenario.projections(),
            &assignment,
            self.roster,
        )?)
    }
}

/// Convergence bookkeeping, fed one scenario result at a time in scenario order.
struct Tracker<'c> {
    config: &'c SearchConfig,
    best_score: f64,
    since_improvement: usize,
    valid: Vec<Lineup>,
    infeasible: usize,
    invalid: usize,
}

impl<'c> Tracker<'c> {
    fn new(config: &'c SearchConfig) -> Self {
        Self {
            config,
            best_score: 0.0,
            since_improvement: 0,
            valid: Vec::new(),
            infeasible: 0,
            invalid: 0,
        }
    }

    /// Returns `true` once the loop may stop early.
    fn observe(&mut self, scenario_idx: usize, result: Result<Lineup, ScenarioFailure>) -> bool {
        let lineup = match result {
            Ok(lineup) => lineup,
            Err(failure) => {
                match &failure {
                    ScenarioFailure::Infeasible => self.infeasible += 1,
                    _ => self.invalid += 1,
                }
                trace!(scenario = scenario_idx, %failure, "Scenario discarded.");
                return false;
            }
        };

        let score = lineup.score();
        if score > self.best_score * (1.0 + self.config.improvement_threshold) {
            debug!(scenario = scenario_idx, score, "New best score.");
            self.best_score = score;
            self.since_improvement = 0;
        } else {
            self.since_improvement += 1;
        }
        self.valid.push(lineup);

        scenario_idx >= self.config.min_scenarios
            && self.since_improvement >= self.config.patience
            && self.valid.len() >= self.config.min_valid_lineups
    }

    fn finish(self, scenarios_run: usize, stop: StopReason) -> SearchSummary {
        let valid_lineups = self.valid.len();
        let mut seen = HashSet::new();
        let mut distinct = 0;
        let mut best: Option<Lineup> = None;
        for lineup in self.valid {
            let key: BTreeSet<String> = lineup.player_set().into_iter().map(String::from).collect();
            if !seen.insert(key) {
                continue;
            }
            distinct += 1;
            if best.as_ref().is_none_or(|b| lineup.score() > b.score()) {
                best = Some(lineup);
            }
        }
        SearchSummary {
            best,
            scenarios_run,
            valid_lineups,
            distinct_lineups: distinct,
            infeasible: self.infeasible,
            invalid: self.invalid,
            stop,
        }
    }
}

/// Samples scenarios for one lineup until convergence, the scenario cap or the time budget.
///
/// The time budget covers the whole search for one lineup. It is checked before each batch and
/// after each folded scenario; a solve already in flight is never interrupted.
///
/// Scenario `k` always uses `derive_seed(lineup_seed, k)`, and batch results are folded in
/// scenario order, so the outcome does not depend on `batch_size`.
#[instrument(skip_all, name = "lineup_search")]
pub fn search(ctx: &SearchContext<'_>, lineup_seed: u64) -> SearchSummary {
    let config = ctx.config;
    let started = Instant::now();
    let mut tracker = Tracker::new(config);
    let mut scenarios_run = 0;
    let mut stop = StopReason::ScenarioCap;

    'batches: while scenarios_run < config.max_scenarios {
        if let Some(budget) = config.time_budget {
            if started.elapsed() >= budget {
                stop = StopReason::TimeBudget;
                break;
            }
        }

        let batch_end = (scenarios_run + config.batch_size).min(config.max_scenarios);
        let batch: Vec<usize> = (scenarios_run..batch_end).collect();

        #[cfg(not(feature = "parallel"))]
        let iterator = batch.iter();

        #[cfg(feature = "parallel")]
        let iterator = batch.par_iter();

        let results: Vec<Result<Lineup, ScenarioFailure>> = iterator
            .map(|&idx| ctx.run_scenario(derive_seed(lineup_seed, idx as u64)))
            .collect();

        for (idx, result) in batch.into_iter().zip(results) {
            scenarios_run = idx + 1;
            if tracker.observe(idx, result) {
                stop = StopReason::Converged;
                break 'batches;
            }
            if config
                .time_budget
                .is_some_and(|budget| started.elapsed() >= budget)
            {
                stop = StopReason::TimeBudget;
                break 'batches;
            }
        }
    }

    let summary = tracker.finish(scenarios_run, stop);
    info!(
        scenarios = summary.scenarios_run,
        valid = summary.valid_lineups,
        distinct = summary.distinct_lineups,
        infeasible = summary.infeasible,
        invalid = summary.invalid,
        stop = ?summary.stop,
        best_score = summary.best.as_ref().map(Lineup::score),
        "Lineup search finished."
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::analysis::StrategyBoosts;
    use crate::core::models::player::{Player, Position};
    use crate::engine::config::ScenarioConfig;
    use crate::engine::solver::{Assignment, MicrolpSolver};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    fn pool() -> PlayerPool {
        let mut players = vec![
            Player::new("QB1", Position::QB, "kc", 7000, 22.0),
            Player::new("QB2", Position::QB, "buf", 6800, 21.0),
            Player::new("TE1", Position::TE, "kc", 5000, 9.0),
            Player::new("TE2", Position::TE, "buf", 4500, 8.5),
            Player::new("DST1", Position::DST, "kc", 3000, 7.0),
            Player::new("DST2", Position::DST, "buf", 3000, 6.8),
        ];
        for i in 0..4 {
            players.push(Player::new(
                format!("RB{i}"),
                Position::RB,
                "kc",
                5500,
                12.0 - 0.3 * i as f64,
            ));
        }
        for i in 0..5 {
            players.push(Player::new(
                format!("WR{i}"),
                Position::WR,
                "buf",
                5000,
                14.0 - 0.3 * i as f64,
            ));
        }
        PlayerPool::new(players).unwrap()
    }

    /// Always reports infeasible and counts calls.
    struct NeverFeasible(AtomicUsize);

    impl LineupSolver for NeverFeasible {
        fn solve(&self, _: &SelectionProblem<'_>) -> Result<Assignment, ScenarioFailure> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Err(ScenarioFailure::Infeasible)
        }
    }

    fn run(
        pool: &PlayerPool,
        solver: &dyn LineupSolver,
        config: &SearchConfig,
        seed: u64,
    ) -> SearchSummary {
        let generator =
            ScenarioGenerator::new(pool, &StrategyBoosts::new(), &ScenarioConfig::default())
                .unwrap();
        let roster = RosterRules::default();
        let empty = BTreeSet::new();
        let ctx = SearchContext {
            pool,
            generator: &generator,
            solver,
            roster: &roster,
            config,
            include: &empty,
            exclude: &empty,
        };
        search(&ctx, seed)
    }

    #[test]
    fn derived_seeds_differ_per_stream() {
        let seeds: HashSet<u64> = (0..100).map(|i| derive_seed(7, i)).collect();
        assert_eq!(seeds.len(), 100);
        assert_eq!(derive_seed(7, 3), derive_seed(7, 3));
        assert_ne!(derive_seed(7, 3), derive_seed(8, 3));
    }

    #[test]
    fn finds_a_valid_lineup_and_stops_on_convergence() {
        let pool = pool();
        let summary = run(&pool, &MicrolpSolver, &SearchConfig::default(), 11);
        let best = summary.best.expect("a feasible pool yields a lineup");
        assert_eq!(best.len(), 9);
        assert!(summary.valid_lineups >= summary.distinct_lineups);
        assert!(summary.scenarios_run <= 100);
        if summary.stop == StopReason::Converged {
            assert!(summary.scenarios_run > 25);
            assert!(summary.valid_lineups >= 5);
        }
    }

    #[test]
    fn exhausts_the_scenario_cap_when_nothing_is_feasible() {
        let pool = pool();
        let solver = NeverFeasible(AtomicUsize::new(0));
        let config = SearchConfig {
            max_scenarios: 30,
            ..SearchConfig::default()
        };
        let summary = run(&pool, &solver, &config, 1);
        assert!(summary.best.is_none());
        assert_eq!(summary.scenarios_run, 30);
        assert_eq!(summary.infeasible, 30);
        assert_eq!(summary.stop, StopReason::ScenarioCap);
        assert_eq!(solver.0.load(Ordering::SeqCst), 30);
    }

    #[test]
    fn batch_size_does_not_change_the_result() {
        let pool = pool();
        let sequential = run(&pool, &MicrolpSolver, &SearchConfig::default(), 99);
        let batched = run(
            &pool,
            &MicrolpSolver,
            &SearchConfig {
                batch_size: 8,
                ..SearchConfig::default()
            },
            99,
        );
        assert_eq!(sequential.scenarios_run, batched.scenarios_run);
        assert_eq!(sequential.best, batched.best);
    }

    #[test]
    fn zero_time_budget_stops_before_any_scenario() {
        let pool = pool();
        let config = SearchConfig {
            time_budget: Some(Duration::ZERO),
            ..SearchConfig::default()
        };
        let summary = run(&pool, &MicrolpSolver, &config, 5);
        assert_eq!(summary.stop, StopReason::TimeBudget);
        assert_eq!(summary.scenarios_run, 0);
        assert!(summary.best.is_none());
    }

    /// Infeasible after a fixed delay.
    struct SlowInfeasible(Duration);

    impl LineupSolver for SlowInfeasible {
        fn solve(&self, _: &SelectionProblem<'_>) -> Result<Assignment, ScenarioFailure> {
            std::thread::sleep(self.0);
            Err(ScenarioFailure::Infeasible)
        }
    }

    #[test]
    fn time_budget_stops_inside_a_batch() {
        let pool = pool();
        let config = SearchConfig {
            max_scenarios: 40,
            batch_size: 40,
            time_budget: Some(Duration::from_millis(1)),
            ..SearchConfig::default()
        };
        let summary = run(&pool, &SlowInfeasible(Duration::from_millis(5)), &config, 2);
        assert_eq!(summary.stop, StopReason::TimeBudget);
        assert_eq!(summary.scenarios_run, 1);
        assert_eq!(summary.infeasible, 1);
    }

    #[test]
    fn tracker_counts_only_valid_scenarios_toward_patience() {
        let config = SearchConfig {
            min_scenarios: 0,
            patience: 2,
            min_valid_lineups: 1,
            ..SearchConfig::default()
        };
        let mut tracker = Tracker::new(&config);
        let lineup = |score: f64| {
            let mut slots = std::collections::BTreeMap::new();
            slots.insert(
                crate::core::models::lineup::Slot::QB,
                Player::new(format!("QB{score}"), Position::QB, "kc", 7000, score),
            );
            Lineup::new(slots, score)
        };
        assert!(!tracker.observe(0, Ok(lineup(100.0))));
        assert!(!tracker.observe(1, Err(ScenarioFailure::Infeasible)));
        assert!(!tracker.observe(2, Err(ScenarioFailure::Infeasible)));
        // 100.5 is within the 1% threshold: not an improvement.
        assert!(!tracker.observe(3, Ok(lineup(100.5))));
        assert!(tracker.observe(4, Ok(lineup(100.9))));

        let summary = tracker.finish(5, StopReason::Converged);
        assert_eq!(summary.valid_lineups, 3);
        assert_eq!(summary.infeasible, 2);
        assert_eq!(summary.best.unwrap().score(), 100.9);
    }
}
