use crate::core::analysis::StrategyBoosts;
use crate::core::io::runs::RunRecord;
use crate::core::models::lineup::Lineup;
use crate::core::models::player::PlayerPool;
use crate::engine::config::{GenerationConfig, ResolvedConstraints};
use crate::engine::error::EngineError;
use crate::engine::ledger::UsageLedger;
use crate::engine::progress::{Progress, ProgressReporter};
use crate::engine::scenario::ScenarioGenerator;
use crate::engine::search::{SearchContext, derive_seed, search};
use crate::engine::solver::LineupSolver;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

/// How a run ended. Both variants are normal terminal states.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Completed,
    /// Generation stopped at `lineup_number` (1-based); earlier lineups are kept.
    Halted {
        lineup_number: usize,
        reason: EngineError,
    },
}

#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub run_id: Uuid,
    pub seed: u64,
    pub requested: usize,
    pub lineups: Vec<Lineup>,
    pub outcome: Outcome,
    /// Realized share of lineups containing each player that appeared at least once.
    pub exposures: BTreeMap<String, f64>,
}

impl GenerationReport {
    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, Outcome::Completed)
    }

    pub fn correlation_scores(&self) -> Vec<f64> {
        self.lineups.iter().map(Lineup::correlation_score).collect()
    }

    pub fn to_run_record(&self) -> RunRecord {
        RunRecord {
            run_id: self.run_id,
            seed: self.seed,
            requested: self.requested,
            lineups: self.lineups.clone(),
            halted: match &self.outcome {
                Outcome::Completed => None,
                Outcome::Halted { reason, .. } => Some(reason.to_string()),
            },
        }
    }
}

/// Generates up to `num_lineups` lineups with exposure control.
///
/// Returns `Err` only for input or configuration problems found before solving. A lineup whose
/// search finds nothing ends the run with [`Outcome::Halted`] and the lineups built so far.
#[instrument(skip_all, name = "generation_workflow")]
pub fn run(
    pool: &PlayerPool,
    config: &GenerationConfig,
    solver: &dyn LineupSolver,
    reporter: &ProgressReporter,
) -> Result<GenerationReport, EngineError> {
    let constraints = &config.constraints;
    let (resolved, generator) = reporter.phase("Preparation", || {
        config.constraints.validate()?;
        config.search.validate()?;
        config.scenario.validate()?;
        config.roster.validate()?;

        let resolved = constraints.resolve(pool)?;
        let boosts =
            StrategyBoosts::analyze(pool, &constraints.stack_teams, constraints.lineup_type);
        let generator = ScenarioGenerator::new(pool, &boosts, &config.scenario)?;
        debug!(
            boosted = boosts.len(),
            excluded = resolved.exclude.len(),
            "Prepared scenario generator."
        );
        reporter.report(Progress::Message(format!(
            "{} players, {} excluded, {} strategy boosts",
            pool.len(),
            resolved.exclude.len(),
            boosts.len()
        )));
        Ok::<_, EngineError>((resolved, generator))
    })?;

    let seed = config.seed.unwrap_or_else(rand::random);
    let run_id = Uuid::new_v4();
    info!(
        %run_id,
        seed,
        players = pool.len(),
        lineups = constraints.num_lineups,
        qb_mode = %constraints.qb_diversity_mode,
        lineup_type = %constraints.lineup_type,
        "Starting lineup generation."
    );

    reporter.report(Progress::PhaseStart {
        name: "Generating Lineups",
    });
    reporter.report(Progress::RunStart {
        lineups: constraints.num_lineups as u64,
    });

    let mut ledger = UsageLedger::new();
    let mut lineups = Vec::with_capacity(constraints.num_lineups);
    let mut outcome = Outcome::Completed;

    for lineup_number in 1..=constraints.num_lineups {
        let exclude = exclusions_for(pool, &resolved, &ledger, config, lineup_number);
        let ctx = SearchContext {
            pool,
            generator: &generator,
            solver,
            roster: &config.roster,
            config: &config.search,
            include: &resolved.include,
            exclude: &exclude,
        };
        let summary = search(&ctx, derive_seed(seed, lineup_number as u64));

        match summary.best {
            Some(lineup) => {
                reporter.report(Progress::LineupAccepted {
                    lineup_number,
                    score: lineup.score(),
                });
                ledger.record(&lineup);
                lineups.push(lineup);
            }
            None => {
                let reason = EngineError::SearchExhausted {
                    lineup_number,
                    scenarios: summary.scenarios_run,
                };
                warn!(lineup_number, %reason, "Halting generation.");
                reporter.report(Progress::RunHalted {
                    lineup_number,
                    reason: reason.to_string(),
                });
                outcome = Outcome::Halted {
                    lineup_number,
                    reason,
                };
                break;
            }
        }
    }

    reporter.report(Progress::RunFinish);
    reporter.report(Progress::PhaseFinish);

    info!(
        generated = lineups.len(),
        requested = constraints.num_lineups,
        complete = matches!(outcome, Outcome::Completed),
        "Lineup generation finished."
    );

    Ok(GenerationReport {
        run_id,
        seed,
        requested: constraints.num_lineups,
        lineups,
        outcome,
        exposures: ledger.exposures(),
    })
}

/// Run-wide exclusions plus exposure and QB exclusions for this lineup. Required players are never
/// excluded by exposure rules.
fn exclusions_for(
    pool: &PlayerPool,
    resolved: &ResolvedConstraints,
    ledger: &UsageLedger,
    config: &GenerationConfig,
    lineup_number: usize,
) -> BTreeSet<usize> {
    let constraints = &config.constraints;
    let eligible_qbs: Vec<&str> = resolved
        .eligible_qbs
        .iter()
        .filter_map(|&idx| pool.get(idx).map(|p| p.name.as_str()))
        .collect();

    let by_exposure = ledger.exposure_exclusions(lineup_number, constraints.max_exposure);
    let by_qb = ledger.qb_exclusions(
        lineup_number,
        constraints.qb_diversity_mode,
        constraints.max_qb_exposure,
        &eligible_qbs,
    );

    let mut exclude = resolved.exclude.clone();
    exclude.extend(
        by_exposure
            .iter()
            .chain(&by_qb)
            .filter_map(|name| pool.index_of(name))
            .filter(|idx| !resolved.include.contains(idx)),
    );
    exclude
}
