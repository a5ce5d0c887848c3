use super::{format_lineup, write_upload};
use crate::cli::GenerateArgs;
use crate::config::builder::build_config;
use crate::error::{CliError, Result};
use crate::utils::progress::CliProgressHandler;
use lineforge::core::io::draftkings::SlateIdentifiers;
use lineforge::core::io::pool_csv::read_pool_from_path;
use lineforge::core::io::runs::{JsonRunStore, RunStore};
use lineforge::engine::progress::ProgressReporter;
use lineforge::engine::solver::MicrolpSolver;
use lineforge::workflows::generate::{self, GenerationReport, Outcome};
use std::path::Path;
use tracing::{info, warn};

const TOP_EXPOSURES: usize = 10;

pub fn run(args: GenerateArgs) -> Result<()> {
    info!("Merging configuration from file and CLI arguments...");
    let app = build_config(&args)?;

    info!("Loading player pool from {:?}", &app.pool_path);
    let pool = read_pool_from_path(&app.pool_path)?;

    let progress_handler = CliProgressHandler::new();
    let reporter = ProgressReporter::with_callback(progress_handler.get_callback());

    println!(
        "Generating {} lineup(s) from {} players...",
        app.generation.constraints.num_lineups,
        pool.len()
    );
    let report = generate::run(&pool, &app.generation, &MicrolpSolver, &reporter)?;

    print_report(&report);

    if let Some(dir) = &app.runs_dir {
        store_run(dir, &report);
    }

    if let Some(output) = &app.output_path {
        let ids = match &app.slate_path {
            Some(path) => SlateIdentifiers::from_path(path)?,
            None => SlateIdentifiers::from_pool(&pool),
        };
        let written = write_upload(&report.lineups, &ids, output)?;
        println!(
            "Upload file with {written} lineup(s) written to: {}",
            output.display()
        );
    }

    match report.outcome {
        Outcome::Halted { reason, .. } if report.lineups.is_empty() => {
            Err(CliError::Engine(reason))
        }
        _ => Ok(()),
    }
}

/// Persistence failures never discard the in-memory result.
fn store_run(dir: &Path, report: &GenerationReport) {
    let store = JsonRunStore::new(dir);
    match store.save(&report.to_run_record()) {
        Ok(()) => println!("Run {} stored in {}", report.run_id, dir.display()),
        Err(e) => {
            warn!(run_id = %report.run_id, error = %e, "Failed to store run.");
            println!("Warning: run could not be stored: {e}");
        }
    }
}

fn print_report(report: &GenerationReport) {
    for (idx, lineup) in report.lineups.iter().enumerate() {
        println!("{}", format_lineup(idx + 1, lineup));
    }

    if let Outcome::Halted {
        lineup_number,
        reason,
    } = &report.outcome
    {
        warn!(lineup_number, %reason, "Generation halted early.");
        println!(
            "Warning: generation halted at lineup {lineup_number} of {}: {reason}",
            report.requested
        );
    }

    let mut exposures: Vec<(&String, &f64)> = report.exposures.iter().collect();
    exposures.sort_by(|a, b| b.1.total_cmp(a.1).then_with(|| a.0.cmp(b.0)));
    if !exposures.is_empty() {
        println!("Top exposures:");
        for (name, exposure) in exposures.into_iter().take(TOP_EXPOSURES) {
            println!("  {name:<28} {:>5.1}%", exposure * 100.0);
        }
    }
    println!(
        "Generated {} of {} lineup(s) (seed {}, run {}).",
        report.lineups.len(),
        report.requested,
        report.seed,
        report.run_id
    );
}
