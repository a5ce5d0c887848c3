pub mod export;
pub mod generate;
pub mod value;

use crate::error::Result;
use lineforge::core::io::draftkings::{SlateIdentifiers, build_export};
use lineforge::core::models::lineup::{Lineup, Slot};
use std::fmt::Write as _;
use std::path::Path;
use tracing::warn;

/// Writes the upload file and returns how many lineups it holds.
pub(crate) fn write_upload(
    lineups: &[Lineup],
    ids: &SlateIdentifiers,
    output: &Path,
) -> Result<usize> {
    let report = build_export(lineups, ids);
    for rejected in &report.rejected {
        warn!(lineup_number = rejected.lineup_number, "{rejected}");
        println!("Warning: {rejected}");
    }
    report.write_to_path(output)?;
    Ok(report.rows.len())
}

pub(crate) fn format_lineup(lineup_number: usize, lineup: &Lineup) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Lineup {lineup_number}: {:.2} projected pts, ${} salary, correlation {:.2}",
        lineup.projected_points(),
        lineup.total_salary(),
        lineup.correlation_score()
    );
    for slot in Slot::ALL {
        if let Some(player) = lineup.player(slot) {
            let _ = writeln!(
                out,
                "  {:<5} {:<28} {:<4} ${:>6} {:>7.2}",
                slot.to_string(),
                player.name,
                player.team.to_uppercase(),
                player.salary,
                player.projected_points
            );
        }
    }
    out
}
