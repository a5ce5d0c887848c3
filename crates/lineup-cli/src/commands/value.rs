use crate::cli::ValueArgs;
use crate::error::{CliError, Result};
use lineforge::core::analysis::{self, Stack, ValuePlay};
use lineforge::core::io::pool_csv::read_pool_from_path;
use lineforge::core::models::player::{Player, PlayerPool, Position};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use tracing::info;

const STACKS_SHOWN: usize = 10;

#[derive(Serialize)]
struct ValueSummary<'a> {
    value_plays: BTreeMap<Position, Vec<ValuePlay>>,
    stacks: Vec<Stack>,
    undervalued: BTreeMap<Position, Vec<&'a Player>>,
}

impl<'a> ValueSummary<'a> {
    fn analyze(pool: &'a PlayerPool, top_n: usize) -> Self {
        let mut stacks = analysis::find_stacks(pool);
        stacks.truncate(STACKS_SHOWN);
        Self {
            value_plays: analysis::value_plays(pool),
            stacks,
            undervalued: analysis::undervalued_by_position(pool, top_n),
        }
    }

    fn render(&self) -> String {
        let mut out = String::new();

        let _ = writeln!(out, "Value plays");
        for (position, plays) in &self.value_plays {
            for play in plays {
                let _ = writeln!(
                    out,
                    "  {:<4} {:<28} ${:>6} {:>6.2} pts/$1k  z={:>5.2}",
                    position.to_string(),
                    play.name,
                    play.salary,
                    play.points_per_thousand,
                    play.points_zscore
                );
            }
        }

        let _ = writeln!(out, "Stacks");
        for stack in &self.stacks {
            let _ = writeln!(
                out,
                "  {:<4} {} + {}  ${} {:.2} pts ({:.2} pts/$1k)",
                stack.team.to_uppercase(),
                stack.qb,
                stack.receiver,
                stack.salary,
                stack.projection,
                stack.value
            );
        }

        let _ = writeln!(out, "Undervalued");
        for (position, players) in &self.undervalued {
            let names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
            let _ = writeln!(out, "  {:<4} {}", position.to_string(), names.join(", "));
        }
        out
    }
}

pub fn run(args: ValueArgs) -> Result<()> {
    info!("Loading player pool from {:?}", &args.input);
    let pool = read_pool_from_path(&args.input)?;
    let summary = ValueSummary::analyze(&pool, args.top_n);

    if args.json {
        let json = serde_json::to_string_pretty(&summary)
            .map_err(|e| CliError::Other(anyhow::Error::new(e)))?;
        println!("{json}");
    } else {
        print!("{}", summary.render());
    }
    Ok(())
}
