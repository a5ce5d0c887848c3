use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

const HELP_TEMPLATE: &str = "\
{before-help}{name} {version}
{author-with-newline}{about-with-newline}
{usage-heading} {usage}

{all-args}{after-help}
";

#[derive(Parser, Debug)]
#[command(
    author = "Lineforge Contributors",
    version,
    about = "Lineforge CLI - Generate diversified DraftKings NFL classic lineups from player projections.",
    help_template = HELP_TEMPLATE,
)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity level (-v for INFO, -vv for DEBUG, -vvv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except for errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Write logs to a specified file in addition to the console output
    #[arg(long, global = true, value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Set the number of threads used to solve scenario batches.
    /// Defaults to the number of available logical cores.
    #[arg(short = 'j', long, global = true, value_name = "NUM")]
    pub threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate a set of lineups from a player pool.
    Generate(GenerateArgs),
    /// Re-export a stored run as a DraftKings upload file.
    Export(ExportArgs),
    /// Show value plays, stacks and undervalued players for a player pool.
    Value(ValueArgs),
}

/// Arguments for the `generate` subcommand.
#[derive(Args, Debug, Default)]
pub struct GenerateArgs {
    // --- Core Arguments ---
    /// Path to the player pool CSV (name, position, team, salary, projected_points).
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Path to a configuration file in TOML format.
    #[arg(short, long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Write a DraftKings upload CSV to this path.
    #[arg(short, long, value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Slate CSV with player identifiers for the upload file.
    /// Defaults to the identifiers carried by the player pool.
    #[arg(long, value_name = "PATH")]
    pub slate: Option<PathBuf>,

    // --- Constraint Overrides ---
    /// Number of lineups to generate.
    #[arg(short, long, value_name = "INT")]
    pub num_lineups: Option<usize>,

    /// Player that must appear in every lineup. Repeat or separate with commas.
    #[arg(long = "must-include", value_name = "NAME", value_delimiter = ',')]
    pub must_include: Vec<String>,

    /// Player excluded from every lineup. Repeat or separate with commas.
    #[arg(long = "avoid-player", value_name = "NAME", value_delimiter = ',')]
    pub avoid_players: Vec<String>,

    /// Team whose players are excluded from every lineup.
    #[arg(long = "avoid-team", value_name = "TEAM", value_delimiter = ',')]
    pub avoid_teams: Vec<String>,

    /// Team whose QB and receivers get a projection boost.
    #[arg(long = "stack-team", value_name = "TEAM", value_delimiter = ',')]
    pub stack_teams: Vec<String>,

    /// Maximum share of lineups any single player may appear in.
    #[arg(long, value_name = "FLOAT")]
    pub max_exposure: Option<f64>,

    /// Maximum share of lineups a single quarterback may appear in ('limit' mode).
    #[arg(long, value_name = "FLOAT")]
    pub max_qb_exposure: Option<f64>,

    /// Quarterback diversity mode: rotate, limit or none.
    #[arg(long, value_name = "MODE")]
    pub qb_mode: Option<String>,

    /// Contest type: cash, balanced or gpp.
    #[arg(long, value_name = "TYPE")]
    pub lineup_type: Option<String>,

    /// Exclude players projected below this many points.
    #[arg(long, value_name = "FLOAT")]
    pub min_projected_points: Option<f64>,

    /// Exclude players priced above this salary.
    #[arg(long, value_name = "INT")]
    pub max_salary_per_player: Option<u32>,

    // --- Search Overrides ---
    /// Seed for reproducible runs.
    #[arg(long, value_name = "INT")]
    pub seed: Option<u64>,

    /// Maximum scenarios sampled per lineup.
    #[arg(long, value_name = "INT")]
    pub max_scenarios: Option<usize>,

    /// Scenarios solved concurrently per batch.
    #[arg(long, value_name = "INT")]
    pub batch_size: Option<usize>,

    /// Wall-clock budget per lineup search, in seconds.
    #[arg(long, value_name = "SECONDS")]
    pub time_budget: Option<f64>,

    // --- Persistence ---
    /// Directory where runs are stored for later export.
    #[arg(long, value_name = "PATH")]
    pub runs_dir: Option<PathBuf>,

    /// Do not store the run.
    #[arg(long)]
    pub no_save: bool,

    /// Set a specific configuration value, overriding the config file.
    /// Can be used multiple times. Example: -S search.max-scenarios=200
    #[arg(short = 'S', long = "set", value_name = "KEY=VALUE", num_args(0..))]
    pub set_values: Vec<String>,
}

/// Arguments for the `export` subcommand.
#[derive(Args, Debug)]
pub struct ExportArgs {
    /// Identifier of the stored run, as printed by `generate`.
    #[arg(long, required = true, value_name = "UUID")]
    pub run_id: String,

    /// Path for the DraftKings upload CSV.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub output: PathBuf,

    /// Slate CSV with player identifiers.
    /// Defaults to the identifiers stored with the run's players.
    #[arg(long, value_name = "PATH")]
    pub slate: Option<PathBuf>,

    /// Directory where runs are stored.
    #[arg(long, value_name = "PATH")]
    pub runs_dir: Option<PathBuf>,
}

/// Arguments for the `value` subcommand.
#[derive(Args, Debug)]
pub struct ValueArgs {
    /// Path to the player pool CSV.
    #[arg(short, long, required = true, value_name = "PATH")]
    pub input: PathBuf,

    /// Undervalued players to list per position.
    #[arg(long, default_value_t = 5, value_name = "INT")]
    pub top_n: usize,

    /// Print the analysis as JSON instead of tables.
    #[arg(long)]
    pub json: bool,
}
