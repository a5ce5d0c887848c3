use super::defaults::DefaultsConfig;
use super::file::{
    FileConfig, FileConstraintsConfig, FileRosterConfig, FileScenarioConfig, FileSearchConfig,
};
use super::models::AppConfig;
use crate::cli::GenerateArgs;
use crate::error::{CliError, Result};
use lineforge::engine::config::{
    self as core_config, ConstraintsBuilder, GenerationConfigBuilder, LineupType, QbDiversityMode,
};
use std::str::FromStr;
use std::time::Duration;

/// Merges defaults, the config file, `--set` overrides and explicit flags, in rising precedence.
pub fn build_config(args: &GenerateArgs) -> Result<AppConfig> {
    let defaults = DefaultsConfig::default();

    let file_config = match &args.config {
        Some(path) => FileConfig::from_file(path)?,
        None => FileConfig::default(),
    };
    let mut file_config = apply_set_values(file_config, &args.set_values)?;

    let constraints = merge_constraints(args, file_config.constraints.take(), &defaults)?;
    let search = merge_search(args, file_config.search.take())?;
    let scenario = merge_scenario(file_config.scenario.take());
    let roster = merge_roster(file_config.roster.take());

    let mut builder = GenerationConfigBuilder::new()
        .constraints(constraints)
        .search(search)
        .scenario(scenario)
        .roster(roster);
    if let Some(seed) = args.seed.or(file_config.seed) {
        builder = builder.seed(seed);
    }
    let generation = builder
        .build()
        .map_err(|e| CliError::Config(e.to_string()))?;

    let runs_dir = if args.no_save {
        None
    } else {
        Some(
            args.runs_dir
                .clone()
                .or(file_config.runs_dir)
                .unwrap_or(defaults.runs_dir),
        )
    };

    Ok(AppConfig {
        pool_path: args.input.clone(),
        output_path: args.output.clone(),
        slate_path: args.slate.clone(),
        runs_dir,
        generation,
    })
}

fn parse_named<T: FromStr<Err = String>>(value: Option<&str>) -> Result<Option<T>> {
    value
        .map(|v| v.parse::<T>().map_err(CliError::Argument))
        .transpose()
}

/// List flags replace the file's list when given at all.
fn pick_list(cli: &[String], file: Vec<String>) -> Vec<String> {
    if cli.is_empty() { file } else { cli.to_vec() }
}

fn merge_constraints(
    args: &GenerateArgs,
    file_val: Option<FileConstraintsConfig>,
    defaults: &DefaultsConfig,
) -> Result<core_config::Constraints> {
    let file_val = file_val.unwrap_or_default();

    let num_lineups = args.num_lineups.or(file_val.num_lineups);
    if let Some(n) = num_lineups {
        if n > defaults.max_lineups {
            return Err(CliError::Argument(format!(
                "num-lineups must be at most {}, got {n}",
                defaults.max_lineups
            )));
        }
    }

    let qb_mode =
        parse_named::<QbDiversityMode>(args.qb_mode.as_deref())?.or(file_val.qb_diversity_mode);
    let lineup_type =
        parse_named::<LineupType>(args.lineup_type.as_deref())?.or(file_val.lineup_type);

    let mut builder = ConstraintsBuilder::new()
        .must_include(pick_list(&args.must_include, file_val.must_include))
        .avoid_players(pick_list(&args.avoid_players, file_val.avoid_players))
        .avoid_teams(pick_list(&args.avoid_teams, file_val.avoid_teams))
        .stack_teams(pick_list(&args.stack_teams, file_val.stack_teams));

    if let Some(n) = num_lineups {
        builder = builder.num_lineups(n);
    }
    if let Some(v) = args.max_exposure.or(file_val.max_exposure) {
        builder = builder.max_exposure(v);
    }
    if let Some(v) = args.max_qb_exposure.or(file_val.max_qb_exposure) {
        builder = builder.max_qb_exposure(v);
    }
    if let Some(mode) = qb_mode {
        builder = builder.qb_diversity_mode(mode);
    }
    if let Some(t) = lineup_type {
        builder = builder.lineup_type(t);
    }
    if let Some(v) = args.min_projected_points.or(file_val.min_projected_points) {
        builder = builder.min_projected_points(v);
    }
    if let Some(v) = args.max_salary_per_player.or(file_val.max_salary_per_player) {
        builder = builder.max_salary_per_player(v);
    }
    builder.build().map_err(|e| CliError::Config(e.to_string()))
}

fn merge_search(
    args: &GenerateArgs,
    file_val: Option<FileSearchConfig>,
) -> Result<core_config::SearchConfig> {
    let file_val = file_val.unwrap_or_default();
    let defaults = core_config::SearchConfig::default();

    let time_budget = match args.time_budget.or(file_val.time_budget_secs) {
        Some(secs) => Some(Duration::try_from_secs_f64(secs).map_err(|_| {
            CliError::Argument(format!("time budget must be a non-negative number of seconds, got {secs}"))
        })?),
        None => None,
    };

    Ok(core_config::SearchConfig {
        max_scenarios: args
            .max_scenarios
            .or(file_val.max_scenarios)
            .unwrap_or(defaults.max_scenarios),
        min_scenarios: file_val.min_scenarios.unwrap_or(defaults.min_scenarios),
        patience: file_val.patience.unwrap_or(defaults.patience),
        improvement_threshold: file_val
            .improvement_threshold
            .unwrap_or(defaults.improvement_threshold),
        min_valid_lineups: file_val
            .min_valid_lineups
            .unwrap_or(defaults.min_valid_lineups),
        batch_size: args
            .batch_size
            .or(file_val.batch_size)
            .unwrap_or(defaults.batch_size),
        time_budget,
    })
}

fn merge_scenario(file_val: Option<FileScenarioConfig>) -> core_config::ScenarioConfig {
    let file_val = file_val.unwrap_or_default();
    let defaults = core_config::ScenarioConfig::default();
    let multipliers = file_val.position_multipliers.unwrap_or_default();
    core_config::ScenarioConfig {
        noise_std_dev: file_val.noise_std_dev.unwrap_or(defaults.noise_std_dev),
        noise_min: file_val.noise_min.unwrap_or(defaults.noise_min),
        noise_max: file_val.noise_max.unwrap_or(defaults.noise_max),
        qb_multiplier: multipliers.qb.unwrap_or(defaults.qb_multiplier),
        rb_multiplier: multipliers.rb.unwrap_or(defaults.rb_multiplier),
        wr_multiplier: multipliers.wr.unwrap_or(defaults.wr_multiplier),
        te_multiplier: multipliers.te.unwrap_or(defaults.te_multiplier),
        dst_multiplier: multipliers.dst.unwrap_or(defaults.dst_multiplier),
    }
}

fn merge_roster(file_val: Option<FileRosterConfig>) -> core_config::RosterRules {
    let file_val = file_val.unwrap_or_default();
    let defaults = core_config::RosterRules::default();
    core_config::RosterRules {
        salary_cap: file_val.salary_cap.unwrap_or(defaults.salary_cap),
        min_salary: file_val.min_salary.unwrap_or(defaults.min_salary),
    }
}

fn parse_value<T: FromStr>(key: &str, value: &str, kind: &str) -> Result<T> {
    value
        .parse()
        .map_err(|_| CliError::Config(format!("Invalid {kind} value for {key}: {value}")))
}

fn apply_set_values(mut config: FileConfig, set_values: &[String]) -> Result<FileConfig> {
    for kv_pair in set_values {
        let Some((key, value)) = kv_pair.split_once('=') else {
            return Err(CliError::Config(format!(
                "Invalid --set format: '{kv_pair}'. Expected KEY=VALUE."
            )));
        };
        let key = key.trim();
        let value = value.trim();

        match key {
            "seed" => config.seed = Some(parse_value(key, value, "integer")?),
            "runs-dir" => config.runs_dir = Some(value.into()),
            "constraints.num-lineups" => {
                config
                    .constraints
                    .get_or_insert_with(Default::default)
                    .num_lineups = Some(parse_value(key, value, "integer")?);
            }
            "constraints.max-exposure" => {
                config
                    .constraints
                    .get_or_insert_with(Default::default)
                    .max_exposure = Some(parse_value(key, value, "float")?);
            }
            "constraints.max-qb-exposure" => {
                config
                    .constraints
                    .get_or_insert_with(Default::default)
                    .max_qb_exposure = Some(parse_value(key, value, "float")?);
            }
            "constraints.qb-diversity-mode" => {
                config
                    .constraints
                    .get_or_insert_with(Default::default)
                    .qb_diversity_mode = Some(value.parse().map_err(CliError::Config)?);
            }
            "constraints.lineup-type" => {
                config
                    .constraints
                    .get_or_insert_with(Default::default)
                    .lineup_type = Some(value.parse().map_err(CliError::Config)?);
            }
            "search.max-scenarios" => {
                config.search.get_or_insert_with(Default::default).max_scenarios =
                    Some(parse_value(key, value, "integer")?);
            }
            "search.min-scenarios" => {
                config.search.get_or_insert_with(Default::default).min_scenarios =
                    Some(parse_value(key, value, "integer")?);
            }
            "search.patience" => {
                config.search.get_or_insert_with(Default::default).patience =
                    Some(parse_value(key, value, "integer")?);
            }
            "search.improvement-threshold" => {
                config
                    .search
                    .get_or_insert_with(Default::default)
                    .improvement_threshold = Some(parse_value(key, value, "float")?);
            }
            "search.min-valid-lineups" => {
                config
                    .search
                    .get_or_insert_with(Default::default)
                    .min_valid_lineups = Some(parse_value(key, value, "integer")?);
            }
            "search.batch-size" => {
                config.search.get_or_insert_with(Default::default).batch_size =
                    Some(parse_value(key, value, "integer")?);
            }
            "search.time-budget-secs" => {
                config
                    .search
                    .get_or_insert_with(Default::default)
                    .time_budget_secs = Some(parse_value(key, value, "float")?);
            }
            "scenario.noise-std-dev" => {
                config
                    .scenario
                    .get_or_insert_with(Default::default)
                    .noise_std_dev = Some(parse_value(key, value, "float")?);
            }
            "roster.salary-cap" => {
                config.roster.get_or_insert_with(Default::default).salary_cap =
                    Some(parse_value(key, value, "integer")?);
            }
            "roster.min-salary" => {
                config.roster.get_or_insert_with(Default::default).min_salary =
                    Some(parse_value(key, value, "integer")?);
            }
            _ => {
                return Err(CliError::Config(format!(
                    "Unsupported configuration key for --set: '{key}'"
                )));
            }
        }
    }
    Ok(config)
}
