use crate::error::{CliError, Result};
use lineforge::engine::config::{LineupType, QbDiversityMode};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::debug;

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConstraintsConfig {
    pub num_lineups: Option<usize>,
    #[serde(default)]
    pub must_include: Vec<String>,
    #[serde(default)]
    pub avoid_players: Vec<String>,
    #[serde(default)]
    pub avoid_teams: Vec<String>,
    #[serde(default)]
    pub stack_teams: Vec<String>,
    pub max_exposure: Option<f64>,
    pub max_qb_exposure: Option<f64>,
    pub qb_diversity_mode: Option<QbDiversityMode>,
    pub lineup_type: Option<LineupType>,
    pub min_projected_points: Option<f64>,
    pub max_salary_per_player: Option<u32>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileSearchConfig {
    pub max_scenarios: Option<usize>,
    pub min_scenarios: Option<usize>,
    pub patience: Option<usize>,
    pub improvement_threshold: Option<f64>,
    pub min_valid_lineups: Option<usize>,
    pub batch_size: Option<usize>,
    pub time_budget_secs: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FilePositionMultipliers {
    pub qb: Option<f64>,
    pub rb: Option<f64>,
    pub wr: Option<f64>,
    pub te: Option<f64>,
    pub dst: Option<f64>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileScenarioConfig {
    pub noise_std_dev: Option<f64>,
    pub noise_min: Option<f64>,
    pub noise_max: Option<f64>,
    pub position_multipliers: Option<FilePositionMultipliers>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileRosterConfig {
    pub salary_cap: Option<u32>,
    pub min_salary: Option<u32>,
}

/// The TOML configuration file. Every key is optional.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct FileConfig {
    pub seed: Option<u64>,
    pub runs_dir: Option<PathBuf>,
    pub constraints: Option<FileConstraintsConfig>,
    pub search: Option<FileSearchConfig>,
    pub scenario: Option<FileScenarioConfig>,
    pub roster: Option<FileRosterConfig>,
}

impl FileConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        debug!("Loading configuration from file: {:?}", path);
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content).map_err(|source| CliError::FileParsing {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, anyhow::Error> {
        Ok(toml::from_str(content)?)
    }
}
