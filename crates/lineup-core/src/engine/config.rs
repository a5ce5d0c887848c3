use super::error::ValidationError;
use crate::core::models::lineup::Slot;
use crate::core::models::player::{PlayerPool, Position};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

pub use crate::core::analysis::LineupType;

pub const SALARY_CAP: u32 = 50_000;
pub const MIN_SALARY: u32 = 45_000;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum ConfigError {
    #[error("Invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.into(),
    }
}

/// How quarterback usage is spread across a batch of lineups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QbDiversityMode {
    /// Use every quarterback once before repeating any.
    #[default]
    Rotate,
    /// Cap each quarterback at `max_qb_exposure`.
    Limit,
    None,
}

impl fmt::Display for QbDiversityMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            QbDiversityMode::Rotate => "rotate",
            QbDiversityMode::Limit => "limit",
            QbDiversityMode::None => "none",
        })
    }
}

impl FromStr for QbDiversityMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "rotate" => Ok(QbDiversityMode::Rotate),
            "limit" => Ok(QbDiversityMode::Limit),
            "none" => Ok(QbDiversityMode::None),
            other => Err(format!(
                "unknown QB diversity mode '{other}' (expected rotate, limit or none)"
            )),
        }
    }
}

/// User constraints for one multi-lineup run.
#[derive(Debug, Clone, PartialEq)]
pub struct Constraints {
    pub must_include: Vec<String>,
    pub avoid_players: Vec<String>,
    /// Lower-cased team abbreviations.
    pub avoid_teams: Vec<String>,
    /// Lower-cased team abbreviations whose QB/WR/TE get a projection boost.
    pub stack_teams: Vec<String>,
    pub num_lineups: usize,
    pub max_exposure: f64,
    pub max_qb_exposure: f64,
    pub qb_diversity_mode: QbDiversityMode,
    pub lineup_type: LineupType,
    pub min_projected_points: Option<f64>,
    pub max_salary_per_player: Option<u32>,
}

impl Default for Constraints {
    fn default() -> Self {
        Self {
            must_include: Vec::new(),
            avoid_players: Vec::new(),
            avoid_teams: Vec::new(),
            stack_teams: Vec::new(),
            num_lineups: 1,
            max_exposure: 0.3,
            max_qb_exposure: 0.15,
            qb_diversity_mode: QbDiversityMode::Rotate,
            lineup_type: LineupType::Balanced,
            min_projected_points: None,
            max_salary_per_player: None,
        }
    }
}

/// Constraints mapped onto pool indices.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedConstraints {
    pub include: BTreeSet<usize>,
    /// Players no lineup in the run may use.
    pub exclude: BTreeSet<usize>,
    /// Quarterbacks still available after hard exclusions, in pool order.
    pub eligible_qbs: Vec<usize>,
}

impl Constraints {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.num_lineups == 0 {
            return Err(invalid("num_lineups", "must be at least 1"));
        }
        if !(self.max_exposure > 0.0 && self.max_exposure <= 1.0) {
            return Err(invalid("max_exposure", "must be in (0, 1]"));
        }
        if !(self.max_qb_exposure > 0.0 && self.max_qb_exposure <= 1.0) {
            return Err(invalid("max_qb_exposure", "must be in (0, 1]"));
        }
        if let Some(min) = self.min_projected_points {
            if !min.is_finite() || min < 0.0 {
                return Err(invalid(
                    "min_projected_points",
                    "must be a non-negative number",
                ));
            }
        }
        if self.max_salary_per_player == Some(0) {
            return Err(invalid("max_salary_per_player", "must be positive"));
        }
        Ok(())
    }

    /// Checks every name and team against the pool and derives the run-wide index sets.
    pub fn resolve(&self, pool: &PlayerPool) -> Result<ResolvedConstraints, ValidationError> {
        let lookup = |field: &'static str, name: &str| {
            pool.index_of(name).ok_or_else(|| ValidationError::UnknownPlayer {
                field,
                name: name.to_string(),
            })
        };
        let check_team = |field: &'static str, team: &str| {
            if pool.has_team(team) {
                Ok(())
            } else {
                Err(ValidationError::UnknownTeam {
                    field,
                    team: team.to_string(),
                })
            }
        };

        let mut include = BTreeSet::new();
        for name in &self.must_include {
            include.insert(lookup("must_include", name)?);
        }
        let mut exclude = BTreeSet::new();
        for name in &self.avoid_players {
            exclude.insert(lookup("avoid_players", name)?);
        }
        for team in &self.avoid_teams {
            check_team("avoid_teams", team)?;
        }
        for team in &self.stack_teams {
            check_team("stack_teams", team)?;
        }

        let avoided_teams: HashSet<String> =
            self.avoid_teams.iter().map(|t| t.to_lowercase()).collect();
        for (idx, player) in pool.iter().enumerate() {
            let knob_violation = match (self.max_salary_per_player, self.min_projected_points) {
                (Some(max), _) if player.salary > max => {
                    Some(format!("salary {} exceeds max_salary_per_player {max}", player.salary))
                }
                (_, Some(min)) if player.projected_points < min => Some(format!(
                    "projection {} is below min_projected_points {min}",
                    player.projected_points
                )),
                _ => None,
            };
            if let Some(reason) = knob_violation {
                if include.contains(&idx) {
                    return Err(ValidationError::ConflictingInclude {
                        name: player.name.clone(),
                        reason,
                    });
                }
                exclude.insert(idx);
            }
            if avoided_teams.contains(&player.team) {
                exclude.insert(idx);
            }
        }

        check_roster_coverage(pool, &exclude)?;

        let eligible_qbs = pool
            .indices_at(Position::QB)
            .filter(|idx| !exclude.contains(idx))
            .collect();

        Ok(ResolvedConstraints {
            include,
            exclude,
            eligible_qbs,
        })
    }
}

/// Fails when the players left after hard exclusions cannot fill a roster at all.
fn check_roster_coverage(pool: &PlayerPool, exclude: &BTreeSet<usize>) -> Result<(), ValidationError> {
    let available =
        |position: Position| pool.indices_at(position).filter(|i| !exclude.contains(i)).count();
    for position in Position::ALL {
        let required = Slot::base_slots_for(position).len();
        let count = available(position);
        if count < required {
            return Err(ValidationError::InsufficientPlayers {
                position: position.to_string(),
                available: count,
                required,
            });
        }
    }
    let flex_required = Slot::ALL
        .iter()
        .filter(|s| s.base_position().is_none_or(Position::is_flex_eligible))
        .count();
    let flex_available: usize = Position::ALL
        .iter()
        .filter(|p| p.is_flex_eligible())
        .map(|&p| available(p))
        .sum();
    if flex_available < flex_required {
        return Err(ValidationError::InsufficientPlayers {
            position: "RB/WR/TE".to_string(),
            available: flex_available,
            required: flex_required,
        });
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RosterRules {
    pub salary_cap: u32,
    pub min_salary: u32,
}

impl Default for RosterRules {
    fn default() -> Self {
        Self {
            salary_cap: SALARY_CAP,
            min_salary: MIN_SALARY,
        }
    }
}

impl RosterRules {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.salary_cap == 0 {
            return Err(invalid("salary_cap", "must be positive"));
        }
        if self.min_salary > self.salary_cap {
            return Err(invalid("min_salary", "must not exceed salary_cap"));
        }
        Ok(())
    }
}

/// Budget and convergence rules for the per-lineup search loop.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchConfig {
    pub max_scenarios: usize,
    /// Early stopping is only considered from this 0-based scenario index on.
    pub min_scenarios: usize,
    /// Consecutive non-improving valid scenarios required to stop early.
    pub patience: usize,
    /// Relative gain a new score needs over the best so far to count as an improvement.
    pub improvement_threshold: f64,
    pub min_valid_lineups: usize,
    /// Scenarios solved concurrently per batch.
    pub batch_size: usize,
    pub time_budget: Option<Duration>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_scenarios: 100,
            min_scenarios: 25,
            patience: 15,
            improvement_threshold: 0.01,
            min_valid_lineups: 5,
            batch_size: 1,
            time_budget: None,
        }
    }
}

impl SearchConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_scenarios == 0 {
            return Err(invalid("max_scenarios", "must be at least 1"));
        }
        if self.batch_size == 0 {
            return Err(invalid("batch_size", "must be at least 1"));
        }
        if !self.improvement_threshold.is_finite() || self.improvement_threshold < 0.0 {
            return Err(invalid(
                "improvement_threshold",
                "must be a non-negative number",
            ));
        }
        Ok(())
    }
}

/// Noise and bias parameters for scenario generation.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioConfig {
    pub noise_std_dev: f64,
    pub noise_min: f64,
    pub noise_max: f64,
    pub qb_multiplier: f64,
    pub rb_multiplier: f64,
    pub wr_multiplier: f64,
    pub te_multiplier: f64,
    pub dst_multiplier: f64,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            noise_std_dev: 0.10,
            noise_min: 0.5,
            noise_max: 1.5,
            qb_multiplier: 1.0,
            rb_multiplier: 1.02,
            wr_multiplier: 1.02,
            te_multiplier: 0.95,
            dst_multiplier: 1.0,
        }
    }
}

impl ScenarioConfig {
    pub fn position_multiplier(&self, position: Position) -> f64 {
        match position {
            Position::QB => self.qb_multiplier,
            Position::RB => self.rb_multiplier,
            Position::WR => self.wr_multiplier,
            Position::TE => self.te_multiplier,
            Position::DST => self.dst_multiplier,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.noise_std_dev.is_finite() || self.noise_std_dev < 0.0 {
            return Err(invalid("noise_std_dev", "must be a non-negative number"));
        }
        if !(self.noise_min >= 0.0 && self.noise_min <= 1.0 && self.noise_max >= 1.0) {
            return Err(invalid(
                "noise_min/noise_max",
                "must satisfy 0 <= noise_min <= 1 <= noise_max",
            ));
        }
        for position in Position::ALL {
            let m = self.position_multiplier(position);
            if !m.is_finite() || m <= 0.0 {
                return Err(invalid("position multiplier", format!("{position} must be positive")));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub constraints: Constraints,
    pub search: SearchConfig,
    pub scenario: ScenarioConfig,
    pub roster: RosterRules,
    /// Run seed; drawn from entropy when absent.
    pub seed: Option<u64>,
}

#[derive(Default)]
pub struct ConstraintsBuilder {
    must_include: Vec<String>,
    avoid_players: Vec<String>,
    avoid_teams: Vec<String>,
    stack_teams: Vec<String>,
    num_lineups: Option<usize>,
    max_exposure: Option<f64>,
    max_qb_exposure: Option<f64>,
    qb_diversity_mode: Option<QbDiversityMode>,
    lineup_type: Option<LineupType>,
    min_projected_points: Option<f64>,
    max_salary_per_player: Option<u32>,
}

impl ConstraintsBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn must_include<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.must_include.extend(names.into_iter().map(Into::into));
        self
    }
    pub fn avoid_players<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.avoid_players.extend(names.into_iter().map(Into::into));
        self
    }
    pub fn avoid_teams<I, S>(mut self, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.avoid_teams
            .extend(teams.into_iter().map(|t| t.into().to_lowercase()));
        self
    }
    pub fn stack_teams<I, S>(mut self, teams: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stack_teams
            .extend(teams.into_iter().map(|t| t.into().to_lowercase()));
        self
    }
    pub fn num_lineups(mut self, n: usize) -> Self {
        self.num_lineups = Some(n);
        self
    }
    pub fn max_exposure(mut self, exposure: f64) -> Self {
        self.max_exposure = Some(exposure);
        self
    }
    pub fn max_qb_exposure(mut self, exposure: f64) -> Self {
        self.max_qb_exposure = Some(exposure);
        self
    }
    pub fn qb_diversity_mode(mut self, mode: QbDiversityMode) -> Self {
        self.qb_diversity_mode = Some(mode);
        self
    }
    pub fn lineup_type(mut self, lineup_type: LineupType) -> Self {
        self.lineup_type = Some(lineup_type);
        self
    }
    pub fn min_projected_points(mut self, points: f64) -> Self {
        self.min_projected_points = Some(points);
        self
    }
    pub fn max_salary_per_player(mut self, salary: u32) -> Self {
        self.max_salary_per_player = Some(salary);
        self
    }

    pub fn build(self) -> Result<Constraints, ConfigError> {
        let defaults = Constraints::default();
        let constraints = Constraints {
            must_include: dedup(self.must_include),
            avoid_players: dedup(self.avoid_players),
            avoid_teams: dedup(self.avoid_teams),
            stack_teams: dedup(self.stack_teams),
            num_lineups: self.num_lineups.unwrap_or(defaults.num_lineups),
            max_exposure: self.max_exposure.unwrap_or(defaults.max_exposure),
            max_qb_exposure: self.max_qb_exposure.unwrap_or(defaults.max_qb_exposure),
            qb_diversity_mode: self
                .qb_diversity_mode
                .unwrap_or(defaults.qb_diversity_mode),
            lineup_type: self.lineup_type.unwrap_or(defaults.lineup_type),
            min_projected_points: self.min_projected_points,
            max_salary_per_player: self.max_salary_per_player,
        };
        constraints.validate()?;
        Ok(constraints)
    }
}

fn dedup(values: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty() && seen.insert(v.clone()))
        .collect()
}

#[derive(Default)]
pub struct GenerationConfigBuilder {
    constraints: Option<Constraints>,
    search: Option<SearchConfig>,
    scenario: Option<ScenarioConfig>,
    roster: Option<RosterRules>,
    seed: Option<u64>,
}

impl GenerationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn constraints(mut self, constraints: Constraints) -> Self {
        self.constraints = Some(constraints);
        self
    }
    pub fn search(mut self, search: SearchConfig) -> Self {
        self.search = Some(search);
        self
    }
    pub fn scenario(mut self, scenario: ScenarioConfig) -> Self {
        self.scenario = Some(scenario);
        self
    }
    pub fn roster(mut self, roster: RosterRules) -> Self {
        self.roster = Some(roster);
        self
    }
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn build(self) -> Result<GenerationConfig, ConfigError> {
        let config = GenerationConfig {
            constraints: self.constraints.unwrap_or_default(),
            search: self.search.unwrap_or_default(),
            scenario: self.scenario.unwrap_or_default(),
            roster: self.roster.unwrap_or_default(),
            seed: self.seed,
        };
        config.constraints.validate()?;
        config.search.validate()?;
        config.scenario.validate()?;
        config.roster.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::player::Player;

    fn pool() -> PlayerPool {
        let mut players = vec![
            Player::new("QB1", Position::QB, "kc", 7000, 20.0),
            Player::new("QB2", Position::QB, "buf", 9000, 22.0),
            Player::new("TE1", Position::TE, "kc", 5000, 10.0),
            Player::new("DST1", Position::DST, "buf", 3000, 8.0),
        ];
        for i in 0..3 {
            players.push(Player::new(format!("RB{i}"), Position::RB, "kc", 6000, 12.0));
        }
        for i in 0..4 {
            players.push(Player::new(format!("WR{i}"), Position::WR, "buf", 6000, 14.0));
        }
        PlayerPool::new(players).unwrap()
    }

    #[test]
    fn builder_applies_documented_defaults() {
        let c = ConstraintsBuilder::new().build().unwrap();
        assert_eq!(c.num_lineups, 1);
        assert_eq!(c.max_exposure, 0.3);
        assert_eq!(c.max_qb_exposure, 0.15);
        assert_eq!(c.qb_diversity_mode, QbDiversityMode::Rotate);
        assert_eq!(c.lineup_type, LineupType::Balanced);

        let s = SearchConfig::default();
        assert_eq!(
            (s.max_scenarios, s.min_scenarios, s.patience, s.min_valid_lineups),
            (100, 25, 15, 5)
        );
        assert_eq!(RosterRules::default().salary_cap, 50_000);
        assert_eq!(ScenarioConfig::default().position_multiplier(Position::TE), 0.95);
    }

    #[test]
    fn builder_rejects_out_of_range_values() {
        assert!(matches!(
            ConstraintsBuilder::new().num_lineups(0).build(),
            Err(ConfigError::InvalidValue { field: "num_lineups", .. })
        ));
        assert!(matches!(
            ConstraintsBuilder::new().max_exposure(0.0).build(),
            Err(ConfigError::InvalidValue { field: "max_exposure", .. })
        ));
        assert!(matches!(
            ConstraintsBuilder::new().max_qb_exposure(1.5).build(),
            Err(ConfigError::InvalidValue { field: "max_qb_exposure", .. })
        ));
        let search = SearchConfig {
            batch_size: 0,
            ..SearchConfig::default()
        };
        assert!(GenerationConfigBuilder::new().search(search).build().is_err());
        let roster = RosterRules {
            salary_cap: 40_000,
            min_salary: 45_000,
        };
        assert!(GenerationConfigBuilder::new().roster(roster).build().is_err());
    }

    #[test]
    fn builder_normalizes_team_lists() {
        let c = ConstraintsBuilder::new()
            .avoid_teams(["KC", "kc", " "])
            .stack_teams(["Buf"])
            .must_include(["QB1", "QB1"])
            .build()
            .unwrap();
        assert_eq!(c.avoid_teams, vec!["kc"]);
        assert_eq!(c.stack_teams, vec!["buf"]);
        assert_eq!(c.must_include, vec!["QB1"]);
    }

    #[test]
    fn resolve_maps_names_and_teams_to_indices() {
        let pool = pool();
        let c = ConstraintsBuilder::new()
            .must_include(["TE1"])
            .avoid_players(["RB0"])
            .build()
            .unwrap();
        let resolved = c.resolve(&pool).unwrap();
        assert_eq!(resolved.include, BTreeSet::from([2]));
        assert_eq!(resolved.exclude, BTreeSet::from([pool.index_of("RB0").unwrap()]));
        assert_eq!(resolved.eligible_qbs, vec![0, 1]);
    }

    #[test]
    fn resolve_rejects_unknown_names_and_teams() {
        let pool = pool();
        let c = ConstraintsBuilder::new().must_include(["Nobody"]).build().unwrap();
        assert_eq!(
            c.resolve(&pool).unwrap_err(),
            ValidationError::UnknownPlayer {
                field: "must_include",
                name: "Nobody".into()
            }
        );
        let c = ConstraintsBuilder::new().avoid_teams(["sea"]).build().unwrap();
        assert!(matches!(
            c.resolve(&pool),
            Err(ValidationError::UnknownTeam { field: "avoid_teams", .. })
        ));
    }

    #[test]
    fn strategy_knobs_exclude_players_but_conflict_with_includes() {
        let pool = pool();
        let c = ConstraintsBuilder::new()
            .max_salary_per_player(8000)
            .build()
            .unwrap();
        let resolved = c.resolve(&pool).unwrap();
        assert!(resolved.exclude.contains(&1));
        assert_eq!(resolved.eligible_qbs, vec![0]);

        let c = ConstraintsBuilder::new()
            .max_salary_per_player(8000)
            .must_include(["QB2"])
            .build()
            .unwrap();
        assert!(matches!(
            c.resolve(&pool),
            Err(ValidationError::ConflictingInclude { .. })
        ));
    }

    #[test]
    fn resolve_rejects_pools_that_cannot_fill_a_roster() {
        let pool = pool();
        let c = ConstraintsBuilder::new().avoid_teams(["buf"]).build().unwrap();
        match c.resolve(&pool) {
            Err(ValidationError::InsufficientPlayers { position, .. }) => {
                assert_eq!(position, "WR");
            }
            other => panic!("expected InsufficientPlayers, got {other:?}"),
        }
    }

    #[test]
    fn qb_mode_parses() {
        assert_eq!("LIMIT".parse::<QbDiversityMode>().unwrap(), QbDiversityMode::Limit);
        assert!("spread".parse::<QbDiversityMode>().is_err());
    }
}
