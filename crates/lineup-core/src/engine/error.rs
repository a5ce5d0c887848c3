use thiserror::Error;

use super::assembler::LineupViolation;
use super::config::ConfigError;

/// User constraints that do not fit the loaded pool. Raised before any solving starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Unknown player '{name}' in {field}")]
    UnknownPlayer { field: &'static str, name: String },

    #[error("Unknown team '{team}' in {field}")]
    UnknownTeam { field: &'static str, team: String },

    #[error("Player '{name}' is in must_include but {reason}")]
    ConflictingInclude { name: String, reason: String },

    #[error("Only {available} eligible {position} players remain, a lineup needs {required}")]
    InsufficientPlayers {
        position: String,
        available: usize,
        required: usize,
    },
}

/// Why a single scenario produced no usable lineup. Always retryable: the search loop
/// discards the scenario and moves on.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ScenarioFailure {
    #[error("No feasible selection under the active constraints")]
    Infeasible,

    #[error("Solved selection is not a valid lineup: {0}")]
    InvalidLineup(#[from] LineupViolation),

    #[error("Solver failed: {0}")]
    Solver(String),
}

/// Terminal failures of a generation run.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    #[error("Input validation failed: {0}")]
    InputValidation(#[from] ValidationError),

    #[error("Invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("No valid lineup found for lineup {lineup_number} after {scenarios} scenarios")]
    SearchExhausted {
        lineup_number: usize,
        scenarios: usize,
    },
}
