//! # Engine Module
//!
//! The optimization engine: everything between a validated player pool and one accepted lineup.
//!
//! ## Architecture
//!
//! - **Configuration** ([`config`]) - constraints, search and scenario parameters, roster rules
//! - **Scenario Generation** ([`scenario`]) - noisy, biased and boosted projections per trial
//! - **Constrained Selection** ([`solver`]) - the [`solver::LineupSolver`] seam and its MILP backend
//! - **Assembly** ([`assembler`]) - solver output to named roster, plus validation
//! - **Adaptive Search** ([`search`]) - the per-lineup scenario loop with early stopping
//! - **Usage Ledger** ([`ledger`]) - exposure bookkeeping across a multi-lineup run
//! - **Progress Monitoring** ([`progress`]) and **Error Handling** ([`error`])
//!
//! Scenario-level failures ([`error::ScenarioFailure`]) are always retried by the search loop;
//! only [`error::EngineError`] reaches callers.

pub mod assembler;
pub mod config;
pub mod error;
pub mod ledger;
pub mod progress;
pub mod scenario;
pub mod search;
pub mod solver;
