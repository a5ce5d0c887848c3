//! # Lineforge Core Library
//!
//! A lineup optimization engine for daily fantasy football. Given a slate of players with salaries
//! and point projections, it builds a *set* of lineups that are individually near-optimal under the
//! salary cap and roster quotas, and collectively diversified in player exposure.
//!
//! ## Architectural Philosophy
//!
//! The library follows a strict three-layer architecture:
//!
//! - **[`core`]: The Foundation.** Immutable data models (`PlayerPool`, `Lineup`), input and output
//!   formats (player CSV, DraftKings upload CSV, stored runs) and projection analysis.
//!
//! - **[`engine`]: The Logic Core.** Scenario generation under projection uncertainty, the solver
//!   seam for the per-scenario constrained selection, lineup assembly and validation, the adaptive
//!   search loop and the exposure ledger.
//!
//! - **[`workflows`]: The Public API.** Ties `engine` and `core` together into complete procedures,
//!   most importantly [`workflows::generate::run`], the multi-lineup generator.

pub mod core;
pub mod engine;
pub mod workflows;
