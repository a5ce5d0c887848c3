//! # Core Module
//!
//! Stateless building blocks shared by the engine and the workflows.
//!
//! - [`models`] - players, the immutable per-run player pool, roster slots and lineups
//! - [`io`] - reading player pools, writing DraftKings uploads and persisting runs
//! - [`analysis`] - value-play and stack analysis that feeds the strategy boost table

pub mod analysis;
pub mod io;
pub mod models;
