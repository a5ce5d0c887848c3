//! # Core Models Module
//!
//! Data structures describing a slate and the lineups built from it.
//!
//! - [`player`] - `Position`, `Player` and the immutable `PlayerPool`
//! - [`lineup`] - roster `Slot`s and the validated `Lineup`
//!
//! A `PlayerPool` is created once per run and never mutated; every scenario and every lineup
//! refers back to it.

pub mod lineup;
pub mod player;
