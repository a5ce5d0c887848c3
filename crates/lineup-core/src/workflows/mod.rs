//! # Workflows Module
//!
//! Top-level entry points. A workflow validates its inputs, drives the engine and returns a
//! self-describing report.
//!
//! - **Generation Workflow** ([`generate`]) - the multi-lineup generator with exposure control.

pub mod generate;
