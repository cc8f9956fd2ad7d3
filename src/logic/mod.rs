//! Logic modules: turn user input into one authoritative configuration.
//!
//! # Modules
//!
//! - `sources` — captured flag and environment maps
//! - `resolver` — precedence merge over the question graph

pub mod resolver;
pub mod sources;
