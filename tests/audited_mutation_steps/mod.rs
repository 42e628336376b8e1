//! Step definitions for audited mutation scenarios.

pub mod world;

mod then;
mod when;
