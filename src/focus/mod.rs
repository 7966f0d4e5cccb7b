//! Active plasma lens focusing.
//!
//! This module finds the focusing strength that brings a bunch to its
//! smallest size at a given focal plane, and converts strengths to lens
//! drive currents.

pub mod config;
pub mod current;
pub mod solver;

pub use config::{FocusConfig, FocusStatistic};
pub use current::{focusing_strength_from_current, plasma_lens_current};
pub use solver::{calculate_apl_strength, FocusObjective, FocusSolution, FocusStrengthSolver};
