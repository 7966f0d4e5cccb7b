//! # apl-focus-rs
//!
//! `apl-focus-rs` finds the focusing strength of an active plasma lens (APL)
//! that brings a charged-particle bunch to its smallest transverse size at a
//! chosen focal plane.
//!
//! The library provides:
//! - A focusing-strength solver wrapped around any particle tracker
//!   implementing [`Propagator`]
//! - A linear tracker for drifts and chromatic thick plasma lenses
//! - Bunch statistics, Gaussian bunch generation from Twiss parameters and
//!   JSON export
//! - Bracketing and bounded Brent minimizers for scalar objectives
//!
//! ## Basic Usage
//!
//! ```no_run
//! use apl_focus_rs::bunch_generation::{get_gaussian_bunch_from_twiss, GaussianBunchSpec};
//! use apl_focus_rs::calculate_apl_strength;
//!
//! # fn main() -> apl_focus_rs::Result<()> {
//! let spec = GaussianBunchSpec::waist(1e-6, 1e-6, 127.0);
//! let bunch = get_gaussian_bunch_from_twiss(&spec, &mut rand::thread_rng())?;
//!
//! let solution = calculate_apl_strength(&bunch, 0.05, 0.1, 1.0, Some(2e-3), true)?;
//! println!("{}", solution);
//! # Ok(())
//! # }
//! ```

// Public modules
pub mod error;

pub mod constants;

// Bunch model
pub mod analysis;
pub mod bunch;
pub mod bunch_generation;
pub mod export;

// Tracking
pub mod beamline;
pub mod propagator;

// Optimization
pub mod focus;
pub mod scalar;

// Re-exports for convenience
pub use error::{AplError, Result};

pub use analysis::{analyze_bunch, BunchParameters};
pub use beamline::{Beamline, BeamlineElement, Drift, PlasmaLens};
pub use bunch::ParticleBunch;
pub use focus::{
    calculate_apl_strength, FocusConfig, FocusSolution, FocusStatistic, FocusStrengthSolver,
};
pub use propagator::{LinearTracker, Propagator};
pub use scalar::{minimize_scalar, ScalarConfig, ScalarMethod, ScalarMinResult, ScalarObjective};

/// Version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
