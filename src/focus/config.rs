//! Configuration options for the focusing-strength search.

use serde::{Deserialize, Serialize};

use crate::analysis::BunchParameters;
use crate::scalar::{ScalarConfig, ScalarMethod};

/// Bunch statistic minimized at the focal plane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum FocusStatistic {
    /// Horizontal rms size
    #[default]
    SigmaX,

    /// Vertical rms size
    SigmaY,

    /// Horizontal beta function
    BetaX,

    /// Vertical beta function
    BetaY,

    /// Absolute value of the horizontal alpha function
    AlphaXAbs,

    /// Absolute value of the vertical alpha function
    AlphaYAbs,
}

impl FocusStatistic {
    /// Read the statistic from a set of bunch parameters.
    pub fn extract(&self, params: &BunchParameters) -> f64 {
        match self {
            FocusStatistic::SigmaX => params.sigma_x,
            FocusStatistic::SigmaY => params.sigma_y,
            FocusStatistic::BetaX => params.beta_x,
            FocusStatistic::BetaY => params.beta_y,
            FocusStatistic::AlphaXAbs => params.alpha_x.abs(),
            FocusStatistic::AlphaYAbs => params.alpha_y.abs(),
        }
    }
}

/// Configuration options for [`FocusStrengthSolver`](super::FocusStrengthSolver).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FocusConfig {
    /// Statistic to minimize at the focal plane. Default: SigmaX
    pub statistic: FocusStatistic,

    /// Objective value returned for negative focusing strengths. Default: 1e3
    pub penalty: f64,

    /// Scalar minimizer settings. Default: Brent from bracket (0, 1), domain (0, 1e5)
    pub scalar: ScalarConfig,

    /// Output states per drift during each trial. Default: exit only
    pub drift_n_out: Option<usize>,

    /// Output states inside the lens during each trial. Default: exit only
    pub lens_n_out: Option<usize>,
}

impl Default for FocusConfig {
    fn default() -> Self {
        Self {
            statistic: FocusStatistic::default(),
            penalty: 1e3,
            scalar: ScalarConfig::default(),
            drift_n_out: None,
            lens_n_out: None,
        }
    }
}

impl FocusConfig {
    /// Set the statistic to minimize.
    pub fn with_statistic(mut self, statistic: FocusStatistic) -> Self {
        self.statistic = statistic;
        self
    }

    /// Set the penalty for negative focusing strengths.
    pub fn with_penalty(mut self, penalty: f64) -> Self {
        self.penalty = penalty;
        self
    }

    /// Set the scalar minimizer settings.
    pub fn with_scalar_config(mut self, scalar: ScalarConfig) -> Self {
        self.scalar = scalar;
        self
    }

    /// Set the scalar minimization method.
    pub fn with_method(mut self, method: ScalarMethod) -> Self {
        self.scalar.method = method;
        self
    }

    /// Set the search domain for the focusing strength [T/m].
    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.scalar.bounds = (lower, upper);
        self
    }

    /// Set the maximum number of minimizer iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.scalar.max_iterations = max_iterations;
        self
    }

    /// Set the number of output states per element during each trial.
    pub fn with_n_out(mut self, drift_n_out: usize, lens_n_out: usize) -> Self {
        self.drift_n_out = Some(drift_n_out);
        self.lens_n_out = Some(lens_n_out);
        self
    }
}
