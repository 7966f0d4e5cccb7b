//! Configuration options for the scalar minimizers.

use serde::{Deserialize, Serialize};

/// Scalar minimization method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum ScalarMethod {
    /// Downhill bracket search from two starting points followed by Brent's
    /// method. The bracket search may evaluate points outside the domain.
    Brent {
        /// Two distinct starting points for the bracket search
        bracket: (f64, f64),
    },

    /// Brent's method restricted to the domain bounds.
    ///
    /// The search starts from the middle of the domain, so on an objective
    /// with several local minima it finds whichever one the midpoint leads
    /// to. For a thick plasma lens the beam size oscillates with the
    /// focusing strength, so the bounds have to enclose the first focus
    /// alone.
    Bounded,
}

impl Default for ScalarMethod {
    fn default() -> Self {
        ScalarMethod::Brent { bracket: (0.0, 1.0) }
    }
}

/// Configuration options for the scalar minimizers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarConfig {
    /// Minimization method. Default: Brent with bracket (0, 1)
    pub method: ScalarMethod,

    /// Search domain `(lower, upper)`. Default: (0, 1e5)
    pub bounds: (f64, f64),

    /// Relative tolerance on the argmin for Brent's method. Default: 1.48e-8
    pub tol: f64,

    /// Absolute tolerance on the argmin for the bounded method. Default: 1e-5
    pub xatol: f64,

    /// Maximum number of iterations (bounded method: function evaluations). Default: 500
    pub max_iterations: usize,

    /// Maximum step growth factor during the bracket search. Default: 110.0
    pub grow_limit: f64,

    /// Maximum number of bracket expansion steps. Default: 1000
    pub max_bracket_iterations: usize,
}

impl Default for ScalarConfig {
    fn default() -> Self {
        Self {
            method: ScalarMethod::default(),
            bounds: (0.0, 1e5),
            tol: 1.48e-8,
            xatol: 1e-5,
            max_iterations: 500,
            grow_limit: 110.0,
            max_bracket_iterations: 1000,
        }
    }
}

impl ScalarConfig {
    /// Set the minimization method.
    pub fn with_method(mut self, method: ScalarMethod) -> Self {
        self.method = method;
        self
    }

    /// Set the search domain.
    pub fn with_bounds(mut self, lower: f64, upper: f64) -> Self {
        self.bounds = (lower, upper);
        self
    }

    /// Set the relative tolerance for Brent's method.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set the absolute tolerance for the bounded method.
    pub fn with_xatol(mut self, xatol: f64) -> Self {
        self.xatol = xatol;
        self
    }

    /// Set the maximum number of iterations.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }
}
