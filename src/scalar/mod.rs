//! Scalar minimization.
//!
//! This module provides derivative-free minimizers for functions of one
//! variable: a downhill bracket search followed by Brent's method, and a
//! bounded variant of Brent's method. Both are deterministic given a
//! deterministic objective.

pub mod bounded;
pub mod bracket;
pub mod brent;
pub mod config;

use std::fmt;

use crate::error::{AplError, Result};

pub use bounded::bounded;
pub use bracket::{bracket, Bracket};
pub use brent::brent;
pub use config::{ScalarConfig, ScalarMethod};

/// A scalar objective function.
pub trait ScalarObjective {
    /// Evaluate the objective at `x`.
    fn eval(&self, x: f64) -> Result<f64>;
}

impl<F> ScalarObjective for F
where
    F: Fn(f64) -> Result<f64>,
{
    fn eval(&self, x: f64) -> Result<f64> {
        self(x)
    }
}

/// Result of a scalar minimization.
#[derive(Debug, Clone, PartialEq)]
pub struct ScalarMinResult {
    /// The argmin found
    pub x: f64,

    /// The objective value at `x`
    pub fun: f64,

    /// Number of iterations performed
    pub iterations: usize,

    /// Number of function evaluations
    pub func_evals: usize,

    /// Whether the minimizer met its tolerance
    pub success: bool,

    /// A message describing the result
    pub message: String,
}

impl fmt::Display for ScalarMinResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scalar Minimization Result:")?;
        writeln!(f, "  Success: {}", self.success)?;
        writeln!(f, "  Message: {}", self.message)?;
        writeln!(f, "  x: {:.9e}", self.x)?;
        writeln!(f, "  f(x): {:.6e}", self.fun)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        Ok(())
    }
}

/// Minimize `objective` with the method and limits in `config`.
///
/// With [`ScalarMethod::Brent`] the bracket search is unbounded, so the
/// argmin is checked against `config.bounds` afterwards.
///
/// # Errors
///
/// * `AplError::InvalidInput` for non-finite or inverted bounds, or equal
///   bracket starting points
/// * `AplError::OptimizationFailure` if the minimizer does not converge or
///   its argmin falls outside the bounds
/// * any error returned by the objective
pub fn minimize_scalar<F: ScalarObjective + ?Sized>(
    objective: &F,
    config: &ScalarConfig,
) -> Result<ScalarMinResult> {
    let (lower, upper) = config.bounds;
    if !(lower.is_finite() && upper.is_finite()) || lower > upper {
        return Err(AplError::InvalidInput(format!(
            "Invalid bounds ({}, {})",
            lower, upper
        )));
    }

    match config.method {
        ScalarMethod::Bounded => bounded(objective, lower, upper, config.xatol, config.max_iterations),
        ScalarMethod::Brent { bracket: (xa, xb) } => {
            if !(xa.is_finite() && xb.is_finite()) || xa == xb {
                return Err(AplError::InvalidInput(format!(
                    "Bracket starting points must be finite and distinct, got ({}, {})",
                    xa, xb
                )));
            }

            let triplet = bracket(
                objective,
                xa,
                xb,
                config.grow_limit,
                config.max_bracket_iterations,
            )?;
            let mut result = brent(objective, &triplet, config.tol, config.max_iterations)?;

            if result.x < lower || result.x > upper {
                return Err(AplError::OptimizationFailure {
                    best_x: result.x,
                    best_value: result.fun,
                    iterations: result.iterations,
                    message: format!("minimum lies outside the bounds ({}, {})", lower, upper),
                });
            }
            result.message = format!(
                "{} ({} evaluations in bracket search)",
                result.message, triplet.func_evals
            );
            Ok(result)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_minimize_scalar_methods_agree() {
        let f = |x: f64| -> Result<f64> { Ok(((x - 120.0) / 10.0).powi(2) + 0.5) };

        let brent = minimize_scalar(&f, &ScalarConfig::default()).unwrap();
        let bounded = minimize_scalar(
            &f,
            &ScalarConfig::default().with_method(ScalarMethod::Bounded),
        )
        .unwrap();

        assert_relative_eq!(brent.x, 120.0, max_relative = 1e-6);
        assert_relative_eq!(bounded.x, 120.0, max_relative = 1e-6);
    }

    #[test]
    fn test_minimum_outside_bounds_is_failure() {
        let f = |x: f64| -> Result<f64> { Ok((x - 50.0).powi(2)) };
        let config = ScalarConfig::default().with_bounds(0.0, 10.0);
        match minimize_scalar(&f, &config) {
            Err(AplError::OptimizationFailure { best_x, .. }) => {
                assert_relative_eq!(best_x, 50.0, max_relative = 1e-6)
            }
            other => panic!("Expected OptimizationFailure, got {:?}", other),
        }
    }

    #[test]
    fn test_invalid_configuration() {
        let f = |x: f64| -> Result<f64> { Ok(x * x) };
        let degenerate = ScalarConfig::default().with_method(ScalarMethod::Brent { bracket: (1.0, 1.0) });
        assert!(matches!(
            minimize_scalar(&f, &degenerate),
            Err(AplError::InvalidInput(_))
        ));

        let unbounded = ScalarConfig::default().with_bounds(0.0, f64::INFINITY);
        assert!(matches!(
            minimize_scalar(&f, &unbounded),
            Err(AplError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_objective_errors_propagate() {
        let f = |x: f64| -> Result<f64> {
            if x > 3.0 {
                Err(AplError::PropagationFailure("too far".to_string()))
            } else {
                Ok(-x)
            }
        };
        assert!(matches!(
            minimize_scalar(&f, &ScalarConfig::default()),
            Err(AplError::PropagationFailure(_))
        ));
    }
}
