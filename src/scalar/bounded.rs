//! Bounded Brent minimization.
//!
//! Brent's method confined to a closed interval; the objective is never
//! evaluated outside `[lower, upper]`. Termination uses an absolute tolerance
//! on the argmin.

use crate::error::{AplError, Result};

use super::{ScalarMinResult, ScalarObjective};

/// Minimize `objective` on `[lower, upper]`.
///
/// `max_evals` bounds the number of objective evaluations.
///
/// # Errors
///
/// Returns `AplError::InvalidInput` for an empty or non-finite interval,
/// `AplError::OptimizationFailure` with the best point found when the
/// evaluation budget runs out, and propagates objective errors unchanged.
pub fn bounded<F: ScalarObjective + ?Sized>(
    objective: &F,
    lower: f64,
    upper: f64,
    xatol: f64,
    max_evals: usize,
) -> Result<ScalarMinResult> {
    if !(lower.is_finite() && upper.is_finite()) || lower > upper {
        return Err(AplError::InvalidInput(format!(
            "Invalid bounds ({}, {})",
            lower, upper
        )));
    }

    let sqrt_eps = f64::EPSILON.sqrt();
    let golden_mean = 0.5 * (3.0 - 5.0f64.sqrt());

    let (mut a, mut b) = (lower, upper);
    let mut fulc = a + golden_mean * (b - a);
    let mut nfc = fulc;
    let mut xf = fulc;
    let mut rat: f64 = 0.0;
    let mut e: f64 = 0.0;

    let mut fx = objective.eval(xf)?;
    let mut func_evals = 1;
    let mut ffulc = fx;
    let mut fnfc = fx;

    let mut xm = 0.5 * (a + b);
    let mut tol1 = sqrt_eps * xf.abs() + xatol / 3.0;
    let mut tol2 = 2.0 * tol1;
    let mut iterations = 0;

    while (xf - xm).abs() > tol2 - 0.5 * (b - a) {
        if func_evals >= max_evals {
            return Err(AplError::OptimizationFailure {
                best_x: xf,
                best_value: fx,
                iterations,
                message: "maximum function evaluations reached".to_string(),
            });
        }

        let mut golden = true;
        if e.abs() > tol1 {
            // Try a parabolic step.
            let mut r = (xf - nfc) * (fx - ffulc);
            let mut q = (xf - fulc) * (fx - fnfc);
            let mut p = (xf - fulc) * q - (xf - nfc) * r;
            q = 2.0 * (q - r);
            if q > 0.0 {
                p = -p;
            }
            q = q.abs();
            r = e;
            e = rat;

            if p.abs() < (0.5 * q * r).abs() && p > q * (a - xf) && p < q * (b - xf) {
                golden = false;
                rat = p / q;
                let x = xf + rat;
                if (x - a) < tol2 || (b - x) < tol2 {
                    rat = tol1 * sign_or_one(xm - xf);
                }
            }
        }

        if golden {
            e = if xf >= xm { a - xf } else { b - xf };
            rat = golden_mean * e;
        }

        let x = xf + sign_or_one(rat) * rat.abs().max(tol1);
        let fu = objective.eval(x)?;
        func_evals += 1;
        iterations += 1;

        if fu <= fx {
            if x >= xf {
                a = xf;
            } else {
                b = xf;
            }
            fulc = nfc;
            ffulc = fnfc;
            nfc = xf;
            fnfc = fx;
            xf = x;
            fx = fu;
        } else {
            if x < xf {
                a = x;
            } else {
                b = x;
            }
            if fu <= fnfc || nfc == xf {
                fulc = nfc;
                ffulc = fnfc;
                nfc = x;
                fnfc = fu;
            } else if fu <= ffulc || fulc == xf || fulc == nfc {
                fulc = x;
                ffulc = fu;
            }
        }

        xm = 0.5 * (a + b);
        tol1 = sqrt_eps * xf.abs() + xatol / 3.0;
        tol2 = 2.0 * tol1;
    }

    Ok(ScalarMinResult {
        x: xf,
        fun: fx,
        iterations,
        func_evals,
        success: true,
        message: "Converged: interval narrower than xatol".to_string(),
    })
}

/// Sign of `v`, with zero mapped to `+1`.
fn sign_or_one(v: f64) -> f64 {
    if v < 0.0 {
        -1.0
    } else {
        1.0
    }
}
