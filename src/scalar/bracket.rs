//! Downhill bracket search.
//!
//! Starting from two points, steps downhill with golden-ratio growth and
//! parabolic extrapolation until three points `xa, xb, xc` satisfy
//! `f(xb) < f(xa)` and `f(xb) < f(xc)`.

use crate::error::{AplError, Result};

use super::ScalarObjective;

const GOLD: f64 = 1.618_034;
const VERY_SMALL: f64 = 1e-21;

/// A bracketing triplet and its function values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bracket {
    pub xa: f64,
    pub xb: f64,
    pub xc: f64,
    pub fa: f64,
    pub fb: f64,
    pub fc: f64,
    pub func_evals: usize,
}

/// Search for a bracket around a minimum of `objective`.
///
/// # Errors
///
/// Returns `AplError::OptimizationFailure` if no bracket is found within
/// `max_iterations` expansion steps, and propagates objective errors.
pub fn bracket<F: ScalarObjective + ?Sized>(
    objective: &F,
    xa: f64,
    xb: f64,
    grow_limit: f64,
    max_iterations: usize,
) -> Result<Bracket> {
    let (mut xa, mut xb) = (xa, xb);
    let mut fa = objective.eval(xa)?;
    let mut fb = objective.eval(xb)?;
    if fa < fb {
        std::mem::swap(&mut xa, &mut xb);
        std::mem::swap(&mut fa, &mut fb);
    }

    let mut xc = xb + GOLD * (xb - xa);
    let mut fc = objective.eval(xc)?;
    let mut func_evals = 3;
    let mut iter = 0;

    while fc < fb {
        let tmp1 = (xb - xa) * (fb - fc);
        let tmp2 = (xb - xc) * (fb - fa);
        let val = tmp2 - tmp1;
        let denom = if val.abs() < VERY_SMALL {
            2.0 * VERY_SMALL
        } else {
            2.0 * val
        };
        let mut w = xb - ((xb - xc) * tmp2 - (xb - xa) * tmp1) / denom;
        let wlim = xb + grow_limit * (xc - xb);

        if iter > max_iterations {
            return Err(AplError::OptimizationFailure {
                best_x: xc,
                best_value: fc,
                iterations: iter,
                message: "no bracket found within the iteration limit".to_string(),
            });
        }
        iter += 1;

        let fw;
        if (w - xc) * (xb - w) > 0.0 {
            // Parabolic minimum between xb and xc.
            let f = objective.eval(w)?;
            func_evals += 1;
            if f < fc {
                xa = xb;
                xb = w;
                fa = fb;
                fb = f;
                break;
            } else if f > fb {
                xc = w;
                fc = f;
                break;
            }
            w = xc + GOLD * (xc - xb);
            fw = objective.eval(w)?;
            func_evals += 1;
        } else if (w - wlim) * (wlim - xc) >= 0.0 {
            w = wlim;
            fw = objective.eval(w)?;
            func_evals += 1;
        } else if (w - wlim) * (xc - w) > 0.0 {
            let f = objective.eval(w)?;
            func_evals += 1;
            if f < fc {
                xb = xc;
                xc = w;
                w = xc + GOLD * (xc - xb);
                fb = fc;
                fc = f;
                fw = objective.eval(w)?;
                func_evals += 1;
            } else {
                fw = f;
            }
        } else {
            w = xc + GOLD * (xc - xb);
            fw = objective.eval(w)?;
            func_evals += 1;
        }

        xa = xb;
        xb = xc;
        xc = w;
        fa = fb;
        fb = fc;
        fc = fw;
    }

    log::debug!(
        "bracket found after {} evaluations: ({:.6e}, {:.6e}, {:.6e})",
        func_evals,
        xa,
        xb,
        xc
    );

    Ok(Bracket {
        xa,
        xb,
        xc,
        fa,
        fb,
        fc,
        func_evals,
    })
}
