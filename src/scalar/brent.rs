//! Brent's method for scalar minimization on a bracket.
//!
//! Combines golden-section steps with parabolic interpolation through the
//! three best points seen so far.

use crate::error::{AplError, Result};

use super::bracket::Bracket;
use super::{ScalarMinResult, ScalarObjective};

const CGOLD: f64 = 0.381_966_0;
const MINTOL: f64 = 1.0e-11;

/// Minimize `objective` starting from a bracketing triplet.
///
/// # Errors
///
/// Returns `AplError::OptimizationFailure` carrying the best point found if
/// the tolerance is not met within `max_iterations`, and propagates objective
/// errors unchanged.
pub fn brent<F: ScalarObjective + ?Sized>(
    objective: &F,
    bracket: &Bracket,
    tol: f64,
    max_iterations: usize,
) -> Result<ScalarMinResult> {
    let (mut a, mut b) = if bracket.xa < bracket.xc {
        (bracket.xa, bracket.xc)
    } else {
        (bracket.xc, bracket.xa)
    };

    let mut x = bracket.xb;
    let mut w = x;
    let mut v = x;
    let mut fx = bracket.fb;
    let mut fw = fx;
    let mut fv = fx;

    let mut deltax: f64 = 0.0;
    let mut rat: f64 = 0.0;
    let mut func_evals = bracket.func_evals;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        let tol1 = tol * x.abs() + MINTOL;
        let tol2 = 2.0 * tol1;
        let xmid = 0.5 * (a + b);

        if (x - xmid).abs() < tol2 - 0.5 * (b - a) {
            converged = true;
            break;
        }

        if deltax.abs() <= tol1 {
            deltax = if x >= xmid { a - x } else { b - x };
            rat = CGOLD * deltax;
        } else {
            // Parabolic step through x, w and v.
            let tmp1 = (x - w) * (fx - fv);
            let mut tmp2 = (x - v) * (fx - fw);
            let mut p = (x - v) * tmp2 - (x - w) * tmp1;
            tmp2 = 2.0 * (tmp2 - tmp1);
            if tmp2 > 0.0 {
                p = -p;
            }
            tmp2 = tmp2.abs();
            let dx_temp = deltax;
            deltax = rat;

            if p > tmp2 * (a - x) && p < tmp2 * (b - x) && p.abs() < (0.5 * tmp2 * dx_temp).abs() {
                rat = p / tmp2;
                let u = x + rat;
                if (u - a) < tol2 || (b - u) < tol2 {
                    rat = if xmid - x >= 0.0 { tol1 } else { -tol1 };
                }
            } else {
                deltax = if x >= xmid { a - x } else { b - x };
                rat = CGOLD * deltax;
            }
        }

        let u = if rat.abs() < tol1 {
            if rat >= 0.0 {
                x + tol1
            } else {
                x - tol1
            }
        } else {
            x + rat
        };
        let fu = objective.eval(u)?;
        func_evals += 1;

        if fu > fx {
            if u < x {
                a = u;
            } else {
                b = u;
            }
            if fu <= fw || w == x {
                v = w;
                w = u;
                fv = fw;
                fw = fu;
            } else if fu <= fv || v == x || v == w {
                v = u;
                fv = fu;
            }
        } else {
            if u >= x {
                a = x;
            } else {
                b = x;
            }
            v = w;
            w = x;
            x = u;
            fv = fw;
            fw = fx;
            fx = fu;
        }

        iterations += 1;
    }

    if !converged {
        return Err(AplError::OptimizationFailure {
            best_x: x,
            best_value: fx,
            iterations,
            message: "maximum iterations reached".to_string(),
        });
    }

    Ok(ScalarMinResult {
        x,
        fun: fx,
        iterations,
        func_evals,
        success: true,
        message: "Converged: bracket narrower than tolerance".to_string(),
    })
}
