//! Bunch statistics.
//!
//! All moments are weighted by the absolute macro-particle charge. Twiss
//! parameters are derived from the rms ellipse in trace space `(x, x')` with
//! `x' = px / pz`.

use ndarray::{Array1, Zip};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::bunch::ParticleBunch;
use crate::error::{AplError, Result};

/// Summary statistics of a particle bunch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BunchParameters {
    /// Horizontal rms size [m]
    pub sigma_x: f64,

    /// Vertical rms size [m]
    pub sigma_y: f64,

    /// Longitudinal rms size [m]
    pub sigma_z: f64,

    /// Horizontal centroid [m]
    pub x_avg: f64,

    /// Vertical centroid [m]
    pub y_avg: f64,

    /// Longitudinal centroid [m]
    pub xi_avg: f64,

    /// Horizontal centroid divergence [rad]
    pub theta_x: f64,

    /// Vertical centroid divergence [rad]
    pub theta_y: f64,

    /// Mean Lorentz factor
    pub avg_ene: f64,

    /// Relative rms energy spread
    pub rel_ene_spread: f64,

    /// Horizontal normalized rms emittance [m rad]
    pub emitt_x: f64,

    /// Vertical normalized rms emittance [m rad]
    pub emitt_y: f64,

    /// Horizontal beta function [m]
    pub beta_x: f64,

    /// Vertical beta function [m]
    pub beta_y: f64,

    /// Horizontal alpha function
    pub alpha_x: f64,

    /// Vertical alpha function
    pub alpha_y: f64,

    /// Horizontal gamma function [1/m]
    pub gamma_x: f64,

    /// Vertical gamma function [1/m]
    pub gamma_y: f64,

    /// Total charge [C]
    pub q_tot: f64,

    /// Distance travelled along the beamline [m]
    pub prop_distance: f64,
}

impl fmt::Display for BunchParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Bunch parameters at s = {:.6} m:", self.prop_distance)?;
        writeln!(f, "  sigma_x: {:.6e} m", self.sigma_x)?;
        writeln!(f, "  sigma_y: {:.6e} m", self.sigma_y)?;
        writeln!(f, "  sigma_z: {:.6e} m", self.sigma_z)?;
        writeln!(f, "  avg_ene: {:.6}", self.avg_ene)?;
        writeln!(f, "  rel_ene_spread: {:.6e}", self.rel_ene_spread)?;
        writeln!(f, "  emitt_x: {:.6e} m rad", self.emitt_x)?;
        writeln!(f, "  emitt_y: {:.6e} m rad", self.emitt_y)?;
        writeln!(f, "  beta_x: {:.6e} m, alpha_x: {:.6}", self.beta_x, self.alpha_x)?;
        writeln!(f, "  beta_y: {:.6e} m, alpha_y: {:.6}", self.beta_y, self.alpha_y)?;
        writeln!(f, "  q_tot: {:.6e} C", self.q_tot)?;
        Ok(())
    }
}

/// Second-order trace-space moments of one transverse plane.
struct PlaneMoments {
    mean: f64,
    mean_prime: f64,
    var: f64,
    var_prime: f64,
    cov: f64,
}

impl PlaneMoments {
    fn compute(u: &Array1<f64>, u_prime: &Array1<f64>, w: &Array1<f64>, w_sum: f64) -> Self {
        let mean = weighted_mean(u, w, w_sum);
        let mean_prime = weighted_mean(u_prime, w, w_sum);

        let (mut var, mut var_prime, mut cov) = (0.0, 0.0, 0.0);
        Zip::from(u).and(u_prime).and(w).for_each(|&a, &b, &wi| {
            let da = a - mean;
            let db = b - mean_prime;
            var += wi * da * da;
            var_prime += wi * db * db;
            cov += wi * da * db;
        });

        Self {
            mean,
            mean_prime,
            var: var / w_sum,
            var_prime: var_prime / w_sum,
            cov: cov / w_sum,
        }
    }

    /// Geometric rms emittance.
    fn emittance(&self) -> f64 {
        // Rounding can push a perfectly correlated distribution slightly negative.
        (self.var * self.var_prime - self.cov * self.cov).max(0.0).sqrt()
    }

    /// `(beta, alpha, gamma)`; NaN when the emittance vanishes.
    fn twiss(&self) -> (f64, f64, f64) {
        let em = self.emittance();
        if em > 0.0 {
            (self.var / em, -self.cov / em, self.var_prime / em)
        } else {
            (f64::NAN, f64::NAN, f64::NAN)
        }
    }
}

fn weighted_mean(values: &Array1<f64>, w: &Array1<f64>, w_sum: f64) -> f64 {
    values.dot(w) / w_sum
}

fn weighted_std(values: &Array1<f64>, w: &Array1<f64>, w_sum: f64) -> f64 {
    let mean = weighted_mean(values, w, w_sum);
    let mut acc = 0.0;
    Zip::from(values).and(w).for_each(|&v, &wi| {
        let d = v - mean;
        acc += wi * d * d;
    });
    (acc / w_sum).sqrt()
}

/// Compute the summary statistics of a bunch.
///
/// # Errors
///
/// Returns `AplError::InvalidInput` if the bunch is empty or its total
/// statistical weight is zero.
pub fn analyze_bunch(bunch: &ParticleBunch) -> Result<BunchParameters> {
    if bunch.is_empty() {
        return Err(AplError::InvalidInput(
            "Cannot analyze an empty bunch".to_string(),
        ));
    }

    let w = bunch.q.mapv(f64::abs);
    let w_sum = w.sum();
    if !(w_sum > 0.0) {
        return Err(AplError::InvalidInput(format!(
            "Bunch '{}' has zero total weight",
            bunch.name
        )));
    }

    let gamma = bunch.gamma();
    let avg_ene = weighted_mean(&gamma, &w, w_sum);
    let ene_std = weighted_std(&gamma, &w, w_sum);

    let plane_x = PlaneMoments::compute(&bunch.x, &bunch.x_prime(), &w, w_sum);
    let plane_y = PlaneMoments::compute(&bunch.y, &bunch.y_prime(), &w, w_sum);
    let (beta_x, alpha_x, gamma_x) = plane_x.twiss();
    let (beta_y, alpha_y, gamma_y) = plane_y.twiss();

    Ok(BunchParameters {
        sigma_x: plane_x.var.sqrt(),
        sigma_y: plane_y.var.sqrt(),
        sigma_z: weighted_std(&bunch.xi, &w, w_sum),
        x_avg: plane_x.mean,
        y_avg: plane_y.mean,
        xi_avg: weighted_mean(&bunch.xi, &w, w_sum),
        theta_x: plane_x.mean_prime,
        theta_y: plane_y.mean_prime,
        avg_ene,
        rel_ene_spread: ene_std / avg_ene,
        emitt_x: avg_ene * plane_x.emittance(),
        emitt_y: avg_ene * plane_y.emittance(),
        beta_x,
        beta_y,
        alpha_x,
        alpha_y,
        gamma_x,
        gamma_y,
        q_tot: bunch.q.sum(),
        prop_distance: bunch.prop_distance,
    })
}
