//! Gaussian bunch generation from Twiss parameters.

use ndarray::Array1;
use rand::Rng;
use rand_distr::StandardNormal;
use serde::{Deserialize, Serialize};

use crate::bunch::ParticleBunch;
use crate::constants::SPEED_OF_LIGHT;
use crate::error::{AplError, Result};

/// Parameters of a Gaussian bunch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GaussianBunchSpec {
    /// Horizontal normalized emittance [m rad]
    pub en_x: f64,

    /// Vertical normalized emittance [m rad]
    pub en_y: f64,

    /// Horizontal alpha function
    pub a_x: f64,

    /// Vertical alpha function
    pub a_y: f64,

    /// Horizontal beta function [m]
    pub b_x: f64,

    /// Vertical beta function [m]
    pub b_y: f64,

    /// Mean longitudinal momentum (beta * gamma)
    pub ene: f64,

    /// Relative energy spread [%]
    pub ene_sp: f64,

    /// Rms bunch duration [fs]
    pub s_t: f64,

    /// Longitudinal centroid [m]
    pub xi_c: f64,

    /// Total charge [pC]
    pub q_tot: f64,

    /// Number of macro-particles
    pub n_part: usize,

    /// Horizontal centroid [m]
    pub x_c: f64,

    /// Vertical centroid [m]
    pub y_c: f64,

    /// Name of the generated bunch
    pub name: String,
}

impl Default for GaussianBunchSpec {
    fn default() -> Self {
        Self {
            en_x: 1e-6,
            en_y: 1e-6,
            a_x: 0.0,
            a_y: 0.0,
            b_x: 1e-3,
            b_y: 1e-3,
            ene: 100.0,
            ene_sp: 0.0,
            s_t: 10.0,
            xi_c: 0.0,
            q_tot: 10.0,
            n_part: 10_000,
            x_c: 0.0,
            y_c: 0.0,
            name: "elec_bunch".to_string(),
        }
    }
}

impl GaussianBunchSpec {
    /// Matched spec for a waist of rms size `spot_size` at the bunch position:
    /// `beta = spot_size^2 / (norm_emitt / ene)`, `alpha = 0` in both planes.
    pub fn waist(spot_size: f64, norm_emitt: f64, ene: f64) -> Self {
        let beta = spot_size.powi(2) / (norm_emitt / ene);
        Self {
            en_x: norm_emitt,
            en_y: norm_emitt,
            b_x: beta,
            b_y: beta,
            ene,
            ..Self::default()
        }
    }

    fn validate(&self) -> Result<()> {
        if self.n_part == 0 {
            return Err(AplError::InvalidInput(
                "Bunch must contain at least one particle".to_string(),
            ));
        }
        for (label, value) in [
            ("en_x", self.en_x),
            ("en_y", self.en_y),
            ("b_x", self.b_x),
            ("b_y", self.b_y),
            ("ene", self.ene),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(AplError::InvalidInput(format!(
                    "'{}' must be positive, got {}",
                    label, value
                )));
            }
        }
        if !(self.ene_sp >= 0.0 && self.s_t >= 0.0) {
            return Err(AplError::InvalidInput(format!(
                "Energy spread and duration must be non-negative, got {} and {}",
                self.ene_sp, self.s_t
            )));
        }
        Ok(())
    }
}

/// Sample one transverse plane: `u = sqrt(eps beta) n1`,
/// `u' = sqrt(eps / beta) (n2 - alpha n1)`.
fn sample_plane<R: Rng>(
    rng: &mut R,
    n: usize,
    emitt: f64,
    alpha: f64,
    beta: f64,
    centroid: f64,
) -> (Array1<f64>, Array1<f64>) {
    let size = (emitt * beta).sqrt();
    let div = (emitt / beta).sqrt();
    let mut u = Array1::zeros(n);
    let mut u_prime = Array1::zeros(n);
    for i in 0..n {
        let n1: f64 = rng.sample(StandardNormal);
        let n2: f64 = rng.sample(StandardNormal);
        u[i] = centroid + size * n1;
        u_prime[i] = div * (n2 - alpha * n1);
    }
    (u, u_prime)
}

/// Generate a Gaussian bunch with the given Twiss parameters.
///
/// # Errors
///
/// Returns `AplError::InvalidInput` for zero particles or non-positive
/// emittances, beta functions or energy.
pub fn get_gaussian_bunch_from_twiss<R: Rng>(
    spec: &GaussianBunchSpec,
    rng: &mut R,
) -> Result<ParticleBunch> {
    spec.validate()?;
    let n = spec.n_part;

    // Geometric emittances at the mean energy.
    let (x, xp) = sample_plane(rng, n, spec.en_x / spec.ene, spec.a_x, spec.b_x, spec.x_c);
    let (y, yp) = sample_plane(rng, n, spec.en_y / spec.ene, spec.a_y, spec.b_y, spec.y_c);

    let s_z = spec.s_t * 1e-15 * SPEED_OF_LIGHT;
    let rel_sp = spec.ene_sp / 100.0;
    let mut xi = Array1::zeros(n);
    let mut pz = Array1::zeros(n);
    for i in 0..n {
        let nz: f64 = rng.sample(StandardNormal);
        let ne: f64 = rng.sample(StandardNormal);
        xi[i] = spec.xi_c + s_z * nz;
        pz[i] = spec.ene * (1.0 + rel_sp * ne);
    }

    let px = &xp * &pz;
    let py = &yp * &pz;
    let q = Array1::from_elem(n, spec.q_tot * 1e-12 / n as f64);

    ParticleBunch::new(q, x, y, xi, px, py, pz, spec.name.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::analyze_bunch;
    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_generated_bunch_matches_twiss() {
        let spec = GaussianBunchSpec {
            en_x: 1e-6,
            en_y: 2e-6,
            a_x: 1.5,
            a_y: 0.0,
            b_x: 0.01,
            b_y: 0.02,
            ene: 200.0,
            ene_sp: 1.0,
            n_part: 50_000,
            ..GaussianBunchSpec::default()
        };
        let mut rng = ChaCha8Rng::seed_from_u64(42);
        let bunch = get_gaussian_bunch_from_twiss(&spec, &mut rng).unwrap();
        let params = analyze_bunch(&bunch).unwrap();

        assert_eq!(bunch.len(), 50_000);
        assert_relative_eq!(params.q_tot, 10e-12, max_relative = 1e-9);
        assert_relative_eq!(params.avg_ene, 200.0, max_relative = 1e-3);
        assert_relative_eq!(params.rel_ene_spread, 0.01, max_relative = 0.05);
        assert_relative_eq!(params.beta_x, 0.01, max_relative = 0.05);
        assert_relative_eq!(params.alpha_x, 1.5, max_relative = 0.05);
        assert_relative_eq!(params.beta_y, 0.02, max_relative = 0.05);
        assert_relative_eq!(params.emitt_y, 2e-6, max_relative = 0.05);
        assert_relative_eq!(params.sigma_z, 10e-15 * SPEED_OF_LIGHT, max_relative = 0.05);
    }

    #[test]
    fn test_waist_spec() {
        let spec = GaussianBunchSpec::waist(1e-6, 1e-6, 127.0);
        assert_relative_eq!(spec.b_x, 1.27e-4, max_relative = 1e-12);
        assert_eq!(spec.a_x, 0.0);
    }

    #[test]
    fn test_seeded_generation_is_reproducible() {
        let spec = GaussianBunchSpec {
            n_part: 100,
            ..GaussianBunchSpec::default()
        };
        let a = get_gaussian_bunch_from_twiss(&spec, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        let b = get_gaussian_bunch_from_twiss(&spec, &mut ChaCha8Rng::seed_from_u64(7)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_invalid_specs() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let empty = GaussianBunchSpec {
            n_part: 0,
            ..GaussianBunchSpec::default()
        };
        assert!(get_gaussian_bunch_from_twiss(&empty, &mut rng).is_err());

        let bad_beta = GaussianBunchSpec {
            b_x: 0.0,
            ..GaussianBunchSpec::default()
        };
        match get_gaussian_bunch_from_twiss(&bad_beta, &mut rng) {
            Err(AplError::InvalidInput(msg)) => assert!(msg.contains("b_x")),
            _ => panic!("Expected InvalidInput error"),
        }
    }
}
