//! Particle bunch representation.
//!
//! A bunch stores the 6D phase space of an ensemble of macro-particles as
//! one array per coordinate. Positions are in metres; momenta are normalized
//! to `m_e c`. The longitudinal coordinate `xi` is measured in the co-moving
//! frame, and `prop_distance` records how far the bunch has travelled along
//! the beamline.

use ndarray::{Array1, Array2, Zip};
use serde::{Deserialize, Serialize};

use crate::error::{AplError, Result};

/// An ensemble of charged macro-particles.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParticleBunch {
    /// Charge of each macro-particle [C]; its absolute value is the statistical weight
    pub q: Array1<f64>,

    /// Horizontal position [m]
    pub x: Array1<f64>,

    /// Vertical position [m]
    pub y: Array1<f64>,

    /// Longitudinal position in the co-moving frame [m]
    pub xi: Array1<f64>,

    /// Horizontal normalized momentum
    pub px: Array1<f64>,

    /// Vertical normalized momentum
    pub py: Array1<f64>,

    /// Longitudinal normalized momentum
    pub pz: Array1<f64>,

    /// Distance travelled along the beamline [m]
    pub prop_distance: f64,

    /// Name of the bunch
    pub name: String,
}

impl ParticleBunch {
    /// Create a new bunch from its coordinate arrays.
    ///
    /// All arrays must have the same length.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        q: Array1<f64>,
        x: Array1<f64>,
        y: Array1<f64>,
        xi: Array1<f64>,
        px: Array1<f64>,
        py: Array1<f64>,
        pz: Array1<f64>,
        name: impl Into<String>,
    ) -> Result<Self> {
        let n = q.len();
        for (label, len) in [
            ("x", x.len()),
            ("y", y.len()),
            ("xi", xi.len()),
            ("px", px.len()),
            ("py", py.len()),
            ("pz", pz.len()),
        ] {
            if len != n {
                return Err(AplError::InvalidInput(format!(
                    "Coordinate '{}' has {} particles, expected {}",
                    label, len, n
                )));
            }
        }

        Ok(Self {
            q,
            x,
            y,
            xi,
            px,
            py,
            pz,
            prop_distance: 0.0,
            name: name.into(),
        })
    }

    /// Number of macro-particles.
    pub fn len(&self) -> usize {
        self.q.len()
    }

    pub fn is_empty(&self) -> bool {
        self.q.is_empty()
    }

    /// Lorentz factor of each particle.
    pub fn gamma(&self) -> Array1<f64> {
        let mut gamma = Array1::zeros(self.len());
        Zip::from(&mut gamma)
            .and(&self.px)
            .and(&self.py)
            .and(&self.pz)
            .for_each(|g, &px, &py, &pz| *g = (1.0 + px * px + py * py + pz * pz).sqrt());
        gamma
    }

    /// Horizontal divergence `px / pz` of each particle.
    pub fn x_prime(&self) -> Array1<f64> {
        &self.px / &self.pz
    }

    /// Vertical divergence `py / pz` of each particle.
    pub fn y_prime(&self) -> Array1<f64> {
        &self.py / &self.pz
    }

    /// Phase-space matrix with rows `[x, y, xi, px, py, pz, q]`.
    pub fn bunch_matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::zeros((7, self.len()));
        for (row, data) in [
            &self.x, &self.y, &self.xi, &self.px, &self.py, &self.pz, &self.q,
        ]
        .into_iter()
        .enumerate()
        {
            matrix.row_mut(row).assign(data);
        }
        matrix
    }
}
