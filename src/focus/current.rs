//! Relation between plasma lens focusing strength and drive current.
//!
//! `I = k * 2 pi r^2 E m_e c / (mu_0 e)`, with `r` the lens radius and `E`
//! the mean Lorentz factor of the bunch.

use std::f64::consts::PI;

use crate::constants::{ELECTRON_MASS, ELEMENTARY_CHARGE, MU_0, SPEED_OF_LIGHT};

fn current_per_unit_strength(radius: f64, avg_ene: f64) -> f64 {
    2.0 * PI * radius.powi(2) * avg_ene * ELECTRON_MASS * SPEED_OF_LIGHT / (MU_0 * ELEMENTARY_CHARGE)
}

/// Drive current [A] of a lens of radius `radius` [m] for focusing strength `k`.
pub fn plasma_lens_current(k: f64, radius: f64, avg_ene: f64) -> f64 {
    k * current_per_unit_strength(radius, avg_ene)
}

/// Focusing strength corresponding to a drive current `current` [A].
pub fn focusing_strength_from_current(current: f64, radius: f64, avg_ene: f64) -> f64 {
    current / current_per_unit_strength(radius, avg_ene)
}
