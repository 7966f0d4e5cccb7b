//! Beamline elements and linear particle tracking.
//!
//! A beamline is an ordered sequence of drifts and plasma lenses. Tracking
//! applies the exact linear transfer map of each element to every particle.
//! Plasma lenses are chromatic: the focusing constant of each particle is
//! `K = e g / (m_e c gamma)`, where `g` is the lens field gradient.
//!
//! Element constructors never fail. Geometry is checked when a bunch is
//! tracked, so an invalid element surfaces as
//! [`AplError::PropagationFailure`] from [`Beamline::track`].

use ndarray::Zip;
use serde::{Deserialize, Serialize};

use crate::bunch::ParticleBunch;
use crate::constants::E_OVER_MEC;
use crate::error::{AplError, Result};

/// Field-free drift.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Drift {
    /// Length [m]
    pub length: f64,

    /// Number of evenly spaced output states along the element (default: exit only)
    pub n_out: Option<usize>,
}

impl Drift {
    pub fn new(length: f64) -> Self {
        Self {
            length,
            n_out: None,
        }
    }

    /// Set the number of output states along the drift.
    pub fn with_n_out(mut self, n_out: usize) -> Self {
        self.n_out = Some(n_out);
        self
    }
}

/// Active plasma lens with a uniform, linear focusing gradient.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlasmaLens {
    /// Length [m]
    pub length: f64,

    /// Focusing gradient [T/m]
    pub foc_strength: f64,

    /// Number of evenly spaced output states along the element (default: exit only)
    pub n_out: Option<usize>,
}

impl PlasmaLens {
    pub fn new(length: f64, foc_strength: f64) -> Self {
        Self {
            length,
            foc_strength,
            n_out: None,
        }
    }

    /// Set the number of output states along the lens.
    pub fn with_n_out(mut self, n_out: usize) -> Self {
        self.n_out = Some(n_out);
        self
    }
}

/// A single beamline element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BeamlineElement {
    Drift(Drift),
    PlasmaLens(PlasmaLens),
}

impl From<Drift> for BeamlineElement {
    fn from(drift: Drift) -> Self {
        BeamlineElement::Drift(drift)
    }
}

impl From<PlasmaLens> for BeamlineElement {
    fn from(lens: PlasmaLens) -> Self {
        BeamlineElement::PlasmaLens(lens)
    }
}

impl BeamlineElement {
    /// Length of the element [m].
    pub fn length(&self) -> f64 {
        match self {
            BeamlineElement::Drift(d) => d.length,
            BeamlineElement::PlasmaLens(l) => l.length,
        }
    }

    fn n_out(&self) -> usize {
        let n_out = match self {
            BeamlineElement::Drift(d) => d.n_out,
            BeamlineElement::PlasmaLens(l) => l.n_out,
        };
        n_out.unwrap_or(1).max(1)
    }

    fn validate(&self) -> Result<()> {
        let length = self.length();
        if !length.is_finite() || length < 0.0 {
            return Err(AplError::PropagationFailure(format!(
                "{} length must be finite and non-negative, got {}",
                self.kind(),
                length
            )));
        }
        if let BeamlineElement::PlasmaLens(lens) = self {
            if !lens.foc_strength.is_finite() {
                return Err(AplError::PropagationFailure(format!(
                    "Plasma lens focusing strength must be finite, got {}",
                    lens.foc_strength
                )));
            }
        }
        Ok(())
    }

    /// Copy of the element with a negative length no deeper than `tolerance`
    /// replaced by zero.
    fn with_rounding_cleared(&self, tolerance: f64) -> Self {
        let length = self.length();
        if !(length < 0.0 && length >= -tolerance) {
            return *self;
        }
        match *self {
            BeamlineElement::Drift(d) => BeamlineElement::Drift(Drift { length: 0.0, ..d }),
            BeamlineElement::PlasmaLens(l) => {
                BeamlineElement::PlasmaLens(PlasmaLens { length: 0.0, ..l })
            }
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            BeamlineElement::Drift(_) => "Drift",
            BeamlineElement::PlasmaLens(_) => "Plasma lens",
        }
    }

    /// Advance `bunch` by a distance `s` into the element.
    fn push(&self, bunch: &mut ParticleBunch, s: f64) {
        match self {
            BeamlineElement::Drift(_) => push_drift(bunch, s),
            BeamlineElement::PlasmaLens(lens) => push_plasma_lens(bunch, s, lens.foc_strength),
        }
        bunch.prop_distance += s;
    }

    /// Track a bunch through the element.
    ///
    /// Returns the states at the `n_out` evenly spaced output points; the last
    /// one is the state at the element exit.
    pub fn track(&self, bunch: ParticleBunch) -> Result<Vec<ParticleBunch>> {
        self.validate()?;

        let n_out = self.n_out();
        let length = self.length();
        let mut states = Vec::with_capacity(n_out);
        for i in 1..n_out {
            let mut state = bunch.clone();
            self.push(&mut state, length * i as f64 / n_out as f64);
            states.push(state);
        }

        let mut exit = bunch;
        self.push(&mut exit, length);
        states.push(exit);
        Ok(states)
    }
}

fn push_drift(bunch: &mut ParticleBunch, s: f64) {
    Zip::from(&mut bunch.x)
        .and(&mut bunch.y)
        .and(&bunch.px)
        .and(&bunch.py)
        .and(&bunch.pz)
        .par_for_each(|x, y, &px, &py, &pz| {
            *x += px / pz * s;
            *y += py / pz * s;
        });
}

/// Thick-lens transfer map `(u, u') -> (u, u')` over a length `s` for a
/// focusing constant `k` [1/m^2]. Negative `k` defocuses.
fn lens_map(k: f64, s: f64) -> [[f64; 2]; 2] {
    if k > 0.0 {
        let w = k.sqrt();
        let (sin, cos) = (w * s).sin_cos();
        [[cos, sin / w], [-w * sin, cos]]
    } else if k < 0.0 {
        let w = (-k).sqrt();
        let (sinh, cosh) = ((w * s).sinh(), (w * s).cosh());
        [[cosh, sinh / w], [w * sinh, cosh]]
    } else {
        [[1.0, s], [0.0, 1.0]]
    }
}

fn push_plasma_lens(bunch: &mut ParticleBunch, s: f64, foc_strength: f64) {
    Zip::from(&mut bunch.x)
        .and(&mut bunch.y)
        .and(&mut bunch.px)
        .and(&mut bunch.py)
        .and(&bunch.pz)
        .par_for_each(|x, y, px, py, &pz| {
            let gamma = (1.0 + *px * *px + *py * *py + pz * pz).sqrt();
            let m = lens_map(E_OVER_MEC * foc_strength / gamma, s);

            let xp = *px / pz;
            let yp = *py / pz;
            let (x0, y0) = (*x, *y);
            *x = m[0][0] * x0 + m[0][1] * xp;
            *px = (m[1][0] * x0 + m[1][1] * xp) * pz;
            *y = m[0][0] * y0 + m[0][1] * yp;
            *py = (m[1][0] * y0 + m[1][1] * yp) * pz;
        });
}

/// Relative size, with respect to the summed element lengths, of a negative
/// element length that is still tracked as zero.
const LENGTH_TOLERANCE: f64 = 1e-12;

/// An ordered sequence of beamline elements.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Beamline {
    elements: Vec<BeamlineElement>,
}

impl Beamline {
    pub fn new(elements: Vec<BeamlineElement>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[BeamlineElement] {
        &self.elements
    }

    /// Total length of the beamline [m].
    pub fn length(&self) -> f64 {
        self.elements.iter().map(BeamlineElement::length).sum()
    }

    fn span(&self) -> f64 {
        self.elements
            .iter()
            .map(|e| e.length().abs())
            .filter(|l| l.is_finite())
            .sum()
    }

    /// Track a bunch through all elements in order.
    ///
    /// Returns the output states of every element, preceded by the initial
    /// state if `out_initial` is set. An empty beamline returns the initial
    /// state alone.
    ///
    /// # Errors
    ///
    /// Returns `AplError::PropagationFailure` for an empty bunch or an element
    /// with invalid geometry.
    pub fn track(&self, bunch: ParticleBunch, out_initial: bool) -> Result<Vec<ParticleBunch>> {
        if bunch.is_empty() {
            return Err(AplError::PropagationFailure(format!(
                "Bunch '{}' contains no particles",
                bunch.name
            )));
        }

        let mut states = Vec::new();
        if out_initial || self.elements.is_empty() {
            states.push(bunch.clone());
        }

        // Lengths built by subtracting positions can land a few ulps below zero.
        let tolerance = LENGTH_TOLERANCE * self.span();
        let mut current = bunch;
        for element in &self.elements {
            let element = element.with_rounding_cleared(tolerance);
            states.extend(element.track(current)?);
            current = states.last().cloned().ok_or_else(|| {
                AplError::PropagationFailure(format!("{} produced no output", element.kind()))
            })?;
        }

        Ok(states)
    }
}

impl FromIterator<BeamlineElement> for Beamline {
    fn from_iter<I: IntoIterator<Item = BeamlineElement>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn test_bunch() -> ParticleBunch {
        ParticleBunch::new(
            array![1e-12, 1e-12, 1e-12],
            array![1e-6, -2e-6, 0.0],
            array![0.0, 1e-6, -1e-6],
            array![0.0, 0.0, 0.0],
            array![0.1, 0.0, -0.2],
            array![0.0, 0.05, 0.0],
            array![100.0, 100.0, 100.0],
            "test",
        )
        .unwrap()
    }

    #[test]
    fn test_drift_moves_along_divergence() {
        let states = BeamlineElement::from(Drift::new(0.5)).track(test_bunch()).unwrap();
        assert_eq!(states.len(), 1);
        let out = &states[0];
        assert_relative_eq!(out.x[0], 1e-6 + 1e-3 * 0.5, max_relative = 1e-12);
        assert_relative_eq!(out.y[1], 1e-6 + 5e-4 * 0.5, max_relative = 1e-12);
        assert_eq!(out.px, test_bunch().px);
        assert_relative_eq!(out.prop_distance, 0.5);
    }

    #[test]
    fn test_zero_length_drift_is_identity() {
        let bunch = test_bunch();
        let states = BeamlineElement::from(Drift::new(0.0)).track(bunch.clone()).unwrap();
        assert_eq!(states[0], bunch);
    }

    #[test]
    fn test_negative_drift_is_propagation_failure() {
        let result = Beamline::new(vec![Drift::new(-0.1).into()]).track(test_bunch(), false);
        match result {
            Err(AplError::PropagationFailure(msg)) => assert!(msg.contains("-0.1")),
            _ => panic!("Expected PropagationFailure"),
        }
    }

    #[test]
    fn test_unpowered_lens_equals_drift() {
        let lens = BeamlineElement::from(PlasmaLens::new(0.1, 0.0)).track(test_bunch()).unwrap();
        let drift = BeamlineElement::from(Drift::new(0.1)).track(test_bunch()).unwrap();
        for i in 0..3 {
            assert_relative_eq!(lens[0].x[i], drift[0].x[i], epsilon = 1e-18);
            assert_relative_eq!(lens[0].px[i], drift[0].px[i], epsilon = 1e-15);
        }
    }

    #[test]
    fn test_lens_focuses_towards_axis() {
        let mut bunch = test_bunch();
        bunch.px.fill(0.0);
        bunch.py.fill(0.0);
        let states = BeamlineElement::from(PlasmaLens::new(0.01, 500.0))
            .track(bunch)
            .unwrap();
        let out = &states[0];
        // Off-axis particles acquire momentum pointing back to the axis.
        assert!(out.px[0] < 0.0);
        assert!(out.px[1] > 0.0);
        assert!(out.x[0].abs() < 1e-6);
        assert_eq!(out.px[2], 0.0);
    }

    #[test]
    fn test_lens_map_is_symplectic() {
        for k in [-50.0, 0.0, 120.0] {
            let m = lens_map(k, 0.3);
            let det = m[0][0] * m[1][1] - m[0][1] * m[1][0];
            assert_relative_eq!(det, 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_n_out_states_are_evenly_spaced() {
        let beamline = Beamline::new(vec![
            Drift::new(0.2).with_n_out(4).into(),
            PlasmaLens::new(0.1, 10.0).with_n_out(2).into(),
        ]);
        let states = beamline.track(test_bunch(), true).unwrap();
        assert_eq!(states.len(), 1 + 4 + 2);
        assert_eq!(states[0].prop_distance, 0.0);
        assert_relative_eq!(states[1].prop_distance, 0.05, epsilon = 1e-15);
        assert_relative_eq!(states[4].prop_distance, 0.2, epsilon = 1e-15);
        assert_relative_eq!(states[6].prop_distance, 0.3, epsilon = 1e-15);
        assert_relative_eq!(beamline.length(), 0.3, epsilon = 1e-15);
    }

    #[test]
    fn test_empty_bunch_is_rejected() {
        let mut bunch = test_bunch();
        bunch.q = ndarray::Array1::zeros(0);
        bunch.x = ndarray::Array1::zeros(0);
        bunch.y = ndarray::Array1::zeros(0);
        bunch.xi = ndarray::Array1::zeros(0);
        bunch.px = ndarray::Array1::zeros(0);
        bunch.py = ndarray::Array1::zeros(0);
        bunch.pz = ndarray::Array1::zeros(0);
        assert!(matches!(
            Beamline::new(vec![Drift::new(1.0).into()]).track(bunch, false),
            Err(AplError::PropagationFailure(_))
        ));
    }

    #[test]
    fn test_rounding_residue_length_is_tracked_as_zero() {
        let beamline = Beamline::new(vec![
            Drift::new(0.05).into(),
            PlasmaLens::new(0.1, 10.0).into(),
            Drift::new(0.15 - 0.1 - 0.05).into(),
        ]);
        assert!(beamline.elements()[2].length() < 0.0);

        let states = beamline.track(test_bunch(), false).unwrap();
        assert_eq!(states.len(), 3);
        assert_eq!(states[2], states[1]);
    }

    #[test]
    fn test_negative_length_beyond_rounding_is_rejected() {
        let beamline = Beamline::new(vec![
            Drift::new(0.05).into(),
            PlasmaLens::new(0.1, 10.0).into(),
            Drift::new(-1e-9).into(),
        ]);
        match beamline.track(test_bunch(), false) {
            Err(AplError::PropagationFailure(msg)) => assert!(msg.contains("Drift")),
            other => panic!("Expected PropagationFailure, got {:?}", other.map(|s| s.len())),
        }
    }
}
