//! Focusing-strength search.
//!
//! The solver wraps a scalar minimizer around a [`Propagator`]: each trial
//! builds the beamline `[drift1, PlasmaLens(k), drift2]`, tracks a copy of the
//! input bunch to the focal plane and reads one statistic of the final state.

use std::cell::Cell;
use std::fmt;
use std::time::{Duration, Instant};

use crate::analysis::analyze_bunch;
use crate::beamline::{Beamline, Drift, PlasmaLens};
use crate::bunch::ParticleBunch;
use crate::error::{AplError, Result};
use crate::propagator::{LinearTracker, Propagator};
use crate::scalar::{minimize_scalar, ScalarObjective};

use super::config::{FocusConfig, FocusStatistic};
use super::current::plasma_lens_current;

/// Objective of the focusing search: the chosen statistic at the focal plane
/// as a function of the lens focusing strength.
///
/// Negative (or NaN) strengths return the configured penalty without
/// invoking the propagator.
pub struct FocusObjective<'a, P: Propagator> {
    propagator: &'a P,
    bunch: &'a ParticleBunch,
    drift1: Drift,
    drift2: Drift,
    lens_length: f64,
    lens_n_out: Option<usize>,
    statistic: FocusStatistic,
    penalty: f64,
    evaluations: Cell<usize>,
}

impl<'a, P: Propagator> FocusObjective<'a, P> {
    /// Beamline for a trial focusing strength `k`.
    pub fn beamline(&self, k: f64) -> Beamline {
        let mut lens = PlasmaLens::new(self.lens_length, k);
        lens.n_out = self.lens_n_out;
        Beamline::new(vec![self.drift1.into(), lens.into(), self.drift2.into()])
    }

    /// Track a copy of the bunch to the focal plane for strength `k`.
    pub fn propagate(&self, k: f64) -> Result<Vec<ParticleBunch>> {
        self.propagator.propagate(&self.beamline(k), self.bunch.clone())
    }

    /// Bunch state at the focal plane for strength `k`.
    pub fn focal_state(&self, k: f64) -> Result<ParticleBunch> {
        self.propagate(k)?.pop().ok_or_else(|| {
            AplError::PropagationFailure("propagator returned no bunch states".to_string())
        })
    }

    /// Number of objective evaluations that invoked the propagator.
    pub fn evaluations(&self) -> usize {
        self.evaluations.get()
    }
}

impl<P: Propagator> ScalarObjective for FocusObjective<'_, P> {
    fn eval(&self, k: f64) -> Result<f64> {
        if !(k >= 0.0) {
            return Ok(self.penalty);
        }

        self.evaluations.set(self.evaluations.get() + 1);
        let state = self.focal_state(k)?;
        let value = self.statistic.extract(&analyze_bunch(&state)?);
        if !value.is_finite() {
            return Err(AplError::FunctionEvaluation(format!(
                "{:?} is not finite at k = {:e} T/m",
                self.statistic, k
            )));
        }
        log::debug!("k = {:.9e} T/m -> {:?} = {:.6e}", k, self.statistic, value);
        Ok(value)
    }
}

/// Result of a focusing-strength search.
#[derive(Debug, Clone)]
pub struct FocusSolution {
    /// Optimal focusing strength [T/m]
    pub k_opt: f64,

    /// Lens drive current at `k_opt` [A], when a lens radius was given
    pub current: Option<f64>,

    /// Bunch at the focal plane for `k_opt`, when requested
    pub focused_bunch: Option<ParticleBunch>,

    /// Objective value at `k_opt`
    pub objective_value: f64,

    /// Minimizer iterations
    pub iterations: usize,

    /// Objective evaluations, including penalized ones
    pub func_evals: usize,

    /// Wall time spent in the search
    pub elapsed: Duration,
}

impl fmt::Display for FocusSolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Focusing Solution:")?;
        writeln!(f, "  k_opt: {:.6} T/m", self.k_opt)?;
        if let Some(current) = self.current {
            writeln!(f, "  Current: {:.2} A", current)?;
        }
        writeln!(f, "  Objective: {:.6e}", self.objective_value)?;
        writeln!(f, "  Iterations: {}", self.iterations)?;
        writeln!(f, "  Function evaluations: {}", self.func_evals)?;
        writeln!(f, "  Elapsed: {:.2} s", self.elapsed.as_secs_f64())?;
        Ok(())
    }
}

/// Finds the plasma lens focusing strength that minimizes the beam size at a
/// focal plane.
#[derive(Debug, Clone)]
pub struct FocusStrengthSolver<P: Propagator> {
    propagator: P,
    config: FocusConfig,
}

impl FocusStrengthSolver<LinearTracker> {
    /// Create a solver using the linear tracker and default configuration.
    pub fn linear() -> Self {
        Self::new(LinearTracker::new())
    }
}

impl<P: Propagator> FocusStrengthSolver<P> {
    /// Create a new solver with default configuration.
    pub fn new(propagator: P) -> Self {
        Self {
            propagator,
            config: FocusConfig::default(),
        }
    }

    /// Create a new solver with the given configuration.
    pub fn with_config(propagator: P, config: FocusConfig) -> Self {
        Self { propagator, config }
    }

    pub fn config(&self) -> &FocusConfig {
        &self.config
    }

    pub fn propagator(&self) -> &P {
        &self.propagator
    }

    /// Build the objective for a fixed geometry.
    pub fn objective<'a>(
        &'a self,
        bunch: &'a ParticleBunch,
        drift1_length: f64,
        lens_length: f64,
        drift2_length: f64,
    ) -> FocusObjective<'a, P> {
        let mut drift1 = Drift::new(drift1_length);
        let mut drift2 = Drift::new(drift2_length);
        drift1.n_out = self.config.drift_n_out;
        drift2.n_out = self.config.drift_n_out;

        FocusObjective {
            propagator: &self.propagator,
            bunch,
            drift1,
            drift2,
            lens_length,
            lens_n_out: self.config.lens_n_out,
            statistic: self.config.statistic,
            penalty: self.config.penalty,
            evaluations: Cell::new(0),
        }
    }

    /// Find the focusing strength for the geometry
    /// `drift1_length + lens_length + drift2_length` = distance to the focal plane.
    ///
    /// Lengths are not validated here: an invalid geometry is rejected by the
    /// propagator and surfaces as its error.
    ///
    /// # Arguments
    ///
    /// * `bunch` - The bunch to focus; it is never modified
    /// * `drift1_length` - Drift before the lens [m]
    /// * `lens_length` - Lens length [m]
    /// * `drift2_length` - Drift from the lens exit to the focal plane [m]
    /// * `lens_radius` - Lens radius [m]; if given, the drive current is reported
    /// * `return_focused_bunch` - Whether to track the bunch once more at `k_opt`
    ///
    /// # Errors
    ///
    /// * `AplError::InvalidInput` for a non-positive lens radius or invalid
    ///   minimizer settings
    /// * `AplError::OptimizationFailure` carrying the best strength found if
    ///   the minimizer does not converge
    /// * any propagator error, unchanged
    pub fn solve(
        &self,
        bunch: &ParticleBunch,
        drift1_length: f64,
        lens_length: f64,
        drift2_length: f64,
        lens_radius: Option<f64>,
        return_focused_bunch: bool,
    ) -> Result<FocusSolution> {
        let start = Instant::now();

        if let Some(radius) = lens_radius {
            if !(radius > 0.0 && radius.is_finite()) {
                return Err(AplError::InvalidInput(format!(
                    "Lens radius must be positive, got {}",
                    radius
                )));
            }
        }

        let objective = self.objective(bunch, drift1_length, lens_length, drift2_length);
        let result = minimize_scalar(&objective, &self.config.scalar)?;
        let k_opt = result.x;

        let current = match lens_radius {
            Some(radius) => {
                let avg_ene = analyze_bunch(bunch)?.avg_ene;
                let current = plasma_lens_current(k_opt, radius, avg_ene);
                log::info!(
                    "Required current in APL with radius {:.1} mm is {:.2} A",
                    radius * 1e3,
                    current
                );
                Some(current)
            }
            None => None,
        };

        let focused_bunch = if return_focused_bunch {
            Some(objective.focal_state(k_opt)?)
        } else {
            None
        };

        let elapsed = start.elapsed();
        log::info!(
            "Optimisation took {:.2} seconds ({} tracked trials).",
            elapsed.as_secs_f64(),
            objective.evaluations()
        );

        Ok(FocusSolution {
            k_opt,
            current,
            focused_bunch,
            objective_value: result.fun,
            iterations: result.iterations,
            func_evals: result.func_evals,
            elapsed,
        })
    }
}

/// Find the focusing strength of a lens starting at `apl_start_z` that
/// focuses `bunch` at `focal_plane`, using the linear tracker.
///
/// The trailing drift is `focal_plane - apl_length - apl_start_z`; a focal
/// plane inside the lens yields a propagation error.
pub fn calculate_apl_strength(
    bunch: &ParticleBunch,
    apl_start_z: f64,
    apl_length: f64,
    focal_plane: f64,
    apl_radius: Option<f64>,
    return_phasespace: bool,
) -> Result<FocusSolution> {
    FocusStrengthSolver::linear().solve(
        bunch,
        apl_start_z,
        apl_length,
        focal_plane - apl_length - apl_start_z,
        apl_radius,
        return_phasespace,
    )
}
