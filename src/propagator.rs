//! Bunch propagation service.
//!
//! The focusing solver only needs something that maps a beamline and an
//! input bunch to the sequence of output states. [`LinearTracker`] is the
//! reference implementation; any other tracking code can be plugged in by
//! implementing [`Propagator`].

use crate::beamline::Beamline;
use crate::bunch::ParticleBunch;
use crate::error::Result;

/// A trait representing a particle tracking engine.
pub trait Propagator {
    /// Propagate `bunch` through `beamline`.
    ///
    /// The bunch is taken by value: callers that need the original afterwards
    /// pass a clone.
    ///
    /// # Returns
    ///
    /// * The bunch states at each output point, in order; the last element is
    ///   the state at the end of the beamline
    fn propagate(&self, beamline: &Beamline, bunch: ParticleBunch) -> Result<Vec<ParticleBunch>>;
}

impl<P: Propagator + ?Sized> Propagator for &P {
    fn propagate(&self, beamline: &Beamline, bunch: ParticleBunch) -> Result<Vec<ParticleBunch>> {
        (**self).propagate(beamline, bunch)
    }
}

/// Linear transfer-map tracker.
#[derive(Debug, Clone, Copy, Default)]
pub struct LinearTracker {
    /// Whether the initial state is included in the output sequence
    pub out_initial: bool,
}

impl LinearTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Include the initial state in the output sequence.
    pub fn with_out_initial(mut self, out_initial: bool) -> Self {
        self.out_initial = out_initial;
        self
    }
}

impl Propagator for LinearTracker {
    fn propagate(&self, beamline: &Beamline, bunch: ParticleBunch) -> Result<Vec<ParticleBunch>> {
        beamline.track(bunch, self.out_initial)
    }
}
