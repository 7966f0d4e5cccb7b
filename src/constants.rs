//! Physical constants (CODATA 2018), SI units.

/// Elementary charge [C].
pub const ELEMENTARY_CHARGE: f64 = 1.602_176_634e-19;

/// Electron mass [kg].
pub const ELECTRON_MASS: f64 = 9.109_383_701_5e-31;

/// Speed of light in vacuum [m/s].
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Vacuum magnetic permeability [N/A^2].
pub const MU_0: f64 = 1.256_637_062_12e-6;

/// `e / (m_e c)` [1/(T m)]: converts a field gradient into a focusing
/// constant for a particle with unit Lorentz factor.
pub const E_OVER_MEC: f64 = ELEMENTARY_CHARGE / (ELECTRON_MASS * SPEED_OF_LIGHT);
