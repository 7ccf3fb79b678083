//! Numerical and physical parameters for the simulation
//!
//! `Parameters` holds runtime settings owned by one `World`:
//! - the fixed step size `dt`,
//! - physical constants (`g`, `k_e`, drag coefficient, air density),
//! - the global acceleration applied to every movable body,
//! - the world volume used for boundary reflection,
//! - the speed and position limits checked after integration

use crate::simulation::error::ParameterError;
use crate::simulation::states::{Axis, NVec3};

pub const DEFAULT_DT: f64 = 0.001;
pub const GRAVITATIONAL_CONSTANT: f64 = 6.67384e-11; // m^3 kg^-1 s^-2
pub const COULOMB_CONSTANT: f64 = 8987551787.997911; // 1 / (4 pi e0)
pub const SPHERE_DRAG_COEFFICIENT: f64 = 0.47;
pub const AIR_DENSITY: f64 = 1.2; // kg m^-3
pub const EARTH_GRAVITY: f64 = 9.8; // m s^-2
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Default world is a 600 x 600 x 600 box centred on the origin
pub const DEFAULT_HALF_EXTENT: f64 = 300.0;

pub const POSITION_MIN: f64 = -2_147_483_648.0; // -2^31
pub const POSITION_MAX: f64 = 2_147_483_647.0; // 2^31 - 1

#[derive(Debug, Clone, PartialEq)]
pub struct Parameters {
    pub dt: f64,               // step size
    pub g: f64,                // gravitational constant
    pub k_e: f64,              // coulomb constant
    pub drag_coefficient: f64, // Cd
    pub air_density: f64,      // rho_air
    pub speed_limit: f64,      // warn when |v| reaches this
    pub acceleration: NVec3,   // global acceleration, e.g. (0, -9.8, 0)
    pub half_extent: NVec3,    // reflection volume is [-half + r, half - r] per axis
    pub position_min: NVec3,   // warn when a component leaves [min, max]
    pub position_max: NVec3,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            dt: DEFAULT_DT,
            g: GRAVITATIONAL_CONSTANT,
            k_e: COULOMB_CONSTANT,
            drag_coefficient: SPHERE_DRAG_COEFFICIENT,
            air_density: AIR_DENSITY,
            speed_limit: SPEED_OF_LIGHT,
            acceleration: NVec3::zeros(),
            half_extent: NVec3::repeat(DEFAULT_HALF_EXTENT),
            position_min: NVec3::repeat(POSITION_MIN),
            position_max: NVec3::repeat(POSITION_MAX),
        }
    }
}

impl Parameters {
    /// Same defaults with earth gravity pulling along -y
    pub fn with_earth_gravity() -> Self {
        Self {
            acceleration: NVec3::new(0.0, -EARTH_GRAVITY, 0.0),
            ..Self::default()
        }
    }

    /// Check the fields a step divides by or compares against
    pub fn validate(&self) -> Result<(), ParameterError> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(ParameterError::InvalidStep(self.dt));
        }
        if !(self.speed_limit > 0.0) {
            return Err(ParameterError::InvalidSpeedLimit(self.speed_limit));
        }
        for axis in Axis::ALL {
            let i = axis.index();
            let value = self.half_extent[i];
            if !(value.is_finite() && value > 0.0) {
                return Err(ParameterError::InvalidHalfExtent { axis, value });
            }
            let (min, max) = (self.position_min[i], self.position_max[i]);
            if !(min < max) {
                return Err(ParameterError::EmptyPositionRange { axis, min, max });
            }
        }
        Ok(())
    }
}
