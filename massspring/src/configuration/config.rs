//! Configuration types for loading simulation scenarios from YAML.
//!
//! This module defines a thin, `serde`-deserializable representation of a
//! simulation scene. A scenario consists of:
//!
//! - [`ParametersConfig`] – timestep, physical constants, limits and world size
//! - [`BodyConfig`]       – initial state, flags and color for each body
//! - [`SpringConfig`]     – explicit springs, referencing bodies by list index
//! - [`ScenarioConfig`]   – top-level wrapper used to load a scenario from YAML
//!
//! Every field has a default, so a scenario only spells out what differs.
//!
//! # YAML format
//! A pendulum: one fixed anchor, one free bob, earth gravity.
//!
//! ```yaml
//! parameters:
//!   dt: 0.001
//!   acceleration: [0.0, -9.8, 0.0]
//!
//! bodies:
//!   - x: [0.0, 0.0, 0.0]
//!     m: 10.0
//!     r: 10.0
//!     movable: false
//!     color: [0, 255, 0]
//!   - x: [200.0, -100.0, 0.0]
//!     m: 100.0
//!     r: 10.0
//!
//! springs:
//!   - a: 0
//!     b: 1
//!     k: 1500000.0
//!     nl: 0.0            # 0 -> use the distance at creation time
//! ```

use serde::Deserialize;

use crate::simulation::params::{self, Parameters};
use crate::simulation::states::{Capabilities, Color, NVec3};

/// Global numerical and physical parameters for a scenario
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct ParametersConfig {
    pub dt: f64,                 // time step size
    pub g: f64,                  // gravitational constant
    pub k_e: f64,                // coulomb constant
    pub drag_coefficient: f64,   // Cd, 0.47 for a sphere
    pub air_density: f64,        // kg m^-3
    pub speed_limit: f64,        // speed that triggers a warning
    pub acceleration: [f64; 3],  // global acceleration
    pub half_extent: [f64; 3],   // half size of the reflecting box
    pub position_min: [f64; 3],  // numeric range checked after each step
    pub position_max: [f64; 3],
}

impl Default for ParametersConfig {
    fn default() -> Self {
        let p = Parameters::default();
        Self {
            dt: p.dt,
            g: p.g,
            k_e: p.k_e,
            drag_coefficient: p.drag_coefficient,
            air_density: p.air_density,
            speed_limit: p.speed_limit,
            acceleration: [0.0; 3],
            half_extent: [params::DEFAULT_HALF_EXTENT; 3],
            position_min: [params::POSITION_MIN; 3],
            position_max: [params::POSITION_MAX; 3],
        }
    }
}

impl From<&ParametersConfig> for Parameters {
    fn from(c: &ParametersConfig) -> Self {
        Parameters {
            dt: c.dt,
            g: c.g,
            k_e: c.k_e,
            drag_coefficient: c.drag_coefficient,
            air_density: c.air_density,
            speed_limit: c.speed_limit,
            acceleration: NVec3::from(c.acceleration),
            half_extent: NVec3::from(c.half_extent),
            position_min: NVec3::from(c.position_min),
            position_max: NVec3::from(c.position_max),
        }
    }
}

/// Configuration for a single body's initial state
#[derive(Deserialize, Debug, Clone)]
#[serde(default, deny_unknown_fields)]
pub struct BodyConfig {
    pub x: [f64; 3], // initial position
    pub v: [f64; 3], // initial velocity
    pub m: f64,      // mass, must be > 0
    pub r: f64,      // radius, must be > 0
    pub q: f64,      // electric charge
    pub movable: bool,
    pub solid: bool,
    pub bound: bool,
    pub gravitational: bool,
    pub resistible: bool,
    pub electrical: bool,
    pub conductive: bool, // requires electrical
    pub color: Color,
    pub visible: bool,
}

impl Default for BodyConfig {
    fn default() -> Self {
        let caps = Capabilities::default();
        Self {
            x: [0.0; 3],
            v: [0.0; 3],
            m: 1.0,
            r: 1.0,
            q: 0.0,
            movable: caps.movable,
            solid: caps.solid,
            bound: caps.bound,
            gravitational: caps.gravitational,
            resistible: caps.resistible,
            electrical: caps.electrical,
            conductive: caps.conductive,
            color: Color::WHITE,
            visible: true,
        }
    }
}

impl BodyConfig {
    pub fn capabilities(&self) -> Capabilities {
        Capabilities {
            movable: self.movable,
            solid: self.solid,
            bound: self.bound,
            gravitational: self.gravitational,
            resistible: self.resistible,
            electrical: self.electrical,
            conductive: self.conductive,
        }
    }
}

/// An explicit spring between two bodies of the `bodies` list
#[derive(Deserialize, Debug, Clone)]
#[serde(deny_unknown_fields)]
pub struct SpringConfig {
    pub a: usize, // index into bodies
    pub b: usize, // index into bodies
    #[serde(default = "default_stiffness")]
    pub k: f64,
    #[serde(default)]
    pub nl: f64, // 0 -> current distance
    #[serde(default)]
    pub color: Color,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_stiffness() -> f64 {
    1.0
}

fn default_visible() -> bool {
    true
}

/// Top-level scenario configuration loaded from YAML.
#[derive(Deserialize, Debug, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct ScenarioConfig {
    pub parameters: ParametersConfig, // Global numerical and physical parameters
    pub bodies: Vec<BodyConfig>,      // Bodies that define the initial state
    pub springs: Vec<SpringConfig>,   // Explicit springs between bodies
}

impl ScenarioConfig {
    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(text)
    }

    pub fn from_reader<R: std::io::Read>(reader: R) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_reader(reader)
    }
}
