//! Core state types for the mass/spring simulation.
//!
//! Defines the point-mass [`Body`], its capability flags and presentation
//! color, and the handle type the rest of the engine uses to refer to bodies.
//! Bodies are validated when they are built; a `Body` value that exists always
//! satisfies `m > 0`, `r > 0` and `conductive => electrical`.

use std::f64::consts::PI;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::simulation::arena::Handle;
use crate::simulation::error::BodyError;

pub type NVec3 = Vector3<f64>;

/// Handle to a body owned by a [`World`](crate::simulation::engine::World)
pub type BodyId = Handle<Body>;

/// Coordinate axis, used when reporting per-axis conditions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }
}

/// RGB color carried through for the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "[u8; 3]", into = "[u8; 3]")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const WHITE: Color = Color::rgb(255, 255, 255);
    pub const RED: Color = Color::rgb(255, 0, 0);
    pub const GREEN: Color = Color::rgb(0, 255, 0);
    pub const BLUE: Color = Color::rgb(15, 147, 245);
    pub const MAGENTA: Color = Color::rgb(255, 0, 255);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::WHITE
    }
}

impl From<[u8; 3]> for Color {
    fn from([r, g, b]: [u8; 3]) -> Self {
        Color { r, g, b }
    }
}

impl From<Color> for [u8; 3] {
    fn from(c: Color) -> Self {
        [c.r, c.g, c.b]
    }
}

/// Which interactions and constraints a body takes part in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Capabilities {
    pub movable: bool,
    pub solid: bool,
    pub bound: bool,
    pub gravitational: bool,
    pub resistible: bool,
    pub electrical: bool,
    pub conductive: bool,
}

impl Default for Capabilities {
    fn default() -> Self {
        Self {
            movable: true,
            solid: true,
            bound: true,
            gravitational: false,
            resistible: false,
            electrical: false,
            conductive: false,
        }
    }
}

/// A point mass, modelled as a sphere of radius `r` for collisions and drag
#[derive(Debug, Clone)]
pub struct Body {
    pub x: NVec3, // position
    pub v: NVec3, // velocity
    f: NVec3,     // accumulated force, reset every tick
    m: f64,
    r: f64,
    q: f64,
    caps: Capabilities,
    pub color: Color,
    pub visible: bool,
}

impl Body {
    /// Start building a body from the library defaults
    pub fn builder() -> BodyBuilder {
        BodyBuilder::default()
    }

    pub fn mass(&self) -> f64 {
        self.m
    }

    pub fn radius(&self) -> f64 {
        self.r
    }

    pub fn charge(&self) -> f64 {
        self.q
    }

    pub fn set_charge(&mut self, q: f64) {
        self.q = q;
    }

    pub fn force(&self) -> NVec3 {
        self.f
    }

    pub fn capabilities(&self) -> Capabilities {
        self.caps
    }

    pub fn is_movable(&self) -> bool {
        self.caps.movable
    }

    pub fn is_solid(&self) -> bool {
        self.caps.solid
    }

    pub fn is_bound(&self) -> bool {
        self.caps.bound
    }

    pub fn is_gravitational(&self) -> bool {
        self.caps.gravitational
    }

    pub fn is_resistible(&self) -> bool {
        self.caps.resistible
    }

    pub fn is_electrical(&self) -> bool {
        self.caps.electrical
    }

    pub fn is_conductive(&self) -> bool {
        self.caps.conductive
    }

    /// Reset the force accumulator to zero
    pub fn empty_forces(&mut self) {
        self.f = NVec3::zeros();
    }

    /// Add a force contribution; the only way `f` changes during a tick
    pub fn apply_force(&mut self, f: NVec3) {
        self.f += f;
    }

    pub fn speed(&self) -> f64 {
        self.v.norm()
    }

    /// Area of the circle the sphere presents to a flow, `pi * r^2`
    pub fn cross_section(&self) -> f64 {
        PI * self.r * self.r
    }

    pub fn force_magnitude(&self) -> f64 {
        self.f.norm()
    }
}

/// Validating builder for [`Body`]
#[derive(Debug, Clone)]
pub struct BodyBuilder {
    x: NVec3,
    v: NVec3,
    m: f64,
    r: f64,
    q: f64,
    caps: Capabilities,
    color: Color,
    visible: bool,
}

impl Default for BodyBuilder {
    fn default() -> Self {
        Self {
            x: NVec3::zeros(),
            v: NVec3::zeros(),
            m: 1.0,
            r: 1.0,
            q: 0.0,
            caps: Capabilities::default(),
            color: Color::WHITE,
            visible: true,
        }
    }
}

impl BodyBuilder {
    pub fn position(mut self, x: f64, y: f64, z: f64) -> Self {
        self.x = NVec3::new(x, y, z);
        self
    }

    pub fn velocity(mut self, vx: f64, vy: f64, vz: f64) -> Self {
        self.v = NVec3::new(vx, vy, vz);
        self
    }

    pub fn mass(mut self, m: f64) -> Self {
        self.m = m;
        self
    }

    pub fn radius(mut self, r: f64) -> Self {
        self.r = r;
        self
    }

    pub fn charge(mut self, q: f64) -> Self {
        self.q = q;
        self
    }

    pub fn capabilities(mut self, caps: Capabilities) -> Self {
        self.caps = caps;
        self
    }

    pub fn movable(mut self, yes: bool) -> Self {
        self.caps.movable = yes;
        self
    }

    pub fn solid(mut self, yes: bool) -> Self {
        self.caps.solid = yes;
        self
    }

    pub fn bound(mut self, yes: bool) -> Self {
        self.caps.bound = yes;
        self
    }

    pub fn gravitational(mut self, yes: bool) -> Self {
        self.caps.gravitational = yes;
        self
    }

    pub fn resistible(mut self, yes: bool) -> Self {
        self.caps.resistible = yes;
        self
    }

    pub fn electrical(mut self, yes: bool) -> Self {
        self.caps.electrical = yes;
        self
    }

    pub fn conductive(mut self, yes: bool) -> Self {
        self.caps.conductive = yes;
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn visible(mut self, yes: bool) -> Self {
        self.visible = yes;
        self
    }

    /// Check the invariants and produce the body
    pub fn build(self) -> Result<Body, BodyError> {
        if !self.m.is_finite() {
            return Err(BodyError::NonFinite { field: "mass", value: self.m });
        }
        if self.m == 0.0 {
            return Err(BodyError::ZeroMass);
        }
        if self.m < 0.0 {
            return Err(BodyError::NegativeMass(self.m));
        }
        if !self.r.is_finite() {
            return Err(BodyError::NonFinite { field: "radius", value: self.r });
        }
        if self.r == 0.0 {
            return Err(BodyError::ZeroRadius);
        }
        if self.r < 0.0 {
            return Err(BodyError::NegativeRadius(self.r));
        }
        if self.caps.conductive && !self.caps.electrical {
            return Err(BodyError::NonElectricalConductive);
        }

        Ok(Body {
            x: self.x,
            v: self.v,
            f: NVec3::zeros(),
            m: self.m,
            r: self.r,
            q: self.q,
            caps: self.caps,
            color: self.color,
            visible: self.visible,
        })
    }
}
