//! Force contributors for the mass/spring engine
//!
//! Every interaction between bodies is one of five variants wrapped by
//! [`Interaction`]: Hooke springs, Newtonian gravity, Coulomb electrostatics,
//! elastic collisions and air drag. Each variant implements [`ForceLaw`] and
//! adds its contribution straight into the bodies' force accumulators, so
//! variants compose freely within a tick.
//!
//! Two-body variants share one geometric convention: `delta = x1 - x2`
//! (pointing from body 2 to body 1) and `distance = |delta|`. A pair at
//! `distance == 0` is degenerate and contributes nothing.

use std::fmt;

use crate::simulation::arena::{Arena, Handle};
use crate::simulation::error::SimError;
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, BodyId, Color, NVec3};

/// Handle to an interaction held by the registry
pub type InteractionId = Handle<Interaction>;

/// Variant tag, also used to order force accumulation within a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionKind {
    Spring,
    Gravity,
    Electrostatic,
    AirResistance,
    Collision,
}

impl InteractionKind {
    /// Accumulation order for one tick; collisions resolve last
    pub const PIPELINE: [InteractionKind; 5] = [
        InteractionKind::Spring,
        InteractionKind::Gravity,
        InteractionKind::Electrostatic,
        InteractionKind::AirResistance,
        InteractionKind::Collision,
    ];

    /// Position in [`InteractionKind::PIPELINE`]
    pub fn slot(self) -> usize {
        match self {
            InteractionKind::Spring => 0,
            InteractionKind::Gravity => 1,
            InteractionKind::Electrostatic => 2,
            InteractionKind::AirResistance => 3,
            InteractionKind::Collision => 4,
        }
    }

    /// Whether the registry creates these by itself at initialization
    pub fn is_automatic(self) -> bool {
        !matches!(self, InteractionKind::Spring)
    }
}

impl fmt::Display for InteractionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            InteractionKind::Spring => "spring",
            InteractionKind::Gravity => "gravity",
            InteractionKind::Electrostatic => "electricity",
            InteractionKind::AirResistance => "air resistance",
            InteractionKind::Collision => "collision",
        };
        f.write_str(name)
    }
}

/// What a force law did on a given tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Contribution {
    /// Forces were added to the body accumulators
    Applied,
    /// Nothing to do this tick (no contact, no velocity, stale handle)
    Idle,
    /// Bodies coincide, direction undefined, nothing applied
    Degenerate,
}

/// Trait for interaction variants operating on the body arena
/// Implementations add their contribution through `Body::apply_force`
pub trait ForceLaw {
    fn apply(&self, bodies: &mut Arena<Body>, params: &Parameters) -> Contribution;
}

/// `-1`, `0` or `1`; unlike `f64::signum`, zero maps to zero
pub fn sign(x: f64) -> i8 {
    if x < 0.0 {
        -1
    } else if x > 0.0 {
        1
    } else {
        0
    }
}

/// Two body references for a pairwise interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pair {
    pub first: BodyId,
    pub second: BodyId,
}

impl Pair {
    pub fn new(first: BodyId, second: BodyId) -> Self {
        Self { first, second }
    }

    pub fn involves(&self, body: BodyId) -> bool {
        self.first == body || self.second == body
    }

    /// `x1 - x2`, or `None` if either body is gone
    pub fn delta(&self, bodies: &Arena<Body>) -> Option<NVec3> {
        let b1 = bodies.get(self.first)?;
        let b2 = bodies.get(self.second)?;
        Some(b1.x - b2.x)
    }

    pub fn distance(&self, bodies: &Arena<Body>) -> Option<f64> {
        self.delta(bodies).map(|d| d.norm())
    }
}

// =========================================================================================
// Spring
// =========================================================================================

/// Hooke spring between two bodies, created explicitly by the client
#[derive(Debug, Clone)]
pub struct Spring {
    pub pair: Pair,
    pub k: f64,  // spring constant
    pub nl: f64, // natural length
    pub color: Color,
    pub visible: bool,
}

impl Spring {
    /// Validate the ends and constants; `nl == 0` means "current distance"
    pub fn new(bodies: &Arena<Body>, first: BodyId, second: BodyId, k: f64, nl: f64) -> Result<Self, SimError> {
        if !(k.is_finite() && k > 0.0) {
            return Err(SimError::InvalidStiffness(k));
        }
        if !(nl.is_finite() && nl >= 0.0) {
            return Err(SimError::InvalidNaturalLength(nl));
        }
        if first == second {
            return Err(SimError::SelfSpring(first));
        }
        let pair = Pair::new(first, second);
        if !bodies.contains(first) {
            return Err(SimError::UnknownBody(first));
        }
        let current = pair.distance(bodies).ok_or(SimError::UnknownBody(second))?;

        Ok(Self {
            pair,
            k,
            nl: if nl == 0.0 { current } else { nl },
            color: Color::WHITE,
            visible: true,
        })
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Current length, i.e. the distance between the two ends
    pub fn length(&self, bodies: &Arena<Body>) -> Option<f64> {
        self.pair.distance(bodies)
    }

    /// Signed Hooke force `-k (length - nl)`; negative when stretched
    pub fn tension(&self, length: f64) -> f64 {
        -self.k * (length - self.nl)
    }
}

impl ForceLaw for Spring {
    fn apply(&self, bodies: &mut Arena<Body>, _params: &Parameters) -> Contribution {
        let Some((b1, b2)) = bodies.pair_mut(self.pair.first, self.pair.second) else {
            return Contribution::Idle;
        };
        let delta = b1.x - b2.x;
        let d = delta.norm();
        if d == 0.0 {
            return Contribution::Degenerate;
        }

        // f along the unit vector delta / d, scaled as delta * f / d
        let f = delta * self.tension(d) / d;
        b1.apply_force(f);
        b2.apply_force(-f);
        Contribution::Applied
    }
}

// =========================================================================================
// Gravity
// =========================================================================================

/// Newtonian attraction between two gravitational bodies
#[derive(Debug, Clone, Copy)]
pub struct Gravity {
    pub pair: Pair,
}

impl Gravity {
    pub fn pairs(b1: &Body, b2: &Body) -> bool {
        b1.is_gravitational() && b2.is_gravitational()
    }

    /// `G m1 m2 / d^2`
    pub fn magnitude(g: f64, m1: f64, m2: f64, d: f64) -> f64 {
        g * m1 * m2 / (d * d)
    }
}

impl ForceLaw for Gravity {
    fn apply(&self, bodies: &mut Arena<Body>, params: &Parameters) -> Contribution {
        let Some((b1, b2)) = bodies.pair_mut(self.pair.first, self.pair.second) else {
            return Contribution::Idle;
        };
        let delta = b1.x - b2.x;
        let d = delta.norm();
        if d == 0.0 {
            return Contribution::Degenerate;
        }

        let f = delta * Self::magnitude(params.g, b1.mass(), b2.mass(), d) / d;

        // delta points from 2 to 1, so body 1 is pulled along -delta
        b1.apply_force(-f);
        b2.apply_force(f);
        Contribution::Applied
    }
}

// =========================================================================================
// Electrostatic
// =========================================================================================

/// Coulomb force between two electrical bodies
#[derive(Debug, Clone, Copy)]
pub struct Electrostatic {
    pub pair: Pair,
}

impl Electrostatic {
    pub fn pairs(b1: &Body, b2: &Body) -> bool {
        b1.is_electrical() && b2.is_electrical()
    }

    /// `k_e |q1 q2| / d^2`, always non-negative
    pub fn magnitude(k_e: f64, q1: f64, q2: f64, d: f64) -> f64 {
        k_e * (q1 * q2).abs() / (d * d)
    }

    /// `1` (repulsive) for like signs, `-1` (attractive) otherwise
    pub fn direction(q1: f64, q2: f64) -> f64 {
        if sign(q1) == sign(q2) {
            1.0
        } else {
            -1.0
        }
    }
}

impl ForceLaw for Electrostatic {
    fn apply(&self, bodies: &mut Arena<Body>, params: &Parameters) -> Contribution {
        let Some((b1, b2)) = bodies.pair_mut(self.pair.first, self.pair.second) else {
            return Contribution::Idle;
        };
        let delta = b1.x - b2.x;
        let d = delta.norm();
        if d == 0.0 {
            return Contribution::Degenerate;
        }

        let (q1, q2) = (b1.charge(), b2.charge());
        let f = delta * Self::magnitude(params.k_e, q1, q2, d) / d * Self::direction(q1, q2);
        b1.apply_force(f);
        b2.apply_force(-f);
        Contribution::Applied
    }
}

// =========================================================================================
// Air resistance
// =========================================================================================

/// Quadratic drag on a single resistible body
#[derive(Debug, Clone, Copy)]
pub struct AirResistance {
    pub body: BodyId,
}

impl AirResistance {
    pub fn applies(b: &Body) -> bool {
        b.is_resistible()
    }

    /// `rho v^2 Cd A / 2`
    pub fn magnitude(params: &Parameters, b: &Body) -> f64 {
        let v = b.speed();
        params.air_density * v * v * params.drag_coefficient * b.cross_section() / 2.0
    }
}

impl ForceLaw for AirResistance {
    fn apply(&self, bodies: &mut Arena<Body>, params: &Parameters) -> Contribution {
        let Some(b) = bodies.get_mut(self.body) else {
            return Contribution::Idle;
        };
        let v = b.speed();
        if v == 0.0 {
            return Contribution::Idle;
        }

        let f = Self::magnitude(params, b);
        let drag = -b.v * f / v;
        b.apply_force(drag);
        Contribution::Applied
    }
}

// =========================================================================================
// Collision
// =========================================================================================

/// Contact response between two solid bodies
///
/// Resolution runs the 1-D elastic formulas on the two *speeds* and
/// re-projects the results onto the line of centers: body 1 leaves along
/// `+delta`, body 2 along `-delta`. The velocity change is handed to the
/// accumulator as the force `m * dv / dt`, so after integration the body moves
/// at the resolved velocity plus whatever the other forces contributed.
#[derive(Debug, Clone, Copy)]
pub struct Collision {
    pub pair: Pair,
}

impl Collision {
    pub fn pairs(b1: &Body, b2: &Body) -> bool {
        b1.is_solid() && b2.is_solid()
    }

    /// Elastic 1-D result speeds `(v1, v2)` for masses `m1, m2` and speeds `u1, u2`
    pub fn resolve_speeds(m1: f64, m2: f64, u1: f64, u2: f64) -> (f64, f64) {
        let v1 = (u1 * (m1 - m2) + u2 * 2.0 * m2) / (m1 + m2);
        let v2 = (u2 * (m2 - m1) + u1 * 2.0 * m1) / (m1 + m2);
        (v1, v2)
    }
}

impl ForceLaw for Collision {
    fn apply(&self, bodies: &mut Arena<Body>, params: &Parameters) -> Contribution {
        let Some((b1, b2)) = bodies.pair_mut(self.pair.first, self.pair.second) else {
            return Contribution::Idle;
        };
        let delta = b1.x - b2.x;
        let d = delta.norm();
        if d > b1.radius() + b2.radius() {
            return Contribution::Idle;
        }
        if d == 0.0 {
            return Contribution::Degenerate;
        }

        let (m1, m2) = (b1.mass(), b2.mass());
        let (v1, v2) = Self::resolve_speeds(m1, m2, b1.speed(), b2.speed());
        let v1_new = delta * v1 / d;
        let v2_new = -delta * v2 / d;

        // dv / dt * m
        let dt = params.dt;
        let f1 = (v1_new - b1.v) / dt * m1;
        let f2 = (v2_new - b2.v) / dt * m2;
        b1.apply_force(f1);
        b2.apply_force(f2);

        // charge equalization on contact
        if b1.is_conductive() && b2.is_conductive() {
            let q = (b1.charge() + b2.charge()) / 2.0;
            b1.set_charge(q);
            b2.set_charge(q);
        }
        Contribution::Applied
    }
}

// =========================================================================================
// Tagged interaction
// =========================================================================================

/// Any interaction the registry can hold
#[derive(Debug, Clone)]
pub enum Interaction {
    Spring(Spring),
    Gravity(Gravity),
    Electrostatic(Electrostatic),
    AirResistance(AirResistance),
    Collision(Collision),
}

impl Interaction {
    pub fn kind(&self) -> InteractionKind {
        match self {
            Interaction::Spring(_) => InteractionKind::Spring,
            Interaction::Gravity(_) => InteractionKind::Gravity,
            Interaction::Electrostatic(_) => InteractionKind::Electrostatic,
            Interaction::AirResistance(_) => InteractionKind::AirResistance,
            Interaction::Collision(_) => InteractionKind::Collision,
        }
    }

    /// The pair for two-body variants, `None` for air resistance
    pub fn pair(&self) -> Option<Pair> {
        match self {
            Interaction::Spring(s) => Some(s.pair),
            Interaction::Gravity(g) => Some(g.pair),
            Interaction::Electrostatic(e) => Some(e.pair),
            Interaction::Collision(c) => Some(c.pair),
            Interaction::AirResistance(_) => None,
        }
    }

    pub fn involves(&self, body: BodyId) -> bool {
        match self {
            Interaction::AirResistance(a) => a.body == body,
            other => other.pair().is_some_and(|p| p.involves(body)),
        }
    }

    pub fn as_spring(&self) -> Option<&Spring> {
        match self {
            Interaction::Spring(s) => Some(s),
            _ => None,
        }
    }

    /// Every automatic two-body interaction whose pairing predicate holds
    pub fn discover_pair(first: (BodyId, &Body), second: (BodyId, &Body)) -> Vec<Interaction> {
        let pair = Pair::new(first.0, second.0);
        let (b1, b2) = (first.1, second.1);
        let mut found = Vec::new();
        if Gravity::pairs(b1, b2) {
            found.push(Interaction::Gravity(Gravity { pair }));
        }
        if Electrostatic::pairs(b1, b2) {
            found.push(Interaction::Electrostatic(Electrostatic { pair }));
        }
        if Collision::pairs(b1, b2) {
            found.push(Interaction::Collision(Collision { pair }));
        }
        found
    }

    /// Every automatic one-body interaction whose predicate holds
    pub fn discover_single(id: BodyId, body: &Body) -> Vec<Interaction> {
        let mut found = Vec::new();
        if AirResistance::applies(body) {
            found.push(Interaction::AirResistance(AirResistance { body: id }));
        }
        found
    }
}

impl ForceLaw for Interaction {
    fn apply(&self, bodies: &mut Arena<Body>, params: &Parameters) -> Contribution {
        match self {
            Interaction::Spring(s) => s.apply(bodies, params),
            Interaction::Gravity(g) => g.apply(bodies, params),
            Interaction::Electrostatic(e) => e.apply(bodies, params),
            Interaction::AirResistance(a) => a.apply(bodies, params),
            Interaction::Collision(c) => c.apply(bodies, params),
        }
    }
}
