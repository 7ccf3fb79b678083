//! Fixed-step explicit integration and the per-tick pipeline
//!
//! One tick, in this exact order:
//! 1. empty every force accumulator,
//! 2. predictive boundary reflection on the pre-tick velocity,
//! 3. springs, gravity, electrostatics, air resistance,
//! 4. collisions, composing with the forces from 3,
//! 5. explicit Euler integration of movable bodies plus limit checks.

use crate::simulation::arena::Arena;
use crate::simulation::diagnostics::{Diagnostic, StepReport};
use crate::simulation::forces::{Contribution, ForceLaw, InteractionKind};
use crate::simulation::params::Parameters;
use crate::simulation::registry::Registry;
use crate::simulation::states::{Axis, Body, BodyId, NVec3};

/// Result of the post-integration limit checks on one body
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LimitCheck {
    pub speed: Option<f64>,               // Some(speed) if |v| >= limit
    pub position: Vec<(Axis, f64)>,       // components outside the range
}

impl Body {
    /// Flip each velocity component whose look-ahead position would leave the box
    ///
    /// The allowed range on an axis is `[-half + r, half - r]`, inclusive.
    /// Returns true if any component was flipped. Unbound bodies are untouched.
    pub fn reflect(&mut self, dt: f64, half_extent: &NVec3) -> bool {
        if !self.is_bound() {
            return false;
        }
        let r = self.radius();
        let mut flipped = false;
        for i in 0..3 {
            let predicted = self.x[i] + self.v[i] * dt;
            let lo = -half_extent[i] + r;
            let hi = half_extent[i] - r;
            if predicted < lo || predicted > hi {
                self.v[i] = -self.v[i];
                flipped = true;
            }
        }
        flipped
    }

    /// Advance a movable body by `dt` under its accumulated force
    ///
    /// `a = f/m + acceleration; v += a dt; (speed check); x += v dt; (position check)`.
    /// Limit violations are detected and returned, never corrected.
    pub fn integrate(&mut self, params: &Parameters) -> LimitCheck {
        let mut check = LimitCheck::default();
        if !self.is_movable() {
            return check;
        }
        let dt = params.dt;

        // newton's second law: a = f / m
        let a = self.force() / self.mass() + params.acceleration;
        self.v += a * dt;

        let speed = self.speed();
        if speed >= params.speed_limit {
            check.speed = Some(speed);
        }

        self.x += self.v * dt;

        for axis in Axis::ALL {
            let i = axis.index();
            let value = self.x[i];
            if !(params.position_min[i] <= value && value <= params.position_max[i]) {
                check.position.push((axis, value));
            }
        }
        check
    }
}

/// Runs the tick pipeline over a body arena and a registry
pub struct Stepper;

impl Stepper {
    /// Advance every body by one tick of `params.dt`
    pub fn step(bodies: &mut Arena<Body>, registry: &Registry, params: &Parameters, report: &mut StepReport) {
        // 1. clear
        for body in bodies.values_mut() {
            body.empty_forces();
        }

        // 2. predictive reflection, using the velocity from the previous tick
        for body in bodies.values_mut() {
            body.reflect(params.dt, &params.half_extent);
        }

        // 3 + 4. force accumulation, collisions last
        for kind in InteractionKind::PIPELINE {
            Self::accumulate(kind, bodies, registry, params, report);
        }

        // 5. integrate
        for (id, body) in bodies.iter_mut() {
            let check = body.integrate(params);
            Self::report_limits(id, check, params, report);
        }
    }

    fn accumulate(kind: InteractionKind, bodies: &mut Arena<Body>, registry: &Registry, params: &Parameters, report: &mut StepReport) {
        for (_, interaction) in registry.of_kind(kind) {
            if interaction.apply(bodies, params) == Contribution::Degenerate {
                if let Some(pair) = interaction.pair() {
                    report.raise(Diagnostic::SamePosition {
                        kind,
                        first: pair.first,
                        second: pair.second,
                    });
                }
            }
        }
    }

    fn report_limits(id: BodyId, check: LimitCheck, params: &Parameters, report: &mut StepReport) {
        if let Some(speed) = check.speed {
            report.raise(Diagnostic::SpeedLimit {
                body: id,
                speed,
                limit: params.speed_limit,
            });
        }
        for (axis, value) in check.position {
            let i = axis.index();
            report.raise(Diagnostic::PositionLimit {
                body: id,
                axis,
                value,
                min: params.position_min[i],
                max: params.position_max[i],
            });
        }
    }
}
