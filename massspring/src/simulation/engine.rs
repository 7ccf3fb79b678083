//! Top-level simulation owner
//!
//! A `World` owns every body, the interaction registry and the parameters of
//! one run. Several worlds can coexist; nothing is global.

use std::sync::{Arc, Mutex};

use tracing::{debug, info};

use crate::simulation::arena::Arena;
use crate::simulation::diagnostics::StepReport;
use crate::simulation::error::{ParameterError, SimError};
use crate::simulation::forces::{Interaction, InteractionId, InteractionKind, Spring};
use crate::simulation::integrator::Stepper;
use crate::simulation::params::Parameters;
use crate::simulation::registry::Registry;
use crate::simulation::states::{Body, BodyBuilder, BodyId, Color, NVec3};

/// World shared between a stepping thread and readers
pub type SharedWorld = Arc<Mutex<World>>;

/// Owned copy of every body and spring position at one instant
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    pub tick: u64,
    pub masses: Vec<NVec3>,
    pub springs: Vec<(NVec3, NVec3)>,
}

pub struct World {
    bodies: Arena<Body>,
    registry: Registry,
    parameters: Parameters,
    t: f64,     // elapsed simulated time
    tick: u64,  // completed steps
}

impl Default for World {
    fn default() -> Self {
        Self::with_valid(Parameters::default())
    }
}

impl World {
    /// Empty world; rejects parameters a step can't run with (e.g. `dt <= 0`)
    pub fn new(parameters: Parameters) -> Result<Self, ParameterError> {
        parameters.validate()?;
        Ok(Self::with_valid(parameters))
    }

    fn with_valid(parameters: Parameters) -> Self {
        Self {
            bodies: Arena::new(),
            registry: Registry::new(),
            parameters,
            t: 0.0,
            tick: 0,
        }
    }

    pub fn parameters(&self) -> &Parameters {
        &self.parameters
    }

    /// Swap in new parameters between steps; invalid ones leave the old in place
    pub fn set_parameters(&mut self, parameters: Parameters) -> Result<(), ParameterError> {
        parameters.validate()?;
        self.parameters = parameters;
        Ok(())
    }

    /// Wrap into a handle for threaded use
    pub fn into_shared(self) -> SharedWorld {
        Arc::new(Mutex::new(self))
    }

    pub fn time(&self) -> f64 {
        self.t
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn is_initialized(&self) -> bool {
        self.registry.is_initialized()
    }

    // bodies ===============================================================================

    pub fn add_body(&mut self, body: Body) -> BodyId {
        if self.registry.is_initialized() {
            debug!("body added after initialization gets no automatic interactions");
        }
        self.bodies.insert(body)
    }

    /// Validate a builder and add the resulting body
    pub fn spawn(&mut self, builder: BodyBuilder) -> Result<BodyId, SimError> {
        let body = builder.build()?;
        Ok(self.add_body(body))
    }

    /// Remove a body along with every interaction that references it
    pub fn remove_body(&mut self, id: BodyId) -> Option<Body> {
        let body = self.bodies.remove(id)?;
        let retracted = self.registry.retract_body(id);
        info!(body = %id, retracted, "body removed");
        Some(body)
    }

    pub fn body(&self, id: BodyId) -> Option<&Body> {
        self.bodies.get(id)
    }

    pub fn body_mut(&mut self, id: BodyId) -> Option<&mut Body> {
        self.bodies.get_mut(id)
    }

    pub fn bodies(&self) -> impl Iterator<Item = (BodyId, &Body)> {
        self.bodies.iter()
    }

    pub fn body_count(&self) -> usize {
        self.bodies.len()
    }

    /// Body handles sorted by descending z, the order a renderer draws them in
    pub fn draw_order(&self) -> Vec<BodyId> {
        let mut order: Vec<(BodyId, f64)> = self.bodies.iter().map(|(id, b)| (id, b.x.z)).collect();
        order.sort_by(|a, b| b.1.total_cmp(&a.1));
        order.into_iter().map(|(id, _)| id).collect()
    }

    // interactions =========================================================================

    /// Connect two bodies with a spring; `nl == 0` takes the current distance
    pub fn add_spring(&mut self, first: BodyId, second: BodyId, k: f64, nl: f64) -> Result<InteractionId, SimError> {
        self.add_spring_styled(first, second, k, nl, Color::WHITE, true)
    }

    pub fn add_spring_styled(
        &mut self,
        first: BodyId,
        second: BodyId,
        k: f64,
        nl: f64,
        color: Color,
        visible: bool,
    ) -> Result<InteractionId, SimError> {
        let spring = Spring::new(&self.bodies, first, second, k, nl)?
            .with_color(color)
            .with_visible(visible);
        Ok(self.registry.add_spring(spring))
    }

    pub fn remove_spring(&mut self, id: InteractionId) -> Option<Spring> {
        match self.registry.get(id) {
            Some(Interaction::Spring(_)) => {}
            _ => return None,
        }
        match self.registry.remove(id)? {
            Interaction::Spring(s) => Some(s),
            _ => None,
        }
    }

    pub fn spring(&self, id: InteractionId) -> Option<&Spring> {
        self.registry.get(id).and_then(Interaction::as_spring)
    }

    pub fn springs(&self) -> impl Iterator<Item = (InteractionId, &Spring)> {
        self.registry.springs()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn interaction_count(&self, kind: InteractionKind) -> usize {
        self.registry.count(kind)
    }

    // stepping =============================================================================

    /// Create the automatic interactions for the current bodies, once
    pub fn initialize(&mut self) {
        self.registry.initialize(&self.bodies);
    }

    /// Advance the world by one tick of `parameters.dt`
    ///
    /// Initializes first if [`World::initialize`] was never called.
    pub fn step(&mut self) -> StepReport {
        if !self.registry.is_initialized() {
            self.initialize();
        }
        let mut report = StepReport::new(self.tick);
        Stepper::step(&mut self.bodies, &self.registry, &self.parameters, &mut report);
        self.t += self.parameters.dt;
        self.tick += 1;
        report
    }

    /// Run `n` ticks and return every report
    pub fn run(&mut self, n: usize) -> Vec<StepReport> {
        (0..n).map(|_| self.step()).collect()
    }

    /// Copy every body and spring position
    pub fn snapshot(&self) -> Snapshot {
        let masses = self.bodies.values().map(|b| b.x).collect();
        let springs = self
            .registry
            .springs()
            .filter_map(|(_, s)| {
                let a = self.bodies.get(s.pair.first)?;
                let b = self.bodies.get(s.pair.second)?;
                Some((a.x, b.x))
            })
            .collect();
        Snapshot {
            tick: self.tick,
            masses,
            springs,
        }
    }
}
