//! Living set of interactions, grouped by kind
//!
//! Interactions live in one arena; a per-kind list of handles keeps the
//! accumulation order of a tick fixed (springs, gravity, electrostatic, air
//! resistance, then collisions) and, within a kind, the order of creation.

use tracing::{debug, info};

use crate::simulation::arena::Arena;
use crate::simulation::forces::{Interaction, InteractionId, InteractionKind, Spring};
use crate::simulation::states::{Body, BodyId};

#[derive(Default)]
pub struct Registry {
    interactions: Arena<Interaction>,
    by_kind: [Vec<InteractionId>; 5],
    initialized: bool,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn len(&self) -> usize {
        self.interactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.interactions.is_empty()
    }

    pub fn count(&self, kind: InteractionKind) -> usize {
        self.by_kind[kind.slot()].len()
    }

    pub fn get(&self, id: InteractionId) -> Option<&Interaction> {
        self.interactions.get(id)
    }

    fn register(&mut self, interaction: Interaction) -> InteractionId {
        let kind = interaction.kind();
        let id = self.interactions.insert(interaction);
        self.by_kind[kind.slot()].push(id);
        id
    }

    /// Register a client-built spring
    pub fn add_spring(&mut self, spring: Spring) -> InteractionId {
        self.register(Interaction::Spring(spring))
    }

    /// Build the automatic interactions for every unordered pair and every body
    ///
    /// Runs once; later calls do nothing, so bodies added afterwards never
    /// gain automatic interactions.
    pub fn initialize(&mut self, bodies: &Arena<Body>) {
        if self.initialized {
            debug!("registry already initialized, skipping discovery");
            return;
        }

        let live: Vec<(BodyId, &Body)> = bodies.iter().collect();
        for (i, &first) in live.iter().enumerate() {
            for &second in &live[i + 1..] {
                for interaction in Interaction::discover_pair(first, second) {
                    self.register(interaction);
                }
            }
            for interaction in Interaction::discover_single(first.0, first.1) {
                self.register(interaction);
            }
        }
        self.initialized = true;

        info!(
            bodies = live.len(),
            gravity = self.count(InteractionKind::Gravity),
            electrostatic = self.count(InteractionKind::Electrostatic),
            collision = self.count(InteractionKind::Collision),
            air_resistance = self.count(InteractionKind::AirResistance),
            "automatic interactions created"
        );
    }

    /// Handles of one kind, in creation order
    pub fn ids(&self, kind: InteractionKind) -> &[InteractionId] {
        &self.by_kind[kind.slot()]
    }

    /// Interactions of one kind, in creation order
    pub fn of_kind(&self, kind: InteractionKind) -> impl Iterator<Item = (InteractionId, &Interaction)> {
        self.by_kind[kind.slot()]
            .iter()
            .filter_map(|&id| self.interactions.get(id).map(|i| (id, i)))
    }

    pub fn springs(&self) -> impl Iterator<Item = (InteractionId, &Spring)> {
        self.of_kind(InteractionKind::Spring)
            .filter_map(|(id, i)| i.as_spring().map(|s| (id, s)))
    }

    /// Remove one interaction by handle
    pub fn remove(&mut self, id: InteractionId) -> Option<Interaction> {
        let interaction = self.interactions.remove(id)?;
        self.by_kind[interaction.kind().slot()].retain(|&other| other != id);
        Some(interaction)
    }

    /// Drop every interaction that references `body`, returning how many went
    pub fn retract_body(&mut self, body: BodyId) -> usize {
        let before = self.interactions.len();
        self.interactions.retain(|_, i| !i.involves(body));
        let interactions = &self.interactions;
        for ids in self.by_kind.iter_mut() {
            ids.retain(|&id| interactions.contains(id));
        }
        before - self.interactions.len()
    }
}
