//! Non-fatal conditions raised while stepping
//!
//! Nothing in here stops a tick. Each condition is logged through `tracing`
//! when it is raised and collected into the [`StepReport`] returned by
//! `World::step`, so callers can inspect them without a subscriber.

use std::fmt;

use tracing::warn;

use crate::simulation::forces::InteractionKind;
use crate::simulation::states::{Axis, BodyId};

#[derive(Debug, Clone, PartialEq)]
pub enum Diagnostic {
    /// Two interacting bodies share a position; the interaction was skipped
    SamePosition {
        kind: InteractionKind,
        first: BodyId,
        second: BodyId,
    },
    /// A body reached or exceeded the configured speed limit
    SpeedLimit { body: BodyId, speed: f64, limit: f64 },
    /// A position component left the configured numeric range
    PositionLimit {
        body: BodyId,
        axis: Axis,
        value: f64,
        min: f64,
        max: f64,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SamePosition { kind, first, second } => write!(
                f,
                "bodies {first} and {second} are at the same position, can't apply {kind} force to them"
            ),
            Diagnostic::SpeedLimit { body, speed, limit } => {
                write!(f, "body {body} can't go faster than {limit}, its speed is {speed}")
            }
            Diagnostic::PositionLimit { body, axis, value, min, max } => write!(
                f,
                "body {body} left the position range ({min}, {max}) on {axis:?}: {value}"
            ),
        }
    }
}

/// Everything that happened during one tick that callers may care about
#[derive(Debug, Clone, Default)]
pub struct StepReport {
    pub tick: u64,
    pub diagnostics: Vec<Diagnostic>,
}

impl StepReport {
    pub(crate) fn new(tick: u64) -> Self {
        Self { tick, diagnostics: Vec::new() }
    }

    /// Log and keep a diagnostic
    pub(crate) fn raise(&mut self, diagnostic: Diagnostic) {
        warn!(tick = self.tick, "{diagnostic}");
        self.diagnostics.push(diagnostic);
    }

    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    pub fn same_position_count(&self) -> usize {
        self.diagnostics
            .iter()
            .filter(|d| matches!(d, Diagnostic::SamePosition { .. }))
            .count()
    }
}
