//! Error types for body construction and world operations, using `thiserror`.

use thiserror::Error;

use crate::simulation::states::{Axis, BodyId};

/// Rejected body construction
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BodyError {
    #[error("can't produce a body with zero mass")]
    ZeroMass,

    #[error("can't produce a body with negative mass: {0}")]
    NegativeMass(f64),

    #[error("can't produce a body with zero radius")]
    ZeroRadius,

    #[error("can't produce a body with negative radius: {0}")]
    NegativeRadius(f64),

    #[error("{field} must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },

    #[error("body is conductive but not electrical")]
    NonElectricalConductive,
}

/// Rejected operation on a [`World`](crate::simulation::engine::World)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error(transparent)]
    Body(#[from] BodyError),

    #[error("no live body with handle {0:?}")]
    UnknownBody(BodyId),

    #[error("a spring can't connect body {0} to itself")]
    SelfSpring(BodyId),

    #[error("spring constant must be positive and finite, got {0}")]
    InvalidStiffness(f64),

    #[error("natural length must be non-negative and finite, got {0}")]
    InvalidNaturalLength(f64),
}

/// Inconsistent [`Parameters`](crate::simulation::params::Parameters)
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParameterError {
    #[error("dt must be positive and finite, got {0}")]
    InvalidStep(f64),

    #[error("speed_limit must be positive, got {0}")]
    InvalidSpeedLimit(f64),

    #[error("half_extent on {axis:?} must be positive and finite, got {value}")]
    InvalidHalfExtent { axis: Axis, value: f64 },

    #[error("position range on {axis:?} is empty: [{min}, {max}]")]
    EmptyPositionRange { axis: Axis, min: f64, max: f64 },
}
