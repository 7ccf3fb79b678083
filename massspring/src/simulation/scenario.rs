//! Build a fully-initialized simulation world from configuration
//!
//! Takes a `ScenarioConfig` (YAML-facing) and produces a runtime [`World`]
//! holding the parameters, every body at t = 0 and the explicit springs.
//! Automatic interactions are discovered here as well, so the returned world
//! is ready to step.

use std::path::Path;

use thiserror::Error;
use tracing::info;

use crate::configuration::config::{BodyConfig, ScenarioConfig};
use crate::simulation::engine::World;
use crate::simulation::error::{BodyError, ParameterError, SimError};
use crate::simulation::params::Parameters;
use crate::simulation::states::{Body, BodyId};

#[derive(Error, Debug)]
pub enum ScenarioError {
    #[error("failed to read scenario file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("invalid parameters: {0}")]
    Parameters(#[from] ParameterError),

    #[error("body {index}: {source}")]
    Body { index: usize, source: BodyError },

    #[error("spring {index} references body {body}, but only {count} bodies exist")]
    SpringEndpoint { index: usize, body: usize, count: usize },

    #[error("spring {index}: {source}")]
    Spring { index: usize, source: SimError },
}

/// Map one `BodyConfig` onto a validated runtime `Body`
pub fn build_body(bc: &BodyConfig) -> Result<Body, BodyError> {
    Body::builder()
        .position(bc.x[0], bc.x[1], bc.x[2])
        .velocity(bc.v[0], bc.v[1], bc.v[2])
        .mass(bc.m)
        .radius(bc.r)
        .charge(bc.q)
        .capabilities(bc.capabilities())
        .color(bc.color)
        .visible(bc.visible)
        .build()
}

/// Build and initialize a world from a parsed scenario
pub fn build_world(cfg: &ScenarioConfig) -> Result<World, ScenarioError> {
    // Parameters (runtime) from ParametersConfig
    let mut world = World::new(Parameters::from(&cfg.parameters))?;

    // Bodies: keep the handles in config order so springs can refer to them
    let mut ids: Vec<BodyId> = Vec::with_capacity(cfg.bodies.len());
    for (index, bc) in cfg.bodies.iter().enumerate() {
        let body = build_body(bc).map_err(|source| ScenarioError::Body { index, source })?;
        ids.push(world.add_body(body));
    }

    for (index, sc) in cfg.springs.iter().enumerate() {
        let lookup = |body: usize| {
            ids.get(body).copied().ok_or(ScenarioError::SpringEndpoint {
                index,
                body,
                count: ids.len(),
            })
        };
        let (a, b) = (lookup(sc.a)?, lookup(sc.b)?);
        world
            .add_spring_styled(a, b, sc.k, sc.nl, sc.color, sc.visible)
            .map_err(|source| ScenarioError::Spring { index, source })?;
    }

    world.initialize();
    info!(bodies = world.body_count(), springs = cfg.springs.len(), "scenario built");
    Ok(world)
}

/// Parse YAML text and build the world
pub fn load_str(text: &str) -> Result<World, ScenarioError> {
    let cfg = ScenarioConfig::from_yaml(text)?;
    build_world(&cfg)
}

/// Read a YAML scenario file and build the world
pub fn load_file(path: impl AsRef<Path>) -> Result<World, ScenarioError> {
    let file = std::fs::File::open(path)?;
    let cfg = ScenarioConfig::from_reader(std::io::BufReader::new(file))?;
    build_world(&cfg)
}
