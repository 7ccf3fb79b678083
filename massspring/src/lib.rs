pub mod simulation;
pub mod configuration;
pub mod visualization;
pub mod network;
pub mod benchmark;

pub use simulation::arena::{Arena, Handle};
pub use simulation::states::{Axis, Body, BodyBuilder, BodyId, Capabilities, Color, NVec3};
pub use simulation::error::{BodyError, ParameterError, SimError};
pub use simulation::params::Parameters;
pub use simulation::diagnostics::{Diagnostic, StepReport};
pub use simulation::forces::{
    AirResistance, Collision, Contribution, Electrostatic, ForceLaw, Gravity, Interaction, InteractionId,
    InteractionKind, Pair, Spring,
};
pub use simulation::registry::Registry;
pub use simulation::integrator::{LimitCheck, Stepper};
pub use simulation::engine::{SharedWorld, Snapshot, World};
pub use simulation::scenario::{build_world, load_file, load_str, ScenarioError};

pub use configuration::config::{BodyConfig, ParametersConfig, ScenarioConfig, SpringConfig};

pub use visualization::projection::{Projection, RenderFrame};

pub use network::codec::CodecError;
pub use network::server::{Runner, Server, ShutdownHandle, DEFAULT_HOST, DEFAULT_PORT};

pub use benchmark::benchmark::bench_step;
