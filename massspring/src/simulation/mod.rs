pub mod arena;
pub mod states;
pub mod error;
pub mod params;
pub mod diagnostics;
pub mod forces;
pub mod registry;
pub mod integrator;
pub mod engine;
pub mod scenario;
