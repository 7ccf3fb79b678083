use std::time::Instant;

use crate::simulation::engine::World;
use crate::simulation::error::ParameterError;
use crate::simulation::params::Parameters;
use crate::simulation::states::Body;

/// Helper to build a world of `n` bodies with every automatic interaction on
fn make_world(n: usize) -> Result<World, ParameterError> {
    let params = Parameters {
        half_extent: [1.0e6; 3].into(),
        ..Parameters::with_earth_gravity()
    };
    let mut world = World::new(params)?;

    for i in 0..n {
        let i_f = i as f64;
        // deterministic positions, no rand needed
        let body = Body::builder()
            .position((i_f * 0.37).sin() * 250.0, (i_f * 0.13).cos() * 250.0, (i_f * 0.07).sin() * 250.0)
            .mass(1.0 + (i % 7) as f64)
            .radius(0.5)
            .charge(if i % 2 == 0 { 1e-6 } else { -1e-6 })
            .gravitational(true)
            .electrical(true)
            .resistible(true)
            .build();
        // constants above always satisfy the body invariants
        if let Ok(body) = body {
            world.add_body(body);
        }
    }
    world.initialize();
    Ok(world)
}

/// Time `World::step` for a range of n; all-pairs, so expect ~n^2
/// Paste output directly into a spreadsheet to graph
pub fn bench_step(ns: &[usize], steps: usize) -> Result<(), ParameterError> {
    println!("N,interactions,step_ms");

    for &n in ns {
        let mut world = make_world(n)?;
        let interactions = world.registry().len();

        // Warm up
        world.step();

        let t0 = Instant::now();
        for _ in 0..steps {
            world.step();
        }
        let ms = t0.elapsed().as_secs_f64() * 1000.0 / steps.max(1) as f64;

        println!("{},{},{:.6}", n, interactions, ms);
    }
    Ok(())
}
