//! Phase timings read the process CPU clock separately from the wall clock.
//!
//! Kept as the only test in this binary so no other test threads add CPU
//! time to the process while it runs.

use std::thread;
use std::time::Duration;

use vortex_rs::{
    AnalyticGenerator, FiniteDifferenceKernel, InitialCondition, Simulation, SimulationConfig,
};

#[test]
fn test_idle_time_counts_as_wall_but_not_cpu() {
    let config = SimulationConfig::default()
        .with_resolution(16, 16)
        .with_time_step(0.005)
        .with_final_time(0.02)
        .with_initial_condition(InitialCondition::lamb_oseen(1.0, 0.7));

    // 4 steps, each followed by 25 ms of sleep inside the run
    let output = Simulation::new(config)
        .run_with_callback::<FiniteDifferenceKernel, _>(&AnalyticGenerator, |_| {
            thread::sleep(Duration::from_millis(25))
        })
        .unwrap();

    let total = output.diagnostics.timings.total;
    assert!(total.wall >= 0.1, "wall = {}", total.wall);
    assert!(
        total.cpu < total.wall - 0.05,
        "cpu {} should not include the sleeps (wall {})",
        total.cpu,
        total.wall
    );
    assert!(total.cpu > 0.0);
}
