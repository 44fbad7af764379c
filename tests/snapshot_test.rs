//! Snapshot fidelity and run-output contract, for every method.

use vortex_rs::{MethodKind, SimulationConfig, VortexError, run_method, run_named};

fn config(t_final: f64, dt: f64) -> SimulationConfig {
    SimulationConfig::default()
        .with_resolution(16, 16)
        .with_time_step(dt)
        .with_final_time(t_final)
}

#[test]
fn test_three_requested_times_give_three_snapshots() {
    let t_final = 0.02;
    let config = config(t_final, 0.002).with_sample_times(vec![0.0, t_final / 2.0, t_final]);
    for method in MethodKind::ALL {
        let output = run_method(method, &config).unwrap();
        let times = output.snapshots.times();
        assert_eq!(times.len(), 3, "{}: times {:?}", method, times);
        assert!(
            times.windows(2).all(|w| w[0] < w[1]),
            "{}: times not increasing: {:?}",
            method,
            times
        );
        assert_eq!(times[0], 0.0);
        assert!(
            (times[2] - t_final).abs() < 1e-9,
            "{}: last snapshot at {}",
            method,
            times[2]
        );
        assert_eq!(output.diagnostics.times, times);
        assert_eq!(output.diagnostics.enstrophy.len(), 3);
    }
}

#[test]
fn test_default_samples_are_initial_and_final() {
    let output = run_method(MethodKind::FiniteDifference, &config(0.01, 0.002)).unwrap();
    assert_eq!(output.snapshots.len(), 2);
    assert_eq!(output.snapshots[0].step, 0);
    assert_eq!(output.snapshots[1].step, 5);
}

#[test]
fn test_snapshot_fields_match_grid_shape() {
    let config = config(0.004, 0.002).with_resolution(16, 12);
    for method in [MethodKind::FiniteDifference, MethodKind::LayeredFiniteVolume] {
        let output = run_method(method, &config).unwrap();
        for snapshot in &output.snapshots {
            assert_eq!(snapshot.omega.shape(), (12, 16));
            assert_eq!(snapshot.psi.shape(), (12, 16));
            assert_eq!(snapshot.diagnostics.step, snapshot.step);
        }
    }
}

#[test]
fn test_times_between_steps_snap_forward() {
    let output = run_method(
        MethodKind::Spectral,
        &config(0.01, 0.002).with_sample_times(vec![0.003, 0.0035, 0.009]),
    )
    .unwrap();
    let steps: Vec<usize> = output.snapshots.iter().map(|s| s.step).collect();
    assert_eq!(steps, vec![0, 2, 5]);
}

#[test]
fn test_uneven_final_time_rounds_up() {
    // 0.011 / 0.002 = 5.5 steps: the run takes 6 and ends past t_final
    let output = run_method(MethodKind::FiniteDifference, &config(0.011, 0.002)).unwrap();
    assert_eq!(output.diagnostics.n_steps, 6);
    let last = output.snapshots.last().unwrap();
    assert!((last.time - 0.012).abs() < 1e-12);
}

#[test]
fn test_dispatch_by_name() {
    let config = config(0.004, 0.002);
    for (name, kind) in [
        ("finite-difference", MethodKind::FiniteDifference),
        ("spectral", MethodKind::Spectral),
        ("layered-fv", MethodKind::LayeredFiniteVolume),
    ] {
        let output = run_named(name, &config).unwrap();
        assert_eq!(output.diagnostics.method, kind);
    }

    let err = run_named("lattice-boltzmann", &config).unwrap_err();
    assert!(matches!(err, VortexError::UnsupportedMethod(_)));
}

#[test]
fn test_invalid_config_fails_before_running() {
    let bad = [
        config(0.01, 0.002).with_viscosity(0.0),
        config(0.01, -0.002),
        config(f64::NAN, 0.002),
        config(0.01, 0.002).with_domain(0.0, 1.0),
        config(0.01, 0.002).with_resolution(0, 16),
        config(0.01, 0.002).with_sample_times(vec![0.02]),
    ];
    for config in &bad {
        for method in MethodKind::ALL {
            let err = run_method(method, config).unwrap_err();
            assert!(err.is_configuration(), "{}: {:?}", method, err);
        }
    }

    let odd = config(0.01, 0.002).with_resolution(15, 16);
    assert!(run_method(MethodKind::Spectral, &odd).unwrap_err().is_configuration());
    assert!(run_method(MethodKind::FiniteDifference, &odd).is_ok());
    assert!(run_method(MethodKind::LayeredFiniteVolume, &odd).is_ok());
}
