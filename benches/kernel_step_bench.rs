//! Benchmarks for one `advance` call of each kernel.
//!
//! Run with: `cargo bench --bench kernel_step_bench`

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use vortex_rs::methods::{arakawa_jacobian, central_jacobian};
use vortex_rs::{
    FiniteDifferenceKernel, FlowState, InitialCondition, LayeredKernel, SimulationConfig,
    SpectralKernel, VorticityKernel,
};

fn config(n: usize) -> SimulationConfig {
    SimulationConfig::default()
        .with_resolution(n, n)
        .with_time_step(1e-3)
        .with_initial_condition(InitialCondition::lamb_oseen(1.0, 0.8))
}

fn bench_advance<K: VorticityKernel>(c: &mut Criterion, group_name: &str, sizes: &[usize]) {
    let mut group = c.benchmark_group(group_name);
    for &n in sizes {
        let (kernel, state) = K::initialize(&config(n)).expect("kernel setup");
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| kernel.advance(black_box(&state)).expect("advance"))
        });
    }
    group.finish();
}

fn bench_finite_difference(c: &mut Criterion) {
    bench_advance::<FiniteDifferenceKernel>(c, "advance_finite_difference", &[32, 64, 128]);
}

fn bench_spectral(c: &mut Criterion) {
    bench_advance::<SpectralKernel>(c, "advance_spectral", &[32, 64, 128]);
}

fn bench_layered(c: &mut Criterion) {
    bench_advance::<LayeredKernel>(c, "advance_layered", &[32, 64]);
}

/// Arakawa vs central Jacobian: the cost of conservation.
fn bench_jacobians(c: &mut Criterion) {
    let mut group = c.benchmark_group("jacobian");
    for n in [64, 256] {
        let (kernel, state) = FiniteDifferenceKernel::initialize(&config(n)).expect("kernel setup");
        let grid = kernel.grid();
        let (psi, omega) = (state.psi(), state.omega());

        group.bench_with_input(BenchmarkId::new("arakawa", n), &n, |b, _| {
            b.iter(|| arakawa_jacobian(grid, black_box(psi), black_box(omega)))
        });
        group.bench_with_input(BenchmarkId::new("central", n), &n, |b, _| {
            b.iter(|| central_jacobian(grid, black_box(psi), black_box(omega)))
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_finite_difference,
    bench_spectral,
    bench_layered,
    bench_jacobians
);
criterion_main!(benches);
