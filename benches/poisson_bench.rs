//! Benchmarks for the streamfunction solves.
//!
//! Run with: `cargo bench --bench poisson_bench`
//!
//! Compares the sparse-LU, closed-form FFT and spectral Poisson solvers,
//! plus the one-time factorization cost.

use std::f64::consts::PI;

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use vortex_rs::poisson::{ClosedFormPoisson, FiniteDifferencePoisson, SpectralPoisson};
use vortex_rs::{PeriodicGrid2D, Resolution2D, StreamfunctionSolver};

fn grid(n: usize) -> PeriodicGrid2D {
    PeriodicGrid2D::new(Resolution2D::square(n), 2.0 * PI, 2.0 * PI).expect("grid")
}

fn bench_solves(c: &mut Criterion) {
    let mut group = c.benchmark_group("poisson_solve");
    for n in [32, 64, 128] {
        let g = grid(n);
        let omega = g.sample(|x, y| (-(x * x + y * y)).exp());
        let solvers: Vec<Box<dyn StreamfunctionSolver>> = vec![
            Box::new(FiniteDifferencePoisson::new(&g)),
            Box::new(ClosedFormPoisson::new(&g)),
            Box::new(SpectralPoisson::new(&g)),
        ];
        for solver in &solvers {
            group.bench_with_input(BenchmarkId::new(solver.name(), n), &n, |b, _| {
                b.iter(|| solver.solve(black_box(&omega)).expect("solve"))
            });
        }
    }
    group.finish();
}

fn bench_factorization(c: &mut Criterion) {
    let mut group = c.benchmark_group("poisson_setup");
    group.sample_size(20);
    for n in [32, 64, 128] {
        let g = grid(n);
        group.bench_with_input(BenchmarkId::from_parameter(n), &n, |b, _| {
            b.iter(|| FiniteDifferencePoisson::new(black_box(&g)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_solves, bench_factorization);
criterion_main!(benches);
