//! # vortex-rs
//!
//! Kernels for the 2D incompressible vorticity-streamfunction equations on a
//! doubly-periodic domain:
//!
//! ```text
//! ∂ω/∂t + u·∇ω = ν ∇²ω,    ∇²ψ = -ω,    u = (-∂ψ/∂y, ∂ψ/∂x)
//! ```
//!
//! This crate provides:
//! - Periodic grid geometry and field containers
//! - Discrete operators (sparse 5-point Laplacian, FFTs, 2/3 dealiasing)
//! - Streamfunction solvers (sparse LU, closed-form FFT, spectral)
//! - Time integration (RK4, forward Euler)
//! - Three kernels behind one contract: Arakawa finite-difference,
//!   Fourier pseudo-spectral and layered finite-volume
//! - A run driver producing snapshots and diagnostics
//!
//! # Example
//!
//! ```
//! use vortex_rs::{MethodKind, SimulationConfig, run_method};
//!
//! let config = SimulationConfig::default()
//!     .with_resolution(32, 32)
//!     .with_time_step(0.002)
//!     .with_final_time(0.01);
//!
//! let output = run_method(MethodKind::FiniteDifference, &config).unwrap();
//! let last = output.snapshots.last().unwrap();
//! assert!((last.time - 0.01).abs() < 1e-9);
//! assert!(last.diagnostics.is_finite());
//! ```

pub mod backend;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod grid;
pub mod initial;
pub mod methods;
pub mod operators;
pub mod poisson;
pub mod simulation;
pub mod time;
pub mod types;

// Re-export main types for convenience
pub use backend::ComputeBackend;
pub use config::{LayeredConfig, MethodKind, SimulationConfig, VerticalBoundary};
pub use diagnostics::{ConservationTracker, DiagnosticsRecord};
pub use error::{Result, VortexError};
pub use grid::{Field2D, Field3D, PeriodicGrid2D};
pub use initial::{
    AnalyticGenerator, Dispersion, DispersionPattern, InitialCondition, VortexShape,
    VorticityGenerator,
};
pub use methods::{
    AdvectionScheme, FiniteDifferenceKernel, FlowState, LayeredKernel, SpectralKernel,
    VorticityKernel, run_method, run_named,
};
pub use poisson::StreamfunctionSolver;
pub use simulation::{RunDiagnostics, RunOutput, Simulation, Snapshot, SnapshotSeries};
pub use time::{ForwardEuler, RK4, StandardIntegrator, TimeIntegrator};
pub use types::Resolution2D;
