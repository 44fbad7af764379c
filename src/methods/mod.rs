//! Vorticity kernels behind one state-transition contract.
//!
//! Every discretization implements [`VorticityKernel`]:
//!
//! ```text
//! initialize ──► Ready ──advance──► Ready ──advance──► ...
//!                  │
//!                  └─ measure (pure read)
//! ```
//!
//! - [`FiniteDifferenceKernel`]: Arakawa Jacobian, sparse-LU Poisson, RK4
//! - [`SpectralKernel`]: Fourier pseudo-spectral with 2/3 dealiasing, RK4
//! - [`LayeredKernel`]: Nz layers, first-order upwind, forward Euler
//!
//! Orchestrators select a kernel by [`MethodKind`] (or by name) with
//! [`run_method`] and never branch on discretization details.
//!
//! # Example
//!
//! ```
//! use vortex_rs::config::{MethodKind, SimulationConfig};
//! use vortex_rs::methods::run_method;
//!
//! let config = SimulationConfig::default()
//!     .with_resolution(32, 32)
//!     .with_final_time(0.005);
//! let output = run_method(MethodKind::Spectral, &config).unwrap();
//! assert_eq!(output.diagnostics.n_steps, 5);
//! assert_eq!(output.snapshots.len(), 2);
//! ```

mod arakawa;
mod finite_difference;
mod layered;
mod spectral;
mod vertical;

pub use arakawa::{arakawa_jacobian, central_jacobian};
pub use finite_difference::{AdvectionScheme, FiniteDifferenceKernel, FiniteDifferenceState};
pub use layered::{LayeredKernel, LayeredState};
pub use spectral::{SpectralKernel, SpectralState};
pub use vertical::{gaussian_profile, vertical_diffusion};

use std::sync::atomic::{AtomicUsize, Ordering};

use crate::backend::ComputeBackend;
use crate::config::{MethodKind, SimulationConfig};
use crate::diagnostics::DiagnosticsRecord;
use crate::error::{Result, VortexError};
use crate::grid::{Field2D, PeriodicGrid2D};
use crate::initial::{AnalyticGenerator, VorticityGenerator};
use crate::simulation::{RunOutput, Simulation};
use crate::time::StandardIntegrator;

// =============================================================================
// State and kernel contracts
// =============================================================================

/// Read access to a kernel's state in the common 2D form.
///
/// Layered states report their depth-mean projections.
pub trait FlowState: Clone + Send + Sync + std::fmt::Debug {
    /// Vorticity ω, shape `Ny × Nx`.
    fn omega(&self) -> &Field2D;

    /// Streamfunction ψ solving the kernel's elliptic problem for ω.
    fn psi(&self) -> &Field2D;

    /// Simulation time.
    fn time(&self) -> f64;

    /// Number of completed `advance` calls.
    fn step(&self) -> usize;
}

/// One discretization of the periodic vorticity equation.
///
/// A kernel value is the run's operator bundle: spacing, operators and
/// solver factorizations built once by `initialize` and only read after.
pub trait VorticityKernel: Sized + Send + Sync {
    /// Kernel-specific state.
    type State: FlowState;

    /// Which discretization this is.
    const KIND: MethodKind;

    /// Validate the configuration, build operators and the initial state
    /// from `generator`.
    fn initialize_with(
        config: &SimulationConfig,
        generator: &dyn VorticityGenerator,
    ) -> Result<(Self, Self::State)>;

    /// [`initialize_with`](Self::initialize_with) using the closed-form
    /// initial-condition generator.
    fn initialize(config: &SimulationConfig) -> Result<(Self, Self::State)> {
        Self::initialize_with(config, &AnalyticGenerator)
    }

    /// Advance one time step, returning a new state.
    ///
    /// Fails only if an elliptic solve produces non-finite values.
    fn advance(&self, state: &Self::State) -> Result<Self::State>;

    /// Scalar diagnostics of a state. Non-finite fields yield non-finite values.
    fn measure(&self, state: &Self::State) -> DiagnosticsRecord;

    /// Grid the kernel was built on.
    fn grid(&self) -> &PeriodicGrid2D;

    /// Elliptic solves performed by this kernel so far.
    fn solve_count(&self) -> usize;

    /// Backend the kernel runs on.
    fn backend(&self) -> ComputeBackend;

    /// Time integrator used by `advance`.
    fn integrator(&self) -> StandardIntegrator;

    /// Number of vertical layers (1 for 2D kernels).
    fn n_layers(&self) -> usize {
        1
    }

    /// Full run: initialize, advance to `t_final`, sample snapshots.
    fn run(config: &SimulationConfig) -> Result<RunOutput> {
        Simulation::new(config.clone()).run::<Self>()
    }
}

// =============================================================================
// Dispatch
// =============================================================================

/// Run the kernel selected by `kind`.
pub fn run_method(kind: MethodKind, config: &SimulationConfig) -> Result<RunOutput> {
    match kind {
        MethodKind::FiniteDifference => FiniteDifferenceKernel::run(config),
        MethodKind::Spectral => SpectralKernel::run(config),
        MethodKind::LayeredFiniteVolume => LayeredKernel::run(config),
    }
}

/// Run the kernel selected by name (see [`MethodKind`]'s `FromStr`).
///
/// Unknown names fail with [`VortexError::UnsupportedMethod`] before any
/// work is done.
pub fn run_named(name: &str, config: &SimulationConfig) -> Result<RunOutput> {
    run_method(name.parse()?, config)
}

// =============================================================================
// Shared kernel helpers
// =============================================================================

/// Per-kernel count of elliptic solves.
#[derive(Debug, Default)]
pub(crate) struct SolveCounter(AtomicUsize);

impl SolveCounter {
    pub(crate) fn record(&self, n: usize) {
        self.0.fetch_add(n, Ordering::Relaxed);
    }

    pub(crate) fn get(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
}

/// Reject a streamfunction containing NaN or infinity.
pub(crate) fn ensure_finite(method: MethodKind, step: usize, psi: &[f64]) -> Result<()> {
    if let Some(pos) = psi.iter().position(|v| !v.is_finite()) {
        return Err(VortexError::solve_failure(
            method.name(),
            step,
            format!("non-finite streamfunction value {} at index {}", psi[pos], pos),
        ));
    }
    Ok(())
}

/// Time after `step` steps of size `dt`.
#[inline]
pub(crate) fn step_time(step: usize, dt: f64) -> f64 {
    step as f64 * dt
}
