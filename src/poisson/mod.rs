//! Streamfunction recovery: solve `∇²ψ = -ω` on the periodic grid.
//!
//! Every solver returns a zero-mean ψ. The mean of ω is discarded before
//! solving since a periodic Laplacian only reaches zero-mean fields.
//!
//! - [`FiniteDifferencePoisson`]: sparse LU of the pinned 5-point Laplacian,
//!   degrading to [`ClosedFormPoisson`] if factorization fails
//! - [`ClosedFormPoisson`]: FFT diagonalization of the same 5-point operator
//! - [`SpectralPoisson`]: exact Fourier inverse `ψ̂ = ω̂ / |k|²`

mod closed_form;
mod sparse_lu;
mod spectral;

pub use closed_form::ClosedFormPoisson;
pub use sparse_lu::{FiniteDifferencePoisson, SparseLuPoisson};
pub use spectral::SpectralPoisson;

use crate::error::Result;
use crate::grid::Field2D;

/// Elliptic solve shared by all kernels.
pub trait StreamfunctionSolver: Send + Sync {
    /// Short name for logging.
    fn name(&self) -> &'static str;

    /// Return ψ with `∇²ψ = -(ω - mean ω)` and `mean ψ = 0`.
    ///
    /// Only shape mismatches are reported as errors; callers check the
    /// result for non-finite values.
    fn solve(&self, omega: &Field2D) -> Result<Field2D>;
}
