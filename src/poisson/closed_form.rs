//! Closed-form periodic solve of the 5-point Laplacian.
//!
//! Fourier modes diagonalize the periodic 5-point operator with eigenvalues
//!
//! ```text
//! λ(m, n) = (2cos(2πm/Nx) - 2)/dx² + (2cos(2πn/Ny) - 2)/dy²
//! ```
//!
//! so `ψ̂ = -ω̂ / λ` solves the same system as the sparse factorization
//! without assembling a matrix.

use num_complex::Complex64;

use super::StreamfunctionSolver;
use super::sparse_lu::check_shape;
use crate::error::Result;
use crate::grid::{Field2D, PeriodicGrid2D};
use crate::operators::Fft2D;

/// FFT-based direct solve of the discrete periodic Poisson problem.
#[derive(Clone, Debug)]
pub struct ClosedFormPoisson {
    fft: Fft2D,
    /// `-1/λ` per bin, 0 for the zero mode
    inverse_eigenvalues: Vec<f64>,
}

impl ClosedFormPoisson {
    /// Precompute eigenvalues and FFT plans for the grid.
    pub fn new(grid: &PeriodicGrid2D) -> Self {
        let (nx, ny) = (grid.nx(), grid.ny());
        let ex = eigenvalues_1d(nx, grid.dx);
        let ey = eigenvalues_1d(ny, grid.dy);

        let mut inverse_eigenvalues = Vec::with_capacity(nx * ny);
        for lambda_y in &ey {
            for lambda_x in &ex {
                let lambda = lambda_x + lambda_y;
                inverse_eigenvalues.push(if lambda == 0.0 { 0.0 } else { -1.0 / lambda });
            }
        }
        inverse_eigenvalues[0] = 0.0;

        Self {
            fft: Fft2D::new(nx, ny),
            inverse_eigenvalues,
        }
    }
}

fn eigenvalues_1d(n: usize, h: f64) -> Vec<f64> {
    let theta = 2.0 * std::f64::consts::PI / n as f64;
    (0..n)
        .map(|m| (2.0 * (theta * m as f64).cos() - 2.0) / (h * h))
        .collect()
}

impl StreamfunctionSolver for ClosedFormPoisson {
    fn name(&self) -> &'static str {
        "closed-form"
    }

    fn solve(&self, omega: &Field2D) -> Result<Field2D> {
        check_shape(omega, self.fft.nx(), self.fft.ny())?;
        let mut spectrum = self.fft.forward_real(&omega.data);
        for (c, &w) in spectrum.iter_mut().zip(&self.inverse_eigenvalues) {
            *c *= w;
        }
        spectrum[0] = Complex64::new(0.0, 0.0);
        let data = self.fft.inverse_real(&spectrum);
        Field2D::from_data(data, omega.nx, omega.ny)
    }
}
