//! Fourier-space Poisson solve.

use num_complex::Complex64;

use super::StreamfunctionSolver;
use super::sparse_lu::check_shape;
use crate::error::Result;
use crate::grid::{Field2D, PeriodicGrid2D};
use crate::operators::{Fft2D, wavenumbers};

/// Exact spectral inverse `ψ̂ = ω̂ / |k|²` with the zero mode pinned to 0.
///
/// Used per layer by the layered kernel; works for odd resolutions too.
#[derive(Clone, Debug)]
pub struct SpectralPoisson {
    fft: Fft2D,
    /// `1/|k|²`, 0 for the zero mode
    inverse_k2: Vec<f64>,
}

impl SpectralPoisson {
    /// Plan transforms and wavenumbers for the grid.
    pub fn new(grid: &PeriodicGrid2D) -> Self {
        let kx = wavenumbers(grid.nx(), grid.lx);
        let ky = wavenumbers(grid.ny(), grid.ly);
        let mut inverse_k2 = Vec::with_capacity(kx.len() * ky.len());
        for y in &ky {
            for x in &kx {
                let k2 = x * x + y * y;
                inverse_k2.push(if k2 == 0.0 { 0.0 } else { 1.0 / k2 });
            }
        }
        Self {
            fft: Fft2D::new(grid.nx(), grid.ny()),
            inverse_k2,
        }
    }

    /// Solve on a raw row-major slice, writing ψ into `psi`.
    pub fn solve_slice(&self, omega: &[f64], psi: &mut [f64]) {
        let mut spectrum = self.fft.forward_real(omega);
        for (c, &w) in spectrum.iter_mut().zip(&self.inverse_k2) {
            *c *= w;
        }
        spectrum[0] = Complex64::new(0.0, 0.0);
        psi.copy_from_slice(&self.fft.inverse_real(&spectrum));
    }
}

impl StreamfunctionSolver for SpectralPoisson {
    fn name(&self) -> &'static str {
        "spectral"
    }

    fn solve(&self, omega: &Field2D) -> Result<Field2D> {
        check_shape(omega, self.fft.nx(), self.fft.ny())?;
        let mut psi = Field2D::zeros(omega.nx, omega.ny);
        self.solve_slice(&omega.data, &mut psi.data);
        Ok(psi)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Resolution2D;
    use std::f64::consts::PI;

    #[test]
    fn test_exact_for_fourier_modes() {
        // ω = 5 cos(x) sin(2y) + 3  ->  ψ = cos(x) sin(2y)
        let g = PeriodicGrid2D::new(Resolution2D::new(16, 12), 2.0 * PI, 2.0 * PI).unwrap();
        let omega = g.sample(|x, y| 5.0 * x.cos() * (2.0 * y).sin() + 3.0);
        let psi = SpectralPoisson::new(&g).solve(&omega).unwrap();
        let exact = g.sample(|x, y| x.cos() * (2.0 * y).sin());
        assert!(psi.max_abs_diff(&exact) < 1e-12);
        assert!(psi.mean().abs() < 1e-14);
    }

    #[test]
    fn test_odd_resolution() {
        let g = PeriodicGrid2D::new(Resolution2D::new(15, 9), 2.0 * PI, 2.0 * PI).unwrap();
        let omega = g.sample(|x, y| 2.0 * x.sin() * y.sin());
        let psi = SpectralPoisson::new(&g).solve(&omega).unwrap();
        let exact = g.sample(|x, y| x.sin() * y.sin());
        assert!(psi.max_abs_diff(&exact) < 1e-12);
    }
}
