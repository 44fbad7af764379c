//! Fourier wavenumbers and the 2/3-rule dealiasing mask.

use num_complex::Complex64;

use crate::error::Result;
use crate::grid::PeriodicGrid2D;

/// Angular wavenumbers `2π/L · [0, 1, .., N/2-1, -N/2, .., -1]` in FFT order.
///
/// Odd `N` gives the symmetric layout `[0, .., (N-1)/2, -(N-1)/2, .., -1]`.
pub fn wavenumbers(n: usize, length: f64) -> Vec<f64> {
    let scale = 2.0 * std::f64::consts::PI / length;
    (0..n).map(|m| mode_index(m, n) as f64 * scale).collect()
}

/// Signed mode number of FFT bin `m` for a transform of length `n`.
#[inline]
fn mode_index(m: usize, n: usize) -> i64 {
    if 2 * m < n {
        m as i64
    } else {
        m as i64 - n as i64
    }
}

/// Wavenumber mesh, squared magnitudes and dealiasing mask for one grid.
#[derive(Clone, Debug)]
pub struct SpectralOperators {
    nx: usize,
    ny: usize,
    /// x-wavenumbers, length nx
    pub kx: Vec<f64>,
    /// y-wavenumbers, length ny
    pub ky: Vec<f64>,
    /// `kx² + ky²` per bin, with the zero mode set to 1
    k2_safe: Vec<f64>,
    /// Retained bins under the 2/3 rule
    mask: Vec<bool>,
}

impl SpectralOperators {
    /// Build the operators; both resolutions must be even.
    pub fn new(grid: &PeriodicGrid2D) -> Result<Self> {
        grid.resolution().validate(true)?;
        let (nx, ny) = (grid.nx(), grid.ny());
        let kx = wavenumbers(nx, grid.lx);
        let ky = wavenumbers(ny, grid.ly);

        let mut k2_safe = Vec::with_capacity(nx * ny);
        let mut mask = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            // |m| ≤ (2/3)·(N/2)  <=>  3|m| ≤ N
            let keep_y = 3 * mode_index(j, ny).unsigned_abs() as usize <= ny;
            for i in 0..nx {
                let keep_x = 3 * mode_index(i, nx).unsigned_abs() as usize <= nx;
                k2_safe.push(kx[i] * kx[i] + ky[j] * ky[j]);
                mask.push(keep_x && keep_y);
            }
        }
        k2_safe[0] = 1.0;

        let retained = mask.iter().filter(|&&m| m).count();
        log::debug!(
            "spectral operators: {}×{} modes, {} retained after dealiasing",
            ny,
            nx,
            retained
        );

        Ok(Self {
            nx,
            ny,
            kx,
            ky,
            k2_safe,
            mask,
        })
    }

    /// Number of bins.
    pub fn len(&self) -> usize {
        self.nx * self.ny
    }

    /// Whether there are no bins.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// `|k|²` of bin `idx` (1 for the zero mode).
    #[inline]
    pub fn k2(&self, idx: usize) -> f64 {
        self.k2_safe[idx]
    }

    /// Diffusion multiplier `|k|²` of bin `idx` (0 for the zero mode).
    #[inline]
    pub fn diffusion_rate(&self, idx: usize) -> f64 {
        if idx == 0 { 0.0 } else { self.k2_safe[idx] }
    }

    /// Whether bin `idx` survives the 2/3 rule.
    #[inline]
    pub fn is_retained(&self, idx: usize) -> bool {
        self.mask[idx]
    }

    /// Zero every coefficient outside the 2/3 cutoff.
    pub fn dealias(&self, spectrum: &mut [Complex64]) {
        for (c, &keep) in spectrum.iter_mut().zip(&self.mask) {
            if !keep {
                *c = Complex64::new(0.0, 0.0);
            }
        }
    }

    /// Whether every coefficient outside the cutoff is exactly zero.
    pub fn is_dealiased(&self, spectrum: &[Complex64]) -> bool {
        spectrum
            .iter()
            .zip(&self.mask)
            .all(|(c, &keep)| keep || (c.re == 0.0 && c.im == 0.0))
    }

    /// Spectral x-derivative: multiply by `i kx`.
    pub fn ddx(&self, spectrum: &[Complex64]) -> Vec<Complex64> {
        self.map_bins(spectrum, |i, _, c| Complex64::new(0.0, self.kx[i]) * c)
    }

    /// Spectral y-derivative: multiply by `i ky`.
    pub fn ddy(&self, spectrum: &[Complex64]) -> Vec<Complex64> {
        self.map_bins(spectrum, |_, j, c| Complex64::new(0.0, self.ky[j]) * c)
    }

    /// Solve `∇²ψ = -ω` in spectral space: `ψ̂ = ω̂ / |k|²`, zero mode set to 0.
    pub fn invert_laplacian(&self, omega_hat: &[Complex64]) -> Vec<Complex64> {
        let mut psi_hat: Vec<Complex64> = omega_hat
            .iter()
            .zip(&self.k2_safe)
            .map(|(w, k2)| w / *k2)
            .collect();
        if let Some(zero) = psi_hat.first_mut() {
            *zero = Complex64::new(0.0, 0.0);
        }
        psi_hat
    }

    fn map_bins<F>(&self, spectrum: &[Complex64], f: F) -> Vec<Complex64>
    where
        F: Fn(usize, usize, Complex64) -> Complex64,
    {
        debug_assert_eq!(spectrum.len(), self.len());
        let mut out = Vec::with_capacity(spectrum.len());
        for j in 0..self.ny {
            for i in 0..self.nx {
                out.push(f(i, j, spectrum[j * self.nx + i]));
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::Fft2D;
    use crate::types::Resolution2D;
    use std::f64::consts::PI;

    fn grid(n: usize) -> PeriodicGrid2D {
        PeriodicGrid2D::new(Resolution2D::square(n), 2.0 * PI, 2.0 * PI).unwrap()
    }

    #[test]
    fn test_wavenumber_layout() {
        let k = wavenumbers(8, 2.0 * PI);
        let expected = [0.0, 1.0, 2.0, 3.0, -4.0, -3.0, -2.0, -1.0];
        for (a, b) in k.iter().zip(expected) {
            assert!((a - b).abs() < 1e-14);
        }
        let k = wavenumbers(5, 2.0 * PI);
        assert!((k[2] - 2.0).abs() < 1e-14);
        assert!((k[3] + 2.0).abs() < 1e-14);
        let k = wavenumbers(4, 1.0);
        assert!((k[1] - 2.0 * PI).abs() < 1e-14);
    }

    #[test]
    fn test_mask_cutoff() {
        let ops = SpectralOperators::new(&grid(12)).unwrap();
        // modes |m| ≤ 4 kept along each axis for N = 12
        let kept_x: Vec<bool> = (0..12).map(|i| ops.is_retained(i)).collect();
        assert_eq!(
            kept_x,
            vec![true, true, true, true, true, false, false, false, true, true, true, true]
        );
        assert!(!ops.is_retained(5 * 12));
        assert_eq!(ops.k2(0), 1.0);
    }

    #[test]
    fn test_rejects_odd_resolution() {
        let g = PeriodicGrid2D::new(Resolution2D::new(9, 8), 1.0, 1.0).unwrap();
        assert!(SpectralOperators::new(&g).unwrap_err().is_configuration());
    }

    #[test]
    fn test_derivative_of_smooth_mode() {
        let g = grid(16);
        let ops = SpectralOperators::new(&g).unwrap();
        let fft = Fft2D::new(16, 16);
        let f = g.sample(|x, y| (2.0 * x).sin() * y.cos());
        let dfdx = fft.inverse_real(&ops.ddx(&fft.forward_real(&f.data)));
        let exact = g.sample(|x, y| 2.0 * (2.0 * x).cos() * y.cos());
        for (a, b) in dfdx.iter().zip(&exact.data) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_invert_laplacian() {
        // ω = 2 sin x sin y  ->  ψ = sin x sin y
        let g = grid(16);
        let ops = SpectralOperators::new(&g).unwrap();
        let fft = Fft2D::new(16, 16);
        let omega = g.sample(|x, y| 2.0 * x.sin() * y.sin());
        let psi = fft.inverse_real(&ops.invert_laplacian(&fft.forward_real(&omega.data)));
        let exact = g.sample(|x, y| x.sin() * y.sin());
        for (a, b) in psi.iter().zip(&exact.data) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_dealias_zeroes_high_modes() {
        let ops = SpectralOperators::new(&grid(8)).unwrap();
        let mut spectrum = vec![Complex64::new(1.0, -1.0); 64];
        assert!(!ops.is_dealiased(&spectrum));
        ops.dealias(&mut spectrum);
        assert!(ops.is_dealiased(&spectrum));
        assert_eq!(spectrum[0], Complex64::new(1.0, -1.0));
    }
}
