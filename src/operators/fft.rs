//! 2D complex FFT on row-major fields.
//!
//! Rows are transformed along x (length `nx`), then columns along y
//! (length `ny`). The inverse transform is normalized by `1 / (nx·ny)` so a
//! forward/inverse pair is the identity.

use std::fmt;
use std::sync::Arc;

use num_complex::Complex64;
use rustfft::{Fft, FftPlanner};

/// Planned forward and inverse 2D transforms for one grid shape.
///
/// Plans are immutable and shared between stages; each run owns its own.
#[derive(Clone)]
pub struct Fft2D {
    nx: usize,
    ny: usize,
    forward_x: Arc<dyn Fft<f64>>,
    inverse_x: Arc<dyn Fft<f64>>,
    forward_y: Arc<dyn Fft<f64>>,
    inverse_y: Arc<dyn Fft<f64>>,
}

impl fmt::Debug for Fft2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Fft2D")
            .field("nx", &self.nx)
            .field("ny", &self.ny)
            .finish()
    }
}

impl Fft2D {
    /// Plan transforms for an `ny × nx` field.
    pub fn new(nx: usize, ny: usize) -> Self {
        let mut planner = FftPlanner::<f64>::new();
        Self {
            nx,
            ny,
            forward_x: planner.plan_fft_forward(nx),
            inverse_x: planner.plan_fft_inverse(nx),
            forward_y: planner.plan_fft_forward(ny),
            inverse_y: planner.plan_fft_inverse(ny),
        }
    }

    /// Number of points along x.
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of points along y.
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// In-place forward transform (unnormalized).
    pub fn forward(&self, data: &mut [Complex64]) {
        self.transform(data, &self.forward_x, &self.forward_y);
    }

    /// In-place inverse transform, normalized.
    pub fn inverse(&self, data: &mut [Complex64]) {
        self.transform(data, &self.inverse_x, &self.inverse_y);
        let norm = 1.0 / (self.nx * self.ny) as f64;
        for v in data.iter_mut() {
            *v *= norm;
        }
    }

    /// Spectrum of a real field.
    pub fn forward_real(&self, values: &[f64]) -> Vec<Complex64> {
        let mut data: Vec<Complex64> = values.iter().map(|&v| Complex64::new(v, 0.0)).collect();
        self.forward(&mut data);
        data
    }

    /// Real part of the inverse transform of a spectrum.
    pub fn inverse_real(&self, spectrum: &[Complex64]) -> Vec<f64> {
        let mut data = spectrum.to_vec();
        self.inverse(&mut data);
        data.into_iter().map(|c| c.re).collect()
    }

    fn transform(&self, data: &mut [Complex64], along_x: &Arc<dyn Fft<f64>>, along_y: &Arc<dyn Fft<f64>>) {
        debug_assert_eq!(data.len(), self.nx * self.ny);
        // Rows are contiguous
        along_x.process(data);

        // Columns are strided by nx
        let mut column = vec![Complex64::new(0.0, 0.0); self.ny];
        for i in 0..self.nx {
            for (j, c) in column.iter_mut().enumerate() {
                *c = data[j * self.nx + i];
            }
            along_y.process(&mut column);
            for (j, c) in column.iter().enumerate() {
                data[j * self.nx + i] = *c;
            }
        }
    }
}
