//! Discrete operators on the periodic grid.
//!
//! This module provides:
//! - The sparse periodic 5-point Laplacian and its stencil form (`PeriodicLaplacian`)
//! - Planned 2D FFTs (`Fft2D`)
//! - Fourier wavenumbers with the 2/3 dealiasing mask (`SpectralOperators`)

mod fft;
mod laplacian;
mod spectral;

pub use fft::Fft2D;
pub use laplacian::{PeriodicLaplacian, laplacian_5pt, periodic_second_difference};
pub use spectral::{SpectralOperators, wavenumbers};
