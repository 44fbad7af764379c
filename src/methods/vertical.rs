//! Vertical structure of the layered kernel.

use crate::config::VerticalBoundary;
use crate::grid::Field3D;

/// Relative width of the initial vertical profile (σ = 0.2·Lz).
const PROFILE_WIDTH: f64 = 0.2;

/// Gaussian bump centered at mid-depth, sampled at layer centers
/// `z_k = (k + ½)·dz` and scaled so its layer mean is exactly 1.
pub fn gaussian_profile(nz: usize, lz: f64) -> Vec<f64> {
    let dz = lz / nz as f64;
    let center = 0.5 * lz;
    let sigma = PROFILE_WIDTH * lz;
    let raw: Vec<f64> = (0..nz)
        .map(|k| {
            let z = (k as f64 + 0.5) * dz;
            (-0.5 * ((z - center) / sigma).powi(2)).exp()
        })
        .collect();
    let mean = raw.iter().sum::<f64>() / nz as f64;
    raw.into_iter().map(|w| w / mean).collect()
}

/// `κ (ω_{k+1} - 2ω_k + ω_{k-1}) / dz²` for every layer.
///
/// Periodic boundaries wrap layer `Nz-1` onto layer `0`. Reflective
/// boundaries mirror the outermost layer into the ghost, so no flux leaves
/// through the top or bottom.
pub fn vertical_diffusion(
    omega: &Field3D,
    kappa: f64,
    dz: f64,
    boundary: VerticalBoundary,
) -> Field3D {
    let nz = omega.nz;
    let mut out = Field3D::zeros(omega.nx, omega.ny, nz);
    let coeff = kappa / (dz * dz);
    for k in 0..nz {
        let (below, above) = match boundary {
            VerticalBoundary::Periodic => ((k + nz - 1) % nz, (k + 1) % nz),
            VerticalBoundary::Reflective => (k.saturating_sub(1), (k + 1).min(nz - 1)),
        };
        let (lo, mid, hi) = (omega.layer(below), omega.layer(k), omega.layer(above));
        for (idx, o) in out.layer_mut(k).iter_mut().enumerate() {
            *o = coeff * (hi[idx] - 2.0 * mid[idx] + lo[idx]);
        }
    }
    out
}
