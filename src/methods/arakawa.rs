//! Discrete Jacobians `J(ψ, ω) = ψ_x ω_y - ψ_y ω_x` on the periodic grid.
//!
//! The Arakawa form averages three second-order estimators:
//!
//! ```text
//! J++  central cross product
//! J+x  ω outside the differences (divergence form)
//! Jx+  ψ outside the differences (curl form)
//! J  = (J++ + J+x + Jx+) / 3
//! ```
//!
//! On a periodic grid `Σ ω J = 0` and `Σ ψ J = 0` hold exactly, so the
//! semi-discrete scheme conserves enstrophy and energy. The central
//! variant (`J++` alone) conserves neither.

use crate::grid::{Field2D, PeriodicGrid2D};

/// Index helper for the 3×3 neighbourhood of node `(i, j)`.
#[derive(Clone, Copy)]
struct Stencil {
    i: usize,
    ie: usize,
    iw: usize,
    j: usize,
    jn: usize,
    js: usize,
}

impl Stencil {
    #[inline(always)]
    fn new(grid: &PeriodicGrid2D, i: usize, j: usize) -> Self {
        Self {
            i,
            ie: grid.east(i),
            iw: grid.west(i),
            j,
            jn: grid.north(j),
            js: grid.south(j),
        }
    }

    #[inline(always)]
    fn j_pp(&self, p: &Field2D, w: &Field2D) -> f64 {
        let Self { i, ie, iw, j, jn, js } = *self;
        (p.get(ie, j) - p.get(iw, j)) * (w.get(i, jn) - w.get(i, js))
            - (p.get(i, jn) - p.get(i, js)) * (w.get(ie, j) - w.get(iw, j))
    }

    #[inline(always)]
    fn j_px(&self, p: &Field2D, w: &Field2D) -> f64 {
        let Self { i, ie, iw, j, jn, js } = *self;
        w.get(i, jn) * (p.get(ie, jn) - p.get(iw, jn))
            - w.get(i, js) * (p.get(ie, js) - p.get(iw, js))
            - w.get(ie, j) * (p.get(ie, jn) - p.get(ie, js))
            + w.get(iw, j) * (p.get(iw, jn) - p.get(iw, js))
    }

    #[inline(always)]
    fn j_xp(&self, p: &Field2D, w: &Field2D) -> f64 {
        let Self { i, ie, iw, j, jn, js } = *self;
        p.get(ie, j) * (w.get(ie, jn) - w.get(ie, js))
            - p.get(iw, j) * (w.get(iw, jn) - w.get(iw, js))
            - p.get(i, jn) * (w.get(ie, jn) - w.get(iw, jn))
            + p.get(i, js) * (w.get(ie, js) - w.get(iw, js))
    }
}

/// Energy- and enstrophy-conserving Arakawa Jacobian.
pub fn arakawa_jacobian(grid: &PeriodicGrid2D, psi: &Field2D, omega: &Field2D) -> Field2D {
    let scale = 1.0 / (12.0 * grid.dx * grid.dy);
    Field2D::from_rows(grid.nx(), grid.ny(), |j, row| {
        for (i, out) in row.iter_mut().enumerate() {
            let s = Stencil::new(grid, i, j);
            *out = (s.j_pp(psi, omega) + s.j_px(psi, omega) + s.j_xp(psi, omega)) * scale;
        }
    })
}

/// Plain central-difference Jacobian. Not conservative.
pub fn central_jacobian(grid: &PeriodicGrid2D, psi: &Field2D, omega: &Field2D) -> Field2D {
    let scale = 1.0 / (4.0 * grid.dx * grid.dy);
    Field2D::from_rows(grid.nx(), grid.ny(), |j, row| {
        for (i, out) in row.iter_mut().enumerate() {
            *out = Stencil::new(grid, i, j).j_pp(psi, omega) * scale;
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Resolution2D;
    use std::f64::consts::PI;

    fn setup() -> (PeriodicGrid2D, Field2D, Field2D) {
        let g = PeriodicGrid2D::new(Resolution2D::new(24, 20), 2.0 * PI, 2.0 * PI).unwrap();
        let psi = g.sample(|x, y| (x + 0.4).sin() * (2.0 * y).cos() + 0.3 * (x - y).cos());
        let omega = g.sample(|x, y| (-(x * x + 2.0 * y * y)).exp() + 0.2 * (2.0 * x + y).sin());
        (g, psi, omega)
    }

    #[test]
    fn test_arakawa_conserves_discrete_invariants() {
        let (g, psi, omega) = setup();
        let jac = arakawa_jacobian(&g, &psi, &omega);
        let scale = jac.max_abs() * omega.max_abs() * jac.len() as f64;
        assert!(omega.dot(&jac).abs() < 1e-13 * scale, "Σ ωJ = {}", omega.dot(&jac));
        assert!(psi.dot(&jac).abs() < 1e-13 * scale, "Σ ψJ = {}", psi.dot(&jac));
        // Σ J = 0 (vorticity conservation)
        assert!(jac.data.iter().sum::<f64>().abs() < 1e-12 * scale);
    }

    #[test]
    fn test_central_does_not_conserve_enstrophy() {
        let (g, psi, omega) = setup();
        let jac = central_jacobian(&g, &psi, &omega);
        let scale = jac.max_abs() * omega.max_abs() * jac.len() as f64;
        assert!(omega.dot(&jac).abs() > 1e-8 * scale);
    }

    #[test]
    fn test_consistency_with_analytic_jacobian() {
        // ψ = sin x, ω = sin y  ->  J = cos x cos y
        let g = PeriodicGrid2D::new(Resolution2D::square(64), 2.0 * PI, 2.0 * PI).unwrap();
        let psi = g.sample(|x, _| x.sin());
        let omega = g.sample(|_, y| y.sin());
        let exact = g.sample(|x, y| x.cos() * y.cos());
        for jac in [
            arakawa_jacobian(&g, &psi, &omega),
            central_jacobian(&g, &psi, &omega),
        ] {
            assert!(jac.max_abs_diff(&exact) < 1e-2, "error {}", jac.max_abs_diff(&exact));
        }
    }
}
