//! Uniform doubly-periodic rectangular grid.
//!
//! Nodes sit at `x_i = -Lx/2 + i·dx`, `y_j = -Ly/2 + j·dy` with
//! `dx = Lx/Nx`, `dy = Ly/Ny`, so the domain is centered on the origin and
//! node `Nx` coincides with node `0`.

use super::Field2D;
use crate::error::{Result, VortexError};
use crate::types::Resolution2D;

/// Spacing, coordinates and periodic neighbour tables for one run.
#[derive(Clone, Debug)]
pub struct PeriodicGrid2D {
    resolution: Resolution2D,
    /// Domain length in x
    pub lx: f64,
    /// Domain length in y
    pub ly: f64,
    /// Cell spacing in x
    pub dx: f64,
    /// Cell spacing in y
    pub dy: f64,
    /// 1D x-coordinates, length nx
    pub x: Vec<f64>,
    /// 1D y-coordinates, length ny
    pub y: Vec<f64>,
    /// `east[i] = (i + 1) mod nx`
    east: Vec<usize>,
    /// `west[i] = (i - 1) mod nx`
    west: Vec<usize>,
    /// `north[j] = (j + 1) mod ny`
    north: Vec<usize>,
    /// `south[j] = (j - 1) mod ny`
    south: Vec<usize>,
}

impl PeriodicGrid2D {
    /// Build the grid, checking that both lengths are finite and positive.
    pub fn new(resolution: Resolution2D, lx: f64, ly: f64) -> Result<Self> {
        check_length("lx", lx)?;
        check_length("ly", ly)?;
        let (nx, ny) = resolution.as_tuple();
        let dx = lx / nx as f64;
        let dy = ly / ny as f64;

        let x = (0..nx).map(|i| -0.5 * lx + i as f64 * dx).collect();
        let y = (0..ny).map(|j| -0.5 * ly + j as f64 * dy).collect();

        Ok(Self {
            resolution,
            lx,
            ly,
            dx,
            dy,
            x,
            y,
            east: (0..nx).map(|i| (i + 1) % nx).collect(),
            west: (0..nx).map(|i| (i + nx - 1) % nx).collect(),
            north: (0..ny).map(|j| (j + 1) % ny).collect(),
            south: (0..ny).map(|j| (j + ny - 1) % ny).collect(),
        })
    }

    /// Grid resolution.
    #[inline]
    pub fn resolution(&self) -> Resolution2D {
        self.resolution
    }

    /// Number of nodes in x.
    #[inline]
    pub fn nx(&self) -> usize {
        self.resolution.nx()
    }

    /// Number of nodes in y.
    #[inline]
    pub fn ny(&self) -> usize {
        self.resolution.ny()
    }

    /// Area represented by one node (dx·dy), the quadrature weight.
    #[inline]
    pub fn cell_area(&self) -> f64 {
        self.dx * self.dy
    }

    /// Periodic east neighbour of column `i`.
    #[inline(always)]
    pub fn east(&self, i: usize) -> usize {
        self.east[i]
    }

    /// Periodic west neighbour of column `i`.
    #[inline(always)]
    pub fn west(&self, i: usize) -> usize {
        self.west[i]
    }

    /// Periodic north neighbour of row `j`.
    #[inline(always)]
    pub fn north(&self, j: usize) -> usize {
        self.north[j]
    }

    /// Periodic south neighbour of row `j`.
    #[inline(always)]
    pub fn south(&self, j: usize) -> usize {
        self.south[j]
    }

    /// Zero field with this grid's shape.
    pub fn zeros(&self) -> Field2D {
        Field2D::zeros(self.nx(), self.ny())
    }

    /// Evaluate `f(x, y)` at every node.
    pub fn sample<F>(&self, f: F) -> Field2D
    where
        F: Fn(f64, f64) -> f64,
    {
        Field2D::from_fn(self.nx(), self.ny(), |i, j| f(self.x[i], self.y[j]))
    }

    /// x-coordinate mesh (`X[j][i] = x_i`).
    pub fn x_mesh(&self) -> Field2D {
        self.sample(|x, _| x)
    }

    /// y-coordinate mesh (`Y[j][i] = y_j`).
    pub fn y_mesh(&self) -> Field2D {
        self.sample(|_, y| y)
    }

    /// Check that a field matches this grid's shape.
    pub fn check_shape(&self, field: &Field2D) -> Result<()> {
        if field.nx != self.nx() || field.ny != self.ny() {
            return Err(VortexError::dimension_mismatch(
                format!("{}×{}", self.ny(), self.nx()),
                format!("{}×{}", field.ny, field.nx),
            ));
        }
        Ok(())
    }

    /// Domain integral of a field (sum times cell area).
    pub fn integrate(&self, field: &Field2D) -> f64 {
        field.data.iter().sum::<f64>() * self.cell_area()
    }

    /// Centered-difference velocities `(u, v) = (-∂ψ/∂y, ∂ψ/∂x)`.
    pub fn centered_velocity(&self, psi: &Field2D) -> (Field2D, Field2D) {
        let (nx, ny) = (self.nx(), self.ny());
        let inv_2dx = 0.5 / self.dx;
        let inv_2dy = 0.5 / self.dy;
        let mut u = Field2D::zeros(nx, ny);
        let mut v = Field2D::zeros(nx, ny);
        for j in 0..ny {
            let (jn, js) = (self.north(j), self.south(j));
            for i in 0..nx {
                let (ie, iw) = (self.east(i), self.west(i));
                u.set(i, j, -(psi.get(i, jn) - psi.get(i, js)) * inv_2dy);
                v.set(i, j, (psi.get(ie, j) - psi.get(iw, j)) * inv_2dx);
            }
        }
        (u, v)
    }
}

fn check_length(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(VortexError::config(
            name,
            format!("domain length must be finite and positive, got {}", value),
        ));
    }
    Ok(())
}
