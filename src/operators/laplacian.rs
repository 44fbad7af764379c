//! Periodic 5-point Laplacian.
//!
//! The matrix form is the Kronecker sum
//!
//! ```text
//! L = I_y ⊗ D_xx + D_yy ⊗ I_x
//! ```
//!
//! of 1D periodic tridiagonal second-difference operators, matching the
//! row-major field layout `idx = j * nx + i`.

use faer::sparse::{SparseColMat, Triplet};

use crate::error::{Result, VortexError};
use crate::grid::{Field2D, PeriodicGrid2D};

/// Entries of the 1D periodic second-difference operator `(u[i+1] - 2u[i] + u[i-1]) / h²`.
///
/// Wrapped neighbours may coincide for `n ≤ 2`; duplicate entries are summed
/// on assembly.
pub fn periodic_second_difference(n: usize, h: f64) -> Vec<(usize, usize, f64)> {
    let inv_h2 = 1.0 / (h * h);
    let mut entries = Vec::with_capacity(3 * n);
    for i in 0..n {
        entries.push((i, i, -2.0 * inv_h2));
        entries.push((i, (i + 1) % n, inv_h2));
        entries.push((i, (i + n - 1) % n, inv_h2));
    }
    entries
}

/// Sparse periodic Laplacian on a [`PeriodicGrid2D`].
#[derive(Clone, Debug)]
pub struct PeriodicLaplacian {
    nx: usize,
    ny: usize,
    entries: Vec<Triplet<usize, usize, f64>>,
}

impl PeriodicLaplacian {
    /// Assemble the Kronecker sum for the grid.
    pub fn new(grid: &PeriodicGrid2D) -> Self {
        let (nx, ny) = (grid.nx(), grid.ny());
        let dxx = periodic_second_difference(nx, grid.dx);
        let dyy = periodic_second_difference(ny, grid.dy);

        let mut entries = Vec::with_capacity(dxx.len() * ny + dyy.len() * nx);
        // I_y ⊗ D_xx
        for j in 0..ny {
            let offset = j * nx;
            entries.extend(
                dxx.iter()
                    .map(|&(a, b, v)| Triplet::new(offset + a, offset + b, v)),
            );
        }
        // D_yy ⊗ I_x
        for &(a, b, v) in &dyy {
            entries.extend((0..nx).map(|i| Triplet::new(a * nx + i, b * nx + i, v)));
        }

        log::debug!(
            "assembled periodic Laplacian: {} unknowns, {} entries",
            nx * ny,
            entries.len()
        );
        Self { nx, ny, entries }
    }

    /// Number of unknowns.
    pub fn size(&self) -> usize {
        self.nx * self.ny
    }

    /// Raw triplet entries (duplicates not yet summed).
    pub fn entries(&self) -> &[Triplet<usize, usize, f64>] {
        &self.entries
    }

    /// Compressed sparse matrix of the operator.
    pub fn to_sparse(&self) -> Result<SparseColMat<usize, f64>> {
        assemble(self.size(), &self.entries)
    }

    /// Compressed sparse matrix with row 0 replaced by `ψ_0 = 0`.
    ///
    /// The periodic Laplacian is singular (constants span its null space);
    /// pinning one value makes the system uniquely solvable for any
    /// zero-mean right-hand side.
    pub fn to_sparse_pinned(&self) -> Result<SparseColMat<usize, f64>> {
        let mut pinned: Vec<_> = self
            .entries
            .iter()
            .filter(|t| t.row != 0)
            .copied()
            .collect();
        pinned.push(Triplet::new(0, 0, 1.0));
        assemble(self.size(), &pinned)
    }

    /// Matrix-vector product `L f`.
    pub fn apply(&self, field: &Field2D) -> Field2D {
        let mut out = Field2D::zeros(self.nx, self.ny);
        for t in &self.entries {
            out.data[t.row] += t.val * field.data[t.col];
        }
        out
    }
}

fn assemble(n: usize, entries: &[Triplet<usize, usize, f64>]) -> Result<SparseColMat<usize, f64>> {
    SparseColMat::try_new_from_triplets(n, n, entries).map_err(|e| {
        VortexError::config(
            "resolution",
            format!("cannot assemble {}×{} Laplacian: {:?}", n, n, e),
        )
    })
}

/// Apply the periodic 5-point Laplacian with the grid's neighbour tables.
pub fn laplacian_5pt(grid: &PeriodicGrid2D, field: &Field2D) -> Field2D {
    let (nx, ny) = (grid.nx(), grid.ny());
    let inv_dx2 = 1.0 / (grid.dx * grid.dx);
    let inv_dy2 = 1.0 / (grid.dy * grid.dy);
    let mut out = Field2D::zeros(nx, ny);
    for j in 0..ny {
        let (jn, js) = (grid.north(j), grid.south(j));
        for i in 0..nx {
            let (ie, iw) = (grid.east(i), grid.west(i));
            let c = field.get(i, j);
            let d2x = (field.get(ie, j) - 2.0 * c + field.get(iw, j)) * inv_dx2;
            let d2y = (field.get(i, jn) - 2.0 * c + field.get(i, js)) * inv_dy2;
            out.set(i, j, d2x + d2y);
        }
    }
    out
}
