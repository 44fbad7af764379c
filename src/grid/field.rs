//! Scalar field storage on the periodic grid.
//!
//! Fields are stored row-major with `data[j * nx + i]` for column `i`
//! (x-direction) and row `j` (y-direction), i.e. shape `Ny × Nx`.
//! Layered fields stack `Nz` such slices, layer-major.

use crate::error::{Result, VortexError};

/// 2D scalar field of shape `ny × nx`.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Field2D {
    /// Values in row-major layout
    pub data: Vec<f64>,
    /// Number of columns (x-direction)
    pub nx: usize,
    /// Number of rows (y-direction)
    pub ny: usize,
}

impl Field2D {
    /// Create a zero-initialized field.
    pub fn zeros(nx: usize, ny: usize) -> Self {
        Self {
            data: vec![0.0; nx * ny],
            nx,
            ny,
        }
    }

    /// Create a field from row-major data.
    pub fn from_data(data: Vec<f64>, nx: usize, ny: usize) -> Result<Self> {
        if data.len() != nx * ny {
            return Err(VortexError::dimension_mismatch(
                format!("{} values ({}×{})", nx * ny, ny, nx),
                format!("{} values", data.len()),
            ));
        }
        Ok(Self { data, nx, ny })
    }

    /// Create a field by evaluating `f(i, j)` at every grid index.
    pub fn from_fn<F>(nx: usize, ny: usize, f: F) -> Self
    where
        F: Fn(usize, usize) -> f64,
    {
        let mut data = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                data.push(f(i, j));
            }
        }
        Self { data, nx, ny }
    }

    /// Shape as `(ny, nx)`.
    #[inline]
    pub fn shape(&self) -> (usize, usize) {
        (self.ny, self.nx)
    }

    /// Number of values.
    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the field holds no values.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Value at column `i`, row `j`.
    #[inline(always)]
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.data[j * self.nx + i]
    }

    /// Set the value at column `i`, row `j`.
    #[inline(always)]
    pub fn set(&mut self, i: usize, j: usize, value: f64) {
        self.data[j * self.nx + i] = value;
    }

    /// Fill every value with a constant.
    pub fn fill(&mut self, value: f64) {
        self.data.fill(value);
    }

    /// Scale all values by a constant.
    pub fn scale(&mut self, c: f64) {
        for v in &mut self.data {
            *v *= c;
        }
    }

    /// Add c * other to self (axpy operation).
    pub fn axpy(&mut self, c: f64, other: &Self) {
        assert_eq!(self.data.len(), other.data.len());
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += c * *b;
        }
    }

    /// Arithmetic mean of all values.
    pub fn mean(&self) -> f64 {
        if self.data.is_empty() {
            return 0.0;
        }
        self.data.iter().sum::<f64>() / self.data.len() as f64
    }

    /// Subtract the arithmetic mean so the field has zero mean.
    pub fn remove_mean(&mut self) {
        let mean = self.mean();
        for v in &mut self.data {
            *v -= mean;
        }
    }

    /// Maximum absolute value.
    ///
    /// NaN values propagate to the result instead of being skipped.
    pub fn max_abs(&self) -> f64 {
        max_abs(&self.data)
    }

    /// Sum of squared values.
    pub fn sum_squares(&self) -> f64 {
        self.data.iter().map(|v| v * v).sum()
    }

    /// Sum of pointwise products with another field of the same shape.
    pub fn dot(&self, other: &Self) -> f64 {
        assert_eq!(self.data.len(), other.data.len());
        self.data.iter().zip(&other.data).map(|(a, b)| a * b).sum()
    }

    /// Whether all values are finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// Build a field row by row: `f(j, row)` fills row `j` in place.
    ///
    /// Rows are filled concurrently with the `parallel` feature. Each row
    /// only depends on `j`, so results do not depend on the feature.
    pub fn from_rows<F>(nx: usize, ny: usize, f: F) -> Self
    where
        F: Fn(usize, &mut [f64]) + Send + Sync,
    {
        let mut out = Self::zeros(nx, ny);
        if nx == 0 {
            return out;
        }

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            out.data
                .par_chunks_mut(nx)
                .enumerate()
                .for_each(|(j, row)| f(j, row));
        }

        #[cfg(not(feature = "parallel"))]
        out.data
            .chunks_mut(nx)
            .enumerate()
            .for_each(|(j, row)| f(j, row));

        out
    }

    /// Maximum absolute difference to another field of the same shape.
    pub fn max_abs_diff(&self, other: &Self) -> f64 {
        assert_eq!(self.data.len(), other.data.len());
        self.data
            .iter()
            .zip(&other.data)
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, nan_max)
    }
}

/// 3D scalar field stored as `nz` stacked `ny × nx` layers.
#[derive(Clone, Debug, PartialEq)]
pub struct Field3D {
    /// Values in layer-major layout: `data[k * nx * ny + j * nx + i]`
    pub data: Vec<f64>,
    /// Number of columns (x-direction)
    pub nx: usize,
    /// Number of rows (y-direction)
    pub ny: usize,
    /// Number of layers (z-direction)
    pub nz: usize,
}

impl Field3D {
    /// Create a zero-initialized field.
    pub fn zeros(nx: usize, ny: usize, nz: usize) -> Self {
        Self {
            data: vec![0.0; nx * ny * nz],
            nx,
            ny,
            nz,
        }
    }

    /// Lift a 2D field onto `profile.len()` layers, scaling layer `k` by `profile[k]`.
    pub fn from_profile(base: &Field2D, profile: &[f64]) -> Self {
        let mut data = Vec::with_capacity(base.len() * profile.len());
        for &weight in profile {
            data.extend(base.data.iter().map(|v| v * weight));
        }
        Self {
            data,
            nx: base.nx,
            ny: base.ny,
            nz: profile.len(),
        }
    }

    /// Number of values per layer.
    #[inline]
    pub fn layer_len(&self) -> usize {
        self.nx * self.ny
    }

    /// Values of layer `k`.
    #[inline]
    pub fn layer(&self, k: usize) -> &[f64] {
        let n = self.layer_len();
        &self.data[k * n..(k + 1) * n]
    }

    /// Mutable values of layer `k`.
    #[inline]
    pub fn layer_mut(&mut self, k: usize) -> &mut [f64] {
        let n = self.layer_len();
        &mut self.data[k * n..(k + 1) * n]
    }

    /// Copy layer `k` into a standalone 2D field.
    pub fn layer_field(&self, k: usize) -> Field2D {
        Field2D {
            data: self.layer(k).to_vec(),
            nx: self.nx,
            ny: self.ny,
        }
    }

    /// Layer-mean projection onto a 2D field.
    pub fn depth_mean(&self) -> Field2D {
        let n = self.layer_len();
        let mut mean = vec![0.0; n];
        for k in 0..self.nz {
            for (m, v) in mean.iter_mut().zip(self.layer(k)) {
                *m += v;
            }
        }
        let inv_nz = 1.0 / self.nz as f64;
        for m in &mut mean {
            *m *= inv_nz;
        }
        Field2D {
            data: mean,
            nx: self.nx,
            ny: self.ny,
        }
    }

    /// Scale all values by a constant.
    pub fn scale(&mut self, c: f64) {
        for v in &mut self.data {
            *v *= c;
        }
    }

    /// Add c * other to self (axpy operation).
    pub fn axpy(&mut self, c: f64, other: &Self) {
        assert_eq!(self.data.len(), other.data.len());
        for (a, b) in self.data.iter_mut().zip(other.data.iter()) {
            *a += c * *b;
        }
    }

    /// Maximum absolute value (NaN-propagating).
    pub fn max_abs(&self) -> f64 {
        max_abs(&self.data)
    }

    /// Whether all values are finite.
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }
}

/// `max` that keeps NaN once seen, unlike `f64::max`.
#[inline]
pub(crate) fn nan_max(acc: f64, x: f64) -> f64 {
    if acc.is_nan() || x.is_nan() {
        f64::NAN
    } else {
        acc.max(x)
    }
}

/// Maximum absolute value of a slice, propagating NaN.
fn max_abs(values: &[f64]) -> f64 {
    values.iter().map(|v| v.abs()).fold(0.0, nan_max)
}
