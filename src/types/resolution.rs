//! Grid point counts.

use std::fmt;

use crate::error::{Result, VortexError};

/// Number of grid points along x and y of a periodic grid.
///
/// # Example
///
/// ```
/// use vortex_rs::types::Resolution2D;
///
/// let res = Resolution2D::new(64, 32);
/// assert_eq!(res.nx(), 64);
/// assert_eq!(res.ny(), 32);
/// assert_eq!(res.total_cells(), 2048);
/// assert!(res.is_even());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Resolution2D {
    /// Number of cells in x-direction
    nx: usize,
    /// Number of cells in y-direction
    ny: usize,
}

impl Resolution2D {
    /// # Panics
    ///
    /// Panics if either `nx` or `ny` is zero. Use [`Resolution2D::try_new`]
    /// for fallible construction from untrusted input.
    pub fn new(nx: usize, ny: usize) -> Self {
        match Self::try_new(nx, ny) {
            Ok(res) => res,
            Err(e) => panic!("invalid resolution {}x{}: {}", nx, ny, e),
        }
    }

    /// Create a resolution, returning a configuration error for zero sizes.
    pub fn try_new(nx: usize, ny: usize) -> Result<Self> {
        if nx == 0 {
            return Err(VortexError::config("nx", "must be a positive integer, got 0"));
        }
        if ny == 0 {
            return Err(VortexError::config("ny", "must be a positive integer, got 0"));
        }
        Ok(Self { nx, ny })
    }

    /// Create a resolution without checks; callers validate before use.
    pub(crate) const fn unchecked(nx: usize, ny: usize) -> Self {
        Self { nx, ny }
    }

    /// `n` points in each direction.
    pub fn square(n: usize) -> Self {
        Self::new(n, n)
    }

    /// Number of cells in x-direction.
    #[inline]
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Number of cells in y-direction.
    #[inline]
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Total number of grid cells.
    #[inline]
    pub fn total_cells(&self) -> usize {
        self.nx * self.ny
    }

    /// Whether both directions have an even number of cells.
    ///
    /// Required by the spectral method's wavenumber layout.
    #[inline]
    pub fn is_even(&self) -> bool {
        self.nx % 2 == 0 && self.ny % 2 == 0
    }

    /// Check that this resolution is usable: positive in both directions,
    /// and even if `require_even` is set.
    pub fn validate(&self, require_even: bool) -> Result<()> {
        Self::try_new(self.nx, self.ny)?;
        if require_even {
            if self.nx % 2 != 0 {
                return Err(VortexError::config(
                    "nx",
                    format!("must be even for the spectral method, got {}", self.nx),
                ));
            }
            if self.ny % 2 != 0 {
                return Err(VortexError::config(
                    "ny",
                    format!("must be even for the spectral method, got {}", self.ny),
                ));
            }
        }
        Ok(())
    }

    /// `(nx, ny)`
    #[inline]
    pub fn as_tuple(&self) -> (usize, usize) {
        (self.nx, self.ny)
    }
}

impl fmt::Display for Resolution2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}×{}", self.nx, self.ny)
    }
}

impl From<(usize, usize)> for Resolution2D {
    fn from((nx, ny): (usize, usize)) -> Self {
        Self::new(nx, ny)
    }
}

impl From<Resolution2D> for (usize, usize) {
    fn from(res: Resolution2D) -> Self {
        (res.nx, res.ny)
    }
}
