//! Periodic grid geometry and field containers.
//!
//! - [`Field2D`], [`Field3D`]: scalar fields (single slice and layered)
//! - [`PeriodicGrid2D`]: spacing, coordinate meshes and neighbour tables

mod field;
mod periodic;

pub use field::{Field2D, Field3D};
pub use periodic::PeriodicGrid2D;

pub(crate) use field::nan_max;
