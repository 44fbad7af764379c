//! Strongly-typed domain types for safer APIs.
//!
//! Newtypes keep grid sizes from being mixed up with other integer
//! parameters (step counts, layer counts, vortex counts).

mod resolution;

pub use resolution::Resolution2D;
