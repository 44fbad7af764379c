//! Runtime diagnostics.
//!
//! - [`DiagnosticsRecord`]: scalar measurements of one state
//! - [`ConservationTracker`]: drift of enstrophy and energy over a run

mod record;
mod tracker;

pub use record::{DiagnosticsRecord, enstrophy, grid_kinetic_energy, peak_speed};
pub use tracker::ConservationTracker;
