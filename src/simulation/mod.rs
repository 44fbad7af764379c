//! Simulation runner and run outputs.
//!
//! [`Simulation`] ties a [`VorticityKernel`](crate::methods::VorticityKernel)
//! to a configuration and returns a [`RunOutput`]:
//! - [`SnapshotSeries`]: ω and ψ at the scheduled sample times, in order
//! - [`RunDiagnostics`]: counts, phase timings and diagnostic time series
//!
//! # Example
//! ```
//! use vortex_rs::config::SimulationConfig;
//! use vortex_rs::methods::FiniteDifferenceKernel;
//! use vortex_rs::simulation::Simulation;
//!
//! let config = SimulationConfig::default()
//!     .with_resolution(16, 16)
//!     .with_time_step(0.01)
//!     .with_final_time(0.1)
//!     .with_sample_times(vec![0.05]);
//!
//! let output = Simulation::new(config).run::<FiniteDifferenceKernel>().unwrap();
//! assert_eq!(output.snapshots.len(), 3);
//! assert_eq!(output.diagnostics.n_steps, 10);
//! ```

mod runner;
mod snapshot;

pub use runner::{PhaseTime, PhaseTimings, RunDiagnostics, RunOutput, Simulation};
pub use snapshot::{SampleSchedule, Snapshot, SnapshotSeries};
