//! Simulation runner implementation.
//!
//! Drives one kernel from `initialize` to `t_final`, capturing snapshots at
//! the scheduled steps and timing each phase.

use std::time::Instant;

use cpu_time::ProcessTime;

use super::{SampleSchedule, Snapshot, SnapshotSeries};
use crate::backend::ComputeBackend;
use crate::config::{MethodKind, SimulationConfig};
use crate::diagnostics::{ConservationTracker, DiagnosticsRecord};
use crate::error::Result;
use crate::initial::{AnalyticGenerator, VorticityGenerator};
use crate::methods::{FlowState, VorticityKernel};
use crate::time::IntegratorInfo;
use crate::types::Resolution2D;

// =============================================================================
// Run diagnostics
// =============================================================================

/// Wall and CPU seconds spent in one phase.
///
/// CPU time is process-wide, so with the `parallel` feature it includes
/// every rayon worker and may exceed `wall`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseTime {
    /// Wall-clock seconds
    pub wall: f64,
    /// CPU seconds
    pub cpu: f64,
}

impl std::ops::AddAssign for PhaseTime {
    fn add_assign(&mut self, rhs: Self) {
        self.wall += rhs.wall;
        self.cpu += rhs.cpu;
    }
}

/// Reads the wall clock and the process CPU clock together.
struct PhaseClock {
    wall: Instant,
    cpu: ProcessTime,
}

impl PhaseClock {
    fn start() -> Self {
        Self {
            wall: Instant::now(),
            cpu: ProcessTime::now(),
        }
    }

    fn elapsed(&self) -> PhaseTime {
        PhaseTime {
            wall: self.wall.elapsed().as_secs_f64(),
            cpu: self.cpu.elapsed().as_secs_f64(),
        }
    }
}

/// Per-phase timings of a run.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PhaseTimings {
    /// Operator construction and initial state
    pub setup: PhaseTime,
    /// `advance` calls
    pub integration: PhaseTime,
    /// `measure` calls and snapshot copies
    pub diagnostics: PhaseTime,
    /// Whole run
    pub total: PhaseTime,
}

/// Flat summary of a run, aligned with its snapshots.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RunDiagnostics {
    /// Discretization used
    pub method: MethodKind,
    /// Horizontal grid size
    pub resolution: Resolution2D,
    /// Vertical layers (1 for 2D kernels)
    pub n_layers: usize,
    /// `advance` calls performed
    pub n_steps: usize,
    /// Elliptic solves performed, including the initial one
    pub n_solves: usize,
    /// Backend the kernel ran on
    pub backend: ComputeBackend,
    /// Time integrator name
    pub integrator: String,
    /// Phase timings
    pub timings: PhaseTimings,
    /// Snapshot times
    pub times: Vec<f64>,
    /// Enstrophy at each snapshot
    pub enstrophy: Vec<f64>,
    /// Kinetic energy at each snapshot
    pub kinetic_energy: Vec<f64>,
    /// Peak |ω| at each snapshot
    pub max_vorticity: Vec<f64>,
    /// Peak speed at each snapshot
    pub peak_speed: Vec<f64>,
    /// Relative enstrophy change, first to last snapshot
    pub enstrophy_drift: f64,
    /// Relative kinetic-energy change, first to last snapshot
    pub energy_drift: f64,
}

impl RunDiagnostics {
    fn fill_series(&mut self, snapshots: &SnapshotSeries) {
        for record in snapshots.records() {
            self.times.push(record.time);
            self.enstrophy.push(record.enstrophy);
            self.kinetic_energy.push(record.kinetic_energy);
            self.max_vorticity.push(record.max_vorticity);
            self.peak_speed.push(record.peak_speed);
        }
    }
}

/// Everything a run returns.
#[derive(Clone, Debug)]
pub struct RunOutput {
    /// Snapshots in time order
    pub snapshots: SnapshotSeries,
    /// Flat diagnostics
    pub diagnostics: RunDiagnostics,
}

// =============================================================================
// Simulation runner
// =============================================================================

/// Runs one configuration through any [`VorticityKernel`].
///
/// Holds no state besides the configuration, so independent runs can be
/// driven from separate threads.
#[derive(Clone, Debug)]
pub struct Simulation {
    config: SimulationConfig,
}

impl Simulation {
    /// Create a runner for `config`.
    pub fn new(config: SimulationConfig) -> Self {
        Self { config }
    }

    /// Configuration of this runner.
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Run kernel `K` with the analytic initial-condition generator.
    pub fn run<K: VorticityKernel>(&self) -> Result<RunOutput> {
        self.run_with_callback::<K, _>(&AnalyticGenerator, |_| {})
    }

    /// Run kernel `K` with a caller-supplied initial-condition generator.
    pub fn run_with_generator<K: VorticityKernel>(
        &self,
        generator: &dyn VorticityGenerator,
    ) -> Result<RunOutput> {
        self.run_with_callback::<K, _>(generator, |_| {})
    }

    /// Run kernel `K`, calling `callback` with every state after `advance`.
    ///
    /// A failed `advance` aborts the run; its error is returned unchanged.
    pub fn run_with_callback<K, F>(
        &self,
        generator: &dyn VorticityGenerator,
        mut callback: F,
    ) -> Result<RunOutput>
    where
        K: VorticityKernel,
        F: FnMut(&K::State),
    {
        let run_start = PhaseClock::start();
        let config = &self.config;

        let (kernel, mut state) = K::initialize_with(config, generator)?;
        let schedule = SampleSchedule::from_config(config);
        let n_steps = config.n_steps();
        let setup = run_start.elapsed();

        log::info!(
            "{} run: grid {}, {} layer(s), {} steps of dt = {:.3e}, {} integrator, {} backend",
            K::KIND,
            kernel.grid().resolution(),
            kernel.n_layers(),
            n_steps,
            config.dt,
            kernel.integrator().name(),
            kernel.backend()
        );

        let mut snapshots = SnapshotSeries::with_capacity(schedule.len());
        let mut diagnostics_time = PhaseTime::default();
        let mut integration_time = PhaseTime::default();

        let t0 = PhaseClock::start();
        let initial = kernel.measure(&state);
        let mut tracker = ConservationTracker::new(initial.clone());
        snapshots.push(Snapshot::capture(&state, initial));
        diagnostics_time += t0.elapsed();

        for _ in 0..n_steps {
            let t0 = PhaseClock::start();
            state = kernel.advance(&state)?;
            integration_time += t0.elapsed();

            callback(&state);

            let step = state.step();
            if let Some(stride) = config.progress_stride
                && step % stride == 0
            {
                log::info!(
                    "step {}/{}: t = {:.4}, |ω|_max = {:.4e}",
                    step,
                    n_steps,
                    state.time(),
                    state.omega().max_abs()
                );
            }

            if schedule.contains(step) {
                let t0 = PhaseClock::start();
                let record = kernel.measure(&state);
                log::debug!("snapshot: {}", record.summary_line());
                tracker.update(record.clone());
                snapshots.push(Snapshot::capture(&state, record));
                diagnostics_time += t0.elapsed();
            }
        }

        tracker.log_summary();
        let total = run_start.elapsed();

        let mut diagnostics = RunDiagnostics {
            method: K::KIND,
            resolution: kernel.grid().resolution(),
            n_layers: kernel.n_layers(),
            n_steps: state.step(),
            n_solves: kernel.solve_count(),
            backend: kernel.backend(),
            integrator: kernel.integrator().name().to_string(),
            timings: PhaseTimings {
                setup,
                integration: integration_time,
                diagnostics: diagnostics_time,
                total,
            },
            times: Vec::with_capacity(snapshots.len()),
            enstrophy: Vec::with_capacity(snapshots.len()),
            kinetic_energy: Vec::with_capacity(snapshots.len()),
            max_vorticity: Vec::with_capacity(snapshots.len()),
            peak_speed: Vec::with_capacity(snapshots.len()),
            enstrophy_drift: tracker.enstrophy_drift(),
            energy_drift: tracker.energy_drift(),
        };
        diagnostics.fill_series(&snapshots);

        log::info!(
            "{} run complete: {} steps, {} solves, {:.3}s wall / {:.3}s cpu ({:.3}s integrating)",
            K::KIND,
            diagnostics.n_steps,
            diagnostics.n_solves,
            total.wall,
            total.cpu,
            integration_time.wall
        );

        Ok(RunOutput {
            snapshots,
            diagnostics,
        })
    }
}

impl RunOutput {
    /// Final diagnostics record.
    pub fn final_record(&self) -> Option<&DiagnosticsRecord> {
        self.snapshots.last().map(|s| &s.diagnostics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::{Field2D, PeriodicGrid2D};
    use crate::initial::InitialCondition;
    use crate::methods::{FiniteDifferenceKernel, LayeredKernel, SpectralKernel};

    fn config() -> SimulationConfig {
        SimulationConfig::default()
            .with_resolution(16, 16)
            .with_time_step(0.01)
            .with_final_time(0.04)
    }

    #[test]
    fn test_run_basic() {
        let output = Simulation::new(config()).run::<FiniteDifferenceKernel>().unwrap();
        let d = &output.diagnostics;
        assert_eq!(d.method, MethodKind::FiniteDifference);
        assert_eq!(d.n_steps, 4);
        assert_eq!(d.n_solves, 1 + 4 * 5);
        assert_eq!(d.n_layers, 1);
        assert_eq!(d.integrator, "rk4");
        assert_eq!(output.snapshots.len(), 2);
        assert_eq!(d.times.len(), 2);
        assert!(d.timings.total.wall >= d.timings.integration.wall);
        let t = &d.timings;
        assert!(t.setup.cpu >= 0.0 && t.integration.cpu >= 0.0);
        assert!(t.total.cpu >= t.integration.cpu);
    }

    #[test]
    fn test_run_with_callback_sees_every_step() {
        let mut steps = Vec::new();
        let output = Simulation::new(config())
            .run_with_callback::<SpectralKernel, _>(&AnalyticGenerator, |s| steps.push(s.step()))
            .unwrap();
        assert_eq!(steps, vec![1, 2, 3, 4]);
        assert!(output.final_record().is_some_and(|r| r.step == 4));
    }

    #[test]
    fn test_layered_run_reports_layers() {
        let output = Simulation::new(config()).run::<LayeredKernel>().unwrap();
        let d = &output.diagnostics;
        assert_eq!(d.n_layers, 8);
        assert_eq!(d.integrator, "forward-euler");
        assert_eq!(d.n_solves, 8 * (1 + 4 * 2));
    }

    struct Shifted;

    impl VorticityGenerator for Shifted {
        fn generate(&self, grid: &PeriodicGrid2D, _ic: &InitialCondition) -> Result<Field2D> {
            Ok(grid.sample(|x, y| (x + 0.3).sin() * (2.0 * y).cos()))
        }
    }

    #[test]
    fn test_run_with_generator() {
        let output = Simulation::new(config())
            .run_with_generator::<FiniteDifferenceKernel>(&Shifted)
            .unwrap();
        // node (0, 0) sits at (-π, -π)
        let expected = -(0.3f64).sin();
        let got = output.snapshots[0].omega.get(0, 0);
        assert!((got - expected).abs() < 1e-12, "got {}, expected {}", got, expected);
    }
}
