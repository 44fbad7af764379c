//! Sample schedules and captured snapshots.

use std::ops::Index;

use crate::config::{SimulationConfig, TIME_EPS};
use crate::diagnostics::DiagnosticsRecord;
use crate::grid::Field2D;
use crate::methods::FlowState;

// =============================================================================
// Sample schedule
// =============================================================================

/// Steps at which a run captures snapshots.
///
/// Requested times map to the first state whose time is at or past them
/// (within a relative `1e-9`), so every snapshot is an actual integrator
/// state and no interpolation is done. The initial state and the final
/// state are always included. Requests that land on the same state
/// produce a single snapshot.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SampleSchedule {
    steps: Vec<usize>,
}

impl SampleSchedule {
    /// Build a schedule for `n_steps` steps of size `dt`.
    pub fn new(sample_times: &[f64], dt: f64, n_steps: usize) -> Self {
        let mut steps = Vec::with_capacity(sample_times.len() + 2);
        steps.push(0);
        steps.push(n_steps);
        for &t in sample_times {
            let ratio = t / dt;
            let step = (ratio - TIME_EPS * ratio.max(1.0)).ceil().max(0.0) as usize;
            steps.push(step.min(n_steps));
        }
        steps.sort_unstable();
        steps.dedup();
        Self { steps }
    }

    /// Schedule for a configuration's sample times.
    pub fn from_config(config: &SimulationConfig) -> Self {
        Self::new(&config.sample_times, config.dt, config.n_steps())
    }

    /// Scheduled steps in increasing order.
    pub fn steps(&self) -> &[usize] {
        &self.steps
    }

    /// Number of snapshots the schedule produces.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Always false: the initial state is always scheduled.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Whether `step` is scheduled.
    pub fn contains(&self, step: usize) -> bool {
        self.steps.binary_search(&step).is_ok()
    }
}

// =============================================================================
// Snapshots
// =============================================================================

/// One captured state: ω, ψ and their diagnostics.
#[derive(Clone, Debug)]
pub struct Snapshot {
    /// Simulation time
    pub time: f64,
    /// Step counter
    pub step: usize,
    /// Vorticity (depth mean for layered runs)
    pub omega: Field2D,
    /// Streamfunction (depth mean for layered runs)
    pub psi: Field2D,
    /// Diagnostics of this state
    pub diagnostics: DiagnosticsRecord,
}

impl Snapshot {
    /// Copy the 2D view of a kernel state.
    pub fn capture<S: FlowState>(state: &S, diagnostics: DiagnosticsRecord) -> Self {
        Self {
            time: state.time(),
            step: state.step(),
            omega: state.omega().clone(),
            psi: state.psi().clone(),
            diagnostics,
        }
    }
}

/// Snapshots ordered by time, first to last.
#[derive(Clone, Debug, Default)]
pub struct SnapshotSeries {
    snapshots: Vec<Snapshot>,
}

impl SnapshotSeries {
    /// Empty series with room for `capacity` snapshots.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            snapshots: Vec::with_capacity(capacity),
        }
    }

    /// Append a snapshot; its time must not precede the last one.
    pub(crate) fn push(&mut self, snapshot: Snapshot) {
        debug_assert!(
            self.snapshots
                .last()
                .is_none_or(|last| last.time <= snapshot.time),
            "snapshots must be pushed in time order"
        );
        self.snapshots.push(snapshot);
    }

    /// Number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Snapshot at position `idx`.
    pub fn get(&self, idx: usize) -> Option<&Snapshot> {
        self.snapshots.get(idx)
    }

    /// First snapshot (the initial state).
    pub fn first(&self) -> Option<&Snapshot> {
        self.snapshots.first()
    }

    /// Last snapshot (the final state).
    pub fn last(&self) -> Option<&Snapshot> {
        self.snapshots.last()
    }

    /// Iterate in time order.
    pub fn iter(&self) -> std::slice::Iter<'_, Snapshot> {
        self.snapshots.iter()
    }

    /// Sample times.
    pub fn times(&self) -> Vec<f64> {
        self.snapshots.iter().map(|s| s.time).collect()
    }

    /// Diagnostics of every snapshot.
    pub fn records(&self) -> impl Iterator<Item = &DiagnosticsRecord> {
        self.snapshots.iter().map(|s| &s.diagnostics)
    }

    /// Consume the series.
    pub fn into_vec(self) -> Vec<Snapshot> {
        self.snapshots
    }
}

impl Index<usize> for SnapshotSeries {
    type Output = Snapshot;

    fn index(&self, idx: usize) -> &Snapshot {
        &self.snapshots[idx]
    }
}

impl<'a> IntoIterator for &'a SnapshotSeries {
    type Item = &'a Snapshot;
    type IntoIter = std::slice::Iter<'a, Snapshot>;

    fn into_iter(self) -> Self::IntoIter {
        self.snapshots.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schedule_always_has_endpoints() {
        let schedule = SampleSchedule::new(&[], 0.1, 10);
        assert_eq!(schedule.steps(), &[0, 10]);
        assert!(schedule.contains(0));
        assert!(schedule.contains(10));
        assert!(!schedule.contains(5));
    }

    #[test]
    fn test_schedule_sorts_and_dedups() {
        let schedule = SampleSchedule::new(&[0.5, 0.0, 1.0, 0.25, 0.5], 0.1, 10);
        assert_eq!(schedule.steps(), &[0, 3, 5, 10]);
    }

    #[test]
    fn test_schedule_tolerates_roundoff() {
        // 0.3 / 0.1 = 2.9999999999999996
        let schedule = SampleSchedule::new(&[0.3, 0.7000000001], 0.1, 10);
        assert_eq!(schedule.steps(), &[0, 3, 7, 10]);
    }

    #[test]
    fn test_schedule_from_config() {
        let config = SimulationConfig::default()
            .with_time_step(0.001)
            .with_final_time(0.01)
            .with_sample_times(vec![0.005]);
        let schedule = SampleSchedule::from_config(&config);
        assert_eq!(schedule.steps(), &[0, 5, 10]);
        assert_eq!(schedule.len(), 3);
    }
}
