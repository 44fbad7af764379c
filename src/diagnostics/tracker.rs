//! Conservation tracking across a run.

use super::DiagnosticsRecord;

/// Track invariants over time for monitoring conservation and divergence.
#[derive(Clone, Debug)]
pub struct ConservationTracker {
    /// Initial diagnostics (reference for drift)
    initial: DiagnosticsRecord,
    /// Most recent diagnostics
    current: DiagnosticsRecord,
    /// Number of updates
    n_updates: usize,
    /// Largest |ω| seen during the run
    max_vorticity_seen: f64,
    /// Largest speed seen during the run
    max_speed_seen: f64,
}

impl ConservationTracker {
    /// Create a new tracker with initial diagnostics.
    pub fn new(initial: DiagnosticsRecord) -> Self {
        Self {
            max_vorticity_seen: initial.max_vorticity,
            max_speed_seen: initial.peak_speed,
            current: initial.clone(),
            initial,
            n_updates: 0,
        }
    }

    /// Update tracker with new diagnostics.
    pub fn update(&mut self, record: DiagnosticsRecord) {
        self.n_updates += 1;
        // NaN must stick once seen
        self.max_vorticity_seen = crate::grid::nan_max(self.max_vorticity_seen, record.max_vorticity);
        self.max_speed_seen = crate::grid::nan_max(self.max_speed_seen, record.peak_speed);
        self.current = record;
    }

    /// Relative enstrophy change since the initial record.
    pub fn enstrophy_drift(&self) -> f64 {
        relative_change(self.initial.enstrophy, self.current.enstrophy)
    }

    /// Relative kinetic-energy change since the initial record.
    pub fn energy_drift(&self) -> f64 {
        relative_change(self.initial.kinetic_energy, self.current.kinetic_energy)
    }

    /// Get current diagnostics.
    pub fn current(&self) -> &DiagnosticsRecord {
        &self.current
    }

    /// Get initial diagnostics.
    pub fn initial(&self) -> &DiagnosticsRecord {
        &self.initial
    }

    /// Number of updates after the initial record.
    pub fn n_updates(&self) -> usize {
        self.n_updates
    }

    /// Largest |ω| seen so far.
    pub fn max_vorticity_seen(&self) -> f64 {
        self.max_vorticity_seen
    }

    /// Whether the run has produced non-finite values.
    pub fn has_diverged(&self) -> bool {
        !self.current.is_finite()
            || !self.max_vorticity_seen.is_finite()
            || !self.max_speed_seen.is_finite()
    }

    /// Log a summary of the run's conservation behaviour.
    pub fn log_summary(&self) {
        log::info!(
            "conservation after {} updates: enstrophy drift {:.3e}, energy drift {:.3e}, max |ω| {:.4e}, max |u| {:.4e}",
            self.n_updates,
            self.enstrophy_drift(),
            self.energy_drift(),
            self.max_vorticity_seen,
            self.max_speed_seen
        );
        if self.has_diverged() {
            log::warn!("run produced non-finite values: {}", self.current.summary_line());
        }
    }
}

fn relative_change(initial: f64, current: f64) -> f64 {
    if initial.abs() > 1e-300 {
        (current - initial) / initial.abs()
    } else {
        current - initial
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(enstrophy: f64, kinetic_energy: f64, max_vorticity: f64) -> DiagnosticsRecord {
        DiagnosticsRecord {
            time: 0.0,
            step: 0,
            max_vorticity,
            enstrophy,
            kinetic_energy,
            peak_speed: 1.0,
        }
    }

    #[test]
    fn test_drift() {
        let mut tracker = ConservationTracker::new(record(2.0, 4.0, 1.0));
        tracker.update(record(1.9, 4.4, 0.9));
        assert!((tracker.enstrophy_drift() + 0.05).abs() < 1e-14);
        assert!((tracker.energy_drift() - 0.1).abs() < 1e-14);
        assert_eq!(tracker.max_vorticity_seen(), 1.0);
        assert!(!tracker.has_diverged());
    }

    #[test]
    fn test_divergence_sticks() {
        let mut tracker = ConservationTracker::new(record(1.0, 1.0, 1.0));
        tracker.update(record(f64::NAN, 1.0, f64::NAN));
        tracker.update(record(1.0, 1.0, 1.0));
        assert!(tracker.has_diverged());
        assert_eq!(tracker.n_updates(), 2);
    }
}
