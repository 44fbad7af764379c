//! Explicit time stepping shared by the vorticity kernels.
//!
//! All kernels step their state through [`TimeIntegrator`]:
//! - [`RK4`] for the finite-difference and spectral kernels
//! - [`ForwardEuler`] for the layered finite-volume kernel
//!
//! Right-hand sides are fallible because every stage performs an elliptic
//! solve that may fail; the first error aborts the step and the caller's
//! state is left untouched.
//!
//! # Example
//! ```
//! use vortex_rs::grid::Field2D;
//! use vortex_rs::time::{TimeIntegrator, RK4};
//!
//! let mut u = Field2D::from_fn(4, 4, |_, _| 1.0);
//!
//! // du/dt = -u
//! RK4.step(&mut u, 0.01, 0.0, |state, _time| {
//!     let mut rhs = state.clone();
//!     rhs.scale(-1.0);
//!     Ok(rhs)
//! })
//! .unwrap();
//! assert!((u.get(0, 0) - (-0.01f64).exp()).abs() < 1e-10);
//! ```

use num_complex::Complex64;

use crate::error::Result;
use crate::grid::{Field2D, Field3D};

// =============================================================================
// Stage Arithmetic
// =============================================================================

/// A state that explicit stage combinations can act on.
///
/// Only `scale` (x <- c x) and `axpy` (x <- x + c y) are needed.
pub trait Integrable: Clone + Send + Sized {
    /// self <- c self
    fn scale(&mut self, c: f64);

    /// self <- self + c other
    fn axpy(&mut self, c: f64, other: &Self);

    /// Zero state of matching shape.
    fn zeros_like(&self) -> Self {
        let mut zero = self.clone();
        zero.scale(0.0);
        zero
    }
}

// =============================================================================
// Scheme Metadata
// =============================================================================

/// Scheme metadata, usable as `dyn IntegratorInfo` without naming a state type.
///
/// Run diagnostics report the name of the scheme a kernel stepped with.
pub trait IntegratorInfo: Send + Sync {
    /// Short lowercase name, as reported in run diagnostics.
    fn name(&self) -> &'static str;

    /// Formal order of accuracy.
    fn order(&self) -> usize;

    /// Number of right-hand-side evaluations per step.
    fn n_stages(&self) -> usize;

    /// Offsets from `t` at which each stage evaluates the tendency.
    fn stage_times(&self, dt: f64) -> Vec<f64>;
}

// =============================================================================
// TimeIntegrator Trait
// =============================================================================

/// An explicit one-step scheme over states of type `S`.
///
/// `rhs(state, time)` returns the tendency of `state`; it may fail, since
/// kernels run an elliptic solve inside it.
pub trait TimeIntegrator<S: Integrable>: IntegratorInfo {
    /// Advance the solution by one time step, applying `project` to every
    /// intermediate stage state and to the final state.
    ///
    /// Projection is how a kernel keeps a constraint on its state, such as
    /// a spectral truncation, through stage combinations.
    ///
    /// On error `state` is unchanged.
    fn step_projected<F, P>(&self, state: &mut S, dt: f64, t: f64, rhs: F, project: P) -> Result<()>
    where
        F: Fn(&S, f64) -> Result<S>,
        P: Fn(&mut S);

    /// Advance `state` from `t` to `t + dt` with no stage projection.
    fn step<F>(&self, state: &mut S, dt: f64, t: f64, rhs: F) -> Result<()>
    where
        F: Fn(&S, f64) -> Result<S>,
    {
        self.step_projected(state, dt, t, rhs, |_| {})
    }
}

// =============================================================================
// Classical RK4
// =============================================================================

/// Classical four-stage, fourth-order Runge-Kutta integrator.
///
/// ```text
/// k1 = L(u, t)
/// k2 = L(u + dt/2 k1, t + dt/2)
/// k3 = L(u + dt/2 k2, t + dt/2)
/// k4 = L(u + dt k3, t + dt)
/// u_new = u + dt/6 (k1 + 2 k2 + 2 k3 + k4)
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct RK4;

impl IntegratorInfo for RK4 {
    fn name(&self) -> &'static str {
        "rk4"
    }

    fn order(&self) -> usize {
        4
    }

    fn n_stages(&self) -> usize {
        4
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        vec![0.0, 0.5 * dt, 0.5 * dt, dt]
    }
}

impl<S: Integrable> TimeIntegrator<S> for RK4 {
    fn step_projected<F, P>(&self, state: &mut S, dt: f64, t: f64, rhs: F, project: P) -> Result<()>
    where
        F: Fn(&S, f64) -> Result<S>,
        P: Fn(&mut S),
    {
        let half = 0.5 * dt;

        let k1 = rhs(state, t)?;
        let mut trial = state.clone();
        trial.axpy(half, &k1);
        project(&mut trial);

        let k2 = rhs(&trial, t + half)?;
        let mut trial = state.clone();
        trial.axpy(half, &k2);
        project(&mut trial);

        let k3 = rhs(&trial, t + half)?;
        let mut trial = state.clone();
        trial.axpy(dt, &k3);
        project(&mut trial);

        let k4 = rhs(&trial, t + dt)?;

        let w = dt / 6.0;
        state.axpy(w, &k1);
        state.axpy(2.0 * w, &k2);
        state.axpy(2.0 * w, &k3);
        state.axpy(w, &k4);
        project(state);
        Ok(())
    }
}

// =============================================================================
// Forward Euler
// =============================================================================

/// First-order forward Euler, one tendency evaluation per step.
///
/// ```text
/// u_new = u + dt * L(u, t)
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct ForwardEuler;

impl IntegratorInfo for ForwardEuler {
    fn name(&self) -> &'static str {
        "forward-euler"
    }

    fn order(&self) -> usize {
        1
    }

    fn n_stages(&self) -> usize {
        1
    }

    fn stage_times(&self, _dt: f64) -> Vec<f64> {
        vec![0.0]
    }
}

impl<S: Integrable> TimeIntegrator<S> for ForwardEuler {
    fn step_projected<F, P>(&self, state: &mut S, dt: f64, t: f64, rhs: F, project: P) -> Result<()>
    where
        F: Fn(&S, f64) -> Result<S>,
        P: Fn(&mut S),
    {
        let tendency = rhs(state, t)?;
        state.axpy(dt, &tendency);
        project(state);
        Ok(())
    }
}

// =============================================================================
// Runtime Selection
// =============================================================================

/// Runtime choice between the two built-in schemes, dispatched by `match`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum StandardIntegrator {
    /// Classical RK4 (default)
    #[default]
    RK4,
    /// Forward Euler (1st order)
    ForwardEuler,
}

impl IntegratorInfo for StandardIntegrator {
    fn name(&self) -> &'static str {
        match self {
            StandardIntegrator::RK4 => RK4.name(),
            StandardIntegrator::ForwardEuler => ForwardEuler.name(),
        }
    }

    fn order(&self) -> usize {
        match self {
            StandardIntegrator::RK4 => 4,
            StandardIntegrator::ForwardEuler => 1,
        }
    }

    fn n_stages(&self) -> usize {
        match self {
            StandardIntegrator::RK4 => 4,
            StandardIntegrator::ForwardEuler => 1,
        }
    }

    fn stage_times(&self, dt: f64) -> Vec<f64> {
        match self {
            StandardIntegrator::RK4 => RK4.stage_times(dt),
            StandardIntegrator::ForwardEuler => ForwardEuler.stage_times(dt),
        }
    }
}

impl<S: Integrable> TimeIntegrator<S> for StandardIntegrator {
    fn step_projected<F, P>(&self, state: &mut S, dt: f64, t: f64, rhs: F, project: P) -> Result<()>
    where
        F: Fn(&S, f64) -> Result<S>,
        P: Fn(&mut S),
    {
        match self {
            StandardIntegrator::RK4 => RK4.step_projected(state, dt, t, rhs, project),
            StandardIntegrator::ForwardEuler => {
                ForwardEuler.step_projected(state, dt, t, rhs, project)
            }
        }
    }
}

// =============================================================================
// Field Implementations
// =============================================================================

impl Integrable for Field2D {
    fn scale(&mut self, c: f64) {
        Field2D::scale(self, c);
    }

    fn axpy(&mut self, c: f64, other: &Self) {
        Field2D::axpy(self, c, other);
    }
}

impl Integrable for Field3D {
    fn scale(&mut self, c: f64) {
        Field3D::scale(self, c);
    }

    fn axpy(&mut self, c: f64, other: &Self) {
        Field3D::axpy(self, c, other);
    }
}

impl Integrable for Vec<Complex64> {
    fn scale(&mut self, c: f64) {
        for v in self.iter_mut() {
            *v *= c;
        }
    }

    fn axpy(&mut self, c: f64, other: &Self) {
        debug_assert_eq!(self.len(), other.len());
        for (a, b) in self.iter_mut().zip(other) {
            *a += b * c;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VortexError;

    fn ones() -> Field2D {
        Field2D::from_fn(3, 2, |_, _| 1.0)
    }

    fn decay(state: &Field2D, _t: f64) -> Result<Field2D> {
        let mut rhs = state.clone();
        rhs.scale(-1.0);
        Ok(rhs)
    }

    fn integrate_decay<I: TimeIntegrator<Field2D>>(integrator: &I, dt: f64, t_end: f64) -> f64 {
        let mut u = ones();
        let n = (t_end / dt).round() as usize;
        for i in 0..n {
            integrator.step(&mut u, dt, i as f64 * dt, decay).unwrap();
        }
        u.get(0, 0)
    }

    #[test]
    fn test_rk4_order() {
        // du/dt = -u, u(0) = 1, exact u(t) = exp(-t)
        let exact = (-1.0f64).exp();
        let e1 = (integrate_decay(&RK4, 0.1, 1.0) - exact).abs();
        let e2 = (integrate_decay(&RK4, 0.05, 1.0) - exact).abs();
        let ratio = e1 / e2;
        assert!(
            (14.0..18.0).contains(&ratio),
            "RK4 error ratio {} (errors {}, {})",
            ratio,
            e1,
            e2
        );
    }

    #[test]
    fn test_forward_euler_first_order() {
        let exact = (-1.0f64).exp();
        let e1 = (integrate_decay(&ForwardEuler, 0.01, 1.0) - exact).abs();
        let e2 = (integrate_decay(&ForwardEuler, 0.005, 1.0) - exact).abs();
        let ratio = e1 / e2;
        assert!(
            (1.8..2.2).contains(&ratio),
            "Forward Euler error ratio {} (errors {}, {})",
            ratio,
            e1,
            e2
        );
    }

    #[test]
    fn test_time_dependent_rhs() {
        // du/dt = t, u(0) = 0 -> u(t) = t²/2; RK4 is exact for polynomials of degree ≤ 3
        let mut u = Field2D::zeros(1, 1);
        let zeros = u.clone();
        for i in 0..4 {
            let t = 0.25 * i as f64;
            RK4.step(&mut u, 0.25, t, |_, time| {
                let mut r = zeros.clone();
                r.fill(time);
                Ok(r)
            })
            .unwrap();
        }
        assert!((u.get(0, 0) - 0.5).abs() < 1e-14);
    }

    #[test]
    fn test_projection_applied_to_every_stage() {
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let mut u = ones();
        RK4.step_projected(&mut u, 0.1, 0.0, decay, |s| {
            calls.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
            s.fill(0.0);
        })
        .unwrap();
        // Three trial stages plus the final state
        assert_eq!(calls.into_inner(), 4);
        assert_eq!(u.max_abs(), 0.0);
    }

    #[test]
    fn test_failing_rhs_leaves_state_untouched() {
        let mut u = ones();
        let err = RK4
            .step(&mut u, 0.1, 0.0, |s, t| {
                if t > 0.0 {
                    Err(VortexError::solve_failure("test", 0, "boom"))
                } else {
                    decay(s, t)
                }
            })
            .unwrap_err();
        assert!(matches!(err, VortexError::SolveFailure { .. }));
        assert_eq!(u, ones());
    }

    #[test]
    fn test_runtime_selection_matches_direct_call() {
        let mut a = ones();
        let mut b = ones();
        StandardIntegrator::RK4.step(&mut a, 0.1, 0.0, decay).unwrap();
        RK4.step(&mut b, 0.1, 0.0, decay).unwrap();
        assert_eq!(a, b);

        let mut c = ones();
        StandardIntegrator::ForwardEuler.step(&mut c, 0.1, 0.0, decay).unwrap();
        assert!((c.get(0, 0) - 0.9).abs() < 1e-15);
    }

    #[test]
    fn test_integrator_info() {
        assert_eq!(RK4.name(), "rk4");
        assert_eq!(StandardIntegrator::ForwardEuler.name(), "forward-euler");
        assert_eq!(StandardIntegrator::RK4.order(), 4);
        let times = RK4.stage_times(0.2);
        assert_eq!(times.len(), RK4.n_stages());
        assert!((times[3] - 0.2).abs() < 1e-15);
    }

    #[test]
    fn test_complex_vector_integrable() {
        let mut a = vec![Complex64::new(1.0, 2.0); 3];
        let b = vec![Complex64::new(0.5, -1.0); 3];
        a.axpy(2.0, &b);
        assert_eq!(a[0], Complex64::new(2.0, 0.0));
        let z = a.zeros_like();
        assert!(z.iter().all(|v| v.norm() == 0.0));
    }
}
