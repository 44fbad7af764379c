//! Fourier pseudo-spectral kernel.
//!
//! The prognostic variable is the vorticity spectrum ω̂. Each right-hand
//! side evaluation:
//!
//! 1. `ψ̂ = ω̂ / |k|²` (zero mode 0), `û = -i ky ψ̂`, `v̂ = i kx ψ̂`
//! 2. transforms u, v, ∂ω/∂x, ∂ω/∂y to physical space
//! 3. forms `N = u ∂ω/∂x + v ∂ω/∂y` and transforms back
//! 4. returns `-mask · N̂ - ν |k|² ω̂`
//!
//! The 2/3 mask is re-applied to every RK4 stage state and to the final
//! spectrum, so coefficients above the cutoff stay exactly zero.

use num_complex::Complex64;

use super::{FlowState, SolveCounter, VorticityKernel, ensure_finite, step_time};
use crate::backend::ComputeBackend;
use crate::config::{MethodKind, SimulationConfig};
use crate::diagnostics::DiagnosticsRecord;
use crate::error::Result;
use crate::grid::{Field2D, PeriodicGrid2D};
use crate::initial::VorticityGenerator;
use crate::operators::{Fft2D, SpectralOperators};
use crate::time::{RK4, StandardIntegrator, TimeIntegrator};

/// State of the spectral kernel.
#[derive(Clone, Debug)]
pub struct SpectralState {
    pub(crate) omega_hat: Vec<Complex64>,
    pub(crate) omega: Field2D,
    pub(crate) psi: Field2D,
    pub(crate) time: f64,
    pub(crate) step: usize,
}

impl SpectralState {
    /// Vorticity spectrum in FFT order (row-major, `ky` rows × `kx` columns).
    pub fn omega_hat(&self) -> &[Complex64] {
        &self.omega_hat
    }
}

impl FlowState for SpectralState {
    fn omega(&self) -> &Field2D {
        &self.omega
    }

    fn psi(&self) -> &Field2D {
        &self.psi
    }

    fn time(&self) -> f64 {
        self.time
    }

    fn step(&self) -> usize {
        self.step
    }
}

/// Dealiased Fourier pseudo-spectral kernel with RK4 time stepping.
pub struct SpectralKernel {
    grid: PeriodicGrid2D,
    ops: SpectralOperators,
    fft: Fft2D,
    nu: f64,
    dt: f64,
    backend: ComputeBackend,
    solves: SolveCounter,
}

impl SpectralKernel {
    /// Wavenumbers and dealiasing mask.
    pub fn operators(&self) -> &SpectralOperators {
        &self.ops
    }

    /// `ψ̂` for a vorticity spectrum, checked for finiteness.
    fn solve_psi_hat(&self, omega_hat: &[Complex64], step: usize) -> Result<Vec<Complex64>> {
        let psi_hat = self.ops.invert_laplacian(omega_hat);
        self.solves.record(1);
        if psi_hat.iter().any(|c| !(c.re.is_finite() && c.im.is_finite())) {
            let psi = self.fft.inverse_real(&psi_hat);
            ensure_finite(Self::KIND, step, &psi)?;
        }
        Ok(psi_hat)
    }

    /// Physical velocity `(u, v) = (-∂ψ/∂y, ∂ψ/∂x)` from `ψ̂`.
    fn velocity(&self, psi_hat: &[Complex64]) -> (Vec<f64>, Vec<f64>) {
        let mut u_hat = self.ops.ddy(psi_hat);
        for c in &mut u_hat {
            *c = -*c;
        }
        let v_hat = self.ops.ddx(psi_hat);
        (self.fft.inverse_real(&u_hat), self.fft.inverse_real(&v_hat))
    }

    fn rhs(&self, omega_hat: &[Complex64], step: usize) -> Result<Vec<Complex64>> {
        let psi_hat = self.solve_psi_hat(omega_hat, step)?;
        let (u, v) = self.velocity(&psi_hat);
        let wx = self.fft.inverse_real(&self.ops.ddx(omega_hat));
        let wy = self.fft.inverse_real(&self.ops.ddy(omega_hat));

        let advection: Vec<f64> = u
            .iter()
            .zip(&wx)
            .zip(v.iter().zip(&wy))
            .map(|((u, wx), (v, wy))| u * wx + v * wy)
            .collect();
        let mut out = self.fft.forward_real(&advection);
        self.ops.dealias(&mut out);

        for (idx, (n, w)) in out.iter_mut().zip(omega_hat).enumerate() {
            *n = -*n - *w * (self.nu * self.ops.diffusion_rate(idx));
        }
        Ok(out)
    }

    fn state_from_spectrum(
        &self,
        omega_hat: Vec<Complex64>,
        time: f64,
        step: usize,
    ) -> Result<SpectralState> {
        let (nx, ny) = (self.grid.nx(), self.grid.ny());
        let psi_hat = self.solve_psi_hat(&omega_hat, step)?;
        let psi = Field2D::from_data(self.fft.inverse_real(&psi_hat), nx, ny)?;
        let omega = Field2D::from_data(self.fft.inverse_real(&omega_hat), nx, ny)?;
        Ok(SpectralState {
            omega_hat,
            omega,
            psi,
            time,
            step,
        })
    }
}

impl VorticityKernel for SpectralKernel {
    type State = SpectralState;

    const KIND: MethodKind = MethodKind::Spectral;

    fn initialize_with(
        config: &SimulationConfig,
        generator: &dyn VorticityGenerator,
    ) -> Result<(Self, Self::State)> {
        config.validate(Self::KIND)?;
        let grid = PeriodicGrid2D::new(config.resolution, config.lx, config.ly)?;
        let backend = ComputeBackend::resolve(config.use_accelerator);
        let ops = SpectralOperators::new(&grid)?;
        let fft = Fft2D::new(grid.nx(), grid.ny());
        log::debug!(
            "spectral kernel: grid {}, {} backend",
            grid.resolution(),
            backend
        );

        let kernel = Self {
            grid,
            ops,
            fft,
            nu: config.nu,
            dt: config.dt,
            backend,
            solves: SolveCounter::default(),
        };

        let omega0 = generator.generate(&kernel.grid, &config.initial_condition)?;
        kernel.grid.check_shape(&omega0)?;
        let mut omega_hat = kernel.fft.forward_real(&omega0.data);
        kernel.ops.dealias(&mut omega_hat);
        let state = kernel.state_from_spectrum(omega_hat, 0.0, 0)?;
        Ok((kernel, state))
    }

    fn advance(&self, state: &Self::State) -> Result<Self::State> {
        let step = state.step + 1;
        let mut omega_hat = state.omega_hat.clone();
        RK4.step_projected(
            &mut omega_hat,
            self.dt,
            state.time,
            |w, _t| self.rhs(w, step),
            |w| self.ops.dealias(w),
        )?;
        log::trace!("spectral step {} done", step);
        self.state_from_spectrum(omega_hat, step_time(step, self.dt), step)
    }

    fn measure(&self, state: &Self::State) -> DiagnosticsRecord {
        let psi_hat = self.ops.invert_laplacian(&state.omega_hat);
        let (u, v) = self.velocity(&psi_hat);
        let (nx, ny) = (self.grid.nx(), self.grid.ny());
        let u = Field2D { data: u, nx, ny };
        let v = Field2D { data: v, nx, ny };
        DiagnosticsRecord::from_velocity(&self.grid, &state.omega, &u, &v, state.time, state.step)
    }

    fn grid(&self) -> &PeriodicGrid2D {
        &self.grid
    }

    fn solve_count(&self) -> usize {
        self.solves.get()
    }

    fn backend(&self) -> ComputeBackend {
        self.backend
    }

    fn integrator(&self) -> StandardIntegrator {
        StandardIntegrator::RK4
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::initial::InitialCondition;
    use std::f64::consts::PI;

    fn config() -> SimulationConfig {
        SimulationConfig::default()
            .with_resolution(16, 16)
            .with_time_step(0.01)
            .with_final_time(0.05)
    }

    #[test]
    fn test_initial_state_dealiased_and_consistent() {
        let (kernel, state) = SpectralKernel::initialize(&config()).unwrap();
        assert!(kernel.operators().is_dealiased(state.omega_hat()));
        assert!(state.psi.mean().abs() < 1e-14);
        assert_eq!(kernel.solve_count(), 1);
    }

    #[test]
    fn test_advance_keeps_cutoff_exact() {
        let (kernel, mut state) = SpectralKernel::initialize(&config()).unwrap();
        for _ in 0..3 {
            state = kernel.advance(&state).unwrap();
            assert!(kernel.operators().is_dealiased(state.omega_hat()));
        }
        assert_eq!(state.step, 3);
        assert_eq!(kernel.solve_count(), 1 + 3 * 5);
    }

    #[test]
    fn test_taylor_green_decay_rate() {
        // Nonlinear term vanishes; ω(t) = ω(0) · exp(-2νk²t)
        let nu = 0.05;
        let config = SimulationConfig::default()
            .with_resolution(16, 16)
            .with_viscosity(nu)
            .with_time_step(0.01)
            .with_initial_condition(InitialCondition::TaylorGreen { wavenumber: 2.0 });
        let (kernel, s0) = SpectralKernel::initialize(&config).unwrap();
        let mut state = s0.clone();
        for _ in 0..10 {
            state = kernel.advance(&state).unwrap();
        }
        let decay = (-2.0 * nu * 4.0 * state.time).exp();
        let mut expected = s0.omega.clone();
        expected.scale(decay);
        assert!(
            state.omega.max_abs_diff(&expected) < 1e-9,
            "error {}",
            state.omega.max_abs_diff(&expected)
        );
    }

    #[test]
    fn test_measure_energy_of_mode() {
        // ψ = sin x sin y: ½∫|u|² = ½ · 2π² = π²
        let g = PeriodicGrid2D::new(crate::types::Resolution2D::square(16), 2.0 * PI, 2.0 * PI)
            .unwrap();
        let omega = g.sample(|x, y| 2.0 * x.sin() * y.sin());
        let config = config().with_initial_condition(InitialCondition::Prescribed(omega));
        let (kernel, state) = SpectralKernel::initialize(&config).unwrap();
        let record = kernel.measure(&state);
        assert!((record.kinetic_energy - PI * PI).abs() < 1e-10);
        assert!((record.enstrophy - 2.0 * PI * PI).abs() < 1e-10);
        assert!((record.peak_speed - 1.0).abs() < 0.05);
    }
}
