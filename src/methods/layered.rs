//! Layered finite-volume kernel.
//!
//! The 2D equations are lifted onto `Nz` layers. The initial vorticity is
//! the 2D field scaled per layer by [`gaussian_profile`]. Each layer has its
//! own streamfunction from a spectral Poisson solve. Per layer:
//!
//! ```text
//! dω/dt = -(u ∂ω/∂x + v ∂ω/∂y)_upwind + ν ∇²ω + ν_z ∂²ω/∂z²
//! ```
//!
//! with first-order upwind differences chosen per cell from the sign of
//! the local velocity, and `ν_z = ν · vertical_diffusivity_scale`.
//!
//! Time stepping is single-stage forward Euler, not the RK4 of the other
//! two kernels, so this kernel is first-order accurate in time. Whether that
//! asymmetry should stay or become an RK4 upgrade is an open question;
//! [`StandardIntegrator`](crate::time::StandardIntegrator) is the switch
//! point if it changes.

use super::{
    FlowState, SolveCounter, VorticityKernel, ensure_finite, gaussian_profile, step_time,
    vertical_diffusion,
};
use crate::backend::ComputeBackend;
use crate::config::{MethodKind, SimulationConfig, VerticalBoundary};
use crate::diagnostics::{DiagnosticsRecord, enstrophy, grid_kinetic_energy, peak_speed};
use crate::error::Result;
use crate::grid::{Field2D, Field3D, PeriodicGrid2D};
use crate::initial::VorticityGenerator;
use crate::operators::laplacian_5pt;
use crate::poisson::SpectralPoisson;
use crate::time::{ForwardEuler, StandardIntegrator, TimeIntegrator};

/// State of the layered kernel: full 3D fields plus their depth means.
#[derive(Clone, Debug)]
pub struct LayeredState {
    pub(crate) omega3: Field3D,
    pub(crate) psi3: Field3D,
    pub(crate) omega: Field2D,
    pub(crate) psi: Field2D,
    pub(crate) time: f64,
    pub(crate) step: usize,
}

impl LayeredState {
    /// Layered vorticity.
    pub fn omega_layers(&self) -> &Field3D {
        &self.omega3
    }

    /// Layered streamfunction.
    pub fn psi_layers(&self) -> &Field3D {
        &self.psi3
    }
}

impl FlowState for LayeredState {
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

/// Layered upwind finite-volume kernel with forward-Euler time stepping.
pub struct LayeredKernel {
    grid: PeriodicGrid2D,
    poisson: SpectralPoisson,
    nz: usize,
    dz: f64,
    nu: f64,
    nu_vertical: f64,
    vertical_boundary: VerticalBoundary,
    dt: f64,
    backend: ComputeBackend,
    solves: SolveCounter,
}

impl LayeredKernel {
    /// Vertical boundary treatment.
    pub fn vertical_boundary(&self) -> VerticalBoundary {
        self.vertical_boundary
    }

    /// Streamfunction of every layer.
    fn solve_layers(&self, omega: &Field3D, step: usize) -> Result<Field3D> {
        let mut psi = Field3D::zeros(omega.nx, omega.ny, omega.nz);
        for k in 0..omega.nz {
            self.poisson.solve_slice(omega.layer(k), psi.layer_mut(k));
        }
        self.solves.record(omega.nz);
        ensure_finite(Self::KIND, step, &psi.data)?;
        Ok(psi)
    }

    /// Horizontal tendency of one layer: upwind advection plus diffusion.
    fn layer_tendency(&self, omega: &Field2D, psi: &Field2D) -> Field2D {
        let grid = &self.grid;
        let (u, v) = grid.centered_velocity(psi);
        let diffusion = laplacian_5pt(grid, omega);
        let (inv_dx, inv_dy) = (1.0 / grid.dx, 1.0 / grid.dy);
        let nu = self.nu;

        Field2D::from_rows(grid.nx(), grid.ny(), |j, row| {
            let (jn, js) = (grid.north(j), grid.south(j));
            for (i, out) in row.iter_mut().enumerate() {
                let c = omega.get(i, j);
                let (ui, vi) = (u.get(i, j), v.get(i, j));
                let dwdx = if ui >= 0.0 {
                    (c - omega.get(grid.west(i), j)) * inv_dx
                } else {
                    (omega.get(grid.east(i), j) - c) * inv_dx
                };
                let dwdy = if vi >= 0.0 {
                    (c - omega.get(i, js)) * inv_dy
                } else {
                    (omega.get(i, jn) - c) * inv_dy
                };
                *out = -(ui * dwdx + vi * dwdy) + nu * diffusion.get(i, j);
            }
        })
    }

    fn rhs(&self, omega: &Field3D, step: usize) -> Result<Field3D> {
        let psi = self.solve_layers(omega, step)?;
        let mut out = vertical_diffusion(omega, self.nu_vertical, self.dz, self.vertical_boundary);
        for k in 0..self.nz {
            let tendency = self.layer_tendency(&omega.layer_field(k), &psi.layer_field(k));
            for (o, t) in out.layer_mut(k).iter_mut().zip(&tendency.data) {
                *o += t;
            }
        }
        Ok(out)
    }

    fn make_state(&self, omega3: Field3D, psi3: Field3D, time: f64, step: usize) -> LayeredState {
        LayeredState {
            omega: omega3.depth_mean(),
            psi: psi3.depth_mean(),
            omega3,
            psi3,
            time,
            step,
        }
    }
}

impl VorticityKernel for LayeredKernel {
    type State = LayeredState;

    const KIND: MethodKind = MethodKind::LayeredFiniteVolume;

    fn initialize_with(
        config: &SimulationConfig,
        generator: &dyn VorticityGenerator,
    ) -> Result<(Self, Self::State)> {
        config.validate(Self::KIND)?;
        let grid = PeriodicGrid2D::new(config.resolution, config.lx, config.ly)?;
        let backend = ComputeBackend::resolve(config.use_accelerator);
        let layered = &config.layered;
        log::debug!(
            "layered kernel: grid {}×{}, {:?} vertical boundary, {} backend",
            grid.resolution(),
            layered.nz,
            layered.vertical_boundary,
            backend
        );

        let kernel = Self {
            poisson: SpectralPoisson::new(&grid),
            grid,
            nz: layered.nz,
            dz: layered.dz(),
            nu: config.nu,
            nu_vertical: config.nu * layered.vertical_diffusivity_scale,
            vertical_boundary: layered.vertical_boundary,
            dt: config.dt,
            backend,
            solves: SolveCounter::default(),
        };

        let omega0 = generator.generate(&kernel.grid, &config.initial_condition)?;
        kernel.grid.check_shape(&omega0)?;
        let omega3 = Field3D::from_profile(&omega0, &gaussian_profile(layered.nz, layered.lz));
        let psi3 = kernel.solve_layers(&omega3, 0)?;
        let state = kernel.make_state(omega3, psi3, 0.0, 0);
        Ok((kernel, state))
    }

    fn advance(&self, state: &Self::State) -> Result<Self::State> {
        let step = state.step + 1;
        let mut omega3 = state.omega3.clone();
        ForwardEuler.step(&mut omega3, self.dt, state.time, |w, _t| self.rhs(w, step))?;
        let psi3 = self.solve_layers(&omega3, step)?;
        log::trace!("layered step {} done", step);
        Ok(self.make_state(omega3, psi3, step_time(step, self.dt), step))
    }

    fn measure(&self, state: &Self::State) -> DiagnosticsRecord {
        let (u, v) = self.grid.centered_velocity(&state.psi);
        DiagnosticsRecord {
            time: state.time,
            step: state.step,
            max_vorticity: state.omega.max_abs(),
            enstrophy: enstrophy(&self.grid, &state.omega),
            kinetic_energy: grid_kinetic_energy(&self.grid, &state.psi),
            peak_speed: peak_speed(&u, &v),
        }
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
        StandardIntegrator::ForwardEuler
    }

    fn n_layers(&self) -> usize {
        self.nz
    }
}
