//! Time integration methods.

mod integrator;

pub use integrator::{
    ForwardEuler, Integrable, IntegratorInfo, RK4, StandardIntegrator, TimeIntegrator,
};
