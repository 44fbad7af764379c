//! Run configuration and validation.
//!
//! A [`SimulationConfig`] is immutable for the lifetime of a run. All checks
//! happen in [`SimulationConfig::validate`], before any field is allocated.
//!
//! # Example
//!
//! ```
//! use vortex_rs::config::{MethodKind, SimulationConfig};
//! use vortex_rs::initial::InitialCondition;
//! use std::f64::consts::PI;
//!
//! let config = SimulationConfig::default()
//!     .with_resolution(64, 64)
//!     .with_domain(2.0 * PI, 2.0 * PI)
//!     .with_viscosity(1e-3)
//!     .with_time_step(1e-3)
//!     .with_final_time(0.01)
//!     .with_initial_condition(InitialCondition::lamb_oseen(1.0, 1.0));
//!
//! assert!(config.validate(MethodKind::Spectral).is_ok());
//! assert_eq!(config.n_steps(), 10);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, VortexError};
use crate::initial::InitialCondition;
use crate::types::Resolution2D;

/// Relative slack used when deciding whether accumulated time has reached a target.
pub(crate) const TIME_EPS: f64 = 1e-9;

// =============================================================================
// Method selection
// =============================================================================

/// The closed set of discretizations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MethodKind {
    /// Second-order finite differences with Arakawa advection
    FiniteDifference,
    /// Fourier pseudo-spectral with 2/3-rule dealiasing
    Spectral,
    /// Layered finite-volume with first-order upwind advection
    LayeredFiniteVolume,
}

impl MethodKind {
    /// All implemented methods.
    pub const ALL: [MethodKind; 3] = [
        MethodKind::FiniteDifference,
        MethodKind::Spectral,
        MethodKind::LayeredFiniteVolume,
    ];

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        match self {
            MethodKind::FiniteDifference => "finite-difference",
            MethodKind::Spectral => "spectral",
            MethodKind::LayeredFiniteVolume => "layered-finite-volume",
        }
    }

    /// Whether the method needs an even number of cells in each direction.
    pub fn requires_even_resolution(&self) -> bool {
        matches!(self, MethodKind::Spectral)
    }
}

impl fmt::Display for MethodKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for MethodKind {
    type Err = VortexError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .to_ascii_lowercase()
            .chars()
            .map(|c| if c == '_' || c == ' ' { '-' } else { c })
            .collect();
        match key.as_str() {
            "finite-difference" | "fd" | "arakawa" => Ok(MethodKind::FiniteDifference),
            "spectral" | "pseudo-spectral" | "fourier" => Ok(MethodKind::Spectral),
            "layered-finite-volume" | "finite-volume" | "layered-fv" | "fv" => {
                Ok(MethodKind::LayeredFiniteVolume)
            }
            _ => Err(VortexError::UnsupportedMethod(s.to_string())),
        }
    }
}

// =============================================================================
// Layered method settings
// =============================================================================

/// Treatment of the top and bottom layers in vertical diffusion.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VerticalBoundary {
    /// Layer `Nz - 1` neighbours layer `0`
    Periodic,
    /// No-flux ghost layers mirroring the outermost layers
    #[default]
    Reflective,
}

impl FromStr for VerticalBoundary {
    type Err = VortexError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "periodic" => Ok(VerticalBoundary::Periodic),
            "reflective" | "no-flux" | "neumann" => Ok(VerticalBoundary::Reflective),
            other => Err(VortexError::config(
                "vertical_boundary",
                format!("unknown kind '{}', expected 'periodic' or 'reflective'", other),
            )),
        }
    }
}

/// Settings only read by the layered finite-volume method.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayeredConfig {
    /// Number of vertical layers (Nz).
    pub nz: usize,
    /// Depth of the layered domain (Lz).
    pub lz: f64,
    /// Vertical diffusivity as a multiple of ν.
    pub vertical_diffusivity_scale: f64,
    /// Vertical boundary treatment.
    pub vertical_boundary: VerticalBoundary,
}

impl Default for LayeredConfig {
    fn default() -> Self {
        Self {
            nz: 8,
            lz: 1.0,
            vertical_diffusivity_scale: 1.0,
            vertical_boundary: VerticalBoundary::Reflective,
        }
    }
}

impl LayeredConfig {
    /// Layer thickness.
    pub fn dz(&self) -> f64 {
        self.lz / self.nz as f64
    }

    fn validate(&self) -> Result<()> {
        if self.nz == 0 {
            return Err(VortexError::config("nz", "must be a positive integer, got 0"));
        }
        check_positive("lz", self.lz)?;
        check_positive("vertical_diffusivity_scale", self.vertical_diffusivity_scale)
    }
}

// =============================================================================
// Simulation configuration
// =============================================================================

/// Immutable per-run configuration.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimulationConfig {
    /// Grid resolution (Nx, Ny).
    pub resolution: Resolution2D,
    /// Domain length in x.
    pub lx: f64,
    /// Domain length in y.
    pub ly: f64,
    /// Kinematic viscosity ν.
    pub nu: f64,
    /// Time step.
    pub dt: f64,
    /// Final simulation time.
    pub t_final: f64,
    /// Initial vorticity (generated or prescribed).
    pub initial_condition: InitialCondition,
    /// Arakawa (true) or plain central-difference (false) advection.
    /// Only read by the finite-difference method.
    pub conservative_advection: bool,
    /// Request accelerator offload; falls back to host with a warning.
    pub use_accelerator: bool,
    /// Layered finite-volume settings.
    pub layered: LayeredConfig,
    /// Requested snapshot times. Empty means initial and final time only.
    pub sample_times: Vec<f64>,
    /// Log progress every N steps.
    pub progress_stride: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            resolution: Resolution2D::square(64),
            lx: 2.0 * std::f64::consts::PI,
            ly: 2.0 * std::f64::consts::PI,
            nu: 1e-3,
            dt: 1e-3,
            t_final: 0.01,
            initial_condition: InitialCondition::default(),
            conservative_advection: true,
            use_accelerator: false,
            layered: LayeredConfig::default(),
            sample_times: Vec::new(),
            progress_stride: None,
        }
    }
}

impl SimulationConfig {
    /// Set the grid resolution.
    ///
    /// Zero sizes are accepted here and rejected by [`validate`](Self::validate).
    pub fn with_resolution(mut self, nx: usize, ny: usize) -> Self {
        self.resolution = Resolution2D::unchecked(nx, ny);
        self
    }

    /// Set the domain lengths.
    pub fn with_domain(mut self, lx: f64, ly: f64) -> Self {
        self.lx = lx;
        self.ly = ly;
        self
    }

    /// Set the viscosity.
    pub fn with_viscosity(mut self, nu: f64) -> Self {
        self.nu = nu;
        self
    }

    /// Set the time step.
    pub fn with_time_step(mut self, dt: f64) -> Self {
        self.dt = dt;
        self
    }

    /// Set the final time.
    pub fn with_final_time(mut self, t_final: f64) -> Self {
        self.t_final = t_final;
        self
    }

    /// Set the initial condition.
    pub fn with_initial_condition(mut self, ic: InitialCondition) -> Self {
        self.initial_condition = ic;
        self
    }

    /// Select Arakawa (true) or central-difference (false) advection.
    pub fn with_conservative_advection(mut self, enabled: bool) -> Self {
        self.conservative_advection = enabled;
        self
    }

    /// Request accelerator offload.
    pub fn with_accelerator(mut self, enabled: bool) -> Self {
        self.use_accelerator = enabled;
        self
    }

    /// Set the layered method settings.
    pub fn with_layered(mut self, layered: LayeredConfig) -> Self {
        self.layered = layered;
        self
    }

    /// Set requested snapshot times.
    pub fn with_sample_times(mut self, times: impl Into<Vec<f64>>) -> Self {
        self.sample_times = times.into();
        self
    }

    /// Log progress every `stride` steps.
    pub fn with_progress_stride(mut self, stride: usize) -> Self {
        self.progress_stride = Some(stride);
        self
    }

    /// Number of `advance` calls needed to reach `t_final`.
    pub fn n_steps(&self) -> usize {
        let ratio = self.t_final / self.dt;
        (ratio - TIME_EPS * ratio.max(1.0)).ceil().max(0.0) as usize
    }

    /// Validate every field for the given method.
    ///
    /// Runs before any array allocation; the first failing field is reported.
    pub fn validate(&self, method: MethodKind) -> Result<()> {
        self.resolution
            .validate(method.requires_even_resolution())?;
        check_positive("lx", self.lx)?;
        check_positive("ly", self.ly)?;
        check_positive("nu", self.nu)?;
        check_positive("dt", self.dt)?;
        check_positive("t_final", self.t_final)?;

        if method == MethodKind::LayeredFiniteVolume {
            self.layered.validate()?;
        }

        for (idx, &t) in self.sample_times.iter().enumerate() {
            if !t.is_finite() || t < 0.0 || t > self.t_final * (1.0 + TIME_EPS) {
                return Err(VortexError::config(
                    "sample_times",
                    format!(
                        "entry {} = {} lies outside [0, t_final = {}]",
                        idx, t, self.t_final
                    ),
                ));
            }
        }

        if self.progress_stride == Some(0) {
            return Err(VortexError::config("progress_stride", "must be at least 1"));
        }

        self.initial_condition.validate(self.resolution)
    }
}

fn check_positive(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || value <= 0.0 {
        return Err(VortexError::config(
            name,
            format!("must be finite and strictly positive, got {}", value),
        ));
    }
    Ok(())
}
