//! Initial vorticity fields.
//!
//! Kernels obtain their starting vorticity from a [`VorticityGenerator`].
//! [`AnalyticGenerator`] evaluates the closed-form fields described by
//! [`InitialCondition`]; a pre-computed field can be passed directly with
//! [`InitialCondition::Prescribed`].
//!
//! Vortex fields are evaluated with minimum-image distances so each
//! vortex is consistent with the periodic domain.
//!
//! # Example
//!
//! ```
//! use vortex_rs::grid::PeriodicGrid2D;
//! use vortex_rs::initial::{AnalyticGenerator, InitialCondition, VorticityGenerator};
//! use vortex_rs::types::Resolution2D;
//! use std::f64::consts::PI;
//!
//! let grid = PeriodicGrid2D::new(Resolution2D::square(64), 2.0 * PI, 2.0 * PI).unwrap();
//! let ic = InitialCondition::lamb_oseen(1.0, 1.0);
//! let omega = AnalyticGenerator.generate(&grid, &ic).unwrap();
//! assert!((omega.max_abs() - 1.0 / PI).abs() < 1e-12);
//! ```

mod dispersion;

pub use dispersion::{Dispersion, DispersionPattern};

use std::f64::consts::PI;

use crate::error::{Result, VortexError};
use crate::grid::{Field2D, PeriodicGrid2D};
use crate::types::Resolution2D;

/// First positive zero of the Bessel function J1.
const J1_FIRST_ZERO: f64 = 3.831_705_970_207_512;

/// Shape of a single compact vortex.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VortexShape {
    /// Gaussian vortex: `ω = Γ/(π r0²) · exp(-r²/r0²)`
    LambOseen { circulation: f64, core_radius: f64 },
    /// Uniform patch `Γ/(π r0²)` inside `r ≤ r0`
    Rankine { circulation: f64, core_radius: f64 },
    /// Lamb-Chaplygin dipole translating along +x
    LambDipole { strength: f64, radius: f64 },
    /// Gaussian with elliptical level sets, rotated by `angle`
    Elliptical {
        amplitude: f64,
        semi_major: f64,
        semi_minor: f64,
        angle: f64,
    },
    /// Isotropic Gaussian `A · exp(-r²/(2w²))`
    Gaussian { amplitude: f64, width: f64 },
}

impl VortexShape {
    /// Vorticity at offset `(dx, dy)` from the vortex center.
    pub fn vorticity(&self, dx: f64, dy: f64) -> f64 {
        let r2 = dx * dx + dy * dy;
        match *self {
            VortexShape::LambOseen {
                circulation,
                core_radius,
            } => {
                let r02 = core_radius * core_radius;
                circulation / (PI * r02) * (-r2 / r02).exp()
            }
            VortexShape::Rankine {
                circulation,
                core_radius,
            } => {
                if r2 <= core_radius * core_radius {
                    circulation / (PI * core_radius * core_radius)
                } else {
                    0.0
                }
            }
            VortexShape::LambDipole { strength, radius } => {
                let r = r2.sqrt();
                if r >= radius || r == 0.0 {
                    return 0.0;
                }
                let k = J1_FIRST_ZERO / radius;
                let sin_theta = dy / r;
                2.0 * strength * k / bessel_j(0, J1_FIRST_ZERO) * bessel_j(1, k * r) * sin_theta
            }
            VortexShape::Elliptical {
                amplitude,
                semi_major,
                semi_minor,
                angle,
            } => {
                let (s, c) = angle.sin_cos();
                let xr = c * dx + s * dy;
                let yr = -s * dx + c * dy;
                amplitude
                    * (-(xr * xr / (semi_major * semi_major) + yr * yr / (semi_minor * semi_minor)))
                        .exp()
            }
            VortexShape::Gaussian { amplitude, width } => {
                amplitude * (-r2 / (2.0 * width * width)).exp()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        let lengths: &[(&str, f64)] = match self {
            VortexShape::LambOseen { core_radius, .. } | VortexShape::Rankine { core_radius, .. } => {
                &[("core_radius", *core_radius)]
            }
            VortexShape::LambDipole { radius, .. } => &[("radius", *radius)],
            VortexShape::Elliptical {
                semi_major,
                semi_minor,
                ..
            } => &[("semi_major", *semi_major), ("semi_minor", *semi_minor)],
            VortexShape::Gaussian { width, .. } => &[("width", *width)],
        };
        for &(name, value) in lengths {
            if !value.is_finite() || value <= 0.0 {
                return Err(VortexError::config(
                    format!("initial_condition.{}", name),
                    format!("must be finite and positive, got {}", value),
                ));
            }
        }
        Ok(())
    }
}

/// Initial vorticity specification.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InitialCondition {
    /// One or more copies of a vortex shape, summed and divided by the number placed
    Vortices {
        shape: VortexShape,
        dispersion: Dispersion,
    },
    /// `ω = 2k · sin(kx) · sin(ky)`, a steady solution of the inviscid equations
    TaylorGreen { wavenumber: f64 },
    /// Pre-computed field of the run's grid shape
    Prescribed(Field2D),
}

impl Default for InitialCondition {
    fn default() -> Self {
        Self::lamb_oseen(1.0, 1.0)
    }
}

impl InitialCondition {
    /// Single Lamb-Oseen vortex at the origin.
    pub fn lamb_oseen(circulation: f64, core_radius: f64) -> Self {
        Self::single(VortexShape::LambOseen {
            circulation,
            core_radius,
        })
    }

    /// Single vortex of the given shape at the origin.
    pub fn single(shape: VortexShape) -> Self {
        Self::Vortices {
            shape,
            dispersion: Dispersion::single(),
        }
    }

    /// Replace the dispersion of a vortex condition; other variants are unchanged.
    pub fn with_dispersion(self, dispersion: Dispersion) -> Self {
        match self {
            Self::Vortices { shape, .. } => Self::Vortices { shape, dispersion },
            other => other,
        }
    }

    /// Build a condition from a type name and an opaque coefficient vector.
    ///
    /// Missing trailing coefficients take defaults:
    ///
    /// | name | coefficients |
    /// |---|---|
    /// | `lamb-oseen` | Γ = 1, r0 = 1 |
    /// | `rankine` | Γ = 1, r0 = 0.5 |
    /// | `taylor-green` | k = 1 |
    /// | `lamb-dipole` | U = 1, a = 1 |
    /// | `elliptical` | A = 1, a = 1, b = 0.5, angle = 0 |
    /// | `gaussian` | A = 1, w = 1 |
    pub fn from_coefficients(name: &str, coefficients: &[f64]) -> Result<Self> {
        let c = |idx: usize, default: f64| coefficients.get(idx).copied().unwrap_or(default);
        let key = name.trim().to_ascii_lowercase().replace(['_', ' '], "-");
        let ic = match key.as_str() {
            "lamb-oseen" => Self::lamb_oseen(c(0, 1.0), c(1, 1.0)),
            "rankine" => Self::single(VortexShape::Rankine {
                circulation: c(0, 1.0),
                core_radius: c(1, 0.5),
            }),
            "taylor-green" => Self::TaylorGreen {
                wavenumber: c(0, 1.0),
            },
            "lamb-dipole" => Self::single(VortexShape::LambDipole {
                strength: c(0, 1.0),
                radius: c(1, 1.0),
            }),
            "elliptical" => Self::single(VortexShape::Elliptical {
                amplitude: c(0, 1.0),
                semi_major: c(1, 1.0),
                semi_minor: c(2, 0.5),
                angle: c(3, 0.0),
            }),
            "gaussian" => Self::single(VortexShape::Gaussian {
                amplitude: c(0, 1.0),
                width: c(1, 1.0),
            }),
            _ => {
                return Err(VortexError::config(
                    "initial_condition",
                    format!("unknown type '{}'", name),
                ));
            }
        };
        if let Some(bad) = coefficients.iter().find(|v| !v.is_finite()) {
            return Err(VortexError::config(
                "initial_condition",
                format!("coefficient {} is not finite", bad),
            ));
        }
        Ok(ic)
    }

    /// Check parameters against the run's resolution.
    pub fn validate(&self, resolution: Resolution2D) -> Result<()> {
        match self {
            InitialCondition::Vortices { shape, dispersion } => {
                if dispersion.count == 0 {
                    return Err(VortexError::config(
                        "initial_condition.count",
                        "must place at least one vortex",
                    ));
                }
                shape.validate()
            }
            InitialCondition::TaylorGreen { wavenumber } => {
                if !wavenumber.is_finite() {
                    return Err(VortexError::config(
                        "initial_condition.wavenumber",
                        "must be finite",
                    ));
                }
                Ok(())
            }
            InitialCondition::Prescribed(field) => {
                if field.nx != resolution.nx() || field.ny != resolution.ny() {
                    return Err(VortexError::config(
                        "initial_condition",
                        format!(
                            "prescribed field is {}×{}, grid is {}×{}",
                            field.ny,
                            field.nx,
                            resolution.ny(),
                            resolution.nx()
                        ),
                    ));
                }
                if !field.is_finite() {
                    return Err(VortexError::config(
                        "initial_condition",
                        "prescribed field contains non-finite values",
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Source of the starting vorticity field for a run.
pub trait VorticityGenerator: Send + Sync {
    /// Produce a field of the grid's shape for the given specification.
    fn generate(&self, grid: &PeriodicGrid2D, ic: &InitialCondition) -> Result<Field2D>;
}

/// Closed-form evaluation of [`InitialCondition`] on the grid.
#[derive(Clone, Copy, Debug, Default)]
pub struct AnalyticGenerator;

impl VorticityGenerator for AnalyticGenerator {
    fn generate(&self, grid: &PeriodicGrid2D, ic: &InitialCondition) -> Result<Field2D> {
        ic.validate(grid.resolution())?;
        let field = match ic {
            InitialCondition::Prescribed(field) => field.clone(),
            InitialCondition::TaylorGreen { wavenumber } => {
                let k = *wavenumber;
                grid.sample(|x, y| 2.0 * k * (k * x).sin() * (k * y).sin())
            }
            InitialCondition::Vortices { shape, dispersion } => {
                let centers = dispersion.positions(grid.lx, grid.ly);
                let mut omega = grid.zeros();
                for &(x0, y0) in &centers {
                    let single = grid.sample(|x, y| {
                        shape.vorticity(min_image(x - x0, grid.lx), min_image(y - y0, grid.ly))
                    });
                    omega.axpy(1.0, &single);
                }
                omega.scale(1.0 / centers.len().max(1) as f64);
                omega
            }
        };
        Ok(field)
    }
}

/// Wrap an offset into `[-L/2, L/2)`.
#[inline]
fn min_image(d: f64, length: f64) -> f64 {
    d - length * (d / length + 0.5).floor()
}

/// Bessel function of the first kind, integer order, by power series.
///
/// Accurate to round-off for the arguments used here (`|x| ≲ 10`).
fn bessel_j(order: u32, x: f64) -> f64 {
    let half = 0.5 * x;
    let mut term = half.powi(order as i32) / (1..=order).map(f64::from).product::<f64>();
    let mut sum = term;
    let q = -half * half;
    for m in 1..60u32 {
        term *= q / (f64::from(m) * f64::from(m + order));
        sum += term;
        if term.abs() < 1e-17 * sum.abs() {
            break;
        }
    }
    sum
}
