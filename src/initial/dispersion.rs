//! Placement of multiple vortex centers in the domain.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Attempts per vortex before the random pattern gives up on a placement.
const MAX_PLACEMENT_ATTEMPTS: usize = 10_000;

/// Arrangement of vortex centers.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DispersionPattern {
    /// One vortex at the origin
    Single,
    /// Rows and columns filling the domain
    Grid,
    /// Evenly spaced on a circle of radius `min(Lx, Ly) / 4`
    Circular,
    /// Uniformly random in the central 90% of the domain, with a minimum separation
    Random {
        /// RNG seed, so runs are reproducible
        seed: u64,
        /// Minimum distance between centers; defaults to `max(Lx, Ly) / 10`
        min_separation: Option<f64>,
    },
}

/// How many vortices to place and where.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Dispersion {
    /// Number of vortices (at least 1)
    pub count: usize,
    /// Placement pattern
    pub pattern: DispersionPattern,
}

impl Default for Dispersion {
    fn default() -> Self {
        Self::single()
    }
}

impl Dispersion {
    /// A single vortex at the origin.
    pub fn single() -> Self {
        Self {
            count: 1,
            pattern: DispersionPattern::Single,
        }
    }

    /// `count` vortices in the given pattern.
    pub fn new(count: usize, pattern: DispersionPattern) -> Self {
        Self { count, pattern }
    }

    /// Centers `(x, y)` for a domain of size `lx × ly` centered on the origin.
    ///
    /// The random pattern may return fewer than `count` centers if the
    /// separation constraint cannot be met.
    pub fn positions(&self, lx: f64, ly: f64) -> Vec<(f64, f64)> {
        let n = self.count.max(1);
        if n == 1 {
            return vec![(0.0, 0.0)];
        }

        match &self.pattern {
            DispersionPattern::Single => vec![(0.0, 0.0)],
            DispersionPattern::Circular => {
                let radius = lx.min(ly) / 4.0;
                (0..n)
                    .map(|k| {
                        let theta = 2.0 * std::f64::consts::PI * k as f64 / n as f64;
                        (radius * theta.cos(), radius * theta.sin())
                    })
                    .collect()
            }
            DispersionPattern::Grid => grid_positions(n, lx, ly),
            DispersionPattern::Random {
                seed,
                min_separation,
            } => {
                let min_sep = min_separation.unwrap_or(lx.max(ly) / 10.0);
                random_positions(n, lx, ly, min_sep, *seed)
            }
        }
    }
}

/// Row-major grid of centers with spacing `L / (cols + 1)`.
///
/// Column `c` sits at `(c + 1)·spacing − L/2`, so the outer columns are one
/// spacing in from the periodic edges and a full grid is symmetric about the
/// origin. Starting at `−L/2` instead would put the first column on the edge
/// and leave two spacings of gap on the opposite side.
fn grid_positions(n: usize, lx: f64, ly: f64) -> Vec<(f64, f64)> {
    let n_cols = (n as f64).sqrt().ceil() as usize;
    let n_rows = n.div_ceil(n_cols);
    let spacing_x = lx / (n_cols + 1) as f64;
    let spacing_y = ly / (n_rows + 1) as f64;

    let mut positions = Vec::with_capacity(n);
    'rows: for row in 0..n_rows {
        for col in 0..n_cols {
            if positions.len() == n {
                break 'rows;
            }
            positions.push((
                (col + 1) as f64 * spacing_x - 0.5 * lx,
                (row + 1) as f64 * spacing_y - 0.5 * ly,
            ));
        }
    }
    positions
}

fn random_positions(n: usize, lx: f64, ly: f64, min_sep: f64, seed: u64) -> Vec<(f64, f64)> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut positions: Vec<(f64, f64)> = Vec::with_capacity(n);

    for _ in 0..n {
        let mut placed = false;
        for _ in 0..MAX_PLACEMENT_ATTEMPTS {
            let x = (rng.random::<f64>() - 0.5) * lx * 0.9;
            let y = (rng.random::<f64>() - 0.5) * ly * 0.9;
            let clear = positions
                .iter()
                .all(|&(px, py)| ((px - x).powi(2) + (py - y).powi(2)).sqrt() >= min_sep);
            if clear {
                positions.push((x, y));
                placed = true;
                break;
            }
        }
        if !placed {
            log::warn!(
                "could only place {} of {} vortices with separation {:.3}",
                positions.len(),
                n,
                min_sep
            );
            break;
        }
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_at_origin() {
        let pos = Dispersion::single().positions(10.0, 10.0);
        assert_eq!(pos, vec![(0.0, 0.0)]);
        // Any pattern with one vortex collapses to the origin
        let pos = Dispersion::new(1, DispersionPattern::Circular).positions(10.0, 10.0);
        assert_eq!(pos, vec![(0.0, 0.0)]);
    }

    #[test]
    fn test_circular_radius() {
        let pos = Dispersion::new(6, DispersionPattern::Circular).positions(8.0, 12.0);
        assert_eq!(pos.len(), 6);
        for (x, y) in pos {
            assert!(((x * x + y * y).sqrt() - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn test_grid_inside_domain() {
        let pos = Dispersion::new(5, DispersionPattern::Grid).positions(10.0, 10.0);
        assert_eq!(pos.len(), 5);
        for (x, y) in pos {
            assert!(x > -5.0 && x < 5.0);
            assert!(y > -5.0 && y < 5.0);
        }
    }

    #[test]
    fn test_full_grid_is_symmetric_about_origin() {
        // 3×3 on a 12×8 box: spacings 3 and 2, columns at -3, 0, 3
        let pos = Dispersion::new(9, DispersionPattern::Grid).positions(12.0, 8.0);
        assert_eq!(pos.len(), 9);
        assert!((pos[0].0 + 3.0).abs() < 1e-12 && (pos[0].1 + 2.0).abs() < 1e-12);
        assert!((pos[4].0).abs() < 1e-12 && (pos[4].1).abs() < 1e-12);
        assert!((pos[8].0 - 3.0).abs() < 1e-12 && (pos[8].1 - 2.0).abs() < 1e-12);
        let (sx, sy) = pos.iter().fold((0.0, 0.0), |acc, p| (acc.0 + p.0, acc.1 + p.1));
        assert!(sx.abs() < 1e-12 && sy.abs() < 1e-12);
    }

    #[test]
    fn test_random_is_seeded_and_separated() {
        let pattern = DispersionPattern::Random {
            seed: 7,
            min_separation: Some(1.0),
        };
        let a = Dispersion::new(4, pattern.clone()).positions(10.0, 10.0);
        let b = Dispersion::new(4, pattern).positions(10.0, 10.0);
        assert_eq!(a, b);
        assert_eq!(a.len(), 4);
        for (i, p) in a.iter().enumerate() {
            for q in &a[i + 1..] {
                let d = ((p.0 - q.0).powi(2) + (p.1 - q.1).powi(2)).sqrt();
                assert!(d >= 1.0);
            }
        }
    }

    #[test]
    fn test_random_gives_up_when_crowded() {
        let pattern = DispersionPattern::Random {
            seed: 1,
            min_separation: Some(100.0),
        };
        let pos = Dispersion::new(3, pattern).positions(1.0, 1.0);
        assert_eq!(pos.len(), 1);
    }
}
