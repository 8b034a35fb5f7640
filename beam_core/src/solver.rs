//! # Curvature/Deflection Integrator
//!
//! Produces slope `θ(x)` and deflection `y(x)` satisfying the Euler–Bernoulli
//! relation `EI(x)·y''(x) = M(x)` with cantilever boundary conditions
//! `θ(0) = 0`, `y(0) = 0`.
//!
//! ## Method
//!
//! 1. Build a position grid: a uniform fine sampling of `[0, L]` unioned with
//!    every segment boundary and load breakpoint, sorted and de-duplicated,
//!    so jumps in `M(x)` or `EI(x)` land exactly on grid points.
//! 2. Evaluate `κ(x) = M(x) / EI(x)` at every grid point. `κ` may jump at
//!    point loads and material transitions; that is physically correct.
//! 3. Cumulative trapezoidal quadrature from the fixed end:
//!    `θ(x) = ∫₀ˣ κ`, then `y(x) = ∫₀ˣ θ`. Continuity of `θ` and `y` across
//!    breakpoints is automatic; no per-segment constant matching is needed
//!    beyond the single boundary condition at x = 0.
//!
//! ## Example
//!
//! ```rust
//! use beam_core::geometry::Geometry;
//! use beam_core::loads::{Load, LoadSet};
//! use beam_core::solver::DeflectionSolver;
//!
//! // 1 kN downward at the tip of a 2 m steel cantilever
//! let geometry = Geometry::uniform(2.0, 200e9, 1e-6).unwrap();
//! let loads = LoadSet::new(vec![Load::point(2.0, -1000.0)], 2.0).unwrap();
//!
//! let field = DeflectionSolver::new(geometry, loads).unwrap().solve().unwrap();
//! let tip = field.deflection.last().copied().unwrap();
//! assert!((tip - (-0.013333)).abs() < 1e-4); // F L^3 / (3 E I)
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{BeamError, BeamResult};
use crate::geometry::{Geometry, RigidityLookup};
use crate::loads::LoadSet;

/// Default number of uniform grid points per solve
pub const DEFAULT_GRID_POINTS: usize = 1000;

/// Floor on the grid resolution
const MIN_GRID_POINTS: usize = 32;

/// Discretized response of one beam to one load set.
///
/// All arrays are aligned with `positions` and share its length. Produced
/// fresh per solve and owned by the caller; holds no references back into
/// the geometry or loads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResponseField {
    /// Grid positions (m from the fixed end), `0 = x_0 < ... < x_n = L`
    pub positions: Vec<f64>,
    /// Internal shear V(x) (N)
    pub shear: Vec<f64>,
    /// Internal bending moment M(x) (N·m)
    pub moment: Vec<f64>,
    /// Curvature κ(x) = M(x)/EI(x) (1/m)
    pub curvature: Vec<f64>,
    /// Slope θ(x) (degrees)
    pub slope_deg: Vec<f64>,
    /// Deflection y(x) (m, same unit as the input geometry)
    pub deflection: Vec<f64>,

    /// Total beam length (m), for labeling
    pub total_length: f64,
    /// Largest-magnitude deflection (m, signed)
    pub max_deflection: f64,
    /// Position of the largest-magnitude deflection (m)
    pub max_deflection_position: f64,
    /// Largest-magnitude slope (degrees, signed)
    pub max_slope_deg: f64,
    /// Position of the largest-magnitude slope (m)
    pub max_slope_position: f64,
}

impl ResponseField {
    /// Number of grid points
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    /// Whether the field holds no samples
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }
}

/// Solver turning an immutable (geometry, loads) pair into a [`ResponseField`].
///
/// Pure and synchronous: one call, no I/O, no shared mutable state. Solving
/// many independent beams in parallel needs no synchronization.
#[derive(Debug, Clone)]
pub struct DeflectionSolver {
    geometry: Geometry,
    loads: LoadSet,
    grid_points: usize,
}

impl DeflectionSolver {
    /// Create a solver for one beam and its loads.
    ///
    /// # Errors
    ///
    /// Returns [`BeamError::InvalidLoad`] if the load set was validated
    /// against a different beam length.
    pub fn new(geometry: Geometry, loads: LoadSet) -> BeamResult<Self> {
        // Same length-scaled tolerance as the grid dedup, so two lengths
        // computed through different arithmetic still match
        let tol = geometry.total_length().abs() * 1e-9;
        if (loads.total_length() - geometry.total_length()).abs() > tol {
            return Err(BeamError::invalid_load(format!(
                "load set spans {} m but the beam is {} m long",
                loads.total_length(),
                geometry.total_length()
            )));
        }
        Ok(DeflectionSolver {
            geometry,
            loads,
            grid_points: DEFAULT_GRID_POINTS,
        })
    }

    /// Set the uniform grid resolution (clamped to a minimum of 32 points)
    pub fn with_grid_points(mut self, points: usize) -> Self {
        self.grid_points = points.max(MIN_GRID_POINTS);
        self
    }

    /// The beam geometry
    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    /// The applied loads
    pub fn loads(&self) -> &LoadSet {
        &self.loads
    }

    /// Grid positions for this solve: uniform sampling plus every segment
    /// boundary and load breakpoint, sorted and de-duplicated.
    pub fn grid(&self) -> Vec<f64> {
        let length = self.geometry.total_length();
        let n = self.grid_points;

        let mut positions: Vec<f64> = (0..n)
            .map(|i| length * i as f64 / (n - 1) as f64)
            .collect();
        positions.extend(self.geometry.breakpoints());
        positions.extend(self.loads.breakpoints());

        positions.sort_by(|a, b| a.total_cmp(b));
        // Collapse near-identical points so a breakpoint that coincides with
        // a uniform sample is inserted exactly once
        let tol = length * 1e-9;
        positions.dedup_by(|a, b| (*a - *b).abs() <= tol);

        // Endpoints exact regardless of float accumulation
        if let Some(first) = positions.first_mut() {
            *first = 0.0;
        }
        if let Some(last) = positions.last_mut() {
            *last = length;
        }
        positions
    }

    /// Run the solve.
    ///
    /// # Errors
    ///
    /// * [`BeamError::DegenerateBeam`] if the total length is non-positive
    ///   ([`Geometry`] construction already forbids this; the check guards
    ///   direct misuse)
    /// * [`BeamError::NumericOverflow`] if a rigidity underflows to zero or a
    ///   computed curvature is non-finite
    pub fn solve(&self) -> BeamResult<ResponseField> {
        let total_length = self.geometry.total_length();
        if total_length <= 0.0 {
            return Err(BeamError::degenerate_beam(total_length));
        }

        let positions = self.grid();
        let rigidity = RigidityLookup::new(&self.geometry);

        let mut shear = Vec::with_capacity(positions.len());
        let mut moment = Vec::with_capacity(positions.len());
        let mut curvature = Vec::with_capacity(positions.len());

        for &x in &positions {
            let m = self.loads.moment_at(x);
            let ei = rigidity.at(x)?;
            if ei <= 0.0 || !ei.is_finite() {
                return Err(BeamError::numeric_overflow(x));
            }
            let kappa = m / ei;
            if !kappa.is_finite() {
                return Err(BeamError::numeric_overflow(x));
            }
            shear.push(self.loads.shear_at(x));
            moment.push(m);
            curvature.push(kappa);
        }

        let slope_rad = cumulative_trapezoid(&positions, &curvature);
        let deflection = cumulative_trapezoid(&positions, &slope_rad);
        let slope_deg: Vec<f64> = slope_rad.iter().map(|t| t.to_degrees()).collect();

        let mut max_deflection = 0.0f64;
        let mut max_deflection_position = 0.0;
        let mut max_slope_deg = 0.0f64;
        let mut max_slope_position = 0.0;
        for (i, &x) in positions.iter().enumerate() {
            if deflection[i].abs() > max_deflection.abs() {
                max_deflection = deflection[i];
                max_deflection_position = x;
            }
            if slope_deg[i].abs() > max_slope_deg.abs() {
                max_slope_deg = slope_deg[i];
                max_slope_position = x;
            }
        }

        Ok(ResponseField {
            positions,
            shear,
            moment,
            curvature,
            slope_deg,
            deflection,
            total_length,
            max_deflection,
            max_deflection_position,
            max_slope_deg,
            max_slope_position,
        })
    }
}

/// Cumulative trapezoidal quadrature of `ys` over `xs`, anchored at zero.
///
/// The trapezoidal rule handles the non-uniform spacing produced by
/// breakpoint insertion; the antiderivative of a jump-discontinuous but
/// integrable integrand is continuous, which is exactly what `θ` and `y`
/// require across segment and load boundaries.
fn cumulative_trapezoid(xs: &[f64], ys: &[f64]) -> Vec<f64> {
    let mut out = Vec::with_capacity(xs.len());
    let mut acc = 0.0;
    if !xs.is_empty() {
        out.push(0.0);
    }
    for i in 1..xs.len() {
        acc += 0.5 * (ys[i] + ys[i - 1]) * (xs[i] - xs[i - 1]);
        out.push(acc);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Segment;
    use crate::loads::Load;

    const REL_TOL: f64 = 1e-3;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        if b.abs() < 1e-12 {
            a.abs() < tol
        } else {
            ((a - b) / b).abs() < tol
        }
    }

    fn solve_uniform(length: f64, e: f64, i: f64, loads: Vec<Load>) -> ResponseField {
        let geometry = Geometry::uniform(length, e, i).unwrap();
        let loads = LoadSet::new(loads, length).unwrap();
        DeflectionSolver::new(geometry, loads).unwrap().solve().unwrap()
    }

    #[test]
    fn test_zero_load_zero_response() {
        let field = solve_uniform(5.0, 200e9, 1e-6, vec![]);
        for i in 0..field.len() {
            assert_eq!(field.moment[i], 0.0);
            assert_eq!(field.slope_deg[i], 0.0);
            assert_eq!(field.deflection[i], 0.0);
        }
        assert_eq!(field.max_deflection, 0.0);
    }

    #[test]
    fn test_boundary_conditions_exact() {
        let field = solve_uniform(5.0, 200e9, 1e-6, vec![Load::point(5.0, -1000.0)]);
        assert_eq!(field.positions[0], 0.0);
        assert_eq!(field.slope_deg[0], 0.0);
        assert_eq!(field.deflection[0], 0.0);
    }

    #[test]
    fn test_tip_point_load_closed_form() {
        // M(x) = F (L - x), theta = F (L x - x^2/2)/EI, y = F (L x^2/2 - x^3/6)/EI
        let (l, e, i, f) = (4.0, 70e9, 2e-6, -1500.0);
        let ei = e * i;
        let field = solve_uniform(l, e, i, vec![Load::point(l, f)]);
        for (idx, &x) in field.positions.iter().enumerate() {
            let m_exact = f * (l - x);
            let theta_exact = (f * (l * x - x * x / 2.0) / ei).to_degrees();
            let y_exact = f * (l * x * x / 2.0 - x.powi(3) / 6.0) / ei;
            assert!(approx_eq(field.moment[idx], m_exact, 1e-9));
            if x > 0.0 {
                assert!(approx_eq(field.slope_deg[idx], theta_exact, REL_TOL));
                assert!(approx_eq(field.deflection[idx], y_exact, REL_TOL));
            }
        }
    }

    #[test]
    fn test_reference_scenario() {
        // L = 2 m, E = 200 GPa, I = 1e-6 m^4, F = -1000 N at the tip:
        // y(L) = F L^3 / (3 E I), theta(L) = F L^2 / (2 E I)
        let (l, e, i, f) = (2.0, 200e9, 1e-6, -1000.0);
        let ei = e * i;
        let field = solve_uniform(l, e, i, vec![Load::point(l, f)]);
        let tip_y = *field.deflection.last().unwrap();
        let tip_theta = *field.slope_deg.last().unwrap();
        assert!(approx_eq(tip_y, f * l.powi(3) / (3.0 * ei), REL_TOL));
        assert!(approx_eq(
            tip_theta,
            (f * l * l / (2.0 * ei)).to_degrees(),
            REL_TOL
        ));
        assert!(approx_eq(tip_y, -0.013333, 1e-2));
    }

    #[test]
    fn test_full_span_uniform_closed_form() {
        // w over [0, L]: y(L) = w L^4 / (8 EI), theta(L) = w L^3 / (6 EI)
        let (l, e, i, w) = (3.0, 200e9, 5e-7, -2000.0);
        let ei = e * i;
        let field = solve_uniform(l, e, i, vec![Load::distributed(0.0, l, w)]);
        let tip_y = *field.deflection.last().unwrap();
        let tip_theta = *field.slope_deg.last().unwrap();
        assert!(approx_eq(tip_y, w * l.powi(4) / (8.0 * ei), REL_TOL));
        assert!(approx_eq(
            tip_theta,
            (w * l.powi(3) / (6.0 * ei)).to_degrees(),
            REL_TOL
        ));
    }

    #[test]
    fn test_grid_contains_breakpoints() {
        let geometry = Geometry::new(vec![
            Segment::new(0.0, 1.3, 200e9, 1e-6),
            Segment::new(1.3, 4.0, 69e9, 1e-6),
        ])
        .unwrap();
        let loads = LoadSet::new(
            vec![Load::point(2.7, -500.0), Load::distributed(0.5, 3.1, -100.0)],
            4.0,
        )
        .unwrap();
        let solver = DeflectionSolver::new(geometry, loads).unwrap();
        let grid = solver.grid();

        assert_eq!(grid[0], 0.0);
        assert_eq!(*grid.last().unwrap(), 4.0);
        for target in [1.3, 2.7, 0.5, 3.1] {
            assert!(
                grid.iter().any(|&x| (x - target).abs() < 1e-9),
                "grid is missing breakpoint {}",
                target
            );
        }
        // sorted and strictly increasing
        for pair in grid.windows(2) {
            assert!(pair[0] < pair[1]);
        }
    }

    #[test]
    fn test_continuity_across_transition() {
        // EI drops by 4x at midspan with a point load past the transition;
        // slope and deflection must stay continuous even though curvature jumps
        let geometry = Geometry::new(vec![
            Segment::new(0.0, 2.0, 200e9, 1e-6),
            Segment::new(2.0, 4.0, 50e9, 1e-6),
        ])
        .unwrap();
        let loads = LoadSet::new(vec![Load::point(3.0, -800.0)], 4.0).unwrap();
        let field = DeflectionSolver::new(geometry, loads)
            .unwrap()
            .with_grid_points(2000)
            .solve()
            .unwrap();

        let step = 4.0 / 2000.0;
        let kappa_max = field
            .curvature
            .iter()
            .fold(0.0f64, |acc, k| acc.max(k.abs()));
        let slope_rad: Vec<f64> = field.slope_deg.iter().map(|d| d.to_radians()).collect();
        for i in 1..field.len() {
            // a jump would show as a step far exceeding the local integral bound
            let bound = kappa_max * step * 4.0 + 1e-12;
            assert!(
                (slope_rad[i] - slope_rad[i - 1]).abs() <= bound,
                "slope jump at x = {}",
                field.positions[i]
            );
        }
    }

    #[test]
    fn test_load_order_independent_of_transition() {
        // point load before the material transition, the case the original
        // closed-form formulation could not represent
        let geometry = Geometry::new(vec![
            Segment::new(0.0, 3.0, 200e9, 1e-6),
            Segment::new(3.0, 4.0, 69e9, 1e-6),
        ])
        .unwrap();
        let loads = LoadSet::new(vec![Load::point(1.0, -800.0)], 4.0).unwrap();
        let field = DeflectionSolver::new(geometry, loads).unwrap().solve().unwrap();

        // beyond the load the moment is zero and the beam is straight but tilted:
        // slope stays constant, deflection grows linearly
        let last = field.len() - 1;
        let mid = field
            .positions
            .iter()
            .position(|&x| x >= 1.5)
            .unwrap();
        assert!(approx_eq(field.slope_deg[mid], field.slope_deg[last], REL_TOL));
        assert!(field.deflection[last] < field.deflection[mid]);
    }

    #[test]
    fn test_superposition_of_solutions() {
        // 1001 points over 4 m puts every load breakpoint on a uniform
        // sample, so all three solves share one grid
        let solve = |loads: Vec<Load>| {
            let geometry = Geometry::uniform(4.0, 200e9, 1e-6).unwrap();
            let loads = LoadSet::new(loads, 4.0).unwrap();
            DeflectionSolver::new(geometry, loads)
                .unwrap()
                .with_grid_points(1001)
                .solve()
                .unwrap()
        };
        let a = Load::point(4.0, -1000.0);
        let b = Load::distributed(1.0, 3.0, -400.0);
        let combined = solve(vec![a, b]);
        let only_a = solve(vec![a]);
        let only_b = solve(vec![b]);

        assert_eq!(combined.len(), only_a.len());
        for i in 0..combined.len() {
            let sum_y = only_a.deflection[i] + only_b.deflection[i];
            let sum_theta = only_a.slope_deg[i] + only_b.slope_deg[i];
            assert!(approx_eq(combined.deflection[i], sum_y, REL_TOL));
            assert!(approx_eq(combined.slope_deg[i], sum_theta, REL_TOL));
        }
    }

    #[test]
    fn test_length_mismatch_rejected() {
        let geometry = Geometry::uniform(4.0, 200e9, 1e-6).unwrap();
        let loads = LoadSet::new(vec![Load::point(1.0, -100.0)], 5.0).unwrap();
        let err = DeflectionSolver::new(geometry, loads).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_LOAD");
    }

    #[test]
    fn test_near_equal_lengths_accepted() {
        // 0.1 + 0.2 differs from 0.3 by one ulp; the length check must not
        // reject a load set built through different arithmetic
        let geometry = Geometry::uniform(0.3, 200e9, 1e-6).unwrap();
        let loads = LoadSet::new(vec![Load::point(0.3, -100.0)], 0.1 + 0.2).unwrap();
        assert!(DeflectionSolver::new(geometry, loads).is_ok());
    }

    #[test]
    fn test_subnormal_rigidity_reports_overflow() {
        // E and I each pass the positivity checks but their product
        // underflows to zero
        let geometry = Geometry::uniform(1.0, 1e-200, 1e-200).unwrap();
        let loads = LoadSet::new(vec![Load::point(1.0, -10.0)], 1.0).unwrap();
        let err = DeflectionSolver::new(geometry, loads)
            .unwrap()
            .solve()
            .unwrap_err();
        assert_eq!(err.error_code(), "NUMERIC_OVERFLOW");
    }

    #[test]
    fn test_zero_length_geometry_rejected_as_degenerate() {
        // an empty segment list can only arrive through deserialization,
        // which skips the constructor checks
        let geometry: Geometry = serde_json::from_str(r#"{"segments":[]}"#).unwrap();
        let loads = LoadSet::empty(0.0);
        let err = DeflectionSolver::new(geometry, loads)
            .unwrap()
            .solve()
            .unwrap_err();
        assert_eq!(err.error_code(), "DEGENERATE_BEAM");
    }

    #[test]
    fn test_grid_points_clamped() {
        let geometry = Geometry::uniform(1.0, 200e9, 1e-6).unwrap();
        let loads = LoadSet::empty(1.0);
        let solver = DeflectionSolver::new(geometry, loads)
            .unwrap()
            .with_grid_points(2);
        assert!(solver.grid().len() >= 32);
    }

    #[test]
    fn test_response_field_serialization() {
        let field = solve_uniform(2.0, 200e9, 1e-6, vec![Load::point(2.0, -1000.0)]);
        let json = serde_json::to_string(&field).unwrap();
        let roundtrip: ResponseField = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.len(), field.len());
        assert_eq!(roundtrip.max_deflection, field.max_deflection);
    }
}
