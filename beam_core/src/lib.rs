//! # beam_core - Cantilever Beam Deflection Engine
//!
//! `beam_core` computes the static deflection curve of a cantilever beam
//! built from multiple longitudinal material/cross-section segments, under
//! any combination of point and distributed loads. It produces the bending
//! moment field, the curvature field, and its double integral (slope and
//! deflection) subject to fixed-end boundary conditions, with correct
//! continuity across material transitions and load discontinuities.
//!
//! ## Design Philosophy
//!
//! - **Pure solves**: one call transforms immutable (geometry, loads) into a
//!   caller-owned [`solver::ResponseField`]; no I/O, no shared state
//! - **Fail fast**: all validation happens at construction or at the start
//!   of a solve; invalid input never produces a partial response
//! - **JSON-First**: every model type implements Serialize/Deserialize
//! - **First-principles moments**: `M(x)` is superposed over all loads
//!   beyond the section, so load positions and material transitions may
//!   interleave freely (no per-segment closed-form ordering constraint)
//!
//! ## Units and Sign Convention
//!
//! SI throughout: meters, newtons, pascals; slopes are reported in degrees.
//! Load magnitudes are signed along the deflection axis, so a downward force
//! is negative and yields negative deflection. See [`loads`] for details.
//!
//! ## Quick Start
//!
//! ```rust
//! use beam_core::{DeflectionSolver, Geometry, Load, LoadSet};
//!
//! // 2 m steel cantilever, 1 kN downward at the free end
//! let geometry = Geometry::uniform(2.0, 200e9, 1e-6).unwrap();
//! let loads = LoadSet::new(vec![Load::point(2.0, -1000.0)], 2.0).unwrap();
//!
//! let field = DeflectionSolver::new(geometry, loads).unwrap().solve().unwrap();
//! println!("tip deflection: {:.4} m", field.max_deflection);
//! println!("tip slope:      {:.4} deg", field.max_slope_deg);
//! ```
//!
//! ## Modules
//!
//! - [`geometry`] - Ordered material segments and the rigidity lookup
//! - [`loads`] - Point/distributed loads and moment superposition
//! - [`solver`] - Grid construction and the curvature/deflection integrator
//! - [`library`] - Persistent material/beam/load catalog (JSON)
//! - [`errors`] - Structured error types

pub mod errors;
pub mod geometry;
pub mod library;
pub mod loads;
pub mod solver;

// Re-export commonly used types at crate root for convenience
pub use errors::{BeamError, BeamResult};
pub use geometry::{Geometry, RigidityLookup, Segment};
pub use library::{save_library, load_library, BeamLibrary, BeamSpec, FileLock, LoadEntry, Material};
pub use loads::{DistributedLoad, Intensity, Load, LoadSet, PointLoad};
pub use solver::{DeflectionSolver, ResponseField, DEFAULT_GRID_POINTS};
