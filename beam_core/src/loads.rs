//! # Load Model
//!
//! Point and distributed transverse loads on a cantilever, with the two
//! superposition queries the integrator builds on: the resultant of all load
//! at or beyond a cross-section, and the bending moment that load produces
//! about the section.
//!
//! ## Sign Convention
//!
//! Magnitudes and intensities are signed along the deflection axis: a
//! downward force is negative and produces negative slope and deflection.
//! The internal bending moment at a section `x` of a cantilever fixed at 0 is
//! the superposition over every load beyond the section:
//!
//! ```text
//! M(x) = Σ F·(p − x)            point loads at p ≥ x
//!      + ∫ w(p)·(p − x) dp      distributed load portions with p ≥ x
//! ```
//!
//! Because `M(x)` is assembled from first principles rather than from
//! per-segment closed forms, point loads may sit on either side of a material
//! transition; there is no ordering constraint between load positions and
//! segment boundaries.
//!
//! ## Example
//!
//! ```rust
//! use beam_core::loads::{Load, LoadSet};
//!
//! // 1 kN downward at the free end of a 2 m beam
//! let loads = LoadSet::new(vec![Load::point(2.0, -1000.0)], 2.0).unwrap();
//! assert_eq!(loads.moment_at(0.0), -2000.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{BeamError, BeamResult};

/// Intensity profile of a distributed load over its own interval.
///
/// Each variant answers a single query, the intensity value at a fractional
/// position `t` in `[0, 1]` along the load; new profiles extend this enum
/// without touching the integrator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Intensity {
    /// Constant intensity w (N/m)
    Uniform { w: f64 },
    /// Linear ramp from `start_w` at the interval start to `end_w` at its end
    Linear { start_w: f64, end_w: f64 },
}

impl Intensity {
    /// Intensity at fractional position `t` in `[0, 1]` along the load (N/m)
    pub fn value_at(&self, t: f64) -> f64 {
        match self {
            Intensity::Uniform { w } => *w,
            Intensity::Linear { start_w, end_w } => start_w + (end_w - start_w) * t,
        }
    }

    fn is_finite(&self) -> bool {
        match self {
            Intensity::Uniform { w } => w.is_finite(),
            Intensity::Linear { start_w, end_w } => start_w.is_finite() && end_w.is_finite(),
        }
    }
}

/// A transverse force at a single position (N)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointLoad {
    /// Position along the beam (m from the fixed end)
    pub position: f64,
    /// Signed force (N); negative is downward
    pub magnitude: f64,
}

/// A transverse load per unit length over `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DistributedLoad {
    /// Start position (m from the fixed end)
    pub start: f64,
    /// End position (m from the fixed end)
    pub end: f64,
    /// Intensity profile over the interval (N/m)
    pub intensity: Intensity,
}

impl DistributedLoad {
    /// Constant-intensity load over `[start, end]`
    pub fn uniform(start: f64, end: f64, w: f64) -> Self {
        DistributedLoad {
            start,
            end,
            intensity: Intensity::Uniform { w },
        }
    }

    /// Linearly ramping load over `[start, end]`
    pub fn linear(start: f64, end: f64, start_w: f64, end_w: f64) -> Self {
        DistributedLoad {
            start,
            end,
            intensity: Intensity::Linear { start_w, end_w },
        }
    }

    /// Intensity at beam position `x` (N/m); zero outside the interval
    pub fn intensity_at(&self, x: f64) -> f64 {
        if x < self.start || x > self.end {
            return 0.0;
        }
        let t = (x - self.start) / (self.end - self.start);
        self.intensity.value_at(t)
    }

    /// Intensity slope k (N/m per m) and value c at beam position `x`, so
    /// that w(p) = c + k·(p − x) over the interval.
    fn linearized_at(&self, x: f64) -> (f64, f64) {
        match self.intensity {
            Intensity::Uniform { w } => (w, 0.0),
            Intensity::Linear { start_w, end_w } => {
                let k = (end_w - start_w) / (self.end - self.start);
                (start_w + k * (x - self.start), k)
            }
        }
    }

    /// Total load carried at or beyond `x`: `∫_{max(start,x)}^{end} w(p) dp` (N)
    pub fn resultant_beyond(&self, x: f64) -> f64 {
        if self.end <= x {
            return 0.0;
        }
        let a = self.start.max(x);
        let (c, k) = self.linearized_at(x);
        let ua = a - x;
        let ue = self.end - x;
        c * (ue - ua) + k * (ue * ue - ua * ua) / 2.0
    }

    /// Moment about `x` of the load at or beyond `x`:
    /// `∫_{max(start,x)}^{end} w(p)·(p − x) dp` (N·m)
    pub fn moment_about(&self, x: f64) -> f64 {
        if self.end <= x {
            return 0.0;
        }
        let a = self.start.max(x);
        let (c, k) = self.linearized_at(x);
        let ua = a - x;
        let ue = self.end - x;
        c * (ue * ue - ua * ua) / 2.0 + k * (ue.powi(3) - ua.powi(3)) / 3.0
    }
}

/// A single applied load
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Load {
    /// Transverse force at one position
    Point(PointLoad),
    /// Load per unit length over an interval
    Distributed(DistributedLoad),
}

impl Load {
    /// Create a point load
    pub fn point(position: f64, magnitude: f64) -> Self {
        Load::Point(PointLoad {
            position,
            magnitude,
        })
    }

    /// Create a constant distributed load
    pub fn distributed(start: f64, end: f64, w: f64) -> Self {
        Load::Distributed(DistributedLoad::uniform(start, end, w))
    }

    /// Create a linearly ramping distributed load
    pub fn ramp(start: f64, end: f64, start_w: f64, end_w: f64) -> Self {
        Load::Distributed(DistributedLoad::linear(start, end, start_w, end_w))
    }
}

/// The validated collection of loads applied to one beam.
///
/// Immutable for the duration of a solve; validated against the beam's total
/// length at construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadSet {
    loads: Vec<Load>,
    total_length: f64,
}

impl LoadSet {
    /// Build a load set, validating every load against `[0, total_length]`.
    ///
    /// # Errors
    ///
    /// Returns [`BeamError::InvalidLoad`] for out-of-range positions,
    /// reversed intervals, or non-finite magnitudes.
    pub fn new(loads: Vec<Load>, total_length: f64) -> BeamResult<Self> {
        for load in &loads {
            match load {
                Load::Point(p) => {
                    if !p.magnitude.is_finite() {
                        return Err(BeamError::invalid_load(format!(
                            "point load at {} m has non-finite magnitude",
                            p.position
                        )));
                    }
                    if !p.position.is_finite() || p.position < 0.0 || p.position > total_length {
                        return Err(BeamError::invalid_load(format!(
                            "point load position {} m is outside [0, {}]",
                            p.position, total_length
                        )));
                    }
                }
                Load::Distributed(d) => {
                    if !d.intensity.is_finite() {
                        return Err(BeamError::invalid_load(format!(
                            "distributed load over [{}, {}] has non-finite intensity",
                            d.start, d.end
                        )));
                    }
                    if !d.start.is_finite()
                        || !d.end.is_finite()
                        || d.start < 0.0
                        || d.end > total_length
                    {
                        return Err(BeamError::invalid_load(format!(
                            "distributed load interval [{}, {}] is outside [0, {}]",
                            d.start, d.end, total_length
                        )));
                    }
                    if d.start >= d.end {
                        return Err(BeamError::invalid_load(format!(
                            "distributed load interval [{}, {}] is reversed or empty",
                            d.start, d.end
                        )));
                    }
                }
            }
        }
        Ok(LoadSet {
            loads,
            total_length,
        })
    }

    /// An empty load set for a beam of the given length
    pub fn empty(total_length: f64) -> Self {
        LoadSet {
            loads: Vec::new(),
            total_length,
        }
    }

    /// The applied loads
    pub fn loads(&self) -> &[Load] {
        &self.loads
    }

    /// Beam length this set was validated against (m)
    pub fn total_length(&self) -> f64 {
        self.total_length
    }

    /// Number of loads
    pub fn len(&self) -> usize {
        self.loads.len()
    }

    /// Whether the set holds no loads
    pub fn is_empty(&self) -> bool {
        self.loads.is_empty()
    }

    /// Total transverse load situated at or beyond `x` (N).
    ///
    /// This is the internal shear carried by the cross-section at `x`.
    pub fn shear_at(&self, x: f64) -> f64 {
        self.loads
            .iter()
            .map(|load| match load {
                Load::Point(p) => {
                    if p.position >= x {
                        p.magnitude
                    } else {
                        0.0
                    }
                }
                Load::Distributed(d) => d.resultant_beyond(x),
            })
            .sum()
    }

    /// Internal bending moment at cross-section `x` (N·m), by superposition
    /// over every load applied at or beyond `x`.
    pub fn moment_at(&self, x: f64) -> f64 {
        self.loads
            .iter()
            .map(|load| match load {
                Load::Point(p) => {
                    if p.position >= x {
                        p.magnitude * (p.position - x)
                    } else {
                        0.0
                    }
                }
                Load::Distributed(d) => d.moment_about(x),
            })
            .sum()
    }

    /// Positions where the moment field's derivative jumps, for grid
    /// construction: point-load positions and distributed start/end points.
    pub fn breakpoints(&self) -> Vec<f64> {
        let mut positions = Vec::new();
        for load in &self.loads {
            match load {
                Load::Point(p) => positions.push(p.position),
                Load::Distributed(d) => {
                    positions.push(d.start);
                    positions.push(d.end);
                }
            }
        }
        positions
    }
}
