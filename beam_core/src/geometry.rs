//! # Beam Geometry
//!
//! Ordered material segments with position bookkeeping. A [`Geometry`] holds
//! the validated, contiguous list of [`Segment`]s covering `[0, total_length]`
//! and answers "which segment contains x" and "what is EI at x" queries.
//!
//! ## Invariants (enforced at construction)
//!
//! - Segments are ordered, contiguous, and non-overlapping
//! - The first segment starts at x = 0; boundaries are strictly increasing
//! - Every segment has `E > 0` and `I > 0`
//!
//! ## Example
//!
//! ```rust
//! use beam_core::geometry::{Geometry, Segment};
//!
//! // 2 m steel beam, rigidity change at midspan
//! let geometry = Geometry::new(vec![
//!     Segment::new(0.0, 1.0, 200e9, 1e-6),
//!     Segment::new(1.0, 2.0, 69e9, 1e-6),
//! ]).unwrap();
//!
//! assert_eq!(geometry.total_length(), 2.0);
//! assert_eq!(geometry.rigidity_at(0.5).unwrap(), 200e9 * 1e-6);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{BeamError, BeamResult};

/// A contiguous span of the beam with constant material and cross-section.
///
/// Positions are meters from the fixed end, `elastic_modulus` in pascals,
/// `moment_of_inertia` in m⁴.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Start position (m from the fixed end)
    pub start: f64,
    /// End position (m from the fixed end)
    pub end: f64,
    /// Young's modulus E (Pa)
    pub elastic_modulus: f64,
    /// Second moment of area I (m⁴)
    pub moment_of_inertia: f64,
}

impl Segment {
    /// Create a new segment
    pub fn new(start: f64, end: f64, elastic_modulus: f64, moment_of_inertia: f64) -> Self {
        Segment {
            start,
            end,
            elastic_modulus,
            moment_of_inertia,
        }
    }

    /// Flexural rigidity EI (N·m²)
    pub fn rigidity(&self) -> f64 {
        self.elastic_modulus * self.moment_of_inertia
    }

    /// Segment length (m)
    pub fn length(&self) -> f64 {
        self.end - self.start
    }

    /// Whether `x` lies in this segment's half-open interval `[start, end)`
    fn contains(&self, x: f64) -> bool {
        x >= self.start && x < self.end
    }
}

/// The validated, ordered segment list for one beam.
///
/// Construction is the only way to obtain a `Geometry`, so every instance
/// satisfies the segment invariants. Immutable for the duration of a solve.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Geometry {
    segments: Vec<Segment>,
}

impl Geometry {
    /// Build a geometry from an ordered segment list.
    ///
    /// # Errors
    ///
    /// Returns [`BeamError::InvalidGeometry`] if the list is empty, does not
    /// start at x = 0, is not contiguous with strictly increasing boundaries,
    /// or any segment has non-positive/non-finite E, I, or length.
    pub fn new(segments: Vec<Segment>) -> BeamResult<Self> {
        if segments.is_empty() {
            return Err(BeamError::invalid_geometry("beam needs at least one segment"));
        }

        if segments[0].start != 0.0 {
            return Err(BeamError::invalid_geometry(format!(
                "first segment must start at x = 0, got {}",
                segments[0].start
            )));
        }

        for seg in &segments {
            if !seg.start.is_finite()
                || !seg.end.is_finite()
                || !seg.elastic_modulus.is_finite()
                || !seg.moment_of_inertia.is_finite()
            {
                return Err(BeamError::invalid_geometry(format!(
                    "segment [{}, {}] has non-finite properties",
                    seg.start, seg.end
                )));
            }
            if seg.start >= seg.end {
                return Err(BeamError::invalid_geometry(format!(
                    "segment [{}, {}] has non-positive length",
                    seg.start, seg.end
                )));
            }
            if seg.elastic_modulus <= 0.0 {
                return Err(BeamError::invalid_geometry(format!(
                    "segment [{}, {}] has non-positive modulus E = {}",
                    seg.start, seg.end, seg.elastic_modulus
                )));
            }
            if seg.moment_of_inertia <= 0.0 {
                return Err(BeamError::invalid_geometry(format!(
                    "segment [{}, {}] has non-positive moment of inertia I = {}",
                    seg.start, seg.end, seg.moment_of_inertia
                )));
            }
        }

        for pair in segments.windows(2) {
            if pair[0].end != pair[1].start {
                return Err(BeamError::invalid_geometry(format!(
                    "segments are not contiguous: [{}, {}] followed by [{}, {}]",
                    pair[0].start, pair[0].end, pair[1].start, pair[1].end
                )));
            }
        }

        Ok(Geometry { segments })
    }

    /// Convenience constructor for a single-material beam
    pub fn uniform(length: f64, elastic_modulus: f64, moment_of_inertia: f64) -> BeamResult<Self> {
        Geometry::new(vec![Segment::new(
            0.0,
            length,
            elastic_modulus,
            moment_of_inertia,
        )])
    }

    /// Total beam length (m); equals the last segment's `end`
    pub fn total_length(&self) -> f64 {
        self.segments.last().map(|s| s.end).unwrap_or(0.0)
    }

    /// The ordered segment list
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// The segment containing `x`.
    ///
    /// Segments own their half-open interval `[start, end)`; the beam's right
    /// boundary belongs to the last segment (closed at the free end only).
    pub fn segment_at(&self, x: f64) -> BeamResult<&Segment> {
        let total = self.total_length();
        if !x.is_finite() || x < 0.0 || x > total {
            return Err(BeamError::out_of_range(x, total));
        }
        if x == total {
            // segments is non-empty by construction
            return Ok(&self.segments[self.segments.len() - 1]);
        }
        self.segments
            .iter()
            .find(|s| s.contains(x))
            .ok_or_else(|| BeamError::out_of_range(x, total))
    }

    /// Flexural rigidity EI at position `x` (N·m²)
    pub fn rigidity_at(&self, x: f64) -> BeamResult<f64> {
        Ok(self.segment_at(x)?.rigidity())
    }

    /// Interior segment boundaries, for grid construction.
    ///
    /// Excludes x = 0 and x = total_length, which every grid already carries.
    pub fn breakpoints(&self) -> Vec<f64> {
        self.segments
            .iter()
            .take(self.segments.len().saturating_sub(1))
            .map(|s| s.end)
            .collect()
    }
}

/// Thin accessor decoupling the integrator from [`Geometry`]'s internal
/// representation. A linear scan over the segment list is sufficient for the
/// segment counts this tool sees.
#[derive(Debug, Clone, Copy)]
pub struct RigidityLookup<'a> {
    geometry: &'a Geometry,
}

impl<'a> RigidityLookup<'a> {
    /// Wrap a geometry
    pub fn new(geometry: &'a Geometry) -> Self {
        RigidityLookup { geometry }
    }

    /// Local flexural rigidity EI at `x` (N·m²)
    pub fn at(&self, x: f64) -> BeamResult<f64> {
        self.geometry.rigidity_at(x)
    }

    /// Positions where EI jumps
    pub fn breakpoints(&self) -> Vec<f64> {
        self.geometry.breakpoints()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_segment() -> Geometry {
        Geometry::new(vec![
            Segment::new(0.0, 4.0, 200e9, 1e-6),
            Segment::new(4.0, 10.0, 69e9, 2e-6),
        ])
        .unwrap()
    }

    #[test]
    fn test_valid_geometry() {
        let geometry = two_segment();
        assert_eq!(geometry.total_length(), 10.0);
        assert_eq!(geometry.segments().len(), 2);
        assert_eq!(geometry.breakpoints(), vec![4.0]);
    }

    #[test]
    fn test_empty_segments_rejected() {
        let err = Geometry::new(vec![]).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_GEOMETRY");
    }

    #[test]
    fn test_must_start_at_zero() {
        let err = Geometry::new(vec![Segment::new(1.0, 2.0, 200e9, 1e-6)]).unwrap_err();
        assert!(matches!(err, BeamError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_gap_rejected() {
        let err = Geometry::new(vec![
            Segment::new(0.0, 4.0, 200e9, 1e-6),
            Segment::new(5.0, 10.0, 200e9, 1e-6),
        ])
        .unwrap_err();
        assert!(matches!(err, BeamError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_reversed_segment_rejected() {
        let err = Geometry::new(vec![Segment::new(0.0, 0.0, 200e9, 1e-6)]).unwrap_err();
        assert!(matches!(err, BeamError::InvalidGeometry { .. }));
    }

    #[test]
    fn test_nonpositive_properties_rejected() {
        assert!(Geometry::new(vec![Segment::new(0.0, 1.0, 0.0, 1e-6)]).is_err());
        assert!(Geometry::new(vec![Segment::new(0.0, 1.0, 200e9, -1e-6)]).is_err());
        assert!(Geometry::new(vec![Segment::new(0.0, 1.0, f64::NAN, 1e-6)]).is_err());
    }

    #[test]
    fn test_rigidity_lookup() {
        let geometry = two_segment();
        assert_eq!(geometry.rigidity_at(0.0).unwrap(), 200e9 * 1e-6);
        assert_eq!(geometry.rigidity_at(3.999).unwrap(), 200e9 * 1e-6);
        // boundary belongs to the segment to its right
        assert_eq!(geometry.rigidity_at(4.0).unwrap(), 69e9 * 2e-6);
        // beam end is closed: last segment answers
        assert_eq!(geometry.rigidity_at(10.0).unwrap(), 69e9 * 2e-6);
    }

    #[test]
    fn test_out_of_range_query() {
        let geometry = two_segment();
        assert_eq!(
            geometry.rigidity_at(-0.1).unwrap_err().error_code(),
            "OUT_OF_RANGE"
        );
        assert_eq!(
            geometry.rigidity_at(10.1).unwrap_err().error_code(),
            "OUT_OF_RANGE"
        );
    }

    #[test]
    fn test_lookup_wrapper_matches_geometry() {
        let geometry = two_segment();
        let lookup = RigidityLookup::new(&geometry);
        assert_eq!(lookup.at(2.0).unwrap(), geometry.rigidity_at(2.0).unwrap());
        assert_eq!(lookup.breakpoints(), geometry.breakpoints());
    }

    #[test]
    fn test_serialization_roundtrip() {
        let geometry = two_segment();
        let json = serde_json::to_string(&geometry).unwrap();
        let roundtrip: Geometry = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip.total_length(), 10.0);
        assert_eq!(roundtrip.segments(), geometry.segments());
    }
}
