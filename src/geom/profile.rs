//! Cross-section profiles.
//!
//! A [`ProfileRing`] is a closed polygon of 2D offsets. The closing sample is
//! emitted explicitly: a ring for `n` segments has `n + 1` points and the last
//! point coincides with the first. Ring size never depends on `t` for a given
//! sampler; the assembler relies on this for fixed-stride indexing.

use std::f64::consts::TAU;

use super::Vec2;
use super::params::{MM_TO_INCH, NOZZLE_DIAMETER_MM, ShapeParameters};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProfileRing {
    points: Vec<Vec2>,
}

impl ProfileRing {
    #[must_use]
    pub fn new(points: Vec<Vec2>) -> Self {
        Self { points }
    }

    /// Samples `segments + 1` points of `f(angle)` around a full turn.
    #[must_use]
    pub fn from_angle_fn(segments: usize, f: impl Fn(f64) -> Vec2) -> Self {
        let points = (0..=segments)
            .map(|i| f(TAU * i as f64 / segments as f64))
            .collect();
        Self { points }
    }

    #[must_use]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Whether the last sample repeats the first within `eps`.
    #[must_use]
    pub fn is_closed(&self, eps: f64) -> bool {
        match (self.points.first(), self.points.last()) {
            (Some(first), Some(last)) if self.points.len() > 1 => first.distance_to(*last) <= eps,
            _ => false,
        }
    }
}

pub trait ProfileSampler {
    /// Segments around the ring; rings have `segments() + 1` points.
    fn segments(&self) -> usize;

    fn sample_profile(&self, t: f64) -> ProfileRing;
}

#[must_use]
pub fn profile_sampler(params: &ShapeParameters) -> Box<dyn ProfileSampler + Send + Sync> {
    if params.vase_mode {
        Box::new(NozzleProfile::new(params.profile_segments()))
    } else {
        Box::new(EllipseProfile::from_params(params))
    }
}

/// Circle of half the nozzle diameter; constant along the path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NozzleProfile {
    segments: usize,
}

impl NozzleProfile {
    #[must_use]
    pub fn new(segments: usize) -> Self {
        Self { segments }
    }

    /// Radius in inches.
    #[must_use]
    pub fn radius() -> f64 {
        NOZZLE_DIAMETER_MM * 0.5 * MM_TO_INCH
    }
}

impl ProfileSampler for NozzleProfile {
    fn segments(&self) -> usize {
        self.segments
    }

    fn sample_profile(&self, _t: f64) -> ProfileRing {
        let r = Self::radius();
        ProfileRing::from_angle_fn(self.segments, |a| Vec2::new(r * a.cos(), r * a.sin()))
    }
}

/// Axis-aligned ellipse with half-widths `width / 2` and `height`.
// TODO: accept a taper curve so the section can shrink towards the rim.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EllipseProfile {
    half_width: f64,
    half_height: f64,
    segments: usize,
}

impl EllipseProfile {
    #[must_use]
    pub fn new(width: f64, height: f64, segments: usize) -> Self {
        Self {
            half_width: width * 0.5,
            half_height: height,
            segments,
        }
    }

    #[must_use]
    pub fn from_params(params: &ShapeParameters) -> Self {
        Self::new(params.profile_width, params.profile_height, params.profile_segments())
    }
}

impl ProfileSampler for EllipseProfile {
    fn segments(&self) -> usize {
        self.segments
    }

    fn sample_profile(&self, _t: f64) -> ProfileRing {
        let (hw, hh) = (self.half_width, self.half_height);
        ProfileRing::from_angle_fn(self.segments, |a| Vec2::new(hw * a.cos(), hh * a.sin()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nozzle_ring_is_closed_circle() {
        let profile = NozzleProfile::new(16);
        let ring = profile.sample_profile(0.3);
        assert_eq!(ring.len(), 17);
        assert!(ring.is_closed(1e-12));
        let r = 0.2 / 25.4;
        for p in ring.points() {
            assert!((p.length() - r).abs() < 1e-12);
        }
    }

    #[test]
    fn ellipse_extents_match_width_and_height() {
        let ring = EllipseProfile::new(0.2, 0.1, 8).sample_profile(0.0);
        assert_eq!(ring.len(), 9);
        assert!((ring.points()[0].x - 0.1).abs() < 1e-12);
        assert!((ring.points()[2].y - 0.1).abs() < 1e-12);
        assert!((ring.points()[4].x + 0.1).abs() < 1e-12);
    }

    #[test]
    fn empty_ring_is_not_closed() {
        assert!(!ProfileRing::default().is_closed(1.0));
        assert!(ProfileRing::default().is_empty());
    }
}
