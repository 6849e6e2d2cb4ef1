//! Local frames for orienting profile rings along a path.
//!
//! A frame is derived from two consecutive path points and the world up
//! vector. When the segment runs (nearly) parallel to world up the cross
//! product collapses, so the world X axis is used as the reference instead.

use super::{Point3, Tolerance, Vec3};

/// Reference vector a frame was built against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameReference {
    WorldUp,
    /// The segment was parallel to world up; world X was used.
    FallbackX,
}

/// Orthonormal basis at one path segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    pub tangent: Vec3,
    /// Maps the profile's x offset into world space.
    pub normal: Vec3,
    /// Maps the profile's y offset into world space.
    pub binormal: Vec3,
    pub reference: FrameReference,
}

impl LocalFrame {
    #[must_use]
    pub fn used_fallback(&self) -> bool {
        self.reference == FrameReference::FallbackX
    }

    /// World position of a profile offset `(x, y)` placed at `origin`.
    #[must_use]
    pub fn place(&self, origin: Point3, x: f64, y: f64) -> Point3 {
        origin
            .add_vec(self.normal.mul_scalar(x))
            .add_vec(self.binormal.mul_scalar(y))
    }
}

#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq)]
pub enum FrameError {
    #[error("segment has zero length")]
    ZeroLengthSegment,
    #[error("segment endpoints must be finite")]
    NonFiniteSegment,
}

pub fn compute_frame(point: Point3, next: Point3) -> Result<LocalFrame, FrameError> {
    compute_frame_with_tolerance(point, next, Tolerance::ZERO_LENGTH, Tolerance::PARALLEL)
}

/// `zero_tol` decides when a segment is too short to have a direction;
/// `parallel_tol` is how close `|tangent·up|` may get to 1 before falling back
/// to world X.
pub fn compute_frame_with_tolerance(
    point: Point3,
    next: Point3,
    zero_tol: Tolerance,
    parallel_tol: Tolerance,
) -> Result<LocalFrame, FrameError> {
    if !point.is_finite() || !next.is_finite() {
        return Err(FrameError::NonFiniteSegment);
    }

    let delta = next.sub_point(point);
    if zero_tol.is_zero_vec3(delta) {
        return Err(FrameError::ZeroLengthSegment);
    }
    let tangent = delta.normalized().ok_or(FrameError::ZeroLengthSegment)?;

    let (reference, kind) = if tangent.dot(Vec3::Z).abs() > 1.0 - parallel_tol.eps {
        (Vec3::X, FrameReference::FallbackX)
    } else {
        (Vec3::Z, FrameReference::WorldUp)
    };

    // Unreachable for a unit tangent and a non-parallel reference.
    let normal = tangent
        .cross(reference)
        .normalized()
        .ok_or(FrameError::ZeroLengthSegment)?;
    let binormal = normal
        .cross(tangent)
        .normalized()
        .ok_or(FrameError::ZeroLengthSegment)?;

    Ok(LocalFrame {
        tangent,
        normal,
        binormal,
        reference: kind,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_orthonormal(frame: &LocalFrame) {
        for v in [frame.tangent, frame.normal, frame.binormal] {
            assert!((v.length() - 1.0).abs() < 1e-12, "not unit: {v:?}");
        }
        assert!(frame.tangent.dot(frame.normal).abs() < 1e-12);
        assert!(frame.tangent.dot(frame.binormal).abs() < 1e-12);
        assert!(frame.normal.dot(frame.binormal).abs() < 1e-12);
    }

    #[test]
    fn horizontal_segment_uses_world_up() {
        let frame = compute_frame(Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)).unwrap();
        assert_eq!(frame.reference, FrameReference::WorldUp);
        assert_orthonormal(&frame);
        // tangent × up = X × Z = -Y
        assert!((frame.normal.y + 1.0).abs() < 1e-12);
        // normal × tangent = -Y × X = Z
        assert!((frame.binormal.z - 1.0).abs() < 1e-12);
    }

    #[test]
    fn vertical_segment_falls_back_to_x() {
        let frame = compute_frame(Point3::ORIGIN, Point3::new(0.0, 0.0, 1.0)).unwrap();
        assert!(frame.used_fallback());
        assert_orthonormal(&frame);
        assert!(frame.normal.is_finite());
        assert!(frame.binormal.is_finite());
    }

    #[test]
    fn downward_segment_falls_back_to_x() {
        let frame = compute_frame(Point3::new(0.0, 0.0, 2.0), Point3::ORIGIN).unwrap();
        assert!(frame.used_fallback());
        assert_orthonormal(&frame);
    }

    #[test]
    fn zero_length_segment_is_rejected() {
        let p = Point3::new(1.0, 2.0, 3.0);
        assert_eq!(compute_frame(p, p), Err(FrameError::ZeroLengthSegment));
    }

    #[test]
    fn non_finite_segment_is_rejected() {
        let p = Point3::new(f64::NAN, 0.0, 0.0);
        assert_eq!(compute_frame(p, Point3::ORIGIN), Err(FrameError::NonFiniteSegment));
    }

    #[test]
    fn oblique_segments_are_orthonormal() {
        let pairs = [
            (Point3::new(1.0, 0.0, 0.0), Point3::new(0.9, 0.3, 0.05)),
            (Point3::new(-2.0, 1.0, 0.5), Point3::new(-2.1, 0.8, 0.9)),
            (Point3::ORIGIN, Point3::new(1e-3, 0.0, 1.0)),
        ];
        for (a, b) in pairs {
            let frame = compute_frame(a, b).unwrap();
            assert_orthonormal(&frame);
        }
    }

    #[test]
    fn place_offsets_along_normal_and_binormal() {
        let frame = compute_frame(Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)).unwrap();
        let p = frame.place(Point3::new(0.0, 0.0, 5.0), 2.0, 3.0);
        assert!((p.x - 0.0).abs() < 1e-12);
        assert!((p.y + 2.0).abs() < 1e-12);
        assert!((p.z - 8.0).abs() < 1e-12);
    }
}
