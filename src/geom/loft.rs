//! Lofting profile rings along sampled paths into a triangle mesh.
//!
//! Vertex layout is fixed-stride: strand `s`, ring `i`, profile point `j`
//! lives at `(s * rings + i) * points_per_profile + j`. Every strand has one
//! ring per path sample. Ring `i` is oriented by the frame of segment
//! `(i, i + 1)`; the terminal ring reuses the frame of the last segment.
//!
//! By default the side surface connects `rings − 2` segments per strand and
//! leaves the terminal ring unconnected, matching the documented buffer
//! sizes. [`AssembleOptions::connect_terminal_ring`] closes that gap.
//!
//! Triangles face inward: side quads toward the strand centreline, the base
//! cap toward `+Z`.
//!
//! All work for one call happens here and nothing is retained between calls:
//! the same parameters always give bit-identical buffers.

use std::f64::consts::TAU;

use super::diagnostics::VaseMeshDiagnostics;
use super::frame::{FrameError, LocalFrame, compute_frame};
use super::mesh::VaseMesh;
use super::metrics::{GeomMetrics, TimingBucket};
use super::params::{ParamError, ShapeParameters};
use super::path::{CurveSampler, path_sampler};
use super::profile::{ProfileRing, ProfileSampler, profile_sampler};
use super::{Point3, Vec3};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Perimeter vertices of the base cap disc.
pub const CAP_SEGMENTS: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssembleOptions {
    /// Also triangulate the segment between the last two rings.
    pub connect_terminal_ring: bool,
    /// Emit the base cap when the parameters ask for one.
    pub base_cap: bool,
}

impl Default for AssembleOptions {
    fn default() -> Self {
        Self {
            connect_terminal_ring: false,
            base_cap: true,
        }
    }
}

#[derive(Debug, thiserror::Error, PartialEq)]
pub enum AssembleError {
    #[error("invalid shape parameters: {0}")]
    InvalidParameters(#[from] ParamError),
    #[error("path of strand {strand} needs at least 2 points")]
    PathTooShort { strand: usize },
    #[error("path of strand {strand} has non-finite points")]
    NonFinitePath { strand: usize },
    #[error("strands have different path lengths ({expected} vs {found})")]
    InconsistentPathLength { expected: usize, found: usize },
    #[error("path of strand {strand} has no segment with a usable direction")]
    DegeneratePath { strand: usize },
    #[error("profile ring needs at least 2 points (got {0})")]
    ProfileTooSmall(usize),
    #[error("profile ring size changed from {expected} to {found} at t={t}")]
    InconsistentProfile { expected: usize, found: usize, t: f64 },
    #[error("{strands} strands x {rings} rings x {points} points do not fit 32-bit indices")]
    TooManyVertices { strands: usize, rings: usize, points: usize },
}

/// Flat disc closing the bottom of a vase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BaseCap {
    pub center: Point3,
    pub radius: f64,
    pub segments: usize,
}

impl BaseCap {
    #[must_use]
    pub fn for_params(params: &ShapeParameters) -> Self {
        Self {
            center: Point3::ORIGIN,
            radius: params.base_radius,
            segments: CAP_SEGMENTS,
        }
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.segments + 1
    }
}

/// Generates the mesh for `params` with default options.
pub fn assemble(params: &ShapeParameters) -> Result<(VaseMesh, VaseMeshDiagnostics), AssembleError> {
    assemble_with_options(params, AssembleOptions::default())
}

pub fn assemble_with_options(
    params: &ShapeParameters,
    options: AssembleOptions,
) -> Result<(VaseMesh, VaseMeshDiagnostics), AssembleError> {
    params.validate()?;

    let curve = path_sampler(params);
    let profile = profile_sampler(params);
    let cap = (options.base_cap && params.wants_base_cap()).then(|| BaseCap::for_params(params));

    log::debug!(
        "assembling vase: vase_mode={} strands={} strategy={:?}",
        params.vase_mode,
        params.strand_count(),
        params.path_strategy
    );

    MeshAssembler::new(curve.as_ref(), profile.as_ref(), params.strand_count())
        .with_options(options)
        .with_base_cap(cap)
        .assemble()
}

/// Drives a curve sampler and a profile sampler to build one mesh.
pub struct MeshAssembler<'a> {
    curve: &'a (dyn CurveSampler + Sync),
    profile: &'a (dyn ProfileSampler + Sync),
    strand_count: usize,
    options: AssembleOptions,
    base_cap: Option<BaseCap>,
}

impl<'a> MeshAssembler<'a> {
    #[must_use]
    pub fn new(
        curve: &'a (dyn CurveSampler + Sync),
        profile: &'a (dyn ProfileSampler + Sync),
        strand_count: usize,
    ) -> Self {
        Self {
            curve,
            profile,
            strand_count,
            options: AssembleOptions::default(),
            base_cap: None,
        }
    }

    #[must_use]
    pub fn with_options(mut self, options: AssembleOptions) -> Self {
        self.options = options;
        self
    }

    #[must_use]
    pub fn with_base_cap(mut self, cap: Option<BaseCap>) -> Self {
        self.base_cap = cap;
        self
    }

    pub fn assemble(&self) -> Result<(VaseMesh, VaseMeshDiagnostics), AssembleError> {
        if self.strand_count == 0 {
            return Err(ParamError::NoStrands.into());
        }

        // Sampler sizes bound the buffers before anything is allocated.
        self.vertex_budget(self.curve.steps().max(1) + 1, self.profile.segments() + 1)?;

        let mut metrics = GeomMetrics::default();
        metrics.begin();

        let strand_count = self.strand_count;
        let paths = metrics.time(TimingBucket::PathSampling, || {
            map_strands(strand_count, |s| self.curve.sample_path(s, strand_count))
        });
        let rings_per_strand = check_paths(&paths)?;

        let rings = metrics.time(TimingBucket::ProfileSampling, || {
            self.sample_rings(rings_per_strand)
        })?;
        let points_per_profile = rings[0].len();

        let frames = metrics.time(TimingBucket::Framing, || {
            map_strands(strand_count, |s| segment_frames(&paths[s], s))
        });
        let frames = frames.into_iter().collect::<Result<Vec<_>, _>>()?;

        let total_vertices = self.vertex_budget(rings_per_strand, points_per_profile)?;

        let side_segments = self.side_segments(rings_per_strand);
        let side_indices = strand_count * side_segments * (points_per_profile - 1) * 6;
        let cap_indices = self.base_cap.map_or(0, |cap| cap.segments * 3);

        let mut mesh = VaseMesh::with_capacity(total_vertices, side_indices + cap_indices);

        metrics.time(TimingBucket::RingPlacement, || {
            let placed = map_strands(strand_count, |s| place_rings(&paths[s], &frames[s].frames, &rings));
            for (positions, normals) in placed {
                mesh.positions.extend_from_slice(&positions);
                mesh.normals.extend_from_slice(&normals);
            }
        });

        metrics.time(TimingBucket::Triangulation, || {
            triangulate_sides(
                &mut mesh.indices,
                strand_count,
                rings_per_strand,
                points_per_profile,
                side_segments,
            );
        });

        let mut diagnostics = VaseMeshDiagnostics {
            strand_count,
            rings_per_strand,
            points_per_profile,
            ..Default::default()
        };

        for (strand, strand_frames) in frames.iter().enumerate() {
            diagnostics.fallback_frame_count += strand_frames.fallback_count;
            diagnostics.degenerate_segment_count += strand_frames.degenerate_count;
            if strand_frames.degenerate_count > 0 {
                log::warn!(
                    "strand {strand}: {} zero-length segments reused a neighbouring frame",
                    strand_frames.degenerate_count
                );
                diagnostics.add_warning(format!(
                    "strand {strand}: {} zero-length segments",
                    strand_frames.degenerate_count
                ));
            }
        }
        if diagnostics.fallback_frame_count > 0 {
            log::warn!(
                "{} segments ran parallel to world up and used the X axis as frame reference",
                diagnostics.fallback_frame_count
            );
        }

        if let Some(cap) = self.base_cap {
            let before = mesh.triangle_count();
            metrics.time(TimingBucket::Capping, || append_base_cap(&mut mesh, cap));
            diagnostics.cap_triangle_count = mesh.triangle_count() - before;
            // TODO: stack `bottom_layers` discs once layer height is part of the parameters.
        }

        debug_assert_eq!(mesh.positions.len(), total_vertices * 3);
        debug_assert_eq!(mesh.indices.len(), side_indices + cap_indices);

        diagnostics.vertex_count = mesh.vertex_count();
        diagnostics.triangle_count = mesh.triangle_count();
        diagnostics.timing = metrics.end();

        log::debug!("vase assembled: {}", diagnostics.summary());

        Ok((mesh, diagnostics))
    }

    /// Total vertex count, strands plus cap, if it fits `u32` indices.
    fn vertex_budget(&self, rings: usize, points: usize) -> Result<usize, AssembleError> {
        let cap_vertices = self.base_cap.map_or(0, |cap| cap.vertex_count());
        self.strand_count
            .checked_mul(rings)
            .and_then(|n| n.checked_mul(points))
            .and_then(|n| n.checked_add(cap_vertices))
            .filter(|&n| u32::try_from(n).is_ok())
            .ok_or(AssembleError::TooManyVertices {
                strands: self.strand_count,
                rings,
                points,
            })
    }

    fn side_segments(&self, rings_per_strand: usize) -> usize {
        if self.options.connect_terminal_ring {
            rings_per_strand.saturating_sub(1)
        } else {
            rings_per_strand.saturating_sub(2)
        }
    }

    /// One ring per path sample, all with the size of the `t = 0` ring.
    fn sample_rings(&self, count: usize) -> Result<Vec<ProfileRing>, AssembleError> {
        let reference = self.profile.sample_profile(0.0);
        let expected = reference.len();
        if expected < 2 {
            return Err(AssembleError::ProfileTooSmall(expected));
        }

        let last = (count - 1).max(1) as f64;
        (0..count)
            .map(|i| {
                let t = i as f64 / last;
                let ring = if i == 0 { reference.clone() } else { self.profile.sample_profile(t) };
                if ring.len() == expected {
                    Ok(ring)
                } else {
                    Err(AssembleError::InconsistentProfile {
                        expected,
                        found: ring.len(),
                        t,
                    })
                }
            })
            .collect()
    }
}

#[cfg(feature = "parallel")]
fn map_strands<T: Send>(count: usize, f: impl Fn(usize) -> T + Sync + Send) -> Vec<T> {
    (0..count).into_par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
fn map_strands<T>(count: usize, f: impl Fn(usize) -> T) -> Vec<T> {
    (0..count).map(f).collect()
}

/// Returns the shared path length of all strands.
fn check_paths(paths: &[Vec<Point3>]) -> Result<usize, AssembleError> {
    let expected = paths.first().map_or(0, Vec::len);
    for (strand, path) in paths.iter().enumerate() {
        if path.len() < 2 {
            return Err(AssembleError::PathTooShort { strand });
        }
        if path.len() != expected {
            return Err(AssembleError::InconsistentPathLength {
                expected,
                found: path.len(),
            });
        }
        if path.iter().any(|p| !p.is_finite()) {
            return Err(AssembleError::NonFinitePath { strand });
        }
    }
    Ok(expected)
}

#[derive(Debug, Clone)]
struct StrandFrames {
    /// One frame per segment (`path.len() - 1`).
    frames: Vec<LocalFrame>,
    fallback_count: usize,
    degenerate_count: usize,
}

/// Frames for every segment; zero-length segments borrow the previous valid
/// frame (or the first valid one when they lead the path).
fn segment_frames(path: &[Point3], strand: usize) -> Result<StrandFrames, AssembleError> {
    let raw = path
        .windows(2)
        .map(|pair| match compute_frame(pair[0], pair[1]) {
            Ok(frame) => Ok(Some(frame)),
            Err(FrameError::ZeroLengthSegment) => Ok(None),
            Err(FrameError::NonFiniteSegment) => Err(AssembleError::NonFinitePath { strand }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    let first_valid = raw
        .iter()
        .flatten()
        .next()
        .copied()
        .ok_or(AssembleError::DegeneratePath { strand })?;

    let degenerate_count = raw.iter().filter(|f| f.is_none()).count();
    let fallback_count = raw.iter().flatten().filter(|f| f.used_fallback()).count();

    let mut last = first_valid;
    let frames = raw
        .into_iter()
        .map(|frame| {
            if let Some(frame) = frame {
                last = frame;
            }
            last
        })
        .collect();

    Ok(StrandFrames {
        frames,
        fallback_count,
        degenerate_count,
    })
}

/// World-space positions and normals for every ring of one strand.
///
/// Every vertex of a ring gets the frame normal of its segment.
fn place_rings(path: &[Point3], frames: &[LocalFrame], rings: &[ProfileRing]) -> (Vec<f64>, Vec<f64>) {
    let per_ring = rings.first().map_or(0, ProfileRing::len);
    let mut positions = Vec::with_capacity(path.len() * per_ring * 3);
    let mut normals = Vec::with_capacity(path.len() * per_ring * 3);

    for (i, (origin, ring)) in path.iter().zip(rings).enumerate() {
        let frame = frames[i.min(frames.len() - 1)];
        let normal = frame.normal.normalized().unwrap_or(frame.normal).to_array();
        for offset in ring.points() {
            positions.extend_from_slice(&frame.place(*origin, offset.x, offset.y).to_array());
            normals.extend_from_slice(&normal);
        }
    }

    (positions, normals)
}

/// Two triangles per adjacent profile-point pair between consecutive rings:
/// `(v0, v1, v2)` and `(v1, v3, v2)`, with `v2`/`v3` one ring further.
fn triangulate_sides(
    indices: &mut Vec<u32>,
    strand_count: usize,
    rings_per_strand: usize,
    points_per_profile: usize,
    segments: usize,
) {
    let stride = points_per_profile as u32;
    for strand in 0..strand_count {
        let strand_base = (strand * rings_per_strand * points_per_profile) as u32;
        for ring in 0..segments as u32 {
            let ring_base = strand_base + ring * stride;
            for j in 0..stride - 1 {
                let v0 = ring_base + j;
                let v1 = v0 + 1;
                let v2 = v0 + stride;
                let v3 = v1 + stride;
                indices.extend_from_slice(&[v0, v1, v2]);
                indices.extend_from_slice(&[v1, v3, v2]);
            }
        }
    }
}

/// Fan-triangulated disc facing `+Z` (into the vessel): centre vertex, then
/// the perimeter.
fn append_base_cap(mesh: &mut VaseMesh, cap: BaseCap) {
    let up = Vec3::Z;
    let center = mesh.push_vertex(cap.center, up);

    let ring_start = center + 1;
    for seg in 0..cap.segments {
        let angle = TAU * seg as f64 / cap.segments as f64;
        let p = Point3::new(
            cap.center.x + cap.radius * angle.cos(),
            cap.center.y + cap.radius * angle.sin(),
            cap.center.z,
        );
        mesh.push_vertex(p, up);
    }

    for seg in 0..cap.segments as u32 {
        let a = ring_start + seg;
        let b = ring_start + (seg + 1) % cap.segments as u32;
        // Counter-clockwise seen from above, like the side quads seen from
        // their strand centreline.
        mesh.push_triangle(center, a, b);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Vec2;

    struct Line;

    impl CurveSampler for Line {
        fn steps(&self) -> usize {
            4
        }

        fn point_at(&self, t: f64, strand: usize, _strand_count: usize) -> Point3 {
            Point3::new(strand as f64, 0.0, t * 4.0)
        }
    }

    struct Square;

    impl ProfileSampler for Square {
        fn segments(&self) -> usize {
            4
        }

        fn sample_profile(&self, _t: f64) -> ProfileRing {
            ProfileRing::from_angle_fn(4, |a| Vec2::new(a.cos(), a.sin()))
        }
    }

    #[test]
    fn triangulate_sides_emits_two_triangles_per_quad() {
        let mut indices = Vec::new();
        triangulate_sides(&mut indices, 1, 3, 3, 1);
        assert_eq!(indices, vec![0, 1, 3, 1, 4, 3, 1, 2, 4, 2, 5, 4]);
    }

    #[test]
    fn vertical_line_uses_fallback_frames() {
        let (mesh, diag) = MeshAssembler::new(&Line, &Square, 2).assemble().unwrap();
        assert_eq!(mesh.vertex_count(), 2 * 5 * 5);
        assert_eq!(diag.fallback_frame_count, 2 * 4);
        assert!(!mesh.has_invalid_values());
        mesh.validate().unwrap();
    }

    #[test]
    fn zero_strands_is_rejected() {
        let err = MeshAssembler::new(&Line, &Square, 0).assemble().unwrap_err();
        assert_eq!(err, AssembleError::InvalidParameters(ParamError::NoStrands));
    }

    #[test]
    fn oversized_layout_is_rejected_before_sampling() {
        let strands = usize::MAX / 4;
        let err = MeshAssembler::new(&Line, &Square, strands).assemble().unwrap_err();
        assert_eq!(
            err,
            AssembleError::TooManyVertices { strands, rings: 5, points: 5 }
        );

        // Fits `usize` but not `u32`.
        let strands = 200_000_000;
        let err = MeshAssembler::new(&Line, &Square, strands).assemble().unwrap_err();
        assert!(matches!(err, AssembleError::TooManyVertices { .. }));
    }

    #[test]
    fn segment_frames_fill_leading_degenerate_segments() {
        let p = Point3::new(1.0, 0.0, 0.0);
        let path = [p, p, Point3::new(1.0, 1.0, 0.0), Point3::new(1.0, 2.0, 0.0)];
        let frames = segment_frames(&path, 0).unwrap();
        assert_eq!(frames.frames.len(), 3);
        assert_eq!(frames.degenerate_count, 1);
        assert_eq!(frames.frames[0], frames.frames[1]);
    }

    #[test]
    fn fully_degenerate_path_is_rejected() {
        let p = Point3::new(1.0, 0.0, 0.0);
        assert_eq!(
            segment_frames(&[p, p, p], 7).unwrap_err(),
            AssembleError::DegeneratePath { strand: 7 }
        );
    }

    #[test]
    fn base_cap_is_an_upward_fan() {
        let mut mesh = VaseMesh::default();
        append_base_cap(
            &mut mesh,
            BaseCap { center: Point3::ORIGIN, radius: 2.0, segments: 8 },
        );
        assert_eq!(mesh.vertex_count(), 9);
        assert_eq!(mesh.triangle_count(), 8);

        for tri in mesh.indices.chunks_exact(3) {
            let a = mesh.position(tri[0] as usize).unwrap();
            let b = mesh.position(tri[1] as usize).unwrap();
            let c = mesh.position(tri[2] as usize).unwrap();
            let n = (b - a).cross(c - a);
            assert!(n.z > 0.0, "cap triangle faces down: {tri:?}");
        }
    }
}
