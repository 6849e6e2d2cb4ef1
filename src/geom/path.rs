//! Centerline samplers.
//!
//! Every sampler maps a normalized height parameter `t ∈ [0, 1]` (0 at the
//! base, 1 at the top) and a strand index to one path point. Samplers are
//! stateless: the same parameters always produce the same points.
//!
//! - [`SpiralSampler`]: single continuous spiral used in vase mode.
//! - [`ArtisticSampler`]: multi-strand wave pattern.
//! - [`HelixSampler`]: constant-radius helix without waves.
//!
//! [`path_sampler`] picks the implementation for a parameter snapshot.
//! Radial math runs in millimetres; `z` is computed directly in inches so it
//! is exactly `height * t`.

use std::f64::consts::{PI, TAU};

use super::params::{INCH_TO_MM, MM_TO_INCH, NOZZLE_DIAMETER_MM, PathStrategy, ShapeParameters};
use super::{Point3, Vec2};

/// Produces the ordered centerline of one strand.
pub trait CurveSampler {
    /// Number of path segments; a path has `steps() + 1` points.
    fn steps(&self) -> usize;

    /// Path point at `t` for strand `strand` of `strand_count`.
    fn point_at(&self, t: f64, strand: usize, strand_count: usize) -> Point3;

    fn sample_path(&self, strand: usize, strand_count: usize) -> Vec<Point3> {
        let steps = self.steps().max(1);
        (0..=steps)
            .map(|i| {
                let t = i as f64 / steps as f64;
                self.point_at(t, strand, strand_count)
            })
            .collect()
    }
}

#[must_use]
pub fn path_sampler(params: &ShapeParameters) -> Box<dyn CurveSampler + Send + Sync> {
    match (params.path_strategy, params.vase_mode) {
        (PathStrategy::SimpleHelix, _) => Box::new(HelixSampler::from_params(params)),
        (PathStrategy::Parametric, true) => Box::new(SpiralSampler::from_params(params)),
        (PathStrategy::Parametric, false) => Box::new(ArtisticSampler::from_params(params)),
    }
}

fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Fraction of a full turn that separates strand `strand` from strand 0.
fn strand_phase(strand: usize, strand_count: usize) -> f64 {
    if strand_count == 0 {
        0.0
    } else {
        strand as f64 / strand_count as f64
    }
}

fn polar_point_mm(radius_mm: f64, angle: f64, z_inches: f64) -> (f64, f64, f64) {
    (radius_mm * angle.cos(), radius_mm * angle.sin(), z_inches)
}

// ─────────────────────────────────────────────────────────────────────────────
// Spiral (vase mode)
// ─────────────────────────────────────────────────────────────────────────────

/// Continuous single-wall spiral.
///
/// The angle grows both with `twist_rate` and with the height in millimetres,
/// so taller objects wind faster. The radial wave is one sine term scaled by
/// the nozzle diameter to stay within printable tolerance.
#[derive(Debug, Clone, PartialEq)]
pub struct SpiralSampler {
    height: f64,
    base_radius: f64,
    top_radius: f64,
    twist_rate: f64,
    flow_freq: f64,
    flow_amplitude: f64,
    /// `None` when smoothing is off.
    smoothing_radius_mm: Option<f64>,
    steps: usize,
}

impl SpiralSampler {
    #[must_use]
    pub fn from_params(params: &ShapeParameters) -> Self {
        let smoothing_radius_mm = params
            .smooth_spiral
            .then(|| params.xy_smoothing / 100.0 * NOZZLE_DIAMETER_MM);
        Self {
            height: params.height,
            base_radius: params.base_radius,
            top_radius: params.top_radius,
            twist_rate: params.twist_rate,
            flow_freq: params.flow_freq,
            flow_amplitude: params.flow_amplitude,
            smoothing_radius_mm,
            steps: params.path_steps(),
        }
    }

    fn height_mm(&self) -> f64 {
        self.height * INCH_TO_MM
    }

    #[must_use]
    pub fn angle_at(&self, t: f64) -> f64 {
        t * (TAU * self.twist_rate) + self.height_mm() * t * TAU
    }

    /// Offset that damps jitter between adjacent turns.
    ///
    /// Evaluates the unit circle at `angle − δ`, `angle`, `angle + δ` with
    /// `δ = 2π / height_mm` and scales the outer chord by `radius` over the
    /// length of the first half-chord.
    #[must_use]
    pub fn smoothing_offset(&self, angle: f64, radius: f64) -> Vec2 {
        let height_mm = self.height_mm();
        if height_mm <= 0.0 {
            return Vec2::default();
        }
        let step = TAU / height_mm;
        let prev = Vec2::new((angle - step).cos(), (angle - step).sin());
        let here = Vec2::new(angle.cos(), angle.sin());
        let next = Vec2::new((angle + step).cos(), (angle + step).sin());

        let dist = prev.distance_to(here);
        if !dist.is_finite() || dist <= 0.0 {
            return Vec2::default();
        }
        Vec2::new(
            (next.x - prev.x) * radius / dist,
            (next.y - prev.y) * radius / dist,
        )
    }
}

impl CurveSampler for SpiralSampler {
    fn steps(&self) -> usize {
        self.steps
    }

    fn point_at(&self, t: f64, _strand: usize, _strand_count: usize) -> Point3 {
        let angle = self.angle_at(t);
        let radius = lerp(self.base_radius, self.top_radius, t) * INCH_TO_MM;

        let wave = (angle * self.flow_freq + t * TAU).sin();
        let variation = self.flow_amplitude * wave * NOZZLE_DIAMETER_MM;

        let (mut x, mut y, z) = polar_point_mm(radius + variation, angle, self.height * t);

        if let Some(smoothing) = self.smoothing_radius_mm {
            let offset = self.smoothing_offset(angle, smoothing);
            x += offset.x;
            y += offset.y;
        }

        Point3::new(x * MM_TO_INCH, y * MM_TO_INCH, z)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Artistic (multi-strand)
// ─────────────────────────────────────────────────────────────────────────────

/// Strands spaced evenly around the circle, each carrying two wave terms
/// windowed so the variation tapers towards the base and the top.
#[derive(Debug, Clone, PartialEq)]
pub struct ArtisticSampler {
    height: f64,
    base_radius: f64,
    top_radius: f64,
    twist_rate: f64,
    flow_freq: f64,
    flow_amplitude: f64,
    height_freq: f64,
    steps: usize,
}

impl ArtisticSampler {
    #[must_use]
    pub fn from_params(params: &ShapeParameters) -> Self {
        Self {
            height: params.height,
            base_radius: params.base_radius,
            top_radius: params.top_radius,
            twist_rate: params.twist_rate,
            flow_freq: params.flow_freq,
            flow_amplitude: params.flow_amplitude,
            height_freq: params.height_freq,
            steps: params.path_steps(),
        }
    }

    #[must_use]
    pub fn angle_at(&self, t: f64, strand: usize, strand_count: usize) -> f64 {
        TAU * (t * self.twist_rate + strand_phase(strand, strand_count))
    }

    /// Radial variation in millimetres.
    #[must_use]
    pub fn variation_mm(&self, t: f64, angle: f64) -> f64 {
        let wave1 = (angle * self.flow_freq + t * TAU).sin();
        let wave2 = (2.0 * angle * self.flow_freq + t * PI * 3.0).sin();
        let height_var = (t * PI * self.height_freq).sin();

        let envelope1 = 0.5 + 0.5 * height_var;
        let envelope2 = 0.3 * (4.0 * t * (1.0 - t));

        self.flow_amplitude * INCH_TO_MM * (wave1 * envelope1 + wave2 * envelope2)
    }
}

impl CurveSampler for ArtisticSampler {
    fn steps(&self) -> usize {
        self.steps
    }

    fn point_at(&self, t: f64, strand: usize, strand_count: usize) -> Point3 {
        let angle = self.angle_at(t, strand, strand_count);
        let radius = lerp(self.base_radius, self.top_radius, t) * INCH_TO_MM;
        let variation = self.variation_mm(t, angle);

        let (x, y, z) = polar_point_mm(radius + variation, angle, self.height * t);
        Point3::new(x * MM_TO_INCH, y * MM_TO_INCH, z)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Simple helix
// ─────────────────────────────────────────────────────────────────────────────

/// Fixed helix: radius `base_radius`, `twist_rate` turns over the height.
#[derive(Debug, Clone, PartialEq)]
pub struct HelixSampler {
    radius: f64,
    height: f64,
    turns: f64,
    steps: usize,
}

impl HelixSampler {
    #[must_use]
    pub fn new(radius: f64, height: f64, turns: f64, steps: usize) -> Self {
        Self { radius, height, turns, steps }
    }

    #[must_use]
    pub fn from_params(params: &ShapeParameters) -> Self {
        Self::new(params.base_radius, params.height, params.twist_rate, params.path_steps())
    }
}

impl CurveSampler for HelixSampler {
    fn steps(&self) -> usize {
        self.steps
    }

    fn point_at(&self, t: f64, strand: usize, strand_count: usize) -> Point3 {
        let angle = TAU * (self.turns * t + strand_phase(strand, strand_count));
        Point3::new(
            self.radius * angle.cos(),
            self.radius * angle.sin(),
            self.height * t,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strand_phase_handles_zero_count() {
        assert_eq!(strand_phase(3, 0), 0.0);
        assert_eq!(strand_phase(1, 4), 0.25);
    }

    #[test]
    fn sampler_selection_follows_mode_and_strategy() {
        let artistic = ShapeParameters::default();
        assert_eq!(path_sampler(&artistic).steps(), 50);

        let vase = ShapeParameters { vase_mode: true, ..Default::default() };
        assert_eq!(path_sampler(&vase).steps(), 200);

        let helix = ShapeParameters {
            path_strategy: PathStrategy::SimpleHelix,
            twist_rate: 1.0,
            ..Default::default()
        };
        let sampler = path_sampler(&helix);
        let quarter = sampler.point_at(0.25, 0, 1);
        assert!(quarter.x.abs() < 1e-12);
        assert!((quarter.y - 2.5).abs() < 1e-12);
    }

    #[test]
    fn smoothing_offset_is_tangential() {
        let params = ShapeParameters {
            vase_mode: true,
            smooth_spiral: true,
            ..Default::default()
        };
        let sampler = SpiralSampler::from_params(&params);
        let angle = 0.7;
        let offset = sampler.smoothing_offset(angle, 0.8);
        // The ±δ chord is perpendicular to the radius at `angle`.
        let radial = Vec2::new(angle.cos(), angle.sin());
        let dot = offset.x * radial.x + offset.y * radial.y;
        assert!(dot.abs() < 1e-9);
        // |next − prev| / |here − prev| ≈ 2 for small δ.
        assert!((offset.length() - 1.6).abs() < 1e-3);
    }
}
