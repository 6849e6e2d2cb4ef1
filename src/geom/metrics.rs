//! Opt-in timing hooks for vase generation.
//!
//! Timing is only collected when the `mesh_metrics` feature is enabled and
//! the target is not WASM (`std::time::Instant` is unavailable there). In
//! every other build the calls compile down to plain closure invocations.
//!
//! ```ignore
//! let mut metrics = GeomMetrics::default();
//! metrics.begin();
//! let path = metrics.time(TimingBucket::PathSampling, || sampler.sample_path(0, 1));
//! if let Some(report) = metrics.end() {
//!     println!("path sampling: {} ns", report.path_sampling_ns);
//! }
//! ```

use serde::Serialize;

/// Phases of one `assemble` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Centerline sampling for all strands.
    PathSampling,
    /// Cross-section sampling and ring-size checks.
    ProfileSampling,
    /// Local frame computation.
    Framing,
    /// Placing ring vertices and normals in world space.
    RingPlacement,
    /// Emitting side triangles between rings.
    Triangulation,
    /// Base cap geometry.
    Capping,
}

/// Cumulative nanoseconds per bucket.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct GeomTimingReport {
    pub path_sampling_ns: u64,
    pub profile_sampling_ns: u64,
    pub framing_ns: u64,
    pub ring_placement_ns: u64,
    pub triangulation_ns: u64,
    pub capping_ns: u64,
}

impl GeomTimingReport {
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.path_sampling_ns
            .saturating_add(self.profile_sampling_ns)
            .saturating_add(self.framing_ns)
            .saturating_add(self.ring_placement_ns)
            .saturating_add(self.triangulation_ns)
            .saturating_add(self.capping_ns)
    }

    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing one generation run.
///
/// When the `mesh_metrics` feature is disabled (or on WASM), all methods are
/// no-ops and [`end`](Self::end) returns `None`.
#[derive(Debug, Default)]
pub struct GeomMetrics {
    #[cfg(all(feature = "mesh_metrics", not(target_arch = "wasm32")))]
    report: GeomTimingReport,
}

impl GeomMetrics {
    pub fn begin(&mut self) {
        #[cfg(all(feature = "mesh_metrics", not(target_arch = "wasm32")))]
        {
            self.report = GeomTimingReport::default();
        }
    }

    #[must_use]
    pub fn end(&self) -> Option<GeomTimingReport> {
        #[cfg(all(feature = "mesh_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "mesh_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Runs `f` and adds its elapsed time to `bucket`.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "mesh_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let nanos = start.elapsed().as_nanos().min(u128::from(u64::MAX)) as u64;
            self.add_to_bucket(bucket, nanos);
            result
        }

        #[cfg(not(all(feature = "mesh_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg(all(feature = "mesh_metrics", not(target_arch = "wasm32")))]
    fn add_to_bucket(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::PathSampling => &mut self.report.path_sampling_ns,
            TimingBucket::ProfileSampling => &mut self.report.profile_sampling_ns,
            TimingBucket::Framing => &mut self.report.framing_ns,
            TimingBucket::RingPlacement => &mut self.report.ring_placement_ns,
            TimingBucket::Triangulation => &mut self.report.triangulation_ns,
            TimingBucket::Capping => &mut self.report.capping_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}
