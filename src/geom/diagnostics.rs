//! Diagnostics returned next to every generated vase mesh.
//!
//! Nothing here validates or repairs the surface; the counts describe what
//! the assembler did (strands, rings, frame fallbacks, cap triangles) so that
//! callers and logs can tell a clean run from one that needed fallbacks.

use std::fmt;

use serde::Serialize;

use super::metrics::GeomTimingReport;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct VaseMeshDiagnostics {
    pub vertex_count: usize,
    pub triangle_count: usize,

    pub strand_count: usize,
    /// Rings emitted per strand (equals the path sample count).
    pub rings_per_strand: usize,
    pub points_per_profile: usize,

    /// Segments whose tangent ran parallel to world up and used world X.
    pub fallback_frame_count: usize,

    /// Zero-length segments that borrowed a neighbouring frame.
    pub degenerate_segment_count: usize,

    pub cap_triangle_count: usize,

    /// Only populated with the `mesh_metrics` feature on native targets.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timing: Option<GeomTimingReport>,

    pub warnings: Vec<String>,
}

impl VaseMeshDiagnostics {
    /// No fallbacks were needed and no warnings were recorded.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.fallback_frame_count == 0
            && self.degenerate_segment_count == 0
            && self.warnings.is_empty()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// Format: `"V:{vertices} T:{triangles} S:{strands} [issues...]"`
    #[must_use]
    pub fn summary(&self) -> String {
        let mut parts = vec![format!(
            "V:{} T:{} S:{}",
            self.vertex_count, self.triangle_count, self.strand_count
        )];

        if self.fallback_frame_count > 0 {
            parts.push(format!("fallback-frames:{}", self.fallback_frame_count));
        }
        if self.degenerate_segment_count > 0 {
            parts.push(format!("degenerate:{}", self.degenerate_segment_count));
        }
        if self.cap_triangle_count > 0 {
            parts.push(format!("cap:{}", self.cap_triangle_count));
        }

        parts.join(" ")
    }
}

impl fmt::Display for VaseMeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Vase Mesh Diagnostics:")?;
        writeln!(f, "  Vertices: {}", self.vertex_count)?;
        writeln!(f, "  Triangles: {}", self.triangle_count)?;
        writeln!(
            f,
            "  Strands: {} x {} rings x {} profile points",
            self.strand_count, self.rings_per_strand, self.points_per_profile
        )?;

        if self.fallback_frame_count > 0 {
            writeln!(f, "  Fallback frames: {}", self.fallback_frame_count)?;
        }
        if self.degenerate_segment_count > 0 {
            writeln!(f, "  Degenerate segments: {}", self.degenerate_segment_count)?;
        }
        if self.cap_triangle_count > 0 {
            writeln!(f, "  Cap triangles: {}", self.cap_triangle_count)?;
        }

        if !self.warnings.is_empty() {
            writeln!(f, "  Warnings:")?;
            for warning in &self.warnings {
                writeln!(f, "    - {warning}")?;
            }
        }

        if let Some(ref timing) = self.timing {
            writeln!(f, "  Timing: {} ms total", timing.total_ms())?;
        }

        let status = if self.is_clean() { "CLEAN" } else { "FALLBACKS USED" };
        writeln!(f, "  Status: {status}")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_clean() {
        let diag = VaseMeshDiagnostics::default();
        assert!(diag.is_clean());
        assert!(!diag.has_warnings());
    }

    #[test]
    fn test_fallbacks_are_not_clean() {
        let diag = VaseMeshDiagnostics {
            fallback_frame_count: 2,
            ..Default::default()
        };
        assert!(!diag.is_clean());
        assert!(diag.summary().contains("fallback-frames:2"));
    }

    #[test]
    fn test_display() {
        let diag = VaseMeshDiagnostics {
            vertex_count: 17,
            triangle_count: 4,
            strand_count: 1,
            cap_triangle_count: 4,
            warnings: vec!["test warning".to_string()],
            ..Default::default()
        };

        let output = format!("{diag}");
        assert!(output.contains("Vertices: 17"));
        assert!(output.contains("Cap triangles: 4"));
        assert!(output.contains("test warning"));
        assert!(output.contains("FALLBACKS USED"));
    }
}
