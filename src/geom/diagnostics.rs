//! Repair and topology counters reported alongside every kernel mesh.
//!
//! Part builders log [`GeomMeshDiagnostics::summary`] at debug level and the
//! CLI `info` command prints it, so a bin with open edges or non-manifold
//! seams shows up before it reaches a slicer.

use std::fmt;

/// What [`finalize_mesh`](super::mesh) had to repair, and what it could not.
///
/// Boolean output may keep T-junctions along coplanar seams. Those count as
/// open edges even though the solid does not leak.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct GeomMeshDiagnostics {
    pub vertex_count: usize,
    pub triangle_count: usize,
    /// Vertices merged by tolerance welding.
    pub welded_vertex_count: usize,
    /// Triangles re-wound to agree with their neighbours.
    pub flipped_triangle_count: usize,
    /// Zero-area triangles dropped.
    pub degenerate_triangle_count: usize,
    /// Edges used by exactly one triangle.
    pub open_edge_count: usize,
    /// Edges used by three or more triangles.
    pub non_manifold_edge_count: usize,
    pub warnings: Vec<String>,
}

impl GeomMeshDiagnostics {
    #[must_use]
    pub fn is_watertight(&self) -> bool {
        self.open_edge_count == 0
    }

    #[must_use]
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }

    /// Closed two-manifold: safe to export for printing.
    #[must_use]
    pub fn is_valid_solid(&self) -> bool {
        self.is_watertight() && self.is_manifold()
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }

    /// One line, e.g. `V:8 T:12 welded:4`; zero repair and issue counts are
    /// left out.
    #[must_use]
    pub fn summary(&self) -> String {
        let counters = [
            ("welded", self.welded_vertex_count),
            ("flipped", self.flipped_triangle_count),
            ("degenerate", self.degenerate_triangle_count),
            ("open", self.open_edge_count),
            ("non-manifold", self.non_manifold_edge_count),
        ];
        let mut line = format!("V:{} T:{}", self.vertex_count, self.triangle_count);
        for (label, count) in counters.into_iter().filter(|&(_, count)| count > 0) {
            line.push_str(&format!(" {label}:{count}"));
        }
        line
    }
}

impl fmt::Display for GeomMeshDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = if self.is_valid_solid() { "solid" } else { "not a closed solid" };
        write!(f, "{} ({state})", self.summary())?;
        for warning in &self.warnings {
            write!(f, "\n  warning: {warning}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summary_skips_zero_counters() {
        let diag = GeomMeshDiagnostics {
            vertex_count: 8,
            triangle_count: 12,
            open_edge_count: 2,
            ..Default::default()
        };
        assert_eq!(diag.summary(), "V:8 T:12 open:2");
        assert!(!diag.is_watertight());
        assert!(diag.is_manifold());
        assert!(!diag.is_valid_solid());
    }

    #[test]
    fn display_lists_warnings_under_the_summary() {
        let mut diag = GeomMeshDiagnostics {
            vertex_count: 4,
            triangle_count: 4,
            welded_vertex_count: 2,
            ..Default::default()
        };
        diag.add_warning("mesh orientation flipped (outward)");
        assert!(diag.has_warnings());
        assert_eq!(
            diag.to_string(),
            "V:4 T:4 welded:2 (solid)\n  warning: mesh orientation flipped (outward)"
        );
    }
}
