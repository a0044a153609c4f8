//! Stacking lip swept around the bin outline.

use crate::constants::{
    LIP_HEIGHT, LIP_STRAIGHT, LIP_SUPPORT_STRAIGHT, LIP_SUPPORT_TAPER, LIP_TAPER_BOTTOM,
    LIP_TAPER_TOP, LIP_TOP_FILLET, OUTLINE_INSET,
};
use crate::geom::{GeomMesh, Point2, Tolerance, fillet_section_corners};
use crate::grid::Grid;
use crate::options::ModelOptions;
use crate::sketch::GridSketch;

use super::{Part, PartError};

/// Index of the knife edge at the top of the section.
const KNIFE: usize = 1;

#[derive(Debug, Clone, PartialEq)]
pub struct StackingLip {
    grid: Grid,
    with_support: bool,
}

impl StackingLip {
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        Self {
            grid: grid.clone(),
            with_support: false,
        }
    }

    /// Extend the section below the lip base with a 45° return to the
    /// outer wall, so the lip prints without a bin underneath (lids).
    #[must_use]
    pub fn with_support(mut self, with_support: bool) -> Self {
        self.with_support = with_support;
        self
    }

    /// Closed (inward offset, z) section, clockwise, knife edge rounded.
    pub fn section(
        with_support: bool,
        segments: usize,
        tol: Tolerance,
    ) -> Result<Vec<Point2>, PartError> {
        let inner_top = LIP_HEIGHT - LIP_TAPER_TOP;
        let foot = LIP_TAPER_TOP + LIP_TAPER_BOTTOM;
        let bottom = if with_support {
            -(LIP_SUPPORT_STRAIGHT + LIP_SUPPORT_TAPER)
        } else {
            0.0
        };
        let mut section = vec![
            Point2::new(0.0, bottom),
            Point2::new(0.0, LIP_HEIGHT),
            Point2::new(LIP_TAPER_TOP, inner_top),
            Point2::new(LIP_TAPER_TOP, inner_top - LIP_STRAIGHT),
            Point2::new(foot, 0.0),
        ];
        if with_support {
            section.push(Point2::new(foot, -LIP_SUPPORT_STRAIGHT));
        }
        Ok(fillet_section_corners(&section, &[KNIFE], LIP_TOP_FILLET, segments, tol)?)
    }
}

impl Part for StackingLip {
    fn name(&self) -> &'static str {
        "stacking lip"
    }

    /// The lip with its base at z = 0.
    fn mesh(&self, options: &ModelOptions) -> Result<GeomMesh, PartError> {
        let sketch = GridSketch::new(&self.grid, OUTLINE_INSET)?;
        let section = Self::section(self.with_support, options.arc_segments, options.tolerance)?;
        let (mesh, diagnostics) =
            sketch.sweep_section(&section, options.arc_segments, options.tolerance)?;
        log::debug!("stacking lip (support: {}): {}", self.with_support, diagnostics.summary());
        Ok(mesh)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{mesh_diagnostics, signed_area_2d};

    #[test]
    fn section_is_clockwise_and_rounded() {
        let section = StackingLip::section(false, 4, Tolerance::WELD).unwrap();
        assert!(signed_area_2d(&section) < 0.0);
        assert_eq!(section.len(), 5 - 1 + 5);
        let top = section.iter().map(|p| p.y).fold(f64::MIN, f64::max);
        // A 45° knife loses most of its tip to the fillet.
        assert!(top < LIP_HEIGHT - LIP_TOP_FILLET && top > 3.0);

        let supported = StackingLip::section(true, 4, Tolerance::WELD).unwrap();
        let bottom = supported.iter().map(|p| p.y).fold(f64::MAX, f64::min);
        assert!((bottom + 3.8).abs() < 1e-12);
    }

    #[test]
    fn lip_is_a_closed_ring() {
        let grid = Grid::filled(1, 1).unwrap();
        let mesh = StackingLip::new(&grid).mesh(&ModelOptions::new(2)).unwrap();
        let diagnostics = mesh_diagnostics(&mesh);
        assert!(diagnostics.is_valid_solid(), "{diagnostics}");
        assert!(mesh.volume() > 0.0);

        let bbox = mesh.bbox().unwrap();
        assert!((bbox.max.x - 20.75).abs() < 1e-9);
        assert!(bbox.min.z.abs() < 1e-9);
        assert!(bbox.max.z < LIP_HEIGHT);

        // Cross-section area times a rough perimeter bounds the volume.
        let area = -signed_area_2d(&StackingLip::section(false, 2, Tolerance::WELD).unwrap());
        assert!(mesh.volume() < area * 4.0 * 41.5);
        assert!(mesh.volume() > area * 4.0 * 30.0);
    }
}
