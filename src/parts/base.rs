//! Base profile feet, one per occupied cell.

use crate::constants::{BASE_HEIGHT, BASE_STRAIGHT, BASE_TAPER_BOTTOM, BASE_TAPER_TOP, PITCH};
use crate::geom::{GeomMesh, Point2, Vec3};
use crate::grid::Grid;
use crate::options::ModelOptions;
use crate::sketch::GridSketch;

use super::{Part, PartError};

#[derive(Debug, Clone, PartialEq)]
pub struct Base {
    grid: Grid,
}

impl Base {
    #[must_use]
    pub fn new(grid: &Grid) -> Self {
        Self { grid: grid.clone() }
    }

    #[must_use]
    pub fn height() -> f64 {
        BASE_HEIGHT
    }

    /// (inward offset from the cell outline, z), bottom up.
    #[must_use]
    pub fn profile() -> [Point2; 4] {
        let straight_bottom = BASE_TAPER_BOTTOM;
        let straight_top = straight_bottom + BASE_STRAIGHT;
        [
            Point2::new(BASE_TAPER_TOP + BASE_TAPER_BOTTOM, 0.0),
            Point2::new(BASE_TAPER_TOP, straight_bottom),
            Point2::new(BASE_TAPER_TOP, straight_top),
            Point2::new(0.0, BASE_HEIGHT),
        ]
    }

    /// One foot at the origin.
    pub fn cell(options: &ModelOptions) -> Result<GeomMesh, PartError> {
        let sketch = GridSketch::for_cell()?;
        let (mesh, diagnostics) =
            sketch.loft_profile(&Self::profile(), options.arc_segments, options.tolerance)?;
        log::debug!("base cell: {}", diagnostics.summary());
        Ok(mesh)
    }
}

impl Part for Base {
    fn name(&self) -> &'static str {
        "base"
    }

    /// Feet are disjoint, so the copies are concatenated rather than unioned.
    fn mesh(&self, options: &ModelOptions) -> Result<GeomMesh, PartError> {
        let cell = Self::cell(options)?;
        let copies: Vec<GeomMesh> = self
            .grid
            .centered_locations(PITCH)
            .into_iter()
            .map(|p| cell.translated(Vec3::new(p.x, p.y, 0.0)))
            .collect();
        log::debug!("base: {} cells", copies.len());
        Ok(GeomMesh::merged(&copies))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::mesh_diagnostics;

    #[test]
    fn profile_descends_in_forty_five_degree_steps() {
        let p = Base::profile();
        assert!((p[0].x - 2.95).abs() < 1e-12);
        assert!((p[0].x - p[1].x - (p[1].y - p[0].y)).abs() < 1e-12);
        assert!((p[2].x - p[3].x - (p[3].y - p[2].y)).abs() < 1e-12);
        assert!((p[3].y - 4.75).abs() < 1e-12);
    }

    #[test]
    fn base_places_one_closed_foot_per_cell() {
        let options = ModelOptions::new(2);
        let grid = Grid::parse("##/#.").unwrap();
        let cell = Base::cell(&options).unwrap();
        let mesh = Base::new(&grid).mesh(&options).unwrap();

        assert!(mesh_diagnostics(&cell).is_valid_solid());
        assert!((mesh.volume() - 3.0 * cell.volume()).abs() < 1e-6);

        let bbox = mesh.bbox().unwrap();
        assert!((bbox.max.z - 4.75).abs() < 1e-9);
        assert!(bbox.min.z.abs() < 1e-9);
        assert!((bbox.min.x + 41.75).abs() < 1e-9);
        assert!((bbox.max.x - 41.75).abs() < 1e-9);
    }
}
