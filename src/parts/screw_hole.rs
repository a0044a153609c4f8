//! Magnet and screw holes under each cell.

use std::f64::consts::{PI, TAU};

use crate::constants::{
    PITCH, SCREW_BRIDGE_HEIGHT, SCREW_BRIDGE_WIDTH, SCREW_COUNTERBORE_DEPTH,
    SCREW_COUNTERBORE_RADIUS, SCREW_HOLE_DEPTH, SCREW_HOLE_RADIUS, SCREW_SPACING,
};
use crate::geom::{BooleanOp, GeomMesh, Point2, Point3, Vec3, extrude_cylinder, extrude_outline_z};
use crate::grid::Grid;
use crate::options::ModelOptions;

use super::{Part, PartError, combine_all};

/// Counterbored hole, opening downwards from z = 0.
///
/// The printable variant adds a thin layer clipped to the through-hole width
/// on top of the counterbore, so the hole can be bridged without supports.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrewHole {
    printable: bool,
    below: f64,
}

impl Default for ScrewHole {
    fn default() -> Self {
        Self::new(true)
    }
}

impl ScrewHole {
    #[must_use]
    pub fn new(printable: bool) -> Self {
        Self { printable, below: 0.0 }
    }

    /// Start every piece `depth` below z = 0, for cutting through a bottom face.
    #[must_use]
    pub fn extended_below(mut self, depth: f64) -> Self {
        self.below = depth.max(0.0);
        self
    }

    #[must_use]
    pub fn is_printable(&self) -> bool {
        self.printable
    }

    /// Counterbore circle clipped to the bridge strip, counter-clockwise.
    fn bridge_outline(segments: usize) -> Vec<Point2> {
        let r = SCREW_COUNTERBORE_RADIUS;
        let half = (SCREW_BRIDGE_WIDTH / 2.0).min(r);
        let a = (half / r).asin();
        let n = ((segments as f64 * 2.0 * a / TAU).ceil() as usize).max(2);
        let arc = |from: f64| (0..=n).map(move |i| from + 2.0 * a * i as f64 / n as f64);
        arc(-a)
            .chain(arc(PI - a))
            .map(|t| Point2::new(r * t.cos(), r * t.sin()))
            .collect()
    }

    /// Holes at (±13, ±13) around every cell centre.
    pub fn pattern(&self, grid: &Grid, options: &ModelOptions) -> Result<GeomMesh, PartError> {
        let hole = self.mesh(options)?;
        let d = SCREW_SPACING / 2.0;
        let copies: Vec<GeomMesh> = grid
            .centered_locations(PITCH)
            .into_iter()
            .flat_map(|c| {
                [(-d, -d), (d, -d), (-d, d), (d, d)].map(|(dx, dy)| Point2::new(c.x + dx, c.y + dy))
            })
            .map(|p| hole.translated(Vec3::new(p.x, p.y, 0.0)))
            .collect();
        log::debug!("screw holes: {} holes", copies.len());
        Ok(GeomMesh::merged(&copies))
    }
}

impl Part for ScrewHole {
    fn name(&self) -> &'static str {
        "screw hole"
    }

    fn mesh(&self, options: &ModelOptions) -> Result<GeomMesh, PartError> {
        let segments = options.circle_segments();
        let tol = options.tolerance;
        let z0 = -self.below;
        let base = Point3::new(0.0, 0.0, z0);

        let (counterbore, _) = extrude_cylinder(
            base,
            SCREW_COUNTERBORE_RADIUS,
            SCREW_COUNTERBORE_DEPTH - z0,
            segments,
            tol,
        )?;
        let (through, _) =
            extrude_cylinder(base, SCREW_HOLE_RADIUS, SCREW_HOLE_DEPTH - z0, segments, tol)?;
        let mut pieces = vec![through];
        if self.printable {
            let (bridge, _) =
                extrude_outline_z(&Self::bridge_outline(segments), z0, SCREW_BRIDGE_HEIGHT, tol)?;
            pieces.push(bridge);
        }
        combine_all(counterbore, &pieces, BooleanOp::Union, options)
    }
}

/// Standalone plate of printable holes for `grid`.
pub fn screw_holes(grid: &Grid, options: &ModelOptions) -> Result<GeomMesh, PartError> {
    ScrewHole::new(true).pattern(grid, options)
}
