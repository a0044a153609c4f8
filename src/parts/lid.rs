//! Sliding lid: the slot cut into a bin, the cover that slides into it, and
//! the bin/cover pair.

use std::f64::consts::SQRT_2;

use crate::constants::{
    HEIGHT_UNIT, LID_CLICK_OFFSET, LID_CLICK_RADIUS, LID_INSET, LID_RAIL_HEIGHT, LID_SLOT_HEIGHT,
    LID_SLOT_WIDTH, LID_THICKNESS, LID_TOLERANCE, LIP_TAPER_TOP, OUTLINE_INSET,
};
use crate::geom::{BooleanOp, GeomMesh, Point2, Point3, Vec3, extrude_box, extrude_cylinder};
use crate::grid::{Grid, Rect};
use crate::options::ModelOptions;
use crate::sketch::GridSketch;

use super::{Bin, Compartment, Part, PartError, ScoopSide, StackingLip, combine, combine_all};

/// Margin by which cutting boxes and click cylinders overrun the faces they
/// cut.
const OVERRUN: f64 = 1.0;

fn check_thickness(thickness: f64) -> Result<(), PartError> {
    if thickness.is_finite() && thickness > 0.0 {
        Ok(())
    } else {
        Err(PartError::InvalidThickness { thickness })
    }
}

/// Bin outline bounds, shared by the slot and the cover.
fn outline_bounds(grid: &Grid) -> Result<Rect, PartError> {
    Ok(GridSketch::new(grid, OUTLINE_INSET)?.bounds())
}

/// The slab that runs in the lid groove: from `-thickness` up to the lip's
/// bottom taper, with its top edges chamfered.
#[derive(Debug, Clone, PartialEq)]
pub struct InnerLid {
    grid: Grid,
    thickness: f64,
    inset: f64,
    clearance: f64,
}

impl InnerLid {
    #[must_use]
    pub fn new(grid: &Grid, thickness: f64, inset: f64) -> Self {
        Self {
            grid: grid.clone(),
            thickness,
            inset,
            clearance: 0.0,
        }
    }

    /// Shrink every face by `clearance`.
    #[must_use]
    pub fn with_clearance(mut self, clearance: f64) -> Self {
        self.clearance = clearance;
        self
    }

    /// (inward offset, z) profile, bottom up. The chamfer face moves inward
    /// along its own normal, hence the √2 terms.
    #[must_use]
    pub fn profile(&self) -> Vec<Point2> {
        let t = self.clearance;
        let chamfer = LIP_TAPER_TOP - self.inset;
        let top = LID_RAIL_HEIGHT;
        let bottom = Point2::new(t, -self.thickness + t);
        if chamfer <= 0.0 {
            return vec![bottom, Point2::new(t, top - t)];
        }
        let slant = t * (SQRT_2 - 1.0);
        vec![
            bottom,
            Point2::new(t, top - chamfer - slant),
            Point2::new(chamfer + slant, top - t),
        ]
    }

    fn slab(&self, options: &ModelOptions) -> Result<(GeomMesh, Rect), PartError> {
        check_thickness(self.thickness)?;
        if self.clearance < 0.0 || 2.0 * self.clearance >= self.thickness {
            return Err(PartError::InvalidThickness {
                thickness: self.thickness - 2.0 * self.clearance,
            });
        }
        let sketch = GridSketch::new(&self.grid, OUTLINE_INSET + self.inset)?;
        let (mesh, diagnostics) =
            sketch.loft_profile(&self.profile(), options.arc_segments, options.tolerance)?;
        log::debug!("inner lid: {}", diagnostics.summary());
        Ok((mesh, sketch.bounds()))
    }
}

impl Part for InnerLid {
    fn name(&self) -> &'static str {
        "inner lid"
    }

    /// The slab less two click-lock notches on its long edges near -X.
    fn mesh(&self, options: &ModelOptions) -> Result<GeomMesh, PartError> {
        let (slab, bounds) = self.slab(options)?;
        let x = bounds.min.x + LID_CLICK_OFFSET - self.inset;
        let z0 = -self.thickness - OVERRUN;
        let height = self.thickness + LID_RAIL_HEIGHT + 2.0 * OVERRUN;
        let radius = LID_CLICK_RADIUS + self.clearance;
        let clicks = [bounds.min.y, bounds.max.y]
            .into_iter()
            .map(|y| {
                let base = Point3::new(x, y, z0);
                extrude_cylinder(base, radius, height, options.circle_segments(), options.tolerance)
                    .map(|(mesh, _)| mesh)
            })
            .collect::<Result<Vec<_>, _>>()?;
        combine_all(slab, &clicks, BooleanOp::Difference, options)
    }
}

/// The material a sliding lid removes from a bin: the end slot at +X and the
/// groove the inner lid runs in, placed at the bin's top.
#[derive(Debug, Clone, PartialEq)]
pub struct SlidingLidCut {
    grid: Grid,
    bin_height: f64,
    thickness: f64,
    inset: f64,
}

impl SlidingLidCut {
    #[must_use]
    pub fn new(grid: &Grid, bin_height: f64, thickness: f64, inset: f64) -> Self {
        Self {
            grid: grid.clone(),
            bin_height,
            thickness,
            inset,
        }
    }
}

impl Part for SlidingLidCut {
    fn name(&self) -> &'static str {
        "sliding lid cut"
    }

    fn mesh(&self, options: &ModelOptions) -> Result<GeomMesh, PartError> {
        check_thickness(self.thickness)?;
        let b = outline_bounds(&self.grid)?;
        let (slot, _) = extrude_box(
            Point3::new(b.max.x - LID_SLOT_WIDTH, b.min.y - OVERRUN, -self.thickness),
            Point3::new(b.max.x + OVERRUN, b.max.y + OVERRUN, -self.thickness + LID_SLOT_HEIGHT),
            options.tolerance,
        )?;
        let groove = InnerLid::new(&self.grid, self.thickness, self.inset).mesh(options)?;
        let cut = combine(&slot, &groove, BooleanOp::Union, options)?;
        Ok(cut.translated(Vec3::new(0.0, 0.0, self.bin_height)))
    }
}

/// The sliding cover, built with its plate top at z = 0.
///
/// The cover is a plate under the stacking lip profile, kept only where it
/// either forms the end cap at +X or matches the groove with `tolerance`
/// clearance.
#[derive(Debug, Clone, PartialEq)]
pub struct Lid {
    grid: Grid,
    thickness: f64,
    inset: f64,
    tolerance: f64,
}

impl Lid {
    #[must_use]
    pub fn new(grid: &Grid, thickness: f64, inset: f64, tolerance: f64) -> Self {
        Self {
            grid: grid.clone(),
            thickness,
            inset,
            tolerance,
        }
    }
}

impl Part for Lid {
    fn name(&self) -> &'static str {
        "lid"
    }

    fn mesh(&self, options: &ModelOptions) -> Result<GeomMesh, PartError> {
        check_thickness(self.thickness)?;
        let tol = options.tolerance;
        let b = outline_bounds(&self.grid)?;

        let lip = StackingLip::new(&self.grid).with_support(true).mesh(options)?;
        let plate_sketch = GridSketch::new(&self.grid, OUTLINE_INSET + self.inset)?;
        let (plate, _) = plate_sketch.extrude(-self.thickness, 0.0, options.arc_segments, tol)?;
        let shell = combine(&lip, &plate, BooleanOp::Union, options)?;

        let (end_cap, _) = extrude_box(
            Point3::new(
                b.max.x - LID_SLOT_WIDTH + self.tolerance,
                b.min.y - OVERRUN,
                -self.thickness + self.tolerance,
            ),
            Point3::new(b.max.x + OVERRUN, b.max.y + OVERRUN, LID_SLOT_HEIGHT),
            tol,
        )?;
        let slider = InnerLid::new(&self.grid, self.thickness, self.inset)
            .with_clearance(self.tolerance)
            .mesh(options)?;
        let keep = combine(&end_cap, &slider, BooleanOp::Union, options)?;
        combine(&shell, &keep, BooleanOp::Intersection, options)
    }
}

/// A bin whose stacking lip carries a sliding cover.
#[derive(Debug, Clone, PartialEq)]
pub struct SlidingLidBin {
    grid: Grid,
    height: f64,
    div_x: usize,
    div_y: usize,
    scoops: Vec<ScoopSide>,
    thickness: f64,
    inset: f64,
    tolerance: f64,
}

impl SlidingLidBin {
    /// `height` in millimetres.
    #[must_use]
    pub fn new(grid: &Grid, height: f64) -> Self {
        Self {
            grid: grid.clone(),
            height,
            div_x: 1,
            div_y: 1,
            scoops: Vec::new(),
            thickness: LID_THICKNESS,
            inset: LID_INSET,
            tolerance: LID_TOLERANCE,
        }
    }

    #[must_use]
    pub fn with_divisions(mut self, div_x: usize, div_y: usize) -> Self {
        self.div_x = div_x;
        self.div_y = div_y;
        self
    }

    #[must_use]
    pub fn with_scoops(mut self, scoops: impl IntoIterator<Item = ScoopSide>) -> Self {
        self.scoops = scoops.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_lid_thickness(mut self, thickness: f64) -> Self {
        self.thickness = thickness;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.height
    }

    #[must_use]
    pub fn divisions(&self) -> (usize, usize) {
        (self.div_x, self.div_y)
    }

    /// The open bin, before the slot is cut. The compartment stops one
    /// height unit plus the lid thickness below the top and sits under the
    /// lid.
    #[must_use]
    pub fn bin(&self) -> Bin {
        let depth = self.height - HEIGHT_UNIT - self.thickness;
        let compartment = Compartment::subdivided(&self.grid, depth, self.div_x, self.div_y)
            .with_scoops(self.scoops.iter().copied())
            .lowered(self.thickness);
        Bin::new(&self.grid, self.height).with_compartment(compartment)
    }

    #[must_use]
    pub fn cut(&self) -> SlidingLidCut {
        SlidingLidCut::new(&self.grid, self.height, self.thickness, self.inset)
    }

    #[must_use]
    pub fn lid(&self) -> Lid {
        Lid::new(&self.grid, self.thickness, self.inset, self.tolerance)
    }
}

impl Part for SlidingLidBin {
    fn name(&self) -> &'static str {
        "sliding lid bin"
    }

    fn mesh(&self, options: &ModelOptions) -> Result<GeomMesh, PartError> {
        check_thickness(self.thickness)?;
        let bin = self.bin().mesh(options)?;
        let cut = self.cut().mesh(options)?;
        combine(&bin, &cut, BooleanOp::Difference, options)
    }
}

/// Build the slotted bin and its cover, in that order.
pub fn sliding_lid_bin(
    bin: &SlidingLidBin,
    options: &ModelOptions,
) -> Result<(GeomMesh, GeomMesh), PartError> {
    cfg_if::cfg_if! {
        if #[cfg(feature = "parallel")] {
            let (body, cover) = rayon::join(|| bin.mesh(options), || bin.lid().mesh(options));
            Ok((body?, cover?))
        } else {
            Ok((bin.mesh(options)?, bin.lid().mesh(options)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{PointContainment, Tolerance, classify_point, mesh_diagnostics};

    fn options() -> ModelOptions {
        ModelOptions::new(2)
    }

    fn containment(mesh: &GeomMesh, x: f64, y: f64, z: f64) -> PointContainment {
        classify_point(Point3::new(x, y, z), mesh, Tolerance::LOOSE)
    }

    #[test]
    fn inner_lid_profile_shrinks_with_clearance() {
        let grid = Grid::filled(1, 1).unwrap();
        let lid = InnerLid::new(&grid, LID_THICKNESS, LID_INSET);
        let p = lid.profile();
        assert_eq!(p.len(), 3);
        assert!((p[1].y - (-0.2)).abs() < 1e-12);
        assert!((p[2].x - 0.9).abs() < 1e-12);

        let shrunk = lid.clone().with_clearance(0.1).profile();
        assert!((shrunk[0].y - (-LID_THICKNESS + 0.1)).abs() < 1e-12);
        assert!((shrunk[2].y - (LID_RAIL_HEIGHT - 0.1)).abs() < 1e-12);
        // Chamfer face stays parallel: same slope, moved 0.1 along its normal.
        let (a, b) = (shrunk[1], shrunk[2]);
        assert!(((b.y - a.y) - (b.x - a.x)).abs() < 1e-12);
        let distance = ((a.x - a.y) - (p[1].x - p[1].y)) / SQRT_2;
        assert!((distance - 0.1).abs() < 1e-12);

        let wide = InnerLid::new(&grid, LID_THICKNESS, 2.0);
        assert_eq!(wide.profile().len(), 2);
    }

    #[test]
    fn inner_lid_has_click_notches() {
        let grid = Grid::filled(1, 1).unwrap();
        let mesh = InnerLid::new(&grid, LID_THICKNESS, LID_INSET).mesh(&options()).unwrap();
        assert!(mesh_diagnostics(&mesh).is_valid_solid());

        // Inner lid outline spans ±19.75; notches sit 6 from its -X end.
        let x = -19.75 + LID_CLICK_OFFSET - LID_INSET;
        assert_eq!(containment(&mesh, x, 19.6, -0.3), PointContainment::Outside);
        assert_eq!(containment(&mesh, x + 2.0, 19.6, -0.3), PointContainment::Inside);
    }

    #[test]
    fn invalid_thickness_is_rejected() {
        let grid = Grid::filled(1, 1).unwrap();
        let err = InnerLid::new(&grid, 0.0, LID_INSET).mesh(&options()).unwrap_err();
        assert!(matches!(err, PartError::InvalidThickness { .. }));
        let err = InnerLid::new(&grid, 0.8, LID_INSET)
            .with_clearance(0.5)
            .mesh(&options())
            .unwrap_err();
        assert!(matches!(err, PartError::InvalidThickness { .. }));
    }

    #[test]
    fn slot_cut_sits_at_the_bin_top() {
        let grid = Grid::filled(1, 1).unwrap();
        let cut = SlidingLidCut::new(&grid, 21.0, LID_THICKNESS, LID_INSET)
            .mesh(&options())
            .unwrap();
        let bbox = cut.bbox().unwrap();
        assert!((bbox.min.z - (21.0 - LID_THICKNESS)).abs() < 1e-9);
        assert!((bbox.max.z - (21.0 - LID_THICKNESS + LID_SLOT_HEIGHT)).abs() < 1e-9);
        assert!((bbox.max.x - (20.75 + OVERRUN)).abs() < 1e-9);
    }

    #[test]
    fn cover_has_an_end_cap_and_a_slider() {
        let grid = Grid::filled(1, 1).unwrap();
        let lid = Lid::new(&grid, LID_THICKNESS, LID_INSET, LID_TOLERANCE)
            .mesh(&options())
            .unwrap();
        assert!(mesh_diagnostics(&lid).is_valid_solid());

        let bbox = lid.bbox().unwrap();
        assert!((bbox.min.z - (-LID_THICKNESS + LID_TOLERANCE)).abs() < 1e-9);
        assert!(bbox.max.z < 4.4 + 1e-9);
        assert!((bbox.max.x - 20.75).abs() < 1e-9);

        // Plate in the middle, lip only at the +X end.
        assert_eq!(containment(&lid, 0.0, 0.0, -0.3), PointContainment::Inside);
        assert_eq!(containment(&lid, 20.4, 0.0, 3.0), PointContainment::Inside);
        assert_eq!(containment(&lid, -20.4, 0.0, 3.0), PointContainment::Outside);
    }
}
