//! Compartment cutters.
//!
//! A compartment is the negative of a bin's interior: pockets separated by
//! divider walls, optionally with divider notches, a label shelf and finger
//! scoops. The cutter's top sits at z = 0 and it reaches `depth` below. It
//! also extends [`CUTTER_OVERSHOOT`] above its top so that it never shares
//! the bin's top face.

use std::f64::consts::FRAC_PI_2;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::{
    CUTOUT_CLEARANCE, CUTOUT_FILLET, CUTOUT_FLOOR_MARGIN, DIVIDER_THICKNESS, DIVIDER_TOP_FILLET,
    LABEL_FLOOR_MARGIN, LABEL_SLOPE, LABEL_TIP_FILLET, LABEL_WIDTH, MIN_POCKET_WIDTH, OUTLINE_INSET,
    PITCH, SCOOP_LIP_COMPENSATION, SCOOP_RADIUS, WALL_THICKNESS, corner_radius,
};
use crate::geom::{
    BooleanOp, ExtrusionCaps, GeomMesh, LoftCaps, LoftStation, Point2, Point3, Tolerance, Vec3,
    extrude_polyline, fillet_section_corners, loft_stations,
};
use crate::grid::{CellRegion, Grid, Rect};
use crate::options::ModelOptions;
use crate::sketch::{GridSketch, SketchEdge};

use super::{Part, PartError, combine, combine_all, try_map};

/// Height of the cutter above its nominal top.
pub const CUTTER_OVERSHOOT: f64 = 1.0;
/// How far label and scoop cuts run past the cavity.
const OVERRUN: f64 = 1.0;
const EPS: f64 = 1e-6;

/// Cavity side for a finger scoop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoopSide {
    /// −Y
    Front,
    /// +Y
    Back,
    /// −X
    Left,
    /// +X
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown scoop side '{0}', expected front, back, left or right")]
pub struct UnknownScoopSide(pub String);

impl FromStr for ScoopSide {
    type Err = UnknownScoopSide;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "front" => Ok(Self::Front),
            "back" => Ok(Self::Back),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            _ => Err(UnknownScoopSide(s.to_owned())),
        }
    }
}

impl fmt::Display for ScoopSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Front => "front",
            Self::Back => "back",
            Self::Left => "left",
            Self::Right => "right",
        };
        f.write_str(name)
    }
}

/// A subdivided compartment cutter.
#[derive(Debug, Clone, PartialEq)]
pub struct Compartment {
    grid: Grid,
    depth: f64,
    div_x: usize,
    div_y: usize,
    div_cutout: f64,
    label: bool,
    scoops: Vec<ScoopSide>,
    wall_thickness: f64,
    lowered: f64,
}

/// Compartments with dividers are the same type; the name matches the
/// builder call sites that use divisions.
pub type SubdividedCompartment = Compartment;

/// One pocket: its footprint and the coordinates of the divider walls it
/// faces.
#[derive(Debug, Clone)]
struct Pocket {
    region: CellRegion,
    divider_x: [Option<f64>; 2],
    divider_y: [Option<f64>; 2],
}

impl Pocket {
    fn faces_divider(&self, edge: &SketchEdge) -> bool {
        let near = |value: f64, candidates: &[Option<f64>; 2]| {
            candidates.iter().flatten().any(|c| (c - value).abs() <= EPS)
        };
        if edge.is_vertical() {
            near(edge.start.x, &self.divider_x)
        } else {
            near(edge.start.y, &self.divider_y)
        }
    }

    fn has_dividers(&self) -> bool {
        self.divider_x.iter().chain(&self.divider_y).any(Option::is_some)
    }
}

impl Compartment {
    /// Undivided cutter with default wall thickness.
    #[must_use]
    pub fn new(grid: &Grid, depth: f64) -> Self {
        Self::subdivided(grid, depth, 1, 1)
    }

    #[must_use]
    pub fn subdivided(grid: &Grid, depth: f64, div_x: usize, div_y: usize) -> Self {
        Self {
            grid: grid.clone(),
            depth,
            div_x,
            div_y,
            div_cutout: 0.0,
            label: false,
            scoops: Vec::new(),
            wall_thickness: WALL_THICKNESS,
            lowered: 0.0,
        }
    }

    #[must_use]
    pub fn with_wall_thickness(mut self, thickness: f64) -> Self {
        self.wall_thickness = thickness;
        self
    }

    /// Width of the U notch cut into every divider segment.
    #[must_use]
    pub fn with_cutout(mut self, width: f64) -> Self {
        self.div_cutout = width;
        self
    }

    #[must_use]
    pub fn with_label(mut self, label: bool) -> Self {
        self.label = label;
        self
    }

    #[must_use]
    pub fn with_scoops(mut self, sides: impl IntoIterator<Item = ScoopSide>) -> Self {
        for side in sides {
            if !self.scoops.contains(&side) {
                self.scoops.push(side);
            }
        }
        self
    }

    /// Single scoop on the left side.
    #[must_use]
    pub fn with_scoop(self, scoop: bool) -> Self {
        if scoop { self.with_scoops([ScoopSide::Left]) } else { self }
    }

    /// Move the cutter down by `dz`.
    #[must_use]
    pub fn lowered(mut self, dz: f64) -> Self {
        self.lowered += dz;
        self
    }

    #[must_use]
    pub fn depth(&self) -> f64 {
        self.depth
    }

    #[must_use]
    pub fn lowered_by(&self) -> f64 {
        self.lowered
    }

    #[must_use]
    pub fn divisions(&self) -> (usize, usize) {
        (self.div_x, self.div_y)
    }

    #[must_use]
    pub fn scoops(&self) -> &[ScoopSide] {
        &self.scoops
    }

    #[must_use]
    pub fn wall_thickness(&self) -> f64 {
        self.wall_thickness
    }

    pub fn validate(&self) -> Result<(), PartError> {
        if !self.depth.is_finite() || self.depth <= 0.0 {
            return Err(PartError::InvalidDepth { depth: self.depth });
        }
        if !self.wall_thickness.is_finite() || self.wall_thickness < 0.0 {
            return Err(PartError::InvalidWallThickness {
                thickness: self.wall_thickness,
            });
        }
        if self.div_x == 0 || self.div_y == 0 {
            return Err(PartError::InvalidDivisions {
                div_x: self.div_x,
                div_y: self.div_y,
            });
        }
        Ok(())
    }

    /// The grid footprint inset by the outline gap and the wall.
    pub fn cavity(&self) -> Result<CellRegion, PartError> {
        let inset = OUTLINE_INSET + self.wall_thickness;
        let cavity = self.grid.cell_region(PITCH).eroded(inset);
        if cavity.is_empty() {
            return Err(PartError::EmptyCavity { inset });
        }
        Ok(cavity)
    }

    /// Pocket footprints, row by row from the front.
    pub fn pockets(&self) -> Result<Vec<CellRegion>, PartError> {
        self.validate()?;
        let cavity = self.cavity()?;
        Ok(self.layout(&cavity).into_iter().map(|p| p.region).collect())
    }

    fn division_lines(&self, bounds: Rect) -> (Vec<f64>, Vec<f64>) {
        let step_x = bounds.width() / self.div_x as f64;
        let step_y = bounds.height() / self.div_y as f64;
        let xs = (0..=self.div_x).map(|k| bounds.min.x + k as f64 * step_x).collect();
        let ys = (0..=self.div_y).map(|k| bounds.min.y + k as f64 * step_y).collect();
        (xs, ys)
    }

    fn layout(&self, cavity: &CellRegion) -> Vec<Pocket> {
        let Some(bounds) = cavity.bounds() else {
            return Vec::new();
        };
        let half = DIVIDER_THICKNESS / 2.0;
        let (xs, ys) = self.division_lines(bounds);
        let mut pockets = Vec::with_capacity(self.div_x * self.div_y);
        for b in 0..self.div_y {
            for a in 0..self.div_x {
                let left = (a > 0).then(|| xs[a] + half);
                let right = (a + 1 < self.div_x).then(|| xs[a + 1] - half);
                let front = (b > 0).then(|| ys[b] + half);
                let back = (b + 1 < self.div_y).then(|| ys[b + 1] - half);
                let rect = Rect::new(
                    Point2::new(
                        left.unwrap_or(bounds.min.x - OVERRUN),
                        front.unwrap_or(bounds.min.y - OVERRUN),
                    ),
                    Point2::new(
                        right.unwrap_or(bounds.max.x + OVERRUN),
                        back.unwrap_or(bounds.max.y + OVERRUN),
                    ),
                );
                let region = cavity.intersect_rect(rect);
                if region.is_empty() {
                    continue;
                }
                pockets.push(Pocket {
                    region,
                    divider_x: [left, right],
                    divider_y: [front, back],
                });
            }
        }
        pockets
    }

    /// Rounded tub for one pocket, `None` for slivers.
    fn tub(&self, pocket: &Pocket, options: &ModelOptions) -> Result<Option<GeomMesh>, PartError> {
        let width = pocket.region.min_width();
        if width < MIN_POCKET_WIDTH {
            log::warn!("skipping compartment pocket {width:.2} mm wide");
            return Ok(None);
        }

        let flare = if pocket.has_dividers() {
            DIVIDER_TOP_FILLET.min(self.depth / 2.0)
        } else {
            0.0
        };
        let nominal = corner_radius(OUTLINE_INSET + self.wall_thickness).max(0.0);
        let radius = nominal.min(0.45 * width).min((self.depth - flare) * 0.95).max(0.0);
        if radius + EPS < nominal {
            log::warn!("compartment pocket radius clamped from {nominal:.2} to {radius:.2} mm");
        }

        let sketch = GridSketch::from_region(&pocket.region, radius)?;
        let segments = options.arc_segments;
        let mut stations: Vec<LoftStation> = Vec::new();

        if radius > EPS {
            for i in 0..=segments {
                let theta = FRAC_PI_2 * i as f64 / segments as f64;
                let offset = radius - radius * theta.sin();
                let z = -self.depth + radius - radius * theta.cos();
                stations.push(sketch.ring(offset, segments)?.at_z(z));
            }
        } else {
            stations.push(sketch.ring(0.0, segments)?.at_z(-self.depth));
        }

        if flare > EPS {
            for j in 0..=segments {
                let phi = FRAC_PI_2 * j as f64 / segments as f64;
                let spread = flare - flare * phi.cos();
                let z = -flare + flare * phi.sin();
                let ring = sketch.ring_with_edge_offsets(
                    |e| if pocket.faces_divider(e) { -spread } else { 0.0 },
                    0.0,
                    segments,
                )?;
                stations.push(ring.clone().at_z(z));
                if j == segments {
                    stations.push(ring.at_z(CUTTER_OVERSHOOT));
                }
            }
        } else {
            stations.push(sketch.ring(0.0, segments)?.at_z(CUTTER_OVERSHOOT));
        }

        let (mesh, diagnostics) = loft_stations(&stations, LoftCaps::BOTH, options.tolerance)?;
        log::debug!("compartment pocket: {}", diagnostics.summary());
        Ok(Some(mesh))
    }

    /// Section of every divider notch, placed one unit before its divider.
    fn notch_profiles(
        &self,
        cavity: &CellRegion,
        options: &ModelOptions,
    ) -> Result<Vec<Vec<Point3>>, PartError> {
        if self.div_cutout <= 0.0 || (self.div_x < 2 && self.div_y < 2) {
            return Ok(Vec::new());
        }
        let notch_depth = self.depth - CUTOUT_FLOOR_MARGIN;
        if notch_depth <= 0.0 {
            log::warn!("compartment too shallow for divider cutouts");
            return Ok(Vec::new());
        }
        let Some(bounds) = cavity.bounds() else {
            return Ok(Vec::new());
        };
        let (xs, ys) = self.division_lines(bounds);
        let step_x = bounds.width() / self.div_x as f64;
        let step_y = bounds.height() / self.div_y as f64;
        let half = DIVIDER_THICKNESS / 2.0;

        let mut profiles = Vec::new();
        // Dividers parallel to Y, notched along Y.
        let width = self.div_cutout.min(step_y - CUTOUT_CLEARANCE);
        if width > 0.0 {
            for &x in &xs[1..self.div_x] {
                for b in 0..self.div_y {
                    let center = ys[b] + step_y / 2.0;
                    let reach = width / 2.0 + CUTOUT_FILLET;
                    let footprint = Rect::new(
                        Point2::new(x - half, center - reach),
                        Point2::new(x + half, center + reach),
                    );
                    if !covers(cavity, footprint) {
                        log::debug!("divider notch at x = {x:.2} leaves the cavity, skipped");
                        continue;
                    }
                    let section = notch_section(center, width, notch_depth, options)?;
                    profiles.push(section.iter().map(|p| Point3::new(x - 1.0, p.x, p.y)).collect());
                }
            }
        }
        // Dividers parallel to X, notched along X.
        let width = self.div_cutout.min(step_x - CUTOUT_CLEARANCE);
        if width > 0.0 {
            for &y in &ys[1..self.div_y] {
                for a in 0..self.div_x {
                    let center = xs[a] + step_x / 2.0;
                    let reach = width / 2.0 + CUTOUT_FILLET;
                    let footprint = Rect::new(
                        Point2::new(center - reach, y - half),
                        Point2::new(center + reach, y + half),
                    );
                    if !covers(cavity, footprint) {
                        log::debug!("divider notch at y = {y:.2} leaves the cavity, skipped");
                        continue;
                    }
                    let section = notch_section(center, width, notch_depth, options)?;
                    profiles.push(section.iter().map(|p| Point3::new(p.x, y - 1.0, p.y)).collect());
                }
            }
        }
        Ok(profiles)
    }

    fn label_cut(
        &self,
        bounds: Rect,
        options: &ModelOptions,
    ) -> Result<Option<GeomMesh>, PartError> {
        let height = (LABEL_WIDTH * LABEL_SLOPE).min(self.depth - LABEL_FLOOR_MARGIN);
        if height <= 0.0 {
            log::warn!("compartment too shallow for a label shelf");
            return Ok(None);
        }
        let x = bounds.max.x;
        let section = [
            Point2::new(x - LABEL_WIDTH, 0.0),
            Point2::new(x, -height),
            Point2::new(x + OVERRUN, -height),
            Point2::new(x + OVERRUN, 0.0),
        ];
        let section = fillet_section_corners(
            &section,
            &[0],
            LABEL_TIP_FILLET,
            options.arc_segments,
            options.tolerance,
        )?;
        let y0 = bounds.min.y - OVERRUN;
        let profile: Vec<Point3> = section.iter().map(|p| Point3::new(p.x, y0, p.y)).collect();
        let length = bounds.height() + 2.0 * OVERRUN;
        Ok(Some(extrude(&profile, Vec3::new(0.0, length, 0.0), options.tolerance)?))
    }

    fn scoop_cut(
        &self,
        side: ScoopSide,
        bounds: Rect,
        options: &ModelOptions,
    ) -> Result<GeomMesh, PartError> {
        let section = scoop_section(self.depth, self.wall_thickness, options.arc_segments);
        let (profile, direction): (Vec<Point3>, Vec3) = match side {
            ScoopSide::Left => (
                section
                    .iter()
                    .map(|p| Point3::new(bounds.min.x + p.x, bounds.min.y - OVERRUN, p.y))
                    .collect(),
                Vec3::new(0.0, bounds.height() + 2.0 * OVERRUN, 0.0),
            ),
            ScoopSide::Right => (
                section
                    .iter()
                    .map(|p| Point3::new(bounds.max.x - p.x, bounds.min.y - OVERRUN, p.y))
                    .collect(),
                Vec3::new(0.0, bounds.height() + 2.0 * OVERRUN, 0.0),
            ),
            ScoopSide::Front => (
                section
                    .iter()
                    .map(|p| Point3::new(bounds.min.x - OVERRUN, bounds.min.y + p.x, p.y))
                    .collect(),
                Vec3::new(bounds.width() + 2.0 * OVERRUN, 0.0, 0.0),
            ),
            ScoopSide::Back => (
                section
                    .iter()
                    .map(|p| Point3::new(bounds.min.x - OVERRUN, bounds.max.y - p.x, p.y))
                    .collect(),
                Vec3::new(bounds.width() + 2.0 * OVERRUN, 0.0, 0.0),
            ),
        };
        extrude(&profile, direction, options.tolerance)
    }

    /// The cutter at its nominal position, before lowering.
    fn cutter(&self, options: &ModelOptions) -> Result<GeomMesh, PartError> {
        self.validate()?;
        let cavity = self.cavity()?;
        let Some(bounds) = cavity.bounds() else {
            return Err(PartError::EmptyCavity {
                inset: OUTLINE_INSET + self.wall_thickness,
            });
        };

        let pockets = self.layout(&cavity);
        let tubs: Vec<GeomMesh> = try_map(&pockets, |p| self.tub(p, options))?
            .into_iter()
            .flatten()
            .collect();
        if tubs.is_empty() {
            return Err(PartError::NoPockets);
        }
        log::debug!("compartment: {} of {} pockets cut", tubs.len(), pockets.len());
        let mut cutter = GeomMesh::merged(&tubs);

        let profiles = self.notch_profiles(&cavity, options)?;
        if !profiles.is_empty() {
            let notches = try_map(&profiles, |profile| {
                extrude(profile, notch_direction(profile), options.tolerance)
            })?;
            log::debug!("compartment: {} divider notches", notches.len());
            cutter = combine_all(cutter, &notches, BooleanOp::Union, options)?;
        }

        if self.label {
            if let Some(label) = self.label_cut(bounds, options)? {
                cutter = combine(&cutter, &label, BooleanOp::Difference, options)?;
            }
        }
        for &side in &self.scoops {
            let scoop = self.scoop_cut(side, bounds, options)?;
            cutter = combine(&cutter, &scoop, BooleanOp::Difference, options)?;
        }
        Ok(cutter)
    }
}

impl Part for Compartment {
    fn name(&self) -> &'static str {
        "compartment"
    }

    fn mesh(&self, options: &ModelOptions) -> Result<GeomMesh, PartError> {
        let cutter = self.cutter(options)?;
        if self.lowered == 0.0 {
            Ok(cutter)
        } else {
            Ok(cutter.translated(Vec3::new(0.0, 0.0, -self.lowered)))
        }
    }
}

fn covers(region: &CellRegion, rect: Rect) -> bool {
    (region.intersect_rect(rect).area() - rect.area()).abs() <= 1e-6 * rect.area().max(1.0)
}

fn extrude(profile: &[Point3], direction: Vec3, tol: Tolerance) -> Result<GeomMesh, PartError> {
    let (mesh, _) = extrude_polyline(profile, direction, ExtrusionCaps::BOTH, tol)?;
    Ok(mesh)
}

/// Notch profiles start one unit before the divider plane; extrude two units
/// through it.
fn notch_direction(profile: &[Point3]) -> Vec3 {
    let along_y = profile.windows(2).all(|w| (w[0].x - w[1].x).abs() <= EPS);
    if along_y { Vec3::new(2.0, 0.0, 0.0) } else { Vec3::new(0.0, 2.0, 0.0) }
}

/// (along the divider, z) section of a divider notch: the U with flanges
/// above the top, bottom corners and mouth rounded.
fn notch_section(
    center: f64,
    width: f64,
    depth: f64,
    options: &ModelOptions,
) -> Result<Vec<Point2>, PartError> {
    let (lo, hi) = (center - width / 2.0, center + width / 2.0);
    let section = [
        Point2::new(lo - CUTOUT_FILLET, CUTTER_OVERSHOOT),
        Point2::new(lo - CUTOUT_FILLET, 0.0),
        Point2::new(lo, 0.0),
        Point2::new(lo, -depth),
        Point2::new(hi, -depth),
        Point2::new(hi, 0.0),
        Point2::new(hi + CUTOUT_FILLET, 0.0),
        Point2::new(hi + CUTOUT_FILLET, CUTTER_OVERSHOOT),
    ];
    Ok(fillet_section_corners(
        &section,
        &[2, 3, 4, 5],
        CUTOUT_FILLET,
        options.arc_segments,
        options.tolerance,
    )?)
}

/// (inward distance from the cavity side, z) section of a scoop: a slab
/// behind the stacking lip overhang plus a quarter-round ramp at the floor.
fn scoop_section(depth: f64, wall_thickness: f64, segments: usize) -> Vec<Point2> {
    let slab = (SCOOP_LIP_COMPENSATION - wall_thickness).max(0.0);
    let r = SCOOP_RADIUS.min(depth);
    let center = Point2::new(slab + r, -depth + r);
    let mut section = vec![
        Point2::new(-OVERRUN, CUTTER_OVERSHOOT),
        Point2::new(-OVERRUN, -depth - OVERRUN),
        Point2::new(slab + r, -depth - OVERRUN),
        Point2::new(slab + r, -depth),
    ];
    for i in 1..segments {
        let theta = -FRAC_PI_2 - FRAC_PI_2 * i as f64 / segments as f64;
        section.push(Point2::new(center.x + r * theta.cos(), center.y + r * theta.sin()));
    }
    section.push(Point2::new(slab, -depth + r));
    section.push(Point2::new(slab, CUTTER_OVERSHOOT));
    section
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::{PointContainment, classify_point, mesh_diagnostics, signed_area_2d};

    fn options() -> ModelOptions {
        ModelOptions::new(2)
    }

    fn containment(mesh: &GeomMesh, x: f64, y: f64, z: f64) -> PointContainment {
        classify_point(Point3::new(x, y, z), mesh, Tolerance::LOOSE)
    }

    #[test]
    fn scoop_sides_parse_case_insensitively() {
        assert_eq!("Left".parse::<ScoopSide>().unwrap(), ScoopSide::Left);
        assert_eq!(" back ".parse::<ScoopSide>().unwrap(), ScoopSide::Back);
        assert!("up".parse::<ScoopSide>().is_err());
        assert_eq!(ScoopSide::Front.to_string(), "front");
    }

    #[test]
    fn validation_rejects_bad_parameters() {
        let grid = Grid::filled(1, 1).unwrap();
        assert!(matches!(
            Compartment::new(&grid, 0.0).validate(),
            Err(PartError::InvalidDepth { .. })
        ));
        assert!(matches!(
            Compartment::new(&grid, 5.0).with_wall_thickness(-1.0).validate(),
            Err(PartError::InvalidWallThickness { .. })
        ));
        assert!(matches!(
            Compartment::subdivided(&grid, 5.0, 0, 1).validate(),
            Err(PartError::InvalidDivisions { div_x: 0, div_y: 1 })
        ));
        assert!(matches!(
            Compartment::new(&grid, 5.0).with_wall_thickness(30.0).cavity(),
            Err(PartError::EmptyCavity { .. })
        ));
    }

    #[test]
    fn pockets_are_split_by_one_unit_dividers() {
        let grid = Grid::filled(2, 1).unwrap();
        let compartment = Compartment::subdivided(&grid, 14.0, 2, 2);
        let pockets = compartment.pockets().unwrap();
        assert_eq!(pockets.len(), 4);

        // Cavity is 84 - 2.5 wide; each pocket loses half a divider on its inner side.
        let cavity_x = 84.0 - 2.5;
        let cavity_y = 42.0 - 2.5;
        for pocket in &pockets {
            let b = pocket.bounds().unwrap();
            assert!((b.width() - (cavity_x / 2.0 - 0.5)).abs() < 1e-9);
            assert!((b.height() - (cavity_y / 2.0 - 0.5)).abs() < 1e-9);
        }
        let total: f64 = pockets.iter().map(CellRegion::area).sum();
        let expected = cavity_x * cavity_y - cavity_x * 1.0 - cavity_y * 1.0 + 1.0;
        assert!((total - expected).abs() < 1e-6);
    }

    #[test]
    fn all_sliver_pockets_leave_nothing_to_cut() {
        // 39.5 mm cavity in 30 columns: every pocket is under 1 mm wide.
        let grid = Grid::filled(1, 1).unwrap();
        let result = Compartment::subdivided(&grid, 14.0, 30, 1).mesh(&options());
        assert!(matches!(result, Err(PartError::NoPockets)));
    }

    #[test]
    fn sliver_pockets_are_skipped_and_the_rest_cut() {
        // 22 columns of 1.795 mm: inner pockets lose a whole divider and
        // drop below 1 mm, the two outer ones keep 1.295 mm.
        let grid = Grid::filled(1, 1).unwrap();
        let compartment = Compartment::subdivided(&grid, 14.0, 22, 1);
        assert_eq!(compartment.pockets().unwrap().len(), 22);
        let mesh = compartment.mesh(&options()).unwrap();

        let step = 39.5 / 22.0;
        let outer = -19.75 + (step - 0.5) / 2.0;
        let inner = -19.75 + 5.5 * step;
        assert_eq!(containment(&mesh, outer, 0.0, -7.0), PointContainment::Inside);
        assert_eq!(containment(&mesh, -outer, 0.0, -7.0), PointContainment::Inside);
        assert_eq!(containment(&mesh, inner, 0.0, -7.0), PointContainment::Outside);
    }

    #[test]
    fn irregular_grid_pockets_follow_the_cavity() {
        let grid = Grid::parse("##/#.").unwrap();
        let pockets = Compartment::new(&grid, 10.0).pockets().unwrap();
        assert_eq!(pockets.len(), 1);
        assert_eq!(pockets[0].loops().len(), 1);
        assert_eq!(pockets[0].loops()[0].len(), 6);
    }

    #[test]
    fn plain_cutter_is_a_closed_tub() {
        let grid = Grid::filled(1, 1).unwrap();
        let compartment = Compartment::new(&grid, 14.0);
        let mesh = compartment.mesh(&options()).unwrap();
        let diagnostics = mesh_diagnostics(&mesh);
        assert!(diagnostics.is_valid_solid(), "{diagnostics}");

        let bbox = mesh.bbox().unwrap();
        assert!((bbox.min.z + 14.0).abs() < 1e-9);
        assert!((bbox.max.z - CUTTER_OVERSHOOT).abs() < 1e-9);
        assert!((bbox.max.x - 19.75).abs() < 1e-9);

        // Less than the sharp-cornered prism because of the rounded floor and corners.
        let prism = 39.5 * 39.5 * (14.0 + CUTTER_OVERSHOOT);
        assert!(mesh.volume() < prism);
        assert!(mesh.volume() > 0.95 * prism);
    }

    #[test]
    fn lowered_cutter_moves_down() {
        let grid = Grid::filled(1, 1).unwrap();
        let mesh = Compartment::new(&grid, 10.0).lowered(0.8).mesh(&options()).unwrap();
        let bbox = mesh.bbox().unwrap();
        assert!((bbox.min.z + 10.8).abs() < 1e-9);
        assert!((bbox.max.z - (CUTTER_OVERSHOOT - 0.8)).abs() < 1e-9);
    }

    #[test]
    fn dividers_flare_at_the_top() {
        let grid = Grid::filled(1, 1).unwrap();
        let mesh = Compartment::subdivided(&grid, 12.0, 2, 1).mesh(&options()).unwrap();
        let diagnostics = mesh_diagnostics(&mesh);
        assert!(diagnostics.is_valid_solid(), "{diagnostics}");

        // Divider at x = 0 is solid below the flare and nearly gone at the top.
        assert_eq!(containment(&mesh, 0.0, 0.0, -5.0), PointContainment::Outside);
        assert_eq!(containment(&mesh, 0.48, 0.0, -0.01), PointContainment::Inside);
        assert_eq!(containment(&mesh, 0.6, 0.0, -5.0), PointContainment::Inside);
    }

    #[test]
    fn notches_cut_through_dividers() {
        let grid = Grid::filled(1, 1).unwrap();
        let compartment = Compartment::subdivided(&grid, 14.0, 2, 1).with_cutout(12.0);
        let mesh = compartment.mesh(&options()).unwrap();

        // Cutout width is min(12, 39.5 - 10); it stops 5 above the floor.
        assert_eq!(containment(&mesh, 0.0, 0.0, -6.0), PointContainment::Inside);
        assert_eq!(containment(&mesh, 0.0, 0.0, -12.0), PointContainment::Outside);
        assert_eq!(containment(&mesh, 0.0, 10.0, -6.0), PointContainment::Outside);
    }

    #[test]
    fn label_and_scoop_remove_material_from_the_cutter() {
        let grid = Grid::filled(1, 1).unwrap();
        let plain = Compartment::new(&grid, 14.0).mesh(&options()).unwrap();
        let labelled = Compartment::new(&grid, 14.0).with_label(true).mesh(&options()).unwrap();
        let scooped = Compartment::new(&grid, 14.0).with_scoop(true).mesh(&options()).unwrap();

        assert!(labelled.volume() < plain.volume());
        assert!(scooped.volume() < plain.volume());

        // Label shelf on +X, just under the top.
        assert_eq!(containment(&labelled, 18.5, 0.0, -1.0), PointContainment::Outside);
        assert_eq!(containment(&labelled, -18.5, 0.0, -1.0), PointContainment::Inside);
        // Scoop ramp on -X, at the floor corner.
        assert_eq!(containment(&scooped, -18.0, 0.0, -13.5), PointContainment::Outside);
        assert_eq!(containment(&scooped, 18.0, 0.0, -13.5), PointContainment::Inside);
    }

    #[test]
    fn scoop_section_is_a_simple_polygon() {
        let section = scoop_section(14.0, 1.0, 4);
        assert_eq!(section.len(), 4 + 3 + 2);
        assert!(signed_area_2d(&section).abs() > 0.0);
        let slab = SCOOP_LIP_COMPENSATION - 1.0;
        assert!(section.contains(&Point2::new(slab, -14.0 + SCOOP_RADIUS)));
    }
}
