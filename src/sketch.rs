//! Rounded grid outlines.
//!
//! A [`GridSketch`] is a rectilinear region with every corner rounded by one
//! radius. Solids are never filleted after the fact; instead the sketch emits
//! [`Ring`]s, copies of the outline pushed further inward (or outward) with
//! corner radii adjusted the way a 45° draft changes them, and the rings are
//! lofted or swept into solids.
//!
//! Every ring of a sketch has the same loop count and the same number of
//! points per loop for a given segment count: each corner always emits
//! `segments + 1` points, even when its radius collapses to zero.

use thiserror::Error;

use crate::constants::{OUTLINE_INSET, PITCH, corner_radius};
use crate::geom::{
    GeomMesh, GeomMeshDiagnostics, LoftCaps, LoftError, LoftStation, Point2, Tolerance,
    loft_stations, sweep_closed_stations,
};
use crate::grid::{CellRegion, Grid, Rect};

const EPS: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum SketchError {
    #[error("sketch outline is empty at inset {inset}")]
    EmptyOutline { inset: f64 },
    #[error("edge {edge} of loop {loop_index} inverts at offset {offset}")]
    EdgeInverted { loop_index: usize, edge: usize, offset: f64 },
    #[error("invalid corner radius {radius}")]
    InvalidRadius { radius: f64 },
    #[error("section needs at least {min} points, got {count}")]
    SectionTooShort { min: usize, count: usize },
    #[error(transparent)]
    Loft(#[from] LoftError),
}

/// Rectilinear loops of a region, interior on the left.
#[derive(Debug, Clone, PartialEq)]
pub struct Outline {
    loops: Vec<Vec<Point2>>,
    bounds: Rect,
}

impl Outline {
    pub fn from_region(region: &CellRegion) -> Option<Self> {
        let bounds = region.bounds()?;
        let loops = region.loops();
        if loops.is_empty() {
            return None;
        }
        Some(Self { loops, bounds })
    }

    #[must_use]
    pub fn loops(&self) -> &[Vec<Point2>] {
        &self.loops
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Straight edges, loop by loop.
    pub fn edges(&self) -> impl Iterator<Item = SketchEdge> + '_ {
        self.loops.iter().enumerate().flat_map(|(loop_index, points)| {
            let n = points.len();
            (0..n).map(move |index| SketchEdge {
                loop_index,
                index,
                start: points[index],
                end: points[(index + 1) % n],
            })
        })
    }
}

/// One straight edge of an [`Outline`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SketchEdge {
    pub loop_index: usize,
    pub index: usize,
    pub start: Point2,
    pub end: Point2,
}

impl SketchEdge {
    #[must_use]
    pub fn direction(&self) -> Point2 {
        let d = self.end.sub(self.start);
        d.scale(1.0 / d.length())
    }

    /// Unit normal pointing into the sketch.
    #[must_use]
    pub fn inward_normal(&self) -> Point2 {
        self.direction().perp()
    }

    #[must_use]
    pub fn midpoint(&self) -> Point2 {
        self.start.add(self.end).scale(0.5)
    }

    #[must_use]
    pub fn is_vertical(&self) -> bool {
        (self.end.x - self.start.x).abs() <= EPS
    }
}

/// Closed 2-D loops produced by [`GridSketch::ring`].
#[derive(Debug, Clone, PartialEq)]
pub struct Ring {
    pub loops: Vec<Vec<Point2>>,
}

impl Ring {
    #[must_use]
    pub fn at_z(self, z: f64) -> LoftStation {
        LoftStation::new(z, self.loops)
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        self.loops.iter().map(Vec::len).sum()
    }
}

/// Rounded outline of a grid.
#[derive(Debug, Clone, PartialEq)]
pub struct GridSketch {
    outline: Outline,
    inset: f64,
    radius: f64,
}

impl GridSketch {
    /// Cell squares of `grid` eroded by `inset`, corners rounded by `4 - inset`.
    pub fn new(grid: &Grid, inset: f64) -> Result<Self, SketchError> {
        let region = grid.cell_region(PITCH).eroded(inset);
        Self::build(&region, inset, corner_radius(inset).max(0.0))
    }

    /// Sketch of an arbitrary region, already inset, with corner radius `radius`.
    pub fn from_region(region: &CellRegion, radius: f64) -> Result<Self, SketchError> {
        Self::build(region, 0.0, radius)
    }

    /// The outline of a single cell at the standard inset.
    pub fn for_cell() -> Result<Self, SketchError> {
        let cell = CellRegion::from_rects([Rect::from_center(Point2::new(0.0, 0.0), PITCH, PITCH)]);
        Self::build(&cell.eroded(OUTLINE_INSET), OUTLINE_INSET, corner_radius(OUTLINE_INSET))
    }

    fn build(region: &CellRegion, inset: f64, radius: f64) -> Result<Self, SketchError> {
        if !radius.is_finite() || radius < 0.0 {
            return Err(SketchError::InvalidRadius { radius });
        }
        let outline = Outline::from_region(region).ok_or(SketchError::EmptyOutline { inset })?;
        Ok(Self { outline, inset, radius })
    }

    #[must_use]
    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius.max(0.0);
        self
    }

    #[must_use]
    pub fn without_fillet(self) -> Self {
        self.with_radius(0.0)
    }

    #[must_use]
    pub fn outline(&self) -> &Outline {
        &self.outline
    }

    #[must_use]
    pub fn inset(&self) -> f64 {
        self.inset
    }

    #[must_use]
    pub fn radius(&self) -> f64 {
        self.radius
    }

    #[must_use]
    pub fn bounds(&self) -> Rect {
        self.outline.bounds
    }

    /// Bounding-box size `(X, Y)`.
    #[must_use]
    pub fn size(&self) -> (f64, f64) {
        (self.bounds().width(), self.bounds().height())
    }

    /// The outline moved inward by `offset` (outward when negative).
    pub fn ring(&self, offset: f64, segments: usize) -> Result<Ring, SketchError> {
        self.ring_with_edge_offsets(|_| 0.0, offset, segments)
    }

    /// Like [`GridSketch::ring`], with `offset_of_edge` added to
    /// `base_offset` per straight edge. Corner radii follow the mean offset
    /// of the two edges meeting there.
    pub fn ring_with_edge_offsets(
        &self,
        offset_of_edge: impl Fn(&SketchEdge) -> f64,
        base_offset: f64,
        segments: usize,
    ) -> Result<Ring, SketchError> {
        let segments = segments.max(1);
        let mut loops = Vec::with_capacity(self.outline.loops.len());
        let edges: Vec<SketchEdge> = self.outline.edges().collect();
        let mut first_edge = 0;
        for (loop_index, points) in self.outline.loops.iter().enumerate() {
            let n = points.len();
            let loop_edges = &edges[first_edge..first_edge + n];
            first_edge += n;
            let offsets: Vec<f64> =
                loop_edges.iter().map(|e| base_offset + offset_of_edge(e)).collect();
            loops.push(self.offset_loop(loop_index, loop_edges, &offsets, segments)?);
        }
        Ok(Ring { loops })
    }

    fn offset_loop(
        &self,
        loop_index: usize,
        edges: &[SketchEdge],
        offsets: &[f64],
        segments: usize,
    ) -> Result<Vec<Point2>, SketchError> {
        let n = edges.len();
        let prev = |k: usize| (k + n - 1) % n;

        let mut corners: Vec<Corner> = (0..n)
            .map(|k| {
                let (e_in, e_out) = (&edges[prev(k)], &edges[k]);
                let (d_in, d_out) = (offsets[prev(k)], offsets[k]);
                let (t_in, t_out) = (e_in.direction(), e_out.direction());
                let (n_in, n_out) = (t_in.perp(), t_out.perp());
                let convex = t_in.cross(t_out) > 0.0;
                let mean = 0.5 * (d_in + d_out);
                let radius = if convex { self.radius - mean } else { self.radius + mean }.max(0.0);
                Corner {
                    vertex: e_out.start.add(n_in.scale(d_in)).add(n_out.scale(d_out)),
                    t_in,
                    t_out,
                    normal_sum: n_in.add(n_out),
                    convex,
                    radius,
                }
            })
            .collect();

        // Edge k runs from corner k to corner k + 1.
        let mut scale = vec![1.0_f64; n];
        for k in 0..n {
            let next = (k + 1) % n;
            let dir = edges[k].direction();
            let delta = corners[next].vertex.sub(corners[k].vertex);
            let length = delta.x * dir.x + delta.y * dir.y;
            if length < -EPS {
                return Err(SketchError::EdgeInverted {
                    loop_index,
                    edge: k,
                    offset: offsets[k],
                });
            }
            let need = corners[k].radius + corners[next].radius;
            if need > length.max(0.0) + EPS {
                let s = if need > 0.0 { length.max(0.0) / need } else { 0.0 };
                scale[k] = scale[k].min(s);
                scale[next] = scale[next].min(s);
            }
        }
        let clamped = scale.iter().filter(|&&s| s < 1.0).count();
        if clamped > 0 {
            log::warn!("sketch ring: clamped {clamped} corner radii on loop {loop_index}");
        }
        for (corner, s) in corners.iter_mut().zip(&scale) {
            corner.radius *= s;
        }

        let mut out = Vec::with_capacity(n * (segments + 1));
        for corner in &corners {
            corner.push_arc(segments, &mut out);
        }
        Ok(out)
    }

    /// Loft a (offset, z) profile with strictly increasing z into a capped solid.
    pub fn loft_profile(
        &self,
        profile: &[Point2],
        segments: usize,
        tol: Tolerance,
    ) -> Result<(GeomMesh, GeomMeshDiagnostics), SketchError> {
        let stations = self.stations(profile, segments)?;
        Ok(loft_stations(&stations, LoftCaps::BOTH, tol)?)
    }

    /// Straight prism of the outline from `z0` to `z1`.
    pub fn extrude(
        &self,
        z0: f64,
        z1: f64,
        segments: usize,
        tol: Tolerance,
    ) -> Result<(GeomMesh, GeomMeshDiagnostics), SketchError> {
        let (lo, hi) = if z0 <= z1 { (z0, z1) } else { (z1, z0) };
        self.loft_profile(&[Point2::new(0.0, lo), Point2::new(0.0, hi)], segments, tol)
    }

    /// Sweep a closed (offset, z) section around the outline. The section is
    /// traced clockwise in the (offset, z) plane: the solid lies to the right
    /// of the walk.
    pub fn sweep_section(
        &self,
        section: &[Point2],
        segments: usize,
        tol: Tolerance,
    ) -> Result<(GeomMesh, GeomMeshDiagnostics), SketchError> {
        if section.len() < 3 {
            return Err(SketchError::SectionTooShort {
                min: 3,
                count: section.len(),
            });
        }
        let stations = self.stations(section, segments)?;
        Ok(sweep_closed_stations(&stations, tol)?)
    }

    fn stations(
        &self,
        profile: &[Point2],
        segments: usize,
    ) -> Result<Vec<LoftStation>, SketchError> {
        profile
            .iter()
            .map(|p| Ok(self.ring(p.x, segments)?.at_z(p.y)))
            .collect()
    }
}

#[derive(Debug, Clone, Copy)]
struct Corner {
    vertex: Point2,
    t_in: Point2,
    t_out: Point2,
    normal_sum: Point2,
    convex: bool,
    radius: f64,
}

impl Corner {
    fn push_arc(&self, segments: usize, out: &mut Vec<Point2>) {
        let r = self.radius;
        let t0 = self.vertex.sub(self.t_in.scale(r));
        let t1 = self.vertex.add(self.t_out.scale(r));
        let center = if self.convex {
            self.vertex.add(self.normal_sum.scale(r))
        } else {
            self.vertex.sub(self.normal_sum.scale(r))
        };
        let (s, e) = (t0.sub(center), t1.sub(center));
        for i in 0..=segments {
            let theta = std::f64::consts::FRAC_PI_2 * i as f64 / segments as f64;
            out.push(center.add(s.scale(theta.cos())).add(e.scale(theta.sin())));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::signed_area_2d;

    fn square_sketch(size: f64, radius: f64) -> GridSketch {
        let region = CellRegion::from_rects([Rect::from_center(Point2::new(0.0, 0.0), size, size)]);
        GridSketch::from_region(&region, radius).unwrap()
    }

    #[test]
    fn single_cell_sketch_matches_standard_outline() {
        let sketch = GridSketch::for_cell().unwrap();
        let (x, y) = sketch.size();
        assert!((x - 41.5).abs() < 1e-9);
        assert!((y - 41.5).abs() < 1e-9);
        assert!((sketch.radius() - 3.75).abs() < 1e-12);

        let ring = sketch.ring(0.0, 8).unwrap();
        assert_eq!(ring.loops.len(), 1);
        assert_eq!(ring.point_count(), 4 * 9);
        let r: f64 = 3.75;
        let expected = 41.5 * 41.5 - (4.0 - std::f64::consts::PI) * r * r;
        let area = signed_area_2d(&ring.loops[0]);
        assert!(area > 0.0);
        assert!((area - expected).abs() < 1.0, "{area} vs {expected}");
    }

    #[test]
    fn ring_offset_shrinks_convex_radius() {
        let sketch = square_sketch(10.0, 2.0);
        let ring = sketch.ring(1.5, 4).unwrap();
        let xs: Vec<f64> = ring.loops[0].iter().map(|p| p.x).collect();
        let max = xs.iter().copied().fold(f64::MIN, f64::max);
        assert!((max - 3.5).abs() < 1e-9);

        // Corner radius 0.5: the midpoint of the first (-x, -y) arc sits
        // 0.5 * (1 - 1/sqrt 2) inside the square corner.
        let mid = ring.loops[0][2];
        let inset = 0.5 * (1.0 - std::f64::consts::FRAC_1_SQRT_2);
        assert!((mid.x - (-3.5 + inset)).abs() < 1e-9);
        assert!((mid.y - (-3.5 + inset)).abs() < 1e-9);
    }

    #[test]
    fn unfilleted_sketch_has_square_corners() {
        let grid = Grid::filled(1, 1).unwrap();
        let rounded = GridSketch::new(&grid, 0.25).unwrap();
        let square = rounded.clone().without_fillet();
        assert_eq!(square.radius(), 0.0);

        let ring = square.ring(0.0, 4).unwrap();
        assert_eq!(ring.point_count(), rounded.ring(0.0, 4).unwrap().point_count());
        assert!((signed_area_2d(&ring.loops[0]) - 41.5 * 41.5).abs() < 1e-9);
        let on_side = |v: f64| (v.abs() - 20.75).abs() < 1e-9;
        assert!(ring.loops[0].iter().all(|p| on_side(p.x) || on_side(p.y)));
    }

    #[test]
    fn zero_radius_corners_keep_point_count() {
        let sketch = square_sketch(10.0, 2.0);
        let sharp = sketch.ring(3.0, 4).unwrap();
        let round = sketch.ring(0.0, 4).unwrap();
        assert_eq!(sharp.point_count(), round.point_count());
        assert!((signed_area_2d(&sharp.loops[0]) - 16.0).abs() < 1e-9);
    }

    #[test]
    fn concave_corner_radius_grows_with_offset() {
        let grid = Grid::parse("##/#.").unwrap();
        let sketch = GridSketch::new(&grid, 0.25).unwrap();
        let ring = sketch.ring(1.0, 6).unwrap();
        assert_eq!(ring.loops.len(), 1);
        assert_eq!(ring.loops[0].len(), 6 * 7);
        assert!(signed_area_2d(&ring.loops[0]) > 0.0);
    }

    #[test]
    fn hole_in_grid_gives_hole_loop() {
        let grid = Grid::parse("###/#.#/###").unwrap();
        let sketch = GridSketch::new(&grid, 0.25).unwrap();
        let ring = sketch.ring(0.0, 2).unwrap();
        let holes = ring.loops.iter().filter(|l| signed_area_2d(l) < 0.0).count();
        assert_eq!(ring.loops.len(), 2);
        assert_eq!(holes, 1);
    }

    #[test]
    fn oversized_radius_is_clamped_per_edge() {
        let region = CellRegion::from_rects([Rect::from_center(Point2::new(0.0, 0.0), 4.0, 1.0)]);
        let sketch = GridSketch::from_region(&region, 3.0).unwrap();
        let ring = sketch.ring(0.0, 4).unwrap();
        for p in &ring.loops[0] {
            assert!(p.x.abs() <= 2.0 + 1e-9 && p.y.abs() <= 0.5 + 1e-9);
        }
    }

    #[test]
    fn inverted_edges_are_errors() {
        let sketch = square_sketch(2.0, 0.0);
        let err = sketch.ring(1.5, 2).unwrap_err();
        assert!(matches!(err, SketchError::EdgeInverted { .. }));
    }

    #[test]
    fn per_edge_offsets_move_only_selected_edges() {
        let sketch = square_sketch(10.0, 0.0);
        let ring = sketch
            .ring_with_edge_offsets(
                |e| if e.is_vertical() && e.midpoint().x > 0.0 { -1.0 } else { 0.0 },
                0.0,
                1,
            )
            .unwrap();
        let max_x = ring.loops[0].iter().map(|p| p.x).fold(f64::MIN, f64::max);
        let max_y = ring.loops[0].iter().map(|p| p.y).fold(f64::MIN, f64::max);
        assert!((max_x - 6.0).abs() < 1e-9);
        assert!((max_y - 5.0).abs() < 1e-9);
    }

    #[test]
    fn prism_and_profile_loft_are_closed() {
        let sketch = square_sketch(10.0, 2.0);
        let (mesh, diag) = sketch.extrude(0.0, 2.0, 4, Tolerance::WELD).unwrap();
        assert!(diag.is_valid_solid(), "{diag}");
        let ring = sketch.ring(0.0, 4).unwrap();
        let area = signed_area_2d(&ring.loops[0]);
        assert!((mesh.volume() - 2.0 * area).abs() < 1e-6);

        let profile = [Point2::new(1.0, 0.0), Point2::new(0.0, 1.0), Point2::new(0.0, 2.0)];
        let (_, diag) = sketch.loft_profile(&profile, 4, Tolerance::WELD).unwrap();
        assert!(diag.is_valid_solid(), "{diag}");
    }

    #[test]
    fn swept_section_builds_a_wall() {
        let sketch = square_sketch(20.0, 0.0);
        let section = [
            Point2::new(0.0, 0.0),
            Point2::new(0.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 0.0),
        ];
        let (mesh, diag) = sketch.sweep_section(&section, 1, Tolerance::WELD).unwrap();
        assert!(diag.is_valid_solid(), "{diag}");
        assert!((mesh.volume() - (400.0 - 324.0)).abs() < 1e-9);
    }
}
