//! Solid booleans on closed triangle meshes.
//!
//! Both operands are turned into BSP trees of convex polygons and clipped
//! against each other (the classic "clip, invert, clip" scheme). Faces that
//! lie flush on a face of the other solid are resolved by their orientation:
//! opposed faces cancel, co-oriented faces are kept once. Bins rely on that
//! when the base profile meets the wall body at the top of the feet.
//!
//! Clipping splits a fragment without touching its neighbours, so the
//! fragments are re-stitched before triangulation: every vertex that lies on
//! another fragment's edge is inserted into that edge.
//!
//! Trees live in an index arena and are walked with explicit stacks, so deep
//! trees from finely tessellated fillets never recurse.

use std::collections::HashMap;

use super::diagnostics::GeomMeshDiagnostics;
use super::mesh::{GeomMesh, MeshRepair, finalize_mesh_with, weld_mesh_vertices};
use super::{Point3, Tolerance, Vec3};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointContainment {
    Inside,
    Outside,
    OnSurface,
    Indeterminate,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BooleanDiagnostics {
    pub op: Option<BooleanOp>,
    pub input_a_vertex_count: usize,
    pub input_a_triangle_count: usize,
    pub input_b_vertex_count: usize,
    pub input_b_triangle_count: usize,
    pub bsp_node_count_a: usize,
    pub bsp_node_count_b: usize,
    pub split_polygon_count: usize,
    pub output_polygon_count: usize,
    pub skipped_degenerate_count: usize,
    /// Vertices inserted into fragment edges to close T-junctions.
    pub seam_vertex_count: usize,
    pub disjoint_fast_path: bool,
    pub warnings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BooleanResult {
    pub mesh: GeomMesh,
    pub mesh_diagnostics: GeomMeshDiagnostics,
    pub diagnostics: BooleanDiagnostics,
}

#[derive(Debug, thiserror::Error)]
pub enum BooleanError {
    #[error("mesh contains invalid (non-finite) geometry")]
    InvalidGeometry,
    #[error("mesh contains invalid indices")]
    InvalidIndices,
}

// ─────────────────────────────────────────────────────────────────────────────
// Planes and polygons
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
struct Plane {
    normal: Vec3,
    w: f64,
}

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

#[derive(Debug, Default)]
struct SplitPolygon {
    coplanar_front: Option<Polygon>,
    coplanar_back: Option<Polygon>,
    front: Option<Polygon>,
    back: Option<Polygon>,
}

impl Plane {
    fn from_points(a: Point3, b: Point3, c: Point3) -> Option<Self> {
        let normal = b.sub_point(a).cross(c.sub_point(a)).normalized()?;
        Some(Self {
            normal,
            w: normal.dot(Vec3::new(a.x, a.y, a.z)),
        })
    }

    fn flipped(self) -> Self {
        Self {
            normal: -self.normal,
            w: -self.w,
        }
    }

    fn distance(self, p: Point3) -> f64 {
        self.normal.dot(Vec3::new(p.x, p.y, p.z)) - self.w
    }

    fn split_polygon(self, polygon: Polygon, eps: f64, split_count: &mut usize) -> SplitPolygon {
        let mut polygon_type = COPLANAR;
        let types: Vec<u8> = polygon
            .vertices
            .iter()
            .map(|&v| {
                let t = self.distance(v);
                let ty = if t < -eps {
                    BACK
                } else if t > eps {
                    FRONT
                } else {
                    COPLANAR
                };
                polygon_type |= ty;
                ty
            })
            .collect();

        let mut out = SplitPolygon::default();
        match polygon_type {
            COPLANAR => {
                if self.normal.dot(polygon.plane.normal) > 0.0 {
                    out.coplanar_front = Some(polygon);
                } else {
                    out.coplanar_back = Some(polygon);
                }
            }
            FRONT => out.front = Some(polygon),
            BACK => out.back = Some(polygon),
            _ => {
                *split_count += 1;
                let n = polygon.vertices.len();
                let mut f: Vec<Point3> = Vec::with_capacity(n + 1);
                let mut b: Vec<Point3> = Vec::with_capacity(n + 1);
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (polygon.vertices[i], polygon.vertices[j]);
                    if ti != BACK {
                        f.push(vi);
                    }
                    if ti != FRONT {
                        b.push(vi);
                    }
                    if (ti | tj) == SPANNING {
                        let denom = self.normal.dot(vj.sub_point(vi));
                        let t = (self.w - self.normal.dot(Vec3::new(vi.x, vi.y, vi.z))) / denom;
                        let v = vi.lerp(vj, t);
                        f.push(v);
                        b.push(v);
                    }
                }
                if f.len() >= 3 {
                    out.front = Some(Polygon {
                        vertices: f,
                        plane: polygon.plane,
                    });
                }
                if b.len() >= 3 {
                    out.back = Some(Polygon {
                        vertices: b,
                        plane: polygon.plane,
                    });
                }
            }
        }
        out
    }
}

/// Convex planar polygon. Split fragments keep the plane of their parent.
#[derive(Debug, Clone, PartialEq)]
struct Polygon {
    vertices: Vec<Point3>,
    plane: Plane,
}

impl Polygon {
    fn flip(&mut self) {
        self.vertices.reverse();
        self.plane = self.plane.flipped();
    }
}

fn mesh_polygons(mesh: &GeomMesh, skipped: &mut usize) -> Vec<Polygon> {
    mesh.triangles()
        .filter_map(|[a, b, c]| match Plane::from_points(a, b, c) {
            Some(plane) => Some(Polygon {
                vertices: vec![a, b, c],
                plane,
            }),
            None => {
                *skipped += 1;
                None
            }
        })
        .collect()
}

// ─────────────────────────────────────────────────────────────────────────────
// BSP tree
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default)]
struct BspNode {
    plane: Option<Plane>,
    front: Option<usize>,
    back: Option<usize>,
    polygons: Vec<Polygon>,
}

#[derive(Debug)]
struct BspTree {
    nodes: Vec<BspNode>,
    eps: f64,
    split_count: usize,
}

impl BspTree {
    fn new(polygons: Vec<Polygon>, eps: f64) -> Self {
        let mut tree = Self {
            nodes: vec![BspNode::default()],
            eps,
            split_count: 0,
        };
        tree.build(polygons);
        tree
    }

    fn build(&mut self, polygons: Vec<Polygon>) {
        let mut stack = vec![(0usize, polygons)];
        while let Some((idx, polygons)) = stack.pop() {
            if polygons.is_empty() {
                continue;
            }
            let plane = match self.nodes[idx].plane {
                Some(plane) => plane,
                None => {
                    let plane = polygons[polygons.len() / 2].plane;
                    self.nodes[idx].plane = Some(plane);
                    plane
                }
            };

            let mut front = Vec::new();
            let mut back = Vec::new();
            for polygon in polygons {
                let split = plane.split_polygon(polygon, self.eps, &mut self.split_count);
                self.nodes[idx].polygons.extend(split.coplanar_front);
                self.nodes[idx].polygons.extend(split.coplanar_back);
                front.extend(split.front);
                back.extend(split.back);
            }

            if !front.is_empty() {
                let child = self.child(idx, true);
                stack.push((child, front));
            }
            if !back.is_empty() {
                let child = self.child(idx, false);
                stack.push((child, back));
            }
        }
    }

    fn child(&mut self, idx: usize, front: bool) -> usize {
        let existing = if front { self.nodes[idx].front } else { self.nodes[idx].back };
        if let Some(child) = existing {
            return child;
        }
        let child = self.nodes.len();
        self.nodes.push(BspNode::default());
        if front {
            self.nodes[idx].front = Some(child);
        } else {
            self.nodes[idx].back = Some(child);
        }
        child
    }

    /// Remove the parts of `polygons` that lie inside this solid.
    fn clip_polygons(&self, polygons: Vec<Polygon>, split_count: &mut usize) -> Vec<Polygon> {
        let mut kept = Vec::with_capacity(polygons.len());
        let mut stack = vec![(0usize, polygons)];
        while let Some((idx, polygons)) = stack.pop() {
            let node = &self.nodes[idx];
            let Some(plane) = node.plane else {
                kept.extend(polygons);
                continue;
            };

            let mut front = Vec::new();
            let mut back = Vec::new();
            for polygon in polygons {
                let split = plane.split_polygon(polygon, self.eps, split_count);
                front.extend(split.coplanar_front);
                front.extend(split.front);
                back.extend(split.coplanar_back);
                back.extend(split.back);
            }

            match node.front {
                Some(child) => stack.push((child, front)),
                None => kept.extend(front),
            }
            if let Some(child) = node.back {
                stack.push((child, back));
            }
        }
        kept
    }

    fn clip_to(&mut self, other: &BspTree) {
        let mut split_count = 0;
        for node in &mut self.nodes {
            let polygons = std::mem::take(&mut node.polygons);
            node.polygons = other.clip_polygons(polygons, &mut split_count);
        }
        self.split_count += split_count;
    }

    /// Turn the solid inside out.
    fn invert(&mut self) {
        for node in &mut self.nodes {
            node.polygons.iter_mut().for_each(Polygon::flip);
            node.plane = node.plane.map(Plane::flipped);
            std::mem::swap(&mut node.front, &mut node.back);
        }
    }

    fn into_polygons(self) -> Vec<Polygon> {
        self.nodes.into_iter().flat_map(|node| node.polygons).collect()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Boolean operations
// ─────────────────────────────────────────────────────────────────────────────

fn validate_mesh(mesh: &GeomMesh) -> Result<(), BooleanError> {
    if mesh.has_invalid_vertices() {
        return Err(BooleanError::InvalidGeometry);
    }
    if mesh.indices.len() % 3 != 0 || !mesh.has_valid_indices() {
        return Err(BooleanError::InvalidIndices);
    }
    Ok(())
}

/// Combine two closed meshes.
///
/// Classification uses at least [`Tolerance::PLANE`] and the output is welded
/// with at least [`Tolerance::LOOSE`].
pub fn boolean_meshes(
    mesh_a: &GeomMesh,
    mesh_b: &GeomMesh,
    op: BooleanOp,
    tol: Tolerance,
) -> Result<BooleanResult, BooleanError> {
    validate_mesh(mesh_a)?;
    validate_mesh(mesh_b)?;

    let mut diagnostics = BooleanDiagnostics {
        op: Some(op),
        input_a_vertex_count: mesh_a.vertex_count(),
        input_a_triangle_count: mesh_a.triangle_count(),
        input_b_vertex_count: mesh_b.vertex_count(),
        input_b_triangle_count: mesh_b.triangle_count(),
        ..Default::default()
    };
    let weld = Tolerance::new(tol.eps.max(Tolerance::LOOSE.eps));

    let disjoint = match (mesh_a.bbox(), mesh_b.bbox()) {
        (Some(a), Some(b)) => !a.intersects(b),
        _ => true,
    };
    if disjoint {
        diagnostics.disjoint_fast_path = true;
        let mesh = match op {
            BooleanOp::Union => GeomMesh::merged([mesh_a, mesh_b]),
            BooleanOp::Difference => mesh_a.clone(),
            BooleanOp::Intersection => GeomMesh::default(),
        };
        let (mesh, mesh_diagnostics) =
            finalize_mesh_with(mesh.points(), mesh.indices, weld, MeshRepair::ORIENTED);
        return Ok(BooleanResult {
            mesh,
            mesh_diagnostics,
            diagnostics,
        });
    }

    let eps = tol.eps.max(Tolerance::PLANE.eps);
    let mut skipped = 0;
    let mut a = BspTree::new(mesh_polygons(mesh_a, &mut skipped), eps);
    let mut b = BspTree::new(mesh_polygons(mesh_b, &mut skipped), eps);
    diagnostics.skipped_degenerate_count = skipped;
    diagnostics.bsp_node_count_a = a.nodes.len();
    diagnostics.bsp_node_count_b = b.nodes.len();

    let polygons = match op {
        BooleanOp::Union => {
            a.clip_to(&b);
            b.clip_to(&a);
            b.invert();
            b.clip_to(&a);
            b.invert();
            diagnostics.split_polygon_count = a.split_count + b.split_count;
            let mut polygons = a.into_polygons();
            polygons.extend(b.into_polygons());
            polygons
        }
        BooleanOp::Difference => {
            a.invert();
            a.clip_to(&b);
            b.clip_to(&a);
            b.invert();
            b.clip_to(&a);
            b.invert();
            diagnostics.split_polygon_count = a.split_count + b.split_count;
            let mut polygons = a.into_polygons();
            polygons.extend(b.into_polygons());
            polygons.iter_mut().for_each(Polygon::flip);
            polygons
        }
        BooleanOp::Intersection => {
            a.invert();
            b.clip_to(&a);
            b.invert();
            a.clip_to(&b);
            b.clip_to(&a);
            diagnostics.split_polygon_count = a.split_count + b.split_count;
            let mut polygons = a.into_polygons();
            polygons.extend(b.into_polygons());
            polygons.iter_mut().for_each(Polygon::flip);
            polygons
        }
    };
    diagnostics.output_polygon_count = polygons.len();

    let (points, indices, seam_vertices) = conforming_triangles(&polygons, weld, eps);
    diagnostics.seam_vertex_count = seam_vertices;

    let (mesh, mesh_diagnostics) = finalize_mesh_with(points, indices, weld, MeshRepair::ORIENTED);
    if !mesh_diagnostics.is_watertight() {
        diagnostics
            .warnings
            .push(format!("{:?} left {} open edges", op, mesh_diagnostics.open_edge_count));
    }
    log::debug!(
        "boolean {:?}: {} + {} triangles -> {} ({} splits)",
        op,
        diagnostics.input_a_triangle_count,
        diagnostics.input_b_triangle_count,
        mesh.triangle_count(),
        diagnostics.split_polygon_count
    );

    Ok(BooleanResult {
        mesh,
        mesh_diagnostics,
        diagnostics,
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Seams
// ─────────────────────────────────────────────────────────────────────────────

/// Parameter of `point` along `a -> b` when it lies within `on_line` of the
/// segment and more than `margin` away from both ends.
fn point_on_segment(point: Point3, a: Point3, b: Point3, on_line: f64, margin: f64) -> Option<f64> {
    let ab = b.sub_point(a);
    let len2 = ab.length_squared();
    if !len2.is_finite() || len2 <= margin * margin {
        return None;
    }
    let t = point.sub_point(a).dot(ab) / len2;
    let end = margin / len2.sqrt();
    if t <= end || t >= 1.0 - end {
        return None;
    }
    let off = point.sub_point(a.add_vec(ab * t)).length_squared();
    (off <= on_line * on_line).then_some(t)
}

/// Height of a ring over its longest edge is at most `eps`.
fn is_sliver(ring: &[u32], points: &[Point3], eps: f64) -> bool {
    let at = |i: usize| points[ring[i % ring.len()] as usize];
    let origin = at(0);
    let mut twice_area = Vec3::ZERO;
    let mut longest = 0.0_f64;
    for i in 0..ring.len() {
        let (a, b) = (at(i), at(i + 1));
        twice_area = twice_area + a.sub_point(origin).cross(b.sub_point(origin));
        longest = longest.max(a.distance_to(b));
    }
    twice_area.length() <= eps * longest
}

/// Hash grid over vertex ids for segment queries.
struct PointGrid {
    cell: f64,
    cells: HashMap<[i64; 3], Vec<u32>>,
}

impl PointGrid {
    fn new(points: &[Point3], ids: impl IntoIterator<Item = u32>, cell: f64) -> Self {
        let mut grid = Self {
            cell,
            cells: HashMap::new(),
        };
        for id in ids {
            let key = grid.key(points[id as usize]);
            grid.cells.entry(key).or_default().push(id);
        }
        grid
    }

    fn key(&self, p: Point3) -> [i64; 3] {
        [p.x, p.y, p.z].map(|v| (v / self.cell).floor() as i64)
    }

    /// Ids in the cells around `a -> b`, sampled at most one cell apart.
    /// Covers every point within half a cell of the segment.
    fn near_segment(&self, a: Point3, b: Point3, out: &mut Vec<u32>) {
        out.clear();
        let steps = (a.distance_to(b) / self.cell).ceil().max(1.0) as usize;
        let mut keys: Vec<[i64; 3]> = Vec::with_capacity((steps + 1) * 27);
        for k in 0..=steps {
            let [x, y, z] = self.key(a.lerp(b, k as f64 / steps as f64));
            for dx in -1..=1 {
                for dy in -1..=1 {
                    for dz in -1..=1 {
                        keys.push([x + dx, y + dy, z + dz]);
                    }
                }
            }
        }
        keys.sort_unstable();
        keys.dedup();
        for key in &keys {
            if let Some(ids) = self.cells.get(key) {
                out.extend_from_slice(ids);
            }
        }
    }
}

/// Weld the clipped polygons and triangulate them so that shared seams
/// carry the same vertices on both sides.
///
/// Rings that gained seam vertices, and all rings above three vertices, are
/// fanned around their centroid; convex rings never yield a zero-area fan
/// triangle that way, even with collinear vertex runs. Returns the points,
/// the triangle indices and the number of seam insertions.
fn conforming_triangles(
    polygons: &[Polygon],
    weld: Tolerance,
    eps: f64,
) -> (Vec<Point3>, Vec<u32>, usize) {
    let flat: Vec<Point3> = polygons.iter().flat_map(|p| p.vertices.iter().copied()).collect();
    let order: Vec<u32> = (0..flat.len() as u32).collect();
    let (mut points, ids, _) = weld_mesh_vertices(flat, order, weld);

    let mut rings: Vec<Vec<u32>> = Vec::with_capacity(polygons.len());
    let mut start = 0;
    for polygon in polygons {
        let end = start + polygon.vertices.len();
        let mut ring = ids[start..end].to_vec();
        start = end;
        ring.dedup();
        while ring.len() > 1 && ring.first() == ring.last() {
            ring.pop();
        }
        if ring.len() >= 3 && !is_sliver(&ring, &points, eps) {
            rings.push(ring);
        }
    }

    let mut used = vec![false; points.len()];
    let (mut total, mut edge_count) = (0.0, 0usize);
    for ring in &rings {
        for (i, &a) in ring.iter().enumerate() {
            used[a as usize] = true;
            total += points[a as usize].distance_to(points[ring[(i + 1) % ring.len()] as usize]);
            edge_count += 1;
        }
    }
    let mean_edge = if edge_count == 0 { 0.0 } else { total / edge_count as f64 };
    let grid = PointGrid::new(
        &points,
        (0..points.len() as u32).filter(|&id| used[id as usize]),
        mean_edge.max(4.0 * eps),
    );

    // Keyed by (low id, high id); the vertices run from low to high.
    let mut seams: HashMap<(u32, u32), Vec<u32>> = HashMap::new();
    let mut candidates = Vec::new();
    let mut indices: Vec<u32> = Vec::with_capacity(rings.len() * 9);
    let mut inserted = 0;
    for ring in &rings {
        let mut full: Vec<u32> = Vec::with_capacity(ring.len());
        for (i, &a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            full.push(a);
            let key = (a.min(b), a.max(b));
            let between = seams.entry(key).or_insert_with(|| {
                let (lo, hi) = (points[key.0 as usize], points[key.1 as usize]);
                grid.near_segment(lo, hi, &mut candidates);
                let mut hits: Vec<(f64, u32)> = candidates
                    .iter()
                    .filter(|&&v| v != key.0 && v != key.1)
                    .filter_map(|&v| {
                        point_on_segment(points[v as usize], lo, hi, eps, weld.eps).map(|t| (t, v))
                    })
                    .collect();
                hits.sort_by(|x, y| x.0.total_cmp(&y.0));
                hits.into_iter().map(|(_, v)| v).collect()
            });
            let before = full.len();
            if a < b {
                full.extend(between.iter().filter(|&&v| !ring.contains(&v)));
            } else {
                full.extend(between.iter().rev().filter(|&&v| !ring.contains(&v)));
            }
            inserted += full.len() - before;
        }

        if full.len() == 3 {
            indices.extend_from_slice(&full);
            continue;
        }
        let sum = full
            .iter()
            .fold(Vec3::ZERO, |acc, &v| acc + points[v as usize].sub_point(Point3::ORIGIN));
        let centroid = Point3::ORIGIN.add_vec(sum * (1.0 / full.len() as f64));
        let c = points.len() as u32;
        points.push(centroid);
        for (i, &a) in full.iter().enumerate() {
            indices.extend_from_slice(&[c, a, full[(i + 1) % full.len()]]);
        }
    }
    (points, indices, inserted)
}

// ─────────────────────────────────────────────────────────────────────────────
// Point containment
// ─────────────────────────────────────────────────────────────────────────────

/// Skewed so rays rarely run along the axis-aligned edges bins are made of.
const PROBE_DIRECTIONS: [Vec3; 4] = [
    Vec3::new(1.0, 0.271_828_18, 0.314_159_27),
    Vec3::new(0.314_159_27, 1.0, 0.271_828_18),
    Vec3::new(0.271_828_18, 0.314_159_27, 1.0),
    Vec3::new(-0.577_215_66, 0.161_803_39, -1.0),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Crossing {
    Clean,
    /// Passes within tolerance of an edge or vertex, so parity is unreliable.
    Grazing,
}

/// Möller-Trumbore test of the ray `origin + s * dir`, `s > 0`, against a
/// triangle.
fn ray_crossing(
    origin: Point3,
    dir: Vec3,
    &[a, b, c]: &[Point3; 3],
    tol: Tolerance,
) -> Option<Crossing> {
    let (ab, ac) = (b - a, c - a);
    let p = dir.cross(ac);
    let det = ab.dot(p);
    if !det.is_finite() || det.abs() <= tol.eps * ab.length() * p.length() {
        return None;
    }

    let from_a = origin - a;
    let q = from_a.cross(ab);
    let (u, v, s) = (from_a.dot(p) / det, dir.dot(q) / det, ac.dot(q) / det);
    let outside = u < -tol.eps || u > 1.0 + tol.eps || v < -tol.eps || u + v > 1.0 + tol.eps;
    if outside || !s.is_finite() || s <= tol.eps {
        return None;
    }

    let edge = tol.eps * 10.0;
    let grazing = u.abs() <= edge || v.abs() <= edge || (1.0 - u - v).abs() <= edge;
    Some(if grazing { Crossing::Grazing } else { Crossing::Clean })
}

/// `point` lies in the triangle's plane and inside all three edges.
fn on_triangle(point: Point3, &[a, b, c]: &[Point3; 3], tol: Tolerance) -> bool {
    let Some(plane) = Plane::from_points(a, b, c) else {
        return false;
    };
    plane.distance(point).abs() <= tol.eps
        && [(a, b), (b, c), (c, a)].into_iter().all(|(start, end)| {
            let edge = end - start;
            edge.cross(point - start).dot(plane.normal) >= -tol.eps * edge.length()
        })
}

/// Parity of surface crossings along one ray; `None` when the ray grazes.
fn ray_parity(
    point: Point3,
    mesh: &GeomMesh,
    dir: Vec3,
    tol: Tolerance,
) -> Option<PointContainment> {
    let mut crossings = 0usize;
    let mut grazed = false;
    for tri in mesh.triangles() {
        if on_triangle(point, &tri, tol) {
            return Some(PointContainment::OnSurface);
        }
        match ray_crossing(point, dir, &tri, tol) {
            Some(Crossing::Clean) => crossings += 1,
            Some(Crossing::Grazing) => grazed = true,
            None => {}
        }
    }
    if grazed {
        None
    } else if crossings % 2 == 1 {
        Some(PointContainment::Inside)
    } else {
        Some(PointContainment::Outside)
    }
}

/// Classify a point against a closed triangle mesh by ray parity. Rays are
/// cast along [`PROBE_DIRECTIONS`] until two clean answers are in; if they
/// disagree the result is `Indeterminate`.
#[must_use]
pub fn classify_point(point: Point3, mesh: &GeomMesh, tol: Tolerance) -> PointContainment {
    let inside_bounds = mesh
        .bbox()
        .is_some_and(|bbox| bbox.expand_by(tol.eps).contains_point(point));
    if !inside_bounds {
        return PointContainment::Outside;
    }

    let mut first = None;
    for dir in PROBE_DIRECTIONS.iter().filter_map(|d| d.normalized()) {
        match (ray_parity(point, mesh, dir, tol), first) {
            (Some(PointContainment::OnSurface), _) => return PointContainment::OnSurface,
            (Some(answer), None) => first = Some(answer),
            (Some(answer), Some(earlier)) => {
                return if answer == earlier { answer } else { PointContainment::Indeterminate };
            }
            (None, _) => {}
        }
    }
    first.unwrap_or(PointContainment::Indeterminate)
}
