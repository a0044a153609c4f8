//! Indexed triangle meshes and the repair pass every kernel operation ends
//! with (weld, cull, re-wind, orient).

use std::collections::HashMap;

use super::diagnostics::GeomMeshDiagnostics;
use super::{BBox, Point3, Tolerance, Transform, Vec3};

/// Indexed triangle mesh produced by every kernel operation.
///
/// Triangles are wound counter-clockwise when seen from outside the solid.
/// Vertex normals are not stored; exporters derive facet normals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeomMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
}

impl GeomMesh {
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }

    /// Any coordinate is NaN or infinite.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions.iter().flatten().any(|c| !c.is_finite())
    }

    /// Every index points at an existing vertex.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len();
        self.indices.iter().all(|&i| (i as usize) < n)
    }

    /// Buffer sanity checks run before export.
    pub fn validate(&self) -> Result<(), String> {
        if self.indices.len() % 3 != 0 {
            Err(format!("index count {} is not a multiple of 3", self.indices.len()))
        } else if self.has_invalid_vertices() {
            Err("mesh has NaN or infinite vertex coordinates".to_string())
        } else if !self.has_valid_indices() {
            Err("mesh has out-of-bounds vertex indices".to_string())
        } else {
            Ok(())
        }
    }

    #[must_use]
    pub fn points(&self) -> Vec<Point3> {
        self.positions.iter().copied().map(Point3::from_array).collect()
    }

    fn corner(&self, index: u32) -> Point3 {
        Point3::from_array(self.positions[index as usize])
    }

    /// Corner positions of every triangle.
    pub fn triangles(&self) -> impl Iterator<Item = [Point3; 3]> + '_ {
        self.indices
            .chunks_exact(3)
            .map(|tri| [self.corner(tri[0]), self.corner(tri[1]), self.corner(tri[2])])
    }

    #[must_use]
    pub fn bbox(&self) -> Option<BBox> {
        BBox::from_points(&self.points())
    }

    /// Enclosed volume in mm³; positive for outward winding.
    #[must_use]
    pub fn volume(&self) -> f64 {
        signed_volume(&self.points(), &self.indices)
    }

    #[must_use]
    pub fn translated(&self, offset: Vec3) -> Self {
        self.transformed(Transform::translate(offset))
    }

    /// Mirroring transforms also flip the winding so the mesh stays outward
    /// facing.
    #[must_use]
    pub fn transformed(&self, transform: Transform) -> Self {
        let positions = self
            .positions
            .iter()
            .map(|&p| transform.apply_point(Point3::from_array(p)).to_array())
            .collect();
        let mut indices = self.indices.clone();
        if transform.linear_determinant() < 0.0 {
            flip_all_triangles(&mut indices);
        }
        Self::new(positions, indices)
    }

    /// Concatenate meshes without any boolean work. Only valid for solids
    /// that do not overlap, such as copies placed in separate grid cells.
    #[must_use]
    pub fn merged<'a>(meshes: impl IntoIterator<Item = &'a GeomMesh>) -> Self {
        meshes.into_iter().fold(Self::default(), |mut out, mesh| {
            let base = out.positions.len() as u32;
            out.positions.extend_from_slice(&mesh.positions);
            out.indices.extend(mesh.indices.iter().map(|&i| i + base));
            out
        })
    }
}

/// Repairs applied by [`finalize_mesh_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MeshRepair {
    /// Propagate a consistent winding across shared edges and orient closed
    /// meshes outward. Boolean output is already oriented and skips this.
    pub fix_winding: bool,
}

impl MeshRepair {
    pub const FULL: Self = Self { fix_winding: true };
    pub const ORIENTED: Self = Self { fix_winding: false };
}

pub(crate) fn finalize_mesh(
    points: Vec<Point3>,
    indices: Vec<u32>,
    tol: Tolerance,
) -> (GeomMesh, GeomMeshDiagnostics) {
    finalize_mesh_with(points, indices, tol, MeshRepair::FULL)
}

pub(crate) fn finalize_mesh_with(
    points: Vec<Point3>,
    indices: Vec<u32>,
    tol: Tolerance,
    repair: MeshRepair,
) -> (GeomMesh, GeomMeshDiagnostics) {
    let (points, indices, welded_vertex_count) = weld_mesh_vertices(points, indices, tol);
    let (mut indices, degenerate_triangle_count) =
        cull_degenerate_triangles(&points, &indices, tol);
    let flipped_triangle_count = if repair.fix_winding {
        fix_triangle_winding_consistency(&mut indices)
    } else {
        0
    };
    let (open_edge_count, non_manifold_edge_count) = count_edge_topology(&indices);

    let mut diagnostics = GeomMeshDiagnostics {
        vertex_count: points.len(),
        triangle_count: indices.len() / 3,
        welded_vertex_count,
        flipped_triangle_count,
        degenerate_triangle_count,
        open_edge_count,
        non_manifold_edge_count,
        warnings: Vec::new(),
    };
    // Winding is only consistent, not necessarily outward, until the volume
    // of a closed result says so.
    if repair.fix_winding
        && diagnostics.is_valid_solid()
        && signed_volume(&points, &indices) < 0.0
    {
        flip_all_triangles(&mut indices);
        diagnostics.add_warning("mesh orientation flipped (outward)");
    }
    add_topology_warnings(&mut diagnostics);

    let mesh = GeomMesh::new(points.into_iter().map(Point3::to_array).collect(), indices);
    (mesh, diagnostics)
}

/// Re-run the topology checks on an existing mesh.
#[must_use]
pub fn mesh_diagnostics(mesh: &GeomMesh) -> GeomMeshDiagnostics {
    let (open_edge_count, non_manifold_edge_count) = count_edge_topology(&mesh.indices);
    let mut diagnostics = GeomMeshDiagnostics {
        vertex_count: mesh.vertex_count(),
        triangle_count: mesh.triangle_count(),
        open_edge_count,
        non_manifold_edge_count,
        ..GeomMeshDiagnostics::default()
    };
    add_topology_warnings(&mut diagnostics);
    diagnostics
}

fn add_topology_warnings(diagnostics: &mut GeomMeshDiagnostics) {
    if !diagnostics.is_watertight() {
        diagnostics.add_warning("mesh has open edges");
    }
    if !diagnostics.is_manifold() {
        diagnostics.add_warning("mesh has non-manifold edges");
    }
}

/// Merges vertices closer than `tol` using a hash grid of `tol`-sized cells.
/// Returns the kept points, remapped indices and the number merged.
pub(crate) fn weld_mesh_vertices(
    points: Vec<Point3>,
    indices: Vec<u32>,
    tol: Tolerance,
) -> (Vec<Point3>, Vec<u32>, usize) {
    if !(tol.eps.is_finite() && tol.eps > 0.0) {
        return (points, indices, 0);
    }

    // Non-finite coordinates get no cell and never weld.
    let cell_of = |p: Point3| -> Option<[i64; 3]> {
        let axis = |v: f64| {
            v.is_finite()
                .then(|| (v / tol.eps).floor().clamp(i64::MIN as f64, i64::MAX as f64) as i64)
        };
        Some([axis(p.x)?, axis(p.y)?, axis(p.z)?])
    };
    let neighbours = || {
        (-1i64..=1).flat_map(|dx| {
            (-1i64..=1).flat_map(move |dy| (-1i64..=1).map(move |dz| [dx, dy, dz]))
        })
    };

    let mut cells: HashMap<[i64; 3], Vec<u32>> = HashMap::new();
    let mut kept: Vec<Point3> = Vec::with_capacity(points.len());
    let mut remap: Vec<u32> = Vec::with_capacity(points.len());
    for &p in &points {
        let cell = cell_of(p);
        let existing = cell.and_then(|[x, y, z]| {
            neighbours().find_map(|[dx, dy, dz]| {
                cells
                    .get(&[x + dx, y + dy, z + dz])?
                    .iter()
                    .copied()
                    .find(|&k| tol.approx_eq_point3(kept[k as usize], p))
            })
        });
        let id = existing.unwrap_or_else(|| {
            let id = kept.len() as u32;
            kept.push(p);
            if let Some(cell) = cell {
                cells.entry(cell).or_default().push(id);
            }
            id
        });
        remap.push(id);
    }

    let indices = indices
        .into_iter()
        .map(|i| remap.get(i as usize).copied().unwrap_or(i))
        .collect();
    let welded = points.len().saturating_sub(kept.len());
    (kept, indices, welded)
}

/// Drops triangles with repeated or missing corners and zero-area slivers.
fn cull_degenerate_triangles(
    points: &[Point3],
    indices: &[u32],
    tol: Tolerance,
) -> (Vec<u32>, usize) {
    let min_area2 = tol.eps_squared() * tol.eps_squared();
    let mut kept = Vec::with_capacity(indices.len());
    for tri in indices.chunks_exact(3) {
        let distinct = tri[0] != tri[1] && tri[1] != tri[2] && tri[0] != tri[2];
        let corners = [tri[0], tri[1], tri[2]].map(|i| points.get(i as usize).copied());
        let keep = match corners {
            [Some(a), Some(b), Some(c)] if distinct => {
                let area2 = (b - a).cross(c - a).length_squared();
                area2.is_finite() && area2 > min_area2
            }
            _ => false,
        };
        if keep {
            kept.extend_from_slice(tri);
        }
    }
    let removed = indices.len() / 3 - kept.len() / 3;
    (kept, removed)
}

fn triangle_edges(indices: &[u32], t: usize) -> [(u32, u32); 3] {
    let (a, b, c) = (indices[3 * t], indices[3 * t + 1], indices[3 * t + 2]);
    [(a, b), (b, c), (c, a)]
}

/// Undirected key of a directed edge and whether it runs low to high.
fn edge_key(a: u32, b: u32) -> ((u32, u32), bool) {
    if a <= b { ((a, b), true) } else { ((b, a), false) }
}

/// Flood-fills across manifold edges so neighbouring triangles traverse
/// their shared edge in opposite directions. Each connected patch keeps the
/// winding of its first triangle. Returns the number of triangles flipped.
pub(crate) fn fix_triangle_winding_consistency(indices: &mut [u32]) -> usize {
    let triangles = indices.len() / 3;
    let mut edges: HashMap<(u32, u32), Vec<(usize, bool)>> = HashMap::with_capacity(triangles * 3);
    for t in 0..triangles {
        for (a, b) in triangle_edges(indices, t) {
            let (key, forward) = edge_key(a, b);
            edges.entry(key).or_default().push((t, forward));
        }
    }

    let mut flip: Vec<Option<bool>> = vec![None; triangles];
    for seed in 0..triangles {
        if flip[seed].is_some() {
            continue;
        }
        flip[seed] = Some(false);
        let mut stack = vec![seed];
        while let Some(t) = stack.pop() {
            let t_flipped = flip[t] == Some(true);
            for (a, b) in triangle_edges(indices, t) {
                let (key, forward) = edge_key(a, b);
                let Some(&[(t0, f0), (t1, f1)]) = edges.get(&key).map(Vec::as_slice) else {
                    continue;
                };
                let (other, other_forward) = match (t0 == t, t1 == t) {
                    (true, _) => (t1, f1),
                    (_, true) => (t0, f0),
                    _ => continue,
                };
                if flip[other].is_none() {
                    // Same direction on the shared edge means opposite
                    // winding.
                    flip[other] = Some(t_flipped ^ (forward == other_forward));
                    stack.push(other);
                }
            }
        }
    }

    let mut flipped = 0;
    for (t, _) in flip.iter().enumerate().filter(|(_, f)| **f == Some(true)) {
        indices.swap(3 * t + 1, 3 * t + 2);
        flipped += 1;
    }
    flipped
}

/// Counts edges used once (open) and more than twice (non-manifold).
pub(crate) fn count_edge_topology(indices: &[u32]) -> (usize, usize) {
    let mut uses: HashMap<(u32, u32), u32> = HashMap::new();
    for tri in indices.chunks_exact(3) {
        if tri[0] == tri[1] || tri[1] == tri[2] || tri[0] == tri[2] {
            continue;
        }
        for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
            *uses.entry(edge_key(a, b).0).or_default() += 1;
        }
    }
    uses.into_values().fold((0, 0), |(open, non_manifold), n| match n {
        1 => (open + 1, non_manifold),
        n if n > 2 => (open, non_manifold + 1),
        _ => (open, non_manifold),
    })
}

fn flip_all_triangles(indices: &mut [u32]) {
    for tri in indices.chunks_exact_mut(3) {
        tri.swap(1, 2);
    }
}

/// Sum of signed tetrahedra against the origin.
pub(crate) fn signed_volume(points: &[Point3], indices: &[u32]) -> f64 {
    let sixfold: f64 = indices
        .chunks_exact(3)
        .filter_map(|tri| {
            let [a, b, c] = [tri[0], tri[1], tri[2]]
                .map(|i| points.get(i as usize).map(|p| p.sub_point(Point3::ORIGIN)));
            Some(a?.dot(b?.cross(c?)))
        })
        .sum();
    sixfold / 6.0
}

/// Unit facet normal of a triangle, or +Z for degenerate input.
#[must_use]
pub fn facet_normal(tri: &[Point3; 3]) -> Vec3 {
    (tri[1] - tri[0]).cross(tri[2] - tri[0]).normalized().unwrap_or(Vec3::Z)
}
