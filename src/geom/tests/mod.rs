mod test_boolean_basic;
mod test_loft_basic;
mod test_triangulation_basic;

use crate::geom::{ExtrusionCaps, GeomMesh, Point3, Tolerance, Vec3, extrude_polyline};

/// Axis-aligned box from `min` with the given size.
pub(super) fn box_mesh(min: Point3, size: Vec3) -> GeomMesh {
    let profile = [
        min,
        Point3::new(min.x + size.x, min.y, min.z),
        Point3::new(min.x + size.x, min.y + size.y, min.z),
        Point3::new(min.x, min.y + size.y, min.z),
    ];
    let (mesh, _) = extrude_polyline(
        &profile,
        Vec3::new(0.0, 0.0, size.z),
        ExtrusionCaps::BOTH,
        Tolerance::WELD,
    )
    .expect("extrude box");
    mesh
}
