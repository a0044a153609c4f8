mod boolean;
mod core;
mod diagnostics;
mod extrusion;
mod fillet_chamfer;
mod loft;
mod mesh;
mod trim;
mod triangulation;

pub use boolean::{
    BooleanDiagnostics, BooleanError, BooleanOp, BooleanResult, PointContainment, boolean_meshes,
    classify_point,
};
pub use core::{BBox, Point2, Point3, Tolerance, Transform, Vec3, signed_area_2d};
pub use diagnostics::GeomMeshDiagnostics;
pub use extrusion::{
    ExtrusionCaps, ExtrusionError, circle_outline, extrude_box, extrude_cylinder, extrude_outline_z,
    extrude_polyline,
};
pub use fillet_chamfer::{
    FilletChamferError, FilletPolylineDiagnostics, fillet_polyline_corners, fillet_polyline_points,
    fillet_section_corners,
};
pub use loft::{LoftCaps, LoftError, LoftStation, loft_stations, sweep_closed_stations};
pub use mesh::{GeomMesh, facet_normal, mesh_diagnostics};
pub use triangulation::{TriangulationDiagnostics, TriangulationResult, triangulate_trim_region};
pub use trim::{TrimError, TrimLoop, TrimRegion, UvPoint};

#[cfg(test)]
mod tests;
