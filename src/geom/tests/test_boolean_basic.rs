use super::box_mesh;
use crate::geom::{
    BooleanOp, Point3, PointContainment, Tolerance, Vec3, boolean_meshes, classify_point,
};

fn unit_cubes() -> (crate::geom::GeomMesh, crate::geom::GeomMesh) {
    let a = box_mesh(Point3::ORIGIN, Vec3::new(1.0, 1.0, 1.0));
    let b = box_mesh(Point3::new(0.5, 0.25, 0.25), Vec3::new(1.0, 1.0, 1.0));
    (a, b)
}

#[test]
fn classify_point_cube_inside_outside() {
    let cube = box_mesh(Point3::ORIGIN, Vec3::new(1.0, 1.0, 1.0));
    let tol = Tolerance::LOOSE;
    assert_eq!(classify_point(Point3::new(0.5, 0.5, 0.5), &cube, tol), PointContainment::Inside);
    assert_eq!(classify_point(Point3::new(2.0, 0.5, 0.5), &cube, tol), PointContainment::Outside);
    assert_eq!(classify_point(Point3::new(1.0, 0.4, 0.3), &cube, tol), PointContainment::OnSurface);
}

#[test]
fn union_of_overlapping_cubes_has_combined_volume() {
    let (a, b) = unit_cubes();
    let result = boolean_meshes(&a, &b, BooleanOp::Union, Tolerance::PLANE).expect("union");

    let overlap = 0.5 * 0.75 * 0.75;
    assert!((result.mesh.volume() - (2.0 - overlap)).abs() < 1e-6);
    assert!(!result.diagnostics.disjoint_fast_path);
    assert!(result.diagnostics.split_polygon_count > 0);
    assert_eq!(result.mesh.indices.len() % 3, 0);
    assert!(result.mesh.has_valid_indices());

    let tol = Tolerance::LOOSE;
    assert_eq!(
        classify_point(Point3::new(1.25, 0.75, 0.75), &result.mesh, tol),
        PointContainment::Inside
    );
    assert_eq!(
        classify_point(Point3::new(1.25, 0.1, 0.1), &result.mesh, tol),
        PointContainment::Outside
    );
}

#[test]
fn difference_removes_the_overlap() {
    let (a, b) = unit_cubes();
    let result =
        boolean_meshes(&a, &b, BooleanOp::Difference, Tolerance::PLANE).expect("difference");

    let overlap = 0.5 * 0.75 * 0.75;
    assert!((result.mesh.volume() - (1.0 - overlap)).abs() < 1e-6);

    let tol = Tolerance::LOOSE;
    assert_eq!(
        classify_point(Point3::new(0.75, 0.6, 0.6), &result.mesh, tol),
        PointContainment::Outside
    );
    assert_eq!(
        classify_point(Point3::new(0.25, 0.6, 0.6), &result.mesh, tol),
        PointContainment::Inside
    );
}

#[test]
fn intersection_keeps_only_the_overlap() {
    let (a, b) = unit_cubes();
    let result =
        boolean_meshes(&a, &b, BooleanOp::Intersection, Tolerance::PLANE).expect("intersection");

    assert!((result.mesh.volume() - 0.5 * 0.75 * 0.75).abs() < 1e-6);
    let bbox = result.mesh.bbox().expect("bbox");
    assert!((bbox.min.x - 0.5).abs() < 1e-9);
    assert!((bbox.max.y - 1.0).abs() < 1e-9);
}

#[test]
fn disjoint_operands_take_the_fast_path() {
    let a = box_mesh(Point3::ORIGIN, Vec3::new(1.0, 1.0, 1.0));
    let b = box_mesh(Point3::new(3.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));

    let union = boolean_meshes(&a, &b, BooleanOp::Union, Tolerance::PLANE).expect("union");
    assert!(union.diagnostics.disjoint_fast_path);
    assert!((union.mesh.volume() - 2.0).abs() < 1e-9);
    assert!(union.mesh_diagnostics.is_valid_solid());

    let intersection =
        boolean_meshes(&a, &b, BooleanOp::Intersection, Tolerance::PLANE).expect("intersection");
    assert!(intersection.mesh.is_empty());

    let difference =
        boolean_meshes(&a, &b, BooleanOp::Difference, Tolerance::PLANE).expect("difference");
    assert_eq!(difference.mesh.triangle_count(), a.triangle_count());
}

#[test]
fn flush_faces_merge_into_one_solid() {
    let a = box_mesh(Point3::ORIGIN, Vec3::new(1.0, 1.0, 1.0));
    let b = box_mesh(Point3::new(1.0, 0.0, 0.0), Vec3::new(1.0, 1.0, 1.0));

    let result = boolean_meshes(&a, &b, BooleanOp::Union, Tolerance::PLANE).expect("union");
    assert!((result.mesh.volume() - 2.0).abs() < 1e-6);
    assert_eq!(
        classify_point(Point3::new(1.0, 0.5, 0.5), &result.mesh, Tolerance::LOOSE),
        PointContainment::Inside
    );
}

#[test]
fn non_finite_input_is_rejected() {
    let mut a = box_mesh(Point3::ORIGIN, Vec3::new(1.0, 1.0, 1.0));
    let b = a.clone();
    a.positions[0][0] = f64::NAN;
    assert!(boolean_meshes(&a, &b, BooleanOp::Union, Tolerance::PLANE).is_err());
}

#[test]
fn stacked_boxes_union_is_closed() {
    let slab = box_mesh(Point3::ORIGIN, Vec3::new(2.0, 2.0, 1.0));
    let post = box_mesh(Point3::new(0.5, 0.5, 1.0), Vec3::new(1.0, 1.0, 1.0));

    let result = boolean_meshes(&slab, &post, BooleanOp::Union, Tolerance::PLANE).expect("union");
    assert!((result.mesh.volume() - 5.0).abs() < 1e-6);
    assert!(result.diagnostics.seam_vertex_count > 0);
    assert!(result.mesh_diagnostics.is_valid_solid(), "{}", result.mesh_diagnostics);
    assert!(result.diagnostics.warnings.is_empty(), "{:?}", result.diagnostics.warnings);
}

#[test]
fn overlapping_cube_results_are_closed() {
    let (a, b) = unit_cubes();
    for op in [BooleanOp::Union, BooleanOp::Difference, BooleanOp::Intersection] {
        let result = boolean_meshes(&a, &b, op, Tolerance::PLANE).expect("boolean");
        assert!(result.mesh_diagnostics.is_valid_solid(), "{op:?}: {}", result.mesh_diagnostics);
        assert!(result.mesh.volume() > 0.0, "{op:?}");
    }
}

#[test]
fn pocket_cut_through_a_slab_is_closed() {
    let slab = box_mesh(Point3::ORIGIN, Vec3::new(4.0, 4.0, 2.0));
    let pocket = box_mesh(Point3::new(1.0, 1.0, 1.0), Vec3::new(2.0, 2.0, 2.0));
    let hole = box_mesh(Point3::new(1.5, 1.5, -1.0), Vec3::new(1.0, 1.0, 4.0));

    let cup =
        boolean_meshes(&slab, &pocket, BooleanOp::Difference, Tolerance::PLANE).expect("pocket");
    assert!(cup.mesh_diagnostics.is_valid_solid(), "{}", cup.mesh_diagnostics);
    let ring =
        boolean_meshes(&cup.mesh, &hole, BooleanOp::Difference, Tolerance::PLANE).expect("hole");
    assert!(ring.mesh_diagnostics.is_valid_solid(), "{}", ring.mesh_diagnostics);
    assert!((ring.mesh.volume() - (32.0 - 4.0 - 1.0)).abs() < 1e-6);
}
