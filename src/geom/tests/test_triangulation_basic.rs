use crate::geom::mesh::{fix_triangle_winding_consistency, weld_mesh_vertices};
use crate::geom::{
    Point2, Point3, Tolerance, TriangulationResult, TrimLoop, TrimRegion, UvPoint, circle_outline,
    triangulate_trim_region,
};

fn trim_loop(points: &[(f64, f64)]) -> TrimLoop {
    let uv = points.iter().map(|&(u, v)| UvPoint::new(u, v)).collect();
    TrimLoop::new(uv, Tolerance::WELD).expect("trim loop")
}

/// Sum of triangle areas, checking every centroid lies in the region.
fn covered_area(region: &TrimRegion, result: &TriangulationResult) -> f64 {
    result
        .indices
        .chunks_exact(3)
        .map(|tri| {
            let [a, b, c] = [0, 1, 2].map(|k| result.vertices[tri[k] as usize]);
            let centroid = UvPoint::new((a.u + b.u + c.u) / 3.0, (a.v + b.v + c.v) / 3.0);
            assert!(region.contains(centroid), "centroid {centroid:?} escapes the region");
            0.5 * ((b.u - a.u) * (c.v - a.v) - (b.v - a.v) * (c.u - a.u))
        })
        .sum()
}

fn expected_area(region: &TrimRegion) -> f64 {
    let holes: f64 = region.holes.iter().map(|h| h.signed_area().abs()).sum();
    region.outer.signed_area().abs() - holes
}

#[test]
fn ring_grid_floor_is_covered_once() {
    // 3x3 grid without its centre cell: the floor of a picture-frame bin.
    let outer = trim_loop(&[(0.0, 0.0), (126.0, 0.0), (126.0, 126.0), (0.0, 126.0)]);
    let hole = trim_loop(&[(42.0, 42.0), (42.0, 84.0), (84.0, 84.0), (84.0, 42.0)]);
    let region = TrimRegion::from_loops(vec![outer, hole], Tolerance::WELD).expect("region");
    let result = triangulate_trim_region(&region, Tolerance::WELD).expect("triangulation");

    assert!(result.indices.iter().all(|&i| (i as usize) < result.vertices.len()));
    let area = covered_area(&region, &result);
    assert!((area - 8.0 * 42.0 * 42.0).abs() < 1e-6);
    assert!((area - expected_area(&region)).abs() < 1e-6);
}

#[test]
fn plate_with_two_round_holes() {
    let outer = trim_loop(&[(-21.0, -21.0), (21.0, -21.0), (21.0, 21.0), (-21.0, 21.0)]);
    let holes = [Point2::new(-13.0, -13.0), Point2::new(13.0, 13.0)]
        .map(|c| {
            let points: Vec<_> = circle_outline(c, 3.25, 16).iter().map(|p| (p.x, p.y)).collect();
            trim_loop(&points)
        });
    let mut loops = vec![outer];
    loops.extend(holes);
    let region = TrimRegion::from_loops(loops, Tolerance::WELD).expect("region");
    let result = triangulate_trim_region(&region, Tolerance::WELD).expect("triangulation");

    assert_eq!(result.diagnostics.output_triangle_count, result.indices.len() / 3);
    assert!((covered_area(&region, &result) - expected_area(&region)).abs() < 1e-6);
}

#[test]
fn rectilinear_cap_with_notch_keeps_full_area() {
    // L-shaped outline, the kind of loop a cell region with a missing cell
    // produces.
    let outer = trim_loop(&[
        (0.0, 0.0),
        (84.0, 0.0),
        (84.0, 42.0),
        (42.0, 42.0),
        (42.0, 84.0),
        (0.0, 84.0),
    ]);
    let region = TrimRegion::from_loops(vec![outer], Tolerance::WELD).expect("region");
    let result = triangulate_trim_region(&region, Tolerance::WELD).expect("triangulation");

    assert_eq!(result.diagnostics.output_triangle_count, 4);
    assert!((covered_area(&region, &result) - 3.0 * 42.0 * 42.0).abs() < 1e-6);
}

#[test]
fn concave_outline_with_notch_hole() {
    // Divider notch section: a U with flanges, holding a small hole.
    let outer = trim_loop(&[
        (-8.0, 1.0),
        (-8.0, 0.0),
        (-6.0, 0.0),
        (-6.0, -9.0),
        (6.0, -9.0),
        (6.0, 0.0),
        (8.0, 0.0),
        (8.0, 1.0),
    ]);
    let hole = trim_loop(&[(-1.0, -5.0), (1.0, -5.0), (1.0, -3.0), (-1.0, -3.0)]);
    let region = TrimRegion::from_loops(vec![outer, hole], Tolerance::WELD).expect("region");
    let result = triangulate_trim_region(&region, Tolerance::WELD).expect("triangulation");

    assert!((covered_area(&region, &result) - (16.0 + 12.0 * 9.0 - 4.0)).abs() < 1e-9);
}

#[test]
fn weld_merges_points_within_tolerance() {
    let points = vec![
        Point3::new(20.75, 0.0, 4.75),
        Point3::new(20.75, 0.0, 4.75 + 1e-8),
        Point3::new(20.75, 1.0, 4.75),
    ];
    let (out_points, out_indices, welded) =
        weld_mesh_vertices(points, vec![0, 2, 1], Tolerance::new(1e-6));

    assert_eq!(welded, 1);
    assert_eq!(out_points.len(), 2);
    assert_eq!(out_indices, vec![0, 1, 0]);
    assert_eq!(out_points[0], Point3::new(20.75, 0.0, 4.75));
}

#[test]
fn winding_fix_makes_shared_edges_opposite() {
    let mut indices = vec![0u32, 1, 2, 0, 3, 2];
    assert_eq!(fix_triangle_winding_consistency(&mut indices), 1);

    let directed = |tri: &[u32]| {
        [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])]
            .into_iter()
            .find(|&(a, b)| (a, b) == (0, 2) || (a, b) == (2, 0))
            .expect("shared edge")
    };
    let (a0, b0) = directed(&indices[..3]);
    let (a1, b1) = directed(&indices[3..]);
    assert_eq!((a0, b0), (b1, a1));
}
