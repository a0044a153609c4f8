use crate::geom::{
    LoftCaps, LoftError, LoftStation, Point2, Tolerance, loft_stations, sweep_closed_stations,
};

fn square(min: f64, max: f64) -> Vec<Point2> {
    vec![
        Point2::new(min, min),
        Point2::new(max, min),
        Point2::new(max, max),
        Point2::new(min, max),
    ]
}

fn reversed(mut points: Vec<Point2>) -> Vec<Point2> {
    points.reverse();
    points
}

#[test]
fn frustum_loft_is_closed_and_has_expected_volume() {
    let stations = [
        LoftStation::new(0.0, vec![square(-1.0, 1.0)]),
        LoftStation::new(1.0, vec![square(-0.5, 0.5)]),
    ];
    let (mesh, diag) = loft_stations(&stations, LoftCaps::BOTH, Tolerance::WELD).unwrap();

    assert!(diag.is_valid_solid());
    assert_eq!(diag.vertex_count, 8);
    let expected = (4.0 + 1.0 + 2.0) / 3.0;
    assert!((mesh.volume() - expected).abs() < 1e-9);
}

#[test]
fn loft_with_hole_caps_the_annulus() {
    let loops = vec![square(0.0, 4.0), reversed(square(1.0, 3.0))];
    let stations = [
        LoftStation::new(0.0, loops.clone()),
        LoftStation::new(0.5, loops.clone()),
        LoftStation::new(1.0, loops),
    ];
    let (mesh, diag) = loft_stations(&stations, LoftCaps::BOTH, Tolerance::WELD).unwrap();

    assert!(diag.is_valid_solid(), "{diag}");
    assert!((mesh.volume() - 12.0).abs() < 1e-9);
}

#[test]
fn separate_islands_become_separate_caps() {
    let loops = vec![square(0.0, 1.0), square(2.0, 3.0)];
    let stations = [LoftStation::new(0.0, loops.clone()), LoftStation::new(2.0, loops)];
    let (mesh, diag) = loft_stations(&stations, LoftCaps::BOTH, Tolerance::WELD).unwrap();

    assert!(diag.is_valid_solid());
    assert!((mesh.volume() - 4.0).abs() < 1e-9);
}

#[test]
fn open_loft_leaves_boundary_edges() {
    let stations = [
        LoftStation::new(0.0, vec![square(0.0, 1.0)]),
        LoftStation::new(1.0, vec![square(0.0, 1.0)]),
    ];
    let (_, diag) = loft_stations(&stations, LoftCaps::NONE, Tolerance::WELD).unwrap();
    assert_eq!(diag.open_edge_count, 8);
}

#[test]
fn mismatched_stations_are_rejected() {
    let mut pentagon = square(0.0, 1.0);
    pentagon.push(Point2::new(-0.5, 0.5));
    let stations = [
        LoftStation::new(0.0, vec![square(0.0, 1.0)]),
        LoftStation::new(1.0, vec![pentagon]),
    ];
    let err = loft_stations(&stations, LoftCaps::BOTH, Tolerance::WELD).unwrap_err();
    assert!(matches!(err, LoftError::StationMismatch { index: 1 }));

    let stations = [
        LoftStation::new(1.0, vec![square(0.0, 1.0)]),
        LoftStation::new(1.0, vec![square(0.0, 1.0)]),
    ];
    let err = loft_stations(&stations, LoftCaps::BOTH, Tolerance::WELD).unwrap_err();
    assert!(matches!(err, LoftError::NonIncreasingHeight { index: 1 }));

    let err = loft_stations(&stations[..1], LoftCaps::BOTH, Tolerance::WELD).unwrap_err();
    assert!(matches!(err, LoftError::NotEnoughStations { min: 2, count: 1 }));
}

#[test]
fn closed_sweep_of_a_rectangular_section_builds_a_wall() {
    // (inset, z) section traced clockwise: up the outside, across, down the inside.
    let section = [(0.0, 0.0), (0.0, 1.0), (1.0, 1.0), (1.0, 0.0)];
    let stations: Vec<LoftStation> = section
        .iter()
        .map(|&(inset, z)| LoftStation::new(z, vec![square(inset, 10.0 - inset)]))
        .collect();

    let (mesh, diag) = sweep_closed_stations(&stations, Tolerance::WELD).unwrap();
    assert!(diag.is_valid_solid());
    assert_eq!(diag.flipped_triangle_count, 0);
    assert!((mesh.volume() - 36.0).abs() < 1e-9);
}
