use gridfinity::geom::{
    GeomMesh, PointContainment, Point3, Tolerance, classify_point, mesh_diagnostics,
};
use gridfinity::{
    Bin, BinConfig, Compartment, Grid, ModelOptions, Part, PartError, SlidingLidBin,
    sliding_lid_bin,
};

fn options() -> ModelOptions {
    ModelOptions::new(2)
}

fn assert_solid(name: &str, mesh: &GeomMesh) {
    let diagnostics = mesh_diagnostics(mesh);
    assert!(diagnostics.is_valid_solid(), "{name}: {}", diagnostics.summary());
    assert!(mesh.volume() > 0.0, "{name}: non-positive volume");
}

fn containment(mesh: &GeomMesh, x: f64, y: f64, z: f64) -> PointContainment {
    classify_point(Point3::new(x, y, z), mesh, Tolerance::LOOSE)
}

#[test]
fn plain_bin_has_floor_walls_and_lip() {
    let grid = Grid::filled(1, 1).expect("grid");
    let bin = Bin::new(&grid, 21.0)
        .with_compartment(Compartment::new(&grid, 14.0))
        .mesh(&options())
        .expect("bin mesh");
    assert_solid("1x1 bin", &bin);

    let bbox = bin.bbox().expect("bbox");
    assert!(bbox.min.z.abs() < 1e-9);
    assert!(bbox.max.z > 24.0 && bbox.max.z < 25.4);
    assert!((bbox.max.x - 20.75).abs() < 1e-9);

    assert_eq!(containment(&bin, 0.0, 0.0, 10.0), PointContainment::Outside);
    assert_eq!(containment(&bin, 0.0, 0.0, 5.5), PointContainment::Inside);
    assert_eq!(containment(&bin, 20.5, 0.0, 10.0), PointContainment::Inside);
    assert_eq!(containment(&bin, 20.5, 0.0, 22.0), PointContainment::Inside);
}

#[test]
fn divided_bin_with_label_and_scoop() {
    let grid = Grid::filled(2, 1).expect("grid");
    let solid = Bin::new(&grid, 21.0)
        .with_compartment(Compartment::new(&grid, 14.0))
        .without_stacking_lip()
        .mesh(&options())
        .expect("plain");
    let compartment = Compartment::subdivided(&grid, 14.0, 2, 1)
        .with_cutout(12.0)
        .with_label(true)
        .with_scoop(true);
    let divided = Bin::new(&grid, 21.0)
        .with_compartment(compartment)
        .without_stacking_lip()
        .mesh(&options())
        .expect("divided");
    assert_solid("divided bin", &divided);

    // Divider, label shelf and scoop ramp all add material.
    assert!(divided.volume() > solid.volume());
    assert_eq!(containment(&divided, 0.0, 15.0, 12.0), PointContainment::Inside);
    assert_eq!(containment(&divided, 0.0, 0.0, 18.0), PointContainment::Outside);
    assert_eq!(containment(&divided, 40.0, 0.0, 20.0), PointContainment::Inside);
    assert_eq!(containment(&divided, -40.0, 0.0, 7.5), PointContainment::Inside);
}

#[test]
fn irregular_grid_leaves_the_empty_cell_open() {
    let grid = Grid::parse("##/#.").expect("grid");
    let bin = Bin::new(&grid, 14.0)
        .with_compartment(Compartment::new(&grid, 7.0))
        .mesh(&options())
        .expect("bin");
    assert_solid("L bin", &bin);

    assert_eq!(containment(&bin, 21.0, -21.0, 3.0), PointContainment::Outside);
    assert_eq!(containment(&bin, -21.0, -21.0, 3.0), PointContainment::Inside);
    assert_eq!(containment(&bin, -10.0, 10.0, 10.0), PointContainment::Outside);
}

#[test]
fn screw_holes_open_the_bottom() {
    let grid = Grid::filled(1, 1).expect("grid");
    let bin = Bin::new(&grid, 14.0)
        .without_stacking_lip()
        .with_screw_holes(true)
        .mesh(&options())
        .expect("bin");
    assert_solid("bin with holes", &bin);

    assert_eq!(containment(&bin, 13.0, 13.0, 1.0), PointContainment::Outside);
    assert_eq!(containment(&bin, -13.0, 13.0, 4.0), PointContainment::Outside);
    assert_eq!(containment(&bin, 0.0, 0.0, 1.0), PointContainment::Inside);
}

#[test]
fn too_deep_compartment_is_rejected() {
    let grid = Grid::filled(1, 1).expect("grid");
    let err = Bin::new(&grid, 14.0)
        .with_compartment(Compartment::new(&grid, 10.0))
        .mesh(&options())
        .unwrap_err();
    assert!(matches!(err, PartError::CompartmentTooDeep { .. }), "{err}");
}

#[test]
fn sliding_lid_bin_and_cover() {
    let grid = Grid::filled(1, 1).expect("grid");
    let parts = SlidingLidBin::new(&grid, 21.0);
    let (body, cover) = sliding_lid_bin(&parts, &options()).expect("sliding lid bin");
    assert_solid("sliding lid bin", &body);
    assert_solid("cover", &cover);

    // Slot at +X removes the lip; lip stays at -X; groove runs under it.
    assert_eq!(containment(&body, 19.5, 0.0, 23.0), PointContainment::Outside);
    assert_eq!(containment(&body, -20.5, 0.0, 23.0), PointContainment::Inside);
    assert_eq!(containment(&body, 0.0, 19.0, 21.3), PointContainment::Outside);
    assert_eq!(containment(&body, 0.0, 20.5, 21.3), PointContainment::Inside);

    let bbox = cover.bbox().expect("cover bbox");
    assert!(bbox.max.z < 4.4);
    assert!(bbox.min.z > -0.8);
}

#[test]
fn config_builds_the_same_bin_as_the_builder() {
    let config = BinConfig::from_toml_str(
        r#"
        grid = "1x1"
        height = 2
        stacking_lip = false
        arc_segments = 2
        "#,
    )
    .expect("config");
    let grid = config.grid().expect("grid");
    let from_config = config.bin(&grid).expect("bin").mesh(&config.options()).expect("mesh");
    let direct = Bin::new(&grid, 14.0)
        .without_stacking_lip()
        .with_compartment(Compartment::new(&grid, 7.0))
        .mesh(&options())
        .expect("mesh");
    assert!((from_config.volume() - direct.volume()).abs() < 1e-6);
}
