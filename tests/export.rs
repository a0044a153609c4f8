use std::fs;

use gridfinity::export::{BinFeatures, ExportError, ExportFormat, bin_file_name, export_mesh};
use gridfinity::geom::GeomMesh;
use gridfinity::{Base, Grid, ModelOptions, Part};

#[test]
fn export_writes_each_format_and_keeps_existing_files() {
    let dir = tempfile::tempdir().expect("tempdir");
    let grid = Grid::filled(1, 1).expect("grid");
    let mesh = Base::new(&grid).mesh(&ModelOptions::new(2)).expect("base");
    let triangles = mesh.triangle_count();

    let stl = dir.path().join("nested").join("base.stl");
    let written = export_mesh(&stl, &mesh, ExportFormat::Stl, false).expect("binary stl");
    assert!(written.is_valid_solid(), "{written}");
    let bytes = fs::read(&stl).expect("read stl");
    assert_eq!(bytes.len(), 84 + 50 * triangles);

    let err = export_mesh(&stl, &mesh, ExportFormat::Stl, false).unwrap_err();
    assert!(matches!(err, ExportError::Exists { .. }), "{err}");
    export_mesh(&stl, &mesh, ExportFormat::Stl, true).expect("overwrite");

    let ascii = dir.path().join("base_ascii.stl");
    export_mesh(&ascii, &mesh, ExportFormat::StlAscii, false).expect("ascii stl");
    let text = fs::read_to_string(&ascii).expect("read ascii");
    assert!(text.starts_with("solid base_ascii"));
    assert_eq!(text.matches("endfacet").count(), triangles);

    let obj = dir.path().join("base.obj");
    export_mesh(&obj, &mesh, ExportFormat::Obj, false).expect("obj");
    let text = fs::read_to_string(&obj).expect("read obj");
    assert_eq!(text.lines().filter(|l| l.starts_with("f ")).count(), triangles);
    assert_eq!(text.lines().filter(|l| l.starts_with("v ")).count(), mesh.vertex_count());
}

#[test]
fn empty_meshes_are_not_written() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("empty.stl");
    let err = export_mesh(&path, &Default::default(), ExportFormat::Stl, false).unwrap_err();
    assert!(matches!(err, ExportError::EmptyMesh));
    assert!(!path.exists());
}

#[test]
fn open_meshes_are_written_and_reported() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("sheet.obj");
    let sheet = GeomMesh::new(
        vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 1.0, 0.0], [0.0, 1.0, 0.0]],
        vec![0, 1, 2, 0, 2, 3],
    );
    let written = export_mesh(&path, &sheet, ExportFormat::Obj, false).expect("obj");
    assert!(path.exists());
    assert_eq!(written.open_edge_count, 4);
    assert!(!written.is_valid_solid());
}

#[test]
fn file_names_follow_the_generator_scripts() {
    let grid = Grid::parse("###/#..").expect("grid");
    let name = bin_file_name(
        &grid,
        3.0,
        (1, 1),
        BinFeatures {
            scoop: true,
            ..BinFeatures::default()
        },
        ExportFormat::Stl,
    );
    assert_eq!(name, "bin_3x2-h3-div1x1-scoop.stl");
}
