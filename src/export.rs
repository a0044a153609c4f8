//! Mesh file output: binary and ASCII STL, and Wavefront OBJ.

use std::fmt;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::geom::{GeomMesh, GeomMeshDiagnostics, facet_normal, mesh_diagnostics};
use crate::grid::Grid;

const STL_HEADER: &[u8] = b"gridfinity binary STL";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error(transparent)]
    Io(#[from] io::Error),
    #[error("refusing to overwrite existing file {}", path.display())]
    Exists { path: PathBuf },
    #[error("mesh has no triangles")]
    EmptyMesh,
    #[error("mesh validation failed: {0}")]
    InvalidMesh(String),
    #[error("mesh has {0} triangles, more than binary STL can hold")]
    TooManyTriangles(usize),
    #[error("unknown export format '{0}', expected stl, stl-ascii or obj")]
    UnknownFormat(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ExportFormat {
    #[default]
    Stl,
    StlAscii,
    Obj,
}

impl ExportFormat {
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Stl | Self::StlAscii => "stl",
            Self::Obj => "obj",
        }
    }

    /// Write `mesh` named `name` in this format.
    pub fn write(self, mesh: &GeomMesh, name: &str, out: impl Write) -> Result<(), ExportError> {
        match self {
            Self::Stl => write_stl_binary(mesh, out),
            Self::StlAscii => write_stl_ascii(mesh, name, out),
            Self::Obj => write_obj(mesh, name, out),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = ExportError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "stl" => Ok(Self::Stl),
            "stl-ascii" | "ascii" => Ok(Self::StlAscii),
            "obj" => Ok(Self::Obj),
            _ => Err(ExportError::UnknownFormat(s.to_owned())),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Stl => "stl",
            Self::StlAscii => "stl-ascii",
            Self::Obj => "obj",
        })
    }
}

/// Binary STL: 80-byte header, little-endian triangle count, then 50 bytes
/// per facet. Normals are recomputed from the triangles.
pub fn write_stl_binary(mesh: &GeomMesh, mut out: impl Write) -> Result<(), ExportError> {
    let count = u32::try_from(mesh.triangle_count())
        .map_err(|_| ExportError::TooManyTriangles(mesh.triangle_count()))?;
    let mut header = [0u8; 80];
    header[..STL_HEADER.len()].copy_from_slice(STL_HEADER);
    out.write_all(&header)?;
    out.write_all(&count.to_le_bytes())?;

    let mut record = [0u8; 50];
    for tri in mesh.triangles() {
        let n = facet_normal(&tri);
        let values = [
            n.x, n.y, n.z, tri[0].x, tri[0].y, tri[0].z, tri[1].x, tri[1].y, tri[1].z, tri[2].x,
            tri[2].y, tri[2].z,
        ];
        for (slot, value) in record.chunks_exact_mut(4).zip(values) {
            #[allow(clippy::cast_possible_truncation)]
            slot.copy_from_slice(&(value as f32).to_le_bytes());
        }
        record[48..].fill(0);
        out.write_all(&record)?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_stl_ascii(
    mesh: &GeomMesh,
    name: &str,
    mut out: impl Write,
) -> Result<(), ExportError> {
    writeln!(out, "solid {name}")?;
    for tri in mesh.triangles() {
        let n = facet_normal(&tri);
        writeln!(out, "  facet normal {:e} {:e} {:e}", n.x, n.y, n.z)?;
        writeln!(out, "    outer loop")?;
        for p in &tri {
            writeln!(out, "      vertex {:e} {:e} {:e}", p.x, p.y, p.z)?;
        }
        writeln!(out, "    endloop")?;
        writeln!(out, "  endfacet")?;
    }
    writeln!(out, "endsolid {name}")?;
    out.flush()?;
    Ok(())
}

/// OBJ with shared vertices and 1-based faces; normals are left to the
/// viewer.
pub fn write_obj(mesh: &GeomMesh, name: &str, mut out: impl Write) -> Result<(), ExportError> {
    writeln!(out, "# gridfinity")?;
    writeln!(out, "o {name}")?;
    for p in &mesh.positions {
        writeln!(out, "v {} {} {}", p[0], p[1], p[2])?;
    }
    for tri in mesh.indices.chunks_exact(3) {
        writeln!(out, "f {} {} {}", tri[0] + 1, tri[1] + 1, tri[2] + 1)?;
    }
    out.flush()?;
    Ok(())
}

/// Write `mesh` to `path`, creating parent directories. Existing files are
/// kept unless `overwrite` is set.
///
/// Returns the topology of what was written. A mesh with open or
/// non-manifold edges is still written, with a warning.
pub fn export_mesh(
    path: &Path,
    mesh: &GeomMesh,
    format: ExportFormat,
    overwrite: bool,
) -> Result<GeomMeshDiagnostics, ExportError> {
    if mesh.is_empty() {
        return Err(ExportError::EmptyMesh);
    }
    mesh.validate().map_err(ExportError::InvalidMesh)?;
    if path.exists() && !overwrite {
        return Err(ExportError::Exists { path: path.to_path_buf() });
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("gridfinity");
    let out = BufWriter::new(File::create(path)?);
    format.write(mesh, name, out)?;
    let diagnostics = mesh_diagnostics(mesh);
    if !diagnostics.is_valid_solid() {
        log::warn!("{} is not a closed solid: {}", path.display(), diagnostics.summary());
    }
    log::info!("wrote {} ({} triangles)", path.display(), mesh.triangle_count());
    Ok(diagnostics)
}

/// Optional features that appear in a bin's file name.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BinFeatures {
    pub cutout: bool,
    pub label: bool,
    pub scoop: bool,
}

/// Height in units as written in file names: `3` or `2.5`.
fn units(height_units: f64) -> String {
    if height_units.fract() == 0.0 {
        format!("{height_units:.0}")
    } else {
        format!("{height_units}")
    }
}

/// `bin_{W}x{H}-h{units}-div{X}x{Y}[_cutout][-label][-scoop]`
#[must_use]
pub fn bin_file_name(
    grid: &Grid,
    height_units: f64,
    divisions: (usize, usize),
    features: BinFeatures,
    format: ExportFormat,
) -> String {
    format!(
        "bin_{}-h{}-div{}x{}{}{}{}.{}",
        grid.size_label(),
        units(height_units),
        divisions.0,
        divisions.1,
        if features.cutout { "_cutout" } else { "" },
        if features.label { "-label" } else { "" },
        if features.scoop { "-scoop" } else { "" },
        format.extension()
    )
}

#[must_use]
pub fn sliding_lid_bin_file_name(
    grid: &Grid,
    height_units: f64,
    divisions: (usize, usize),
    format: ExportFormat,
) -> String {
    format!(
        "sliding-lid-bin_{}-h{}-div{}x{}.{}",
        grid.size_label(),
        units(height_units),
        divisions.0,
        divisions.1,
        format.extension()
    )
}

#[must_use]
pub fn sliding_lid_cover_file_name(grid: &Grid, format: ExportFormat) -> String {
    format!("sliding-lid-cover_{}.{}", grid.size_label(), format.extension())
}

#[must_use]
pub fn screw_holes_file_name(grid: &Grid, format: ExportFormat) -> String {
    format!("screw-holes_{}.{}", grid.size_label(), format.extension())
}

#[must_use]
pub fn base_file_name(grid: &Grid, format: ExportFormat) -> String {
    format!("base_{}.{}", grid.size_label(), format.extension())
}
