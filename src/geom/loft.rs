//! Straight lofts through stacked planar stations.
//!
//! A station is a set of closed loops at one height. Consecutive stations
//! are joined loop by loop and vertex by vertex with ruled quads, so every
//! station must carry the same number of loops and each loop the same
//! number of points. Sketch rings are built to satisfy this: an offset ring
//! emits a fixed number of points per corner whatever its radius.
//!
//! Loops follow the sketch convention: interior on the left, i.e. outer
//! boundaries counter-clockwise and holes clockwise.
//!
//! - [`loft_stations`] builds a capped or open solid from stations with
//!   strictly increasing heights (base profile, bin walls, compartment tubs).
//! - [`sweep_closed_stations`] wraps the last station back to the first and
//!   needs no caps (the stacking lip and lid rails, swept from a closed
//!   section).

use super::diagnostics::GeomMeshDiagnostics;
use super::mesh::{GeomMesh, finalize_mesh};
use super::trim::{TrimLoop, TrimRegion, UvPoint};
use super::triangulation::triangulate_trim_region;
use super::{Point2, Point3, Tolerance, signed_area_2d};

#[derive(Debug, Clone, PartialEq)]
pub struct LoftStation {
    pub z: f64,
    pub loops: Vec<Vec<Point2>>,
}

impl LoftStation {
    #[must_use]
    pub fn new(z: f64, loops: Vec<Vec<Point2>>) -> Self {
        Self { z, loops }
    }

    #[must_use]
    pub fn point_count(&self) -> usize {
        self.loops.iter().map(Vec::len).sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoftCaps {
    pub bottom: bool,
    pub top: bool,
}

impl LoftCaps {
    pub const NONE: Self = Self { bottom: false, top: false };
    pub const BOTH: Self = Self { bottom: true, top: true };
}

#[derive(Debug, thiserror::Error)]
pub enum LoftError {
    #[error("loft requires at least {min} stations, got {count}")]
    NotEnoughStations { min: usize, count: usize },
    #[error("station {index} has no loops")]
    EmptyStation { index: usize },
    #[error("station {index} contains non-finite coordinates")]
    NonFiniteStation { index: usize },
    #[error("station {index} does not match the loop layout of station 0")]
    StationMismatch { index: usize },
    #[error("station {index} is not above the previous station")]
    NonIncreasingHeight { index: usize },
    #[error("cap triangulation failed: {0}")]
    CapTriangulationFailed(String),
}

/// Loft through `stations` from bottom to top.
pub fn loft_stations(
    stations: &[LoftStation],
    caps: LoftCaps,
    tol: Tolerance,
) -> Result<(GeomMesh, GeomMeshDiagnostics), LoftError> {
    validate_stations(stations, 2)?;
    for (index, pair) in stations.windows(2).enumerate() {
        if pair[1].z <= pair[0].z + tol.eps {
            return Err(LoftError::NonIncreasingHeight { index: index + 1 });
        }
    }

    let mut vertices: Vec<Point3> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let station_offsets = push_station_vertices(stations, &mut vertices);

    for k in 0..stations.len() - 1 {
        push_band(&stations[k], station_offsets[k], station_offsets[k + 1], &mut indices);
    }

    if caps.bottom {
        push_cap(&stations[0], true, tol, &mut vertices, &mut indices)?;
    }
    if caps.top {
        push_cap(&stations[stations.len() - 1], false, tol, &mut vertices, &mut indices)?;
    }

    Ok(finalize_mesh(vertices, indices, tol))
}

/// Join `stations` into a closed ring of bands.
///
/// Walking the stations in order, the solid must lie to the right of the
/// path in each wall's (inward offset, z) half plane, i.e. a section traced
/// clockwise. Sections traced the other way come out inside out and are
/// turned by the mesh repair.
pub fn sweep_closed_stations(
    stations: &[LoftStation],
    tol: Tolerance,
) -> Result<(GeomMesh, GeomMeshDiagnostics), LoftError> {
    validate_stations(stations, 3)?;

    let mut vertices: Vec<Point3> = Vec::new();
    let mut indices: Vec<u32> = Vec::new();
    let station_offsets = push_station_vertices(stations, &mut vertices);

    let n = stations.len();
    for k in 0..n {
        let next = (k + 1) % n;
        push_band(&stations[k], station_offsets[k], station_offsets[next], &mut indices);
    }

    Ok(finalize_mesh(vertices, indices, tol))
}

fn validate_stations(stations: &[LoftStation], min: usize) -> Result<(), LoftError> {
    if stations.len() < min {
        return Err(LoftError::NotEnoughStations {
            min,
            count: stations.len(),
        });
    }
    let layout: Vec<usize> = stations[0].loops.iter().map(Vec::len).collect();
    for (index, station) in stations.iter().enumerate() {
        if station.loops.is_empty() {
            return Err(LoftError::EmptyStation { index });
        }
        let finite = station.z.is_finite()
            && station
                .loops
                .iter()
                .flatten()
                .all(|p| p.x.is_finite() && p.y.is_finite());
        if !finite {
            return Err(LoftError::NonFiniteStation { index });
        }
        let matches = station.loops.len() == layout.len()
            && station.loops.iter().zip(&layout).all(|(l, &len)| l.len() == len && len >= 3);
        if !matches {
            return Err(LoftError::StationMismatch { index });
        }
    }
    Ok(())
}

fn push_station_vertices(stations: &[LoftStation], vertices: &mut Vec<Point3>) -> Vec<u32> {
    let mut offsets = Vec::with_capacity(stations.len());
    for station in stations {
        offsets.push(vertices.len() as u32);
        vertices.extend(station.loops.iter().flatten().map(|p| p.at_z(station.z)));
    }
    offsets
}

fn push_band(station: &LoftStation, bottom: u32, top: u32, indices: &mut Vec<u32>) {
    let mut start = 0u32;
    for ring in &station.loops {
        let n = ring.len() as u32;
        for i in 0..n {
            let j = (i + 1) % n;
            let (b0, b1) = (bottom + start + i, bottom + start + j);
            let (t0, t1) = (top + start + i, top + start + j);
            indices.extend_from_slice(&[b0, b1, t1]);
            indices.extend_from_slice(&[b0, t1, t0]);
        }
        start += n;
    }
}

/// Triangulate the loops of one station. Counter-clockwise loops are outer
/// boundaries; each clockwise loop is a hole of the smallest outer that
/// contains it.
fn push_cap(
    station: &LoftStation,
    facing_down: bool,
    tol: Tolerance,
    vertices: &mut Vec<Point3>,
    indices: &mut Vec<u32>,
) -> Result<(), LoftError> {
    for region in cap_regions(&station.loops, tol)? {
        let tri = triangulate_trim_region(&region, tol).map_err(LoftError::CapTriangulationFailed)?;
        let offset = vertices.len() as u32;
        vertices.extend(tri.vertices.iter().map(|uv| Point3::new(uv.u, uv.v, station.z)));
        for t in tri.indices.chunks_exact(3) {
            if facing_down {
                indices.extend_from_slice(&[offset + t[0], offset + t[2], offset + t[1]]);
            } else {
                indices.extend_from_slice(&[offset + t[0], offset + t[1], offset + t[2]]);
            }
        }
    }
    Ok(())
}

pub(crate) fn cap_regions(
    loops: &[Vec<Point2>],
    tol: Tolerance,
) -> Result<Vec<TrimRegion>, LoftError> {
    let to_trim = |points: &[Point2]| {
        let uv: Vec<UvPoint> = points.iter().map(|p| UvPoint::new(p.x, p.y)).collect();
        TrimLoop::new(uv, tol).map_err(|e| LoftError::CapTriangulationFailed(e.to_string()))
    };

    let mut outers: Vec<(f64, TrimLoop, Vec<TrimLoop>)> = Vec::new();
    let mut holes: Vec<TrimLoop> = Vec::new();
    for points in loops {
        let area = signed_area_2d(points);
        if area.abs() <= tol.eps {
            continue;
        }
        let trim = to_trim(points)?;
        if area > 0.0 {
            outers.push((area, trim, Vec::new()));
        } else {
            holes.push(trim);
        }
    }

    for hole in holes {
        let sample = hole.points()[0];
        let owner = outers
            .iter_mut()
            .filter(|(_, outer, _)| outer.contains(sample))
            .min_by(|a, b| a.0.total_cmp(&b.0));
        match owner {
            Some((_, _, owned)) => owned.push(hole),
            None => {
                return Err(LoftError::CapTriangulationFailed(
                    "hole loop is not inside any outer loop".to_string(),
                ));
            }
        }
    }

    outers
        .into_iter()
        .map(|(_, outer, owned)| {
            TrimRegion::with_holes(outer, owned, tol)
                .map_err(|e| LoftError::CapTriangulationFailed(e.to_string()))
        })
        .collect()
}
