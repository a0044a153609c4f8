//! Linear extrusion of closed planar profiles.
//!
//! Cutter pieces that are a single profile pushed along one axis (screw hole
//! cylinders, divider notches, the label shelf, finger scoops, lid boxes) are
//! built here. Profiles may lie in any plane; the cap plane basis is derived
//! from the profile normal.

use super::diagnostics::GeomMeshDiagnostics;
use super::mesh::{GeomMesh, finalize_mesh};
use super::trim::{TrimLoop, TrimRegion, UvPoint};
use super::triangulation::triangulate_trim_region;
use super::{Point2, Point3, Tolerance, Vec3};

/// Which ends of an extrusion get a planar cap.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtrusionCaps {
    pub start: bool,
    pub end: bool,
}

impl ExtrusionCaps {
    pub const NONE: Self = Self { start: false, end: false };
    pub const START: Self = Self { start: true, end: false };
    pub const END: Self = Self { start: false, end: true };
    pub const BOTH: Self = Self { start: true, end: true };

    const fn any(self) -> bool {
        self.start || self.end
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExtrusionError {
    #[error("extrusion direction must be finite and non-zero")]
    InvalidDirection,
    #[error("profile points must be finite")]
    NonFinitePoint,
    #[error("profile requires at least {min} unique points")]
    NotEnoughPoints { min: usize },
    #[error("profile is degenerate (zero area)")]
    ProfileDegenerate,
    #[error("profile is not planar enough to cap (max distance {max_distance})")]
    ProfileNotPlanar { max_distance: f64 },
    #[error("failed to triangulate cap: {0}")]
    CapTriangulation(String),
}

type Extruded = Result<(GeomMesh, GeomMeshDiagnostics), ExtrusionError>;

/// Sweep `profile` along `direction`.
///
/// A profile whose first and last points coincide, or any profile extruded
/// with caps, is treated as closed. Caps are oriented so the closed result
/// faces outward regardless of the profile's winding.
pub fn extrude_polyline(
    profile: &[Point3],
    direction: Vec3,
    caps: ExtrusionCaps,
    tol: Tolerance,
) -> Extruded {
    let finite = [direction.x, direction.y, direction.z].iter().all(|c| c.is_finite());
    if !finite || direction.length_squared() <= 0.0 {
        return Err(ExtrusionError::InvalidDirection);
    }

    let (mut ring, closed) = profile_ring(profile, caps.any(), tol)?;
    let cap = if caps.any() {
        let mut frame = CapFrame::fit(&ring, tol)?;
        // Side walls wind outward only when the ring turns positively about
        // the sweep direction.
        if frame.normal.dot(direction) < 0.0 {
            ring.reverse();
            frame = CapFrame::with_normal(ring[0], -frame.normal)?;
        }
        Some((frame.triangulate(&ring, tol)?, frame))
    } else {
        None
    };

    let n = ring.len();
    let mut vertices: Vec<Point3> =
        ring.iter().copied().chain(ring.iter().map(|p| p.add_vec(direction))).collect();
    let walls = if closed { n } else { n - 1 };
    let mut indices: Vec<u32> = Vec::with_capacity(walls * 6);
    for a in 0..walls {
        let b = (a + 1) % n;
        let (lo_a, lo_b, hi_a, hi_b) = (a as u32, b as u32, (a + n) as u32, (b + n) as u32);
        indices.extend_from_slice(&[lo_a, lo_b, hi_b, lo_a, hi_b, hi_a]);
    }

    if let Some(((uv, triangles), frame)) = cap {
        let ends = [(caps.start, Vec3::ZERO, true), (caps.end, direction, false)];
        for (enabled, offset, flip) in ends {
            if !enabled {
                continue;
            }
            let base = vertices.len() as u32;
            vertices.extend(uv.iter().map(|&p| frame.lift(p).add_vec(offset)));
            for tri in triangles.chunks_exact(3) {
                let (b, c) = if flip { (tri[2], tri[1]) } else { (tri[1], tri[2]) };
                indices.extend_from_slice(&[base + tri[0], base + b, base + c]);
            }
        }
    }

    Ok(finalize_mesh(vertices, indices, tol))
}

/// Extrude a 2-D outline lying in the XY plane from `z0` up to `z1`.
pub fn extrude_outline_z(outline: &[Point2], z0: f64, z1: f64, tol: Tolerance) -> Extruded {
    let profile: Vec<Point3> = outline.iter().map(|p| p.at_z(z0)).collect();
    extrude_polyline(&profile, Vec3::new(0.0, 0.0, z1 - z0), ExtrusionCaps::BOTH, tol)
}

/// Axis-aligned box between two corners.
pub fn extrude_box(min: Point3, max: Point3, tol: Tolerance) -> Extruded {
    let footprint = [
        Point2::new(min.x, min.y),
        Point2::new(max.x, min.y),
        Point2::new(max.x, max.y),
        Point2::new(min.x, max.y),
    ];
    extrude_outline_z(&footprint, min.z, max.z, tol)
}

/// Regular polygon approximation of a circle, counter-clockwise, starting on
/// the +X axis.
#[must_use]
pub fn circle_outline(center: Point2, radius: f64, segments: usize) -> Vec<Point2> {
    let segments = segments.max(3);
    let step = std::f64::consts::TAU / segments as f64;
    (0..segments)
        .map(|i| {
            let (sin, cos) = (step * i as f64).sin_cos();
            Point2::new(center.x + radius * cos, center.y + radius * sin)
        })
        .collect()
}

/// Upright cylinder with its base centred on `base`.
pub fn extrude_cylinder(
    base: Point3,
    radius: f64,
    height: f64,
    segments: usize,
    tol: Tolerance,
) -> Extruded {
    if !radius.is_finite() || radius <= tol.eps {
        return Err(ExtrusionError::ProfileDegenerate);
    }
    let outline = circle_outline(Point2::new(base.x, base.y), radius, segments);
    extrude_outline_z(&outline, base.z, base.z + height, tol)
}

/// Drops consecutive duplicates and a repeated closing point. Returns the
/// ring and whether it is closed.
fn profile_ring(
    points: &[Point3],
    force_closed: bool,
    tol: Tolerance,
) -> Result<(Vec<Point3>, bool), ExtrusionError> {
    if points.iter().any(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite())) {
        return Err(ExtrusionError::NonFinitePoint);
    }

    let mut ring: Vec<Point3> = Vec::with_capacity(points.len());
    for &p in points {
        if ring.last().is_none_or(|&prev| !tol.approx_eq_point3(prev, p)) {
            ring.push(p);
        }
    }

    let mut closed = force_closed;
    if ring.len() > 2 && tol.approx_eq_point3(ring[0], ring[ring.len() - 1]) {
        ring.pop();
        closed = true;
    }

    let min = if closed { 3 } else { 2 };
    if ring.len() < min {
        return Err(ExtrusionError::NotEnoughPoints { min });
    }
    Ok((ring, closed))
}

/// Orthonormal frame of a planar profile, `u × v = normal`.
#[derive(Debug, Clone, Copy)]
struct CapFrame {
    origin: Point3,
    u: Vec3,
    v: Vec3,
    normal: Vec3,
}

impl CapFrame {
    /// Fits a frame to `ring` using its Newell normal, so the normal follows
    /// the ring's winding.
    fn fit(ring: &[Point3], tol: Tolerance) -> Result<Self, ExtrusionError> {
        let mut newell = Vec3::ZERO;
        for (i, a) in ring.iter().enumerate() {
            let b = ring[(i + 1) % ring.len()];
            newell.x += (a.y - b.y) * (a.z + b.z);
            newell.y += (a.z - b.z) * (a.x + b.x);
            newell.z += (a.x - b.x) * (a.y + b.y);
        }
        let len2 = newell.length_squared();
        if !len2.is_finite() || len2 <= tol.eps_squared() {
            return Err(ExtrusionError::ProfileDegenerate);
        }
        let normal = newell.normalized().ok_or(ExtrusionError::ProfileDegenerate)?;

        let origin = ring[0];
        let max_distance = ring
            .iter()
            .map(|p| p.sub_point(origin).dot(normal).abs())
            .fold(0.0, f64::max);
        if max_distance > (tol.eps * 1e3).max(1e-7) {
            return Err(ExtrusionError::ProfileNotPlanar { max_distance });
        }
        Self::with_normal(origin, normal)
    }

    fn with_normal(origin: Point3, normal: Vec3) -> Result<Self, ExtrusionError> {
        let helper = if normal.x.abs() < 0.9 { Vec3::X } else { Vec3::Y };
        let v = normal.cross(helper).normalized().ok_or(ExtrusionError::ProfileDegenerate)?;
        Ok(Self { origin, u: v.cross(normal), v, normal })
    }

    fn project(&self, p: Point3) -> UvPoint {
        let d = p.sub_point(self.origin);
        UvPoint::new(d.dot(self.u), d.dot(self.v))
    }

    fn lift(&self, uv: UvPoint) -> Point3 {
        self.origin.add_vec(self.u * uv.u + self.v * uv.v)
    }

    /// Counter-clockwise (about `normal`) triangulation of the ring.
    fn triangulate(
        &self,
        ring: &[Point3],
        tol: Tolerance,
    ) -> Result<(Vec<UvPoint>, Vec<u32>), ExtrusionError> {
        let cap_error = |e: &dyn std::fmt::Display| ExtrusionError::CapTriangulation(e.to_string());
        let projected = ring.iter().map(|&p| self.project(p)).collect();
        let outline = TrimLoop::new(projected, tol).map_err(|e| cap_error(&e))?;
        let region = TrimRegion::from_loops(vec![outline], tol).map_err(|e| cap_error(&e))?;
        let result = triangulate_trim_region(&region, tol).map_err(|e| cap_error(&e))?;
        Ok((result.vertices, result.indices))
    }
}
