//! Corner fillets for polylines and 2-D sections.
//!
//! Solid fillets in this crate are baked into profiles before they are
//! swept or extruded: the stacking lip rounds its knife edge in the lip
//! section, the label shelf rounds its tip in the shelf triangle and the
//! divider cutout rounds the corners of its U profile. All of those go
//! through [`fillet_polyline_corners`].
//!
//! # Tolerances & diagnostics
//! - All comparisons use `Tolerance`.
//! - Corners whose radius does not fit are clamped so neighbouring arcs never
//!   overlap; degenerate corners are skipped. Both are counted in
//!   [`FilletPolylineDiagnostics`] instead of failing.

use super::{Point2, Point3, Tolerance, Vec3};

#[derive(Debug, thiserror::Error)]
pub enum FilletChamferError {
    #[error("radius must be finite and non-negative: {radius}")]
    InvalidRadius { radius: f64 },

    #[error("segment_count must be >= 1, got {segments}")]
    InvalidSegmentCount { segments: usize },

    #[error("polyline must have at least 2 points, got {count}")]
    InvalidPolyline { count: usize },

    #[error("closed polyline must have at least 3 points, got {count}")]
    InvalidClosedPolyline { count: usize },

    #[error("corner index {index} out of range for {count} points")]
    CornerOutOfRange { index: usize, count: usize },
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilletPolylineDiagnostics {
    pub input_point_count: usize,
    pub output_point_count: usize,
    pub corner_count: usize,
    pub filleted_corner_count: usize,
    pub skipped_corner_count: usize,
    pub clamped_corner_count: usize,
}

/// Fillet every corner of a polyline by inserting circular arc segments.
///
/// For `segments == 1`, the arc is approximated by a single straight segment (chamfer-like).
pub fn fillet_polyline_points(
    points: &[Point3],
    radius: f64,
    segments: usize,
    closed: bool,
    tol: Tolerance,
) -> Result<(Vec<Point3>, FilletPolylineDiagnostics), FilletChamferError> {
    let corners: Vec<usize> = if closed {
        (0..points.len()).collect()
    } else {
        (1..points.len().saturating_sub(1)).collect()
    };
    fillet_polyline_corners(points, &corners, radius, segments, closed, tol)
}

/// Fillet only the listed corners. For open polylines the end points are
/// never corners and are ignored if listed.
pub fn fillet_polyline_corners(
    points: &[Point3],
    corners: &[usize],
    radius: f64,
    segments: usize,
    closed: bool,
    tol: Tolerance,
) -> Result<(Vec<Point3>, FilletPolylineDiagnostics), FilletChamferError> {
    if !radius.is_finite() || radius < 0.0 {
        return Err(FilletChamferError::InvalidRadius { radius });
    }
    if segments < 1 {
        return Err(FilletChamferError::InvalidSegmentCount { segments });
    }
    if points.len() < 2 {
        return Err(FilletChamferError::InvalidPolyline { count: points.len() });
    }
    if closed && points.len() < 3 {
        return Err(FilletChamferError::InvalidClosedPolyline { count: points.len() });
    }
    if let Some(&index) = corners.iter().find(|&&i| i >= points.len()) {
        return Err(FilletChamferError::CornerOutOfRange {
            index,
            count: points.len(),
        });
    }

    let mut diagnostics = FilletPolylineDiagnostics {
        input_point_count: points.len(),
        ..Default::default()
    };

    if radius <= tol.eps || points.len() < 3 {
        diagnostics.output_point_count = points.len();
        return Ok((points.to_vec(), diagnostics));
    }

    let n = points.len();
    let mut selected = vec![false; n];
    for &i in corners {
        if closed || (i > 0 && i + 1 < n) {
            selected[i] = true;
        }
    }

    let result =
        fillet_selected(points, &selected, radius, segments, closed, tol, &mut diagnostics);
    diagnostics.output_point_count = result.len();
    Ok((result, diagnostics))
}

/// Section variant of [`fillet_polyline_corners`] for closed 2-D profiles.
pub fn fillet_section_corners(
    section: &[Point2],
    corners: &[usize],
    radius: f64,
    segments: usize,
    tol: Tolerance,
) -> Result<Vec<Point2>, FilletChamferError> {
    let lifted: Vec<Point3> = section.iter().map(|p| p.at_z(0.0)).collect();
    let (out, _) = fillet_polyline_corners(&lifted, corners, radius, segments, true, tol)?;
    Ok(out.into_iter().map(|p| Point2::new(p.x, p.y)).collect())
}

#[derive(Debug, Clone, Copy)]
struct CornerFrame {
    to_prev: Vec3,
    to_next: Vec3,
    tan_half: f64,
    sin_half: f64,
}

fn corner_frame(
    prev: Point3,
    corner: Point3,
    next: Point3,
    tol: Tolerance,
) -> Option<(CornerFrame, f64, f64)> {
    let in_vec = corner.sub_point(prev);
    let out_vec = next.sub_point(corner);
    let in_len = in_vec.length();
    let out_len = out_vec.length();
    if !in_len.is_finite() || !out_len.is_finite() || in_len <= tol.eps || out_len <= tol.eps {
        return None;
    }

    let to_prev = in_vec.mul_scalar(-1.0 / in_len);
    let to_next = out_vec.mul_scalar(1.0 / out_len);
    let theta = to_prev.dot(to_next).clamp(-1.0, 1.0).acos();
    if !theta.is_finite() || theta <= 1e-8 {
        return None;
    }

    let half = theta * 0.5;
    let (tan_half, sin_half) = (half.tan(), half.sin());
    if !tan_half.is_finite() || tan_half <= 0.0 || !sin_half.is_finite() || sin_half <= 0.0 {
        return None;
    }
    Some((
        CornerFrame {
            to_prev,
            to_next,
            tan_half,
            sin_half,
        },
        in_len,
        out_len,
    ))
}

fn fillet_selected(
    points: &[Point3],
    selected: &[bool],
    radius: f64,
    segments: usize,
    closed: bool,
    tol: Tolerance,
    diagnostics: &mut FilletPolylineDiagnostics,
) -> Vec<Point3> {
    let n = points.len();

    // Tangent distance per corner, clamped against its own edges first.
    let mut corner_t = vec![0.0f64; n];
    let mut frames: Vec<Option<CornerFrame>> = vec![None; n];
    for i in 0..n {
        if !selected[i] {
            continue;
        }
        diagnostics.corner_count += 1;
        let prev = points[(i + n - 1) % n];
        let next = points[(i + 1) % n];
        let Some((frame, in_len, out_len)) = corner_frame(prev, points[i], next, tol) else {
            diagnostics.skipped_corner_count += 1;
            continue;
        };
        let t = (radius / frame.tan_half).min(in_len * 0.999).min(out_len * 0.999);
        if !t.is_finite() || t <= tol.eps {
            diagnostics.skipped_corner_count += 1;
            continue;
        }
        corner_t[i] = t;
        frames[i] = Some(frame);
    }

    // Neighbouring corners must share their common edge.
    let edge_count = if closed { n } else { n - 1 };
    for _ in 0..(n * 4).max(8) {
        let mut changed = false;
        for i in 0..edge_count {
            let j = (i + 1) % n;
            let seg_len = points[j].sub_point(points[i]).length();
            let sum = corner_t[i] + corner_t[j];
            if !seg_len.is_finite() || seg_len <= tol.eps || sum <= seg_len * 0.999 || sum <= 0.0 {
                continue;
            }
            let scale = (seg_len * 0.999) / sum;
            corner_t[i] *= scale;
            corner_t[j] *= scale;
            diagnostics.clamped_corner_count += 1;
            changed = true;
        }
        if !changed {
            break;
        }
    }

    let mut out: Vec<Point3> = Vec::with_capacity(n * (segments + 1));
    let push_unique = |out: &mut Vec<Point3>, p: Point3| {
        if out.last().is_none_or(|&last| !tol.approx_eq_point3(last, p)) {
            out.push(p);
        }
    };

    for i in 0..n {
        let corner = points[i];
        let (Some(frame), t) = (frames[i], corner_t[i]) else {
            push_unique(&mut out, corner);
            continue;
        };
        if t <= tol.eps {
            diagnostics.skipped_corner_count += 1;
            push_unique(&mut out, corner);
            continue;
        }

        let Some(bisector) = (frame.to_prev + frame.to_next).normalized() else {
            diagnostics.skipped_corner_count += 1;
            push_unique(&mut out, corner);
            continue;
        };
        let r_eff = t * frame.tan_half;
        let center = corner.add_vec(bisector.mul_scalar(r_eff / frame.sin_half));
        let p_in = corner.add_vec(frame.to_prev.mul_scalar(t));
        let p_out = corner.add_vec(frame.to_next.mul_scalar(t));

        let v0 = p_in.sub_point(center);
        let v1 = p_out.sub_point(center);
        let Some(axis) = v0.cross(v1).normalized() else {
            diagnostics.skipped_corner_count += 1;
            push_unique(&mut out, corner);
            continue;
        };
        let angle = signed_angle(v0, v1, axis);

        push_unique(&mut out, p_in);
        for s in 1..segments {
            let frac = s as f64 / segments as f64;
            out.push(center.add_vec(rotate_vec(v0, axis, angle * frac)));
        }
        push_unique(&mut out, p_out);
        diagnostics.filleted_corner_count += 1;
    }

    if closed && out.len() > 1 && tol.approx_eq_point3(out[0], out[out.len() - 1]) {
        out.pop();
    }
    out
}

fn signed_angle(v0: Vec3, v1: Vec3, axis_unit: Vec3) -> f64 {
    axis_unit.dot(v0.cross(v1)).atan2(v0.dot(v1))
}

fn rotate_vec(v: Vec3, axis_unit: Vec3, angle: f64) -> Vec3 {
    let (s, c) = angle.sin_cos();
    v.mul_scalar(c)
        + axis_unit.cross(v).mul_scalar(s)
        + axis_unit.mul_scalar(axis_unit.dot(v) * (1.0 - c))
}
