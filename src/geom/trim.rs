//! Planar loops and regions used to triangulate extrusion and loft caps.
//!
//! A [`TrimRegion`] is one outer loop plus any number of holes. Cap builders
//! group the loops of a sketch ring into regions (a grid with an empty cell
//! yields one region with a hole, a grid with two separate islands yields two
//! regions) and hand each region to the ear-clipping triangulator.

use super::core::Tolerance;

/// Why a set of cap loops cannot be triangulated.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrimError {
    #[error("trim loop points must be finite")]
    NonFinitePoints,
    /// Fewer than 3 distinct points after cleaning.
    #[error("trim loop requires at least 3 points, got {count}")]
    InsufficientPoints { count: usize },
    #[error("trim loop self-intersects")]
    SelfIntersection,
    #[error("trim region requires at least one loop")]
    EmptyLoopSet,
    #[error("trim hole intersects outer loop")]
    HoleIntersectsOuter,
    #[error("trim hole is not inside outer loop")]
    HoleOutsideBoundary,
    #[error("trim holes intersect")]
    HolesIntersect,
}

/// A point in the cap plane.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UvPoint {
    pub u: f64,
    pub v: f64,
}

impl UvPoint {
    #[must_use]
    pub const fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }

    #[must_use]
    pub fn is_finite(&self) -> bool {
        self.u.is_finite() && self.v.is_finite()
    }

    fn near(self, other: Self, tol: Tolerance) -> bool {
        (self.u - other.u).abs() <= tol.eps && (self.v - other.v).abs() <= tol.eps
    }
}

/// Twice the signed area of triangle `abc`.
fn orient2d(a: UvPoint, b: UvPoint, c: UvPoint) -> f64 {
    (b.u - a.u) * (c.v - a.v) - (b.v - a.v) * (c.u - a.u)
}

/// Consecutive point pairs of a closed ring, wrapping at the end.
fn ring_edges(points: &[UvPoint]) -> impl Iterator<Item = (UvPoint, UvPoint)> + '_ {
    points.iter().copied().zip(points.iter().copied().cycle().skip(1))
}

fn shoelace(points: &[UvPoint]) -> f64 {
    if points.len() < 3 {
        return 0.0;
    }
    0.5 * ring_edges(points).map(|(a, b)| a.u * b.v - b.u * a.v).sum::<f64>()
}

/// `p` lies on segment `ab`, within `tol`.
fn on_segment(p: UvPoint, a: UvPoint, b: UvPoint, tol: Tolerance) -> bool {
    if orient2d(a, b, p).abs() > tol.eps {
        return false;
    }
    let along = (p.u - a.u) * (b.u - a.u) + (p.v - a.v) * (b.v - a.v);
    let len2 = (b.u - a.u).powi(2) + (b.v - a.v).powi(2);
    along >= -tol.eps && along - len2 <= tol.eps
}

/// Segments `ab` and `cd` cross or touch.
fn segments_meet(a: UvPoint, b: UvPoint, c: UvPoint, d: UvPoint, tol: Tolerance) -> bool {
    let (o1, o2) = (orient2d(a, b, c), orient2d(a, b, d));
    let (o3, o4) = (orient2d(c, d, a), orient2d(c, d, b));
    let touches = (o1.abs() <= tol.eps && on_segment(c, a, b, tol))
        || (o2.abs() <= tol.eps && on_segment(d, a, b, tol))
        || (o3.abs() <= tol.eps && on_segment(a, c, d, tol))
        || (o4.abs() <= tol.eps && on_segment(b, c, d, tol));
    let opposite = |x: f64, y: f64| (x > tol.eps && y < -tol.eps) || (x < -tol.eps && y > tol.eps);
    touches || (opposite(o1, o2) && opposite(o3, o4))
}

/// Any two non-adjacent edges of the ring meet.
fn ring_self_intersects(points: &[UvPoint], tol: Tolerance) -> bool {
    let n = points.len();
    if n < 4 {
        return false;
    }
    (0..n).any(|i| {
        ((i + 2)..n)
            .filter(|&j| (j + 1) % n != i)
            .any(|j| {
                segments_meet(points[i], points[(i + 1) % n], points[j], points[(j + 1) % n], tol)
            })
    })
}

fn rings_meet(a: &[UvPoint], b: &[UvPoint], tol: Tolerance) -> bool {
    ring_edges(a).any(|(a0, a1)| ring_edges(b).any(|(b0, b1)| segments_meet(a0, a1, b0, b1, tol)))
}

/// Even-odd ray cast towards +U.
fn ring_contains(p: UvPoint, points: &[UvPoint]) -> bool {
    ring_edges(points)
        .filter(|(a, b)| (a.v > p.v) != (b.v > p.v))
        .filter(|(a, b)| p.u < a.u + (p.v - a.v) / (b.v - a.v) * (b.u - a.u))
        .count()
        % 2
        == 1
}

/// A closed, simple loop of cap-plane points.
#[derive(Debug, Clone, PartialEq)]
pub struct TrimLoop {
    points: Vec<UvPoint>,
}

impl TrimLoop {
    /// Builds a loop, dropping a repeated closing point and consecutive
    /// duplicates (zero-radius sketch corners emit those).
    ///
    /// # Errors
    /// Returns `TrimError` for non-finite input, fewer than three distinct
    /// points, or a self-intersecting loop.
    pub fn new(points: Vec<UvPoint>, tol: Tolerance) -> Result<Self, TrimError> {
        if !points.iter().all(UvPoint::is_finite) {
            return Err(TrimError::NonFinitePoints);
        }

        let mut points = points;
        points.dedup_by(|next, prev| next.near(*prev, tol));
        while points.len() > 1 && points[0].near(points[points.len() - 1], tol) {
            points.pop();
        }

        if points.len() < 3 {
            return Err(TrimError::InsufficientPoints { count: points.len() });
        }
        if ring_self_intersects(&points, tol) {
            return Err(TrimError::SelfIntersection);
        }
        Ok(Self { points })
    }

    #[must_use]
    pub fn points(&self) -> &[UvPoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Positive when counter-clockwise.
    #[must_use]
    pub fn signed_area(&self) -> f64 {
        shoelace(&self.points)
    }

    #[must_use]
    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    #[must_use]
    pub fn reversed(&self) -> Self {
        Self { points: self.points.iter().rev().copied().collect() }
    }

    #[must_use]
    pub fn contains(&self, point: UvPoint) -> bool {
        ring_contains(point, &self.points)
    }

    fn oriented(self, ccw: bool) -> Self {
        if self.is_ccw() == ccw { self } else { self.reversed() }
    }
}

/// An outer loop (CCW) with optional holes (CW).
#[derive(Debug, Clone, PartialEq)]
pub struct TrimRegion {
    pub outer: TrimLoop,
    pub holes: Vec<TrimLoop>,
}

impl TrimRegion {
    /// Create a region from an explicit outer loop and its holes, normalizing
    /// orientation.
    ///
    /// # Errors
    /// Returns `TrimError` if a hole touches or crosses the outer loop or
    /// another hole, or lies outside the outer loop.
    pub fn with_holes(
        outer: TrimLoop,
        holes: Vec<TrimLoop>,
        tol: Tolerance,
    ) -> Result<Self, TrimError> {
        let outer = outer.oriented(true);
        let mut accepted: Vec<TrimLoop> = Vec::with_capacity(holes.len());
        for hole in holes.into_iter().map(|hole| hole.oriented(false)) {
            if rings_meet(outer.points(), hole.points(), tol) {
                return Err(TrimError::HoleIntersectsOuter);
            }
            if !outer.contains(hole.points()[0]) {
                return Err(TrimError::HoleOutsideBoundary);
            }
            if accepted.iter().any(|other| rings_meet(other.points(), hole.points(), tol)) {
                return Err(TrimError::HolesIntersect);
            }
            accepted.push(hole);
        }
        Ok(Self { outer, holes: accepted })
    }

    /// The loop enclosing the largest area becomes the outer boundary, the
    /// rest become holes.
    ///
    /// # Errors
    /// Returns `TrimError::EmptyLoopSet` for an empty list and any error of
    /// [`TrimRegion::with_holes`].
    pub fn from_loops(mut loops: Vec<TrimLoop>, tol: Tolerance) -> Result<Self, TrimError> {
        let (largest, _) = loops
            .iter()
            .map(|ring| ring.signed_area().abs())
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(&b.1))
            .ok_or(TrimError::EmptyLoopSet)?;
        let outer = loops.swap_remove(largest);
        Self::with_holes(outer, loops, tol)
    }

    /// Inside the outer loop and outside every hole.
    #[must_use]
    pub fn contains(&self, point: UvPoint) -> bool {
        self.outer.contains(point) && !self.holes.iter().any(|hole| hole.contains(point))
    }
}
