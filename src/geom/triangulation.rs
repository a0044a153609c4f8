//! Ear-clipping triangulation of planar regions with holes.
//!
//! Holes are bridged into the outer ring at their leftmost vertex, then the
//! merged ring is clipped ear by ear. Output triangles follow the winding of
//! the outer loop (counter-clockwise for a normalized [`TrimRegion`]).

use std::iter;

use super::trim::{TrimLoop, TrimRegion};
use super::{Tolerance, UvPoint};

#[derive(Debug, Default, Clone, PartialEq)]
pub struct TriangulationDiagnostics {
    pub input_vertex_count: usize,
    pub output_triangle_count: usize,
    pub culled_degenerate_triangles: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriangulationResult {
    pub vertices: Vec<UvPoint>,
    pub indices: Vec<u32>,
    pub diagnostics: TriangulationDiagnostics,
}

/// Triangulate a region. Vertex indices refer to the outer loop followed by
/// each hole, in order, so callers can map them back to their own buffers.
///
/// # Errors
/// Returns a message when the region degenerates or no ear can be found.
pub fn triangulate_trim_region(
    region: &TrimRegion,
    tol: Tolerance,
) -> Result<TriangulationResult, String> {
    let loops: Vec<&[UvPoint]> = iter::once(region.outer.points())
        .chain(region.holes.iter().map(TrimLoop::points))
        .collect();
    let vertices: Vec<UvPoint> = loops.iter().flat_map(|ring| ring.iter().copied()).collect();
    if vertices.iter().any(|p| !p.is_finite()) {
        return Err("triangulation vertices must be finite".to_string());
    }
    if loops[0].len() < 3 {
        return Err("trim region outer loop must have at least 3 points".to_string());
    }

    let mut rings = Rings::with_capacity(vertices.len() + 2 * region.holes.len());
    let mut first = 0u32;
    let mut starts = Vec::with_capacity(loops.len());
    for ring in &loops {
        starts.push(rings.push_ring(first, ring));
        first += ring.len() as u32;
    }

    let mut outer = rings
        .prune(starts[0], tol)
        .ok_or_else(|| "trim region outer loop degenerates after filtering".to_string())?;

    let mut holes = Vec::with_capacity(starts.len() - 1);
    for &start in &starts[1..] {
        if let Some(start) = rings.prune(start, tol) {
            holes.push(rings.leftmost(start));
        }
    }
    holes.sort_by(|&a, &b| {
        let (pa, pb) = (rings.point(a), rings.point(b));
        pa.u.total_cmp(&pb.u).then(pa.v.total_cmp(&pb.v))
    });

    for hole in holes {
        let target = rings
            .bridge_target(hole, outer, tol)
            .ok_or_else(|| "failed to find a bridge from hole to outer loop".to_string())?;
        rings.splice(target, hole);
        outer = rings
            .prune(outer, tol)
            .ok_or_else(|| "trim region degenerates after hole merge".to_string())?;
    }

    let triangles = rings.clip(outer, tol)?;
    if triangles.is_empty() {
        return Err("triangulation produced no triangles".to_string());
    }

    let min_area = tol.eps_squared();
    let (kept, culled): (Vec<_>, Vec<_>) = triangles.into_iter().partition(|&[a, b, c]| {
        if a == b || b == c || a == c {
            return false;
        }
        let area =
            0.5 * orient2d(vertices[a as usize], vertices[b as usize], vertices[c as usize]).abs();
        area.is_finite() && area > min_area
    });
    let indices: Vec<u32> = kept.into_iter().flatten().collect();

    Ok(TriangulationResult {
        diagnostics: TriangulationDiagnostics {
            input_vertex_count: vertices.len(),
            output_triangle_count: indices.len() / 3,
            culled_degenerate_triangles: culled.len(),
        },
        vertices,
        indices,
    })
}

#[derive(Debug, Clone, Copy)]
struct Node {
    /// Index into the caller's vertex buffer.
    idx: u32,
    point: UvPoint,
    prev: usize,
    next: usize,
}

/// Doubly linked rings stored in one arena. Removing a node only unlinks it.
struct Rings {
    nodes: Vec<Node>,
}

impl Rings {
    fn with_capacity(capacity: usize) -> Self {
        Self { nodes: Vec::with_capacity(capacity) }
    }

    /// Appends a closed ring; `first` is the buffer index of `points[0]`.
    fn push_ring(&mut self, first: u32, points: &[UvPoint]) -> usize {
        let base = self.nodes.len();
        let len = points.len();
        self.nodes.extend(points.iter().enumerate().map(|(i, &point)| Node {
            idx: first + i as u32,
            point,
            prev: base + (i + len - 1) % len,
            next: base + (i + 1) % len,
        }));
        base
    }

    fn point(&self, node: usize) -> UvPoint {
        self.nodes[node].point
    }

    /// Nodes of the ring containing `start`, beginning at `start`.
    fn walk(&self, start: usize) -> impl Iterator<Item = usize> + '_ {
        iter::successors(Some(start), move |&node| {
            Some(self.nodes[node].next).filter(|&next| next != start)
        })
        .take(self.nodes.len())
    }

    fn len_from(&self, start: usize) -> usize {
        self.walk(start).count()
    }

    fn unlink(&mut self, node: usize) {
        let Node { prev, next, .. } = self.nodes[node];
        self.nodes[prev].next = next;
        self.nodes[next].prev = prev;
    }

    /// Removes repeated and collinear vertices. `None` once fewer than three
    /// remain.
    fn prune(&mut self, start: usize, tol: Tolerance) -> Option<usize> {
        if self.len_from(start) < 3 {
            return None;
        }
        let mut start = start;
        let mut cur = start;
        for _ in 0..self.nodes.len().saturating_mul(4).max(16) {
            let Node { prev, next, .. } = self.nodes[cur];
            if cur == next || prev == next {
                return None;
            }
            let (p, c, n) = (self.point(prev), self.point(cur), self.point(next));
            if same_point(p, c, tol) || same_point(c, n, tol) || line_distance(p, c, n) <= tol.eps {
                if cur == start {
                    start = next;
                }
                self.unlink(cur);
                if self.len_from(start) < 3 {
                    return None;
                }
                cur = prev;
            } else {
                cur = next;
                if cur == start {
                    break;
                }
            }
        }
        Some(start)
    }

    fn leftmost(&self, start: usize) -> usize {
        self.walk(start)
            .min_by(|&a, &b| {
                let (pa, pb) = (self.point(a), self.point(b));
                pa.u.total_cmp(&pb.u).then(pa.v.total_cmp(&pb.v))
            })
            .unwrap_or(start)
    }

    fn signed_area(&self, start: usize) -> f64 {
        0.5 * self
            .walk(start)
            .map(|node| {
                let (a, b) = (self.point(node), self.point(self.nodes[node].next));
                a.u * b.v - b.u * a.v
            })
            .sum::<f64>()
    }

    /// Outer vertex the hole vertex `hole` can be joined to. Casts a ray
    /// towards -U first, then falls back to the nearest visible vertex on
    /// the left.
    fn bridge_target(&self, hole: usize, outer: usize, tol: Tolerance) -> Option<usize> {
        let h = self.point(hole);

        let mut hit: Option<(f64, usize, usize)> = None;
        for p in self.walk(outer) {
            let q = self.nodes[p].next;
            let (a, b) = (self.point(p), self.point(q));
            if (a.v > h.v) == (b.v > h.v) {
                continue;
            }
            let u = a.u + (h.v - a.v) / (b.v - a.v) * (b.u - a.u);
            if u <= h.u + tol.eps && hit.is_none_or(|(best, _, _)| u > best) {
                hit = Some((u, p, q));
            }
        }
        if let Some((_, p, q)) = hit {
            let ends = if self.point(p).u < self.point(q).u { [p, q] } else { [q, p] };
            if let Some(node) = ends.into_iter().find(|&node| self.sees(h, node, outer, tol)) {
                return Some(node);
            }
        }

        let dist2 = |node: usize| {
            let p = self.point(node);
            (p.u - h.u).powi(2) + (p.v - h.v).powi(2)
        };
        self.walk(outer)
            .filter(|&node| self.point(node).u <= h.u + tol.eps && self.sees(h, node, outer, tol))
            .min_by(|&a, &b| dist2(a).total_cmp(&dist2(b)))
    }

    /// True when the segment from `from` to `target` crosses no edge of the
    /// ring other than those meeting at `target`.
    fn sees(&self, from: UvPoint, target: usize, ring: usize, tol: Tolerance) -> bool {
        let to = self.point(target);
        self.walk(ring).all(|e| {
            let n = self.nodes[e].next;
            e == target
                || n == target
                || !segments_cross(from, to, self.point(e), self.point(n), tol)
        })
    }

    /// Joins the ring of `b` into the ring of `a` through a zero-width
    /// channel `a -> b ... b' -> a'`.
    fn splice(&mut self, a: usize, b: usize) {
        let a_next = self.nodes[a].next;
        let b_prev = self.nodes[b].prev;
        let (copy_a, copy_b) = (self.nodes[a], self.nodes[b]);
        let a2 = self.nodes.len();
        let b2 = a2 + 1;
        self.nodes.push(Node { prev: b2, next: a_next, ..copy_a });
        self.nodes.push(Node { prev: b_prev, next: a2, ..copy_b });

        self.nodes[a].next = b;
        self.nodes[b].prev = a;
        self.nodes[b_prev].next = b2;
        self.nodes[a_next].prev = a2;
    }

    fn clip(&mut self, start: usize, tol: Tolerance) -> Result<Vec<[u32; 3]>, String> {
        let mut start = self
            .prune(start, tol)
            .ok_or_else(|| "polygon degenerates after filtering".to_string())?;
        let ccw = self.signed_area(start) > 0.0;
        let mut remaining = self.len_from(start);
        let mut triangles = Vec::with_capacity(remaining.saturating_sub(2));
        let (mut ear, mut stop) = (start, start);
        let mut idle_laps = 0usize;

        while remaining > 2 {
            let Node { prev, next, .. } = self.nodes[ear];
            if self.is_ear(ear, ccw, tol) {
                let (a, b, c) = (self.nodes[prev].idx, self.nodes[ear].idx, self.nodes[next].idx);
                triangles.push(if ccw { [a, b, c] } else { [a, c, b] });
                if ear == start {
                    start = next;
                }
                self.unlink(ear);
                remaining -= 1;
                ear = next;
                stop = next;
                idle_laps = 0;
                continue;
            }

            ear = next;
            if ear == stop {
                // A full lap without an ear: prune and retry, then give up.
                idle_laps += 1;
                if idle_laps > 2 {
                    return Err("failed to triangulate polygon (no ears found)".to_string());
                }
                start = self
                    .prune(start, tol)
                    .ok_or_else(|| "polygon degenerates during triangulation".to_string())?;
                remaining = self.len_from(start);
                ear = start;
                stop = start;
            }
        }
        Ok(triangles)
    }

    fn is_ear(&self, ear: usize, ccw: bool, tol: Tolerance) -> bool {
        let Node { prev, next, .. } = self.nodes[ear];
        let (a, b, c) = (self.point(prev), self.point(ear), self.point(next));
        let sign = if ccw { 1.0 } else { -1.0 };
        if line_distance(a, b, c) <= tol.eps || orient2d(a, b, c) * sign <= 0.0 {
            return false;
        }

        // Only reflex vertices can poke into a convex corner's triangle.
        !self.walk(self.nodes[next].next).take_while(|&p| p != prev).any(|p| {
            let pt = self.point(p);
            let inside = [orient2d(a, b, pt), orient2d(b, c, pt), orient2d(c, a, pt)]
                .iter()
                .all(|&o| o * sign >= -tol.eps);
            let Node { prev: pp, next: pn, .. } = self.nodes[p];
            inside && orient2d(self.point(pp), pt, self.point(pn)) * sign <= tol.eps
        })
    }
}

fn same_point(a: UvPoint, b: UvPoint, tol: Tolerance) -> bool {
    (a.u - b.u).abs() <= tol.eps && (a.v - b.v).abs() <= tol.eps
}

fn orient2d(a: UvPoint, b: UvPoint, c: UvPoint) -> f64 {
    (b.u - a.u) * (c.v - a.v) - (b.v - a.v) * (c.u - a.u)
}

/// Distance from `p` to the line through `a` and `b`.
fn line_distance(a: UvPoint, p: UvPoint, b: UvPoint) -> f64 {
    let len = (b.u - a.u).hypot(b.v - a.v);
    if !len.is_finite() || len <= 0.0 {
        return (p.u - a.u).hypot(p.v - a.v);
    }
    orient2d(a, b, p).abs() / len
}

/// Proper crossing or touching of segments `ab` and `cd`.
fn segments_cross(a: UvPoint, b: UvPoint, c: UvPoint, d: UvPoint, tol: Tolerance) -> bool {
    let within = |p: UvPoint, s: UvPoint, e: UvPoint| {
        (s.u.min(e.u) - tol.eps..=s.u.max(e.u) + tol.eps).contains(&p.u)
            && (s.v.min(e.v) - tol.eps..=s.v.max(e.v) + tol.eps).contains(&p.v)
    };
    let (o1, o2) = (orient2d(a, b, c), orient2d(a, b, d));
    let (o3, o4) = (orient2d(c, d, a), orient2d(c, d, b));
    let touching = (o1.abs() <= tol.eps && within(c, a, b))
        || (o2.abs() <= tol.eps && within(d, a, b))
        || (o3.abs() <= tol.eps && within(a, c, d))
        || (o4.abs() <= tol.eps && within(b, c, d));
    let straddles = |x: f64, y: f64| (x > tol.eps && y < -tol.eps) || (x < -tol.eps && y > tol.eps);
    touching || (straddles(o1, o2) && straddles(o3, o4))
}
