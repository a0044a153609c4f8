//! Rectilinear regions on a compressed lattice.
//!
//! A [`CellRegion`] stores the sorted X and Y breakpoints of an axis-aligned
//! area plus one filled flag per lattice cell. Every operation resamples the
//! region on a new breakpoint set and tests cell centres, so results stay
//! exact up to the breakpoint coordinates. Regions are kept normalized: no
//! empty border strips and no breakpoint that separates identical columns
//! or rows.

use std::collections::BTreeMap;

use crate::geom::Point2;

const EPS: f64 = 1e-9;

/// Axis-aligned rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub min: Point2,
    pub max: Point2,
}

impl Rect {
    /// Rectangle spanning two corners in any order.
    #[must_use]
    pub fn new(a: Point2, b: Point2) -> Self {
        Self {
            min: Point2::new(a.x.min(b.x), a.y.min(b.y)),
            max: Point2::new(a.x.max(b.x), a.y.max(b.y)),
        }
    }

    #[must_use]
    pub fn from_center(center: Point2, width: f64, height: f64) -> Self {
        let half = Point2::new(width / 2.0, height / 2.0);
        Self::new(center.sub(half), center.add(half))
    }

    #[must_use]
    pub fn width(&self) -> f64 {
        self.max.x - self.min.x
    }

    #[must_use]
    pub fn height(&self) -> f64 {
        self.max.y - self.min.y
    }

    #[must_use]
    pub fn center(&self) -> Point2 {
        self.min.add(self.max).scale(0.5)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.width().max(0.0) * self.height().max(0.0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width() <= EPS || self.height() <= EPS
    }

    /// Closed containment.
    #[must_use]
    pub fn contains(&self, p: Point2) -> bool {
        p.x >= self.min.x - EPS
            && p.x <= self.max.x + EPS
            && p.y >= self.min.y - EPS
            && p.y <= self.max.y + EPS
    }

    fn contains_strict(&self, p: Point2) -> bool {
        p.x > self.min.x && p.x < self.max.x && p.y > self.min.y && p.y < self.max.y
    }
}

/// Union of lattice cells.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CellRegion {
    xs: Vec<f64>,
    ys: Vec<f64>,
    filled: Vec<bool>,
}

impl CellRegion {
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Union of `rects`. Empty rectangles are ignored.
    #[must_use]
    pub fn from_rects(rects: impl IntoIterator<Item = Rect>) -> Self {
        let rects: Vec<Rect> = rects.into_iter().filter(|r| !r.is_empty()).collect();
        let xs = breakpoints(rects.iter().flat_map(|r| [r.min.x, r.max.x]));
        let ys = breakpoints(rects.iter().flat_map(|r| [r.min.y, r.max.y]));
        Self::sampled(xs, ys, |c| rects.iter().any(|r| r.contains_strict(c)))
    }

    /// Inward offset by `distance` with intersection corners: the points
    /// whose `2 * distance` square lies inside the region. A negative
    /// distance grows the region instead.
    #[must_use]
    pub fn eroded(&self, distance: f64) -> Self {
        if self.is_empty() || distance.abs() <= EPS {
            return self.clone();
        }
        let d = distance.abs();
        let xs = breakpoints(self.xs.iter().flat_map(|&x| [x - d, x + d]));
        let ys = breakpoints(self.ys.iter().flat_map(|&y| [y - d, y + d]));
        if distance > 0.0 {
            Self::sampled(xs, ys, |c| self.square_inside(c, d))
        } else {
            Self::sampled(xs, ys, |c| self.square_touches(c, d))
        }
    }

    /// The part of the region inside `rect`.
    #[must_use]
    pub fn intersect_rect(&self, rect: Rect) -> Self {
        if self.is_empty() || rect.is_empty() {
            return Self::empty();
        }
        let xs = breakpoints(self.xs.iter().copied().chain([rect.min.x, rect.max.x]));
        let ys = breakpoints(self.ys.iter().copied().chain([rect.min.y, rect.max.y]));
        Self::sampled(xs, ys, |c| rect.contains_strict(c) && self.cell_at(c))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        !self.filled.iter().any(|&f| f)
    }

    #[must_use]
    pub fn area(&self) -> f64 {
        self.cells().map(|r| r.area()).sum()
    }

    #[must_use]
    pub fn bounds(&self) -> Option<Rect> {
        if self.is_empty() {
            return None;
        }
        let (x0, x1) = (self.xs[0], self.xs[self.xs.len() - 1]);
        let (y0, y1) = (self.ys[0], self.ys[self.ys.len() - 1]);
        Some(Rect::new(Point2::new(x0, y0), Point2::new(x1, y1)))
    }

    /// Closed containment: boundary points count as inside.
    #[must_use]
    pub fn contains(&self, p: Point2) -> bool {
        self.cells().any(|r| r.contains(p))
    }

    /// Shortest filled run along any lattice row or column, `0.0` when empty.
    #[must_use]
    pub fn min_width(&self) -> f64 {
        let (nx, ny) = self.dims();
        let mut best = f64::INFINITY;
        for j in 0..ny {
            for (a, b) in runs((0..nx).map(|i| self.filled[j * nx + i])) {
                best = best.min(self.xs[b] - self.xs[a]);
            }
        }
        for i in 0..nx {
            for (a, b) in runs((0..ny).map(|j| self.filled[j * nx + i])) {
                best = best.min(self.ys[b] - self.ys[a]);
            }
        }
        if best.is_finite() { best } else { 0.0 }
    }

    /// Boundary loops with the interior on the left: outer loops run
    /// counter-clockwise, holes clockwise. Collinear vertices are merged and
    /// loops that touch themselves at a corner are split there.
    #[must_use]
    pub fn loops(&self) -> Vec<Vec<Point2>> {
        let (nx, ny) = self.dims();
        let filled = |i: isize, j: isize| {
            i >= 0
                && j >= 0
                && (i as usize) < nx
                && (j as usize) < ny
                && self.filled[j as usize * nx + i as usize]
        };

        let mut outgoing: BTreeMap<(isize, isize), Vec<(isize, isize)>> = BTreeMap::new();
        let mut add = |a: (isize, isize), b: (isize, isize)| outgoing.entry(a).or_default().push(b);
        for j in 0..ny as isize {
            for i in 0..nx as isize {
                if !filled(i, j) {
                    continue;
                }
                if !filled(i, j - 1) {
                    add((i, j), (i + 1, j));
                }
                if !filled(i + 1, j) {
                    add((i + 1, j), (i + 1, j + 1));
                }
                if !filled(i, j + 1) {
                    add((i + 1, j + 1), (i, j + 1));
                }
                if !filled(i - 1, j) {
                    add((i, j + 1), (i, j));
                }
            }
        }

        let mut walks: Vec<Vec<(isize, isize)>> = Vec::new();
        loop {
            let next = outgoing.iter().find(|(_, targets)| !targets.is_empty());
            let Some(start) = next.map(|(&k, _)| k) else {
                break;
            };
            let mut walk = vec![start];
            let mut prev = start;
            let mut current = take_edge(&mut outgoing, start, None);
            while let Some(vertex) = current {
                if vertex == start {
                    break;
                }
                walk.push(vertex);
                let incoming = (vertex.0 - prev.0, vertex.1 - prev.1);
                prev = vertex;
                current = take_edge(&mut outgoing, vertex, Some(incoming));
            }
            walks.push(walk);
        }

        split_pinches(walks)
            .into_iter()
            .map(|walk| merge_collinear(&walk))
            .filter(|walk| walk.len() >= 3)
            .map(|walk| {
                walk.into_iter()
                    .map(|(i, j)| Point2::new(self.xs[i as usize], self.ys[j as usize]))
                    .collect()
            })
            .collect()
    }

    /// Filled cells as rectangles.
    pub fn cells(&self) -> impl Iterator<Item = Rect> + '_ {
        let (nx, _) = self.dims();
        self.filled.iter().enumerate().filter(|(_, f)| **f).map(move |(k, _)| {
            let (i, j) = (k % nx, k / nx);
            Rect::new(
                Point2::new(self.xs[i], self.ys[j]),
                Point2::new(self.xs[i + 1], self.ys[j + 1]),
            )
        })
    }

    fn dims(&self) -> (usize, usize) {
        (self.xs.len().saturating_sub(1), self.ys.len().saturating_sub(1))
    }

    /// Whether the open lattice cell around `p` is filled.
    fn cell_at(&self, p: Point2) -> bool {
        let (nx, ny) = self.dims();
        let i = self.xs.partition_point(|&x| x <= p.x);
        let j = self.ys.partition_point(|&y| y <= p.y);
        if i == 0 || j == 0 || i > nx || j > ny {
            return false;
        }
        self.filled[(j - 1) * nx + (i - 1)]
    }

    fn overlapping(&self, c: Point2, d: f64) -> impl Iterator<Item = bool> + '_ {
        let (nx, ny) = self.dims();
        let (x0, x1, y0, y1) = (c.x - d, c.x + d, c.y - d, c.y + d);
        (0..ny)
            .filter(move |&j| self.ys[j + 1] > y0 + EPS && self.ys[j] < y1 - EPS)
            .flat_map(move |j| {
                (0..nx)
                    .filter(move |&i| self.xs[i + 1] > x0 + EPS && self.xs[i] < x1 - EPS)
                    .map(move |i| self.filled[j * nx + i])
            })
    }

    fn square_inside(&self, c: Point2, d: f64) -> bool {
        let Some(bounds) = self.bounds() else {
            return false;
        };
        let square = Rect::from_center(c, 2.0 * d, 2.0 * d);
        if square.min.x < bounds.min.x - EPS
            || square.max.x > bounds.max.x + EPS
            || square.min.y < bounds.min.y - EPS
            || square.max.y > bounds.max.y + EPS
        {
            return false;
        }
        self.overlapping(c, d).all(|f| f)
    }

    fn square_touches(&self, c: Point2, d: f64) -> bool {
        self.overlapping(c, d).any(|f| f)
    }

    fn sampled(xs: Vec<f64>, ys: Vec<f64>, inside: impl Fn(Point2) -> bool) -> Self {
        if xs.len() < 2 || ys.len() < 2 {
            return Self::empty();
        }
        let (nx, ny) = (xs.len() - 1, ys.len() - 1);
        let mut filled = Vec::with_capacity(nx * ny);
        for j in 0..ny {
            for i in 0..nx {
                let c = Point2::new(0.5 * (xs[i] + xs[i + 1]), 0.5 * (ys[j] + ys[j + 1]));
                filled.push(inside(c));
            }
        }
        Self { xs, ys, filled }.normalized()
    }

    fn normalized(self) -> Self {
        let (nx, ny) = self.dims();
        let cells = &self.filled;
        let col = |i: usize| (0..ny).map(move |j| cells[j * nx + i]);
        let row = |j: usize| (0..nx).map(move |i| cells[j * nx + i]);

        let Some(first_col) = (0..nx).find(|&i| col(i).any(|f| f)) else {
            return Self::empty();
        };
        let last_col = (0..nx).rev().find(|&i| col(i).any(|f| f)).unwrap_or(first_col);
        let first_row = (0..ny).find(|&j| row(j).any(|f| f)).unwrap_or(0);
        let last_row = (0..ny).rev().find(|&j| row(j).any(|f| f)).unwrap_or(first_row);

        let mut cols = vec![first_col];
        for i in first_col + 1..=last_col {
            if !col(i).eq(col(i - 1)) {
                cols.push(i);
            }
        }
        let mut rows = vec![first_row];
        for j in first_row + 1..=last_row {
            if !row(j).eq(row(j - 1)) {
                rows.push(j);
            }
        }

        let mut xs: Vec<f64> = cols.iter().map(|&i| self.xs[i]).collect();
        xs.push(self.xs[last_col + 1]);
        let mut ys: Vec<f64> = rows.iter().map(|&j| self.ys[j]).collect();
        ys.push(self.ys[last_row + 1]);

        let mut filled = Vec::with_capacity(cols.len() * rows.len());
        for &j in &rows {
            for &i in &cols {
                filled.push(self.filled[j * nx + i]);
            }
        }
        Self { xs, ys, filled }
    }
}

fn breakpoints(values: impl IntoIterator<Item = f64>) -> Vec<f64> {
    let mut out: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    out.sort_by(f64::total_cmp);
    out.dedup_by(|a, b| (*a - *b).abs() <= EPS);
    out
}

/// Half-open index ranges `[start, end)` of consecutive `true` values.
fn runs(flags: impl Iterator<Item = bool>) -> Vec<(usize, usize)> {
    let mut out = Vec::new();
    let mut start = None;
    let mut len = 0;
    for (k, f) in flags.enumerate() {
        match (f, start) {
            (true, None) => start = Some(k),
            (false, Some(s)) => {
                out.push((s, k));
                start = None;
            }
            _ => {}
        }
        len = k + 1;
    }
    if let Some(s) = start {
        out.push((s, len));
    }
    out
}

/// Remove and return the next edge leaving `from`. At a pinch vertex the
/// left-most turn wins, which keeps the walk on the cell it arrived along.
fn take_edge(
    outgoing: &mut BTreeMap<(isize, isize), Vec<(isize, isize)>>,
    from: (isize, isize),
    incoming: Option<(isize, isize)>,
) -> Option<(isize, isize)> {
    let targets = outgoing.get_mut(&from)?;
    let pick = match (incoming, targets.len()) {
        (_, 0) => return None,
        (Some(dir), n) if n > 1 => targets
            .iter()
            .position(|t| {
                let out = (t.0 - from.0, t.1 - from.1);
                dir.0 * out.1 - dir.1 * out.0 > 0
            })
            .unwrap_or(0),
        _ => 0,
    };
    Some(targets.swap_remove(pick))
}

fn split_pinches(walks: Vec<Vec<(isize, isize)>>) -> Vec<Vec<(isize, isize)>> {
    let mut pending = walks;
    let mut done = Vec::new();
    while let Some(walk) = pending.pop() {
        let repeat = (0..walk.len())
            .find_map(|a| (a + 1..walk.len()).find(|&b| walk[a] == walk[b]).map(|b| (a, b)));
        match repeat {
            Some((a, b)) => {
                let inner = walk[a..b].to_vec();
                let mut outer = walk[..a].to_vec();
                outer.extend_from_slice(&walk[b..]);
                pending.push(inner);
                pending.push(outer);
            }
            None => done.push(walk),
        }
    }
    done.reverse();
    done
}

fn merge_collinear(walk: &[(isize, isize)]) -> Vec<(isize, isize)> {
    let n = walk.len();
    (0..n)
        .filter(|&k| {
            let (a, b, c) = (walk[(k + n - 1) % n], walk[k], walk[(k + 1) % n]);
            let (d0, d1) = ((b.0 - a.0, b.1 - a.1), (c.0 - b.0, c.1 - b.1));
            d0.0 * d1.1 - d0.1 * d1.0 != 0
        })
        .map(|k| walk[k])
        .collect()
}
