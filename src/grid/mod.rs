//! Occupancy grids and the locations of their cells.
//!
//! A [`Grid`] is listed row by row like a drawing: row 0 is the back row
//! (largest Y) and column 0 the leftmost column. Bins, bases, compartments
//! and screw-hole plates are all placed from the same grid.

mod region;

pub use region::{CellRegion, Rect};

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::geom::Point2;

/// Alignment of a location pattern on one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Align {
    Min,
    #[default]
    Center,
    Max,
}

impl Align {
    fn offset(self, size: f64) -> f64 {
        match self {
            Self::Min => 0.0,
            Self::Center => -size / 2.0,
            Self::Max => -size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("grid has no cells")]
    Empty,
    #[error("grid has no occupied cell")]
    NoOccupiedCell,
    #[error("invalid grid size '{0}', expected WxH (e.g. 2x3)")]
    InvalidSize(String),
    #[error("unknown grid cell '{ch}' at row {row}, column {col}")]
    UnknownCell { ch: char, row: usize, col: usize },
}

/// Rectangular boolean occupancy matrix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    cells: Vec<Vec<bool>>,
    cols: usize,
}

impl Grid {
    /// Ragged rows are padded with empty cells.
    pub fn new(rows: Vec<Vec<bool>>) -> Result<Self, GridError> {
        let cols = rows.iter().map(Vec::len).max().unwrap_or(0);
        if rows.is_empty() || cols == 0 {
            return Err(GridError::Empty);
        }
        let cells: Vec<Vec<bool>> = rows
            .into_iter()
            .map(|mut row| {
                row.resize(cols, false);
                row
            })
            .collect();
        if !cells.iter().flatten().any(|&c| c) {
            return Err(GridError::NoOccupiedCell);
        }
        Ok(Self { cells, cols })
    }

    /// Fully occupied `cols` × `rows` grid.
    pub fn filled(cols: usize, rows: usize) -> Result<Self, GridError> {
        Self::new(vec![vec![true; cols]; rows])
    }

    /// Parse `"WxH"`, case-insensitive, into `(width, height)`.
    pub fn parse_size(value: &str) -> Result<(usize, usize), GridError> {
        let invalid = || GridError::InvalidSize(value.to_owned());
        let lower = value.trim().to_lowercase();
        let (w, h) = lower.split_once('x').ok_or_else(invalid)?;
        let w: usize = w.trim().parse().map_err(|_| invalid())?;
        let h: usize = h.trim().parse().map_err(|_| invalid())?;
        if w == 0 || h == 0 {
            return Err(invalid());
        }
        Ok((w, h))
    }

    /// Parse ASCII art such as `"###\n#.#\n###"` or `"##/#."`.
    ///
    /// `#`, `X`, `x`, `1` and `o` are occupied; `.`, `0`, `_` and `-` are
    /// empty. Whitespace inside a row is ignored and blank lines are skipped.
    pub fn parse(ascii: &str) -> Result<Self, GridError> {
        let mut rows = Vec::new();
        for line in ascii.split(['\n', '/']) {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let row_index = rows.len();
            let row = line
                .chars()
                .filter(|c| !c.is_whitespace())
                .enumerate()
                .map(|(col, ch)| match ch {
                    '#' | 'X' | 'x' | '1' | 'o' => Ok(true),
                    '.' | '0' | '_' | '-' => Ok(false),
                    _ => Err(GridError::UnknownCell { ch, row: row_index, col }),
                })
                .collect::<Result<Vec<bool>, _>>()?;
            rows.push(row);
        }
        Self::new(rows)
    }

    #[must_use]
    pub fn rows(&self) -> usize {
        self.cells.len()
    }

    #[must_use]
    pub fn cols(&self) -> usize {
        self.cols
    }

    #[must_use]
    pub fn is_occupied(&self, row: usize, col: usize) -> bool {
        self.cells.get(row).and_then(|r| r.get(col)).copied().unwrap_or(false)
    }

    /// Occupied `(row, col)` pairs in row-major order.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        self.cells
            .iter()
            .enumerate()
            .flat_map(|(i, row)| {
                row.iter().enumerate().filter(|(_, c)| **c).map(move |(j, _)| (i, j))
            })
    }

    #[must_use]
    pub fn occupied_count(&self) -> usize {
        self.occupied_cells().count()
    }

    /// `(n_rows, n_cols)` spanned by the occupied cells, counted from row 0
    /// and column 0.
    #[must_use]
    pub fn extent(&self) -> (usize, usize) {
        self.occupied_cells()
            .fold((0, 0), |(r, c), (i, j)| (r.max(i + 1), c.max(j + 1)))
    }

    /// Location of every occupied cell, row-major, on a `x_spacing` ×
    /// `y_spacing` lattice aligned per axis.
    #[must_use]
    pub fn locations(&self, x_spacing: f64, y_spacing: f64, align: (Align, Align)) -> Vec<Point2> {
        let (n_rows, n_cols) = self.extent();
        let size_x = x_spacing * n_cols.saturating_sub(1) as f64;
        let size_y = y_spacing * n_rows.saturating_sub(1) as f64;
        let offset = Point2::new(align.0.offset(size_x), align.1.offset(size_y));
        self.occupied_cells()
            .map(|(i, j)| {
                offset.add(Point2::new(j as f64 * x_spacing, (n_rows - i - 1) as f64 * y_spacing))
            })
            .collect()
    }

    /// Centred cell locations at `pitch`.
    #[must_use]
    pub fn centered_locations(&self, pitch: f64) -> Vec<Point2> {
        self.locations(pitch, pitch, (Align::Center, Align::Center))
    }

    /// Union of the `pitch`-sized cell squares at the centred locations.
    #[must_use]
    pub fn cell_region(&self, pitch: f64) -> CellRegion {
        CellRegion::from_rects(
            self.centered_locations(pitch)
                .into_iter()
                .map(|c| Rect::from_center(c, pitch, pitch)),
        )
    }

    /// `W` × `H` label used in file names: occupied extent in columns and rows.
    #[must_use]
    pub fn size_label(&self) -> String {
        let (rows, cols) = self.extent();
        format!("{cols}x{rows}")
    }
}

impl FromStr for Grid {
    type Err = GridError;

    /// Accepts either a `WxH` size or ASCII art.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match Self::parse_size(s) {
            Ok((w, h)) => Self::filled(w, h),
            Err(size_err) => {
                if s.trim().chars().all(|c| c.is_ascii_digit() || c.eq_ignore_ascii_case(&'x')) {
                    Err(size_err)
                } else {
                    Self::parse(s)
                }
            }
        }
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.cells.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for &cell in row {
                write!(f, "{}", if cell { '#' } else { '.' })?;
            }
        }
        Ok(())
    }
}
