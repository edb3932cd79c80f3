//! Grid geometry: pixel rectangles, discrete cells, and column math.
//!
//! Everything here is pure. Pixel input only enters the engine through
//! pointer rectangles reported by the host; the rest of the crate works on
//! [`Cell`]s and column spans.

#[cfg(test)]
#[path = "geom_test.rs"]
mod geom_test;

use serde::{Deserialize, Serialize};

use crate::consts::{CELL_WIDTH_PX, ROW_HEIGHT_PX};

/// An axis-aligned rectangle in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self { left, top, width, height }
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }
}

/// A discrete grid position. Zero-based; ordering is row-major.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    #[must_use]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

/// Canonical cell dimensions shared by every geometry computation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    /// Column width in CSS pixels.
    pub cell_width: f64,
    /// Row height in CSS pixels.
    pub row_height: f64,
}

impl Default for GridMetrics {
    fn default() -> Self {
        Self { cell_width: CELL_WIDTH_PX, row_height: ROW_HEIGHT_PX }
    }
}

/// Map a rectangle to the grid cell containing its top-left corner.
///
/// Offsets above or left of the grid clamp to row/column zero.
#[must_use]
pub fn to_cell(rect: Rect, grid_rect: Rect, cell_width: f64, cell_height: f64) -> Cell {
    Cell {
        row: axis_index(rect.top - grid_rect.top, cell_height),
        col: axis_index(rect.left - grid_rect.left, cell_width),
    }
}

/// Standard half-open interval overlap between two column ranges.
#[must_use]
pub fn overlaps(a_col: usize, a_span: usize, b_col: usize, b_span: usize) -> bool {
    a_col < b_col + b_span && a_col + a_span > b_col
}

/// Number of whole columns that fit in `grid_width_px`.
///
/// Degenerate input (zero, negative, or non-finite widths) yields zero
/// columns, which callers treat as "no space available".
#[must_use]
pub fn grid_column_count(grid_width_px: f64, cell_width: f64) -> usize {
    axis_index(grid_width_px, cell_width)
}

/// Pixel rectangle of a cell spanning `span` columns, relative to `grid_rect`.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn cell_rect(cell: Cell, span: usize, grid_rect: Rect, metrics: GridMetrics) -> Rect {
    Rect {
        left: grid_rect.left + cell.col as f64 * metrics.cell_width,
        top: grid_rect.top + cell.row as f64 * metrics.row_height,
        width: span as f64 * metrics.cell_width,
        height: metrics.row_height,
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn axis_index(offset: f64, step: f64) -> usize {
    if step.is_nan() || step <= 0.0 || !offset.is_finite() || offset <= 0.0 {
        return 0;
    }
    (offset / step).floor() as usize
}
