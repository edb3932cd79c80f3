//! Placement: occupancy maps, first-fit slot search, and reflow.
//!
//! DESIGN
//! ======
//! `find_slot` answers "where is the first free cell for this span?" using a
//! row-major occupancy map built from the resolved placements of visible
//! siblings. The row scan is bounded by the sibling count plus one, which is
//! always enough: `n` siblings can fill at most `n` rows.
//!
//! `reflow` projects a grid's ordered module list into resolved cells.
//! Pinned modules are placed first, in sequence order, when their pin is in
//! bounds and unclaimed. Everything else flows in sequence order behind a
//! forward-only cursor, the way sparse grid auto-placement does. The
//! occupancy map makes overlaps impossible by construction.

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use tracing::{debug, warn};

use crate::geom::{Cell, GridMetrics, overlaps};
use crate::model::Grid;

/// Row-major boolean occupancy grid that grows rows lazily.
#[derive(Debug, Clone)]
pub struct OccupancyMap {
    columns: usize,
    rows: Vec<Vec<bool>>,
}

impl OccupancyMap {
    #[must_use]
    pub fn new(columns: usize) -> Self {
        Self { columns, rows: Vec::new() }
    }

    #[must_use]
    pub fn columns(&self) -> usize {
        self.columns
    }

    /// Rows materialized so far.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether `span` cells starting at `cell` are in bounds and unoccupied.
    #[must_use]
    pub fn is_free(&self, cell: Cell, span: usize) -> bool {
        if span == 0 || cell.col.checked_add(span).is_none_or(|end| end > self.columns) {
            return false;
        }
        match self.rows.get(cell.row) {
            Some(row) => row[cell.col..cell.col + span].iter().all(|taken| !taken),
            None => true,
        }
    }

    /// Mark `span` cells starting at `cell` as occupied, clipped to the
    /// column count.
    pub fn mark(&mut self, cell: Cell, span: usize) {
        if self.columns == 0 {
            return;
        }
        while self.rows.len() <= cell.row {
            self.rows.push(vec![false; self.columns]);
        }
        let end = cell.col.saturating_add(span).min(self.columns);
        for taken in self.rows[cell.row].iter_mut().take(end).skip(cell.col) {
            *taken = true;
        }
    }

    /// First free cell for `span`, scanning rows `0..max_rows` left to right.
    #[must_use]
    pub fn first_fit(&self, span: usize, max_rows: usize) -> Option<Cell> {
        self.first_fit_from(Cell::new(0, 0), span, max_rows)
    }

    /// First free cell for `span` at or after `start` in row-major order.
    #[must_use]
    pub fn first_fit_from(&self, start: Cell, span: usize, max_rows: usize) -> Option<Cell> {
        if span == 0 || span > self.columns {
            return None;
        }
        let last_col = self.columns - span;
        for row in start.row..max_rows {
            let from = if row == start.row { start.col } else { 0 };
            for col in from..=last_col {
                let cell = Cell::new(row, col);
                if self.is_free(cell, span) {
                    return Some(cell);
                }
            }
        }
        None
    }
}

/// First free `(row, col)` in `grid` for `required_span`, ignoring `excluding`.
///
/// Returns `None` when the grid has no columns, the span is wider than the
/// grid, or the bounded search finds nothing.
#[must_use]
pub fn find_slot(grid: &Grid, excluding: &str, required_span: usize, metrics: GridMetrics) -> Option<Cell> {
    let columns = grid.column_count(metrics);
    if columns == 0 {
        debug!(grid = %grid.id(), "grid has no columns");
        return None;
    }

    let mut map = OccupancyMap::new(columns);
    let mut siblings = 0;
    for module in grid.visible().filter(|m| m.id != excluding) {
        siblings += 1;
        if let Some(cell) = module.placement {
            map.mark(cell, module.span_cols());
        }
    }

    map.first_fit(required_span, siblings + 1)
}

/// Whether a module (`excluding`) could occupy `span` columns at `cell`
/// without leaving the grid or overlapping a visible sibling in that row.
#[must_use]
pub fn fits_at(grid: &Grid, excluding: &str, cell: Cell, span: usize, metrics: GridMetrics) -> bool {
    let columns = grid.column_count(metrics);
    if span == 0 || cell.col.checked_add(span).is_none_or(|end| end > columns) {
        return false;
    }
    !grid
        .visible()
        .filter(|m| m.id != excluding)
        .filter_map(|m| m.placement.map(|p| (p, m.span_cols())))
        .any(|(p, other_span)| p.row == cell.row && overlaps(cell.col, span, p.col, other_span))
}

/// Resolve a placement for every visible module in `grid`.
pub fn reflow(grid: &mut Grid, metrics: GridMetrics) {
    let columns = grid.column_count(metrics);
    let grid_id = grid.id();
    let modules = grid.modules_mut();
    let mut map = OccupancyMap::new(columns);

    for module in modules.iter_mut() {
        module.placement = None;
    }

    // PHASE: PINNED MODULES
    // Pin rows are trusted up to twice the visible count. Anything further
    // is ignored, but kept, so it cannot grow the map.
    let visible = modules.iter().filter(|m| m.visible).count();
    let pin_row_limit = visible.saturating_mul(2);
    let mut pinned_rows = 0;
    for module in modules.iter_mut().filter(|m| m.visible) {
        let Some(pin) = module.pin else {
            continue;
        };
        if pin.row >= pin_row_limit {
            warn!(grid = %grid_id, module = %module.id, row = pin.row, pin_row_limit, "pin row out of range; auto-placing");
            continue;
        }
        let span = module.span_cols();
        if map.is_free(pin, span) {
            map.mark(pin, span);
            module.placement = Some(pin);
            pinned_rows = pinned_rows.max(pin.row + 1);
        } else {
            debug!(grid = %grid_id, module = %module.id, row = pin.row, col = pin.col, "pinned cell unavailable; auto-placing");
        }
    }

    // PHASE: AUTO-FLOW
    let max_rows = pinned_rows + visible + 1;
    let mut cursor = Cell::new(0, 0);
    for module in modules.iter_mut().filter(|m| m.visible && m.placement.is_none()) {
        let span = module.span_cols();
        if let Some(cell) = map.first_fit_from(cursor, span, max_rows) {
            map.mark(cell, span);
            module.placement = Some(cell);
            cursor = Cell::new(cell.row, cell.col + span);
        } else {
            warn!(grid = %grid_id, module = %module.id, required_span = span, columns, "no room to place module");
        }
    }
}
