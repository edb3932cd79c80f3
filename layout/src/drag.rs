//! Drag-reorder: sessions, drop-index hit testing, and drops.
//!
//! A drop splices the module into the destination grid's sequence. Its size
//! class survives the move; only the span is re-clamped to what the class
//! defines. Every pin in the destination grid is cleared so placement follows
//! the new sequence. Dropping back into the same slot is a no-op so the host
//! can skip the save.

#[cfg(test)]
#[path = "drag_test.rs"]
mod drag_test;

use tracing::{debug, info};

use crate::error::LayoutError;
use crate::geom::{Rect, to_cell};
use crate::model::{Dashboard, GridId, ModuleId};

/// An in-progress drag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DragSession {
    /// Module being dragged.
    pub module: ModuleId,
    /// Grid the drag started in.
    pub source: GridId,
    /// Sequence index the drag started at.
    pub source_index: usize,
}

/// Result of a drop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropOutcome {
    /// The module moved; the layout should be saved.
    Moved { from: GridId, to: GridId, index: usize },
    /// Dropped onto itself or its own slot.
    Unchanged,
}

/// Start dragging a module.
///
/// # Errors
///
/// Returns [`LayoutError::UnknownModule`] or [`LayoutError::ModuleHidden`].
pub fn begin(dashboard: &Dashboard, id: &str) -> Result<DragSession, LayoutError> {
    let (source, module) = dashboard.require(id)?;
    if !module.visible {
        return Err(LayoutError::ModuleHidden(id.to_owned()));
    }
    let source_index = dashboard
        .grid(source)
        .position(id)
        .ok_or_else(|| LayoutError::UnknownModule(id.to_owned()))?;
    debug!(module = id, %source, source_index, "drag started");
    Ok(DragSession { module: id.to_owned(), source, source_index })
}

/// Sequence index a pointer over `dest` maps to.
///
/// The pointer rectangle is snapped to a cell with the canonical metrics; a
/// visible module under that cell yields its index, anything else drops at
/// the end of the grid.
#[must_use]
pub fn index_at(dashboard: &Dashboard, dest: GridId, pointer: Rect, grid_rect: Rect) -> usize {
    let metrics = dashboard.metrics();
    let grid = dashboard.grid(dest);
    let cell = to_cell(pointer, grid_rect, metrics.cell_width, metrics.row_height);
    grid.module_at(cell)
        .and_then(|m| grid.position(&m.id))
        .unwrap_or(grid.len())
}

/// Splice the dragged module into `dest` at `index` (clamped).
///
/// # Errors
///
/// Returns [`LayoutError::UnknownModule`] if the module vanished mid-drag.
pub fn drop(
    dashboard: &mut Dashboard,
    session: &DragSession,
    dest: GridId,
    index: usize,
) -> Result<DropOutcome, LayoutError> {
    let id = session.module.as_str();
    let (from, from_index) = dashboard
        .locate(id)
        .ok_or_else(|| LayoutError::UnknownModule(id.to_owned()))?;

    if from == dest {
        let last = dashboard.grid(dest).len().saturating_sub(1);
        if index.min(last) == from_index {
            debug!(module = id, grid = %dest, index, "drop onto own slot");
            return Ok(DropOutcome::Unchanged);
        }
    }

    let Some((_, mut module)) = dashboard.grid_mut(from).take(id) else {
        return Err(LayoutError::UnknownModule(id.to_owned()));
    };
    module.span = module.class_span();
    module.pin = None;
    let grid = dashboard.grid_mut(dest);
    let index = grid.insert(index, module);
    for sibling in grid.modules_mut() {
        sibling.pin = None;
    }

    dashboard.reflow(from);
    if from != dest {
        dashboard.reflow(dest);
    }
    info!(module = id, %from, to = %dest, index, "module moved");
    Ok(DropOutcome::Moved { from, to: dest, index })
}
