//! Live resize: sessions, previews, and commits.
//!
//! DESIGN
//! ======
//! While the pointer moves, pixel dimensions always follow the pointer but
//! the column span only changes when the new span fits at the module's cell.
//! The model is not touched until the gesture ends. On end the dimensions
//! are classified into a size class; if the committed span no longer fits,
//! the module keeps its exact pre-gesture size, span, and pin.

#[cfg(test)]
#[path = "resize_test.rs"]
mod resize_test;

use tracing::{debug, info};

use crate::error::LayoutError;
use crate::geom::Cell;
use crate::model::{Dashboard, GridId, ModuleId};
use crate::placement;
use crate::size::{SizeClass, clamp_resize, classify_gesture_end, snap_square, span_for_width};

/// Module state captured when a resize starts.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeOrigin {
    /// Rendered width at gesture start.
    pub width: f64,
    /// Rendered height at gesture start.
    pub height: f64,
    pub size: SizeClass,
    pub span: u8,
    pub pin: Option<Cell>,
}

/// An in-progress resize.
#[derive(Debug, Clone, PartialEq)]
pub struct ResizeSession {
    pub module: ModuleId,
    pub grid: GridId,
    pub origin: ResizeOrigin,
    /// Span accepted so far.
    pub span: u8,
    /// Last previewed width.
    pub width: f64,
    /// Last previewed height.
    pub height: f64,
}

/// What the host should draw for a pointer move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizePreview {
    pub width: f64,
    pub height: f64,
    pub span: u8,
    /// The pointer asked for a different span that would not fit.
    pub span_rejected: bool,
}

/// Result of ending a resize.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeOutcome {
    /// The new size was committed at `at`; the layout should be saved.
    Committed { size: SizeClass, span: u8, at: Cell },
    /// The new size would overlap; the pre-gesture size was kept.
    Reverted { size: SizeClass, span: u8 },
}

/// Start resizing a module whose rendered size is `width` × `height`.
///
/// # Errors
///
/// Returns [`LayoutError::UnknownModule`] or [`LayoutError::ModuleHidden`].
pub fn begin(dashboard: &Dashboard, id: &str, width: f64, height: f64) -> Result<ResizeSession, LayoutError> {
    let (grid, module) = dashboard.require(id)?;
    if !module.visible {
        return Err(LayoutError::ModuleHidden(id.to_owned()));
    }
    let origin = ResizeOrigin { width, height, size: module.size, span: module.span, pin: module.pin };
    debug!(module = id, %grid, width, height, span = module.span, "resize started");
    Ok(ResizeSession { module: id.to_owned(), grid, span: module.span, width, height, origin })
}

/// Apply a pointer move. Dimensions always update; the span only changes
/// when it fits.
pub fn update(dashboard: &Dashboard, session: &mut ResizeSession, width: f64, height: f64) -> ResizePreview {
    let (width, height) = clamp_resize(width, height);
    let (width, height) = snap_square(width, height);
    let candidate = span_for_width(width);

    let span_rejected = candidate != session.span && !span_fits(dashboard, session, candidate);
    if !span_rejected {
        session.span = candidate;
    }
    session.width = width;
    session.height = height;

    ResizePreview { width, height, span: session.span, span_rejected }
}

/// End the gesture with the final pointer dimensions.
///
/// # Errors
///
/// Returns [`LayoutError::UnknownModule`] if the module vanished mid-gesture.
pub fn finish(
    dashboard: &mut Dashboard,
    session: ResizeSession,
    width: f64,
    height: f64,
) -> Result<ResizeOutcome, LayoutError> {
    let (width, height) = clamp_resize(width, height);
    let size = classify_gesture_end(width, height, session.span);
    let at = dashboard
        .grid(session.grid)
        .get(&session.module)
        .and_then(|m| m.placement);

    let fits = at.is_some() && span_fits(dashboard, &session, session.span);
    let module = dashboard
        .module_mut(&session.module)
        .ok_or_else(|| LayoutError::UnknownModule(session.module.clone()))?;

    let outcome = match at {
        Some(cell) if fits => {
            module.size = size;
            module.span = session.span;
            module.pin = Some(cell);
            ResizeOutcome::Committed { size, span: session.span, at: cell }
        }
        _ => {
            module.size = session.origin.size;
            module.span = session.origin.span;
            module.pin = session.origin.pin;
            ResizeOutcome::Reverted { size: session.origin.size, span: session.origin.span }
        }
    };
    dashboard.reflow(session.grid);

    match outcome {
        ResizeOutcome::Committed { size, span, at } => {
            info!(module = %session.module, %size, span, row = at.row, col = at.col, "resize committed");
        }
        ResizeOutcome::Reverted { size, .. } => {
            info!(module = %session.module, %size, "resize would overlap; reverted");
        }
    }
    Ok(outcome)
}

fn span_fits(dashboard: &Dashboard, session: &ResizeSession, span: u8) -> bool {
    let grid = dashboard.grid(session.grid);
    grid.get(&session.module)
        .and_then(|m| m.placement)
        .is_some_and(|cell| placement::fits_at(grid, &session.module, cell, usize::from(span), dashboard.metrics()))
}
