//! Engine error type.

use crate::model::ModuleId;

/// Failures returned by dashboard operations.
///
/// None of these are fatal: the dashboard is left in its last consistent
/// state and the host decides whether to surface anything to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("unknown module: {0}")]
    UnknownModule(ModuleId),
    #[error("unknown grid: {0}")]
    UnknownGrid(String),
    #[error("duplicate module id: {0}")]
    DuplicateModule(ModuleId),
    #[error("module is hidden: {0}")]
    ModuleHidden(ModuleId),
    #[error("dashboard is not in edit mode")]
    NotEditing,
    #[error("another gesture is already active")]
    GestureBusy,
    #[error("no active {0} gesture")]
    NoActiveGesture(&'static str),
    #[error("no free slot for {id} (span {span})")]
    NoSlot { id: ModuleId, span: usize },
}
