//! Interaction model: edit/view mode and the gesture state machine.
//!
//! `Mode` replaces an ambient "edit mode" flag: it is owned by the engine and
//! checked by every mutating operation. `GestureState` is the single active
//! gesture for the whole dashboard, so two pointers can never drive two
//! modules at once.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::drag::DragSession;
use crate::model::ModuleId;
use crate::resize::ResizeSession;

/// Whether the dashboard is being customized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Read-only dashboard (default).
    #[default]
    View,
    /// Customize mode: drag handles, remove buttons, and the restore menu.
    Edit,
}

impl Mode {
    #[must_use]
    pub fn is_editing(self) -> bool {
        self == Self::Edit
    }

    /// The other mode.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::View => Self::Edit,
            Self::Edit => Self::View,
        }
    }
}

/// The one gesture in progress, if any.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    /// No gesture in progress.
    #[default]
    Idle,
    /// A module is being dragged between or within grids.
    Dragging(DragSession),
    /// A module is being resized.
    Resizing(ResizeSession),
    /// A resize just ended; text selection stays suspended until `until_ms`.
    Settling {
        /// Module that was resized.
        module: ModuleId,
        /// Host clock value at which the settle window closes.
        until_ms: u64,
    },
}

impl GestureState {
    /// Whether a pointer gesture currently owns the dashboard. Settling
    /// does not count.
    #[must_use]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Dragging(_) | Self::Resizing(_))
    }

    /// Short label for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Dragging(_) => "dragging",
            Self::Resizing(_) => "resizing",
            Self::Settling { .. } => "settling",
        }
    }
}
