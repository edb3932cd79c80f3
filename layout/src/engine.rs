use tracing::{debug, info};

use crate::consts::{SAVE_DEBOUNCE_MS, SETTLE_MS};
use crate::drag::{self, DragSession, DropOutcome};
use crate::error::LayoutError;
use crate::geom::{GridMetrics, Rect};
use crate::input::{GestureState, Mode};
use crate::model::{Dashboard, GridId, ModuleSpec, RestoreItem, RestoreOutcome};
use crate::persist::{self, LayoutStore};
use crate::resize::{self, ResizeOutcome, ResizePreview, ResizeSession};
use crate::sync::{SaveQueue, SaveRequest};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from operations for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Placements changed; redraw both grids from the model.
    Render,
    /// Enable or suspend text selection on the page.
    SetTextSelection(bool),
    /// The set of hidden modules changed.
    RestoreMenuChanged(Vec<RestoreItem>),
    /// Send this layout to the server and report back with
    /// [`DashboardCore::save_completed`].
    SendSave(SaveRequest),
    /// Edit mode was entered or left.
    ModeChanged(Mode),
    /// Stored layout was cleared; hosts that render server-side reload.
    Reload,
}

/// Engine tuning.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineConfig {
    pub metrics: GridMetrics,
    pub save_debounce_ms: u64,
    /// How long text selection stays suspended after a resize ends.
    pub settle_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { metrics: GridMetrics::default(), save_debounce_ms: SAVE_DEBOUNCE_MS, settle_ms: SETTLE_MS }
    }
}

/// Dashboard engine: the model plus mode, gesture, storage, and save queue.
///
/// Every operation is synchronous and returns the actions the host should
/// perform. The host advances time with [`DashboardCore::tick`]; saves are
/// scheduled against the clock value of the most recent tick.
pub struct DashboardCore<S: LayoutStore> {
    dashboard: Dashboard,
    mode: Mode,
    gesture: GestureState,
    store: S,
    saves: SaveQueue,
    config: EngineConfig,
    now_ms: u64,
}

impl<S: LayoutStore> DashboardCore<S> {
    /// Build an engine over a manifest. Call [`DashboardCore::load`] to
    /// apply the stored layout.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::DuplicateModule`] for a manifest with repeated ids.
    pub fn new(manifest: Vec<ModuleSpec>, store: S, config: EngineConfig) -> Result<Self, LayoutError> {
        let dashboard = Dashboard::from_manifest(manifest, config.metrics)?;
        Ok(Self {
            dashboard,
            mode: Mode::default(),
            gesture: GestureState::default(),
            store,
            saves: SaveQueue::new(config.save_debounce_ms),
            config,
            now_ms: 0,
        })
    }

    // --- Queries ---

    #[must_use]
    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    #[must_use]
    pub fn mode(&self) -> Mode {
        self.mode
    }

    #[must_use]
    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    #[must_use]
    pub fn saves(&self) -> &SaveQueue {
        &self.saves
    }

    /// Entries for the restore menu.
    #[must_use]
    pub fn restore_list(&self) -> Vec<RestoreItem> {
        self.dashboard.hidden_modules()
    }

    // --- Lifecycle ---

    /// Apply the stored layout.
    pub fn load(&mut self) -> Vec<Action> {
        let loaded = persist::load(&self.store);
        persist::apply(&loaded, &mut self.dashboard);
        vec![Action::Render, Action::RestoreMenuChanged(self.restore_list())]
    }

    /// Clear stored state, show every module at its default size, and leave
    /// edit mode. The default layout replaces any queued save and is stored
    /// and scheduled like any other change.
    pub fn reset(&mut self) -> Vec<Action> {
        let mut actions = self.abandon_gesture();
        persist::reset(&mut self.dashboard, &mut self.store);
        self.saves.clear_pending();
        self.save_layout();
        if self.mode.is_editing() {
            self.mode = Mode::View;
            actions.push(Action::ModeChanged(self.mode));
        }
        actions.extend([Action::Render, Action::RestoreMenuChanged(Vec::new()), Action::Reload]);
        actions
    }

    /// Report a container's new pixel width.
    pub fn set_grid_width(&mut self, grid: GridId, width_px: f64) -> Vec<Action> {
        self.dashboard.set_grid_width(grid, width_px);
        vec![Action::Render]
    }

    /// Advance the clock: close the settle window and issue due saves.
    pub fn tick(&mut self, now_ms: u64) -> Vec<Action> {
        self.now_ms = now_ms;
        let mut actions = Vec::new();
        if let GestureState::Settling { until_ms, .. } = self.gesture
            && now_ms >= until_ms
        {
            self.gesture = GestureState::Idle;
            actions.push(Action::SetTextSelection(true));
        }
        if let Some(request) = self.saves.poll(now_ms) {
            actions.push(Action::SendSave(request));
        }
        actions
    }

    /// Record the server's response to a [`Action::SendSave`]. Returns
    /// `false` when `seq` is stale.
    pub fn save_completed(&mut self, seq: u64, ok: bool) -> bool {
        self.saves.complete(seq, ok)
    }

    // --- Mode ---

    /// Enter or leave edit mode. Leaving saves the layout and abandons any
    /// gesture in progress.
    pub fn toggle_mode(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.mode.is_editing() {
            actions.extend(self.abandon_gesture());
            self.save_layout();
        }
        self.mode = self.mode.toggled();
        info!(mode = ?self.mode, "dashboard mode changed");
        actions.extend([Action::ModeChanged(self.mode), Action::Render]);
        actions
    }

    // --- Module operations ---

    /// Hide a module.
    ///
    /// # Errors
    ///
    /// Fails outside edit mode, during a gesture, or for an unknown id.
    pub fn hide_module(&mut self, id: &str) -> Result<Vec<Action>, LayoutError> {
        self.ensure_ready()?;
        if !self.dashboard.hide(id)? {
            return Ok(Vec::new());
        }
        self.save_layout();
        Ok(vec![Action::Render, Action::RestoreMenuChanged(self.restore_list())])
    }

    /// Restore a hidden module at the first free slot of its grid.
    ///
    /// # Errors
    ///
    /// Fails outside edit mode, during a gesture, or for an unknown id.
    pub fn restore_module(&mut self, id: &str) -> Result<Vec<Action>, LayoutError> {
        self.ensure_ready()?;
        match self.dashboard.restore(id)? {
            RestoreOutcome::AlreadyVisible => Ok(Vec::new()),
            RestoreOutcome::Restored { .. } => {
                self.save_layout();
                Ok(vec![Action::Render, Action::RestoreMenuChanged(self.restore_list())])
            }
        }
    }

    /// Click-to-resize: advance a module through the size cycle.
    ///
    /// # Errors
    ///
    /// Fails outside edit mode, during a gesture, for an unknown or hidden
    /// module, or with [`LayoutError::NoSlot`] when the next size fits nowhere.
    pub fn cycle_size(&mut self, id: &str) -> Result<Vec<Action>, LayoutError> {
        self.ensure_ready()?;
        self.dashboard.cycle_size(id)?;
        self.save_layout();
        Ok(vec![Action::Render])
    }

    // --- Drag ---

    /// Start dragging a module.
    ///
    /// # Errors
    ///
    /// Fails outside edit mode, during another gesture, or for an unknown or
    /// hidden module.
    pub fn drag_start(&mut self, id: &str) -> Result<Vec<Action>, LayoutError> {
        self.ensure_ready()?;
        let session = drag::begin(&self.dashboard, id)?;
        let mut actions = self.end_settle();
        self.gesture = GestureState::Dragging(session);
        actions.push(Action::Render);
        Ok(actions)
    }

    /// Drop the dragged module into `dest` at sequence `index`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NoActiveGesture`] when no drag is in progress.
    pub fn drag_drop(&mut self, dest: GridId, index: usize) -> Result<Vec<Action>, LayoutError> {
        let session = self.take_drag()?;
        if let DropOutcome::Moved { .. } = drag::drop(&mut self.dashboard, &session, dest, index)? {
            self.save_layout();
        }
        Ok(vec![Action::Render])
    }

    /// Drop the dragged module where the pointer rectangle lands in `dest`.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NoActiveGesture`] when no drag is in progress.
    pub fn drag_drop_at(&mut self, dest: GridId, pointer: Rect, grid_rect: Rect) -> Result<Vec<Action>, LayoutError> {
        let index = drag::index_at(&self.dashboard, dest, pointer, grid_rect);
        self.drag_drop(dest, index)
    }

    /// Abort the drag; nothing moves.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NoActiveGesture`] when no drag is in progress.
    pub fn drag_cancel(&mut self) -> Result<Vec<Action>, LayoutError> {
        let session = self.take_drag()?;
        debug!(module = %session.module, "drag cancelled");
        Ok(vec![Action::Render])
    }

    // --- Resize ---

    /// Start resizing a module currently rendered at `width` × `height`.
    ///
    /// # Errors
    ///
    /// Fails outside edit mode, during another gesture, or for an unknown or
    /// hidden module.
    pub fn resize_start(&mut self, id: &str, width: f64, height: f64) -> Result<Vec<Action>, LayoutError> {
        self.ensure_ready()?;
        let session = resize::begin(&self.dashboard, id, width, height)?;
        let was_settling = matches!(self.gesture, GestureState::Settling { .. });
        self.gesture = GestureState::Resizing(session);
        if was_settling {
            return Ok(Vec::new());
        }
        Ok(vec![Action::SetTextSelection(false)])
    }

    /// Preview a pointer move.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NoActiveGesture`] when no resize is in progress.
    pub fn resize_move(&mut self, width: f64, height: f64) -> Result<ResizePreview, LayoutError> {
        match &mut self.gesture {
            GestureState::Resizing(session) => Ok(resize::update(&self.dashboard, session, width, height)),
            _ => Err(LayoutError::NoActiveGesture("resize")),
        }
    }

    /// End the resize. Commits the new size, or keeps the old one when the
    /// new span would overlap, then settles for the configured window.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NoActiveGesture`] when no resize is in progress.
    pub fn resize_end(&mut self, width: f64, height: f64) -> Result<Vec<Action>, LayoutError> {
        let session = self.take_resize()?;
        let module = session.module.clone();
        let outcome = resize::finish(&mut self.dashboard, session, width, height)?;
        if let ResizeOutcome::Committed { .. } = outcome {
            self.save_layout();
        }
        self.gesture = GestureState::Settling { module, until_ms: self.now_ms.saturating_add(self.config.settle_ms) };
        Ok(vec![Action::Render])
    }

    /// Abort the resize; the module keeps its pre-gesture size.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::NoActiveGesture`] when no resize is in progress.
    pub fn resize_cancel(&mut self) -> Result<Vec<Action>, LayoutError> {
        let session = self.take_resize()?;
        debug!(module = %session.module, "resize cancelled");
        Ok(vec![Action::Render, Action::SetTextSelection(true)])
    }

    // --- Internals ---

    fn ensure_ready(&self) -> Result<(), LayoutError> {
        if !self.mode.is_editing() {
            return Err(LayoutError::NotEditing);
        }
        if self.gesture.is_active() {
            return Err(LayoutError::GestureBusy);
        }
        Ok(())
    }

    fn take_drag(&mut self) -> Result<DragSession, LayoutError> {
        match std::mem::take(&mut self.gesture) {
            GestureState::Dragging(session) => Ok(session),
            other => {
                debug!(state = other.name(), "drag call without an active drag");
                self.gesture = other;
                Err(LayoutError::NoActiveGesture("drag"))
            }
        }
    }

    fn take_resize(&mut self) -> Result<ResizeSession, LayoutError> {
        match std::mem::take(&mut self.gesture) {
            GestureState::Resizing(session) => Ok(session),
            other => {
                debug!(state = other.name(), "resize call without an active resize");
                self.gesture = other;
                Err(LayoutError::NoActiveGesture("resize"))
            }
        }
    }

    /// Drop whatever gesture is in progress, re-enabling text selection if
    /// it was suspended.
    fn abandon_gesture(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.gesture) {
            GestureState::Idle => Vec::new(),
            GestureState::Dragging(session) => {
                debug!(module = %session.module, "drag abandoned");
                vec![Action::Render]
            }
            GestureState::Resizing(session) => {
                debug!(module = %session.module, "resize abandoned");
                vec![Action::Render, Action::SetTextSelection(true)]
            }
            GestureState::Settling { .. } => vec![Action::SetTextSelection(true)],
        }
    }

    fn end_settle(&mut self) -> Vec<Action> {
        if matches!(self.gesture, GestureState::Settling { .. }) {
            self.gesture = GestureState::Idle;
            return vec![Action::SetTextSelection(true)];
        }
        Vec::new()
    }

    fn save_layout(&mut self) {
        let snapshot = persist::save(&self.dashboard, &mut self.store);
        self.saves.schedule(snapshot, self.now_ms);
    }
}
