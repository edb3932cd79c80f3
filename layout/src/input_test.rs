use super::*;
use crate::model::GridId;

// =============================================================
// Mode
// =============================================================

#[test]
fn mode_default_is_view() {
    assert_eq!(Mode::default(), Mode::View);
    assert!(!Mode::default().is_editing());
}

#[test]
fn mode_toggles_both_ways() {
    assert_eq!(Mode::View.toggled(), Mode::Edit);
    assert_eq!(Mode::Edit.toggled(), Mode::View);
    assert!(Mode::Edit.is_editing());
}

// =============================================================
// GestureState
// =============================================================

#[test]
fn gesture_default_is_idle() {
    let state = GestureState::default();
    assert!(matches!(state, GestureState::Idle));
    assert!(!state.is_active());
    assert_eq!(state.name(), "idle");
}

#[test]
fn dragging_is_active() {
    let state = GestureState::Dragging(DragSession { module: "a".into(), source: GridId::Stats, source_index: 0 });
    assert!(state.is_active());
    assert_eq!(state.name(), "dragging");
}

#[test]
fn settling_is_not_active() {
    let state = GestureState::Settling { module: "a".into(), until_ms: 300 };
    assert!(!state.is_active());
    assert_eq!(state.name(), "settling");
}
