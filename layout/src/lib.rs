//! Layout engine for the customizable dashboard.
//!
//! This crate owns the full lifecycle of the dashboard grid: the in-memory
//! model of stat and insight modules, discrete grid placement, drag-reorder
//! and resize gestures, hide/restore, and persistence of the resulting
//! layout. The host (browser glue or a native shell) is responsible only for
//! wiring pointer events to the engine, rendering the resolved placements,
//! and delivering the [`engine::Action`]s it returns.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Top-level [`engine::DashboardCore`] facade and host actions |
//! | [`model`] | Modules, grids, and the dashboard store |
//! | [`geom`] | Pixel rectangles, grid cells, overlap and column math |
//! | [`size`] | Size classes, presets, and the click-to-resize cycle |
//! | [`placement`] | Occupancy map, first-fit slot search, and reflow |
//! | [`drag`] | Drag-reorder sessions and drops |
//! | [`resize`] | Live resize sessions, previews, and commits |
//! | [`input`] | Edit/view mode and the gesture state machine |
//! | [`persist`] | Layout snapshots, key/value stores, load/apply/reset |
//! | [`sync`] | Debounced single-flight save queue |
//! | [`error`] | Engine error type |
//! | [`consts`] | Shared numeric constants (cell size, thresholds, keys) |

pub mod consts;
pub mod drag;
pub mod engine;
pub mod error;
pub mod geom;
pub mod input;
pub mod model;
pub mod persist;
pub mod placement;
pub mod resize;
pub mod size;
pub mod sync;
