//! Shared numeric constants for the layout crate.

// ── Grid ────────────────────────────────────────────────────────

/// Width of one grid column in CSS pixels.
pub const CELL_WIDTH_PX: f64 = 250.0;

/// Height of one grid row in CSS pixels. The single row height used by every
/// overlap computation (drag, restore, and resize alike).
pub const ROW_HEIGHT_PX: f64 = 120.0;

// ── Resize ──────────────────────────────────────────────────────

/// Width/height difference under which a resize snaps to a square.
pub const SQUARE_TOLERANCE_PX: f64 = 50.0;

/// Live width above which a resize asks for a two-column span.
pub const WIDE_THRESHOLD_PX: f64 = 400.0;

/// Final height above which a resize is classified as tall (or large).
pub const TALL_THRESHOLD_PX: f64 = 160.0;

/// Smallest width a resize gesture may report.
pub const RESIZE_MIN_WIDTH_PX: f64 = 250.0;

/// Smallest height a resize gesture may report.
pub const RESIZE_MIN_HEIGHT_PX: f64 = 100.0;

/// Largest width a resize gesture may report.
pub const RESIZE_MAX_WIDTH_PX: f64 = 500.0;

/// Largest height a resize gesture may report.
pub const RESIZE_MAX_HEIGHT_PX: f64 = 220.0;

/// Length of the post-resize settling window, in milliseconds.
pub const SETTLE_MS: u64 = 300;

// ── Persistence ─────────────────────────────────────────────────

/// Local storage key holding the layout snapshot.
pub const LAYOUT_KEY: &str = "dashboardLayout";

/// Legacy local storage key holding per-module sizes.
pub const LEGACY_SIZES_KEY: &str = "moduleSizes";

/// Current snapshot document version.
pub const SNAPSHOT_VERSION: u32 = 2;

/// Quiet period before a scheduled remote save is dispatched, in milliseconds.
pub const SAVE_DEBOUNCE_MS: u64 = 250;
