//! Size classes: the preset table, classification, and the resize cycle.
//!
//! A module's size class is a named preset combining a column span and a
//! pixel height. `Square` has no preset; it is only reachable as the end of
//! a live resize gesture whose width and height converge.

#[cfg(test)]
#[path = "size_test.rs"]
mod size_test;

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::consts::{
    RESIZE_MAX_HEIGHT_PX, RESIZE_MAX_WIDTH_PX, RESIZE_MIN_HEIGHT_PX, RESIZE_MIN_WIDTH_PX, SQUARE_TOLERANCE_PX,
    TALL_THRESHOLD_PX, WIDE_THRESHOLD_PX,
};

/// Named size of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeClass {
    /// One column, short.
    #[default]
    Small,
    /// Two columns, short.
    Wide,
    /// One column, tall.
    Tall,
    /// Two columns, tall.
    Large,
    /// Width and height converged during a live resize.
    Square,
}

/// Dimensions behind a size class.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizePreset {
    /// Column span.
    pub span: u8,
    /// Rendered height in CSS pixels.
    pub height_px: f64,
    /// Minimum grid width (in columns) needed to show the preset.
    pub min_grid_columns: usize,
}

/// Preset table, keyed by size class. `Square` is deliberately absent.
pub const PRESETS: [(SizeClass, SizePreset); 4] = [
    (SizeClass::Small, SizePreset { span: 1, height_px: 100.0, min_grid_columns: 1 }),
    (SizeClass::Wide, SizePreset { span: 2, height_px: 100.0, min_grid_columns: 2 }),
    (SizeClass::Tall, SizePreset { span: 1, height_px: 220.0, min_grid_columns: 1 }),
    (SizeClass::Large, SizePreset { span: 2, height_px: 220.0, min_grid_columns: 2 }),
];

/// Click-to-advance order.
pub const CYCLE: [SizeClass; 4] = [SizeClass::Small, SizeClass::Wide, SizeClass::Tall, SizeClass::Large];

impl SizeClass {
    /// The preset for this class, or `None` for `Square`.
    #[must_use]
    pub fn preset(self) -> Option<SizePreset> {
        PRESETS
            .iter()
            .find(|(class, _)| *class == self)
            .map(|(_, preset)| *preset)
    }

    /// Column span defined by the preset, or `None` for `Square`.
    #[must_use]
    pub fn span(self) -> Option<u8> {
        self.preset().map(|p| p.span)
    }

    /// Parse a lowercase wire name, ignoring surrounding whitespace.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim() {
            "small" => Some(Self::Small),
            "wide" => Some(Self::Wide),
            "tall" => Some(Self::Tall),
            "large" => Some(Self::Large),
            "square" => Some(Self::Square),
            _ => None,
        }
    }

    /// Lowercase wire name.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Wide => "wide",
            Self::Tall => "tall",
            Self::Large => "large",
            Self::Square => "square",
        }
    }
}

impl fmt::Display for SizeClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string does not name a size class.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown size class: {0}")]
pub struct UnknownSizeClass(pub String);

impl FromStr for SizeClass {
    type Err = UnknownSizeClass;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_name(s).ok_or_else(|| UnknownSizeClass(s.trim().to_owned()))
    }
}

/// Match a span and pixel height against the preset table.
///
/// Falls back to `Small` when nothing matches.
#[must_use]
pub fn classify(span: u8, height_px: f64) -> SizeClass {
    PRESETS
        .iter()
        .find(|(_, p)| p.span == span && (p.height_px - height_px).abs() < f64::EPSILON)
        .map_or(SizeClass::Small, |(class, _)| *class)
}

/// Advance one step through the click-to-resize cycle, wrapping.
///
/// `Square` is outside the cycle and re-enters it at `Small`.
#[must_use]
pub fn next_in_cycle(current: SizeClass) -> SizeClass {
    match CYCLE.iter().position(|c| *c == current) {
        Some(i) => CYCLE[(i + 1) % CYCLE.len()],
        None => SizeClass::Small,
    }
}

/// True when width and height are within the square tolerance band.
#[must_use]
pub fn is_near_square(width: f64, height: f64) -> bool {
    (width - height).abs() < SQUARE_TOLERANCE_PX
}

/// Snap near-square dimensions to a square of the larger side.
#[must_use]
pub fn snap_square(width: f64, height: f64) -> (f64, f64) {
    if is_near_square(width, height) {
        let side = width.max(height);
        (side, side)
    } else {
        (width, height)
    }
}

/// Span requested by a live width.
#[must_use]
pub fn span_for_width(width: f64) -> u8 {
    if width > WIDE_THRESHOLD_PX { 2 } else { 1 }
}

/// Clamp pointer dimensions to the resize bounds.
#[must_use]
pub fn clamp_resize(width: f64, height: f64) -> (f64, f64) {
    (
        width.clamp(RESIZE_MIN_WIDTH_PX, RESIZE_MAX_WIDTH_PX),
        height.clamp(RESIZE_MIN_HEIGHT_PX, RESIZE_MAX_HEIGHT_PX),
    )
}

/// Classify the final dimensions of a resize gesture.
#[must_use]
pub fn classify_gesture_end(width: f64, height: f64, span: u8) -> SizeClass {
    if is_near_square(width, height) {
        return SizeClass::Square;
    }
    match (span >= 2, height > TALL_THRESHOLD_PX) {
        (false, false) => SizeClass::Small,
        (false, true) => SizeClass::Tall,
        (true, false) => SizeClass::Wide,
        (true, true) => SizeClass::Large,
    }
}
