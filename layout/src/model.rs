//! Dashboard model: modules, grids, and the dashboard store.
//!
//! This module defines what is on the dashboard (`Module`, `ModuleKind`), the
//! server-rendered manifest entries modules are built from (`ModuleSpec`),
//! the two named grids (`Grid`, `GridId`), and the store that owns them
//! (`Dashboard`).
//!
//! Every module carries an explicit `placement` resolved by
//! [`placement::reflow`]. The view layer renders from those fields; nothing
//! is re-derived from rendered geometry. Mutations that change what is
//! visible or how wide something is always end with a reflow of the
//! affected grid, so the overlap-free invariant holds after every call.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::LayoutError;
use crate::geom::{Cell, GridMetrics, grid_column_count, overlaps};
use crate::placement;
use crate::size::{SizeClass, next_in_cycle};

/// Stable module identifier, unique across the whole dashboard.
pub type ModuleId = String;

/// The kind of a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    /// Single-figure statistics card.
    Stat,
    /// Chart or list insight card.
    Insight,
}

impl ModuleKind {
    /// Column span a fresh module of this kind occupies.
    #[must_use]
    pub fn base_span(self) -> u8 {
        match self {
            Self::Stat => 1,
            Self::Insight => 2,
        }
    }

    /// Size class a fresh module of this kind starts with.
    #[must_use]
    pub fn default_size(self) -> SizeClass {
        match self {
            Self::Stat => SizeClass::Small,
            Self::Insight => SizeClass::Large,
        }
    }
}

/// One of the two dashboard grids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GridId {
    #[serde(rename = "statsGrid")]
    Stats,
    #[serde(rename = "insightsGrid")]
    Insights,
}

impl GridId {
    /// Both grids, in document order.
    pub const ALL: [Self; 2] = [Self::Stats, Self::Insights];

    /// Container element id.
    #[must_use]
    pub fn dom_id(self) -> &'static str {
        match self {
            Self::Stats => "statsGrid",
            Self::Insights => "insightsGrid",
        }
    }

    /// Key under which the grid is stored in a layout snapshot.
    #[must_use]
    pub fn snapshot_key(self) -> &'static str {
        match self {
            Self::Stats => "stats",
            Self::Insights => "insights",
        }
    }
}

impl FromStr for GridId {
    type Err = LayoutError;

    /// Accepts the container id (`statsGrid`) or the snapshot key (`stats`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|g| g.dom_id() == s || g.snapshot_key() == s)
            .ok_or_else(|| LayoutError::UnknownGrid(s.to_owned()))
    }
}

impl fmt::Display for GridId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dom_id())
    }
}

/// Server-rendered description of a module, as found in the page manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleSpec {
    pub id: ModuleId,
    pub kind: ModuleKind,
    pub grid: GridId,
    /// Display name; falls back to [`default_title`] when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Display name for well-known module ids; anything else is shown by id.
#[must_use]
pub fn default_title(id: &str) -> String {
    match id {
        "articles_today" => "Articles Today",
        "streak" => "Streak",
        "favorite_category" => "Favorite Category",
        "peak_hours" => "Peak Hours",
        "most_active_day" => "Most Active Day",
        "streak_stats" => "Achievement Stats",
        other => other,
    }
    .to_owned()
}

/// A placeable dashboard widget.
#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub id: ModuleId,
    pub kind: ModuleKind,
    pub title: String,
    /// Current size class.
    pub size: SizeClass,
    /// Column span, 1 or 2.
    pub span: u8,
    /// Hidden modules are skipped by placement but keep their metadata.
    pub visible: bool,
    /// Explicit cell assigned by restore, resize, or size cycling.
    pub pin: Option<Cell>,
    /// Cell resolved by the last reflow. `None` while hidden or unplaceable.
    pub placement: Option<Cell>,
}

impl Module {
    /// Build a module in its kind-default state.
    #[must_use]
    pub fn from_spec(spec: &ModuleSpec) -> Self {
        Self {
            id: spec.id.clone(),
            kind: spec.kind,
            title: spec.title.clone().unwrap_or_else(|| default_title(&spec.id)),
            size: spec.kind.default_size(),
            span: spec.kind.base_span(),
            visible: true,
            pin: None,
            placement: None,
        }
    }

    /// Span as a column count.
    #[must_use]
    pub fn span_cols(&self) -> usize {
        usize::from(self.span)
    }

    /// Span dictated by the size class; `Square` keeps its committed span.
    #[must_use]
    pub fn class_span(&self) -> u8 {
        self.size.span().unwrap_or(self.span)
    }

    /// Return to the kind-default size with no explicit cell.
    pub fn reset_size(&mut self) {
        self.size = self.kind.default_size();
        self.span = self.kind.base_span();
        self.pin = None;
    }
}

/// Hidden module entry for the restore menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RestoreItem {
    pub id: ModuleId,
    pub title: String,
    pub grid: GridId,
}

/// Result of restoring a module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The module is visible again; `at` is its resolved cell, if any.
    Restored { at: Option<Cell> },
    /// The module was not hidden; nothing changed.
    AlreadyVisible,
}

/// An ordered container of modules.
#[derive(Debug, Clone)]
pub struct Grid {
    id: GridId,
    width_px: f64,
    modules: Vec<Module>,
}

impl Grid {
    #[must_use]
    pub fn new(id: GridId) -> Self {
        Self { id, width_px: 0.0, modules: Vec::new() }
    }

    #[must_use]
    pub fn id(&self) -> GridId {
        self.id
    }

    /// Container width in CSS pixels, as last reported by the host.
    #[must_use]
    pub fn width_px(&self) -> f64 {
        self.width_px
    }

    pub(crate) fn set_width_px(&mut self, width_px: f64) {
        self.width_px = width_px;
    }

    /// Column count for the current width. Recomputed on every call.
    #[must_use]
    pub fn column_count(&self, metrics: GridMetrics) -> usize {
        grid_column_count(self.width_px, metrics.cell_width)
    }

    /// All modules in sequence order, hidden ones included.
    #[must_use]
    pub fn modules(&self) -> &[Module] {
        &self.modules
    }

    pub(crate) fn modules_mut(&mut self) -> &mut [Module] {
        &mut self.modules
    }

    /// Visible modules in sequence order.
    pub fn visible(&self) -> impl Iterator<Item = &Module> {
        self.modules.iter().filter(|m| m.visible)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Sequence index of a module.
    #[must_use]
    pub fn position(&self, id: &str) -> Option<usize> {
        self.modules.iter().position(|m| m.id == id)
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Module> {
        self.modules.iter().find(|m| m.id == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut Module> {
        self.modules.iter_mut().find(|m| m.id == id)
    }

    /// Visible module whose resolved placement covers `cell`.
    #[must_use]
    pub fn module_at(&self, cell: Cell) -> Option<&Module> {
        self.visible().find(|m| {
            m.placement
                .is_some_and(|p| p.row == cell.row && overlaps(p.col, m.span_cols(), cell.col, 1))
        })
    }

    pub(crate) fn take(&mut self, id: &str) -> Option<(usize, Module)> {
        let index = self.position(id)?;
        Some((index, self.modules.remove(index)))
    }

    /// Insert at `index`, clamped to the end. Returns the actual index.
    pub(crate) fn insert(&mut self, index: usize, module: Module) -> usize {
        let index = index.min(self.modules.len());
        self.modules.insert(index, module);
        index
    }

    /// Remove every module, leaving the grid empty.
    pub(crate) fn drain(&mut self) -> Vec<Module> {
        std::mem::take(&mut self.modules)
    }

    pub(crate) fn push(&mut self, module: Module) {
        self.modules.push(module);
    }
}

/// The whole dashboard: both grids plus the manifest they were built from.
#[derive(Debug, Clone)]
pub struct Dashboard {
    metrics: GridMetrics,
    stats: Grid,
    insights: Grid,
    manifest: Vec<ModuleSpec>,
}

impl Dashboard {
    /// Build a dashboard from the server-rendered manifest.
    ///
    /// Grids start with zero width; the host reports real widths through
    /// [`Dashboard::set_grid_width`].
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::DuplicateModule`] if two entries share an id.
    pub fn from_manifest(manifest: Vec<ModuleSpec>, metrics: GridMetrics) -> Result<Self, LayoutError> {
        let mut seen = HashSet::new();
        for spec in &manifest {
            if !seen.insert(spec.id.as_str()) {
                return Err(LayoutError::DuplicateModule(spec.id.clone()));
            }
        }

        let mut dashboard =
            Self { metrics, stats: Grid::new(GridId::Stats), insights: Grid::new(GridId::Insights), manifest };
        dashboard.populate();
        info!(modules = dashboard.manifest.len(), "dashboard built from manifest");
        Ok(dashboard)
    }

    fn populate(&mut self) {
        let mut stats = Vec::new();
        let mut insights = Vec::new();
        for spec in &self.manifest {
            let module = Module::from_spec(spec);
            match spec.grid {
                GridId::Stats => stats.push(module),
                GridId::Insights => insights.push(module),
            }
        }
        self.stats.modules = stats;
        self.insights.modules = insights;
    }

    #[must_use]
    pub fn metrics(&self) -> GridMetrics {
        self.metrics
    }

    #[must_use]
    pub fn manifest(&self) -> &[ModuleSpec] {
        &self.manifest
    }

    #[must_use]
    pub fn grid(&self, id: GridId) -> &Grid {
        match id {
            GridId::Stats => &self.stats,
            GridId::Insights => &self.insights,
        }
    }

    pub(crate) fn grid_mut(&mut self, id: GridId) -> &mut Grid {
        match id {
            GridId::Stats => &mut self.stats,
            GridId::Insights => &mut self.insights,
        }
    }

    /// Both grids, in document order.
    #[must_use]
    pub fn grids(&self) -> [&Grid; 2] {
        [&self.stats, &self.insights]
    }

    /// Owning grid and sequence index of a module.
    #[must_use]
    pub fn locate(&self, id: &str) -> Option<(GridId, usize)> {
        GridId::ALL
            .into_iter()
            .find_map(|g| self.grid(g).position(id).map(|i| (g, i)))
    }

    #[must_use]
    pub fn module(&self, id: &str) -> Option<&Module> {
        self.locate(id).and_then(|(g, _)| self.grid(g).get(id))
    }

    pub(crate) fn module_mut(&mut self, id: &str) -> Option<&mut Module> {
        let (grid, _) = self.locate(id)?;
        self.grid_mut(grid).get_mut(id)
    }

    /// Look up a module, failing with [`LayoutError::UnknownModule`].
    ///
    /// # Errors
    ///
    /// Returns an error if no grid holds `id`.
    pub fn require(&self, id: &str) -> Result<(GridId, &Module), LayoutError> {
        let (grid, _) = self.locate(id).ok_or_else(|| LayoutError::UnknownModule(id.to_owned()))?;
        let module = self
            .grid(grid)
            .get(id)
            .ok_or_else(|| LayoutError::UnknownModule(id.to_owned()))?;
        Ok((grid, module))
    }

    /// Record a new container width and re-resolve placements.
    pub fn set_grid_width(&mut self, grid: GridId, width_px: f64) {
        self.grid_mut(grid).set_width_px(width_px);
        let columns = self.grid(grid).column_count(self.metrics);
        debug!(%grid, width_px, columns, "grid width changed");
        self.reflow(grid);
    }

    /// Re-resolve placements for one grid.
    pub fn reflow(&mut self, grid: GridId) {
        let metrics = self.metrics;
        placement::reflow(self.grid_mut(grid), metrics);
    }

    /// Re-resolve placements for both grids.
    pub fn reflow_all(&mut self) {
        for grid in GridId::ALL {
            self.reflow(grid);
        }
    }

    /// Hide a module. Returns `true` if its visibility changed.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnknownModule`] for an unknown id.
    pub fn hide(&mut self, id: &str) -> Result<bool, LayoutError> {
        let (grid, visible) = {
            let (grid, module) = self.require(id)?;
            (grid, module.visible)
        };
        if !visible {
            return Ok(false);
        }
        if let Some(module) = self.module_mut(id) {
            module.visible = false;
        }
        self.reflow(grid);
        info!(module = id, %grid, "module hidden");
        Ok(true)
    }

    /// Make a hidden module visible at the first free slot of its grid.
    ///
    /// Restoring a visible module is a no-op. When no slot exists the module
    /// still becomes visible and is auto-placed by reflow (best effort).
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnknownModule`] for an unknown id.
    pub fn restore(&mut self, id: &str) -> Result<RestoreOutcome, LayoutError> {
        let (grid, visible, span) = {
            let (grid, module) = self.require(id)?;
            (grid, module.visible, module.span_cols())
        };
        if visible {
            return Ok(RestoreOutcome::AlreadyVisible);
        }

        let slot = placement::find_slot(self.grid(grid), id, span, self.metrics);
        if slot.is_none() {
            warn!(module = id, %grid, required_span = span, "no free slot for restored module; auto-placing");
        }
        if let Some(module) = self.module_mut(id) {
            module.visible = true;
            module.pin = slot;
        }
        self.reflow(grid);

        let at = self.grid(grid).get(id).and_then(|m| m.placement);
        info!(module = id, %grid, ?at, "module restored");
        Ok(RestoreOutcome::Restored { at })
    }

    /// Hidden modules across both grids, in document order.
    #[must_use]
    pub fn hidden_modules(&self) -> Vec<RestoreItem> {
        self.grids()
            .into_iter()
            .flat_map(|g| {
                g.modules()
                    .iter()
                    .filter(|m| !m.visible)
                    .map(move |m| RestoreItem { id: m.id.clone(), title: m.title.clone(), grid: g.id() })
            })
            .collect()
    }

    /// Advance a module to the next size in the click-to-resize cycle.
    ///
    /// The module keeps its cell when the new span fits there; otherwise it
    /// moves to the first free slot. Nothing changes when no slot exists.
    ///
    /// # Errors
    ///
    /// Returns [`LayoutError::UnknownModule`], [`LayoutError::ModuleHidden`],
    /// or [`LayoutError::NoSlot`].
    pub fn cycle_size(&mut self, id: &str) -> Result<SizeClass, LayoutError> {
        let (grid, visible, current, placed_at) = {
            let (grid, module) = self.require(id)?;
            (grid, module.visible, module.size, module.placement)
        };
        if !visible {
            return Err(LayoutError::ModuleHidden(id.to_owned()));
        }

        let next = next_in_cycle(current);
        let new_span = next.span().unwrap_or(1);
        let span = usize::from(new_span);
        let target = {
            let g = self.grid(grid);
            match placed_at {
                Some(cell) if placement::fits_at(g, id, cell, span, self.metrics) => Some(cell),
                _ => placement::find_slot(g, id, span, self.metrics),
            }
        };
        let Some(cell) = target else {
            debug!(module = id, from = %current, to = %next, "size change does not fit");
            return Err(LayoutError::NoSlot { id: id.to_owned(), span });
        };

        if let Some(module) = self.module_mut(id) {
            module.size = next;
            module.span = new_span;
            module.pin = Some(cell);
        }
        self.reflow(grid);
        info!(module = id, from = %current, to = %next, row = cell.row, col = cell.col, "module size cycled");
        Ok(next)
    }

    /// Rebuild both grids from the manifest: everything visible, default
    /// sizes, manifest order. Grid widths are kept.
    pub fn reset(&mut self) {
        self.populate();
        self.reflow_all();
        info!("dashboard reset to defaults");
    }

    /// Pairs of visible modules whose resolved cells overlap in `grid`.
    /// Empty whenever the model is consistent.
    #[must_use]
    pub fn overlapping_pairs(&self, grid: GridId) -> Vec<(ModuleId, ModuleId)> {
        let placed: Vec<(&Module, Cell)> = self
            .grid(grid)
            .visible()
            .filter_map(|m| m.placement.map(|p| (m, p)))
            .collect();
        let mut pairs = Vec::new();
        for (i, (a, pa)) in placed.iter().enumerate() {
            for (b, pb) in &placed[i + 1..] {
                if pa.row == pb.row && overlaps(pa.col, a.span_cols(), pb.col, b.span_cols()) {
                    pairs.push((a.id.clone(), b.id.clone()));
                }
            }
        }
        pairs
    }
}
