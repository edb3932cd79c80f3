//! Layout persistence: snapshots, the key-value store seam, and rehydration.
//!
//! DESIGN
//! ======
//! The whole layout is one document under [`LAYOUT_KEY`]: per grid, the
//! module order with visibility, size class, span, and pin. Older pages
//! kept sizes in a second document under [`LEGACY_SIZES_KEY`]; it is still
//! read so existing users keep their sizes, and is removed on the next save.
//!
//! Loading never fails. Stored state comes from an older page or a hand-edited
//! store, so every field is decoded on its own and anything malformed falls
//! back to the default for that field (logged at `warn`).

#[cfg(test)]
#[path = "persist_test.rs"]
mod persist_test;

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, error, info, warn};

use crate::consts::{LAYOUT_KEY, LEGACY_SIZES_KEY, SNAPSHOT_VERSION};
use crate::geom::Cell;
use crate::model::{Dashboard, GridId, Module, ModuleId};
use crate::size::{SizeClass, classify};

// =============================================================================
// STORE
// =============================================================================

/// String key-value storage the layout is persisted in.
pub trait LayoutStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

/// In-memory [`LayoutStore`].
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl LayoutStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.values.insert(key.to_owned(), value);
    }

    fn remove(&mut self, key: &str) {
        self.values.remove(key);
    }
}

// =============================================================================
// SNAPSHOT
// =============================================================================

/// One module's saved state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub id: ModuleId,
    pub visible: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<SizeClass>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub span: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pin: Option<Cell>,
}

/// The persisted layout document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutSnapshot {
    #[serde(default)]
    pub version: u32,
    #[serde(default)]
    pub stats: Vec<LayoutEntry>,
    #[serde(default)]
    pub insights: Vec<LayoutEntry>,
}

impl Default for LayoutSnapshot {
    fn default() -> Self {
        Self { version: SNAPSHOT_VERSION, stats: Vec::new(), insights: Vec::new() }
    }
}

impl LayoutSnapshot {
    /// Record the current state of both grids.
    #[must_use]
    pub fn capture(dashboard: &Dashboard) -> Self {
        let entries = |grid: GridId| -> Vec<LayoutEntry> {
            dashboard
                .grid(grid)
                .modules()
                .iter()
                .map(|m| LayoutEntry {
                    id: m.id.clone(),
                    visible: m.visible,
                    size: Some(m.size),
                    span: Some(m.span),
                    pin: m.pin,
                })
                .collect()
        };
        Self { version: SNAPSHOT_VERSION, stats: entries(GridId::Stats), insights: entries(GridId::Insights) }
    }

    /// Entries saved for `grid`, in order.
    #[must_use]
    pub fn entries(&self, grid: GridId) -> &[LayoutEntry] {
        match grid {
            GridId::Stats => &self.stats,
            GridId::Insights => &self.insights,
        }
    }

    /// Every id in the snapshot, across both grids.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.stats.iter().chain(&self.insights).map(|e| e.id.as_str())
    }

    /// First id that appears more than once, across both grids.
    #[must_use]
    pub fn duplicate_id(&self) -> Option<&str> {
        let mut seen = HashSet::new();
        self.ids().find(|id| !seen.insert(*id))
    }

    /// Decode a stored document field by field.
    ///
    /// Entries without a string `id` are dropped; other malformed fields
    /// decode as absent.
    #[must_use]
    pub fn from_value(value: &Value) -> Self {
        let version = value
            .get("version")
            .and_then(Value::as_u64)
            .map_or(1, |v| u32::try_from(v).unwrap_or(u32::MAX));
        let grid = |key: &str| -> Vec<LayoutEntry> {
            match value.get(key) {
                Some(Value::Array(items)) => items.iter().filter_map(decode_entry).collect(),
                Some(other) => {
                    warn!(grid = key, kind = %json_kind(other), "saved grid is not a list; ignoring");
                    Vec::new()
                }
                None => Vec::new(),
            }
        };
        Self { version, stats: grid(GridId::Stats.snapshot_key()), insights: grid(GridId::Insights.snapshot_key()) }
    }
}

fn decode_entry(item: &Value) -> Option<LayoutEntry> {
    let Some(id) = item.get("id").and_then(Value::as_str) else {
        warn!(entry = %item, "saved entry has no id; skipping");
        return None;
    };
    let visible = match item.get("visible") {
        Some(Value::Bool(v)) => *v,
        None => true,
        Some(other) => {
            warn!(module = id, value = %other, "malformed visibility; showing module");
            true
        }
    };
    let size = item.get("size").and_then(Value::as_str).and_then(|s| match s.parse::<SizeClass>() {
        Ok(size) => Some(size),
        Err(err) => {
            warn!(module = id, %err, "malformed saved size; using default");
            None
        }
    });
    let span = item.get("span").and_then(decode_span);
    let pin = item.get("pin").and_then(|p| match serde_json::from_value::<Cell>(p.clone()) {
        Ok(cell) => Some(cell),
        Err(err) => {
            warn!(module = id, %err, "malformed saved pin; auto-placing");
            None
        }
    });
    Some(LayoutEntry { id: id.to_owned(), visible, size, span, pin })
}

fn decode_span(value: &Value) -> Option<u8> {
    match value.as_u64().map(u8::try_from) {
        Some(Ok(n)) if (1..=2).contains(&n) => Some(n),
        _ => None,
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

// =============================================================================
// LEGACY SIZES
// =============================================================================

/// A size stored by older pages under [`LEGACY_SIZES_KEY`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeRecord {
    pub size: SizeClass,
    pub span: u8,
}

/// Parse a CSS column placement such as `span 2` or `3 / span 2`.
#[must_use]
pub fn parse_span_expr(expr: &str) -> Option<u8> {
    let (_, tail) = expr.rsplit_once("span")?;
    match tail.trim().parse::<u8>() {
        Ok(n) if (1..=2).contains(&n) => Some(n),
        _ => None,
    }
}

fn parse_px(value: &Value) -> Option<f64> {
    match value.as_str()?.trim().trim_end_matches("px").trim().parse::<f64>() {
        Ok(px) if px.is_finite() => Some(px),
        _ => None,
    }
}

/// Decode one legacy record. Older pages stored either a bare size name, or
/// an object with `size`, `spans`, and pixel `width`/`height` strings.
fn decode_legacy_record(value: &Value) -> Option<SizeRecord> {
    if let Some(name) = value.as_str() {
        let size = SizeClass::from_name(name)?;
        return Some(SizeRecord { size, span: size.span().unwrap_or(1) });
    }

    let span = value.get("spans").and_then(Value::as_str).and_then(parse_span_expr);
    let named = value.get("size").and_then(Value::as_str).and_then(SizeClass::from_name);
    match (named, span) {
        (Some(size), span) => Some(SizeRecord { size, span: size.span().or(span).unwrap_or(1) }),
        (None, Some(span)) => {
            let size = value.get("height").and_then(parse_px).map_or(SizeClass::Small, |h| classify(span, h));
            Some(SizeRecord { size, span: size.span().unwrap_or(span) })
        }
        (None, None) => None,
    }
}

// =============================================================================
// LOAD / SAVE
// =============================================================================

/// Everything read from the store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LoadedLayout {
    /// The layout document, if one was stored and was a JSON object.
    pub snapshot: Option<LayoutSnapshot>,
    /// Sizes from the legacy document, keyed by module id.
    pub legacy_sizes: HashMap<ModuleId, SizeRecord>,
}

impl From<LayoutSnapshot> for LoadedLayout {
    fn from(snapshot: LayoutSnapshot) -> Self {
        Self { snapshot: Some(snapshot), legacy_sizes: HashMap::new() }
    }
}

fn read_json(store: &impl LayoutStore, key: &str) -> Option<Value> {
    let raw = store.get(key)?;
    match serde_json::from_str::<Value>(&raw) {
        Ok(value @ Value::Object(_)) => Some(value),
        Ok(other) => {
            warn!(key, kind = %json_kind(&other), "stored layout is not an object; ignoring");
            None
        }
        Err(err) => {
            warn!(key, %err, "stored layout is not valid JSON; ignoring");
            None
        }
    }
}

/// Read the stored layout. Never fails; see the module docs.
pub fn load(store: &impl LayoutStore) -> LoadedLayout {
    let snapshot = read_json(store, LAYOUT_KEY).map(|v| LayoutSnapshot::from_value(&v));

    let mut legacy_sizes = HashMap::new();
    if let Some(Value::Object(records)) = read_json(store, LEGACY_SIZES_KEY) {
        for (id, record) in &records {
            match decode_legacy_record(record) {
                Some(parsed) => {
                    legacy_sizes.insert(id.clone(), parsed);
                }
                None => warn!(module = %id, "unreadable legacy size; ignoring"),
            }
        }
    }

    debug!(has_snapshot = snapshot.is_some(), legacy = legacy_sizes.len(), "layout loaded");
    LoadedLayout { snapshot, legacy_sizes }
}

/// Write the current layout under [`LAYOUT_KEY`] and drop the legacy
/// document. Returns the snapshot for remote saving.
pub fn save(dashboard: &Dashboard, store: &mut impl LayoutStore) -> LayoutSnapshot {
    let snapshot = LayoutSnapshot::capture(dashboard);
    match serde_json::to_string(&snapshot) {
        Ok(json) => {
            store.set(LAYOUT_KEY, json);
            store.remove(LEGACY_SIZES_KEY);
            debug!(stats = snapshot.stats.len(), insights = snapshot.insights.len(), "layout saved");
        }
        Err(err) => error!(%err, "failed to encode layout"),
    }
    snapshot
}

/// Forget everything stored and return the dashboard to its defaults.
pub fn reset(dashboard: &mut Dashboard, store: &mut impl LayoutStore) {
    store.remove(LAYOUT_KEY);
    store.remove(LEGACY_SIZES_KEY);
    dashboard.reset();
}

// =============================================================================
// APPLY
// =============================================================================

fn apply_size(module: &mut Module, size: SizeClass, span: Option<u8>) {
    module.size = size;
    module.span = size.span().or(span).unwrap_or(module.span);
}

/// Rehydrate `dashboard` from a loaded layout.
///
/// Modules are re-appended in saved order to the grid the snapshot lists
/// them under. Ids the dashboard does not know are ignored, as are repeats.
/// Modules the snapshot does not mention keep their grid, become visible at
/// their default size, and go after the saved ones.
pub fn apply(loaded: &LoadedLayout, dashboard: &mut Dashboard) {
    let mut pool: Vec<(GridId, Module)> = GridId::ALL
        .into_iter()
        .flat_map(|g| dashboard.grid_mut(g).drain().into_iter().map(move |m| (g, m)))
        .map(|(g, mut m)| {
            m.reset_size();
            m.visible = true;
            (g, m)
        })
        .collect();

    let pin_row_limit = pool.len().saturating_mul(2);
    if let Some(snapshot) = &loaded.snapshot {
        for grid in GridId::ALL {
            for entry in snapshot.entries(grid) {
                let Some(index) = pool.iter().position(|(_, m)| m.id == entry.id) else {
                    debug!(module = %entry.id, %grid, "saved module not on this dashboard; ignoring");
                    continue;
                };
                let (_, mut module) = pool.remove(index);
                module.visible = entry.visible;
                if let Some(size) = entry.size {
                    apply_size(&mut module, size, entry.span);
                }
                module.pin = match entry.pin {
                    Some(pin) if pin.row >= pin_row_limit => {
                        warn!(module = %entry.id, row = pin.row, pin_row_limit, "saved pin out of range; auto-placing");
                        None
                    }
                    pin => pin,
                };
                dashboard.grid_mut(grid).push(module);
            }
        }
    }

    for (grid, module) in pool {
        debug!(module = %module.id, %grid, "module missing from saved layout; appending");
        dashboard.grid_mut(grid).push(module);
    }

    let sized_by_snapshot: HashSet<&str> = loaded
        .snapshot
        .iter()
        .flat_map(|s| s.stats.iter().chain(&s.insights))
        .filter(|e| e.size.is_some())
        .map(|e| e.id.as_str())
        .collect();
    for (id, record) in &loaded.legacy_sizes {
        if sized_by_snapshot.contains(id.as_str()) {
            continue;
        }
        if let Some(module) = dashboard.module_mut(id) {
            apply_size(module, record.size, Some(record.span));
        }
    }

    dashboard.reflow_all();
    info!(
        restored = loaded.snapshot.is_some(),
        legacy_sizes = loaded.legacy_sizes.len(),
        hidden = dashboard.hidden_modules().len(),
        "layout applied"
    );
}
