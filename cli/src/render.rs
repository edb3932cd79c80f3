//! Offline rendering: run the engine over a manifest and a stored layout
//! document and report where every module lands.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use layout::consts::LAYOUT_KEY;
use layout::engine::{DashboardCore, EngineConfig};
use layout::error::LayoutError;
use layout::model::{Dashboard, GridId, ModuleSpec};
use layout::persist::{LayoutStore, MemoryStore};
use tracing::debug;

/// Container widths to resolve placements at.
#[derive(Debug, Clone, Copy)]
pub struct GridWidths {
    pub stats: f64,
    pub insights: f64,
}

/// Resolve placements for `manifest`, applying `snapshot` as the stored
/// layout document when given. A malformed document falls back to defaults.
pub fn render(manifest: Vec<ModuleSpec>, snapshot: Option<String>, widths: GridWidths) -> Result<String, LayoutError> {
    let mut store = MemoryStore::new();
    if let Some(raw) = snapshot {
        store.set(LAYOUT_KEY, raw);
    }

    let mut core = DashboardCore::new(manifest, store, EngineConfig::default())?;
    core.set_grid_width(GridId::Stats, widths.stats);
    core.set_grid_width(GridId::Insights, widths.insights);
    core.load();
    debug!(restorable = core.restore_list().len(), "rendered dashboard");

    Ok(format_dashboard(core.dashboard()))
}

pub(crate) fn format_dashboard(dashboard: &Dashboard) -> String {
    let mut out = String::new();
    for grid in dashboard.grids() {
        out.push_str(&format!("{} ({} columns)\n", grid.id(), grid.column_count(dashboard.metrics())));
        for module in grid.modules() {
            let place = match (module.visible, module.placement) {
                (false, _) => "hidden".to_owned(),
                (true, Some(cell)) => format!("row {} col {}", cell.row, cell.col),
                (true, None) => "unplaced".to_owned(),
            };
            out.push_str(&format!(
                "  {:<20} {:<6} span {}  {place}\n",
                module.id,
                module.size.as_str(),
                module.span
            ));
        }
    }
    out
}
