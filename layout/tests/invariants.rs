//! End-to-end sequences through the public engine API, checking that no
//! two visible modules ever overlap and that persisted layouts survive a
//! reload.

use layout::engine::{Action, DashboardCore, EngineConfig};
use layout::geom::Rect;
use layout::model::{GridId, ModuleKind, ModuleSpec};
use layout::persist::{LayoutSnapshot, MemoryStore};
use layout::size::SizeClass;

fn manifest() -> Vec<ModuleSpec> {
    let stat = |id: &str| ModuleSpec { id: id.into(), kind: ModuleKind::Stat, grid: GridId::Stats, title: None };
    let insight =
        |id: &str| ModuleSpec { id: id.into(), kind: ModuleKind::Insight, grid: GridId::Insights, title: None };
    vec![
        stat("articles_today"),
        stat("streak"),
        stat("favorite_category"),
        stat("reading_time"),
        insight("peak_hours"),
        insight("most_active_day"),
        insight("streak_stats"),
    ]
}

fn engine(store: MemoryStore, stats_px: f64) -> DashboardCore<MemoryStore> {
    let mut core = DashboardCore::new(manifest(), store, EngineConfig::default()).unwrap();
    core.set_grid_width(GridId::Stats, stats_px);
    core.set_grid_width(GridId::Insights, 1000.0);
    core.load();
    core
}

fn assert_overlap_free(core: &DashboardCore<MemoryStore>) {
    for grid in GridId::ALL {
        let pairs = core.dashboard().overlapping_pairs(grid);
        assert!(pairs.is_empty(), "{grid} overlaps: {pairs:?}");
    }
}

#[test]
fn mixed_operations_never_overlap() {
    for width in [250.0, 500.0, 750.0, 1000.0, 1250.0] {
        let mut core = engine(MemoryStore::new(), width);
        core.toggle_mode();

        for id in ["articles_today", "streak", "favorite_category", "reading_time"] {
            let cycled = core.cycle_size(id);
            assert!(cycled.is_ok() || width < 500.0, "cycle {id} at {width}: {cycled:?}");
            assert_overlap_free(&core);
        }

        core.hide_module("streak").unwrap();
        assert_overlap_free(&core);

        core.drag_start("peak_hours").unwrap();
        core.drag_drop(GridId::Stats, 1).unwrap();
        assert_overlap_free(&core);

        core.restore_module("streak").unwrap();
        assert_overlap_free(&core);

        core.resize_start("reading_time", 250.0, 100.0).unwrap();
        core.resize_move(480.0, 215.0).unwrap();
        core.resize_end(480.0, 215.0).unwrap();
        assert_overlap_free(&core);

        core.set_grid_width(GridId::Stats, width / 2.0);
        assert_overlap_free(&core);
        core.set_grid_width(GridId::Stats, width * 2.0);
        assert_overlap_free(&core);
    }
}

#[test]
fn layout_survives_reload() {
    let mut core = engine(MemoryStore::new(), 1000.0);
    core.toggle_mode();
    core.hide_module("favorite_category").unwrap();
    core.cycle_size("streak").unwrap();
    core.drag_start("streak_stats").unwrap();
    core.drag_drop(GridId::Stats, 0).unwrap();
    core.toggle_mode();
    let saved = LayoutSnapshot::capture(core.dashboard());

    let reloaded = engine(core.store().clone(), 1000.0);
    assert_eq!(LayoutSnapshot::capture(reloaded.dashboard()), saved);
    assert_eq!(reloaded.dashboard().module("streak").unwrap().size, SizeClass::Wide);
    assert_eq!(reloaded.restore_list().len(), 1);
    assert_overlap_free(&reloaded);
}

#[test]
fn drop_by_pointer_then_reset() {
    let mut core = engine(MemoryStore::new(), 1000.0);
    core.toggle_mode();
    core.drag_start("articles_today").unwrap();
    let grid_rect = Rect::new(40.0, 300.0, 1000.0, 480.0);
    core.drag_drop_at(GridId::Insights, Rect::new(45.0, 310.0, 20.0, 20.0), grid_rect).unwrap();
    assert_eq!(core.dashboard().locate("articles_today"), Some((GridId::Insights, 0)));
    assert_overlap_free(&core);

    let actions = core.reset();
    assert!(actions.contains(&Action::Reload));
    assert_eq!(core.dashboard().locate("articles_today"), Some((GridId::Stats, 0)));
}
