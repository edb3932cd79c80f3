use super::*;

// =============================================================
// Helpers
// =============================================================

fn spec(id: &str, kind: ModuleKind, grid: GridId) -> ModuleSpec {
    ModuleSpec { id: id.into(), kind, grid, title: None }
}

fn manifest() -> Vec<ModuleSpec> {
    vec![
        spec("articles_today", ModuleKind::Stat, GridId::Stats),
        spec("streak", ModuleKind::Stat, GridId::Stats),
        spec("favorite_category", ModuleKind::Stat, GridId::Stats),
        spec("peak_hours", ModuleKind::Insight, GridId::Insights),
        spec("most_active_day", ModuleKind::Insight, GridId::Insights),
    ]
}

fn dashboard(stats_px: f64, insights_px: f64) -> Dashboard {
    let mut dash = Dashboard::from_manifest(manifest(), GridMetrics::default()).unwrap();
    dash.set_grid_width(GridId::Stats, stats_px);
    dash.set_grid_width(GridId::Insights, insights_px);
    dash
}

fn placement_of(dash: &Dashboard, id: &str) -> Option<Cell> {
    dash.module(id).and_then(|m| m.placement)
}

fn assert_overlap_free(dash: &Dashboard) {
    for grid in GridId::ALL {
        assert!(dash.overlapping_pairs(grid).is_empty(), "overlap in {grid}");
    }
}

// =============================================================
// Kinds and ids
// =============================================================

#[test]
fn kind_defaults() {
    assert_eq!(ModuleKind::Stat.base_span(), 1);
    assert_eq!(ModuleKind::Insight.base_span(), 2);
    assert_eq!(ModuleKind::Stat.default_size(), SizeClass::Small);
    assert_eq!(ModuleKind::Insight.default_size(), SizeClass::Large);
}

#[test]
fn kind_serde_lowercase() {
    assert_eq!(serde_json::to_string(&ModuleKind::Insight).unwrap(), "\"insight\"");
}

#[test]
fn grid_id_names() {
    assert_eq!(GridId::Stats.dom_id(), "statsGrid");
    assert_eq!(GridId::Insights.snapshot_key(), "insights");
    assert_eq!(serde_json::to_string(&GridId::Insights).unwrap(), "\"insightsGrid\"");
    assert_eq!(GridId::Stats.to_string(), "statsGrid");
}

#[test]
fn default_titles() {
    assert_eq!(default_title("streak_stats"), "Achievement Stats");
    assert_eq!(default_title("custom_module"), "custom_module");
}

#[test]
fn manifest_title_overrides_default() {
    let mut s = spec("streak", ModuleKind::Stat, GridId::Stats);
    s.title = Some("Daily Streak".into());
    assert_eq!(Module::from_spec(&s).title, "Daily Streak");
}

// =============================================================
// Construction
// =============================================================

#[test]
fn from_manifest_splits_grids_in_order() {
    let dash = dashboard(750.0, 1000.0);
    let stats: Vec<&str> = dash.grid(GridId::Stats).modules().iter().map(|m| m.id.as_str()).collect();
    assert_eq!(stats, ["articles_today", "streak", "favorite_category"]);
    assert_eq!(dash.grid(GridId::Insights).len(), 2);
}

#[test]
fn from_manifest_rejects_duplicate_ids_across_grids() {
    let mut m = manifest();
    m.push(spec("streak", ModuleKind::Insight, GridId::Insights));
    let err = Dashboard::from_manifest(m, GridMetrics::default()).unwrap_err();
    assert_eq!(err, LayoutError::DuplicateModule("streak".into()));
}

#[test]
fn fresh_modules_use_kind_defaults() {
    let dash = dashboard(750.0, 1000.0);
    let insight = dash.module("peak_hours").unwrap();
    assert_eq!(insight.size, SizeClass::Large);
    assert_eq!(insight.span, 2);
    assert!(insight.visible);
}

#[test]
fn insights_flow_two_per_row_on_four_columns() {
    let dash = dashboard(750.0, 1000.0);
    assert_eq!(placement_of(&dash, "peak_hours"), Some(Cell::new(0, 0)));
    assert_eq!(placement_of(&dash, "most_active_day"), Some(Cell::new(0, 2)));
}

#[test]
fn locate_and_require() {
    let dash = dashboard(750.0, 1000.0);
    assert_eq!(dash.locate("most_active_day"), Some((GridId::Insights, 1)));
    assert!(matches!(dash.require("nope"), Err(LayoutError::UnknownModule(_))));
}

#[test]
fn module_at_covers_full_span() {
    let dash = dashboard(750.0, 1000.0);
    let grid = dash.grid(GridId::Insights);
    assert_eq!(grid.module_at(Cell::new(0, 1)).map(|m| m.id.as_str()), Some("peak_hours"));
    assert_eq!(grid.module_at(Cell::new(0, 3)).map(|m| m.id.as_str()), Some("most_active_day"));
    assert!(grid.module_at(Cell::new(1, 0)).is_none());
}

// =============================================================
// Hide / restore
// =============================================================

#[test]
fn hide_removes_from_placement_and_lists_for_restore() {
    let mut dash = dashboard(750.0, 1000.0);
    assert!(dash.hide("streak").unwrap());
    assert_eq!(placement_of(&dash, "streak"), None);
    assert_eq!(placement_of(&dash, "favorite_category"), Some(Cell::new(0, 1)));

    let hidden = dash.hidden_modules();
    assert_eq!(hidden.len(), 1);
    assert_eq!(hidden[0].id, "streak");
    assert_eq!(hidden[0].title, "Streak");
    assert_eq!(hidden[0].grid, GridId::Stats);
}

#[test]
fn hide_twice_is_unchanged() {
    let mut dash = dashboard(750.0, 1000.0);
    assert!(dash.hide("streak").unwrap());
    assert!(!dash.hide("streak").unwrap());
}

#[test]
fn hide_keeps_size_metadata() {
    let mut dash = dashboard(750.0, 1000.0);
    dash.cycle_size("streak").unwrap();
    dash.hide("streak").unwrap();
    let m = dash.module("streak").unwrap();
    assert_eq!(m.size, SizeClass::Wide);
    assert_eq!(m.span, 2);
}

#[test]
fn restore_places_at_first_fit_and_clears_restore_list() {
    let mut dash = dashboard(750.0, 1000.0);
    dash.hide("articles_today").unwrap();
    let outcome = dash.restore("articles_today").unwrap();
    assert_eq!(outcome, RestoreOutcome::Restored { at: Some(Cell::new(0, 2)) });
    assert!(dash.hidden_modules().is_empty());
    assert_overlap_free(&dash);
}

#[test]
fn restore_visible_module_is_noop() {
    let mut dash = dashboard(750.0, 1000.0);
    let before = dash.module("streak").cloned();
    assert_eq!(dash.restore("streak").unwrap(), RestoreOutcome::AlreadyVisible);
    assert_eq!(dash.module("streak").cloned(), before);
}

#[test]
fn restore_unknown_module_errors() {
    let mut dash = dashboard(750.0, 1000.0);
    assert_eq!(dash.restore("ghost"), Err(LayoutError::UnknownModule("ghost".into())));
}

#[test]
fn restore_without_columns_is_best_effort() {
    let mut dash = dashboard(750.0, 1000.0);
    dash.hide("streak").unwrap();
    dash.set_grid_width(GridId::Stats, 0.0);
    let outcome = dash.restore("streak").unwrap();
    assert_eq!(outcome, RestoreOutcome::Restored { at: None });
    assert!(dash.module("streak").unwrap().visible);
}

// =============================================================
// Size cycling
// =============================================================

#[test]
fn cycle_grows_in_place_when_room() {
    let mut dash = dashboard(1000.0, 1000.0);
    // favorite_category at (0,2) on four columns; cols 2-3 are free.
    assert_eq!(dash.cycle_size("favorite_category").unwrap(), SizeClass::Wide);
    let m = dash.module("favorite_category").unwrap();
    assert_eq!(m.span, 2);
    assert_eq!(m.placement, Some(Cell::new(0, 2)));
    assert_overlap_free(&dash);
}

#[test]
fn cycle_relocates_when_in_place_would_overlap() {
    let mut dash = dashboard(750.0, 1000.0);
    // articles_today at (0,0) next to streak: growing must move it.
    assert_eq!(dash.cycle_size("articles_today").unwrap(), SizeClass::Wide);
    assert_eq!(placement_of(&dash, "articles_today"), Some(Cell::new(1, 0)));
    assert_overlap_free(&dash);
}

#[test]
fn cycle_fails_without_room_and_keeps_size() {
    let mut dash = dashboard(250.0, 1000.0);
    let err = dash.cycle_size("streak").unwrap_err();
    assert_eq!(err, LayoutError::NoSlot { id: "streak".into(), span: 2 });
    assert_eq!(dash.module("streak").unwrap().size, SizeClass::Small);
}

#[test]
fn cycle_full_loop_returns_to_small() {
    let mut dash = dashboard(1000.0, 1000.0);
    for _ in 0..4 {
        dash.cycle_size("favorite_category").unwrap();
        assert_overlap_free(&dash);
    }
    let m = dash.module("favorite_category").unwrap();
    assert_eq!(m.size, SizeClass::Small);
    assert_eq!(m.span, 1);
}

#[test]
fn cycle_hidden_module_errors() {
    let mut dash = dashboard(750.0, 1000.0);
    dash.hide("streak").unwrap();
    assert_eq!(dash.cycle_size("streak"), Err(LayoutError::ModuleHidden("streak".into())));
}

#[test]
fn cycle_from_square_restarts_at_small() {
    let mut dash = dashboard(1000.0, 1000.0);
    {
        let m = dash.module_mut("streak").unwrap();
        m.size = SizeClass::Square;
    }
    assert_eq!(dash.cycle_size("streak").unwrap(), SizeClass::Small);
}

// =============================================================
// Reset
// =============================================================

#[test]
fn reset_restores_manifest_state() {
    let mut dash = dashboard(750.0, 1000.0);
    dash.hide("streak").unwrap();
    dash.cycle_size("articles_today").unwrap();
    dash.reset();

    assert!(dash.hidden_modules().is_empty());
    let m = dash.module("articles_today").unwrap();
    assert_eq!(m.size, SizeClass::Small);
    assert_eq!(m.pin, None);
    assert_eq!(m.placement, Some(Cell::new(0, 0)));
    assert!((dash.grid(GridId::Stats).width_px() - 750.0).abs() < f64::EPSILON);
}

// =============================================================
// GridId
// =============================================================

#[test]
fn grid_id_parses_dom_id_and_snapshot_key() {
    assert_eq!("statsGrid".parse::<GridId>(), Ok(GridId::Stats));
    assert_eq!("insights".parse::<GridId>(), Ok(GridId::Insights));
    assert_eq!("sidebar".parse::<GridId>(), Err(LayoutError::UnknownGrid("sidebar".into())));
}
