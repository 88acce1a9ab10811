//! End-to-end checks through JSON documents: layout in, manifest in,
//! positions, search and reset out.

use stowview_core::{
    ContainerSize, CoordinateMapper, SearchCriteria, SkipReason, StowagePlan, StructuralLayout,
    VisualState,
};

const LAYOUT: &str = r#"{
    "LCG": { "01": 140.2, "03": 134.1, "05": 128.0, "41": -8.6 },
    "TCG": {
        "general": { "01": 1.27, "02": -1.27, "03": 3.81, "04": -3.81 },
        "fwd": { "01": 1.3, "02": -1.3 }
    },
    "TCG_bay_mapping": { "01": "fwd" },
    "Rows_Tiers_per_Bay": [
        { "bay": "01", "tier_start": 2 },
        { "bay": "03", "tier_start": 2 },
        { "bay": "41", "tier_start": 82 }
    ]
}"#;

const MANIFEST: &str = r#"[
    { "id": "MSKU0000001", "bay": "01", "row": "01", "tier": "02", "size": "20ft" },
    { "id": "MSKU0000002", "bay": "03", "row": "02", "tier": "82", "size": "40ft" },
    { "id": "MSKU0000003", "bay": "03", "row": "03", "size": "40ft" },
    { "id": "MSKU0000004", "bay": "41", "row": "04", "tier": "84", "size": "45ft" },
    { "id": "MSKU0000005", "bay": "41", "row": "04", "tier": "71", "size": "20ft" }
]"#;

fn loaded_plan() -> StowagePlan {
    let mut plan = StowagePlan::new();
    plan.set_layout(StructuralLayout::from_json(LAYOUT))
        .expect("layout parses");
    plan.load_manifest(MANIFEST).expect("manifest parses");
    plan
}

#[test]
fn centered_lcg_is_symmetric() {
    let layout = StructuralLayout::from_json(LAYOUT).unwrap();
    let xs: Vec<f32> = layout
        .bays()
        .map(|bay| layout.centered_lcg(bay).unwrap())
        .collect();
    let min = xs.iter().copied().fold(f32::INFINITY, f32::min);
    let max = xs.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    assert!((min + max).abs() < 1e-3);
}

#[test]
fn clamped_relative_tier_matches_tier_start() {
    let layout = StructuralLayout::from_json(LAYOUT).unwrap();
    let mapper = CoordinateMapper::new(&layout);
    let at_start = mapper.map(41, 1, 82, ContainerSize::Twenty);
    let below_start = mapper.map(41, 1, 78, ContainerSize::Twenty);
    assert_eq!(at_start.position.y, below_start.position.y);
}

#[test]
fn deck_threshold_at_tier_72() {
    let layout = StructuralLayout::from_json(LAYOUT).unwrap();
    let mapper = CoordinateMapper::new(&layout);
    assert!(mapper.map(3, 1, 71, ContainerSize::Forty).below_deck);
    assert!(!mapper.map(3, 1, 72, ContainerSize::Forty).below_deck);
}

#[test]
fn record_missing_tier_is_skipped_and_counted() {
    let plan = loaded_plan();
    let ids: Vec<_> = plan.containers().iter().map(|c| c.id()).collect();
    assert_eq!(
        ids,
        vec!["MSKU0000001", "MSKU0000002", "MSKU0000004", "MSKU0000005"]
    );
    assert_eq!(plan.skipped().len(), 1);
    assert_eq!(plan.skipped()[0].index, 2);
    assert_eq!(plan.skipped()[0].reason, SkipReason::MissingField("tier"));
}

#[test]
fn empty_search_highlights_everything() {
    let mut plan = loaded_plan();
    let outcome = plan.search(SearchCriteria::default(), &mut ());
    assert_eq!(outcome.matched, plan.containers().len());
    assert!(plan
        .containers()
        .iter()
        .all(|c| c.state == VisualState::Highlighted && c.treatment().opacity == 1.0));
}

#[test]
fn id_search_then_reset() {
    let mut plan = loaded_plan();
    let original: Vec<_> = plan.containers().iter().map(|c| c.treatment()).collect();

    let mut updates: Vec<(usize, VisualState)> = Vec::new();
    let outcome = plan.search(SearchCriteria::default().with_id("MSKU0000004"), &mut updates);
    assert_eq!(outcome.matched, 1);
    assert_eq!(outcome.dimmed, 3);
    for (index, container) in plan.containers().iter().enumerate() {
        if container.id() == "MSKU0000004" {
            assert_eq!(container.state, VisualState::Highlighted);
            assert_eq!(updates[index], (index, VisualState::Highlighted));
        } else {
            assert_eq!(container.state, VisualState::Dimmed);
            assert_eq!(container.treatment().color, original[index].color);
            assert!(container.treatment().opacity < original[index].opacity);
        }
    }

    plan.reset(&mut ());
    let restored: Vec<_> = plan.containers().iter().map(|c| c.treatment()).collect();
    assert_eq!(restored, original);
    assert!(plan.criteria().is_empty());
}

#[test]
fn degraded_layout_places_nothing() {
    let mut plan = StowagePlan::new();
    plan.fail_layout("fetch returned 404");
    assert!(plan.load_manifest(MANIFEST).is_err());
    assert!(plan.containers().is_empty());
}
