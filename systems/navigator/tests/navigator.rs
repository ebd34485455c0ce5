use warehouse_grid_core::{CellCode, Command, Item};
use warehouse_grid_system_navigator::{FilterOutcome, MatchQuery, Navigator};
use warehouse_grid_world::{self as world, Warehouse, WarehouseDescription};

fn stock(warehouse: &mut Warehouse, code: &str, skus: &[&str]) {
    let mut events = Vec::new();
    world::apply(
        warehouse,
        Command::SetContents {
            code: CellCode::new(code),
            items: skus
                .iter()
                .map(|sku| Item::new(sku, Some(1)).expect("valid sku"))
                .collect(),
            notes: String::new(),
        },
        &mut events,
    );
}

fn stocked_warehouse() -> Warehouse {
    let mut warehouse = Warehouse::new(&WarehouseDescription::default()).expect("valid description");
    stock(&mut warehouse, "C02-F-FL-L", &["WIDGET-1"]);
    stock(&mut warehouse, "B05-B-L2-R", &["widget-1", "BOLT"]);
    stock(&mut warehouse, "B01-F-FL-L", &["WIDGET-1"]);
    stock(&mut warehouse, "B03-F-L1-L", &["GEAR"]);
    warehouse
}

fn codes(outcome: &FilterOutcome) -> Vec<&str> {
    match outcome {
        FilterOutcome::Matched { codes, .. } => codes.iter().map(CellCode::as_str).collect(),
        _ => Vec::new(),
    }
}

#[test]
fn row_and_sku_filter_returns_matches_in_registry_order() {
    let warehouse = stocked_warehouse();
    let mut navigator = Navigator::new();

    let outcome = navigator.apply_filter(&warehouse, &MatchQuery::new(Some("B"), Some("widget-1")));

    assert_eq!(codes(&outcome), vec!["B01-F-FL-L", "B05-B-L2-R"]);
    assert!(matches!(
        &outcome,
        FilterOutcome::Matched { first, .. } if first.as_str() == "B01-F-FL-L"
    ));
    assert_eq!(navigator.matches().cursor(), Some(0));
}

#[test]
fn row_filter_is_case_sensitive() {
    let warehouse = stocked_warehouse();
    let mut navigator = Navigator::new();

    let outcome = navigator.apply_filter(&warehouse, &MatchQuery::new(Some("b"), None));
    assert_eq!(outcome, FilterOutcome::NoMatches);
    assert!(navigator.matches().is_empty());
}

#[test]
fn row_only_filter_matches_empty_cells_too() {
    let warehouse = stocked_warehouse();
    let mut navigator = Navigator::new();

    let _ = navigator.apply_filter(&warehouse, &MatchQuery::new(Some("A"), None));
    assert_eq!(navigator.matches().len(), 36);
}

#[test]
fn zero_matches_is_distinct_from_no_filter() {
    let warehouse = stocked_warehouse();
    let mut navigator = Navigator::new();

    assert_eq!(
        navigator.apply_filter(&warehouse, &MatchQuery::new(None, Some("NOPE"))),
        FilterOutcome::NoMatches
    );
    assert_eq!(
        navigator.apply_filter(&warehouse, &MatchQuery::new(None, None)),
        FilterOutcome::NotApplied
    );
}

#[test]
fn next_and_prev_cycle_over_three_matches() {
    let warehouse = stocked_warehouse();
    let mut navigator = Navigator::new();
    let _ = navigator.apply_filter(&warehouse, &MatchQuery::new(None, Some("WIDGET")));
    assert_eq!(navigator.matches().len(), 3);

    let forward: Vec<_> = (0..3)
        .filter_map(|_| navigator.next().cloned())
        .collect();
    assert_eq!(
        forward,
        vec![
            CellCode::new("B05-B-L2-R"),
            CellCode::new("C02-F-FL-L"),
            CellCode::new("B01-F-FL-L"),
        ]
    );

    let backward: Vec<_> = (0..3)
        .filter_map(|_| navigator.prev().cloned())
        .collect();
    assert_eq!(
        backward,
        vec![
            CellCode::new("C02-F-FL-L"),
            CellCode::new("B05-B-L2-R"),
            CellCode::new("B01-F-FL-L"),
        ]
    );
}

#[test]
fn clear_resets_to_no_filter_state() {
    let warehouse = stocked_warehouse();
    let mut navigator = Navigator::new();
    let _ = navigator.apply_filter(&warehouse, &MatchQuery::new(None, Some("GEAR")));
    assert_eq!(navigator.matches().len(), 1);

    navigator.clear();
    assert!(navigator.matches().is_empty());
    assert_eq!(navigator.matches().cursor(), None);
    assert_eq!(navigator.next(), None);
}
