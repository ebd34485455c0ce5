use std::time::Duration;

use warehouse_grid_core::CellCode;
use warehouse_grid_system_highlight::{FlashConfig, FlashController};
use warehouse_grid_world::{query, Warehouse, WarehouseDescription, NEUTRAL_SCALE};

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

fn scale_of(warehouse: &Warehouse, code: &str) -> f32 {
    let index = query::index_of(warehouse, code).expect("cell exists");
    query::handle(warehouse, index).expect("handle exists").scale()
}

fn setup() -> (Warehouse, FlashController) {
    (
        Warehouse::new(&WarehouseDescription::default()).expect("valid description"),
        FlashController::new(FlashConfig::default()),
    )
}

#[test]
fn flash_pulses_then_returns_to_neutral() {
    let (mut warehouse, mut flashes) = setup();
    let code = CellCode::new("B02-F-L1-L");
    let t0 = ms(10_000);

    flashes.flash(&mut warehouse, [&code], t0);
    assert_eq!(flashes.entries().len(), 1);

    flashes.update(&mut warehouse, t0 + Duration::from_micros(62_500));
    assert!((scale_of(&warehouse, "B02-F-L1-L") - 1.35).abs() < 1e-5);

    flashes.update(&mut warehouse, t0 + ms(1_200));
    assert_eq!(scale_of(&warehouse, "B02-F-L1-L"), NEUTRAL_SCALE);
    assert!(flashes.entries().is_empty());

    flashes.update(&mut warehouse, t0 + ms(1_500));
    assert_eq!(scale_of(&warehouse, "B02-F-L1-L"), NEUTRAL_SCALE);
    assert!(flashes.entries().is_empty());
}

#[test]
fn new_flash_abandons_previous_entries() {
    let (mut warehouse, mut flashes) = setup();
    let first = CellCode::new("A01-F-FL-L");
    let second = CellCode::new("A02-F-FL-L");

    flashes.flash(&mut warehouse, [&first], ms(0));
    flashes.update(&mut warehouse, ms(60));
    assert!(scale_of(&warehouse, "A01-F-FL-L") > NEUTRAL_SCALE);

    flashes.flash(&mut warehouse, [&second], ms(60));
    assert_eq!(scale_of(&warehouse, "A01-F-FL-L"), NEUTRAL_SCALE);

    let second_index = query::index_of(&warehouse, "A02-F-FL-L").expect("cell exists");
    let first_index = query::index_of(&warehouse, "A01-F-FL-L").expect("cell exists");
    assert!(flashes.is_flashing(second_index));
    assert!(!flashes.is_flashing(first_index));
}

#[test]
fn entries_expire_independently_and_skip_unknown_codes() {
    let (mut warehouse, mut flashes) = setup();
    let codes = [
        CellCode::new("C01-F-FL-L"),
        CellCode::new("NOT-A-CELL"),
        CellCode::new("C01-F-FL-L"),
        CellCode::new("C01-B-FL-L"),
    ];

    flashes.flash(&mut warehouse, codes.iter(), ms(0));
    assert_eq!(flashes.entries().len(), 2, "unknown and repeated codes are skipped");

    flashes.update(&mut warehouse, ms(1_199));
    assert_eq!(flashes.entries().len(), 2);

    flashes.update(&mut warehouse, ms(1_200));
    assert!(flashes.entries().is_empty());
    assert_eq!(scale_of(&warehouse, "C01-B-FL-L"), NEUTRAL_SCALE);
}
