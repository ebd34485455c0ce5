use warehouse_grid_core::{
    AuthGateway, CellCode, Event, Item, StoredItem, StoredLocation, SyncError, SyncGateway,
};
use warehouse_grid_system_mutation::{MoveKind, MoveRejection, MutationError, MutationWorkflow};
use warehouse_grid_world::{query, Warehouse, WarehouseDescription};

struct Admin(bool);

impl AuthGateway for Admin {
    fn is_authorized(&self) -> bool {
        self.0
    }
}

#[derive(Default)]
struct RecordingSync {
    upserts: Vec<StoredLocation>,
    stored: Vec<StoredLocation>,
    fail_fetch: bool,
    fail_on: Option<CellCode>,
}

impl SyncGateway for RecordingSync {
    fn fetch_all(&mut self) -> Result<Vec<StoredLocation>, SyncError> {
        if self.fail_fetch {
            return Err(SyncError::Transport("connection refused".into()));
        }
        Ok(self.stored.clone())
    }

    fn upsert(&mut self, code: &CellCode, items: &[Item], notes: &str) -> Result<(), SyncError> {
        if self.fail_on.as_ref() == Some(code) {
            return Err(SyncError::Transport("timed out".into()));
        }
        self.upserts
            .push(StoredLocation::from_contents(code, items, notes));
        Ok(())
    }
}

type Workflow = MutationWorkflow<Admin, RecordingSync>;

fn setup(authorized: bool) -> (Warehouse, Workflow) {
    (
        Warehouse::new(&WarehouseDescription::default()).expect("valid description"),
        MutationWorkflow::new(Admin(authorized), RecordingSync::default()),
    )
}

fn code(value: &str) -> CellCode {
    CellCode::new(value)
}

fn items(skus: &[(&str, Option<u32>)]) -> Vec<Item> {
    skus.iter()
        .map(|(sku, qty)| Item::new(sku, *qty).expect("valid sku"))
        .collect()
}

fn contents(warehouse: &Warehouse, value: &str) -> (Vec<Item>, String) {
    let cell = query::cell(warehouse, value).expect("cell exists");
    (cell.items().to_vec(), cell.notes().to_owned())
}

#[test]
fn save_applies_locally_and_persists() {
    let (mut warehouse, mut workflow) = setup(true);
    let mut events = Vec::new();
    let target = code("A03-F-L1-R");

    workflow
        .save(
            &mut warehouse,
            &target,
            items(&[("WIDGET-1", Some(5))]),
            "  top shelf  ",
            &mut events,
        )
        .expect("save succeeds");

    assert_eq!(
        contents(&warehouse, "A03-F-L1-R"),
        (items(&[("WIDGET-1", Some(5))]), "top shelf".to_owned())
    );
    assert_eq!(events, vec![Event::ContentsChanged { code: target.clone() }]);
    assert_eq!(workflow.sync().upserts.len(), 1);
    assert_eq!(workflow.sync().upserts[0].code, target);
    assert_eq!(workflow.sync().upserts[0].notes, "top shelf");
}

#[test]
fn clear_empties_items_and_notes() {
    let (mut warehouse, mut workflow) = setup(true);
    let mut events = Vec::new();
    let target = code("B01-B-FL-L");
    workflow
        .save(&mut warehouse, &target, items(&[("BOLT", None)]), "n", &mut events)
        .expect("save succeeds");

    workflow
        .clear(&mut warehouse, &target, &mut events)
        .expect("clear succeeds");

    assert_eq!(contents(&warehouse, "B01-B-FL-L"), (Vec::new(), String::new()));
    let last = workflow.sync().upserts.last().expect("clear persisted");
    assert!(last.items.is_empty());
    assert!(last.notes.is_empty());
}

#[test]
fn unauthorized_mutations_change_nothing() {
    let (mut warehouse, mut workflow) = setup(false);
    let mut events = Vec::new();
    let a = code("A01-F-FL-L");
    let b = code("A02-F-FL-L");

    assert_eq!(
        workflow.save(&mut warehouse, &a, items(&[("X", None)]), "", &mut events),
        Err(MutationError::AuthRequired)
    );
    assert_eq!(
        workflow.clear(&mut warehouse, &a, &mut events),
        Err(MutationError::AuthRequired)
    );
    assert_eq!(workflow.set_source(&warehouse, &a), Err(MutationError::AuthRequired));
    assert_eq!(
        workflow.move_or_swap(&mut warehouse, &a, &b, &mut events),
        Err(MutationError::AuthRequired)
    );

    assert!(events.is_empty());
    assert!(workflow.sync().upserts.is_empty());
    assert_eq!(query::occupied_count(&warehouse), 0);
}

#[test]
fn move_into_empty_destination_relocates_contents() {
    let (mut warehouse, mut workflow) = setup(true);
    let mut events = Vec::new();
    let a = code("C01-F-FL-L");
    let b = code("C05-B-L2-R");
    let stock = items(&[("GEAR", Some(2)), ("GEAR", Some(3))]);
    workflow
        .save(&mut warehouse, &a, stock.clone(), "heavy", &mut events)
        .expect("save succeeds");

    let kind = workflow
        .move_or_swap(&mut warehouse, &a, &b, &mut events)
        .expect("move succeeds");

    assert_eq!(kind, MoveKind::Moved);
    assert_eq!(contents(&warehouse, "C01-F-FL-L"), (Vec::new(), String::new()));
    assert_eq!(contents(&warehouse, "C05-B-L2-R"), (stock, "heavy".to_owned()));

    let persisted: Vec<_> = workflow.sync().upserts[1..]
        .iter()
        .map(|record| record.code.clone())
        .collect();
    assert_eq!(persisted, vec![a, b], "source persisted before destination");
}

#[test]
fn move_onto_occupied_destination_swaps_without_merging() {
    let (mut warehouse, mut workflow) = setup(true);
    let mut events = Vec::new();
    let a = code("D01-F-FL-L");
    let b = code("D02-F-FL-L");
    let a_items = items(&[("A-1", Some(1)), ("A-2", None)]);
    let b_items = items(&[("B-1", Some(9))]);
    workflow
        .save(&mut warehouse, &a, a_items.clone(), "from a", &mut events)
        .expect("save a");
    workflow
        .save(&mut warehouse, &b, b_items.clone(), "from b", &mut events)
        .expect("save b");

    let kind = workflow
        .move_or_swap(&mut warehouse, &a, &b, &mut events)
        .expect("swap succeeds");

    assert_eq!(kind, MoveKind::Swapped);
    assert_eq!(contents(&warehouse, "D01-F-FL-L"), (b_items, "from b".to_owned()));
    assert_eq!(contents(&warehouse, "D02-F-FL-L"), (a_items, "from a".to_owned()));
}

#[test]
fn move_rejects_same_cell_and_empty_source() {
    let (mut warehouse, mut workflow) = setup(true);
    let mut events = Vec::new();
    let a = code("A01-F-FL-L");
    let b = code("A01-F-FL-R");
    workflow
        .save(&mut warehouse, &a, items(&[("KEEP", None)]), "", &mut events)
        .expect("save succeeds");
    events.clear();
    let upserts_before = workflow.sync().upserts.len();

    assert_eq!(
        workflow.move_or_swap(&mut warehouse, &a, &a, &mut events),
        Err(MutationError::InvalidMove(MoveRejection::SameCell))
    );
    assert_eq!(
        workflow.move_or_swap(&mut warehouse, &b, &a, &mut events),
        Err(MutationError::InvalidMove(MoveRejection::EmptySource))
    );

    assert!(events.is_empty());
    assert_eq!(workflow.sync().upserts.len(), upserts_before);
    assert_eq!(contents(&warehouse, "A01-F-FL-L").0, items(&[("KEEP", None)]));
}

#[test]
fn unknown_cells_are_reported() {
    let (mut warehouse, mut workflow) = setup(true);
    let mut events = Vec::new();
    let ghost = code("Z01-F-FL-L");

    assert_eq!(
        workflow.save(&mut warehouse, &ghost, Vec::new(), "", &mut events),
        Err(MutationError::UnknownCell(ghost.clone()))
    );
    assert_eq!(
        workflow.set_source(&warehouse, &ghost),
        Err(MutationError::UnknownCell(ghost))
    );
}

#[test]
fn failed_persistence_keeps_local_change() {
    let (mut warehouse, mut workflow) = setup(true);
    let mut events = Vec::new();
    let a = code("B02-F-FL-L");
    let b = code("B03-F-FL-L");
    workflow
        .save(&mut warehouse, &a, items(&[("SKU-A", None)]), "", &mut events)
        .expect("save succeeds");
    workflow.sync_mut().fail_on = Some(a.clone());

    let result = workflow.move_or_swap(&mut warehouse, &a, &b, &mut events);

    assert!(matches!(
        result,
        Err(MutationError::Sync { ref code, source: SyncError::Transport(_) }) if *code == a
    ));
    assert!(contents(&warehouse, "B02-F-FL-L").0.is_empty(), "local move stays applied");
    assert_eq!(contents(&warehouse, "B03-F-FL-L").0, items(&[("SKU-A", None)]));
    assert_eq!(workflow.sync().upserts.len(), 1, "destination upsert never attempted");
}

#[test]
fn reload_merges_backend_snapshot_and_survives_failure() {
    let (mut warehouse, mut workflow) = setup(true);
    let mut events = Vec::new();
    workflow.sync_mut().stored = vec![StoredLocation {
        code: code("C03-B-L1-L"),
        notes: "restored".into(),
        items: vec![StoredItem {
            sku: "PART".into(),
            qty: Some(4),
        }],
    }];

    workflow
        .reload(&mut warehouse, &mut events)
        .expect("fetch succeeds");
    assert_eq!(
        contents(&warehouse, "C03-B-L1-L"),
        (items(&[("PART", Some(4))]), "restored".to_owned())
    );

    workflow.sync_mut().fail_fetch = true;
    assert!(workflow.reload(&mut warehouse, &mut events).is_err());
    assert_eq!(query::occupied_count(&warehouse), 1, "state kept after failed fetch");
}
