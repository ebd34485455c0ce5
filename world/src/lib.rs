#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative cell registry for the warehouse grid.
//!
//! The registry is built once from the layout generator and afterwards only
//! the items and notes of existing cells change. Cells live in an arena
//! indexed by [`CellIndex`]; each arena slot also carries the cell's
//! [`RenderHandle`] so presentation state never drifts from the cell it
//! belongs to.

mod description;
mod layout;

use std::collections::HashMap;

use glam::Vec3;
use warehouse_grid_core::{
    CellCode, CellIndex, Command, Event, Item, RejectionReason, StoredLocation,
};

pub use description::{DescriptionError, Footprint, Label, RowSpec, Spacing, WarehouseDescription};
pub use layout::{generate, make_code, Cell, CellCoordinates};

/// Neutral render scale applied to cells that are not highlighted.
pub const NEUTRAL_SCALE: f32 = 1.0;

/// Per-cell presentation state owned by the registry arena.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderHandle {
    scale: f32,
}

impl RenderHandle {
    const fn neutral() -> Self {
        Self {
            scale: NEUTRAL_SCALE,
        }
    }

    /// Uniform scale currently applied to the cell's volume.
    #[must_use]
    pub const fn scale(&self) -> f32 {
        self.scale
    }

    /// Overrides the uniform scale applied to the cell's volume.
    pub fn set_scale(&mut self, scale: f32) {
        self.scale = scale;
    }

    /// Restores the neutral scale.
    pub fn reset(&mut self) {
        self.scale = NEUTRAL_SCALE;
    }
}

#[derive(Clone, Debug)]
struct Slot {
    cell: Cell,
    handle: RenderHandle,
}

/// In-memory registry mapping unique cell codes to cell state.
#[derive(Clone, Debug)]
pub struct Warehouse {
    slots: Vec<Slot>,
    lookup: HashMap<CellCode, CellIndex>,
    footprint: Vec3,
}

impl Warehouse {
    /// Generates the layout for `description` and builds the registry from it.
    pub fn new(description: &WarehouseDescription) -> Result<Self, DescriptionError> {
        let cells = generate(description)?;
        let lookup = cells
            .iter()
            .enumerate()
            .map(|(slot, cell)| (cell.code().clone(), index_for_slot(slot)))
            .collect();
        let slots = cells
            .into_iter()
            .map(|cell| Slot {
                cell,
                handle: RenderHandle::neutral(),
            })
            .collect();

        Ok(Self {
            slots,
            lookup,
            footprint: description.footprint.size(),
        })
    }

    /// Provides mutable access to the render handle stored alongside a cell.
    pub fn handle_mut(&mut self, index: CellIndex) -> Option<&mut RenderHandle> {
        self.slots.get_mut(index.slot()).map(|slot| &mut slot.handle)
    }

    fn slot_mut(&mut self, code: &str) -> Option<&mut Slot> {
        let index = *self.lookup.get(code)?;
        self.slots.get_mut(index.slot())
    }
}

fn index_for_slot(slot: usize) -> CellIndex {
    CellIndex::new(u32::try_from(slot).unwrap_or(u32::MAX))
}

/// Applies the provided command to the registry, broadcasting the outcome.
pub fn apply(warehouse: &mut Warehouse, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::SetContents { code, items, notes } => {
            let Some(slot) = warehouse.slot_mut(code.as_str()) else {
                tracing::warn!(code = %code, "rejected contents for unknown cell");
                out_events.push(Event::CommandRejected {
                    code,
                    reason: RejectionReason::UnknownCell,
                });
                return;
            };

            slot.cell.set_contents(items, notes);
            out_events.push(Event::ContentsChanged { code });
        }
        Command::MergeStored { locations } => {
            let mut incoming: HashMap<CellCode, StoredLocation> = locations
                .into_iter()
                .map(|location| (location.code.clone(), location))
                .collect();
            let mut matched = 0;

            for slot in &mut warehouse.slots {
                match incoming.remove(slot.cell.code()) {
                    Some(location) => {
                        let (_, items, notes) = location.into_contents();
                        slot.cell.set_contents(items, notes);
                        matched += 1;
                    }
                    None => slot.cell.set_contents(Vec::<Item>::new(), String::new()),
                }
            }

            let unknown = incoming.len();
            tracing::debug!(matched, unknown, "merged stored locations into registry");
            out_events.push(Event::StoredStateMerged { matched, unknown });
        }
    }
}

/// Query functions that provide read-only access to the registry.
pub mod query {
    use glam::Vec3;
    use warehouse_grid_core::CellIndex;

    use super::{index_for_slot, Cell, RenderHandle, Warehouse};

    /// Looks up a cell by its code.
    #[must_use]
    pub fn cell<'a>(warehouse: &'a Warehouse, code: &str) -> Option<&'a Cell> {
        index_of(warehouse, code).and_then(|index| cell_at(warehouse, index))
    }

    /// Looks up a cell by its arena index.
    #[must_use]
    pub fn cell_at(warehouse: &Warehouse, index: CellIndex) -> Option<&Cell> {
        warehouse.slots.get(index.slot()).map(|slot| &slot.cell)
    }

    /// Resolves the arena index assigned to a code.
    #[must_use]
    pub fn index_of(warehouse: &Warehouse, code: &str) -> Option<CellIndex> {
        warehouse.lookup.get(code).copied()
    }

    /// Iterates every cell in layout order.
    pub fn cells(warehouse: &Warehouse) -> impl Iterator<Item = &Cell> + '_ {
        warehouse.slots.iter().map(|slot| &slot.cell)
    }

    /// Iterates every cell together with its index and render handle, in layout order.
    pub fn slots(
        warehouse: &Warehouse,
    ) -> impl Iterator<Item = (CellIndex, &Cell, &RenderHandle)> + '_ {
        warehouse
            .slots
            .iter()
            .enumerate()
            .map(|(slot, entry)| (index_for_slot(slot), &entry.cell, &entry.handle))
    }

    /// Retrieves the render handle stored alongside a cell.
    #[must_use]
    pub fn handle(warehouse: &Warehouse, index: CellIndex) -> Option<&RenderHandle> {
        warehouse.slots.get(index.slot()).map(|slot| &slot.handle)
    }

    /// Number of cells in the registry.
    #[must_use]
    pub fn len(warehouse: &Warehouse) -> usize {
        warehouse.slots.len()
    }

    /// Number of cells currently holding at least one item.
    #[must_use]
    pub fn occupied_count(warehouse: &Warehouse) -> usize {
        cells(warehouse).filter(|cell| cell.is_occupied()).count()
    }

    /// Unscaled size of every cell volume.
    #[must_use]
    pub fn footprint(warehouse: &Warehouse) -> Vec3 {
        warehouse.footprint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use warehouse_grid_core::StoredItem;

    fn item(sku: &str, qty: Option<u32>) -> Item {
        Item::new(sku, qty).expect("valid sku")
    }

    #[test]
    fn registry_indexes_every_generated_cell() {
        let description = WarehouseDescription::default();
        let warehouse = Warehouse::new(&description).expect("valid description");

        assert_eq!(query::len(&warehouse), description.cell_count());
        for (index, cell, handle) in query::slots(&warehouse) {
            assert_eq!(query::index_of(&warehouse, cell.code().as_str()), Some(index));
            assert_eq!(handle.scale(), NEUTRAL_SCALE);
        }
    }

    #[test]
    fn set_contents_replaces_items_and_notes() {
        let mut warehouse = Warehouse::new(&WarehouseDescription::default()).expect("valid");
        let mut events = Vec::new();
        let code = CellCode::new("B02-B-L1-R");

        apply(
            &mut warehouse,
            Command::SetContents {
                code: code.clone(),
                items: vec![item("WIDGET-1", Some(3)), item("WIDGET-1", None)],
                notes: "fragile".into(),
            },
            &mut events,
        );

        assert_eq!(events, vec![Event::ContentsChanged { code: code.clone() }]);
        let cell = query::cell(&warehouse, code.as_str()).expect("cell exists");
        assert_eq!(cell.items().len(), 2, "duplicate skus are kept");
        assert_eq!(cell.notes(), "fragile");
        assert_eq!(query::occupied_count(&warehouse), 1);
    }

    #[test]
    fn set_contents_rejects_unknown_code() {
        let mut warehouse = Warehouse::new(&WarehouseDescription::default()).expect("valid");
        let mut events = Vec::new();

        apply(
            &mut warehouse,
            Command::SetContents {
                code: CellCode::new("Z99-F-FL-L"),
                items: vec![item("X", None)],
                notes: String::new(),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::CommandRejected {
                code: CellCode::new("Z99-F-FL-L"),
                reason: RejectionReason::UnknownCell,
            }]
        );
        assert_eq!(query::occupied_count(&warehouse), 0);
    }

    #[test]
    fn merge_overwrites_every_cell_and_counts_unknown_records() {
        let mut warehouse = Warehouse::new(&WarehouseDescription::default()).expect("valid");
        let mut events = Vec::new();
        apply(
            &mut warehouse,
            Command::SetContents {
                code: CellCode::new("A01-F-FL-L"),
                items: vec![item("STALE", Some(1))],
                notes: "stale".into(),
            },
            &mut events,
        );
        events.clear();

        apply(
            &mut warehouse,
            Command::MergeStored {
                locations: vec![
                    StoredLocation {
                        code: CellCode::new("C04-B-L2-L"),
                        notes: "pallet".into(),
                        items: vec![
                            StoredItem {
                                sku: " GEAR-9 ".into(),
                                qty: Some(7),
                            },
                            StoredItem {
                                sku: "".into(),
                                qty: Some(1),
                            },
                        ],
                    },
                    StoredLocation {
                        code: CellCode::new("Q01-F-FL-L"),
                        notes: String::new(),
                        items: Vec::new(),
                    },
                ],
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::StoredStateMerged {
                matched: 1,
                unknown: 1
            }]
        );
        let stale = query::cell(&warehouse, "A01-F-FL-L").expect("cell exists");
        assert!(stale.items().is_empty(), "unmatched cells are reset");
        assert!(stale.notes().is_empty());

        let merged = query::cell(&warehouse, "C04-B-L2-L").expect("cell exists");
        assert_eq!(merged.items(), &[item("GEAR-9", Some(7))]);
        assert_eq!(merged.notes(), "pallet");
    }

    #[test]
    fn handle_mut_updates_scale_in_place() {
        let mut warehouse = Warehouse::new(&WarehouseDescription::default()).expect("valid");
        let index = query::index_of(&warehouse, "D17-F-L2-R").expect("cell exists");

        warehouse
            .handle_mut(index)
            .expect("handle exists")
            .set_scale(1.2);
        assert_eq!(query::handle(&warehouse, index).map(RenderHandle::scale), Some(1.2));

        warehouse.handle_mut(index).expect("handle exists").reset();
        assert_eq!(
            query::handle(&warehouse, index).map(RenderHandle::scale),
            Some(NEUTRAL_SCALE)
        );
    }
}
