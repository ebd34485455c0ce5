#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Save, clear and move/swap workflow for cell inventory.
//!
//! Local state is authoritative: every mutation is applied to the registry
//! before persistence is requested, and a failed upsert is reported to the
//! caller without rolling the registry back. Reconciling such unsynced edits
//! happens only on the next successful save or a full reload.

use warehouse_grid_core::{
    AuthGateway, CellCode, Command, Event, Item, SyncError, SyncGateway,
};
use warehouse_grid_world::{self as world, query, Warehouse};

/// Why a move request was refused before touching any state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, thiserror::Error)]
pub enum MoveRejection {
    /// Source and destination are the same cell.
    #[error("source and destination are the same")]
    SameCell,
    /// The source holds no items.
    #[error("source is empty")]
    EmptySource,
}

/// Failures surfaced by the mutation workflow.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum MutationError {
    /// The move was rejected locally; nothing changed.
    #[error("invalid move: {0}")]
    InvalidMove(MoveRejection),
    /// The operator is not authorized to mutate inventory.
    #[error("admin authorization required")]
    AuthRequired,
    /// The code does not name a cell.
    #[error("unknown cell `{0}`")]
    UnknownCell(CellCode),
    /// The local change was applied but persisting it failed.
    #[error("saving {code} failed")]
    Sync {
        /// Cell whose upsert failed.
        code: CellCode,
        /// Error reported by the sync gateway.
        #[source]
        source: SyncError,
    },
}

/// Effect of a successful move request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum MoveKind {
    /// Destination was empty; contents moved and the source is now empty.
    Moved,
    /// Both cells held items; contents were exchanged.
    Swapped,
}

/// Mutation workflow bound to an authorization oracle and a sync backend.
#[derive(Debug)]
pub struct MutationWorkflow<A, S> {
    auth: A,
    sync: S,
}

impl<A, S> MutationWorkflow<A, S>
where
    A: AuthGateway,
    S: SyncGateway,
{
    /// Creates a workflow using the provided gateways.
    #[must_use]
    pub fn new(auth: A, sync: S) -> Self {
        Self { auth, sync }
    }

    /// Authorization gateway.
    #[must_use]
    pub fn auth(&self) -> &A {
        &self.auth
    }

    /// Sync gateway.
    #[must_use]
    pub fn sync(&self) -> &S {
        &self.sync
    }

    /// Mutable access to the sync gateway.
    pub fn sync_mut(&mut self) -> &mut S {
        &mut self.sync
    }

    /// Replaces registry contents with the backend snapshot.
    ///
    /// On failure the registry is left untouched and the error is returned
    /// for the caller to report; no retry is attempted.
    pub fn reload(
        &mut self,
        warehouse: &mut Warehouse,
        out_events: &mut Vec<Event>,
    ) -> Result<(), SyncError> {
        match self.sync.fetch_all() {
            Ok(locations) => {
                tracing::info!(records = locations.len(), "loaded stored locations");
                world::apply(warehouse, Command::MergeStored { locations }, out_events);
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%error, "failed to load stored locations; keeping current state");
                Err(error)
            }
        }
    }

    /// Overwrites a cell's items and notes, then persists it.
    pub fn save(
        &mut self,
        warehouse: &mut Warehouse,
        code: &CellCode,
        items: Vec<Item>,
        notes: &str,
        out_events: &mut Vec<Event>,
    ) -> Result<(), MutationError> {
        self.authorize()?;
        if query::cell(warehouse, code.as_str()).is_none() {
            return Err(MutationError::UnknownCell(code.clone()));
        }

        write_contents(warehouse, code, items, notes.trim().to_owned(), out_events);
        self.persist(warehouse, code)
    }

    /// Empties a cell's items and notes, then persists it.
    pub fn clear(
        &mut self,
        warehouse: &mut Warehouse,
        code: &CellCode,
        out_events: &mut Vec<Event>,
    ) -> Result<(), MutationError> {
        self.save(warehouse, code, Vec::new(), "", out_events)
    }

    /// Checks that `code` may be marked as the source of a later move.
    pub fn set_source(&self, warehouse: &Warehouse, code: &CellCode) -> Result<(), MutationError> {
        self.authorize()?;
        match query::cell(warehouse, code.as_str()) {
            Some(_) => Ok(()),
            None => Err(MutationError::UnknownCell(code.clone())),
        }
    }

    /// Moves the source contents into an empty destination, or swaps both cells.
    ///
    /// Items and notes travel together and item lists are never merged. The
    /// source is persisted before the destination; the first failing upsert
    /// stops the sequence and is returned while the local change stays applied.
    pub fn move_or_swap(
        &mut self,
        warehouse: &mut Warehouse,
        source: &CellCode,
        destination: &CellCode,
        out_events: &mut Vec<Event>,
    ) -> Result<MoveKind, MutationError> {
        self.authorize()?;
        if source == destination {
            return Err(MutationError::InvalidMove(MoveRejection::SameCell));
        }

        let source_cell = query::cell(warehouse, source.as_str())
            .ok_or_else(|| MutationError::UnknownCell(source.clone()))?;
        let destination_cell = query::cell(warehouse, destination.as_str())
            .ok_or_else(|| MutationError::UnknownCell(destination.clone()))?;
        if !source_cell.is_occupied() {
            return Err(MutationError::InvalidMove(MoveRejection::EmptySource));
        }

        let moving = (source_cell.items().to_vec(), source_cell.notes().to_owned());
        let (kind, remaining) = if destination_cell.is_occupied() {
            let displaced = (
                destination_cell.items().to_vec(),
                destination_cell.notes().to_owned(),
            );
            (MoveKind::Swapped, displaced)
        } else {
            (MoveKind::Moved, (Vec::new(), String::new()))
        };

        write_contents(warehouse, source, remaining.0, remaining.1, out_events);
        write_contents(warehouse, destination, moving.0, moving.1, out_events);
        tracing::debug!(%source, %destination, ?kind, "applied move locally");

        self.persist(warehouse, source)?;
        self.persist(warehouse, destination)?;
        Ok(kind)
    }

    fn authorize(&self) -> Result<(), MutationError> {
        if self.auth.is_authorized() {
            Ok(())
        } else {
            Err(MutationError::AuthRequired)
        }
    }

    fn persist(&mut self, warehouse: &Warehouse, code: &CellCode) -> Result<(), MutationError> {
        let Some(cell) = query::cell(warehouse, code.as_str()) else {
            return Err(MutationError::UnknownCell(code.clone()));
        };

        match self.sync.upsert(code, cell.items(), cell.notes()) {
            Ok(()) => {
                tracing::debug!(%code, items = cell.items().len(), "persisted cell");
                Ok(())
            }
            Err(source) => {
                tracing::warn!(%code, error = %source, "persisting cell failed; local state kept");
                Err(MutationError::Sync {
                    code: code.clone(),
                    source,
                })
            }
        }
    }
}

fn write_contents(
    warehouse: &mut Warehouse,
    code: &CellCode,
    items: Vec<Item>,
    notes: String,
    out_events: &mut Vec<Event>,
) {
    world::apply(
        warehouse,
        Command::SetContents {
            code: code.clone(),
            items,
            notes,
        },
        out_events,
    );
}
