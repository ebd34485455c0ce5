#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Interaction session wiring the registry to every per-frame system.
//!
//! The session is the single owner of mutable state. Adapters translate
//! user input into session calls and read back poses, tones and tooltips to
//! draw; nothing here knows how a frame is rendered.

use std::{fmt, time::Duration};

use warehouse_grid_core::{AuthGateway, CellCode, Event, Item, SyncError, SyncGateway};
use warehouse_grid_system_camera::{Camera, CameraConfig, CameraPose, PanDirection, ZoomDirection};
use warehouse_grid_system_catalog::SkuCatalog;
use warehouse_grid_system_highlight::{FlashConfig, FlashController};
use warehouse_grid_system_mutation::{MoveKind, MutationError, MutationWorkflow};
use warehouse_grid_system_navigator::{FilterOutcome, MatchQuery, Navigator};
use warehouse_grid_system_picking::{PickHit, Picker, Ray};
use warehouse_grid_world::{query, Warehouse};

/// Visual classification of a cell, in descending precedence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tone {
    /// Marked as the source of a pending move.
    Source,
    /// Currently selected.
    Selected,
    /// Holds at least one item.
    Occupied,
    /// Holds nothing.
    Empty,
}

/// Last user-facing outcome reported by the session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Status {
    /// A filter matched no cell.
    NoMatches,
    /// Contents of a cell were saved.
    Saved(CellCode),
    /// A cell was emptied.
    Cleared(CellCode),
    /// A cell was marked as move source.
    SourceSet(CellCode),
    /// A move completed.
    Moved(MoveKind),
    /// An operation failed with the provided message.
    Failed(String),
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoMatches => f.write_str("No locations found for given filters."),
            Self::Saved(code) => write!(f, "Saved {code}."),
            Self::Cleared(code) => write!(f, "Cleared {code}."),
            Self::SourceSet(code) => write!(f, "Source set: {code}"),
            Self::Moved(MoveKind::Moved) => f.write_str("Moved."),
            Self::Moved(MoveKind::Swapped) => f.write_str("Swapped."),
            Self::Failed(message) => f.write_str(message),
        }
    }
}

/// Selection and move-source marks.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct InteractionState {
    selected: Option<CellCode>,
    source: Option<CellCode>,
    status: Option<Status>,
}

impl InteractionState {
    /// Currently selected cell.
    #[must_use]
    pub fn selected(&self) -> Option<&CellCode> {
        self.selected.as_ref()
    }

    /// Cell marked as the source of the next move.
    #[must_use]
    pub fn source(&self) -> Option<&CellCode> {
        self.source.as_ref()
    }

    /// Outcome of the most recent reporting operation.
    #[must_use]
    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }
}

/// Hover text for a single cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tooltip {
    /// Code of the described cell.
    pub code: CellCode,
    /// One line per item, or a single `Empty` line.
    pub lines: Vec<String>,
}

/// Failures of session-level operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The operation acts on the selection but nothing is selected.
    #[error("no cell selected")]
    NothingSelected,
    /// A move was requested before a source was marked.
    #[error("select a source, then a destination")]
    NoSource,
    /// The mutation workflow refused or failed the request.
    #[error(transparent)]
    Mutation(#[from] MutationError),
}

/// Owner of the registry and every system acting on it.
#[derive(Debug)]
pub struct Session<A, S> {
    warehouse: Warehouse,
    navigator: Navigator,
    camera: Camera,
    flashes: FlashController,
    catalog: SkuCatalog,
    mutations: MutationWorkflow<A, S>,
    picker: Picker,
    state: InteractionState,
}

impl<A, S> Session<A, S>
where
    A: AuthGateway,
    S: SyncGateway,
{
    /// Creates a session over an already generated registry.
    #[must_use]
    pub fn new(
        warehouse: Warehouse,
        camera: CameraConfig,
        flash: FlashConfig,
        mutations: MutationWorkflow<A, S>,
    ) -> Self {
        Self {
            warehouse,
            navigator: Navigator::new(),
            camera: Camera::new(camera),
            flashes: FlashController::new(flash),
            catalog: SkuCatalog::new(),
            mutations,
            picker: Picker::new(),
            state: InteractionState::default(),
        }
    }

    /// Registry owned by the session.
    #[must_use]
    pub fn warehouse(&self) -> &Warehouse {
        &self.warehouse
    }

    /// Filter navigator.
    #[must_use]
    pub fn navigator(&self) -> &Navigator {
        &self.navigator
    }

    /// Camera controller.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Flash controller.
    #[must_use]
    pub fn flashes(&self) -> &FlashController {
        &self.flashes
    }

    /// Mutation workflow and its gateways.
    #[must_use]
    pub fn mutations(&self) -> &MutationWorkflow<A, S> {
        &self.mutations
    }

    /// Selection, source and status.
    #[must_use]
    pub fn state(&self) -> &InteractionState {
        &self.state
    }

    /// Replaces registry contents with the backend snapshot.
    pub fn load(&mut self) -> Result<(), SyncError> {
        let mut events = Vec::new();
        let result = self.mutations.reload(&mut self.warehouse, &mut events);
        self.catalog.handle(&events);
        if let Err(error) = &result {
            self.state.status = Some(Status::Failed(error.to_string()));
        }
        result
    }

    /// Selects `code`; unknown codes leave the selection untouched.
    pub fn select(&mut self, code: &CellCode) -> bool {
        if query::index_of(&self.warehouse, code.as_str()).is_none() {
            tracing::debug!(%code, "ignoring selection of unknown cell");
            return false;
        }
        self.state.selected = Some(code.clone());
        true
    }

    /// Selects the nearest cell struck by `ray`. A miss changes nothing.
    pub fn pick(&mut self, ray: &Ray) -> Option<PickHit> {
        let hit = self.picker.pick(&self.warehouse, ray)?;
        self.state.selected = Some(hit.code.clone());
        Some(hit)
    }

    /// Applies a row and/or SKU filter.
    ///
    /// With matches, the first one is selected, every match flashes and the
    /// camera flies to the first. A blank filter leaves selection and effects
    /// as they were.
    pub fn apply_filter(
        &mut self,
        row: Option<&str>,
        sku: Option<&str>,
        now: Duration,
    ) -> FilterOutcome {
        let outcome = self
            .navigator
            .apply_filter(&self.warehouse, &MatchQuery::new(row, sku));
        match &outcome {
            FilterOutcome::NotApplied => self.state.status = None,
            FilterOutcome::NoMatches => self.state.status = Some(Status::NoMatches),
            FilterOutcome::Matched { first, codes } => {
                self.state.status = None;
                self.state.selected = Some(first.clone());
                self.flashes.flash(&mut self.warehouse, codes, now);
                let _ = self.fly_to(first, now);
            }
        }
        outcome
    }

    /// Steps to the next match, wrapping around.
    pub fn next_match(&mut self, now: Duration) -> Option<CellCode> {
        let code = self.navigator.next()?.clone();
        self.focus(&code, now);
        Some(code)
    }

    /// Steps to the previous match, wrapping around.
    pub fn prev_match(&mut self, now: Duration) -> Option<CellCode> {
        let code = self.navigator.prev()?.clone();
        self.focus(&code, now);
        Some(code)
    }

    /// Drops the current match set and any filter status.
    pub fn clear_filter(&mut self) {
        self.navigator.clear();
        self.state.status = None;
    }

    /// Flies the camera to look at `code`; unknown codes are ignored.
    pub fn fly_to(&mut self, code: &CellCode, now: Duration) -> bool {
        let Some(cell) = query::cell(&self.warehouse, code.as_str()) else {
            return false;
        };
        self.camera.fly_to(cell.position(), now);
        true
    }

    /// Moves camera and target by one pan step.
    pub fn pan(&mut self, direction: PanDirection) {
        self.camera.pan(direction);
    }

    /// Zooms one step toward or away from the target.
    pub fn zoom(&mut self, direction: ZoomDirection) {
        self.camera.zoom(direction);
    }

    /// Returns the camera to its initial pose.
    pub fn recenter(&mut self) {
        self.camera.recenter();
    }

    /// Advances the camera flight, then the flashes, to `now`.
    pub fn tick(&mut self, now: Duration) -> CameraPose {
        let pose = self.camera.update(now);
        self.flashes.update(&mut self.warehouse, now);
        pose
    }

    /// Saves items and notes into the selected cell.
    pub fn save(&mut self, items: Vec<Item>, notes: &str) -> Result<(), SessionError> {
        let code = self.require_selection()?;
        let mut events = Vec::new();
        let result = self
            .mutations
            .save(&mut self.warehouse, &code, items, notes, &mut events);
        self.finish(&events, result, |()| Status::Saved(code))
    }

    /// Empties the selected cell.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        let code = self.require_selection()?;
        let mut events = Vec::new();
        let result = self.mutations.clear(&mut self.warehouse, &code, &mut events);
        self.finish(&events, result, |()| Status::Cleared(code))
    }

    /// Marks the selected cell as the source of the next move.
    pub fn set_source(&mut self) -> Result<(), SessionError> {
        let code = self.require_selection()?;
        let result = self.mutations.set_source(&self.warehouse, &code);
        if result.is_ok() {
            self.state.source = Some(code.clone());
        }
        self.finish(&[], result, |()| Status::SourceSet(code))
    }

    /// Moves or swaps the source contents into the selected cell.
    ///
    /// The source mark is cleared once the local change is applied, even if
    /// persisting it failed afterwards.
    pub fn move_here(&mut self) -> Result<MoveKind, SessionError> {
        let destination = self.require_selection()?;
        let Some(source) = self.state.source.clone() else {
            self.state.status = Some(Status::Failed(SessionError::NoSource.to_string()));
            return Err(SessionError::NoSource);
        };

        let mut events = Vec::new();
        let result =
            self.mutations
                .move_or_swap(&mut self.warehouse, &source, &destination, &mut events);
        if matches!(result, Ok(_) | Err(MutationError::Sync { .. })) {
            self.state.source = None;
        }
        self.finish(&events, result, |kind| Status::Moved(*kind))
    }

    /// Classifies a cell for drawing.
    #[must_use]
    pub fn tone(&self, code: &CellCode) -> Option<Tone> {
        let cell = query::cell(&self.warehouse, code.as_str())?;
        let tone = if self.state.source.as_ref() == Some(code) {
            Tone::Source
        } else if self.state.selected.as_ref() == Some(code) {
            Tone::Selected
        } else if cell.is_occupied() {
            Tone::Occupied
        } else {
            Tone::Empty
        };
        Some(tone)
    }

    /// Tooltip lines for a cell.
    #[must_use]
    pub fn describe(&self, code: &CellCode) -> Option<Tooltip> {
        let cell = query::cell(&self.warehouse, code.as_str())?;
        let lines = if cell.is_occupied() {
            cell.items().iter().map(Item::to_string).collect()
        } else {
            vec!["Empty".to_owned()]
        };
        Some(Tooltip {
            code: cell.code().clone(),
            lines,
        })
    }

    /// Distinct SKUs across the warehouse.
    pub fn skus(&mut self) -> &[String] {
        self.catalog.skus(&self.warehouse)
    }

    /// SKUs containing `term`, for the filter dropdown.
    pub fn sku_suggestions(&mut self, term: &str) -> Vec<&str> {
        self.catalog.suggestions(&self.warehouse, term)
    }

    fn focus(&mut self, code: &CellCode, now: Duration) {
        self.state.selected = Some(code.clone());
        self.flashes.flash(&mut self.warehouse, [code], now);
        let _ = self.fly_to(code, now);
    }

    fn require_selection(&mut self) -> Result<CellCode, SessionError> {
        match self.state.selected.clone() {
            Some(code) => Ok(code),
            None => {
                self.state.status = Some(Status::Failed(SessionError::NothingSelected.to_string()));
                Err(SessionError::NothingSelected)
            }
        }
    }

    fn finish<T>(
        &mut self,
        events: &[Event],
        result: Result<T, MutationError>,
        status: impl FnOnce(&T) -> Status,
    ) -> Result<T, SessionError> {
        self.catalog.handle(events);
        match result {
            Ok(value) => {
                self.state.status = Some(status(&value));
                Ok(value)
            }
            Err(error) => {
                self.state.status = Some(Status::Failed(error.to_string()));
                Err(error.into())
            }
        }
    }
}
