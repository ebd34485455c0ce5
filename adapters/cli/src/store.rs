//! JSON-file sync backend and token-based admin check.

use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use warehouse_grid_core::{AuthGateway, CellCode, Item, StoredLocation, SyncError, SyncGateway};

/// Sync backend persisting every cell record in a single JSON array.
#[derive(Clone, Debug)]
pub(crate) struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<StoredLocation>, SyncError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(error) if error.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(error) => return Err(self.transport(error)),
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&raw).map_err(|error| self.transport(error))
    }

    fn write(&self, records: &[StoredLocation]) -> Result<(), SyncError> {
        let json = serde_json::to_string_pretty(records).map_err(|error| self.transport(error))?;
        fs::write(&self.path, json).map_err(|error| self.transport(error))
    }

    fn transport(&self, error: impl std::fmt::Display) -> SyncError {
        SyncError::Transport(format!("{}: {error}", self.path.display()))
    }
}

impl SyncGateway for JsonFileStore {
    fn fetch_all(&mut self) -> Result<Vec<StoredLocation>, SyncError> {
        self.read()
    }

    fn upsert(&mut self, code: &CellCode, items: &[Item], notes: &str) -> Result<(), SyncError> {
        let mut records = self.read()?;
        let record = StoredLocation::from_contents(code, items, notes);
        match records.iter_mut().find(|existing| &existing.code == code) {
            Some(existing) => *existing = record,
            None => records.push(record),
        }
        self.write(&records)
    }
}

/// Admin check against a presented token.
#[derive(Clone, Debug, Default)]
pub(crate) struct TokenAuth {
    presented: Option<String>,
    expected: Option<String>,
}

impl TokenAuth {
    pub(crate) fn new(presented: Option<String>, expected: Option<String>) -> Self {
        Self {
            presented,
            expected,
        }
    }
}

impl AuthGateway for TokenAuth {
    fn is_authorized(&self) -> bool {
        let Some(presented) = self.presented.as_deref().map(str::trim) else {
            return false;
        };
        if presented.is_empty() {
            return false;
        }
        self.expected
            .as_deref()
            .map_or(true, |expected| expected.trim() == presented)
    }
}
