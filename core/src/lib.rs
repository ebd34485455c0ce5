#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the warehouse grid engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative cell registry, and pure systems. Callers submit [`Command`]
//! values describing desired registry mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! that systems react to. Persistence and authorization live behind the
//! [`SyncGateway`] and [`AuthGateway`] traits; cell codes are the only
//! identifier that crosses either boundary.

use std::{borrow::Borrow, fmt};

use serde::{Deserialize, Serialize};

/// Unique identifier of a storage cell, derived from its grid coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CellCode(String);

impl CellCode {
    /// Wraps the provided string as a cell code.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Borrows the textual representation of the code.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CellCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for CellCode {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CellCode {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// Stable arena slot of a cell inside the registry.
///
/// Indices are assigned once when the registry is built and never change,
/// because cells are neither created nor destroyed afterwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellIndex(u32);

impl CellIndex {
    /// Creates a new cell index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Converts the index into a slice position.
    #[must_use]
    pub fn slot(&self) -> usize {
        usize::try_from(self.0).unwrap_or(usize::MAX)
    }
}

/// Single stock line stored in a cell.
///
/// The SKU is always trimmed and never empty; construction goes through
/// [`Item::new`] so blank lines are dropped at the boundary.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Item {
    sku: String,
    qty: Option<u32>,
}

impl Item {
    /// Creates an item, returning `None` when the SKU is blank after trimming.
    #[must_use]
    pub fn new(sku: &str, qty: Option<u32>) -> Option<Self> {
        let sku = sku.trim();
        if sku.is_empty() {
            return None;
        }

        Some(Self {
            sku: sku.to_owned(),
            qty,
        })
    }

    /// Stock keeping unit identifying the product.
    #[must_use]
    pub fn sku(&self) -> &str {
        &self.sku
    }

    /// Quantity on hand, if one was recorded.
    #[must_use]
    pub const fn qty(&self) -> Option<u32> {
        self.qty
    }
}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.qty {
            Some(qty) => write!(f, "{} ({qty})", self.sku),
            None => f.write_str(&self.sku),
        }
    }
}

/// Wire representation of a single item as exchanged with the sync backend.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    /// Raw SKU text; may be blank on records written by older clients.
    #[serde(default)]
    pub sku: String,
    /// Raw quantity; negative values are treated as absent.
    #[serde(default, deserialize_with = "lenient_quantity")]
    pub qty: Option<i64>,
}

/// Accepts any numeric quantity, keeping only whole values.
fn lenient_quantity<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    deserializer.deserialize_option(QuantityVisitor)
}

struct QuantityVisitor;

impl<'de> serde::de::Visitor<'de> for QuantityVisitor {
    type Value = Option<i64>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("an optional numeric quantity")
    }

    fn visit_none<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_unit<E: serde::de::Error>(self) -> Result<Self::Value, E> {
        Ok(None)
    }

    fn visit_some<D: serde::Deserializer<'de>>(self, deserializer: D) -> Result<Self::Value, D::Error> {
        deserializer.deserialize_i64(self)
    }

    fn visit_i64<E: serde::de::Error>(self, value: i64) -> Result<Self::Value, E> {
        Ok(Some(value))
    }

    fn visit_u64<E: serde::de::Error>(self, value: u64) -> Result<Self::Value, E> {
        Ok(i64::try_from(value).ok())
    }

    fn visit_f64<E: serde::de::Error>(self, value: f64) -> Result<Self::Value, E> {
        let whole = value.is_finite()
            && value.fract() == 0.0
            && value >= i64::MIN as f64
            && value < i64::MAX as f64;
        Ok(whole.then(|| value as i64))
    }
}

impl StoredItem {
    /// Converts the wire record into a sanitized item.
    #[must_use]
    pub fn into_item(self) -> Option<Item> {
        let qty = self.qty.and_then(|qty| u32::try_from(qty).ok());
        Item::new(&self.sku, qty)
    }
}

impl From<&Item> for StoredItem {
    fn from(item: &Item) -> Self {
        Self {
            sku: item.sku.clone(),
            qty: item.qty.map(i64::from),
        }
    }
}

/// Wire representation of one persisted cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredLocation {
    /// Code of the cell the record belongs to.
    pub code: CellCode,
    /// Free-text notes attached to the cell.
    #[serde(default)]
    pub notes: String,
    /// Items stored in the cell.
    #[serde(default)]
    pub items: Vec<StoredItem>,
}

impl StoredLocation {
    /// Captures the provided cell contents as a wire record.
    #[must_use]
    pub fn from_contents(code: &CellCode, items: &[Item], notes: &str) -> Self {
        Self {
            code: code.clone(),
            notes: notes.to_owned(),
            items: items.iter().map(StoredItem::from).collect(),
        }
    }

    /// Consumes the record, yielding its sanitized items and notes.
    #[must_use]
    pub fn into_contents(self) -> (CellCode, Vec<Item>, String) {
        let items = sanitize_items(self.items);
        (self.code, items, self.notes)
    }
}

/// Drops blank-SKU entries and normalizes quantities.
#[must_use]
pub fn sanitize_items(items: impl IntoIterator<Item = StoredItem>) -> Vec<Item> {
    items.into_iter().filter_map(StoredItem::into_item).collect()
}

/// Commands that express all permissible registry mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Overwrites the items and notes stored in a single cell.
    SetContents {
        /// Cell whose contents are replaced.
        code: CellCode,
        /// Items that become the cell's complete item list.
        items: Vec<Item>,
        /// Notes that replace the cell's notes.
        notes: String,
    },
    /// Applies a full snapshot fetched from the sync backend.
    ///
    /// Every cell without a matching record is reset to empty.
    MergeStored {
        /// Records returned by the backend.
        locations: Vec<StoredLocation>,
    },
}

/// Events broadcast by the registry after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a cell's items or notes were replaced.
    ContentsChanged {
        /// Cell whose contents changed.
        code: CellCode,
    },
    /// Confirms that a backend snapshot was merged into the registry.
    StoredStateMerged {
        /// Number of records that matched a known cell.
        matched: usize,
        /// Number of records whose code matched no cell.
        unknown: usize,
    },
    /// Reports that a command referenced a cell the registry does not know.
    CommandRejected {
        /// Code provided in the rejected command.
        code: CellCode,
        /// Specific reason the command failed.
        reason: RejectionReason,
    },
}

/// Reasons a registry command may be rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    /// No cell with the provided code exists.
    UnknownCell,
}

/// Failures reported by a [`SyncGateway`].
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SyncError {
    /// The backend refused the request because the caller is not authorized.
    #[error("sync backend rejected credentials: {0}")]
    Auth(String),
    /// The request did not complete.
    #[error("sync transport failed: {0}")]
    Transport(String),
}

/// Persistence backend consumed by the registry loader and mutation workflow.
pub trait SyncGateway {
    /// Fetches every persisted cell record.
    fn fetch_all(&mut self) -> Result<Vec<StoredLocation>, SyncError>;

    /// Inserts or replaces the record for a single cell.
    fn upsert(&mut self, code: &CellCode, items: &[Item], notes: &str) -> Result<(), SyncError>;
}

/// Authorization oracle consulted before any mutating operation runs.
pub trait AuthGateway {
    /// Reports whether the current operator may mutate inventory.
    fn is_authorized(&self) -> bool;
}
