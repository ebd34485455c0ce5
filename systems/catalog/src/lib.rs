#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Lazily rebuilt index of the distinct SKUs stored across the warehouse.

use std::collections::BTreeSet;

use warehouse_grid_core::Event;
use warehouse_grid_world::{query, Warehouse};

/// Sorted SKU suggestion list, invalidated by registry events.
#[derive(Debug)]
pub struct SkuCatalog {
    skus: Vec<String>,
    stale: bool,
}

impl Default for SkuCatalog {
    fn default() -> Self {
        Self {
            skus: Vec::new(),
            stale: true,
        }
    }
}

impl SkuCatalog {
    /// Creates an empty catalog that builds itself on first read.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the catalog stale when registry contents changed.
    pub fn handle(&mut self, events: &[Event]) {
        let changed = events.iter().any(|event| {
            matches!(
                event,
                Event::ContentsChanged { .. } | Event::StoredStateMerged { .. }
            )
        });
        if changed {
            self.invalidate();
        }
    }

    /// Forces a rebuild on the next read.
    pub fn invalidate(&mut self) {
        self.stale = true;
    }

    /// Reports whether the next read rebuilds the catalog.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Distinct SKUs, sorted case-insensitively.
    pub fn skus(&mut self, warehouse: &Warehouse) -> &[String] {
        if self.stale {
            self.rebuild(warehouse);
        }
        &self.skus
    }

    /// SKUs containing `term` case-insensitively; every SKU for a blank term.
    pub fn suggestions(&mut self, warehouse: &Warehouse, term: &str) -> Vec<&str> {
        let term = term.trim().to_uppercase();
        self.skus(warehouse)
            .iter()
            .filter(|sku| term.is_empty() || sku.to_uppercase().contains(&term))
            .map(String::as_str)
            .collect()
    }

    fn rebuild(&mut self, warehouse: &Warehouse) {
        let distinct: BTreeSet<&str> = query::cells(warehouse)
            .flat_map(|cell| cell.items())
            .map(|item| item.sku())
            .collect();

        let mut skus: Vec<String> = distinct.into_iter().map(str::to_owned).collect();
        skus.sort_by_cached_key(|sku| sku.to_lowercase());
        tracing::debug!(count = skus.len(), "rebuilt sku catalog");

        self.skus = skus;
        self.stale = false;
    }
}
