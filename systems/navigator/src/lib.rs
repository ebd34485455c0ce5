#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Filter evaluation and cyclic match navigation over the cell registry.

use warehouse_grid_core::CellCode;
use warehouse_grid_world::{query, Cell, Warehouse};

/// Predicate evaluated against every cell when a filter is applied.
///
/// Blank inputs are treated as absent so that "no filter" can be told apart
/// from "filter with zero matches".
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchQuery {
    row: Option<String>,
    sku_upper: Option<String>,
}

impl MatchQuery {
    /// Creates a query from an exact row identifier and a SKU substring.
    ///
    /// The row comparison is case-sensitive; the SKU comparison is not.
    #[must_use]
    pub fn new(row: Option<&str>, sku: Option<&str>) -> Self {
        Self {
            row: non_blank(row).map(str::to_owned),
            sku_upper: non_blank(sku).map(str::to_uppercase),
        }
    }

    /// Reports whether neither a row nor a SKU filter is present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row.is_none() && self.sku_upper.is_none()
    }

    /// Evaluates the predicate against a single cell.
    #[must_use]
    pub fn matches(&self, cell: &Cell) -> bool {
        if let Some(row) = &self.row {
            if cell.row() != row {
                return false;
            }
        }

        match &self.sku_upper {
            Some(term) => cell
                .items()
                .iter()
                .any(|item| item.sku().to_uppercase().contains(term.as_str())),
            None => true,
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

/// Result of applying a filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FilterOutcome {
    /// Neither filter was provided; selection and effects are left as they were.
    NotApplied,
    /// A filter was provided but matched no cell.
    NoMatches,
    /// At least one cell matched; the cursor rests on the first one.
    Matched {
        /// Code of the first match in layout order.
        first: CellCode,
        /// Every matching code in layout order.
        codes: Vec<CellCode>,
    },
}

/// Ordered codes produced by the latest filter, with a cyclic cursor.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MatchSet {
    codes: Vec<CellCode>,
    cursor: Option<usize>,
}

impl MatchSet {
    fn from_codes(codes: Vec<CellCode>) -> Self {
        let cursor = (!codes.is_empty()).then_some(0);
        Self { codes, cursor }
    }

    /// Matching codes in layout order.
    #[must_use]
    pub fn codes(&self) -> &[CellCode] {
        &self.codes
    }

    /// Number of matches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.codes.len()
    }

    /// Reports whether the set holds no matches.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }

    /// Position of the cursor, or `None` for an empty set.
    #[must_use]
    pub const fn cursor(&self) -> Option<usize> {
        self.cursor
    }

    /// Code under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&CellCode> {
        self.cursor.and_then(|cursor| self.codes.get(cursor))
    }

    /// One-based cursor position and total, as shown by "Match i of n".
    #[must_use]
    pub fn progress(&self) -> Option<(usize, usize)> {
        self.cursor.map(|cursor| (cursor + 1, self.codes.len()))
    }

    /// Reports whether next/prev can move to a different match.
    #[must_use]
    pub fn can_cycle(&self) -> bool {
        self.codes.len() > 1
    }

    fn step(&mut self, forward: bool) -> Option<&CellCode> {
        let len = self.codes.len();
        let cursor = self.cursor?;
        if len > 1 {
            let next = if forward {
                (cursor + 1) % len
            } else {
                (cursor + len - 1) % len
            };
            self.cursor = Some(next);
        }
        self.current()
    }
}

/// Navigator owning the current match set.
#[derive(Debug, Default)]
pub struct Navigator {
    matches: MatchSet,
}

impl Navigator {
    /// Creates a navigator with no filter applied.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current match set.
    #[must_use]
    pub fn matches(&self) -> &MatchSet {
        &self.matches
    }

    /// Evaluates `filter` over every cell, replacing the match set wholesale.
    pub fn apply_filter(&mut self, warehouse: &Warehouse, filter: &MatchQuery) -> FilterOutcome {
        if filter.is_empty() {
            self.matches = MatchSet::default();
            return FilterOutcome::NotApplied;
        }

        let codes: Vec<CellCode> = query::cells(warehouse)
            .filter(|cell| filter.matches(cell))
            .map(|cell| cell.code().clone())
            .collect();
        tracing::debug!(
            row = ?filter.row,
            sku = ?filter.sku_upper,
            matches = codes.len(),
            "applied cell filter"
        );

        self.matches = MatchSet::from_codes(codes);
        match self.matches.current() {
            Some(first) => FilterOutcome::Matched {
                first: first.clone(),
                codes: self.matches.codes.clone(),
            },
            None => FilterOutcome::NoMatches,
        }
    }

    /// Advances the cursor, wrapping to the first match after the last.
    pub fn next(&mut self) -> Option<&CellCode> {
        self.matches.step(true)
    }

    /// Moves the cursor back, wrapping to the last match before the first.
    pub fn prev(&mut self) -> Option<&CellCode> {
        self.matches.step(false)
    }

    /// Resets to the empty, no-filter state.
    pub fn clear(&mut self) {
        self.matches = MatchSet::default();
    }
}

#[cfg(test)]
mod tests {
    use super::{MatchQuery, MatchSet};
    use warehouse_grid_core::CellCode;

    fn set(codes: &[&str]) -> MatchSet {
        MatchSet::from_codes(codes.iter().copied().map(CellCode::new).collect())
    }

    #[test]
    fn blank_inputs_produce_an_empty_query() {
        assert!(MatchQuery::new(None, None).is_empty());
        assert!(MatchQuery::new(Some("  "), Some("")).is_empty());
        assert!(!MatchQuery::new(Some("B"), None).is_empty());
    }

    #[test]
    fn forward_steps_cycle_through_every_index() {
        let mut matches = set(&["a", "b", "c"]);
        let mut visited = vec![matches.cursor()];
        for _ in 0..3 {
            let _ = matches.step(true);
            visited.push(matches.cursor());
        }
        assert_eq!(visited, vec![Some(0), Some(1), Some(2), Some(0)]);
    }

    #[test]
    fn backward_steps_cycle_in_reverse() {
        let mut matches = set(&["a", "b", "c"]);
        let mut visited = vec![matches.cursor()];
        for _ in 0..3 {
            let _ = matches.step(false);
            visited.push(matches.cursor());
        }
        assert_eq!(visited, vec![Some(0), Some(2), Some(1), Some(0)]);
    }

    #[test]
    fn single_match_still_reports_current_entry() {
        let mut matches = set(&["only"]);
        assert_eq!(matches.step(true).map(CellCode::as_str), Some("only"));
        assert_eq!(matches.step(false).map(CellCode::as_str), Some("only"));
        assert_eq!(matches.progress(), Some((1, 1)));
        assert!(!matches.can_cycle());
    }

    #[test]
    fn empty_set_has_no_cursor() {
        let mut matches = set(&[]);
        assert_eq!(matches.cursor(), None);
        assert_eq!(matches.step(true), None);
        assert_eq!(matches.progress(), None);
    }
}
