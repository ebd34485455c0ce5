//! Immutable warehouse description consumed by the layout generator.

use std::collections::HashSet;

use serde::Deserialize;

/// Separator emitted between the segments of a cell code.
pub(crate) const CODE_SEPARATOR: char = '-';

/// Human-readable label paired with the abbreviation used in cell codes.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Label {
    /// Display name, retained on each cell for filtering and presentation.
    pub name: String,
    /// Fixed abbreviation emitted into cell codes.
    pub abbrev: String,
}

impl Label {
    /// Creates a label from its display name and code abbreviation.
    #[must_use]
    pub fn new(name: impl Into<String>, abbrev: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            abbrev: abbrev.into(),
        }
    }
}

/// Racks and sides declared for a single warehouse row.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RowSpec {
    /// Row identifier, emitted verbatim as the code prefix.
    pub id: String,
    /// Number of racks laid out along the row.
    pub racks: u32,
    /// Sides that carry storage, in declaration order.
    pub sides: Vec<Label>,
}

impl RowSpec {
    /// Creates a row description.
    #[must_use]
    pub fn new(id: impl Into<String>, racks: u32, sides: Vec<Label>) -> Self {
        Self {
            id: id.into(),
            racks,
            sides,
        }
    }
}

/// Distances separating the generating coordinates in world units.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Spacing {
    /// Distance between neighbouring racks along X.
    pub rack_pitch: f32,
    /// Distance between consecutive rows along Z.
    pub row_pitch: f32,
    /// Z offset applied to each side relative to the row base.
    pub side_offset: f32,
    /// Vertical distance between consecutive levels.
    pub level_pitch: f32,
    /// X offset applied to each bay relative to its rack.
    pub bay_offset: f32,
}

/// Dimensions of a single cell volume.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
pub struct Footprint {
    /// Extent along X.
    pub width: f32,
    /// Extent along Y.
    pub height: f32,
    /// Extent along Z.
    pub depth: f32,
}

impl Footprint {
    /// Returns the footprint as a size vector.
    #[must_use]
    pub fn size(&self) -> glam::Vec3 {
        glam::Vec3::new(self.width, self.height, self.depth)
    }
}

/// Hierarchical description of the warehouse: rows, racks, sides, levels and bays.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct WarehouseDescription {
    /// Rows in enumeration order.
    pub rows: Vec<RowSpec>,
    /// Levels shared by every row, bottom-up.
    pub levels: Vec<Label>,
    /// Bays shared by every rack.
    pub bays: Vec<Label>,
    /// Distances between generating coordinates.
    pub spacing: Spacing,
    /// Size of each cell.
    pub footprint: Footprint,
    /// Token emitted in place of the side abbreviation for single-sided rows.
    #[serde(default = "default_single_side_token")]
    pub single_side_token: String,
}

fn default_single_side_token() -> String {
    "F".to_owned()
}

impl Default for WarehouseDescription {
    fn default() -> Self {
        let front = || Label::new("Front", "F");
        let back = || Label::new("Back", "B");

        Self {
            rows: vec![
                RowSpec::new("A", 6, vec![front()]),
                RowSpec::new("B", 7, vec![front(), back()]),
                RowSpec::new("C", 8, vec![front(), back()]),
                RowSpec::new("D", 17, vec![front()]),
            ],
            levels: vec![
                Label::new("Floor", "FL"),
                Label::new("Level 1", "L1"),
                Label::new("Level 2", "L2"),
            ],
            bays: vec![Label::new("Left", "L"), Label::new("Right", "R")],
            spacing: Spacing {
                rack_pitch: 2.0,
                row_pitch: 5.0,
                side_offset: 0.8,
                level_pitch: 0.75,
                bay_offset: 0.4,
            },
            footprint: Footprint {
                width: 0.7,
                height: 0.35,
                depth: 0.7,
            },
            single_side_token: default_single_side_token(),
        }
    }
}

/// Reasons a warehouse description is rejected.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DescriptionError {
    /// The description declares no rows.
    #[error("warehouse declares no rows")]
    NoRows,
    /// A row identifier is blank, contains the code separator, or ends in a digit.
    #[error("row identifier `{0}` is not usable as a code prefix")]
    InvalidRowId(String),
    /// Two rows share the same identifier.
    #[error("row `{0}` is declared more than once")]
    DuplicateRow(String),
    /// A row declares zero racks.
    #[error("row `{0}` declares no racks")]
    NoRacks(String),
    /// A row declares no sides.
    #[error("row `{0}` declares no sides")]
    NoSides(String),
    /// The shared level list is empty.
    #[error("warehouse declares no levels")]
    NoLevels,
    /// The shared bay list is empty.
    #[error("warehouse declares no bays")]
    NoBays,
    /// An abbreviation is blank or contains the code separator.
    #[error("{domain} abbreviation `{abbrev}` is not usable in a cell code")]
    InvalidAbbreviation {
        /// Coordinate the abbreviation belongs to.
        domain: &'static str,
        /// Offending abbreviation.
        abbrev: String,
    },
    /// Two labels of the same coordinate share an abbreviation.
    #[error("{domain} abbreviation `{abbrev}` is used more than once")]
    DuplicateAbbreviation {
        /// Coordinate the abbreviation belongs to.
        domain: &'static str,
        /// Repeated abbreviation.
        abbrev: String,
    },
    /// A spacing or footprint value is negative, zero where forbidden, or not finite.
    #[error("`{0}` must be a finite positive number")]
    InvalidDimension(&'static str),
}

impl WarehouseDescription {
    /// Total number of cells the description generates.
    #[must_use]
    pub fn cell_count(&self) -> usize {
        let per_rack = self.levels.len() * self.bays.len();
        self.rows
            .iter()
            .map(|row| row.racks as usize * row.sides.len() * per_rack)
            .sum()
    }

    /// Verifies that every row, label and dimension yields unique, well-formed codes.
    pub fn validate(&self) -> Result<(), DescriptionError> {
        if self.rows.is_empty() {
            return Err(DescriptionError::NoRows);
        }

        let mut seen_rows = HashSet::with_capacity(self.rows.len());
        for row in &self.rows {
            let usable = !row.id.trim().is_empty()
                && !row.id.contains(CODE_SEPARATOR)
                && !row.id.ends_with(|c: char| c.is_ascii_digit());
            if !usable {
                return Err(DescriptionError::InvalidRowId(row.id.clone()));
            }
            if !seen_rows.insert(row.id.as_str()) {
                return Err(DescriptionError::DuplicateRow(row.id.clone()));
            }
            if row.racks == 0 {
                return Err(DescriptionError::NoRacks(row.id.clone()));
            }
            if row.sides.is_empty() {
                return Err(DescriptionError::NoSides(row.id.clone()));
            }
            check_labels("side", &row.sides)?;
        }

        if self.levels.is_empty() {
            return Err(DescriptionError::NoLevels);
        }
        if self.bays.is_empty() {
            return Err(DescriptionError::NoBays);
        }
        check_labels("level", &self.levels)?;
        check_labels("bay", &self.bays)?;
        check_abbreviation("side", &self.single_side_token)?;

        let spacing = &self.spacing;
        check_dimension("rack_pitch", spacing.rack_pitch)?;
        check_dimension("row_pitch", spacing.row_pitch)?;
        check_dimension("level_pitch", spacing.level_pitch)?;
        check_offset("side_offset", spacing.side_offset)?;
        check_offset("bay_offset", spacing.bay_offset)?;
        check_dimension("footprint.width", self.footprint.width)?;
        check_dimension("footprint.height", self.footprint.height)?;
        check_dimension("footprint.depth", self.footprint.depth)?;

        Ok(())
    }
}

fn check_labels(domain: &'static str, labels: &[Label]) -> Result<(), DescriptionError> {
    let mut seen = HashSet::with_capacity(labels.len());
    for label in labels {
        check_abbreviation(domain, &label.abbrev)?;
        if !seen.insert(label.abbrev.as_str()) {
            return Err(DescriptionError::DuplicateAbbreviation {
                domain,
                abbrev: label.abbrev.clone(),
            });
        }
    }
    Ok(())
}

fn check_abbreviation(domain: &'static str, abbrev: &str) -> Result<(), DescriptionError> {
    if abbrev.trim().is_empty() || abbrev.contains(CODE_SEPARATOR) {
        return Err(DescriptionError::InvalidAbbreviation {
            domain,
            abbrev: abbrev.to_owned(),
        });
    }
    Ok(())
}

fn check_dimension(name: &'static str, value: f32) -> Result<(), DescriptionError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(DescriptionError::InvalidDimension(name))
    }
}

// Offsets may be zero, which stacks sides or bays on the rack centre.
fn check_offset(name: &'static str, value: f32) -> Result<(), DescriptionError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(DescriptionError::InvalidDimension(name))
    }
}
