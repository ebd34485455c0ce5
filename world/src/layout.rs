//! Deterministic layout generator turning a description into coded, positioned cells.

use glam::Vec3;
use warehouse_grid_core::{CellCode, Item};

use crate::description::{DescriptionError, WarehouseDescription, CODE_SEPARATOR};

/// Generating coordinates retained on every cell for filtering.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct CellCoordinates {
    /// Row identifier.
    pub row: String,
    /// One-based rack number within the row.
    pub rack: u32,
    /// Side display name.
    pub side: String,
    /// Level display name.
    pub level: String,
    /// Bay display name.
    pub bay: String,
}

/// Addressable storage slot with a fixed position and mutable contents.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    code: CellCode,
    coordinates: CellCoordinates,
    position: Vec3,
    items: Vec<Item>,
    notes: String,
}

impl Cell {
    fn empty(code: CellCode, coordinates: CellCoordinates, position: Vec3) -> Self {
        Self {
            code,
            coordinates,
            position,
            items: Vec::new(),
            notes: String::new(),
        }
    }

    /// Unique code identifying the cell.
    #[must_use]
    pub fn code(&self) -> &CellCode {
        &self.code
    }

    /// Coordinates the cell was generated from.
    #[must_use]
    pub fn coordinates(&self) -> &CellCoordinates {
        &self.coordinates
    }

    /// Identifier of the row containing the cell.
    #[must_use]
    pub fn row(&self) -> &str {
        &self.coordinates.row
    }

    /// Centre of the cell in world space.
    #[must_use]
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Items stored in the cell, in entry order.
    #[must_use]
    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Free-text notes attached to the cell.
    #[must_use]
    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Reports whether at least one item is stored in the cell.
    #[must_use]
    pub fn is_occupied(&self) -> bool {
        !self.items.is_empty()
    }

    pub(crate) fn set_contents(&mut self, items: Vec<Item>, notes: String) {
        self.items = items;
        self.notes = notes;
    }
}

/// Builds the cell code for the provided coordinate abbreviations.
///
/// The rack number is zero-padded to two digits.
#[must_use]
pub fn make_code(row: &str, rack: u32, side: &str, level: &str, bay: &str) -> CellCode {
    let sep = CODE_SEPARATOR;
    CellCode::new(format!("{row}{rack:02}{sep}{side}{sep}{level}{sep}{bay}"))
}

/// Generates every cell of the warehouse in row, rack, side, level, bay order.
///
/// Rows advance along Z by the row pitch, racks are centred about X = 0,
/// the first side and first bay take the negative offset, and levels stack
/// upward starting half a cell height above the floor.
pub fn generate(description: &WarehouseDescription) -> Result<Vec<Cell>, DescriptionError> {
    description.validate()?;

    let spacing = description.spacing;
    let half_height = description.footprint.height / 2.0;
    let mut cells = Vec::with_capacity(description.cell_count());
    let mut z_base = 0.0_f32;

    for row in &description.rows {
        let span = (row.racks - 1) as f32 * spacing.rack_pitch;
        let x_start = -span / 2.0;
        let multi_sided = row.sides.len() > 1;

        for rack in 1..=row.racks {
            let x_rack = x_start + (rack - 1) as f32 * spacing.rack_pitch;

            for (side_index, side) in row.sides.iter().enumerate() {
                let z = z_base + signed_offset(side_index, spacing.side_offset);
                let side_token = if multi_sided {
                    side.abbrev.as_str()
                } else {
                    description.single_side_token.as_str()
                };

                for (level_index, level) in description.levels.iter().enumerate() {
                    let y = level_index as f32 * spacing.level_pitch + half_height;

                    for (bay_index, bay) in description.bays.iter().enumerate() {
                        let x = x_rack + signed_offset(bay_index, spacing.bay_offset);
                        let code = make_code(&row.id, rack, side_token, &level.abbrev, &bay.abbrev);
                        let coordinates = CellCoordinates {
                            row: row.id.clone(),
                            rack,
                            side: side.name.clone(),
                            level: level.name.clone(),
                            bay: bay.name.clone(),
                        };
                        cells.push(Cell::empty(code, coordinates, Vec3::new(x, y, z)));
                    }
                }
            }
        }

        z_base += spacing.row_pitch;
    }

    Ok(cells)
}

fn signed_offset(index: usize, offset: f32) -> f32 {
    if index == 0 {
        -offset
    } else {
        offset
    }
}
