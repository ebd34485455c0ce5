#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Time-bounded pulsing highlight applied to cells' render scale.

use std::{f32::consts::TAU, time::Duration};

use serde::Deserialize;
use warehouse_grid_core::{CellCode, CellIndex};
use warehouse_grid_world::{query, Warehouse};

/// Tunable flash behaviour.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct FlashConfig {
    /// Lifetime of a single flash in milliseconds.
    pub duration_ms: u64,
    /// Pulses per second.
    pub frequency_hz: f32,
    /// Peak scale added on top of the neutral scale.
    pub amplitude: f32,
}

impl Default for FlashConfig {
    fn default() -> Self {
        Self {
            duration_ms: 1_200,
            frequency_hz: 4.0,
            amplitude: 0.35,
        }
    }
}

impl FlashConfig {
    /// Lifetime of a single flash.
    #[must_use]
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Scale of a flash `elapsed` after it started, or `None` once it expired.
    #[must_use]
    pub fn pulse_scale(&self, elapsed: Duration) -> Option<f32> {
        if elapsed >= self.duration() {
            return None;
        }
        let phase = (elapsed.as_secs_f32() * self.frequency_hz * TAU).sin();
        Some(warehouse_grid_world::NEUTRAL_SCALE + self.amplitude * phase.abs())
    }
}

/// Active highlight on a single cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FlashEntry {
    /// Arena index of the highlighted cell.
    pub index: CellIndex,
    /// Timestamp the flash started at.
    pub start: Duration,
}

/// Controller owning the set of active flashes.
#[derive(Clone, Debug, Default)]
pub struct FlashController {
    config: FlashConfig,
    entries: Vec<FlashEntry>,
}

impl FlashController {
    /// Creates a controller with no active flashes.
    #[must_use]
    pub fn new(config: FlashConfig) -> Self {
        Self {
            config,
            entries: Vec::new(),
        }
    }

    /// Active flashes in the order they were requested.
    #[must_use]
    pub fn entries(&self) -> &[FlashEntry] {
        &self.entries
    }

    /// Reports whether a flash is active on the provided cell.
    #[must_use]
    pub fn is_flashing(&self, index: CellIndex) -> bool {
        self.entries.iter().any(|entry| entry.index == index)
    }

    /// Replaces the active set with exactly the provided codes.
    ///
    /// Previous flashes are abandoned and their cells return to neutral
    /// scale. Unknown codes are skipped.
    pub fn flash<'a>(
        &mut self,
        warehouse: &mut Warehouse,
        codes: impl IntoIterator<Item = &'a CellCode>,
        now: Duration,
    ) {
        for entry in self.entries.drain(..) {
            if let Some(handle) = warehouse.handle_mut(entry.index) {
                handle.reset();
            }
        }

        for code in codes {
            let Some(index) = query::index_of(warehouse, code.as_str()) else {
                tracing::debug!(code = %code, "skipping flash for unknown cell");
                continue;
            };
            if self.is_flashing(index) {
                continue;
            }
            if let Some(handle) = warehouse.handle_mut(index) {
                handle.reset();
            }
            self.entries.push(FlashEntry { index, start: now });
        }
    }

    /// Advances every active flash to `now`, expiring the finished ones.
    pub fn update(&mut self, warehouse: &mut Warehouse, now: Duration) {
        let config = self.config;
        self.entries.retain(|entry| {
            let Some(handle) = warehouse.handle_mut(entry.index) else {
                return false;
            };
            match config.pulse_scale(now.saturating_sub(entry.start)) {
                Some(scale) => {
                    handle.set_scale(scale);
                    true
                }
                None => {
                    handle.reset();
                    false
                }
            }
        });
    }
}
