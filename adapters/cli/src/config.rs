//! TOML configuration shared by every subcommand.

use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use warehouse_grid_system_camera::CameraConfig;
use warehouse_grid_system_highlight::FlashConfig;
use warehouse_grid_world::WarehouseDescription;

/// Admin token the CLI compares presented tokens against.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub(crate) struct AuthConfig {
    /// Expected token; when absent any non-blank token is accepted.
    pub(crate) token: Option<String>,
}

/// Complete application configuration. Every table is optional.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct AppConfig {
    pub(crate) warehouse: WarehouseDescription,
    pub(crate) camera: CameraConfig,
    pub(crate) flash: FlashConfig,
    pub(crate) auth: AuthConfig,
}

impl AppConfig {
    /// Reads the configuration at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Self = toml::from_str(&raw)
            .with_context(|| format!("failed to parse config {}", path.display()))?;
        config
            .warehouse
            .validate()
            .with_context(|| format!("invalid warehouse in {}", path.display()))?;
        tracing::debug!(path = %path.display(), cells = config.warehouse.cell_count(), "loaded config");
        Ok(config)
    }
}
