//! Configuration loading for the control binary.
//!
//! 1. Parse the TOML document → `RobotConfig`
//! 2. Structural validation (ports, buttons, drive motor count)
//! 3. Clamp numeric values into range (each clamp is logged where it happens)

use robit_common::config::{ConfigError, ConfigLoader, RobotConfig};
use robit_common::control::config::ClampReport;
use std::path::Path;
use tracing::info;

/// A validated and clamped configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: RobotConfig,
    /// Fields that were out of range.
    pub clamped: ClampReport,
}

/// Load, validate and clamp the configuration at `path`.
pub fn load_config(path: &Path) -> Result<LoadedConfig, ConfigError> {
    let config = RobotConfig::load(path)?;
    let loaded = prepare(config)?;
    info!(
        path = %path.display(),
        service = %loaded.config.shared.service_name,
        clamped = loaded.clamped.fields.len(),
        "configuration loaded"
    );
    Ok(loaded)
}

/// Validate and clamp an already parsed configuration.
pub fn prepare(mut config: RobotConfig) -> Result<LoadedConfig, ConfigError> {
    config.validate()?;
    let clamped = config.clamp_to_valid();
    Ok(LoadedConfig { config, clamped })
}
