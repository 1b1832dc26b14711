//! Configuration loading trait and the top-level robot configuration.
//!
//! This module provides a standardized way to load TOML configuration
//! files and the [`RobotConfig`] document read by the control binary.
//!
//! # Usage
//!
//! ```rust,no_run
//! use robit_common::config::{ConfigError, ConfigLoader, RobotConfig};
//! use std::path::Path;
//!
//! fn main() -> Result<(), ConfigError> {
//!     let mut config = RobotConfig::load(Path::new("config/robit.toml"))?;
//!     config.validate()?;
//!     let clamped = config.clamp_to_valid();
//!     println!("{} values clamped", clamped.fields.len());
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

use crate::control::config::{
    AutonomousConfig, ClampReport, DriveConfig, MatchConfig, SchedulerConfig, ShooterConfig,
    WinchConfig,
};
use crate::hal::config::SimulationConfig;
use crate::io::config::IoConfig;

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, detailed tracing information.
    Trace,
    /// Debug information useful during development.
    Debug,
    /// General information about application operation.
    #[default]
    Info,
    /// Warning messages for potentially problematic situations.
    Warn,
    /// Error messages for serious problems.
    Error,
}

impl LogLevel {
    /// Filter directive understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

/// Common configuration fields.
///
/// # TOML Example
///
/// ```toml
/// [shared]
/// log_level = "debug"
/// service_name = "robit-practice"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SharedConfig {
    /// Logging verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Robot instance identifier.
    pub service_name: String,
}

impl SharedConfig {
    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if `service_name` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.service_name.is_empty() {
            return Err(ConfigError::ValidationError(
                "service_name cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SharedConfig {
    fn default() -> Self {
        Self {
            log_level: LogLevel::Info,
            service_name: "robit".to_string(),
        }
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation: any serde-deserializable struct can be loaded.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}

/// Complete robot configuration document.
///
/// Only `[shared]` is required; every other section falls back to its
/// defaults. Unknown fields are rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RobotConfig {
    pub shared: SharedConfig,
    #[serde(default)]
    pub scheduler: SchedulerConfig,
    #[serde(default)]
    pub drive: DriveConfig,
    #[serde(default)]
    pub winch: WinchConfig,
    #[serde(default)]
    pub shooter: ShooterConfig,
    #[serde(default)]
    pub autonomous: AutonomousConfig,
    #[serde(default, rename = "match")]
    pub match_plan: MatchConfig,
    #[serde(default)]
    pub io: IoConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            shared: SharedConfig::default(),
            scheduler: SchedulerConfig::default(),
            drive: DriveConfig::default(),
            winch: WinchConfig::default(),
            shooter: ShooterConfig::default(),
            autonomous: AutonomousConfig::default(),
            match_plan: MatchConfig::default(),
            io: IoConfig::default(),
            simulation: SimulationConfig::default(),
        }
    }
}

impl RobotConfig {
    /// Parse a configuration document from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Structural validation: conditions that cannot be repaired by clamping.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.shared.validate()?;
        self.io.validate(self.drive.layout.motor_count())?;
        Ok(())
    }

    /// Clamp every numeric value into its valid range.
    pub fn clamp_to_valid(&mut self) -> ClampReport {
        let mut report = ClampReport::default();
        self.scheduler.clamp_to_valid(&mut report);
        self.drive.clamp_to_valid(&mut report);
        self.winch.clamp_to_valid(&mut report);
        self.shooter.clamp_to_valid(&mut report);
        self.autonomous.clamp_to_valid(&mut report);
        self.match_plan.clamp_to_valid(&mut report);
        report
    }
}
