//! Prelude module for common re-exports.
//!
//! ```rust
//! use robit_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{ConfigError, ConfigLoader, LogLevel, RobotConfig, SharedConfig};

// ─── Control State ──────────────────────────────────────────────────
pub use crate::control::error::TaskFault;
pub use crate::control::state::{EnableFlags, RobotMode, ShooterState, WinchState};

// ─── Hardware ───────────────────────────────────────────────────────
pub use crate::hal::context::{
    DriveHardware, HardwareContext, SensorBank, ShooterHardware, WinchHardware,
};
pub use crate::hal::driver::{
    AnalogSensor, DigitalSensor, HalError, Joystick, MotorOutput, PistonOutput, TextDisplay,
};
pub use crate::hal::types::{PistonCommand, Polarity};
