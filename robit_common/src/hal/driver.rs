//! Hardware traits and error types.
//!
//! This module defines:
//! - `HalError` enum - Error types for hardware operations
//! - `MotorOutput`, `PistonOutput` - actuator traits, owned by exactly one task
//! - `AnalogSensor`, `DigitalSensor`, `Joystick` - sensor traits, shared by reference
//! - `TextDisplay` - operator status display
//!
//! Actuators take `&mut self` and only need `Send`: each handle is moved
//! into the single task allowed to command it. Sensors take `&self` and
//! are `Send + Sync` so several tasks may read them concurrently.

use crate::hal::types::PistonCommand;
use thiserror::Error;

/// Error types for hardware operations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HalError {
    /// Sensor could not be read; callers fall back to last-known or neutral.
    #[error("Sensor unavailable: {0}")]
    SensorUnavailable(String),

    /// Actuator refused a command; callers log and continue.
    #[error("Actuator command rejected: {0}")]
    ActuatorCommandRejected(String),

    /// Channel outside the device's addressable range.
    #[error("Invalid channel {channel} on {device}")]
    InvalidChannel {
        /// Device description.
        device: String,
        /// Requested 1-based channel.
        channel: u8,
    },

    /// Backend could not build the hardware context.
    #[error("Initialization failed: {0}")]
    InitFailed(String),
}

/// Speed controller accepting a signed normalized command.
pub trait MotorOutput: Send {
    /// Command the output. Values outside `[-1, 1]` are clamped by the caller.
    fn set(&mut self, value: f64) -> Result<(), HalError>;
}

/// Double solenoid.
pub trait PistonOutput: Send {
    /// Command the solenoid pair.
    fn set(&mut self, command: PistonCommand) -> Result<(), HalError>;
}

/// Analog input returning a voltage.
pub trait AnalogSensor: Send + Sync {
    /// Current reading [V].
    fn voltage(&self) -> Result<f64, HalError>;
}

/// Digital input returning the raw electrical level.
///
/// Polarity is applied by the caller from configuration.
pub trait DigitalSensor: Send + Sync {
    /// Raw level.
    fn raw(&self) -> Result<bool, HalError>;
}

/// Operator joystick addressed by 1-based channels.
pub trait Joystick: Send + Sync {
    /// Axis position in `[-1, 1]`.
    fn axis(&self, channel: u8) -> Result<f64, HalError>;

    /// Button state.
    fn button(&self, channel: u8) -> Result<bool, HalError>;
}

/// Line-indexed text display. Lines are staged with `set_line` and pushed
/// with one `flush` per tick.
pub trait TextDisplay: Send {
    /// Stage the text for a line.
    fn set_line(&mut self, line: usize, text: &str) -> Result<(), HalError>;

    /// Push staged lines to the display.
    fn flush(&mut self) -> Result<(), HalError>;
}
