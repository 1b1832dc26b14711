//! Hardware value types.

use serde::{Deserialize, Serialize};

/// Double-solenoid piston command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum PistonCommand {
    /// Both coils off; piston floats. Power-on state of a solenoid pair.
    #[default]
    Off = 0,
    /// Extend.
    Forward = 1,
    /// Retract (rest position).
    Reverse = 2,
}

impl PistonCommand {
    /// Resting command for firing and release pistons.
    pub const REST: Self = Self::Reverse;

    pub const fn label(self) -> &'static str {
        match self {
            Self::Off => "off",
            Self::Forward => "fwd",
            Self::Reverse => "rev",
        }
    }
}

/// Electrical polarity of a digital input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Polarity {
    /// High level means active.
    #[default]
    ActiveHigh,
    /// Low level means active (normally-closed switch wired to pull-up).
    ActiveLow,
}

impl Polarity {
    /// Interpret a raw level read from the input.
    #[inline]
    pub const fn is_active(self, raw: bool) -> bool {
        match self {
            Self::ActiveHigh => raw,
            Self::ActiveLow => !raw,
        }
    }
}

/// Clamp a motor command into `[-1, 1]`. NaN maps to neutral.
#[inline]
pub fn clamp_motor(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(-1.0, 1.0)
    }
}
