//! State enums shared between the control tasks and the status display.
//!
//! `RobotMode` is the match-phase mode delivered by the lifecycle hooks. It is
//! `#[repr(u8)]` so it packs into the atomic mode word together with the
//! epoch. `WinchState` and `ShooterState` are the published states of the
//! winch and firing state machines.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

// ─── Match Phase Mode ───────────────────────────────────────────────

/// Match-phase mode delivered by `on_mode_enter`.
///
/// Every transition resets all task state machines to Idle and clears
/// the pending-fire count.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum RobotMode {
    /// Robot disabled; every output neutral.
    #[default]
    Disabled = 0,
    /// Open-loop autonomous script.
    Autonomous = 1,
    /// Operator control.
    Teleop = 2,
    /// Mechanism test (drive held neutral).
    Test = 3,
}

impl RobotMode {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Disabled),
            1 => Some(Self::Autonomous),
            2 => Some(Self::Teleop),
            3 => Some(Self::Test),
            _ => None,
        }
    }

    /// Subsystems allowed to command actuators in this mode.
    #[inline]
    pub const fn enables(self) -> EnableFlags {
        match self {
            Self::Disabled => EnableFlags::empty(),
            Self::Autonomous => EnableFlags::DRIVE.union(EnableFlags::SHOOTER),
            Self::Teleop => EnableFlags::all(),
            Self::Test => EnableFlags::WINCH
                .union(EnableFlags::SHOOTER)
                .union(EnableFlags::OPERATOR_INPUT),
        }
    }

    /// Short upper-case label for the text display.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Disabled => "DISABLED",
            Self::Autonomous => "AUTO",
            Self::Teleop => "TELEOP",
            Self::Test => "TEST",
        }
    }
}

bitflags! {
    /// Mode-derived enable flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EnableFlags: u8 {
        /// Drive motors may be commanded.
        const DRIVE          = 0x01;
        /// Winch motor and release piston may be commanded.
        const WINCH          = 0x02;
        /// Firing motor and piston may be commanded.
        const SHOOTER        = 0x04;
        /// Operator buttons and axes are read.
        const OPERATOR_INPUT = 0x08;
    }
}

impl Default for EnableFlags {
    fn default() -> Self {
        Self::empty()
    }
}

// ─── Winch ──────────────────────────────────────────────────────────

/// Winch state machine state.
///
/// `Winding` implies a non-zero motor command and that the limit had not
/// tripped when winding began.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum WinchState {
    /// Motor stopped, waiting for a command edge.
    #[default]
    Idle = 0,
    /// Winding toward the limit.
    Winding = 1,
    /// Limit reached this tick; returns to Idle on the next tick.
    AtLimit = 2,
    /// Operator drives the winch past a tripped limit.
    ManualOverride = 3,
}

impl WinchState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Winding => "winding",
            Self::AtLimit => "at-limit",
            Self::ManualOverride => "manual",
        }
    }
}

// ─── Shooter ────────────────────────────────────────────────────────

/// Firing sequencer state.
///
/// `ManualOverride` is entered only while the pending-fire count is zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum ShooterState {
    /// Motor stopped, piston at rest.
    #[default]
    Idle = 0,
    /// Motor at full command before the pulse.
    SpinUp = 1,
    /// Piston forward.
    Firing = 2,
    /// Piston retracting after a pulse.
    Cooldown = 3,
    /// Motor and piston follow the manual trigger buttons.
    ManualOverride = 4,
}

impl ShooterState {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::SpinUp => "spin-up",
            Self::Firing => "firing",
            Self::Cooldown => "cooldown",
            Self::ManualOverride => "manual",
        }
    }
}
