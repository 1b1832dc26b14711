//! I/O assignment (`[io]` section).
//!
//! Every port, channel, button and polarity used by the control tasks is
//! configuration. Robot revisions disagree on solenoid ports and on the
//! limit switch polarity, so nothing here has a privileged "correct" value;
//! the defaults only describe one wiring.
//!
//! # TOML Example
//!
//! ```toml
//! [io]
//! drive_motor_ports = [1, 2]
//! shooter_motor_port = 5
//!
//! [io.limit_switch]
//! channel = 1
//! polarity = "active_low"
//!
//! [io.buttons]
//! fire = 1
//! winch = 5
//! ```

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::consts::{JOYSTICK_AXES, JOYSTICK_BUTTONS};
use crate::hal::types::Polarity;

/// Forward/reverse channel pair of a double solenoid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SolenoidPair {
    pub forward: u8,
    pub reverse: u8,
}

/// Digital input channel with its polarity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DigitalInputConfig {
    pub channel: u8,
    #[serde(default)]
    pub polarity: Polarity,
}

/// Joystick axis channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AxisMap {
    /// Tank: left side.
    pub tank_left: u8,
    /// Tank: right side.
    pub tank_right: u8,
    /// Mecanum: strafe.
    pub strafe: u8,
    /// Mecanum: forward.
    pub forward: u8,
    /// Mecanum: twist.
    pub twist: u8,
    /// Stick axes report forward as negative.
    pub invert_forward: bool,
}

impl Default for AxisMap {
    fn default() -> Self {
        Self {
            tank_left: 2,
            tank_right: 4,
            strafe: 1,
            forward: 2,
            twist: 3,
            invert_forward: true,
        }
    }
}

/// Joystick button channels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ButtonMap {
    /// Queues one fire request per debounced press.
    pub fire: u8,
    /// Winch command (edge starts a wind).
    pub winch: u8,
    /// Winch override, held together with `winch` past a tripped limit.
    pub winch_override: u8,
    /// Winch release piston pulse.
    pub winch_release: u8,
    /// Shooter manual override enable.
    pub shooter_override: u8,
    /// Shooter manual motor trigger.
    pub shooter_motor: u8,
    /// Shooter manual piston trigger.
    pub shooter_piston: u8,
    /// Raise the tension setpoint by one step.
    pub setpoint_up: u8,
    /// Lower the tension setpoint by one step.
    pub setpoint_down: u8,
}

impl Default for ButtonMap {
    fn default() -> Self {
        Self {
            fire: 1,
            setpoint_down: 2,
            setpoint_up: 4,
            winch: 5,
            shooter_override: 6,
            shooter_motor: 7,
            shooter_piston: 8,
            winch_override: 9,
            winch_release: 10,
        }
    }
}

impl ButtonMap {
    fn entries(&self) -> [(&'static str, u8); 9] {
        [
            ("fire", self.fire),
            ("winch", self.winch),
            ("winch_override", self.winch_override),
            ("winch_release", self.winch_release),
            ("shooter_override", self.shooter_override),
            ("shooter_motor", self.shooter_motor),
            ("shooter_piston", self.shooter_piston),
            ("setpoint_up", self.setpoint_up),
            ("setpoint_down", self.setpoint_down),
        ]
    }
}

/// Complete I/O assignment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct IoConfig {
    pub joystick_port: u8,
    /// Drive motor ports in layout order.
    pub drive_motor_ports: Vec<u8>,
    pub winch_motor_port: u8,
    pub shooter_motor_port: u8,
    pub shooter_piston: SolenoidPair,
    pub winch_release: SolenoidPair,
    pub limit_switch: DigitalInputConfig,
    /// Analog channel of the winch tension (load cell) sensor.
    pub tension_channel: u8,
    pub axes: AxisMap,
    pub buttons: ButtonMap,
}

impl Default for IoConfig {
    fn default() -> Self {
        Self {
            joystick_port: 1,
            drive_motor_ports: vec![1, 2],
            winch_motor_port: 6,
            shooter_motor_port: 5,
            shooter_piston: SolenoidPair {
                forward: 1,
                reverse: 2,
            },
            winch_release: SolenoidPair {
                forward: 3,
                reverse: 4,
            },
            limit_switch: DigitalInputConfig {
                channel: 1,
                polarity: Polarity::ActiveLow,
            },
            tension_channel: 1,
            axes: AxisMap::default(),
            buttons: ButtonMap::default(),
        }
    }
}

impl IoConfig {
    /// Check the assignment for conflicts.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` if:
    /// - `drive_motor_ports` does not hold `expected_drive_motors` entries
    /// - two motors share a port
    /// - two solenoid channels collide
    /// - two buttons share a channel, or any button/axis is out of range
    pub fn validate(&self, expected_drive_motors: usize) -> Result<(), ConfigError> {
        if self.drive_motor_ports.len() != expected_drive_motors {
            return Err(ConfigError::ValidationError(format!(
                "drive layout needs {} motor ports, got {}",
                expected_drive_motors,
                self.drive_motor_ports.len()
            )));
        }

        let mut motors = HashSet::new();
        let all_motors = self
            .drive_motor_ports
            .iter()
            .copied()
            .chain([self.winch_motor_port, self.shooter_motor_port]);
        for port in all_motors {
            if port == 0 {
                return Err(ConfigError::ValidationError("motor port 0 is invalid".into()));
            }
            if !motors.insert(port) {
                return Err(ConfigError::ValidationError(format!(
                    "motor port {port} assigned twice"
                )));
            }
        }

        let mut solenoids = HashSet::new();
        for channel in [
            self.shooter_piston.forward,
            self.shooter_piston.reverse,
            self.winch_release.forward,
            self.winch_release.reverse,
        ] {
            if !solenoids.insert(channel) {
                return Err(ConfigError::ValidationError(format!(
                    "solenoid channel {channel} assigned twice"
                )));
            }
        }

        let mut buttons = HashSet::new();
        for (name, channel) in self.buttons.entries() {
            if channel == 0 || channel > JOYSTICK_BUTTONS {
                return Err(ConfigError::ValidationError(format!(
                    "button {name} channel {channel} out of range [1, {JOYSTICK_BUTTONS}]"
                )));
            }
            if !buttons.insert(channel) {
                return Err(ConfigError::ValidationError(format!(
                    "button channel {channel} ({name}) assigned twice"
                )));
            }
        }

        let axes = &self.axes;
        for channel in [axes.tank_left, axes.tank_right, axes.strafe, axes.forward, axes.twist] {
            if channel == 0 || channel > JOYSTICK_AXES {
                return Err(ConfigError::ValidationError(format!(
                    "axis channel {channel} out of range [1, {JOYSTICK_AXES}]"
                )));
            }
        }

        Ok(())
    }
}
