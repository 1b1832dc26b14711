//! Per-subsystem tuning loaded from the `[scheduler]`, `[drive]`, `[winch]`,
//! `[shooter]`, `[autonomous]` and `[match]` sections.
//!
//! Numeric values outside their valid range are clamped to the nearest
//! valid value rather than rejected; every clamp is logged and recorded in
//! a [`ClampReport`].

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

use super::state::RobotMode;
use crate::consts::{
    DEFAULT_TASK_PERIOD_MS, MAX_FIRE_BURST, MAX_TASK_PERIOD_MS, MIN_FIRE_DEBOUNCE_MS,
    MIN_TASK_PERIOD_MS,
};

// ─── Clamp Report ───────────────────────────────────────────────────

/// Fields that were clamped during [`RobotConfig::clamp_to_valid`](crate::config::RobotConfig::clamp_to_valid).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClampReport {
    /// Dotted field paths, e.g. `drive.dead_zone`.
    pub fields: Vec<&'static str>,
}

impl ClampReport {
    /// Clamp a float into `[min, max]`. NaN clamps to `min`.
    pub fn clamp_f64(&mut self, field: &'static str, value: &mut f64, min: f64, max: f64) {
        let clamped = if value.is_nan() { min } else { value.clamp(min, max) };
        if clamped != *value {
            warn!(field, from = *value, to = clamped, "config value out of range, clamped");
            *value = clamped;
            self.fields.push(field);
        }
    }

    /// Clamp an integer into `[min, max]`.
    pub fn clamp_u64(&mut self, field: &'static str, value: &mut u64, min: u64, max: u64) {
        let clamped = (*value).clamp(min, max);
        if clamped != *value {
            warn!(field, from = *value, to = clamped, "config value out of range, clamped");
            *value = clamped;
            self.fields.push(field);
        }
    }

    /// Whether nothing was clamped.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

// ─── Scheduler ──────────────────────────────────────────────────────

/// Periods of the four control tasks.
///
/// # TOML Example
///
/// ```toml
/// [scheduler]
/// drive_period_ms = 10
/// input_period_ms = 20
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SchedulerConfig {
    pub drive_period_ms: u64,
    pub input_period_ms: u64,
    pub winch_period_ms: u64,
    pub shooter_period_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            drive_period_ms: DEFAULT_TASK_PERIOD_MS,
            input_period_ms: 20,
            winch_period_ms: DEFAULT_TASK_PERIOD_MS,
            shooter_period_ms: DEFAULT_TASK_PERIOD_MS,
        }
    }
}

impl SchedulerConfig {
    pub fn clamp_to_valid(&mut self, report: &mut ClampReport) {
        let (min, max) = (MIN_TASK_PERIOD_MS, MAX_TASK_PERIOD_MS);
        report.clamp_u64("scheduler.drive_period_ms", &mut self.drive_period_ms, min, max);
        report.clamp_u64("scheduler.input_period_ms", &mut self.input_period_ms, min, max);
        report.clamp_u64("scheduler.winch_period_ms", &mut self.winch_period_ms, min, max);
        report.clamp_u64("scheduler.shooter_period_ms", &mut self.shooter_period_ms, min, max);
    }

    pub fn drive_period(&self) -> Duration {
        Duration::from_millis(self.drive_period_ms)
    }

    pub fn input_period(&self) -> Duration {
        Duration::from_millis(self.input_period_ms)
    }

    pub fn winch_period(&self) -> Duration {
        Duration::from_millis(self.winch_period_ms)
    }

    pub fn shooter_period(&self) -> Duration {
        Duration::from_millis(self.shooter_period_ms)
    }
}

// ─── Drive ──────────────────────────────────────────────────────────

/// Drivetrain geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DriveLayout {
    /// Two sides, one stick axis each. Motor ports: `[left, right]`.
    #[default]
    Tank,
    /// Four wheels driven from x/y/twist. Motor ports:
    /// `[front_left, front_right, back_left, back_right]`.
    Mecanum,
}

impl DriveLayout {
    /// Number of drive motors the layout needs.
    pub const fn motor_count(self) -> usize {
        match self {
            Self::Tank => 2,
            Self::Mecanum => 4,
        }
    }
}

/// Side that receives the asymmetry compensation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DriveSide {
    Left,
    #[default]
    Right,
}

/// Motion profiling and drive shaping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct DriveConfig {
    pub layout: DriveLayout,
    /// Stick magnitude below which an axis reads as zero.
    pub dead_zone: f64,
    /// Maximum change of any axis command per second [units/s].
    pub accel_limit: f64,
    /// Divisor for the turn power reduction `|left - right| / turn_reduction`.
    /// At least 2 so the reduction never exceeds the full side power.
    pub turn_reduction: f64,
    /// Skew compensation factor applied to `asymmetry_side`.
    pub asymmetry_factor: f64,
    pub asymmetry_side: DriveSide,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            layout: DriveLayout::Tank,
            dead_zone: 0.1,
            accel_limit: 38.334,
            turn_reduction: 4.0,
            asymmetry_factor: 0.0,
            asymmetry_side: DriveSide::Right,
        }
    }
}

impl DriveConfig {
    pub fn clamp_to_valid(&mut self, report: &mut ClampReport) {
        report.clamp_f64("drive.dead_zone", &mut self.dead_zone, 0.0, 0.95);
        report.clamp_f64("drive.accel_limit", &mut self.accel_limit, 0.1, 1000.0);
        report.clamp_f64("drive.turn_reduction", &mut self.turn_reduction, 2.0, 100.0);
        report.clamp_f64("drive.asymmetry_factor", &mut self.asymmetry_factor, 0.0, 1.0);
    }
}

// ─── Winch ──────────────────────────────────────────────────────────

/// How the winch decides it has reached tension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum WinchSensing {
    /// End-of-travel limit switch.
    #[default]
    LimitSwitch,
    /// Analog tension reading compared against the tension setpoint.
    Threshold,
}

/// Winch state machine and release piston tuning.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct WinchConfig {
    pub sensing: WinchSensing,
    /// Motor command while winding.
    pub wind_power: f64,
    /// Motor command while the manual override is held.
    pub manual_power: f64,
    /// Initial tension setpoint [V].
    pub tension_setpoint: f64,
    /// Setpoint change per operator button edge [V].
    pub setpoint_step: f64,
    pub setpoint_min: f64,
    pub setpoint_max: f64,
    /// Upper bound on a single wind [ms].
    pub max_wind_ms: u64,
    /// Release piston forward time [ms].
    pub release_pulse_ms: u64,
}

impl Default for WinchConfig {
    fn default() -> Self {
        Self {
            sensing: WinchSensing::LimitSwitch,
            wind_power: 1.0,
            manual_power: 0.5,
            tension_setpoint: 2.5,
            setpoint_step: 0.1,
            setpoint_min: 0.0,
            setpoint_max: 5.0,
            max_wind_ms: 5000,
            release_pulse_ms: 500,
        }
    }
}

impl WinchConfig {
    pub fn clamp_to_valid(&mut self, report: &mut ClampReport) {
        report.clamp_f64("winch.wind_power", &mut self.wind_power, 0.05, 1.0);
        report.clamp_f64("winch.manual_power", &mut self.manual_power, -1.0, 1.0);
        report.clamp_f64("winch.setpoint_min", &mut self.setpoint_min, 0.0, 5.0);
        report.clamp_f64("winch.setpoint_max", &mut self.setpoint_max, self.setpoint_min, 5.0);
        report.clamp_f64(
            "winch.tension_setpoint",
            &mut self.tension_setpoint,
            self.setpoint_min,
            self.setpoint_max,
        );
        report.clamp_f64("winch.setpoint_step", &mut self.setpoint_step, 0.0, 5.0);
        report.clamp_u64("winch.max_wind_ms", &mut self.max_wind_ms, 100, 60_000);
        report.clamp_u64("winch.release_pulse_ms", &mut self.release_pulse_ms, 0, 5_000);
    }

    pub fn max_wind(&self) -> Duration {
        Duration::from_millis(self.max_wind_ms)
    }

    pub fn release_pulse(&self) -> Duration {
        Duration::from_millis(self.release_pulse_ms)
    }
}

// ─── Shooter ────────────────────────────────────────────────────────

/// Firing sequence timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ShooterConfig {
    pub spin_up_ms: u64,
    pub pulse_ms: u64,
    /// Piston retract time after a pulse [ms].
    pub retract_ms: u64,
    pub motor_power: f64,
    pub manual_motor_power: f64,
    /// Minimum time between two accepted fire button presses [ms].
    pub debounce_ms: u64,
}

impl Default for ShooterConfig {
    fn default() -> Self {
        Self {
            spin_up_ms: 2750,
            pulse_ms: 750,
            retract_ms: 250,
            motor_power: 1.0,
            manual_motor_power: 1.0,
            debounce_ms: MIN_FIRE_DEBOUNCE_MS,
        }
    }
}

impl ShooterConfig {
    pub fn clamp_to_valid(&mut self, report: &mut ClampReport) {
        report.clamp_u64("shooter.spin_up_ms", &mut self.spin_up_ms, 0, 10_000);
        report.clamp_u64("shooter.pulse_ms", &mut self.pulse_ms, 0, 5_000);
        report.clamp_u64("shooter.retract_ms", &mut self.retract_ms, 0, 5_000);
        report.clamp_f64("shooter.motor_power", &mut self.motor_power, -1.0, 1.0);
        report.clamp_f64("shooter.manual_motor_power", &mut self.manual_motor_power, -1.0, 1.0);
        report.clamp_u64(
            "shooter.debounce_ms",
            &mut self.debounce_ms,
            MIN_FIRE_DEBOUNCE_MS,
            10_000,
        );
    }

    pub fn spin_up(&self) -> Duration {
        Duration::from_millis(self.spin_up_ms)
    }

    pub fn pulse(&self) -> Duration {
        Duration::from_millis(self.pulse_ms)
    }

    pub fn retract(&self) -> Duration {
        Duration::from_millis(self.retract_ms)
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// ─── Autonomous ─────────────────────────────────────────────────────

/// Open-loop script run exactly once at Autonomous entry.
///
/// # TOML Example
///
/// ```toml
/// [autonomous.script]
/// kind = "drive_then_fire"
/// power = 0.5
/// duration_ms = 2000
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum AutonomousScript {
    /// Do nothing.
    #[default]
    Idle,
    /// Queue `count` fire requests.
    FireBurst { count: u32 },
    /// Drive forward at `power` for `duration_ms`, stop, fire once.
    DriveThenFire { power: f64, duration_ms: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AutonomousConfig {
    pub script: AutonomousScript,
}

impl AutonomousConfig {
    pub fn clamp_to_valid(&mut self, report: &mut ClampReport) {
        match &mut self.script {
            AutonomousScript::Idle => {}
            AutonomousScript::FireBurst { count } => {
                let mut wide = u64::from(*count);
                report.clamp_u64("autonomous.script.count", &mut wide, 0, u64::from(MAX_FIRE_BURST));
                *count = wide as u32;
            }
            AutonomousScript::DriveThenFire { power, duration_ms } => {
                report.clamp_f64("autonomous.script.power", power, -1.0, 1.0);
                report.clamp_u64("autonomous.script.duration_ms", duration_ms, 0, 15_000);
            }
        }
    }
}

// ─── Match Plan ─────────────────────────────────────────────────────

/// One phase of the match plan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MatchPhase {
    pub mode: RobotMode,
    pub duration_s: f64,
}

/// Ordered match phases entered by the binary.
///
/// # TOML Example
///
/// ```toml
/// [[match.phases]]
/// mode = "autonomous"
/// duration_s = 10.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct MatchConfig {
    pub phases: Vec<MatchPhase>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            phases: vec![
                MatchPhase {
                    mode: RobotMode::Autonomous,
                    duration_s: 10.0,
                },
                MatchPhase {
                    mode: RobotMode::Teleop,
                    duration_s: 140.0,
                },
            ],
        }
    }
}

impl MatchConfig {
    pub fn clamp_to_valid(&mut self, report: &mut ClampReport) {
        for phase in &mut self.phases {
            report.clamp_f64("match.phases.duration_s", &mut phase.duration_s, 0.0, 3600.0);
        }
    }
}
