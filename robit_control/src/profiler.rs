//! Acceleration-limited motion profiling.
//!
//! A [`MotionProfiler`] moves its output toward the requested target by at
//! most `accel_limit · dt` per update and snaps onto the target once it is
//! within that budget. [`AxisProfiler`] owns one profiler per degree of
//! freedom and derives `dt` from successive tick timestamps, so the same
//! code serves the tank (left, right) and mecanum (x, y, z) layouts.
//!
//! ```text
//!  raw axis ──► dead_zone ──► shape_tank / mecanum ──► AxisProfiler ──► motors
//! ```

use robit_common::control::config::{DriveConfig, DriveSide};
use robit_common::hal::types::clamp_motor;
use std::time::Duration;

// ─── Input Conditioning ─────────────────────────────────────────────

/// Force `raw` to zero when its magnitude is below `threshold`.
#[inline]
pub fn dead_zone(raw: f64, threshold: f64) -> f64 {
    if raw.is_nan() || raw.abs() < threshold {
        0.0
    } else {
        clamp_motor(raw)
    }
}

/// Per-axis normalized targets, dead-zone filtered.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AxisCommand {
    /// Strafe.
    pub x: f64,
    /// Forward.
    pub y: f64,
    /// Twist.
    pub z: f64,
}

impl AxisCommand {
    /// Build a command from raw stick values.
    pub fn filtered(x: f64, y: f64, z: f64, threshold: f64) -> Self {
        Self {
            x: dead_zone(x, threshold),
            y: dead_zone(y, threshold),
            z: dead_zone(z, threshold),
        }
    }

    #[inline]
    pub const fn as_array(&self) -> [f64; 3] {
        [self.x, self.y, self.z]
    }
}

// ─── Single Axis ────────────────────────────────────────────────────

/// Rate limiter for one axis.
#[derive(Debug, Clone, Copy, Default)]
pub struct MotionProfiler {
    current: f64,
}

impl MotionProfiler {
    pub const fn new() -> Self {
        Self { current: 0.0 }
    }

    /// Last output.
    #[inline]
    pub const fn current(&self) -> f64 {
        self.current
    }

    /// Advance toward `target` over `dt` seconds.
    ///
    /// Non-positive or non-finite `dt` is a zero budget: the output only
    /// changes if it already equals the target.
    pub fn update(&mut self, target: f64, dt: f64, accel_limit: f64) -> f64 {
        let target = clamp_motor(target);
        let dt = if dt.is_finite() && dt > 0.0 { dt } else { 0.0 };
        let budget = if accel_limit.is_finite() {
            accel_limit.max(0.0) * dt
        } else {
            0.0
        };

        let delta = target - self.current;
        self.current = if delta.abs() > budget {
            clamp_motor(self.current + budget.copysign(delta))
        } else {
            target
        };
        self.current
    }

    #[inline]
    pub fn reset(&mut self) {
        self.current = 0.0;
    }
}

/// `N` rate-limited axes sharing one acceleration limit and one timebase.
#[derive(Debug, Clone)]
pub struct AxisProfiler<const N: usize> {
    axes: [MotionProfiler; N],
    accel_limit: f64,
    last_tick: Option<Duration>,
}

impl<const N: usize> AxisProfiler<N> {
    pub fn new(accel_limit: f64) -> Self {
        Self {
            axes: [MotionProfiler::new(); N],
            accel_limit,
            last_tick: None,
        }
    }

    /// Update every axis. The first call after construction or `reset`
    /// has `dt = 0`.
    pub fn update(&mut self, targets: [f64; N], now: Duration) -> [f64; N] {
        let dt = self
            .last_tick
            .map_or(0.0, |last| now.saturating_sub(last).as_secs_f64());
        self.last_tick = Some(now);

        let mut out = [0.0; N];
        for ((axis, target), slot) in self.axes.iter_mut().zip(targets).zip(out.iter_mut()) {
            *slot = axis.update(target, dt, self.accel_limit);
        }
        out
    }

    pub fn outputs(&self) -> [f64; N] {
        self.axes.map(|a| a.current())
    }

    /// Zero every axis and forget the last timestamp.
    pub fn reset(&mut self) {
        self.axes.iter_mut().for_each(MotionProfiler::reset);
        self.last_tick = None;
    }
}

// ─── Drive Shaping ──────────────────────────────────────────────────

/// Differential drive shaping parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TankShaping {
    /// Larger values reduce power less while turning.
    pub turn_reduction: f64,
    /// Fraction of `|left|` taken off `asymmetry_side`.
    pub asymmetry_factor: f64,
    pub asymmetry_side: DriveSide,
}

impl From<&DriveConfig> for TankShaping {
    fn from(config: &DriveConfig) -> Self {
        Self {
            turn_reduction: config.turn_reduction,
            asymmetry_factor: config.asymmetry_factor,
            asymmetry_side: config.asymmetry_side,
        }
    }
}

/// Reduce both sides while turning, then trim one side for mechanical skew.
pub fn shape_tank(left: f64, right: f64, shaping: &TankShaping) -> (f64, f64) {
    let (mut left, mut right) = (clamp_motor(left), clamp_motor(right));

    if shaping.turn_reduction > 0.0 {
        // Never more than the full side power, or the side reverses.
        let turn = ((left - right).abs() / shaping.turn_reduction).min(1.0);
        left -= left * turn;
        right -= right * turn;
    }

    let trim = (left * shaping.asymmetry_factor).abs();
    match shaping.asymmetry_side {
        DriveSide::Left => left -= left * trim,
        DriveSide::Right => right -= right * trim,
    }

    (clamp_motor(left), clamp_motor(right))
}

/// Mecanum wheel mix: `[front_left, front_right, back_left, back_right]`.
///
/// Scaled down uniformly so no wheel exceeds 1.
pub fn mecanum_mix(x: f64, y: f64, z: f64) -> [f64; 4] {
    let wheels = [y + x + z, y - x - z, y - x + z, y + x - z];
    let peak = wheels.iter().fold(1.0_f64, |acc, w| acc.max(w.abs()));
    wheels.map(|w| w / peak)
}
