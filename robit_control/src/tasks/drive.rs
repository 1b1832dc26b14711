//! Drive task: joystick or autonomous targets through the motion profiler.

use robit_common::control::config::{AutonomousScript, DriveConfig, DriveLayout};
use robit_common::control::state::{EnableFlags, RobotMode};
use robit_common::hal::context::DriveHardware;
use robit_common::hal::driver::HalError;
use robit_common::hal::types::clamp_motor;
use robit_common::io::config::AxisMap;
use std::time::Duration;
use tracing::info;

use crate::error::TaskError;
use crate::profiler::{AxisCommand, AxisProfiler, TankShaping, dead_zone, mecanum_mix, shape_tank};
use crate::registers::{DriveStatus, TaskId};
use crate::task::{ControlTask, TickContext};

/// Timed autonomous drive.
#[derive(Debug, Clone, Copy)]
struct AutoDrive {
    power: f64,
    until: Duration,
    fire_requested: bool,
}

pub struct DriveTask<'hw> {
    hw: &'hw mut DriveHardware,
    config: DriveConfig,
    axes: AxisMap,
    shaping: TankShaping,
    tank: AxisProfiler<2>,
    mecanum: AxisProfiler<3>,
    script: AutonomousScript,
    auto: Option<AutoDrive>,
}

impl<'hw> DriveTask<'hw> {
    pub fn new(
        hw: &'hw mut DriveHardware,
        config: &DriveConfig,
        axes: AxisMap,
        script: AutonomousScript,
    ) -> Self {
        Self {
            hw,
            shaping: TankShaping::from(config),
            tank: AxisProfiler::new(config.accel_limit),
            mecanum: AxisProfiler::new(config.accel_limit),
            config: config.clone(),
            axes,
            script,
            auto: None,
        }
    }

    fn command(&mut self, outputs: &[f64]) -> Result<(), TaskError> {
        let mut first = Ok(());
        for (motor, &value) in self.hw.motors.iter_mut().zip(outputs) {
            if let Err(e) = motor.set(clamp_motor(value)) {
                first = first.and(Err(e));
            }
        }
        first.map_err(TaskError::from)
    }

    fn publish(ctx: &TickContext<'_>, outputs: &[f64]) {
        let mut status = DriveStatus::default();
        // Outputs never exceed the four mecanum wheels.
        let _ = status.outputs.extend_from_slice(outputs);
        ctx.shared.drive.write(status);
    }

    /// Operator stick targets in profiler axis order.
    fn operator_targets(&self, ctx: &TickContext<'_>) -> Result<[f64; 3], HalError> {
        let stick = ctx.sensors.joystick.as_ref();
        let sign = if self.axes.invert_forward { -1.0 } else { 1.0 };
        let dz = self.config.dead_zone;
        Ok(match self.config.layout {
            DriveLayout::Tank => [
                dead_zone(sign * stick.axis(self.axes.tank_left)?, dz),
                dead_zone(sign * stick.axis(self.axes.tank_right)?, dz),
                0.0,
            ],
            DriveLayout::Mecanum => AxisCommand::filtered(
                stick.axis(self.axes.strafe)?,
                sign * stick.axis(self.axes.forward)?,
                stick.axis(self.axes.twist)?,
                dz,
            )
            .as_array(),
        })
    }

    /// Autonomous targets: forward at `power` until the deadline, then stop
    /// and request one fire.
    fn autonomous_targets(&mut self, ctx: &TickContext<'_>) -> [f64; 3] {
        let Some(auto) = self.auto.as_mut() else {
            return [0.0; 3];
        };
        if ctx.now < auto.until {
            return match self.config.layout {
                DriveLayout::Tank => [auto.power, auto.power, 0.0],
                DriveLayout::Mecanum => [0.0, auto.power, 0.0],
            };
        }
        if !auto.fire_requested {
            auto.fire_requested = true;
            if let Some(pending) = ctx.shared.fire.request_fire_in(ctx.mode.epoch) {
                info!(pending, "autonomous drive complete, fire requested");
            }
        }
        [0.0; 3]
    }

    fn profile(&mut self, targets: [f64; 3], now: Duration) -> heapless::Vec<f64, 4> {
        let mut out = heapless::Vec::new();
        match self.config.layout {
            DriveLayout::Tank => {
                let (left, right) = shape_tank(targets[0], targets[1], &self.shaping);
                let _ = out.extend_from_slice(&self.tank.update([left, right], now));
            }
            DriveLayout::Mecanum => {
                let [x, y, z] = self.mecanum.update(targets, now);
                let _ = out.extend_from_slice(&mecanum_mix(x, y, z));
            }
        }
        out
    }
}

impl ControlTask for DriveTask<'_> {
    const ID: TaskId = TaskId::Drive;

    fn tick(&mut self, ctx: &TickContext<'_>) -> Result<(), TaskError> {
        if !ctx.enabled(EnableFlags::DRIVE) {
            self.make_safe()?;
            Self::publish(ctx, &[0.0; 4][..self.hw.motors.len().min(4)]);
            return Ok(());
        }

        let targets = if ctx.mode.mode == RobotMode::Autonomous {
            self.autonomous_targets(ctx)
        } else {
            self.operator_targets(ctx).unwrap_or_else(|e| {
                ctx.degrade(&e);
                [0.0; 3]
            })
        };

        let outputs = self.profile(targets, ctx.now);
        Self::publish(ctx, &outputs);
        self.command(&outputs)
    }

    fn enter_mode(&mut self, mode: RobotMode, now: Duration) -> Result<(), TaskError> {
        self.tank.reset();
        self.mecanum.reset();
        self.auto = None;
        if mode == RobotMode::Autonomous {
            if let AutonomousScript::DriveThenFire { power, duration_ms } = self.script {
                info!(power, duration_ms, "autonomous drive started");
                self.auto = Some(AutoDrive {
                    power,
                    until: now + Duration::from_millis(duration_ms),
                    fire_requested: false,
                });
            }
        }
        self.make_safe()
    }

    fn make_safe(&mut self) -> Result<(), TaskError> {
        self.tank.reset();
        self.mecanum.reset();
        self.hw.neutral().map_err(TaskError::from)
    }
}
