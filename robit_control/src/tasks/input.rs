//! Input task: fire requests, setpoint adjustment and the status display.

use robit_common::control::config::{ShooterConfig, WinchConfig};
use robit_common::control::state::{EnableFlags, RobotMode};
use robit_common::hal::driver::TextDisplay;
use robit_common::io::config::ButtonMap;
use std::time::Duration;
use tracing::{debug, info};

use super::button_or_released;
use crate::debounce::{Debouncer, EdgeDetector};
use crate::error::TaskError;
use crate::registers::TaskId;
use crate::status::StatusPage;
use crate::task::{ControlTask, TickContext};

/// Setpoint adjustment bounds.
#[derive(Debug, Clone, Copy, PartialEq)]
struct SetpointRange {
    step: f64,
    min: f64,
    max: f64,
}

pub struct InputTask<'hw> {
    display: &'hw mut dyn TextDisplay,
    buttons: ButtonMap,
    fire: Debouncer,
    up: EdgeDetector,
    down: EdgeDetector,
    range: SetpointRange,
}

impl<'hw> InputTask<'hw> {
    pub fn new(
        display: &'hw mut dyn TextDisplay,
        buttons: ButtonMap,
        shooter: &ShooterConfig,
        winch: &WinchConfig,
    ) -> Self {
        Self {
            display,
            buttons,
            fire: Debouncer::new(shooter.debounce()),
            up: EdgeDetector::new(),
            down: EdgeDetector::new(),
            range: SetpointRange {
                step: winch.setpoint_step,
                min: winch.setpoint_min,
                max: winch.setpoint_max,
            },
        }
    }

    fn poll_operator(&mut self, ctx: &TickContext<'_>) {
        let stick = ctx.sensors.joystick.as_ref();
        let degrade = |e: &_| ctx.degrade(e);

        let fire = button_or_released(stick, self.buttons.fire, degrade);
        if self.fire.update(fire, ctx.now) {
            match ctx.shared.fire.request_fire_in(ctx.mode.epoch) {
                Some(pending) => debug!(pending, "fire requested"),
                None => debug!("fire request dropped, mode changed"),
            }
        }

        let up = self.up.rising(button_or_released(stick, self.buttons.setpoint_up, degrade));
        let down = self
            .down
            .rising(button_or_released(stick, self.buttons.setpoint_down, degrade));
        let delta = match (up, down) {
            (true, false) => self.range.step,
            (false, true) => -self.range.step,
            _ => return,
        };

        let current = ctx.shared.setpoint.get();
        let next = (current + delta).clamp(self.range.min, self.range.max);
        if next != current {
            ctx.shared.setpoint.set(next);
            info!(setpoint = next, "tension setpoint adjusted");
        }
    }
}

impl ControlTask for InputTask<'_> {
    const ID: TaskId = TaskId::Input;

    fn tick(&mut self, ctx: &TickContext<'_>) -> Result<(), TaskError> {
        if ctx.enabled(EnableFlags::OPERATOR_INPUT) {
            self.poll_operator(ctx);
        }

        if let Err(e) = StatusPage::render(ctx.shared).push(self.display) {
            ctx.degrade(&e);
        }
        Ok(())
    }

    /// Button levels survive the transition: a trigger held into the new
    /// mode is not a press.
    fn enter_mode(&mut self, _mode: RobotMode, _now: Duration) -> Result<(), TaskError> {
        self.fire.reset();
        Ok(())
    }

    /// The input task owns no actuators.
    fn make_safe(&mut self) -> Result<(), TaskError> {
        Ok(())
    }
}
