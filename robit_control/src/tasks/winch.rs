//! Winch task: wind state machine, limit sensing and the release pulse.

use robit_common::control::config::{WinchConfig, WinchSensing};
use robit_common::control::state::{EnableFlags, RobotMode};
use robit_common::hal::context::WinchHardware;
use robit_common::hal::types::Polarity;
use robit_common::io::config::ButtonMap;
use std::time::Duration;
use tracing::info;

use super::button_or_released;
use crate::debounce::EdgeDetector;
use crate::error::TaskError;
use crate::registers::{TaskId, WinchStatus};
use crate::task::{ControlTask, TickContext};
use crate::winch::{ReleasePulse, WinchController, WinchParams};

pub struct WinchTask<'hw> {
    hw: &'hw mut WinchHardware,
    controller: WinchController,
    sensing: WinchSensing,
    polarity: Polarity,
    buttons: ButtonMap,
    max_wind: Duration,
    release_pulse: Duration,
    release_edge: EdgeDetector,
    last_tension: Option<f64>,
    releases: u32,
}

impl<'hw> WinchTask<'hw> {
    pub fn new(
        hw: &'hw mut WinchHardware,
        config: &WinchConfig,
        polarity: Polarity,
        buttons: ButtonMap,
    ) -> Self {
        Self {
            hw,
            controller: WinchController::new(WinchParams::from(config)),
            sensing: config.sensing,
            polarity,
            buttons,
            max_wind: config.max_wind(),
            release_pulse: config.release_pulse(),
            release_edge: EdgeDetector::new(),
            last_tension: None,
            releases: 0,
        }
    }

    fn read_tension(&mut self, ctx: &TickContext<'_>, report: bool) -> Option<f64> {
        match ctx.sensors.tension.voltage() {
            Ok(volts) => {
                self.last_tension = Some(volts);
            }
            Err(e) if report => ctx.degrade(&e),
            Err(_) => {}
        }
        self.last_tension
    }

    /// Limit state for this tick. Unreadable sensors count as tripped,
    /// except that threshold sensing first falls back to the last reading.
    fn limit_tripped(&mut self, ctx: &TickContext<'_>) -> bool {
        match self.sensing {
            WinchSensing::LimitSwitch => {
                self.read_tension(ctx, false);
                match ctx.sensors.limit_switch.raw() {
                    Ok(raw) => self.polarity.is_active(raw),
                    Err(e) => {
                        ctx.degrade(&e);
                        true
                    }
                }
            }
            WinchSensing::Threshold => {
                let setpoint = ctx.shared.setpoint.get();
                self.read_tension(ctx, true)
                    .is_none_or(|volts| volts >= setpoint)
            }
        }
    }

    /// Stop the motor and hold the release piston Forward for the pulse
    /// duration. The piston returns to rest on every exit path.
    fn release(&mut self, ctx: &TickContext<'_>) -> Result<(), TaskError> {
        self.hw.motor.set(0.0)?;
        self.controller.reset();
        self.releases += 1;
        info!(pulse_ms = self.release_pulse.as_millis() as u64, "winch release");

        let _pulse = ReleasePulse::begin(self.hw.release.as_mut())?;
        let cancel = ctx.cancel_token();
        if !ctx.wait_until(ctx.now + self.release_pulse, &cancel) {
            info!("winch release interrupted");
        }
        Ok(())
    }

    fn publish(&self, ctx: &TickContext<'_>, motor: f64, limit_tripped: bool) {
        ctx.shared.winch.write(WinchStatus {
            state: self.controller.state(),
            motor,
            tension: self.last_tension,
            limit_tripped,
            releases: self.releases,
        });
    }
}

impl ControlTask for WinchTask<'_> {
    const ID: TaskId = TaskId::Winch;

    fn tick(&mut self, ctx: &TickContext<'_>) -> Result<(), TaskError> {
        if !ctx.enabled(EnableFlags::WINCH) {
            self.read_tension(ctx, false);
            self.publish(ctx, 0.0, false);
            return self.make_safe();
        }

        let stick = ctx.sensors.joystick.as_ref();
        let degrade = |e: &_| ctx.degrade(e);
        let command = button_or_released(stick, self.buttons.winch, degrade);
        let override_held = button_or_released(stick, self.buttons.winch_override, degrade);
        let release = button_or_released(stick, self.buttons.winch_release, degrade);

        if self.release_edge.rising(release) {
            let result = self.release(ctx);
            self.publish(ctx, 0.0, false);
            return result;
        }

        self.controller.on_command_edge(command);
        self.controller.set_override(override_held);
        let limit_tripped = self.limit_tripped(ctx);
        let motor = self.controller.tick(limit_tripped, ctx.now);
        self.publish(ctx, motor, limit_tripped);
        self.hw.motor.set(motor)?;

        if self.controller.take_timeout() {
            return Err(TaskError::WindTimeout(self.max_wind));
        }
        Ok(())
    }

    fn enter_mode(&mut self, _mode: RobotMode, _now: Duration) -> Result<(), TaskError> {
        // Button levels survive the transition: a held release button
        // needs a fresh press.
        self.controller.reset();
        self.make_safe()
    }

    fn make_safe(&mut self) -> Result<(), TaskError> {
        self.hw.neutral().map_err(TaskError::from)
    }
}
