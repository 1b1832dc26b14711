//! Shooter task: drives the firing sequencer from the shared fire queue.

use robit_common::control::config::ShooterConfig;
use robit_common::control::state::{EnableFlags, RobotMode};
use robit_common::hal::context::ShooterHardware;
use robit_common::io::config::ButtonMap;
use std::time::Duration;

use super::button_or_released;
use crate::error::TaskError;
use crate::registers::{ShooterStatus, TaskId};
use crate::shooter::{FiringSequencer, ManualInputs, SequencerParams, ShooterCommand};
use crate::task::{ControlTask, TickContext};

pub struct ShooterTask<'hw> {
    hw: &'hw mut ShooterHardware,
    sequencer: FiringSequencer,
    buttons: ButtonMap,
}

impl<'hw> ShooterTask<'hw> {
    pub fn new(hw: &'hw mut ShooterHardware, config: &ShooterConfig, buttons: ButtonMap) -> Self {
        Self {
            hw,
            sequencer: FiringSequencer::new(SequencerParams::from(config)),
            buttons,
        }
    }

    fn manual_inputs(&self, ctx: &TickContext<'_>) -> ManualInputs {
        if !ctx.enabled(EnableFlags::OPERATOR_INPUT) {
            return ManualInputs::default();
        }
        let stick = ctx.sensors.joystick.as_ref();
        let degrade = |e: &_| ctx.degrade(e);
        ManualInputs {
            override_held: button_or_released(stick, self.buttons.shooter_override, degrade),
            motor_held: button_or_released(stick, self.buttons.shooter_motor, degrade),
            piston_held: button_or_released(stick, self.buttons.shooter_piston, degrade),
        }
    }

    fn apply(&mut self, command: ShooterCommand) -> Result<(), TaskError> {
        let motor = self.hw.motor.set(command.motor);
        let piston = self.hw.piston.set(command.piston);
        motor.and(piston).map_err(TaskError::from)
    }

    fn publish(&self, ctx: &TickContext<'_>) {
        ctx.shared.shooter.write(ShooterStatus {
            state: self.sequencer.state(),
            pending: ctx.shared.fire.pending(),
            completed: self.sequencer.completed(),
        });
    }
}

impl ControlTask for ShooterTask<'_> {
    const ID: TaskId = TaskId::Shooter;

    fn tick(&mut self, ctx: &TickContext<'_>) -> Result<(), TaskError> {
        if !ctx.enabled(EnableFlags::SHOOTER) {
            self.publish(ctx);
            return self.make_safe();
        }

        let manual = self.manual_inputs(ctx);
        let command = self.sequencer.tick(ctx.now, &ctx.shared.fire, manual);
        self.publish(ctx);
        self.apply(command)
    }

    fn enter_mode(&mut self, _mode: RobotMode, _now: Duration) -> Result<(), TaskError> {
        self.sequencer.reset();
        self.make_safe()
    }

    fn make_safe(&mut self) -> Result<(), TaskError> {
        self.hw.neutral().map_err(TaskError::from)
    }
}
