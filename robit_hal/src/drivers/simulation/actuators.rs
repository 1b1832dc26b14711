//! Simulated motor controllers and double solenoids.

use parking_lot::Mutex;
use robit_common::hal::driver::{HalError, MotorOutput, PistonOutput};
use robit_common::hal::types::PistonCommand;
use std::collections::VecDeque;
use std::sync::Arc;
use tracing::trace;

use super::plant::WinchPlant;

/// Commands kept per output for inspection.
const HISTORY_LEN: usize = 4096;

/// Observable state of one simulated motor.
#[derive(Debug, Default)]
pub(crate) struct MotorCell {
    pub(crate) value: f64,
    pub(crate) history: VecDeque<f64>,
    pub(crate) reject_remaining: u32,
}

/// Observable state of one simulated double solenoid.
#[derive(Debug, Default)]
pub(crate) struct PistonCell {
    pub(crate) command: PistonCommand,
    /// Transitions into `Forward`.
    pub(crate) extensions: u32,
    pub(crate) reject_remaining: u32,
}

/// Simulated speed controller.
pub struct SimMotor {
    port: u8,
    cell: Arc<Mutex<MotorCell>>,
    plant: Option<Arc<WinchPlant>>,
}

impl SimMotor {
    pub(crate) fn new(port: u8, cell: Arc<Mutex<MotorCell>>, plant: Option<Arc<WinchPlant>>) -> Self {
        Self { port, cell, plant }
    }
}

impl MotorOutput for SimMotor {
    fn set(&mut self, value: f64) -> Result<(), HalError> {
        let mut cell = self.cell.lock();
        if cell.reject_remaining > 0 {
            cell.reject_remaining -= 1;
            return Err(HalError::ActuatorCommandRejected(format!(
                "motor port {} rejected {value:.3}",
                self.port
            )));
        }
        if cell.value != value {
            trace!(port = self.port, value, "motor command");
        }
        cell.value = value;
        if cell.history.len() == HISTORY_LEN {
            cell.history.pop_front();
        }
        cell.history.push_back(value);
        drop(cell);

        if let Some(plant) = &self.plant {
            plant.set_command(value);
        }
        Ok(())
    }
}

/// Simulated double solenoid.
pub struct SimPiston {
    forward_channel: u8,
    cell: Arc<Mutex<PistonCell>>,
    /// Extending this piston releases the winch plant.
    release_plant: Option<Arc<WinchPlant>>,
}

impl SimPiston {
    pub(crate) fn new(
        forward_channel: u8,
        cell: Arc<Mutex<PistonCell>>,
        release_plant: Option<Arc<WinchPlant>>,
    ) -> Self {
        Self {
            forward_channel,
            cell,
            release_plant,
        }
    }
}

impl PistonOutput for SimPiston {
    fn set(&mut self, command: PistonCommand) -> Result<(), HalError> {
        let mut cell = self.cell.lock();
        if cell.reject_remaining > 0 {
            cell.reject_remaining -= 1;
            return Err(HalError::ActuatorCommandRejected(format!(
                "solenoid {} rejected {}",
                self.forward_channel,
                command.label()
            )));
        }
        let extending = command == PistonCommand::Forward && cell.command != PistonCommand::Forward;
        if extending {
            cell.extensions += 1;
        }
        if cell.command != command {
            trace!(channel = self.forward_channel, command = command.label(), "piston command");
        }
        cell.command = command;
        drop(cell);

        if extending {
            if let Some(plant) = &self.release_plant {
                plant.release();
            }
        }
        Ok(())
    }
}
