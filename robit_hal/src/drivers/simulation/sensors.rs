//! Simulated sensors and joystick.

use parking_lot::Mutex;
use robit_common::consts::{JOYSTICK_AXES, JOYSTICK_BUTTONS};
use robit_common::hal::driver::{AnalogSensor, DigitalSensor, HalError, Joystick};
use robit_common::hal::types::Polarity;
use std::sync::Arc;

use super::plant::WinchPlant;

/// Injected analog or digital reading.
#[derive(Debug, Default)]
pub(crate) struct SensorCell<T> {
    pub(crate) value: T,
    pub(crate) unavailable: bool,
}

/// Simulated digital input.
///
/// With a plant attached the level follows the plant's limit state,
/// encoded with the configured polarity; otherwise it reports the injected
/// raw level.
pub struct SimDigitalInput {
    channel: u8,
    polarity: Polarity,
    cell: Arc<Mutex<SensorCell<bool>>>,
    plant: Option<Arc<WinchPlant>>,
}

impl SimDigitalInput {
    pub(crate) fn new(
        channel: u8,
        polarity: Polarity,
        cell: Arc<Mutex<SensorCell<bool>>>,
        plant: Option<Arc<WinchPlant>>,
    ) -> Self {
        Self {
            channel,
            polarity,
            cell,
            plant,
        }
    }
}

impl DigitalSensor for SimDigitalInput {
    fn raw(&self) -> Result<bool, HalError> {
        let cell = self.cell.lock();
        if cell.unavailable {
            return Err(HalError::SensorUnavailable(format!(
                "digital input {}",
                self.channel
            )));
        }
        match &self.plant {
            Some(plant) => {
                let active = plant.at_limit();
                Ok(match self.polarity {
                    Polarity::ActiveHigh => active,
                    Polarity::ActiveLow => !active,
                })
            }
            None => Ok(cell.value),
        }
    }
}

/// Simulated analog input.
pub struct SimAnalogInput {
    channel: u8,
    cell: Arc<Mutex<SensorCell<f64>>>,
    plant: Option<Arc<WinchPlant>>,
}

impl SimAnalogInput {
    pub(crate) fn new(
        channel: u8,
        cell: Arc<Mutex<SensorCell<f64>>>,
        plant: Option<Arc<WinchPlant>>,
    ) -> Self {
        Self {
            channel,
            cell,
            plant,
        }
    }
}

impl AnalogSensor for SimAnalogInput {
    fn voltage(&self) -> Result<f64, HalError> {
        let cell = self.cell.lock();
        if cell.unavailable {
            return Err(HalError::SensorUnavailable(format!(
                "analog input {}",
                self.channel
            )));
        }
        Ok(match &self.plant {
            Some(plant) => plant.tension(),
            None => cell.value,
        })
    }
}

/// Joystick axis and button state.
#[derive(Debug)]
pub(crate) struct JoystickCell {
    pub(crate) axes: [f64; JOYSTICK_AXES as usize],
    pub(crate) buttons: [bool; JOYSTICK_BUTTONS as usize],
    pub(crate) connected: bool,
}

impl Default for JoystickCell {
    fn default() -> Self {
        Self {
            axes: [0.0; JOYSTICK_AXES as usize],
            buttons: [false; JOYSTICK_BUTTONS as usize],
            connected: true,
        }
    }
}

/// Simulated operator joystick.
pub struct SimJoystick {
    port: u8,
    cell: Arc<Mutex<JoystickCell>>,
}

impl SimJoystick {
    pub(crate) fn new(port: u8, cell: Arc<Mutex<JoystickCell>>) -> Self {
        Self { port, cell }
    }

    fn index(&self, channel: u8, count: u8) -> Result<usize, HalError> {
        if channel == 0 || channel > count {
            return Err(HalError::InvalidChannel {
                device: format!("joystick {}", self.port),
                channel,
            });
        }
        Ok(usize::from(channel - 1))
    }

    fn connected(&self, cell: &JoystickCell) -> Result<(), HalError> {
        if cell.connected {
            Ok(())
        } else {
            Err(HalError::SensorUnavailable(format!(
                "joystick {} disconnected",
                self.port
            )))
        }
    }
}

impl Joystick for SimJoystick {
    fn axis(&self, channel: u8) -> Result<f64, HalError> {
        let index = self.index(channel, JOYSTICK_AXES)?;
        let cell = self.cell.lock();
        self.connected(&cell)?;
        Ok(cell.axes[index])
    }

    fn button(&self, channel: u8) -> Result<bool, HalError> {
        let index = self.index(channel, JOYSTICK_BUTTONS)?;
        let cell = self.cell.lock();
        self.connected(&cell)?;
        Ok(cell.buttons[index])
    }
}
