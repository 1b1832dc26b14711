//! Simulation rig: builds a [`HardwareContext`] of simulated devices and a
//! [`SimProbe`] sharing their state.

use parking_lot::Mutex;
use robit_common::config::RobotConfig;
use robit_common::hal::context::{
    DriveHardware, HardwareContext, SensorBank, ShooterHardware, WinchHardware,
};
use robit_common::hal::driver::{HalError, MotorOutput};
use robit_common::hal::types::PistonCommand;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

use super::actuators::{MotorCell, PistonCell, SimMotor, SimPiston};
use super::display::{DisplayCell, SimDisplay};
use super::plant::WinchPlant;
use super::sensors::{JoystickCell, SensorCell, SimAnalogInput, SimDigitalInput, SimJoystick};

/// Factory for the simulation backend.
pub struct SimulationRig;

impl SimulationRig {
    /// Build the hardware context described by `config`.
    ///
    /// # Errors
    ///
    /// Returns `HalError::InitFailed` if the I/O assignment does not match
    /// the drive layout or assigns a channel twice.
    pub fn build(config: &RobotConfig) -> Result<(HardwareContext, SimProbe), HalError> {
        let io = &config.io;
        io.validate(config.drive.layout.motor_count())
            .map_err(|e| HalError::InitFailed(e.to_string()))?;

        let plant = config
            .simulation
            .winch_plant
            .then(|| Arc::new(WinchPlant::new(&config.simulation)));

        let drive_cells: Vec<_> = io
            .drive_motor_ports
            .iter()
            .map(|&port| (port, Arc::new(Mutex::new(MotorCell::default()))))
            .collect();
        let winch_motor = Arc::new(Mutex::new(MotorCell::default()));
        let shooter_motor = Arc::new(Mutex::new(MotorCell::default()));
        let shooter_piston = Arc::new(Mutex::new(PistonCell::default()));
        let winch_release = Arc::new(Mutex::new(PistonCell::default()));
        let limit_switch = Arc::new(Mutex::new(SensorCell {
            // Open switch at rest.
            value: !io.limit_switch.polarity.is_active(true),
            unavailable: false,
        }));
        let tension = Arc::new(Mutex::new(SensorCell {
            value: config.simulation.tension_rest,
            unavailable: false,
        }));
        let joystick = Arc::new(Mutex::new(JoystickCell::default()));
        let display = Arc::new(Mutex::new(DisplayCell::default()));

        let context = HardwareContext {
            drive: DriveHardware {
                motors: drive_cells
                    .iter()
                    .map(|(port, cell)| {
                        Box::new(SimMotor::new(*port, Arc::clone(cell), None)) as Box<dyn MotorOutput>
                    })
                    .collect(),
            },
            winch: WinchHardware {
                motor: Box::new(SimMotor::new(
                    io.winch_motor_port,
                    Arc::clone(&winch_motor),
                    plant.clone(),
                )),
                release: Box::new(SimPiston::new(
                    io.winch_release.forward,
                    Arc::clone(&winch_release),
                    plant.clone(),
                )),
            },
            shooter: ShooterHardware {
                motor: Box::new(SimMotor::new(
                    io.shooter_motor_port,
                    Arc::clone(&shooter_motor),
                    None,
                )),
                piston: Box::new(SimPiston::new(
                    io.shooter_piston.forward,
                    Arc::clone(&shooter_piston),
                    None,
                )),
            },
            sensors: SensorBank {
                joystick: Box::new(SimJoystick::new(io.joystick_port, Arc::clone(&joystick))),
                limit_switch: Box::new(SimDigitalInput::new(
                    io.limit_switch.channel,
                    io.limit_switch.polarity,
                    Arc::clone(&limit_switch),
                    plant.clone(),
                )),
                tension: Box::new(SimAnalogInput::new(
                    io.tension_channel,
                    Arc::clone(&tension),
                    plant.clone(),
                )),
            },
            display: Box::new(SimDisplay::new(Arc::clone(&display))),
        };

        info!(
            drive_motors = drive_cells.len(),
            winch_plant = plant.is_some(),
            "Simulation rig ready"
        );
        debug!(?io, "I/O assignment");

        let probe = SimProbe {
            drive: drive_cells,
            winch_port: io.winch_motor_port,
            winch_motor,
            shooter_port: io.shooter_motor_port,
            shooter_motor,
            shooter_piston,
            winch_release,
            limit_switch,
            tension,
            joystick,
            display,
            plant,
        };
        Ok((context, probe))
    }
}

/// Inspection and injection handle onto a simulation rig.
///
/// Cloning is cheap; every clone observes the same devices.
#[derive(Clone)]
pub struct SimProbe {
    drive: Vec<(u8, Arc<Mutex<MotorCell>>)>,
    winch_port: u8,
    winch_motor: Arc<Mutex<MotorCell>>,
    shooter_port: u8,
    shooter_motor: Arc<Mutex<MotorCell>>,
    shooter_piston: Arc<Mutex<PistonCell>>,
    winch_release: Arc<Mutex<PistonCell>>,
    limit_switch: Arc<Mutex<SensorCell<bool>>>,
    tension: Arc<Mutex<SensorCell<f64>>>,
    joystick: Arc<Mutex<JoystickCell>>,
    display: Arc<Mutex<DisplayCell>>,
    plant: Option<Arc<WinchPlant>>,
}

impl SimProbe {
    // ─── Operator input ─────────────────────────────────────────────

    /// Set a joystick axis (1-based channel). Out-of-range channels are ignored.
    pub fn set_axis(&self, channel: u8, value: f64) {
        if let Some(slot) = self
            .joystick
            .lock()
            .axes
            .get_mut(usize::from(channel).wrapping_sub(1))
        {
            *slot = value;
        }
    }

    /// Set a joystick button (1-based channel). Out-of-range channels are ignored.
    pub fn set_button(&self, channel: u8, pressed: bool) {
        if let Some(slot) = self
            .joystick
            .lock()
            .buttons
            .get_mut(usize::from(channel).wrapping_sub(1))
        {
            *slot = pressed;
        }
    }

    /// Press a joystick button.
    pub fn press(&self, channel: u8) {
        self.set_button(channel, true);
    }

    /// Release a joystick button.
    pub fn release(&self, channel: u8) {
        self.set_button(channel, false);
    }

    /// Connect or disconnect the joystick.
    pub fn set_joystick_connected(&self, connected: bool) {
        self.joystick.lock().connected = connected;
    }

    // ─── Sensors ────────────────────────────────────────────────────

    /// Inject the raw limit switch level (ignored while a plant is attached).
    pub fn set_limit_raw(&self, raw: bool) {
        self.limit_switch.lock().value = raw;
    }

    /// Make the limit switch unreadable.
    pub fn set_limit_unavailable(&self, unavailable: bool) {
        self.limit_switch.lock().unavailable = unavailable;
    }

    /// Inject the tension voltage (ignored while a plant is attached).
    pub fn set_tension(&self, volts: f64) {
        self.tension.lock().value = volts;
    }

    /// Make the tension sensor unreadable.
    pub fn set_tension_unavailable(&self, unavailable: bool) {
        self.tension.lock().unavailable = unavailable;
    }

    /// Advance the winch plant by `dt`, if one is attached.
    pub fn advance_plant(&self, dt: Duration) {
        if let Some(plant) = &self.plant {
            plant.advance(dt);
        }
    }

    // ─── Actuators ──────────────────────────────────────────────────

    /// Last accepted drive commands in layout order.
    pub fn drive_outputs(&self) -> Vec<f64> {
        self.drive.iter().map(|(_, cell)| cell.lock().value).collect()
    }

    /// Accepted command history of one drive motor (layout index).
    pub fn drive_history(&self, index: usize) -> Vec<f64> {
        self.drive
            .get(index)
            .map(|(_, cell)| cell.lock().history.iter().copied().collect())
            .unwrap_or_default()
    }

    /// Last accepted winch motor command.
    pub fn winch_motor(&self) -> f64 {
        self.winch_motor.lock().value
    }

    /// Accepted winch motor command history.
    pub fn winch_history(&self) -> Vec<f64> {
        self.winch_motor.lock().history.iter().copied().collect()
    }

    /// Last accepted shooter motor command.
    pub fn shooter_motor(&self) -> f64 {
        self.shooter_motor.lock().value
    }

    /// Current firing piston command.
    pub fn shooter_piston(&self) -> PistonCommand {
        self.shooter_piston.lock().command
    }

    /// Number of firing piston extensions so far.
    pub fn shots_fired(&self) -> u32 {
        self.shooter_piston.lock().extensions
    }

    /// Current winch release piston command.
    pub fn winch_release(&self) -> PistonCommand {
        self.winch_release.lock().command
    }

    /// Number of winch release pulses so far.
    pub fn release_pulses(&self) -> u32 {
        self.winch_release.lock().extensions
    }

    /// True when every motor is at neutral and no piston is extended.
    pub fn all_neutral(&self) -> bool {
        self.drive.iter().all(|(_, cell)| cell.lock().value == 0.0)
            && self.winch_motor() == 0.0
            && self.shooter_motor() == 0.0
            && self.shooter_piston() != PistonCommand::Forward
            && self.winch_release() != PistonCommand::Forward
    }

    /// Reject the next `count` commands sent to motor `port`.
    pub fn reject_motor_commands(&self, port: u8, count: u32) {
        let drive = self.drive.iter().map(|(p, cell)| (*p, cell));
        let others = [
            (self.winch_port, &self.winch_motor),
            (self.shooter_port, &self.shooter_motor),
        ];
        for (_, cell) in drive.chain(others).filter(|(p, _)| *p == port) {
            cell.lock().reject_remaining = count;
        }
    }

    // ─── Display ────────────────────────────────────────────────────

    /// Display lines as of the last flush.
    pub fn display_lines(&self) -> Vec<String> {
        self.display.lock().lines.to_vec()
    }

    /// Number of display flushes so far.
    pub fn display_flushes(&self) -> u64 {
        self.display.lock().flushes
    }
}
