//! The hardware context: every actuator and sensor handle of the robot.
//!
//! Built once by a backend and owned by the scheduler. The scheduler splits
//! it by subsystem so each task borrows only its own actuators mutably while
//! the [`SensorBank`] is shared by reference.

use crate::consts::MOTOR_NEUTRAL;
use crate::hal::driver::{
    AnalogSensor, DigitalSensor, HalError, Joystick, MotorOutput, PistonOutput, TextDisplay,
};
use crate::hal::types::PistonCommand;

/// Drive motors in layout order (`[left, right]` or mecanum
/// `[front_left, front_right, back_left, back_right]`).
pub struct DriveHardware {
    pub motors: Vec<Box<dyn MotorOutput>>,
}

impl DriveHardware {
    /// Command every motor to neutral. All motors are attempted; the first
    /// error is returned.
    pub fn neutral(&mut self) -> Result<(), HalError> {
        first_error(self.motors.iter_mut().map(|m| m.set(MOTOR_NEUTRAL)))
    }
}

/// Winch motor and pneumatic release.
pub struct WinchHardware {
    pub motor: Box<dyn MotorOutput>,
    pub release: Box<dyn PistonOutput>,
}

impl WinchHardware {
    /// Motor off, release piston at rest.
    pub fn neutral(&mut self) -> Result<(), HalError> {
        first_error([
            self.motor.set(MOTOR_NEUTRAL),
            self.release.set(PistonCommand::REST),
        ])
    }
}

/// Firing motor and firing piston.
pub struct ShooterHardware {
    pub motor: Box<dyn MotorOutput>,
    pub piston: Box<dyn PistonOutput>,
}

impl ShooterHardware {
    /// Motor off, firing piston at rest.
    pub fn neutral(&mut self) -> Result<(), HalError> {
        first_error([
            self.motor.set(MOTOR_NEUTRAL),
            self.piston.set(PistonCommand::REST),
        ])
    }
}

/// Sensors readable from any task.
pub struct SensorBank {
    pub joystick: Box<dyn Joystick>,
    pub limit_switch: Box<dyn DigitalSensor>,
    pub tension: Box<dyn AnalogSensor>,
}

/// Complete set of hardware handles.
pub struct HardwareContext {
    pub drive: DriveHardware,
    pub winch: WinchHardware,
    pub shooter: ShooterHardware,
    pub sensors: SensorBank,
    pub display: Box<dyn TextDisplay>,
}

fn first_error(results: impl IntoIterator<Item = Result<(), HalError>>) -> Result<(), HalError> {
    let mut first = Ok(());
    for result in results {
        if let Err(e) = result {
            if first.is_ok() {
                first = Err(e);
            }
        }
    }
    first
}
