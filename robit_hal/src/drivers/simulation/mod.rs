//! Simulation backend.
//!
//! Software devices for development and testing without physical hardware.
//! Every device keeps its state in a shared cell so a [`SimProbe`] can
//! inspect actuator commands and inject sensor values while the control
//! tasks own the device handles.

mod actuators;
mod display;
mod plant;
mod rig;
mod sensors;

pub use actuators::{SimMotor, SimPiston};
pub use display::SimDisplay;
pub use plant::WinchPlant;
pub use rig::{SimProbe, SimulationRig};
pub use sensors::{SimAnalogInput, SimDigitalInput, SimJoystick};
