//! The four periodic control tasks.
//!
//! Each task mutably borrows only its own actuators from the
//! `HardwareContext`; sensors arrive through the [`TickContext`](crate::task::TickContext).

mod drive;
mod input;
mod shooter;
mod winch;

pub use drive::DriveTask;
pub use input::InputTask;
pub use shooter::ShooterTask;
pub use winch::WinchTask;

use robit_common::hal::driver::{HalError, Joystick};

/// Read a button, falling back to released.
pub(crate) fn button_or_released(
    joystick: &dyn Joystick,
    channel: u8,
    degrade: impl Fn(&HalError),
) -> bool {
    joystick.button(channel).unwrap_or_else(|e| {
        degrade(&e);
        false
    })
}
