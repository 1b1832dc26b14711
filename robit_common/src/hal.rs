//! Hardware abstraction traits and types.
//!
//! The control tasks only ever see these traits. Backends (currently the
//! simulation backend in `robit_hal`) build a [`context::HardwareContext`]
//! once at startup and hand it to the scheduler.

pub mod config;
pub mod context;
pub mod driver;
pub mod types;
