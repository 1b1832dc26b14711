//! Robit Common Library
//!
//! Shared types for every crate in the Robit workspace: configuration
//! loading, mode and state enums, fault flags, the hardware traits the
//! control tasks drive, and the port/button map.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration loading trait and the top-level `RobotConfig`
//! - [`control`] - State enums, fault bitflags and per-subsystem tuning
//! - [`hal`] - Hardware traits, errors and the `HardwareContext` bundle
//! - [`io`] - Port, channel, polarity and button assignments
//! - [`prelude`] - Common re-exports for convenience

pub mod config;
pub mod consts;
pub mod control;
pub mod hal;
pub mod io;
pub mod prelude;
