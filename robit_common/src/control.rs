//! Control subsystem shared types.
//!
//! State enums, fault bitflags and per-subsystem tuning shared between the
//! control tasks, the simulation backend and the configuration loader.

pub mod config;
pub mod error;
pub mod state;
