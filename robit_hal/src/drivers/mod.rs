//! Hardware backend implementations.
//!
//! - [`simulation`] - Software simulation backend for development and testing
//!
//! # Adding New Backends
//!
//! 1. Create a new submodule under `drivers/`
//! 2. Implement the traits from `robit_common::hal::driver`
//! 3. Build a `HardwareContext` from `IoConfig`

pub mod simulation;
