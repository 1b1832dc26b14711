//! # Robit HAL Library
//!
//! Hardware backends implementing the traits in `robit_common::hal::driver`.
//!
//! # Module Structure
//!
//! - [`drivers`] - Backend implementations (currently simulation only)
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                    robit_hal                             │
//! │  ┌──────────────────┐        ┌────────────────────────┐  │
//! │  │ SimulationRig    │──────► │ HardwareContext        │──┼──► scheduler
//! │  │ (builds devices) │        │ (boxed trait objects)  │  │
//! │  └────────┬─────────┘        └────────────────────────┘  │
//! │           ▼                                              │
//! │  ┌──────────────────┐        ┌────────────────────────┐  │
//! │  │ SimProbe         │◄──────►│ WinchPlant             │  │
//! │  │ (inspect/inject) │        │ (limit + tension model)│  │
//! │  └──────────────────┘        └────────────────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

#![deny(missing_docs)]

pub mod drivers;

pub use crate::drivers::simulation::{SimProbe, SimulationRig};
