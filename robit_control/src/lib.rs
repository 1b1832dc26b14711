//! # Robit Control Library
//!
//! Actuator control for the Robit competition robot. Operator input and
//! sensor feedback are turned into time-bounded commands for the drive
//! motors, the winch and the firing mechanism by four independently
//! scheduled periodic tasks sharing a small set of registers.
//!
//! ## Components
//!
//! 1. **MotionProfiler**: acceleration-limited per-axis smoothing
//! 2. **WinchController**: limit-switch or threshold driven wind state machine
//! 3. **FiringSequencer**: counted fire requests and timed spin-up/pulse sequence
//! 4. **Scheduler**: one scoped thread per task over a borrowed `HardwareContext`
//!
//! ## Shared State Discipline
//!
//! Every shared register has exactly one writer, except the fire request
//! counter which any producer may increment. The mode register packs the
//! mode and a transition epoch into one atomic word so a task sees a
//! consistent snapshot per tick.

pub mod clock;
pub mod config;
pub mod debounce;
pub mod error;
pub mod match_plan;
pub mod profiler;
pub mod registers;
pub mod scheduler;
pub mod shooter;
pub mod status;
pub mod task;
pub mod tasks;
pub mod winch;
