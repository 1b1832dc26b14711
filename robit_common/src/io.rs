//! Port, channel and button assignments.

pub mod config;
