//! Task fault bitflags.
//!
//! Faults are local to the task that records them and none of them stops
//! a task. A failed tick forces the task's outputs to neutral; a sensor
//! fallback only records the flag.

use bitflags::bitflags;

bitflags! {
    /// Fault classes recorded per task.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TaskFault: u8 {
        /// A sensor read failed; last-known or neutral value used.
        const SENSOR_UNAVAILABLE = 0x01;
        /// An actuator rejected a command; logged and continued.
        const ACTUATOR_REJECTED  = 0x02;
        /// A configured value was clamped into range.
        const CONFIG_CLAMPED     = 0x04;
        /// A bounded wait ran out (winch wind timeout).
        const TIMEOUT            = 0x08;
    }
}

impl Default for TaskFault {
    fn default() -> Self {
        Self::empty()
    }
}

impl TaskFault {
    /// Three-letter codes for the text display, e.g. `SNS ACT`.
    pub fn codes(self) -> impl Iterator<Item = &'static str> {
        [
            (Self::SENSOR_UNAVAILABLE, "SNS"),
            (Self::ACTUATOR_REJECTED, "ACT"),
            (Self::CONFIG_CLAMPED, "CFG"),
            (Self::TIMEOUT, "TMO"),
        ]
        .into_iter()
        .filter(move |(flag, _)| self.contains(*flag))
        .map(|(_, code)| code)
    }
}
