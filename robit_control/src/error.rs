//! Task and scheduler errors.

use robit_common::control::error::TaskFault;
use robit_common::hal::driver::HalError;
use std::time::Duration;
use thiserror::Error;

/// Error returned by one task tick.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TaskError {
    #[error(transparent)]
    Hal(#[from] HalError),

    /// Winding did not reach the limit within the configured bound.
    #[error("Winch wind exceeded {}ms without reaching the limit", .0.as_millis())]
    WindTimeout(Duration),
}

impl TaskError {
    /// Fault flag recorded in the task's health register.
    pub fn fault(&self) -> TaskFault {
        match self {
            Self::Hal(HalError::SensorUnavailable(_) | HalError::InvalidChannel { .. }) => {
                TaskFault::SENSOR_UNAVAILABLE
            }
            Self::Hal(HalError::ActuatorCommandRejected(_) | HalError::InitFailed(_)) => {
                TaskFault::ACTUATOR_REJECTED
            }
            Self::WindTimeout(_) => TaskFault::TIMEOUT,
        }
    }
}

/// Error returned by [`Scheduler::run`](crate::scheduler::Scheduler::run).
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Failed to spawn {task} task: {source}")]
    Spawn {
        task: &'static str,
        #[source]
        source: std::io::Error,
    },

    #[error("Task(s) panicked: {}", .tasks.join(", "))]
    TaskPanicked { tasks: Vec<&'static str> },
}
