//! Match plan: drives the mode-entry hook through the configured phases.

use robit_common::control::config::MatchConfig;
use robit_common::control::state::RobotMode;
use std::time::Duration;
use tracing::info;

use crate::clock::Clock;
use crate::registers::SharedRegisters;

/// Longest uninterrupted sleep while waiting out a phase.
const WAIT_SLICE: Duration = Duration::from_millis(20);

/// How a match ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchReport {
    pub phases_completed: usize,
    /// Shutdown was requested before the last phase ended.
    pub interrupted: bool,
}

/// Wait until `duration` has elapsed or shutdown is requested.
/// Returns false if interrupted.
pub fn wait_cancellable(shared: &SharedRegisters, clock: &dyn Clock, duration: Duration) -> bool {
    let deadline = clock.now() + duration;
    loop {
        if shared.shutdown_requested() {
            return false;
        }
        let now = clock.now();
        if now >= deadline {
            return true;
        }
        clock.sleep((deadline - now).min(WAIT_SLICE));
    }
}

/// Enter each phase in order and hold it for its duration. Always ends in
/// Disabled, including when interrupted.
pub fn run_match(shared: &SharedRegisters, plan: &MatchConfig, clock: &dyn Clock) -> MatchReport {
    let mut report = MatchReport {
        phases_completed: 0,
        interrupted: false,
    };

    for (index, phase) in plan.phases.iter().enumerate() {
        info!(
            phase = index,
            mode = phase.mode.label(),
            duration_s = phase.duration_s,
            "match phase"
        );
        shared.enter_mode(phase.mode);
        if !wait_cancellable(shared, clock, Duration::from_secs_f64(phase.duration_s)) {
            report.interrupted = true;
            break;
        }
        report.phases_completed += 1;
    }

    shared.enter_mode(RobotMode::Disabled);
    info!(
        completed = report.phases_completed,
        interrupted = report.interrupted,
        "match finished"
    );
    report
}
