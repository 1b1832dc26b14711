//! Periodic task contract and loop.
//!
//! ```text
//! loop {
//!     snapshot mode ─► epoch changed? ─► enter_mode (reset + neutral)
//!                  └─► tick ─► Err? ─► classify, record, make_safe
//!     sleep(max(period - elapsed, 1 ms))
//! }
//! make_safe
//! ```

use robit_common::consts::MIN_TICK_SLEEP_MS;
use robit_common::control::error::TaskFault;
use robit_common::control::state::{EnableFlags, RobotMode};
use robit_common::hal::context::SensorBank;
use robit_common::hal::driver::HalError;
use std::cell::Cell;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clock::Clock;
use crate::error::TaskError;
use crate::registers::{ModeSnapshot, SharedRegisters, TaskHealth, TaskId};

/// Everything a task sees during one tick.
pub struct TickContext<'a> {
    pub mode: ModeSnapshot,
    /// Tick start time.
    pub now: Duration,
    pub period: Duration,
    pub shared: &'a SharedRegisters,
    pub sensors: &'a SensorBank,
    pub clock: &'a dyn Clock,
    degraded: Cell<TaskFault>,
}

impl<'a> TickContext<'a> {
    pub fn new(
        mode: ModeSnapshot,
        now: Duration,
        period: Duration,
        shared: &'a SharedRegisters,
        sensors: &'a SensorBank,
        clock: &'a dyn Clock,
    ) -> Self {
        Self {
            mode,
            now,
            period,
            shared,
            sensors,
            clock,
            degraded: Cell::new(TaskFault::empty()),
        }
    }

    #[inline]
    pub fn enabled(&self, flags: EnableFlags) -> bool {
        self.mode.mode.enables().contains(flags)
    }

    /// Record a fault that was absorbed by a fallback value. The tick
    /// continues and outputs are not forced neutral.
    pub fn degrade(&self, error: &HalError) {
        let fault = TaskError::from(error.clone()).fault();
        debug!(error = %error, "using fallback value");
        self.degraded.set(self.degraded.get() | fault);
    }

    pub fn degraded(&self) -> TaskFault {
        self.degraded.get()
    }

    /// Token cancelled by shutdown or by any mode transition after this tick's snapshot.
    pub fn cancel_token(&self) -> CancelToken<'a> {
        CancelToken {
            shared: self.shared,
            epoch: self.mode.epoch,
        }
    }

    /// Sleep until `deadline` in slices of at most one period, checking
    /// `cancel` between slices. Returns false if cancelled.
    pub fn wait_until(&self, deadline: Duration, cancel: &CancelToken<'_>) -> bool {
        let slice_max = self.period.max(Duration::from_millis(MIN_TICK_SLEEP_MS));
        loop {
            if cancel.is_cancelled() {
                return false;
            }
            let now = self.clock.now();
            if now >= deadline {
                return true;
            }
            self.clock.sleep((deadline - now).min(slice_max));
        }
    }
}

/// Cancellation check for bounded waits inside a tick.
#[derive(Clone, Copy)]
pub struct CancelToken<'a> {
    shared: &'a SharedRegisters,
    epoch: u64,
}

impl CancelToken<'_> {
    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.shared.shutdown_requested() || self.shared.mode.snapshot().epoch != self.epoch
    }
}

/// A periodic control task.
pub trait ControlTask {
    const ID: TaskId;

    /// One iteration. Errors force outputs neutral for this tick.
    fn tick(&mut self, ctx: &TickContext<'_>) -> Result<(), TaskError>;

    /// Called once per mode transition before the first tick in `mode`.
    /// Resets state machines and drives outputs neutral.
    fn enter_mode(&mut self, mode: RobotMode, now: Duration) -> Result<(), TaskError>;

    /// Drive every owned output to neutral.
    fn make_safe(&mut self) -> Result<(), TaskError>;
}

/// Result of one loop iteration.
#[derive(Debug, Clone, PartialEq)]
pub struct TickOutcome {
    /// Faults raised by this iteration, including absorbed sensor fallbacks.
    pub faults: TaskFault,
    /// The error that failed the tick, if any.
    pub error: Option<TaskError>,
}

/// Latched fault logging: one `warn!` per streak, `info!` on recovery.
#[derive(Debug, Default)]
struct FaultLatch {
    streak: TaskFault,
}

impl FaultLatch {
    fn observe(&mut self, task: TaskId, outcome: &TickOutcome) {
        if outcome.faults.is_empty() {
            if !self.streak.is_empty() {
                info!(task = task.name(), cleared = ?self.streak, "task recovered");
                self.streak = TaskFault::empty();
            }
            return;
        }

        let new = !self.streak.contains(outcome.faults);
        self.streak |= outcome.faults;
        match (&outcome.error, new) {
            (Some(e), true) => warn!(task = task.name(), faults = ?outcome.faults, error = %e, "tick failed, outputs neutral"),
            (None, true) => warn!(task = task.name(), faults = ?outcome.faults, "sensor fallback in use"),
            (Some(e), false) => debug!(task = task.name(), error = %e, "tick failed"),
            (None, false) => {}
        }
    }
}

/// Run one iteration: mode handling, tick and error handling.
///
/// On an epoch change `enter_mode` runs before the tick. A failed tick is
/// followed by `make_safe`.
pub fn run_once<T: ControlTask>(
    task: &mut T,
    ctx: &TickContext<'_>,
    last_epoch: &mut Option<u64>,
) -> TickOutcome {
    let mut result = Ok(());
    if *last_epoch != Some(ctx.mode.epoch) {
        *last_epoch = Some(ctx.mode.epoch);
        debug!(task = T::ID.name(), mode = ctx.mode.mode.label(), "entering mode");
        result = task.enter_mode(ctx.mode.mode, ctx.now);
    }

    match result.and_then(|()| task.tick(ctx)) {
        Ok(()) => TickOutcome {
            faults: ctx.degraded(),
            error: None,
        },
        Err(e) => {
            if let Err(safe_err) = task.make_safe() {
                debug!(task = T::ID.name(), error = %safe_err, "make_safe failed");
            }
            TickOutcome {
                faults: e.fault() | ctx.degraded(),
                error: Some(e),
            }
        }
    }
}

/// Run `task` every `period` until shutdown is requested.
pub fn run_periodic<T: ControlTask>(
    task: &mut T,
    shared: &SharedRegisters,
    sensors: &SensorBank,
    clock: &dyn Clock,
    period: Duration,
) {
    let min_sleep = Duration::from_millis(MIN_TICK_SLEEP_MS);
    let health = shared.health_register(T::ID);
    let mut last_epoch = None;
    let mut latch = FaultLatch::default();

    info!(task = T::ID.name(), period_ms = period.as_millis() as u64, "task started");

    while !shared.shutdown_requested() {
        let started = clock.now();
        let ctx = TickContext::new(shared.mode.snapshot(), started, period, shared, sensors, clock);

        let outcome = run_once(task, &ctx, &mut last_epoch);
        latch.observe(T::ID, &outcome);
        health.update(|h: &mut TaskHealth| {
            h.ticks += 1;
            h.faults = outcome.faults;
            if !outcome.faults.is_empty() {
                h.total_faults += 1;
            }
        });

        let elapsed = clock.now().saturating_sub(started);
        clock.sleep(period.saturating_sub(elapsed).max(min_sleep));
    }

    if let Err(e) = task.make_safe() {
        warn!(task = T::ID.name(), error = %e, "outputs not confirmed neutral at shutdown");
    }
    info!(task = T::ID.name(), "task stopped");
}
