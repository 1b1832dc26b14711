//! Task scheduler.
//!
//! Owns the [`HardwareContext`] and the [`SharedRegisters`]. `run` splits
//! the context by subsystem, spawns one scoped thread per task, runs the
//! supervisor on the calling thread, then requests shutdown and joins every
//! task.

use robit_common::config::RobotConfig;
use robit_common::control::state::RobotMode;
use robit_common::hal::context::{HardwareContext, SensorBank};
use std::sync::Arc;
use std::thread::{self, Scope, ScopedJoinHandle};
use std::time::Duration;
use tracing::{error, info, warn};

use crate::clock::Clock;
use crate::error::SchedulerError;
use crate::registers::SharedRegisters;
use crate::task::{ControlTask, run_periodic};
use crate::tasks::{DriveTask, InputTask, ShooterTask, WinchTask};

pub struct Scheduler {
    config: RobotConfig,
    hardware: HardwareContext,
    shared: Arc<SharedRegisters>,
    clock: Arc<dyn Clock>,
}

impl Scheduler {
    pub fn new(config: RobotConfig, hardware: HardwareContext, clock: Arc<dyn Clock>) -> Self {
        let shared = Arc::new(SharedRegisters::new(
            config.winch.tension_setpoint,
            config.autonomous.script,
        ));
        Self {
            config,
            hardware,
            shared,
            clock,
        }
    }

    /// Shared registers, e.g. for a signal handler or a supervisor thread.
    pub fn shared(&self) -> Arc<SharedRegisters> {
        Arc::clone(&self.shared)
    }

    /// Mode-entry hook. See [`SharedRegisters::enter_mode`].
    pub fn on_mode_enter(&self, mode: RobotMode) -> bool {
        self.shared.enter_mode(mode)
    }

    /// Run every task until `supervisor` returns or shutdown is requested.
    ///
    /// # Errors
    ///
    /// - `SchedulerError::Spawn` if a task thread could not be started (the
    ///   tasks already running are stopped and joined first)
    /// - `SchedulerError::TaskPanicked` if any task panicked; every other
    ///   task is still joined
    pub fn run<R>(
        &mut self,
        supervisor: impl FnOnce(&SharedRegisters) -> R,
    ) -> Result<R, SchedulerError> {
        let shared: &SharedRegisters = &self.shared;
        let clock: &dyn Clock = self.clock.as_ref();
        let periods = &self.config.scheduler;
        let buttons = self.config.io.buttons;

        let HardwareContext {
            drive,
            winch,
            shooter,
            sensors,
            display,
        } = &mut self.hardware;
        let sensors: &SensorBank = sensors;

        let drive = DriveTask::new(
            drive,
            &self.config.drive,
            self.config.io.axes,
            self.config.autonomous.script,
        );
        let input = InputTask::new(
            display.as_mut(),
            buttons,
            &self.config.shooter,
            &self.config.winch,
        );
        let winch = WinchTask::new(
            winch,
            &self.config.winch,
            self.config.io.limit_switch.polarity,
            buttons,
        );
        let shooter = ShooterTask::new(shooter, &self.config.shooter, buttons);

        let result = thread::scope(|scope| {
            let mut spawner = Spawner {
                scope,
                shared,
                sensors,
                clock,
                handles: Vec::with_capacity(4),
            };
            let spawned = spawner
                .spawn(drive, periods.drive_period())
                .and_then(|()| spawner.spawn(input, periods.input_period()))
                .and_then(|()| spawner.spawn(winch, periods.winch_period()))
                .and_then(|()| spawner.spawn(shooter, periods.shooter_period()));

            let output = spawned.map(|()| {
                info!(tasks = spawner.handles.len(), "scheduler running");
                supervisor(shared)
            });

            shared.request_shutdown();
            let panicked: Vec<&'static str> = spawner
                .handles
                .into_iter()
                .filter_map(|(name, handle)| handle.join().is_err().then_some(name))
                .collect();

            if !panicked.is_empty() {
                error!(tasks = ?panicked, "task panicked");
                return Err(SchedulerError::TaskPanicked { tasks: panicked });
            }
            output
        });

        self.neutral_all();
        result
    }

    /// Best-effort neutral on every actuator after the tasks have stopped.
    fn neutral_all(&mut self) {
        let hw = &mut self.hardware;
        for (subsystem, result) in [
            ("drive", hw.drive.neutral()),
            ("winch", hw.winch.neutral()),
            ("shooter", hw.shooter.neutral()),
        ] {
            if let Err(e) = result {
                warn!(subsystem, error = %e, "actuator not confirmed neutral after stop");
            }
        }
    }
}

/// Spawns task threads into one scope and keeps their handles.
struct Spawner<'scope, 'env> {
    scope: &'scope Scope<'scope, 'env>,
    shared: &'env SharedRegisters,
    sensors: &'env SensorBank,
    clock: &'env dyn Clock,
    handles: Vec<(&'static str, ScopedJoinHandle<'scope, ()>)>,
}

impl<'scope, 'env> Spawner<'scope, 'env> {
    fn spawn<T>(&mut self, mut task: T, period: Duration) -> Result<(), SchedulerError>
    where
        T: ControlTask + Send + 'scope,
    {
        let name = T::ID.name();
        let (shared, sensors, clock) = (self.shared, self.sensors, self.clock);
        let handle = thread::Builder::new()
            .name(format!("robit-{name}"))
            .spawn_scoped(self.scope, move || {
                run_periodic(&mut task, shared, sensors, clock, period);
            })
            .map_err(|source| {
                error!(task = name, error = %source, "spawn failed");
                shared.request_shutdown();
                SchedulerError::Spawn { task: name, source }
            })?;
        self.handles.push((name, handle));
        Ok(())
    }
}
