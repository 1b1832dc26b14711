//! Shared fixtures for the integration suites.

pub mod drive_profile;
pub mod firing_queue;
pub mod mode_transitions;
pub mod winch_cycle;

use robit_common::config::RobotConfig;
use robit_common::hal::context::{HardwareContext, SensorBank};
use robit_control::clock::{Clock, SimClock};
use robit_control::registers::SharedRegisters;
use robit_control::task::{ControlTask, TickContext, TickOutcome, run_once};
use robit_hal::{SimProbe, SimulationRig};
use std::thread;
use std::time::{Duration, Instant};

pub const PERIOD: Duration = Duration::from_millis(10);

/// Default document with injected (plant-free) sensors.
pub fn base_config() -> RobotConfig {
    let mut config = RobotConfig::default();
    config.simulation.winch_plant = false;
    config
}

pub fn rig(config: &RobotConfig) -> (HardwareContext, SimProbe) {
    SimulationRig::build(config).expect("rig should build")
}

pub fn shared_for(config: &RobotConfig) -> SharedRegisters {
    SharedRegisters::new(config.winch.tension_setpoint, config.autonomous.script)
}

/// Steps tasks on a simulated clock. Mode epochs are tracked per task.
pub struct Stepper<'a> {
    pub shared: &'a SharedRegisters,
    pub sensors: &'a SensorBank,
    pub clock: &'a SimClock,
    last_epoch: [Option<u64>; 4],
}

impl<'a> Stepper<'a> {
    pub fn new(shared: &'a SharedRegisters, sensors: &'a SensorBank, clock: &'a SimClock) -> Self {
        Self {
            shared,
            sensors,
            clock,
            last_epoch: [None; 4],
        }
    }

    /// One tick of `task` at the current time. The clock is not advanced.
    pub fn step<T: ControlTask>(&mut self, task: &mut T) -> TickOutcome {
        let ctx = TickContext::new(
            self.shared.mode.snapshot(),
            self.clock.now(),
            PERIOD,
            self.shared,
            self.sensors,
            self.clock,
        );
        run_once(task, &ctx, &mut self.last_epoch[T::ID.index()])
    }

    pub fn advance(&self) {
        self.clock.advance(PERIOD);
    }

    /// Tick `task` once per period, `ticks` times, and return the last outcome.
    pub fn run<T: ControlTask>(&mut self, task: &mut T, ticks: u32) -> TickOutcome {
        let mut last = self.step(task);
        for _ in 1..ticks {
            self.advance();
            last = self.step(task);
        }
        self.advance();
        last
    }
}

/// Poll `condition` every few milliseconds until it holds or `timeout` passes.
pub fn wait_for(timeout: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(2));
    }
    condition()
}
