//! Shared registers between the control tasks.
//!
//! | Register            | Writer            | Readers          |
//! |---------------------|-------------------|------------------|
//! | `mode`              | lifecycle hook    | every task       |
//! | `setpoint`          | input task        | winch, input     |
//! | `fire`              | any producer      | shooter task     |
//! | `drive`             | drive task        | input (display)  |
//! | `winch`             | winch task        | input (display)  |
//! | `shooter`           | shooter task      | input (display)  |
//! | `health[task]`      | that task's loop  | input, tests     |
//!
//! Readers tolerate values one tick stale.

use parking_lot::RwLock;
use robit_common::control::config::AutonomousScript;
use robit_common::control::error::TaskFault;
use robit_common::control::state::{RobotMode, ShooterState, WinchState};
use std::sync::atomic::{AtomicBool, AtomicU8, AtomicU64, Ordering};
use tracing::{debug, info};

use crate::shooter::FireRequests;

// ─── Task Identity ──────────────────────────────────────────────────

/// The four periodic tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum TaskId {
    Drive = 0,
    Input = 1,
    Winch = 2,
    Shooter = 3,
}

impl TaskId {
    pub const ALL: [Self; 4] = [Self::Drive, Self::Input, Self::Winch, Self::Shooter];

    pub const fn name(self) -> &'static str {
        match self {
            Self::Drive => "drive",
            Self::Input => "input",
            Self::Winch => "winch",
            Self::Shooter => "shooter",
        }
    }

    /// Single-letter tag for the status display.
    pub const fn tag(self) -> char {
        match self {
            Self::Drive => 'D',
            Self::Input => 'I',
            Self::Winch => 'W',
            Self::Shooter => 'S',
        }
    }

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

// ─── Mode Register ──────────────────────────────────────────────────

/// Mode and transition epoch read together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeSnapshot {
    pub mode: RobotMode,
    /// Bumped on every transition.
    pub epoch: u64,
}

/// Mode in the low byte, epoch in the upper 56 bits.
#[derive(Debug)]
pub struct ModeRegister {
    word: AtomicU64,
}

impl ModeRegister {
    const MODE_BITS: u32 = 8;

    pub const fn new() -> Self {
        Self {
            word: AtomicU64::new(RobotMode::Disabled as u64),
        }
    }

    #[inline]
    const fn pack(mode: RobotMode, epoch: u64) -> u64 {
        (epoch << Self::MODE_BITS) | mode as u64
    }

    #[inline]
    fn unpack(word: u64) -> ModeSnapshot {
        ModeSnapshot {
            // Only `pack` writes the word; an unknown byte reads as Disabled.
            mode: RobotMode::from_u8((word & 0xFF) as u8).unwrap_or(RobotMode::Disabled),
            epoch: word >> Self::MODE_BITS,
        }
    }

    #[inline]
    pub fn snapshot(&self) -> ModeSnapshot {
        Self::unpack(self.word.load(Ordering::Acquire))
    }

    /// Switch to `mode` with a new epoch. Returns `None` if `mode` is
    /// already active.
    pub fn transition(&self, mode: RobotMode) -> Option<ModeSnapshot> {
        self.word
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                let current = Self::unpack(word);
                (current.mode != mode).then(|| Self::pack(mode, current.epoch + 1))
            })
            .ok()
            .map(|previous| ModeSnapshot {
                mode,
                epoch: Self::unpack(previous).epoch + 1,
            })
    }
}

impl Default for ModeRegister {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Setpoint Register ──────────────────────────────────────────────

/// Winch tension setpoint [V], stored as `f64` bits.
#[derive(Debug)]
pub struct SetpointRegister {
    bits: AtomicU64,
}

impl SetpointRegister {
    pub fn new(volts: f64) -> Self {
        Self {
            bits: AtomicU64::new(volts.to_bits()),
        }
    }

    #[inline]
    pub fn get(&self) -> f64 {
        f64::from_bits(self.bits.load(Ordering::Acquire))
    }

    #[inline]
    pub fn set(&self, volts: f64) {
        self.bits.store(volts.to_bits(), Ordering::Release);
    }
}

// ─── Status Registers ───────────────────────────────────────────────

/// Single-writer snapshot register.
#[derive(Debug, Default)]
pub struct Register<T> {
    value: RwLock<T>,
}

impl<T: Clone> Register<T> {
    pub fn new(value: T) -> Self {
        Self {
            value: RwLock::new(value),
        }
    }

    /// Copy of the current value.
    pub fn read(&self) -> T {
        self.value.read().clone()
    }

    pub fn write(&self, value: T) {
        *self.value.write() = value;
    }

    /// Modify in place.
    pub fn update(&self, f: impl FnOnce(&mut T)) {
        let mut guard = self.value.write();
        f(&mut *guard);
    }
}

/// Last drive outputs in layout order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriveStatus {
    pub outputs: heapless::Vec<f64, 4>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct WinchStatus {
    pub state: WinchState,
    pub motor: f64,
    /// Last tension reading [V], if any.
    pub tension: Option<f64>,
    pub limit_tripped: bool,
    pub releases: u32,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShooterStatus {
    pub state: ShooterState,
    pub pending: u32,
    pub completed: u64,
}

/// Per-task loop health.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskHealth {
    pub ticks: u64,
    /// Faults of the current streak; empty once the task recovers.
    pub faults: TaskFault,
    pub total_faults: u64,
}

// ─── Shared Registers ───────────────────────────────────────────────

/// Everything the tasks share.
#[derive(Debug)]
pub struct SharedRegisters {
    pub mode: ModeRegister,
    pub setpoint: SetpointRegister,
    pub fire: FireRequests,
    pub drive: Register<DriveStatus>,
    pub winch: Register<WinchStatus>,
    pub shooter: Register<ShooterStatus>,
    health: [Register<TaskHealth>; 4],
    config_faults: AtomicU8,
    script: AutonomousScript,
    shutdown: AtomicBool,
}

impl SharedRegisters {
    pub fn new(tension_setpoint: f64, script: AutonomousScript) -> Self {
        Self {
            mode: ModeRegister::new(),
            setpoint: SetpointRegister::new(tension_setpoint),
            fire: FireRequests::new(),
            drive: Register::default(),
            winch: Register::default(),
            shooter: Register::default(),
            health: Default::default(),
            config_faults: AtomicU8::new(0),
            script,
            shutdown: AtomicBool::new(false),
        }
    }

    /// Mode-entry hook.
    ///
    /// Bumps the epoch, drops pending fire requests and runs the fire part
    /// of the autonomous script. Re-entering the active mode is ignored and
    /// returns false.
    pub fn enter_mode(&self, mode: RobotMode) -> bool {
        let Some(snapshot) = self.mode.transition(mode) else {
            debug!(mode = mode.label(), "mode already active, entry ignored");
            return false;
        };
        let dropped = self.fire.clear_for(snapshot.epoch);
        info!(
            mode = mode.label(),
            epoch = snapshot.epoch,
            dropped_fire_requests = dropped,
            "mode entered"
        );

        if mode == RobotMode::Autonomous {
            if let AutonomousScript::FireBurst { count } = self.script {
                info!(count, "autonomous fire burst queued");
                self.fire.request_burst(count);
            }
        }
        true
    }

    pub fn health(&self, task: TaskId) -> TaskHealth {
        self.health[task.index()].read()
    }

    pub(crate) fn health_register(&self, task: TaskId) -> &Register<TaskHealth> {
        &self.health[task.index()]
    }

    /// Faults raised while loading configuration (e.g. `CONFIG_CLAMPED`).
    pub fn record_config_faults(&self, faults: TaskFault) {
        self.config_faults.fetch_or(faults.bits(), Ordering::AcqRel);
    }

    pub fn config_faults(&self) -> TaskFault {
        TaskFault::from_bits_truncate(self.config_faults.load(Ordering::Acquire))
    }

    pub fn request_shutdown(&self) {
        if !self.shutdown.swap(true, Ordering::AcqRel) {
            info!("shutdown requested");
        }
    }

    #[inline]
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown.load(Ordering::Acquire)
    }
}
