//! Fire request queue and firing sequencer.
//!
//! Requests and sequences are decoupled by a counting resource: producers
//! (the debounced fire button, the autonomous burst) increment
//! [`FireRequests`]; the [`FiringSequencer`] takes one unit per sequence.
//!
//! ```text
//!   try_take ok          spin_up            pulse             retract
//!  Idle ───────► SpinUp ─────────► Firing ────────► Cooldown ─────────► (try_take)
//!   │  motor on            piston Forward     piston Reverse,
//!   │                                         motor on iff pending > 0
//!   └─ no unit, override held ─► ManualOverride
//! ```

use robit_common::consts::MAX_FIRE_BURST;
use robit_common::control::config::ShooterConfig;
use robit_common::control::state::ShooterState;
use robit_common::hal::types::PistonCommand;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tracing::{debug, info};

// ─── Fire Requests ──────────────────────────────────────────────────

/// Pending fire count. Any thread may request; one consumer takes.
///
/// The count shares one word with the low 32 bits of the mode epoch it
/// belongs to, so [`clear_for`](Self::clear_for) and a late producer
/// holding an older epoch cannot interleave into a stale request.
#[derive(Debug, Default)]
pub struct FireRequests {
    /// `epoch << 32 | count`
    word: AtomicU64,
}

impl FireRequests {
    const COUNT_MASK: u64 = u32::MAX as u64;

    pub const fn new() -> Self {
        Self {
            word: AtomicU64::new(0),
        }
    }

    #[inline]
    const fn count(word: u64) -> u32 {
        (word & Self::COUNT_MASK) as u32
    }

    #[inline]
    const fn epoch_tag(epoch: u64) -> u64 {
        (epoch & Self::COUNT_MASK) << 32
    }

    fn increment(&self, accept: impl Fn(u64) -> bool) -> Option<u32> {
        self.word
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                accept(word).then(|| {
                    let count = Self::count(word).saturating_add(1);
                    (word & !Self::COUNT_MASK) | u64::from(count)
                })
            })
            .ok()
            .map(|previous| Self::count(previous).saturating_add(1))
    }

    /// Add one request (saturating) to the current epoch. Returns the new
    /// pending count.
    pub fn request_fire(&self) -> u32 {
        self.increment(|_| true).unwrap_or(u32::MAX)
    }

    /// Add one request made under mode `epoch`. Dropped, returning `None`,
    /// if the queue has since been cleared for a newer mode.
    pub fn request_fire_in(&self, epoch: u64) -> Option<u32> {
        let tag = Self::epoch_tag(epoch);
        self.increment(|word| (word & !Self::COUNT_MASK) == tag)
    }

    /// Add `count` requests, capped at the largest burst.
    pub fn request_burst(&self, count: u32) {
        for _ in 0..count.min(MAX_FIRE_BURST) {
            self.request_fire();
        }
    }

    /// Take one request if any is pending. Never underflows.
    pub fn try_take(&self) -> bool {
        self.word
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |word| {
                (Self::count(word) > 0).then(|| word - 1)
            })
            .is_ok()
    }

    #[inline]
    pub fn pending(&self) -> u32 {
        Self::count(self.word.load(Ordering::Acquire))
    }

    /// Drop every pending request and start accepting requests for mode
    /// `epoch` only. Returns how many were dropped.
    pub fn clear_for(&self, epoch: u64) -> u32 {
        Self::count(self.word.swap(Self::epoch_tag(epoch), Ordering::AcqRel))
    }
}

// ─── Sequencer ──────────────────────────────────────────────────────

/// Operator buttons for the manual path.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ManualInputs {
    pub override_held: bool,
    pub motor_held: bool,
    pub piston_held: bool,
}

/// Which path produced a [`ShooterCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShooterPath {
    Idle,
    Queue,
    Manual,
}

/// Outputs for one tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShooterCommand {
    pub motor: f64,
    pub piston: PistonCommand,
    pub path: ShooterPath,
}

impl ShooterCommand {
    pub const IDLE: Self = Self {
        motor: 0.0,
        piston: PistonCommand::REST,
        path: ShooterPath::Idle,
    };
}

/// Sequence timing and powers.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerParams {
    pub spin_up: Duration,
    pub pulse: Duration,
    pub retract: Duration,
    pub motor_power: f64,
    pub manual_motor_power: f64,
}

impl From<&ShooterConfig> for SequencerParams {
    fn from(config: &ShooterConfig) -> Self {
        Self {
            spin_up: config.spin_up(),
            pulse: config.pulse(),
            retract: config.retract(),
            motor_power: config.motor_power,
            manual_motor_power: config.manual_motor_power,
        }
    }
}

/// Tick-driven firing sequencer. Never blocks.
#[derive(Debug, Clone)]
pub struct FiringSequencer {
    params: SequencerParams,
    state: ShooterState,
    phase_started: Duration,
    completed: u64,
}

impl FiringSequencer {
    pub fn new(params: SequencerParams) -> Self {
        Self {
            params,
            state: ShooterState::Idle,
            phase_started: Duration::ZERO,
            completed: 0,
        }
    }

    #[inline]
    pub const fn state(&self) -> ShooterState {
        self.state
    }

    /// Sequences that finished their piston pulse.
    #[inline]
    pub const fn completed(&self) -> u64 {
        self.completed
    }

    fn enter(&mut self, state: ShooterState, now: Duration) {
        self.state = state;
        self.phase_started = now;
    }

    /// Advance one tick.
    pub fn tick(
        &mut self,
        now: Duration,
        requests: &FireRequests,
        manual: ManualInputs,
    ) -> ShooterCommand {
        let elapsed = now.saturating_sub(self.phase_started);
        match self.state {
            ShooterState::SpinUp if elapsed >= self.params.spin_up => {
                debug!("shooter firing");
                self.enter(ShooterState::Firing, now);
            }
            ShooterState::Firing if elapsed >= self.params.pulse => {
                self.completed += 1;
                self.enter(ShooterState::Cooldown, now);
            }
            ShooterState::Cooldown if elapsed >= self.params.retract => {
                self.state = ShooterState::Idle;
            }
            _ => {}
        }

        if matches!(self.state, ShooterState::Idle | ShooterState::ManualOverride) {
            if requests.try_take() {
                info!(pending = requests.pending(), "fire sequence started");
                self.enter(ShooterState::SpinUp, now);
            } else if manual.override_held {
                if self.state != ShooterState::ManualOverride {
                    info!("shooter manual override engaged");
                }
                self.state = ShooterState::ManualOverride;
            } else {
                self.state = ShooterState::Idle;
            }
        }

        let power = self.params.motor_power;
        match self.state {
            ShooterState::Idle => ShooterCommand::IDLE,
            ShooterState::SpinUp => ShooterCommand {
                motor: power,
                piston: PistonCommand::REST,
                path: ShooterPath::Queue,
            },
            ShooterState::Firing => ShooterCommand {
                motor: power,
                piston: PistonCommand::Forward,
                path: ShooterPath::Queue,
            },
            ShooterState::Cooldown => ShooterCommand {
                motor: if requests.pending() > 0 { power } else { 0.0 },
                piston: PistonCommand::REST,
                path: ShooterPath::Queue,
            },
            ShooterState::ManualOverride => ShooterCommand {
                motor: if manual.motor_held {
                    self.params.manual_motor_power
                } else {
                    0.0
                },
                piston: if manual.piston_held {
                    PistonCommand::Forward
                } else {
                    PistonCommand::REST
                },
                path: ShooterPath::Manual,
            },
        }
    }

    /// Abandon any sequence in progress.
    pub fn reset(&mut self) {
        self.state = ShooterState::Idle;
        self.phase_started = Duration::ZERO;
    }
}
