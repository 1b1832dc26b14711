//! Winch state machine and release pulse.
//!
//! ```text
//!            edge, limit open            limit trips
//!   Idle ─────────────────────► Winding ─────────────► AtLimit
//!    ▲ ▲                          │ max_wind elapsed      │
//!    │ └──────────────────────────┘ (TIMEOUT)             │ next tick
//!    │◄───────────────────────────────────────────────────┘
//!    │
//!    │ command + override held while limit tripped
//!    ▼
//!  ManualOverride ──(either button released)──► Idle
//! ```
//!
//! A command edge while the limit is tripped and the override is not held
//! is rejected; it never falls through to winding.

use robit_common::control::config::WinchConfig;
use robit_common::control::state::WinchState;
use robit_common::hal::driver::{HalError, PistonOutput};
use robit_common::hal::types::PistonCommand;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Tuning used by [`WinchController`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WinchParams {
    pub wind_power: f64,
    pub manual_power: f64,
    pub max_wind: Duration,
}

impl From<&WinchConfig> for WinchParams {
    fn from(config: &WinchConfig) -> Self {
        Self {
            wind_power: config.wind_power,
            manual_power: config.manual_power,
            max_wind: config.max_wind(),
        }
    }
}

/// Winch state machine. Pure: the caller reads sensors and commands the motor.
#[derive(Debug, Clone)]
pub struct WinchController {
    params: WinchParams,
    state: WinchState,
    command_held: bool,
    override_held: bool,
    pending_edge: bool,
    wind_started: Option<Duration>,
    timed_out: bool,
}

impl WinchController {
    pub fn new(params: WinchParams) -> Self {
        Self {
            params,
            state: WinchState::Idle,
            command_held: false,
            override_held: false,
            pending_edge: false,
            wind_started: None,
            timed_out: false,
        }
    }

    #[inline]
    pub const fn state(&self) -> WinchState {
        self.state
    }

    /// Feed the command button level. A released-to-pressed transition is
    /// recorded for the next tick unless the winch is already winding.
    pub fn on_command_edge(&mut self, pressed: bool) {
        if pressed && !self.command_held && self.state != WinchState::Winding {
            self.pending_edge = true;
        }
        self.command_held = pressed;
    }

    /// Feed the override button level.
    pub fn set_override(&mut self, held: bool) {
        self.override_held = held;
    }

    /// Advance one tick and return the motor command.
    pub fn tick(&mut self, limit_tripped: bool, now: Duration) -> f64 {
        let edge = std::mem::take(&mut self.pending_edge);

        self.state = match self.state {
            WinchState::Idle => self.from_idle(edge, limit_tripped, now),
            WinchState::Winding => {
                let started = self.wind_started.unwrap_or(now);
                if limit_tripped {
                    info!(
                        elapsed_ms = now.saturating_sub(started).as_millis() as u64,
                        "winch at limit"
                    );
                    self.wind_started = None;
                    WinchState::AtLimit
                } else if now.saturating_sub(started) >= self.params.max_wind {
                    warn!(
                        max_wind_ms = self.params.max_wind.as_millis() as u64,
                        "winch wind timed out before reaching the limit"
                    );
                    self.wind_started = None;
                    self.timed_out = true;
                    WinchState::Idle
                } else {
                    WinchState::Winding
                }
            }
            WinchState::AtLimit => WinchState::Idle,
            WinchState::ManualOverride => {
                if self.command_held && self.override_held {
                    WinchState::ManualOverride
                } else {
                    debug!("winch manual override released");
                    WinchState::Idle
                }
            }
        };

        self.motor_command()
    }

    fn from_idle(&mut self, edge: bool, limit_tripped: bool, now: Duration) -> WinchState {
        if limit_tripped && self.command_held && self.override_held {
            info!("winch manual override engaged");
            return WinchState::ManualOverride;
        }
        if !edge {
            return WinchState::Idle;
        }
        if limit_tripped {
            warn!("wind command rejected: limit already tripped (hold override to drive past it)");
            return WinchState::Idle;
        }
        debug!("winch winding");
        self.wind_started = Some(now);
        self.timed_out = false;
        WinchState::Winding
    }

    /// Motor command for the current state.
    pub fn motor_command(&self) -> f64 {
        match self.state {
            WinchState::Winding => self.params.wind_power,
            WinchState::ManualOverride if self.command_held => self.params.manual_power,
            _ => 0.0,
        }
    }

    /// True once after a wind was aborted by `max_wind`.
    pub fn take_timeout(&mut self) -> bool {
        std::mem::take(&mut self.timed_out)
    }

    /// Back to Idle; a pending edge is dropped. Button levels are kept so a
    /// button held across the reset needs a fresh press.
    pub fn reset(&mut self) {
        self.state = WinchState::Idle;
        self.pending_edge = false;
        self.wind_started = None;
        self.timed_out = false;
    }
}

// ─── Release Pulse ──────────────────────────────────────────────────

/// Release piston held Forward for the guard's lifetime.
///
/// Dropping the guard commands the piston back to rest on every exit path,
/// including early returns and cancellation.
pub struct ReleasePulse<'a, P: PistonOutput + ?Sized> {
    piston: &'a mut P,
}

impl<'a, P: PistonOutput + ?Sized> ReleasePulse<'a, P> {
    /// Extend the piston.
    ///
    /// # Errors
    ///
    /// Returns the actuator error if the piston rejects `Forward`; the piston
    /// is still commanded to rest.
    pub fn begin(piston: &'a mut P) -> Result<Self, HalError> {
        if let Err(e) = piston.set(PistonCommand::Forward) {
            let _ = piston.set(PistonCommand::REST);
            return Err(e);
        }
        Ok(Self { piston })
    }
}

impl<P: PistonOutput + ?Sized> Drop for ReleasePulse<'_, P> {
    fn drop(&mut self) {
        if let Err(e) = self.piston.set(PistonCommand::REST) {
            warn!(error = %e, "release piston did not return to rest");
        }
    }
}
