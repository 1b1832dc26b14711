//! Winch plant model.
//!
//! Integrates the winch motor command into travel, and derives the limit
//! switch level and tension voltage from it. Time comes from
//! [`Instant`] so the plant follows whatever the control tasks do in real
//! time; tests drive it explicitly with [`WinchPlant::advance`].

use parking_lot::Mutex;
use robit_common::hal::config::SimulationConfig;
use std::time::{Duration, Instant};
use tracing::trace;

#[derive(Debug)]
struct PlantState {
    command: f64,
    /// Accumulated full-power-equivalent travel [s].
    travel: f64,
    last_update: Instant,
}

/// Shared winch plant.
#[derive(Debug)]
pub struct WinchPlant {
    travel_s: f64,
    tension_rate: f64,
    tension_rest: f64,
    state: Mutex<PlantState>,
}

impl WinchPlant {
    /// Create a slack plant.
    pub fn new(config: &SimulationConfig) -> Self {
        Self {
            travel_s: config.travel_s.max(0.0),
            tension_rate: config.tension_rate,
            tension_rest: config.tension_rest,
            state: Mutex::new(PlantState {
                command: 0.0,
                travel: 0.0,
                last_update: Instant::now(),
            }),
        }
    }

    fn integrate(&self, state: &mut PlantState, dt: Duration) {
        // Overwinding past the switch is bounded; the motor stalls.
        let max_travel = self.travel_s * 2.0;
        state.travel = (state.travel + state.command * dt.as_secs_f64()).clamp(0.0, max_travel);
    }

    fn catch_up(&self, state: &mut PlantState) {
        let now = Instant::now();
        let dt = now.saturating_duration_since(state.last_update);
        state.last_update = now;
        self.integrate(state, dt);
    }

    /// Apply a new motor command (integrating the previous one first).
    pub fn set_command(&self, command: f64) {
        let mut state = self.state.lock();
        self.catch_up(&mut state);
        state.command = command;
    }

    /// Integrate the current command over `dt` without reading the clock.
    pub fn advance(&self, dt: Duration) {
        let mut state = self.state.lock();
        self.integrate(&mut state, dt);
        state.last_update = Instant::now();
    }

    /// Release the winch: travel returns to slack.
    pub fn release(&self) {
        let mut state = self.state.lock();
        self.catch_up(&mut state);
        trace!(travel = state.travel, "winch plant released");
        state.travel = 0.0;
    }

    /// Limit switch physically closed.
    pub fn at_limit(&self) -> bool {
        let mut state = self.state.lock();
        self.catch_up(&mut state);
        state.travel >= self.travel_s
    }

    /// Tension voltage [V].
    pub fn tension(&self) -> f64 {
        let mut state = self.state.lock();
        self.catch_up(&mut state);
        self.tension_rest + self.tension_rate * state.travel
    }

    /// Accumulated travel [s].
    pub fn travel(&self) -> f64 {
        self.state.lock().travel
    }
}
