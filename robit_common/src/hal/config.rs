//! Simulation backend configuration (`[simulation]` section).

use serde::{Deserialize, Serialize};

/// Winch plant model used by the simulation backend.
///
/// While the winch motor runs, the simulated tension voltage rises at
/// `tension_rate * command` volts per second and the limit switch closes
/// once the accumulated travel reaches `travel_s` seconds at full power.
///
/// # TOML Example
///
/// ```toml
/// [simulation]
/// winch_plant = true
/// travel_s = 2.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationConfig {
    /// Integrate winch motion into the limit switch and tension sensor.
    pub winch_plant: bool,
    /// Full-power travel time until the limit switch closes [s].
    pub travel_s: f64,
    /// Tension rise per second at full power [V/s].
    pub tension_rate: f64,
    /// Tension reading with the winch slack [V].
    pub tension_rest: f64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            winch_plant: true,
            travel_s: 2.0,
            tension_rate: 1.5,
            tension_rest: 0.5,
        }
    }
}
