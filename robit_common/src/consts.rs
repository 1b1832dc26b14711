//! Workspace-wide constants.

/// Shortest task period accepted from configuration [ms].
pub const MIN_TASK_PERIOD_MS: u64 = 10;

/// Longest task period accepted from configuration [ms].
pub const MAX_TASK_PERIOD_MS: u64 = 1000;

/// Default task period [ms].
pub const DEFAULT_TASK_PERIOD_MS: u64 = 10;

/// Shortest sleep that ends every task iteration [ms].
pub const MIN_TICK_SLEEP_MS: u64 = 1;

/// Shortest debounce window accepted for the fire trigger [ms].
pub const MIN_FIRE_DEBOUNCE_MS: u64 = 200;

/// Largest autonomous fire burst.
pub const MAX_FIRE_BURST: u32 = 32;

/// Number of lines on the operator text display.
pub const DISPLAY_LINES: usize = 6;

/// Characters per display line.
pub const DISPLAY_LINE_WIDTH: usize = 21;

/// Number of joystick axis channels (1-based addressing).
pub const JOYSTICK_AXES: u8 = 6;

/// Number of joystick button channels (1-based addressing).
pub const JOYSTICK_BUTTONS: u8 = 12;

/// Motor command that leaves the output unpowered.
pub const MOTOR_NEUTRAL: f64 = 0.0;
