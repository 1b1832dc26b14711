//! Trigger conditioning for operator buttons.

use std::time::Duration;

/// Rising-edge detector.
#[derive(Debug, Clone, Copy, Default)]
pub struct EdgeDetector {
    previous: bool,
}

impl EdgeDetector {
    pub const fn new() -> Self {
        Self { previous: false }
    }

    /// True on a released-to-pressed transition.
    #[inline]
    pub fn rising(&mut self, level: bool) -> bool {
        let rose = level && !self.previous;
        self.previous = level;
        rose
    }
}

/// Rising-edge detector that accepts at most one edge per window.
///
/// An edge is accepted only if no edge was accepted in the preceding
/// `window`; rejected edges do not extend the window.
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    edge: EdgeDetector,
    last_accepted: Option<Duration>,
}

impl Debouncer {
    pub const fn new(window: Duration) -> Self {
        Self {
            window,
            edge: EdgeDetector::new(),
            last_accepted: None,
        }
    }

    /// Feed the current button level. Returns true for an accepted press.
    pub fn update(&mut self, pressed: bool, now: Duration) -> bool {
        if !self.edge.rising(pressed) {
            return false;
        }
        let open = self
            .last_accepted
            .is_none_or(|last| now.saturating_sub(last) >= self.window);
        if open {
            self.last_accepted = Some(now);
        }
        open
    }

    /// Reopen the window. The last seen level is kept, so a button held
    /// across the reset is not a new press.
    pub fn reset(&mut self) {
        self.last_accepted = None;
    }
}
