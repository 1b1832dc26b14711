//! Simulated operator text display.

use parking_lot::Mutex;
use robit_common::consts::{DISPLAY_LINES, DISPLAY_LINE_WIDTH};
use robit_common::hal::driver::{HalError, TextDisplay};
use std::sync::Arc;

/// Lines visible after the last flush.
#[derive(Debug, Default)]
pub(crate) struct DisplayCell {
    pub(crate) lines: [String; DISPLAY_LINES],
    pub(crate) flushes: u64,
}

/// Simulated display with staged and visible line buffers.
pub struct SimDisplay {
    staged: [String; DISPLAY_LINES],
    shown: Arc<Mutex<DisplayCell>>,
}

impl SimDisplay {
    pub(crate) fn new(shown: Arc<Mutex<DisplayCell>>) -> Self {
        Self {
            staged: Default::default(),
            shown,
        }
    }
}

impl TextDisplay for SimDisplay {
    fn set_line(&mut self, line: usize, text: &str) -> Result<(), HalError> {
        let slot = self.staged.get_mut(line).ok_or_else(|| HalError::InvalidChannel {
            device: "display".into(),
            channel: u8::try_from(line).unwrap_or(u8::MAX),
        })?;
        slot.clear();
        slot.extend(text.chars().take(DISPLAY_LINE_WIDTH));
        Ok(())
    }

    fn flush(&mut self) -> Result<(), HalError> {
        let mut shown = self.shown.lock();
        shown.lines.clone_from(&self.staged);
        shown.flushes += 1;
        Ok(())
    }
}
