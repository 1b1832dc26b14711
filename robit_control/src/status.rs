//! Operator status page.
//!
//! Six lines of at most 21 characters, rebuilt every input tick from the
//! shared registers:
//!
//! ```text
//! MODE TELEOP #3
//! SETPT 2.50V
//! SHOOT spin-up q2
//! WINCH winding 1.84V
//! DRV +0.30 -0.25
//! FLT W:SNS
//! ```

use core::fmt::{self, Write};
use robit_common::consts::{DISPLAY_LINES, DISPLAY_LINE_WIDTH};
use robit_common::control::error::TaskFault;
use robit_common::hal::driver::{HalError, TextDisplay};

use crate::registers::{SharedRegisters, TaskId};

/// One display line.
pub type DisplayLine = heapless::String<DISPLAY_LINE_WIDTH>;

/// Writer that drops whatever does not fit.
struct Truncating<'a>(&'a mut DisplayLine);

impl Write for Truncating<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        for c in s.chars() {
            if self.0.push(c).is_err() {
                break;
            }
        }
        Ok(())
    }
}

fn line(args: fmt::Arguments<'_>) -> DisplayLine {
    let mut out = DisplayLine::new();
    // Truncating never fails.
    let _ = Truncating(&mut out).write_fmt(args);
    out
}

/// Rendered page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusPage {
    pub lines: [DisplayLine; DISPLAY_LINES],
}

impl StatusPage {
    /// Build the page from the current register values.
    pub fn render(shared: &SharedRegisters) -> Self {
        let mode = shared.mode.snapshot();
        let shooter = shared.shooter.read();
        let winch = shared.winch.read();
        let drive = shared.drive.read();

        let drive_line = {
            let mut out = line(format_args!("DRV"));
            let mut w = Truncating(&mut out);
            let wide = drive.outputs.len() <= 2;
            for value in &drive.outputs {
                let _ = if wide {
                    write!(w, " {value:+.2}")
                } else {
                    write!(w, " {value:+.1}")
                };
            }
            out
        };

        let tension = match winch.tension {
            Some(v) => line(format_args!(" {v:.2}V")),
            None => line(format_args!(" --")),
        };

        Self {
            lines: [
                line(format_args!("MODE {} #{}", mode.mode.label(), mode.epoch)),
                line(format_args!("SETPT {:.2}V", shared.setpoint.get())),
                line(format_args!("SHOOT {} q{}", shooter.state.label(), shooter.pending)),
                line(format_args!("WINCH {}{}", winch.state.label(), tension)),
                drive_line,
                fault_line(shared),
            ],
        }
    }

    /// Stage every line and flush once.
    pub fn push(&self, display: &mut dyn TextDisplay) -> Result<(), HalError> {
        for (index, text) in self.lines.iter().enumerate() {
            display.set_line(index, text)?;
        }
        display.flush()
    }
}

fn fault_line(shared: &SharedRegisters) -> DisplayLine {
    let mut out = line(format_args!("FLT"));
    let mut w = Truncating(&mut out);
    let mut any = false;

    let config = shared.config_faults();
    if !config.is_empty() {
        any = true;
        write_faults(&mut w, 'C', config);
    }
    for task in TaskId::ALL {
        let faults = shared.health(task).faults;
        if !faults.is_empty() {
            any = true;
            write_faults(&mut w, task.tag(), faults);
        }
    }
    if !any {
        let _ = w.write_str(" -");
    }
    out
}

fn write_faults(w: &mut Truncating<'_>, tag: char, faults: TaskFault) {
    let _ = write!(w, " {tag}:");
    for (i, code) in faults.codes().enumerate() {
        let _ = if i == 0 {
            w.write_str(code)
        } else {
            write!(w, "+{code}")
        };
    }
}
