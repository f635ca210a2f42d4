//! Input bindings
//!
//! User controls as commands: the period button group, the two overlay
//! checkboxes, a manual refresh and quit. The headless binary reads them
//! one per line from stdin:
//!
//! ```text
//! period 1h
//! ma off
//! fib on
//! refresh
//! quit
//! ```

use std::str::FromStr;

use crate::error::{DashboardError, Result};
use crate::surface::Overlay;
use crate::types::Period;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Period button clicked
    SelectPeriod(Period),
    /// Overlay checkbox changed
    SetOverlay(Overlay, bool),
    /// Poll `latest` now
    Refresh,
    Quit,
}

fn parse_switch(word: Option<&str>) -> Result<bool> {
    match word.map(str::to_ascii_lowercase).as_deref() {
        Some("on" | "show" | "true") => Ok(true),
        Some("off" | "hide" | "false") => Ok(false),
        _ => Err(DashboardError::InvalidCommand("expected on|off".to_string())),
    }
}

impl FromStr for Command {
    type Err = DashboardError;

    fn from_str(line: &str) -> Result<Self> {
        let mut words = line.split_whitespace();
        let verb = words
            .next()
            .ok_or_else(|| DashboardError::InvalidCommand("empty command".to_string()))?
            .to_ascii_lowercase();

        let command = match verb.as_str() {
            "period" | "p" => {
                let period = words
                    .next()
                    .ok_or_else(|| DashboardError::InvalidCommand("period needs a value".to_string()))?;
                Command::SelectPeriod(period.parse()?)
            }
            "ma" => Command::SetOverlay(Overlay::MovingAverages, parse_switch(words.next())?),
            "fib" => Command::SetOverlay(Overlay::Fibonacci, parse_switch(words.next())?),
            "refresh" | "r" => Command::Refresh,
            "quit" | "q" | "exit" => Command::Quit,
            other => return Err(DashboardError::InvalidCommand(format!("unknown command '{other}'"))),
        };

        if let Some(extra) = words.next() {
            return Err(DashboardError::InvalidCommand(format!("unexpected '{extra}'")));
        }
        Ok(command)
    }
}
