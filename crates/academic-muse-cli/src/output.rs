//! Shared printing helpers for CLI commands.

use std::io::{self, BufRead, Write};

use academic_muse_core::Event;
use chrono::{DateTime, Local};

/// Print an event as pretty JSON on stdout.
pub fn print_event(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(event)?);
    Ok(())
}

/// Print an event as one JSON line, for streaming output.
pub fn print_event_line(event: &Event) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string(event)?);
    Ok(())
}

/// Epoch milliseconds as local `HH:MM`.
pub fn local_hhmm(ms: i64) -> String {
    DateTime::from_timestamp_millis(ms)
        .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "??:??".into())
}

/// Ask a yes/no question on stderr and read the answer from stdin.
pub fn confirm(question: &str) -> io::Result<bool> {
    eprint!("{question} [y/N] ");
    io::stderr().flush()?;
    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}
