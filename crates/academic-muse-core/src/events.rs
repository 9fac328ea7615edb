use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::scheduler::SessionStatus;

/// Every state change in the system produces an Event.
/// The CLI prints them as JSON; the watch loop reacts to them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Event {
    TimerStarted {
        duration_secs: u64,
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerPaused {
        remaining_secs: u64,
        at: DateTime<Utc>,
    },
    TimerReset {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// Countdown reached zero. Emitted once per run; the caller plays the cue.
    TimerCompleted {
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    TimerSnapshot {
        running: bool,
        duration_secs: u64,
        remaining_secs: u64,
        progress: f64,
        at: DateTime<Utc>,
    },
    /// A reminder is now the visible one.
    ReminderFiring {
        slot: u8,
        snooze_count: u8,
        snoozes_left: u8,
        at: DateTime<Utc>,
    },
    ReminderSnoozed {
        slot: u8,
        snooze_count: u8,
        refire_in_secs: u64,
        at: DateTime<Utc>,
    },
    /// The user started studying or cancelled for today.
    ReminderClosed {
        slot: u8,
        started: bool,
        at: DateTime<Utc>,
    },
    SessionScheduled {
        id: u64,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        at: DateTime<Utc>,
    },
    SessionTransitioned {
        id: u64,
        from: SessionStatus,
        to: SessionStatus,
        at: DateTime<Utc>,
    },
    SessionHistoryCleared {
        removed: usize,
        at: DateTime<Utc>,
    },
}
