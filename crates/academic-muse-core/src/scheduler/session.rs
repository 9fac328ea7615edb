//! Scheduled study session and its lifecycle.
//!
//! ```text
//! upcoming --tick in [start - window, start)--> reminder
//! reminder --acknowledge--> ongoing --tick at end--> completed
//! reminder --dismiss x max | past start + window--> skipped
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionStatus {
    Upcoming,
    Reminder,
    Ongoing,
    Completed,
    Skipped,
}

impl SessionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, SessionStatus::Completed | SessionStatus::Skipped)
    }

    pub fn label(self) -> &'static str {
        match self {
            SessionStatus::Upcoming => "upcoming",
            SessionStatus::Reminder => "reminder",
            SessionStatus::Ongoing => "ongoing",
            SessionStatus::Completed => "completed",
            SessionStatus::Skipped => "skipped",
        }
    }

    /// Compute the next status. Pure: the caller supplies the clock.
    pub fn transition(self, event: SessionEvent, at: &Timing) -> SessionStatus {
        use SessionEvent::*;
        use SessionStatus::*;

        match (self, event) {
            (Upcoming, Tick)
                if at.now_ms >= at.start_ms - at.window_ms && at.now_ms < at.start_ms =>
            {
                Reminder
            }
            (Reminder, Tick) if at.now_ms >= at.start_ms + at.window_ms => Skipped,
            (Reminder, Acknowledge) => Ongoing,
            (Reminder, Dismiss { count }) => {
                if count >= at.max_dismissals || at.now_ms >= at.start_ms + at.window_ms {
                    Skipped
                } else {
                    Reminder
                }
            }
            (Ongoing, Tick) if at.now_ms >= at.end_ms => Completed,
            (status, _) => status,
        }
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Inputs to a lifecycle transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Periodic sweep.
    Tick,
    /// User accepted the pre-session notification.
    Acknowledge,
    /// User dismissed the notification; `count` includes this dismissal.
    Dismiss { count: u32 },
}

/// Clock and thresholds a transition is evaluated against.
#[derive(Debug, Clone, Copy)]
pub struct Timing {
    pub now_ms: i64,
    pub start_ms: i64,
    pub end_ms: i64,
    pub window_ms: i64,
    pub max_dismissals: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: u64,
    /// Epoch milliseconds.
    #[serde(rename = "start")]
    pub start_ms: i64,
    /// Epoch milliseconds.
    #[serde(rename = "end")]
    pub end_ms: i64,
    pub status: SessionStatus,
    pub reminders_count: u32,
}

impl Session {
    /// Half-open interval overlap: `[s1, e1)` and `[s2, e2)` overlap iff
    /// `s1 < e2 && s2 < e1`.
    pub fn overlaps(&self, other: &Session) -> bool {
        intervals_overlap(self.start_ms, self.end_ms, other.start_ms, other.end_ms)
    }

    pub fn duration_minutes(&self) -> i64 {
        (self.end_ms - self.start_ms) / 60_000
    }
}

pub fn intervals_overlap(s1: i64, e1: i64, s2: i64, e2: i64) -> bool {
    s1 < e2 && s2 < e1
}
