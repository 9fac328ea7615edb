//! Pomodoro countdown engine.
//!
//! A single-session countdown. It has no internal thread: the caller is
//! responsible for calling `tick()` once per second while the timer runs.
//!
//! ## State Transitions
//!
//! ```text
//! Idle -> Running <-> Paused
//!            |
//!            v
//!        Completed -> (start) -> Running
//! ```
//!
//! ## Usage
//!
//! ```ignore
//! let mut timer = CountdownTimer::new(&config.timer);
//! timer.start();
//! // Once per second:
//! if let Some(Event::TimerCompleted { .. }) = timer.tick() { ring(); }
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ValidationError;
use crate::events::Event;
use crate::storage::TimerConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimerState {
    Idle,
    Running,
    Paused,
    /// Countdown reached zero; the completion cue has been emitted.
    Completed,
}

/// Countdown engine.
///
/// `remaining_secs` always lies in `[0, duration_secs]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountdownTimer {
    state: TimerState,
    duration_secs: u64,
    remaining_secs: u64,
    min_minutes: u32,
    max_minutes: u32,
}

impl CountdownTimer {
    /// Create an idle timer loaded with the configured default duration.
    pub fn new(cfg: &TimerConfig) -> Self {
        let minutes = cfg.default_minutes.clamp(cfg.min_minutes, cfg.max_minutes);
        let duration_secs = u64::from(minutes) * 60;
        Self {
            state: TimerState::Idle,
            duration_secs,
            remaining_secs: duration_secs,
            min_minutes: cfg.min_minutes,
            max_minutes: cfg.max_minutes,
        }
    }

    // ── Queries ──────────────────────────────────────────────────────

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == TimerState::Running
    }

    pub fn duration_secs(&self) -> u64 {
        self.duration_secs
    }

    pub fn remaining_secs(&self) -> u64 {
        self.remaining_secs
    }

    /// 0.0 .. 1.0 elapsed fraction, for display only.
    pub fn progress(&self) -> f64 {
        if self.duration_secs == 0 {
            return 0.0;
        }
        (self.duration_secs - self.remaining_secs) as f64 / self.duration_secs as f64
    }

    pub fn snapshot(&self) -> Event {
        Event::TimerSnapshot {
            running: self.is_running(),
            duration_secs: self.duration_secs,
            remaining_secs: self.remaining_secs,
            progress: self.progress(),
            at: Utc::now(),
        }
    }

    // ── Commands ─────────────────────────────────────────────────────

    /// Change the session length. Also reloads the remaining time.
    pub fn set_duration(&mut self, minutes: i64) -> Result<(), ValidationError> {
        if self.is_running() {
            return Err(ValidationError::TimerRunning);
        }
        if minutes < i64::from(self.min_minutes) || minutes > i64::from(self.max_minutes) {
            return Err(ValidationError::TimerDuration {
                min: self.min_minutes,
                max: self.max_minutes,
                got: minutes,
            });
        }
        self.duration_secs = minutes as u64 * 60;
        self.remaining_secs = self.duration_secs;
        if self.state == TimerState::Completed {
            self.state = TimerState::Idle;
        }
        Ok(())
    }

    pub fn start(&mut self) -> Option<Event> {
        if self.is_running() {
            return None;
        }
        if self.remaining_secs == 0 {
            self.remaining_secs = self.duration_secs;
        }
        self.state = TimerState::Running;
        debug!(remaining = self.remaining_secs, "countdown started");
        Some(Event::TimerStarted {
            duration_secs: self.duration_secs,
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    pub fn pause(&mut self) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        self.state = TimerState::Paused;
        Some(Event::TimerPaused {
            remaining_secs: self.remaining_secs,
            at: Utc::now(),
        })
    }

    /// Start when stopped, pause when running.
    pub fn toggle(&mut self) -> Option<Event> {
        if self.is_running() {
            self.pause()
        } else {
            self.start()
        }
    }

    pub fn reset(&mut self) -> Option<Event> {
        self.state = TimerState::Idle;
        self.remaining_secs = self.duration_secs;
        Some(Event::TimerReset {
            duration_secs: self.duration_secs,
            at: Utc::now(),
        })
    }

    /// Advance one second. Returns `Some(Event::TimerCompleted)` exactly once,
    /// on the tick that reaches zero.
    pub fn tick(&mut self) -> Option<Event> {
        if !self.is_running() {
            return None;
        }
        self.remaining_secs = self.remaining_secs.saturating_sub(1);
        if self.remaining_secs == 0 {
            self.state = TimerState::Completed;
            debug!("countdown completed");
            return Some(Event::TimerCompleted {
                duration_secs: self.duration_secs,
                at: Utc::now(),
            });
        }
        None
    }
}

/// Render seconds as `M:SS`.
pub fn format_clock(secs: u64) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn timer() -> CountdownTimer {
        CountdownTimer::new(&TimerConfig::default())
    }

    #[test]
    fn starts_idle_with_default_duration() {
        let t = timer();
        assert_eq!(t.state(), TimerState::Idle);
        assert_eq!(t.duration_secs(), 25 * 60);
        assert_eq!(t.remaining_secs(), 25 * 60);
        assert_eq!(t.progress(), 0.0);
    }

    #[test]
    fn start_pause_toggle() {
        let mut t = timer();
        assert!(t.start().is_some());
        assert!(t.start().is_none());
        t.tick();
        assert!(matches!(
            t.toggle(),
            Some(Event::TimerPaused { remaining_secs, .. }) if remaining_secs == 25 * 60 - 1
        ));
        assert_eq!(t.state(), TimerState::Paused);
        assert!(t.tick().is_none());
        assert_eq!(t.remaining_secs(), 25 * 60 - 1);
        assert!(matches!(t.toggle(), Some(Event::TimerStarted { .. })));
        assert!(t.is_running());
    }

    #[test]
    fn set_duration_bounds() {
        let mut t = timer();
        assert!(matches!(
            t.set_duration(24),
            Err(ValidationError::TimerDuration { got: 24, .. })
        ));
        assert!(t.set_duration(121).is_err());
        assert_eq!(t.duration_secs(), 25 * 60);
        t.set_duration(120).unwrap();
        assert_eq!(t.duration_secs(), 7200);
        assert_eq!(t.remaining_secs(), 7200);
    }

    #[test]
    fn set_duration_rejected_while_running() {
        let mut t = timer();
        t.start();
        assert_eq!(t.set_duration(30), Err(ValidationError::TimerRunning));
    }

    #[test]
    fn reset_reloads_duration() {
        let mut t = timer();
        t.start();
        for _ in 0..90 {
            t.tick();
        }
        t.reset();
        assert_eq!(t.state(), TimerState::Idle);
        assert_eq!(t.remaining_secs(), 25 * 60);
    }

    #[test]
    fn completion_fires_once_and_restart_reloads() {
        let mut t = timer();
        t.start();
        let mut completions = 0;
        for _ in 0..(25 * 60 + 10) {
            if matches!(t.tick(), Some(Event::TimerCompleted { .. })) {
                completions += 1;
            }
        }
        assert_eq!(completions, 1);
        assert_eq!(t.remaining_secs(), 0);
        assert_eq!(t.progress(), 1.0);

        t.start();
        assert_eq!(t.remaining_secs(), 25 * 60);
        assert!(t.is_running());
    }

    #[test]
    fn clock_format() {
        assert_eq!(format_clock(1500), "25:00");
        assert_eq!(format_clock(69), "1:09");
        assert_eq!(format_clock(0), "0:00");
    }

    proptest! {
        #[test]
        fn full_run_reaches_exactly_zero(minutes in 25i64..=120) {
            let mut t = timer();
            t.set_duration(minutes).unwrap();
            t.start();
            let ticks = minutes * 60;
            for i in 0..ticks {
                let ev = t.tick();
                prop_assert_eq!(ev.is_some(), i == ticks - 1);
            }
            prop_assert_eq!(t.remaining_secs(), 0);
            prop_assert!(!t.is_running());
        }

        #[test]
        fn remaining_never_exceeds_duration(ops in proptest::collection::vec(0u8..4, 0..200)) {
            let mut t = timer();
            for op in ops {
                match op {
                    0 => { t.start(); }
                    1 => { t.pause(); }
                    2 => { t.reset(); }
                    _ => { t.tick(); }
                }
                prop_assert!(t.remaining_secs() <= t.duration_secs());
            }
        }
    }
}
