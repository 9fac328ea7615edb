//! # Academic Muse Core Library
//!
//! Business logic for the Academic Muse study companion. Every operation is
//! available through the `muse` CLI, which is a thin shell over this crate.
//!
//! ## Architecture
//!
//! - **Countdown**: a Pomodoro state machine advanced by caller-driven `tick()`
//! - **Reminders**: three daily time-of-day slots with snooze and a FIFO of
//!   reminders waiting to be shown
//! - **Scheduler**: same-day session booking with an explicit status
//!   transition function, driven by a periodic sweep
//! - **Progress**: append-only study log bucketed into the current week
//! - **Storage**: SQLite key-value store and TOML configuration
//! - **Text generation**: one chat-completion contract, three prompts
//!
//! Components never share storage keys and only talk to each other through
//! their owner (the CLI).

pub mod error;
pub mod events;
pub mod genai;
pub mod progress;
pub mod reminder;
pub mod scheduler;
pub mod settings;
pub mod storage;
pub mod timer;
pub mod trigger;

pub use error::{ConfigError, CoreError, GenAiError, StoreError, ValidationError};
pub use events::Event;
pub use genai::{AcademicLevel, AiSettings, Prompt, TextGenClient};
pub use progress::{DayTotal, StudyRecord, WeeklyProgress};
pub use reminder::{Reminder, ReminderBoard, SnoozeOutcome};
pub use scheduler::{Booking, Session, SessionScheduler, SessionStatus};
pub use settings::Settings;
pub use storage::{Config, KvStore};
pub use timer::{CountdownTimer, TimerState};
pub use trigger::{ArmedTrigger, TriggerSet};
