mod config;
pub mod kv;

pub use config::{AiConfig, Config, ReminderConfig, SchedulerConfig, TimerConfig};
pub use kv::KvStore;

use std::path::PathBuf;

use crate::error::StoreError;

/// Storage keys. Each component reads and writes only its own keys.
pub mod keys {
    pub const DARK_MODE: &str = "darkMode";
    pub const SEEN_ABOUT: &str = "seenAbout";
    pub const STUDY_SESSIONS: &str = "studySessions";
    pub const WEEKLY_LOG: &str = "weeklyStudyLog";
    pub const TOPIC_EXPLANATION: &str = "topicExplanation";
    pub const KEY_POINTS: &str = "topicContent";
    pub const UNDERSTANDING_FEEDBACK: &str = "understandingFeedback";

    /// Per-slot reminder time key (`reminderTime1` .. `reminderTime3`).
    pub fn reminder_time(slot: u8) -> String {
        format!("reminderTime{slot}")
    }
}

/// Returns `~/.config/academic-muse[-dev]/` based on MUSE_ENV.
///
/// Set MUSE_ENV=dev to use development data directory.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> Result<PathBuf, StoreError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("MUSE_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("academic-muse-dev")
    } else {
        base_dir.join("academic-muse")
    };

    std::fs::create_dir_all(&dir)
        .map_err(|e| StoreError::DataDir(format!("{}: {e}", dir.display())))?;
    Ok(dir)
}
