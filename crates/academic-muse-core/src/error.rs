//! Core error types for academic-muse-core.
//!
//! Every failure is terminal for the action that triggered it and leaves
//! prior state unchanged. The categories mirror how a caller reacts:
//! configuration problems are fatal, remote failures are shown verbatim,
//! validation failures are shown as a blocking message.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for academic-muse-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Key-value store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// Text-generation errors
    #[error(transparent)]
    GenAi(#[from] GenAiError),
}

/// Key-value store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked by another writer
    #[error("Store is locked")]
    Locked,

    /// Data directory could not be resolved or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Unknown configuration key
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// User input that fails a range or consistency check.
///
/// The display text is what the user sees.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Pomodoro duration must be between {min} and {max} minutes (got {got}).")]
    TimerDuration { min: u32, max: u32, got: i64 },

    #[error("Duration cannot be changed while the timer is running.")]
    TimerRunning,

    #[error("Invalid time of day '{0}': expected HH:MM.")]
    TimeOfDay(String),

    #[error("Unknown reminder slot {0}: expected 1, 2 or 3.")]
    ReminderSlot(u8),

    #[error("Session start time must be in the future.")]
    StartNotInFuture,

    #[error("Session must be scheduled for today.")]
    NotToday,

    #[error("Session duration must be between {min} and {max} minutes.")]
    SessionDuration { min: i64, max: i64 },

    #[error("The new session overlaps with session #{existing}. Please choose a different time.")]
    Overlap { existing: u64 },

    #[error("No session with id {0}.")]
    UnknownSession(u64),

    #[error("Clearing session history requires confirmation.")]
    NotConfirmed,

    #[error("Please enter a valid duration.")]
    NonPositiveDuration,

    #[error("Invalid date '{0}': expected YYYY-MM-DD.")]
    Date(String),

    #[error("Please enter a topic name.")]
    EmptyTopic,

    #[error("Please provide your explanation.")]
    EmptyExplanation,
}

/// Text-generation errors.
#[derive(Error, Debug)]
pub enum GenAiError {
    /// Endpoint or credential absent from the environment
    #[error("text-generation endpoint is not configured: {0} is not set")]
    NotConfigured(&'static str),

    /// The endpoint answered with a non-success status
    #[error("text-generation request failed (HTTP {status}): {body}")]
    Remote { status: u16, body: String },

    /// Transport-level failure
    #[error("text-generation request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(e, _msg)
                if e.code == rusqlite::ErrorCode::DatabaseBusy
                    || e.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                StoreError::Locked
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}
