pub mod about;
pub mod config;
pub mod generate;
pub mod progress;
pub mod reminder;
pub mod session;
pub mod theme;
pub mod timer;
pub mod watch;
