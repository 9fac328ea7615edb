mod engine;

pub use engine::{format_clock, CountdownTimer, TimerState};
