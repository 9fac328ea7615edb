use academic_muse_core::{KvStore, Settings};
use tracing::warn;

const ABOUT: &str = "\
Academic Muse -- a study companion for the terminal.

Key features
  explain     Topic explanations written for your academic level
  evaluate    SWOT feedback on your own explanation of a topic
  keypoints   Key points, takeaways, acronyms and resources
  timer       Pomodoro countdown (25-120 minutes) with an audible cue
  reminder    Up to three daily study reminders with snooze
  progress    Weekly chart of the minutes you studied
  session     Book today's study sessions; `muse watch` reminds you before each
";

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    print!("{ABOUT}");
    let store = KvStore::open()?;
    Settings::load(&store)?.mark_about_seen(&store)?;
    Ok(())
}

/// On the very first invocation, point the user at `muse about`.
pub fn first_run_hint() {
    let result = KvStore::open()
        .map_err(academic_muse_core::CoreError::from)
        .and_then(|store| {
            let mut settings = Settings::load(&store)?;
            settings.mark_about_seen(&store)
        });
    match result {
        Ok(true) => {
            eprintln!("Welcome to Academic Muse! Run `muse about` for a tour of the features.")
        }
        Ok(false) => {}
        Err(e) => warn!(error = %e, "could not check onboarding flag"),
    }
}
