use academic_muse_core::reminder::next_occurrence;
use academic_muse_core::{Config, KvStore, ReminderBoard};
use chrono::Local;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum ReminderAction {
    /// Show the three reminder slots
    List,
    /// Set a slot's daily time
    Set {
        /// Slot number (1-3)
        slot: u8,
        /// Time of day as HH:MM (24-hour)
        time: String,
    },
    /// Clear a slot
    Delete {
        /// Slot number (1-3)
        slot: u8,
    },
    /// Show when the next reminder will fire
    Next,
}

pub fn run(action: ReminderAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = KvStore::open()?;
    let mut board = ReminderBoard::load(&store, config.reminders)?;

    match action {
        ReminderAction::List => {
            for r in board.reminders() {
                match r.time {
                    Some(t) => println!("{}  {}", r.id, t.format("%H:%M")),
                    None => println!("{}  --:--", r.id),
                }
            }
        }
        ReminderAction::Set { slot, time } => {
            board.set_time(&store, slot, &time)?;
            let r = board.reminder(slot)?;
            if let Some(t) = r.time {
                println!("Reminder {slot} set for {} every day", t.format("%H:%M"));
            }
        }
        ReminderAction::Delete { slot } => {
            board.clear_time(&store, slot)?;
            println!("Reminder {slot} cleared");
        }
        ReminderAction::Next => {
            let now = Local::now();
            let next = board
                .reminders()
                .iter()
                .filter_map(|r| r.time.map(|t| (r.id, next_occurrence(t, &now))))
                .min_by_key(|(_, at)| *at);
            match next {
                Some((slot, at)) => println!(
                    "Reminder {slot} at {} (run `muse watch` to be notified)",
                    at.format("%a %H:%M")
                ),
                None => println!("No reminders set"),
            }
        }
    }
    Ok(())
}
