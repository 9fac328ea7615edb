use academic_muse_core::reminder::parse_time_of_day;
use academic_muse_core::{Config, KvStore, SessionScheduler, SessionStatus};
use chrono::Local;
use clap::Subcommand;

use crate::output::{confirm, local_hhmm, print_event, print_event_line};

#[derive(Subcommand)]
pub enum SessionAction {
    /// Book a study session today
    Add {
        /// Start time as HH:MM
        start: String,
        /// End time as HH:MM
        end: String,
    },
    /// List booked sessions
    List {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Advance session statuses to the current time
    Sweep,
    /// Accept the pre-session notification and start studying
    Ack {
        /// Session id
        id: u64,
    },
    /// Dismiss the pre-session notification
    Dismiss {
        /// Session id
        id: u64,
    },
    /// Delete every booked session
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

pub fn run(action: SessionAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = KvStore::open()?;
    let mut scheduler = SessionScheduler::load(&store, config.scheduler)?;
    let now = Local::now();

    match action {
        SessionAction::Add { start, end } => {
            let start = parse_time_of_day(&start)?;
            let end = parse_time_of_day(&end)?;
            let booking = scheduler.add_session_today(&store, start, end, &now)?;
            print_event(&booking.event)?;
            eprintln!(
                "Session #{} booked for {}-{}. Run `muse watch` to be reminded before it starts.",
                booking.session.id,
                local_hhmm(booking.session.start_ms),
                local_hhmm(booking.session.end_ms),
            );
        }
        SessionAction::List { json } => {
            // Bring statuses up to date before showing them.
            scheduler.sweep(&store, &now)?;
            if json {
                println!("{}", serde_json::to_string_pretty(scheduler.sessions())?);
            } else if scheduler.sessions().is_empty() {
                println!("No sessions booked");
            } else {
                println!("{:<4} {:<11} {:>4}  {:<10} DISMISSED", "ID", "TIME", "MIN", "STATUS");
                for s in scheduler.sessions() {
                    println!(
                        "{:<4} {:<11} {:>4}  {:<10} {}",
                        s.id,
                        format!("{}-{}", local_hhmm(s.start_ms), local_hhmm(s.end_ms)),
                        s.duration_minutes(),
                        s.status.label(),
                        s.reminders_count,
                    );
                }
            }
        }
        SessionAction::Sweep => {
            for ev in scheduler.sweep(&store, &now)? {
                print_event_line(&ev)?;
            }
        }
        SessionAction::Ack { id } => {
            scheduler.sweep(&store, &now)?;
            match scheduler.acknowledge(&store, id, &now)? {
                Some(ev) => print_event(&ev)?,
                None => eprintln!("Session #{id} has no pending notification"),
            }
        }
        SessionAction::Dismiss { id } => {
            scheduler.sweep(&store, &now)?;
            match scheduler.dismiss(&store, id, &now)? {
                Some(ev) => print_event(&ev)?,
                None => match scheduler.get(id) {
                    Some(s) if s.status == SessionStatus::Reminder => {
                        eprintln!("Dismissed ({} so far)", s.reminders_count)
                    }
                    _ => eprintln!("Session #{id} has no pending notification"),
                },
            }
        }
        SessionAction::Clear { yes } => {
            let confirmed = yes || confirm("Clear all session history?")?;
            if !confirmed {
                eprintln!("Nothing cleared");
                return Ok(());
            }
            let ev = scheduler.clear_history(&store, confirmed)?;
            print_event(&ev)?;
        }
    }
    Ok(())
}
