use std::io::Write;
use std::time::Duration;

use academic_muse_core::timer::format_clock;
use academic_muse_core::{Config, CountdownTimer, Event};
use clap::Subcommand;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::time::MissedTickBehavior;

use crate::output::print_event_line;

#[derive(Subcommand)]
pub enum TimerAction {
    /// Run a countdown in the foreground.
    ///
    /// While it runs, type `p` to pause or resume, `r` to reset,
    /// `d <minutes>` to change the duration (when paused) and `q` to quit.
    Run {
        /// Session length in minutes
        #[arg(long, short)]
        minutes: Option<i64>,
    },
}

pub fn run(action: TimerAction) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        TimerAction::Run { minutes } => {
            let config = Config::load_or_default();
            let mut timer = CountdownTimer::new(&config.timer);
            if let Some(m) = minutes {
                timer.set_duration(m)?;
            }
            let rt = tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()?;
            rt.block_on(countdown(timer))
        }
    }
}

async fn countdown(mut timer: CountdownTimer) -> Result<(), Box<dyn std::error::Error>> {
    let mut ticker = tokio::time::interval(Duration::from_secs(1));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately.
    ticker.tick().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdin_open = true;

    if let Some(ev) = timer.start() {
        print_event_line(&ev)?;
    }
    draw(&timer);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                if let Some(ev) = timer.tick() {
                    eprint!("\x07");
                    eprintln!();
                    print_event_line(&ev)?;
                    eprintln!("Time's up! Type `p` to start another session or `q` to quit.");
                    if !stdin_open {
                        break;
                    }
                }
                if timer.is_running() {
                    draw(&timer);
                }
            }
            line = lines.next_line(), if stdin_open => {
                let Some(line) = line? else {
                    stdin_open = false;
                    continue;
                };
                let mut words = line.split_whitespace();
                let event = match words.next() {
                    Some("p") | Some("pause") | Some("start") => timer.toggle(),
                    Some("r") | Some("reset") => timer.reset(),
                    Some("d") | Some("duration") => {
                        match words.next().map(str::parse::<i64>) {
                            Some(Ok(m)) => match timer.set_duration(m) {
                                Ok(()) => Some(timer.snapshot()),
                                Err(e) => {
                                    eprintln!("{e}");
                                    None
                                }
                            },
                            _ => {
                                eprintln!("usage: d <minutes>");
                                None
                            }
                        }
                    }
                    Some("q") | Some("quit") => break,
                    Some(other) => {
                        eprintln!("unknown command `{other}` (p, r, d <minutes>, q)");
                        None
                    }
                    None => None,
                };
                if let Some(ev) = event {
                    eprintln!();
                    print_event_line(&ev)?;
                    if matches!(ev, Event::TimerStarted { .. }) {
                        ticker.reset();
                    }
                }
                draw(&timer);
            }
        }
    }
    eprintln!();
    Ok(())
}

fn draw(timer: &CountdownTimer) {
    let pct = (timer.progress() * 100.0).round();
    let state = if timer.is_running() { "" } else { " (paused)" };
    eprint!(
        "\r{} {:>3}%{state}   ",
        format_clock(timer.remaining_secs()),
        pct
    );
    let _ = std::io::stderr().flush();
}
