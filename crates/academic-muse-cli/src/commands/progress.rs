use academic_muse_core::progress::parse_date;
use academic_muse_core::{DayTotal, KvStore, WeeklyProgress};
use chrono::{Local, NaiveDate};
use clap::Subcommand;

use crate::output::confirm;

const BAR_WIDTH: f64 = 40.0;

#[derive(Subcommand)]
pub enum ProgressAction {
    /// Log minutes studied
    Add {
        /// Minutes studied
        minutes: f64,
        /// Day studied as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
    },
    /// Show the week's chart
    Week {
        /// Any day of the week to show, as YYYY-MM-DD (defaults to today)
        #[arg(long)]
        date: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Delete the study log
    Clear {
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },
}

fn day_or_today(raw: Option<String>) -> Result<NaiveDate, Box<dyn std::error::Error>> {
    match raw {
        Some(raw) => Ok(parse_date(&raw)?),
        None => Ok(Local::now().date_naive()),
    }
}

pub fn run(action: ProgressAction) -> Result<(), Box<dyn std::error::Error>> {
    let store = KvStore::open()?;
    let mut progress = WeeklyProgress::load(&store)?;

    match action {
        ProgressAction::Add { minutes, date } => {
            let date = day_or_today(date)?;
            progress.add_session(&store, date, minutes)?;
            println!("Logged {minutes} min on {date}");
        }
        ProgressAction::Week { date, json } => {
            let totals = progress.weekly_totals(day_or_today(date)?);
            if json {
                println!("{}", serde_json::to_string_pretty(&totals)?);
            } else {
                print!("{}", chart(&totals));
            }
        }
        ProgressAction::Clear { yes } => {
            if yes || confirm("Delete the whole study log?")? {
                progress.clear(&store)?;
                println!("Study log cleared");
            } else {
                eprintln!("Nothing cleared");
            }
        }
    }
    Ok(())
}

/// Horizontal bar chart, one row per day, scaled to the busiest day.
fn chart(totals: &[DayTotal]) -> String {
    let peak = totals.iter().map(|d| d.minutes).fold(0.0_f64, f64::max);
    let mut out = String::new();
    for day in totals {
        let len = if peak > 0.0 {
            (day.minutes / peak * BAR_WIDTH).round() as usize
        } else {
            0
        };
        out.push_str(&format!(
            "{} {}  {:<width$} {} min\n",
            day.date.format("%a"),
            day.date.format("%m-%d"),
            "#".repeat(len),
            day.minutes,
            width = BAR_WIDTH as usize,
        ));
    }
    let total: f64 = totals.iter().map(|d| d.minutes).sum();
    out.push_str(&format!("Total: {total} min\n"));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32, minutes: f64) -> DayTotal {
        DayTotal {
            date: NaiveDate::from_ymd_opt(2024, 1, d).unwrap(),
            minutes,
        }
    }

    #[test]
    fn chart_scales_to_busiest_day() {
        let out = chart(&[day(1, 30.0), day(2, 0.0), day(3, 60.0)]);
        let lines: Vec<_> = out.lines().collect();
        assert_eq!(lines[0].matches('#').count(), 20);
        assert_eq!(lines[1].matches('#').count(), 0);
        assert_eq!(lines[2].matches('#').count(), 40);
        assert!(lines[0].starts_with("Mon 01-01"));
        assert_eq!(lines[3], "Total: 90 min");
    }

    #[test]
    fn empty_week_has_no_bars() {
        let out = chart(&[day(1, 0.0), day(2, 0.0)]);
        assert!(!out.contains('#'));
        assert!(out.ends_with("Total: 0 min\n"));
    }
}
