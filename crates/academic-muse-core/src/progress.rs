//! Weekly study progress.
//!
//! An append-only log of `(date, minutes)` records, bucketed on read into the
//! Monday-to-Sunday week containing a given day. Records outside that week
//! stay in storage; they are only excluded from the view.

use chrono::{Datelike, Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, ValidationError};
use crate::storage::{keys, KvStore};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudyRecord {
    #[serde(with = "ymd")]
    pub date: NaiveDate,
    /// Minutes.
    pub duration: f64,
}

/// Minutes studied on one day of the displayed week.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DayTotal {
    #[serde(with = "ymd")]
    pub date: NaiveDate,
    pub minutes: f64,
}

pub struct WeeklyProgress {
    records: Vec<StudyRecord>,
}

impl WeeklyProgress {
    pub fn load(store: &KvStore) -> Result<Self, CoreError> {
        let records = store
            .get_json::<Vec<StudyRecord>>(keys::WEEKLY_LOG)?
            .unwrap_or_default();
        Ok(Self { records })
    }

    pub fn records(&self) -> &[StudyRecord] {
        &self.records
    }

    /// Append a record. The duration must be a positive number of minutes.
    pub fn add_session(
        &mut self,
        store: &KvStore,
        date: NaiveDate,
        minutes: f64,
    ) -> Result<(), CoreError> {
        if !minutes.is_finite() || minutes <= 0.0 {
            return Err(ValidationError::NonPositiveDuration.into());
        }
        let mut next = self.records.clone();
        next.push(StudyRecord {
            date,
            duration: minutes,
        });
        store.set_json(keys::WEEKLY_LOG, &next)?;
        self.records = next;
        debug!(%date, minutes, "study record added");
        Ok(())
    }

    /// Drop every record.
    pub fn clear(&mut self, store: &KvStore) -> Result<(), CoreError> {
        store.set_json(keys::WEEKLY_LOG, &Vec::<StudyRecord>::new())?;
        self.records.clear();
        Ok(())
    }

    /// Per-day totals for the week containing `today`.
    pub fn weekly_totals(&self, today: NaiveDate) -> Vec<DayTotal> {
        week_dates(today)
            .into_iter()
            .map(|date| DayTotal {
                date,
                minutes: self
                    .records
                    .iter()
                    .filter(|r| r.date == date)
                    .map(|r| r.duration)
                    .sum(),
            })
            .collect()
    }
}

/// Monday through Sunday of the week containing `day`.
pub fn week_dates(day: NaiveDate) -> [NaiveDate; 7] {
    let offset = u64::from(day.weekday().num_days_from_monday());
    let monday = day.checked_sub_days(Days::new(offset)).unwrap_or(day);
    std::array::from_fn(|i| {
        monday
            .checked_add_days(Days::new(i as u64))
            .unwrap_or(monday)
    })
}

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|_| ValidationError::Date(raw.to_string()))
}

mod ymd {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &NaiveDate, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&d.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(d)?;
        super::parse_date(&raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        parse_date(s).unwrap()
    }

    #[test]
    fn week_starts_on_monday() {
        // 2024-01-01 is a Monday.
        let week = week_dates(date("2024-01-03"));
        assert_eq!(week[0], date("2024-01-01"));
        assert_eq!(week[6], date("2024-01-07"));
    }

    #[test]
    fn sunday_belongs_to_the_previous_monday() {
        let week = week_dates(date("2024-01-07"));
        assert_eq!(week[0], date("2024-01-01"));
        assert_eq!(week[6], date("2024-01-07"));
    }

    #[test]
    fn aggregates_exact_dates_in_week() {
        let store = KvStore::open_memory().unwrap();
        let mut progress = WeeklyProgress::load(&store).unwrap();
        progress.add_session(&store, date("2024-01-01"), 30.0).unwrap();
        progress.add_session(&store, date("2024-01-01"), 20.0).unwrap();
        progress.add_session(&store, date("2024-01-08"), 10.0).unwrap();

        let totals = progress.weekly_totals(date("2024-01-01"));
        assert_eq!(totals.len(), 7);
        assert_eq!(totals[0].minutes, 50.0);
        assert!(totals[1..].iter().all(|d| d.minutes == 0.0));
        // Out-of-week records are retained.
        assert_eq!(progress.records().len(), 3);
    }

    #[test]
    fn rejects_non_positive_durations() {
        let store = KvStore::open_memory().unwrap();
        let mut progress = WeeklyProgress::load(&store).unwrap();
        for bad in [0.0, -5.0, f64::NAN] {
            assert!(matches!(
                progress.add_session(&store, date("2024-01-01"), bad),
                Err(CoreError::Validation(ValidationError::NonPositiveDuration))
            ));
        }
        assert!(progress.records().is_empty());
    }

    #[test]
    fn persists_and_clears() {
        let store = KvStore::open_memory().unwrap();
        let mut progress = WeeklyProgress::load(&store).unwrap();
        progress.add_session(&store, date("2024-02-14"), 45.0).unwrap();

        let raw = store.get(keys::WEEKLY_LOG).unwrap().unwrap();
        assert_eq!(raw, r#"[{"date":"2024-02-14","duration":45.0}]"#);
        assert_eq!(WeeklyProgress::load(&store).unwrap().records().len(), 1);

        progress.clear(&store).unwrap();
        assert!(WeeklyProgress::load(&store).unwrap().records().is_empty());
    }
}
