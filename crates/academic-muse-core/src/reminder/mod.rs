//! Daily study reminders.
//!
//! Three independent slots, each holding an optional time of day. A slot with
//! a time is armed for its next occurrence (minus a small fire-early offset);
//! when it fires it becomes the visible reminder until the user starts a
//! session, cancels for today, or snoozes it.
//!
//! ```text
//! Idle --set_time--> Armed --fire--> Firing --start/cancel--> Idle
//!                                      |  ^
//!                                 snooze  | refire after snooze delay
//!                                      v  |
//!                                    Snoozed
//! ```
//!
//! Only one reminder is visible at a time. Reminders that fire while another
//! is visible wait in FIFO order and are shown once the visible one closes.

mod clock;

pub use clock::{next_occurrence, parse_time_of_day, trigger_delay};

use std::collections::VecDeque;
use std::time::Duration;

use chrono::{NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::storage::{keys, KvStore, ReminderConfig};

/// Reminder slot ids.
pub const SLOTS: [u8; 3] = [1, 2, 3];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: u8,
    #[serde(with = "hhmm")]
    pub time: Option<NaiveTime>,
    pub snooze_count: u8,
}

impl Reminder {
    fn empty(id: u8) -> Self {
        Self {
            id,
            time: None,
            snooze_count: 0,
        }
    }
}

/// Result of pressing snooze on the visible reminder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnoozeOutcome {
    /// Fire `slot` again after `delay`.
    Rearm { slot: u8, delay: Duration },
    /// The count just reached the ceiling; the reminder closes without refiring.
    Exhausted { slot: u8 },
    /// Snooze is disabled for the visible reminder. Nothing changed.
    Disabled { slot: u8 },
}

pub struct ReminderBoard {
    reminders: [Reminder; 3],
    firing: Option<u8>,
    queue: VecDeque<u8>,
    cfg: ReminderConfig,
}

impl ReminderBoard {
    pub fn new(cfg: ReminderConfig) -> Self {
        Self {
            reminders: [Reminder::empty(1), Reminder::empty(2), Reminder::empty(3)],
            firing: None,
            queue: VecDeque::new(),
            cfg,
        }
    }

    /// Restore slot times from the store.
    ///
    /// Stored times that no longer parse are dropped.
    pub fn load(store: &KvStore, cfg: ReminderConfig) -> Result<Self, CoreError> {
        let mut board = Self::new(cfg);
        for slot in SLOTS {
            if let Some(raw) = store.get(&keys::reminder_time(slot))? {
                match parse_time_of_day(&raw) {
                    Ok(t) => board.reminders[index(slot)].time = Some(t),
                    Err(e) => tracing::warn!(slot, error = %e, "ignoring stored reminder time"),
                }
            }
        }
        Ok(board)
    }

    /// Re-read slot times written through another handle on the store.
    ///
    /// Returns true when any time changed; the owner must then re-arm.
    /// Slots whose time was cleared leave the queue.
    pub fn reload_times(&mut self, store: &KvStore) -> Result<bool, CoreError> {
        let mut changed = false;
        for slot in SLOTS {
            let stored = store
                .get(&keys::reminder_time(slot))?
                .and_then(|raw| parse_time_of_day(&raw).ok());
            let reminder = &mut self.reminders[index(slot)];
            if reminder.time != stored {
                debug!(slot, ?stored, "reminder time changed in store");
                reminder.time = stored;
                changed = true;
                if stored.is_none() {
                    self.queue.retain(|s| *s != slot);
                }
            }
        }
        Ok(changed)
    }

    pub fn config(&self) -> &ReminderConfig {
        &self.cfg
    }

    pub fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    pub fn reminder(&self, slot: u8) -> Result<&Reminder, ValidationError> {
        check_slot(slot)?;
        Ok(&self.reminders[index(slot)])
    }

    /// Set and persist a slot's time. Any pending trigger for the board must
    /// be cancelled and re-armed by the owner afterwards.
    pub fn set_time(&mut self, store: &KvStore, slot: u8, raw: &str) -> Result<(), CoreError> {
        check_slot(slot)?;
        let time = parse_time_of_day(raw)?;
        store.set(&keys::reminder_time(slot), &time.format("%H:%M").to_string())?;
        self.reminders[index(slot)].time = Some(time);
        debug!(slot, %time, "reminder time set");
        Ok(())
    }

    /// Clear and forget a slot's time.
    pub fn clear_time(&mut self, store: &KvStore, slot: u8) -> Result<(), CoreError> {
        check_slot(slot)?;
        store.remove(&keys::reminder_time(slot))?;
        self.reminders[index(slot)].time = None;
        self.queue.retain(|s| *s != slot);
        debug!(slot, "reminder time cleared");
        Ok(())
    }

    /// Delays until each configured slot should fire, measured from `now`.
    ///
    /// Slots whose delay would be zero or negative are skipped.
    pub fn arm_plan<Tz: chrono::TimeZone>(
        &self,
        now: &chrono::DateTime<Tz>,
    ) -> Vec<(u8, Duration)> {
        let early = Duration::from_secs(self.cfg.fire_early_secs);
        self.reminders
            .iter()
            .filter_map(|r| {
                let time = r.time?;
                trigger_delay(time, now, early).map(|d| (r.id, d))
            })
            .collect()
    }

    /// A trigger for `slot` went off.
    ///
    /// Returns the firing event if the reminder became visible; `None` when it
    /// was queued behind the visible one (or its time was cleared meanwhile).
    pub fn fire(&mut self, slot: u8) -> Option<Event> {
        check_slot(slot).ok()?;
        if self.reminders[index(slot)].time.is_none() {
            return None;
        }
        match self.firing {
            None => {
                self.firing = Some(slot);
                Some(self.firing_event(slot))
            }
            Some(current) => {
                if current != slot && !self.queue.contains(&slot) {
                    debug!(slot, current, "reminder queued behind visible one");
                    self.queue.push_back(slot);
                }
                None
            }
        }
    }

    /// The visible reminder, if any.
    pub fn firing(&self) -> Option<&Reminder> {
        self.firing.map(|s| &self.reminders[index(s)])
    }

    pub fn queued(&self) -> impl Iterator<Item = u8> + '_ {
        self.queue.iter().copied()
    }

    pub fn can_snooze(&self) -> bool {
        self.firing()
            .map(|r| r.snooze_count < self.cfg.max_snooze)
            .unwrap_or(false)
    }

    pub fn snoozes_left(&self, slot: u8) -> u8 {
        self.reminder(slot)
            .map(|r| self.cfg.max_snooze.saturating_sub(r.snooze_count))
            .unwrap_or(0)
    }

    /// User chose to study now.
    pub fn start_session(&mut self) -> Vec<Event> {
        self.close(true)
    }

    /// User dismissed the reminder for today.
    pub fn cancel_for_today(&mut self) -> Vec<Event> {
        self.close(false)
    }

    /// Snooze the visible reminder.
    ///
    /// Returns `None` when nothing is visible.
    pub fn snooze(&mut self) -> Option<(SnoozeOutcome, Vec<Event>)> {
        let slot = self.firing?;
        let max = self.cfg.max_snooze;
        let reminder = &mut self.reminders[index(slot)];
        if reminder.snooze_count >= max {
            return Some((SnoozeOutcome::Disabled { slot }, Vec::new()));
        }

        reminder.snooze_count = (reminder.snooze_count + 1).min(max);
        let count = reminder.snooze_count;
        let delay = Duration::from_secs(self.cfg.snooze_delay_secs);
        let outcome = if count < max {
            SnoozeOutcome::Rearm { slot, delay }
        } else {
            SnoozeOutcome::Exhausted { slot }
        };

        let mut events = vec![Event::ReminderSnoozed {
            slot,
            snooze_count: count,
            refire_in_secs: match outcome {
                SnoozeOutcome::Rearm { delay, .. } => delay.as_secs(),
                _ => 0,
            },
            at: Utc::now(),
        }];
        self.firing = None;
        events.extend(self.promote_next());
        Some((outcome, events))
    }

    fn close(&mut self, started: bool) -> Vec<Event> {
        let Some(slot) = self.firing.take() else {
            return Vec::new();
        };
        self.reminders[index(slot)].snooze_count = 0;
        let mut events = vec![Event::ReminderClosed {
            slot,
            started,
            at: Utc::now(),
        }];
        events.extend(self.promote_next());
        events
    }

    fn promote_next(&mut self) -> Option<Event> {
        while let Some(next) = self.queue.pop_front() {
            if self.reminders[index(next)].time.is_some() {
                self.firing = Some(next);
                return Some(self.firing_event(next));
            }
        }
        None
    }

    fn firing_event(&self, slot: u8) -> Event {
        let r = &self.reminders[index(slot)];
        Event::ReminderFiring {
            slot,
            snooze_count: r.snooze_count,
            snoozes_left: self.cfg.max_snooze.saturating_sub(r.snooze_count),
            at: Utc::now(),
        }
    }
}

fn check_slot(slot: u8) -> Result<(), ValidationError> {
    if SLOTS.contains(&slot) {
        Ok(())
    } else {
        Err(ValidationError::ReminderSlot(slot))
    }
}

fn index(slot: u8) -> usize {
    usize::from(slot - 1)
}

mod hhmm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(t: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match t {
            Some(t) => s.serialize_str(&t.format("%H:%M").to_string()),
            None => s.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw = String::deserialize(d)?;
        if raw.is_empty() {
            return Ok(None);
        }
        super::parse_time_of_day(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn board_with(store: &KvStore, times: &[(u8, &str)]) -> ReminderBoard {
        let mut board = ReminderBoard::new(ReminderConfig::default());
        for (slot, t) in times {
            board.set_time(store, *slot, t).unwrap();
        }
        board
    }

    #[test]
    fn set_time_persists_and_load_restores() {
        let store = KvStore::open_memory().unwrap();
        board_with(&store, &[(2, "07:45")]);
        assert_eq!(store.get("reminderTime2").unwrap().as_deref(), Some("07:45"));

        let board = ReminderBoard::load(&store, ReminderConfig::default()).unwrap();
        assert_eq!(
            board.reminder(2).unwrap().time,
            NaiveTime::from_hms_opt(7, 45, 0)
        );
        assert!(board.reminder(1).unwrap().time.is_none());
    }

    #[test]
    fn clear_time_removes_key() {
        let store = KvStore::open_memory().unwrap();
        let mut board = board_with(&store, &[(1, "06:00")]);
        board.clear_time(&store, 1).unwrap();
        assert!(store.get("reminderTime1").unwrap().is_none());
        assert!(board.reminder(1).unwrap().time.is_none());
    }

    #[test]
    fn reload_picks_up_times_set_elsewhere() {
        let store = KvStore::open_memory().unwrap();
        let mut watching = board_with(&store, &[(1, "08:00"), (2, "09:00")]);
        assert!(watching.fire(1).is_some());
        assert_eq!(watching.fire(2), None);

        let mut other = ReminderBoard::load(&store, ReminderConfig::default()).unwrap();
        other.set_time(&store, 3, "21:15").unwrap();
        other.clear_time(&store, 2).unwrap();

        assert!(watching.reload_times(&store).unwrap());
        assert_eq!(
            watching.reminder(3).unwrap().time,
            NaiveTime::from_hms_opt(21, 15, 0)
        );
        assert!(watching.reminder(2).unwrap().time.is_none());
        assert_eq!(watching.queued().count(), 0);
        assert_eq!(watching.firing().map(|r| r.id), Some(1));

        assert!(!watching.reload_times(&store).unwrap());
    }

    #[test]
    fn rejects_bad_slot_and_time() {
        let store = KvStore::open_memory().unwrap();
        let mut board = ReminderBoard::new(ReminderConfig::default());
        assert!(matches!(
            board.set_time(&store, 4, "07:00"),
            Err(CoreError::Validation(ValidationError::ReminderSlot(4)))
        ));
        assert!(matches!(
            board.set_time(&store, 1, "25:00"),
            Err(CoreError::Validation(ValidationError::TimeOfDay(_)))
        ));
        assert!(store.get("reminderTime1").unwrap().is_none());
    }

    #[test]
    fn arm_plan_skips_empty_and_too_close_slots() {
        let store = KvStore::open_memory().unwrap();
        let board = board_with(&store, &[(1, "09:00"), (3, "08:00")]);
        // 5 seconds before 08:00: inside the fire-early offset.
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 7, 59, 55).unwrap();
        let plan = board.arm_plan(&now);
        assert_eq!(plan, vec![(1, Duration::from_secs(60 * 60 + 5 - 10))]);
    }

    #[test]
    fn snooze_counts_up_to_ceiling() {
        let store = KvStore::open_memory().unwrap();
        let mut board = board_with(&store, &[(1, "07:00")]);

        for expected in 1..=2u8 {
            assert!(board.fire(1).is_some());
            let (outcome, _) = board.snooze().unwrap();
            assert_eq!(
                outcome,
                SnoozeOutcome::Rearm {
                    slot: 1,
                    delay: Duration::from_secs(60)
                }
            );
            assert_eq!(board.reminder(1).unwrap().snooze_count, expected);
            assert!(board.firing().is_none());
        }

        board.fire(1);
        let (outcome, _) = board.snooze().unwrap();
        assert_eq!(outcome, SnoozeOutcome::Exhausted { slot: 1 });
        assert_eq!(board.reminder(1).unwrap().snooze_count, 3);

        // Fires again the next day with the count still at the ceiling.
        board.fire(1);
        assert!(!board.can_snooze());
        assert_eq!(board.snoozes_left(1), 0);
        let (outcome, events) = board.snooze().unwrap();
        assert_eq!(outcome, SnoozeOutcome::Disabled { slot: 1 });
        assert!(events.is_empty());
        assert_eq!(board.reminder(1).unwrap().snooze_count, 3);
        assert_eq!(board.firing().map(|r| r.id), Some(1));
    }

    #[test]
    fn start_and_cancel_reset_snooze_count() {
        let store = KvStore::open_memory().unwrap();
        let mut board = board_with(&store, &[(1, "07:00"), (2, "08:00")]);

        board.fire(1);
        board.snooze();
        board.fire(1);
        let events = board.start_session();
        assert!(matches!(events[0], Event::ReminderClosed { slot: 1, started: true, .. }));
        assert_eq!(board.reminder(1).unwrap().snooze_count, 0);

        board.fire(2);
        board.snooze();
        board.fire(2);
        let events = board.cancel_for_today();
        assert!(matches!(events[0], Event::ReminderClosed { slot: 2, started: false, .. }));
        assert_eq!(board.reminder(2).unwrap().snooze_count, 0);
        assert!(board.firing().is_none());
    }

    #[test]
    fn simultaneous_reminders_queue_in_order() {
        let store = KvStore::open_memory().unwrap();
        let mut board = board_with(&store, &[(1, "07:00"), (2, "07:00"), (3, "07:00")]);

        assert!(board.fire(2).is_some());
        assert!(board.fire(1).is_none());
        assert!(board.fire(3).is_none());
        assert!(board.fire(1).is_none());
        assert_eq!(board.queued().collect::<Vec<_>>(), vec![1, 3]);

        let events = board.start_session();
        assert!(matches!(events[1], Event::ReminderFiring { slot: 1, .. }));
        let events = board.cancel_for_today();
        assert!(matches!(events[1], Event::ReminderFiring { slot: 3, .. }));
        let events = board.cancel_for_today();
        assert_eq!(events.len(), 1);
        assert!(board.firing().is_none());
    }

    #[test]
    fn cleared_slot_leaves_queue_and_does_not_fire() {
        let store = KvStore::open_memory().unwrap();
        let mut board = board_with(&store, &[(1, "07:00"), (2, "07:00")]);
        board.fire(1);
        board.fire(2);
        board.clear_time(&store, 2).unwrap();
        assert_eq!(board.start_session().len(), 1);
        assert!(board.fire(2).is_none());
    }

    #[test]
    fn reminder_serializes_time_as_hhmm() {
        let r = Reminder {
            id: 1,
            time: NaiveTime::from_hms_opt(6, 5, 0),
            snooze_count: 0,
        };
        let json = serde_json::to_value(&r).unwrap();
        assert_eq!(json["time"], "06:05");
        let empty: Reminder =
            serde_json::from_str(r#"{"id":2,"time":"","snooze_count":0}"#).unwrap();
        assert!(empty.time.is_none());
    }
}
