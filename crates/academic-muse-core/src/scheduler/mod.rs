//! Same-day study session scheduler.
//!
//! Sessions are booked for the current day only, never overlap, and move
//! through [`SessionStatus`] as wall-clock time passes (via [`SessionScheduler::sweep`])
//! or as the user reacts to the pre-session notification.
//!
//! The full list is persisted under one key and rewritten on every mutation.
//! Every mutation first re-reads the stored list, so bookings made through
//! another handle on the same store (another `muse` process) are kept. Each
//! mutation is persisted before it is applied in memory, so a failed write
//! leaves the scheduler unchanged.

mod session;

pub use session::{intervals_overlap, Session, SessionEvent, SessionStatus, Timing};

use std::time::Duration;

use chrono::{DateTime, NaiveTime, TimeZone, Utc};
use tracing::debug;

use crate::error::{CoreError, ValidationError};
use crate::events::Event;
use crate::storage::{keys, KvStore, SchedulerConfig};

/// A successful booking.
#[derive(Debug, Clone, PartialEq)]
pub struct Booking {
    pub session: Session,
    /// Delay until the pre-session notification window opens; `None` when the
    /// window is already open.
    pub notify_in: Option<Duration>,
    pub event: Event,
}

pub struct SessionScheduler {
    sessions: Vec<Session>,
    cfg: SchedulerConfig,
}

impl SessionScheduler {
    pub fn new(cfg: SchedulerConfig) -> Self {
        Self {
            sessions: Vec::new(),
            cfg,
        }
    }

    pub fn load(store: &KvStore, cfg: SchedulerConfig) -> Result<Self, CoreError> {
        let sessions = store
            .get_json::<Vec<Session>>(keys::STUDY_SESSIONS)?
            .unwrap_or_default();
        Ok(Self { sessions, cfg })
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.cfg
    }

    pub fn sessions(&self) -> &[Session] {
        &self.sessions
    }

    pub fn get(&self, id: u64) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == id)
    }

    fn window_ms(&self) -> i64 {
        self.cfg.reminder_window_minutes * 60_000
    }

    /// Book a session today between two times of day.
    pub fn add_session_today<Tz: TimeZone>(
        &mut self,
        store: &KvStore,
        start: NaiveTime,
        end: NaiveTime,
        now: &DateTime<Tz>,
    ) -> Result<Booking, CoreError> {
        let tz = now.timezone();
        let today = now.date_naive();
        let resolve = |t: NaiveTime| {
            let naive = today.and_time(t);
            tz.from_local_datetime(&naive)
                .earliest()
                .unwrap_or_else(|| tz.from_utc_datetime(&naive))
        };
        let (start, end) = (resolve(start), resolve(end));
        self.add_session(store, &start, &end, now)
    }

    /// Book a session. Checks run in order and the first failure aborts:
    /// start in the future, start today, duration within bounds, no overlap.
    pub fn add_session<Tz: TimeZone>(
        &mut self,
        store: &KvStore,
        start: &DateTime<Tz>,
        end: &DateTime<Tz>,
        now: &DateTime<Tz>,
    ) -> Result<Booking, CoreError> {
        self.reload(store)?;
        let now_ms = now.timestamp_millis();
        let start_ms = start.timestamp_millis();
        let end_ms = end.timestamp_millis();

        if start_ms <= now_ms {
            return Err(ValidationError::StartNotInFuture.into());
        }
        if start.date_naive() != now.date_naive() {
            return Err(ValidationError::NotToday.into());
        }
        let (min, max) = (self.cfg.min_session_minutes, self.cfg.max_session_minutes);
        let duration = end_ms - start_ms;
        if duration < min * 60_000 || duration > max * 60_000 {
            return Err(ValidationError::SessionDuration { min, max }.into());
        }

        let session = Session {
            id: self.sessions.iter().map(|s| s.id).max().unwrap_or(0) + 1,
            start_ms,
            end_ms,
            status: SessionStatus::Upcoming,
            reminders_count: 0,
        };
        if let Some(existing) = self.sessions.iter().find(|s| s.overlaps(&session)) {
            return Err(ValidationError::Overlap {
                existing: existing.id,
            }
            .into());
        }
        let mut next = self.sessions.clone();
        next.push(session.clone());
        self.commit(store, next)?;
        debug!(id = session.id, start_ms, end_ms, "session scheduled");

        let until_window = start_ms - self.window_ms() - now_ms;
        let notify_in = (until_window > 0).then(|| Duration::from_millis(until_window as u64));
        let event = Event::SessionScheduled {
            id: session.id,
            start: to_utc(start_ms),
            end: to_utc(end_ms),
            at: Utc::now(),
        };
        Ok(Booking {
            session,
            notify_in,
            event,
        })
    }

    /// Apply the periodic tick to every session.
    pub fn sweep<Tz: TimeZone>(
        &mut self,
        store: &KvStore,
        now: &DateTime<Tz>,
    ) -> Result<Vec<Event>, CoreError> {
        self.reload(store)?;
        let now_ms = now.timestamp_millis();
        let mut next = self.sessions.clone();
        let mut events = Vec::new();
        for session in next.iter_mut().filter(|s| !s.status.is_terminal()) {
            let to = session
                .status
                .transition(SessionEvent::Tick, &self.timing(session, now_ms));
            if to != session.status {
                events.push(self.transition_event(session, to));
                session.status = to;
            }
        }
        if !events.is_empty() {
            self.commit(store, next)?;
        }
        Ok(events)
    }

    /// User accepted the notification for `id`.
    pub fn acknowledge<Tz: TimeZone>(
        &mut self,
        store: &KvStore,
        id: u64,
        now: &DateTime<Tz>,
    ) -> Result<Option<Event>, CoreError> {
        self.apply(store, id, now, |_| SessionEvent::Acknowledge)
    }

    /// User dismissed the notification for `id`. Counts the dismissal.
    pub fn dismiss<Tz: TimeZone>(
        &mut self,
        store: &KvStore,
        id: u64,
        now: &DateTime<Tz>,
    ) -> Result<Option<Event>, CoreError> {
        self.apply(store, id, now, |s| SessionEvent::Dismiss {
            count: s.reminders_count + 1,
        })
    }

    fn apply<Tz: TimeZone>(
        &mut self,
        store: &KvStore,
        id: u64,
        now: &DateTime<Tz>,
        event: impl Fn(&Session) -> SessionEvent,
    ) -> Result<Option<Event>, CoreError> {
        self.reload(store)?;
        let now_ms = now.timestamp_millis();
        let mut next = self.sessions.clone();
        let session = next
            .iter_mut()
            .find(|s| s.id == id)
            .ok_or(ValidationError::UnknownSession(id))?;
        if session.status != SessionStatus::Reminder {
            return Ok(None);
        }

        let ev = event(session);
        if let SessionEvent::Dismiss { count } = ev {
            session.reminders_count = count;
        }
        let to = session.status.transition(ev, &self.timing(session, now_ms));
        let out = (to != session.status).then(|| self.transition_event(session, to));
        session.status = to;
        self.commit(store, next)?;
        Ok(out)
    }

    /// The session the pre-session notification is currently about.
    pub fn notification(&self) -> Option<&Session> {
        self.sessions
            .iter()
            .find(|s| s.status == SessionStatus::Reminder)
    }

    /// Discard every session. `confirmed` must be true.
    pub fn clear_history(&mut self, store: &KvStore, confirmed: bool) -> Result<Event, CoreError> {
        if !confirmed {
            return Err(ValidationError::NotConfirmed.into());
        }
        self.reload(store)?;
        let removed = self.sessions.len();
        self.commit(store, Vec::new())?;
        debug!(removed, "session history cleared");
        Ok(Event::SessionHistoryCleared {
            removed,
            at: Utc::now(),
        })
    }

    fn timing(&self, s: &Session, now_ms: i64) -> Timing {
        Timing {
            now_ms,
            start_ms: s.start_ms,
            end_ms: s.end_ms,
            window_ms: self.window_ms(),
            max_dismissals: self.cfg.max_dismissals,
        }
    }

    fn transition_event(&self, s: &Session, to: SessionStatus) -> Event {
        debug!(id = s.id, from = %s.status, %to, "session transition");
        Event::SessionTransitioned {
            id: s.id,
            from: s.status,
            to,
            at: Utc::now(),
        }
    }

    /// Replace the in-memory list with the stored one.
    fn reload(&mut self, store: &KvStore) -> Result<(), CoreError> {
        self.sessions = store
            .get_json::<Vec<Session>>(keys::STUDY_SESSIONS)?
            .unwrap_or_default();
        Ok(())
    }

    fn commit(&mut self, store: &KvStore, next: Vec<Session>) -> Result<(), CoreError> {
        store.set_json(keys::STUDY_SESSIONS, &next)?;
        self.sessions = next;
        Ok(())
    }
}

fn to_utc(ms: i64) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ms).unwrap_or_default()
}
