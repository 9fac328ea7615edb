//! Foreground loop that owns every armed trigger.
//!
//! Reminder and session triggers post a [`Wake`] back to the loop, so all
//! board and scheduler state changes happen on one task. Typed commands on
//! stdin answer the visible reminder and session notifications.

use std::time::Duration;

use academic_muse_core::reminder::parse_time_of_day;
use academic_muse_core::{
    ArmedTrigger, Config, Event, KvStore, ReminderBoard, SessionScheduler, SessionStatus,
    SnoozeOutcome, TriggerSet,
};
use chrono::{Local, Utc};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::time::MissedTickBehavior;
use tracing::{debug, warn};

use crate::output::{local_hhmm, print_event_line};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum ReminderKey {
    /// Next daily occurrence of a slot.
    Daily(u8),
    /// Refire after a snooze.
    Snooze(u8),
}

#[derive(Debug)]
enum Wake {
    Reminder(ReminderKey),
    Session(u64),
}

const HELP: &str = "\
commands:
  start | cancel | snooze      answer the visible reminder
  ok <id> | dismiss <id>       answer a session notification
  set <slot> <HH:MM>           set a reminder time
  delete <slot>                clear a reminder
  add <HH:MM> <HH:MM>          book a session today
  status                       show reminders and sessions
  quit";

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load_or_default();
    let store = KvStore::open()?;
    let board = ReminderBoard::load(&store, config.reminders.clone())?;
    let scheduler = SessionScheduler::load(&store, config.scheduler.clone())?;
    let sweep_every = Duration::from_secs(config.scheduler.sweep_interval_secs.max(1));

    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    rt.block_on(async move {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut watch = Watch {
            store,
            board,
            scheduler,
            reminders: TriggerSet::new(),
            sessions: TriggerSet::new(),
            tx,
        };
        watch.run(rx, sweep_every).await
    })
}

struct Watch {
    store: KvStore,
    board: ReminderBoard,
    scheduler: SessionScheduler,
    reminders: TriggerSet<ReminderKey>,
    sessions: TriggerSet<u64>,
    tx: UnboundedSender<Wake>,
}

impl Watch {
    async fn run(
        &mut self,
        mut rx: UnboundedReceiver<Wake>,
        sweep_every: Duration,
    ) -> Result<(), Box<dyn std::error::Error>> {
        self.rearm_reminders();
        self.arm_session_notifications();

        let mut sweep = tokio::time::interval(sweep_every);
        sweep.set_missed_tick_behavior(MissedTickBehavior::Delay);
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut stdin_open = true;

        eprintln!("Watching reminders and sessions. Type `help` for commands, Ctrl-C to stop.");
        loop {
            tokio::select! {
                _ = sweep.tick() => {
                    self.sweep()?;
                    self.arm_session_notifications();
                    if self.board.reload_times(&self.store)? {
                        self.rearm_daily();
                    } else {
                        self.arm_missing_daily();
                    }
                }
                Some(wake) = rx.recv() => self.wake(wake)?,
                line = lines.next_line(), if stdin_open => {
                    match line? {
                        Some(line) => {
                            if !self.command(&line)? {
                                break;
                            }
                        }
                        None => stdin_open = false,
                    }
                }
                _ = tokio::signal::ctrl_c() => break,
            }
        }

        self.reminders.cancel_all();
        self.sessions.cancel_all();
        eprintln!("Stopped watching");
        Ok(())
    }

    /// Cancel every reminder trigger and arm each configured slot again.
    fn rearm_reminders(&mut self) {
        self.reminders.cancel_all();
        self.arm_missing_daily();
    }

    /// Re-arm daily triggers after slot times changed, keeping snoozes.
    fn rearm_daily(&mut self) {
        let slots: Vec<u8> = self.board.reminders().iter().map(|r| r.id).collect();
        for slot in slots {
            self.reminders.cancel(&ReminderKey::Daily(slot));
        }
        self.arm_missing_daily();
    }

    fn arm_missing_daily(&mut self) {
        let now = Local::now();
        for (slot, delay) in self.board.arm_plan(&now) {
            let key = ReminderKey::Daily(slot);
            if !self.reminders.contains(&key) {
                let trigger = ArmedTrigger::arm(delay, self.tx.clone(), Wake::Reminder(key));
                self.reminders.insert(key, trigger);
            }
        }
    }

    /// Arm pre-notify triggers for upcoming sessions that have none yet,
    /// including sessions booked by another process since the last sweep.
    fn arm_session_notifications(&mut self) {
        let now_ms = Utc::now().timestamp_millis();
        let window_ms = self.scheduler.config().reminder_window_minutes * 60_000;
        let pending: Vec<(u64, i64)> = self
            .scheduler
            .sessions()
            .iter()
            .filter(|s| s.status == SessionStatus::Upcoming && !self.sessions.contains(&s.id))
            .map(|s| (s.id, s.start_ms - window_ms - now_ms))
            .filter(|(_, until)| *until > 0)
            .collect();
        for (id, until) in pending {
            self.arm_session(id, Duration::from_millis(until as u64));
        }
    }

    fn arm_session(&mut self, id: u64, delay: Duration) {
        let trigger = ArmedTrigger::arm(delay, self.tx.clone(), Wake::Session(id));
        self.sessions.insert(id, trigger);
    }

    fn wake(&mut self, wake: Wake) -> Result<(), Box<dyn std::error::Error>> {
        debug!(?wake, "trigger fired");
        match wake {
            Wake::Reminder(key) => {
                self.reminders.cancel(&key);
                let slot = match key {
                    ReminderKey::Daily(slot) | ReminderKey::Snooze(slot) => slot,
                };
                if let Some(ev) = self.board.fire(slot) {
                    self.show(&ev)?;
                }
            }
            Wake::Session(id) => {
                self.sessions.cancel(&id);
                self.sweep()?;
            }
        }
        Ok(())
    }

    fn sweep(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        for ev in self.scheduler.sweep(&self.store, &Local::now())? {
            self.show(&ev)?;
        }
        Ok(())
    }

    /// Handle one typed line. Returns false to stop the loop.
    fn command(&mut self, line: &str) -> Result<bool, Box<dyn std::error::Error>> {
        let words: Vec<&str> = line.split_whitespace().collect();
        let result = match words.as_slice() {
            [] => Ok(()),
            ["quit"] | ["q"] | ["exit"] => return Ok(false),
            ["help"] | ["?"] => {
                eprintln!("{HELP}");
                Ok(())
            }
            ["start"] => self.close_reminder(true),
            ["cancel"] => self.close_reminder(false),
            ["snooze"] => self.snooze(),
            ["ok", id] => self.answer_session(id, true),
            ["dismiss", id] => self.answer_session(id, false),
            ["set", slot, time] => self.set_reminder(slot, Some(*time)),
            ["delete", slot] => self.set_reminder(slot, None),
            ["add", start, end] => self.add_session(start, end),
            ["status"] => {
                self.status();
                Ok(())
            }
            _ => {
                eprintln!("unknown command `{}` (type `help`)", line.trim());
                Ok(())
            }
        };
        // Bad input is reported and the loop keeps running.
        if let Err(e) = result {
            eprintln!("{e}");
        }
        Ok(true)
    }

    fn close_reminder(&mut self, started: bool) -> Result<(), Box<dyn std::error::Error>> {
        let events = if started {
            self.board.start_session()
        } else {
            self.board.cancel_for_today()
        };
        if events.is_empty() {
            eprintln!("No reminder is showing");
        }
        for ev in events {
            self.show(&ev)?;
        }
        if started {
            eprintln!("Good luck! Run `muse timer run` to start a Pomodoro.");
        }
        Ok(())
    }

    fn snooze(&mut self) -> Result<(), Box<dyn std::error::Error>> {
        let Some((outcome, events)) = self.board.snooze() else {
            eprintln!("No reminder is showing");
            return Ok(());
        };
        match outcome {
            SnoozeOutcome::Rearm { slot, delay } => {
                let key = ReminderKey::Snooze(slot);
                let trigger = ArmedTrigger::arm(delay, self.tx.clone(), Wake::Reminder(key));
                self.reminders.insert(key, trigger);
            }
            SnoozeOutcome::Exhausted { slot } => {
                eprintln!("Reminder {slot} snoozed for the last time today");
            }
            SnoozeOutcome::Disabled { .. } => {
                eprintln!("Snooze limit reached; type `start` or `cancel`");
            }
        }
        for ev in events {
            self.show(&ev)?;
        }
        Ok(())
    }

    fn answer_session(&mut self, id: &str, accept: bool) -> Result<(), Box<dyn std::error::Error>> {
        let id: u64 = id.parse().map_err(|_| format!("invalid session id `{id}`"))?;
        let now = Local::now();
        let out = if accept {
            self.scheduler.acknowledge(&self.store, id, &now)?
        } else {
            self.scheduler.dismiss(&self.store, id, &now)?
        };
        match out {
            Some(ev) => self.show(&ev)?,
            None => match self.scheduler.get(id) {
                Some(s) if s.status == SessionStatus::Reminder => {
                    eprintln!("Dismissed ({} so far)", s.reminders_count)
                }
                _ => eprintln!("Session #{id} has no pending notification"),
            },
        }
        Ok(())
    }

    fn set_reminder(
        &mut self,
        slot: &str,
        time: Option<&str>,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let slot: u8 = slot.parse().map_err(|_| format!("invalid reminder slot `{slot}`"))?;
        match time {
            Some(time) => self.board.set_time(&self.store, slot, time)?,
            None => self.board.clear_time(&self.store, slot)?,
        }
        self.rearm_reminders();
        self.status();
        Ok(())
    }

    fn add_session(&mut self, start: &str, end: &str) -> Result<(), Box<dyn std::error::Error>> {
        let start = parse_time_of_day(start)?;
        let end = parse_time_of_day(end)?;
        let booking = self
            .scheduler
            .add_session_today(&self.store, start, end, &Local::now())?;
        self.show(&booking.event)?;
        match booking.notify_in {
            Some(delay) => self.arm_session(booking.session.id, delay),
            // The notification window is already open.
            None => self.sweep()?,
        }
        Ok(())
    }

    fn status(&self) {
        for r in self.board.reminders() {
            match r.time {
                Some(t) => eprintln!("reminder {}  {}", r.id, t.format("%H:%M")),
                None => eprintln!("reminder {}  --:--", r.id),
            }
        }
        if let Some(r) = self.board.firing() {
            if self.board.can_snooze() {
                let left = self.board.snoozes_left(r.id);
                eprintln!("showing reminder {} ({left} snoozes left)", r.id);
            } else {
                eprintln!("showing reminder {} (snooze used up)", r.id);
            }
        }
        let queued: Vec<String> = self.board.queued().map(|s| s.to_string()).collect();
        if !queued.is_empty() {
            eprintln!("waiting: {}", queued.join(", "));
        }
        for s in self.scheduler.sessions() {
            eprintln!(
                "session #{}  {}-{}  {}",
                s.id,
                local_hhmm(s.start_ms),
                local_hhmm(s.end_ms),
                s.status
            );
        }
    }

    /// Emit the event as a JSON line and a human prompt where one applies.
    fn show(&self, ev: &Event) -> Result<(), serde_json::Error> {
        print_event_line(ev)?;
        match ev {
            Event::ReminderFiring {
                slot, snoozes_left, ..
            } => {
                eprint!("\x07");
                if *snoozes_left > 0 {
                    eprintln!(
                        "It's time to study! (reminder {slot}) Type `start`, `cancel` or `snooze` ({snoozes_left} left)."
                    );
                } else {
                    eprintln!("It's time to study! (reminder {slot}) Type `start` or `cancel`.");
                }
            }
            Event::SessionTransitioned {
                id,
                to: SessionStatus::Reminder,
                ..
            } => match self.scheduler.get(*id) {
                Some(s) => eprintln!(
                    "Session #{id} starts at {}. Type `ok {id}` to begin or `dismiss {id}`.",
                    local_hhmm(s.start_ms)
                ),
                None => warn!(id, "notification for unknown session"),
            },
            Event::SessionTransitioned {
                id,
                to: SessionStatus::Skipped,
                ..
            } => eprintln!("Session #{id} skipped"),
            Event::SessionTransitioned {
                id,
                to: SessionStatus::Completed,
                ..
            } => eprintln!("Session #{id} completed. Log it with `muse progress add <minutes>`."),
            _ => {}
        }
        Ok(())
    }
}
