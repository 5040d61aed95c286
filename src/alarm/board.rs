use chrono::{DateTime, Local};

use crate::alarm::model::Alarm;
use crate::alarm::parser::AlarmRequest;
use crate::sinks::AlertSinks;

/// Notification title used for every fired alarm.
pub const NOTIFICATION_TITLE: &str = "Grepolis Alarm";

/// Owns the flat alarm list and drives the lifecycle: insertion keeps the
/// list sorted ascending by fire time, the tick fires due alarms and applies
/// the retention filter. All time-dependent operations take `now` explicitly
/// so tests can pin the clock.
#[derive(Debug, Default)]
pub struct AlarmBoard {
    alarms: Vec<Alarm>,
    next_seq: u64,
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct TickOutcome {
    pub fired: usize,
    pub removed: usize,
}

impl TickOutcome {
    pub fn changed_anything(&self) -> bool {
        self.fired > 0 || self.removed > 0
    }
}

impl AlarmBoard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds the board from persisted alarms, restoring the sort order.
    pub fn restore(alarms: Vec<Alarm>) -> Self {
        let mut board = Self {
            alarms,
            next_seq: 0,
        };
        board.alarms.sort_by_key(|alarm| alarm.time);
        board
    }

    pub fn alarms(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }

    pub fn export(&self) -> Vec<Alarm> {
        self.alarms.clone()
    }

    /// Creates an alarm from a parsed request and inserts it in fire-time
    /// order. The id is derived from the creation instant plus a per-session
    /// sequence number.
    pub fn create(&mut self, request: AlarmRequest, now: DateTime<Local>) -> String {
        self.next_seq += 1;
        let id = format!("{}-{}", now.timestamp_millis(), self.next_seq);
        self.insert(Alarm {
            id: id.clone(),
            message: request.message,
            time: request.fire_time,
            is_active: true,
            duration: Some(request.duration_ms),
            elapsed_time: None,
            keep: request.keep,
        });
        id
    }

    pub fn insert(&mut self, alarm: Alarm) {
        self.alarms.push(alarm);
        self.alarms.sort_by_key(|alarm| alarm.time);
    }

    pub fn remove(&mut self, id: &str) -> Option<Alarm> {
        let index = self.alarms.iter().position(|alarm| alarm.id == id)?;
        Some(self.alarms.remove(index))
    }

    pub fn clear(&mut self) -> usize {
        let count = self.alarms.len();
        self.alarms.clear();
        count
    }

    /// One expiry pass: fires due alarms through the sinks, deactivates them,
    /// then drops everything the retention filter rejects. Fire times of
    /// untouched alarms never change here, so the sort order survives.
    pub fn tick(&mut self, now: DateTime<Local>, sinks: &dyn AlertSinks) -> TickOutcome {
        let mut outcome = TickOutcome::default();

        for alarm in &mut self.alarms {
            if alarm.is_active && alarm.time <= now {
                sinks.notify(NOTIFICATION_TITLE, &alarm.message);
                sinks.alert();
                sinks.announce(&alarm.message);
                alarm.is_active = false;
                outcome.fired += 1;
            }
        }

        let before = self.alarms.len();
        self.alarms.retain(|alarm| alarm.retained(now));
        outcome.removed = before - self.alarms.len();
        outcome
    }

    /// Pause/resume toggle. Pausing an active duration-bearing alarm captures
    /// the elapsed time; resuming recomputes a fresh fire time from the
    /// remaining duration. Alarms without a duration just flip the flag.
    pub fn toggle(&mut self, id: &str, now: DateTime<Local>) -> bool {
        let Some(alarm) = self.alarms.iter_mut().find(|alarm| alarm.id == id) else {
            return false;
        };

        match (alarm.is_active, alarm.duration) {
            (true, Some(duration)) => {
                let started = alarm.time - chrono::Duration::milliseconds(duration);
                alarm.elapsed_time =
                    Some(now.timestamp_millis() - started.timestamp_millis());
                alarm.is_active = false;
            }
            (false, Some(duration)) => {
                let remaining = duration - alarm.elapsed_time.unwrap_or(0);
                alarm.time = now + chrono::Duration::milliseconds(remaining);
                alarm.is_active = true;
            }
            _ => alarm.is_active = !alarm.is_active,
        }
        true
    }
}
