use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};

/// Grace period a fired, non-kept alarm stays visible before auto-deletion.
pub const DELETION_GRACE_MS: i64 = 5 * 60 * 1_000;

/// One countdown alarm. Field names follow the persisted JSON shape
/// (`isActive`, `elapsedTime`, ISO-8601 `time`).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Alarm {
    pub id: String,
    pub message: String,
    pub time: DateTime<Local>,
    pub is_active: bool,
    /// Original countdown length in milliseconds; pause/resume needs it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration: Option<i64>,
    /// Elapsed milliseconds captured when the alarm was paused.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub elapsed_time: Option<i64>,
    #[serde(default)]
    pub keep: bool,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AlarmStatus {
    /// Active and ticking toward its fire time.
    Counting,
    /// Fired (or paused) without the keep flag; dropped after the grace
    /// window.
    PendingDeletion,
    /// Fired with the keep flag; stays until deleted by hand.
    Kept,
}

impl Alarm {
    pub fn status(&self) -> AlarmStatus {
        if self.is_active {
            AlarmStatus::Counting
        } else if self.keep {
            AlarmStatus::Kept
        } else {
            AlarmStatus::PendingDeletion
        }
    }

    /// Milliseconds until this alarm fires; negative once the fire time has
    /// passed.
    pub fn remaining_ms(&self, now: DateTime<Local>) -> i64 {
        self.time.timestamp_millis() - now.timestamp_millis()
    }

    /// Whether the retention filter keeps this alarm at `now`: still active,
    /// flagged keep, or fired less than the grace window ago.
    pub fn retained(&self, now: DateTime<Local>) -> bool {
        if self.is_active || self.keep {
            return true;
        }
        now.timestamp_millis() - self.time.timestamp_millis() < DELETION_GRACE_MS
    }
}

/// Everything the app persists: the alarm list plus the command history.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    #[serde(default)]
    pub alarms: Vec<Alarm>,
    #[serde(default)]
    pub command_history: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_alarm(now: DateTime<Local>) -> Alarm {
        Alarm {
            id: "1700000000000-1".to_string(),
            message: "farm".to_string(),
            time: now + chrono::Duration::minutes(10),
            is_active: true,
            duration: Some(600_000),
            elapsed_time: None,
            keep: false,
        }
    }

    #[test]
    fn serializes_with_camel_case_field_names() {
        let now = Local::now();
        let json = serde_json::to_value(sample_alarm(now)).expect("serialize");
        let object = json.as_object().expect("object");
        assert!(object.contains_key("isActive"));
        assert!(object.contains_key("duration"));
        assert!(object.contains_key("keep"));
        assert!(!object.contains_key("elapsedTime"), "None fields are omitted");
        assert!(
            object["time"].as_str().expect("time string").contains('T'),
            "time is an ISO-8601 string"
        );
    }

    #[test]
    fn deserializes_records_with_missing_optional_fields() {
        let json = r#"
        {
            "id": "123",
            "message": "trade",
            "time": "2026-08-23T12:00:00+02:00",
            "isActive": false
        }"#;
        let alarm: Alarm = serde_json::from_str(json).expect("deserialize");
        assert_eq!(alarm.duration, None);
        assert_eq!(alarm.elapsed_time, None);
        assert!(!alarm.keep);
    }

    #[test]
    fn status_follows_active_and_keep_flags() {
        let now = Local::now();
        let mut alarm = sample_alarm(now);
        assert_eq!(alarm.status(), AlarmStatus::Counting);

        alarm.is_active = false;
        assert_eq!(alarm.status(), AlarmStatus::PendingDeletion);

        alarm.keep = true;
        assert_eq!(alarm.status(), AlarmStatus::Kept);
    }

    #[test]
    fn retention_window_is_exclusive_at_the_upper_bound() {
        let now = Local::now();
        let mut alarm = sample_alarm(now);
        alarm.is_active = false;
        alarm.time = now;

        assert!(alarm.retained(now), "just fired");
        assert!(
            alarm.retained(now + chrono::Duration::milliseconds(DELETION_GRACE_MS - 1)),
            "inside the grace window"
        );
        assert!(
            !alarm.retained(now + chrono::Duration::milliseconds(DELETION_GRACE_MS)),
            "window end is exclusive"
        );
    }

    #[test]
    fn kept_and_active_alarms_are_always_retained() {
        let now = Local::now();
        let long_ago = now - chrono::Duration::days(2);

        let mut kept = sample_alarm(now);
        kept.is_active = false;
        kept.keep = true;
        kept.time = long_ago;
        assert!(kept.retained(now));

        let mut active = sample_alarm(now);
        active.time = long_ago;
        assert!(active.retained(now), "active alarms never fall out of the list");
    }

    #[test]
    fn app_state_round_trips_through_json() {
        let now = Local::now();
        let state = AppState {
            alarms: vec![sample_alarm(now)],
            command_history: vec!["farm in 10m".to_string()],
        };
        let json = serde_json::to_string_pretty(&state).expect("serialize");
        assert!(json.contains("commandHistory"));

        let restored: AppState = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.alarms.len(), 1);
        assert_eq!(restored.alarms[0].message, "farm");
        assert_eq!(restored.alarms[0].time, state.alarms[0].time);
        assert_eq!(restored.command_history, state.command_history);
    }

    #[test]
    fn empty_object_deserializes_to_defaults() {
        let state: AppState = serde_json::from_str("{}").expect("deserialize");
        assert!(state.alarms.is_empty());
        assert!(state.command_history.is_empty());
    }
}
