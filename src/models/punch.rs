//! Punch and daily log models.
//!
//! A [`Punch`] is a single clock-in or clock-out event. Punches for one
//! employee on one calendar date live in a [`DailyLog`], which is the unit
//! the punch store persists.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Direction of a punch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PunchType {
    /// Clock-in.
    In,
    /// Clock-out.
    Out,
}

/// A single clock-in or clock-out event.
///
/// The serialized form is the wire shape exchanged with the punch store:
/// `{"type": "in", "time": "...", "location": ..., "photo": ..., "auto_closed": ...}`.
///
/// # Example
///
/// ```
/// use attendance_engine::models::{Punch, PunchType};
///
/// let punch: Punch = serde_json::from_str(
///     r#"{"type": "out", "time": "2026-01-15T17:00:00Z", "photo": null}"#,
/// ).unwrap();
/// assert_eq!(punch.punch_type, PunchType::Out);
/// assert_eq!(punch.timestamp.to_string(), "2026-01-15 17:00:00");
/// assert!(!punch.auto_generated);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Punch {
    /// Whether this is a clock-in or a clock-out.
    #[serde(rename = "type")]
    pub punch_type: PunchType,
    /// Local wall-clock time of the punch.
    #[serde(rename = "time", with = "wire_time")]
    pub timestamp: NaiveDateTime,
    /// Free-form location label recorded with the punch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Reference to a stored photo, if one was taken.
    #[serde(rename = "photo", default)]
    pub photo_ref: Option<String>,
    /// Set on punches written by the scheduled jobs rather than by an employee.
    #[serde(rename = "auto_closed", default)]
    pub auto_generated: bool,
}

impl Punch {
    /// Creates an employee clock-in.
    pub fn clock_in(timestamp: NaiveDateTime) -> Self {
        Self::new(PunchType::In, timestamp)
    }

    /// Creates an employee clock-out.
    pub fn clock_out(timestamp: NaiveDateTime) -> Self {
        Self::new(PunchType::Out, timestamp)
    }

    /// Creates a punch written by the system, tagged with `location`.
    pub fn system(punch_type: PunchType, timestamp: NaiveDateTime, location: &str) -> Self {
        Self {
            location: Some(location.to_string()),
            auto_generated: true,
            ..Self::new(punch_type, timestamp)
        }
    }

    fn new(punch_type: PunchType, timestamp: NaiveDateTime) -> Self {
        Self {
            punch_type,
            timestamp,
            location: None,
            photo_ref: None,
            auto_generated: false,
        }
    }

    /// Returns true for clock-in punches.
    pub fn is_in(&self) -> bool {
        self.punch_type == PunchType::In
    }

    /// The calendar date the punch was recorded on.
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}

/// The ordered punches of one employee on one calendar date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyLog {
    /// Unique identifier of the log row.
    pub id: Uuid,
    /// The employee the punches belong to.
    pub employee_id: Uuid,
    /// The tenant (company) the employee belongs to.
    pub tenant_id: Uuid,
    /// The calendar date this log covers.
    pub date: NaiveDate,
    /// Punches in the order they were recorded.
    #[serde(default)]
    pub punches: Vec<Punch>,
}

impl DailyLog {
    /// Creates an empty log with a fresh id.
    pub fn new(employee_id: Uuid, tenant_id: Uuid, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4(),
            employee_id,
            tenant_id,
            date,
            punches: Vec::new(),
        }
    }

    /// Builder-style helper that appends `punch`.
    pub fn with_punch(mut self, punch: Punch) -> Self {
        self.punches.push(punch);
        self
    }

    /// The most recently recorded punch.
    pub fn last_punch(&self) -> Option<&Punch> {
        self.punches.last()
    }

    /// A log is open when its last punch is a clock-in.
    ///
    /// ```
    /// use attendance_engine::models::{DailyLog, Punch};
    /// use chrono::NaiveDate;
    /// use uuid::Uuid;
    ///
    /// let date = NaiveDate::from_ymd_opt(2026, 1, 15).unwrap();
    /// let log = DailyLog::new(Uuid::new_v4(), Uuid::new_v4(), date)
    ///     .with_punch(Punch::clock_in(date.and_hms_opt(9, 0, 0).unwrap()));
    /// assert!(log.is_open());
    /// ```
    pub fn is_open(&self) -> bool {
        self.last_punch().is_some_and(Punch::is_in)
    }

    /// True when the log holds punches and every one was system-written.
    pub fn is_placeholder(&self) -> bool {
        !self.punches.is_empty() && self.punches.iter().all(|p| p.auto_generated)
    }
}

/// Serde adapter for the `time` field: accepts naive local timestamps and
/// RFC 3339 timestamps with an offset, keeping the wall-clock part.
mod wire_time {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use crate::validation::parse_timestamp;

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp("time", &raw).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(h: u32, m: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 15)
            .unwrap()
            .and_hms_opt(h, m, 0)
            .unwrap()
    }

    fn empty_log() -> DailyLog {
        DailyLog::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            NaiveDate::from_ymd_opt(2026, 1, 15).unwrap(),
        )
    }

    #[test]
    fn test_deserialize_wire_punch() {
        let json = r#"{
            "type": "in",
            "time": "2026-01-15T09:00:00",
            "location": "Head office",
            "photo": "photos/abc.jpg"
        }"#;

        let punch: Punch = serde_json::from_str(json).unwrap();
        assert_eq!(punch.punch_type, PunchType::In);
        assert_eq!(punch.timestamp, at(9, 0));
        assert_eq!(punch.location.as_deref(), Some("Head office"));
        assert_eq!(punch.photo_ref.as_deref(), Some("photos/abc.jpg"));
        assert!(!punch.auto_generated);
    }

    #[test]
    fn test_deserialize_keeps_wall_clock_of_offset_timestamp() {
        let json = r#"{"type": "in", "time": "2026-01-15T09:00:00+01:00"}"#;
        let punch: Punch = serde_json::from_str(json).unwrap();
        assert_eq!(punch.timestamp, at(9, 0));
    }

    #[test]
    fn test_deserialize_rejects_malformed_time() {
        let json = r#"{"type": "in", "time": "yesterday"}"#;
        assert!(serde_json::from_str::<Punch>(json).is_err());
    }

    #[test]
    fn test_serialize_uses_wire_names() {
        let punch = Punch::system(PunchType::Out, at(22, 0), "Auto-closed");
        let json = serde_json::to_string(&punch).unwrap();
        assert!(json.contains("\"type\":\"out\""));
        assert!(json.contains("\"time\":\"2026-01-15T22:00:00\""));
        assert!(json.contains("\"auto_closed\":true"));
        assert!(json.contains("\"photo\":null"));
    }

    #[test]
    fn test_fractional_seconds_survive_round_trip() {
        let json = r#"{"type": "out", "time": "2026-01-15T17:00:00.250Z"}"#;
        let punch: Punch = serde_json::from_str(json).unwrap();
        assert_eq!(
            punch.timestamp,
            at(17, 0) + chrono::Duration::milliseconds(250)
        );

        let wire = serde_json::to_string(&punch).unwrap();
        assert!(wire.contains("\"time\":\"2026-01-15T17:00:00.250\""));
        let back: Punch = serde_json::from_str(&wire).unwrap();
        assert_eq!(back, punch);
    }

    #[test]
    fn test_empty_log_is_not_open() {
        assert!(!empty_log().is_open());
    }

    #[test]
    fn test_log_closed_when_last_punch_is_out() {
        let log = empty_log()
            .with_punch(Punch::clock_in(at(9, 0)))
            .with_punch(Punch::clock_out(at(17, 0)));
        assert!(!log.is_open());
    }

    #[test]
    fn test_log_reopened_after_second_clock_in() {
        let log = empty_log()
            .with_punch(Punch::clock_in(at(9, 0)))
            .with_punch(Punch::clock_out(at(12, 0)))
            .with_punch(Punch::clock_in(at(13, 0)));
        assert!(log.is_open());
    }

    #[test]
    fn test_placeholder_requires_all_punches_system_written() {
        let auto_closed = empty_log()
            .with_punch(Punch::clock_in(at(9, 0)))
            .with_punch(Punch::system(PunchType::Out, at(22, 0), "Auto-closed"));
        assert!(!auto_closed.is_placeholder());

        let placeholder = empty_log()
            .with_punch(Punch::system(PunchType::In, at(8, 0), "No attendance"))
            .with_punch(Punch::system(PunchType::Out, at(8, 0), "No attendance"));
        assert!(placeholder.is_placeholder());
        assert!(!empty_log().is_placeholder());
    }
}
