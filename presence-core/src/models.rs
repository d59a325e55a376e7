use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A time-bounded record of a login being present on a computer.
/// `end_date_time` starts at `start + next_ping` and is pushed forward by
/// later ping/activity events; it never moves backward.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Session {
    pub id: String,
    pub comp_name: String,
    pub ip_addr: String,
    pub login: String,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
}

/// A typed sub-interval nested within a session, keyed by
/// (session_id, session_type).
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Activity {
    pub session_id: String,
    pub session_type: String,
    pub login: String,
    pub start_date_time: DateTime<Utc>,
    pub end_date_time: DateTime<Utc>,
}

/// Input to the session engine: a first-contact event.
#[derive(Debug, Clone)]
pub struct NewSession {
    pub id: String,
    pub comp_name: String,
    pub ip_addr: String,
    pub login: String,
    pub start_date_time: DateTime<Utc>,
    pub next_ping: Duration,
}

impl NewSession {
    /// End of the interval this event vouches for.
    pub fn end_date_time(&self) -> DateTime<Utc> {
        self.start_date_time + self.next_ping
    }
}

/// Input to the activity engine: a follow-up ping, optionally tagged with
/// an activity type. An untagged event is a pure session extension.
#[derive(Debug, Clone)]
pub struct PingEvent {
    pub session_id: String,
    pub session_type: Option<String>,
    pub login: String,
    pub event_time: DateTime<Utc>,
    pub next_ping: Duration,
}

impl PingEvent {
    pub fn end_date_time(&self) -> DateTime<Utc> {
        self.event_time + self.next_ping
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupBy {
    #[default]
    Day,
    Month,
}

impl std::str::FromStr for GroupBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Self::Day),
            "month" => Ok(Self::Month),
            other => Err(format!("group_by must be 'day' or 'month', got '{other}'")),
        }
    }
}

/// Input to the aggregation engine. `from`/`to` are already truncated to
/// day granularity by the transport; both bounds are inclusive.
#[derive(Debug, Clone)]
pub struct ReportQuery {
    pub login: String,
    pub session_type: Option<String>,
    pub from: NaiveDate,
    pub to: NaiveDate,
    pub group_by: GroupBy,
}

/// One aggregate row: hours for a single period plus the grand total over
/// the whole window for that login. Derived on demand, never persisted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityReportRow {
    pub login: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<i32>,
    pub hours: f64,
    pub total_hours: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_session_end_is_start_plus_ping() {
        let start = "2024-01-01T08:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let sess = NewSession {
            id: "s1".into(),
            comp_name: "pc-01".into(),
            ip_addr: "10.0.0.1".into(),
            login: "alice".into(),
            start_date_time: start,
            next_ping: Duration::seconds(3600),
        };
        assert_eq!(
            sess.end_date_time(),
            "2024-01-01T09:00:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }

    #[test]
    fn group_by_parses_and_rejects() {
        assert_eq!("day".parse::<GroupBy>().unwrap(), GroupBy::Day);
        assert_eq!("month".parse::<GroupBy>().unwrap(), GroupBy::Month);
        assert!("date".parse::<GroupBy>().is_err());
        assert!("week".parse::<GroupBy>().is_err());
    }

    #[test]
    fn report_row_omits_unused_period_fields() {
        let row = ActivityReportRow {
            login: "alice".into(),
            day: Some(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()),
            year: None,
            month: None,
            hours: 1.83,
            total_hours: 1.83,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert!(json.get("year").is_none());
        assert!(json.get("month").is_none());
        assert_eq!(json["day"], "2024-01-01");
    }
}
