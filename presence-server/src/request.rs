//! Request DTOs and boundary validation.
//!
//! Each DTO validates into the corresponding engine input; validation errors
//! never reach the store. Timestamps accept three formats, tried in order:
//! RFC3339, `YYYY-MM-DD HH:MM:SS`, `YYYY-MM-DD` (naive forms read as UTC).

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveDateTime, Utc};
use presence_core::{GroupBy, NewSession, PingEvent, PresenceError, ReportQuery};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct NameRequest {
    pub name: String,
}

#[derive(Debug, Deserialize)]
pub struct SessionRequest {
    pub id: String,
    pub comp_name: String,
    #[serde(default)]
    pub ip_addr: String,
    pub login: String,
    pub next_ping_sec: i64,
    #[serde(default)]
    pub date_time: Option<String>,
}

impl SessionRequest {
    pub fn validate(self) -> Result<NewSession, PresenceError> {
        if self.id.is_empty() {
            return Err(PresenceError::empty_field("id"));
        }
        if self.comp_name.is_empty() {
            return Err(PresenceError::empty_field("comp_name"));
        }
        if self.login.is_empty() {
            return Err(PresenceError::empty_field("login"));
        }
        if self.next_ping_sec <= 0 {
            return Err(PresenceError::Validation(
                "next_ping_sec must be a positive integer".to_string(),
            ));
        }

        let start_date_time = match self.date_time.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => parse_date(s).map_err(PresenceError::Validation)?,
            None => Utc::now(),
        };

        Ok(NewSession {
            id: self.id,
            comp_name: self.comp_name,
            ip_addr: self.ip_addr,
            login: self.login,
            start_date_time,
            next_ping: Duration::seconds(self.next_ping_sec),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ActivityRequest {
    pub session_id: String,
    #[serde(default)]
    pub session_type: Option<String>,
    pub login: String,
    pub next_ping_sec: i64,
    #[serde(default)]
    pub date_time: Option<String>,
}

impl ActivityRequest {
    pub fn validate(self) -> Result<PingEvent, PresenceError> {
        if self.session_id.is_empty() {
            return Err(PresenceError::empty_field("session_id"));
        }
        if self.login.is_empty() {
            return Err(PresenceError::empty_field("login"));
        }
        if self.next_ping_sec <= 0 {
            return Err(PresenceError::Validation(
                "next_ping_sec must be a positive integer".to_string(),
            ));
        }

        let event_time = match self.date_time.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => parse_date(s).map_err(PresenceError::Validation)?,
            None => Utc::now(),
        };

        Ok(PingEvent {
            session_id: self.session_id,
            session_type: self.session_type,
            login: self.login,
            event_time,
            next_ping: Duration::seconds(self.next_ping_sec),
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct UserActivityQuery {
    #[serde(default)]
    pub session_type: Option<String>,
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub from_date: Option<String>,
    #[serde(default)]
    pub to_date: Option<String>,
    #[serde(default)]
    pub group_by: Option<String>,
}

impl UserActivityQuery {
    /// Validate into a day-granular report window. With both bounds omitted
    /// the window is [today, tomorrow]; with only `to_date` omitted it runs
    /// to tomorrow. A `to_date` without a `from_date` is rejected.
    pub fn validate(self) -> Result<ReportQuery, PresenceError> {
        self.validate_at(Utc::now())
    }

    fn validate_at(self, now: DateTime<Utc>) -> Result<ReportQuery, PresenceError> {
        if self.login.is_empty() {
            return Err(PresenceError::empty_field("login"));
        }

        let group_by = match self.group_by.as_deref().filter(|s| !s.is_empty()) {
            Some(s) => s.parse::<GroupBy>().map_err(PresenceError::Validation)?,
            None => GroupBy::default(),
        };

        let today = now.date_naive();
        let tomorrow = today + Days::new(1);

        let from_date = self.from_date.as_deref().filter(|s| !s.is_empty());
        let to_date = self.to_date.as_deref().filter(|s| !s.is_empty());

        if from_date.is_none() && to_date.is_some() {
            return Err(PresenceError::Validation(
                "to_date given without from_date".to_string(),
            ));
        }

        let from = match from_date {
            Some(s) => parse_date(s).map_err(PresenceError::Validation)?.date_naive(),
            None => today,
        };
        let to = match to_date {
            Some(s) => parse_date(s).map_err(PresenceError::Validation)?.date_naive(),
            None => tomorrow,
        };

        Ok(ReportQuery {
            login: self.login,
            session_type: self.session_type,
            from,
            to,
            group_by,
        })
    }
}

/// Parse a timestamp in one of the three accepted formats.
pub fn parse_date(s: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(t) = DateTime::parse_from_rfc3339(s) {
        return Ok(t.with_timezone(&Utc));
    }
    if let Ok(t) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S") {
        return Ok(t.and_utc());
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(d.and_time(chrono::NaiveTime::MIN).and_utc());
    }
    Err(format!(
        "date '{s}' must be RFC3339, 'YYYY-MM-DD HH:MM:SS' or 'YYYY-MM-DD'"
    ))
}
