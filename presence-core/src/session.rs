//! Session engine: first-contact session creation and the online dashboard.
//!
//! The at-most-one-active-session invariant is enforced by a read-then-write
//! check bounded by the tolerance window, with the `sessions.id` primary key
//! as the hard backstop under races. A colliding ID is reported as a
//! duplicate, never merged.

use crate::config::PresenceRules;
use crate::db;
use crate::error::{map_insert_error, PresenceError};
use crate::models::{NewSession, Session};
use chrono::{Duration, Utc};
use sqlx::PgPool;

/// Create a session for a login's first contact.
///
/// Refuses with `AccessDenied` (carrying the conflicting rows) when the
/// login still has a session whose end timestamp is within the tolerance
/// window — the caller is presumed to already be in that session.
pub async fn create_session(
    pool: &PgPool,
    rules: &PresenceRules,
    sess: &NewSession,
) -> Result<(), PresenceError> {
    validate(sess)?;

    db::with_timeout(rules.op_timeout_secs, async {
        let cutoff = Utc::now() - Duration::seconds(rules.tolerance_secs as i64);

        let active: Vec<Session> = sqlx::query_as(
            "SELECT id, comp_name, ip_addr, login, start_date_time, end_date_time \
             FROM sessions WHERE login = $1 AND end_date_time >= $2",
        )
        .bind(&sess.login)
        .bind(cutoff)
        .fetch_all(pool)
        .await?;

        if !active.is_empty() {
            tracing::debug!(
                "session refused for '{}': {} active session(s) found",
                sess.login,
                active.len()
            );
            return Err(PresenceError::AccessDenied { sessions: active });
        }

        sqlx::query(
            "INSERT INTO sessions (id, comp_name, ip_addr, login, start_date_time, end_date_time) \
             VALUES ($1, $2, $3, $4, $5, $6)",
        )
        .bind(&sess.id)
        .bind(&sess.comp_name)
        .bind(&sess.ip_addr)
        .bind(&sess.login)
        .bind(sess.start_date_time)
        .bind(sess.end_date_time())
        .execute(pool)
        .await
        .map_err(|e| map_insert_error(e, &sess.id))?;

        tracing::info!("session '{}' created for '{}' on '{}'", sess.id, sess.login, sess.comp_name);
        Ok(())
    })
    .await
}

/// Sessions currently considered online: end timestamp at or after
/// "now minus tolerance". This is the dashboard query; it only ever reads
/// the session table.
pub async fn online_sessions(
    pool: &PgPool,
    rules: &PresenceRules,
) -> Result<Vec<Session>, PresenceError> {
    db::with_timeout(rules.op_timeout_secs, async {
        let cutoff = Utc::now() - Duration::seconds(rules.tolerance_secs as i64);

        let sessions: Vec<Session> = sqlx::query_as(
            "SELECT id, comp_name, ip_addr, login, start_date_time, end_date_time \
             FROM sessions WHERE end_date_time >= $1 ORDER BY start_date_time",
        )
        .bind(cutoff)
        .fetch_all(pool)
        .await?;

        Ok(sessions)
    })
    .await
}

fn validate(sess: &NewSession) -> Result<(), PresenceError> {
    if sess.id.is_empty() {
        return Err(PresenceError::empty_field("id"));
    }
    if sess.comp_name.is_empty() {
        return Err(PresenceError::empty_field("comp_name"));
    }
    if sess.login.is_empty() {
        return Err(PresenceError::empty_field("login"));
    }
    if sess.next_ping <= Duration::zero() {
        return Err(PresenceError::Validation(
            "next ping duration less or eq 0".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::DateTime;

    fn sample() -> NewSession {
        NewSession {
            id: "sess-1".into(),
            comp_name: "lab-07".into(),
            ip_addr: "10.1.2.3".into(),
            login: "alice".into(),
            start_date_time: "2024-01-01T08:00:00Z".parse::<DateTime<Utc>>().unwrap(),
            next_ping: Duration::seconds(3600),
        }
    }

    #[test]
    fn validate_accepts_well_formed_input() {
        assert!(validate(&sample()).is_ok());
    }

    #[test]
    fn validate_rejects_empty_fields() {
        let mut s = sample();
        s.id = String::new();
        assert!(matches!(validate(&s), Err(PresenceError::Validation(_))));

        let mut s = sample();
        s.comp_name = String::new();
        assert!(matches!(validate(&s), Err(PresenceError::Validation(_))));

        let mut s = sample();
        s.login = String::new();
        assert!(matches!(validate(&s), Err(PresenceError::Validation(_))));
    }

    #[test]
    fn validate_rejects_non_positive_ping() {
        let mut s = sample();
        s.next_ping = Duration::zero();
        assert!(matches!(validate(&s), Err(PresenceError::Validation(_))));

        s.next_ping = Duration::seconds(-5);
        assert!(matches!(validate(&s), Err(PresenceError::Validation(_))));
    }
}
