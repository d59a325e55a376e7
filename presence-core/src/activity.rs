//! Activity engine: ping-driven extension of sessions and typed activities.
//!
//! An untagged event only pushes the session's end timestamp forward. A
//! tagged event upserts the (session_id, session_type) activity row and
//! extends the parent session in the same transaction, because the online
//! dashboard only inspects the session table. Extension is monotonic in
//! both tables, so replaying an older event after a newer one is a no-op.

use crate::config::PresenceRules;
use crate::db;
use crate::error::PresenceError;
use crate::models::PingEvent;
use chrono::Duration;
use sqlx::PgPool;

/// Record a follow-up event for an existing session.
///
/// Returns `NotFound` when the session ID is unknown — an activity can
/// never implicitly create its parent session.
pub async fn record_activity(
    pool: &PgPool,
    rules: &PresenceRules,
    event: &PingEvent,
) -> Result<(), PresenceError> {
    validate(event)?;

    db::with_timeout(rules.op_timeout_secs, async {
        let new_end = event.end_date_time();

        let session_type = event.session_type.as_deref().filter(|t| !t.is_empty());
        match session_type {
            None => {
                let res = sqlx::query(
                    "UPDATE sessions SET end_date_time = GREATEST(end_date_time, $1) \
                     WHERE id = $2",
                )
                .bind(new_end)
                .bind(&event.session_id)
                .execute(pool)
                .await?;

                if res.rows_affected() == 0 {
                    return Err(PresenceError::NotFound);
                }
            }
            Some(stype) => {
                // Both writes commit together or neither does; dropping the
                // transaction before commit rolls it back.
                let mut tx = pool.begin().await?;

                let res = sqlx::query(
                    "UPDATE sessions SET end_date_time = GREATEST(end_date_time, $1) \
                     WHERE id = $2",
                )
                .bind(new_end)
                .bind(&event.session_id)
                .execute(&mut *tx)
                .await?;

                if res.rows_affected() == 0 {
                    tx.rollback().await?;
                    return Err(PresenceError::NotFound);
                }

                sqlx::query(
                    "INSERT INTO activities (session_id, session_type, login, start_date_time, end_date_time) \
                     VALUES ($1, $2, $3, $4, $5) \
                     ON CONFLICT (session_id, session_type) DO UPDATE \
                     SET end_date_time = GREATEST(activities.end_date_time, EXCLUDED.end_date_time)",
                )
                .bind(&event.session_id)
                .bind(stype)
                .bind(&event.login)
                .bind(event.event_time)
                .bind(new_end)
                .execute(&mut *tx)
                .await?;

                tx.commit().await?;

                tracing::debug!(
                    "activity '{}' recorded for session '{}'",
                    stype,
                    event.session_id
                );
            }
        }

        Ok(())
    })
    .await
}

fn validate(event: &PingEvent) -> Result<(), PresenceError> {
    if event.session_id.is_empty() {
        return Err(PresenceError::empty_field("session_id"));
    }
    if event.login.is_empty() {
        return Err(PresenceError::empty_field("login"));
    }
    if event.next_ping <= Duration::zero() {
        return Err(PresenceError::Validation(
            "next ping duration less or eq 0".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn sample() -> PingEvent {
        PingEvent {
            session_id: "sess-1".into(),
            session_type: Some("browser".into()),
            login: "alice".into(),
            event_time: "2024-01-01T08:50:00Z".parse::<DateTime<Utc>>().unwrap(),
            next_ping: Duration::seconds(3600),
        }
    }

    #[test]
    fn validate_accepts_tagged_and_untagged_events() {
        assert!(validate(&sample()).is_ok());

        let mut untagged = sample();
        untagged.session_type = None;
        assert!(validate(&untagged).is_ok());
    }

    #[test]
    fn validate_rejects_missing_fields() {
        let mut e = sample();
        e.session_id = String::new();
        assert!(matches!(validate(&e), Err(PresenceError::Validation(_))));

        let mut e = sample();
        e.login = String::new();
        assert!(matches!(validate(&e), Err(PresenceError::Validation(_))));

        let mut e = sample();
        e.next_ping = Duration::seconds(0);
        assert!(matches!(validate(&e), Err(PresenceError::Validation(_))));
    }

    #[test]
    fn event_end_is_event_time_plus_ping() {
        let e = sample();
        assert_eq!(
            e.end_date_time(),
            "2024-01-01T09:50:00Z".parse::<DateTime<Utc>>().unwrap()
        );
    }
}
