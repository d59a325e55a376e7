//! Bulk registration of user logins and computer names.
//!
//! Each insert is independent and conflict-tolerant (duplicate names are
//! silently ignored). Non-conflict failures are accumulated and returned
//! jointly; successfully inserted entries stand — there is no cross-entry
//! atomicity requirement.

use crate::config::PresenceRules;
use crate::db;
use crate::error::PresenceError;
use sqlx::PgPool;

pub async fn register_users(
    pool: &PgPool,
    rules: &PresenceRules,
    names: &[String],
) -> Result<(), PresenceError> {
    register(
        pool,
        rules,
        "INSERT INTO users (login) VALUES ($1) ON CONFLICT DO NOTHING",
        names,
    )
    .await
}

pub async fn register_computers(
    pool: &PgPool,
    rules: &PresenceRules,
    names: &[String],
) -> Result<(), PresenceError> {
    register(
        pool,
        rules,
        "INSERT INTO computers (comp_name) VALUES ($1) ON CONFLICT DO NOTHING",
        names,
    )
    .await
}

async fn register(
    pool: &PgPool,
    rules: &PresenceRules,
    stmt: &str,
    names: &[String],
) -> Result<(), PresenceError> {
    db::with_timeout(rules.batch_timeout_secs, async {
        let mut failures = Vec::new();

        // Empty names are skipped before submission.
        for name in names.iter().filter(|n| !n.is_empty()) {
            if let Err(e) = sqlx::query(stmt).bind(name).execute(pool).await {
                tracing::error!("registration insert failed for '{}': {}", name, e);
                failures.push(format!("{name}: {e}"));
            }
        }

        if failures.is_empty() {
            Ok(())
        } else {
            Err(PresenceError::Batch(failures))
        }
    })
    .await
}
