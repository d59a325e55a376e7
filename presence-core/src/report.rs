//! Aggregation engine: connected-hours reports for a login over a window.
//!
//! Source selection: a non-empty type filter reads the activities table for
//! that type; no filter reads whole-session spans (a login with zero typed
//! activities is still "connected" for its whole session). The grand total
//! is a window aggregate in the same query, so a client can render "X hours
//! today, Y hours total this period" without a second round trip.

use crate::config::PresenceRules;
use crate::db;
use crate::error::PresenceError;
use crate::models::{ActivityReportRow, GroupBy, ReportQuery};
use chrono::NaiveDate;
use sqlx::PgPool;

const HOURS_EXPR: &str =
    "(SUM(EXTRACT(EPOCH FROM (end_date_time - start_date_time))))::float8 / 3600.0";
const TOTAL_EXPR: &str =
    "(SUM(SUM(EXTRACT(EPOCH FROM (end_date_time - start_date_time)))) \
     OVER (PARTITION BY login))::float8 / 3600.0";

/// Connected hours for `login` over `[from, to]`, grouped by day or month,
/// plus the grand total for the window. Zero matching rows is success.
pub async fn user_activity(
    pool: &PgPool,
    rules: &PresenceRules,
    query: &ReportQuery,
) -> Result<(Vec<ActivityReportRow>, f64), PresenceError> {
    if query.login.is_empty() {
        return Err(PresenceError::empty_field("login"));
    }

    let type_filter = query.session_type.as_deref().filter(|t| !t.is_empty());

    db::with_timeout(rules.batch_timeout_secs, async {
        let rows = match query.group_by {
            GroupBy::Day => by_day(pool, query, type_filter).await?,
            GroupBy::Month => by_month(pool, query, type_filter).await?,
        };

        let total = rows.first().map_or(0.0, |r| r.total_hours);
        Ok((rows, total))
    })
    .await
}

/// One row per calendar day, ascending.
async fn by_day(
    pool: &PgPool,
    query: &ReportQuery,
    type_filter: Option<&str>,
) -> Result<Vec<ActivityReportRow>, PresenceError> {
    let sql = format!(
        "SELECT login, start_date_time::date AS day, {HOURS_EXPR} AS hours, {TOTAL_EXPR} AS total_hours \
         FROM {} WHERE login = $1 AND start_date_time::date BETWEEN $2 AND $3{} \
         GROUP BY login, start_date_time::date ORDER BY day",
        source(type_filter),
        type_clause(type_filter),
    );

    let mut q = sqlx::query_as::<_, (String, NaiveDate, f64, f64)>(&sql)
        .bind(&query.login)
        .bind(query.from)
        .bind(query.to);
    if let Some(t) = type_filter {
        q = q.bind(t);
    }

    let rows = q.fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|(login, day, hours, total)| ActivityReportRow {
            login,
            day: Some(day),
            year: None,
            month: None,
            hours: round_hours(hours),
            total_hours: round_hours(total),
        })
        .collect())
}

/// One row per (year, month), most recent first — deliberately the opposite
/// ordering of the day grouping.
async fn by_month(
    pool: &PgPool,
    query: &ReportQuery,
    type_filter: Option<&str>,
) -> Result<Vec<ActivityReportRow>, PresenceError> {
    let sql = format!(
        "SELECT login, EXTRACT(YEAR FROM start_date_time)::int AS year, \
         EXTRACT(MONTH FROM start_date_time)::int AS month, \
         {HOURS_EXPR} AS hours, {TOTAL_EXPR} AS total_hours \
         FROM {} WHERE login = $1 AND start_date_time::date BETWEEN $2 AND $3{} \
         GROUP BY login, EXTRACT(YEAR FROM start_date_time), EXTRACT(MONTH FROM start_date_time) \
         ORDER BY year DESC, month DESC",
        source(type_filter),
        type_clause(type_filter),
    );

    let mut q = sqlx::query_as::<_, (String, i32, i32, f64, f64)>(&sql)
        .bind(&query.login)
        .bind(query.from)
        .bind(query.to);
    if let Some(t) = type_filter {
        q = q.bind(t);
    }

    let rows = q.fetch_all(pool).await?;

    Ok(rows
        .into_iter()
        .map(|(login, year, month, hours, total)| ActivityReportRow {
            login,
            day: None,
            year: Some(year),
            month: Some(month),
            hours: round_hours(hours),
            total_hours: round_hours(total),
        })
        .collect())
}

fn source(type_filter: Option<&str>) -> &'static str {
    if type_filter.is_some() {
        "activities"
    } else {
        "sessions"
    }
}

fn type_clause(type_filter: Option<&str>) -> &'static str {
    if type_filter.is_some() {
        " AND session_type = $4"
    } else {
        ""
    }
}

/// Round to 2 decimal places, half away from zero. Applied to the summed
/// values only, never per interval before summing.
pub fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}
