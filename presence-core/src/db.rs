use crate::config::DatabaseConfig;
use crate::error::PresenceError;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::future::Future;
use std::time::Duration;

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .connect(&config.url)
        .await
}

pub async fn health_check(pool: &PgPool) -> Result<String, sqlx::Error> {
    let row: (String,) = sqlx::query_as("SELECT version()").fetch_one(pool).await?;
    Ok(row.0)
}

/// Bound a store operation by an explicit deadline. An elapsed timeout
/// surfaces as `PresenceError::Timeout`, never as an empty result.
pub async fn with_timeout<T, F>(secs: u64, fut: F) -> Result<T, PresenceError>
where
    F: Future<Output = Result<T, PresenceError>>,
{
    match tokio::time::timeout(Duration::from_secs(secs), fut).await {
        Ok(res) => res,
        Err(_) => Err(PresenceError::Timeout),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn with_timeout_passes_through_ok() {
        let res = with_timeout(5, async { Ok::<_, PresenceError>(42) }).await;
        assert_eq!(res.unwrap(), 42);
    }

    #[tokio::test]
    async fn with_timeout_surfaces_elapsed_as_timeout() {
        let res: Result<(), _> = with_timeout(0, async {
            tokio::time::sleep(Duration::from_secs(2)).await;
            Ok(())
        })
        .await;
        assert!(matches!(res, Err(PresenceError::Timeout)));
    }

    #[tokio::test]
    async fn with_timeout_passes_through_err() {
        let res: Result<(), _> =
            with_timeout(5, async { Err(PresenceError::NotFound) }).await;
        assert!(matches!(res, Err(PresenceError::NotFound)));
    }
}
