use crate::models::Session;
use thiserror::Error;

/// Error taxonomy for the presence engines.
///
/// `Validation` never reaches the store; `AccessDenied` and `NotFound` are
/// expected business outcomes; everything else is infrastructure.
#[derive(Error, Debug)]
pub enum PresenceError {
    #[error("{0}")]
    Validation(String),

    #[error("access denied: login already has an active session")]
    AccessDenied { sessions: Vec<Session> },

    #[error("session not found")]
    NotFound,

    #[error("duplicate key: {0}")]
    DuplicateKey(String),

    #[error("registration failed for: {}", .0.join(", "))]
    Batch(Vec<String>),

    #[error("store operation timed out")]
    Timeout,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}

impl PresenceError {
    pub fn empty_field(field: &str) -> Self {
        Self::Validation(format!("{field} is empty"))
    }

    /// Stable taxonomy code surfaced to clients alongside a generic message.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation",
            Self::AccessDenied { .. } => "access_denied",
            Self::NotFound => "not_found",
            Self::DuplicateKey(_) => "duplicate_key",
            Self::Batch(_) => "batch",
            Self::Timeout => "timeout",
            Self::Database(_) => "infrastructure",
            Self::Config(_) => "infrastructure",
        }
    }
}

/// Map a store error from an INSERT, promoting unique-constraint violations
/// to `DuplicateKey` so a colliding session ID is reported, never merged.
pub fn map_insert_error(err: sqlx::Error, key: &str) -> PresenceError {
    if let sqlx::Error::Database(ref db) = err {
        if db.is_unique_violation() {
            return PresenceError::DuplicateKey(key.to_string());
        }
    }
    PresenceError::Database(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(PresenceError::Validation("x".into()).code(), "validation");
        assert_eq!(PresenceError::NotFound.code(), "not_found");
        assert_eq!(
            PresenceError::AccessDenied { sessions: vec![] }.code(),
            "access_denied"
        );
        assert_eq!(PresenceError::Timeout.code(), "timeout");
    }

    #[test]
    fn batch_error_names_every_entry() {
        let err = PresenceError::Batch(vec!["alice".into(), "bob".into()]);
        let msg = err.to_string();
        assert!(msg.contains("alice"));
        assert!(msg.contains("bob"));
    }

    #[test]
    fn empty_field_message() {
        assert_eq!(
            PresenceError::empty_field("login").to_string(),
            "login is empty"
        );
    }
}
