pub mod activity;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod registry;
pub mod report;
pub mod session;

pub use config::PresenceConfig;
pub use error::PresenceError;
pub use models::{
    Activity, ActivityReportRow, GroupBy, NewSession, PingEvent, ReportQuery, Session,
};
