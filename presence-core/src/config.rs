use config::{Config, ConfigError, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct PresenceConfig {
    pub service: ServiceConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub presence: PresenceRules,
    #[serde(default)]
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServiceConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

/// Timing rules for the session engines.
///
/// `tolerance_secs` governs both "is this session still online" and
/// "may this login start a new session" — a single shared value, matching
/// the deployed behavior.
#[derive(Debug, Deserialize, Clone)]
pub struct PresenceRules {
    pub tolerance_secs: u64,
    pub op_timeout_secs: u64,
    pub batch_timeout_secs: u64,
}

impl Default for PresenceRules {
    fn default() -> Self {
        Self {
            tolerance_secs: 10,
            op_timeout_secs: 5,
            batch_timeout_secs: 120,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct HttpConfig {
    pub enabled: bool,
    pub host: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

impl PresenceConfig {
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(File::with_name(path))
            .build()?;
        s.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rules_match_documented_values() {
        let rules = PresenceRules::default();
        assert_eq!(rules.tolerance_secs, 10);
        assert_eq!(rules.op_timeout_secs, 5);
        assert_eq!(rules.batch_timeout_secs, 120);
    }

    #[test]
    fn http_defaults() {
        let http = HttpConfig::default();
        assert!(http.enabled);
        assert_eq!(http.port, 8080);
    }

    #[test]
    fn http_enabled_flag_deserializes_from_toml() {
        let toml = r#"
            [service]
            log_level = "info"

            [database]
            url = "postgresql://localhost/presence"
            max_connections = 5

            [http]
            enabled = false
            host = "0.0.0.0"
            port = 9090
        "#;
        let cfg: PresenceConfig = Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert!(!cfg.http.enabled);
        assert_eq!(cfg.http.port, 9090);
        // Omitted sections fall back to defaults.
        assert_eq!(cfg.presence.tolerance_secs, 10);
    }
}
