use std::env;
use std::fmt;
use std::path::PathBuf;

use crate::eligibility::WikiId;

/// Distinguishes runtime behavior for different stages of the checker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the application.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub eligibility: EligibilityConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("ELIGIBILITY_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let central_wiki = env::var("ELIGIBILITY_CENTRAL_WIKI")
            .unwrap_or_else(|_| "metawiki".to_string());
        let central_wiki = parse_wiki_id(&central_wiki)?;

        let snapshot = env::var_os("ELIGIBILITY_SNAPSHOT")
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);

        let log_level = env::var("ELIGIBILITY_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            eligibility: EligibilityConfig {
                central_wiki,
                snapshot,
            },
            telemetry: TelemetryConfig { log_level },
        })
    }
}

/// Where evaluations read their data from.
#[derive(Debug, Clone)]
pub struct EligibilityConfig {
    /// Wiki holding the crosswiki rights log (`Name@wiki` entries).
    pub central_wiki: WikiId,
    /// Snapshot file used when none is given on the command line.
    pub snapshot: Option<PathBuf>,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Database names are lowercase ASCII letters, digits and underscores.
pub fn parse_wiki_id(value: &str) -> Result<WikiId, ConfigError> {
    let value = value.trim();
    let valid = !value.is_empty()
        && value
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_');

    if valid {
        Ok(WikiId::new(value))
    } else {
        Err(ConfigError::InvalidCentralWiki {
            value: value.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidCentralWiki { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidCentralWiki { value } => write!(
                f,
                "ELIGIBILITY_CENTRAL_WIKI must be a wiki database name, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::{Mutex, OnceLock};

    fn env_guard() -> &'static Mutex<()> {
        static GUARD: OnceLock<Mutex<()>> = OnceLock::new();
        GUARD.get_or_init(|| Mutex::new(()))
    }

    fn reset_env() {
        env::remove_var("ELIGIBILITY_ENV");
        env::remove_var("ELIGIBILITY_CENTRAL_WIKI");
        env::remove_var("ELIGIBILITY_SNAPSHOT");
        env::remove_var("ELIGIBILITY_LOG_LEVEL");
    }

    #[test]
    fn load_uses_defaults_when_env_missing() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        let config = AppConfig::load().expect("config loads with defaults");
        assert_eq!(config.environment, AppEnvironment::Development);
        assert_eq!(config.eligibility.central_wiki, WikiId::new("metawiki"));
        assert_eq!(config.eligibility.snapshot, None);
        assert_eq!(config.telemetry.log_level, "info");
    }

    #[test]
    fn load_reads_overrides() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ELIGIBILITY_ENV", "CI");
        env::set_var("ELIGIBILITY_CENTRAL_WIKI", " loginwiki ");
        env::set_var("ELIGIBILITY_SNAPSHOT", "fixtures/snapshot.json");
        let config = AppConfig::load().expect("config loads");
        reset_env();

        assert_eq!(config.environment, AppEnvironment::Test);
        assert_eq!(config.eligibility.central_wiki, WikiId::new("loginwiki"));
        assert_eq!(
            config.eligibility.snapshot,
            Some(PathBuf::from("fixtures/snapshot.json"))
        );
    }

    #[test]
    fn rejects_malformed_central_wiki() {
        let _lock = env_guard().lock().expect("env mutex poisoned");
        reset_env();
        env::set_var("ELIGIBILITY_CENTRAL_WIKI", "Meta Wiki");
        let result = AppConfig::load();
        reset_env();

        assert_eq!(
            result.map(|config| config.eligibility.central_wiki),
            Err(ConfigError::InvalidCentralWiki {
                value: "Meta Wiki".to_string()
            })
        );
        assert!(parse_wiki_id("").is_err());
    }
}
