//! `config.yml` plus `DOLLARSANDLIFE_*` environment overrides
//!
//! Every section and key is optional; whatever is left out keeps its default,
//! and a missing or empty file is the same as an all-default one.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Environment variable naming an alternative config file
pub const CONFIG_PATH_ENV: &str = "DOLLARSANDLIFE_CONFIG";

/// Config file used when `DOLLARSANDLIFE_CONFIG` is not set
pub const DEFAULT_CONFIG_PATH: &str = "config.yml";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Per-IP request limits for the public API
    #[serde(default)]
    pub rate_limit: RateLimitConfig,
}

/// Listen address and the origin browsers may call from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// `*` allows any origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_cors_origin() -> String {
    "*".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub driver: DatabaseDriver,
    /// SQLite file path (or `:memory:`), or a MySQL URL
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            driver: DatabaseDriver::default(),
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/dollarsandlife.db".to_string()
}

/// Per-IP rate limits. `list_max` applies to collection reads and
/// `item_max` to single-record reads, both per `window_secs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_window_secs")]
    pub window_secs: u64,
    #[serde(default = "default_list_max")]
    pub list_max: usize,
    #[serde(default = "default_item_max")]
    pub item_max: usize,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            window_secs: default_window_secs(),
            list_max: default_list_max(),
            item_max: default_item_max(),
        }
    }
}

fn default_true() -> bool {
    true
}

// 15 minutes
fn default_window_secs() -> u64 {
    900
}

fn default_list_max() -> usize {
    100
}

fn default_item_max() -> usize {
    30
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseDriver {
    #[default]
    Sqlite,
    Mysql,
}

impl FromStr for DatabaseDriver {
    type Err = String;

    /// Case-insensitive driver name
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "sqlite" => Ok(Self::Sqlite),
            "mysql" => Ok(Self::Mysql),
            other => Err(format!("unknown database driver '{}'", other)),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

impl Config {
    /// Config file path, honoring `DOLLARSANDLIFE_CONFIG`
    pub fn path_from_env() -> PathBuf {
        std::env::var(CONFIG_PATH_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH))
    }

    /// Read `path`. Absent or blank files give the defaults; bad YAML is a
    /// [`ConfigError::ParseError`] carrying line and column.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let shown = path.display().to_string();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::FileRead {
            path: shown.clone(),
            source,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let parsed = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: shown,
            message: describe_yaml_error(&e),
        });
        Ok(parsed?)
    }

    /// [`Config::load`], then environment overrides, then [`Config::validate`].
    ///
    /// Recognized variables: `DOLLARSANDLIFE_SERVER_HOST`, `_SERVER_PORT`,
    /// `_SERVER_CORS_ORIGIN`, `_DATABASE_DRIVER`, `_DATABASE_URL`,
    /// `_RATE_LIMIT_ENABLED` and `_RATE_LIMIT_LIST_MAX`. Values that don't
    /// parse are skipped.
    pub fn load_with_env(path: &Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Reject settings that would only fail later at startup
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "database.url must not be empty".to_string(),
            ));
        }
        let origin = self.server.cors_origin.trim();
        if origin != "*" && !(origin.starts_with("http://") || origin.starts_with("https://")) {
            return Err(ConfigError::ValidationError(format!(
                "server.cors_origin must be '*' or an http(s) origin, got '{}'",
                self.server.cors_origin
            )));
        }
        let limits = &self.rate_limit;
        if limits.enabled && (limits.window_secs == 0 || limits.list_max == 0 || limits.item_max == 0) {
            return Err(ConfigError::ValidationError(
                "rate_limit window_secs, list_max and item_max must be positive".to_string(),
            ));
        }
        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Some(host) = env_value("DOLLARSANDLIFE_SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = env_value("DOLLARSANDLIFE_SERVER_PORT") {
            self.server.port = port;
        }
        if let Some(origin) = env_value("DOLLARSANDLIFE_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = origin;
        }
        if let Some(driver) = env_value("DOLLARSANDLIFE_DATABASE_DRIVER") {
            self.database.driver = driver;
        }
        if let Some(url) = env_value("DOLLARSANDLIFE_DATABASE_URL") {
            self.database.url = url;
        }
        if let Some(enabled) = env_value("DOLLARSANDLIFE_RATE_LIMIT_ENABLED") {
            self.rate_limit.enabled = enabled;
        }
        if let Some(max) = env_value("DOLLARSANDLIFE_RATE_LIMIT_LIST_MAX") {
            self.rate_limit.list_max = max;
        }
    }
}

/// A set environment variable that parses as `T`
fn env_value<T: FromStr>(name: &str) -> Option<T> {
    std::env::var(name).ok()?.parse().ok()
}

fn describe_yaml_error(e: &serde_yaml::Error) -> String {
    match e.location() {
        Some(at) => format!("at line {}, column {}: {}", at.line(), at.column(), e),
        None => e.to_string(),
    }
}

// Shared by every test module that touches DOLLARSANDLIFE_* variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
const ENV_VARS: &[&str] = &[
    "DOLLARSANDLIFE_SERVER_HOST",
    "DOLLARSANDLIFE_SERVER_PORT",
    "DOLLARSANDLIFE_SERVER_CORS_ORIGIN",
    "DOLLARSANDLIFE_DATABASE_DRIVER",
    "DOLLARSANDLIFE_DATABASE_URL",
    "DOLLARSANDLIFE_RATE_LIMIT_ENABLED",
    "DOLLARSANDLIFE_RATE_LIMIT_LIST_MAX",
];

#[cfg(test)]
fn lock_env() -> std::sync::MutexGuard<'static, ()> {
    CONFIG_ENV_MUTEX.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
fn yaml_file(contents: &str) -> tempfile::NamedTempFile {
    use std::io::Write;

    let mut file = tempfile::NamedTempFile::new().expect("temp config file");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[cfg(test)]
fn clear_env() {
    for var in ENV_VARS {
        std::env::remove_var(var);
    }
}


/// Property-based tests for configuration parsing
#[cfg(test)]
mod property_tests {
    use super::*;
    use proptest::prelude::*;

    fn valid_host_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            (0u8..=255, 0u8..=255, 0u8..=255, 0u8..=255)
                .prop_map(|(a, b, c, d)| format!("{}.{}.{}.{}", a, b, c, d)),
            Just("localhost".to_string()),
            Just("0.0.0.0".to_string()),
            "[a-z][a-z0-9]{0,10}",
        ]
    }

    fn valid_database_config_strategy() -> impl Strategy<Value = DatabaseConfig> {
        prop_oneof![
            "[a-z][a-z0-9_/]{0,20}\\.db".prop_map(|url| DatabaseConfig {
                driver: DatabaseDriver::Sqlite,
                url,
            }),
            Just(DatabaseConfig {
                driver: DatabaseDriver::Sqlite,
                url: ":memory:".to_string(),
            }),
            Just(DatabaseConfig {
                driver: DatabaseDriver::Mysql,
                url: "mysql://root@127.0.0.1:3306/dollarsandlife".to_string(),
            }),
        ]
    }

    fn valid_config_strategy() -> impl Strategy<Value = Config> {
        (
            valid_host_strategy(),
            1u16..=65535,
            prop_oneof![
                Just("*".to_string()),
                Just("http://localhost:3000".to_string()),
            ],
            valid_database_config_strategy(),
        )
            .prop_map(|(host, port, cors_origin, database)| Config {
                server: ServerConfig {
                    host,
                    port,
                    cors_origin,
                },
                database,
                rate_limit: RateLimitConfig::default(),
            })
    }

    fn malformed_yaml_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            Just("server:\n  port: not_a_number".to_string()),
            Just("server:\n  port: \"8000\"".to_string()),
            Just("server:\n  port: true".to_string()),
            Just("server:\n  port: 99999999999999999999".to_string()),
            Just("database:\n  driver: postgres".to_string()),
            Just("database:\n  driver: mongodb".to_string()),
            Just("server: [invalid, list]".to_string()),
            Just("database: \"just_a_string\"".to_string()),
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(20))]

        /// Serializing a valid config and loading it back yields the same values.
        #[test]
        fn property_config_roundtrip(config in valid_config_strategy()) {
            let yaml = serde_yaml::to_string(&config).expect("Failed to serialize config");
            let file = yaml_file(&yaml);

            let parsed = Config::load(file.path()).expect("Failed to parse config");

            prop_assert_eq!(config.server.host, parsed.server.host);
            prop_assert_eq!(config.server.port, parsed.server.port);
            prop_assert_eq!(config.server.cors_origin, parsed.server.cors_origin);
            prop_assert_eq!(config.database.driver, parsed.database.driver);
            prop_assert_eq!(config.database.url, parsed.database.url);
            prop_assert_eq!(config.rate_limit, parsed.rate_limit);
        }

        /// Malformed config files produce a descriptive error.
        #[test]
        fn property_invalid_config_error(yaml in malformed_yaml_strategy()) {
            let file = yaml_file(&yaml);

            let result = Config::load(file.path());
            prop_assert!(result.is_err(), "Malformed YAML should produce an error");
            let err_msg = result.unwrap_err().to_string();
            prop_assert!(err_msg.contains("Failed to parse config file"), "{}", err_msg);
        }

        /// Environment variables take precedence over file values.
        #[test]
        fn property_env_precedence_over_file(file_port in 1u16..=65535, env_port in 1u16..=65535) {
            let _guard = lock_env();
            clear_env();

            let file = yaml_file(&format!("server:\n  port: {}\n", file_port));
            std::env::set_var("DOLLARSANDLIFE_SERVER_PORT", env_port.to_string());

            let config = Config::load_with_env(file.path());
            clear_env();

            prop_assert_eq!(config.expect("Failed to load config").server.port, env_port);
        }
    }
}
