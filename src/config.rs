use anyhow::{ensure, Context};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::latency::LatencyProfile;

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub cache: CacheConfig,
    pub latency: LatencyConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub enable_cors: bool,
}

/// Cache lifetimes advertised on successful metric responses
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Private (browser) cache lifetime
    pub max_age_secs: u64,
    /// Shared (CDN) cache lifetime
    pub s_maxage_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LatencyConfig {
    pub enabled: bool,
    #[serde(with = "duration_millis")]
    pub base: Duration,
    #[serde(with = "duration_millis")]
    pub jitter: Duration,
}

/// Default log level for this crate; `RUST_LOG`, `--verbose` and `--quiet` override it
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8788,
            enable_cors: true,
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_age_secs: 60,
            s_maxage_secs: 300,
        }
    }
}

impl Default for LatencyConfig {
    fn default() -> Self {
        let profile = LatencyProfile::default();
        Self {
            enabled: true,
            base: profile.base(),
            jitter: profile.jitter(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl CacheConfig {
    /// `Cache-Control` value for successful metric responses
    pub fn header_value(&self) -> String {
        format!(
            "public, max-age={}, s-maxage={}",
            self.max_age_secs, self.s_maxage_secs
        )
    }
}

impl LatencyConfig {
    pub fn profile(&self) -> LatencyProfile {
        if self.enabled {
            LatencyProfile::new(self.base, self.jitter)
        } else {
            LatencyProfile::none()
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file; missing keys keep their defaults
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Load from an optional file, then apply environment overrides and validate
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Ok(host) = std::env::var("WEBVITALS_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("WEBVITALS_PORT") {
            config.server.port = port
                .parse()
                .with_context(|| format!("WEBVITALS_PORT is not a valid port: {port}"))?;
        }
        if let Ok(enabled) = std::env::var("WEBVITALS_LATENCY_ENABLED") {
            config.latency.enabled = enabled
                .parse()
                .with_context(|| format!("WEBVITALS_LATENCY_ENABLED must be true or false: {enabled}"))?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        ensure!(!self.server.host.trim().is_empty(), "server.host must not be empty");
        ensure!(self.server.port != 0, "server.port must not be 0");
        ensure!(
            self.cache.s_maxage_secs >= self.cache.max_age_secs,
            "cache.s_maxage_secs ({}) must be >= cache.max_age_secs ({})",
            self.cache.s_maxage_secs,
            self.cache.max_age_secs
        );
        let level = self.logging.level.trim().to_ascii_lowercase();
        ensure!(
            LOG_LEVELS.contains(&level.as_str()),
            "logging.level must be one of {}: {}",
            LOG_LEVELS.join(", "),
            self.logging.level
        );
        Ok(())
    }

    /// `host:port` the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// Durations are written as "300ms" or "2s"
mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}ms", duration.as_millis()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        if let Some(millis) = s.strip_suffix("ms") {
            let millis: u64 = millis.trim().parse().map_err(serde::de::Error::custom)?;
            Ok(Duration::from_millis(millis))
        } else if let Some(secs) = s.strip_suffix('s') {
            let secs: u64 = secs.trim().parse().map_err(serde::de::Error::custom)?;
            Ok(Duration::from_secs(secs))
        } else {
            Err(serde::de::Error::custom(
                "Expected duration string ending with 'ms' or 's'",
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.port, 8788);
        assert_eq!(config.cache.header_value(), "public, max-age=60, s-maxage=300");
        assert_eq!(config.latency.profile(), LatencyProfile::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [server]
            port = 9000

            [latency]
            base = "50ms"
            jitter = "1s"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.latency.base, Duration::from_millis(50));
        assert_eq!(config.latency.jitter, Duration::from_secs(1));
        assert_eq!(config.cache.max_age_secs, 60);
    }

    #[test]
    fn test_disabled_latency_profile() {
        let config = LatencyConfig {
            enabled: false,
            ..LatencyConfig::default()
        };
        assert!(config.profile().is_disabled());
    }

    #[test]
    fn test_validation_rejects_inverted_cache_lifetimes() {
        let mut config = AppConfig::default();
        config.cache.s_maxage_secs = 10;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_rejects_unknown_log_level() {
        let mut config = AppConfig::default();
        config.logging.level = "DEBUG".to_string();
        assert!(config.validate().is_ok());
        config.logging.level = "chatty".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_bad_duration_is_rejected() {
        let parsed: Result<AppConfig, _> = toml::from_str(
            r#"
            [latency]
            base = "fast"
            "#,
        );
        assert!(parsed.is_err());
    }

    #[test]
    fn test_round_trips_through_toml() {
        let config = AppConfig::default();
        let text = toml::to_string(&config).unwrap();
        let decoded: AppConfig = toml::from_str(&text).unwrap();
        assert_eq!(decoded, config);
    }
}
