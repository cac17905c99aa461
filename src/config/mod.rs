// * Engine configuration
// * JSON file loader with env-var overrides, every field defaulted

pub mod constants;
pub mod heuristics;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use constants::{
    COMMUNITY_MENTION_LIMIT, FORUM_MENTION_LIMIT, SOURCE_TIMEOUT_MS, WEB_MENTION_LIMIT,
};
pub use heuristics::{HeuristicTables, KnownDomain};

// * Env keys recognised by `EngineConfig::apply_env_overrides`
pub const ENV_SOURCE_TIMEOUT_MS: &str = "BACKLINK_SOURCE_TIMEOUT_MS";
pub const ENV_WEB_MENTION_LIMIT: &str = "BACKLINK_WEB_MENTION_LIMIT";
pub const ENV_FORUM_MENTION_LIMIT: &str = "BACKLINK_FORUM_MENTION_LIMIT";
pub const ENV_COMMUNITY_MENTION_LIMIT: &str = "BACKLINK_COMMUNITY_MENTION_LIMIT";
pub const ENV_COLLAPSE_DUPLICATE_DOMAINS: &str = "BACKLINK_COLLAPSE_DUPLICATE_DOMAINS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// Knobs for the opportunity discovery fan-out
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    /// Per-source timeout
    pub source_timeout_ms: u64,
    pub web_mention_limit: usize,
    pub forum_mention_limit: usize,
    pub community_mention_limit: usize,
    /// Opt-in: keep one opportunity per (source domain, type), highest authority wins
    pub collapse_duplicate_domains: bool,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            source_timeout_ms: SOURCE_TIMEOUT_MS,
            web_mention_limit: WEB_MENTION_LIMIT,
            forum_mention_limit: FORUM_MENTION_LIMIT,
            community_mention_limit: COMMUNITY_MENTION_LIMIT,
            collapse_duplicate_domains: false,
        }
    }
}

impl DiscoveryConfig {
    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms)
    }

    /// Rejects a zero timeout, which would fail every source call at once
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.source_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "source_timeout_ms",
                value: self.source_timeout_ms.to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub heuristics: HeuristicTables,
    pub discovery: DiscoveryConfig,
}

impl EngineConfig {
    /// Loads a JSON config file; missing keys fall back to defaults
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let mut config: EngineConfig = serde_json::from_str(raw)?;
        config.heuristics = config.heuristics.normalized();
        config.discovery.validate()?;
        Ok(config)
    }

    /// Applies `BACKLINK_*` env vars on top of the current values
    pub fn apply_env_overrides(self) -> Result<Self, ConfigError> {
        self.apply_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies overrides from an arbitrary key lookup
    pub fn apply_overrides_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &'static str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(v) = read(ENV_SOURCE_TIMEOUT_MS) {
            let ms = parse_number(ENV_SOURCE_TIMEOUT_MS, &v)?;
            if ms == 0 {
                return Err(ConfigError::InvalidValue { key: ENV_SOURCE_TIMEOUT_MS, value: v });
            }
            self.discovery.source_timeout_ms = ms as u64;
        }
        if let Some(v) = read(ENV_WEB_MENTION_LIMIT) {
            self.discovery.web_mention_limit = parse_number(ENV_WEB_MENTION_LIMIT, &v)?;
        }
        if let Some(v) = read(ENV_FORUM_MENTION_LIMIT) {
            self.discovery.forum_mention_limit = parse_number(ENV_FORUM_MENTION_LIMIT, &v)?;
        }
        if let Some(v) = read(ENV_COMMUNITY_MENTION_LIMIT) {
            self.discovery.community_mention_limit = parse_number(ENV_COMMUNITY_MENTION_LIMIT, &v)?;
        }
        if let Some(v) = read(ENV_COLLAPSE_DUPLICATE_DOMAINS) {
            self.discovery.collapse_duplicate_domains = match v.to_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_COLLAPSE_DUPLICATE_DOMAINS,
                        value: v,
                    })
                }
            };
        }

        self.discovery.validate()?;
        Ok(self)
    }
}

fn parse_number(key: &'static str, value: &str) -> Result<usize, ConfigError> {
    value.parse::<usize>().map_err(|_| ConfigError::InvalidValue {
        key,
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert_eq!(config.discovery.web_mention_limit, 5);
        assert_eq!(config.discovery.forum_mention_limit, 10);
        assert_eq!(config.discovery.community_mention_limit, 2);
        assert_eq!(config.discovery.source_timeout(), Duration::from_secs(10));
        assert!(!config.discovery.collapse_duplicate_domains);
    }

    #[test]
    fn test_partial_json() {
        let config = EngineConfig::from_json_str(
            r#"{ "discovery": { "source_timeout_ms": 2500 }, "heuristics": { "spam_terms": ["Casino"] } }"#,
        )
        .unwrap();

        assert_eq!(config.discovery.source_timeout_ms, 2500);
        assert_eq!(config.discovery.forum_mention_limit, 10);
        assert_eq!(config.heuristics.spam_terms, vec!["casino".to_string()]);
    }

    #[test]
    fn test_env_overrides() {
        let config = EngineConfig::default()
            .apply_overrides_from(lookup(&[
                (ENV_SOURCE_TIMEOUT_MS, "1500"),
                (ENV_WEB_MENTION_LIMIT, "3"),
                (ENV_COLLAPSE_DUPLICATE_DOMAINS, "on"),
            ]))
            .unwrap();

        assert_eq!(config.discovery.source_timeout_ms, 1500);
        assert_eq!(config.discovery.web_mention_limit, 3);
        assert!(config.discovery.collapse_duplicate_domains);
    }

    #[test]
    fn test_invalid_env_value_rejected() {
        let err = EngineConfig::default()
            .apply_overrides_from(lookup(&[(ENV_FORUM_MENTION_LIMIT, "lots")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: ENV_FORUM_MENTION_LIMIT, .. }));

        let err = EngineConfig::default()
            .apply_overrides_from(lookup(&[(ENV_SOURCE_TIMEOUT_MS, "0")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn test_zero_timeout_in_json_rejected() {
        let err = EngineConfig::from_json_str(r#"{ "discovery": { "source_timeout_ms": 0 } }"#).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "source_timeout_ms", .. }));
    }

    #[test]
    fn test_missing_file() {
        let err = EngineConfig::from_json_file("/definitely/not/here.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
