// scanlink-core/src/domain/configuration.rs

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use validator::Validate;

use crate::domain::error::DomainError;

pub const DEFAULT_ENV: &str = "PROD";
pub const DEFAULT_ASSERTION_PLATFORM: &str = "soda";

/// Process-wide settings for one ingestion. Built once, then only borrowed.
#[derive(Debug, Deserialize, Serialize, Clone, Validate, PartialEq)]
pub struct IngestConfig {
    #[serde(alias = "serverUrl")]
    #[validate(url(message = "server_url must be an absolute URL (ex: http://localhost:8080)"))]
    pub server_url: String,

    #[serde(default = "default_env")]
    #[validate(length(min = 1, message = "env cannot be empty"))]
    pub env: String,

    #[serde(default, skip_serializing)]
    pub token: Option<String>,

    #[serde(default, alias = "platformAlias")]
    pub platform_alias: Option<String>,

    /// Data-source name -> platform instance.
    #[serde(default, alias = "platformInstanceMap")]
    pub platform_instance_map: BTreeMap<String, String>,

    #[serde(default, alias = "convertUrnsToLowercase")]
    pub convert_urns_to_lowercase: bool,

    /// Bound on each individual catalog call.
    #[serde(default, alias = "timeoutSec")]
    #[validate(range(exclusive_min = 0.0, message = "timeout_sec must be positive"))]
    pub timeout_sec: Option<f64>,

    #[serde(default = "default_true", alias = "gracefulExceptions")]
    pub graceful_exceptions: bool,

    #[serde(default, alias = "extraHeaders", skip_serializing)]
    pub extra_headers: BTreeMap<String, String>,

    /// Bound on the whole sync; mappings not started in time are reported as timed out.
    #[serde(default, alias = "syncTimeoutSec")]
    #[validate(range(exclusive_min = 0.0, message = "sync_timeout_sec must be positive"))]
    pub sync_timeout_sec: Option<f64>,

    #[serde(default = "default_concurrency")]
    #[validate(range(min = 1, max = 32, message = "concurrency must be between 1 and 32"))]
    pub concurrency: usize,

    #[serde(default = "default_retry_backoff_ms", alias = "retryBackoffMs")]
    pub retry_backoff_ms: u64,

    #[serde(default = "default_assertion_platform", alias = "assertionPlatform")]
    #[validate(length(min = 1, message = "assertion_platform cannot be empty"))]
    pub assertion_platform: String,
}

fn default_env() -> String {
    DEFAULT_ENV.to_string()
}

fn default_true() -> bool {
    true
}

fn default_concurrency() -> usize {
    1
}

fn default_retry_backoff_ms() -> u64 {
    250
}

fn default_assertion_platform() -> String {
    DEFAULT_ASSERTION_PLATFORM.to_string()
}

impl IngestConfig {
    pub fn new(server_url: impl Into<String>) -> Self {
        Self {
            server_url: server_url.into(),
            env: default_env(),
            token: None,
            platform_alias: None,
            platform_instance_map: BTreeMap::new(),
            convert_urns_to_lowercase: false,
            timeout_sec: None,
            graceful_exceptions: true,
            extra_headers: BTreeMap::new(),
            sync_timeout_sec: None,
            concurrency: default_concurrency(),
            retry_backoff_ms: default_retry_backoff_ms(),
            assertion_platform: default_assertion_platform(),
        }
    }

    /// Runs the declarative validation and flattens the report into one message.
    pub fn check(&self) -> Result<(), DomainError> {
        self.validate()
            .map_err(|e| DomainError::InvalidConfig(e.to_string()))
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.timeout_sec
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
    }

    pub fn sync_timeout(&self) -> Option<Duration> {
        self.sync_timeout_sec
            .and_then(|s| Duration::try_from_secs_f64(s).ok())
    }

    pub fn retry_backoff(&self) -> Duration {
        Duration::from_millis(self.retry_backoff_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_minimal_yaml() -> anyhow::Result<()> {
        let config: IngestConfig = serde_yaml::from_str("server_url: http://localhost:8080")?;
        assert_eq!(config.env, "PROD");
        assert!(config.graceful_exceptions);
        assert!(!config.convert_urns_to_lowercase);
        assert_eq!(config.concurrency, 1);
        assert_eq!(config.assertion_platform, "soda");
        assert!(config.request_timeout().is_none());
        config.check()?;
        Ok(())
    }

    #[test]
    fn test_camel_case_keys_are_accepted() -> anyhow::Result<()> {
        let yaml = r#"
serverUrl: http://gms:8080
platformInstanceMap:
  postgres: prod_pg
convertUrnsToLowercase: true
timeoutSec: 2.5
gracefulExceptions: false
"#;
        let config: IngestConfig = serde_yaml::from_str(yaml)?;
        assert_eq!(config.server_url, "http://gms:8080");
        assert_eq!(
            config.platform_instance_map.get("postgres").map(String::as_str),
            Some("prod_pg")
        );
        assert!(config.convert_urns_to_lowercase);
        assert!(!config.graceful_exceptions);
        assert_eq!(config.request_timeout(), Some(Duration::from_millis(2500)));
        Ok(())
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let mut config = IngestConfig::new("not a url");
        assert!(matches!(config.check(), Err(DomainError::InvalidConfig(_))));

        config.server_url = "http://localhost:8080".into();
        config.concurrency = 0;
        assert!(config.check().is_err());

        config.concurrency = 4;
        config.timeout_sec = Some(0.0);
        assert!(config.check().is_err());
    }

    #[test]
    fn test_token_is_never_serialized() -> anyhow::Result<()> {
        let mut config = IngestConfig::new("http://localhost:8080");
        config.token = Some("secret".into());
        let json = serde_json::to_string(&config)?;
        assert!(!json.contains("secret"));
        Ok(())
    }
}
