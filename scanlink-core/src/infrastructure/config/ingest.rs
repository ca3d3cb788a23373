// scanlink-core/src/infrastructure/config/ingest.rs

use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, instrument};
use validator::Validate;

use crate::domain::configuration::IngestConfig;
use crate::infrastructure::error::InfrastructureError;

pub const CONFIG_CANDIDATES: [&str; 2] = ["scanlink.yaml", "scanlink.yml"];

/// `(variable, config key, camelCase alias)`
const ENV_OVERRIDES: [(&str, &str, &str); 3] = [
    ("SCANLINK_SERVER_URL", "server_url", "serverUrl"),
    ("SCANLINK_TOKEN", "token", "token"),
    ("SCANLINK_ENV", "env", "env"),
];

/// Values given on the command line. They win over the file and the environment.
#[derive(Debug, Default, Clone)]
pub struct ConfigOverrides {
    pub server_url: Option<String>,
    pub token: Option<String>,
    pub env: Option<String>,
    pub platform_alias: Option<String>,
    pub platform_instance_map: Option<BTreeMap<String, String>>,
    pub convert_urns_to_lowercase: Option<bool>,
    pub timeout_sec: Option<f64>,
    pub graceful_exceptions: Option<bool>,
}

// --- LOADER (file -> env -> flags -> validation) ---

#[instrument(skip(overrides))]
pub fn load_ingest_config(
    root: &Path,
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
) -> Result<IngestConfig, InfrastructureError> {
    load_with_env(root, explicit, overrides, |key| std::env::var(key).ok())
}

pub(crate) fn load_with_env(
    root: &Path,
    explicit: Option<&Path>,
    overrides: &ConfigOverrides,
    env: impl Fn(&str) -> Option<String>,
) -> Result<IngestConfig, InfrastructureError> {
    // 1. File layer (optional unless a path was given)
    let mut layer = match resolve_config_path(root, explicit)? {
        Some(path) => {
            info!(path = ?path, "Loading ingest configuration");
            read_mapping(&path)?
        }
        None => {
            debug!(root = ?root, "No configuration file, using flags and environment only");
            Mapping::new()
        }
    };

    // 2. Environment layer (pattern 'Layering')
    for (var, key, alias) in ENV_OVERRIDES {
        if let Some(val) = env(var) {
            if key == "token" {
                info!(key, "Overriding via ENV");
            } else {
                info!(key, new = %val, "Overriding via ENV");
            }
            set(&mut layer, key, alias, Value::String(val));
        }
    }

    // 3. Command line layer
    apply_overrides(&mut layer, overrides)?;

    if !layer.contains_key("server_url") && !layer.contains_key("serverUrl") {
        return Err(InfrastructureError::ConfigNotFound(
            "no server_url in the configuration file, SCANLINK_SERVER_URL or --server-url".into(),
        ));
    }

    // 4. Typed + validated
    let config: IngestConfig = serde_yaml::from_value(Value::Mapping(layer))?;
    config.validate()?;
    Ok(config)
}

fn resolve_config_path(
    root: &Path,
    explicit: Option<&Path>,
) -> Result<Option<PathBuf>, InfrastructureError> {
    if let Some(path) = explicit {
        if path.exists() {
            return Ok(Some(path.to_path_buf()));
        }
        return Err(InfrastructureError::ConfigNotFound(format!(
            "{} does not exist",
            path.display()
        )));
    }
    Ok(CONFIG_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.exists()))
}

fn read_mapping(path: &Path) -> Result<Mapping, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    match serde_yaml::from_str::<Value>(&content)? {
        Value::Mapping(m) => Ok(m),
        Value::Null => Ok(Mapping::new()),
        _ => Err(InfrastructureError::ConfigError(format!(
            "{} must contain a mapping of settings",
            path.display()
        ))),
    }
}

/// Sets `key`, dropping its camelCase alias so serde never sees both.
fn set(layer: &mut Mapping, key: &str, alias: &str, value: Value) {
    if alias != key {
        layer.remove(alias);
    }
    layer.insert(Value::String(key.to_string()), value);
}

fn apply_overrides(
    layer: &mut Mapping,
    overrides: &ConfigOverrides,
) -> Result<(), InfrastructureError> {
    if let Some(v) = &overrides.server_url {
        set(layer, "server_url", "serverUrl", Value::String(v.clone()));
    }
    if let Some(v) = &overrides.token {
        set(layer, "token", "token", Value::String(v.clone()));
    }
    if let Some(v) = &overrides.env {
        set(layer, "env", "env", Value::String(v.clone()));
    }
    if let Some(v) = &overrides.platform_alias {
        set(layer, "platform_alias", "platformAlias", Value::String(v.clone()));
    }
    if let Some(map) = &overrides.platform_instance_map {
        let value = serde_yaml::to_value(map)?;
        set(layer, "platform_instance_map", "platformInstanceMap", value);
    }
    if let Some(v) = overrides.convert_urns_to_lowercase {
        set(layer, "convert_urns_to_lowercase", "convertUrnsToLowercase", Value::Bool(v));
    }
    if let Some(v) = overrides.timeout_sec {
        set(layer, "timeout_sec", "timeoutSec", serde_yaml::to_value(v)?);
    }
    if let Some(v) = overrides.graceful_exceptions {
        set(layer, "graceful_exceptions", "gracefulExceptions", Value::Bool(v));
    }
    Ok(())
}

/// Reads a `{ "<data source>": "<platform instance>" }` JSON file.
pub fn load_platform_instance_map(
    path: &Path,
) -> Result<BTreeMap<String, String>, InfrastructureError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use anyhow::Result;
    use tempfile::tempdir;

    fn no_env(_: &str) -> Option<String> {
        None
    }

    #[test]
    fn test_discovers_yaml_file() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("scanlink.yml"),
            "server_url: http://gms:8080\nenv: DEV\nconcurrency: 4\n",
        )?;

        let config = load_with_env(dir.path(), None, &ConfigOverrides::default(), no_env)?;
        assert_eq!(config.server_url, "http://gms:8080");
        assert_eq!(config.env, "DEV");
        assert_eq!(config.concurrency, 4);
        Ok(())
    }

    #[test]
    fn test_layers_file_env_then_flags() -> Result<()> {
        let dir = tempdir()?;
        fs::write(
            dir.path().join("scanlink.yaml"),
            "serverUrl: http://file:8080\nenv: DEV\n",
        )?;

        let env = |key: &str| match key {
            "SCANLINK_SERVER_URL" => Some("http://env:8080".to_string()),
            "SCANLINK_ENV" => Some("QA".to_string()),
            "SCANLINK_TOKEN" => Some("secret".to_string()),
            _ => None,
        };
        let overrides = ConfigOverrides {
            env: Some("PROD".into()),
            graceful_exceptions: Some(false),
            ..Default::default()
        };

        let config = load_with_env(dir.path(), None, &overrides, env)?;
        assert_eq!(config.server_url, "http://env:8080");
        assert_eq!(config.env, "PROD");
        assert_eq!(config.token.as_deref(), Some("secret"));
        assert!(!config.graceful_exceptions);
        Ok(())
    }

    #[test]
    fn test_flags_alone_are_enough() -> Result<()> {
        let dir = tempdir()?;
        let overrides = ConfigOverrides {
            server_url: Some("http://localhost:8080".into()),
            timeout_sec: Some(1.5),
            platform_instance_map: Some(BTreeMap::from([("pg".into(), "prod".into())])),
            ..Default::default()
        };
        let config = load_with_env(dir.path(), None, &overrides, no_env)?;
        assert_eq!(config.timeout_sec, Some(1.5));
        assert_eq!(config.platform_instance_map.get("pg").map(String::as_str), Some("prod"));
        Ok(())
    }

    #[test]
    fn test_missing_server_url() -> Result<()> {
        let dir = tempdir()?;
        let res = load_with_env(dir.path(), None, &ConfigOverrides::default(), no_env);
        assert!(matches!(res, Err(InfrastructureError::ConfigNotFound(_))));
        Ok(())
    }

    #[test]
    fn test_explicit_path_must_exist() -> Result<()> {
        let dir = tempdir()?;
        let missing = dir.path().join("nope.yaml");
        let res = load_with_env(dir.path(), Some(&missing), &ConfigOverrides::default(), no_env);
        assert!(matches!(res, Err(InfrastructureError::ConfigNotFound(_))));
        Ok(())
    }

    #[test]
    fn test_invalid_values_are_rejected() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("custom.yaml");
        fs::write(&path, "server_url: not a url\nconcurrency: 0\n")?;

        let res = load_with_env(dir.path(), Some(&path), &ConfigOverrides::default(), no_env);
        assert!(matches!(res, Err(InfrastructureError::Validation(_))));
        Ok(())
    }

    #[test]
    fn test_platform_instance_map_file() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("instances.json");
        fs::write(&path, r#"{ "postgres": "prod_pg", "snowflake": "eu" }"#)?;

        let map = load_platform_instance_map(&path)?;
        assert_eq!(map.len(), 2);
        assert_eq!(map["postgres"], "prod_pg");
        Ok(())
    }
}
