// scanlink/src/commands/mod.rs

pub mod ingest;
pub mod inspect;
pub mod validate;

use std::fs;
use std::path::Path;

use anyhow::Context;
use scanlink_core::domain::configuration::IngestConfig;
use scanlink_core::domain::scan::ScanDocument;
use scanlink_core::infrastructure::config::{
    ConfigOverrides, load_ingest_config, load_platform_instance_map,
};
use scanlink_core::infrastructure::error::InfrastructureError;

use crate::cli::ConfigArgs;

/// Placeholder server for commands that never call the catalog.
const OFFLINE_SERVER_URL: &str = "http://localhost:8080";

/// File, then environment, then flags. `offline` commands may run without a server url.
pub fn load_config(args: &ConfigArgs, offline: bool) -> anyhow::Result<IngestConfig> {
    let mut overrides = ConfigOverrides {
        server_url: args.server_url.clone(),
        token: args.token.clone(),
        env: args.env.clone(),
        platform_alias: args.platform_alias.clone(),
        platform_instance_map: None,
        convert_urns_to_lowercase: args.convert_urns_to_lowercase.then_some(true),
        timeout_sec: args.timeout_sec,
        graceful_exceptions: None,
    };

    if let Some(path) = &args.platform_instance_map {
        let map = load_platform_instance_map(path)
            .with_context(|| format!("Failed to read platform instance map {:?}", path))?;
        overrides.platform_instance_map = Some(map);
    }

    let loaded = load_ingest_config(&args.project_dir, args.config.as_deref(), &overrides);
    match loaded {
        Err(InfrastructureError::ConfigNotFound(_)) if offline && args.config.is_none() => {
            overrides.server_url = Some(OFFLINE_SERVER_URL.to_string());
            Ok(load_ingest_config(&args.project_dir, None, &overrides)?)
        }
        other => Ok(other?),
    }
}

pub fn read_scan(path: &Path) -> anyhow::Result<ScanDocument> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read scan result {:?}", path))?;
    Ok(ScanDocument::parse(&raw)?)
}
