// scanlink-core/src/infrastructure/config/policies.rs

use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::info;

use crate::domain::governance::Policy;
use crate::infrastructure::error::InfrastructureError;

#[derive(Deserialize)]
#[serde(untagged)]
enum PolicyFile {
    Wrapped { policies: Vec<Policy> },
    Bare(Vec<Policy>),
}

/// Loads governance policies from YAML or JSON, wrapped in `policies:` or as a bare list.
pub fn load_policies(path: &Path) -> Result<Vec<Policy>, InfrastructureError> {
    let content = fs::read_to_string(path)?;

    let is_json = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));

    let file: PolicyFile = if is_json {
        serde_json::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };

    let policies = match file {
        PolicyFile::Wrapped { policies } | PolicyFile::Bare(policies) => policies,
    };
    info!(path = ?path, count = policies.len(), "Governance policies loaded");
    Ok(policies)
}
