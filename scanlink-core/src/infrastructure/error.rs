// scanlink-core/src/infrastructure/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum InfrastructureError {
    // --- FILESYSTEM (IO) ---
    #[error("File System Error: {0}")]
    #[diagnostic(
        code(scanlink::infra::io),
        help("Check file permissions or path validity.")
    )]
    Io(#[from] std::io::Error),

    // --- CONFIG / YAML ---
    #[error("YAML Parsing Error: {0}")]
    #[diagnostic(
        code(scanlink::infra::yaml),
        help("Check your YAML syntax (indentation, types).")
    )]
    YamlError(#[from] serde_yaml::Error),

    #[error("JSON Error: {0}")]
    #[diagnostic(code(scanlink::infra::json))]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration Error: {0}")]
    #[diagnostic(code(scanlink::infra::config))]
    ConfigError(String),

    #[error("Configuration not found: {0}")]
    #[diagnostic(
        code(scanlink::infra::config_missing),
        help("Create scanlink.yaml or pass --server-url.")
    )]
    ConfigNotFound(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(scanlink::infra::validation))]
    Validation(#[from] validator::ValidationErrors),

    // --- CATALOG HTTP CLIENT ---
    #[error("HTTP client error: {0}")]
    #[diagnostic(
        code(scanlink::infra::http),
        help("Check the TLS setup and the extra_headers values.")
    )]
    Http(#[from] reqwest::Error),
}
