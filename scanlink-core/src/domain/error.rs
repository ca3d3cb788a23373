// scanlink-core/src/domain/error.rs

use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum DomainError {
    #[error("Malformed scan document: {0}")]
    #[diagnostic(
        code(scanlink::domain::malformed_input),
        help("The scan result must be a JSON object with 'dataSourceName' and a 'checks' array.")
    )]
    MalformedInput(String),

    #[error("Cannot resolve a catalog scope for check '{check}': {reason}")]
    #[diagnostic(code(scanlink::domain::unresolvable_scope))]
    UnresolvableScope { check: String, reason: String },

    #[error("No validation rule registered for policy type '{0}'")]
    #[diagnostic(
        code(scanlink::domain::policy_rule_missing),
        help("Built-in policy types are: data_quality, schema, completeness.")
    )]
    PolicyRuleMissing(String),

    #[error("Invalid configuration: {0}")]
    #[diagnostic(code(scanlink::domain::config))]
    InvalidConfig(String),
}

impl DomainError {
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedInput(message.into())
    }

    pub fn unresolvable(check: &str, reason: impl Into<String>) -> Self {
        Self::UnresolvableScope {
            check: check.to_string(),
            reason: reason.into(),
        }
    }
}
