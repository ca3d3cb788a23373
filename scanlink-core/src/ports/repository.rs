// scanlink-core/src/ports/repository.rs

// What the sync engine needs from the catalog, without knowing how it is reached.
// The REST adapter and the in-memory adapter both live in infrastructure/adapters.

use std::collections::BTreeMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use miette::Diagnostic;
use serde::Serialize;
use thiserror::Error;

use crate::domain::assertion::{Aggregation, EvaluationResult, OperatorKind, Scope};

#[derive(Error, Debug, Diagnostic, Clone, PartialEq)]
pub enum RepositoryError {
    #[error("Catalog transport error: {message}")]
    #[diagnostic(
        code(scanlink::catalog::transport),
        help("Check that the catalog server is reachable from this host.")
    )]
    Transport { message: String, transient: bool },

    #[error("Catalog rejected credentials: {0}")]
    #[diagnostic(
        code(scanlink::catalog::auth),
        help("Check the token passed via --token or SCANLINK_TOKEN.")
    )]
    Auth(String),

    #[error("Catalog call timed out after {0:?}")]
    #[diagnostic(code(scanlink::catalog::timeout))]
    Timeout(Duration),
}

impl RepositoryError {
    pub fn transient(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            transient: true,
        }
    }

    pub fn permanent(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            transient: false,
        }
    }

    /// Only transient transport failures are worth a second attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Transport {
                transient: true,
                ..
            }
        )
    }
}

/// Everything the catalog needs to create or update one assertion definition.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AssertionDefinition {
    pub fingerprint: String,
    pub scope_urn: String,
    pub dataset_urn: String,
    pub field_urns: Vec<String>,
    pub scope: Scope,
    pub operator: OperatorKind,
    pub aggregation: Aggregation,
    pub native_type: String,
    pub parameters: BTreeMap<String, String>,
    pub check_name: String,
}

/// One evaluation of an assertion, timestamped at sync time.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EvaluationRun {
    pub assertion_urn: String,
    pub assertee_urn: String,
    pub run_id: String,
    pub scan_id: String,
    pub check_name: String,
    pub check_type: String,
    pub definition: String,
    pub result: EvaluationResult,
    pub timestamp: DateTime<Utc>,
}

#[async_trait]
pub trait AssertionRepository: Send + Sync {
    /// Creates or updates the definition keyed by its fingerprint and returns the assertion urn.
    async fn upsert_assertion_definition(
        &self,
        definition: &AssertionDefinition,
    ) -> Result<String, RepositoryError>;

    async fn record_evaluation(&self, run: &EvaluationRun) -> Result<(), RepositoryError>;
}
