// scanlink-core/src/error.rs

use crate::application::sync::SyncStatus;
use crate::domain::error::DomainError;
use crate::infrastructure::error::InfrastructureError;
use crate::ports::repository::RepositoryError;
use miette::Diagnostic;
use thiserror::Error;

#[derive(Error, Debug, Diagnostic)]
pub enum ScanlinkError {
    // --- DOMAIN ERRORS (input shape, scope resolution, policies) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Domain(#[from] DomainError),

    // --- INFRASTRUCTURE ERRORS (IO, parsing, HTTP) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Infrastructure(#[from] InfrastructureError),

    // --- CATALOG ERRORS (raised only in strict mode) ---
    #[error(transparent)]
    #[diagnostic(transparent)]
    Repository(#[from] RepositoryError),

    #[error("Sync finished with status '{status}': {failed} of {attempted} checks failed")]
    #[diagnostic(
        code(scanlink::sync::failed),
        help("Run with graceful_exceptions enabled to get the full per-check report.")
    )]
    SyncFailed {
        status: SyncStatus,
        attempted: usize,
        failed: usize,
        first_error: Option<String>,
    },

    #[error("Internal Error: {0}")]
    InternalError(String),
}

impl From<std::io::Error> for ScanlinkError {
    fn from(err: std::io::Error) -> Self {
        ScanlinkError::Infrastructure(InfrastructureError::Io(err))
    }
}
