// scanlink-core/src/application/mod.rs

pub mod ingest;
pub mod sync;
pub mod validation;

// --- RE-EXPORTS (FACADE PATTERN) ---
// `use scanlink_core::application::{ScanIngestor, SyncResult};`

pub use ingest::{MappedScan, ScanIngestor, map_document};
pub use sync::{SyncEngine, SyncError, SyncErrorKind, SyncOptions, SyncResult, SyncStatus};
pub use validation::validate_governance_policies;
