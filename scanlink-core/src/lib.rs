// scanlink-core/src/lib.rs

// 1. Documentation
#![allow(missing_docs)]

// 2. Memory safety
#![deny(unsafe_code)]
// 3. Robustness
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]
// 4. Performance
#![warn(clippy::perf)]

// --- HEXAGONAL MODULES ---

// 1. Ports (Interfaces / Traits)
// The catalog-facing contract (AssertionRepository).
pub mod ports;

// 2. Domain
// Scan documents, urns, check mapping, governance policies.
// Depends on nothing but the ports.
pub mod domain;

// 3. Infrastructure (Adapters)
// Config files, REST catalog client, in-memory catalog, report writer.
pub mod infrastructure;

// 4. Application (Use Cases)
// Sync engine, ingestion facade, policy validation.
pub mod application;

// --- GLOBAL ERROR HANDLING ---
pub mod error;

// --- RE-EXPORTS (FACADE) ---
pub use application::{ScanIngestor, SyncResult, SyncStatus};
pub use domain::configuration::IngestConfig;
pub use domain::scan::ScanDocument;
pub use error::ScanlinkError;
