pub mod assertion;
pub mod configuration;
pub mod error;
pub mod governance;
pub mod scan;
pub mod urn;

// Handy re-exports to keep imports short elsewhere
pub use configuration::IngestConfig;
pub use error::DomainError;
