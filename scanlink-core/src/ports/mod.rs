// scanlink-core/src/ports/mod.rs

pub mod repository;

pub use repository::{AssertionDefinition, AssertionRepository, EvaluationRun, RepositoryError};
