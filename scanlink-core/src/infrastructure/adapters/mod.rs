// scanlink-core/src/infrastructure/adapters/mod.rs

pub mod memory;
pub mod rest;

pub use memory::InMemoryRepository;
pub use rest::RestAssertionRepository;
