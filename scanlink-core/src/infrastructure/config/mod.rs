pub mod ingest;
pub mod policies;

pub use ingest::{ConfigOverrides, load_ingest_config, load_platform_instance_map};
pub use policies::load_policies;
