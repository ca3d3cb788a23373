// scanlink-core/src/domain/scan/mod.rs

pub mod document;

pub use document::{Check, CheckOutcome, Metric, ScanDocument, ScannedTable};
