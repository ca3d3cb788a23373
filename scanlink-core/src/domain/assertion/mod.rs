// scanlink-core/src/domain/assertion/mod.rs

pub mod fingerprint;
pub mod mapper;
pub mod mapping;

pub use fingerprint::fingerprint;
pub use mapper::{CheckClass, CheckMapper};
pub use mapping::{
    Aggregation, AssertionMapping, EvaluationResult, OperatorKind, ResultType, Scope,
    WellKnownOperator,
};
