// scanlink-core/src/domain/governance/mod.rs

pub mod policy;
pub mod rules;
pub mod validator;

// Re-exports
pub use policy::{Policy, PolicyOutcome, PolicyValidationResult};
pub use rules::{
    CompletenessRule, DataQualityRule, PolicyRule, PolicyRuleSet, RuleVerdict, SchemaRule,
};
pub use validator::{NO_RULE_REASON, PolicyValidator};
