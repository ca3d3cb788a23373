// scanlink-core/src/domain/governance/rules.rs

use regex::Regex;

use super::policy::Policy;
use crate::domain::assertion::{AssertionMapping, OperatorKind, Scope, WellKnownOperator};

#[derive(Debug, Clone, PartialEq)]
pub struct RuleVerdict {
    pub satisfied: bool,
    pub matching_assertions: Vec<String>,
    pub reason: Option<String>,
}

impl RuleVerdict {
    fn from_matches(matching: Vec<&AssertionMapping>, reason_if_empty: impl Into<String>) -> Self {
        let satisfied = !matching.is_empty();
        Self {
            satisfied,
            matching_assertions: matching.iter().map(|m| m.assertion_urn()).collect(),
            reason: (!satisfied).then(|| reason_if_empty.into()),
        }
    }

    fn unsatisfied(reason: impl Into<String>) -> Self {
        Self {
            satisfied: false,
            matching_assertions: vec![],
            reason: Some(reason.into()),
        }
    }
}

/// Decides whether one policy type is satisfied by the assertions of a dataset.
pub trait PolicyRule: Send + Sync {
    fn policy_type(&self) -> &str;

    /// `in_scope` only contains assertions of the dataset under validation.
    fn evaluate(&self, policy: &Policy, in_scope: &[&AssertionMapping]) -> RuleVerdict;
}

/// At least one assertion in scope that neither failed nor errored.
pub struct DataQualityRule;

impl PolicyRule for DataQualityRule {
    fn policy_type(&self) -> &str {
        "data_quality"
    }

    fn evaluate(&self, policy: &Policy, in_scope: &[&AssertionMapping]) -> RuleVerdict {
        let pattern = match policy.check_pattern.as_deref().map(Regex::new).transpose() {
            Ok(p) => p,
            Err(e) => return RuleVerdict::unsatisfied(format!("invalid check_pattern: {}", e)),
        };

        let candidates: Vec<&AssertionMapping> = in_scope
            .iter()
            .copied()
            .filter(|m| pattern.as_ref().is_none_or(|re| re.is_match(&m.check_name)))
            .collect();

        if candidates.is_empty() {
            return RuleVerdict::unsatisfied(match &policy.check_pattern {
                Some(p) => format!("no assertion matches check_pattern '{}'", p),
                None => "no assertions in scope".to_string(),
            });
        }

        let passing = candidates
            .into_iter()
            .filter(|m| m.evaluation.is_passed())
            .collect();
        RuleVerdict::from_matches(passing, "every assertion in scope failed or errored")
    }
}

/// A schema-scope assertion exists and passed.
pub struct SchemaRule;

impl PolicyRule for SchemaRule {
    fn policy_type(&self) -> &str {
        "schema"
    }

    fn evaluate(&self, _policy: &Policy, in_scope: &[&AssertionMapping]) -> RuleVerdict {
        let schema: Vec<&AssertionMapping> = in_scope
            .iter()
            .copied()
            .filter(|m| m.scope == Scope::Schema)
            .collect();

        if schema.is_empty() {
            return RuleVerdict::unsatisfied("no schema assertion in scope");
        }

        let passing = schema
            .into_iter()
            .filter(|m| m.evaluation.is_passed())
            .collect();
        RuleVerdict::from_matches(passing, "schema assertion did not pass")
    }
}

/// Every listed column carries a passing not-null assertion.
pub struct CompletenessRule;

impl PolicyRule for CompletenessRule {
    fn policy_type(&self) -> &str {
        "completeness"
    }

    fn evaluate(&self, policy: &Policy, in_scope: &[&AssertionMapping]) -> RuleVerdict {
        if policy.columns.is_empty() {
            return RuleVerdict::unsatisfied("completeness policy lists no columns");
        }

        let not_null = OperatorKind::WellKnown(WellKnownOperator::NotNull);
        let mut matching = Vec::new();
        let mut missing = Vec::new();

        for column in &policy.columns {
            let found = in_scope.iter().find(|m| {
                m.operator == not_null
                    && m.evaluation.is_passed()
                    && m.field_urn.as_ref().is_some_and(|f| &f.column == column)
            });
            match found {
                Some(m) => matching.push(m.assertion_urn()),
                None => missing.push(column.as_str()),
            }
        }

        if missing.is_empty() {
            RuleVerdict {
                satisfied: true,
                matching_assertions: matching,
                reason: None,
            }
        } else {
            RuleVerdict {
                satisfied: false,
                matching_assertions: matching,
                reason: Some(format!(
                    "no passing not-null assertion on: {}",
                    missing.join(", ")
                )),
            }
        }
    }
}

/// Rules keyed by policy type. Lookups are case-insensitive.
pub struct PolicyRuleSet {
    rules: Vec<Box<dyn PolicyRule>>,
}

impl PolicyRuleSet {
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn builtin() -> Self {
        Self::empty()
            .with(DataQualityRule)
            .with(SchemaRule)
            .with(CompletenessRule)
    }

    /// Registers a rule, replacing any rule already registered for the same type.
    pub fn register(&mut self, rule: impl PolicyRule + 'static) {
        self.rules
            .retain(|r| !r.policy_type().eq_ignore_ascii_case(rule.policy_type()));
        self.rules.push(Box::new(rule));
    }

    pub fn with(mut self, rule: impl PolicyRule + 'static) -> Self {
        self.register(rule);
        self
    }

    pub fn rule_for(&self, policy_type: &str) -> Option<&dyn PolicyRule> {
        self.rules
            .iter()
            .find(|r| r.policy_type().eq_ignore_ascii_case(policy_type.trim()))
            .map(|r| r.as_ref())
    }

    pub fn policy_types(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.policy_type()).collect()
    }
}

impl Default for PolicyRuleSet {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct AlwaysSatisfied;

    impl PolicyRule for AlwaysSatisfied {
        fn policy_type(&self) -> &str {
            "schema"
        }

        fn evaluate(&self, _policy: &Policy, _in_scope: &[&AssertionMapping]) -> RuleVerdict {
            RuleVerdict {
                satisfied: true,
                matching_assertions: vec![],
                reason: None,
            }
        }
    }

    #[test]
    fn test_builtin_types() {
        let rules = PolicyRuleSet::builtin();
        assert_eq!(
            rules.policy_types(),
            vec!["data_quality", "schema", "completeness"]
        );
        assert!(rules.rule_for("DATA_QUALITY").is_some());
        assert!(rules.rule_for("freshness").is_none());
    }

    #[test]
    fn test_register_replaces_same_type() {
        let mut rules = PolicyRuleSet::builtin();
        rules.register(AlwaysSatisfied);
        assert_eq!(rules.policy_types().len(), 3);

        let verdict = rules
            .rule_for("schema")
            .map(|r| r.evaluate(&Policy::new("p", "schema"), &[]));
        assert!(verdict.is_some_and(|v| v.satisfied));
    }

    #[test]
    fn test_rules_on_empty_scope_are_unsatisfied() {
        for rule in [
            &DataQualityRule as &dyn PolicyRule,
            &SchemaRule,
            &CompletenessRule,
        ] {
            let mut policy = Policy::new("p", rule.policy_type());
            policy.columns = vec!["id".into()];
            let verdict = rule.evaluate(&policy, &[]);
            assert!(!verdict.satisfied);
            assert!(verdict.reason.is_some());
        }
    }
}
