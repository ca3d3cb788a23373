// scanlink-core/src/domain/governance/validator.rs

use tracing::{info, warn};

use super::policy::{Policy, PolicyOutcome, PolicyValidationResult};
use super::rules::PolicyRuleSet;
use crate::domain::assertion::AssertionMapping;
use crate::domain::error::DomainError;

pub const NO_RULE_REASON: &str = "no validation rule registered";

/// Correlates governance policies with the assertions mapped for a dataset.
#[derive(Default)]
pub struct PolicyValidator {
    rules: PolicyRuleSet,
}

impl PolicyValidator {
    pub fn new(rules: PolicyRuleSet) -> Self {
        Self { rules }
    }

    pub fn rules(&self) -> &PolicyRuleSet {
        &self.rules
    }

    pub fn validate(
        &self,
        dataset_urn: &str,
        policies: &[Policy],
        mappings: &[AssertionMapping],
    ) -> PolicyValidationResult {
        let in_scope: Vec<&AssertionMapping> = mappings
            .iter()
            .filter(|m| m.dataset_urn.to_string() == dataset_urn)
            .collect();

        info!(
            dataset = %dataset_urn,
            policies = policies.len(),
            assertions = in_scope.len(),
            "Validating governance policies"
        );

        let details: Vec<PolicyOutcome> = policies
            .iter()
            .map(|policy| {
                let Some(rule) = self.rules.rule_for(&policy.policy_type) else {
                    // Reported, never skipped: a skipped policy would read as compliant.
                    let missing = DomainError::PolicyRuleMissing(policy.policy_type.clone());
                    warn!(policy = %policy.name, "{}", missing);
                    return PolicyOutcome {
                        policy: policy.name.clone(),
                        policy_type: policy.policy_type.clone(),
                        satisfied: false,
                        matching_assertions: vec![],
                        reason: Some(NO_RULE_REASON.to_string()),
                    };
                };

                let verdict = rule.evaluate(policy, &in_scope);
                PolicyOutcome {
                    policy: policy.name.clone(),
                    policy_type: policy.policy_type.clone(),
                    satisfied: verdict.satisfied,
                    matching_assertions: verdict.matching_assertions,
                    reason: verdict.reason,
                }
            })
            .collect();

        let policies_satisfied = details.iter().filter(|d| d.satisfied).count();

        PolicyValidationResult {
            dataset_urn: dataset_urn.to_string(),
            policies_validated: details.len(),
            policies_satisfied,
            details,
        }
    }
}
