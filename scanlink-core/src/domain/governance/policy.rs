// scanlink-core/src/domain/governance/policy.rs

use serde::{Deserialize, Serialize};

/// A governance policy as listed by the catalog or a policy file.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Policy {
    #[serde(default = "default_policy_name")]
    pub name: String,

    #[serde(rename = "type")]
    pub policy_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Restricts `data_quality` policies to checks whose name matches this regex.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_pattern: Option<String>,

    /// Columns a `completeness` policy requires a passing not-null assertion on.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub columns: Vec<String>,
}

fn default_policy_name() -> String {
    "unnamed".to_string()
}

impl Policy {
    pub fn new(name: impl Into<String>, policy_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            policy_type: policy_type.into(),
            description: None,
            check_pattern: None,
            columns: vec![],
        }
    }
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyOutcome {
    pub policy: String,
    #[serde(rename = "type")]
    pub policy_type: String,
    pub satisfied: bool,
    pub matching_assertions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PolicyValidationResult {
    pub dataset_urn: String,
    pub policies_validated: usize,
    pub policies_satisfied: usize,
    pub details: Vec<PolicyOutcome>,
}

impl PolicyValidationResult {
    pub fn is_compliant(&self) -> bool {
        self.policies_satisfied == self.policies_validated
    }

    pub fn unsatisfied(&self) -> impl Iterator<Item = &PolicyOutcome> {
        self.details.iter().filter(|d| !d.satisfied)
    }
}
