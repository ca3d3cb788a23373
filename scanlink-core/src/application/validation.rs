// scanlink-core/src/application/validation.rs

use tracing::instrument;

use crate::application::ingest::map_document;
use crate::domain::configuration::IngestConfig;
use crate::domain::governance::{Policy, PolicyValidationResult, PolicyValidator};
use crate::domain::scan::ScanDocument;

/// Validates policies against the assertions a scan maps to.
///
/// Checks that cannot be mapped carry no assertion and so count for nothing;
/// without a document every policy is evaluated against an empty scope.
#[instrument(skip_all, fields(dataset = %dataset_urn, policies = policies.len()))]
pub fn validate_governance_policies(
    validator: &PolicyValidator,
    config: &IngestConfig,
    dataset_urn: &str,
    policies: &[Policy],
    document: Option<&ScanDocument>,
) -> PolicyValidationResult {
    let mappings = document
        .map(|doc| map_document(doc, config).mappings)
        .unwrap_or_default();

    validator.validate(dataset_urn, policies, &mappings)
}
