// scanlink-core/src/domain/assertion/fingerprint.rs

use sha2::{Digest, Sha256};

use super::mapping::OperatorKind;

/// Stable upsert key of an assertion.
///
/// fingerprint = lowercase_hex(SHA256(json([scopeUrn, checkName, operatorKind])))
///
/// The JSON array keeps the three parts unambiguous: no separator inside a
/// urn or a check name can make two different triples collide.
pub fn fingerprint(scope_urn: &str, check_name: &str, operator: OperatorKind) -> String {
    let canonical = serde_json::json!([scope_urn, check_name, operator.as_str()]).to_string();
    format!("{:x}", Sha256::digest(canonical.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::assertion::WellKnownOperator;

    const NOT_NULL: OperatorKind = OperatorKind::WellKnown(WellKnownOperator::NotNull);

    #[test]
    fn test_fingerprint_is_stable_hex() {
        let a = fingerprint("urn:li:dataset:x", "check", NOT_NULL);
        let b = fingerprint("urn:li:dataset:x", "check", NOT_NULL);
        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_each_component_changes_the_fingerprint() {
        let base = fingerprint("urn:a", "check", NOT_NULL);
        assert_ne!(base, fingerprint("urn:b", "check", NOT_NULL));
        assert_ne!(base, fingerprint("urn:a", "other", NOT_NULL));
        assert_ne!(base, fingerprint("urn:a", "check", OperatorKind::Native));
    }

    #[test]
    fn test_concatenation_does_not_collide() {
        assert_ne!(
            fingerprint("urn:a,", "b", OperatorKind::Native),
            fingerprint("urn:a", ",b", OperatorKind::Native)
        );
    }
}
