// scanlink/src/commands/validate.rs
//
// USE CASE: Check a dataset's governance policies against the assertions of a scan.

use std::path::PathBuf;

use anyhow::Context;
use scanlink_core::application::validate_governance_policies;
use scanlink_core::domain::governance::PolicyValidator;
use scanlink_core::infrastructure::config::load_policies;

use crate::cli::ConfigArgs;
use crate::commands::{load_config, read_scan};

pub fn execute(
    dataset: String,
    policies: PathBuf,
    scan_result: Option<PathBuf>,
    args: ConfigArgs,
) -> anyhow::Result<()> {
    let config = load_config(&args, true)?;
    let policies = load_policies(&policies)
        .with_context(|| format!("Failed to load policies from {:?}", policies))?;
    let document = scan_result.as_deref().map(read_scan).transpose()?;

    let result = validate_governance_policies(
        &PolicyValidator::default(),
        &config,
        &dataset,
        &policies,
        document.as_ref(),
    );

    println!("{}", serde_json::to_string_pretty(&result)?);

    if !result.is_compliant() {
        eprintln!(
            "\n⚠️  {} of {} policies not satisfied:",
            result.policies_validated - result.policies_satisfied,
            result.policies_validated
        );
        for outcome in result.unsatisfied() {
            eprintln!(
                "   ❌ {}: {}",
                outcome.policy,
                outcome.reason.as_deref().unwrap_or("unsatisfied")
            );
        }
        std::process::exit(1);
    }

    Ok(())
}
