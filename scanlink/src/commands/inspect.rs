// scanlink/src/commands/inspect.rs
//
// USE CASE: Show how a scan result maps to assertions, without touching the catalog.

use std::path::PathBuf;

use comfy_table::presets::UTF8_FULL;
use comfy_table::{ContentArrangement, Table};
use scanlink_core::application::map_document;

use crate::cli::ConfigArgs;
use crate::commands::{load_config, read_scan};

pub fn execute(scan_result: PathBuf, args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(&args, true)?;
    let document = read_scan(&scan_result)?;
    let mapped = map_document(&document, &config);

    println!(
        "\n🔍 Inspecting scan of '{}' ({} checks)",
        document.data_source_name,
        document.total_checks()
    );

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec!["Check", "Scope", "Operator", "Aggregation", "Result", "Urn"]);

    for m in &mapped.mappings {
        table.add_row(vec![
            m.check_name.clone(),
            m.scope.catalog_scope().to_string(),
            m.operator.as_str().to_string(),
            m.aggregation.as_str().to_string(),
            m.evaluation.outcome.to_string(),
            m.scope_urn.clone(),
        ]);
    }
    println!("{table}");

    if !mapped.failures.is_empty() {
        eprintln!("\n⚠️  {} check(s) cannot be mapped:", mapped.failures.len());
        for f in &mapped.failures {
            eprintln!("   ❌ {}: {}", f.check, f.message);
        }
    }

    Ok(())
}
