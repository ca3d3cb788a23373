// scanlink/src/commands/ingest.rs
//
// USE CASE: Send a scan result to the catalog.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use scanlink_core::application::{ScanIngestor, SyncResult};
use scanlink_core::infrastructure::adapters::{InMemoryRepository, RestAssertionRepository};
use scanlink_core::infrastructure::fs::write_json_report;
use scanlink_core::ports::repository::AssertionRepository;

use crate::cli::ConfigArgs;
use crate::commands::{load_config, read_scan};

pub async fn execute(
    scan_result: PathBuf,
    args: ConfigArgs,
    no_graceful: bool,
    dry_run: bool,
    report: Option<PathBuf>,
) -> anyhow::Result<()> {
    let start = std::time::Instant::now();

    println!("⚙️  Loading configuration...");
    let mut config = load_config(&args, dry_run)?;
    if no_graceful {
        config.graceful_exceptions = false;
    }

    let document = read_scan(&scan_result)?;
    println!(
        "   Scan: {} ({} checks, {} tables)",
        document.data_source_name,
        document.total_checks(),
        document.tables.len()
    );

    let repository: Arc<dyn AssertionRepository> = if dry_run {
        println!("   Catalog: in-memory (dry run)");
        Arc::new(InMemoryRepository::default())
    } else {
        println!("   Catalog: {}", config.server_url);
        Arc::new(
            RestAssertionRepository::new(&config)
                .with_context(|| format!("Failed to set up a client for {}", config.server_url))?,
        )
    };

    let ingestor = ScanIngestor::new(config, repository);
    let result = ingestor.run(&document).await?;

    if let Some(path) = &report {
        write_json_report(path, &result)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        println!("📄 Report saved to {}", path.display());
    }

    print_summary(&result);

    if result.is_success() {
        println!("\n✨ SUCCESS! Scan synced in {:.2?}", start.elapsed());
    } else {
        eprintln!("\n❌ {}. {} check(s) not synced.", result.status, result.errors.len());
        std::process::exit(1);
    }

    Ok(())
}

fn print_summary(result: &SyncResult) {
    println!("📊 Sync Summary:");
    println!("   Status: {}", result.status);
    if let Some(scan_id) = &result.scan_id {
        println!("   Scan id: {}", scan_id);
    }
    println!("   Attempted: {}", result.assertions_attempted);
    println!("   Sent: {}", result.assertions_sent);
    for error in &result.errors {
        eprintln!("   ❌ {} [{:?}]: {}", error.check, error.kind, error.message);
    }
}
