// scanlink/src/main.rs

mod cli;
mod commands;

use clap::Parser;
use tracing::Level;

use scanlink_core::ScanlinkError;
use scanlink_core::domain::error::DomainError;
use scanlink_core::infrastructure::error::InfrastructureError;

use cli::{Cli, Commands};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Logs on stderr, command output on stdout
    tracing_subscriber::fmt()
        .with_max_level(if cli.verbose { Level::DEBUG } else { Level::INFO })
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    if let Err(err) = dispatch(cli.command).await {
        render(err);
        std::process::exit(1);
    }
}

async fn dispatch(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Ingest {
            scan_result,
            config,
            no_graceful,
            dry_run,
            report,
        } => commands::ingest::execute(scan_result, config, no_graceful, dry_run, report).await,

        Commands::Inspect {
            scan_result,
            config,
        } => commands::inspect::execute(scan_result, config),

        Commands::Validate {
            dataset,
            policies,
            scan_result,
            config,
        } => commands::validate::execute(dataset, policies, scan_result, config),
    }
}

/// Diagnostics from the core get miette's report (code + help); anything else the anyhow chain.
fn render(err: anyhow::Error) {
    let err = match err.downcast::<ScanlinkError>() {
        Ok(e) => return eprintln!("{:?}", miette::Report::new(e)),
        Err(err) => err,
    };
    let err = match err.downcast::<InfrastructureError>() {
        Ok(e) => return eprintln!("{:?}", miette::Report::new(e)),
        Err(err) => err,
    };
    match err.downcast::<DomainError>() {
        Ok(e) => eprintln!("{:?}", miette::Report::new(e)),
        Err(err) => eprintln!("💥 Error: {:?}", err),
    }
}
