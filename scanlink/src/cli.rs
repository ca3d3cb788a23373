// scanlink/src/cli.rs
//
// Single source of truth for all CLI definitions (Clap structs).

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scanlink")]
#[command(about = "Sync data-quality scan results into a metadata catalog", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Debug-level logging
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Settings shared by every command. Each one overrides the config file and the environment.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    /// Directory searched for scanlink.yaml / scanlink.yml
    #[arg(long, default_value = ".")]
    pub project_dir: PathBuf,

    /// Explicit configuration file
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Catalog server (ex: http://localhost:8080)
    #[arg(long)]
    pub server_url: Option<String>,

    /// Catalog access token
    #[arg(long)]
    pub token: Option<String>,

    /// Environment segment of dataset urns (default: PROD)
    #[arg(long)]
    pub env: Option<String>,

    /// Catalog platform to use instead of the data-source name
    #[arg(long)]
    pub platform_alias: Option<String>,

    /// JSON file mapping data-source names to platform instances
    #[arg(long)]
    pub platform_instance_map: Option<PathBuf>,

    /// Lowercase dataset names in urns
    #[arg(long)]
    pub convert_urns_to_lowercase: bool,

    /// Timeout of each catalog call, in seconds
    #[arg(long)]
    pub timeout_sec: Option<f64>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 📤 Sends the checks of a scan result to the catalog as assertions
    Ingest {
        /// Scan result JSON file
        #[arg(long, short)]
        scan_result: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,

        /// Fail with an error instead of reporting failures in the result
        #[arg(long)]
        no_graceful: bool,

        /// Map and sync against an in-memory catalog
        #[arg(long)]
        dry_run: bool,

        /// Write the sync result as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },

    /// 🔍 Shows how each check of a scan result maps to an assertion
    Inspect {
        /// Scan result JSON file
        #[arg(long, short)]
        scan_result: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// ⚖️ Validates governance policies of a dataset against a scan result
    Validate {
        /// Dataset urn the policies apply to
        #[arg(long, short)]
        dataset: String,

        /// Policy file (YAML or JSON)
        #[arg(long, short)]
        policies: PathBuf,

        /// Scan result JSON file providing the assertions
        #[arg(long, short)]
        scan_result: Option<PathBuf>,

        #[command(flatten)]
        config: ConfigArgs,
    },
}
