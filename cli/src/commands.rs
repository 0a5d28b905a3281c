pub mod classify;
pub mod scan;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "sondr")]
#[command(about = "A network device discovery and inventory-import engine.")]
pub struct CommandLine {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Scan an address range for manageable devices
    #[command(alias = "s")]
    Scan(ScanArgs),
    /// Classify a raw device description string
    #[command(alias = "c")]
    Classify { descr: String },
}

#[derive(Args)]
pub struct ScanArgs {
    /// First address of the range (dotted quad)
    #[arg(long)]
    pub start: String,
    /// Last address of the range, inclusive
    #[arg(long)]
    pub end: String,
    /// Probe mode: "simulation" or "real"
    #[arg(long)]
    pub mode: Option<String>,
    /// Community string; repeat for multiple, tried in order
    #[arg(long = "community")]
    pub communities: Vec<String>,
    /// Per-credential probe timeout in milliseconds
    #[arg(long)]
    pub timeout_ms: Option<u64>,
    /// Subnet hint recorded on the scan
    #[arg(long)]
    pub subnet: Option<String>,
    /// After completion, import all discovered devices into this JSON
    /// inventory file
    #[arg(long)]
    pub import_to: Option<PathBuf>,
    /// Service tier default for imported records
    #[arg(long)]
    pub tier: Option<String>,
    /// Location default for imported records
    #[arg(long)]
    pub location: Option<String>,
    /// Customer reference default for imported records
    #[arg(long)]
    pub customer_ref: Option<String>,
}

impl CommandLine {
    pub fn parse_args() -> Self {
        Self::parse()
    }
}
