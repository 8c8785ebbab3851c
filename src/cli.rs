use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "inventory-scan")]
#[command(about = "Count stock by scanning barcodes against a product catalog", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Interactive counting: read scanned codes from stdin, one per line
    Count(SessionArgs),
    /// Replay a file of scanned codes and write the exports
    Batch(BatchArgs),
    /// Check a catalog file without counting anything
    Validate {
        /// Catalog CSV (EAN 1, EAN 2, Reference, Name, Couleur, Taille, Pointure)
        #[arg(long)]
        catalog: PathBuf,
    },
    /// Print configuration values
    PrintConfig,
}

#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Catalog CSV; falls back to `catalog_path` from the configuration
    #[arg(long)]
    pub catalog: Option<PathBuf>,
    /// Name of the first counting session
    #[arg(long)]
    pub session: Option<String>,
    /// Directory the CSV exports are written to
    #[arg(long)]
    pub export_dir: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct BatchArgs {
    #[command(flatten)]
    pub session: SessionArgs,
    /// Text file with one scanned code per line, optionally `code;quantity`
    #[arg(long)]
    pub codes: PathBuf,
}
