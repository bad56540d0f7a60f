use std::fmt;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser, Debug)]
#[command(
    name = "psxrates",
    version,
    about = "PSX closing-rate PDF to CSV conversion tooling"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    Inventory(InventoryArgs),
    Convert(ConvertArgs),
    Status(StatusArgs),
}

#[derive(Args, Debug, Clone)]
pub struct InventoryArgs {
    /// Directory holding the closing-rate PDFs.
    #[arg(long)]
    pub input_dir: PathBuf,

    #[arg(long, default_value = "closing_rates_csv")]
    pub out_dir: PathBuf,

    #[arg(long)]
    pub manifest_path: Option<PathBuf>,

    #[arg(long, default_value_t = false)]
    pub dry_run: bool,
}

#[derive(Args, Debug, Clone)]
pub struct ConvertArgs {
    /// Directory holding the closing-rate PDFs.
    #[arg(long)]
    pub input_dir: PathBuf,

    /// Directory receiving per-PDF CSVs, the master CSV and run manifests.
    #[arg(long, default_value = "closing_rates_csv")]
    pub out_dir: PathBuf,

    /// Page specifier passed through to the detection engine:
    /// "all", "1", "1,3,7" or "1-3".
    #[arg(long, default_value = "all")]
    pub pages: String,

    /// Detection flavors to try, in order.
    #[arg(long = "flavor", value_enum, default_values_t = vec![Flavor::Lattice, Flavor::Stream])]
    pub flavors: Vec<Flavor>,

    /// Executable providing the table-detection engine.
    #[arg(long, default_value = "camelot")]
    pub camelot_path: String,

    #[arg(long)]
    pub run_manifest_path: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct StatusArgs {
    #[arg(long, default_value = "closing_rates_csv")]
    pub out_dir: PathBuf,
}

/// Named table-detection strategy: lattice follows gridlines, stream follows
/// whitespace alignment.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum Flavor {
    Lattice,
    Stream,
}

impl Flavor {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Lattice => "lattice",
            Self::Stream => "stream",
        }
    }
}

impl fmt::Display for Flavor {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}
