//! Command-line arguments

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Default)]
#[command(name = "gridbase", version, about = "A spreadsheet-style data grid")]
pub struct CliArgs {
    /// JSON config file to load before environment overrides
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, value_name = "FILE")]
    pub db: Option<PathBuf>,

    /// Owner identity used for every operation
    #[arg(long)]
    pub owner: Option<String>,

    /// Table id to open instead of the workspace default
    #[arg(long, value_name = "ID")]
    pub table: Option<String>,

    /// Rows fetched per snapshot
    #[arg(long, value_name = "N")]
    pub row_limit: Option<usize>,
}
