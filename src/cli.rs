// Command-line surface.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "statsheet")]
#[command(about = "Basketball box-score sheet: import, edit, aggregate, export", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Subcommand)]
pub enum Command {
    /// Write an empty CSV template (header row only).
    Template {
        /// Destination file. Defaults to the configured template file.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Export every row as CSV.
    Export {
        /// Destination file. Defaults to the configured export file.
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Replace the sheet with the rows of a CSV file.
    ImportCsv { path: PathBuf },

    /// Replace the sheet with the player lines of a PDF box score.
    ImportPdf { path: PathBuf },

    /// Append an empty row dated today.
    AddRow,

    /// Edit one cell. Column names are matched like CSV headers.
    Set {
        index: usize,
        column: String,
        value: String,
    },

    /// Delete one row.
    Remove { index: usize },

    /// Replace the sheet with the demo dataset.
    Sample,

    /// List the rows.
    Rows {
        #[arg(long)]
        json: bool,
    },

    /// Per-player averages and shooting rates.
    Players {
        #[arg(long)]
        json: bool,
    },

    /// Team averages and shooting rates.
    Team {
        #[arg(long)]
        json: bool,
    },

    /// Row count and the last import.
    Status {
        #[arg(long)]
        json: bool,
    },
}
