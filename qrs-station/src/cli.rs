//! Command-line arguments

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};

/// Command-line arguments for qrs-station
#[derive(Parser, Debug)]
#[command(name = "qrs-station")]
#[command(about = "Barcode scan station: record scans, watch hourly output, export spreadsheets")]
#[command(version)]
pub struct Args {
    /// Data root folder
    #[arg(short, long, env = "QRS_ROOT_FOLDER")]
    pub root_folder: Option<PathBuf>,

    /// Configuration file (default: <config dir>/qrs/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the catalog files and a default configuration file
    Init,

    /// Manage scan targets
    #[command(subcommand)]
    Products(ProductsCommand),

    /// Manage code rules
    #[command(subcommand)]
    Rules(RulesCommand),

    /// Record codes read from stdin, one per line
    Scan {
        target: String,
        /// Day to open; anything but today is read-only
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// Show hourly statistics
    Stats {
        target: String,
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },

    /// List recorded codes, newest first
    Records {
        target: String,
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        page: i64,
        /// Only codes containing this text (case-insensitive)
        #[arg(long)]
        filter: Option<String>,
    },

    /// Delete a recorded code
    Delete {
        target: String,
        code: String,
        #[arg(long, value_parser = parse_date_arg)]
        date: Option<NaiveDate>,
    },

    /// List days with stored records
    History { target: String },

    /// Export days to spreadsheets
    Export {
        target: String,
        /// Day to export (repeatable; default today)
        #[arg(long = "date", value_parser = parse_date_arg)]
        dates: Vec<NaiveDate>,
        /// Export every stored day
        #[arg(long, conflicts_with = "dates")]
        all: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProductsCommand {
    List,
    Add {
        name: String,
        /// Rule the codes must match
        #[arg(long)]
        rule: Option<String>,
    },
    Rename { id: String, new_name: String },
    Remove { id: String },
}

#[derive(Subcommand, Debug)]
pub enum RulesCommand {
    List,
    Add {
        name: String,
        pattern: String,
        #[arg(long)]
        default: bool,
    },
    Remove { name: String },
}

fn parse_date_arg(value: &str) -> Result<NaiveDate, String> {
    qrs_common::time::parse_date(value).ok_or_else(|| format!("expected YYYY-MM-DD, got '{}'", value))
}
