//! CLI argument parsing with clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::model::Category;

#[derive(Parser)]
#[command(name = "ipharvest")]
#[command(author, version, about = "Aggregate and classify fronting IP candidates")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "ipharvest.yaml", global = true)]
    pub config: PathBuf,

    /// Quiet mode (for cron/CI)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output, including every rejected line)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch all sources, classify, and write the output files
    Update {
        /// Fetch and process but don't write any file
        #[arg(long)]
        dry_run: bool,

        /// Print the run summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Find the subscription link on a saved landing page
    Resolve {
        /// HTML file to read ("-" for stdin)
        file: PathBuf,
    },

    /// Run one parser over a saved source and print the labelled result
    Parse {
        /// Source format
        #[arg(value_enum)]
        format: ParseFormat,

        /// File to read ("-" for stdin)
        file: PathBuf,

        /// Category for list sources (telecom, unicom, mobile, other, multi_line, ipv6)
        #[arg(long, default_value = "other")]
        category: Category,

        /// First counter value
        #[arg(long, default_value = "1")]
        start: u32,
    },

    /// Check whether a token is accepted as an address
    Check {
        /// Token to validate
        token: String,
    },

    /// Write a commented default config file
    Init {
        /// Overwrite an existing config file
        #[arg(long)]
        force: bool,
    },

    /// Show version
    Version,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ParseFormat {
    /// One address per line, optional #remark
    List,
    /// address#CT/CU/CM lines
    Mixed,
    /// Base64 subscription blob
    Subscription,
}
