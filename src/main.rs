//! ipharvest - fronting IP candidate aggregator
//!
//! Fetches carrier IP lists and proxy subscriptions, then writes
//! deduplicated, labelled category files.

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use ipharvest::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    match cli.command {
        Commands::Update { dry_run, json } => {
            ipharvest::commands::update::run(&cli.config, dry_run, json).await
        }
        Commands::Resolve { file } => ipharvest::commands::resolve::run(&file),
        Commands::Parse {
            format,
            file,
            category,
            start,
        } => ipharvest::commands::parse::run(format, &file, category, start),
        Commands::Check { token } => ipharvest::commands::check::run(&token),
        Commands::Init { force } => ipharvest::commands::init::run(&cli.config, force),
        Commands::Version => {
            println!("ipharvest {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
