//! Update command implementation.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::{info, warn};

use crate::config::Config;
use crate::fetcher::Fetcher;
use crate::lock::LockGuard;
use crate::output::write_outputs;
use crate::pipeline;
use crate::stats::RunSummary;

/// Run the update command
pub async fn run(config_path: &Path, dry_run: bool, json: bool) -> Result<()> {
    let config = Config::load_or_default(config_path)
        .with_context(|| format!("Failed to load config from {:?}", config_path))?;

    let sources = config.enabled_sources();
    if sources.is_empty() {
        warn!("No sources enabled. Check your configuration.");
    }

    let output_dir = Path::new(&config.output_dir);
    let _lock = if dry_run {
        None
    } else {
        Some(LockGuard::acquire(output_dir)?)
    };

    info!("Collecting from {} source(s)...", sources.len());
    let fetcher = Fetcher::new(&config.fetch)?;
    let result = pipeline::run(
        &fetcher,
        &sources,
        config.numbering(),
        config.fetch.max_concurrent,
    )
    .await;

    let files = if dry_run {
        info!("Dry run: no files written");
        Vec::new()
    } else {
        write_outputs(output_dir, &config.outputs, &result.aggregation)?
            .iter()
            .map(|p| p.display().to_string())
            .collect()
    };

    let summary = RunSummary::new(&result, fetcher.total_downloaded() as u64, files);
    if json {
        println!("{}", summary.to_json()?);
    } else {
        print!("{}", summary.to_text());
        println!();
        if dry_run {
            println!("[OK] {} entries collected (dry run)", summary.total);
        } else {
            println!("[OK] {} entries written", summary.total);
        }
    }

    Ok(())
}
