//! Init command implementation.

use anyhow::Result;
use std::path::Path;
use tracing::info;

use crate::config::Config;
use crate::output::write_atomic;

/// Run the init command
pub fn run(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!(
            "Config file {:?} already exists (use --force to overwrite)",
            config_path
        );
    }

    write_atomic(config_path, Config::generate_default_yaml().as_bytes())?;
    info!("Wrote default config to {:?}", config_path);
    println!("[OK] Config written to {}", config_path.display());
    Ok(())
}
