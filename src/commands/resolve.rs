//! Resolve command implementation.

use anyhow::Result;
use std::path::Path;

use super::read_input;
use crate::resolver::resolve_subscription_url;

/// Run the resolve command
pub fn run(file: &Path) -> Result<()> {
    let html = read_input(file)?;
    match resolve_subscription_url(&html) {
        Some(url) => {
            println!("{}", url);
            Ok(())
        }
        None => anyhow::bail!("No subscription link found in {:?}", file),
    }
}
