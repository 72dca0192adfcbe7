//! Check command implementation.

use anyhow::Result;

use crate::validation::is_valid_address;

/// Run the check command
pub fn run(token: &str) -> Result<()> {
    let token = token.trim();
    if is_valid_address(token) {
        println!("[OK] {} is a valid address", token);
        Ok(())
    } else {
        anyhow::bail!("{:?} is not an acceptable address", token)
    }
}
