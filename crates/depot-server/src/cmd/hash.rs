//! Hash command

use anyhow::{Context, Result};
use std::path::PathBuf;

/// Print the SHA256 of each file, `sha256sum` style.
pub fn hash(files: &[PathBuf]) -> Result<()> {
    for file in files {
        let digest = depot_core::hashing::sha256_file(file)
            .with_context(|| format!("Failed to hash {}", file.display()))?;
        println!("{digest}  {}", file.display());
    }
    Ok(())
}
