//! Build-only mode: compile every platform, update the release, exit.

use anyhow::{Context, Result, bail};
use depot_core::BuildInvoker;
use std::sync::Arc;

use crate::ServerConfig;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

pub fn build_only(config: &ServerConfig) -> Result<()> {
    build_only_with(config, Arc::new(config.toolchain()))
}

/// Build-only mode with a specific toolchain.
///
/// The release document is only replaced when at least one binary was
/// produced; otherwise it is left alone and an error is returned.
pub fn build_only_with(config: &ServerConfig, invoker: Arc<dyn BuildInvoker>) -> Result<()> {
    std::fs::create_dir_all(&config.binaries_dir).with_context(|| {
        format!(
            "Failed to create binaries directory {}",
            config.binaries_dir.display()
        )
    })?;

    println!("Building all binaries...");
    let service = config.release_service_with(invoker);
    let Some(summary) = service.build_and_publish(None, &config.base_url)? else {
        bail!("No binaries were produced");
    };

    println!("\nBuild complete! {} binaries produced:", summary.built.len());
    for (_, path) in &summary.built {
        let size = std::fs::metadata(path)
            .with_context(|| format!("Failed to stat {}", path.display()))?
            .len();
        let name = path.file_name().unwrap_or_default().to_string_lossy();
        println!("   - {name} ({:.2} MB)", size as f64 / BYTES_PER_MB);
    }
    println!(
        "Release {} published with {} assets",
        summary.release.tag_name,
        summary.release.assets.len()
    );
    Ok(())
}
