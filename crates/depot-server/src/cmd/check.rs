//! Check command

use anyhow::Result;

/// Compare `current` with the latest release published by `server`.
pub async fn check(server: &str, current: &str) -> Result<()> {
    let check = depot_core::client::check_for_update(server, current).await?;

    if check.update_available() {
        println!(
            "New version available: {} (current: {current})",
            check.release.tag_name
        );
        if let Some(url) = &check.release.html_url {
            println!("Download from: {url}");
        }
        for asset in &check.release.assets {
            println!("  {}  {} ({} bytes)", asset.sha256, asset.name, asset.size);
        }
    } else {
        println!("Up to date ({current})");
    }
    Ok(())
}
