//! Update check against a running depot server.
//!
//! This is the same request the managed CLI makes on startup: fetch the
//! latest release and compare its tag with the locally running version.

use depot_schema::ReleaseMetadata;
use std::time::Duration;

use crate::Result;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Result of comparing a local version with the server's latest release.
#[derive(Debug, Clone)]
pub struct UpdateCheck {
    pub current: String,
    pub release: ReleaseMetadata,
}

impl UpdateCheck {
    /// Whether the server publishes a different, non-empty tag.
    pub fn update_available(&self) -> bool {
        !self.release.tag_name.is_empty() && self.release.tag_name != self.current
    }
}

/// URL of the latest-release endpoint for a server base URL.
///
/// `http://host:8080` and `http://host:8080/` become
/// `http://host:8080/latest`; a URL already ending in `/latest` is kept.
pub fn latest_url(server: &str) -> String {
    let url = server.trim_end_matches('/');
    if url.ends_with("/latest") {
        url.to_string()
    } else {
        format!("{url}/latest")
    }
}

/// Fetch the server's latest release and compare it with `current`.
///
/// # Errors
///
/// Returns [`RegistryError::Network`](crate::RegistryError::Network) on
/// connection failures, non-success status codes, or an undecodable body.
pub async fn check_for_update(server: &str, current: &str) -> Result<UpdateCheck> {
    let client = reqwest::Client::builder()
        .user_agent(crate::USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()?;

    let url = latest_url(server);
    tracing::debug!("Checking {url} for updates");

    let release = client
        .get(&url)
        .header(reqwest::header::ACCEPT, "application/json")
        .send()
        .await?
        .error_for_status()?
        .json::<ReleaseMetadata>()
        .await?;

    Ok(UpdateCheck {
        current: current.to_string(),
        release,
    })
}
