//! The release document and its asset records.
//!
//! The JSON field names match the GitHub "latest release" payload so that
//! the managed CLI can talk to this server and to GitHub with one decoder.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hash::Sha256Digest;

/// Description of the currently published release.
///
/// Persisted as a single JSON document. `assets` is always replaced by a live
/// scan of the binaries directory before being returned to a client.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseMetadata {
    /// Version identifier, e.g. `v1.4.0-3-gabc1234`.
    pub tag_name: String,
    /// Display title.
    pub name: String,
    /// Publish timestamp (UTC).
    pub published_at: DateTime<Utc>,
    /// Canonical URL of the release, relative to the serving origin.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub html_url: Option<String>,
    /// Free-text release description.
    pub body: String,
    /// Downloadable binaries, sorted by name.
    #[serde(default)]
    pub assets: Vec<AssetDescriptor>,
}

impl ReleaseMetadata {
    /// Build a release document for `tag_name` with the conventional
    /// `Release <tag>` title and no assets.
    pub fn new(
        tag_name: impl Into<String>,
        published_at: DateTime<Utc>,
        body: impl Into<String>,
    ) -> Self {
        let tag_name = tag_name.into();
        Self {
            name: format!("Release {tag_name}"),
            tag_name,
            published_at,
            html_url: None,
            body: body.into(),
            assets: Vec::new(),
        }
    }
}

/// One downloadable binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetDescriptor {
    /// File name inside the binaries directory.
    pub name: String,
    /// `<base_url>/download/<name>`, built per request.
    pub browser_download_url: String,
    /// Size in bytes at scan time.
    pub size: u64,
    /// SHA-256 of the full file contents at scan time.
    pub sha256: Sha256Digest,
}

/// Download URL for an asset served from `base_url`.
///
/// A trailing slash on `base_url` is ignored.
pub fn download_url(base_url: &str, name: &str) -> String {
    format!("{}/download/{name}", base_url.trim_end_matches('/'))
}
