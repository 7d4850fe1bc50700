//! On-disk release document.
//!
//! A single JSON file describes the current release. Reads never create it;
//! only [`MetadataStore::save`] writes, and it always overwrites the whole
//! file. There is no locking here: serialization of writers is the job of
//! [`ReleaseService`](crate::ReleaseService).

use chrono::Utc;
use depot_schema::ReleaseMetadata;
use std::path::{Path, PathBuf};

use crate::error::{RegistryError, Result};
use crate::version::VersionResolver;

/// Description used when no release has been published yet.
pub const DEFAULT_BODY: &str = "Automatic update";

#[derive(Debug, Clone)]
pub struct MetadataStore {
    path: PathBuf,
    versions: VersionResolver,
}

impl MetadataStore {
    pub fn new(path: impl Into<PathBuf>, versions: VersionResolver) -> Self {
        Self {
            path: path.into(),
            versions,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the release document.
    ///
    /// When the file does not exist a default document is synthesized from
    /// the current version and time. It is returned but not written.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::Metadata`] if the file exists but is not a
    /// valid release document, or an I/O error if it cannot be read.
    pub fn load(&self) -> Result<ReleaseMetadata> {
        let content = match std::fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(self.synthesize());
            }
            Err(e) => return Err(e.into()),
        };

        serde_json::from_str(&content).map_err(|source| RegistryError::Metadata {
            path: self.path.clone(),
            source,
        })
    }

    /// Replace the on-disk document with `metadata`.
    ///
    /// Last writer wins; the write is neither locked nor atomic.
    ///
    /// # Errors
    ///
    /// Returns an error if the parent directory cannot be created or the file
    /// cannot be written.
    pub fn save(&self, metadata: &ReleaseMetadata) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(metadata).map_err(|source| {
            RegistryError::Metadata {
                path: self.path.clone(),
                source,
            }
        })?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }

    fn synthesize(&self) -> ReleaseMetadata {
        ReleaseMetadata::new(self.versions.resolve(), Utc::now(), DEFAULT_BODY)
    }
}
