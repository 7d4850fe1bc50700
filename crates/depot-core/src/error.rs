//! Errors raised by the registry and release logic.

use std::path::PathBuf;
use thiserror::Error;

use crate::builder::BuildError;

pub type Result<T, E = RegistryError> = std::result::Result<T, E>;

#[derive(Error, Debug)]
pub enum RegistryError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Malformed release metadata at {}: {source}", .path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Platform '{platform}' is not supported. Use: {}", .supported.join(", "))]
    UnknownPlatform {
        platform: String,
        supported: Vec<&'static str>,
    },

    #[error("Build for {platform} failed: {source}")]
    Build {
        platform: String,
        #[source]
        source: BuildError,
    },

    #[error("Release lock poisoned: {0}")]
    Lock(String),

    #[cfg(feature = "network")]
    #[error("Update check failed: {0}")]
    Network(#[from] reqwest::Error),
}

impl RegistryError {
    /// Rejection for a platform identifier missing from the supported table.
    pub fn unknown_platform(platform: impl Into<String>) -> Self {
        Self::UnknownPlatform {
            platform: platform.into(),
            supported: depot_schema::Platform::ids(),
        }
    }
}
