//! Resolved server configuration.

use depot_core::{AssetScanner, GoToolchain, MetadataStore, ReleaseService, VersionResolver};
use std::path::PathBuf;
use std::sync::Arc;

use crate::ServeArgs;

/// Everything the server needs, with paths derived from the data directory.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub binaries_dir: PathBuf,
    pub metadata_path: PathBuf,
    pub project_root: PathBuf,
    pub product: String,
    pub base_url: String,
    /// Bearer token for the build endpoints. `None` disables the check.
    pub token: Option<String>,
}

impl ServerConfig {
    /// Build a configuration rooted at `data_dir`, with defaults for
    /// everything else.
    pub fn new(data_dir: impl Into<PathBuf>, project_root: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            binaries_dir: data_dir.join("binaries"),
            metadata_path: data_dir.join("metadata.json"),
            project_root: project_root.into(),
            product: depot_schema::DEFAULT_PRODUCT.to_string(),
            base_url: "http://localhost:8080".to_string(),
            token: None,
        }
    }

    /// `host:port` to bind.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Go toolchain writing into the binaries directory.
    pub fn toolchain(&self) -> GoToolchain {
        GoToolchain::new(&self.project_root, &self.binaries_dir, &self.product)
    }

    /// Wire up the release service with the Go toolchain.
    pub fn release_service(&self) -> ReleaseService {
        self.release_service_with(Arc::new(self.toolchain()))
    }

    /// Wire up the release service with a custom build invoker.
    pub fn release_service_with(&self, invoker: Arc<dyn depot_core::BuildInvoker>) -> ReleaseService {
        let versions = VersionResolver::new(&self.project_root);
        ReleaseService::new(
            AssetScanner::new(&self.binaries_dir, &self.product),
            MetadataStore::new(&self.metadata_path, versions.clone()),
            versions,
            invoker,
        )
    }
}

impl From<&ServeArgs> for ServerConfig {
    fn from(args: &ServeArgs) -> Self {
        Self {
            host: args.host.clone(),
            port: args.port,
            // An empty secret would accept an empty bearer token.
            token: args.token.clone().filter(|t| !t.is_empty()),
            product: args.product.clone(),
            base_url: args.base_url.clone(),
            ..Self::new(&args.data_dir, &args.project_root)
        }
    }
}
