//! Release orchestration: builds, asset scans, and metadata updates.
//!
//! [`ReleaseService`] is the single entry point the HTTP layer and the CLI
//! use. Mutating operations (`update_release`, `build_platform`,
//! `build_many`) run under one lock so that concurrent build requests cannot
//! interleave their builds or lose each other's metadata writes. Reads go
//! straight to disk.

use chrono::{Local, Utc};
use depot_schema::{Platform, ReleaseMetadata};
use std::fmt;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::builder::BuildInvoker;
use crate::error::{RegistryError, Result};
use crate::metadata::{DEFAULT_BODY, MetadataStore};
use crate::scanner::AssetScanner;
use crate::version::VersionResolver;

/// Outcome of a single-platform build.
#[derive(Debug, Clone)]
pub struct SingleBuild {
    pub platform: &'static Platform,
    pub binary: PathBuf,
    pub release: ReleaseMetadata,
}

/// Outcome of a bulk build. Failed platforms are absent from `built`.
#[derive(Debug, Clone)]
pub struct BuildSummary {
    pub built: Vec<(&'static Platform, PathBuf)>,
    pub release: ReleaseMetadata,
}

impl BuildSummary {
    /// Identifiers of the platforms that built successfully, in build order.
    pub fn built_ids(&self) -> Vec<&'static str> {
        self.built.iter().map(|(p, _)| p.id).collect()
    }
}

pub struct ReleaseService {
    scanner: AssetScanner,
    store: MetadataStore,
    versions: VersionResolver,
    invoker: Arc<dyn BuildInvoker>,
    lock: Mutex<()>,
}

impl fmt::Debug for ReleaseService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReleaseService")
            .field("scanner", &self.scanner)
            .field("store", &self.store)
            .field("versions", &self.versions)
            .finish_non_exhaustive()
    }
}

impl ReleaseService {
    pub fn new(
        scanner: AssetScanner,
        store: MetadataStore,
        versions: VersionResolver,
        invoker: Arc<dyn BuildInvoker>,
    ) -> Self {
        Self {
            scanner,
            store,
            versions,
            invoker,
            lock: Mutex::new(()),
        }
    }

    pub fn scanner(&self) -> &AssetScanner {
        &self.scanner
    }

    pub fn store(&self) -> &MetadataStore {
        &self.store
    }

    pub fn versions(&self) -> &VersionResolver {
        &self.versions
    }

    /// Current release as served to clients.
    ///
    /// Title, tag, body and timestamp come from the stored document; the
    /// asset list is always a fresh scan and `html_url` is `base_url`.
    ///
    /// # Errors
    ///
    /// Fails if the stored document is malformed or a binary cannot be read.
    pub fn latest(&self, base_url: &str) -> Result<ReleaseMetadata> {
        let mut release = self.store.load()?;
        release.assets = self.scanner.scan(base_url)?;
        release.html_url = Some(trim_base(base_url));
        Ok(release)
    }

    /// Replace the stored release with a fresh one describing the binaries
    /// currently on disk.
    ///
    /// # Errors
    ///
    /// Fails if scanning or writing the document fails.
    pub fn update_release(&self, base_url: &str) -> Result<ReleaseMetadata> {
        let _guard = self.acquire()?;
        self.write_release(base_url)
    }

    /// Build one platform, then update the release.
    ///
    /// Unknown identifiers are rejected before the toolchain is touched and
    /// leave the stored document alone.
    ///
    /// # Errors
    ///
    /// [`RegistryError::UnknownPlatform`] for an unsupported identifier,
    /// [`RegistryError::Build`] if the toolchain fails, or any error from
    /// [`update_release`](Self::update_release).
    pub fn build_platform(&self, id: &str, base_url: &str) -> Result<SingleBuild> {
        let platform = Platform::lookup(id).ok_or_else(|| RegistryError::unknown_platform(id))?;

        let _guard = self.acquire()?;
        let version = self.versions.resolve();
        let binary = self
            .invoker
            .build(platform, &version)
            .map_err(|source| RegistryError::Build {
                platform: platform.id.to_string(),
                source,
            })?;

        let release = self.write_release(base_url)?;
        Ok(SingleBuild {
            platform,
            binary,
            release,
        })
    }

    /// Build several platforms, then update the release once.
    ///
    /// `requested` of `None` or an empty list means every supported
    /// platform. Unknown identifiers and failed builds are logged and left
    /// out of the summary; they do not abort the request.
    ///
    /// # Errors
    ///
    /// Only the final release update can fail the call.
    pub fn build_many(&self, requested: Option<&[String]>, base_url: &str) -> Result<BuildSummary> {
        let _guard = self.acquire()?;
        let built = self.build_targets(requested);
        let release = self.write_release(base_url)?;
        Ok(BuildSummary { built, release })
    }

    /// Like [`build_many`](Self::build_many), but the stored release is only
    /// replaced when at least one platform built. Returns `None`, with the
    /// document untouched, when nothing was produced.
    ///
    /// # Errors
    ///
    /// Only the final release update can fail the call.
    pub fn build_and_publish(
        &self,
        requested: Option<&[String]>,
        base_url: &str,
    ) -> Result<Option<BuildSummary>> {
        let _guard = self.acquire()?;
        let built = self.build_targets(requested);
        if built.is_empty() {
            tracing::warn!("No binaries were produced; release left unchanged");
            return Ok(None);
        }
        let release = self.write_release(base_url)?;
        Ok(Some(BuildSummary { built, release }))
    }

    /// Caller holds the lock.
    fn build_targets(&self, requested: Option<&[String]>) -> Vec<(&'static Platform, PathBuf)> {
        let targets = resolve_targets(requested);
        let version = self.versions.resolve();
        let mut built = Vec::with_capacity(targets.len());

        for platform in targets {
            match self.invoker.build(platform, &version) {
                Ok(path) => built.push((platform, path)),
                Err(e) => tracing::warn!("Skipping {platform}: {e}"),
            }
        }
        built
    }

    fn write_release(&self, base_url: &str) -> Result<ReleaseMetadata> {
        let version = self.versions.resolve();
        let body = format!(
            "{DEFAULT_BODY} - {}",
            Local::now().format("%Y-%m-%d %H:%M:%S")
        );

        let mut release = ReleaseMetadata::new(version, Utc::now(), body);
        release.html_url = Some(trim_base(base_url));
        release.assets = self.scanner.scan(base_url)?;

        self.store.save(&release)?;
        tracing::info!(
            "Release updated: {} with {} binaries",
            release.tag_name,
            release.assets.len()
        );
        Ok(release)
    }

    fn acquire(&self) -> Result<MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|e| RegistryError::Lock(e.to_string()))
    }
}

fn resolve_targets(requested: Option<&[String]>) -> Vec<&'static Platform> {
    match requested {
        Some(ids) if !ids.is_empty() => ids
            .iter()
            .filter_map(|id| {
                let found = Platform::lookup(id);
                if found.is_none() {
                    tracing::warn!("Skipping unsupported platform '{id}'");
                }
                found
            })
            .collect(),
        _ => Platform::all().iter().collect(),
    }
}

fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
