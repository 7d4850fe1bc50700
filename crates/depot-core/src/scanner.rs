//! Enumerates published binaries in the storage directory.

use depot_schema::{AssetDescriptor, download_url};
use std::path::{Component, Path, PathBuf};

use crate::Result;
use crate::hashing::sha256_file;

/// Lists the product's binaries and describes each one.
///
/// A file is an asset if it is a regular file directly inside the binaries
/// directory whose name starts with the product prefix. Every scan re-reads
/// and re-hashes every matching file; nothing is cached.
#[derive(Debug, Clone)]
pub struct AssetScanner {
    binaries_dir: PathBuf,
    product: String,
}

impl AssetScanner {
    pub fn new(binaries_dir: impl Into<PathBuf>, product: impl Into<String>) -> Self {
        Self {
            binaries_dir: binaries_dir.into(),
            product: product.into(),
        }
    }

    pub fn binaries_dir(&self) -> &Path {
        &self.binaries_dir
    }

    pub fn product(&self) -> &str {
        &self.product
    }

    /// Whether `name` follows the product's naming convention.
    pub fn is_asset_name(&self, name: &str) -> bool {
        name.starts_with(&self.product)
    }

    /// Paths of all matching files, sorted by file name.
    ///
    /// A missing binaries directory is treated as empty. Symlinks are
    /// followed only while they stay inside the directory; dangling or
    /// escaping links are skipped.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory exists but cannot be listed.
    pub fn matching_files(&self) -> Result<Vec<PathBuf>> {
        let entries = match std::fs::read_dir(&self.binaries_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let root = std::fs::canonicalize(&self.binaries_dir)?;

        let mut files = Vec::new();
        for entry in entries {
            let entry = entry?;
            let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
                continue;
            };
            if !self.is_asset_name(&name) {
                continue;
            }
            if confined(&root, &entry.path()).is_some() {
                files.push(entry.path());
            } else {
                tracing::debug!("Skipping {name}: not a regular file inside the binaries directory");
            }
        }

        files.sort();
        Ok(files)
    }

    /// Resolve a client-supplied asset name to a file on disk.
    ///
    /// The name must be a single plain path component carrying the product
    /// prefix, and what it points at (after following symlinks) must be a
    /// regular file inside the binaries directory.
    pub fn resolve(&self, name: &str) -> Option<PathBuf> {
        if !is_plain_file_name(name) || !self.is_asset_name(name) {
            return None;
        }
        let root = std::fs::canonicalize(&self.binaries_dir).ok()?;
        confined(&root, &root.join(name))
    }

    /// Number of matching files, without hashing them.
    ///
    /// # Errors
    ///
    /// Same as [`matching_files`](Self::matching_files).
    pub fn count(&self) -> Result<usize> {
        Ok(self.matching_files()?.len())
    }

    /// Describe every matching file, with download URLs rooted at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if any matching file cannot be stat'ed or read.
    pub fn scan(&self, base_url: &str) -> Result<Vec<AssetDescriptor>> {
        let files = self.matching_files()?;
        let mut assets = Vec::with_capacity(files.len());

        for path in files {
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            let size = std::fs::metadata(&path)?.len();
            let sha256 = sha256_file(&path)?;

            assets.push(AssetDescriptor {
                browser_download_url: download_url(base_url, &name),
                name,
                size,
                sha256,
            });
        }

        tracing::debug!(
            "Scanned {} asset(s) in {}",
            assets.len(),
            self.binaries_dir.display()
        );
        Ok(assets)
    }
}

fn is_plain_file_name(name: &str) -> bool {
    if name.is_empty() || name.contains(['/', '\\']) {
        return false;
    }
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Canonical target of `path` if it is a regular file under `root`.
fn confined(root: &Path, path: &Path) -> Option<PathBuf> {
    let target = std::fs::canonicalize(path).ok()?;
    (target.starts_with(root) && target.is_file()).then_some(target)
}
