//! Release version derived from the source tree's git history.

use depot_schema::FALLBACK_VERSION;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Resolves the version string stamped into builds and release documents.
///
/// Runs `git describe --tags --always --dirty` in the project root. Any
/// failure (git missing, not a repository, empty output) yields
/// [`FALLBACK_VERSION`]; callers never see an error.
#[derive(Debug, Clone)]
pub struct VersionResolver {
    project_root: PathBuf,
    fallback: String,
}

impl VersionResolver {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
            fallback: FALLBACK_VERSION.to_string(),
        }
    }

    /// Directory `git describe` runs in.
    pub fn project_root(&self) -> &Path {
        &self.project_root
    }

    pub fn resolve(&self) -> String {
        let described = Command::new("git")
            .args(["describe", "--tags", "--always", "--dirty"])
            .current_dir(&self.project_root)
            .output()
            .ok()
            .filter(|o| o.status.success())
            .and_then(|o| String::from_utf8(o.stdout).ok())
            .and_then(|s| parse_describe(&s));

        match described {
            Some(version) => {
                tracing::debug!("Resolved version {version} from git");
                version
            }
            None => {
                tracing::debug!(
                    "git describe unavailable in {}, using {}",
                    self.project_root.display(),
                    self.fallback
                );
                self.fallback.clone()
            }
        }
    }
}

fn parse_describe(stdout: &str) -> Option<String> {
    let line = stdout.lines().next()?.trim();
    (!line.is_empty()).then(|| line.to_string())
}
