//! Toolchain invocation for platform binaries.
//!
//! The release logic only sees the [`BuildInvoker`] trait. [`GoToolchain`]
//! is the production implementation; tests substitute a double that writes a
//! file directly.
//!
//! ## Environment contract
//!
//! The toolchain process inherits the server's environment plus:
//!
//! | Variable | Value |
//! |---|---|
//! | `GOOS` | Platform target OS |
//! | `GOARCH` | Platform target architecture |
//! | `CGO_ENABLED` | `0` (static, cross-compilable binaries) |
//!
//! The release version is embedded with `-ldflags "-X main.version=<v>"`.

use depot_schema::Platform;
use std::path::{Path, PathBuf};
use std::process::Command;
use thiserror::Error;

/// Linker symbol the managed CLI reads its version from.
const VERSION_SYMBOL: &str = "main.version";

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("failed to launch toolchain: {0}")]
    Spawn(#[from] std::io::Error),

    #[error("toolchain exited with {}: {stderr}", exit_label(.status))]
    Failed { status: Option<i32>, stderr: String },

    #[error("toolchain reported success but {} is missing", .0.display())]
    MissingArtifact(PathBuf),
}

fn exit_label(status: &Option<i32>) -> String {
    match status {
        Some(code) => format!("code {code}"),
        None => "signal".to_string(),
    }
}

/// Produces one platform binary.
///
/// `platform` has already been validated against the supported table.
/// Implementations return the path of the produced file. A failed build may
/// leave a partial artifact behind; cleaning it up is not the caller's job.
pub trait BuildInvoker: Send + Sync {
    /// Build `platform`, embedding `version`.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] carrying the toolchain's diagnostics when the
    /// build cannot be started or fails.
    fn build(&self, platform: &Platform, version: &str) -> Result<PathBuf, BuildError>;
}

/// Cross-compiles the managed CLI with `go build`.
#[derive(Debug, Clone)]
pub struct GoToolchain {
    program: PathBuf,
    project_root: PathBuf,
    binaries_dir: PathBuf,
    product: String,
}

impl GoToolchain {
    pub fn new(
        project_root: impl Into<PathBuf>,
        binaries_dir: impl Into<PathBuf>,
        product: impl Into<String>,
    ) -> Self {
        Self {
            program: PathBuf::from("go"),
            project_root: project_root.into(),
            binaries_dir: binaries_dir.into(),
            product: product.into(),
        }
    }

    /// Use a specific toolchain executable instead of `go` from `PATH`.
    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.program = program.into();
        self
    }

    /// Where the binary for `platform` is written.
    pub fn output_path(&self, platform: &Platform) -> PathBuf {
        self.binaries_dir.join(platform.binary_name(&self.product))
    }

    fn command(&self, platform: &Platform, version: &str, output: &Path) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("build")
            .arg("-ldflags")
            .arg(format!("-X {VERSION_SYMBOL}={version}"))
            .arg("-o")
            .arg(output)
            .arg(".")
            .current_dir(&self.project_root)
            .env("GOOS", platform.goos)
            .env("GOARCH", platform.goarch)
            .env("CGO_ENABLED", "0");
        cmd
    }
}

impl BuildInvoker for GoToolchain {
    fn build(&self, platform: &Platform, version: &str) -> Result<PathBuf, BuildError> {
        let output_path = self.output_path(platform);
        std::fs::create_dir_all(&self.binaries_dir)?;

        tracing::info!(
            "Compiling {} ({version})",
            output_path.file_name().unwrap_or_default().to_string_lossy()
        );

        let output = self.command(platform, version, &output_path).output()?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!("Build for {platform} failed: {stderr}");
            return Err(BuildError::Failed {
                status: output.status.code(),
                stderr,
            });
        }

        if !output_path.is_file() {
            return Err(BuildError::MissingArtifact(output_path));
        }

        tracing::info!("Compiled {}", output_path.display());
        Ok(output_path)
    }
}
