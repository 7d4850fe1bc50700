//! depot - release distribution server
#![allow(missing_docs)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::doc_markdown)]
//!
//! Publishes platform-specific binaries of a command-line tool over HTTP,
//! describes the current release in a GitHub-compatible JSON document, and
//! rebuilds binaries on demand with the Go toolchain.
//!
//! # Directory Layout
//!
//! ```text
//! <data-dir>/
//! ├── binaries/       # <product>-<platform>[.exe], one per target
//! └── metadata.json   # current release document
//! ```

pub mod api;
pub mod cmd;
pub mod config;

pub use config::ServerConfig;

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Version of this server, derived from git tags at build time.
pub const SERVER_VERSION: &str = env!("DEPOT_VERSION");

#[derive(Debug, Parser)]
#[command(name = "depot")]
#[command(author, version = SERVER_VERSION, about = "depot - release distribution server")]
pub struct Cli {
    #[command(flatten)]
    pub serve: ServeArgs,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Options for serving (and for build-only mode).
#[derive(Debug, Clone, Args)]
pub struct ServeArgs {
    /// Address to bind
    #[arg(long, env = "DEPOT_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "DEPOT_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Only build binaries and update the release (do not start the server)
    #[arg(long)]
    pub build: bool,

    /// Directory holding `binaries/` and `metadata.json`
    #[arg(long, env = "DEPOT_DATA_DIR", default_value = ".")]
    pub data_dir: PathBuf,

    /// Source tree that is built and versioned
    #[arg(long, env = "DEPOT_PROJECT_ROOT", default_value = "..")]
    pub project_root: PathBuf,

    /// Binary-name prefix of the managed product
    #[arg(long, env = "DEPOT_PRODUCT", default_value = depot_schema::DEFAULT_PRODUCT)]
    pub product: String,

    /// Base URL written into the release by build-only mode
    #[arg(long, env = "DEPOT_BASE_URL", default_value = "http://localhost:8080")]
    pub base_url: String,

    /// Shared secret required by the build endpoints
    #[arg(long, env = "UPDATE_SERVER_TOKEN", hide_env_values = true)]
    pub token: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Print the SHA256 of files
    Hash {
        /// Files to hash
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Ask a depot server whether a newer release is published
    Check {
        /// Server base URL
        #[arg(long, env = "DEPOT_UPDATE_SERVER")]
        server: String,
        /// Locally installed version
        #[arg(long)]
        current: String,
    },
}
