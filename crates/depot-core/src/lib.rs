pub mod builder;
#[cfg(feature = "network")]
pub mod client;
pub mod error;
pub mod hashing;
pub mod metadata;
pub mod release;
pub mod scanner;
pub mod version;

pub use builder::{BuildError, BuildInvoker, GoToolchain};
pub use error::{RegistryError, Result};
pub use metadata::MetadataStore;
pub use release::{BuildSummary, ReleaseService, SingleBuild};
pub use scanner::AssetScanner;
pub use version::VersionResolver;

/// User Agent string for outbound requests
pub const USER_AGENT: &str = concat!("depot/", env!("CARGO_PKG_VERSION"));
