//! Shared types for the depot release server.
//!
//! Everything here is plain data: the persisted release document, the asset
//! records served to clients, and the static table of build targets. No I/O
//! happens in this crate.

pub mod hash;
pub mod platform;
pub mod release;

// Re-exports
pub use hash::*;
pub use platform::*;
pub use release::*;

/// Version reported when the source tree carries no usable git history.
pub const FALLBACK_VERSION: &str = "v0.1.0";

/// Default binary-name prefix of the managed product.
pub const DEFAULT_PRODUCT: &str = "00cli";
