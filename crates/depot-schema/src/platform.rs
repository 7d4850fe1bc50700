//! Supported build targets.
//!
//! The table is fixed at compile time. Each entry maps a platform identifier
//! such as `linux-amd64` to the `GOOS`/`GOARCH` pair handed to the toolchain
//! and the filename suffix the resulting executable needs.
//!
//! # Example
//!
//! ```
//! use depot_schema::Platform;
//!
//! let windows = Platform::lookup("windows-amd64").unwrap();
//! assert_eq!(windows.binary_name("00cli"), "00cli-windows-amd64.exe");
//! assert!(Platform::lookup("riscv64-plan9").is_none());
//! ```

/// One supported build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Platform {
    /// Platform identifier (`<os>-<arch>`).
    pub id: &'static str,
    /// Toolchain target operating system.
    pub goos: &'static str,
    /// Toolchain target architecture.
    pub goarch: &'static str,
    /// Required executable suffix (empty on Unix targets).
    pub ext: &'static str,
}

/// Every platform the server knows how to build, in display order.
pub static PLATFORMS: [Platform; 5] = [
    Platform::new("linux-amd64", "linux", "amd64", ""),
    Platform::new("linux-arm64", "linux", "arm64", ""),
    Platform::new("darwin-amd64", "darwin", "amd64", ""),
    Platform::new("darwin-arm64", "darwin", "arm64", ""),
    Platform::new("windows-amd64", "windows", "amd64", ".exe"),
];

impl Platform {
    const fn new(
        id: &'static str,
        goos: &'static str,
        goarch: &'static str,
        ext: &'static str,
    ) -> Self {
        Self {
            id,
            goos,
            goarch,
            ext,
        }
    }

    /// Find a platform by identifier. Matching is exact.
    pub fn lookup(id: &str) -> Option<&'static Platform> {
        PLATFORMS.iter().find(|p| p.id == id)
    }

    /// All supported platforms.
    pub fn all() -> &'static [Platform] {
        &PLATFORMS
    }

    /// Identifiers of all supported platforms, in table order.
    pub fn ids() -> Vec<&'static str> {
        PLATFORMS.iter().map(|p| p.id).collect()
    }

    /// File name of this platform's executable: `<product>-<id><ext>`.
    pub fn binary_name(&self, product: &str) -> String {
        format!("{product}-{}{}", self.id, self.ext)
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.id)
    }
}
