//! Stamps `DEPOT_VERSION` into the server binary.
//!
//! Tagged builds report the tag without its leading `v`; untagged or
//! out-of-tree builds fall back to the crate version.

use std::path::Path;
use std::process::Command;

fn main() {
    let git_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../.git");
    for watched in ["HEAD", "refs/tags"] {
        println!("cargo:rerun-if-changed={}", git_dir.join(watched).display());
    }

    let version = describe_head().unwrap_or_else(|| env!("CARGO_PKG_VERSION").to_string());
    println!("cargo:rustc-env=DEPOT_VERSION={version}");
}

fn describe_head() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--always", "--dirty=-dev"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }

    let described = String::from_utf8(output.stdout).ok()?;
    let version = described.trim().trim_start_matches('v');
    (!version.is_empty()).then(|| version.to_string())
}
