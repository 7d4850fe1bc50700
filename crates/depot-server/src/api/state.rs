//! API server state management.

use axum::http::{HeaderMap, header};
use depot_core::ReleaseService;
use sha2::{Digest, Sha256};
use std::path::PathBuf;

use crate::api::error::ApiError;

/// Shared API server state.
#[derive(Debug)]
pub struct ApiState {
    /// Registry, metadata store and builder.
    pub releases: ReleaseService,
    /// Bearer token for build endpoints; `None` leaves them open.
    token: Option<String>,
}

impl ApiState {
    pub fn new(releases: ReleaseService, token: Option<String>) -> Self {
        Self { releases, token }
    }

    /// Check the `Authorization` header against the configured secret.
    ///
    /// Accepts `Bearer <token>` or the bare token. Always succeeds when no
    /// secret is configured.
    pub fn authorize(&self, headers: &HeaderMap) -> Result<(), ApiError> {
        let Some(expected) = self.token.as_deref() else {
            return Ok(());
        };

        let provided = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.strip_prefix("Bearer ").unwrap_or(v));

        if provided.is_some_and(|p| tokens_match(p, expected)) {
            Ok(())
        } else {
            tracing::warn!("rejected build request with missing or invalid token");
            Err(ApiError::Unauthorized("invalid token".into()))
        }
    }

    /// Resolve a download name to a file inside the binaries directory.
    ///
    /// See [`AssetScanner::resolve`](depot_core::AssetScanner::resolve).
    pub fn asset_path(&self, name: &str) -> Option<PathBuf> {
        self.releases.scanner().resolve(name)
    }
}

/// Compare two secrets in time independent of where they differ.
///
/// Both sides are hashed first, so the length of the secret does not leak
/// either.
fn tokens_match(provided: &str, expected: &str) -> bool {
    let a = Sha256::digest(provided.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// Origin the client used to reach us, e.g. `http://host:8080`.
///
/// Honors `X-Forwarded-Proto` / `X-Forwarded-Host` from a reverse proxy,
/// then the `Host` header.
pub fn base_url(headers: &HeaderMap) -> String {
    let scheme = first_value(headers, "x-forwarded-proto").unwrap_or("http");
    let host = first_value(headers, "x-forwarded-host")
        .or_else(|| first_value(headers, header::HOST.as_str()))
        .unwrap_or("localhost");

    format!("{scheme}://{host}")
}

/// First comma-separated entry of a header, if non-empty.
fn first_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}
