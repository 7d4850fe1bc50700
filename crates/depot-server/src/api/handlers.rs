//! Route handlers.
//!
//! Core calls touch the filesystem and spawn the toolchain, so every one of
//! them runs on the blocking pool.

use axum::{
    Json,
    body::{Body, Bytes},
    extract::{Path, State},
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use depot_schema::ReleaseMetadata;
use std::sync::Arc;
use tokio_util::io::ReaderStream;

use crate::api::error::ApiError;
use crate::api::state::{ApiState, base_url};
use crate::api::types::{
    BuildAllResponse, BuildOneResponse, BuildRequest, ENDPOINTS, HealthResponse, IndexResponse,
};

/// `GET /` - service descriptor and endpoint catalog.
pub async fn index(State(state): State<Arc<ApiState>>) -> Result<Json<IndexResponse>, ApiError> {
    let service = format!(
        "{} Update Server (depot {})",
        state.releases.scanner().product(),
        crate::SERVER_VERSION
    );
    let version = tokio::task::spawn_blocking(move || state.releases.versions().resolve()).await?;

    Ok(Json(IndexResponse {
        service,
        version,
        endpoints: &ENDPOINTS,
    }))
}

/// `GET /latest` - stored release with a live asset list.
pub async fn latest(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
) -> Result<Json<ReleaseMetadata>, ApiError> {
    let base = base_url(&headers);
    let release = tokio::task::spawn_blocking(move || state.releases.latest(&base)).await??;
    Ok(Json(release))
}

/// `GET /download/:name` - stream a binary as an attachment.
pub async fn download(
    State(state): State<Arc<ApiState>>,
    Path(name): Path<String>,
) -> Result<Response, ApiError> {
    let not_found = || ApiError::NotFound(format!("Binary '{name}' not found"));

    let lookup = name.clone();
    let path = tokio::task::spawn_blocking(move || state.asset_path(&lookup))
        .await?
        .ok_or_else(not_found)?;
    let file = tokio::fs::File::open(&path).await.map_err(|_| not_found())?;
    let meta = file.metadata().await.map_err(ApiError::internal)?;
    if !meta.is_file() {
        return Err(not_found());
    }

    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{name}\""))
        .map_err(|_| not_found())?;

    let headers = [
        (
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        ),
        (header::CONTENT_LENGTH, HeaderValue::from(meta.len())),
        (header::CONTENT_DISPOSITION, disposition),
    ];

    Ok((headers, Body::from_stream(ReaderStream::new(file))).into_response())
}

/// `GET /health` - liveness, current version and binary count.
pub async fn health(State(state): State<Arc<ApiState>>) -> Result<Json<HealthResponse>, ApiError> {
    let (version, binaries) = tokio::task::spawn_blocking(move || {
        let version = state.releases.versions().resolve();
        state
            .releases
            .scanner()
            .count()
            .map(|binaries| (version, binaries))
    })
    .await??;

    Ok(Json(HealthResponse {
        status: "ok".into(),
        version,
        binaries,
    }))
}

/// `POST /build` - build all (or the listed) platforms, then update the
/// release. Failed platforms are left out of `built`.
pub async fn build_all(
    State(state): State<Arc<ApiState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<BuildAllResponse>, ApiError> {
    state.authorize(&headers)?;

    let request = parse_build_request(&body)?;
    let base = base_url(&headers);

    let summary = tokio::task::spawn_blocking(move || {
        state
            .releases
            .build_many(request.platforms.as_deref(), &base)
    })
    .await??;

    Ok(Json(BuildAllResponse {
        status: "success".into(),
        built: summary.built_ids().into_iter().map(String::from).collect(),
        version: summary.release.tag_name,
        assets_count: summary.release.assets.len(),
    }))
}

/// `POST /build/:platform` - build one platform, then update the release.
pub async fn build_one(
    State(state): State<Arc<ApiState>>,
    Path(platform): Path<String>,
    headers: HeaderMap,
) -> Result<Json<BuildOneResponse>, ApiError> {
    state.authorize(&headers)?;

    let base = base_url(&headers);
    let build =
        tokio::task::spawn_blocking(move || state.releases.build_platform(&platform, &base))
            .await??;

    let binary = build
        .binary
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();

    Ok(Json(BuildOneResponse {
        status: "success".into(),
        platform: build.platform.id.to_string(),
        binary,
        version: build.release.tag_name,
    }))
}

/// An empty or `null` body, `{}`, or a missing `platforms` field selects
/// every platform. Anything else must decode as a [`BuildRequest`].
fn parse_build_request(body: &[u8]) -> Result<BuildRequest, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(BuildRequest::default());
    }
    serde_json::from_slice::<Option<BuildRequest>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| ApiError::BadRequest(format!("Invalid build request: {e}")))
}
