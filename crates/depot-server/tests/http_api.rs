//! In-process tests of the HTTP surface, with a fake toolchain.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use depot_core::{BuildError, BuildInvoker};
use depot_schema::{Platform, ReleaseMetadata};
use depot_server::ServerConfig;
use depot_server::api::{self, state::ApiState};
use http_body_util::BodyExt;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tempfile::TempDir;
use tower::ServiceExt;

/// Writes `<product>-<platform>` with a fixed payload instead of compiling.
struct FakeToolchain {
    binaries_dir: PathBuf,
    calls: AtomicUsize,
    fail: Option<&'static str>,
}

impl BuildInvoker for FakeToolchain {
    fn build(&self, platform: &Platform, version: &str) -> Result<PathBuf, BuildError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail == Some(platform.id) {
            return Err(BuildError::Failed {
                status: Some(1),
                stderr: "undefined: main.version".into(),
            });
        }
        std::fs::create_dir_all(&self.binaries_dir)?;
        let path = self.binaries_dir.join(platform.binary_name("00cli"));
        std::fs::write(&path, format!("{platform} {version}"))?;
        Ok(path)
    }
}

/// Test context with a temporary data directory and router.
struct TestContext {
    _temp_dir: TempDir,
    config: ServerConfig,
    toolchain: Arc<FakeToolchain>,
    app: Router,
}

impl TestContext {
    fn new(token: Option<&str>) -> Self {
        Self::with_failure(token, None)
    }

    fn with_failure(token: Option<&str>, fail: Option<&'static str>) -> Self {
        let temp_dir = TempDir::new().expect("failed to create temp dir");
        let mut config = ServerConfig::new(temp_dir.path(), temp_dir.path().join("src"));
        config.token = token.map(str::to_string);
        std::fs::create_dir_all(&config.binaries_dir).expect("failed to create binaries dir");

        let toolchain = Arc::new(FakeToolchain {
            binaries_dir: config.binaries_dir.clone(),
            calls: AtomicUsize::new(0),
            fail,
        });
        let service = config.release_service_with(toolchain.clone());
        let state = Arc::new(ApiState::new(service, config.token.clone()));

        Self {
            _temp_dir: temp_dir,
            app: api::create_router(state),
            config,
            toolchain,
        }
    }

    fn put_binary(&self, name: &str, data: &[u8]) {
        std::fs::write(self.config.binaries_dir.join(name), data).expect("failed to write binary");
    }

    fn metadata_written(&self) -> bool {
        Path::new(&self.config.metadata_path).exists()
    }

    fn build_calls(&self) -> usize {
        self.toolchain.calls.load(Ordering::SeqCst)
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
        let response = self.app.clone().oneshot(request).await.expect("request failed");
        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("failed to read body")
            .to_bytes()
            .to_vec();
        (status, headers, body)
    }

    async fn get(&self, uri: &str) -> (StatusCode, Vec<u8>) {
        let request = Request::get(uri)
            .header(header::HOST, "updates.test:9000")
            .body(Body::empty())
            .unwrap();
        let (status, _, body) = self.send(request).await;
        (status, body)
    }

    async fn post(&self, uri: &str, auth: Option<&str>, body: &str) -> (StatusCode, Value) {
        let mut builder = Request::post(uri)
            .header(header::HOST, "updates.test:9000")
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(auth) = auth {
            builder = builder.header(header::AUTHORIZATION, auth);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        let (status, _, body) = self.send(request).await;
        (status, serde_json::from_slice(&body).expect("response is not JSON"))
    }
}

fn sha256_hex(data: &[u8]) -> String {
    hex::encode(Sha256::digest(data))
}

#[tokio::test]
async fn latest_lists_binaries_with_request_origin() {
    let ctx = TestContext::new(None);
    ctx.put_binary("00cli-linux-amd64", &[0u8; 12]);
    ctx.put_binary("00cli-darwin-arm64", b"\xca\xfe\xba\xbe");
    ctx.put_binary("notes.txt", b"ignored");

    let (status, body) = ctx.get("/latest").await;
    assert_eq!(status, StatusCode::OK);

    let release: ReleaseMetadata = serde_json::from_slice(&body).unwrap();
    assert_eq!(release.assets.len(), 2);

    let darwin = &release.assets[0];
    assert_eq!(darwin.name, "00cli-darwin-arm64");
    assert_eq!(darwin.size, 4);
    assert_eq!(darwin.sha256.as_str(), sha256_hex(b"\xca\xfe\xba\xbe"));

    let linux = &release.assets[1];
    assert_eq!(linux.name, "00cli-linux-amd64");
    assert_eq!(linux.size, 12);
    assert_eq!(linux.sha256.as_str(), sha256_hex(&[0u8; 12]));

    for asset in &release.assets {
        assert_eq!(
            asset.browser_download_url,
            format!("http://updates.test:9000/download/{}", asset.name)
        );
    }
    assert_eq!(release.html_url.as_deref(), Some("http://updates.test:9000"));

    // Reading never creates the document.
    assert!(!ctx.metadata_written());
}

#[tokio::test]
async fn latest_with_corrupt_metadata_is_a_server_error() {
    let ctx = TestContext::new(None);
    std::fs::write(&ctx.config.metadata_path, "[1, 2").unwrap();

    let (status, body) = ctx.get("/latest").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);

    let error: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(error["code"], "INTERNAL_ERROR");
}

#[tokio::test]
async fn build_without_token_is_unauthorized() {
    let ctx = TestContext::new(Some("s3cr3t"));

    let (status, body) = ctx.post("/build", None, "").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _) = ctx.post("/build/linux-amd64", Some("Bearer wrong"), "").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    assert_eq!(ctx.build_calls(), 0);
    assert!(!ctx.metadata_written());
}

#[tokio::test]
async fn build_with_token_builds_every_platform() {
    let ctx = TestContext::new(Some("s3cr3t"));

    let (status, body) = ctx.post("/build", Some("Bearer s3cr3t"), "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "success");
    assert_eq!(body["assets_count"], 5);
    assert_eq!(body["version"], depot_schema::FALLBACK_VERSION);

    let built: Vec<&str> = body["built"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(built, Platform::ids());
    assert!(ctx.metadata_written());
}

#[tokio::test]
async fn bulk_build_reports_only_successful_platforms() {
    let ctx = TestContext::with_failure(None, Some("darwin-amd64"));

    let (status, body) = ctx
        .post(
            "/build",
            None,
            r#"{"platforms": ["darwin-amd64", "linux-arm64", "riscv64-plan9"]}"#,
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["built"], serde_json::json!(["linux-arm64"]));
    assert_eq!(body["assets_count"], 1);
    assert_eq!(ctx.build_calls(), 2);
}

#[tokio::test]
async fn malformed_build_body_is_a_bad_request() {
    let ctx = TestContext::new(None);

    for body in [r#"{"platforms": "linux-amd64"}"#, "linux-amd64", r#"{"platforms": ["#] {
        let (status, response) = ctx.post("/build", None, body).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
        assert_eq!(response["code"], "BAD_REQUEST", "{body}");
    }

    assert_eq!(ctx.build_calls(), 0);
    assert!(!ctx.metadata_written());
}

#[tokio::test]
async fn empty_json_build_body_builds_every_platform() {
    let ctx = TestContext::new(None);

    let (status, body) = ctx.post("/build", None, "{}").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assets_count"], 5);
    assert_eq!(ctx.build_calls(), 5);
}

#[tokio::test]
async fn unsupported_platform_is_a_bad_request() {
    let ctx = TestContext::new(None);

    let (status, body) = ctx.post("/build/riscv64-plan9", None, "").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let message = body["error"].as_str().unwrap();
    for id in Platform::ids() {
        assert!(message.contains(id), "{message}");
    }
    assert_eq!(ctx.build_calls(), 0);
    assert!(!ctx.metadata_written());
}

#[tokio::test]
async fn single_platform_build_updates_release() {
    let ctx = TestContext::new(None);

    let (status, body) = ctx.post("/build/windows-amd64", None, "").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["platform"], "windows-amd64");
    assert_eq!(body["binary"], "00cli-windows-amd64.exe");
    assert!(ctx.metadata_written());

    let (_, latest) = ctx.get("/latest").await;
    let release: ReleaseMetadata = serde_json::from_slice(&latest).unwrap();
    assert_eq!(release.tag_name, body["version"].as_str().unwrap());
    assert_eq!(release.assets.len(), 1);
}

#[tokio::test]
async fn single_platform_build_failure_is_a_server_error() {
    let ctx = TestContext::with_failure(None, Some("linux-amd64"));

    let (status, body) = ctx.post("/build/linux-amd64", None, "").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("linux-amd64"));
    assert!(!ctx.metadata_written());
}

#[tokio::test]
async fn download_streams_binary_as_attachment() {
    let ctx = TestContext::new(None);
    ctx.put_binary("00cli-linux-arm64", b"binary payload");

    let request = Request::get("/download/00cli-linux-arm64")
        .body(Body::empty())
        .unwrap();
    let (status, headers, body) = ctx.send(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"binary payload");
    assert_eq!(
        headers[header::CONTENT_DISPOSITION],
        "attachment; filename=\"00cli-linux-arm64\""
    );
    assert_eq!(headers[header::CONTENT_LENGTH], "14");
}

#[tokio::test]
async fn download_rejects_missing_and_escaping_names() {
    let ctx = TestContext::new(None);
    ctx.put_binary("readme.txt", b"not an asset");
    std::fs::write(&ctx.config.metadata_path, "{}").unwrap();

    for uri in [
        "/download/00cli-linux-amd64",
        "/download/readme.txt",
        "/download/..%2Fmetadata.json",
        "/download/%2Fetc%2Fpasswd",
        "/download/..",
    ] {
        let (status, body) = ctx.get(uri).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{uri}");
        let error: Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(error["code"], "NOT_FOUND", "{uri}");
    }
}

#[cfg(unix)]
#[tokio::test]
async fn download_does_not_follow_links_out_of_the_directory() {
    let ctx = TestContext::new(None);
    let outside = TempDir::new().unwrap();
    std::fs::write(outside.path().join("id_rsa"), b"private").unwrap();
    std::os::unix::fs::symlink(
        outside.path().join("id_rsa"),
        ctx.config.binaries_dir.join("00cli-linux-amd64"),
    )
    .unwrap();

    let (status, _) = ctx.get("/download/00cli-linux-amd64").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = ctx.get("/latest").await;
    let release: ReleaseMetadata = serde_json::from_slice(&body).unwrap();
    assert!(release.assets.is_empty());
}

#[tokio::test]
async fn health_counts_matching_binaries() {
    let ctx = TestContext::new(None);
    ctx.put_binary("00cli-linux-amd64", b"a");
    ctx.put_binary("00cli-darwin-amd64", b"b");
    ctx.put_binary("other", b"c");

    let (status, body) = ctx.get("/health").await;
    assert_eq!(status, StatusCode::OK);

    let health: Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(health["status"], "ok");
    assert_eq!(health["binaries"], 2);
    assert_eq!(health["version"], depot_schema::FALLBACK_VERSION);
}

#[tokio::test]
async fn index_describes_endpoints() {
    let ctx = TestContext::new(None);

    let (status, body) = ctx.get("/").await;
    assert_eq!(status, StatusCode::OK);

    let index: Value = serde_json::from_slice(&body).unwrap();
    assert!(index["service"].as_str().unwrap().starts_with("00cli"));
    let paths: Vec<&str> = index["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["path"].as_str().unwrap())
        .collect();
    assert!(paths.contains(&"/latest"));
    assert!(paths.contains(&"/build/<platform>"));
}
