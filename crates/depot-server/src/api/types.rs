//! Request and response bodies.

use serde::{Deserialize, Serialize};

/// Service descriptor returned by `GET /`.
#[derive(Debug, Serialize)]
pub struct IndexResponse {
    pub service: String,
    pub version: String,
    pub endpoints: &'static [EndpointInfo],
}

#[derive(Debug, Serialize)]
pub struct EndpointInfo {
    pub method: &'static str,
    pub path: &'static str,
    pub description: &'static str,
}

/// Route catalog, in display order.
pub static ENDPOINTS: [EndpointInfo; 5] = [
    EndpointInfo {
        method: "GET",
        path: "/latest",
        description: "Latest release with downloadable assets",
    },
    EndpointInfo {
        method: "GET",
        path: "/download/<binary>",
        description: "Download a specific binary",
    },
    EndpointInfo {
        method: "GET",
        path: "/health",
        description: "Health check",
    },
    EndpointInfo {
        method: "POST",
        path: "/build",
        description: "Build binaries (all, or {\"platforms\": [...]}) and update the release",
    },
    EndpointInfo {
        method: "POST",
        path: "/build/<platform>",
        description: "Build one platform and update the release",
    },
];

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub binaries: usize,
}

/// Optional body of `POST /build`.
#[derive(Debug, Default, Deserialize)]
pub struct BuildRequest {
    #[serde(default)]
    pub platforms: Option<Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BuildAllResponse {
    pub status: String,
    pub built: Vec<String>,
    pub version: String,
    pub assets_count: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct BuildOneResponse {
    pub status: String,
    pub platform: String,
    pub binary: String,
    pub version: String,
}
