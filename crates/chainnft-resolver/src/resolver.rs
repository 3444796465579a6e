//! The content resolver.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde_json::Value;

use chainnft_core::error::ContentError;

const IPFS_SCHEME: &str = "ipfs://";
const DATA_JSON_PREFIX: &str = "data:application/json;base64";
const DATA_SVG_PREFIX: &str = "data:image/svg+xml;utf8,";

/// Public IPFS gateway mirrors, tried in order.
pub const DEFAULT_GATEWAYS: [&str; 4] = [
    "https://ipfs.io/ipfs/",
    "https://dweb.link/ipfs/",
    "https://gateway.ipfs.io/ipfs/",
    "https://cloudflare-ipfs.com/ipfs/",
];

/// Resolves token content URIs to JSON documents or raw bytes.
pub struct ContentResolver {
    gateways: Vec<String>,
    http: reqwest::Client,
}

impl ContentResolver {
    /// Create a resolver over the default public gateway list.
    ///
    /// `timeout` applies per attempt (each gateway try, each direct fetch)
    /// so one slow mirror cannot stall resolution.
    pub fn new(timeout: Duration) -> Self {
        Self::with_gateways(
            DEFAULT_GATEWAYS.iter().map(|g| g.to_string()).collect(),
            timeout,
        )
    }

    /// Create a resolver over a custom gateway list (tests, private mirrors).
    pub fn with_gateways(gateways: Vec<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");
        Self { gateways, http }
    }

    /// Resolve a URI expected to yield a JSON metadata document.
    pub async fn resolve_json(&self, uri: &str) -> Result<Value, ContentError> {
        if uri.starts_with(IPFS_SCHEME) {
            let bytes = self.fetch_ipfs(uri).await?;
            return parse_json(uri, &bytes);
        }
        if uri.starts_with(DATA_JSON_PREFIX) {
            let bytes = decode_base64_payload(uri)?;
            return parse_json(uri, &bytes);
        }
        if uri.starts_with("http://") || uri.starts_with("https://") {
            let bytes = self.fetch_http(uri).await?;
            return parse_json(uri, &bytes);
        }
        Err(ContentError::UnsupportedScheme { uri: uri.into() })
    }

    /// Resolve a URI to raw bytes (the media-mirroring path).
    ///
    /// Unlike [`resolve_json`](Self::resolve_json) this also accepts inline
    /// SVG payloads, which are handed to the caller as literal markup bytes.
    pub async fn resolve_bytes(&self, uri: &str) -> Result<Vec<u8>, ContentError> {
        if uri.starts_with(IPFS_SCHEME) {
            return self.fetch_ipfs(uri).await;
        }
        if uri.starts_with(DATA_JSON_PREFIX) {
            return decode_base64_payload(uri);
        }
        if uri.starts_with("http://") || uri.starts_with("https://") {
            return self.fetch_http(uri).await;
        }
        if let Some(svg) = uri.strip_prefix(DATA_SVG_PREFIX) {
            return Ok(svg.as_bytes().to_vec());
        }
        Err(ContentError::UnsupportedScheme { uri: uri.into() })
    }

    /// Try each gateway in order; any failure (connect, timeout, non-2xx)
    /// falls through to the next mirror.
    async fn fetch_ipfs(&self, uri: &str) -> Result<Vec<u8>, ContentError> {
        let path = uri.trim_start_matches(IPFS_SCHEME);
        for gateway in &self.gateways {
            let url = format!("{gateway}{path}");
            tracing::debug!(%url, "trying ipfs gateway");
            match self.fetch_once(&url).await {
                Ok(bytes) => return Ok(bytes),
                Err(reason) => {
                    tracing::warn!(%url, %reason, "ipfs gateway failed, trying next");
                }
            }
        }
        Err(ContentError::unavailable(uri, "all gateways failed"))
    }

    /// Direct HTTP fetch; URLs that carry an `/ipfs/` path segment get a
    /// second chance through the gateway mirrors.
    async fn fetch_http(&self, url: &str) -> Result<Vec<u8>, ContentError> {
        match self.fetch_once(url).await {
            Ok(bytes) => Ok(bytes),
            Err(reason) => {
                if let Some(path) = ipfs_path_of(url) {
                    tracing::debug!(%url, "http fetch failed, retrying as ipfs");
                    return self.fetch_ipfs(&format!("{IPFS_SCHEME}{path}")).await;
                }
                Err(ContentError::unavailable(url, reason))
            }
        }
    }

    async fn fetch_once(&self, url: &str) -> Result<Vec<u8>, String> {
        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        if !resp.status().is_success() {
            return Err(format!("HTTP {}", resp.status().as_u16()));
        }
        let bytes = resp.bytes().await.map_err(|e| e.to_string())?;
        Ok(bytes.to_vec())
    }
}

/// Extract the IPFS path from an HTTP gateway-shaped URL, if present.
fn ipfs_path_of(url: &str) -> Option<&str> {
    url.split_once("/ipfs/").map(|(_, path)| path)
}

fn decode_base64_payload(uri: &str) -> Result<Vec<u8>, ContentError> {
    let (_, payload) = uri
        .split_once(',')
        .ok_or_else(|| ContentError::unavailable(uri, "data URI without payload"))?;
    BASE64
        .decode(payload)
        .map_err(|e| ContentError::unavailable(uri, format!("base64 decode: {e}")))
}

fn parse_json(uri: &str, bytes: &[u8]) -> Result<Value, ContentError> {
    serde_json::from_slice(bytes)
        .map_err(|e| ContentError::unavailable(uri, format!("json parse: {e}")))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
