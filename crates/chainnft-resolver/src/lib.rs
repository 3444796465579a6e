//! chainnft-resolver — dereferences token content URIs.
//!
//! Token URIs are creator-supplied and wildly inconsistent in practice:
//! HTTP(S) URLs, `ipfs://` URIs, base64-embedded JSON blobs, raw inline SVG.
//! The resolver degrades gracefully across transports instead of failing a
//! whole batch on one bad URI.
//!
//! Dispatch precedence:
//! 1. `ipfs://…` — ordered public-gateway mirror list, next-on-failure
//! 2. `data:application/json;base64,…` — inline JSON, no network
//! 3. `http(s)://…` — direct fetch; URLs with an `/ipfs/` path segment are
//!    retried through the gateway list when the direct fetch fails
//! 4. `data:image/svg+xml;utf8,…` — literal SVG markup (binary path only)

mod resolver;

pub use resolver::{ContentResolver, DEFAULT_GATEWAYS};
