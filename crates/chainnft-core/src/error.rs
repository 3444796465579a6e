//! Error taxonomy for the aggregation pipeline.
//!
//! The split mirrors how failures are handled: provider and content errors
//! are recoverable by dropping the affected item from a batch; service-level
//! errors surface to the request layer; config errors abort startup.

use thiserror::Error;

use crate::model::Chain;

/// An upstream indexing provider returned a failure. Variants carry the
/// provider name plus contract/token context so callers can decide whether
/// to skip-and-continue or abort.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Non-2xx upstream response.
    #[error("{provider} API error (status {status}): {context}")]
    Api {
        provider: &'static str,
        status: u16,
        context: String,
    },

    /// Request never produced a response (connection refused, timeout, TLS).
    #[error("{provider} request failed: {reason}")]
    Http {
        provider: &'static str,
        reason: String,
    },

    /// Response body could not be decoded into the expected shape.
    #[error("{provider} response decode error: {source}")]
    Deserialization {
        provider: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The token's declared content URI could not be dereferenced.
    #[error(transparent)]
    Content(#[from] ContentError),
}

impl ProviderError {
    /// Returns `true` when the upstream says the token does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Api { status: 404, .. })
    }
}

/// A token content URI could not be dereferenced.
#[derive(Debug, Error)]
pub enum ContentError {
    /// All transport attempts failed (gateway list exhausted, fetch error,
    /// or undecodable payload). Recoverable by dropping the item.
    #[error("content unavailable for {uri}: {reason}")]
    Unavailable { uri: String, reason: String },

    /// The URI scheme is not one the resolver understands.
    #[error("unsupported content URI scheme: {uri}")]
    UnsupportedScheme { uri: String },
}

impl ContentError {
    pub fn unavailable(uri: impl Into<String>, reason: impl ToString) -> Self {
        Self::Unavailable {
            uri: uri.into(),
            reason: reason.to_string(),
        }
    }
}

/// Metadata-store or object-store failure.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Startup-time configuration failure.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required credential variable is absent from the environment.
    #[error("missing environment variable: {0}")]
    MissingEnv(&'static str),
}

/// Engine/dispatcher-level errors surfaced to the request layer.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Caller requested a network no engine is wired for.
    #[error("unsupported chain: {0}")]
    UnsupportedChain(String),

    /// Single-token lookup: the token does not exist upstream and is not
    /// cached. Distinct from a fetch error by design.
    #[error("not found: {chain}/{contract_address}/{token_id}")]
    NotFound {
        chain: Chain,
        contract_address: String,
        token_id: String,
    },

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Content(#[from] ContentError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_404_is_not_found() {
        let err = ProviderError::Api {
            provider: "alchemy",
            status: 404,
            context: "contract=0xabc token=0x1".into(),
        };
        assert!(err.is_not_found());

        let err = ProviderError::Api {
            provider: "alchemy",
            status: 500,
            context: String::new(),
        };
        assert!(!err.is_not_found());
    }

    #[test]
    fn content_error_display() {
        let err = ContentError::unavailable("ipfs://QmABC", "all gateways failed");
        assert!(err.to_string().contains("ipfs://QmABC"));
        let err = ContentError::UnsupportedScheme {
            uri: "ftp://host/x".into(),
        };
        assert!(err.to_string().contains("ftp://"));
    }
}
