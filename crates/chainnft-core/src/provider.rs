//! The `NftProvider` trait — the capability every provider adapter implements.

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::model::{Chain, NftRecord};

/// A token listed by an ownership query, before metadata resolution.
///
/// Providers fill what they have: KAS supplies `token_uri` inline, Alchemy
/// and Moralis only the key. Absent fields are fetched later if needed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedToken {
    pub contract_address: String,
    pub token_id: String,
    pub owner: Option<String>,
    pub token_uri: Option<String>,
    pub balance: Option<String>,
}

impl OwnedToken {
    /// A bare key — the shape `get_one` starts from.
    pub fn from_key(contract_address: impl Into<String>, token_id: impl Into<String>) -> Self {
        Self {
            contract_address: contract_address.into(),
            token_id: token_id.into(),
            owner: None,
            token_uri: None,
            balance: None,
        }
    }
}

/// One page of owned tokens as returned by a provider.
#[derive(Debug, Clone, Default)]
pub struct OwnedTokenPage {
    /// Opaque upstream pagination token; `None` = last page.
    pub cursor: Option<String>,
    pub tokens: Vec<OwnedToken>,
}

/// The central async trait every provider adapter implements.
///
/// Adapters are stateless aside from held credentials and an HTTP client;
/// each instance is bound to exactly one [`Chain`].
///
/// # Thread Safety
/// Implementations must be `Send + Sync` for use across Tokio tasks.
#[async_trait]
pub trait NftProvider: Send + Sync {
    /// The network this adapter instance serves.
    fn chain(&self) -> Chain;

    /// Whether the upstream tolerates concurrent calls.
    ///
    /// Rate-limit-sensitive providers return `false` and the engine drives
    /// them strictly sequentially instead of through the worker pool.
    fn concurrent_safe(&self) -> bool {
        true
    }

    /// List one page of tokens held by `owner`. `cursor` is passed back
    /// verbatim from the previous page.
    async fn owned_tokens(
        &self,
        owner: &str,
        cursor: Option<&str>,
    ) -> Result<OwnedTokenPage, ProviderError>;

    /// Fetch and normalize the full metadata record for one token.
    async fn token_record(&self, token: &OwnedToken) -> Result<NftRecord, ProviderError>;

    /// Hint the upstream indexer to re-scan on-chain state for this token.
    ///
    /// Fire-and-forget: callers log a failure and continue — the hint never
    /// blocks the read path. Default is a no-op for providers without a
    /// refresh endpoint.
    async fn refresh_metadata(
        &self,
        _contract_address: &str,
        _token_id: &str,
    ) -> Result<(), ProviderError> {
        Ok(())
    }
}
