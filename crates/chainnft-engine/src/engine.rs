//! Per-network cache-aside resolution engine.

use std::sync::Arc;

use tokio::sync::Semaphore;

use chainnft_core::error::ServiceError;
use chainnft_core::model::{Chain, NftRecord, OwnedNftPage};
use chainnft_core::provider::{NftProvider, OwnedToken};
use chainnft_core::store::MetadataStore;

/// Default worker-pool width for per-token resolution within one page.
pub const DEFAULT_CONCURRENCY: usize = 5;

/// Cache-aside engine for one network.
///
/// For each token the engine decides cache-hit vs. upstream-fetch, resolves
/// tokens of a page concurrently (bounded), and writes fresh results back to
/// the store. The semaphore is created once at construction — one place to
/// size the pool and to enforce the sequential-only provider exception.
pub struct ChainEngine {
    chain: Chain,
    provider: Arc<dyn NftProvider>,
    store: Arc<dyn MetadataStore>,
    limiter: Semaphore,
}

impl std::fmt::Debug for ChainEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainEngine")
            .field("chain", &self.chain)
            .finish_non_exhaustive()
    }
}

impl ChainEngine {
    pub fn new(
        provider: Arc<dyn NftProvider>,
        store: Arc<dyn MetadataStore>,
        concurrency: usize,
    ) -> Self {
        Self {
            chain: provider.chain(),
            provider,
            store,
            limiter: Semaphore::new(concurrency.max(1)),
        }
    }

    /// The network this engine serves.
    pub fn chain(&self) -> Chain {
        self.chain
    }

    /// One page of NFTs held by `owner`.
    ///
    /// The ownership listing itself failing fails the call; a single token
    /// failing to resolve only drops that token from the page. All tokens of
    /// the page are attempted; no ordering is guaranteed beyond that.
    pub async fn owned_nfts(
        &self,
        owner: &str,
        cursor: Option<&str>,
        resync: bool,
    ) -> Result<OwnedNftPage, ServiceError> {
        let page = self.provider.owned_tokens(owner, cursor).await?;
        let total = page.tokens.len();

        let resolved: Vec<Option<NftRecord>> = if self.provider.concurrent_safe() {
            let tasks = page
                .tokens
                .iter()
                .map(|token| self.resolve_limited(token, resync));
            futures::future::join_all(tasks).await
        } else {
            // Rate-limit-sensitive upstream: strictly one call in flight.
            let mut out = Vec::with_capacity(total);
            for token in &page.tokens {
                out.push(self.resolve_dropping(token, resync).await);
            }
            out
        };

        let nfts: Vec<NftRecord> = resolved.into_iter().flatten().collect();
        tracing::debug!(
            chain = %self.chain,
            owner,
            total,
            resolved = nfts.len(),
            "ownership page resolved"
        );
        Ok(OwnedNftPage {
            cursor: page.cursor,
            nfts,
        })
    }

    /// One NFT by key. Unlike the batch path, upstream failure propagates;
    /// an upstream 404 surfaces as [`ServiceError::NotFound`].
    pub async fn single_nft(
        &self,
        contract_address: &str,
        token_id: &str,
        resync: bool,
    ) -> Result<NftRecord, ServiceError> {
        let token = OwnedToken::from_key(contract_address, token_id);
        match self.resolve(&token, resync).await {
            Err(ServiceError::Provider(e)) if e.is_not_found() => {
                Err(ServiceError::NotFound {
                    chain: self.chain,
                    contract_address: contract_address.to_string(),
                    token_id: token_id.to_string(),
                })
            }
            other => other,
        }
    }

    async fn resolve_limited(&self, token: &OwnedToken, resync: bool) -> Option<NftRecord> {
        let _permit = self
            .limiter
            .acquire()
            .await
            .expect("resolution semaphore closed");
        self.resolve_dropping(token, resync).await
    }

    /// Batch-path wrapper: swallow the error, log, drop the token.
    async fn resolve_dropping(&self, token: &OwnedToken, resync: bool) -> Option<NftRecord> {
        match self.resolve(token, resync).await {
            Ok(record) => Some(record),
            Err(e) => {
                tracing::warn!(
                    chain = %self.chain,
                    contract_address = %token.contract_address,
                    token_id = %token.token_id,
                    error = %e,
                    "dropping token from page"
                );
                None
            }
        }
    }

    /// The cache-or-fetch decision for one token.
    async fn resolve(&self, token: &OwnedToken, resync: bool) -> Result<NftRecord, ServiceError> {
        if !resync {
            if let Some(record) = self
                .store
                .get(self.chain, &token.contract_address, &token.token_id)
                .await?
            {
                return Ok(record); // store hands it back with cached = true
            }
        }
        self.fetch_fresh(token).await
    }

    /// Upstream fetch + store overwrite. Issues the provider's re-scan hint
    /// first; the hint failing never blocks the fetch.
    async fn fetch_fresh(&self, token: &OwnedToken) -> Result<NftRecord, ServiceError> {
        if let Err(e) = self
            .provider
            .refresh_metadata(&token.contract_address, &token.token_id)
            .await
        {
            tracing::warn!(
                chain = %self.chain,
                contract_address = %token.contract_address,
                token_id = %token.token_id,
                error = %e,
                "metadata refresh hint failed"
            );
        }

        let mut record = self.provider.token_record(token).await?;
        record.cached = false;
        self.store.put(&record).await?;
        Ok(record)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
