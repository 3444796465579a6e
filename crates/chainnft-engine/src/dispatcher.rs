//! Chain dispatcher — routes a chain-qualified request to its engine.

use std::collections::HashMap;
use std::sync::Arc;

use chainnft_core::error::ServiceError;
use chainnft_core::model::{Chain, NftRecord, OwnedNftPage};

use crate::engine::ChainEngine;

/// Static lookup table from chain to engine.
///
/// Purely a composition seam: no retries, no fallback. Request handlers ask
/// for a chain and get the wired engine or
/// [`ServiceError::UnsupportedChain`].
#[derive(Default)]
pub struct NftDispatcher {
    engines: HashMap<Chain, Arc<ChainEngine>>,
}

impl NftDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an engine under the chain it serves.
    pub fn with_engine(mut self, engine: Arc<ChainEngine>) -> Self {
        self.engines.insert(engine.chain(), engine);
        self
    }

    /// Chains that currently have an engine wired.
    pub fn chains(&self) -> Vec<Chain> {
        let mut chains: Vec<Chain> = self.engines.keys().copied().collect();
        chains.sort_by_key(|c| c.as_str());
        chains
    }

    /// Look up the engine for `chain`.
    pub fn route(&self, chain: Chain) -> Result<&Arc<ChainEngine>, ServiceError> {
        self.engines
            .get(&chain)
            .ok_or_else(|| ServiceError::UnsupportedChain(chain.to_string()))
    }

    /// One page of NFTs held by `owner` on `chain`.
    pub async fn owned_nfts(
        &self,
        chain: Chain,
        owner: &str,
        cursor: Option<&str>,
        resync: bool,
    ) -> Result<OwnedNftPage, ServiceError> {
        self.route(chain)?.owned_nfts(owner, cursor, resync).await
    }

    /// One NFT by `(chain, contract, token)` key.
    pub async fn single_nft(
        &self,
        chain: Chain,
        contract_address: &str,
        token_id: &str,
        resync: bool,
    ) -> Result<NftRecord, ServiceError> {
        self.route(chain)?
            .single_nft(contract_address, token_id, resync)
            .await
    }
}
