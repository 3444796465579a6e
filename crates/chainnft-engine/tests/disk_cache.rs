//! Engine + disk store: records survive process restarts and keep serving
//! from the cache without upstream calls.

use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chainnft_core::error::ProviderError;
use chainnft_core::model::{Chain, NftRecord};
use chainnft_core::provider::{NftProvider, OwnedToken, OwnedTokenPage};
use chainnft_engine::ChainEngine;
use chainnft_storage::DiskMetadataStore;

struct CountingProvider {
    fetch_calls: AtomicUsize,
}

impl CountingProvider {
    fn new() -> Self {
        Self {
            fetch_calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl NftProvider for CountingProvider {
    fn chain(&self) -> Chain {
        Chain::Polygon
    }

    async fn owned_tokens(
        &self,
        owner: &str,
        _cursor: Option<&str>,
    ) -> Result<OwnedTokenPage, ProviderError> {
        Ok(OwnedTokenPage {
            cursor: None,
            tokens: vec![OwnedToken {
                contract_address: "0xc0ffee".into(),
                token_id: "0x2a".into(),
                owner: Some(owner.to_string()),
                token_uri: None,
                balance: None,
            }],
        })
    }

    async fn token_record(&self, token: &OwnedToken) -> Result<NftRecord, ProviderError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(NftRecord {
            chain: Chain::Polygon,
            contract_address: token.contract_address.clone(),
            token_id: token.token_id.clone(),
            owner: token.owner.clone(),
            token_type: "ERC1155".into(),
            name: "Durable #42".into(),
            description: None,
            image: Some("ipfs://QmDurable/42.png".into()),
            animation_url: None,
            external_url: None,
            source_url: None,
            content_type: None,
            attributes: vec![],
            token_data: None,
            cached: false,
        })
    }
}

#[tokio::test]
async fn cache_survives_engine_restart() {
    let dir = tempfile::tempdir().unwrap();
    let provider = Arc::new(CountingProvider::new());

    // first "process": populates the disk store
    {
        let store = Arc::new(DiskMetadataStore::new(dir.path()));
        let engine = ChainEngine::new(provider.clone(), store, 5);
        let page = engine.owned_nfts("0xowner", None, false).await.unwrap();
        assert_eq!(page.nfts.len(), 1);
        assert!(!page.nfts[0].cached);
    }
    assert_eq!(provider.fetch_calls.load(Ordering::SeqCst), 1);

    // second "process": fresh engine over the same directory, no refetch
    {
        let store = Arc::new(DiskMetadataStore::new(dir.path()));
        let engine = ChainEngine::new(provider.clone(), store, 5);
        let record = engine.single_nft("0xc0ffee", "0x2a", false).await.unwrap();
        assert!(record.cached);
        assert_eq!(record.name, "Durable #42");
    }
    assert_eq!(provider.fetch_calls.load(Ordering::SeqCst), 1);
}
