//! Moralis deep-index adapter — BNB-chain family.
//!
//! <https://docs.moralis.io/reference/getwalletnfts>
//! <https://docs.moralis.io/reference/getnftmetadata>
//!
//! Moralis embeds the token JSON as a string in its `metadata` field when it
//! has already resolved the token URI itself; otherwise the adapter
//! dereferences `token_uri` through the content resolver. The service is
//! rate-limit sensitive, so [`NftProvider::concurrent_safe`] is `false` and
//! the engine drives it strictly sequentially.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

use chainnft_core::error::ProviderError;
use chainnft_core::model::{Chain, NftRecord};
use chainnft_core::normalize;
use chainnft_core::provider::{NftProvider, OwnedToken, OwnedTokenPage};
use chainnft_resolver::ContentResolver;

use crate::{decode, get_json, non_empty_cursor};

const PROVIDER: &str = "moralis";
const BASE_URL: &str = "https://deep-index.moralis.io/api/v2";

/// Owned-token page size requested from Moralis.
pub const PAGE_SIZE: u32 = 20;

/// BNB-chain networks, identified by Moralis chain slug.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoralisNetwork {
    BscMainnet,
    BscTestnet,
}

impl MoralisNetwork {
    /// The `chain` query-parameter value.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::BscMainnet => "bsc",
            Self::BscTestnet => "0x61",
        }
    }

    pub fn chain(&self) -> Chain {
        match self {
            Self::BscMainnet => Chain::Binance,
            Self::BscTestnet => Chain::BinanceTestnet,
        }
    }
}

/// Wallet NFT listing.
pub fn owned_tokens_url(owner: &str) -> String {
    format!("{BASE_URL}/{owner}/nft")
}

/// Single-token metadata.
pub fn token_metadata_url(contract_address: &str, token_id: &str) -> String {
    format!("{BASE_URL}/nft/{contract_address}/{token_id}")
}

// ─── Raw response shapes ──────────────────────────────────────────────────────

/// One NFT as Moralis describes it — the same shape serves both the wallet
/// listing and the single-token endpoint.
#[derive(Debug, Deserialize)]
struct RawNft {
    token_address: String,
    token_id: String,
    owner_of: Option<String>,
    amount: Option<String>,
    contract_type: Option<String>,
    name: Option<String>,
    token_uri: Option<String>,
    /// Token JSON pre-resolved by Moralis, as a string.
    metadata: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OwnedNftsResponse {
    cursor: Option<String>,
    #[serde(default)]
    result: Vec<RawNft>,
}

// ─── Adapter ──────────────────────────────────────────────────────────────────

/// Moralis adapter instance, bound to one BNB-chain network.
pub struct MoralisProvider {
    network: MoralisNetwork,
    api_key: String,
    http: reqwest::Client,
    resolver: Arc<ContentResolver>,
}

impl MoralisProvider {
    pub fn new(
        network: MoralisNetwork,
        api_key: impl Into<String>,
        resolver: Arc<ContentResolver>,
        timeout: Duration,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");
        Self {
            network,
            api_key: api_key.into(),
            http,
            resolver,
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .header("X-API-Key", &self.api_key)
            .query(&[("chain", self.network.slug())])
    }

    /// The token JSON: inline `metadata` string first, then the token URI,
    /// then a placeholder document when Moralis knows neither.
    async fn token_json(&self, raw: &RawNft) -> Result<Value, ProviderError> {
        if let Some(metadata) = raw.metadata.as_ref().filter(|m| !m.is_empty()) {
            return serde_json::from_str(metadata).map_err(|source| {
                ProviderError::Deserialization {
                    provider: PROVIDER,
                    source,
                }
            });
        }
        if let Some(uri) = raw.token_uri.as_ref().filter(|u| !u.is_empty()) {
            tracing::debug!(
                contract_address = %raw.token_address,
                token_id = %raw.token_id,
                "moralis metadata empty, dereferencing token_uri"
            );
            return Ok(self.resolver.resolve_json(uri).await?);
        }
        tracing::warn!(
            contract_address = %raw.token_address,
            token_id = %raw.token_id,
            "moralis has neither metadata nor token_uri"
        );
        Ok(serde_json::json!({
            "name": "No name",
            "image": null,
            "description": null,
            "attributes": []
        }))
    }

    async fn normalize(&self, raw: RawNft) -> Result<NftRecord, ProviderError> {
        let token_json = self.token_json(&raw).await?;

        let field = |key: &str| {
            token_json
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let name = normalize::token_name(
            field("name").as_deref(),
            raw.name.as_deref(),
            &raw.token_address,
            &raw.token_id,
        );
        let attributes = normalize::parse_attributes(
            token_json.get("attributes"),
            &raw.token_address,
            &raw.token_id,
        );
        let external_url = normalize::external_url(Some(&token_json), None);

        Ok(NftRecord {
            chain: self.network.chain(),
            contract_address: raw.token_address,
            token_id: raw.token_id,
            owner: raw.owner_of,
            token_type: raw.contract_type.unwrap_or_default(),
            name,
            description: field("description"),
            image: field("image"),
            animation_url: field("animation_url"),
            external_url,
            source_url: None,
            content_type: None,
            attributes,
            token_data: Some(token_json),
            cached: false,
        })
    }
}

#[async_trait]
impl NftProvider for MoralisProvider {
    fn chain(&self) -> Chain {
        self.network.chain()
    }

    /// Moralis throttles aggressively; the engine must not fan out.
    fn concurrent_safe(&self) -> bool {
        false
    }

    async fn owned_tokens(
        &self,
        owner: &str,
        cursor: Option<&str>,
    ) -> Result<OwnedTokenPage, ProviderError> {
        let limit = PAGE_SIZE.to_string();
        let mut query = vec![("format", "decimal"), ("limit", limit.as_str())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }
        let request = self.get(&owned_tokens_url(owner)).query(&query);
        let raw = get_json(PROVIDER, request, || format!("owner={owner}")).await?;
        let resp: OwnedNftsResponse = decode(PROVIDER, raw)?;

        let tokens = resp
            .result
            .into_iter()
            .map(|nft| OwnedToken {
                contract_address: nft.token_address,
                token_id: nft.token_id,
                owner: nft.owner_of.or_else(|| Some(owner.to_string())),
                token_uri: nft.token_uri,
                balance: nft.amount,
            })
            .collect();

        Ok(OwnedTokenPage {
            cursor: non_empty_cursor(resp.cursor),
            tokens,
        })
    }

    async fn token_record(&self, token: &OwnedToken) -> Result<NftRecord, ProviderError> {
        let request = self.get(&token_metadata_url(&token.contract_address, &token.token_id));
        let context = || {
            format!(
                "contract={} token={}",
                token.contract_address, token.token_id
            )
        };
        let raw = get_json(PROVIDER, request, context).await?;
        let nft: RawNft = decode(PROVIDER, raw)?;
        self.normalize(nft).await
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
