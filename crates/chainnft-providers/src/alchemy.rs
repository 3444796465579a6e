//! Alchemy NFT API adapter — Ethereum and Polygon families.
//!
//! <https://docs.alchemy.com/reference/getnfts>
//! <https://docs.alchemy.com/reference/getnftmetadata>

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use chainnft_core::error::ProviderError;
use chainnft_core::model::{Chain, NftRecord};
use chainnft_core::normalize;
use chainnft_core::provider::{NftProvider, OwnedToken, OwnedTokenPage};

use crate::{decode, get_json, non_empty_cursor};

const PROVIDER: &str = "alchemy";

/// Networks served through Alchemy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlchemyNetwork {
    EthMainnet,
    EthGoerli,
    PolygonMainnet,
    PolygonMumbai,
}

impl AlchemyNetwork {
    /// Alchemy's subdomain slug for this network.
    pub fn slug(&self) -> &'static str {
        match self {
            Self::EthMainnet => "eth-mainnet",
            Self::EthGoerli => "eth-goerli",
            Self::PolygonMainnet => "polygon-mainnet",
            Self::PolygonMumbai => "polygon-mumbai",
        }
    }

    /// The canonical chain this network maps to.
    pub fn chain(&self) -> Chain {
        match self {
            Self::EthMainnet => Chain::Ethereum,
            Self::EthGoerli => Chain::EthereumGoerli,
            Self::PolygonMainnet => Chain::Polygon,
            Self::PolygonMumbai => Chain::PolygonMumbai,
        }
    }
}

/// URL of an NFT API method for the given network and key.
pub fn nft_api_url(network: AlchemyNetwork, api_key: &str, method: &str) -> String {
    format!(
        "https://{}.g.alchemy.com/nft/v2/{api_key}/{method}",
        network.slug()
    )
}

// ─── Raw response shapes ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawContractRef {
    address: String,
}

#[derive(Debug, Deserialize)]
struct RawTokenIdRef {
    #[serde(rename = "tokenId")]
    token_id: String,
    #[serde(rename = "tokenMetadata")]
    token_metadata: Option<RawTokenStandard>,
}

#[derive(Debug, Deserialize)]
struct RawTokenStandard {
    #[serde(rename = "tokenType")]
    token_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOwnedNft {
    contract: RawContractRef,
    id: RawTokenIdRef,
    balance: Option<Value>,
}

/// `getNFTs` response.
#[derive(Debug, Deserialize)]
struct OwnedNftsResponse {
    #[serde(rename = "ownedNfts", default)]
    owned_nfts: Vec<RawOwnedNft>,
    #[serde(rename = "pageKey")]
    page_key: Option<String>,
}

/// `getNFTMetadata` response. `metadata` stays a raw [`Value`] so unmodeled
/// fields survive into the record's `token_data` passthrough.
#[derive(Debug, Deserialize)]
struct NftMetadataResponse {
    id: Option<RawTokenIdRef>,
    metadata: Option<Value>,
    #[serde(rename = "contractMetadata")]
    contract_metadata: Option<Value>,
}

// ─── Adapter ──────────────────────────────────────────────────────────────────

/// Alchemy adapter instance, bound to one network.
pub struct AlchemyProvider {
    network: AlchemyNetwork,
    api_key: String,
    http: reqwest::Client,
}

impl AlchemyProvider {
    pub fn new(network: AlchemyNetwork, api_key: impl Into<String>, timeout: Duration) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");
        Self {
            network,
            api_key: api_key.into(),
            http,
        }
    }

    fn method_url(&self, method: &str) -> String {
        nft_api_url(self.network, &self.api_key, method)
    }

    /// Map one `getNFTMetadata` response into the canonical record.
    fn normalize(&self, contract_address: &str, token_id: &str, resp: NftMetadataResponse) -> NftRecord {
        let metadata = resp.metadata.unwrap_or(Value::Null);
        let contract_meta = resp.contract_metadata.unwrap_or(Value::Null);

        let field = |v: &Value, key: &str| {
            v.get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let name = normalize::token_name(
            field(&metadata, "name").as_deref(),
            field(&contract_meta, "name").as_deref(),
            contract_address,
            token_id,
        );

        let token_type = resp
            .id
            .and_then(|id| id.token_metadata)
            .and_then(|tm| tm.token_type)
            .unwrap_or_else(|| {
                tracing::warn!(contract_address, token_id, "alchemy token_type missing");
                String::new()
            });

        let attributes =
            normalize::parse_attributes(metadata.get("attributes"), contract_address, token_id);
        let external_url =
            normalize::external_url(Some(&metadata), field(&contract_meta, "external_url").as_deref());

        NftRecord {
            chain: self.network.chain(),
            contract_address: contract_address.to_string(),
            token_id: token_id.to_string(),
            owner: None,
            token_type,
            name,
            description: field(&metadata, "description"),
            image: field(&metadata, "image"),
            animation_url: field(&metadata, "animation_url"),
            external_url,
            source_url: None,
            content_type: None,
            attributes,
            token_data: (!metadata.is_null()).then_some(metadata),
            cached: false,
        }
    }
}

#[async_trait]
impl NftProvider for AlchemyProvider {
    fn chain(&self) -> Chain {
        self.network.chain()
    }

    async fn owned_tokens(
        &self,
        owner: &str,
        cursor: Option<&str>,
    ) -> Result<OwnedTokenPage, ProviderError> {
        let mut query = vec![("owner", owner), ("withMetadata", "false")];
        if let Some(page_key) = cursor {
            query.push(("pageKey", page_key));
        }
        let request = self.http.get(self.method_url("getNFTs")).query(&query);
        let raw = get_json(PROVIDER, request, || format!("owner={owner}")).await?;
        let resp: OwnedNftsResponse = decode(PROVIDER, raw)?;

        let tokens = resp
            .owned_nfts
            .into_iter()
            .map(|nft| OwnedToken {
                contract_address: nft.contract.address,
                token_id: nft.id.token_id,
                owner: Some(owner.to_string()),
                token_uri: None,
                balance: nft.balance.map(|b| match b {
                    Value::String(s) => s,
                    other => other.to_string(),
                }),
            })
            .collect();

        Ok(OwnedTokenPage {
            cursor: non_empty_cursor(resp.page_key),
            tokens,
        })
    }

    async fn token_record(&self, token: &OwnedToken) -> Result<NftRecord, ProviderError> {
        let request = self.http.get(self.method_url("getNFTMetadata")).query(&[
            ("contractAddress", token.contract_address.as_str()),
            ("tokenId", token.token_id.as_str()),
        ]);
        let context = || {
            format!(
                "contract={} token={}",
                token.contract_address, token.token_id
            )
        };
        let raw = get_json(PROVIDER, request, context).await?;
        let resp: NftMetadataResponse = decode(PROVIDER, raw)?;

        let mut record = self.normalize(&token.contract_address, &token.token_id, resp);
        record.owner = token.owner.clone();
        Ok(record)
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────
