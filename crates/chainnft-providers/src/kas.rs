//! KAS (Klaytn API Service) token-history adapter — Klaytn family.
//!
//! <https://refs.klaytnapi.com/ko/tokenhistory/latest>
//!
//! KAS lists owned tokens with the token URI inline; the adapter dereferences
//! that URI through the content resolver to build the record. Multi-token
//! URIs carrying the literal `{id}` placeholder get the decimal rendering of
//! the hex token id substituted in before dereferencing.

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

const PROVIDER: &str = "kas";
const BASE_URL: &str = "https://th-api.klaytnapi.com/v2";

/// Owned-token page size requested from KAS.
pub const PAGE_SIZE: u32 = 20;

/// Klaytn networks, identified by KAS chain id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KasNetwork {
    Cypress,
    Baobab,
}

impl KasNetwork {
    /// The `x-chain-id` header value.
    pub fn chain_id(&self) -> &'static str {
        match self {
            Self::Cypress => "8217",
            Self::Baobab => "1001",
        }
    }

    pub fn chain(&self) -> Chain {
        match self {
            Self::Cypress => Chain::Klaytn,
            Self::Baobab => Chain::KlaytnBaobab,
        }
    }
}

/// Tokens held by an account.
pub fn owned_tokens_url(owner: &str) -> String {
    format!("{BASE_URL}/account/{owner}/token")
}

/// One NFT by contract + token id.
pub fn token_url(contract_address: &str, token_id: &str) -> String {
    format!("{BASE_URL}/contract/nft/{contract_address}/token/{token_id}")
}

/// NFT contract profile.
pub fn contract_url(contract_address: &str) -> String {
    format!("{BASE_URL}/contract/nft/{contract_address}")
}

/// Token metadata refresh (PUT).
pub fn refresh_url(contract_address: &str, token_id: &str) -> String {
    format!("{BASE_URL}/contract/nft/{contract_address}/token/{token_id}/metadata")
}

// ─── Raw response shapes ──────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawExtras {
    #[serde(rename = "tokenId")]
    token_id: String,
    #[serde(rename = "tokenUri")]
    token_uri: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawOwnedItem {
    #[serde(rename = "contractAddress")]
    contract_address: String,
    balance: Option<String>,
    extras: RawExtras,
}

#[derive(Debug, Deserialize)]
struct OwnedTokensResponse {
    cursor: Option<String>,
    #[serde(default)]
    items: Vec<RawOwnedItem>,
}

/// Single-token lookup.
#[derive(Debug, Deserialize)]
struct NftTokenResponse {
    #[serde(rename = "tokenUri")]
    token_uri: Option<String>,
    owner: Option<String>,
}

/// Contract profile — supplies the token standard and the name fallback.
#[derive(Debug, Deserialize)]
struct NftContractResponse {
    name: Option<String>,
    #[serde(rename = "type")]
    token_type: Option<String>,
}

// ─── Adapter ──────────────────────────────────────────────────────────────────

/// KAS adapter instance, bound to one Klaytn network.
pub struct KasProvider {
    network: KasNetwork,
    access_key_id: String,
    secret_access_key: String,
    http: reqwest::Client,
    resolver: Arc<ContentResolver>,
}

impl KasProvider {
    pub fn new(
        network: KasNetwork,
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        resolver: Arc<ContentResolver>,
        timeout: Duration,
    ) -> Self {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .expect("failed to build reqwest client");
        Self {
            network,
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            http,
            resolver,
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        self.http
            .get(url)
            .basic_auth(&self.access_key_id, Some(&self.secret_access_key))
            .header("x-chain-id", self.network.chain_id())
    }

    async fn contract_profile(
        &self,
        contract_address: &str,
    ) -> Result<NftContractResponse, ProviderError> {
        let raw = get_json(PROVIDER, self.get(&contract_url(contract_address)), || {
            format!("contract={contract_address}")
        })
        .await?;
        decode(PROVIDER, raw)
    }

    /// Token URI from the listing when present, otherwise the single-token
    /// endpoint (the `get_one` path starts from a bare key).
    async fn token_uri(&self, token: &OwnedToken) -> Result<(String, Option<String>), ProviderError> {
        if let Some(uri) = token.token_uri.as_ref().filter(|u| !u.is_empty()) {
            return Ok((uri.clone(), token.owner.clone()));
        }
        let raw = get_json(
            PROVIDER,
            self.get(&token_url(&token.contract_address, &token.token_id)),
            || {
                format!(
                    "contract={} token={}",
                    token.contract_address, token.token_id
                )
            },
        )
        .await?;
        let resp: NftTokenResponse = decode(PROVIDER, raw)?;
        let uri = resp.token_uri.filter(|u| !u.is_empty()).ok_or_else(|| {
            ProviderError::Api {
                provider: PROVIDER,
                status: 404,
                context: format!(
                    "empty tokenUri for contract={} token={}",
                    token.contract_address, token.token_id
                ),
            }
        })?;
        Ok((uri, resp.owner.or_else(|| token.owner.clone())))
    }
}

#[async_trait]
impl NftProvider for KasProvider {
    fn chain(&self) -> Chain {
        self.network.chain()
    }

    async fn owned_tokens(
        &self,
        owner: &str,
        cursor: Option<&str>,
    ) -> Result<OwnedTokenPage, ProviderError> {
        let size = PAGE_SIZE.to_string();
        let mut query = vec![("kind", "nft"), ("size", size.as_str())];
        if let Some(cursor) = cursor {
            query.push(("cursor", cursor));
        }
        let request = self.get(&owned_tokens_url(owner)).query(&query);
        let raw = get_json(PROVIDER, request, || format!("owner={owner}")).await?;
        let resp: OwnedTokensResponse = decode(PROVIDER, raw)?;

        let tokens = resp
            .items
            .into_iter()
            .map(|item| OwnedToken {
                contract_address: item.contract_address,
                token_id: item.extras.token_id,
                owner: Some(owner.to_string()),
                token_uri: item.extras.token_uri,
                balance: item.balance,
            })
            .collect();

        Ok(OwnedTokenPage {
            cursor: non_empty_cursor(resp.cursor),
            tokens,
        })
    }

    async fn token_record(&self, token: &OwnedToken) -> Result<NftRecord, ProviderError> {
        let contract = self.contract_profile(&token.contract_address).await?;
        let (raw_uri, owner) = self.token_uri(token).await?;
        let uri = normalize::substitute_id_placeholder(&raw_uri, &token.token_id);

        let token_json = self.resolver.resolve_json(&uri).await?;

        let field = |key: &str| {
            token_json
                .get(key)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let name = normalize::token_name(
            field("name").as_deref(),
            contract.name.as_deref(),
            &token.contract_address,
            &token.token_id,
        );
        let attributes = normalize::parse_attributes(
            token_json.get("attributes"),
            &token.contract_address,
            &token.token_id,
        );
        let external_url = normalize::external_url(Some(&token_json), None);

        Ok(NftRecord {
            chain: self.network.chain(),
            contract_address: token.contract_address.clone(),
            token_id: token.token_id.clone(),
            owner,
            token_type: contract.token_type.unwrap_or_else(|| {
                tracing::warn!(
                    contract_address = %token.contract_address,
                    "kas contract type missing"
                );
                String::new()
            }),
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

    /// Ask KAS to re-scan the token's on-chain metadata. Callers treat this
    /// as a hint: failures are logged and never block the read path.
    async fn refresh_metadata(
        &self,
        contract_address: &str,
        token_id: &str,
    ) -> Result<(), ProviderError> {
        let url = refresh_url(contract_address, token_id);
        let resp = self
            .http
            .put(&url)
            .basic_auth(&self.access_key_id, Some(&self.secret_access_key))
            .header("x-chain-id", self.network.chain_id())
            .send()
            .await
            .map_err(|e| ProviderError::Http {
                provider: PROVIDER,
                reason: e.to_string(),
            })?;
        if !resp.status().is_success() {
            return Err(ProviderError::Api {
                provider: PROVIDER,
                status: resp.status().as_u16(),
                context: format!("refresh contract={contract_address} token={token_id}"),
            });
        }
        Ok(())
    }
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn url_templates() {
        assert_eq!(
            owned_tokens_url("0xfe463e0d253ea6972f13ea93516da762503d0d2a"),
            "https://th-api.klaytnapi.com/v2/account/0xfe463e0d253ea6972f13ea93516da762503d0d2a/token"
        );
        assert_eq!(
            token_url("0xabc", "0xd89"),
            "https://th-api.klaytnapi.com/v2/contract/nft/0xabc/token/0xd89"
        );
        assert!(refresh_url("0xabc", "0xd89").ends_with("/metadata"));
    }

    #[test]
    fn network_ids() {
        assert_eq!(KasNetwork::Cypress.chain_id(), "8217");
        assert_eq!(KasNetwork::Baobab.chain_id(), "1001");
        assert_eq!(KasNetwork::Baobab.chain(), Chain::KlaytnBaobab);
    }

    #[test]
    fn owned_response_parses_docs_sample() {
        let raw = json!({
            "cursor": "J9Ag...VM6z",
            "items": [
                {
                    "kind": "nft",
                    "contractAddress": "0x77777777777b7fdaa2fceb47ebde85cd461f8859",
                    "updatedAt": 1664652860,
                    "balance": "0x1",
                    "lastTransfer": {
                        "transactionHash": "0xd02b82e50bce86ad883fd3efc92869f7ee8148ed9accb11ec29f658b3a816aa2",
                        "transferFrom": "0x0000000000000000000000000000000000000000",
                        "transferTo": "0xfe463e0d253ea6972f13ea93516da762503d0d2a"
                    },
                    "extras": {
                        "tokenId": "0xd89",
                        "tokenUri": "https://7nftbits.com/json/3465.json"
                    }
                }
            ]
        });
        let resp: OwnedTokensResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(resp.cursor.as_deref(), Some("J9Ag...VM6z"));
        assert_eq!(resp.items.len(), 1);
        assert_eq!(resp.items[0].extras.token_id, "0xd89");
        assert_eq!(
            resp.items[0].extras.token_uri.as_deref(),
            Some("https://7nftbits.com/json/3465.json")
        );
    }

    #[test]
    fn contract_profile_parses() {
        let resp: NftContractResponse = serde_json::from_value(json!({
            "address": "0x590744cb8cf1a698d7db509b52bf209e3cccb8e0",
            "name": "Puuvilla Society",
            "symbol": "PUUVILLA",
            "logo": "",
            "totalSupply": "0x2710",
            "status": "completed",
            "type": "KIP-17",
            "createdAt": 1645501035,
            "updatedAt": 1645501035,
            "deletedAt": 0
        }))
        .unwrap();
        assert_eq!(resp.token_type.as_deref(), Some("KIP-17"));
        assert_eq!(resp.name.as_deref(), Some("Puuvilla Society"));
    }
}
