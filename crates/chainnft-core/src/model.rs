//! The canonical, chain-agnostic NFT record schema.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// ─── Chain ────────────────────────────────────────────────────────────────────

/// Networks the aggregator can serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chain {
    Ethereum,
    EthereumGoerli,
    Polygon,
    PolygonMumbai,
    Klaytn,
    KlaytnBaobab,
    Binance,
    BinanceTestnet,
}

impl Chain {
    /// All chains, in a stable order (dispatcher wiring, CLI listing).
    pub const ALL: [Chain; 8] = [
        Chain::Ethereum,
        Chain::EthereumGoerli,
        Chain::Polygon,
        Chain::PolygonMumbai,
        Chain::Klaytn,
        Chain::KlaytnBaobab,
        Chain::Binance,
        Chain::BinanceTestnet,
    ];

    /// The canonical slug — also the per-chain storage directory name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ethereum => "ethereum",
            Self::EthereumGoerli => "ethereum_goerli",
            Self::Polygon => "polygon",
            Self::PolygonMumbai => "polygon_mumbai",
            Self::Klaytn => "klaytn",
            Self::KlaytnBaobab => "klaytn_baobab",
            Self::Binance => "binance",
            Self::BinanceTestnet => "binance_testnet",
        }
    }

    /// Returns `true` for test networks.
    pub fn is_testnet(&self) -> bool {
        matches!(
            self,
            Self::EthereumGoerli | Self::PolygonMumbai | Self::KlaytnBaobab | Self::BinanceTestnet
        )
    }
}

impl std::fmt::Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Chain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Chain::ALL
            .iter()
            .find(|c| c.as_str() == s)
            .copied()
            .ok_or_else(|| format!("unknown chain: {s}"))
    }
}

// ─── NftAttribute ─────────────────────────────────────────────────────────────

/// One entry of a token's trait list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftAttribute {
    pub trait_type: String,
    pub value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_type: Option<String>,
}

impl NftAttribute {
    /// Parse one raw attribute entry defensively.
    ///
    /// Returns `None` when `trait_type` or `value` is missing — the caller
    /// drops the entry and keeps parsing the rest of the list. Numeric and
    /// boolean values are coerced to their string rendering, matching the
    /// loose typing seen in the wild.
    pub fn from_json(raw: &Value) -> Option<Self> {
        let obj = raw.as_object()?;
        let trait_type = obj.get("trait_type")?.as_str()?.to_string();
        let value = match obj.get("value")? {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            _ => return None,
        };
        let display_type = obj
            .get("display_type")
            .and_then(Value::as_str)
            .map(str::to_string);
        Some(Self {
            trait_type,
            value,
            display_type,
        })
    }
}

// ─── SourceUrls ───────────────────────────────────────────────────────────────

/// URLs of the re-hosted media asset: the mirrored original plus the
/// predicted resize variants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUrls {
    pub original: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h250: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h500: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h750: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h1000: Option<String>,
}

impl SourceUrls {
    /// A source with only the mirrored original (non-image media).
    pub fn original_only(original: impl Into<String>) -> Self {
        Self {
            original: original.into(),
            h250: None,
            h500: None,
            h750: None,
            h1000: None,
        }
    }
}

// ─── NftRecord ────────────────────────────────────────────────────────────────

/// The canonical NFT record, normalized from whichever provider supplied it.
///
/// `(chain, contract_address, token_id)` is the unique storage key: a record
/// fetched from any provider for the same key overwrites the stored one.
/// `token_id` stays in provider-native form (hex or decimal string) and is
/// never interpreted arithmetically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NftRecord {
    pub chain: Chain,
    pub contract_address: String,
    pub token_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    /// Token standard (e.g. `"ERC721"`); empty when the provider doesn't know.
    #[serde(default)]
    pub token_type: String,
    #[serde(default)]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub animation_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_url: Option<String>,
    /// Set by the media caching layer once the asset is mirrored.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_url: Option<SourceUrls>,
    /// MIME type of the mirrored asset, sniffed from its bytes.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(default)]
    pub attributes: Vec<NftAttribute>,
    /// Raw token JSON as the provider returned it — opaque passthrough for
    /// fields the normalizer doesn't model.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_data: Option<Value>,
    /// `true` when served from the store, `false` on a fresh upstream fetch.
    /// Recomputed per response; the persisted value carries no meaning.
    #[serde(default)]
    pub cached: bool,
}

impl NftRecord {
    /// Returns the record's unique storage key components.
    pub fn key(&self) -> (Chain, &str, &str) {
        (self.chain, &self.contract_address, &self.token_id)
    }

    /// The media URI to mirror: `image` first, then `animation_url`.
    pub fn media_uri(&self) -> Option<&str> {
        self.image.as_deref().or(self.animation_url.as_deref())
    }
}

impl std::fmt::Display for NftRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{} - {}] {} - {} - {}",
            self.chain, self.token_type, self.name, self.contract_address, self.token_id
        )
    }
}

// ─── OwnedNftPage ─────────────────────────────────────────────────────────────

/// One page of ownership results.
///
/// `cursor` is the upstream pagination token, echoed back verbatim on the
/// next call; `None` signals the last page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedNftPage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cursor: Option<String>,
    pub nfts: Vec<NftRecord>,
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record() -> NftRecord {
        NftRecord {
            chain: Chain::Ethereum,
            contract_address: "0x2931b181ae9dc8f8109ec41c42480933f411ef94".into(),
            token_id: "0x262".into(),
            owner: None,
            token_type: "ERC721".into(),
            name: "SlimHood #610".into(),
            description: Some("They all wear hoods.".into()),
            image: Some("ipfs://QmPCzRHRgCdPrhNnfG9tPvM5jp18TmoJwBrfkgcyFipe7b/610.gif".into()),
            animation_url: None,
            external_url: None,
            source_url: None,
            content_type: None,
            attributes: vec![NftAttribute {
                trait_type: "Hoodie".into(),
                value: "Orange/Red/White/Green".into(),
                display_type: None,
            }],
            token_data: Some(json!({"name": "SlimHood #610"})),
            cached: false,
        }
    }

    #[test]
    fn chain_slug_roundtrip() {
        for chain in Chain::ALL {
            let parsed: Chain = chain.as_str().parse().unwrap();
            assert_eq!(parsed, chain);
        }
        assert!("solana".parse::<Chain>().is_err());
    }

    #[test]
    fn chain_serde_snake_case() {
        let s = serde_json::to_string(&Chain::KlaytnBaobab).unwrap();
        assert_eq!(s, "\"klaytn_baobab\"");
    }

    #[test]
    fn record_serde_roundtrip() {
        let rec = record();
        let json = serde_json::to_string(&rec).unwrap();
        let back: NftRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, rec);
    }

    #[test]
    fn record_roundtrip_preserves_empty_and_none() {
        let mut rec = record();
        rec.attributes = vec![];
        rec.description = None;
        rec.image = None;
        rec.token_data = None;
        let back: NftRecord =
            serde_json::from_str(&serde_json::to_string(&rec).unwrap()).unwrap();
        assert_eq!(back, rec);
        assert!(back.attributes.is_empty());
        assert!(back.description.is_none());
    }

    #[test]
    fn attribute_from_json_coerces_numbers() {
        let attr = NftAttribute::from_json(&json!({
            "trait_type": "Level",
            "value": 42,
            "display_type": "number"
        }))
        .unwrap();
        assert_eq!(attr.value, "42");
        assert_eq!(attr.display_type.as_deref(), Some("number"));
    }

    #[test]
    fn attribute_from_json_rejects_missing_fields() {
        assert!(NftAttribute::from_json(&json!({"value": "x"})).is_none());
        assert!(NftAttribute::from_json(&json!({"trait_type": "x"})).is_none());
        assert!(NftAttribute::from_json(&json!("not an object")).is_none());
    }

    #[test]
    fn media_uri_prefers_image() {
        let mut rec = record();
        rec.animation_url = Some("https://example.com/clip.mp4".into());
        assert_eq!(rec.media_uri(), rec.image.as_deref());
        rec.image = None;
        assert_eq!(rec.media_uri(), Some("https://example.com/clip.mp4"));
        rec.animation_url = None;
        assert!(rec.media_uri().is_none());
    }
}
