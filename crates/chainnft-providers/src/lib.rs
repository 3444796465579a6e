//! chainnft-providers — adapters for the upstream NFT indexing services.
//!
//! Each provider module models the service's bespoke REST shapes as explicit
//! serde structs at the adapter boundary, and implements the
//! [`NftProvider`](chainnft_core::NftProvider) capability for the networks it
//! covers:
//!
//! - [`alchemy`] — Ethereum + Polygon families (mainnet, Goerli, Mumbai)
//! - [`kas`] — Klaytn family via the Klaytn API Service (Cypress, Baobab)
//! - [`moralis`] — BNB-chain family (mainnet, testnet); rate-limit sensitive,
//!   driven sequentially by the engine
//!
//! Adapters are stateless aside from credentials and a shared HTTP client;
//! chain tagging always derives from which adapter instance produced the
//! data, never from payload content.

pub mod alchemy;
pub mod kas;
pub mod moralis;

pub use alchemy::{AlchemyNetwork, AlchemyProvider};
pub use kas::{KasNetwork, KasProvider};
pub use moralis::{MoralisNetwork, MoralisProvider};

use chainnft_core::error::ProviderError;

/// Shared GET-JSON helper: one place mapping transport and status failures
/// into [`ProviderError`] with per-token context.
pub(crate) async fn get_json(
    provider: &'static str,
    request: reqwest::RequestBuilder,
    context: impl Fn() -> String,
) -> Result<serde_json::Value, ProviderError> {
    let resp = request.send().await.map_err(|e| ProviderError::Http {
        provider,
        reason: e.to_string(),
    })?;

    let status = resp.status();
    if !status.is_success() {
        return Err(ProviderError::Api {
            provider,
            status: status.as_u16(),
            context: context(),
        });
    }

    resp.json::<serde_json::Value>()
        .await
        .map_err(|e| ProviderError::Http {
            provider,
            reason: format!("body read: {e}"),
        })
}

/// Decode a raw JSON payload into a typed provider shape.
pub(crate) fn decode<T: serde::de::DeserializeOwned>(
    provider: &'static str,
    raw: serde_json::Value,
) -> Result<T, ProviderError> {
    serde_json::from_value(raw).map_err(|source| ProviderError::Deserialization {
        provider,
        source,
    })
}

/// Upstream pagination tokens come back as `""` or `null` on the last page;
/// normalize both to `None`.
pub(crate) fn non_empty_cursor(cursor: Option<String>) -> Option<String> {
    cursor.filter(|c| !c.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_normalization() {
        assert_eq!(non_empty_cursor(None), None);
        assert_eq!(non_empty_cursor(Some(String::new())), None);
        assert_eq!(
            non_empty_cursor(Some("J9Ag...VM6z".into())),
            Some("J9Ag...VM6z".into())
        );
    }
}
