//! Provider-agnostic normalization rules.
//!
//! These rules are applied uniformly by every adapter when mapping a raw
//! provider response into an [`NftRecord`](crate::model::NftRecord):
//! name and token-type fallbacks, defensive attribute parsing, and the
//! multi-token `{id}` URI substitution.

use serde_json::Value;

use crate::model::NftAttribute;

/// Placeholder some multi-token URIs embed where the token id belongs.
pub const ID_PLACEHOLDER: &str = "{id}";

/// Resolve a token's display name.
///
/// Fallback chain: token-level name → contract-level collection name
/// (prefixed `[Contract] `) → empty string. A missing name is a warning,
/// never fatal.
pub fn token_name(
    token_name: Option<&str>,
    contract_name: Option<&str>,
    contract_address: &str,
    token_id: &str,
) -> String {
    if let Some(name) = token_name.filter(|n| !n.is_empty()) {
        return name.to_string();
    }
    tracing::warn!(
        contract_address,
        token_id,
        "nft name missing, falling back to contract name"
    );
    match contract_name.filter(|n| !n.is_empty()) {
        Some(name) => format!("[Contract] {name}"),
        None => String::new(),
    }
}

/// Parse a raw attribute list defensively.
///
/// An entry missing `trait_type` or `value` is dropped and logged; one
/// malformed attribute never aborts parsing of the rest.
pub fn parse_attributes(raw: Option<&Value>, contract_address: &str, token_id: &str) -> Vec<NftAttribute> {
    let Some(entries) = raw.and_then(Value::as_array) else {
        return vec![];
    };
    let mut attributes = Vec::with_capacity(entries.len());
    for entry in entries {
        match NftAttribute::from_json(entry) {
            Some(attr) => attributes.push(attr),
            None => {
                tracing::warn!(
                    contract_address,
                    token_id,
                    attr = %entry,
                    "dropping malformed nft attribute"
                );
            }
        }
    }
    attributes
}

/// Resolve the external link: first non-empty of the token JSON's `url`,
/// its `external_url`, then the provider's contract-level link.
pub fn external_url(token_json: Option<&Value>, contract_link: Option<&str>) -> Option<String> {
    let from_json = |key: &str| {
        token_json
            .and_then(|v| v.get(key))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };
    from_json("url")
        .or_else(|| from_json("external_url"))
        .or_else(|| contract_link.filter(|s| !s.is_empty()).map(str::to_string))
}

/// Convert a hex token id (with or without `0x`) to its decimal rendering.
///
/// Token ids are 256-bit in the wild, so this is long division on the raw
/// nibbles rather than a machine-word parse. Returns `None` on a non-hex
/// input or an empty string.
pub fn hex_to_decimal(hex: &str) -> Option<String> {
    let digits = hex.strip_prefix("0x").unwrap_or(hex);
    if digits.is_empty() {
        return None;
    }
    // base-10 accumulator, least significant digit first
    let mut acc: Vec<u8> = vec![0];
    for ch in digits.chars() {
        let nibble = ch.to_digit(16)? as u8;
        let mut carry = nibble;
        for digit in acc.iter_mut() {
            let val = *digit * 16 + carry;
            *digit = val % 10;
            carry = val / 10;
        }
        while carry > 0 {
            acc.push(carry % 10);
            carry /= 10;
        }
    }
    Some(
        acc.iter()
            .rev()
            .map(|d| char::from(b'0' + d))
            .collect::<String>(),
    )
}

/// Substitute the literal `{id}` placeholder in a token URI with the decimal
/// rendering of the hex token id, per the multi-token metadata convention.
///
/// URIs without the placeholder — and token ids that aren't valid hex — pass
/// through unchanged.
pub fn substitute_id_placeholder(uri: &str, token_id: &str) -> String {
    if !uri.contains(ID_PLACEHOLDER) {
        return uri.to_string();
    }
    match hex_to_decimal(token_id) {
        Some(decimal) => uri.replace(ID_PLACEHOLDER, &decimal),
        None => uri.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn name_prefers_token_level() {
        let name = token_name(Some("Cool Cat #7"), Some("Cool Cats"), "0xc", "0x7");
        assert_eq!(name, "Cool Cat #7");
    }

    #[test]
    fn name_falls_back_to_contract() {
        let name = token_name(None, Some("Cool Cats"), "0xc", "0x7");
        assert_eq!(name, "[Contract] Cool Cats");
        let name = token_name(Some(""), Some("Cool Cats"), "0xc", "0x7");
        assert_eq!(name, "[Contract] Cool Cats");
    }

    #[test]
    fn name_empty_when_nothing_known() {
        assert_eq!(token_name(None, None, "0xc", "0x7"), "");
        assert_eq!(token_name(None, Some(""), "0xc", "0x7"), "");
    }

    #[test]
    fn attributes_drop_malformed_entry_only() {
        let raw = json!([
            {"trait_type": "Hat", "value": "Beanie"},
            {"value": "no trait_type"},
            {"trait_type": "Level", "value": 3},
            "not even an object"
        ]);
        let attrs = parse_attributes(Some(&raw), "0xc", "0x7");
        assert_eq!(attrs.len(), 2);
        assert_eq!(attrs[0].trait_type, "Hat");
        assert_eq!(attrs[1].value, "3");
    }

    #[test]
    fn attributes_absent_list_is_empty() {
        assert!(parse_attributes(None, "0xc", "0x7").is_empty());
        assert!(parse_attributes(Some(&json!("nope")), "0xc", "0x7").is_empty());
    }

    #[test]
    fn external_url_precedence() {
        let token = json!({"url": "https://a", "external_url": "https://b"});
        assert_eq!(
            external_url(Some(&token), Some("https://c")),
            Some("https://a".into())
        );
        let token = json!({"url": "", "external_url": "https://b"});
        assert_eq!(
            external_url(Some(&token), Some("https://c")),
            Some("https://b".into())
        );
        assert_eq!(
            external_url(None, Some("https://c")),
            Some("https://c".into())
        );
        assert_eq!(external_url(None, None), None);
    }

    #[test]
    fn hex_to_decimal_small() {
        assert_eq!(hex_to_decimal("0x7a7").as_deref(), Some("1959"));
        assert_eq!(hex_to_decimal("7a7").as_deref(), Some("1959"));
        assert_eq!(hex_to_decimal("0x0").as_deref(), Some("0"));
    }

    #[test]
    fn hex_to_decimal_wide() {
        // 32-byte token id as Alchemy returns them
        assert_eq!(
            hex_to_decimal("0x0000000000000000000000000000000000000000000000000000000000000262")
                .as_deref(),
            Some("610")
        );
        // 2^128, past u64/u128 territory of smaller parses
        assert_eq!(
            hex_to_decimal("0x100000000000000000000000000000000").as_deref(),
            Some("340282366920938463463374607431768211456")
        );
    }

    #[test]
    fn hex_to_decimal_rejects_garbage() {
        assert!(hex_to_decimal("0xzz").is_none());
        assert!(hex_to_decimal("").is_none());
        assert!(hex_to_decimal("0x").is_none());
    }

    #[test]
    fn id_substitution() {
        let uri = "https://token.example/meta/{id}.json";
        assert_eq!(
            substitute_id_placeholder(uri, "0x7a7"),
            "https://token.example/meta/1959.json"
        );
        // no placeholder: untouched
        let plain = "https://token.example/meta/7.json";
        assert_eq!(substitute_id_placeholder(plain, "0x7a7"), plain);
        // non-hex id: untouched rather than corrupted
        assert_eq!(substitute_id_placeholder(uri, "not-hex"), uri);
    }
}
