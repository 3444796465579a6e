//! Startup-time configuration.
//!
//! All environment state is read exactly once, at startup, into one explicit
//! [`AppConfig`] passed by handle into each component. Missing required
//! credentials fail construction — never an individual request.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;

/// Alchemy credentials, one API key per network family.
#[derive(Debug, Clone)]
pub struct AlchemyCredentials {
    pub ethereum_api_key: String,
    pub polygon_api_key: String,
    /// Dedicated testnet keys; fall back to the mainnet key when unset.
    pub ethereum_goerli_api_key: String,
    pub polygon_mumbai_api_key: String,
}

/// KAS (Klaytn API Service) credentials — basic-auth key pair.
#[derive(Debug, Clone)]
pub struct KasCredentials {
    pub access_key_id: String,
    pub secret_access_key: String,
}

/// Moralis credentials.
#[derive(Debug, Clone)]
pub struct MoralisCredentials {
    pub api_key: String,
}

/// The application configuration, built once at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub alchemy: AlchemyCredentials,
    pub kas: KasCredentials,
    pub moralis: MoralisCredentials,
    /// Worker-pool width for per-token resolution within one page.
    pub resolve_concurrency: usize,
    /// Per-attempt timeout for content-URI fetches (each IPFS gateway try,
    /// each direct HTTP fetch).
    pub content_timeout: Duration,
    /// Per-request timeout for provider API calls.
    pub provider_timeout: Duration,
    /// Root directory of the disk-backed metadata store.
    pub data_dir: PathBuf,
}

impl AppConfig {
    pub const DEFAULT_RESOLVE_CONCURRENCY: usize = 5;
    pub const DEFAULT_CONTENT_TIMEOUT: Duration = Duration::from_secs(3);
    pub const DEFAULT_PROVIDER_TIMEOUT: Duration = Duration::from_secs(30);

    /// Build the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup (tests inject a map here).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| lookup(key).ok_or(ConfigError::MissingEnv(key));

        let ethereum_api_key = required("ALCHEMY_ETHER_MAIN_API_KEY")?;
        let polygon_api_key = required("ALCHEMY_POLYGON_MAIN_API_KEY")?;
        let alchemy = AlchemyCredentials {
            ethereum_goerli_api_key: lookup("ALCHEMY_ETHER_GOERLI_API_KEY")
                .unwrap_or_else(|| ethereum_api_key.clone()),
            polygon_mumbai_api_key: lookup("ALCHEMY_POLYGON_MUMBAI_API_KEY")
                .unwrap_or_else(|| polygon_api_key.clone()),
            ethereum_api_key,
            polygon_api_key,
        };

        let kas = KasCredentials {
            access_key_id: required("KAS_ACCESS_KEY_ID")?,
            secret_access_key: required("KAS_SECRET_ACCESS_KEY")?,
        };

        let moralis = MoralisCredentials {
            api_key: required("MORALIS_API_KEY")?,
        };

        let resolve_concurrency = lookup("CHAINNFT_RESOLVE_CONCURRENCY")
            .and_then(|v| v.parse().ok())
            .unwrap_or(Self::DEFAULT_RESOLVE_CONCURRENCY);

        let content_timeout = lookup("CHAINNFT_CONTENT_TIMEOUT_SECS")
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Self::DEFAULT_CONTENT_TIMEOUT);

        let data_dir = lookup("CHAINNFT_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(".data"));

        Ok(Self {
            alchemy,
            kas,
            moralis,
            resolve_concurrency,
            content_timeout,
            provider_timeout: Self::DEFAULT_PROVIDER_TIMEOUT,
            data_dir,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn full_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("ALCHEMY_ETHER_MAIN_API_KEY", "eth-key"),
            ("ALCHEMY_POLYGON_MAIN_API_KEY", "poly-key"),
            ("KAS_ACCESS_KEY_ID", "kas-id"),
            ("KAS_SECRET_ACCESS_KEY", "kas-secret"),
            ("MORALIS_API_KEY", "moralis-key"),
        ])
    }

    #[test]
    fn builds_from_complete_env() {
        let env = full_env();
        let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.alchemy.ethereum_api_key, "eth-key");
        assert_eq!(config.moralis.api_key, "moralis-key");
        assert_eq!(config.resolve_concurrency, 5);
        assert_eq!(config.content_timeout, Duration::from_secs(3));
    }

    #[test]
    fn testnet_keys_fall_back_to_mainnet() {
        let env = full_env();
        let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.alchemy.ethereum_goerli_api_key, "eth-key");
        assert_eq!(config.alchemy.polygon_mumbai_api_key, "poly-key");
    }

    #[test]
    fn missing_credential_is_startup_error() {
        let mut env = full_env();
        env.remove("MORALIS_API_KEY");
        let err = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv("MORALIS_API_KEY")));
    }

    #[test]
    fn overrides_parse() {
        let mut env = full_env();
        env.insert("CHAINNFT_RESOLVE_CONCURRENCY", "9");
        env.insert("CHAINNFT_CONTENT_TIMEOUT_SECS", "1");
        let config = AppConfig::from_lookup(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(config.resolve_concurrency, 9);
        assert_eq!(config.content_timeout, Duration::from_secs(1));
    }
}
