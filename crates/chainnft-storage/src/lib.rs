//! chainnft-storage — pluggable storage backends for ChainNFT.
//!
//! Backends:
//! - [`memory`] — in-memory metadata + object stores (dev/testing, no persistence)
//! - [`disk`] — one JSON file per record, content-addressed by key hash

pub mod disk;
pub mod memory;

pub use disk::DiskMetadataStore;
pub use memory::{MemoryMetadataStore, MemoryObjectStore};

/// Storage key for a record: hex SHA-256 of `chain|contract|token`.
///
/// Stable regardless of which provider supplied the data, so any provider
/// writing the same token overwrites rather than duplicates.
pub fn record_key(chain: chainnft_core::Chain, contract_address: &str, token_id: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(chain.as_str().as_bytes());
    hasher.update(b"|");
    hasher.update(contract_address.as_bytes());
    hasher.update(b"|");
    hasher.update(token_id.as_bytes());
    hex::encode(hasher.finalize())
}
