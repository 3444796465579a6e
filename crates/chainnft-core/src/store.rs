//! Storage seams: the metadata store and the media object store.

use async_trait::async_trait;

use crate::error::StoreError;
use crate::model::{Chain, NftRecord};

/// Keyed store of canonical NFT records.
///
/// `(chain, contract_address, token_id)` is the unique key. `put` overwrites;
/// concurrent writers are last-writer-wins — records are derived
/// deterministically from upstream state and reconverge on the next resync.
#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Look up a stored record. A hit comes back with `cached = true`.
    async fn get(
        &self,
        chain: Chain,
        contract_address: &str,
        token_id: &str,
    ) -> Result<Option<NftRecord>, StoreError>;

    /// Insert or overwrite the record under its key.
    async fn put(&self, record: &NftRecord) -> Result<(), StoreError>;
}

/// Minimal description of a stored object (no payload).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectInfo {
    pub key: String,
    pub content_type: Option<String>,
}

/// Durable object storage for mirrored media assets.
///
/// Keys are content-addressed by the media layer (hash of the source URI);
/// `find_first` is the idempotency probe that makes re-caching skip the
/// download.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `bytes` under `key` with the given content type.
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError>;

    /// Return the first object whose key starts with `prefix`, if any.
    async fn find_first(&self, prefix: &str) -> Result<Option<ObjectInfo>, StoreError>;

    /// Fetch an object's bytes by exact key.
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    /// Public URL of the stored object.
    fn public_url(&self, key: &str) -> String;

    /// Predicted URL of a resize variant at the given pixel height.
    ///
    /// Convention: `{resize_base}h{height}/{key}`. The resize images are
    /// produced out-of-band by a pipeline that must publish under the same
    /// convention.
    fn variant_url(&self, key: &str, height: u32) -> String;
}
