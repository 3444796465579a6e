//! In-memory storage backends.
//!
//! All data is lost when the process exits. Useful for testing and for
//! short-lived runs that don't need persistence.

use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use chainnft_core::error::StoreError;
use chainnft_core::model::{Chain, NftRecord};
use chainnft_core::store::{MetadataStore, ObjectInfo, ObjectStore};

use crate::record_key;

/// In-memory metadata store.
#[derive(Default)]
pub struct MemoryMetadataStore {
    records: Mutex<HashMap<String, NftRecord>>,
}

impl MemoryMetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub fn len(&self) -> usize {
        self.records.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl MetadataStore for MemoryMetadataStore {
    async fn get(
        &self,
        chain: Chain,
        contract_address: &str,
        token_id: &str,
    ) -> Result<Option<NftRecord>, StoreError> {
        let key = record_key(chain, contract_address, token_id);
        let record = self.records.lock().unwrap().get(&key).cloned();
        Ok(record.map(|mut r| {
            r.cached = true;
            r
        }))
    }

    async fn put(&self, record: &NftRecord) -> Result<(), StoreError> {
        let key = record_key(record.chain, &record.contract_address, &record.token_id);
        self.records.lock().unwrap().insert(key, record.clone());
        Ok(())
    }
}

/// In-memory object store with configurable public/resize base URLs.
pub struct MemoryObjectStore {
    objects: Mutex<BTreeMap<String, (Vec<u8>, String)>>,
    uploads: AtomicUsize,
    base_url: String,
    resize_base_url: String,
}

impl MemoryObjectStore {
    pub fn new(base_url: impl Into<String>, resize_base_url: impl Into<String>) -> Self {
        Self {
            objects: Mutex::new(BTreeMap::new()),
            uploads: AtomicUsize::new(0),
            base_url: base_url.into(),
            resize_base_url: resize_base_url.into(),
        }
    }

    /// Total `put` calls — lets tests assert upload idempotency.
    pub fn upload_count(&self) -> usize {
        self.uploads.load(Ordering::Relaxed)
    }
}

impl Default for MemoryObjectStore {
    fn default() -> Self {
        Self::new(
            "https://media.test/",
            "https://media-resized.test/",
        )
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StoreError> {
        self.uploads.fetch_add(1, Ordering::Relaxed);
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (bytes, content_type.to_string()));
        Ok(())
    }

    async fn find_first(&self, prefix: &str) -> Result<Option<ObjectInfo>, StoreError> {
        let objects = self.objects.lock().unwrap();
        // BTreeMap keeps keys ordered, so "first" is deterministic
        let found = objects
            .range(prefix.to_string()..)
            .next()
            .filter(|(key, _)| key.starts_with(prefix));
        Ok(found.map(|(key, (_, content_type))| ObjectInfo {
            key: key.clone(),
            content_type: Some(content_type.clone()),
        }))
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StoreError> {
        Ok(self
            .objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(bytes, _)| bytes.clone()))
    }

    fn public_url(&self, key: &str) -> String {
        format!("{}{key}", self.base_url)
    }

    fn variant_url(&self, key: &str, height: u32) -> String {
        format!("{}h{height}/{key}", self.resize_base_url)
    }
}
