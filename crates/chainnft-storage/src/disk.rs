//! Disk-backed metadata store.
//!
//! One JSON file per record at `{root}/{chain}/{sha256(chain|contract|token)}.json`.
//! The per-chain subdirectory is created on first write.

use async_trait::async_trait;
use std::path::{Path, PathBuf};

use chainnft_core::error::StoreError;
use chainnft_core::model::{Chain, NftRecord};
use chainnft_core::store::MetadataStore;

use crate::record_key;

/// File-per-record metadata store.
pub struct DiskMetadataStore {
    root: PathBuf,
}

impl DiskMetadataStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn record_path(&self, chain: Chain, contract_address: &str, token_id: &str) -> PathBuf {
        let filename = format!("{}.json", record_key(chain, contract_address, token_id));
        self.root.join(chain.as_str()).join(filename)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

#[async_trait]
impl MetadataStore for DiskMetadataStore {
    async fn get(
        &self,
        chain: Chain,
        contract_address: &str,
        token_id: &str,
    ) -> Result<Option<NftRecord>, StoreError> {
        let path = self.record_path(chain, contract_address, token_id);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        let mut record: NftRecord = serde_json::from_slice(&bytes)?;
        record.cached = true;
        Ok(Some(record))
    }

    async fn put(&self, record: &NftRecord) -> Result<(), StoreError> {
        let path = self.record_path(record.chain, &record.contract_address, &record.token_id);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(record)?;
        tokio::fs::write(&path, json).await?;
        tracing::debug!(path = %path.display(), nft = %record, "stored nft record");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chainnft_core::model::NftAttribute;

    fn record() -> NftRecord {
        NftRecord {
            chain: Chain::Ethereum,
            contract_address: "0x2931b181ae9dc8f8109ec41c42480933f411ef94".into(),
            token_id: "0x0000000000000000000000000000000000000000000000000000000000000262".into(),
            owner: Some("0x2488f090656BddB63fe3Bdb506D0D109AaaD93Bb".into()),
            token_type: "ERC721".into(),
            name: "SlimHood #610".into(),
            description: Some("They all wear hoods, but each SlimHood is unique.".into()),
            image: Some("ipfs://QmPCzRHRgCdPrhNnfG9tPvM5jp18TmoJwBrfkgcyFipe7b/610.gif".into()),
            animation_url: None,
            external_url: None,
            source_url: None,
            content_type: None,
            attributes: vec![
                NftAttribute {
                    trait_type: "Hoodie".into(),
                    value: "Orange/Red/White/Green".into(),
                    display_type: None,
                },
                NftAttribute {
                    trait_type: "Hood".into(),
                    value: "Hood Down".into(),
                    display_type: None,
                },
            ],
            token_data: None,
            cached: false,
        }
    }

    #[tokio::test]
    async fn missing_record_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskMetadataStore::new(dir.path());
        let got = store.get(Chain::Ethereum, "0xabc", "0x1").await.unwrap();
        assert!(got.is_none());
    }

    #[tokio::test]
    async fn roundtrip_preserves_fields_and_sets_cached() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskMetadataStore::new(dir.path());

        let rec = record();
        store.put(&rec).await.unwrap();

        let got = store
            .get(rec.chain, &rec.contract_address, &rec.token_id)
            .await
            .unwrap()
            .unwrap();
        assert!(got.cached);
        let mut expected = rec;
        expected.cached = true;
        assert_eq!(got, expected);
    }

    #[tokio::test]
    async fn put_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskMetadataStore::new(dir.path());

        let rec = record();
        store.put(&rec).await.unwrap();

        let mut updated = record();
        updated.name = "SlimHood #610 (revised)".into();
        store.put(&updated).await.unwrap();

        let got = store
            .get(rec.chain, &rec.contract_address, &rec.token_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(got.name, "SlimHood #610 (revised)");

        // one file only for the key
        let chain_dir = dir.path().join(rec.chain.as_str());
        let count = std::fs::read_dir(chain_dir).unwrap().count();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn records_land_under_chain_subdirectory() {
        let dir = tempfile::tempdir().unwrap();
        let store = DiskMetadataStore::new(dir.path());

        let mut rec = record();
        rec.chain = Chain::PolygonMumbai;
        store.put(&rec).await.unwrap();

        assert!(dir.path().join("polygon_mumbai").is_dir());
    }
}
