//! The media cache: fetch once, store content-addressed, predict variants.

use std::sync::Arc;

use sha2::{Digest, Sha256};
use tokio::sync::Semaphore;

use chainnft_core::error::ServiceError;
use chainnft_core::model::{NftRecord, SourceUrls};
use chainnft_core::store::{MetadataStore, ObjectStore};
use chainnft_resolver::ContentResolver;

use crate::sniff::{extension_for, is_image, sniff_content_type, OCTET_STREAM};

/// Pixel heights of the predicted resize variants.
pub const RESIZE_HEIGHTS: [u32; 4] = [250, 500, 750, 1000];

/// Worker width for batch caching, mirroring the request-path pool.
const BATCH_CONCURRENCY: usize = 5;

/// Mirrors record media into object storage and re-publishes the stored
/// record with `source_url` / `content_type` filled in.
pub struct MediaCache {
    resolver: Arc<ContentResolver>,
    objects: Arc<dyn ObjectStore>,
    store: Arc<dyn MetadataStore>,
    limiter: Semaphore,
}

impl MediaCache {
    pub fn new(
        resolver: Arc<ContentResolver>,
        objects: Arc<dyn ObjectStore>,
        store: Arc<dyn MetadataStore>,
    ) -> Self {
        Self {
            resolver,
            objects,
            store,
            limiter: Semaphore::new(BATCH_CONCURRENCY),
        }
    }

    /// Cache one record's media. Idempotent; best-effort.
    ///
    /// On any failure the error is logged and the input record comes back
    /// unchanged — `source_url` stays unset, so the record is safely
    /// retryable later. Errors never reach the metadata read path.
    pub async fn cache_media(&self, record: NftRecord) -> NftRecord {
        match self.try_cache(&record).await {
            Ok(Some(updated)) => updated,
            Ok(None) => record,
            Err(e) => {
                tracing::warn!(nft = %record, error = %e, "media caching failed");
                record
            }
        }
    }

    /// Cache a batch out-of-band, bounded by the worker pool.
    pub async fn cache_media_batch(&self, records: Vec<NftRecord>) -> Vec<NftRecord> {
        let tasks = records.into_iter().map(|record| async {
            let _permit = self
                .limiter
                .acquire()
                .await
                .expect("media semaphore closed");
            self.cache_media(record).await
        });
        futures::future::join_all(tasks).await
    }

    async fn try_cache(&self, record: &NftRecord) -> Result<Option<NftRecord>, ServiceError> {
        let Some(uri) = record.media_uri() else {
            return Ok(None); // nothing to mirror
        };
        if record.source_url.is_some() {
            tracing::debug!(nft = %record, "media already cached");
            return Ok(None);
        }

        let prefix = uri_hash(uri);
        let (key, content_type) = match self.objects.find_first(&prefix).await? {
            Some(existing) => {
                tracing::debug!(key = %existing.key, "reusing mirrored object");
                (
                    existing.key,
                    existing
                        .content_type
                        .unwrap_or_else(|| OCTET_STREAM.to_string()),
                )
            }
            None => {
                let bytes = self.resolver.resolve_bytes(uri).await?;
                let content_type = sniff_content_type(&bytes);
                let key = format!("{prefix}{}", extension_for(content_type));
                self.objects.put(&key, bytes, content_type).await?;
                tracing::debug!(key = %key, content_type, "mirrored media object");
                (key, content_type.to_string())
            }
        };

        let mut source = SourceUrls::original_only(self.objects.public_url(&key));
        if is_image(&content_type) {
            let [h250, h500, h750, h1000] =
                RESIZE_HEIGHTS.map(|h| Some(self.objects.variant_url(&key, h)));
            source.h250 = h250;
            source.h500 = h500;
            source.h750 = h750;
            source.h1000 = h1000;
        }

        let mut updated = record.clone();
        updated.source_url = Some(source);
        updated.content_type = Some(content_type);
        self.store.put(&updated).await?;
        Ok(Some(updated))
    }
}

/// Storage key prefix: hex SHA-256 of the source URI string.
fn uri_hash(uri: &str) -> String {
    hex::encode(Sha256::digest(uri.as_bytes()))
}

// ─── Tests ────────────────────────────────────────────────────────────────────
