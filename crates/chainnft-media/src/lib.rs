//! chainnft-media — mirrors resolved records' media assets into object storage.
//!
//! Assets are content-addressed by a hash of the *source URI* (not the
//! bytes), which makes re-caching idempotent without re-downloading: if an
//! object with that prefix already exists, its content type is reused and the
//! fetch is skipped. MIME types are sniffed from the downloaded bytes, never
//! from declared extensions — creator-supplied URIs lie about those.
//!
//! Caching is best-effort and decoupled from the metadata read path: a
//! failure leaves the record's `source_url` unset, which callers must read as
//! "not yet cached, retry later".

pub mod cache;
pub mod sniff;

pub use cache::{MediaCache, RESIZE_HEIGHTS};
pub use sniff::{extension_for, is_image, sniff_content_type};
