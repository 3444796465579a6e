//! chainnft-engine — the cache-aside resolution engine and chain dispatcher.
//!
//! # Architecture
//!
//! ```text
//! NftDispatcher                 (chain → engine lookup table)
//!     └── ChainEngine           (one per network)
//!             ├── NftProvider   (ownership listing + metadata fetch)
//!             ├── MetadataStore (cache-or-fetch decision, overwrite on write)
//!             └── Semaphore     (bounded per-token resolution, width 5)
//! ```
//!
//! Batch reads degrade gracefully: a token that fails to resolve is dropped
//! from its page (logged), the page itself still succeeds. Single-token reads
//! propagate their error since there is no partial result to fall back to.

pub mod dispatcher;
pub mod engine;

pub use dispatcher::NftDispatcher;
pub use engine::ChainEngine;
