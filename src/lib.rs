//! dexcache - Read-through cache for a remote creature catalog
//!
//! Mirrors a slow, rate-limited upstream catalog into an in-memory table and
//! serves typed lookups to application code. Population runs in the
//! background: readers see "absent" for ids that are not cached yet and never
//! wait on the network.
//!
//! # Architecture
//!
//! - **upstream**: HTTP client for the bulk index and per-item detail records
//! - **cache**: concurrent insert-if-absent table keyed by integer id
//! - **population**: single sequential worker that seeds, fetches and retries
//! - **service**: wiring plus the host-facing read contract
//! - **config**: YAML configuration and validation

pub mod cache;
pub mod config;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod population;
pub mod service;
pub mod style;
pub mod upstream;

// Re-exports
pub use cache::{CacheStore, InvalidKeyError, StoreError};
pub use error::{DexCacheError, Result};
pub use service::{CacheService, LookupStatus};
pub use upstream::{CatalogReference, DetailRecord, FetchError};
