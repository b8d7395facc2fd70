//! Cache population
//!
//! A single sequential worker that pulls the catalog into the cache.
//!
//! # Protocol
//!
//! 1. **Startup**: the cache table is created before the worker accepts work
//! 2. **Seed**: the bulk index is fetched once and every reference is pushed
//!    onto the worker's own queue
//! 3. **Populate**: each request fetches one detail record and inserts it with
//!    insert-if-absent
//! 4. **Retry**: a failed request goes back onto the tail of the same queue
//!    (immediately by default, or after a backoff delay when configured)
//!
//! # Example
//!
//! ```ignore
//! use dexcache::cache::CacheStore;
//! use dexcache::config::DexCacheConfig;
//! use dexcache::population::PopulationWorker;
//! use dexcache::upstream::HttpUpstream;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> dexcache::Result<()> {
//!     let config = DexCacheConfig::default();
//!     let store = Arc::new(CacheStore::new());
//!     let client = Arc::new(HttpUpstream::new(&config.upstream)?);
//!
//!     let handle = PopulationWorker::start(store.clone(), client, &config.population)?;
//!     handle.trigger_seed();
//!
//!     // Readers never wait on population
//!     println!("{:?}", store.lookup(25));
//!     Ok(())
//! }
//! ```

mod events;
mod handle;
mod retry;
mod worker;

pub use events::PopulationEvent;
pub use handle::PopulationHandle;
pub use retry::RetryPolicy;
pub use worker::{PopulationRequest, PopulationStats, PopulationWorker, RequestOrigin};
