//! In-memory catalog cache
//!
//! Concurrent id → record table with first-writer-wins semantics. Entries are
//! never replaced or expired; only `clear()` removes them.

mod store;

pub use store::{parse_key, CacheStore, InvalidKeyError, StoreError};
