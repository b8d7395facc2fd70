//! Configuration system
//!
//! Loads ~/.config/dexcache/config.yaml with support for:
//! - Upstream catalog location, index page size and request timeout
//! - Population retry policy (cap, backoff, jitter)

mod dexcache_config;
pub mod validation;

pub use dexcache_config::{DexCacheConfig, PopulationConfig, UpstreamConfig};
pub use validation::{validate_config, validate_config_result, ValidationError};
