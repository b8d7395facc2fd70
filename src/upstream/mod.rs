//! Upstream catalog access
//!
//! Fetches the bulk index and per-item detail records from the remote creature
//! catalog. Transport and decode errors are both surfaced as [`FetchError`] and
//! treated as recoverable by the caller.
//!
//! # Endpoints
//!
//! - `GET {base_url}/pokemon?limit=2000` - bulk index `{ "results": [{name, url}] }`
//! - `GET {url}` - detail record, a JSON object with at least an integer `id`

mod client;
mod error;
mod types;

pub use client::{HttpUpstream, UpstreamClient};
pub use error::{is_dns_error, FetchError, TransportKind};
pub use types::{CatalogReference, DetailRecord, IndexPage};
