//! Catalog HTTP client
//!
//! Two calls only: the bulk index and one detail record. Retry policy belongs
//! to the population worker, so nothing here retries.

use super::error::{FetchError, TransportKind};
use super::types::{CatalogReference, DetailRecord, IndexPage};
use crate::config::UpstreamConfig;
use crate::Result;
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info};

/// Source of catalog data for the population worker
#[async_trait]
pub trait UpstreamClient: Send + Sync {
    /// Fetch the bulk index in one request
    async fn fetch_index(&self) -> std::result::Result<Vec<CatalogReference>, FetchError>;

    /// Fetch one item's detail record
    async fn fetch_detail(
        &self,
        reference: &CatalogReference,
    ) -> std::result::Result<DetailRecord, FetchError>;
}

/// reqwest-backed upstream client
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    client: Client,
    base_url: String,
    index_limit: u32,
}

impl HttpUpstream {
    /// Create a client from configuration
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(config: &UpstreamConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.request_timeout_secs))
            .default_headers({
                let mut headers = header::HeaderMap::new();
                headers.insert(
                    header::ACCEPT,
                    header::HeaderValue::from_static("application/json"),
                );
                headers
            })
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            index_limit: config.index_limit,
        })
    }

    pub fn index_url(&self) -> String {
        format!("{}/pokemon", self.base_url)
    }

    /// GET a URL and decode its JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> std::result::Result<T, FetchError> {
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FetchError::transport(
                TransportKind::Status(status.as_u16()),
                format!("upstream returned {}: {}", status, truncate(&body, 200)),
            ));
        }

        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[async_trait]
impl UpstreamClient for HttpUpstream {
    async fn fetch_index(&self) -> std::result::Result<Vec<CatalogReference>, FetchError> {
        let url = self.index_url();
        debug!(url = %url, limit = self.index_limit, "Fetching catalog index");

        let request = self
            .client
            .get(&url)
            .query(&[("limit", self.index_limit)]);
        let page: IndexPage = self.get_json(request).await?;

        info!(references = page.results.len(), "Catalog index fetched");
        Ok(page.results)
    }

    async fn fetch_detail(
        &self,
        reference: &CatalogReference,
    ) -> std::result::Result<DetailRecord, FetchError> {
        debug!(name = %reference.name, locator = %reference.locator, "Fetching detail record");

        let request = self.client.get(&reference.locator);
        self.get_json(request).await
    }
}

fn truncate(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
