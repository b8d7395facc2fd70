//! Host-facing entry point
//!
//! Wires the store, the HTTP upstream and the population worker together and
//! exposes the read contract the application layer relies on.

use crate::cache::{CacheStore, InvalidKeyError};
use crate::config::{validate_config_result, DexCacheConfig};
use crate::population::{PopulationHandle, PopulationWorker};
use crate::upstream::{DetailRecord, HttpUpstream, UpstreamClient};
use crate::Result;
use std::sync::Arc;

/// What a lookup miss means
#[derive(Debug, Clone, PartialEq)]
pub enum LookupStatus {
    /// Record is cached
    Cached(DetailRecord),
    /// Not cached yet; population is still running
    Pending,
    /// Population finished without producing this id
    Unknown,
}

/// Cache plus the worker that fills it
#[derive(Debug, Clone)]
pub struct CacheService {
    store: Arc<CacheStore>,
    population: PopulationHandle,
}

impl CacheService {
    /// Validate the configuration and start against the HTTP upstream
    pub fn start(config: &DexCacheConfig) -> Result<Self> {
        validate_config_result(config)?;
        let client = HttpUpstream::new(&config.upstream)?;
        Self::with_client(config, Arc::new(client))
    }

    /// Start against any upstream implementation
    pub fn with_client(config: &DexCacheConfig, client: Arc<dyn UpstreamClient>) -> Result<Self> {
        let store = Arc::new(CacheStore::new());
        let population = PopulationWorker::start(Arc::clone(&store), client, &config.population)?;
        Ok(Self { store, population })
    }

    /// Startup hook: kick off population without waiting for it
    pub fn initialize_population(&self) {
        self.population.trigger_seed();
    }

    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    pub fn population(&self) -> &PopulationHandle {
        &self.population
    }

    pub fn lookup(&self, id: i64) -> Option<DetailRecord> {
        self.store.lookup(id)
    }

    pub fn lookup_key(&self, key: &str) -> std::result::Result<Option<DetailRecord>, InvalidKeyError> {
        self.store.lookup_key(key)
    }

    pub fn all(&self) -> Vec<DetailRecord> {
        self.store.all().into_iter().map(|(_, record)| record).collect()
    }

    /// Lookup that tells "not yet" apart from "never"
    pub fn lookup_status(&self, id: i64) -> LookupStatus {
        match self.store.lookup(id) {
            Some(record) => LookupStatus::Cached(record),
            None if self.population.is_complete() => LookupStatus::Unknown,
            None => LookupStatus::Pending,
        }
    }

    pub async fn shutdown(&self) -> Result<()> {
        self.population.shutdown().await
    }
}
