//! Population worker implementation
//!
//! One tokio task drains one FIFO queue. Seed fan-out, external submissions
//! and retries all go through the same queue, so exactly one request is in
//! flight at a time and the cache has a single writer.

use super::events::PopulationEvent;
use super::handle::PopulationHandle;
use super::retry::RetryPolicy;
use crate::cache::CacheStore;
use crate::config::PopulationConfig;
use crate::metrics;
use crate::upstream::{CatalogReference, FetchError, UpstreamClient};
use crate::{DexCacheError, Result};
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tracing::{debug, error, info, warn};

/// Where a population request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOrigin {
    /// Produced by a seed fan-out; counts toward population completion
    Seed,
    /// Submitted directly through the handle
    Submitted,
}

/// One unit of population work
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopulationRequest {
    pub reference: CatalogReference,
    /// Times this request has already been requeued
    pub retries: u32,
    pub origin: RequestOrigin,
}

impl PopulationRequest {
    pub fn new(reference: CatalogReference, origin: RequestOrigin) -> Self {
        Self {
            reference,
            retries: 0,
            origin,
        }
    }
}

/// Messages accepted by the worker
#[derive(Debug)]
pub(crate) enum WorkerMessage {
    /// Fetch the bulk index and fan it out
    Seed {
        reply: Option<oneshot::Sender<std::result::Result<usize, FetchError>>>,
    },

    /// Fetch one item and cache it
    Populate(PopulationRequest),

    /// Stop draining the queue
    Shutdown,
}

/// Counters shared between the worker and its handles
#[derive(Debug)]
pub(crate) struct PopulationStatus {
    pub(crate) attempts: AtomicU64,
    pub(crate) retries: AtomicU64,
    pub(crate) cached: AtomicU64,
    pub(crate) duplicates: AtomicU64,
    pub(crate) dropped: AtomicU64,
    pub(crate) pending_seed: AtomicUsize,
    pub(crate) queued: AtomicI64,
    pub(crate) seeded: AtomicBool,
    pub(crate) complete: watch::Receiver<bool>,
}

impl PopulationStatus {
    fn new(complete: watch::Receiver<bool>) -> Self {
        Self {
            attempts: AtomicU64::new(0),
            retries: AtomicU64::new(0),
            cached: AtomicU64::new(0),
            duplicates: AtomicU64::new(0),
            dropped: AtomicU64::new(0),
            pending_seed: AtomicUsize::new(0),
            queued: AtomicI64::new(0),
            seeded: AtomicBool::new(false),
            complete,
        }
    }

    pub(crate) fn is_complete(&self) -> bool {
        *self.complete.borrow()
    }

    pub(crate) fn snapshot(&self) -> PopulationStats {
        PopulationStats {
            attempts: self.attempts.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            cached: self.cached.load(Ordering::Relaxed),
            duplicates: self.duplicates.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            pending_seed: self.pending_seed.load(Ordering::Relaxed),
            queued: self.queued.load(Ordering::Relaxed).max(0) as usize,
            seeded: self.seeded.load(Ordering::Relaxed),
            complete: self.is_complete(),
        }
    }
}

/// Population statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulationStats {
    /// Detail fetches attempted, retries included
    pub attempts: u64,

    /// Requests pushed back onto the queue after a failure
    pub retries: u64,

    /// Records inserted into the cache
    pub cached: u64,

    /// Fetched records whose id was already cached
    pub duplicates: u64,

    /// Requests dropped after exhausting retries
    pub dropped: u64,

    /// Seed fan-out requests not yet finished
    pub pending_seed: usize,

    /// Messages waiting in the queue
    pub queued: usize,

    /// Whether a seed has fanned out
    pub seeded: bool,

    /// Whether the seed fan-out has fully finished
    pub complete: bool,
}

/// Sending side of the worker queue; keeps the depth gauge honest
#[derive(Debug, Clone)]
pub(crate) struct Inbox {
    tx: mpsc::UnboundedSender<WorkerMessage>,
    status: Arc<PopulationStatus>,
}

impl Inbox {
    pub(crate) fn send(&self, message: WorkerMessage) -> std::result::Result<(), WorkerMessage> {
        let depth = self.status.queued.fetch_add(1, Ordering::Relaxed) + 1;
        match self.tx.send(message) {
            Ok(()) => {
                metrics::set_queue_depth(depth);
                Ok(())
            }
            Err(mpsc::error::SendError(message)) => {
                self.status.queued.fetch_sub(1, Ordering::Relaxed);
                Err(message)
            }
        }
    }

    fn downgrade(&self) -> WeakInbox {
        WeakInbox {
            tx: self.tx.downgrade(),
            status: Arc::clone(&self.status),
        }
    }
}

/// Worker-side inbox. Does not keep the queue open, so the worker stops once
/// every handle is gone.
#[derive(Clone)]
struct WeakInbox {
    tx: mpsc::WeakUnboundedSender<WorkerMessage>,
    status: Arc<PopulationStatus>,
}

impl WeakInbox {
    fn send(&self, message: WorkerMessage) -> std::result::Result<(), WorkerMessage> {
        match self.tx.upgrade() {
            Some(tx) => Inbox {
                tx,
                status: Arc::clone(&self.status),
            }
            .send(message),
            None => Err(message),
        }
    }
}

/// Population worker
///
/// The single writer of the cache during population. Construct it with
/// [`PopulationWorker::start`], which returns the handle used to feed it.
pub struct PopulationWorker {
    client: Arc<dyn UpstreamClient>,
    store: Arc<CacheStore>,
    policy: RetryPolicy,
    inbox: WeakInbox,
    event_tx: broadcast::Sender<PopulationEvent>,
    status: Arc<PopulationStatus>,
    complete_tx: watch::Sender<bool>,
}

impl PopulationWorker {
    /// Initialize the cache table and spawn the worker task.
    ///
    /// The table is created before this returns, so no request can ever reach
    /// an uninitialized store. Failing to create it is fatal. Must be called
    /// from within a tokio runtime.
    pub fn start(
        store: Arc<CacheStore>,
        client: Arc<dyn UpstreamClient>,
        config: &PopulationConfig,
    ) -> Result<PopulationHandle> {
        store.initialize().map_err(DexCacheError::Startup)?;

        let (complete_tx, complete_rx) = watch::channel(false);
        let status = Arc::new(PopulationStatus::new(complete_rx));
        let (tx, rx) = mpsc::unbounded_channel();
        let (event_tx, _) = broadcast::channel(config.event_channel_capacity.max(1));
        let inbox = Inbox {
            tx,
            status: Arc::clone(&status),
        };

        let worker = Self {
            client,
            store: Arc::clone(&store),
            policy: config.retry_policy(),
            inbox: inbox.downgrade(),
            event_tx: event_tx.clone(),
            status: Arc::clone(&status),
            complete_tx,
        };

        info!(
            max_retries = ?worker.policy.max_retries,
            backoff_ms = worker.policy.initial_backoff.as_millis() as u64,
            "Starting population worker"
        );

        let task = tokio::spawn(worker.run(rx));

        Ok(PopulationHandle::new(inbox, event_tx, status, store, task))
    }

    /// Drain the queue until a shutdown message arrives or every handle is dropped
    async fn run(mut self, mut rx: mpsc::UnboundedReceiver<WorkerMessage>) {
        metrics::set_health_status(true);
        self.send_event(PopulationEvent::Started);

        while let Some(message) = rx.recv().await {
            let depth = self.status.queued.fetch_sub(1, Ordering::Relaxed) - 1;
            metrics::set_queue_depth(depth);

            match message {
                WorkerMessage::Seed { reply } => {
                    let result = self.seed().await;
                    if let Some(reply) = reply {
                        // Caller may have stopped waiting
                        let _ = reply.send(result);
                    }
                }
                WorkerMessage::Populate(request) => self.process(request).await,
                WorkerMessage::Shutdown => {
                    info!(
                        cached = self.status.cached.load(Ordering::Relaxed),
                        remaining = depth,
                        "Population worker shutting down"
                    );
                    break;
                }
            }
        }

        metrics::set_health_status(false);
        self.send_event(PopulationEvent::Stopped);
    }

    /// Fetch the bulk index and enqueue one request per reference
    async fn seed(&mut self) -> std::result::Result<usize, FetchError> {
        info!("Seeding cache from catalog index");
        let started = Instant::now();

        let references = match self.client.fetch_index().await {
            Ok(references) => references,
            Err(e) => {
                metrics::record_fetch_failure("index", e.kind_label());
                error!(error = %e, kind = e.kind_label(), "Failed to fetch catalog index");
                self.send_event(PopulationEvent::SeedFailed {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };
        metrics::record_fetch_duration("index", started.elapsed().as_secs_f64());

        let count = references.len();
        self.status.pending_seed.fetch_add(count, Ordering::SeqCst);
        self.status.seeded.store(true, Ordering::SeqCst);
        if count > 0 {
            // A new fan-out reopens a finished population
            self.complete_tx.send_replace(false);
        }

        for reference in references {
            self.enqueue(PopulationRequest::new(reference, RequestOrigin::Seed));
        }

        info!(references = count, "Catalog index fanned out");
        self.send_event(PopulationEvent::SeedCompleted { references: count });

        if self.status.pending_seed.load(Ordering::SeqCst) == 0 {
            self.mark_complete();
        }
        Ok(count)
    }

    /// Fetch one detail record and insert it
    async fn process(&mut self, request: PopulationRequest) {
        self.status.attempts.fetch_add(1, Ordering::Relaxed);
        let started = Instant::now();

        let detail = match self.client.fetch_detail(&request.reference).await {
            Ok(detail) => detail,
            Err(e) => {
                self.handle_failure(request, e);
                return;
            }
        };
        metrics::record_fetch_duration("detail", started.elapsed().as_secs_f64());

        let id = detail.id;
        match self.store.insert_if_absent(id, detail) {
            Ok(true) => {
                self.status.cached.fetch_add(1, Ordering::Relaxed);
                metrics::record_outcome("cached");
                debug!(id, name = %request.reference.name, "Cached catalog item");
                self.send_event(PopulationEvent::ItemCached {
                    id,
                    name: request.reference.name.clone(),
                });
            }
            Ok(false) => {
                self.status.duplicates.fetch_add(1, Ordering::Relaxed);
                metrics::record_outcome("duplicate");
                debug!(id, name = %request.reference.name, "Catalog item already cached");
                self.send_event(PopulationEvent::ItemAlreadyPresent { id });
            }
            Err(e) => {
                // The table is created in start(), so this means a broken invariant
                self.status.dropped.fetch_add(1, Ordering::Relaxed);
                metrics::record_outcome("dropped");
                error!(id, name = %request.reference.name, error = %e, "Cache rejected insert");
            }
        }

        self.finish(&request);
    }

    /// Log a failed fetch and requeue the request (or drop it past the cap)
    fn handle_failure(&mut self, mut request: PopulationRequest, err: FetchError) {
        let kind = err.kind_label();
        metrics::record_fetch_failure("detail", kind);

        let attempt = request.retries + 1;
        if err.is_dns_failure() {
            warn!(
                name = %request.reference.name,
                locator = %request.reference.locator,
                attempt,
                error = %err,
                "DNS resolution failed for catalog item"
            );
        } else {
            warn!(
                name = %request.reference.name,
                locator = %request.reference.locator,
                attempt,
                kind,
                error = %err,
                "Failed to fetch catalog item"
            );
        }

        if !self.policy.allows_retry(request.retries) {
            self.status.dropped.fetch_add(1, Ordering::Relaxed);
            metrics::record_outcome("dropped");
            error!(
                name = %request.reference.name,
                locator = %request.reference.locator,
                attempts = attempt,
                "Giving up on catalog item"
            );
            self.send_event(PopulationEvent::ItemDropped {
                name: request.reference.name.clone(),
                attempts: attempt,
            });
            self.finish(&request);
            return;
        }

        let delay = self.policy.backoff_duration(request.retries);
        request.retries += 1;
        self.status.retries.fetch_add(1, Ordering::Relaxed);
        metrics::record_outcome("retried");
        self.send_event(PopulationEvent::ItemRetrying {
            name: request.reference.name.clone(),
            attempt: request.retries,
            kind,
        });

        self.requeue(request, delay);
    }

    /// Push a request onto the tail of the queue, now or after `delay`
    fn requeue(&self, request: PopulationRequest, delay: Duration) {
        if delay.is_zero() {
            self.enqueue(request);
            return;
        }

        debug!(
            name = %request.reference.name,
            delay_ms = delay.as_millis() as u64,
            "Scheduling delayed requeue"
        );
        let inbox = self.inbox.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if inbox.send(WorkerMessage::Populate(request)).is_err() {
                debug!("Worker stopped before delayed requeue");
            }
        });
    }

    fn enqueue(&self, request: PopulationRequest) {
        // Fails only once every handle has been dropped
        if let Err(message) = self.inbox.send(WorkerMessage::Populate(request)) {
            warn!(?message, "Population queue closed, request lost");
        }
    }

    /// Account for a request that will not be processed again
    fn finish(&mut self, request: &PopulationRequest) {
        if request.origin != RequestOrigin::Seed {
            return;
        }
        let previous = self.status.pending_seed.fetch_sub(1, Ordering::SeqCst);
        if previous == 1 {
            self.mark_complete();
        }
    }

    fn mark_complete(&mut self) {
        if *self.complete_tx.borrow() {
            return;
        }
        self.complete_tx.send_replace(true);

        let cached = self.status.cached.load(Ordering::Relaxed);
        let dropped = self.status.dropped.load(Ordering::Relaxed);
        info!(
            cached,
            dropped,
            entries = self.store.count(),
            "Cache population complete"
        );
        self.send_event(PopulationEvent::PopulationComplete { cached, dropped });
    }

    /// Send an event, logging only at debug when nobody listens
    fn send_event(&self, event: PopulationEvent) {
        if self.event_tx.send(event).is_err() {
            tracing::trace!("Population event sent but no receivers subscribed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::upstream::{DetailRecord, TransportKind};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Upstream stub: fixed index, per-locator scripted failures
    struct ScriptedUpstream {
        index: std::result::Result<Vec<CatalogReference>, FetchError>,
        details: HashMap<String, serde_json::Value>,
        failures: Mutex<HashMap<String, (u32, FetchError)>>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedUpstream {
        fn new(entries: &[(&str, i64)]) -> Self {
            let index = entries
                .iter()
                .map(|(name, id)| CatalogReference::new(*name, format!("mem://{}", id)))
                .collect();
            let details = entries
                .iter()
                .map(|(name, id)| (format!("mem://{}", id), json!({"id": id, "name": name})))
                .collect();
            Self {
                index: Ok(index),
                details,
                failures: Mutex::new(HashMap::new()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn failing(self, locator: &str, times: u32, err: FetchError) -> Self {
            self.failures
                .lock()
                .unwrap()
                .insert(locator.to_string(), (times, err));
            self
        }

        fn calls_for(&self, locator: &str) -> usize {
            self.calls
                .lock()
                .unwrap()
                .iter()
                .filter(|l| l.as_str() == locator)
                .count()
        }
    }

    #[async_trait]
    impl UpstreamClient for ScriptedUpstream {
        async fn fetch_index(&self) -> std::result::Result<Vec<CatalogReference>, FetchError> {
            self.index.clone()
        }

        async fn fetch_detail(
            &self,
            reference: &CatalogReference,
        ) -> std::result::Result<DetailRecord, FetchError> {
            self.calls.lock().unwrap().push(reference.locator.clone());

            if let Some((remaining, err)) =
                self.failures.lock().unwrap().get_mut(&reference.locator)
            {
                if *remaining > 0 {
                    *remaining -= 1;
                    return Err(err.clone());
                }
            }

            let value = self
                .details
                .get(&reference.locator)
                .cloned()
                .ok_or_else(|| FetchError::transport(TransportKind::Status(404), "not found"))?;
            Ok(DetailRecord::from_value(value)?)
        }
    }

    fn dns_error() -> FetchError {
        FetchError::transport(TransportKind::DnsResolution, "failed to lookup address")
    }

    fn start(upstream: Arc<ScriptedUpstream>, config: PopulationConfig) -> PopulationHandle {
        PopulationWorker::start(Arc::new(CacheStore::new()), upstream, &config).unwrap()
    }

    async fn wait_complete(handle: &PopulationHandle) {
        tokio::time::timeout(Duration::from_secs(5), handle.wait_for_completion())
            .await
            .expect("population did not complete")
            .unwrap();
    }

    #[tokio::test]
    async fn test_start_initializes_store() {
        let store = Arc::new(CacheStore::new());
        let upstream = Arc::new(ScriptedUpstream::new(&[]));
        let _handle =
            PopulationWorker::start(Arc::clone(&store), upstream, &PopulationConfig::default())
                .unwrap();
        assert!(store.is_initialized());
    }

    #[tokio::test]
    async fn test_start_fails_on_initialized_store() {
        let store = Arc::new(CacheStore::new());
        store.initialize().unwrap();
        let upstream = Arc::new(ScriptedUpstream::new(&[]));

        let result = PopulationWorker::start(store, upstream, &PopulationConfig::default());
        assert!(matches!(result, Err(DexCacheError::Startup(_))));
    }

    #[tokio::test]
    async fn test_seed_fans_out_and_caches() {
        let upstream = Arc::new(ScriptedUpstream::new(&[
            ("bulbasaur", 1),
            ("ivysaur", 2),
            ("venusaur", 3),
        ]));
        let handle = start(Arc::clone(&upstream), PopulationConfig::default());

        assert_eq!(handle.seed().await.unwrap(), 3);
        wait_complete(&handle).await;

        assert_eq!(handle.store().count(), 3);
        assert_eq!(handle.store().lookup(2).unwrap().name(), Some("ivysaur"));
        for id in 1..=3 {
            assert_eq!(upstream.calls_for(&format!("mem://{}", id)), 1);
        }

        let stats = handle.stats();
        assert_eq!(stats.cached, 3);
        assert_eq!(stats.attempts, 3);
        assert_eq!(stats.pending_seed, 0);
        assert!(stats.complete);
    }

    #[tokio::test]
    async fn test_dns_failures_are_retried_until_success() {
        let upstream = Arc::new(
            ScriptedUpstream::new(&[("bulbasaur", 1), ("ivysaur", 2)])
                .failing("mem://1", 3, dns_error()),
        );
        let handle = start(Arc::clone(&upstream), PopulationConfig::default());

        handle.seed().await.unwrap();
        wait_complete(&handle).await;

        assert_eq!(upstream.calls_for("mem://1"), 4);
        assert_eq!(handle.store().count(), 2);
        assert_eq!(handle.stats().retries, 3);
    }

    #[tokio::test]
    async fn test_retries_reenter_at_tail() {
        let upstream = Arc::new(
            ScriptedUpstream::new(&[("bulbasaur", 1), ("ivysaur", 2)]).failing(
                "mem://1",
                1,
                FetchError::decode("truncated body"),
            ),
        );
        let handle = start(Arc::clone(&upstream), PopulationConfig::default());

        handle.seed().await.unwrap();
        wait_complete(&handle).await;

        let calls = upstream.calls.lock().unwrap().clone();
        assert_eq!(calls, vec!["mem://1", "mem://2", "mem://1"]);
    }

    #[tokio::test]
    async fn test_bounded_retries_drop_request() {
        let upstream = Arc::new(
            ScriptedUpstream::new(&[("bulbasaur", 1), ("missingno", 0)]).failing(
                "mem://0",
                u32::MAX,
                FetchError::transport(TransportKind::Status(500), "boom"),
            ),
        );
        let config = PopulationConfig {
            max_retries: Some(2),
            ..Default::default()
        };
        let handle = start(Arc::clone(&upstream), config);
        let mut events = handle.subscribe();

        handle.seed().await.unwrap();
        wait_complete(&handle).await;

        assert_eq!(upstream.calls_for("mem://0"), 3);
        assert_eq!(handle.store().count(), 1);
        assert_eq!(handle.stats().dropped, 1);

        let mut dropped = None;
        while let Ok(event) = events.try_recv() {
            if let PopulationEvent::ItemDropped { name, attempts } = event {
                dropped = Some((name, attempts));
            }
        }
        assert_eq!(dropped, Some(("missingno".to_string(), 3)));
    }

    #[tokio::test]
    async fn test_delayed_requeue() {
        let upstream = Arc::new(
            ScriptedUpstream::new(&[("bulbasaur", 1)]).failing("mem://1", 2, dns_error()),
        );
        let config = PopulationConfig {
            initial_backoff_ms: 5,
            max_backoff_ms: 20,
            ..Default::default()
        };
        let handle = start(Arc::clone(&upstream), config);

        handle.seed().await.unwrap();
        wait_complete(&handle).await;

        assert_eq!(upstream.calls_for("mem://1"), 3);
        assert!(handle.store().contains(1));
    }

    #[tokio::test]
    async fn test_seed_failure_surfaces_to_caller() {
        let mut upstream = ScriptedUpstream::new(&[]);
        upstream.index = Err(dns_error());
        let handle = start(Arc::new(upstream), PopulationConfig::default());

        let err = handle.seed().await.unwrap_err();
        assert!(matches!(err, DexCacheError::Fetch(ref e) if e.is_dns_failure()));
        assert!(!handle.is_complete());
        assert!(!handle.stats().seeded);
    }

    #[tokio::test]
    async fn test_empty_index_completes_immediately() {
        let handle = start(
            Arc::new(ScriptedUpstream::new(&[])),
            PopulationConfig::default(),
        );

        assert_eq!(handle.seed().await.unwrap(), 0);
        assert!(handle.is_complete());
    }

    #[tokio::test]
    async fn test_duplicate_submission_is_harmless() {
        let upstream = Arc::new(ScriptedUpstream::new(&[("pikachu", 25)]));
        let handle = start(Arc::clone(&upstream), PopulationConfig::default());

        let reference = CatalogReference::new("pikachu", "mem://25");
        handle.submit_item(reference.clone());
        handle.submit_item(reference);
        handle.shutdown().await.unwrap();

        assert_eq!(upstream.calls_for("mem://25"), 2);
        let stats = handle.stats();
        assert_eq!(stats.cached, 1);
        assert_eq!(stats.duplicates, 1);
        // Direct submissions never complete a population
        assert!(!stats.complete);
    }

    #[tokio::test]
    async fn test_negative_multiplier_keeps_worker_alive() {
        let upstream = Arc::new(ScriptedUpstream::new(&[("bulbasaur", 1)]).failing(
            "mem://1",
            2,
            FetchError::transport(TransportKind::Connect, "connection reset by peer"),
        ));
        let config = PopulationConfig {
            initial_backoff_ms: 1,
            multiplier: -2.0,
            ..Default::default()
        };
        let handle = start(Arc::clone(&upstream), config);

        handle.seed().await.unwrap();
        wait_complete(&handle).await;

        assert_eq!(upstream.calls_for("mem://1"), 3);
        assert!(handle.store().contains(1));
        handle.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_worker_stops_when_handles_dropped() {
        let handle = start(
            Arc::new(ScriptedUpstream::new(&[])),
            PopulationConfig::default(),
        );
        let mut events = handle.subscribe();
        drop(handle);

        let stopped = tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                match events.recv().await {
                    Ok(PopulationEvent::Stopped) => return true,
                    Ok(_) => continue,
                    Err(_) => return false,
                }
            }
        })
        .await
        .expect("worker kept running without handles");
        assert!(stopped);
    }

    #[tokio::test]
    async fn test_second_seed_reopens_population() {
        let upstream = Arc::new(ScriptedUpstream::new(&[("bulbasaur", 1)]));
        let config = PopulationConfig {
            initial_backoff_ms: 60_000,
            max_backoff_ms: 60_000,
            ..Default::default()
        };
        let handle = start(Arc::clone(&upstream), config);

        handle.seed().await.unwrap();
        wait_complete(&handle).await;
        assert!(handle.is_complete());

        // Keep the second fan-out in flight behind a long backoff
        upstream
            .failures
            .lock()
            .unwrap()
            .insert("mem://1".to_string(), (1, dns_error()));

        assert_eq!(handle.seed().await.unwrap(), 1);
        assert!(!handle.is_complete());
        assert_eq!(handle.stats().pending_seed, 1);
    }
}
