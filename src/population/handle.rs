//! Handle for feeding and observing a running population worker

use super::events::PopulationEvent;
use super::worker::{
    Inbox, PopulationRequest, PopulationStats, PopulationStatus, RequestOrigin, WorkerMessage,
};
use crate::cache::CacheStore;
use crate::upstream::CatalogReference;
use crate::{DexCacheError, Result};
use std::sync::Arc;
use tokio::sync::{broadcast, oneshot, Mutex};
use tokio::task::JoinHandle;

/// Cloneable handle to a running [`super::PopulationWorker`]
///
/// The worker stops on [`PopulationHandle::shutdown`] or once every clone of
/// the handle has been dropped.
#[derive(Debug, Clone)]
pub struct PopulationHandle {
    inbox: Inbox,
    event_tx: broadcast::Sender<PopulationEvent>,
    status: Arc<PopulationStatus>,
    store: Arc<CacheStore>,
    task: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl PopulationHandle {
    pub(crate) fn new(
        inbox: Inbox,
        event_tx: broadcast::Sender<PopulationEvent>,
        status: Arc<PopulationStatus>,
        store: Arc<CacheStore>,
        task: JoinHandle<()>,
    ) -> Self {
        Self {
            inbox,
            event_tx,
            status,
            store,
            task: Arc::new(Mutex::new(Some(task))),
        }
    }

    /// Enqueue one item population request. Fire-and-forget.
    pub fn submit_item(&self, reference: CatalogReference) {
        let request = PopulationRequest::new(reference, RequestOrigin::Submitted);
        if self.inbox.send(WorkerMessage::Populate(request)).is_err() {
            tracing::warn!("Population worker stopped, item request ignored");
        }
    }

    /// Enqueue the seeding protocol. Fire-and-forget; an index failure is
    /// logged and reported as [`PopulationEvent::SeedFailed`].
    pub fn trigger_seed(&self) {
        if self.inbox.send(WorkerMessage::Seed { reply: None }).is_err() {
            tracing::warn!("Population worker stopped, seed request ignored");
        }
    }

    /// Enqueue the seeding protocol and wait for the fan-out (not for the
    /// items themselves). Returns the number of references enqueued, or the
    /// index fetch error.
    pub async fn seed(&self) -> Result<usize> {
        let (reply, response) = oneshot::channel();
        self.inbox
            .send(WorkerMessage::Seed { reply: Some(reply) })
            .map_err(|_| DexCacheError::Worker("worker stopped".to_string()))?;

        let count = response
            .await
            .map_err(|_| DexCacheError::Worker("worker stopped before seeding".to_string()))??;
        Ok(count)
    }

    /// Get an event subscriber
    pub fn subscribe(&self) -> broadcast::Receiver<PopulationEvent> {
        self.event_tx.subscribe()
    }

    /// The store this worker populates
    pub fn store(&self) -> &Arc<CacheStore> {
        &self.store
    }

    /// Whether every request from the seed fan-outs so far has finished.
    ///
    /// A seed that enqueues at least one reference resets this to false.
    pub fn is_complete(&self) -> bool {
        self.status.is_complete()
    }

    /// Wait until the seed fan-out has fully finished.
    ///
    /// Fails if the worker stops before population completes.
    pub async fn wait_for_completion(&self) -> Result<()> {
        let mut complete = self.status.complete.clone();
        complete
            .wait_for(|done| *done)
            .await
            .map_err(|_| DexCacheError::Worker("worker stopped".to_string()))?;
        Ok(())
    }

    pub fn stats(&self) -> PopulationStats {
        self.status.snapshot()
    }

    /// Stop the worker once everything queued before this call is processed.
    ///
    /// Safe to call more than once.
    pub async fn shutdown(&self) -> Result<()> {
        // Already stopped when the send fails
        let _ = self.inbox.send(WorkerMessage::Shutdown);

        let task = self.task.lock().await.take();
        if let Some(task) = task {
            task.await
                .map_err(|e| DexCacheError::Worker(format!("worker task failed: {}", e)))?;
        }
        Ok(())
    }
}
