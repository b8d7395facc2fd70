//! Events emitted by the population worker

/// Population progress notifications
///
/// Delivered over a broadcast channel; slow subscribers may miss events, so
/// treat them as progress hints and use [`super::PopulationHandle::stats`] for
/// exact numbers.
#[derive(Debug, Clone, PartialEq)]
pub enum PopulationEvent {
    /// Worker started draining its queue
    Started,

    /// Worker stopped
    Stopped,

    /// Bulk index fetched and fanned out
    SeedCompleted {
        /// Number of population requests enqueued
        references: usize,
    },

    /// Bulk index fetch failed; nothing was enqueued
    SeedFailed {
        /// Error message
        message: String,
    },

    /// A record was inserted into the cache
    ItemCached {
        /// Record id
        id: i64,
        /// Reference name the record was fetched for
        name: String,
    },

    /// A record was fetched but its id was already cached
    ItemAlreadyPresent {
        /// Record id
        id: i64,
    },

    /// A request failed and went back onto the queue
    ItemRetrying {
        /// Reference name
        name: String,
        /// Retry number (1 for the first requeue)
        attempt: u32,
        /// Failure classification (dns, timeout, connect, status, transport, decode)
        kind: &'static str,
    },

    /// A request exhausted its retries and was dropped
    ItemDropped {
        /// Reference name
        name: String,
        /// Total fetch attempts made
        attempts: u32,
    },

    /// Every request from the seed fan-out has finished
    PopulationComplete {
        /// Records cached so far
        cached: u64,
        /// Requests dropped after exhausting retries
        dropped: u64,
    },
}
