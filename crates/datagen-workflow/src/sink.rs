//! Per-session event buffer with threshold flushing.
//!
//! Events are appended in the order a walk produces them and handed to the
//! [`EventStore`] in batches. A batch is taken out of the buffer before the
//! write is attempted: if the write fails those events are dropped, never
//! retried, so each event is delivered at most once.

use datagen_core::{Event, EventStore, WriteError};
use std::mem;
use std::sync::Arc;
use tracing::{debug, warn};

/// Buffered events that trigger a flush when no threshold is configured.
pub const DEFAULT_FLUSH_THRESHOLD: usize = 5;

/// Counters for one sink, reported per session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SinkMetrics {
    pub events_buffered: u64,
    pub events_written: u64,
    pub events_dropped: u64,
    pub flush_count: u64,
    pub failed_flushes: u64,
}

impl SinkMetrics {
    pub fn merge(&mut self, other: &SinkMetrics) {
        self.events_buffered += other.events_buffered;
        self.events_written += other.events_written;
        self.events_dropped += other.events_dropped;
        self.flush_count += other.flush_count;
        self.failed_flushes += other.failed_flushes;
    }
}

/// Ordered event buffer owned by one session.
///
/// Not shared between sessions; concurrent sessions only meet at the store.
pub struct EventSink<S: ?Sized> {
    store: Arc<S>,
    collection: String,
    threshold: usize,
    pending: Vec<Event>,
    metrics: SinkMetrics,
}

impl<S: EventStore + ?Sized> EventSink<S> {
    /// A threshold of 0 is treated as 1.
    pub fn new(store: Arc<S>, collection: impl Into<String>, threshold: usize) -> Self {
        let threshold = threshold.max(1);
        Self {
            store,
            collection: collection.into(),
            threshold,
            pending: Vec::with_capacity(threshold),
            metrics: SinkMetrics::default(),
        }
    }

    /// Append an event, flushing if the buffer reaches the threshold.
    pub async fn buffer(&mut self, event: Event) -> Result<(), WriteError> {
        self.pending.push(event);
        self.metrics.events_buffered += 1;
        if self.pending.len() >= self.threshold {
            self.flush().await?;
        }
        Ok(())
    }

    /// Write whatever is pending, regardless of the threshold.
    ///
    /// No-op on an empty buffer, so calling it twice writes nothing the
    /// second time.
    pub async fn force_flush(&mut self) -> Result<(), WriteError> {
        if self.pending.is_empty() {
            return Ok(());
        }
        self.flush().await
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn metrics(&self) -> SinkMetrics {
        self.metrics
    }

    async fn flush(&mut self) -> Result<(), WriteError> {
        let batch = mem::take(&mut self.pending);
        let size = batch.len() as u64;
        self.metrics.flush_count += 1;

        match self.store.write_batch(&self.collection, &batch).await {
            Ok(()) => {
                self.metrics.events_written += size;
                debug!(
                    "Flushed {} event(s) to '{}'",
                    size, self.collection
                );
                Ok(())
            }
            Err(e) => {
                self.metrics.events_dropped += size;
                self.metrics.failed_flushes += 1;
                warn!(
                    "Dropped batch of {} event(s) for '{}': {}",
                    size, self.collection, e
                );
                Err(e)
            }
        }
    }
}

impl<S: ?Sized> Drop for EventSink<S> {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            warn!(
                "Event sink for '{}' dropped with {} unflushed event(s)",
                self.collection,
                self.pending.len()
            );
        }
    }
}
