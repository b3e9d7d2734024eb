//! In-memory [`EventStore`], used for dry runs and by tests.

use async_trait::async_trait;
use datagen_core::{Event, EventStore, WriteError};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

type RejectFn = dyn Fn(&str, &[Event]) -> Option<String> + Send + Sync;

#[derive(Default)]
struct Recorded {
    batches: Vec<(String, Vec<Event>)>,
    batch_count: usize,
    event_count: usize,
}

/// Records every batch it receives.
///
/// Can be slowed down or told to fail, to exercise the simulator's flush and
/// concurrency behavior.
#[derive(Default)]
pub struct MemoryEventStore {
    recorded: Mutex<Recorded>,
    write_delay: Option<Duration>,
    failures_left: AtomicUsize,
    reject: Option<Box<RejectFn>>,
    count_only: bool,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl MemoryEventStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Keep counts only, not the events themselves.
    pub fn counting() -> Self {
        Self {
            count_only: true,
            ..Self::default()
        }
    }

    /// Sleep this long inside every write.
    pub fn with_write_delay(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    /// Fail the next `n` writes with a connectivity error.
    pub fn fail_batches(self, n: usize) -> Self {
        self.failures_left.store(n, Ordering::SeqCst);
        self
    }

    /// Reject any batch for which `predicate` returns a message.
    pub fn reject_when<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&str, &[Event]) -> Option<String> + Send + Sync + 'static,
    {
        self.reject = Some(Box::new(predicate));
        self
    }

    /// Accepted batches in arrival order.
    pub fn batches(&self) -> Vec<(String, Vec<Event>)> {
        self.lock().batches.clone()
    }

    /// Accepted events in arrival order.
    pub fn events(&self) -> Vec<Event> {
        self.lock()
            .batches
            .iter()
            .flat_map(|(_, batch)| batch.iter().cloned())
            .collect()
    }

    pub fn batch_count(&self) -> usize {
        self.lock().batch_count
    }

    pub fn event_count(&self) -> usize {
        self.lock().event_count
    }

    /// Most writes observed in progress at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn lock(&self) -> MutexGuard<'_, Recorded> {
        // A panicking test thread must not hide what was recorded before it.
        self.recorded
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_failure(&self) -> bool {
        self.failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[async_trait]
impl EventStore for MemoryEventStore {
    async fn write_batch(&self, collection: &str, records: &[Event]) -> Result<(), WriteError> {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        if let Some(delay) = self.write_delay {
            tokio::time::sleep(delay).await;
        }

        let result = if self.take_failure() {
            Err(WriteError::Connectivity("injected write failure".to_string()))
        } else if let Some(message) = self.reject.as_ref().and_then(|f| f(collection, records)) {
            Err(WriteError::Rejected {
                collection: collection.to_string(),
                message,
            })
        } else {
            let mut recorded = self.lock();
            recorded.batch_count += 1;
            recorded.event_count += records.len();
            if !self.count_only {
                recorded
                    .batches
                    .push((collection.to_string(), records.to_vec()));
            }
            Ok(())
        };

        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }
}
