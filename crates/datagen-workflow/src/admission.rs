//! Admission control: bounds how many sessions run at once.
//!
//! A session may only start while it holds a [`SessionToken`]. Tokens are
//! backed by semaphore permits and give their slot back when dropped, which
//! happens on every exit path of a session including panics.

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_util::sync::CancellationToken;

/// Live and historical token counts.
#[derive(Debug, Default)]
pub struct ConcurrencyGauge {
    active: AtomicUsize,
    peak: AtomicUsize,
    acquired: AtomicU64,
    released: AtomicU64,
}

impl ConcurrencyGauge {
    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Highest number of tokens held at the same time.
    pub fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    pub fn acquired(&self) -> u64 {
        self.acquired.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> u64 {
        self.released.load(Ordering::SeqCst)
    }

    fn enter(&self) {
        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        self.acquired.fetch_add(1, Ordering::SeqCst);
    }

    fn leave(&self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        self.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Issues at most `max` tokens at a time.
#[derive(Debug, Clone)]
pub struct Admission {
    semaphore: Arc<Semaphore>,
    gauge: Arc<ConcurrencyGauge>,
    max: usize,
}

impl Admission {
    pub fn new(max: usize) -> Self {
        Self {
            semaphore: Arc::new(Semaphore::new(max)),
            gauge: Arc::new(ConcurrencyGauge::default()),
            max,
        }
    }

    pub fn max(&self) -> usize {
        self.max
    }

    /// Wait for a free slot. Returns `None` if `cancel` fires first.
    pub async fn acquire(&self, cancel: &CancellationToken) -> Option<SessionToken> {
        let permit = tokio::select! {
            biased;
            _ = cancel.cancelled() => return None,
            permit = self.semaphore.clone().acquire_owned() => permit.ok()?,
        };
        self.gauge.enter();
        Some(SessionToken {
            _permit: permit,
            gauge: self.gauge.clone(),
        })
    }

    pub fn gauge(&self) -> &ConcurrencyGauge {
        &self.gauge
    }
}

/// Permission for one session to run. Releases its slot on drop.
#[derive(Debug)]
pub struct SessionToken {
    _permit: OwnedSemaphorePermit,
    gauge: Arc<ConcurrencyGauge>,
}

impl Drop for SessionToken {
    fn drop(&mut self) {
        // The permit field drops after this, so the gauge never reads above max.
        self.gauge.leave();
    }
}
