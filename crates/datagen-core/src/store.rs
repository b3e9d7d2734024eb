//! Collaborator traits: where events are written and where sessions are sampled from.
//!
//! The simulator owns neither the storage layer nor the catalog. Both are
//! injected as trait objects or generics, so the same engine runs against
//! PostgreSQL, an in-memory store, or a test double.

use crate::event::Event;
use crate::models::{Identity, Product};
use async_trait::async_trait;
use rand::rngs::StdRng;

/// Error returned by [`EventStore::write_batch`].
///
/// A batch that failed to write is not retried by the simulator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WriteError {
    /// Storage could not be reached.
    #[error("Storage connectivity error: {0}")]
    Connectivity(String),

    /// Storage rejected the batch (constraint violation, bad data).
    #[error("Storage rejected batch for '{collection}': {message}")]
    Rejected { collection: String, message: String },
}

/// Error returned by [`Catalog`] sampling.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    /// The catalog could not be queried.
    #[error("Catalog unavailable: {0}")]
    Unavailable(String),

    /// The catalog has nothing to sample from.
    #[error("Catalog has no {0} to sample")]
    Empty(String),
}

/// Storage collaborator for behavioral events.
///
/// Implementations must tolerate concurrent callers: sessions flush their own
/// batches independently and no cross-session lock is taken.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Upsert a batch of events into the named collection.
    async fn write_batch(&self, collection: &str, records: &[Event]) -> Result<(), WriteError>;
}

/// Identity and product catalog collaborator.
///
/// Randomness comes from the caller's RNG so that a seeded session samples
/// the same identity and products on every run.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Pick the identity a session acts under.
    async fn sample_identity(&self, rng: &mut StdRng) -> Result<Identity, CatalogError>;

    /// Pick up to `count` products visible to a session.
    async fn sample_products(
        &self,
        count: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<Product>, CatalogError>;
}
