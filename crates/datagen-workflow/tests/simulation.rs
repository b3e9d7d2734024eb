//! Integration tests for full runs through the concurrency controller.
//!
//! These tests verify that:
//! 1. Admission never lets more than the configured number of sessions run
//! 2. A failing session does not affect its siblings, and failures are aggregated
//! 3. Cancellation reaches every session and each one flushes before the run returns

use async_trait::async_trait;
use datagen_core::{Catalog, CatalogError, Event, Identity, Product, State};
use datagen_faker::GeneratedCatalog;
use datagen_workflow::{
    ConfigurationError, ErrorKind, HandlerContext, HandlerError, MemoryEventStore, RunConfig,
    Simulation, StateHandler, TransitionTable, TransitionTableBuilder, WalkFailurePolicy,
};
use rand::rngs::StdRng;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn catalog() -> Arc<GeneratedCatalog> {
    Arc::new(GeneratedCatalog::generate(42, 20, 50))
}

/// Fails product views for one session only.
struct FailForSession(u64);

#[async_trait]
impl StateHandler for FailForSession {
    async fn handle(&self, ctx: &mut HandlerContext<'_>) -> Result<Option<Event>, HandlerError> {
        if ctx.session.id == self.0 {
            return Err(HandlerError::new(ctx.state, "injected failure"));
        }
        Ok(Some(ctx.event()))
    }
}

/// Panics for one session only.
struct PanicForSession(u64);

#[async_trait]
impl StateHandler for PanicForSession {
    async fn handle(&self, ctx: &mut HandlerContext<'_>) -> Result<Option<Event>, HandlerError> {
        if ctx.session.id == self.0 {
            panic!("handler bug");
        }
        Ok(Some(ctx.event()))
    }
}

/// Entry -> Authenticated -> ViewProduct -> Unauthenticated -> Terminal,
/// so every walk visits ViewProduct.
fn via_view_product(handler: impl StateHandler + 'static) -> TransitionTable {
    TransitionTableBuilder::storefront()
        .edges(State::Authenticated, [State::ViewProduct])
        .edges(State::ViewProduct, [State::Unauthenticated])
        .handler(State::ViewProduct, handler)
        .build()
        .unwrap()
}

/// Catalog that is unavailable for the first `n` identity requests.
struct FlakyCatalog {
    inner: GeneratedCatalog,
    failures_left: AtomicUsize,
}

#[async_trait]
impl Catalog for FlakyCatalog {
    async fn sample_identity(&self, rng: &mut StdRng) -> Result<Identity, CatalogError> {
        let failing = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(CatalogError::Unavailable("connection refused".to_string()));
        }
        self.inner.sample_identity(rng).await
    }

    async fn sample_products(
        &self,
        count: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<Product>, CatalogError> {
        self.inner.sample_products(count, rng).await
    }
}

#[tokio::test]
async fn test_run_completes_all_sessions() {
    let store = Arc::new(MemoryEventStore::new());
    let config = RunConfig {
        total_sessions: 12,
        max_concurrent_sessions: 4,
        walks_per_session: 2,
        ..RunConfig::default()
    };
    let simulation =
        Simulation::new(TransitionTable::storefront().unwrap(), store.clone(), catalog(), config)
            .unwrap();

    let report = simulation.run(CancellationToken::new()).await;

    assert!(report.is_success());
    assert_eq!(report.sessions_completed, 12);
    assert_eq!(report.walks_completed, 24);
    assert_eq!(report.events_written as usize, store.event_count());
    assert_eq!(report.events_dropped, 0);

    let walks: HashSet<_> = store.events().iter().map(|e| e.context_id).collect();
    assert_eq!(walks.len(), 24);
}

#[tokio::test(start_paused = true)]
async fn test_concurrency_never_exceeds_max() {
    let store = Arc::new(MemoryEventStore::new().with_write_delay(Duration::from_millis(5)));
    let config = RunConfig {
        total_sessions: 20,
        max_concurrent_sessions: 3,
        walks_per_session: 1,
        flush_threshold: 1,
        max_pacing: Some(Duration::from_millis(20)),
        ..RunConfig::default()
    };
    let simulation =
        Simulation::new(TransitionTable::storefront().unwrap(), store.clone(), catalog(), config)
            .unwrap();

    let report = simulation.run(CancellationToken::new()).await;

    assert_eq!(report.sessions_completed, 20);
    // Tokens are counted when issued, so with 20 sessions the bound is reached.
    assert_eq!(report.peak_concurrency, 3);
    assert!(store.max_in_flight() <= 3);
}

#[tokio::test]
async fn test_handler_failure_does_not_affect_sibling() {
    let store = Arc::new(MemoryEventStore::new());
    let config = RunConfig {
        total_sessions: 2,
        max_concurrent_sessions: 2,
        walks_per_session: 3,
        flush_threshold: 10,
        ..RunConfig::default()
    };
    let simulation =
        Simulation::new(via_view_product(FailForSession(0)), store.clone(), catalog(), config)
            .unwrap();

    let report = simulation.run(CancellationToken::new()).await;

    // Continue policy: the failing session records its walks and still completes.
    assert_eq!(report.sessions_completed, 2);
    assert_eq!(report.walks_failed, 3);
    assert_eq!(report.walks_completed, 3);
    assert_eq!(report.error_kinds[&ErrorKind::Handler], 3);

    // Session 0 flushed Entry and Login of each failed walk; session 1 wrote full walks.
    assert_eq!(store.event_count(), 3 * 2 + 3 * 5);
}

#[tokio::test]
async fn test_abort_policy_fails_only_that_session() {
    let store = Arc::new(MemoryEventStore::new());
    let config = RunConfig {
        total_sessions: 3,
        max_concurrent_sessions: 3,
        walks_per_session: 3,
        walk_failure_policy: WalkFailurePolicy::AbortSession,
        ..RunConfig::default()
    };
    let simulation =
        Simulation::new(via_view_product(FailForSession(1)), store.clone(), catalog(), config)
            .unwrap();

    let report = simulation.run(CancellationToken::new()).await;

    assert_eq!(report.sessions_completed, 2);
    assert_eq!(report.sessions_failed, 1);
    assert_eq!(report.walks_completed, 6);
    assert_eq!(report.walks_failed, 1);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].session_id, 1);
    assert_eq!(report.failures[0].kind, ErrorKind::Handler);
    assert!(!report.is_success());
}

#[tokio::test]
async fn test_catalog_failure_is_fatal_to_session_only() {
    let store = Arc::new(MemoryEventStore::new());
    let catalog = Arc::new(FlakyCatalog {
        inner: GeneratedCatalog::generate(42, 20, 50),
        failures_left: AtomicUsize::new(1),
    });
    let config = RunConfig {
        total_sessions: 4,
        max_concurrent_sessions: 1,
        ..RunConfig::default()
    };
    let simulation =
        Simulation::new(TransitionTable::storefront().unwrap(), store.clone(), catalog, config)
            .unwrap();

    let report = simulation.run(CancellationToken::new()).await;

    assert_eq!(report.sessions_failed, 1);
    assert_eq!(report.sessions_completed, 3);
    assert_eq!(report.failures[0].session_id, 0);
    assert_eq!(report.error_kinds[&ErrorKind::CatalogUnavailable], 1);
}

#[tokio::test]
async fn test_write_failure_fails_session_and_is_collected() {
    let store = Arc::new(MemoryEventStore::new().fail_batches(1));
    let config = RunConfig {
        total_sessions: 3,
        max_concurrent_sessions: 1,
        ..RunConfig::default()
    };
    let simulation = Simulation::new(
        TransitionTable::storefront().unwrap(),
        store.clone(),
        shared_catalog(),
        config,
    )
    .unwrap();

    let report = simulation.run(CancellationToken::new()).await;

    assert_eq!(report.sessions_failed, 1);
    assert_eq!(report.sessions_completed, 2);
    assert_eq!(report.failures[0].session_id, 0);
    assert_eq!(report.error_kinds[&ErrorKind::Write], 1);
    assert!(report.events_dropped > 0);
    assert_eq!(report.events_written as usize, store.event_count());
}

fn shared_catalog() -> Arc<dyn Catalog> {
    catalog()
}

#[tokio::test]
async fn test_panicking_session_is_reported_and_releases_its_slot() {
    let store = Arc::new(MemoryEventStore::new());
    let config = RunConfig {
        total_sessions: 4,
        max_concurrent_sessions: 1,
        walks_per_session: 1,
        ..RunConfig::default()
    };
    let simulation =
        Simulation::new(via_view_product(PanicForSession(2)), store, catalog(), config).unwrap();

    let report = simulation.run(CancellationToken::new()).await;

    assert_eq!(report.sessions_completed, 3);
    assert_eq!(report.sessions_failed, 1);
    assert_eq!(report.failures[0].session_id, 2);
    assert_eq!(report.failures[0].kind, ErrorKind::Panicked);
    assert!(report.failures[0].message.contains("handler bug"));
}

#[tokio::test(start_paused = true)]
async fn test_cancellation_flushes_every_session() {
    let store = Arc::new(MemoryEventStore::new());
    let config = RunConfig {
        total_sessions: 10,
        max_concurrent_sessions: 4,
        walks_per_session: 1_000,
        flush_threshold: 1_000,
        max_pacing: Some(Duration::from_millis(50)),
        ..RunConfig::default()
    };
    let simulation =
        Simulation::new(TransitionTable::storefront().unwrap(), store.clone(), catalog(), config)
            .unwrap();
    let cancel = CancellationToken::new();

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(500)).await;
            cancel.cancel();
        })
    };
    let report = simulation.run(cancel).await;
    canceller.await.unwrap();

    assert!(report.cancelled);
    assert!(!report.is_success());
    assert_eq!(report.sessions_cancelled, 4);
    assert_eq!(report.sessions_not_started, 6);
    assert_eq!(report.sessions_total(), 10);
    assert_eq!(report.error_kinds[&ErrorKind::Cancelled], 4);

    assert!(store.batch_count() >= 4);
    assert_eq!(report.events_written as usize, store.event_count());
    assert_eq!(report.events_dropped, 0);
}

#[test]
fn test_invalid_config_rejected_before_run() {
    let config = RunConfig {
        max_concurrent_sessions: 0,
        ..RunConfig::default()
    };
    let result = Simulation::new(
        TransitionTable::storefront().unwrap(),
        Arc::new(MemoryEventStore::new()),
        catalog(),
        config,
    );
    assert!(matches!(
        result.err(),
        Some(ConfigurationError::InvalidSetting { .. })
    ));
}
