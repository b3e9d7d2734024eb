//! Session runner: one simulated shopper performing repeated walks.

use crate::admission::SessionToken;
use crate::config::{RunConfig, WalkFailurePolicy};
use crate::error::{SessionError, WalkError};
use crate::sink::{EventSink, SinkMetrics};
use crate::table::TransitionTable;
use crate::walk::Walk;
use datagen_core::{Catalog, CatalogError, EventStore, Identity, Product};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// What a session acts with: an identity and a fixed product sample.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: u64,
    pub identity: Identity,
    pub products: Vec<Product>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    Completed,
    Failed(SessionError),
    Cancelled,
}

/// Per-session result collected by the controller.
#[derive(Debug, Clone)]
pub struct SessionReport {
    pub session_id: u64,
    /// `None` if the session never got an identity.
    pub username: Option<String>,
    pub outcome: SessionOutcome,
    pub walks_completed: u32,
    pub walks_failed: u32,
    pub walk_errors: Vec<WalkError>,
    /// States visited across completed walks.
    pub steps: u64,
    pub sink: SinkMetrics,
    pub elapsed: Duration,
}

impl SessionReport {
    pub fn new(session_id: u64, outcome: SessionOutcome) -> Self {
        Self {
            session_id,
            username: None,
            outcome,
            walks_completed: 0,
            walks_failed: 0,
            walk_errors: Vec::new(),
            steps: 0,
            sink: SinkMetrics::default(),
            elapsed: Duration::ZERO,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.outcome == SessionOutcome::Completed
    }
}

/// Runs sessions against shared, read-only run state.
///
/// Cheap to clone; every spawned session task gets its own handle.
pub struct SessionRunner<S: ?Sized, C: ?Sized> {
    table: Arc<TransitionTable>,
    store: Arc<S>,
    catalog: Arc<C>,
    config: Arc<RunConfig>,
}

impl<S: ?Sized, C: ?Sized> Clone for SessionRunner<S, C> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            store: self.store.clone(),
            catalog: self.catalog.clone(),
            config: self.config.clone(),
        }
    }
}

impl<S, C> SessionRunner<S, C>
where
    S: EventStore + ?Sized,
    C: Catalog + ?Sized,
{
    pub fn new(
        table: Arc<TransitionTable>,
        store: Arc<S>,
        catalog: Arc<C>,
        config: Arc<RunConfig>,
    ) -> Self {
        Self {
            table,
            store,
            catalog,
            config,
        }
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Run session `session_id` while holding `token`.
    ///
    /// The token is released only after the session's final flush, whatever
    /// the outcome.
    pub async fn run(
        &self,
        session_id: u64,
        token: SessionToken,
        cancel: &CancellationToken,
    ) -> SessionReport {
        let started = Instant::now();
        let mut report = SessionReport::new(session_id, SessionOutcome::Completed);

        report.outcome = self.drive(session_id, cancel, &mut report).await;
        report.elapsed = started.elapsed();
        drop(token);

        match &report.outcome {
            SessionOutcome::Completed => info!(
                "Session {} completed: {} walk(s), {} failed, {} event(s) written",
                session_id, report.walks_completed, report.walks_failed, report.sink.events_written
            ),
            SessionOutcome::Failed(e) => error!("Session {} failed: {}", session_id, e),
            SessionOutcome::Cancelled => info!(
                "Session {} cancelled after {} walk(s), {} event(s) written",
                session_id, report.walks_completed, report.sink.events_written
            ),
        }
        report
    }

    async fn drive(
        &self,
        session_id: u64,
        cancel: &CancellationToken,
        report: &mut SessionReport,
    ) -> SessionOutcome {
        let mut rng = StdRng::seed_from_u64(self.config.session_seed(session_id));

        let session = match self.start(session_id, &mut rng, cancel).await {
            Ok(Some(session)) => session,
            Ok(None) => return SessionOutcome::Cancelled,
            Err(e) => return SessionOutcome::Failed(e),
        };
        report.username = Some(session.identity.username.clone());
        debug!(
            "Session {} acting as '{}' with {} product(s)",
            session_id,
            session.identity.username,
            session.products.len()
        );

        let mut sink = EventSink::new(
            self.store.clone(),
            self.config.event_collection.as_str(),
            self.config.flush_threshold,
        );
        let outcome = self.walks(&session, &mut sink, &mut rng, cancel, report).await;
        let flushed = sink.force_flush().await;
        report.sink = sink.metrics();

        match (outcome, flushed) {
            (SessionOutcome::Completed, Err(e)) => SessionOutcome::Failed(SessionError::Write(e)),
            (outcome, _) => outcome,
        }
    }

    /// Sample identity and products. `Ok(None)` if cancelled first.
    async fn start(
        &self,
        session_id: u64,
        rng: &mut StdRng,
        cancel: &CancellationToken,
    ) -> Result<Option<Session>, SessionError> {
        let sampled = tokio::select! {
            biased;
            _ = cancel.cancelled() => return Ok(None),
            sampled = self.sample(rng) => sampled,
        };
        let (identity, products) = sampled?;
        Ok(Some(Session {
            id: session_id,
            identity,
            products,
        }))
    }

    async fn sample(&self, rng: &mut StdRng) -> Result<(Identity, Vec<Product>), CatalogError> {
        let identity = self.catalog.sample_identity(rng).await?;
        let products = self
            .catalog
            .sample_products(self.config.product_sample_size, rng)
            .await?;
        Ok((identity, products))
    }

    async fn walks(
        &self,
        session: &Session,
        sink: &mut EventSink<S>,
        rng: &mut StdRng,
        cancel: &CancellationToken,
        report: &mut SessionReport,
    ) -> SessionOutcome {
        for repetition in 0..self.config.walks_per_session {
            let walk = Walk::new(&self.table, session, Uuid::new_v4())
                .with_pacing(self.config.max_pacing);

            match walk.run(sink, rng, cancel).await {
                Ok(outcome) => {
                    report.walks_completed += 1;
                    report.steps += outcome.steps;
                }
                Err(WalkError::Cancelled) => return SessionOutcome::Cancelled,
                Err(WalkError::Write(e)) => {
                    report.walks_failed += 1;
                    report.walk_errors.push(WalkError::Write(e.clone()));
                    return SessionOutcome::Failed(SessionError::Write(e));
                }
                Err(WalkError::Handler(e)) => {
                    report.walks_failed += 1;
                    report.walk_errors.push(WalkError::Handler(e.clone()));
                    warn!(
                        "Session {} walk {} ({}) failed: {}",
                        session.id,
                        repetition + 1,
                        walk.correlation_id(),
                        e
                    );
                    if self.config.walk_failure_policy == WalkFailurePolicy::AbortSession {
                        return SessionOutcome::Failed(SessionError::Handler(e));
                    }
                }
            }
        }
        SessionOutcome::Completed
    }
}
