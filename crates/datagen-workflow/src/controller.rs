//! Concurrency controller: launches every session of a run under bounded
//! admission and joins them all.

use crate::admission::Admission;
use crate::config::RunConfig;
use crate::error::ConfigurationError;
use crate::report::RunReport;
use crate::session::{SessionReport, SessionRunner};
use crate::table::TransitionTable;
use datagen_core::{Catalog, EventStore};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::{Id, JoinError, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// A validated run, ready to start.
pub struct Simulation<S: ?Sized, C: ?Sized> {
    runner: SessionRunner<S, C>,
}

impl<S, C> Simulation<S, C>
where
    S: EventStore + ?Sized + 'static,
    C: Catalog + ?Sized + 'static,
{
    /// Validate the configuration. Nothing runs if this fails.
    ///
    /// The table is already validated by its builder.
    pub fn new(
        table: TransitionTable,
        store: Arc<S>,
        catalog: Arc<C>,
        config: RunConfig,
    ) -> Result<Self, ConfigurationError> {
        config.validate()?;
        Ok(Self {
            runner: SessionRunner::new(Arc::new(table), store, catalog, Arc::new(config)),
        })
    }

    pub fn config(&self) -> &RunConfig {
        self.runner.config()
    }

    /// Run every session, at most `max_concurrent_sessions` at a time.
    ///
    /// Returns once every launched session has finished or been cancelled
    /// and flushed. Session failures are collected, never propagated.
    pub async fn run(&self, cancel: CancellationToken) -> RunReport {
        let config = self.runner.config();
        let started = Instant::now();
        let admission = Admission::new(config.max_concurrent_sessions);
        let mut tasks: JoinSet<SessionReport> = JoinSet::new();
        let mut session_ids: HashMap<Id, u64> = HashMap::new();
        let mut report = RunReport::default();

        info!(
            "Starting {} session(s), {} walk(s) each, at most {} concurrent",
            config.total_sessions, config.walks_per_session, config.max_concurrent_sessions
        );

        for session_id in 0..config.total_sessions {
            let Some(token) = admission.acquire(&cancel).await else {
                report.sessions_not_started = config.total_sessions - session_id;
                warn!(
                    "Run cancelled, {} session(s) will not start",
                    report.sessions_not_started
                );
                break;
            };

            let runner = self.runner.clone();
            let session_cancel = cancel.clone();
            let handle = tasks.spawn(async move {
                runner.run(session_id, token, &session_cancel).await
            });
            session_ids.insert(handle.id(), session_id);
            debug!("Session {} admitted", session_id);

            while let Some(joined) = tasks.try_join_next() {
                collect(joined, &session_ids, &mut report);
            }
        }

        while let Some(joined) = tasks.join_next().await {
            collect(joined, &session_ids, &mut report);
        }

        report.peak_concurrency = admission.gauge().peak();
        report.cancelled = cancel.is_cancelled();
        report.elapsed = started.elapsed();

        info!(
            "Run finished in {:.2}s: {} completed, {} failed, {} cancelled",
            report.elapsed.as_secs_f64(),
            report.sessions_completed,
            report.sessions_failed,
            report.sessions_cancelled
        );
        report
    }
}

fn collect(
    joined: Result<SessionReport, JoinError>,
    session_ids: &HashMap<Id, u64>,
    report: &mut RunReport,
) {
    match joined {
        Ok(session) => report.record(&session),
        Err(e) => {
            let session_id = session_ids.get(&e.id()).copied().unwrap_or_default();
            let message = panic_message(e);
            error!("Session {} task died: {}", session_id, message);
            report.record_panic(session_id, message);
        }
    }
}

fn panic_message(e: JoinError) -> String {
    if !e.is_panic() {
        return e.to_string();
    }
    let payload = e.into_panic();
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}
