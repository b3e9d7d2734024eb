//! One traversal of the transition table, from Entry to Terminal.

use crate::error::WalkError;
use crate::handlers::HandlerContext;
use crate::session::Session;
use crate::sink::EventSink;
use crate::table::TransitionTable;
use datagen_core::{EventStore, State};
use rand::rngs::StdRng;
use rand::Rng;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use uuid::Uuid;

/// Result of a walk that reached Terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkOutcome {
    pub correlation_id: Uuid,
    pub terminal: State,
    /// States visited, Entry and Terminal included.
    pub steps: u64,
    /// Events handed to the sink.
    pub events: u64,
}

#[derive(Debug, Default)]
struct Progress {
    steps: u64,
    events: u64,
}

/// A single walk, tagged with its correlation id.
pub struct Walk<'a> {
    table: &'a TransitionTable,
    session: &'a Session,
    correlation_id: Uuid,
    max_pacing: Option<Duration>,
}

impl<'a> Walk<'a> {
    pub fn new(table: &'a TransitionTable, session: &'a Session, correlation_id: Uuid) -> Self {
        Self {
            table,
            session,
            correlation_id,
            max_pacing: None,
        }
    }

    /// Sleep a uniform random duration in `[0, max]` between steps.
    pub fn with_pacing(mut self, max_pacing: Option<Duration>) -> Self {
        self.max_pacing = max_pacing;
        self
    }

    pub fn correlation_id(&self) -> Uuid {
        self.correlation_id
    }

    /// Walk from Entry until Terminal, a handler failure or cancellation.
    ///
    /// The sink is force-flushed on every exit path before this returns. When
    /// the walk already failed, a failing final flush is logged and the
    /// original error is returned.
    pub async fn run<S: EventStore + ?Sized>(
        &self,
        sink: &mut EventSink<S>,
        rng: &mut StdRng,
        cancel: &CancellationToken,
    ) -> Result<WalkOutcome, WalkError> {
        let mut progress = Progress::default();
        let result = self.drive(sink, rng, cancel, &mut progress).await;
        let flushed = sink.force_flush().await;

        match (result, flushed) {
            (Ok(terminal), Ok(())) => {
                debug!(
                    "Walk {} reached {} after {} step(s)",
                    self.correlation_id, terminal, progress.steps
                );
                Ok(WalkOutcome {
                    correlation_id: self.correlation_id,
                    terminal,
                    steps: progress.steps,
                    events: progress.events,
                })
            }
            (Ok(_), Err(e)) => Err(WalkError::Write(e)),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(flush_error)) => {
                warn!(
                    "Final flush of walk {} failed after it stopped ({}): {}",
                    self.correlation_id, e, flush_error
                );
                Err(e)
            }
        }
    }

    async fn drive<S: EventStore + ?Sized>(
        &self,
        sink: &mut EventSink<S>,
        rng: &mut StdRng,
        cancel: &CancellationToken,
        progress: &mut Progress,
    ) -> Result<State, WalkError> {
        let mut cursor = State::Entry;
        loop {
            if cancel.is_cancelled() {
                return Err(WalkError::Cancelled);
            }

            let handler = self.table.handler(cursor);
            let mut ctx = HandlerContext {
                state: cursor,
                correlation_id: self.correlation_id,
                session: self.session,
                rng: &mut *rng,
            };
            let produced = tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(WalkError::Cancelled),
                result = handler.handle(&mut ctx) => result?,
            };
            progress.steps += 1;

            if let Some(event) = produced {
                progress.events += 1;
                sink.buffer(event).await?;
            }

            if cursor.is_terminal() {
                return Ok(cursor);
            }

            cursor = self.table.choose_next(cursor, rng);
            self.pace(rng, cancel).await?;
        }
    }

    async fn pace(&self, rng: &mut StdRng, cancel: &CancellationToken) -> Result<(), WalkError> {
        let max = match self.max_pacing {
            Some(max) if !max.is_zero() => max,
            _ => return Ok(()),
        };
        let delay = rng.gen_range(Duration::ZERO..=max);
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(WalkError::Cancelled),
            _ = tokio::time::sleep(delay) => Ok(()),
        }
    }
}
