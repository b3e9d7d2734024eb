//! Run-level summary aggregated from session reports.

use crate::error::ErrorKind;
use crate::session::{SessionOutcome, SessionReport};
use std::collections::BTreeMap;
use std::fmt;
use std::time::Duration;

/// One failed session, kept for the summary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFailure {
    pub session_id: u64,
    pub kind: ErrorKind,
    pub message: String,
}

/// What happened over a whole run.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub sessions_completed: u64,
    pub sessions_failed: u64,
    pub sessions_cancelled: u64,
    /// Sessions never admitted because the run was cancelled first.
    pub sessions_not_started: u64,
    pub walks_completed: u64,
    pub walks_failed: u64,
    pub events_written: u64,
    /// Events lost to failed flushes.
    pub events_dropped: u64,
    pub flush_count: u64,
    pub peak_concurrency: usize,
    /// Distinct error kinds seen, with how often each occurred. Counts session
    /// failures, cancelled sessions, and walks that failed inside surviving sessions.
    pub error_kinds: BTreeMap<ErrorKind, u64>,
    pub failures: Vec<SessionFailure>,
    pub cancelled: bool,
    pub elapsed: Duration,
}

impl RunReport {
    pub fn record(&mut self, session: &SessionReport) {
        self.walks_completed += u64::from(session.walks_completed);
        self.walks_failed += u64::from(session.walks_failed);
        self.events_written += session.sink.events_written;
        self.events_dropped += session.sink.events_dropped;
        self.flush_count += session.sink.flush_count;

        for walk_error in &session.walk_errors {
            *self.error_kinds.entry(walk_error.kind()).or_default() += 1;
        }

        match &session.outcome {
            SessionOutcome::Completed => self.sessions_completed += 1,
            SessionOutcome::Cancelled => {
                self.sessions_cancelled += 1;
                *self.error_kinds.entry(ErrorKind::Cancelled).or_default() += 1;
            }
            SessionOutcome::Failed(e) => {
                self.sessions_failed += 1;
                let kind = e.kind();
                // Walk errors that failed the session were counted above.
                if !session.walk_errors.iter().any(|w| w.kind() == kind) {
                    *self.error_kinds.entry(kind).or_default() += 1;
                }
                self.failures.push(SessionFailure {
                    session_id: session.session_id,
                    kind,
                    message: e.to_string(),
                });
            }
        }
    }

    /// Record a session whose task died before returning a report.
    pub fn record_panic(&mut self, session_id: u64, message: String) {
        self.sessions_failed += 1;
        *self.error_kinds.entry(ErrorKind::Panicked).or_default() += 1;
        self.failures.push(SessionFailure {
            session_id,
            kind: ErrorKind::Panicked,
            message,
        });
    }

    pub fn sessions_total(&self) -> u64 {
        self.sessions_completed
            + self.sessions_failed
            + self.sessions_cancelled
            + self.sessions_not_started
    }

    /// No session failed and the run was not cancelled.
    pub fn is_success(&self) -> bool {
        self.sessions_failed == 0 && !self.cancelled
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Sessions: {} completed, {} failed, {} cancelled, {} not started",
            self.sessions_completed,
            self.sessions_failed,
            self.sessions_cancelled,
            self.sessions_not_started
        )?;
        writeln!(
            f,
            "Walks: {} completed, {} failed",
            self.walks_completed, self.walks_failed
        )?;
        writeln!(
            f,
            "Events: {} written in {} flush(es), {} dropped",
            self.events_written, self.flush_count, self.events_dropped
        )?;
        write!(
            f,
            "Peak concurrent sessions: {}, elapsed {:.2}s",
            self.peak_concurrency,
            self.elapsed.as_secs_f64()
        )?;
        if !self.error_kinds.is_empty() {
            let kinds: Vec<String> = self
                .error_kinds
                .iter()
                .map(|(kind, count)| format!("{kind} x{count}"))
                .collect();
            write!(f, "\nErrors: {}", kinds.join(", "))?;
        }
        if self.cancelled {
            write!(f, "\nRun was cancelled")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{HandlerError, SessionError, WalkError};
    use datagen_core::{CatalogError, State};

    #[test]
    fn test_record_mixed_outcomes() {
        let mut report = RunReport::default();

        let mut ok = SessionReport::new(0, SessionOutcome::Completed);
        ok.walks_completed = 2;
        ok.walks_failed = 1;
        ok.walk_errors
            .push(WalkError::Handler(HandlerError::new(State::ViewProduct, "boom")));
        ok.sink.events_written = 12;
        report.record(&ok);

        let failed = SessionReport::new(
            1,
            SessionOutcome::Failed(SessionError::Catalog(CatalogError::Unavailable(
                "down".to_string(),
            ))),
        );
        report.record(&failed);
        report.record_panic(2, "index out of bounds".to_string());

        assert_eq!(report.sessions_completed, 1);
        assert_eq!(report.sessions_failed, 2);
        assert_eq!(report.walks_failed, 1);
        assert_eq!(report.events_written, 12);
        assert_eq!(report.error_kinds[&ErrorKind::Handler], 1);
        assert_eq!(report.error_kinds[&ErrorKind::CatalogUnavailable], 1);
        assert_eq!(report.error_kinds[&ErrorKind::Panicked], 1);
        assert_eq!(report.failures.len(), 2);
        assert!(!report.is_success());
    }

    #[test]
    fn test_aborting_walk_error_counted_once() {
        let mut report = RunReport::default();
        let handler_error = HandlerError::new(State::Browsing, "boom");
        let mut session = SessionReport::new(
            0,
            SessionOutcome::Failed(SessionError::Handler(handler_error.clone())),
        );
        session.walks_failed = 1;
        session.walk_errors.push(WalkError::Handler(handler_error));

        report.record(&session);
        assert_eq!(report.error_kinds[&ErrorKind::Handler], 1);
    }

    #[test]
    fn test_cancelled_sessions_counted_as_error_kind() {
        let mut report = RunReport::default();
        report.record(&SessionReport::new(0, SessionOutcome::Cancelled));
        report.record(&SessionReport::new(1, SessionOutcome::Cancelled));
        report.record(&SessionReport::new(2, SessionOutcome::Completed));

        assert_eq!(report.sessions_cancelled, 2);
        assert_eq!(report.error_kinds[&ErrorKind::Cancelled], 2);
        assert_eq!(report.error_kinds.len(), 1);
        assert!(report.to_string().contains("cancelled x2"));
    }

    #[test]
    fn test_display_lists_error_kinds() {
        let mut report = RunReport::default();
        report.record_panic(0, "boom".to_string());
        report.cancelled = true;

        let text = report.to_string();
        assert!(text.contains("0 completed, 1 failed"));
        assert!(text.contains("panicked x1"));
        assert!(text.contains("cancelled"));
    }
}
