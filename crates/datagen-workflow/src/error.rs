//! Error types for the workflow simulator.

use datagen_core::{CatalogError, State, WriteError};
use std::fmt;

/// Malformed transition table or run configuration. Fatal before any session starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// A reachable state (or an edge target) has no transition entry.
    #[error("No transition defined for state {0}")]
    MissingTransition(State),

    /// A reachable non-terminal state has no handler bound.
    #[error("No handler bound to state {0}")]
    MissingHandler(State),

    /// A reachable non-terminal state has nowhere to go.
    #[error("State {0} has no candidate next states")]
    EmptyCandidates(State),

    #[error("Terminal state must not have outgoing transitions")]
    TerminalHasEdges,

    #[error("Entry state must not have incoming transitions (edge from {0})")]
    EntryHasIncoming(State),

    /// A state reachable from Entry from which Terminal cannot be reached.
    #[error("State {0} has no path to Terminal")]
    NoPathToTerminal(State),

    #[error("Invalid setting '{name}': {reason}")]
    InvalidSetting { name: &'static str, reason: String },
}

/// A state handler failed. Aborts the current walk only.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Handler for {state} failed: {message}")]
pub struct HandlerError {
    pub state: State,
    pub message: String,
}

impl HandlerError {
    pub fn new(state: State, message: impl Into<String>) -> Self {
        Self {
            state,
            message: message.into(),
        }
    }
}

/// Why a single walk did not reach Terminal cleanly.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WalkError {
    #[error(transparent)]
    Handler(#[from] HandlerError),

    /// A flush of the walk's events failed; that batch is lost.
    #[error("Event flush failed: {0}")]
    Write(#[from] WriteError),

    /// The run was cancelled. Always propagated after the walk's cleanup flush.
    #[error("Walk cancelled")]
    Cancelled,
}

/// Why a session ended in failure.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// Identity or product sampling failed; the session never ran a walk.
    #[error("Session could not start: {0}")]
    Catalog(#[from] CatalogError),

    /// A walk failed and the policy is to abort the session.
    #[error("Session aborted after walk failure: {0}")]
    Handler(HandlerError),

    #[error("Session event flush failed: {0}")]
    Write(WriteError),

    #[error("Session task panicked: {0}")]
    Panicked(String),
}

/// Error classification used to aggregate failures across a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ErrorKind {
    Handler,
    Write,
    CatalogUnavailable,
    Cancelled,
    Panicked,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Handler => "handler",
            ErrorKind::Write => "write",
            ErrorKind::CatalogUnavailable => "catalog_unavailable",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Panicked => "panicked",
        };
        f.write_str(name)
    }
}

impl WalkError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            WalkError::Handler(_) => ErrorKind::Handler,
            WalkError::Write(_) => ErrorKind::Write,
            WalkError::Cancelled => ErrorKind::Cancelled,
        }
    }
}

impl SessionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SessionError::Catalog(_) => ErrorKind::CatalogUnavailable,
            SessionError::Handler(_) => ErrorKind::Handler,
            SessionError::Write(_) => ErrorKind::Write,
            SessionError::Panicked(_) => ErrorKind::Panicked,
        }
    }
}
