//! Probabilistic shopper workflow simulator.
//!
//! Simulated shoppers walk a state graph (entry, login, browsing, product
//! views, cart changes, logout) and emit one behavioral event per state.
//! Many sessions run concurrently under a bounded admission pool and write
//! their events in batches to an injected [`EventStore`].
//!
//! # Architecture
//!
//! ```text
//!   Simulation ──(SessionToken)──▶ SessionRunner ──▶ Walk ──▶ StateHandler
//!       │                              │               │
//!       │ JoinSet over all sessions    │ one EventSink │ choose_next on
//!       ▼                              ▼ per session   ▼ TransitionTable
//!   RunReport                      EventStore::write_batch
//! ```
//!
//! Every walk force-flushes its sink on every exit path (Terminal, handler
//! error, cancellation). A batch whose write fails is dropped, not retried.
//!
//! # Example
//!
//! ```rust
//! use datagen_faker::GeneratedCatalog;
//! use datagen_workflow::{MemoryEventStore, RunConfig, Simulation, TransitionTable};
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//!
//! # tokio_test_block_on(async {
//! let store = Arc::new(MemoryEventStore::new());
//! let catalog = Arc::new(GeneratedCatalog::generate(42, 10, 50));
//! let simulation = Simulation::new(
//!     TransitionTable::storefront().unwrap(),
//!     store.clone(),
//!     catalog,
//!     RunConfig::default(),
//! )
//! .unwrap();
//!
//! let report = simulation.run(CancellationToken::new()).await;
//! assert!(report.is_success());
//! assert_eq!(report.events_written as usize, store.event_count());
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Runtime::new().unwrap().block_on(f)
//! # }
//! ```
//!
//! [`EventStore`]: datagen_core::EventStore

pub mod admission;
pub mod config;
pub mod controller;
pub mod error;
pub mod handlers;
pub mod memory;
pub mod report;
pub mod session;
pub mod sink;
pub mod table;
pub mod walk;

// Re-exports for convenience
pub use admission::{Admission, ConcurrencyGauge, SessionToken};
pub use config::{RunConfig, WalkFailurePolicy};
pub use controller::Simulation;
pub use error::{ConfigurationError, ErrorKind, HandlerError, SessionError, WalkError};
pub use handlers::{HandlerContext, StateHandler};
pub use memory::MemoryEventStore;
pub use report::{RunReport, SessionFailure};
pub use session::{Session, SessionOutcome, SessionReport, SessionRunner};
pub use sink::{EventSink, SinkMetrics, DEFAULT_FLUSH_THRESHOLD};
pub use table::{TransitionTable, TransitionTableBuilder};
pub use walk::{Walk, WalkOutcome};
