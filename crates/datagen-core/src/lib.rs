//! Core types for the e-commerce activity generator.
//!
//! This crate provides the foundational types shared by every other crate
//! in the workspace:
//!
//! - [`State`] / [`EventType`] - the closed set of behavioral states a simulated
//!   shopper moves through, and the event type each one emits
//! - [`Event`] - an immutable behavioral event tagged with a walk's correlation id
//! - [`User`], [`Identity`], [`Product`] - the simulated actors and catalog
//! - [`EventStore`] / [`Catalog`] - the storage and catalog collaborators the
//!   simulator writes to and samples from
//!
//! # Architecture
//!
//! ```text
//! datagen-core (this crate)
//!    │
//!    ├─── datagen-faker       (seeded users/products, in-memory Catalog)
//!    ├─── datagen-workflow    (state machine, event sink, session runner)
//!    └─── datagen-postgresql  (EventStore + Catalog on PostgreSQL)
//! ```

pub mod event;
pub mod models;
pub mod state;
pub mod store;

// Re-exports for convenience
pub use event::{Event, Metadata};
pub use models::{Identity, Product, User};
pub use state::{EventType, State};
pub use store::{Catalog, CatalogError, EventStore, WriteError};
