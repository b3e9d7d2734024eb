//! PostgreSQL collaborator for the e-commerce activity generator.
//!
//! Provides:
//! - schema and table provisioning ([`ddl`])
//! - batched fake-user population ([`UserPopulator`])
//! - product catalog import from CSV ([`import`])
//! - [`PostgreSQLEventStore`], the simulator's event sink target
//! - [`PostgreSQLCatalog`], sampling identities and products from the tables
//!
//! # Example
//!
//! ```ignore
//! let client = datagen_postgresql::connect(
//!     "host=localhost user=postgres password=postgres dbname=shop",
//! ).await?;
//! datagen_postgresql::ddl::provision(&client, "public", "event").await?;
//! let store = PostgreSQLEventStore::new(client.clone(), "public");
//! let catalog = PostgreSQLCatalog::new(client, "public");
//! ```

pub mod args;
pub mod catalog;
pub mod client;
pub mod ddl;
pub mod error;
pub mod import;
pub mod insert;
pub mod populate;
pub mod store;

pub use args::{BatchArgs, PostgreSQLArgs};
pub use catalog::PostgreSQLCatalog;
pub use client::{connect, mask_connection_password};
pub use error::PostgreSQLError;
pub use import::{import_products, CatalogReader, ImportMetrics};
pub use populate::{PopulateMetrics, UserPopulator};
pub use store::PostgreSQLEventStore;
