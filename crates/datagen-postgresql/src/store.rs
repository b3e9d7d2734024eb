//! [`EventStore`] backed by PostgreSQL.

use crate::ddl::qualified;
use crate::insert::{event_params, insert_rows, OnConflict, Param, EVENT_COLUMNS};
use async_trait::async_trait;
use datagen_core::{Event, EventStore, WriteError};
use std::sync::Arc;
use tokio_postgres::Client;
use tracing::debug;

/// Upserts event batches into `schema.<collection>`.
///
/// Holds no lock: concurrent sessions pipeline their batches over the shared
/// client.
#[derive(Clone)]
pub struct PostgreSQLEventStore {
    client: Arc<Client>,
    schema: String,
}

impl PostgreSQLEventStore {
    pub fn new(client: Arc<Client>, schema: impl Into<String>) -> Self {
        Self {
            client,
            schema: schema.into(),
        }
    }
}

#[async_trait]
impl EventStore for PostgreSQLEventStore {
    async fn write_batch(&self, collection: &str, records: &[Event]) -> Result<(), WriteError> {
        if records.is_empty() {
            return Ok(());
        }
        let table = qualified(&self.schema, collection);
        let rows: Vec<Vec<Param>> = records.iter().map(event_params).collect();

        insert_rows(&self.client, &table, EVENT_COLUMNS, OnConflict::Update, &rows)
            .await
            .map_err(|e| classify_write_error(collection, &e))?;

        debug!("Upserted {} event(s) into {}", records.len(), table);
        Ok(())
    }
}

/// Server-side errors (constraint, type, missing table) reject the batch;
/// anything else means the server could not be reached.
fn classify_write_error(collection: &str, e: &tokio_postgres::Error) -> WriteError {
    match e.as_db_error() {
        Some(db) => WriteError::Rejected {
            collection: collection.to_string(),
            message: format!("{} ({})", db.message(), db.code().code()),
        },
        None => WriteError::Connectivity(e.to_string()),
    }
}
