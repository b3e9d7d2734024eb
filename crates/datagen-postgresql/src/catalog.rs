//! [`Catalog`] backed by the user and product tables.

use crate::ddl::{qualified, PRODUCT_TABLE, USER_TABLE};
use async_trait::async_trait;
use datagen_core::{Catalog, CatalogError, Identity, Product};
use datagen_faker::generators::network::generate_user_agent;
use rand::rngs::StdRng;
use rand::Rng;
use std::sync::Arc;
use tokio_postgres::Client;

/// Samples identities and products with a salt drawn from the session RNG,
/// so a seeded session picks the same rows on every run over the same data.
#[derive(Clone)]
pub struct PostgreSQLCatalog {
    client: Arc<Client>,
    schema: String,
}

impl PostgreSQLCatalog {
    pub fn new(client: Arc<Client>, schema: impl Into<String>) -> Self {
        Self {
            client,
            schema: schema.into(),
        }
    }
}

/// Order rows pseudo-randomly by hashing their id with a salt.
pub fn sample_sql(table: &str, columns: &str) -> String {
    format!("SELECT {columns} FROM {table} ORDER BY md5(id::text || $1), id LIMIT $2")
}

fn salt(rng: &mut StdRng) -> String {
    format!("{:016x}", rng.gen::<u64>())
}

fn unavailable(e: tokio_postgres::Error) -> CatalogError {
    CatalogError::Unavailable(e.to_string())
}

#[async_trait]
impl Catalog for PostgreSQLCatalog {
    async fn sample_identity(&self, rng: &mut StdRng) -> Result<Identity, CatalogError> {
        let sql = sample_sql(
            &qualified(&self.schema, USER_TABLE),
            "id, username, ip_address",
        );
        let salt = salt(rng);
        let row = self
            .client
            .query_opt(&sql, &[&salt, &1i64])
            .await
            .map_err(unavailable)?
            .ok_or_else(|| CatalogError::Empty("users".to_string()))?;

        Ok(Identity {
            user_id: row.get(0),
            username: row.get(1),
            ip_address: row.get(2),
            user_agent: generate_user_agent(rng),
        })
    }

    async fn sample_products(
        &self,
        count: usize,
        rng: &mut StdRng,
    ) -> Result<Vec<Product>, CatalogError> {
        let sql = sample_sql(
            &qualified(&self.schema, PRODUCT_TABLE),
            "id, name, main_category, sub_category, price",
        );
        let salt = salt(rng);
        let limit = i64::try_from(count).unwrap_or(i64::MAX);
        let rows = self
            .client
            .query(&sql, &[&salt, &limit])
            .await
            .map_err(unavailable)?;
        if rows.is_empty() {
            return Err(CatalogError::Empty("products".to_string()));
        }

        Ok(rows
            .iter()
            .map(|row| Product {
                id: row.get(0),
                name: row.get(1),
                main_category: row.get(2),
                sub_category: row.get(3),
                price: row.get(4),
            })
            .collect())
    }
}
