//! Schema and table provisioning.

use crate::error::PostgreSQLError;
use tokio_postgres::Client;
use tracing::{debug, info};

pub const USER_TABLE: &str = "user";
pub const PRODUCT_TABLE: &str = "product";
pub const EVENT_TABLE: &str = "event";

/// Quote an identifier for interpolation into SQL.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// `"schema"."table"`.
pub fn qualified(schema: &str, table: &str) -> String {
    format!("{}.{}", quote_ident(schema), quote_ident(table))
}

pub fn create_schema_sql(schema: &str) -> String {
    format!("CREATE SCHEMA IF NOT EXISTS {}", quote_ident(schema))
}

pub fn create_user_table_sql(schema: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
    id UUID PRIMARY KEY,
    username TEXT NOT NULL,
    first_name TEXT NOT NULL,
    last_name TEXT NOT NULL,
    gender TEXT NOT NULL,
    address TEXT NOT NULL,
    ip_address TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    updated_at TIMESTAMPTZ NOT NULL
)",
        qualified(schema, USER_TABLE)
    )
}

pub fn create_product_table_sql(schema: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
    id UUID PRIMARY KEY,
    name TEXT NOT NULL,
    main_category TEXT NOT NULL,
    sub_category TEXT NOT NULL,
    price DOUBLE PRECISION
)",
        qualified(schema, PRODUCT_TABLE)
    )
}

/// Event table. `table` is the configured event collection.
pub fn create_event_table_sql(schema: &str, table: &str) -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {} (
    id UUID PRIMARY KEY,
    event_type TEXT NOT NULL,
    context_id UUID NOT NULL,
    user_name TEXT NOT NULL,
    user_agent TEXT NOT NULL,
    ip_address TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    metadata JSONB NOT NULL DEFAULT '{{}}'::jsonb
)",
        qualified(schema, table)
    )
}

/// Every statement needed to provision `schema`, in execution order.
pub fn provision_statements(schema: &str, event_table: &str) -> Vec<String> {
    vec![
        create_schema_sql(schema),
        create_user_table_sql(schema),
        create_product_table_sql(schema),
        create_event_table_sql(schema, event_table),
    ]
}

/// Create the schema and tables if they do not exist.
pub async fn provision(
    client: &Client,
    schema: &str,
    event_table: &str,
) -> Result<(), PostgreSQLError> {
    info!("Provisioning schema '{}'", schema);
    for sql in provision_statements(schema, event_table) {
        debug!("DDL: {}", sql);
        client.batch_execute(&sql).await?;
    }
    Ok(())
}

/// Row count of `schema.table`.
pub async fn row_count(client: &Client, schema: &str, table: &str) -> Result<u64, PostgreSQLError> {
    let sql = format!("SELECT COUNT(*) FROM {}", qualified(schema, table));
    let row = client.query_one(&sql, &[]).await?;
    let count: i64 = row.get(0);
    Ok(count as u64)
}
