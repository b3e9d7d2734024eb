//! Setup command runner.

use anyhow::Context;
use datagen_postgresql::{connect, ddl, mask_connection_password, PostgreSQLArgs};

/// Create the schema and tables the other commands rely on.
pub async fn run_setup(postgresql: PostgreSQLArgs, event_table: String) -> anyhow::Result<()> {
    tracing::info!(
        "Connecting to {}",
        mask_connection_password(&postgresql.postgresql_connection_string)
    );
    let client = connect(&postgresql.postgresql_connection_string)
        .await
        .context("Failed to connect to PostgreSQL")?;

    ddl::provision(&client, &postgresql.schema, &event_table)
        .await
        .with_context(|| format!("Failed to provision schema '{}'", postgresql.schema))?;

    tracing::info!(
        "Schema '{}' ready (tables: {}, {}, {})",
        postgresql.schema,
        ddl::USER_TABLE,
        ddl::PRODUCT_TABLE,
        event_table
    );
    Ok(())
}
