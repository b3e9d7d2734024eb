//! Import-products command runner.

use anyhow::Context;
use datagen_postgresql::{
    connect, import_products, mask_connection_password, BatchArgs, CatalogReader, PostgreSQLArgs,
};
use std::path::PathBuf;

/// Upsert every usable row of the catalog CSV at `file`.
pub async fn run_import_products(
    postgresql: PostgreSQLArgs,
    file: PathBuf,
    batch: BatchArgs,
) -> anyhow::Result<()> {
    let reader = CatalogReader::from_path(&file)
        .with_context(|| format!("Failed to open catalog {}", file.display()))?;

    tracing::info!(
        "Importing {} via {}",
        file.display(),
        mask_connection_password(&postgresql.postgresql_connection_string)
    );
    let client = connect(&postgresql.postgresql_connection_string)
        .await
        .context("Failed to connect to PostgreSQL")?;

    let metrics = import_products(&client, &postgresql.schema, reader, batch.batch_size)
        .await
        .with_context(|| format!("Failed to import products from {}", file.display()))?;

    if metrics.rows_imported == 0 {
        anyhow::bail!(
            "No products imported from {} ({} row(s) skipped)",
            file.display(),
            metrics.rows_skipped
        );
    }
    Ok(())
}
