//! Populate-users command runner.

use anyhow::Context;
use datagen_postgresql::{connect, mask_connection_password, BatchArgs, PostgreSQLArgs, UserPopulator};

/// Generate `count` users from `seed` and insert them.
pub async fn run_populate_users(
    postgresql: PostgreSQLArgs,
    count: u64,
    seed: u64,
    batch: BatchArgs,
) -> anyhow::Result<()> {
    tracing::info!(
        "Populating {} users (seed={}) via {}",
        count,
        seed,
        mask_connection_password(&postgresql.postgresql_connection_string)
    );
    let client = connect(&postgresql.postgresql_connection_string)
        .await
        .context("Failed to connect to PostgreSQL")?;

    let mut populator = UserPopulator::new(client, &postgresql.schema, seed)
        .with_batch_size(batch.batch_size);
    let metrics = populator
        .populate(count)
        .await
        .context("Failed to populate users")?;

    tracing::info!(
        "Generated {} users, inserted {} in {} batch(es), {:.2} rows/sec (generation {:?}, insert {:?})",
        populator.current_index(),
        metrics.rows_inserted,
        metrics.batch_count,
        metrics.rows_per_second(),
        metrics.generation_duration,
        metrics.insert_duration
    );
    Ok(())
}
