//! Fake user population.

use crate::ddl::{qualified, USER_TABLE};
use crate::error::PostgreSQLError;
use crate::insert::{insert_rows, user_params, OnConflict, Param, DEFAULT_BATCH_SIZE, USER_COLUMNS};
use datagen_core::User;
use datagen_faker::FakeDataGenerator;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_postgres::Client;
use tracing::{debug, info};

/// Metrics from a populate operation.
#[derive(Debug, Clone, Default)]
pub struct PopulateMetrics {
    /// Number of rows inserted.
    pub rows_inserted: u64,
    /// Total time taken.
    pub total_duration: Duration,
    /// Time spent generating data.
    pub generation_duration: Duration,
    /// Time spent inserting data.
    pub insert_duration: Duration,
    /// Number of batches executed.
    pub batch_count: u64,
}

impl PopulateMetrics {
    /// Calculate rows per second.
    pub fn rows_per_second(&self) -> f64 {
        if self.total_duration.as_secs_f64() > 0.0 {
            self.rows_inserted as f64 / self.total_duration.as_secs_f64()
        } else {
            0.0
        }
    }
}

/// Generates users from a seed and inserts them in batches.
///
/// Rows are inserted with `ON CONFLICT DO NOTHING`, so re-running with the
/// same seed adds nothing. Use another seed to append users.
pub struct UserPopulator {
    client: Arc<Client>,
    schema: String,
    generator: FakeDataGenerator,
    batch_size: usize,
}

impl UserPopulator {
    pub fn new(client: Arc<Client>, schema: impl Into<String>, seed: u64) -> Self {
        Self {
            client,
            schema: schema.into(),
            generator: FakeDataGenerator::new(seed),
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    /// Set the batch size for INSERT operations.
    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Get the current generation index.
    pub fn current_index(&self) -> u64 {
        self.generator.current_index()
    }

    /// Insert `count` generated users.
    pub async fn populate(&mut self, count: u64) -> Result<PopulateMetrics, PostgreSQLError> {
        let start_time = Instant::now();
        let mut metrics = PopulateMetrics::default();
        let table = qualified(&self.schema, USER_TABLE);

        info!(
            "Populating {} with {} users (batch size: {})",
            table, count, self.batch_size
        );

        let mut remaining = count;
        let mut generation_time = Duration::ZERO;
        let mut insert_time = Duration::ZERO;

        while remaining > 0 {
            let batch_count = std::cmp::min(remaining, self.batch_size as u64);

            let gen_start = Instant::now();
            let users: Vec<User> = self.generator.users(batch_count).collect();
            let rows: Vec<Vec<Param>> = users.iter().map(user_params).collect();
            generation_time += gen_start.elapsed();

            let insert_start = Instant::now();
            let inserted =
                insert_rows(&self.client, &table, USER_COLUMNS, OnConflict::DoNothing, &rows)
                    .await?;
            insert_time += insert_start.elapsed();

            metrics.rows_inserted += inserted;
            metrics.batch_count += 1;
            remaining -= batch_count;

            debug!(
                "Batch {} complete: {} rows inserted, {} remaining",
                metrics.batch_count, inserted, remaining
            );
        }

        metrics.total_duration = start_time.elapsed();
        metrics.generation_duration = generation_time;
        metrics.insert_duration = insert_time;

        info!(
            "Population complete: {} rows in {:?} ({:.2} rows/sec)",
            metrics.rows_inserted,
            metrics.total_duration,
            metrics.rows_per_second()
        );

        Ok(metrics)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics() {
        let metrics = PopulateMetrics {
            rows_inserted: 1000,
            total_duration: Duration::from_secs(10),
            generation_duration: Duration::from_secs(2),
            insert_duration: Duration::from_secs(8),
            batch_count: 10,
        };

        assert_eq!(metrics.rows_per_second(), 100.0);
    }

    #[test]
    fn test_metrics_zero_duration() {
        assert_eq!(PopulateMetrics::default().rows_per_second(), 0.0);
    }
}
