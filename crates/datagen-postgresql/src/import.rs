//! Product catalog import from CSV.
//!
//! The header must name at least `name`, `main_category` and `sub_category`.
//! `id` and `actual_price` are optional. Rows that cannot be turned into a
//! product are skipped with a warning and counted.

use crate::ddl::{qualified, PRODUCT_TABLE};
use crate::error::PostgreSQLError;
use crate::insert::{insert_rows, product_params, OnConflict, Param, PRODUCT_COLUMNS};
use datagen_core::Product;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use std::time::{Duration, Instant};
use tokio_postgres::Client;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Metrics from an import.
#[derive(Debug, Clone, Default)]
pub struct ImportMetrics {
    pub rows_imported: u64,
    pub rows_skipped: u64,
    pub batch_count: u64,
    pub total_duration: Duration,
}

#[derive(Debug, Clone, Copy)]
struct CatalogColumns {
    id: Option<usize>,
    name: usize,
    main_category: usize,
    sub_category: usize,
    price: Option<usize>,
}

impl CatalogColumns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, PostgreSQLError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        Ok(Self {
            id: find("id"),
            name: find("name").ok_or(PostgreSQLError::MissingColumn("name"))?,
            main_category: find("main_category")
                .ok_or(PostgreSQLError::MissingColumn("main_category"))?,
            sub_category: find("sub_category")
                .ok_or(PostgreSQLError::MissingColumn("sub_category"))?,
            price: find("actual_price"),
        })
    }
}

/// Streams products out of a CSV source, skipping unusable rows.
pub struct CatalogReader<R: Read> {
    records: csv::StringRecordsIntoIter<R>,
    columns: CatalogColumns,
    line: u64,
    skipped: u64,
}

impl CatalogReader<File> {
    pub fn from_path(path: &Path) -> Result<Self, PostgreSQLError> {
        Self::new(File::open(path)?)
    }
}

impl<R: Read> CatalogReader<R> {
    pub fn new(reader: R) -> Result<Self, PostgreSQLError> {
        let mut csv_reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);
        let columns = CatalogColumns::from_headers(csv_reader.headers()?)?;
        debug!("Catalog columns: {:?}", columns);
        Ok(Self {
            records: csv_reader.into_records(),
            columns,
            line: 1,
            skipped: 0,
        })
    }

    /// Rows skipped so far.
    pub fn skipped(&self) -> u64 {
        self.skipped
    }

    fn parse(&self, record: &csv::StringRecord) -> Result<Product, String> {
        let field = |idx: usize, name: &str| {
            record
                .get(idx)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .ok_or_else(|| format!("missing {name}"))
        };
        let name = field(self.columns.name, "name")?;
        let main_category = field(self.columns.main_category, "main_category")?;
        let sub_category = field(self.columns.sub_category, "sub_category")?;

        let id = match self.columns.id.and_then(|idx| record.get(idx)).filter(|v| !v.is_empty()) {
            Some(raw) => Uuid::parse_str(raw).map_err(|e| format!("invalid id '{raw}': {e}"))?,
            None => product_id(&name, &main_category, &sub_category),
        };
        let price = self
            .columns
            .price
            .and_then(|idx| record.get(idx))
            .and_then(parse_price);

        Ok(Product {
            id,
            name,
            main_category,
            sub_category,
            price,
        })
    }
}

impl<R: Read> Iterator for CatalogReader<R> {
    type Item = Product;

    fn next(&mut self) -> Option<Product> {
        loop {
            let result = self.records.next()?;
            self.line += 1;
            let parsed = result
                .map_err(|e| e.to_string())
                .and_then(|record| self.parse(&record));
            match parsed {
                Ok(product) => return Some(product),
                Err(reason) => {
                    warn!("Skipping catalog line {}: {}", self.line, reason);
                    self.skipped += 1;
                }
            }
        }
    }
}

/// Stable id for a product without one, so re-importing a file upserts the
/// same rows.
pub fn product_id(name: &str, main_category: &str, sub_category: &str) -> Uuid {
    let key = format!("{main_category}\u{1f}{sub_category}\u{1f}{name}");
    Uuid::new_v5(&Uuid::NAMESPACE_OID, key.as_bytes())
}

/// Parse a price such as `₹1,099` or `$12.50`. Unparsable gives `None`.
pub fn parse_price(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|p| p.is_finite())
}

/// Upsert every product from `reader` into `schema.product` in batches.
pub async fn import_products<R: Read>(
    client: &Client,
    schema: &str,
    mut reader: CatalogReader<R>,
    batch_size: usize,
) -> Result<ImportMetrics, PostgreSQLError> {
    if batch_size == 0 {
        return Err(PostgreSQLError::Config(
            "batch size must be at least 1".to_string(),
        ));
    }
    let start_time = Instant::now();
    let table = qualified(schema, PRODUCT_TABLE);
    let mut metrics = ImportMetrics::default();
    let mut batch: Vec<Vec<Param>> = Vec::with_capacity(batch_size);

    info!("Importing products into {} (batch size: {})", table, batch_size);

    loop {
        let next = reader.next();
        if let Some(product) = &next {
            batch.push(product_params(product));
        }
        let done = next.is_none();
        if batch.len() >= batch_size || (done && !batch.is_empty()) {
            insert_rows(client, &table, PRODUCT_COLUMNS, OnConflict::Update, &batch).await?;
            metrics.rows_imported += batch.len() as u64;
            metrics.batch_count += 1;
            debug!(
                "Batch {} complete: {} products imported so far",
                metrics.batch_count, metrics.rows_imported
            );
            batch.clear();
        }
        if done {
            break;
        }
    }

    metrics.rows_skipped = reader.skipped();
    metrics.total_duration = start_time.elapsed();
    info!(
        "Import complete: {} products in {:?}, {} row(s) skipped",
        metrics.rows_imported, metrics.total_duration, metrics.rows_skipped
    );
    Ok(metrics)
}
