//! Batched multi-row INSERT logic.

use datagen_core::{Event, Product, User};
use tokio_postgres::types::ToSql;
use tokio_postgres::Client;

/// Default batch size for INSERT operations.
pub const DEFAULT_BATCH_SIZE: usize = 100;

/// PostgreSQL's bind parameter limit per statement.
const MAX_PARAMETERS: usize = 65_535;

pub const USER_COLUMNS: &[&str] = &[
    "id",
    "username",
    "first_name",
    "last_name",
    "gender",
    "address",
    "ip_address",
    "created_at",
    "updated_at",
];

pub const PRODUCT_COLUMNS: &[&str] = &["id", "name", "main_category", "sub_category", "price"];

pub const EVENT_COLUMNS: &[&str] = &[
    "id",
    "event_type",
    "context_id",
    "user_name",
    "user_agent",
    "ip_address",
    "created_at",
    "metadata",
];

pub type Param = Box<dyn ToSql + Sync + Send>;

/// What to do when a row with the same `id` already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnConflict {
    DoNothing,
    /// Overwrite every non-key column.
    Update,
}

/// Build an INSERT of `rows` rows with numbered placeholders.
///
/// `table` must already be quoted.
pub fn build_insert_sql(
    table: &str,
    columns: &[&str],
    rows: usize,
    on_conflict: OnConflict,
) -> String {
    let col_count = columns.len();
    let mut param_idx = 1;
    let placeholders: Vec<String> = (0..rows)
        .map(|_| {
            let row_placeholders: Vec<String> = (0..col_count)
                .map(|_| {
                    let p = format!("${param_idx}");
                    param_idx += 1;
                    p
                })
                .collect();
            format!("({})", row_placeholders.join(", "))
        })
        .collect();

    let conflict = match on_conflict {
        OnConflict::DoNothing => "ON CONFLICT (\"id\") DO NOTHING".to_string(),
        OnConflict::Update => format!(
            "ON CONFLICT (\"id\") DO UPDATE SET {}",
            columns
                .iter()
                .filter(|c| **c != "id")
                .map(|c| format!("\"{c}\" = EXCLUDED.\"{c}\""))
                .collect::<Vec<_>>()
                .join(", ")
        ),
    };

    format!(
        "INSERT INTO {} ({}) VALUES {} {}",
        table,
        columns
            .iter()
            .map(|c| format!("\"{c}\""))
            .collect::<Vec<_>>()
            .join(", "),
        placeholders.join(", "),
        conflict
    )
}

/// Rows that fit in one statement without exceeding the parameter limit.
pub fn max_rows_per_statement(columns: usize) -> usize {
    (MAX_PARAMETERS / columns.max(1)).max(1)
}

/// Insert rows of parameters, splitting into as many statements as the
/// parameter limit requires. Returns the number of rows affected.
pub async fn insert_rows(
    client: &Client,
    table: &str,
    columns: &[&str],
    on_conflict: OnConflict,
    rows: &[Vec<Param>],
) -> Result<u64, tokio_postgres::Error> {
    let mut affected = 0;
    for chunk in rows.chunks(max_rows_per_statement(columns.len())) {
        let sql = build_insert_sql(table, columns, chunk.len(), on_conflict);
        let param_refs: Vec<&(dyn ToSql + Sync)> = chunk
            .iter()
            .flatten()
            .map(|p| p.as_ref() as &(dyn ToSql + Sync))
            .collect();
        affected += client.execute(&sql, &param_refs).await?;
    }
    Ok(affected)
}

pub fn user_params(user: &User) -> Vec<Param> {
    vec![
        Box::new(user.id),
        Box::new(user.username.clone()),
        Box::new(user.first_name.clone()),
        Box::new(user.last_name.clone()),
        Box::new(user.gender.clone()),
        Box::new(user.address.clone()),
        Box::new(user.ip_address.clone()),
        Box::new(user.created_at),
        Box::new(user.updated_at),
    ]
}

pub fn product_params(product: &Product) -> Vec<Param> {
    vec![
        Box::new(product.id),
        Box::new(product.name.clone()),
        Box::new(product.main_category.clone()),
        Box::new(product.sub_category.clone()),
        Box::new(product.price),
    ]
}

pub fn event_params(event: &Event) -> Vec<Param> {
    vec![
        Box::new(event.id),
        Box::new(event.event_type.as_str().to_string()),
        Box::new(event.context_id),
        Box::new(event.user_name.clone()),
        Box::new(event.user_agent.clone()),
        Box::new(event.ip_address.clone()),
        Box::new(event.created_at),
        Box::new(event.metadata_value()),
    ]
}
