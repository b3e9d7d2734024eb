//! Simulate command runner.

use crate::cli::SimulateArgs;
use anyhow::Context;
use datagen_core::{Catalog, EventStore};
use datagen_faker::GeneratedCatalog;
use datagen_postgresql::{connect, mask_connection_password, PostgreSQLCatalog, PostgreSQLEventStore};
use datagen_workflow::{MemoryEventStore, RunReport, Simulation, TransitionTable};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Run the simulation described by `args` until every session finished or
/// `cancel` fired.
///
/// Fails when the configuration is invalid, the run was cancelled, or any
/// session failed. The summary is logged in every case where the run started.
pub async fn run_simulate(
    args: SimulateArgs,
    cancel: CancellationToken,
) -> anyhow::Result<RunReport> {
    let report = if args.dry_run {
        tracing::info!(
            "[DRY-RUN] Using {} generated users and {} generated products (seed={}), events are counted in memory",
            args.dry_run_users,
            args.dry_run_products,
            args.seed
        );
        let store = Arc::new(MemoryEventStore::counting());
        let catalog = Arc::new(GeneratedCatalog::generate(
            args.seed,
            args.dry_run_users,
            args.dry_run_products,
        ));
        let report = simulate(&args, store.clone(), catalog, cancel).await?;
        tracing::info!(
            "[DRY-RUN] {} event(s) accepted in {} batch(es)",
            store.event_count(),
            store.batch_count()
        );
        report
    } else {
        let connection_string = args
            .postgresql_connection_string
            .as_deref()
            .context("--postgresql-connection-string is required unless --dry-run is set")?;
        tracing::info!(
            "Connecting to {}",
            mask_connection_password(connection_string)
        );
        let client = connect(connection_string)
            .await
            .context("Failed to connect to PostgreSQL")?;
        let store = Arc::new(PostgreSQLEventStore::new(client.clone(), &args.schema));
        let catalog = Arc::new(PostgreSQLCatalog::new(client, &args.schema));
        simulate(&args, store, catalog, cancel).await?
    };

    if report.cancelled {
        anyhow::bail!(
            "Simulation cancelled: {} session(s) completed, {} cancelled, {} not started",
            report.sessions_completed,
            report.sessions_cancelled,
            report.sessions_not_started
        );
    }
    if report.sessions_failed > 0 {
        anyhow::bail!(
            "Simulation finished with {} failed session(s)",
            report.sessions_failed
        );
    }
    Ok(report)
}

async fn simulate<S, C>(
    args: &SimulateArgs,
    store: Arc<S>,
    catalog: Arc<C>,
    cancel: CancellationToken,
) -> anyhow::Result<RunReport>
where
    S: EventStore + 'static,
    C: Catalog + 'static,
{
    let table = TransitionTable::storefront().context("Invalid storefront transition table")?;
    let simulation = Simulation::new(table, store, catalog, args.run_config())
        .context("Invalid simulation settings")?;

    let report = simulation.run(cancel).await;
    for line in report.to_string().lines() {
        tracing::info!("{}", line);
    }
    for failure in &report.failures {
        tracing::warn!(
            "Session {} failed ({}): {}",
            failure.session_id,
            failure.kind,
            failure.message
        );
    }
    Ok(report)
}
