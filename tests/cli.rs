//! CLI parsing and dry-run simulation tests. None of these need a database.

use clap::Parser;
use datagen_workflow::WalkFailurePolicy;
use ecom_datagen::commands::{run_import_products, run_simulate};
use ecom_datagen::{Cli, Commands, FailurePolicyArg, SimulateArgs};
use std::io::Write;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn simulate_args(extra: &[&str]) -> SimulateArgs {
    let mut argv = vec!["ecom-datagen", "simulate", "--dry-run"];
    argv.extend_from_slice(extra);
    match Cli::try_parse_from(argv).unwrap().command {
        Commands::Simulate(args) => args,
        _ => panic!("expected the simulate command"),
    }
}

#[test]
fn test_simulate_defaults() {
    let args = simulate_args(&[]);
    let config = args.run_config();

    assert!(args.dry_run);
    assert_eq!(config.total_sessions, 10);
    assert_eq!(config.max_concurrent_sessions, 4);
    assert_eq!(config.walks_per_session, 3);
    assert_eq!(config.flush_threshold, 5);
    assert_eq!(config.max_pacing, None);
    assert_eq!(config.walk_failure_policy, WalkFailurePolicy::Continue);
    assert_eq!(config.event_collection, "event");
    assert!(config.validate().is_ok());
}

#[test]
fn test_simulate_options() {
    let args = simulate_args(&[
        "--sessions",
        "250",
        "--concurrency",
        "16",
        "--pacing",
        "750ms",
        "--on-walk-failure",
        "abort",
        "--event-table",
        "clickstream",
    ]);
    let config = args.run_config();

    assert_eq!(args.on_walk_failure, FailurePolicyArg::Abort);
    assert_eq!(config.total_sessions, 250);
    assert_eq!(config.max_concurrent_sessions, 16);
    assert_eq!(config.max_pacing, Some(Duration::from_millis(750)));
    assert_eq!(config.walk_failure_policy, WalkFailurePolicy::AbortSession);
    assert_eq!(config.event_collection, "clickstream");
}

#[test]
fn test_invalid_pacing_rejected() {
    let result = Cli::try_parse_from([
        "ecom-datagen",
        "simulate",
        "--dry-run",
        "--pacing",
        "soon",
    ]);
    assert!(result.is_err());
}

#[test]
fn test_populate_users_parses() {
    let cli = Cli::try_parse_from([
        "ecom-datagen",
        "populate-users",
        "--postgresql-connection-string",
        "host=localhost user=postgres",
        "--count",
        "500",
        "--batch-size",
        "50",
    ])
    .unwrap();

    match cli.command {
        Commands::PopulateUsers {
            postgresql,
            count,
            seed,
            batch,
        } => {
            assert_eq!(postgresql.schema, "public");
            assert_eq!(count, 500);
            assert_eq!(seed, 42);
            assert_eq!(batch.batch_size, 50);
        }
        _ => panic!("expected the populate-users command"),
    }
}

#[tokio::test]
async fn test_dry_run_completes_every_session() {
    let args = simulate_args(&[
        "--sessions",
        "6",
        "--concurrency",
        "2",
        "--dry-run-users",
        "5",
        "--dry-run-products",
        "20",
    ]);

    let report = run_simulate(args, CancellationToken::new()).await.unwrap();

    assert!(report.is_success());
    assert_eq!(report.sessions_completed, 6);
    assert_eq!(report.walks_completed, 18);
    assert!(report.peak_concurrency <= 2);
    // Every walk emits at least ENTRY and EXIT.
    assert!(report.events_written >= 36);
    assert_eq!(report.events_dropped, 0);
}

#[tokio::test]
async fn test_cancelled_run_is_an_error() {
    let cancel = CancellationToken::new();
    cancel.cancel();

    let err = run_simulate(simulate_args(&["--sessions", "3"]), cancel)
        .await
        .unwrap_err();

    assert!(err.to_string().contains("Simulation cancelled"), "{err:#}");
}

#[tokio::test]
async fn test_invalid_settings_are_rejected_before_running() {
    let err = run_simulate(
        simulate_args(&["--flush-threshold", "0"]),
        CancellationToken::new(),
    )
    .await
    .unwrap_err();

    assert!(format!("{err:#}").contains("flush_threshold"), "{err:#}");
}

#[tokio::test]
async fn test_import_rejects_catalog_without_required_columns() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(b"name,main_category\nKettle,home & kitchen\n")
        .unwrap();

    let cli = Cli::try_parse_from([
        "ecom-datagen",
        "import-products",
        "--postgresql-connection-string",
        "host=localhost user=postgres",
        "--file",
        file.path().to_str().unwrap(),
    ])
    .unwrap();
    let Commands::ImportProducts {
        postgresql,
        file: path,
        batch,
    } = cli.command
    else {
        panic!("expected the import-products command");
    };

    // The file is checked before any connection is attempted.
    let err = run_import_products(postgresql, path, batch).await.unwrap_err();
    assert!(format!("{err:#}").contains("sub_category"), "{err:#}");
}
