//! Ctrl+C handling.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Returns a token cancelled on the first Ctrl+C.
///
/// If the signal handler cannot be installed the token is never cancelled
/// by a signal; the run still completes on its own.
pub fn cancel_on_ctrl_c() -> CancellationToken {
    let token = CancellationToken::new();
    let signalled = token.clone();

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("Received interrupt signal (Ctrl+C), stopping sessions");
                signalled.cancel();
            }
            Err(e) => warn!("Failed to install Ctrl+C handler: {}", e),
        }
    });

    token
}
