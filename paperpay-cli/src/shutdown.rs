//! Signal handling for cancelling in-flight payment calls.

use tokio::sync::watch;

/// Spawns a task that flips the returned receiver to `true` on Ctrl+C.
///
/// If the handler cannot be installed the sender is dropped, which the
/// payment client treats as "never cancel".
pub fn spawn_shutdown_watch() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);

    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                tracing::info!("Received SIGINT, cancelling payment request");
                let _ = tx.send(true);
            }
            Err(e) => {
                tracing::error!("Failed to install Ctrl+C handler: {}", e);
            }
        }
    });

    rx
}
