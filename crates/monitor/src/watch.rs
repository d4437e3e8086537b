//! Continuous monitoring: the check pipeline called on a fixed interval.

use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{error, info};

/// Interval scheduler with a cancellation token.
///
/// Runs `check` to completion, then sleeps `interval`, until `shutdown`
/// fires. A failing check is logged and never terminates the loop. The
/// shutdown signal is only honored between checks, so an in-flight check
/// always reaches its exit path (and releases its session) first.
pub async fn run<C, Fut, T, E>(
    interval: Duration,
    mut shutdown: broadcast::Receiver<()>,
    mut check: C,
) where
    C: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, E>>,
    E: std::fmt::Display,
{
    info!(interval_secs = interval.as_secs(), "Monitor loop started");

    loop {
        if let Err(e) = check().await {
            error!("Error in monitor loop: {}", e);
        }

        info!(
            "Check complete. Waiting {} seconds until next check...",
            interval.as_secs()
        );
        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.recv() => {
                info!("Monitor loop shutting down");
                break;
            }
        }
    }
}
