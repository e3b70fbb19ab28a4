//! Recurring loops for the crawl and publish stages
//!
//! Every loop is a fixed-interval tick driven by `tokio::time::interval`:
//! - An overrunning tick is followed immediately by the next one
//! - Ticks never overlap and missed ticks are not replayed
//! - Cancellation is observed while waiting and while a tick is in flight

use crate::crawler::Coordinator;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Runs `tick` every `period` until `cancel` fires
///
/// The first tick starts immediately. A tick still running when the token
/// is cancelled is dropped at its next suspension point.
///
/// # Arguments
///
/// * `name` - Loop name used in log events
/// * `period` - Wall-clock spacing between tick starts
/// * `cancel` - Shutdown signal
/// * `tick` - Produces the work for one tick
pub async fn run_every<F, Fut>(
    name: &'static str,
    period: Duration,
    cancel: CancellationToken,
    mut tick: F,
) where
    F: FnMut() -> Fut,
    Fut: Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    tracing::info!(task = name, period_secs = period.as_secs_f64(), "Loop started");

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = interval.tick() => {}
        }
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                tracing::info!(task = name, "Tick abandoned on shutdown");
                break;
            }
            _ = tick() => {}
        }
    }

    tracing::info!(task = name, "Loop stopped");
}

/// Crawls website sources every `period`
pub async fn website_loop(coordinator: Arc<Coordinator>, period: Duration, cancel: CancellationToken) {
    run_every("websites", period, cancel, || {
        let coordinator = Arc::clone(&coordinator);
        async move {
            if let Err(e) = coordinator.crawl_websites_once().await {
                tracing::error!(error = %e, "Website tick could not list sources");
            }
        }
    })
    .await;
}

/// Crawls channel sources every `period`
pub async fn channel_loop(coordinator: Arc<Coordinator>, period: Duration, cancel: CancellationToken) {
    run_every("channels", period, cancel, || {
        let coordinator = Arc::clone(&coordinator);
        async move {
            if let Err(e) = coordinator.crawl_channels_once().await {
                tracing::error!(error = %e, "Channel tick could not list sources");
            }
        }
    })
    .await;
}
