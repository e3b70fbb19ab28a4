use crate::model::PublishStage;
use crate::publish::format_message;
use crate::publish::Messenger;
use crate::storage::{SharedStorage, Storage};
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// What one publisher tick did
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// Nothing was waiting
    Idle,
    /// The listing was sent and marked
    Published(i64),
    /// Sending failed; the listing stays unpublished
    SendFailed(i64),
}

/// Posts the oldest unpublished listing to one destination, one per tick
///
/// Delivery is at-least-once: a listing is marked only after the send
/// succeeds, so a failed mark causes a resend on a later tick.
pub struct Publisher {
    storage: SharedStorage,
    messenger: Arc<dyn Messenger>,
    destination: String,
}

impl Publisher {
    pub fn new(storage: SharedStorage, messenger: Arc<dyn Messenger>, destination: &str) -> Self {
        Self {
            storage,
            messenger,
            destination: destination.trim().to_string(),
        }
    }

    /// Runs one select, format, send, mark cycle
    ///
    /// A store failure is returned; a send failure is logged and reported
    /// as `SendFailed`.
    pub async fn publish_once(&self) -> crate::Result<PublishOutcome> {
        tracing::trace!(stage = %PublishStage::Select);
        let next = {
            let storage = self.storage.lock()?;
            storage.next_unpublished()?
        };
        let Some(record) = next else {
            return Ok(PublishOutcome::Idle);
        };

        tracing::trace!(stage = %PublishStage::Format, listing = record.id);
        let text = format_message(&record);

        tracing::trace!(stage = %PublishStage::Send, listing = record.id);
        if let Err(e) = self.messenger.send(&self.destination, &text).await {
            tracing::warn!(
                listing = record.id,
                source = %record.source_name,
                error = %e,
                "Send failed, will retry next tick"
            );
            return Ok(PublishOutcome::SendFailed(record.id));
        }

        tracing::trace!(stage = %PublishStage::Mark, listing = record.id);
        {
            let mut storage = self.storage.lock()?;
            storage.mark_published(record.id)?;
        }
        tracing::info!(
            listing = record.id,
            source = %record.source_name,
            title = %record.listing.title,
            "Published"
        );
        Ok(PublishOutcome::Published(record.id))
    }

    /// Publishes one listing every `period` until cancelled
    pub async fn run(self: Arc<Self>, period: Duration, cancel: CancellationToken) {
        crate::crawler::run_every("publisher", period, cancel, || {
            let publisher = Arc::clone(&self);
            async move {
                if let Err(e) = publisher.publish_once().await {
                    tracing::error!(error = %e, "Publisher tick failed");
                }
            }
        })
        .await;
    }
}
