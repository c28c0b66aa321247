use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::broadcast::{Receiver, error::RecvError};

use crate::{error::Result, ledger::CanvasEvent};

/// A read-side component fed from the event bus.
///
/// Handlers must tolerate seeing the same block or transaction twice.
#[async_trait]
pub trait EventConsumer: Send + Sync {
    fn name(&self) -> &'static str;

    /// Builds initial state from the ledger. Runs once before any event is handled.
    async fn initialise(&self) -> Result<()>;

    async fn handle(&self, event: &CanvasEvent) -> Result<()>;

    /// Called after the receiver fell behind and events were dropped.
    async fn resync(&self) -> Result<()>;
}

/// Drives a consumer until the bus closes.
///
/// The receiver should be subscribed before the chain starts producing so that
/// nothing between `initialise` and the first `recv` is lost.
pub async fn run_consumer(consumer: Arc<dyn EventConsumer>, mut receiver: Receiver<CanvasEvent>) {
    let name = consumer.name();

    if let Err(e) = consumer.initialise().await {
        tracing::error!(consumer = name, error = %e, "Consumer initialisation failed");
    } else {
        tracing::info!(consumer = name, "Consumer initialised");
    }

    loop {
        match receiver.recv().await {
            Ok(event) => {
                if let Err(e) = consumer.handle(&event).await {
                    tracing::error!(
                        consumer = name,
                        event = event.name(),
                        error = %e,
                        "Failed to handle event"
                    );
                }
            }
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(consumer = name, skipped, "Consumer lagged, resyncing");
                if let Err(e) = consumer.resync().await {
                    tracing::error!(consumer = name, error = %e, "Resync failed");
                }
            }
            Err(RecvError::Closed) => break,
        }
    }

    tracing::info!(consumer = name, "Consumer stopped");
}
