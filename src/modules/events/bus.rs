use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::broadcast;

use crate::features::categories::models::Category;

/// Application events observable by background workers
#[derive(Debug, Clone)]
pub enum AppEvent {
    CategoryUpdated(Category),
}

impl AppEvent {
    pub fn name(&self) -> &'static str {
        match self {
            AppEvent::CategoryUpdated(_) => "afterCategoryUpdate",
        }
    }
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("Event dispatch failed: {0}")]
    Dispatch(String),
}

/// Post-commit notification channel.
///
/// Callers await `emit` so subscribers observe events in write order, but
/// the contract is fire-and-forget: implementations must not make event
/// delivery a precondition of the write that triggered it.
#[async_trait]
pub trait AppEvents: Send + Sync {
    async fn emit(&self, event: AppEvent) -> Result<(), EventError>;
}

/// In-process broadcast fan-out backing `AppEvents`
pub struct BroadcastEvents {
    tx: broadcast::Sender<AppEvent>,
}

impl BroadcastEvents {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<AppEvent> {
        self.tx.subscribe()
    }
}

#[async_trait]
impl AppEvents for BroadcastEvents {
    async fn emit(&self, event: AppEvent) -> Result<(), EventError> {
        // A send error only means there is no live subscriber right now;
        // that is a successful no-op for a fire-and-forget bus.
        if let Err(e) = self.tx.send(event) {
            tracing::debug!("No subscribers for event {}", e.0.name());
        }
        Ok(())
    }
}

/// Log every event until the bus closes.
///
/// Spawned at startup so the broadcast channel always has at least one live
/// subscriber.
pub async fn run_event_logger(mut rx: broadcast::Receiver<AppEvent>) {
    loop {
        match rx.recv().await {
            Ok(AppEvent::CategoryUpdated(category)) => {
                tracing::info!(
                    category_id = %category.id,
                    shop_id = %category.shop_id,
                    slug = %category.slug,
                    "afterCategoryUpdate"
                );
            }
            Err(broadcast::error::RecvError::Lagged(n)) => {
                tracing::warn!(skipped = n, "Event logger lagged, events skipped");
            }
            Err(broadcast::error::RecvError::Closed) => {
                tracing::info!("Event bus closed, event logger stopping");
                break;
            }
        }
    }
}
