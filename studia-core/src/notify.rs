use async_trait::async_trait;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NotificationEvent {
    OrderCompleted,
    OrderFailed,
    OrderRefunded,
    CouponRedeemed,
    EnrollmentActivated,
}

/// Fire-and-forget outbound notifications. Failures are logged by callers
/// and never propagate back into the transaction that triggered them.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    async fn notify(
        &self,
        event: NotificationEvent,
        payload: serde_json::Value,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Dispatcher that only emits a structured log line. Stands in for the
/// email/push pipeline, which lives outside this subsystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingDispatcher;

#[async_trait]
impl NotificationDispatcher for TracingDispatcher {
    async fn notify(
        &self,
        event: NotificationEvent,
        payload: serde_json::Value,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        tracing::info!(?event, %payload, "notification dispatched");
        Ok(())
    }
}
