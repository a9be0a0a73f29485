use async_trait::async_trait;
use serde_json::Value;

use crate::domain::entities::DeploymentNotification;
use crate::domain::ports::NotificationDispatcher;

pub const STATUS_NO_CONTENT: u16 = 204;

/// Default dispatcher: acknowledges every authenticated, well-formed
/// notification without routing it to a handler. Event-type-specific handlers
/// plug in by replacing this implementation on the bridge context.
pub struct UnroutedDispatcher;

#[async_trait]
impl NotificationDispatcher for UnroutedDispatcher {
    async fn classify_and_dispatch(&self, body: &Value) -> u16 {
        let notification = DeploymentNotification::from_value(body);
        tracing::info!(
            deployment = notification.deployment.as_deref().unwrap_or("-"),
            environment = notification.environment.as_deref().unwrap_or("-"),
            sha = notification.sha.as_deref().unwrap_or("-"),
            phase = notification.phase.as_deref().unwrap_or("-"),
            "notification received, no handler routed"
        );
        STATUS_NO_CONTENT
    }
}
