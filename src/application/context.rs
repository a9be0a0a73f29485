use std::sync::Arc;

use crate::domain::ports::NotificationDispatcher;

/// Long-lived application context, constructed once at startup and passed
/// explicitly to the intake handler. No module-level singleton exists; tests
/// build their own context with whatever dispatcher they need.
pub struct BridgeContext {
    pub webhook_secret: String,
    pub dispatcher: Arc<dyn NotificationDispatcher>,
}

impl BridgeContext {
    pub fn new(webhook_secret: String, dispatcher: Arc<dyn NotificationDispatcher>) -> Self {
        Self {
            webhook_secret,
            dispatcher,
        }
    }
}
