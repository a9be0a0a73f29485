use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    Router,
};

use crate::application::context::BridgeContext;

/// Webhook intake: every path accepts a POST so notifiers can be pointed at
/// any URL under the bridge.
pub fn router(context: Arc<BridgeContext>) -> Router {
    Router::new()
        .fallback(receive_notification)
        .with_state(context)
}

async fn receive_notification(
    State(context): State<Arc<BridgeContext>>,
    method: Method,
    headers: HeaderMap,
    body: String,
) -> StatusCode {
    if method != Method::POST {
        return StatusCode::METHOD_NOT_ALLOWED;
    }
    if !authorized(&context.webhook_secret, headers.get(header::AUTHORIZATION)) {
        return StatusCode::UNAUTHORIZED;
    }
    if body.trim().is_empty() {
        return StatusCode::BAD_REQUEST;
    }
    let parsed: serde_json::Value = match serde_json::from_str(&body) {
        Ok(value) => value,
        Err(err) => {
            tracing::debug!(error = %err, "rejecting notification with invalid JSON body");
            return StatusCode::BAD_REQUEST;
        }
    };

    let code = context.dispatcher.classify_and_dispatch(&parsed).await;
    StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

fn authorized(secret: &str, header: Option<&HeaderValue>) -> bool {
    header
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(|token| token == secret)
        .unwrap_or(false)
}
