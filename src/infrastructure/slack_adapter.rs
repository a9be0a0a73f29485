use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::application::thread_locator::{ThreadLocator, DEFAULT_HISTORY_LIMIT};
use crate::domain::entities::{
    ChatMessage, ChatUser, ConversationOpening, HistoryPage, PostResult,
};
use crate::domain::ports::ChatGateway;
use crate::infrastructure::cache::MemoryCache;

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";

const USERS_LOOKUP_BY_EMAIL: &str = "users.lookupByEmail";
const CHAT_POST_MESSAGE: &str = "chat.postMessage";
const CONVERSATIONS_OPEN: &str = "conversations.open";
const CONVERSATIONS_HISTORY: &str = "conversations.history";

pub struct SlackChatGateway {
    http: reqwest::Client,
    api_base: String,
    token: String,
    locator: ThreadLocator,
    users: MemoryCache<ChatUser>,
}

impl SlackChatGateway {
    pub fn new(
        token: String,
        api_base: impl Into<String>,
        locator: ThreadLocator,
        users: MemoryCache<ChatUser>,
    ) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_base: api_base.into(),
            token,
            locator,
            users,
        }
    }

    fn api_url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.api_base.trim_end_matches('/'), endpoint)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        query: &[(&str, String)],
    ) -> Option<T> {
        let result = self
            .http
            .get(self.api_url(endpoint))
            .bearer_auth(&self.token)
            .query(query)
            .send()
            .await;
        self.read_response(endpoint, result).await
    }

    async fn post_json<T: DeserializeOwned>(&self, endpoint: &str, payload: &Value) -> Option<T> {
        let result = self
            .http
            .post(self.api_url(endpoint))
            .bearer_auth(&self.token)
            .json(payload)
            .send()
            .await;
        self.read_response(endpoint, result).await
    }

    async fn read_response<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        result: reqwest::Result<reqwest::Response>,
    ) -> Option<T> {
        let response = match result {
            Ok(response) => response,
            Err(err) => {
                tracing::warn!(endpoint, error = %err, "slack request failed");
                return None;
            }
        };
        if !response.status().is_success() {
            tracing::warn!(endpoint, status = %response.status(), "slack call returned non-success");
            return None;
        }
        match response.json::<T>().await {
            Ok(parsed) => Some(parsed),
            Err(err) => {
                tracing::warn!(endpoint, error = %err, "failed to parse slack response");
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct LookupUserResponse {
    ok: bool,
    #[serde(default)]
    user: Option<UserDto>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UserDto {
    id: String,
}

#[derive(Debug, Deserialize)]
struct PostMessageResponse {
    ok: bool,
    #[serde(default)]
    channel: Option<String>,
    #[serde(default)]
    ts: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OpenConversationResponse {
    ok: bool,
    #[serde(default)]
    channel: Option<ChannelDto>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelDto {
    id: String,
}

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    ok: bool,
    #[serde(default)]
    messages: Option<Vec<ChatMessage>>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: Option<String>,
}

#[async_trait]
impl ChatGateway for SlackChatGateway {
    async fn lookup_user_by_email(&self, email: &str) -> Option<ChatUser> {
        if let Some(hit) = self.users.get(email).await {
            return Some(hit);
        }

        let query = [("email", email.to_string())];
        let response: LookupUserResponse = self.get_json(USERS_LOOKUP_BY_EMAIL, &query).await?;
        if !response.ok {
            tracing::warn!(
                email,
                error = response.error.as_deref().unwrap_or("unknown error"),
                "slack user lookup rejected"
            );
            return None;
        }
        let user = response.user?;
        let chat_user = ChatUser {
            id: user.id,
            email: email.to_string(),
        };
        self.users.insert(email, chat_user.clone()).await;
        Some(chat_user)
    }

    async fn post_message(
        &self,
        channel_id: &str,
        content: &str,
        thread_search_string: Option<&str>,
        thread_reply_broadcast: bool,
    ) -> Option<PostResult> {
        let thread_ts = match thread_search_string {
            Some(token) if !token.is_empty() => self
                .locator
                .find_thread(self, channel_id, token, DEFAULT_HISTORY_LIMIT)
                .await
                .map(|message| message.thread_root_ts().to_string()),
            _ => None,
        };

        let mut payload = serde_json::json!({ "channel": channel_id, "text": content });
        if let Some(ts) = &thread_ts {
            payload["thread_ts"] = Value::String(ts.clone());
            if thread_reply_broadcast {
                payload["reply_broadcast"] = Value::Bool(true);
            }
        }

        let response: PostMessageResponse = self.post_json(CHAT_POST_MESSAGE, &payload).await?;
        if !response.ok {
            tracing::warn!(
                channel_id,
                error = response.error.as_deref().unwrap_or("unknown error"),
                "slack message rejected"
            );
        }
        Some(PostResult {
            ok: response.ok,
            channel: response.channel,
            ts: response.ts,
        })
    }

    async fn open_conversation(&self, user_id: &str) -> Option<ConversationOpening> {
        if user_id.is_empty() {
            return None;
        }

        let payload = serde_json::json!({ "users": user_id });
        let response: OpenConversationResponse =
            self.post_json(CONVERSATIONS_OPEN, &payload).await?;
        if !response.ok {
            tracing::warn!(
                user_id,
                error = response.error.as_deref().unwrap_or("unknown error"),
                "could not open direct-message conversation"
            );
            return None;
        }
        response
            .channel
            .map(|channel| ConversationOpening { id: channel.id })
    }

    async fn send_direct_message(
        &self,
        user_id: &str,
        content: &str,
        thread_search_string: Option<&str>,
        thread_reply_broadcast: bool,
    ) -> Option<PostResult> {
        let opening = self.open_conversation(user_id).await?;
        self.post_message(
            &opening.id,
            content,
            thread_search_string,
            thread_reply_broadcast,
        )
        .await
    }

    async fn conversations_history(
        &self,
        channel_id: &str,
        limit: u32,
        cursor: &str,
    ) -> Option<HistoryPage> {
        if channel_id.is_empty() {
            return None;
        }

        let mut query = vec![
            ("channel", channel_id.to_string()),
            ("limit", limit.to_string()),
        ];
        if !cursor.is_empty() {
            query.push(("cursor", cursor.to_string()));
        }

        let response: HistoryResponse = self.get_json(CONVERSATIONS_HISTORY, &query).await?;
        if !response.ok {
            tracing::warn!(
                channel_id,
                error = response.error.as_deref().unwrap_or("unknown error"),
                "slack history fetch rejected"
            );
            return None;
        }
        Some(HistoryPage {
            messages: response.messages.unwrap_or_default(),
            next_cursor: response
                .response_metadata
                .and_then(|meta| meta.next_cursor)
                .filter(|cursor| !cursor.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use httpmock::prelude::*;
    use serde_json::json;

    use super::*;

    fn gateway(base_url: &str) -> SlackChatGateway {
        SlackChatGateway::new(
            "xoxb-test".to_string(),
            base_url,
            ThreadLocator::new("A0HERALD"),
            MemoryCache::new(),
        )
    }

    #[tokio::test]
    async fn email_lookup_hits_the_network_once_per_email() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/users.lookupByEmail")
                .query_param("email", "ada@acme.dev");
            then.status(200)
                .json_body(json!({"ok": true, "user": {"id": "U100"}}));
        });

        let gateway = gateway(&server.base_url());
        let first = gateway.lookup_user_by_email("ada@acme.dev").await.expect("user");
        let second = gateway.lookup_user_by_email("ada@acme.dev").await.expect("user");

        assert_eq!(first.id, "U100");
        assert_eq!(second.email, "ada@acme.dev");
        mock.assert_hits(1);
    }

    #[tokio::test]
    async fn failed_email_lookup_is_not_cached() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/users.lookupByEmail");
            then.status(200)
                .json_body(json!({"ok": false, "error": "users_not_found"}));
        });

        let gateway = gateway(&server.base_url());
        assert!(gateway.lookup_user_by_email("ghost@acme.dev").await.is_none());
        assert!(gateway.lookup_user_by_email("ghost@acme.dev").await.is_none());
        mock.assert_hits(2);
    }

    #[tokio::test]
    async fn post_without_search_string_stays_unthreaded() {
        let server = MockServer::start();
        let post = server.mock(|when, then| {
            when.method(POST)
                .path("/chat.postMessage")
                .json_body(json!({"channel": "C1", "text": "deploying payments-api"}));
            then.status(200)
                .json_body(json!({"ok": true, "channel": "C1", "ts": "1.100"}));
        });

        let gateway = gateway(&server.base_url());
        let result = gateway
            .post_message("C1", "deploying payments-api", None, false)
            .await
            .expect("post result");
        assert!(result.ok);
        assert_eq!(result.ts.as_deref(), Some("1.100"));
        post.assert();
    }

    #[tokio::test]
    async fn post_with_search_string_threads_onto_the_found_root() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET)
                .path("/conversations.history")
                .query_param("channel", "C1")
                .query_param("limit", "10");
            then.status(200).json_body(json!({
                "ok": true,
                "messages": [
                    {"ts": "3.000", "app_id": "OTHER", "text": "deploy payments-api"},
                    {"ts": "2.000", "thread_ts": "1.000", "app_id": "A0HERALD", "text": "deploy payments-api started"}
                ]
            }));
        });
        let post = server.mock(|when, then| {
            when.method(POST)
                .path("/chat.postMessage")
                .json_body_partial(r#"{"thread_ts": "1.000", "reply_broadcast": true}"#);
            then.status(200)
                .json_body(json!({"ok": true, "channel": "C1", "ts": "4.000"}));
        });

        let gateway = gateway(&server.base_url());
        let result = gateway
            .post_message("C1", "deploy payments-api finished", Some("payments-api"), true)
            .await
            .expect("post result");
        assert!(result.ok);
        post.assert();
    }

    #[tokio::test]
    async fn open_conversation_with_empty_user_is_a_noop() {
        let server = MockServer::start();
        let open = server.mock(|when, then| {
            when.method(POST).path("/conversations.open");
            then.status(200)
                .json_body(json!({"ok": true, "channel": {"id": "D1"}}));
        });

        let gateway = gateway(&server.base_url());
        assert!(gateway.open_conversation("").await.is_none());
        open.assert_hits(0);
    }

    #[tokio::test]
    async fn direct_message_opens_then_posts() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST)
                .path("/conversations.open")
                .json_body(json!({"users": "U100"}));
            then.status(200)
                .json_body(json!({"ok": true, "channel": {"id": "D1"}}));
        });
        let post = server.mock(|when, then| {
            when.method(POST)
                .path("/chat.postMessage")
                .json_body(json!({"channel": "D1", "text": "your rollout finished"}));
            then.status(200)
                .json_body(json!({"ok": true, "channel": "D1", "ts": "9.000"}));
        });

        let gateway = gateway(&server.base_url());
        let result = gateway
            .send_direct_message("U100", "your rollout finished", None, false)
            .await
            .expect("post result");
        assert_eq!(result.channel.as_deref(), Some("D1"));
        post.assert();
    }

    #[tokio::test]
    async fn direct_message_fails_when_conversation_cannot_open() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/conversations.open");
            then.status(200)
                .json_body(json!({"ok": false, "error": "user_not_found"}));
        });
        let post = server.mock(|when, then| {
            when.method(POST).path("/chat.postMessage");
            then.status(200).json_body(json!({"ok": true}));
        });

        let gateway = gateway(&server.base_url());
        assert!(gateway
            .send_direct_message("U999", "hello", None, false)
            .await
            .is_none());
        post.assert_hits(0);
    }

    #[tokio::test]
    async fn history_with_empty_channel_is_a_noop() {
        let server = MockServer::start();
        let history = server.mock(|when, then| {
            when.method(GET).path("/conversations.history");
            then.status(200).json_body(json!({"ok": true, "messages": []}));
        });

        let gateway = gateway(&server.base_url());
        assert!(gateway.conversations_history("", 10, "").await.is_none());
        history.assert_hits(0);
    }

    #[tokio::test]
    async fn history_surfaces_a_usable_cursor_only_when_non_empty() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/conversations.history");
            then.status(200).json_body(json!({
                "ok": true,
                "messages": [{"ts": "1.000"}],
                "response_metadata": {"next_cursor": ""}
            }));
        });

        let gateway = gateway(&server.base_url());
        let page = gateway
            .conversations_history("C1", 10, "")
            .await
            .expect("page");
        assert_eq!(page.messages.len(), 1);
        assert!(page.next_cursor.is_none());
    }
}
