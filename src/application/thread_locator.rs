use crate::domain::entities::ChatMessage;
use crate::domain::ports::ChatGateway;

pub const DEFAULT_HISTORY_LIMIT: u32 = 10;

/// Finds the bridge's own prior message about a deployment so follow-ups can
/// reply in its thread instead of starting a new conversation.
#[derive(Debug, Clone)]
pub struct ThreadLocator {
    app_id: String,
}

impl ThreadLocator {
    pub fn new(app_id: impl Into<String>) -> Self {
        Self {
            app_id: app_id.into(),
        }
    }

    /// Scans one page of channel history, most-recent-first as the API
    /// returns it, and picks the first message that is ours and contains
    /// `search_string` as a literal substring. Older threads beyond the page
    /// are deliberately not searched.
    pub async fn find_thread(
        &self,
        chat: &dyn ChatGateway,
        channel_id: &str,
        search_string: &str,
        limit: u32,
    ) -> Option<ChatMessage> {
        if channel_id.is_empty() || search_string.is_empty() {
            return None;
        }

        let page = match chat.conversations_history(channel_id, limit, "").await {
            Some(page) => page,
            None => {
                tracing::warn!(channel_id, "channel history unavailable, thread lookup skipped");
                return None;
            }
        };
        if page.messages.is_empty() {
            return None;
        }

        page.messages.into_iter().find(|message| {
            message.app_id.as_deref() == Some(self.app_id.as_str())
                && message
                    .text
                    .as_deref()
                    .is_some_and(|text| text.contains(search_string))
        })
    }
}
