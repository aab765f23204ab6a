use crate::api::ChatApi;
use crate::error::CoreError;
use crate::types::{Chat, ChatId, Message, UiEntry, UiState};
use std::sync::Arc;

/// Finds the chat opened for an approved request.
///
/// The chat id carried by the request wins; otherwise the chat whose
/// participants include `counterpart_id`. Display names are never compared:
/// two people may share a name.
pub fn find_chat_for_request<'a>(
    chats: &'a [Chat],
    entry: &UiEntry,
    counterpart_id: Option<&str>,
) -> Option<&'a Chat> {
    if entry.state != UiState::Approved {
        return None;
    }
    if let Some(chat_id) = &entry.chat_id {
        if let Some(chat) = chats.iter().find(|chat| &chat.id == chat_id) {
            return Some(chat);
        }
    }
    let counterpart_id = counterpart_id.map(str::trim).filter(|id| !id.is_empty())?;
    chats.iter().find(|chat| chat.has_participant(counterpart_id))
}

pub struct ChatService<A: ?Sized> {
    api: Arc<A>,
}

impl<A> ChatService<A>
where
    A: ChatApi + ?Sized,
{
    pub fn new(api: Arc<A>) -> Self {
        Self { api }
    }

    /// Chats ordered by most recent activity first.
    pub async fn chats(&self) -> Result<Vec<Chat>, CoreError> {
        let mut chats = self.api.list_chats().await?;
        chats.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(chats)
    }

    pub async fn messages(&self, chat_id: &ChatId) -> Result<Vec<Message>, CoreError> {
        Ok(self.api.list_messages(chat_id).await?)
    }

    pub async fn send(&self, chat_id: &ChatId, text: &str) -> Result<Message, CoreError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(CoreError::InvalidInput {
                message: "message text is empty".to_string(),
            });
        }
        Ok(self.api.send_message(chat_id, text).await?)
    }
}
