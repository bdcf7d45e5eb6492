use async_trait::async_trait;

use crate::error::Result;
use crate::models::{Chat, ChatSummary, Message};

/// CRUD and query operations for chats.
#[async_trait]
pub trait ChatStore: Send + Sync {
    async fn create_chat(&self, chat: &Chat) -> Result<()>;
    async fn get_chat(&self, id: &str) -> Result<Option<Chat>>;
    /// Chats ordered most-recently-updated first, each with its latest
    /// message text for list previews.
    async fn list_chats(&self) -> Result<Vec<ChatSummary>>;
    async fn delete_chat(&self, id: &str) -> Result<bool>;
}

/// Append and query operations for messages.
#[async_trait]
pub trait MessageStore: Send + Sync {
    /// Persist a message and bump the owning chat's `updated_at`.
    async fn create_message(&self, message: &Message) -> Result<()>;
    /// Messages of one chat, ordered by creation time.
    async fn list_messages(&self, chat_id: &str) -> Result<Vec<Message>>;
}

/// Combined storage backend used across the application.
pub trait ChatBackend: ChatStore + MessageStore {}

impl<T: ChatStore + MessageStore> ChatBackend for T {}
