use async_trait::async_trait;
use chrono::Utc;

use crate::db::connection::Database;
use crate::db::repository::{ChatRepository, MessageRepository};
use crate::db::traits::{ChatStore, MessageStore};
use crate::error::Result;
use crate::models::{Chat, ChatSummary, Message};

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ChatStore for LibSqlBackend {
    async fn create_chat(&self, chat: &Chat) -> Result<()> {
        let conn = self.db.connect()?;
        ChatRepository::create(&conn, chat).await
    }

    async fn get_chat(&self, id: &str) -> Result<Option<Chat>> {
        let conn = self.db.connect()?;
        ChatRepository::get_by_id(&conn, id).await
    }

    async fn list_chats(&self) -> Result<Vec<ChatSummary>> {
        let conn = self.db.connect()?;
        ChatRepository::list(&conn).await
    }

    async fn delete_chat(&self, id: &str) -> Result<bool> {
        let conn = self.db.connect()?;
        ChatRepository::delete(&conn, id).await
    }
}

#[async_trait]
impl MessageStore for LibSqlBackend {
    async fn create_message(&self, message: &Message) -> Result<()> {
        let conn = self.db.connect()?;
        MessageRepository::create(&conn, message).await?;
        ChatRepository::touch(&conn, &message.chat_id, Utc::now()).await
    }

    async fn list_messages(&self, chat_id: &str) -> Result<Vec<Message>> {
        let conn = self.db.connect()?;
        MessageRepository::list_by_chat(&conn, chat_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::models::Role;

    async fn setup_backend() -> (LibSqlBackend, tempfile::TempDir) {
        let temp_dir = tempfile::tempdir().unwrap();
        let db_path = temp_dir.path().join("sova.db");
        let config = DatabaseConfig {
            url: format!("file:{}", db_path.display()),
            auth_token: None,
            local_path: None,
        };
        let db = Database::new(&config).await.unwrap();
        (LibSqlBackend::new(db), temp_dir)
    }

    #[tokio::test]
    async fn test_message_creation_bumps_chat_updated_at() {
        let (backend, _temp_dir) = setup_backend().await;

        let mut chat = Chat::new("stale");
        chat.updated_at = Utc::now() - chrono::Duration::hours(1);
        backend.create_chat(&chat).await.unwrap();

        backend
            .create_message(&Message::new(&chat.id, Role::User, "ping"))
            .await
            .unwrap();

        let fetched = backend.get_chat(&chat.id).await.unwrap().unwrap();
        assert!(fetched.updated_at > chat.updated_at);
    }

    #[tokio::test]
    async fn test_list_chats_includes_last_message_preview() {
        let (backend, _temp_dir) = setup_backend().await;

        let chat = Chat::new("preview");
        backend.create_chat(&chat).await.unwrap();
        backend
            .create_message(&Message::new(&chat.id, Role::User, "first"))
            .await
            .unwrap();
        backend
            .create_message(&Message::new(&chat.id, Role::Assistant, "second"))
            .await
            .unwrap();

        let summaries = backend.list_chats().await.unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].last_message.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_delete_chat_removes_messages() {
        let (backend, _temp_dir) = setup_backend().await;

        let chat = Chat::new("doomed");
        backend.create_chat(&chat).await.unwrap();
        backend
            .create_message(&Message::new(&chat.id, Role::User, "gone soon"))
            .await
            .unwrap();

        assert!(backend.delete_chat(&chat.id).await.unwrap());
        let messages = backend.list_messages(&chat.id).await.unwrap();
        assert!(messages.is_empty());
    }
}
