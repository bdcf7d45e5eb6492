use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::{Chat, ChatSummary};

pub struct ChatRepository;

impl ChatRepository {
    pub async fn create(conn: &Connection, chat: &Chat) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO chats (id, title, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4)
            "#,
            params![
                chat.id.clone(),
                chat.title.clone(),
                chat.created_at.to_rfc3339(),
                chat.updated_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn get_by_id(conn: &Connection, id: &str) -> Result<Option<Chat>> {
        let mut rows = conn
            .query("SELECT * FROM chats WHERE id = ?1", params![id])
            .await?;

        if let Some(row) = rows.next().await? {
            Ok(Some(Self::row_to_chat(&row)?))
        } else {
            Ok(None)
        }
    }

    pub async fn list(conn: &Connection) -> Result<Vec<ChatSummary>> {
        let mut rows = conn
            .query(
                r#"
                SELECT c.id, c.title, c.created_at, c.updated_at,
                       (SELECT m.content FROM messages m
                        WHERE m.chat_id = c.id
                        ORDER BY m.created_at DESC LIMIT 1) AS last_message
                FROM chats c
                ORDER BY c.updated_at DESC
                "#,
                (),
            )
            .await?;

        let mut summaries = Vec::new();
        while let Some(row) = rows.next().await? {
            summaries.push(ChatSummary {
                chat: Self::row_to_chat(&row)?,
                last_message: row.get::<Option<String>>(4)?,
            });
        }
        Ok(summaries)
    }

    pub async fn delete(conn: &Connection, id: &str) -> Result<bool> {
        conn.execute("DELETE FROM messages WHERE chat_id = ?1", params![id])
            .await?;
        let affected = conn
            .execute("DELETE FROM chats WHERE id = ?1", params![id])
            .await?;
        Ok(affected > 0)
    }

    pub async fn touch(conn: &Connection, id: &str, at: DateTime<Utc>) -> Result<()> {
        conn.execute(
            "UPDATE chats SET updated_at = ?2 WHERE id = ?1",
            params![id, at.to_rfc3339()],
        )
        .await?;
        Ok(())
    }

    fn row_to_chat(row: &libsql::Row) -> Result<Chat> {
        Ok(Chat {
            id: row.get(0)?,
            title: row.get(1)?,
            created_at: DateTime::parse_from_rfc3339(&row.get::<String>(2)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
            updated_at: DateTime::parse_from_rfc3339(&row.get::<String>(3)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
