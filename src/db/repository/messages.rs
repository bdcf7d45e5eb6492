use chrono::{DateTime, Utc};
use libsql::{params, Connection};

use crate::error::Result;
use crate::models::Message;

pub struct MessageRepository;

impl MessageRepository {
    pub async fn create(conn: &Connection, message: &Message) -> Result<()> {
        conn.execute(
            r#"
            INSERT INTO messages (id, chat_id, role, content, is_voice, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                message.id.clone(),
                message.chat_id.clone(),
                message.role.to_string(),
                message.content.clone(),
                message.is_voice as i32,
                message.created_at.to_rfc3339(),
            ],
        )
        .await?;

        Ok(())
    }

    pub async fn list_by_chat(conn: &Connection, chat_id: &str) -> Result<Vec<Message>> {
        let mut rows = conn
            .query(
                "SELECT * FROM messages WHERE chat_id = ?1 ORDER BY created_at",
                params![chat_id],
            )
            .await?;

        let mut messages = Vec::new();
        while let Some(row) = rows.next().await? {
            messages.push(Self::row_to_message(&row)?);
        }
        Ok(messages)
    }

    fn row_to_message(row: &libsql::Row) -> Result<Message> {
        Ok(Message {
            id: row.get(0)?,
            chat_id: row.get(1)?,
            role: row.get::<String>(2)?.parse().unwrap_or_default(),
            content: row.get(3)?,
            is_voice: row.get::<i32>(4)? != 0,
            created_at: DateTime::parse_from_rfc3339(&row.get::<String>(5)?)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
