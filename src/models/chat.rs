use chrono::{DateTime, Utc};
use nanoid::nanoid;
use serde::{Deserialize, Serialize};

/// Author of a chat message.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    #[default]
    User,
    Assistant,
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(Self::User),
            "assistant" => Ok(Self::Assistant),
            _ => Err(format!("Unknown role: {s}")),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chat {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Chat {
    pub fn new(title: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: nanoid!(),
            title: title.into(),
            created_at: now,
            updated_at: now,
        }
    }
}

/// A chat together with its most recent message text, for list views.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatSummary {
    pub chat: Chat,
    pub last_message: Option<String>,
}

/// One persisted message. Immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub chat_id: String,
    pub role: Role,
    pub content: String,
    pub is_voice: bool,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(chat_id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        Self {
            id: nanoid!(),
            chat_id: chat_id.into(),
            role,
            content: content.into(),
            is_voice: false,
            created_at: Utc::now(),
        }
    }

    pub fn voice(mut self, is_voice: bool) -> Self {
        self.is_voice = is_voice;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_role_round_trip() {
        assert_eq!(Role::from_str("user").unwrap(), Role::User);
        assert_eq!(Role::from_str("ASSISTANT").unwrap(), Role::Assistant);
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert!(Role::from_str("system").is_err());
    }

    #[test]
    fn test_message_builder() {
        let message = Message::new("chat_1", Role::User, "hello").voice(true);
        assert_eq!(message.chat_id, "chat_1");
        assert_eq!(message.role, Role::User);
        assert!(message.is_voice);
        assert!(!message.id.is_empty());
    }

    #[test]
    fn test_chat_ids_are_unique() {
        let a = Chat::new("one");
        let b = Chat::new("two");
        assert_ne!(a.id, b.id);
    }
}
