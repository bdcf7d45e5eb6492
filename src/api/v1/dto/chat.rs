//! Chat and message request/response DTOs for the v1 API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{Chat, ChatSummary, Message, Role};
use crate::realtime::MessagePairEvent;

fn default_title() -> String {
    "New Chat".to_string()
}

/// Request body for `POST /v1/chats`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    /// Chat title; defaults to "New Chat".
    #[serde(default = "default_title")]
    pub title: String,
}

/// One chat on the wire.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub id: String,
    pub title: String,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
}

impl From<Chat> for ChatResponse {
    fn from(chat: Chat) -> Self {
        Self {
            id: chat.id,
            title: chat.title,
            created_at: chat.created_at,
            updated_at: chat.updated_at,
        }
    }
}

/// One chat plus its last-message preview, for list views.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatSummaryResponse {
    pub id: String,
    pub title: String,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_message: Option<String>,
}

impl From<ChatSummary> for ChatSummaryResponse {
    fn from(summary: ChatSummary) -> Self {
        Self {
            id: summary.chat.id,
            title: summary.chat.title,
            created_at: summary.chat.created_at,
            updated_at: summary.chat.updated_at,
            last_message: summary.last_message,
        }
    }
}

/// Response for `GET /v1/chats`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListChatsResponse {
    pub chats: Vec<ChatSummaryResponse>,
}

/// Request body for `POST /v1/chats/{chatId}/messages`.
#[derive(Debug, Clone, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    /// Message text.
    pub content: String,
    /// Whether the message originated from voice input.
    #[serde(default)]
    pub is_voice: bool,
}

/// One message on the wire.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: String,
    pub chat_id: String,
    /// `user` or `assistant`.
    #[schema(value_type = String)]
    pub role: Role,
    pub content: String,
    pub is_voice: bool,
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self {
            id: message.id,
            chat_id: message.chat_id,
            role: message.role,
            content: message.content,
            is_voice: message.is_voice,
            created_at: message.created_at,
        }
    }
}

/// Response for `GET /v1/chats/{chatId}/messages`.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ListMessagesResponse {
    pub messages: Vec<MessageResponse>,
}

/// Response for `POST /v1/chats/{chatId}/messages`: the stored user message
/// together with the generated assistant reply.
#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct MessageExchangeResponse {
    pub user_message: MessageResponse,
    pub assistant_message: MessageResponse,
}

impl From<MessagePairEvent> for MessageExchangeResponse {
    fn from(event: MessagePairEvent) -> Self {
        Self {
            user_message: event.user_message.into(),
            assistant_message: event.assistant_message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_chat_request_defaults_title() {
        let req: CreateChatRequest = serde_json::from_str("{}").expect("deserialize");
        assert_eq!(req.title, "New Chat");
    }

    #[test]
    fn send_message_request_defaults_voice_flag() {
        let req: SendMessageRequest =
            serde_json::from_str(r#"{"content": "hello"}"#).expect("deserialize");
        assert_eq!(req.content, "hello");
        assert!(!req.is_voice);
    }

    #[test]
    fn message_response_serializes_camel_case() {
        let message = Message::new("chat_1", Role::Assistant, "hi");
        let json = serde_json::to_value(MessageResponse::from(message)).expect("serialize");
        assert!(json.get("chatId").is_some());
        assert!(json.get("isVoice").is_some());
        assert_eq!(json["role"], "assistant");
    }

    #[test]
    fn chat_summary_response_omits_missing_preview() {
        let summary = ChatSummary {
            chat: Chat::new("empty"),
            last_message: None,
        };
        let json = serde_json::to_value(ChatSummaryResponse::from(summary)).expect("serialize");
        assert!(json.get("lastMessage").is_none());
    }
}
