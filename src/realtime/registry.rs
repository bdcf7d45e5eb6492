use std::collections::HashMap;
use std::sync::{
    atomic::{AtomicU64, Ordering},
    Arc, Mutex,
};

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::models::Message;

/// Pushed to every listener of a chat when a new exchange is stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagePairEvent {
    pub user_message: Message,
    pub assistant_message: Message,
}

struct ConnectionHandle {
    id: u64,
    sender: mpsc::UnboundedSender<MessagePairEvent>,
}

/// Per-chat registry of live realtime listeners.
///
/// All mutations happen under one lock, so concurrent subscribes and
/// broadcasts for the same chat cannot lose updates. Delivery is
/// best-effort: a listener whose channel is gone is dropped silently.
#[derive(Clone, Default)]
pub struct ConnectionRegistry {
    connections: Arc<Mutex<HashMap<String, Vec<ConnectionHandle>>>>,
    next_id: Arc<AtomicU64>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for `chat_id`. Returns the connection id (for
    /// unsubscribe) and the event receiver.
    pub fn subscribe(
        &self,
        chat_id: &str,
    ) -> (u64, mpsc::UnboundedReceiver<MessagePairEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);

        let mut connections = self.connections.lock().unwrap();
        connections
            .entry(chat_id.to_string())
            .or_default()
            .push(ConnectionHandle { id, sender });

        (id, receiver)
    }

    pub fn unsubscribe(&self, chat_id: &str, connection_id: u64) {
        let mut connections = self.connections.lock().unwrap();
        if let Some(handles) = connections.get_mut(chat_id) {
            handles.retain(|handle| handle.id != connection_id);
            if handles.is_empty() {
                connections.remove(chat_id);
            }
        }
    }

    /// Multicast an event to every listener of `chat_id`.
    ///
    /// Failed sends indicate a disconnected listener; those handles are
    /// pruned instead of surfacing an error.
    pub fn broadcast(&self, chat_id: &str, event: &MessagePairEvent) {
        let mut connections = self.connections.lock().unwrap();
        let Some(handles) = connections.get_mut(chat_id) else {
            return;
        };

        handles.retain(|handle| handle.sender.send(event.clone()).is_ok());
        if handles.is_empty() {
            connections.remove(chat_id);
        }
    }

    pub fn listener_count(&self, chat_id: &str) -> usize {
        let connections = self.connections.lock().unwrap();
        connections.get(chat_id).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Message, Role};

    fn event(chat_id: &str) -> MessagePairEvent {
        MessagePairEvent {
            user_message: Message::new(chat_id, Role::User, "hi"),
            assistant_message: Message::new(chat_id, Role::Assistant, "hello!"),
        }
    }

    #[tokio::test]
    async fn test_broadcast_reaches_all_listeners() {
        let registry = ConnectionRegistry::new();
        let (_id1, mut rx1) = registry.subscribe("chat_1");
        let (_id2, mut rx2) = registry.subscribe("chat_1");

        registry.broadcast("chat_1", &event("chat_1"));

        assert_eq!(rx1.recv().await.unwrap().user_message.content, "hi");
        assert_eq!(rx2.recv().await.unwrap().assistant_message.content, "hello!");
    }

    #[tokio::test]
    async fn test_broadcast_is_scoped_to_chat() {
        let registry = ConnectionRegistry::new();
        let (_id, mut rx_other) = registry.subscribe("chat_2");

        registry.broadcast("chat_1", &event("chat_1"));

        assert!(rx_other.try_recv().is_err());
    }

    #[test]
    fn test_dead_listener_is_pruned_on_broadcast() {
        let registry = ConnectionRegistry::new();
        let (_id, receiver) = registry.subscribe("chat_1");
        drop(receiver);

        registry.broadcast("chat_1", &event("chat_1"));

        assert_eq!(registry.listener_count("chat_1"), 0);
    }

    #[test]
    fn test_unsubscribe_removes_only_that_connection() {
        let registry = ConnectionRegistry::new();
        let (id1, _rx1) = registry.subscribe("chat_1");
        let (_id2, _rx2) = registry.subscribe("chat_1");

        registry.unsubscribe("chat_1", id1);
        assert_eq!(registry.listener_count("chat_1"), 1);
    }

    #[test]
    fn test_event_serializes_camel_case() {
        let json = serde_json::to_value(event("chat_1")).unwrap();
        assert!(json.get("userMessage").is_some());
        assert!(json.get("assistantMessage").is_some());
    }
}
