mod chats;
mod messages;

pub use chats::ChatRepository;
pub use messages::MessageRepository;
