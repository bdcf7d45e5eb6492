mod chat;
mod search;

pub use chat::*;
pub use search::*;
