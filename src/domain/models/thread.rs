use chrono::Local;
use chrono::SecondsFormat;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::create_id;
use super::Message;

pub const PLACEHOLDER_TITLE: &str = "New chat";

/// One conversation. Messages are kept in append order.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatThread {
    pub id: String,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: String,
}

impl Default for ChatThread {
    fn default() -> ChatThread {
        return ChatThread::new();
    }
}

impl ChatThread {
    pub fn new() -> ChatThread {
        return ChatThread {
            id: create_id(),
            title: PLACEHOLDER_TITLE.to_string(),
            messages: vec![],
            created_at: Local::now().to_rfc3339_opts(SecondsFormat::Secs, false),
        };
    }

    pub fn is_empty(&self) -> bool {
        return self.messages.is_empty();
    }
}
