#[cfg(test)]
#[path = "backend_test.rs"]
mod tests;

use std::sync::Arc;

use async_trait::async_trait;
use serde_derive::Deserialize;
use serde_derive::Serialize;

use super::Message;
use super::Role;

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum BackendError {
    #[error("completion endpoint responded with status {0}")]
    Status(u16),
    #[error("completion request failed: {0}")]
    Transport(String),
    #[error("completion response has an unexpected shape: {0}")]
    InvalidPayload(String),
}

/// A single `{role, content}` pair as sent to the completion endpoint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

pub struct CompletionPrompt {
    pub thread_id: String,
    pub history: Vec<Message>,
    pub text: String,
}

impl CompletionPrompt {
    /// Keeps only the trailing `window` messages of `history`.
    pub fn new(thread_id: &str, history: &[Message], text: &str, window: usize) -> CompletionPrompt {
        let start = history.len().saturating_sub(window);

        return CompletionPrompt {
            thread_id: thread_id.to_string(),
            history: history[start..].to_vec(),
            text: text.to_string(),
        };
    }

    pub fn turns(&self) -> Vec<ChatTurn> {
        let mut turns = self
            .history
            .iter()
            .map(|message| {
                return ChatTurn {
                    role: message.role(),
                    content: message.text().to_string(),
                };
            })
            .collect::<Vec<ChatTurn>>();

        turns.push(ChatTurn {
            role: Role::User,
            content: self.text.to_string(),
        });

        return turns;
    }
}

pub struct TitlePrompt {
    pub thread_id: String,
    pub text: String,
}

pub struct CompletionResult {
    pub thread_id: String,
    pub result: Result<String, BackendError>,
}

pub struct TitleResult {
    pub thread_id: String,
    pub title: Option<String>,
}

#[async_trait]
pub trait Backend {
    /// Sends the prompt's turns to the completion service and returns the
    /// assistant's answer. Responses without an answer resolve to a
    /// placeholder rather than an error.
    async fn get_completion(&self, prompt: &CompletionPrompt) -> Result<String, BackendError>;

    /// Best effort title for a conversation starting with `text`. Any
    /// failure resolves to `None`.
    async fn generate_title(&self, text: &str) -> Option<String>;
}

pub type BackendBox = Arc<dyn Backend + Send + Sync>;
