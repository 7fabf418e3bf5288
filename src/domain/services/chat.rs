#[cfg(test)]
#[path = "chat_test.rs"]
mod tests;

use std::collections::HashMap;
use std::collections::HashSet;

use anyhow::Result;
use tokio::sync::mpsc;

use super::SessionStore;
use crate::domain::models::Action;
use crate::domain::models::BackendError;
use crate::domain::models::CompletionPrompt;
use crate::domain::models::Message;
use crate::domain::models::Role;
use crate::domain::models::TitlePrompt;

pub const FALLBACK_ANSWER: &str =
    "Sorry, something went wrong while getting an answer. Please try again in a moment.";

const TITLE_MAX_CHARS: usize = 40;

/// Title shown until the title service answers: whitespace collapsed and
/// truncated.
pub fn provisional_title(text: &str) -> String {
    let cleaned = text.split_whitespace().collect::<Vec<&str>>().join(" ");
    if cleaned.chars().count() <= TITLE_MAX_CHARS {
        return cleaned;
    }

    let mut truncated = cleaned
        .chars()
        .take(TITLE_MAX_CHARS - 1)
        .collect::<String>();

    // Prefer cutting at a word boundary.
    if let Some((head, _)) = truncated.rsplit_once(' ') {
        if !head.is_empty() {
            truncated = head.to_string();
        }
    }

    return format!("{}…", truncated.trim_end());
}

/// Sequences a send: the user message lands in the thread before any
/// request goes out, and each thread has at most one completion in flight.
pub struct ChatController {
    store: SessionStore,
    history_window: usize,
    in_flight: HashSet<String>,
    provisional_titles: HashMap<String, String>,
}

impl ChatController {
    pub fn new(store: SessionStore, history_window: usize) -> ChatController {
        return ChatController {
            store,
            history_window,
            in_flight: HashSet::new(),
            provisional_titles: HashMap::new(),
        };
    }

    pub fn store(&self) -> &SessionStore {
        return &self.store;
    }

    pub fn store_mut(&mut self) -> &mut SessionStore {
        return &mut self.store;
    }

    pub fn is_thread_sending(&self, thread_id: &str) -> bool {
        return self.in_flight.contains(thread_id);
    }

    /// Whether the active thread is waiting on a completion.
    pub fn is_sending(&self) -> bool {
        return match self.store.active_thread_id() {
            Some(id) => self.is_thread_sending(id),
            None => false,
        };
    }

    /// Returns the thread the message was sent on, or `None` when the send
    /// was ignored.
    pub async fn send(
        &mut self,
        text: &str,
        tx: &mpsc::UnboundedSender<Action>,
    ) -> Result<Option<String>> {
        let text = text.trim();
        if text.is_empty() || self.is_sending() {
            return Ok(None);
        }

        let thread_id = self.store.ensure_active_thread().await;
        let message = Message::new(Role::User, text);
        let text = message.text().to_string();
        self.store.append_message(&thread_id, message).await;

        let history = match self.store.thread(&thread_id) {
            Some(thread) => thread.messages[..thread.messages.len() - 1].to_vec(),
            None => vec![],
        };

        if history.is_empty() {
            let title = provisional_title(&text);
            self.store.rename_thread(&thread_id, &title).await;
            self.provisional_titles
                .insert(thread_id.to_string(), title.to_string());

            tx.send(Action::TitleRequest(TitlePrompt {
                thread_id: thread_id.to_string(),
                text: text.to_string(),
            }))?;
        }

        self.in_flight.insert(thread_id.to_string());
        let prompt = CompletionPrompt::new(&thread_id, &history, &text, self.history_window);
        if let Err(err) = tx.send(Action::CompletionRequest(prompt)) {
            self.in_flight.remove(&thread_id);
            return Err(err.into());
        }

        tracing::debug!(thread_id = thread_id, "Sent completion request");
        return Ok(Some(thread_id));
    }

    pub async fn handle_completion(
        &mut self,
        thread_id: &str,
        result: Result<String, BackendError>,
    ) {
        self.in_flight.remove(thread_id);

        let text = match result {
            Ok(answer) => answer,
            Err(err) => {
                tracing::error!(thread_id = thread_id, error = ?err, "Completion failed");
                FALLBACK_ANSWER.to_string()
            }
        };

        let appended = self
            .store
            .append_message(thread_id, Message::new(Role::Assistant, &text))
            .await;
        if !appended {
            tracing::debug!(thread_id = thread_id, "Dropped completion for a deleted thread");
        }
    }

    /// Applies a generated title to the thread the request was made for,
    /// unless the thread is gone or was renamed in the meantime.
    pub async fn handle_title(&mut self, thread_id: &str, title: Option<String>) {
        let provisional = match self.provisional_titles.remove(thread_id) {
            Some(provisional) => provisional,
            None => {
                return;
            }
        };

        let title = match title {
            Some(title) => title,
            None => {
                return;
            }
        };

        let still_provisional = self
            .store
            .thread(thread_id)
            .map(|thread| return thread.title == provisional)
            .unwrap_or(false);
        if !still_provisional {
            tracing::debug!(thread_id = thread_id, "Ignoring stale generated title");
            return;
        }

        self.store.rename_thread(thread_id, &title).await;
    }
}
