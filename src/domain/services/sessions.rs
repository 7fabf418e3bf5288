#[cfg(test)]
#[path = "sessions_test.rs"]
mod tests;

use crate::domain::models::ChatThread;
use crate::domain::models::Message;
use crate::infrastructure::storage::StorageBox;

pub const STORAGE_KEY: &str = "chats";

/// Decodes a stored payload. Anything other than a JSON array of threads is
/// treated as no saved state.
fn decode_threads(payload: &str) -> Vec<ChatThread> {
    let value = match serde_json::from_str::<serde_json::Value>(payload) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(error = ?err, "Discarding stored chats, payload is not JSON");
            return vec![];
        }
    };

    if !value.is_array() {
        tracing::warn!("Discarding stored chats, payload is not an array");
        return vec![];
    }

    match serde_json::from_value::<Vec<ChatThread>>(value) {
        Ok(threads) => {
            return threads;
        }
        Err(err) => {
            tracing::warn!(error = ?err, "Discarding stored chats, threads are malformed");
            return vec![];
        }
    }
}

/// Owns every chat thread and the active thread pointer. Threads are kept
/// most recent first, and the whole collection is written back to storage
/// after each change to it.
///
/// Memory is authoritative. A failed write is logged and leaves the store
/// unsaved until a later write succeeds.
pub struct SessionStore {
    storage: StorageBox,
    threads: Vec<ChatThread>,
    active_thread_id: Option<String>,
    saved: bool,
}

impl SessionStore {
    pub async fn load(storage: StorageBox) -> SessionStore {
        let threads = match storage.get(STORAGE_KEY).await {
            Ok(Some(payload)) => decode_threads(&payload),
            Ok(None) => vec![],
            Err(err) => {
                tracing::warn!(error = ?err, "Discarding stored chats, payload is unreadable");
                vec![]
            }
        };

        let active_thread_id = threads.first().map(|thread| return thread.id.to_string());
        tracing::debug!(threads = threads.len(), "Loaded chats");

        return SessionStore {
            storage,
            threads,
            active_thread_id,
            saved: true,
        };
    }

    /// False while the last write to storage failed.
    pub fn is_saved(&self) -> bool {
        return self.saved;
    }

    pub fn threads(&self) -> &[ChatThread] {
        return &self.threads;
    }

    pub fn thread(&self, id: &str) -> Option<&ChatThread> {
        return self.threads.iter().find(|thread| return thread.id == id);
    }

    pub fn active_thread_id(&self) -> Option<&str> {
        return self.active_thread_id.as_deref();
    }

    pub fn active_thread(&self) -> Option<&ChatThread> {
        return self
            .active_thread_id
            .as_deref()
            .and_then(|id| return self.thread(id));
    }

    fn thread_mut(&mut self, id: &str) -> Option<&mut ChatThread> {
        return self.threads.iter_mut().find(|thread| return thread.id == id);
    }

    pub async fn create_thread(&mut self) -> String {
        let thread = ChatThread::new();
        let id = thread.id.to_string();

        self.threads.insert(0, thread);
        self.active_thread_id = Some(id.to_string());
        self.persist().await;

        return id;
    }

    pub async fn ensure_active_thread(&mut self) -> String {
        if let Some(id) = self.active_thread_id.as_ref() {
            return id.to_string();
        }

        return self.create_thread().await;
    }

    pub fn select_thread(&mut self, id: &str) -> bool {
        if self.thread(id).is_none() {
            return false;
        }

        self.active_thread_id = Some(id.to_string());
        return true;
    }

    pub async fn rename_thread(&mut self, id: &str, new_title: &str) -> bool {
        let title = new_title.trim();
        if title.is_empty() {
            return false;
        }

        match self.thread_mut(id) {
            Some(thread) => {
                thread.title = title.to_string();
            }
            None => {
                return false;
            }
        }

        self.persist().await;
        return true;
    }

    pub async fn delete_thread(&mut self, id: &str) -> bool {
        let count = self.threads.len();
        self.threads.retain(|thread| return thread.id != id);
        if self.threads.len() == count {
            return false;
        }

        if self.active_thread_id.as_deref() == Some(id) {
            self.active_thread_id = self
                .threads
                .first()
                .map(|thread| return thread.id.to_string());
        }

        self.persist().await;
        return true;
    }

    pub async fn delete_all(&mut self) {
        self.threads.clear();
        self.active_thread_id = None;

        match self.storage.remove(STORAGE_KEY).await {
            Ok(()) => {
                self.saved = true;
            }
            Err(err) => {
                tracing::warn!(error = ?err, "Failed to remove stored chats");
                self.saved = false;
            }
        }
    }

    pub async fn append_message(&mut self, thread_id: &str, message: Message) -> bool {
        match self.thread_mut(thread_id) {
            Some(thread) => {
                thread.messages.push(message);
            }
            None => {
                return false;
            }
        }

        self.persist().await;
        return true;
    }

    async fn persist(&mut self) {
        let res = match serde_json::to_string(&self.threads) {
            Ok(payload) => self.storage.set(STORAGE_KEY, &payload).await,
            Err(err) => Err(err.into()),
        };

        match res {
            Ok(()) => {
                self.saved = true;
            }
            Err(err) => {
                tracing::warn!(error = ?err, threads = self.threads.len(), "Failed to save chats");
                self.saved = false;
            }
        }
    }
}
