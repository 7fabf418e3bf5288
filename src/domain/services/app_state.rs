#[cfg(test)]
#[path = "app_state_test.rs"]
mod tests;

use anyhow::Result;
use ratatui::prelude::Rect;
use tokio::sync::mpsc;

use super::BubbleList;
use super::ChatController;
use super::Scroll;
use super::SessionStore;
use super::ViewState;
use crate::domain::models::Action;
use crate::domain::models::ChatThread;
use crate::domain::models::CompletionResult;
use crate::domain::models::Loading;
use crate::domain::models::TitleResult;

pub const GREETING: &str = "Hello, I'm your AI-powered assistant";

pub const SUGGESTIONS: [&str; 3] = [
    "Tell me about vitamins worth taking in winter",
    "What should I pay attention to when choosing a meal plan?",
    "How can I quickly deal with stress and take my mind off anxiety?",
];

pub struct AppState {
    pub chat: ChatController,
    pub view: ViewState,
    pub bubble_list: BubbleList,
    pub scroll: Scroll,
    pub loading: Loading,
    pub username: String,
    pub last_known_height: u16,
    pub last_known_width: u16,
    suggestion_index: Option<usize>,
    rendered_thread_id: Option<String>,
}

impl AppState {
    pub fn new(store: SessionStore, history_window: usize, username: &str) -> AppState {
        let mut app_state = AppState {
            chat: ChatController::new(store, history_window),
            view: ViewState::default(),
            bubble_list: BubbleList::default(),
            scroll: Scroll::default(),
            loading: Loading::default(),
            username: username.to_string(),
            last_known_height: 0,
            last_known_width: 0,
            suggestion_index: None,
            rendered_thread_id: None,
        };
        app_state.sync_dependants();

        return app_state;
    }

    pub fn active_thread(&self) -> Option<&ChatThread> {
        return self.chat.store().active_thread();
    }

    pub fn threads(&self) -> &[ChatThread] {
        return self.chat.store().threads();
    }

    /// Whether the suggestions screen stands in for the message list.
    pub fn shows_suggestions(&self) -> bool {
        return self
            .active_thread()
            .map(|thread| return thread.is_empty())
            .unwrap_or(true);
    }

    /// Next starter prompt to place in the input box, cycling through the
    /// list. `None` once the conversation has started.
    pub fn next_suggestion(&mut self) -> Option<&'static str> {
        if !self.shows_suggestions() {
            return None;
        }

        let idx = match self.suggestion_index {
            Some(idx) => (idx + 1) % SUGGESTIONS.len(),
            None => 0,
        };
        self.suggestion_index = Some(idx);

        return Some(SUGGESTIONS[idx]);
    }

    fn is_visible(&self, thread_id: &str) -> bool {
        return self.chat.store().active_thread_id() == Some(thread_id);
    }

    /// Sends `text` on the active thread. Returns false when the send was
    /// ignored, so the caller keeps the prompt contents.
    pub async fn submit(&mut self, text: &str, tx: &mpsc::UnboundedSender<Action>) -> Result<bool> {
        let follow = self.scroll.is_near_bottom();
        let sent = self.chat.send(text, tx).await?;
        if sent.is_none() {
            return Ok(false);
        }

        self.suggestion_index = None;
        self.sync_dependants();
        if follow {
            self.scroll.last();
        }

        return Ok(true);
    }

    pub async fn handle_completion(&mut self, res: CompletionResult) {
        let visible = self.is_visible(&res.thread_id);
        let follow = visible && self.scroll.is_near_bottom();

        self.chat
            .handle_completion(&res.thread_id, res.result)
            .await;

        if visible {
            self.sync_dependants();
            if follow {
                self.scroll.last();
            }
        }
    }

    pub async fn handle_title(&mut self, res: TitleResult) {
        self.chat.handle_title(&res.thread_id, res.title).await;
    }

    pub async fn new_chat(&mut self) {
        self.chat.store_mut().create_thread().await;
        self.view.sidebar_cursor = 0;
        self.view.close_sidebar();
        self.sync_dependants();
    }

    /// Makes the thread under the sidebar cursor the active one.
    pub fn activate_selected(&mut self) -> bool {
        let id = match self.threads().get(self.view.sidebar_cursor) {
            Some(thread) => thread.id.to_string(),
            None => {
                return false;
            }
        };

        return self.activate_thread(&id);
    }

    pub fn activate_thread(&mut self, id: &str) -> bool {
        if !self.chat.store_mut().select_thread(id) {
            return false;
        }

        if let Some(idx) = self.threads().iter().position(|thread| return thread.id == id) {
            self.view.sidebar_cursor = idx;
        }
        self.sync_dependants();

        return true;
    }

    pub fn open_menu_for_selected(&mut self) {
        let id = match self.threads().get(self.view.sidebar_cursor) {
            Some(thread) => thread.id.to_string(),
            None => {
                return;
            }
        };

        self.view.open_menu(&id);
    }

    /// Applies the title typed into the rename prompt. A blank title leaves
    /// the thread unchanged.
    pub async fn finish_rename(&mut self, title: &str) {
        if let Some(id) = self.view.renaming.take() {
            self.chat.store_mut().rename_thread(&id, title).await;
        }
    }

    pub async fn finish_delete(&mut self, confirmed: bool) {
        let id = match self.view.pending_delete.take() {
            Some(id) => id,
            None => {
                return;
            }
        };

        if !confirmed {
            return;
        }

        self.chat.store_mut().delete_thread(&id).await;
        let count = self.threads().len();
        self.view.clamp_cursor(count);
        self.sync_dependants();
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.last_known_width = rect.width;
        self.last_known_height = rect.height;
        self.sync_dependants();
    }

    /// Rebuilds the bubbles for the active thread. Switching threads jumps
    /// to the bottom of the new one.
    pub fn sync_dependants(&mut self) {
        let active_id = self.chat.store().active_thread_id().map(|id| return id.to_string());
        let messages = self
            .chat
            .store()
            .active_thread()
            .map(|thread| return thread.messages.to_vec())
            .unwrap_or_default();

        self.bubble_list.set_messages(
            &messages,
            self.last_known_width as usize,
            &self.username,
        );
        self.scroll
            .set_state(self.bubble_list.len(), self.last_known_height as usize);

        if self.rendered_thread_id != active_id {
            self.rendered_thread_id = active_id;
            self.scroll.last();
        }
    }
}
