#[cfg(test)]
#[path = "view_test.rs"]
mod tests;

use ratatui::prelude::Rect;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuItem {
    Rename,
    Delete,
}

impl MenuItem {
    pub const ALL: [MenuItem; 2] = [MenuItem::Rename, MenuItem::Delete];

    pub fn label(&self) -> &'static str {
        match self {
            MenuItem::Rename => return "Rename",
            MenuItem::Delete => return "Delete",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ContextMenu {
    pub thread_id: String,
    pub cursor: usize,
    /// Where the menu was last drawn, for outside-click detection.
    pub area: Option<Rect>,
}

impl ContextMenu {
    pub fn selected(&self) -> MenuItem {
        return MenuItem::ALL[self.cursor];
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Input,
    Sidebar,
    Menu,
    Rename,
    ConfirmDelete,
}

/// Transient UI flags. Nothing here is persisted.
#[derive(Default)]
pub struct ViewState {
    pub sidebar_open: bool,
    pub sidebar_cursor: usize,
    pub menu: Option<ContextMenu>,
    pub renaming: Option<String>,
    pub pending_delete: Option<String>,
}

impl ViewState {
    pub fn focus(&self) -> Focus {
        if self.pending_delete.is_some() {
            return Focus::ConfirmDelete;
        }
        if self.renaming.is_some() {
            return Focus::Rename;
        }
        if self.menu.is_some() {
            return Focus::Menu;
        }
        if self.sidebar_open {
            return Focus::Sidebar;
        }

        return Focus::Input;
    }

    pub fn toggle_sidebar(&mut self) {
        if self.sidebar_open {
            self.close_sidebar();
        } else {
            self.sidebar_open = true;
        }
    }

    pub fn close_sidebar(&mut self) {
        self.sidebar_open = false;
        self.menu = None;
    }

    pub fn sidebar_up(&mut self) {
        self.sidebar_cursor = self.sidebar_cursor.saturating_sub(1);
    }

    pub fn sidebar_down(&mut self, thread_count: usize) {
        if thread_count == 0 {
            self.sidebar_cursor = 0;
            return;
        }
        self.sidebar_cursor = (self.sidebar_cursor + 1).min(thread_count - 1);
    }

    pub fn clamp_cursor(&mut self, thread_count: usize) {
        self.sidebar_cursor = self.sidebar_cursor.min(thread_count.saturating_sub(1));
    }

    pub fn open_menu(&mut self, thread_id: &str) {
        self.menu = Some(ContextMenu {
            thread_id: thread_id.to_string(),
            cursor: 0,
            area: None,
        });
    }

    pub fn menu_up(&mut self) {
        if let Some(menu) = self.menu.as_mut() {
            menu.cursor = menu.cursor.saturating_sub(1);
        }
    }

    pub fn menu_down(&mut self) {
        if let Some(menu) = self.menu.as_mut() {
            menu.cursor = (menu.cursor + 1).min(MenuItem::ALL.len() - 1);
        }
    }

    /// Closes the menu and moves on to the chosen item's prompt.
    pub fn choose_menu_item(&mut self) -> Option<MenuItem> {
        let menu = self.menu.take()?;
        let item = menu.selected();
        match item {
            MenuItem::Rename => self.renaming = Some(menu.thread_id),
            MenuItem::Delete => self.pending_delete = Some(menu.thread_id),
        }

        return Some(item);
    }

    pub fn set_menu_area(&mut self, area: Rect) {
        if let Some(menu) = self.menu.as_mut() {
            menu.area = Some(area);
        }
    }

    /// A click anywhere outside the open context menu closes it.
    pub fn click(&mut self, column: u16, row: u16) {
        let inside = match self.menu.as_ref().and_then(|menu| return menu.area) {
            Some(area) => {
                column >= area.x
                    && column < area.x + area.width
                    && row >= area.y
                    && row < area.y + area.height
            }
            None => false,
        };

        if !inside {
            self.menu = None;
        }
    }

    /// Cancel key: backs out of a pending prompt first, otherwise closes the
    /// side panel along with its menu.
    pub fn cancel(&mut self) {
        if self.pending_delete.take().is_some() {
            return;
        }
        if self.renaming.take().is_some() {
            return;
        }

        self.close_sidebar();
    }
}
