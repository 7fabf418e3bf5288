#[cfg(test)]
#[path = "bubble_list_test.rs"]
mod tests;

use std::collections::HashMap;

use ratatui::prelude::Backend;
use ratatui::prelude::Rect;
use ratatui::text::Line;
use ratatui::widgets::Paragraph;
use ratatui::Frame;

use super::Bubble;
use super::BubbleAlignment;
use crate::domain::models::Message;
use crate::domain::models::Role;

pub const ASSISTANT_NAME: &str = "Wellchat";

/// Rendered bubbles for one thread. Messages never change once written, so
/// lines are cached per message id until the width changes.
#[derive(Default)]
pub struct BubbleList {
    cache: HashMap<String, Vec<Line<'static>>>,
    order: Vec<String>,
    line_width: usize,
    lines_len: usize,
}

impl BubbleList {
    pub fn set_messages(&mut self, messages: &[Message], line_width: usize, username: &str) {
        if self.line_width != line_width {
            self.cache.clear();
            self.line_width = line_width;
        }

        self.order = messages
            .iter()
            .map(|message| return message.id().to_string())
            .collect();
        self.cache
            .retain(|id, _| return self.order.contains(id));

        for message in messages {
            if self.cache.contains_key(message.id()) {
                continue;
            }

            let (align, name) = match message.role() {
                Role::User => (BubbleAlignment::Right, username),
                Role::Assistant => (BubbleAlignment::Left, ASSISTANT_NAME),
            };
            let bubble_lines = Bubble::new(message, align, line_width, name).as_lines();
            self.cache.insert(message.id().to_string(), bubble_lines);
        }

        self.lines_len = self
            .order
            .iter()
            .map(|id| {
                return self.cache.get(id).map(|lines| return lines.len()).unwrap_or(0);
            })
            .sum();
    }

    pub fn len(&self) -> usize {
        return self.lines_len;
    }

    pub fn is_empty(&self) -> bool {
        return self.lines_len == 0;
    }

    pub fn render<B: Backend>(&self, frame: &mut Frame<B>, rect: Rect, scroll: usize) {
        let lines: Vec<Line<'static>> = self
            .order
            .iter()
            .filter_map(|id| return self.cache.get(id))
            .flat_map(|lines| return lines.to_owned())
            .collect();

        frame.render_widget(
            Paragraph::new(lines).scroll((u16::try_from(scroll).unwrap_or(u16::MAX), 0)),
            rect,
        );
    }
}
