#[cfg(test)]
#[path = "message_test.rs"]
mod tests;

use serde_derive::Deserialize;
use serde_derive::Serialize;
use uuid::Uuid;

use super::Role;

/// Short opaque id made of the first two groups of a v4 UUID.
pub fn create_id() -> String {
    return Uuid::new_v4()
        .to_string()
        .split('-')
        .take(2)
        .collect::<Vec<&str>>()
        .join("-");
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    id: String,
    role: Role,
    text: String,
}

impl Message {
    pub fn new(role: Role, text: &str) -> Message {
        return Message {
            id: create_id(),
            role,
            text: text.trim().replace('\t', "  "),
        };
    }

    pub fn id(&self) -> &str {
        return &self.id;
    }

    pub fn role(&self) -> Role {
        return self.role;
    }

    pub fn text(&self) -> &str {
        return &self.text;
    }

    pub fn as_string_lines(&self, line_max_width: usize) -> Vec<String> {
        let line_max_width = line_max_width.max(1);
        let mut lines: Vec<String> = Vec::new();

        for full_line in self.text.split('\n') {
            if full_line.trim().is_empty() {
                lines.push(" ".to_string());
                continue;
            }

            let mut char_count = 0;
            let mut current_lines: Vec<String> = vec![];

            for word in full_line.split(' ') {
                let mut word = word.to_string();

                // Words wider than the bubble get hard broken.
                while word.chars().count() > line_max_width {
                    if !current_lines.is_empty() {
                        lines.push(current_lines.join(" ").trim_end().to_string());
                        current_lines = vec![];
                        char_count = 0;
                    }
                    let head = word.chars().take(line_max_width).collect::<String>();
                    word = word.chars().skip(line_max_width).collect::<String>();
                    lines.push(head);
                }

                let word_len = word.chars().count();
                if word_len + char_count + 1 > line_max_width && !current_lines.is_empty() {
                    lines.push(current_lines.join(" ").trim_end().to_string());
                    current_lines = vec![word];
                    char_count = word_len + 1;
                } else {
                    current_lines.push(word);
                    char_count += word_len + 1;
                }
            }
            if !current_lines.is_empty() {
                lines.push(current_lines.join(" ").trim_end().to_string());
            }
        }

        return lines;
    }
}
