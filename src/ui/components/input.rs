//! Staged-text input for the tag widget.
//!
//! Holds the in-progress, not-yet-committed candidate label. Editing keys
//! reach this component only after the key router has declined them.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// A single-line text input with an optional length cap.
#[derive(Debug, Clone)]
pub struct StagedInput {
    /// The current input value.
    value: String,
    /// Cursor position in bytes (always on a char boundary).
    cursor: usize,
    /// Placeholder text shown when empty.
    placeholder: String,
    /// Maximum number of characters, when configured.
    max_length: Option<usize>,
}

impl StagedInput {
    /// Create a new empty input.
    pub fn new(placeholder: impl Into<String>, max_length: Option<usize>) -> Self {
        Self {
            value: String::new(),
            cursor: 0,
            placeholder: placeholder.into(),
            max_length,
        }
    }

    /// Get the current value.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Set the value and move the cursor to the end.
    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
        self.cursor = self.value.len();
    }

    /// Clear the input.
    pub fn clear(&mut self) {
        self.value.clear();
        self.cursor = 0;
    }

    /// Check if the input is empty.
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    fn prev_boundary(&self) -> Option<usize> {
        self.value[..self.cursor]
            .char_indices()
            .next_back()
            .map(|(i, _)| i)
    }

    fn next_boundary(&self) -> Option<usize> {
        self.value[self.cursor..]
            .chars()
            .next()
            .map(|c| self.cursor + c.len_utf8())
    }

    /// Handle an editing key. Returns true if the value changed.
    pub fn handle_input(&mut self, key: KeyEvent) -> bool {
        match (key.code, key.modifiers) {
            (KeyCode::Char(c), KeyModifiers::NONE | KeyModifiers::SHIFT) => {
                if let Some(max) = self.max_length {
                    if self.value.chars().count() >= max {
                        return false;
                    }
                }
                self.value.insert(self.cursor, c);
                self.cursor += c.len_utf8();
                true
            }
            (KeyCode::Backspace, KeyModifiers::NONE) => {
                if let Some(prev) = self.prev_boundary() {
                    self.value.remove(prev);
                    self.cursor = prev;
                    true
                } else {
                    false
                }
            }
            (KeyCode::Delete, KeyModifiers::NONE) => {
                if self.cursor < self.value.len() {
                    self.value.remove(self.cursor);
                    true
                } else {
                    false
                }
            }
            (KeyCode::Left, KeyModifiers::NONE) => {
                if let Some(prev) = self.prev_boundary() {
                    self.cursor = prev;
                }
                false
            }
            (KeyCode::Right, KeyModifiers::NONE) => {
                if let Some(next) = self.next_boundary() {
                    self.cursor = next;
                }
                false
            }
            (KeyCode::Home, KeyModifiers::NONE) => {
                self.cursor = 0;
                false
            }
            (KeyCode::End, KeyModifiers::NONE) => {
                self.cursor = self.value.len();
                false
            }
            _ => false,
        }
    }

    /// Render the input line, with a cursor marker when focused.
    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let line = if self.value.is_empty() && !focused {
            Line::from(Span::styled(
                self.placeholder.clone(),
                Style::default().fg(Color::DarkGray),
            ))
        } else {
            let (before, after) = self.value.split_at(self.cursor);
            let mut spans = vec![Span::styled(
                before.to_string(),
                Style::default().fg(Color::White),
            )];
            if focused {
                spans.push(Span::styled("\u{258f}", Style::default().fg(Color::Yellow)));
            }
            spans.push(Span::styled(
                after.to_string(),
                Style::default().fg(Color::White),
            ));
            Line::from(spans)
        };
        frame.render_widget(Paragraph::new(line), area);
    }
}
