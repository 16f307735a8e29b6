//! Tag input component: the chip list plus its staged text input.
//!
//! Owns the authoritative ordered tag list. All mutations go through
//! [`TagInput::try_add_tag`] / [`TagInput::remove`]; every mutation emits a
//! [`TagEvent`] that the app drains and relays to the host callbacks, the
//! autocomplete panel, and the namespace bus.

use std::collections::VecDeque;

use crossterm::event::KeyEvent;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Wrap},
    Frame,
};
use regex::Regex;

use super::StagedInput;
use crate::config::{ConfigError, TagInputOptions};
use crate::events::TagEvent;
use crate::lookup::Tag;

/// Tag input component.
#[derive(Debug)]
pub struct TagInput {
    /// Resolved options, immutable for the widget's lifetime.
    options: TagInputOptions,
    /// Compiled `allowed_tags_pattern`.
    pattern: Regex,
    /// The ordered collection. Insertion order is render order.
    tags: Vec<Tag>,
    /// The staged, not-yet-committed candidate label.
    input: StagedInput,
    /// Armed state of the two-step backspace delete.
    pending_removal: bool,
    /// Notifications not yet drained by the app.
    events: VecDeque<TagEvent>,
}

impl TagInput {
    /// Create a widget with an empty collection.
    ///
    /// Fails if `allowed_tags_pattern` is not a valid regex.
    pub fn new(options: TagInputOptions) -> Result<Self, ConfigError> {
        Self::with_tags(options, Vec::new())
    }

    /// Create a widget over a pre-populated collection.
    pub fn with_tags(options: TagInputOptions, tags: Vec<Tag>) -> Result<Self, ConfigError> {
        let pattern = Regex::new(&options.allowed_tags_pattern)?;
        let input = StagedInput::new(options.placeholder.clone(), options.max_length);
        Ok(Self {
            options,
            pattern,
            tags,
            input,
            pending_removal: false,
            events: VecDeque::new(),
        })
    }

    /// The current collection.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// The staged input text.
    pub fn staged(&self) -> &str {
        self.input.value()
    }

    /// Whether the staged input is empty.
    pub fn staged_is_empty(&self) -> bool {
        self.input.is_empty()
    }

    /// Whether the last tag is armed for removal.
    pub fn pending_removal(&self) -> bool {
        self.pending_removal
    }

    /// Collection size validity against `min_tags`/`max_tags`.
    pub fn is_valid(&self) -> bool {
        let len = self.tags.len();
        self.options.min_tags.map_or(true, |min| len >= min)
            && self.options.max_tags.map_or(true, |max| len <= max)
    }

    /// Drain pending notifications, oldest first.
    pub fn drain_events(&mut self) -> Vec<TagEvent> {
        self.events.drain(..).collect()
    }

    fn emit(&mut self, event: TagEvent) {
        self.events.push_back(event);
    }

    /// Record that the input gained focus.
    pub fn notify_focus(&mut self) {
        self.emit(TagEvent::InputFocus);
    }

    /// Record that focus genuinely left the widget.
    pub fn notify_blur(&mut self) {
        self.emit(TagEvent::InputBlur);
    }

    /// Forward an editing key to the staged input.
    ///
    /// Any edit that leaves the input non-empty disarms the pending-removal
    /// flag, regardless of which key caused it.
    pub fn handle_edit_key(&mut self, key: KeyEvent) -> bool {
        let changed = self.input.handle_input(key);
        if changed {
            if !self.input.is_empty() {
                self.pending_removal = false;
            }
            self.emit(TagEvent::InputChange(self.input.value().to_string()));
        }
        changed
    }

    /// Try to commit the staged input as a tag.
    pub fn try_add_staged(&mut self) -> bool {
        let candidate = Tag::new(self.input.value());
        self.try_add_tag(candidate)
    }

    /// Validate and add a candidate tag.
    ///
    /// Returns true when validation passed, whether or not the collection
    /// grew: a valid duplicate still clears the staged input, which is what
    /// the claimed key press paid for.
    pub fn try_add_tag(&mut self, mut candidate: Tag) -> bool {
        if candidate.label.is_empty()
            || candidate.label.chars().count() < self.options.min_length
            || !self.pattern.is_match(&candidate.label)
        {
            return false;
        }

        if self.options.replace_spaces_with_dashes {
            candidate.label = candidate
                .label
                .chars()
                .map(|c| if c.is_whitespace() { '-' } else { c })
                .collect();
        }

        if self.options.single_value {
            if self.tags.is_empty() {
                self.tags.push(candidate.clone());
            } else {
                self.tags[0] = candidate.clone();
            }
            let snapshot = self.tags.clone();
            self.emit(TagEvent::TagAdded {
                tag: candidate,
                tags: snapshot,
            });
        } else if !self.tags.iter().any(|t| t.label == candidate.label) {
            self.tags.push(candidate.clone());
            let snapshot = self.tags.clone();
            tracing::debug!(label = %candidate.label, count = snapshot.len(), "tag added");
            self.emit(TagEvent::TagAdded {
                tag: candidate,
                tags: snapshot,
            });
        }

        self.input.clear();
        self.emit(TagEvent::InputChange(String::new()));
        true
    }

    /// Remove the tag at `index`. Out of range is a no-op returning `None`.
    pub fn remove(&mut self, index: usize) -> Option<Tag> {
        if index >= self.tags.len() {
            return None;
        }
        let removed = self.tags.remove(index);
        let snapshot = self.tags.clone();
        tracing::debug!(label = %removed.label, count = snapshot.len(), "tag removed");
        self.emit(TagEvent::TagRemoved {
            tag: removed.clone(),
            tags: snapshot,
        });
        Some(removed)
    }

    /// Backspace on an empty input.
    ///
    /// With `enable_editing_last_tag`, the last tag moves back into the
    /// staged input. Otherwise the first call arms the pending-removal flag
    /// and the second consecutive call removes the last tag.
    pub fn try_remove_last(&mut self) -> bool {
        if self.tags.is_empty() {
            return false;
        }

        if self.options.enable_editing_last_tag {
            let last = self.tags.len() - 1;
            if let Some(removed) = self.remove(last) {
                // programmatic restage, not a user edit: no InputChange, so
                // no suggestion cycle starts
                self.input.set_value(removed.label);
            }
        } else if self.pending_removal {
            let last = self.tags.len() - 1;
            self.remove(last);
            self.pending_removal = false;
        } else {
            self.pending_removal = true;
        }
        true
    }

    /// Render the chip list and the staged input.
    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .title(" Tags ")
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(inner);

        self.render_chips(frame, chunks[0]);
        self.input.render(frame, chunks[1], focused);
    }

    fn render_chips(&self, frame: &mut Frame, area: Rect) {
        if self.tags.is_empty() {
            let empty = Paragraph::new("No tags yet").style(Style::default().fg(Color::DarkGray));
            frame.render_widget(empty, area);
            return;
        }

        let mut spans: Vec<Span> = Vec::new();
        let last = self.tags.len() - 1;
        for (i, tag) in self.tags.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            let style = if self.pending_removal && i == last {
                Style::default().fg(Color::White).bg(Color::Red)
            } else {
                Style::default().fg(Color::White).bg(Color::Blue)
            };
            spans.push(Span::styled(
                format!(" {} {} ", tag.label, self.options.remove_tag_symbol),
                style,
            ));
        }
        let paragraph = Paragraph::new(Line::from(spans)).wrap(Wrap { trim: true });
        frame.render_widget(paragraph, area);
    }
}
