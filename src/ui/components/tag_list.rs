//! Read-only sibling tag list.
//!
//! Mirrors a tag collection owned elsewhere. It never touches the collection
//! directly: snapshots arrive over the namespace bus and removals are
//! requested back over the same bus by index.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, ListState},
    Frame,
};

use crate::lookup::Tag;

/// Action resulting from tag list input.
#[derive(Debug, Clone, PartialEq)]
pub enum TagListAction {
    /// Ask the owning widget to remove the tag at this index.
    RequestRemove(usize),
}

/// Mirroring tag list component.
#[derive(Debug)]
pub struct TagListView {
    /// Latest snapshot received from the owner.
    tags: Vec<Tag>,
    /// Cursor into the snapshot.
    selected: usize,
    /// Whether the remove control is enabled.
    remove_enabled: bool,
}

impl TagListView {
    /// Create an empty list view.
    pub fn new(remove_enabled: bool) -> Self {
        Self {
            tags: Vec::new(),
            selected: 0,
            remove_enabled,
        }
    }

    /// The mirrored tags.
    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    /// The cursor position.
    pub fn selected(&self) -> usize {
        self.selected
    }

    /// Replace the mirrored state with a new full snapshot.
    ///
    /// Snapshots are authoritative; the cursor is clamped into the new list.
    pub fn apply_snapshot(&mut self, tags: Vec<Tag>) {
        self.tags = tags;
        if !self.tags.is_empty() {
            self.selected = self.selected.min(self.tags.len() - 1);
        } else {
            self.selected = 0;
        }
    }

    /// Handle keyboard input while the list pane is focused.
    pub fn handle_input(&mut self, key: KeyEvent) -> Option<TagListAction> {
        match (key.code, key.modifiers) {
            (KeyCode::Char('j'), KeyModifiers::NONE) | (KeyCode::Down, KeyModifiers::NONE) => {
                if !self.tags.is_empty() && self.selected + 1 < self.tags.len() {
                    self.selected += 1;
                }
                None
            }
            (KeyCode::Char('k'), KeyModifiers::NONE) | (KeyCode::Up, KeyModifiers::NONE) => {
                if self.selected > 0 {
                    self.selected -= 1;
                }
                None
            }
            (KeyCode::Char('x'), KeyModifiers::NONE) | (KeyCode::Delete, KeyModifiers::NONE) => {
                if self.remove_enabled && !self.tags.is_empty() {
                    Some(TagListAction::RequestRemove(self.selected))
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    /// Render the mirrored list.
    pub fn render(&self, frame: &mut Frame, area: Rect, focused: bool) {
        let border_style = if focused {
            Style::default().fg(Color::Cyan)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .title(" Tag List ")
            .borders(Borders::ALL)
            .border_style(border_style);
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let items: Vec<ListItem> = self
            .tags
            .iter()
            .map(|tag| ListItem::new(format!("  {}", tag.label)))
            .collect();

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        if focused && !self.tags.is_empty() {
            state.select(Some(self.selected));
        }
        frame.render_stateful_widget(list, inner, &mut state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn view_with(labels: &[&str]) -> TagListView {
        let mut view = TagListView::new(true);
        view.apply_snapshot(labels.iter().map(|l| Tag::new(*l)).collect());
        view
    }

    #[test]
    fn test_snapshot_replaces_state() {
        let mut view = view_with(&["a", "b"]);
        view.apply_snapshot(vec![Tag::new("c")]);
        assert_eq!(view.tags().len(), 1);
        assert_eq!(view.tags()[0].label, "c");
    }

    #[test]
    fn test_snapshot_clamps_cursor() {
        let mut view = view_with(&["a", "b", "c"]);
        view.handle_input(key(KeyCode::Char('j')));
        view.handle_input(key(KeyCode::Char('j')));
        assert_eq!(view.selected(), 2);

        view.apply_snapshot(vec![Tag::new("a")]);
        assert_eq!(view.selected(), 0);
    }

    #[test]
    fn test_navigation_bounds() {
        let mut view = view_with(&["a", "b"]);
        view.handle_input(key(KeyCode::Char('k')));
        assert_eq!(view.selected(), 0);
        view.handle_input(key(KeyCode::Char('j')));
        view.handle_input(key(KeyCode::Char('j')));
        assert_eq!(view.selected(), 1);
    }

    #[test]
    fn test_remove_requests_by_index() {
        let mut view = view_with(&["a", "b"]);
        view.handle_input(key(KeyCode::Char('j')));
        assert_eq!(
            view.handle_input(key(KeyCode::Char('x'))),
            Some(TagListAction::RequestRemove(1))
        );
    }

    #[test]
    fn test_remove_disabled() {
        let mut view = TagListView::new(false);
        view.apply_snapshot(vec![Tag::new("a")]);
        assert_eq!(view.handle_input(key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_remove_on_empty_list_is_noop() {
        let mut view = TagListView::new(true);
        assert_eq!(view.handle_input(key(KeyCode::Delete)), None);
    }
}
