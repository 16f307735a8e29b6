//! Key routing between the tag input and the suggestion panel.
//!
//! The router owns which keys are hotkeys under which conditions; it maps a
//! raw key event to a widget action without executing it. Whether the event
//! is ultimately claimed (kept away from text editing / focus movement)
//! depends on what the action does, which the app decides after dispatch.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::config::TagInputOptions;

/// An action the router resolved from a key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoutedAction {
    /// Try to commit the staged input as a tag.
    AddStaged,
    /// Backspace on an empty input: remove (or arm removal of) the last tag.
    RemoveLast,
    /// Move the suggestion cursor down.
    SelectNext,
    /// Move the suggestion cursor up.
    SelectPrior,
    /// Dismiss the suggestion panel.
    DismissPanel,
    /// Commit the currently selected suggestion.
    CommitSuggestion,
}

/// Context the router needs to interpret a key.
#[derive(Debug, Clone, Copy)]
pub struct RouteContext {
    /// Whether the suggestion panel is currently visible.
    pub panel_visible: bool,
    /// Whether the staged input is empty.
    pub input_empty: bool,
}

/// Maps raw key events to widget actions.
#[derive(Debug, Clone)]
pub struct KeyRouter {
    add_on_enter: bool,
    add_on_comma: bool,
    add_on_space: bool,
}

impl KeyRouter {
    /// Build a router from the widget options.
    pub fn new(options: &TagInputOptions) -> Self {
        Self {
            add_on_enter: options.add_on_enter,
            add_on_comma: options.add_on_comma,
            add_on_space: options.add_on_space,
        }
    }

    /// Resolve a key event to an action, or `None` when the key is not a
    /// hotkey in the current context (it then falls through to text editing).
    pub fn route(&self, key: KeyEvent, ctx: RouteContext) -> Option<RoutedAction> {
        if key
            .modifiers
            .intersects(KeyModifiers::SHIFT | KeyModifiers::ALT | KeyModifiers::CONTROL | KeyModifiers::SUPER)
        {
            return None;
        }

        if ctx.panel_visible {
            match key.code {
                KeyCode::Down => Some(RoutedAction::SelectNext),
                KeyCode::Up => Some(RoutedAction::SelectPrior),
                KeyCode::Esc => Some(RoutedAction::DismissPanel),
                KeyCode::Enter | KeyCode::Tab => Some(RoutedAction::CommitSuggestion),
                _ => None,
            }
        } else {
            match key.code {
                KeyCode::Enter if self.add_on_enter => Some(RoutedAction::AddStaged),
                KeyCode::Char(',') if self.add_on_comma => Some(RoutedAction::AddStaged),
                KeyCode::Char(' ') if self.add_on_space => Some(RoutedAction::AddStaged),
                KeyCode::Backspace if ctx.input_empty => Some(RoutedAction::RemoveLast),
                _ => None,
            }
        }
    }
}
