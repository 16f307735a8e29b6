//! Event handling for the application.
//!
//! Terminal events come in through [`EventHandler`]; widget-level
//! notifications travel as [`TagEvent`] values drained from the tag input
//! each frame.

mod handler;
mod router;

pub use handler::EventHandler;
pub use router::{KeyRouter, RouteContext, RoutedAction};

use crossterm::event::KeyEvent;

use crate::lookup::Tag;

/// A terminal-level event delivered to the main loop.
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    /// A key press.
    Key(KeyEvent),
    /// Terminal resize (width, height).
    Resize(u16, u16),
    /// The terminal window gained focus.
    FocusGained,
    /// The terminal window lost focus.
    FocusLost,
    /// No event within the tick rate; drives timers.
    Tick,
}

/// A notification emitted by the tag input, consumable by the host and
/// relayed onto the namespace bus.
#[derive(Debug, Clone, PartialEq)]
pub enum TagEvent {
    /// A tag was appended (or, in single-value mode, replaced).
    TagAdded {
        /// The tag that was added.
        tag: Tag,
        /// Snapshot of the full collection after the add.
        tags: Vec<Tag>,
    },
    /// A tag was removed.
    TagRemoved {
        /// The tag that was removed.
        tag: Tag,
        /// Snapshot of the full collection after the removal.
        tags: Vec<Tag>,
    },
    /// The staged input text changed.
    InputChange(String),
    /// The input gained focus.
    InputFocus,
    /// Focus genuinely left the widget (after the grace window).
    InputBlur,
}
