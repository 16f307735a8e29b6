//! Suggestion lookup boundary.
//!
//! The widget never talks to a network itself; suggestions come from a
//! caller-supplied [`SuggestionSource`]. This module holds the data types
//! crossing that boundary and a demo in-memory source.

mod source;
mod types;

pub use source::{SuggestionSource, StaticSource};
pub use types::{LookupParams, LookupReply, Tag};
