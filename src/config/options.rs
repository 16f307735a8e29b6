//! Widget option structs.
//!
//! Options are resolved once per widget instance: hardcoded defaults,
//! overridden by the config file, overridden by CLI flags. Nothing re-parses
//! attributes at runtime; the merged structs are handed to the widgets at
//! construction and never mutated afterwards.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Default pattern a new tag label must satisfy.
pub const DEFAULT_ALLOWED_TAGS_PATTERN: &str = "^[-_ a-zA-Z0-9]+$";

/// Boundary behavior for suggestion-list navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BoundaryPolicy {
    /// Stop at the first/last item.
    #[default]
    Clamp,
    /// Advancing past the last item selects the first, and vice versa.
    Wrap,
}

/// Options for the tag collection and its staged input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TagInputOptions {
    /// Hint text shown while the input is empty.
    pub placeholder: String,
    /// Minimum label length to accept a new tag.
    pub min_length: usize,
    /// Maximum label length, enforced while typing.
    pub max_length: Option<usize>,
    /// Collection size below which the widget reports invalid.
    pub min_tags: Option<usize>,
    /// Collection size above which the widget reports invalid.
    pub max_tags: Option<usize>,
    /// Glyph rendered on each chip's remove control.
    pub remove_tag_symbol: String,
    /// Commit the staged tag on Enter.
    pub add_on_enter: bool,
    /// Commit the staged tag on comma.
    pub add_on_comma: bool,
    /// Commit the staged tag on space.
    pub add_on_space: bool,
    /// Commit the staged tag when the input loses focus.
    pub add_on_blur: bool,
    /// Regex a label must match; compiled once at widget construction.
    pub allowed_tags_pattern: String,
    /// Backspace on an empty input re-edits the last tag instead of the
    /// two-step delete.
    pub enable_editing_last_tag: bool,
    /// Rewrite whitespace in labels to dashes before the duplicate check.
    pub replace_spaces_with_dashes: bool,
    /// Single-value dropdown variant: adds replace index 0, duplicates allowed.
    pub single_value: bool,
    /// Channel name linking the widget to a sibling tag list. Empty/absent
    /// disables the bus.
    pub messaging_namespace: Option<String>,
}

impl Default for TagInputOptions {
    fn default() -> Self {
        Self {
            placeholder: "Add a tag".to_string(),
            min_length: 3,
            max_length: None,
            min_tags: None,
            max_tags: None,
            remove_tag_symbol: "\u{d7}".to_string(),
            add_on_enter: true,
            add_on_comma: true,
            add_on_space: false,
            add_on_blur: true,
            allowed_tags_pattern: DEFAULT_ALLOWED_TAGS_PATTERN.to_string(),
            enable_editing_last_tag: false,
            replace_spaces_with_dashes: false,
            single_value: false,
            messaging_namespace: None,
        }
    }
}

/// Options for the autocomplete panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AutocompleteOptions {
    /// Idle time after the last keystroke before the lookup fires.
    pub debounce_delay_ms: u64,
    /// Minimum query length before a lookup is issued.
    pub min_length: usize,
    /// Cap on rendered suggestions.
    pub max_results_to_show: usize,
    /// Issue an unfiltered lookup when the input gains focus.
    pub load_on_focus: bool,
    /// Highlight the matched query inside each suggestion label.
    pub highlight_matched_text: bool,
    /// Navigation behavior at the list boundaries.
    pub boundary: BoundaryPolicy,
    /// Opaque grouping value passed through to the lookup.
    pub category: Option<Value>,
}

impl Default for AutocompleteOptions {
    fn default() -> Self {
        Self {
            debounce_delay_ms: 100,
            min_length: 3,
            max_results_to_show: 10,
            load_on_focus: false,
            highlight_matched_text: true,
            boundary: BoundaryPolicy::Clamp,
            category: None,
        }
    }
}

impl AutocompleteOptions {
    /// Apply the load-on-focus coupling: an unfiltered focus lookup makes a
    /// minimum query length meaningless, and the result cap impractical.
    pub fn normalized(mut self) -> Self {
        if self.load_on_focus {
            self.min_length = 0;
            self.max_results_to_show = usize::MAX;
        }
        self
    }
}
