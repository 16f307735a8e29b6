//! Autocomplete suggestion panel.
//!
//! A small state machine over three states: idle (nothing to show), pending
//! (debounce timer armed or a lookup in flight), and shown (non-empty,
//! navigable list). The debounce timer is plain data (`fire_at`) polled from
//! the tick loop; lookups are identified by a monotonically increasing
//! request id, and only the most recently issued request may mutate state.
//! Everything older is discarded at resolution time.

use std::time::{Duration, Instant};

use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, ListState},
    Frame,
};

use crate::config::{AutocompleteOptions, BoundaryPolicy};
use crate::lookup::{LookupParams, Tag};

/// A lookup the caller must dispatch, produced when the debounce fires.
#[derive(Debug, Clone, PartialEq)]
pub struct LookupRequest {
    /// Id to hand back with the response.
    pub id: u64,
    /// Parameters for the source.
    pub params: LookupParams,
}

/// The armed debounce timer.
#[derive(Debug, Clone)]
struct ArmedTimer {
    query: String,
    fire_at: Instant,
}

/// Autocomplete suggestion list component.
#[derive(Debug)]
pub struct Autocomplete {
    /// Resolved options, immutable for the widget's lifetime.
    options: AutocompleteOptions,
    /// Current suggestions, already de-duplicated against the collection.
    items: Vec<Tag>,
    /// Whether the panel is shown. Only ever true with non-empty items.
    visible: bool,
    /// Cursor into `items`. The selected item is derived from this, so the
    /// selection can never point outside the list.
    index: Option<usize>,
    /// The query the current/last lookup was issued for.
    query: Option<String>,
    /// Armed debounce timer, if any.
    timer: Option<ArmedTimer>,
    /// Id of the most recently issued lookup; anything else is stale.
    last_request: Option<u64>,
    /// Next id to assign.
    next_request_id: u64,
}

impl Autocomplete {
    /// Create an idle panel.
    pub fn new(options: AutocompleteOptions) -> Self {
        Self {
            options: options.normalized(),
            items: Vec::new(),
            visible: false,
            index: None,
            query: None,
            timer: None,
            last_request: None,
            next_request_id: 0,
        }
    }

    /// Whether the panel is visible.
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The current suggestions.
    pub fn items(&self) -> &[Tag] {
        &self.items
    }

    /// The cursor position, if any.
    pub fn index(&self) -> Option<usize> {
        self.index
    }

    /// The currently highlighted suggestion.
    pub fn selected(&self) -> Option<&Tag> {
        self.index.and_then(|i| self.items.get(i))
    }

    /// The query of the current cycle.
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Whether a debounce timer is armed or a lookup is in flight.
    pub fn is_pending(&self) -> bool {
        self.timer.is_some() || self.last_request.is_some()
    }

    /// Drop everything and go idle. Safe to call from any state; cancels the
    /// armed timer and orphans any in-flight lookup.
    pub fn reset(&mut self) {
        self.items.clear();
        self.visible = false;
        self.index = None;
        self.query = None;
        self.timer = None;
        self.last_request = None;
    }

    /// Make already-populated items visible with no selection.
    pub fn show(&mut self) {
        self.index = None;
        self.visible = true;
    }

    /// Record a query and (re-)arm the debounce timer.
    ///
    /// A query shorter than the configured minimum resets the panel instead,
    /// cancelling any armed timer. The suggestion diff happens at resolution
    /// time against the live collection, so external splices between now and
    /// then are honored.
    pub fn load(&mut self, query: &str, skip_min_length_check: bool, now: Instant) {
        if !skip_min_length_check && query.chars().count() < self.options.min_length {
            self.reset();
            return;
        }

        self.query = Some(query.to_string());
        self.timer = Some(ArmedTimer {
            query: query.to_string(),
            fire_at: now + Duration::from_millis(self.options.debounce_delay_ms),
        });
    }

    /// Advance the debounce timer.
    ///
    /// Returns the lookup to dispatch once the quiet period has elapsed. The
    /// returned request supersedes every earlier one.
    pub fn poll(&mut self, now: Instant) -> Option<LookupRequest> {
        match &self.timer {
            Some(timer) if timer.fire_at <= now => {}
            _ => return None,
        }

        let timer = self.timer.take()?;
        let id = self.next_request_id;
        self.next_request_id += 1;
        self.last_request = Some(id);
        tracing::debug!(id, query = %timer.query, "issuing suggestion lookup");

        Some(LookupRequest {
            id,
            params: LookupParams {
                keywords: timer.query,
                category: self.options.category.clone(),
            },
        })
    }

    /// Feed a lookup resolution back in.
    ///
    /// Responses whose id is not the most recently issued one are discarded
    /// unconditionally (strictly last-wins). Suggestions whose label is
    /// already in `current_tags` are dropped, order preserved, and the list
    /// is capped at `max_results_to_show`. A failed lookup goes back to idle.
    pub fn apply_response(
        &mut self,
        id: u64,
        result: Result<Vec<Tag>, String>,
        current_tags: &[Tag],
    ) {
        if self.last_request != Some(id) {
            tracing::trace!(id, "discarding stale lookup result");
            return;
        }
        self.last_request = None;

        let items = match result {
            Ok(items) => items,
            Err(error) => {
                tracing::warn!(id, %error, "suggestion lookup failed");
                self.reset();
                return;
            }
        };

        let mut filtered: Vec<Tag> = items
            .into_iter()
            .filter(|item| !current_tags.iter().any(|t| t.label == item.label))
            .collect();
        filtered.truncate(self.options.max_results_to_show);

        if filtered.is_empty() {
            self.reset();
        } else {
            self.items = filtered;
            self.show();
        }
    }

    /// Move the cursor down, honoring the boundary policy.
    pub fn select_next(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.index = Some(match self.index {
            None => 0,
            Some(i) if i + 1 < self.items.len() => i + 1,
            Some(i) => match self.options.boundary {
                BoundaryPolicy::Clamp => i,
                BoundaryPolicy::Wrap => 0,
            },
        });
    }

    /// Move the cursor up, honoring the boundary policy.
    pub fn select_prior(&mut self) {
        if self.items.is_empty() {
            return;
        }
        self.index = match self.index {
            None => None,
            Some(0) => match self.options.boundary {
                BoundaryPolicy::Clamp => Some(0),
                BoundaryPolicy::Wrap => Some(self.items.len() - 1),
            },
            Some(i) => Some(i - 1),
        };
    }

    /// Set the cursor directly. Out-of-range indexes clamp (or wrap, under
    /// the wrap policy).
    pub fn select(&mut self, index: usize) {
        if self.items.is_empty() {
            self.index = None;
            return;
        }
        let len = self.items.len();
        self.index = Some(match self.options.boundary {
            BoundaryPolicy::Clamp => index.min(len - 1),
            BoundaryPolicy::Wrap => index % len,
        });
    }

    /// Render the suggestion panel over the given area.
    pub fn render(&self, frame: &mut Frame, area: Rect) {
        if !self.visible {
            return;
        }

        frame.render_widget(Clear, area);

        let block = Block::default()
            .title(" Suggestions ")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(area);
        frame.render_widget(block, area);

        let query = self.query.as_deref().unwrap_or("");
        let items: Vec<ListItem> = self
            .items
            .iter()
            .map(|tag| {
                let line = if self.options.highlight_matched_text {
                    highlight_match(&tag.label, query)
                } else {
                    Line::from(tag.label.clone())
                };
                ListItem::new(line)
            })
            .collect();

        let list = List::new(items)
            .highlight_style(
                Style::default()
                    .bg(Color::DarkGray)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("> ");

        let mut state = ListState::default();
        state.select(self.index);
        frame.render_stateful_widget(list, inner, &mut state);
    }
}

/// Highlight every case-insensitive occurrence of `query` inside `text`.
fn highlight_match(text: &str, query: &str) -> Line<'static> {
    if query.is_empty() {
        return Line::from(text.to_string());
    }

    let text_lower = text.to_lowercase();
    let query_lower = query.to_lowercase();

    let mut spans = Vec::new();
    let mut last_end = 0;

    for (start, _) in text_lower.match_indices(&query_lower) {
        if start < last_end || !text.is_char_boundary(start) {
            continue;
        }
        let end = start + query_lower.len();
        if end > text.len() || !text.is_char_boundary(end) {
            continue;
        }
        if start > last_end {
            spans.push(Span::raw(text[last_end..start].to_string()));
        }
        spans.push(Span::styled(
            text[start..end].to_string(),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ));
        last_end = end;
    }

    if last_end < text.len() {
        spans.push(Span::raw(text[last_end..].to_string()));
    }

    if spans.is_empty() {
        Line::from(text.to_string())
    } else {
        Line::from(spans)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn panel() -> Autocomplete {
        Autocomplete::new(AutocompleteOptions::default())
    }

    fn panel_with(options: AutocompleteOptions) -> Autocomplete {
        Autocomplete::new(options)
    }

    fn tags(labels: &[&str]) -> Vec<Tag> {
        labels.iter().map(|l| Tag::new(*l)).collect()
    }

    fn t0() -> Instant {
        Instant::now()
    }

    const D: Duration = Duration::from_millis(100);

    /// Drive a full load-poll cycle and return the issued request.
    fn issue(p: &mut Autocomplete, query: &str, now: Instant) -> LookupRequest {
        p.load(query, false, now);
        p.poll(now + D).expect("debounce should fire")
    }

    #[test]
    fn test_starts_idle() {
        let p = panel();
        assert!(!p.is_visible());
        assert!(p.items().is_empty());
        assert_eq!(p.index(), None);
        assert_eq!(p.selected(), None);
        assert!(!p.is_pending());
    }

    #[test]
    fn test_short_query_resets_and_never_queries() {
        let now = t0();
        let mut p = panel();
        p.load("ab", false, now);
        assert!(!p.is_pending());
        assert_eq!(p.poll(now + D), None);
        assert_eq!(p.query(), None);
    }

    #[test]
    fn test_short_query_cancels_armed_timer() {
        let now = t0();
        let mut p = panel();
        p.load("abc", false, now);
        p.load("ab", false, now + Duration::from_millis(10));
        // the earlier timer must not fire
        assert_eq!(p.poll(now + D * 2), None);
    }

    #[test]
    fn test_debounce_coalesces_to_last_query() {
        let now = t0();
        let mut p = panel();
        p.load("aaa", false, now);
        p.load("aab", false, now + Duration::from_millis(1));
        p.load("aac", false, now + Duration::from_millis(2));

        // quiet period measured from the last call
        assert_eq!(p.poll(now + Duration::from_millis(50)), None);

        let request = p
            .poll(now + Duration::from_millis(2) + D)
            .expect("timer fired");
        assert_eq!(request.params.keywords, "aac");

        // exactly one lookup
        assert_eq!(p.poll(now + D * 3), None);
    }

    #[test]
    fn test_skip_min_length_allows_empty_query() {
        let now = t0();
        let mut p = panel();
        p.load("", true, now);
        let request = p.poll(now + D).expect("timer fired");
        assert_eq!(request.params.keywords, "");
    }

    #[test]
    fn test_category_passed_through() {
        let now = t0();
        let mut p = panel_with(AutocompleteOptions {
            category: Some(serde_json::json!("colors")),
            ..Default::default()
        });
        let request = issue(&mut p, "red", now);
        assert_eq!(request.params.category, Some(serde_json::json!("colors")));
    }

    #[test]
    fn test_successful_response_shows_items() {
        let now = t0();
        let mut p = panel();
        let request = issue(&mut p, "gre", now);

        p.apply_response(request.id, Ok(tags(&["green", "grey"])), &[]);
        assert!(p.is_visible());
        assert_eq!(p.items().len(), 2);
        assert_eq!(p.selected(), None);
        assert!(!p.is_pending());
    }

    #[test]
    fn test_response_filtered_against_current_tags() {
        let now = t0();
        let mut p = panel();
        let request = issue(&mut p, "e", now);

        let current = tags(&["green"]);
        p.apply_response(request.id, Ok(tags(&["green", "grey", "red"])), &current);
        let labels: Vec<_> = p.items().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["grey", "red"]);
    }

    #[test]
    fn test_empty_filtered_result_goes_idle() {
        let now = t0();
        let mut p = panel();
        let request = issue(&mut p, "gre", now);

        let current = tags(&["green"]);
        p.apply_response(request.id, Ok(tags(&["green"])), &current);
        assert!(!p.is_visible());
        assert!(p.items().is_empty());
    }

    #[test]
    fn test_out_of_order_resolutions_last_wins() {
        let now = t0();
        let mut p = panel();

        let r1 = issue(&mut p, "one", now);
        let r2 = issue(&mut p, "two", now + D * 2);
        let r3 = issue(&mut p, "three", now + D * 4);
        assert!(r1.id < r2.id && r2.id < r3.id);

        // 3rd resolves first and wins
        p.apply_response(r3.id, Ok(tags(&["third"])), &[]);
        assert_eq!(p.items()[0].label, "third");

        // earlier resolutions arrive late and are discarded
        p.apply_response(r1.id, Ok(tags(&["first"])), &[]);
        p.apply_response(r2.id, Ok(tags(&["second"])), &[]);
        assert_eq!(p.items().len(), 1);
        assert_eq!(p.items()[0].label, "third");
        assert!(p.is_visible());
    }

    #[test]
    fn test_response_after_reset_is_discarded() {
        let now = t0();
        let mut p = panel();
        let request = issue(&mut p, "one", now);

        p.reset();
        p.apply_response(request.id, Ok(tags(&["late"])), &[]);
        assert!(!p.is_visible());
        assert!(p.items().is_empty());
    }

    #[test]
    fn test_failed_lookup_goes_idle() {
        let now = t0();
        let mut p = panel();
        let request = issue(&mut p, "one", now);

        p.apply_response(request.id, Err("boom".to_string()), &[]);
        assert!(!p.is_visible());
        assert!(!p.is_pending());
    }

    #[test]
    fn test_stale_failure_is_discarded() {
        let now = t0();
        let mut p = panel();
        let r1 = issue(&mut p, "one", now);
        let r2 = issue(&mut p, "two", now + D * 2);

        p.apply_response(r2.id, Ok(tags(&["kept"])), &[]);
        p.apply_response(r1.id, Err("boom".to_string()), &[]);
        assert!(p.is_visible());
        assert_eq!(p.items()[0].label, "kept");
    }

    #[test]
    fn test_max_results_truncation() {
        let now = t0();
        let mut p = panel_with(AutocompleteOptions {
            max_results_to_show: 2,
            ..Default::default()
        });
        let request = issue(&mut p, "aaa", now);
        p.apply_response(request.id, Ok(tags(&["a1", "a2", "a3", "a4"])), &[]);
        let labels: Vec<_> = p.items().iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["a1", "a2"]);
    }

    fn shown(labels: &[&str], boundary: BoundaryPolicy) -> Autocomplete {
        let now = t0();
        let mut p = panel_with(AutocompleteOptions {
            boundary,
            min_length: 1,
            ..Default::default()
        });
        let request = issue(&mut p, "x", now);
        p.apply_response(request.id, Ok(tags(labels)), &[]);
        p
    }

    #[test]
    fn test_navigation_clamp() {
        let mut p = shown(&["a", "b", "c"], BoundaryPolicy::Clamp);

        p.select_next();
        assert_eq!(p.index(), Some(0));
        assert_eq!(p.selected().unwrap().label, "a");

        p.select_next();
        p.select_next();
        assert_eq!(p.index(), Some(2));

        // clamped at the end
        p.select_next();
        assert_eq!(p.index(), Some(2));
        assert_eq!(p.selected().unwrap().label, "c");

        p.select_prior();
        p.select_prior();
        assert_eq!(p.index(), Some(0));

        // clamped at the start
        p.select_prior();
        assert_eq!(p.index(), Some(0));
        assert_eq!(p.selected().unwrap().label, "a");
    }

    #[test]
    fn test_navigation_wrap() {
        let mut p = shown(&["a", "b", "c"], BoundaryPolicy::Wrap);

        p.select_next();
        p.select_next();
        p.select_next();
        assert_eq!(p.index(), Some(2));

        p.select_next();
        assert_eq!(p.index(), Some(0));
        assert_eq!(p.selected().unwrap().label, "a");

        p.select_prior();
        assert_eq!(p.index(), Some(2));
        assert_eq!(p.selected().unwrap().label, "c");
    }

    #[test]
    fn test_select_prior_with_no_selection_is_noop() {
        let mut p = shown(&["a", "b"], BoundaryPolicy::Clamp);
        p.select_prior();
        assert_eq!(p.index(), None);
        assert_eq!(p.selected(), None);
    }

    #[test]
    fn test_select_direct() {
        let mut p = shown(&["a", "b", "c"], BoundaryPolicy::Clamp);
        p.select(1);
        assert_eq!(p.selected().unwrap().label, "b");
        // out of range clamps
        p.select(9);
        assert_eq!(p.selected().unwrap().label, "c");
    }

    #[test]
    fn test_select_direct_wraps_under_wrap_policy() {
        let mut p = shown(&["a", "b", "c"], BoundaryPolicy::Wrap);
        p.select(4);
        assert_eq!(p.selected().unwrap().label, "b");
    }

    #[test]
    fn test_show_clears_selection_but_keeps_items() {
        let mut p = shown(&["a", "b"], BoundaryPolicy::Clamp);
        p.select_next();
        assert!(p.selected().is_some());

        p.show();
        assert!(p.is_visible());
        assert_eq!(p.items().len(), 2);
        assert_eq!(p.selected(), None);
    }

    #[test]
    fn test_reset_is_idempotent() {
        let mut p = shown(&["a"], BoundaryPolicy::Clamp);
        p.reset();
        p.reset();
        assert!(!p.is_visible());
        assert!(p.items().is_empty());
        assert_eq!(p.query(), None);
        assert!(!p.is_pending());
    }

    #[test]
    fn test_highlight_match_spans() {
        let line = highlight_match("dark-green", "green");
        let rendered: String = line.spans.iter().map(|s| s.content.clone()).collect();
        assert_eq!(rendered, "dark-green");
        assert_eq!(line.spans.len(), 2);

        let plain = highlight_match("red", "");
        assert_eq!(plain.spans.len(), 1);
    }
}
