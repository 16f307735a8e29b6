//! Application state and the update/view cycle.
//!
//! `App` wires the tag input, the autocomplete panel, the key router, the
//! optional sibling tag list, and the lookup channel together. Terminal
//! events and clock readings come in through [`App::update`]; rendering goes
//! out through [`App::view`]. Time is always passed in, never read here, so
//! the debounce and blur windows are testable without sleeping.

use std::sync::Arc;
use std::time::{Duration, Instant};

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::bus::{self, BusEndpoint, BusMessage};
use crate::config::Config;
use crate::error::Result;
use crate::events::{Event, KeyRouter, RouteContext, RoutedAction, TagEvent};
use crate::lookup::{SuggestionSource, Tag};
use crate::tasks::{create_lookup_channel, LookupMessage, LookupSpawner};
use crate::ui::components::{Autocomplete, TagInput, TagListAction, TagListView};

/// How long focus may wander before it counts as having left the widget.
/// Clicking into the suggestion panel or a quick pane round-trip stays
/// inside this window.
const BLUR_GRACE: Duration = Duration::from_millis(150);

/// Which pane owns keyboard input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    /// The tag input and its suggestion panel.
    Input,
    /// The mirroring tag list.
    TagList,
}

/// The main application struct that holds all state.
pub struct App {
    tag_input: TagInput,
    autocomplete: Autocomplete,
    router: KeyRouter,
    tag_list: Option<TagListView>,
    /// Bus end owned by the tag input (the collection owner).
    widget_bus: Option<BusEndpoint>,
    /// Bus end owned by the mirroring list.
    list_bus: Option<BusEndpoint>,
    lookup_rx: UnboundedReceiver<LookupMessage>,
    spawner: LookupSpawner,
    load_on_focus: bool,
    add_on_enter: bool,
    add_on_blur: bool,
    focus: Focus,
    blur_deadline: Option<Instant>,
    should_quit: bool,
}

impl App {
    /// Build the app from a resolved config and a suggestion source.
    pub fn new(config: Config, source: Arc<dyn SuggestionSource>) -> Result<Self> {
        Self::with_tags(config, source, Vec::new())
    }

    /// Build the app over a pre-populated collection.
    pub fn with_tags(
        config: Config,
        source: Arc<dyn SuggestionSource>,
        tags: Vec<Tag>,
    ) -> Result<Self> {
        let router = KeyRouter::new(&config.tags);
        let load_on_focus = config.autocomplete.load_on_focus;
        let add_on_enter = config.tags.add_on_enter;
        let add_on_blur = config.tags.add_on_blur;

        let namespace = config
            .tags
            .messaging_namespace
            .clone()
            .filter(|ns| !ns.is_empty());
        let (tag_list, widget_bus, list_bus) = match namespace {
            Some(ns) => {
                let (widget_end, list_end) = bus::pair(ns);
                // late-mount handshake: the list asks for the current state
                list_end.send(BusMessage::GetTags);
                (Some(TagListView::new(true)), Some(widget_end), Some(list_end))
            }
            None => (None, None, None),
        };

        let tag_input = TagInput::with_tags(config.tags, tags)?;
        let autocomplete = Autocomplete::new(config.autocomplete);
        let (lookup_rx, spawner) = create_lookup_channel(source);

        Ok(Self {
            tag_input,
            autocomplete,
            router,
            tag_list,
            widget_bus,
            list_bus,
            lookup_rx,
            spawner,
            load_on_focus,
            add_on_enter,
            add_on_blur,
            focus: Focus::Input,
            blur_deadline: None,
            should_quit: false,
        })
    }

    /// Whether the main loop should exit.
    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// The focused pane.
    pub fn focus(&self) -> Focus {
        self.focus
    }

    /// The tag input widget.
    pub fn tag_input(&self) -> &TagInput {
        &self.tag_input
    }

    /// The autocomplete panel.
    pub fn autocomplete(&self) -> &Autocomplete {
        &self.autocomplete
    }

    /// The mirroring list, when a namespace is configured.
    pub fn tag_list(&self) -> Option<&TagListView> {
        self.tag_list.as_ref()
    }

    /// Handle an event at the given clock reading.
    pub fn update(&mut self, event: Event, now: Instant) {
        match event {
            Event::Key(key) => self.on_key(key, now),
            Event::FocusGained => {
                if self.focus == Focus::Input {
                    self.on_input_focus(now);
                }
            }
            Event::FocusLost => self.begin_blur(now),
            Event::Resize(..) | Event::Tick => {}
        }
        self.sync(now);
    }

    fn on_key(&mut self, key: KeyEvent, now: Instant) {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            self.should_quit = true;
            return;
        }

        match self.focus {
            Focus::Input => self.on_input_key(key, now),
            Focus::TagList => self.on_list_key(key, now),
        }
    }

    fn on_input_key(&mut self, key: KeyEvent, now: Instant) {
        let ctx = RouteContext {
            panel_visible: self.autocomplete.is_visible(),
            input_empty: self.tag_input.staged_is_empty(),
        };

        let claimed = match self.router.route(key, ctx) {
            Some(RoutedAction::AddStaged) => self.tag_input.try_add_staged(),
            Some(RoutedAction::RemoveLast) => self.tag_input.try_remove_last(),
            Some(RoutedAction::SelectNext) => {
                self.autocomplete.select_next();
                true
            }
            Some(RoutedAction::SelectPrior) => {
                self.autocomplete.select_prior();
                true
            }
            Some(RoutedAction::DismissPanel) => {
                self.autocomplete.reset();
                true
            }
            Some(RoutedAction::CommitSuggestion) => {
                if self.commit_suggestion() {
                    true
                } else if key.code == KeyCode::Enter && self.add_on_enter {
                    // with nothing selected, Enter acts as if the panel were
                    // closed and commits the staged text
                    self.tag_input.try_add_staged()
                } else {
                    false
                }
            }
            None => false,
        };

        if claimed {
            return;
        }

        // unclaimed Tab moves focus out of the widget, everything else is
        // text editing
        if key.code == KeyCode::Tab && self.tag_list.is_some() {
            self.focus = Focus::TagList;
            self.begin_blur(now);
            return;
        }
        self.tag_input.handle_edit_key(key);
    }

    fn on_list_key(&mut self, key: KeyEvent, now: Instant) {
        match (key.code, key.modifiers) {
            (KeyCode::Tab, KeyModifiers::NONE) | (KeyCode::Esc, KeyModifiers::NONE) => {
                self.focus = Focus::Input;
                self.on_input_focus(now);
            }
            (KeyCode::Char('q'), KeyModifiers::NONE) => {
                self.should_quit = true;
            }
            _ => {
                let action = self
                    .tag_list
                    .as_mut()
                    .and_then(|list| list.handle_input(key));
                if let Some(TagListAction::RequestRemove(index)) = action {
                    if let Some(list_bus) = &self.list_bus {
                        list_bus.send(BusMessage::RemoveTag { index });
                    }
                }
            }
        }
    }

    /// Commit the highlighted suggestion. Claims the key only when a
    /// selection existed.
    fn commit_suggestion(&mut self) -> bool {
        let Some(selected) = self.autocomplete.selected().cloned() else {
            return false;
        };
        self.tag_input.try_add_tag(selected);
        self.autocomplete.reset();
        self.focus = Focus::Input;
        true
    }

    fn on_input_focus(&mut self, now: Instant) {
        self.blur_deadline = None;
        self.tag_input.notify_focus();
        if self.load_on_focus {
            self.autocomplete.load("", true, now);
        }
    }

    fn begin_blur(&mut self, now: Instant) {
        self.blur_deadline = Some(now + BLUR_GRACE);
    }

    /// Run the per-frame bookkeeping: relay widget notifications, fire the
    /// debounce, collect lookup results, service the bus, and close out an
    /// expired blur window.
    fn sync(&mut self, now: Instant) {
        self.relay_tag_events(now);

        if let Some(request) = self.autocomplete.poll(now) {
            self.spawner.spawn_lookup(request.id, request.params);
        }

        while let Ok(message) = self.lookup_rx.try_recv() {
            let LookupMessage::Completed { request_id, result } = message;
            self.autocomplete
                .apply_response(request_id, result, self.tag_input.tags());
        }

        self.service_bus();

        // an uncancelled deadline means focus genuinely left the widget
        if self.blur_deadline.is_some_and(|deadline| now >= deadline) {
            self.blur_deadline = None;
            if self.add_on_blur {
                self.tag_input.try_add_staged();
            }
            self.tag_input.notify_blur();
            // the add above may have queued notifications of its own
            self.relay_tag_events(now);
            self.autocomplete.reset();
            self.service_bus();
        }
    }

    /// Drain the widget's notifications: input changes drive the suggestion
    /// cycle, mutations publish snapshots onto the bus.
    fn relay_tag_events(&mut self, now: Instant) {
        for event in self.tag_input.drain_events() {
            match event {
                TagEvent::InputChange(value) => {
                    if value.is_empty() {
                        self.autocomplete.reset();
                    } else {
                        self.autocomplete.load(&value, false, now);
                    }
                }
                TagEvent::TagAdded { tags, .. } | TagEvent::TagRemoved { tags, .. } => {
                    if let Some(widget_bus) = &self.widget_bus {
                        widget_bus.publish_tags(&tags);
                    }
                }
                TagEvent::InputFocus | TagEvent::InputBlur => {}
            }
        }
    }

    fn service_bus(&mut self) {
        if let Some(widget_bus) = &mut self.widget_bus {
            while let Some(message) = widget_bus.try_recv() {
                match message {
                    BusMessage::RemoveTag { index } => {
                        self.tag_input.remove(index);
                    }
                    BusMessage::GetTags => {
                        widget_bus.publish_tags(self.tag_input.tags());
                    }
                    BusMessage::TagsChanged { .. } => {}
                }
            }
            // removals requested over the bus publish their snapshots too
            for event in self.tag_input.drain_events() {
                if let TagEvent::TagRemoved { tags, .. } = event {
                    widget_bus.publish_tags(&tags);
                }
            }
        }

        if let (Some(list_bus), Some(tag_list)) = (&mut self.list_bus, &mut self.tag_list) {
            while let Some(message) = list_bus.try_recv() {
                if let BusMessage::TagsChanged { tags } = message {
                    tag_list.apply_snapshot(tags);
                }
            }
        }
    }

    /// Render the whole UI.
    pub fn view(&self, frame: &mut Frame) {
        let area = frame.area();
        let rows = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(4), Constraint::Length(1)])
            .split(area);

        let panes: Vec<Rect> = if self.tag_list.is_some() {
            Layout::default()
                .direction(Direction::Horizontal)
                .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
                .split(rows[0])
                .to_vec()
        } else {
            vec![rows[0]]
        };

        let input_area = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(5), Constraint::Min(0)])
            .split(panes[0]);

        self.tag_input
            .render(frame, input_area[0], self.focus == Focus::Input);

        if self.autocomplete.is_visible() {
            let panel = Rect {
                height: panel_height(self.autocomplete.items().len(), input_area[1].height),
                ..input_area[1]
            };
            self.autocomplete.render(frame, panel);
        }

        if let (Some(tag_list), Some(&list_area)) = (&self.tag_list, panes.get(1)) {
            tag_list.render(frame, list_area, self.focus == Focus::TagList);
        }

        self.render_help(frame, rows[1]);
    }

    fn render_help(&self, frame: &mut Frame, area: Rect) {
        let help = if self.autocomplete.is_visible() {
            Line::from(vec![
                Span::styled("\u{2191}/\u{2193}", Style::default().fg(Color::Yellow)),
                Span::raw(": navigate  "),
                Span::styled("Enter/Tab", Style::default().fg(Color::Green)),
                Span::raw(": pick  "),
                Span::styled("Esc", Style::default().fg(Color::Red)),
                Span::raw(": dismiss"),
            ])
        } else {
            Line::from(vec![
                Span::styled("Enter/,", Style::default().fg(Color::Green)),
                Span::raw(": add tag  "),
                Span::styled("Backspace", Style::default().fg(Color::Yellow)),
                Span::raw(": remove last  "),
                Span::styled("Ctrl-C", Style::default().fg(Color::Red)),
                Span::raw(": quit"),
            ])
        };
        frame.render_widget(Paragraph::new(help), area);
    }
}

/// Overlay height for the suggestion panel: the items plus the border, capped
/// to the available space. The item count is unbounded under load-on-focus,
/// so it must be clamped before the cast.
fn panel_height(items: usize, available: u16) -> u16 {
    items.saturating_add(2).min(usize::from(available)) as u16
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TagInputOptions;
    use crate::lookup::StaticSource;

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn source(labels: &[&str]) -> Arc<StaticSource> {
        Arc::new(StaticSource::new(
            labels.iter().map(|l| Tag::new(*l)).collect(),
        ))
    }

    fn type_text(app: &mut App, text: &str, now: Instant) {
        for c in text.chars() {
            app.update(key(KeyCode::Char(c)), now);
        }
    }

    fn labels(app: &App) -> Vec<String> {
        app.tag_input().tags().iter().map(|t| t.label.clone()).collect()
    }

    #[tokio::test]
    async fn test_type_and_enter_adds_tag() {
        let mut app = App::with_tags(
            Config::default(),
            source(&[]),
            vec![Tag::new("red"), Tag::new("green")],
        )
        .unwrap();
        let now = Instant::now();

        type_text(&mut app, "blue", now);
        app.update(key(KeyCode::Enter), now);

        assert_eq!(labels(&app), vec!["red", "green", "blue"]);
        assert!(app.tag_input().staged_is_empty());
    }

    #[tokio::test]
    async fn test_comma_commits_and_is_not_typed() {
        let mut app = App::new(Config::default(), source(&[])).unwrap();
        let now = Instant::now();

        type_text(&mut app, "one", now);
        app.update(key(KeyCode::Char(',')), now);

        assert_eq!(labels(&app), vec!["one"]);
        assert!(app.tag_input().staged_is_empty());
    }

    #[tokio::test]
    async fn test_invalid_comma_falls_through_to_editing() {
        let mut app = App::new(Config::default(), source(&[])).unwrap();
        let now = Instant::now();

        // too short to commit, so the comma is typed instead
        type_text(&mut app, "ab", now);
        app.update(key(KeyCode::Char(',')), now);

        assert!(labels(&app).is_empty());
        assert_eq!(app.tag_input().staged(), "ab,");
    }

    #[tokio::test]
    async fn test_backspace_two_step_removal_via_keys() {
        let mut app = App::with_tags(
            Config::default(),
            source(&[]),
            vec![Tag::new("a"), Tag::new("b")],
        )
        .unwrap();
        let now = Instant::now();

        app.update(key(KeyCode::Backspace), now);
        assert_eq!(labels(&app), vec!["a", "b"]);
        assert!(app.tag_input().pending_removal());

        app.update(key(KeyCode::Backspace), now);
        assert_eq!(labels(&app), vec!["a"]);
    }

    #[tokio::test]
    async fn test_suggestion_end_to_end() {
        let mut app = App::new(Config::default(), source(&["green", "grey", "red"])).unwrap();
        let now = Instant::now();

        type_text(&mut app, "gre", now);
        assert!(!app.autocomplete().is_visible());

        // quiet period elapses, the lookup is spawned
        app.update(Event::Tick, now + Duration::from_millis(150));
        tokio::task::yield_now().await;
        tokio::time::sleep(Duration::from_millis(10)).await;

        // next tick collects the result
        app.update(Event::Tick, now + Duration::from_millis(200));
        assert!(app.autocomplete().is_visible());
        let shown: Vec<_> = app
            .autocomplete()
            .items()
            .iter()
            .map(|t| t.label.as_str())
            .collect();
        assert_eq!(shown, vec!["green", "grey"]);

        // pick the second suggestion
        app.update(key(KeyCode::Down), now + Duration::from_millis(210));
        app.update(key(KeyCode::Down), now + Duration::from_millis(220));
        app.update(key(KeyCode::Enter), now + Duration::from_millis(230));

        assert_eq!(labels(&app), vec!["grey"]);
        assert!(!app.autocomplete().is_visible());
        assert!(app.tag_input().staged_is_empty());
    }

    #[tokio::test]
    async fn test_enter_with_panel_open_but_no_selection_adds_staged() {
        let mut app = App::new(Config::default(), source(&["green"])).unwrap();
        let now = Instant::now();

        type_text(&mut app, "gre", now);
        app.update(Event::Tick, now + Duration::from_millis(150));
        tokio::time::sleep(Duration::from_millis(10)).await;
        app.update(Event::Tick, now + Duration::from_millis(200));
        assert!(app.autocomplete().is_visible());

        // nothing highlighted: Enter commits the staged text itself
        app.update(key(KeyCode::Enter), now + Duration::from_millis(210));
        assert_eq!(labels(&app), vec!["gre"]);
        assert!(app.tag_input().staged_is_empty());
        assert!(!app.autocomplete().is_visible());
    }

    #[tokio::test]
    async fn test_tab_with_panel_open_but_no_selection_does_not_add() {
        let mut app = App::new(Config::default(), source(&["green"])).unwrap();
        let now = Instant::now();

        type_text(&mut app, "gre", now);
        app.update(Event::Tick, now + Duration::from_millis(150));
        tokio::time::sleep(Duration::from_millis(10)).await;
        app.update(Event::Tick, now + Duration::from_millis(200));
        assert!(app.autocomplete().is_visible());

        // only Enter carries the staged-commit fallback
        app.update(key(KeyCode::Tab), now + Duration::from_millis(210));
        assert!(labels(&app).is_empty());
        assert_eq!(app.tag_input().staged(), "gre");
    }

    #[tokio::test]
    async fn test_clearing_input_dismisses_pending_cycle() {
        let mut app = App::new(Config::default(), source(&["green"])).unwrap();
        let now = Instant::now();

        type_text(&mut app, "gre", now);
        app.update(key(KeyCode::Backspace), now + Duration::from_millis(10));
        app.update(key(KeyCode::Backspace), now + Duration::from_millis(20));
        app.update(key(KeyCode::Backspace), now + Duration::from_millis(30));

        // input is empty again: the armed debounce must never fire
        app.update(Event::Tick, now + Duration::from_millis(500));
        tokio::time::sleep(Duration::from_millis(10)).await;
        app.update(Event::Tick, now + Duration::from_millis(600));
        assert!(!app.autocomplete().is_visible());
    }

    fn bus_config() -> Config {
        Config {
            tags: TagInputOptions {
                messaging_namespace: Some("demo".to_string()),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_bus_mirrors_snapshot_into_list() {
        let mut app =
            App::with_tags(bus_config(), source(&[]), vec![Tag::new("seed")]).unwrap();
        let now = Instant::now();

        // mount handshake answers the list's GetTags
        app.update(Event::Tick, now);
        assert_eq!(app.tag_list().unwrap().tags().len(), 1);

        type_text(&mut app, "blue", now);
        app.update(key(KeyCode::Enter), now);
        let mirrored: Vec<_> = app
            .tag_list()
            .unwrap()
            .tags()
            .iter()
            .map(|t| t.label.as_str())
            .collect();
        assert_eq!(mirrored, vec!["seed", "blue"]);
    }

    #[tokio::test]
    async fn test_list_remove_roundtrip() {
        let mut app = App::with_tags(
            bus_config(),
            source(&[]),
            vec![Tag::new("a"), Tag::new("b")],
        )
        .unwrap();
        let now = Instant::now();
        app.update(Event::Tick, now);

        // focus the list pane, move to the second entry, remove it
        app.update(key(KeyCode::Tab), now);
        assert_eq!(app.focus(), Focus::TagList);
        app.update(key(KeyCode::Char('j')), now);
        app.update(key(KeyCode::Char('x')), now);
        app.update(Event::Tick, now);

        assert_eq!(labels(&app), vec!["a"]);
        let mirrored: Vec<_> = app
            .tag_list()
            .unwrap()
            .tags()
            .iter()
            .map(|t| t.label.as_str())
            .collect();
        assert_eq!(mirrored, vec!["a"]);
    }

    #[tokio::test]
    async fn test_blur_adds_staged_and_resets_panel() {
        let mut app = App::new(bus_config(), source(&[])).unwrap();
        let now = Instant::now();

        type_text(&mut app, "blue", now);
        app.update(key(KeyCode::Tab), now);

        // still inside the grace window: nothing committed yet
        assert!(labels(&app).is_empty());

        app.update(Event::Tick, now + Duration::from_millis(200));
        assert_eq!(labels(&app), vec!["blue"]);
        assert!(!app.autocomplete().is_visible());
    }

    #[tokio::test]
    async fn test_focus_returning_cancels_blur() {
        let mut app = App::new(bus_config(), source(&[])).unwrap();
        let now = Instant::now();

        type_text(&mut app, "blue", now);
        app.update(key(KeyCode::Tab), now);
        // back before the window closes
        app.update(key(KeyCode::Tab), now + Duration::from_millis(50));

        app.update(Event::Tick, now + Duration::from_millis(400));
        assert!(labels(&app).is_empty());
        assert_eq!(app.tag_input().staged(), "blue");
    }

    #[test]
    fn test_panel_height_caps_at_available_space() {
        assert_eq!(panel_height(3, 20), 5);
        assert_eq!(panel_height(0, 20), 2);
        assert_eq!(panel_height(50, 20), 20);
        assert_eq!(panel_height(usize::MAX, 20), 20);
    }

    #[tokio::test]
    async fn test_ctrl_c_quits() {
        let mut app = App::new(Config::default(), source(&[])).unwrap();
        let now = Instant::now();
        app.update(
            Event::Key(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            now,
        );
        assert!(app.should_quit());
    }
}
