//! tagbox - a terminal tag-entry widget with async autocomplete.
//!
//! Type to stage a tag, commit it with Enter or comma, and pick from the
//! debounced suggestion panel. An optional namespace connects a mirroring
//! tag list pane over an in-process bus.

mod app;
mod bus;
mod config;
mod error;
mod events;
mod logging;
mod lookup;
mod tasks;
mod ui;

use std::io::{self, Stdout};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::Parser;
use crossterm::{
    event::{DisableFocusChange, EnableFocusChange},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};

use app::App;
use config::Config;
use events::EventHandler;
use lookup::{StaticSource, Tag};

/// Artificial reply latency for the built-in demo source.
const DEMO_LATENCY_MS: u64 = 120;

#[derive(Parser, Debug)]
#[command(name = "tagbox", version, about = "Terminal tag-entry widget with autocomplete")]
struct Args {
    /// Path to a config file (defaults to the platform config directory)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Namespace for the mirroring tag list pane
    #[arg(short, long)]
    namespace: Option<String>,

    /// Debounce delay for suggestion lookups, in milliseconds
    #[arg(long)]
    debounce_ms: Option<u64>,

    /// Minimum tag length
    #[arg(long)]
    min_length: Option<usize>,

    /// Keep a single replaceable value instead of a list
    #[arg(long)]
    single_value: bool,

    /// Show all suggestions as soon as the input gains focus
    #[arg(long)]
    load_on_focus: bool,

    /// Wrap suggestion navigation at the list edges instead of clamping
    #[arg(long)]
    wrap: bool,
}

impl Args {
    /// Layer the CLI flags over the file config.
    fn apply(&self, mut config: Config) -> Config {
        if let Some(namespace) = &self.namespace {
            config.tags.messaging_namespace = Some(namespace.clone());
        }
        if let Some(debounce_ms) = self.debounce_ms {
            config.autocomplete.debounce_delay_ms = debounce_ms;
        }
        if let Some(min_length) = self.min_length {
            config.tags.min_length = min_length;
            config.autocomplete.min_length = min_length;
        }
        if self.single_value {
            config.tags.single_value = true;
        }
        if self.load_on_focus {
            config.autocomplete.load_on_focus = true;
        }
        if self.wrap {
            config.autocomplete.boundary = config::BoundaryPolicy::Wrap;
        }
        config
    }
}

/// Tags served by the demo source.
fn demo_tags() -> Vec<Tag> {
    [
        "red", "green", "dark-green", "blue", "light-blue", "yellow", "orange", "purple",
        "rust", "python", "javascript", "typescript", "golang", "haskell", "erlang",
        "backend", "frontend", "devops", "database", "testing",
    ]
    .into_iter()
    .map(Tag::new)
    .collect()
}

fn setup_terminal() -> error::Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableFocusChange)?;
    let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> error::Result<()> {
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableFocusChange
    )?;
    terminal.show_cursor()?;
    Ok(())
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
) -> error::Result<()> {
    let handler = EventHandler::new();
    while !app.should_quit() {
        terminal.draw(|frame| app.view(frame))?;
        let event = handler.next()?;
        app.update(event, Instant::now());
    }
    Ok(())
}

fn run() -> error::Result<()> {
    let args = Args::parse();
    let file_config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let config = args.apply(file_config);

    let source = Arc::new(
        StaticSource::new(demo_tags()).with_latency(Duration::from_millis(DEMO_LATENCY_MS)),
    );

    let mut app = App::new(config, source)?;
    let mut terminal = setup_terminal()?;
    let result = run_loop(&mut terminal, &mut app);
    restore_terminal(&mut terminal)?;
    result
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init()?;

    let outcome = run();
    if let Err(error) = &outcome {
        tracing::error!(%error, "fatal error");
    }
    logging::shutdown();

    outcome.map_err(|error| anyhow::anyhow!("{}", error.user_message()))
}
