mod action;
mod app;
mod cache;
mod catalog;
mod config;
mod error;
mod event;
mod loader;
mod pager;
mod pokeapi;
mod tui;
mod types;
mod ui;

use std::fs::File;
use std::panic;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use clap::{Parser, Subcommand};
use tokio::sync::mpsc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::action::Action;
use crate::app::App;
use crate::cache::{CachedCatalog, RequestCache};
use crate::catalog::Catalog;
use crate::config::Config;
use crate::event::Event;
use crate::pokeapi::PokeApi;
use crate::tui::EventHandler;

#[derive(Parser, Debug)]
#[command(name = "pokedex", version, about = "Browse the PokeAPI catalog in your terminal")]
struct Cli {
    /// PokeAPI base URL (default: config or https://pokeapi.co/api/v2)
    #[arg(long)]
    api_base: Option<String>,

    /// Entries per page
    #[arg(long)]
    page_size: Option<u32>,

    /// Fetch detail records fresh on every visit
    #[arg(long)]
    no_cache: bool,

    /// Write logs here instead of the cache directory
    #[arg(long)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open the detail view for one entry
    Show { id: u32 },
}

fn init_logging(path: Option<PathBuf>) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let file = path.and_then(|p| {
        if let Some(parent) = p.parent() {
            std::fs::create_dir_all(parent).ok()?;
        }
        File::create(p).ok()
    });

    // The TUI owns the terminal, so stderr is only a last resort.
    match file {
        Some(file) => tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        None => tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init(),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = Config::load();
    if let Some(base) = cli.api_base {
        config.api.base_url = base;
    }
    if let Some(size) = cli.page_size.filter(|s| *s > 0) {
        config.api.page_size = size;
    }
    if cli.no_cache {
        config.cache.details = false;
    }

    init_logging(
        cli.log_file
            .or_else(|| config.log_file.clone())
            .or_else(crate::config::default_log_path),
    );

    // Set up panic hook to restore terminal
    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        let _ = tui::restore();
        original_hook(panic_info);
    }));

    let api: Arc<dyn Catalog> = Arc::new(PokeApi::new(
        config.api.base_url.clone(),
        config.api.timeout(),
    )?);
    let catalog: Arc<dyn Catalog> = if config.cache.details {
        Arc::new(CachedCatalog::new(api, Arc::new(RequestCache::new())))
    } else {
        api
    };
    tracing::info!(
        source = catalog.name(),
        base = %config.api.base_url,
        page_size = config.api.page_size,
        cached = config.cache.details,
        "starting"
    );

    let initial = match cli.command {
        Some(Command::Show { id }) => Some(Action::ShowEntry(id)),
        None => None,
    };

    let result = run(catalog, &config, initial).await;

    tui::restore()?;

    result
}

async fn run(
    catalog: Arc<dyn Catalog>,
    config: &Config,
    initial: Option<Action>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut terminal = tui::init()?;
    let size = crossterm::terminal::size()?;

    let (action_tx, mut action_rx) = mpsc::unbounded_channel::<Action>();

    let mut app = App::new(catalog, config, action_tx.clone(), size);

    if let Some(action) = initial {
        action_tx.send(action)?;
    }

    let tick_rate = Duration::from_millis(250);
    let render_rate = Duration::from_millis(16); // ~60fps
    let mut events = EventHandler::new(tick_rate, render_rate);

    loop {
        tokio::select! {
            Some(event) = events.next() => {
                if event.is_quit() {
                    break;
                }

                match event {
                    Event::Render => {
                        terminal.draw(|frame| ui::render(frame, &app))?;
                    }
                    _ => {
                        let action = app.handle_event(event);
                        if !matches!(action, Action::None) {
                            action_tx.send(action)?;
                        }
                    }
                }
            }
            Some(action) = action_rx.recv() => {
                app.update(action);
            }
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}
