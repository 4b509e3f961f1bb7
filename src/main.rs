use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::info;

mod app;
mod backend;
mod chat;
mod chat_log;
mod config;
mod handler;
mod logging;
mod message;
mod notify;
mod tui;
mod ui;
mod upload;

#[cfg(test)]
mod mock_backend;

use app::App;
use config::{Config, Settings};
use tui::{EventHandler, Tui, TICK_RATE};

#[derive(Parser)]
#[command(name = "xplaindfile", version)]
#[command(about = "Chat with a PDF through the XplainDfile backend")]
struct Cli {
    /// Backend base URL
    #[arg(short, long, env = "XPLAIN_BACKEND_URL")]
    backend: Option<String>,

    /// Upload this PDF right after startup
    #[arg(short, long)]
    file: Option<PathBuf>,

    /// Log file (defaults to the user data directory)
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Remember the backend URL in the config file
    #[arg(long)]
    save_config: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_path = logging::init(cli.log_file.clone())?;

    let mut config = Config::load().unwrap_or_else(|err| {
        tracing::warn!(error = %err, "could not load config; using defaults");
        Config::new()
    });
    let settings = Settings::resolve(&config, cli.backend.as_deref());
    info!(backend = %settings.backend_url, log = %log_path.display(), "starting");

    if cli.save_config {
        config.backend_url = Some(settings.backend_url.clone());
        let path = config.save()?;
        info!(path = %path.display(), "saved config");
    }

    let mut app = App::new(&settings);
    app.check_backend();
    if let Some(path) = cli.file {
        app.select_file(path);
    }

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new(TICK_RATE);

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    info!("exiting");
    result
}

async fn run(terminal: &mut Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        let Some(event) = events.next().await else {
            break;
        };
        handler::handle_event(app, event);
        app.poll_tasks().await;
    }
    Ok(())
}
