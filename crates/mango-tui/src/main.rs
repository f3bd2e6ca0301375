//! Password Mango - terminal client for a credential server.
//!
//! Built with Ratatui and crossterm.

mod app;
mod config;
mod handlers;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use mango_core::{CredentialClient, Execution, HttpTransport, Session, Transport};
use ratatui::prelude::*;
use std::fs::OpenOptions;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use app::{App, AppState};
use config::{Config, SERVER_URL_ENV};

/// Password Mango - manage credentials stored on a Password Mango server
#[derive(Parser, Debug)]
#[command(name = "mango")]
#[command(about = "A terminal client for a Password Mango credential server")]
struct Args {
    /// Path to a config file (defaults to ~/.config/password-mango/mango.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Base URL of the credential server
    #[arg(short, long)]
    server: Option<String>,

    /// Request timeout in seconds (0 waits forever)
    #[arg(short, long)]
    timeout: Option<u64>,

    /// Write logs to this file (defaults to the cache directory)
    #[arg(long)]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    dotenvy::dotenv().ok();

    let mut config = Config::load(args.config)?;
    config.apply_overrides(std::env::var(SERVER_URL_ENV).ok(), args.server, args.timeout);
    if let Some(path) = args.log_file {
        config.log_file = Some(path);
    }

    init_logging(config.log_path().as_deref())?;

    let server_url = config.server_url()?;
    tracing::info!("Starting Password Mango against {}", server_url);
    let transport = HttpTransport::new(server_url.clone(), config.request_timeout())?;
    let session = Session::new(CredentialClient::new(transport), Execution::Threaded);
    let label = server_url.host_str().map_or_else(
        || server_url.to_string(),
        |host| match server_url.port() {
            Some(port) => format!("{host}:{port}"),
            None => host.to_string(),
        },
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session, label);

    // Main loop
    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        tracing::error!("Exited with error: {e}");
        eprintln!("Error: {e}");
    }

    Ok(())
}

/// Log to `log_file`. Without one, only warnings go to stderr.
fn init_logging(log_file: Option<&Path>) -> Result<()> {
    match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent).with_context(|| {
                    format!("Failed to create log directory: {}", parent.display())
                })?;
            }
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file: {}", path.display()))?;
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env().add_directive("mango=info".parse()?))
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(EnvFilter::from_default_env().add_directive("mango=warn".parse()?))
                .with_writer(std::io::stderr)
                .init();
        }
    }
    Ok(())
}

fn run_app<B: Backend, T: Transport + 'static>(
    terminal: &mut Terminal<B>,
    app: &mut App<T>,
) -> Result<()> {
    loop {
        app.tick();
        terminal.draw(|frame| ui::render(frame, app))?;

        // Poll for events with timeout so replies show up promptly
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && handlers::handle_key(app, key) {
                    break;
                }
            }
        }

        if matches!(app.state, AppState::Quit) {
            break;
        }
    }

    Ok(())
}
