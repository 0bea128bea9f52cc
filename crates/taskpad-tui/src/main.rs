use std::io;
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{bail, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use taskpad_api::{BlockingClient, SessionStore};
use taskpad_tui::app::App;
use tracing_subscriber::EnvFilter;

/// Terminal client for the task-manager API.
#[derive(Parser)]
#[command(name = "taskpad")]
struct Cli {
    /// Base URL of the API server
    #[arg(long, env = "TASKPAD_SERVER", default_value = "http://127.0.0.1:4000")]
    server: String,

    /// Where the session is persisted between runs
    #[arg(long, env = "TASKPAD_SESSION_FILE")]
    session_file: Option<PathBuf>,
}

fn default_session_file() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".taskpad")
        .join("session")
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr so they don't fight the TUI; silent unless
    // RUST_LOG is set.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let api = BlockingClient::new(&cli.server);
    wait_for_server(&api, &cli.server)?;

    let session = SessionStore::new(cli.session_file.unwrap_or_else(default_session_file));
    run_tui(App::new(api, session))
}

fn wait_for_server(api: &BlockingClient, url: &str) -> Result<()> {
    let start = Instant::now();
    let timeout = Duration::from_secs(5);

    loop {
        if api.health_check().is_ok() {
            return Ok(());
        }
        if start.elapsed() > timeout {
            bail!("no server reachable at {url} after {}s", timeout.as_secs());
        }
        thread::sleep(Duration::from_millis(50));
    }
}

fn run_tui(app: App) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = event_loop(&mut terminal, app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(ref e) = result {
        eprintln!("Error: {e}");
    }

    result
}

fn event_loop(terminal: &mut Terminal<CrosstermBackend<io::Stdout>>, mut app: App) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if let Event::Key(key) = event::read()? {
            // Ctrl+C always quits
            if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                break;
            }
            // q quits unless we're in an input mode
            if key.code == KeyCode::Char('q') && !app.is_input_mode() {
                break;
            }
            app.handle_key(key);
        }
    }

    Ok(())
}
