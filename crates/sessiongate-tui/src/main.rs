//! sessiongate - a terminal client for a token-based login/signup service.
//!
//! Starts on the dashboard when a stored session is still accepted by the
//! server, otherwise on the login panel.

mod app;
mod cli;
mod ui;

use std::io;
use std::time::Duration;

use anyhow::{bail, Result};
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sessiongate_core::Config;

use app::{App, AppState};
use ui::input::handle_input;
use ui::render::render;

/// Timeout for polling terminal events (in milliseconds)
const EVENT_POLL_TIMEOUT_MS: u64 = 100;

const LOG_FILE: &str = "sessiongate.log";

const USAGE: &str = "\
Usage: sessiongate [OPTION]

Without an option, starts the terminal interface.

Options:
  --login     Log in from the command line
  --logout    Remove stored tokens
  --status    Check whether the stored session is still valid
  --help      Show this message

Environment:
  SESSIONGATE_BASE_URL   API base URL
  SESSIONGATE_BACKEND    remote | simulated
  SESSIONGATE_USERNAME   Username to prefill
  RUST_LOG               Log filter (default: warn)";

/// Command-line mode selected by the first argument
enum Mode {
    Tui,
    Login,
    Logout,
    Status,
    Help,
}

fn parse_mode(args: &[String]) -> Result<Mode> {
    let Some(arg) = args.get(1) else {
        return Ok(Mode::Tui);
    };
    Ok(match arg.as_str() {
        "--login" => Mode::Login,
        "--logout" => Mode::Logout,
        "--status" => Mode::Status,
        "--help" | "-h" => Mode::Help,
        other => bail!("Unknown option '{}'. Try --help.", other),
    })
}

fn env_filter() -> EnvFilter {
    // Use RUST_LOG to control the level (e.g., RUST_LOG=debug)
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
}

/// Log to a file while the TUI owns the terminal.
fn init_tracing(config: &Config) -> Result<WorkerGuard> {
    let log_dir = config.data_dir()?;
    std::fs::create_dir_all(&log_dir)?;

    let appender = tracing_appender::rolling::never(&log_dir, LOG_FILE);
    let (writer, guard) = tracing_appender::non_blocking(appender);

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(writer).with_ansi(false))
        .with(env_filter())
        .init();

    Ok(guard)
}

/// Log to stderr for the command-line modes.
fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(io::stderr))
        .with(env_filter())
        .init();
}

fn load_config() -> Config {
    let mut config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        Config::default()
    });
    config.apply_env();
    config
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let args: Vec<String> = std::env::args().collect();
    let mode = parse_mode(&args)?;

    match mode {
        Mode::Help => {
            println!("{}", USAGE);
            return Ok(());
        }
        Mode::Login => {
            init_cli_tracing();
            return cli::login(load_config()).await;
        }
        Mode::Logout => {
            init_cli_tracing();
            return cli::logout(&load_config());
        }
        Mode::Status => {
            init_cli_tracing();
            return cli::status(&load_config()).await;
        }
        Mode::Tui => {}
    }

    let config = load_config();
    let _guard = match init_tracing(&config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Warning: file logging disabled: {}", e);
            None
        }
    };
    info!(backend = ?config.backend, "sessiongate starting");

    let mut app = App::new(config)?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let result = run_app(&mut terminal, &mut app).await;

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = result {
        eprintln!("Error: {}", e);
    }

    info!("sessiongate shutting down");
    Ok(())
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
) -> Result<()> {
    // The first screen depends on the stored session; show progress meanwhile
    app.view.pending = true;
    terminal.draw(|f| render(f, app))?;
    app.start().await;
    app.view.pending = false;

    loop {
        terminal.draw(|f| render(f, app))?;

        if event::poll(Duration::from_millis(EVENT_POLL_TIMEOUT_MS))? {
            if let Event::Key(key) = event::read()? {
                // Ctrl+C to quit
                if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
                    return Ok(());
                }

                if handle_input(app, key)? {
                    return Ok(());
                }
            }
        }

        // Redraw first so the pending state is on screen during the request
        if app.pending_action().is_some() {
            terminal.draw(|f| render(f, app))?;
            app.run_pending().await;
        }

        app.tick();

        if matches!(app.state, AppState::Quitting) {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_mode() {
        assert!(matches!(parse_mode(&args(&["sessiongate"])).unwrap(), Mode::Tui));
        assert!(matches!(parse_mode(&args(&["sessiongate", "--login"])).unwrap(), Mode::Login));
        assert!(matches!(parse_mode(&args(&["sessiongate", "--logout"])).unwrap(), Mode::Logout));
        assert!(matches!(parse_mode(&args(&["sessiongate", "--status"])).unwrap(), Mode::Status));
        assert!(matches!(parse_mode(&args(&["sessiongate", "-h"])).unwrap(), Mode::Help));
        assert!(parse_mode(&args(&["sessiongate", "--bogus"])).is_err());
    }
}
