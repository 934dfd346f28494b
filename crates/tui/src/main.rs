mod app;

use crate::app::config::Config;
use crate::app::handlers::{handle_key, handle_mouse_event, handle_paste};
use crate::app::runtime::{GeminiClient, StreamClient};
use crate::app::view::ui::draw_ui;
use crate::app::AppState;
use anyhow::Context;
use crossterm::cursor::Show;
use crossterm::event::{
    self, DisableBracketedPaste, DisableMouseCapture, EnableBracketedPaste, EnableMouseCapture,
    Event, KeyEventKind,
};
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use crossterm::ExecutableCommand;
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tracing_subscriber::EnvFilter;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

struct TerminalRestoreGuard;

impl Drop for TerminalRestoreGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let mut stdout = std::io::stdout();
        let _ = stdout.execute(DisableBracketedPaste);
        let _ = stdout.execute(DisableMouseCapture);
        let _ = stdout.execute(LeaveAlternateScreen);
        let _ = stdout.execute(Show);
    }
}

// The terminal belongs to the UI; log lines go to a file or nowhere.
fn init_logging(config: &Config) {
    let file = match OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
    {
        Ok(file) => file,
        Err(_) => return,
    };
    let filter = EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .with_target(false)
        .try_init();
}

fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_logging(&config);
    tracing::info!(?config, "starting");

    let client: Arc<dyn StreamClient> =
        Arc::new(GeminiClient::new(&config).context("failed to build the HTTP client")?);
    let mut app = AppState::new(config, client);

    let mut stdout = std::io::stdout();
    let _restore_guard = TerminalRestoreGuard;
    stdout.execute(EnterAlternateScreen)?;
    enable_raw_mode()?;
    // Dropped files and multi-line pastes arrive as Event::Paste instead of key presses.
    let _ = stdout.execute(EnableBracketedPaste);
    let _ = stdout.execute(EnableMouseCapture);
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;
    terminal.clear()?;

    let mut needs_redraw = true;
    loop {
        if app.drain_generation_events(Instant::now()) {
            needs_redraw = true;
        }

        if event::poll(POLL_INTERVAL)? {
            let now = Instant::now();
            match event::read()? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if handle_key(&mut app, key.code, key.modifiers, now) {
                        needs_redraw = true;
                    }
                }
                Event::Paste(text) => {
                    if handle_paste(&mut app, &text, now) {
                        needs_redraw = true;
                    }
                }
                Event::Mouse(mouse) => {
                    if handle_mouse_event(&mut app, mouse.kind) {
                        needs_redraw = true;
                    }
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }

        if app.should_quit {
            break;
        }

        if app.tick(Instant::now()) {
            needs_redraw = true;
        }

        if needs_redraw {
            terminal.draw(|f| draw_ui(f, &mut app))?;
            needs_redraw = false;
        }
    }

    tracing::info!("exiting");
    Ok(())
}
