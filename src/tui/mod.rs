mod app;
mod bindings;
mod events;
mod ui;

pub use app::{App, InputMode, PendingAction, Tab};
pub use bindings::{resolve, Panel, BINDINGS};
pub use events::{EventHandler, InputEvent};

use crate::api::DashboardBackend;
use crate::config::Config;
use crate::push::PushClient;
use crate::sync::SyncMessage;
use anyhow::Result;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io::{stdout, Write};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Notification expiry runs on its own clock, independent of drawing
const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// OSC 52 escape that asks the terminal to put `text` on the system clipboard
pub fn osc52_sequence(text: &str) -> String {
    format!("\x1b]52;c;{}\x07", STANDARD.encode(text))
}

/// Send `make()` into the channel every `period`, starting one period from now
fn spawn_ticker(
    period: Duration,
    tx: mpsc::UnboundedSender<SyncMessage>,
    make: fn() -> SyncMessage,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            interval.tick().await;
            if tx.send(make()).is_err() {
                break;
            }
        }
    })
}

fn spawn_background(
    config: &Config,
    tx: &mpsc::UnboundedSender<SyncMessage>,
) -> Vec<JoinHandle<()>> {
    let push = PushClient::new(&config.push_url, config.reconnect_delay(), tx.clone());
    vec![
        tokio::spawn(push.run()),
        spawn_ticker(config.poll_interval(), tx.clone(), || SyncMessage::PollTick),
        spawn_ticker(SWEEP_INTERVAL, tx.clone(), || SyncMessage::Sweep),
    ]
}

/// Initialize and run the TUI application
pub async fn run_tui(config: Config, backend: Arc<dyn DashboardBackend>) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel();
    let tasks = spawn_background(&config, &tx);
    tracing::info!(
        "Background sync started (poll every {}s, push {})",
        config.poll_interval_secs,
        config.push_url
    );

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let terminal_backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(terminal_backend)?;

    // Create app state and kick off the initial load
    let mut app = App::new(config, backend, tx);
    app.load_all();
    let mut event_handler = EventHandler::new(100); // 100ms tick rate

    // Main loop
    let result = run_app(&mut terminal, &mut app, &mut rx, &mut event_handler).await;

    for task in &tasks {
        task.abort();
    }

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}

async fn run_app<B: Backend + Write>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: &mut mpsc::UnboundedReceiver<SyncMessage>,
    event_handler: &mut EventHandler,
) -> Result<()> {
    loop {
        // Draw UI
        terminal.draw(|frame| ui::draw(frame, app))?;

        if let Some(text) = app.take_clipboard() {
            let out = terminal.backend_mut();
            write!(out, "{}", osc52_sequence(&text))?;
            std::io::Write::flush(out)?;
        }

        // Handle input
        if let Some(InputEvent::Key(key)) = event_handler.next()? {
            app.handle_key(key);
        }

        // Check if we should quit
        if app.should_quit {
            break;
        }

        // Apply everything that arrived since the last frame, in arrival order
        while let Ok(message) = rx.try_recv() {
            app.handle_message(message);
        }

        tokio::task::yield_now().await;
    }

    Ok(())
}
