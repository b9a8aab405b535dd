//! Terminal dashboard for questrunner
//!
//! Full-screen ratatui + crossterm UI: a banner, the main log, a success
//! log, and a status panel fed by the event bus while the run drives in a
//! background task.

use anyhow::{Context, Result};
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io;
use std::time::Duration;
use tracing::info;

use questrunner_core::{BotConfig, EventBus};

pub mod app;
pub mod event;
pub mod ui;

use app::App;

/// Run the dashboard and the batch underneath it.
pub async fn run(bus: EventBus, config: BotConfig) -> Result<()> {
    // The presenter subscribes before the driver starts: nothing published
    // before this point would be replayed.
    let mut app = App::new(bus.subscribe());

    let driver = {
        let bus = bus.clone();
        tokio::spawn(async move { crate::cli::drive(&bus, &config).await })
    };
    let mut driver = Some(driver);

    // ── Terminal setup ──────────────────────────────────────────────

    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("Failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;

    info!("dashboard up");

    // ── Main loop ───────────────────────────────────────────────────

    let tick_rate = Duration::from_millis(100);

    let run_result: Result<()> = loop {
        if let Err(e) = terminal.draw(|frame| ui::draw(frame, &mut app)) {
            break Err(e.into());
        }

        if let Err(e) = event::handle_events(&mut app, tick_rate) {
            break Err(e);
        }

        if app.should_quit {
            break Ok(());
        }

        // A finished driver means either a completed run (keep displaying
        // until the user quits) or a fatal startup error (exit non-zero).
        if driver.as_ref().is_some_and(|handle| handle.is_finished()) {
            let handle = driver.take().expect("driver checked above");
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(error)) => break Err(error),
                Err(join_error) => break Err(join_error.into()),
            }
        }
    };

    // ── Restore terminal ────────────────────────────────────────────

    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;

    if let Some(handle) = driver {
        handle.abort();
    }

    run_result
}
