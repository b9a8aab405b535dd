//! Plain-output presenter.
//!
//! Prints each log event as one color-coded line on stdout; status updates
//! only go to tracing. Used with `--plain`, and the sensible choice when
//! stdout is a pipe or a CI log.

use crossterm::style::Stylize;
use tokio::sync::broadcast::error::RecvError;
use tracing::debug;

use questrunner_core::{format_log_line, BotConfig, BotEvent, EventBus, LogLevel};

/// Run the batch with plain line output.
pub async fn run(bus: EventBus, config: BotConfig) -> anyhow::Result<()> {
    let mut rx = bus.subscribe();
    let printer = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(BotEvent::Log { level, message }) => print_line(level, &message),
                Ok(BotEvent::Status { update }) => debug!(?update, "status update"),
                Err(RecvError::Lagged(missed)) => {
                    eprintln!("(display lagged, {missed} events dropped)");
                }
                Err(RecvError::Closed) => break,
            }
        }
    });

    let outcome = super::drive(&bus, &config).await;

    // Dropping the last sender closes the channel; the printer drains
    // whatever is still queued and exits.
    drop(bus);
    let _ = printer.await;
    outcome
}

fn print_line(level: LogLevel, message: &str) {
    let line = format_log_line(level, message);
    let styled = match level {
        LogLevel::Info => line.stylize(),
        LogLevel::Wait => line.yellow(),
        LogLevel::Success => line.green(),
        LogLevel::Warn => line.magenta(),
        LogLevel::Error => line.red(),
    };
    println!("{styled}");
}
