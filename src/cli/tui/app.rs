//! Dashboard application state.

use chrono::{DateTime, Local};
use tokio::sync::broadcast;
use tokio::sync::broadcast::error::TryRecvError;

use questrunner_core::{BotEvent, LogLevel, StatusUpdate};

/// Maximum lines retained per log pane.
const MAX_LOG_LINES: usize = 2000;

/// One rendered log line.
pub struct LogLine {
    pub level: LogLevel,
    pub message: String,
    pub timestamp: DateTime<Local>,
}

/// Accumulated run status, merged from partial updates.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct StatusRecord {
    pub wallets_count: Option<usize>,
    pub status: String,
}

impl StatusRecord {
    /// Merge a partial update, last-write-wins per field.
    pub fn apply(&mut self, update: StatusUpdate) {
        if let Some(count) = update.wallets_count {
            self.wallets_count = Some(count);
        }
        if let Some(status) = update.status {
            self.status = status;
        }
    }
}

/// Main application state.
pub struct App {
    rx: broadcast::Receiver<BotEvent>,
    pub main_log: Vec<LogLine>,
    pub success_log: Vec<LogLine>,
    pub status: StatusRecord,
    pub should_quit: bool,
    /// Lines scrolled up from the bottom of the main log.
    pub scroll_offset: usize,
}

impl App {
    pub fn new(rx: broadcast::Receiver<BotEvent>) -> Self {
        Self {
            rx,
            main_log: Vec::new(),
            success_log: Vec::new(),
            status: StatusRecord {
                wallets_count: None,
                status: "Initializing...".to_string(),
            },
            should_quit: false,
            scroll_offset: 0,
        }
    }

    /// Drain everything queued on the bus into the display buffers.
    pub fn drain_events(&mut self) {
        loop {
            match self.rx.try_recv() {
                Ok(BotEvent::Log { level, message }) => self.push_log(level, message),
                Ok(BotEvent::Status { update }) => self.status.apply(update),
                Err(TryRecvError::Lagged(missed)) => {
                    self.push_log(LogLevel::Warn, format!("display lagged, {missed} events dropped"));
                }
                Err(TryRecvError::Empty | TryRecvError::Closed) => break,
            }
        }
    }

    fn push_log(&mut self, level: LogLevel, message: String) {
        let line = LogLine {
            level,
            message: message.clone(),
            timestamp: Local::now(),
        };
        if level == LogLevel::Success {
            self.success_log.push(LogLine {
                level,
                message,
                timestamp: line.timestamp,
            });
            trim_front(&mut self.success_log);
        }
        self.main_log.push(line);
        trim_front(&mut self.main_log);
    }

    // ── scrolling ───────────────────────────────────────────────────────

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_add(1);
    }

    pub fn scroll_down(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.scroll_offset = 0;
    }
}

fn trim_front(log: &mut Vec<LogLine>) {
    if log.len() > MAX_LOG_LINES {
        let excess = log.len() - MAX_LOG_LINES;
        log.drain(..excess);
    }
}
