//! EventBus - broadcast-based event system for run progress.
//!
//! The sequencer and orchestrator publish log and status events here so the
//! terminal dashboard (and any other subscriber) can render them in real
//! time. The bus is constructed once at startup and handed to both sides by
//! reference; there is no ambient global instance.

use serde::Serialize;
use tokio::sync::broadcast;

/// Severity/kind of a log line shown in the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    /// Informational progress
    Info,
    /// A pacing pause or an in-flight remote call
    Wait,
    /// A completed step or wallet
    Success,
    /// A contained failure (the run continues)
    Warn,
    /// A failure that ended a wallet's sequence
    Error,
}

impl LogLevel {
    /// Tag used in formatted log lines.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Wait => "WAIT",
            LogLevel::Success => "SUCCESS",
            LogLevel::Warn => "WARN",
            LogLevel::Error => "ERROR",
        }
    }
}

/// Partial update to the run status record.
///
/// Fields left `None` keep their previous value in the receiver's record
/// (last-write-wins per field).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StatusUpdate {
    /// Total number of wallets in the run
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wallets_count: Option<usize>,
    /// Human-readable run state
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

/// Events emitted during a run.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BotEvent {
    /// A log line for the dashboard
    Log {
        /// Severity/kind of the line
        level: LogLevel,
        /// Display text
        message: String,
    },
    /// A partial status update, merged by the receiver
    Status {
        /// Fields to merge
        update: StatusUpdate,
    },
}

/// Format a log event into its display line.
///
/// Pure function of its inputs: identical `(level, message)` always yields a
/// byte-identical line. Timestamps are rendered separately by the presenter.
#[must_use]
pub fn format_log_line(level: LogLevel, message: &str) -> String {
    format!("[{:<7}] {}", level.as_str(), message)
}

/// Broadcast-based event bus for run progress events.
///
/// Uses `tokio::broadcast` so multiple subscribers can receive the same
/// events. Slow subscribers will miss events (lagged) rather than blocking
/// the publisher, and subscribers attached after an emission miss it.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<BotEvent>,
}

impl EventBus {
    /// Create a new EventBus with the given channel capacity.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribe to events. Returns a receiver that will get all future
    /// events; nothing published before this call is replayed.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<BotEvent> {
        self.sender.subscribe()
    }

    /// Publish an event to all active subscribers.
    ///
    /// Returns the number of subscribers that received the event. With no
    /// subscribers the event is silently dropped.
    pub fn publish(&self, event: BotEvent) -> usize {
        // send() returns Err if there are no receivers, which is fine
        self.sender.send(event).unwrap_or(0)
    }

    /// Publish a log event.
    pub fn log(&self, level: LogLevel, message: impl Into<String>) -> usize {
        self.publish(BotEvent::Log {
            level,
            message: message.into(),
        })
    }

    /// Publish a partial status update.
    pub fn status(&self, update: StatusUpdate) -> usize {
        self.publish(BotEvent::Status { update })
    }

    /// Get the current number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(256)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_publish_subscribe() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.log(LogLevel::Info, "hello");

        match rx.recv().await.unwrap() {
            BotEvent::Log { level, message } => {
                assert_eq!(level, LogLevel::Info);
                assert_eq!(message, "hello");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_multiple_subscribers() {
        let bus = EventBus::new(16);
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        assert_eq!(bus.subscriber_count(), 2);

        let count = bus.log(LogLevel::Success, "done");
        assert_eq!(count, 2);

        assert!(matches!(rx1.recv().await.unwrap(), BotEvent::Log { .. }));
        assert!(matches!(rx2.recv().await.unwrap(), BotEvent::Log { .. }));
    }

    #[test]
    fn test_publish_no_subscribers() {
        let bus = EventBus::new(16);
        // No subscribers — should not panic
        let count = bus.log(LogLevel::Error, "nobody listening");
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_event_ordering() {
        let bus = EventBus::new(16);
        let mut rx = bus.subscribe();

        bus.log(LogLevel::Wait, "first");
        bus.log(LogLevel::Info, "second");
        bus.status(StatusUpdate {
            status: Some("third".to_string()),
            ..Default::default()
        });

        match rx.recv().await.unwrap() {
            BotEvent::Log { message, .. } => assert_eq!(message, "first"),
            other => panic!("expected log, got: {:?}", other),
        }
        match rx.recv().await.unwrap() {
            BotEvent::Log { message, .. } => assert_eq!(message, "second"),
            other => panic!("expected log, got: {:?}", other),
        }
        match rx.recv().await.unwrap() {
            BotEvent::Status { update } => assert_eq!(update.status.as_deref(), Some("third")),
            other => panic!("expected status, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_late_subscriber_misses_earlier_events() {
        let bus = EventBus::new(16);
        let mut early = bus.subscribe();

        bus.log(LogLevel::Info, "before");

        let mut late = bus.subscribe();
        bus.log(LogLevel::Info, "after");

        // The early subscriber sees both, the late one only the second.
        assert!(matches!(early.recv().await.unwrap(), BotEvent::Log { message, .. } if message == "before"));
        assert!(matches!(early.recv().await.unwrap(), BotEvent::Log { message, .. } if message == "after"));
        assert!(matches!(late.recv().await.unwrap(), BotEvent::Log { message, .. } if message == "after"));
        assert!(late.try_recv().is_err());
    }

    #[test]
    fn test_event_serialization() {
        let event = BotEvent::Log {
            level: LogLevel::Wait,
            message: "fetching nonce".to_string(),
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"log\""));
        assert!(json.contains("\"level\":\"WAIT\""));

        let event = BotEvent::Status {
            update: StatusUpdate {
                wallets_count: Some(3),
                status: None,
            },
        };
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"wallets_count\":3"));
        assert!(!json.contains("\"status\""));
    }

    #[test]
    fn test_format_log_line_idempotent() {
        let a = format_log_line(LogLevel::Wait, "1. Fetching nonce...");
        let b = format_log_line(LogLevel::Wait, "1. Fetching nonce...");
        assert_eq!(a, b);
        assert_eq!(a, "[WAIT   ] 1. Fetching nonce...");
    }

    #[test]
    fn test_format_log_line_pads_tags() {
        assert_eq!(format_log_line(LogLevel::Success, "x"), "[SUCCESS] x");
        assert_eq!(format_log_line(LogLevel::Info, "x"), "[INFO   ] x");
        assert_eq!(format_log_line(LogLevel::Error, "x"), "[ERROR  ] x");
    }

    #[test]
    fn test_default_capacity() {
        let bus = EventBus::default();
        assert_eq!(bus.subscriber_count(), 0);
    }
}
