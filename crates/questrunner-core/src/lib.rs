//! Questrunner Core - Wallet Sequencing Engine
//!
//! This crate provides the batch-run machinery for the questrunner CLI:
//! - Event bus: broadcast channel carrying log and status events to the
//!   dashboard
//! - Wallets: key loading, address derivation, personal-message signing
//! - Proxies: list loading and round-robin assignment
//! - Quest API client: cookie-session HTTP client with typed endpoint
//!   schemas
//! - Sequencer: the fixed per-wallet call sequence
//! - Orchestrator: sequential iteration over the wallet list

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod api;
pub mod config;
pub mod error;
pub mod event_bus;
pub mod orchestrator;
pub mod proxy;
pub mod sequencer;
pub mod signin;
pub mod wallet;

pub use api::{QuestClient, TaskUnit, TaskVerifyOutcome};
pub use config::{pause, ApiConfig, BotConfig, DelayPolicy, FileConfig};
pub use error::{SequenceError, SourceError};
pub use event_bus::{format_log_line, BotEvent, EventBus, LogLevel, StatusUpdate};
pub use orchestrator::{run_all, select_proxy};
pub use proxy::{load_proxies, ProxyEndpoint};
pub use sequencer::run_sequence;
pub use signin::build_signin_message;
pub use wallet::{load_wallets, Wallet, WalletError};
