//! Runtime configuration for a run.
//!
//! The binary loads these from an embedded `default.toml`, optional local
//! overrides, and `QUESTRUNNER_`-prefixed environment variables. The core
//! crate only defines the deserialized shapes.

use serde::Deserialize;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    /// Remote API settings
    pub api: ApiConfig,
    /// Input file locations
    pub files: FileConfig,
    /// Pacing values
    pub delays: DelayPolicy,
}

/// Remote API settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the quest API, no trailing slash
    pub base_url: String,
    /// Origin embedded in the sign-in statement and sent as the Origin header
    pub origin: String,
    /// URI embedded in the sign-in statement and sent as the Referer header
    pub referer: String,
    /// Chain ID embedded in the sign-in statement
    pub chain_id: u64,
    /// Per-request timeout, seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://quest-api.gpu.net/api".to_string(),
            origin: "https://token.gpu.net".to_string(),
            referer: "https://token.gpu.net/".to_string(),
            chain_id: 4048,
            timeout_secs: 45,
        }
    }
}

/// Input file locations.
#[derive(Debug, Clone, Deserialize)]
pub struct FileConfig {
    /// Wallet key list, one 64-hex key per line
    pub wallets: String,
    /// Proxy list, one `host:port[:user:pass]` per line
    pub proxies: String,
}

impl Default for FileConfig {
    fn default() -> Self {
        Self {
            wallets: "wallets.txt".to_string(),
            proxies: "proxy.txt".to_string(),
        }
    }
}

/// One fixed pacing value per delay site, in milliseconds.
///
/// Keeping every sleep behind a named field lets tests disable pacing (or a
/// future policy swap them for backoff) without touching control flow.
#[derive(Debug, Clone, Deserialize)]
pub struct DelayPolicy {
    /// After the nonce is received
    pub after_nonce_ms: u64,
    /// After the sign-in message is signed
    pub after_sign_ms: u64,
    /// After a successful login
    pub after_login_ms: u64,
    /// After the progress metric is fetched
    pub after_progress_ms: u64,
    /// After the task list is fetched
    pub after_task_fetch_ms: u64,
    /// After every task verification attempt, including the last
    pub between_tasks_ms: u64,
    /// Between wallets (not after the last one)
    pub between_wallets_ms: u64,
}

impl DelayPolicy {
    /// A policy with every delay disabled, for tests.
    #[must_use]
    pub fn none() -> Self {
        Self {
            after_nonce_ms: 0,
            after_sign_ms: 0,
            after_login_ms: 0,
            after_progress_ms: 0,
            after_task_fetch_ms: 0,
            between_tasks_ms: 0,
            between_wallets_ms: 0,
        }
    }
}

impl Default for DelayPolicy {
    fn default() -> Self {
        Self {
            after_nonce_ms: 500,
            after_sign_ms: 500,
            after_login_ms: 1000,
            after_progress_ms: 500,
            after_task_fetch_ms: 1000,
            between_tasks_ms: 5000,
            between_wallets_ms: 10_000,
        }
    }
}

/// Apply one pacing delay. A zero value returns immediately.
pub async fn pause(ms: u64) {
    if ms > 0 {
        tokio::time::sleep(Duration::from_millis(ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_policy_none_is_all_zero() {
        let policy = DelayPolicy::none();
        assert_eq!(policy.after_nonce_ms, 0);
        assert_eq!(policy.between_tasks_ms, 0);
        assert_eq!(policy.between_wallets_ms, 0);
    }

    #[test]
    fn test_delay_policy_defaults() {
        let policy = DelayPolicy::default();
        assert_eq!(policy.between_tasks_ms, 5000);
        assert_eq!(policy.between_wallets_ms, 10_000);
    }

    #[tokio::test]
    async fn test_pause_zero_returns_immediately() {
        let start = std::time::Instant::now();
        pause(0).await;
        assert!(start.elapsed() < Duration::from_millis(50));
    }

    #[test]
    fn test_config_deserializes() {
        let config: BotConfig = serde_json::from_value(serde_json::json!({
            "api": {
                "base_url": "http://localhost:1",
                "origin": "http://localhost",
                "referer": "http://localhost/",
                "chain_id": 1,
                "timeout_secs": 5
            },
            "files": { "wallets": "w.txt", "proxies": "p.txt" },
            "delays": {
                "after_nonce_ms": 1,
                "after_sign_ms": 2,
                "after_login_ms": 3,
                "after_progress_ms": 4,
                "after_task_fetch_ms": 5,
                "between_tasks_ms": 6,
                "between_wallets_ms": 7
            }
        }))
        .unwrap();
        assert_eq!(config.api.chain_id, 1);
        assert_eq!(config.delays.between_wallets_ms, 7);
        assert_eq!(config.files.wallets, "w.txt");
    }
}
