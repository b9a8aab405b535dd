//! Per-wallet task-automation sequencer.
//!
//! Runs the fixed ordered sequence of remote calls for one wallet and
//! reports every step through the event bus. A failure anywhere in steps
//! 1-5 ends this wallet's run with a single ERROR event; task verification
//! failures in step 6 are contained per task. Nothing propagates to the
//! caller: the orchestrator moves on to the next wallet regardless.

use chrono::{SecondsFormat, Utc};
use tracing::{debug, instrument};

use crate::api::QuestClient;
use crate::config::{pause, ApiConfig, DelayPolicy};
use crate::error::SequenceError;
use crate::event_bus::{EventBus, LogLevel, StatusUpdate};
use crate::proxy::ProxyEndpoint;
use crate::signin::build_signin_message;
use crate::wallet::Wallet;

/// Run the full sequence for one wallet.
///
/// `index` is zero-based; `total` is the run's wallet count. A status event
/// marking this wallet finished is emitted on every exit path.
#[instrument(skip_all, fields(wallet = index + 1))]
pub async fn run_sequence(
    bus: &EventBus,
    api: &ApiConfig,
    delays: &DelayPolicy,
    wallet: &Wallet,
    proxy: Option<&ProxyEndpoint>,
    index: usize,
    total: usize,
) {
    let display = index + 1;

    let route = match proxy {
        Some(proxy) => format!("via proxy {}", proxy.host()),
        None => "direct connection".to_string(),
    };
    bus.log(
        LogLevel::Info,
        format!(
            "--- Wallet {display}/{total}: {} ({route}) ---",
            wallet.short_address()
        ),
    );
    if let Some(proxy) = proxy {
        bus.log(
            LogLevel::Info,
            format!("🌐 Using proxy {} for wallet {display}", proxy.host()),
        );
    }
    bus.status(StatusUpdate {
        status: Some(format!("Processing wallet {display}/{total}")),
        ..Default::default()
    });

    if let Err(error) = run_steps(bus, api, delays, wallet, proxy, display).await {
        bus.log(
            LogLevel::Error,
            format!("🚨 {}", describe_failure(&error, display, proxy)),
        );
    }

    bus.status(StatusUpdate {
        status: Some(format!("Finished wallet {display}/{total}")),
        ..Default::default()
    });
}

/// Steps 1-7. Any error returned here aborts the wallet.
async fn run_steps(
    bus: &EventBus,
    api: &ApiConfig,
    delays: &DelayPolicy,
    wallet: &Wallet,
    proxy: Option<&ProxyEndpoint>,
    display: usize,
) -> Result<(), SequenceError> {
    let client = QuestClient::new(api, proxy)?;

    // === Step 1: nonce ===
    bus.log(
        LogLevel::Wait,
        format!("[Wallet {display}] ⌛️ 1. Fetching nonce..."),
    );
    let nonce = client.fetch_nonce().await?;
    debug!(nonce = %nonce, "nonce received");
    bus.log(
        LogLevel::Info,
        format!("[Wallet {display}] ✅ 1. Nonce received."),
    );
    pause(delays.after_nonce_ms).await;

    // === Step 2: sign ===
    bus.log(
        LogLevel::Wait,
        format!("[Wallet {display}] ⌛️ 2. Signing message..."),
    );
    let issued_at = Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true);
    let message = build_signin_message(api, wallet.address(), &nonce, &issued_at);
    let signature = wallet
        .sign_personal(&message)
        .map_err(|e| SequenceError::Signing(e.to_string()))?;
    bus.log(
        LogLevel::Info,
        format!("[Wallet {display}] ✅ 2. Message signed."),
    );
    pause(delays.after_sign_ms).await;

    // === Step 3: verify (log in) ===
    bus.log(
        LogLevel::Wait,
        format!("[Wallet {display}] ⌛️ 3. Verifying signature (log in)..."),
    );
    client.verify_login(&message, &signature).await?;
    bus.log(
        LogLevel::Success,
        format!("[Wallet {display}] ✅ 3. Login successful! Welcome aboard! 🎉"),
    );
    pause(delays.after_login_ms).await;

    // === Step 4: EXP ===
    bus.log(
        LogLevel::Wait,
        format!("[Wallet {display}] ⌛️ 4. Fetching EXP..."),
    );
    let exp = client.fetch_exp().await?;
    bus.log(
        LogLevel::Info,
        format!("[Wallet {display}] ✨ 4. Current EXP: {exp}"),
    );
    pause(delays.after_progress_ms).await;

    // === Step 5: task list ===
    bus.log(
        LogLevel::Wait,
        format!("[Wallet {display}] ⌛️ 5. Fetching available tasks..."),
    );
    let pending: Vec<_> = client
        .fetch_tasks()
        .await?
        .into_iter()
        .filter(|task| !task.completed)
        .collect();

    if pending.is_empty() {
        bus.log(
            LogLevel::Info,
            format!("[Wallet {display}] 👍 5. No incomplete tasks found. All clear!"),
        );
    } else {
        let ids: Vec<String> = pending.iter().map(|task| task.id.to_string()).collect();
        bus.log(
            LogLevel::Info,
            format!(
                "[Wallet {display}] 📝 5. Found {} incomplete task(s) (IDs: {}).",
                pending.len(),
                ids.join(", ")
            ),
        );
    }
    pause(delays.after_task_fetch_ms).await;

    // === Step 6: attempt each pending task ===
    let mut verified = 0usize;
    for (number, task) in pending.iter().enumerate() {
        let number = number + 1;
        bus.log(
            LogLevel::Wait,
            format!("[Wallet {display}] ⌛️ 6. Task {number}: verifying (ID: {})...", task.id),
        );
        match client.verify_task(task.id).await {
            Ok(outcome) => {
                verified += 1;
                let text = outcome.message.unwrap_or_else(|| "Verified!".to_string());
                bus.log(
                    LogLevel::Success,
                    format!("[Wallet {display}] ✅ 6. Task {number}: {text} (ID: {})", task.id),
                );
            }
            Err(error) => {
                bus.log(
                    LogLevel::Warn,
                    format!(
                        "[Wallet {display}] ⚠️ 6. Task {number} verification failed (ID: {}): {error}",
                        task.id
                    ),
                );
            }
        }
        // Pace every attempt, including the last, success or failure.
        if delays.between_tasks_ms > 0 {
            bus.log(
                LogLevel::Wait,
                format!("--- Pausing {}s before next task ---", delays.between_tasks_ms / 1000),
            );
        }
        pause(delays.between_tasks_ms).await;
    }

    if !pending.is_empty() {
        bus.log(
            LogLevel::Info,
            format!(
                "[Wallet {display}] 👉 Attempted verification for {} task(s). {verified} reported success.",
                pending.len()
            ),
        );
    }

    // === Step 7: final wallet success, regardless of step-6 outcomes ===
    bus.log(
        LogLevel::Success,
        format!("[Wallet {display}] 🎉 Wallet {display} completed successfully! Let's gooo! 🚀"),
    );
    Ok(())
}

/// Render one abort into a single error line.
fn describe_failure(
    error: &SequenceError,
    display: usize,
    proxy: Option<&ProxyEndpoint>,
) -> String {
    let route = match proxy {
        Some(proxy) => format!("(via proxy {})", proxy.host()),
        None => "(direct)".to_string(),
    };
    match error {
        SequenceError::Api {
            status,
            method,
            endpoint,
            body,
        } => format!(
            "API error ({status}) for wallet {display} on {method} {endpoint} {route}: {body}"
        ),
        SequenceError::Network {
            method,
            endpoint,
            message,
        } => format!(
            "Network error for wallet {display} on {method} {endpoint} {route}: {message}"
        ),
        SequenceError::Decode { endpoint, message } => format!(
            "Response decode error for wallet {display} on {endpoint} {route}: {message}"
        ),
        SequenceError::Signing(message) => {
            format!("Signature error for wallet {display}: {message}")
        }
        SequenceError::Setup(message) => {
            format!("Client setup error for wallet {display} {route}: {message}")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_failure_api() {
        let error = SequenceError::Api {
            status: 403,
            method: "POST",
            endpoint: "/auth/eth/verify".to_string(),
            body: "forbidden".to_string(),
        };
        let line = describe_failure(&error, 2, None);
        assert_eq!(
            line,
            "API error (403) for wallet 2 on POST /auth/eth/verify (direct): forbidden"
        );
    }

    #[test]
    fn test_describe_failure_names_proxy_host() {
        let proxy = ProxyEndpoint::parse("1.2.3.4:8080").unwrap();
        let error = SequenceError::Network {
            method: "GET",
            endpoint: "/auth/eth/nonce".to_string(),
            message: "timed out".to_string(),
        };
        let line = describe_failure(&error, 1, Some(&proxy));
        assert!(line.contains("(via proxy 1.2.3.4)"));
        assert!(line.contains("timed out"));
    }

    #[test]
    fn test_describe_failure_signing() {
        let error = SequenceError::Signing("bad key".to_string());
        assert_eq!(
            describe_failure(&error, 3, None),
            "Signature error for wallet 3: bad key"
        );
    }
}
