//! Run orchestrator: drives the sequencer across the wallet list.
//!
//! Wallets are processed strictly sequentially — one completes (success or
//! logged failure) before the next begins. Proxies rotate by index. The
//! sequencer cannot fail outward, so a bad wallet never stops the run.

use tracing::info;

use crate::config::{pause, ApiConfig, DelayPolicy};
use crate::event_bus::{EventBus, LogLevel, StatusUpdate};
use crate::proxy::ProxyEndpoint;
use crate::sequencer::run_sequence;
use crate::wallet::Wallet;

/// Round-robin proxy assignment: wallet `index` gets `proxies[index % P]`,
/// or none when the list is empty.
#[must_use]
pub fn select_proxy(proxies: &[ProxyEndpoint], index: usize) -> Option<&ProxyEndpoint> {
    if proxies.is_empty() {
        None
    } else {
        Some(&proxies[index % proxies.len()])
    }
}

/// Process every wallet, in input order.
pub async fn run_all(
    bus: &EventBus,
    api: &ApiConfig,
    delays: &DelayPolicy,
    wallets: &[Wallet],
    proxies: &[ProxyEndpoint],
) {
    let total = wallets.len();
    info!(wallets = total, proxies = proxies.len(), "starting run");

    let mut start = format!("🚀 Starting run for {total} wallet(s)");
    if proxies.is_empty() {
        start.push_str(" (direct connections).");
    } else {
        start.push_str(&format!(" using {} proxies (rotating).", proxies.len()));
    }
    bus.log(LogLevel::Info, start);
    bus.status(StatusUpdate {
        wallets_count: Some(total),
        status: Some("Initializing...".to_string()),
    });

    for (index, wallet) in wallets.iter().enumerate() {
        let proxy = select_proxy(proxies, index);
        run_sequence(bus, api, delays, wallet, proxy, index, total).await;

        if index + 1 < total {
            if delays.between_wallets_ms > 0 {
                bus.log(
                    LogLevel::Wait,
                    format!(
                        "--- Pausing {}s before next wallet ---",
                        delays.between_wallets_ms / 1000
                    ),
                );
            }
            pause(delays.between_wallets_ms).await;
        }
    }

    bus.log(
        LogLevel::Info,
        format!("🏁 All {total} wallet(s) processed! Run complete. ✨"),
    );
    bus.status(StatusUpdate {
        status: Some("Finished all wallets ✅".to_string()),
        ..Default::default()
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proxies(n: usize) -> Vec<ProxyEndpoint> {
        (0..n)
            .map(|i| ProxyEndpoint::parse(&format!("10.0.0.{i}:8080")).unwrap())
            .collect()
    }

    #[test]
    fn test_select_proxy_round_robin() {
        let list = proxies(3);
        for index in 0..10 {
            let expected = &list[index % 3];
            assert_eq!(select_proxy(&list, index), Some(expected));
        }
    }

    #[test]
    fn test_select_proxy_empty_list() {
        for index in 0..5 {
            assert_eq!(select_proxy(&[], index), None);
        }
    }

    #[test]
    fn test_select_proxy_single_proxy_serves_all() {
        let list = proxies(1);
        assert_eq!(select_proxy(&list, 0), Some(&list[0]));
        assert_eq!(select_proxy(&list, 7), Some(&list[0]));
    }
}
