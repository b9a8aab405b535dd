//! End-to-end sequence tests against a mock quest API.

use questrunner_core::{
    run_all, ApiConfig, BotEvent, DelayPolicy, EventBus, LogLevel, Wallet,
};
use tokio::sync::broadcast;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_ONE: &str = "0000000000000000000000000000000000000000000000000000000000000001";

fn test_config(server: &MockServer) -> ApiConfig {
    ApiConfig {
        base_url: server.uri(),
        timeout_secs: 5,
        ..ApiConfig::default()
    }
}

/// Drain everything published so far.
fn drain(rx: &mut broadcast::Receiver<BotEvent>) -> Vec<BotEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

fn log_levels(events: &[BotEvent]) -> Vec<LogLevel> {
    events
        .iter()
        .filter_map(|event| match event {
            BotEvent::Log { level, .. } => Some(*level),
            BotEvent::Status { .. } => None,
        })
        .collect()
}

fn messages_of(events: &[BotEvent], level: LogLevel) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            BotEvent::Log {
                level: l, message, ..
            } if *l == level => Some(message.clone()),
            _ => None,
        })
        .collect()
}

fn statuses(events: &[BotEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            BotEvent::Status { update } => update.status.clone(),
            BotEvent::Log { .. } => None,
        })
        .collect()
}

async fn mount_happy_auth(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/auth/eth/nonce"))
        .respond_with(ResponseTemplate::new(200).set_body_json("abc123"))
        .mount(server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/eth/verify"))
        .respond_with(ResponseTemplate::new(200).insert_header("set-cookie", "session=s1; Path=/"))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/users/exp"))
        .respond_with(ResponseTemplate::new(200).set_body_json(42))
        .mount(server)
        .await;
}

#[tokio::test]
async fn happy_path_emits_expected_event_sequence() {
    let server = MockServer::start().await;
    mount_happy_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/users/social/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::Value::Array(vec![])))
        .mount(&server)
        .await;

    let bus = EventBus::new(256);
    let mut rx = bus.subscribe();
    let wallets = vec![Wallet::from_hex(KEY_ONE).unwrap()];

    run_all(
        &bus,
        &test_config(&server),
        &DelayPolicy::none(),
        &wallets,
        &[],
    )
    .await;

    let events = drain(&mut rx);

    // Log-level order for the whole run: run start, wallet header, then the
    // seven numbered steps with no tasks to attempt.
    assert_eq!(
        log_levels(&events),
        vec![
            LogLevel::Info,    // run start
            LogLevel::Info,    // wallet header
            LogLevel::Wait,    // 1. fetching nonce
            LogLevel::Info,    // 1. nonce received
            LogLevel::Wait,    // 2. signing
            LogLevel::Info,    // 2. signed
            LogLevel::Wait,    // 3. verifying
            LogLevel::Success, // 3. login
            LogLevel::Wait,    // 4. fetching exp
            LogLevel::Info,    // 4. exp value
            LogLevel::Wait,    // 5. fetching tasks
            LogLevel::Info,    // 5. none incomplete
            LogLevel::Success, // wallet complete
            LogLevel::Info,    // run complete
        ]
    );

    let infos = messages_of(&events, LogLevel::Info);
    assert!(infos.iter().any(|m| m.contains("Current EXP: 42")));
    assert!(infos.iter().any(|m| m.contains("No incomplete tasks")));

    // Status record updates: init, processing, finished, finished-all.
    assert_eq!(
        statuses(&events),
        vec![
            "Initializing...".to_string(),
            "Processing wallet 1/1".to_string(),
            "Finished wallet 1/1".to_string(),
            "Finished all wallets ✅".to_string(),
        ]
    );
}

#[tokio::test]
async fn task_failure_is_isolated_and_wallet_still_succeeds() {
    let server = MockServer::start().await;
    mount_happy_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/users/social/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": 1, "completed": false},
            {"id": 2, "completed": false},
            {"id": 3, "completed": false},
            {"id": 4, "completed": true}
        ])))
        .mount(&server)
        .await;
    for id in [1u64, 3] {
        Mock::given(method("GET"))
            .and(path(format!("/users/social/tasks/{id}/verify")))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"message": "ok"})),
            )
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/users/social/tasks/2/verify"))
        .respond_with(ResponseTemplate::new(500).set_body_string("task backend down"))
        .mount(&server)
        .await;

    let bus = EventBus::new(256);
    let mut rx = bus.subscribe();
    let wallets = vec![Wallet::from_hex(KEY_ONE).unwrap()];

    run_all(
        &bus,
        &test_config(&server),
        &DelayPolicy::none(),
        &wallets,
        &[],
    )
    .await;

    let events = drain(&mut rx);

    // Exactly one warning, for task 2; tasks 1 and 3 verified; the wallet
    // and run still complete.
    let warnings = messages_of(&events, LogLevel::Warn);
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("(ID: 2)"));

    let successes = messages_of(&events, LogLevel::Success);
    // login + task 1 + task 3 + wallet complete
    assert_eq!(successes.len(), 4);
    assert!(successes.iter().any(|m| m.contains("(ID: 1)")));
    assert!(successes.iter().any(|m| m.contains("(ID: 3)")));
    assert!(successes
        .iter()
        .any(|m| m.contains("completed successfully")));

    assert!(messages_of(&events, LogLevel::Error).is_empty());
    assert!(statuses(&events).contains(&"Finished wallet 1/1".to_string()));
}

#[tokio::test]
async fn login_failure_aborts_wallet_with_single_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/eth/nonce"))
        .respond_with(ResponseTemplate::new(200).set_body_json("n"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/auth/eth/verify"))
        .respond_with(ResponseTemplate::new(401).set_body_string("bad signature"))
        .mount(&server)
        .await;

    let bus = EventBus::new(256);
    let mut rx = bus.subscribe();
    let wallets = vec![Wallet::from_hex(KEY_ONE).unwrap()];

    run_all(
        &bus,
        &test_config(&server),
        &DelayPolicy::none(),
        &wallets,
        &[],
    )
    .await;

    let events = drain(&mut rx);

    let errors = messages_of(&events, LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("API error (401)"));
    assert!(errors[0].contains("/auth/eth/verify"));

    // No wallet-complete success, but the finished status still fires.
    assert!(messages_of(&events, LogLevel::Success).is_empty());
    assert!(statuses(&events).contains(&"Finished wallet 1/1".to_string()));
    assert!(statuses(&events).contains(&"Finished all wallets ✅".to_string()));
}

#[tokio::test]
async fn nonce_failure_skips_all_later_steps() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/auth/eth/nonce"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;

    let bus = EventBus::new(256);
    let mut rx = bus.subscribe();
    let wallets = vec![Wallet::from_hex(KEY_ONE).unwrap()];

    run_all(
        &bus,
        &test_config(&server),
        &DelayPolicy::none(),
        &wallets,
        &[],
    )
    .await;

    let events = drain(&mut rx);
    let errors = messages_of(&events, LogLevel::Error);
    assert_eq!(errors.len(), 1);
    assert!(errors[0].contains("API error (503)"));

    // The only WAIT is step 1; signing never started.
    assert_eq!(messages_of(&events, LogLevel::Wait).len(), 1);
}

#[tokio::test]
async fn orchestrator_processes_every_wallet_in_order() {
    let server = MockServer::start().await;
    mount_happy_auth(&server).await;
    Mock::given(method("GET"))
        .and(path("/users/social/tasks"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::Value::Array(vec![])))
        .mount(&server)
        .await;

    let keys = [
        KEY_ONE,
        "0000000000000000000000000000000000000000000000000000000000000002",
        "0000000000000000000000000000000000000000000000000000000000000003",
    ];
    let wallets: Vec<Wallet> = keys.iter().map(|k| Wallet::from_hex(k).unwrap()).collect();

    let bus = EventBus::new(1024);
    let mut rx = bus.subscribe();

    run_all(
        &bus,
        &test_config(&server),
        &DelayPolicy::none(),
        &wallets,
        &[],
    )
    .await;

    let events = drain(&mut rx);

    // One header per wallet, in input order.
    let headers: Vec<String> = messages_of(&events, LogLevel::Info)
        .into_iter()
        .filter(|m| m.starts_with("--- Wallet "))
        .collect();
    assert_eq!(headers.len(), 3);
    for (i, header) in headers.iter().enumerate() {
        assert!(header.starts_with(&format!("--- Wallet {}/3:", i + 1)));
        assert!(header.contains(wallets[i].short_address().as_str()));
    }

    // Three wallet completions and one run completion.
    let successes = messages_of(&events, LogLevel::Success);
    assert_eq!(
        successes
            .iter()
            .filter(|m| m.contains("completed successfully"))
            .count(),
        3
    );
    let status_list = statuses(&events);
    assert_eq!(status_list.last().unwrap(), "Finished all wallets ✅");
}
