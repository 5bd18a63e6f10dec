//! Connection lifecycle and handshake tests.
//!
//! These drive the session tick by tick against mock collaborators and check
//! what goes over the wire, and when.

mod common;

use std::time::Duration;

use common::*;
use fabreader_core::ReaderCredentials;
use fabreader_hardware::Icon;
use fabreader_protocol::MessageType;
use fabreader_session::{DeviceRecord, MemoryStore, SessionConfig, SessionState};

#[test]
fn test_full_handshake() {
    let mut h = Harness::new();

    // Link comes up and the transport connects
    h.tick();
    assert_eq!(h.state(), SessionState::Disconnected);
    assert_eq!(h.transport().connect_attempts(), 1);

    // Exactly one registration request
    h.tick();
    assert_eq!(h.state(), SessionState::Connected);
    let sent = h.take_sent();
    assert_eq!(types(&sent), vec![MessageType::Register]);
    assert_eq!(sent[0].payload["deviceType"], "fabreader");
    assert!(sent[0].field("id").is_none());

    h.tick();
    assert!(h.take_sent().is_empty());

    // registration_data arrives
    h.push(REGISTRATION_DATA);
    h.tick();
    assert_eq!(h.state(), SessionState::Registered);

    // Exactly one authentication request carrying the assigned identity
    h.tick();
    let sent = h.take_sent();
    assert_eq!(types(&sent), vec![MessageType::Authenticate]);
    assert!(!sent[0].is_response);
    assert_eq!(sent[0].payload["id"], 42);
    assert_eq!(sent[0].payload["token"], "tok-42");

    h.tick();
    assert!(h.take_sent().is_empty());

    // Authentication succeeds
    h.push(AUTHENTICATE_OK);
    h.tick();
    assert_eq!(h.state(), SessionState::Authenticated);
    assert_eq!(h.session.reader_name(), Some("Laser Cutter"));
    assert_eq!(h.display.last_text().as_deref(), Some("Laser Cutter"));

    // Heartbeats spaced exactly by the heartbeat interval
    h.tick();
    assert_eq!(types(&h.take_sent()), vec![MessageType::Heartbeat]);

    let interval = SessionConfig::default().heartbeat_interval;
    for _ in 0..3 {
        h.advance(interval - Duration::from_millis(1));
        assert!(h.take_sent().is_empty());
        h.advance(Duration::from_millis(1));
        assert_eq!(types(&h.take_sent()), vec![MessageType::Heartbeat]);
    }
}

#[test]
fn test_state_history_records_handshake() {
    let mut h = Harness::new();
    h.authenticate();

    let path: Vec<(SessionState, SessionState)> = h
        .session
        .history()
        .iter()
        .map(|t| (t.from, t.to))
        .collect();
    assert_eq!(
        path,
        vec![
            (SessionState::Disconnected, SessionState::Connected),
            (SessionState::Connected, SessionState::Registered),
            (SessionState::Registered, SessionState::Authenticated),
        ]
    );
}

#[test]
fn test_registration_retried_after_timeout() {
    let mut h = Harness::new();
    h.connect();
    assert_eq!(types(&h.take_sent()), vec![MessageType::Register]);

    let timeout = SessionConfig::default().registration_timeout;
    h.advance(timeout - Duration::from_millis(1));
    assert!(h.take_sent().is_empty());

    h.advance(Duration::from_millis(1));
    assert_eq!(types(&h.take_sent()), vec![MessageType::Register]);

    // At most once per elapsed window
    h.tick();
    h.advance(Duration::from_millis(500));
    assert!(h.take_sent().is_empty());
}

#[test]
fn test_authentication_retried_after_timeout() {
    let mut h = Harness::new();
    h.register();
    h.tick();
    h.take_sent();

    let timeout = SessionConfig::default().authentication_timeout;
    h.advance(timeout - Duration::from_millis(1));
    assert!(h.take_sent().is_empty());

    h.advance(Duration::from_millis(1));
    let sent = h.take_sent();
    assert_eq!(sent.len(), 1);
    assert!(is_auth_request(&sent[0]));
}

#[test]
fn test_rejected_authentication_stays_registered() {
    let mut h = Harness::new();
    h.register();
    h.tick();
    h.take_sent();

    h.push(AUTHENTICATE_REJECTED);
    h.tick();
    assert_eq!(h.state(), SessionState::Registered);

    // Retries on its own timer, not immediately
    h.tick();
    assert!(h.take_sent().is_empty());
    h.advance(SessionConfig::default().authentication_timeout);
    assert!(h.take_sent().iter().any(is_auth_request));
}

#[test]
fn test_authentication_result_before_registration_ignored() {
    let mut h = Harness::new();
    h.connect();
    h.push(AUTHENTICATE_OK);
    h.tick();
    assert_eq!(h.state(), SessionState::Connected);
}

#[test]
fn test_unauthorized_demotes_to_registered() {
    let mut h = Harness::new();
    h.authenticate();

    h.push(UNAUTHORIZED);
    h.tick();
    h.take_sent();
    assert_eq!(h.state(), SessionState::Registered);
    assert!(h.session.is_registered());
    assert!(!h.session.is_authenticated());
    assert!(h.transport().is_connected());

    // Next tick re-sends authentication, and no registration
    h.tick();
    let sent = h.take_sent();
    assert_eq!(sent.len(), 1);
    assert!(is_auth_request(&sent[0]));
}

#[test]
fn test_reauthenticate_request_restarts_authentication() {
    let mut h = Harness::new();
    h.authenticate();

    h.push(REAUTHENTICATE);
    h.tick();
    assert_eq!(h.state(), SessionState::Registered);

    h.tick();
    assert!(h.take_sent().iter().any(is_auth_request));

    h.push(AUTHENTICATE_OK);
    h.tick();
    assert_eq!(h.state(), SessionState::Authenticated);
}

#[test]
fn test_reauthenticate_response_authenticates() {
    let mut h = Harness::new();
    h.register();
    h.tick();

    h.push(r#"{"is_response":true,"type":"reauthenticate","payload":{}}"#);
    h.tick();
    assert_eq!(h.state(), SessionState::Authenticated);
}

#[test]
fn test_transport_drop_resets_everything() {
    let mut h = Harness::new();
    h.authenticate();
    h.push(ENABLE_CARD_CHECKING);
    h.tick();
    assert!(h.session.card_checking_enabled());

    h.transport().drop_connection();
    h.tick();

    assert_eq!(h.state(), SessionState::Disconnected);
    assert!(!h.session.is_registered());
    assert!(!h.session.is_authenticated());
    assert!(!h.session.card_checking_enabled());
    assert_eq!(h.session.registration_timer().last_sent(), None);
    assert_eq!(h.session.authentication_timer().last_sent(), None);
    assert_eq!(h.session.heartbeat_timer().last_sent(), None);
    assert_eq!(h.display.icons().last(), Some(&Icon::ApiDisconnected));
}

#[test]
fn test_link_down_resets_and_handshake_restarts() {
    let mut h = Harness::new();
    h.authenticate();

    h.link.set_healthy(false);
    h.tick();
    assert_eq!(h.state(), SessionState::Disconnected);
    assert!(h.display.icons().contains(&Icon::WifiOff));

    // No reconnect while the link is down
    let attempts = h.transport().connect_attempts();
    h.advance(Duration::from_secs(60));
    assert_eq!(h.transport().connect_attempts(), attempts);
    assert!(h.take_sent().is_empty());

    // Link back: the whole handshake starts over
    h.link.set_healthy(true);
    h.tick();
    h.tick();
    assert_eq!(h.state(), SessionState::Connected);
    assert_eq!(types(&h.take_sent()), vec![MessageType::Register]);
}

#[test]
fn test_send_failure_resets_within_tick() {
    let mut h = Harness::new();
    h.register();

    h.transport().set_fail_sends(true);
    let report = h.tick();

    assert_eq!(h.state(), SessionState::Disconnected);
    assert_eq!(report.sent, 0);
    assert!(!h.transport().is_connected());
}

#[test]
fn test_inbound_after_failed_reply_not_processed() {
    let mut h = Harness::new();
    h.authenticate();
    h.tick();

    h.transport().set_fail_sends(true);
    // The change_keys reply fails; the following frame must not be handled
    h.push(&change_keys(KEY_HEX));
    h.push(SHOW_TEXT);
    h.tick();

    assert_eq!(h.state(), SessionState::Disconnected);
    assert!(!h.display.texts().contains(&"Welcome".to_string()));
}

#[test]
fn test_reconnect_is_rate_limited() {
    let mut h = Harness::new();
    h.tick();
    assert_eq!(h.transport().connect_attempts(), 1);

    // Connection attempt fails straight away
    h.transport().drop_connection();
    h.advance(Duration::from_secs(1));
    assert_eq!(h.transport().connect_attempts(), 1);

    h.transport().drop_connection();
    h.advance(SessionConfig::default().reconnect_interval);
    assert_eq!(h.transport().connect_attempts(), 2);
}

#[test]
fn test_pending_connection_waits() {
    let mut h = Harness::new();
    h.transport().set_auto_connect(false);

    h.tick();
    h.advance(Duration::from_secs(30));
    assert_eq!(h.state(), SessionState::Disconnected);
    assert_eq!(h.transport().connect_attempts(), 1);

    h.transport().open();
    h.tick();
    assert_eq!(h.state(), SessionState::Connected);
    assert!(h.display.icons().contains(&Icon::ApiConnected));
}

#[test]
fn test_register_carries_stored_identity() {
    let store = MemoryStore::with_record(DeviceRecord {
        credentials: Some(ReaderCredentials::new(7, "stored")),
        key_material: None,
    });
    let mut h = Harness::with_store(store);
    h.connect();

    let sent = h.take_sent();
    assert_eq!(sent[0].payload["id"], 7);
    assert_eq!(sent[0].payload["token"], "stored");

    // Stored identity alone does not count as registered
    assert_eq!(h.state(), SessionState::Connected);
}

#[test]
fn test_custom_timeouts() {
    let config = SessionConfig {
        registration_timeout: Duration::from_secs(2),
        ..SessionConfig::default()
    };
    let mut h = Harness::with_config(config);
    h.connect();
    h.take_sent();

    h.advance(Duration::from_secs(2));
    assert_eq!(types(&h.take_sent()), vec![MessageType::Register]);
}

#[test]
fn test_shutdown_ends_link() {
    let mut h = Harness::new();
    h.authenticate();

    let now = h.now;
    h.session.shutdown(now);
    assert_eq!(h.state(), SessionState::Disconnected);

    h.tick();
    assert_eq!(h.state(), SessionState::Disconnected);
    assert!(h.take_sent().is_empty());
}
