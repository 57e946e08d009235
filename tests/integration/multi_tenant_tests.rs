//! End-to-end tests for the multi-tenant relay: JSON frames over the
//! ingestion socket, `identifier` query parameter on the feed.

use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use oasis_relay::mode::TenancyMode;
use tokio_tungstenite::tungstenite::protocol::frame::coding::CloseCode;
use tokio_tungstenite::tungstenite::Message;

use super::test_helpers::{connect_producer, poll, spawn_relay, test_config, wait_for_pending};

// ── Frame in, poll out, poll again empty ────────────────────

#[tokio::test]
async fn frame_is_delivered_once_to_matching_identifier() {
    let relay = spawn_relay(test_config(TenancyMode::Multi)).await;
    let mut producer = connect_producer(&relay).await;

    producer
        .send(Message::text(r#"{"identifier":"room1","message":"hello"}"#))
        .await
        .expect("send frame");
    wait_for_pending(&relay.store, 1).await;

    assert_eq!(poll(&relay, "identifier=room1").await, (200, "hello".to_owned()));
    assert_eq!(poll(&relay, "identifier=room1").await, (200, String::new()));
}

// ── Overwrite before poll ───────────────────────────────────

#[tokio::test]
async fn later_frame_overwrites_unpolled_payload() {
    let relay = spawn_relay(test_config(TenancyMode::Multi)).await;
    let mut producer = connect_producer(&relay).await;

    producer
        .send(Message::text(r#"{"identifier":"room1","message":"first"}"#))
        .await
        .expect("send first");
    producer
        .send(Message::text(r#"{"identifier":"room1","message":"second"}"#))
        .await
        .expect("send second");
    // A marker on another identifier proves both earlier frames were applied,
    // since frames on one connection are handled in order.
    producer
        .send(Message::text(r#"{"identifier":"marker","message":"done"}"#))
        .await
        .expect("send marker");
    wait_for_pending(&relay.store, 2).await;

    assert_eq!(poll(&relay, "identifier=room1").await.1, "second");
    assert_eq!(poll(&relay, "identifier=room1").await.1, "");
    assert_eq!(poll(&relay, "identifier=marker").await.1, "done");
}

// ── Identifier independence ─────────────────────────────────

#[tokio::test]
async fn polling_one_identifier_leaves_others_pending() {
    let relay = spawn_relay(test_config(TenancyMode::Multi)).await;
    let mut producer = connect_producer(&relay).await;

    for (id, msg) in [("a", "alpha"), ("b", "beta")] {
        let frame = format!(r#"{{"identifier":"{id}","message":"{msg}"}}"#);
        producer.send(Message::text(frame)).await.expect("send");
    }
    wait_for_pending(&relay.store, 2).await;

    assert_eq!(poll(&relay, "identifier=a").await.1, "alpha");
    assert_eq!(relay.store.len(), 1);
    assert_eq!(poll(&relay, "identifier=b").await.1, "beta");
}

// ── Empty-body cases are all 200 ────────────────────────────

#[tokio::test]
async fn missing_unknown_and_empty_identifier_all_return_empty_ok() {
    let relay = spawn_relay(test_config(TenancyMode::Multi)).await;
    relay.store.put("room1", "kept");

    assert_eq!(poll(&relay, "").await, (200, String::new()));
    assert_eq!(poll(&relay, "identifier=").await, (200, String::new()));
    assert_eq!(poll(&relay, "identifier=nobody").await, (200, String::new()));
    assert_eq!(relay.store.len(), 1, "none of these may touch room1");
}

#[tokio::test]
async fn legacy_query_parameter_is_accepted() {
    let relay = spawn_relay(test_config(TenancyMode::Multi)).await;
    relay.store.put("abcd", "legacy");

    assert_eq!(poll(&relay, "oasis_id=abcd").await.1, "legacy");
}

#[tokio::test]
async fn percent_encoded_identifier_is_decoded() {
    let relay = spawn_relay(test_config(TenancyMode::Multi)).await;
    relay.store.put("room one", "spaced");

    assert_eq!(poll(&relay, "identifier=room%20one").await.1, "spaced");
}

// ── Malformed frame closes the connection ───────────────────

#[tokio::test]
async fn malformed_frame_closes_connection_and_leaves_store_unchanged() {
    let relay = spawn_relay(test_config(TenancyMode::Multi)).await;
    let mut producer = connect_producer(&relay).await;

    producer
        .send(Message::text(r#"{"identifier":"room1","message":"before"}"#))
        .await
        .expect("send valid frame");
    wait_for_pending(&relay.store, 1).await;

    producer
        .send(Message::text(r#"{"identifier":"room2"}"#))
        .await
        .expect("send malformed frame");

    let next = tokio::time::timeout(Duration::from_secs(5), producer.next())
        .await
        .expect("server must close the connection");
    match next {
        Some(Ok(Message::Close(Some(frame)))) => assert_eq!(frame.code, CloseCode::Invalid),
        Some(Ok(Message::Close(None))) | None | Some(Err(_)) => {}
        Some(Ok(other)) => panic!("unexpected frame from ingestion endpoint: {other:?}"),
    }

    assert_eq!(relay.store.len(), 1);
    assert_eq!(poll(&relay, "identifier=room1").await.1, "before");
    assert_eq!(poll(&relay, "identifier=room2").await.1, "");
}

#[tokio::test]
async fn malformed_frame_does_not_affect_other_connections() {
    let relay = spawn_relay(test_config(TenancyMode::Multi)).await;
    let mut bad = connect_producer(&relay).await;
    let mut good = connect_producer(&relay).await;

    bad.send(Message::text("not json")).await.expect("send garbage");
    let _ = tokio::time::timeout(Duration::from_secs(5), bad.next()).await;

    good.send(Message::text(r#"{"identifier":"room1","message":"still up"}"#))
        .await
        .expect("send on healthy connection");
    wait_for_pending(&relay.store, 1).await;

    assert_eq!(poll(&relay, "identifier=room1").await.1, "still up");
}

// ── Producer disconnect ─────────────────────────────────────

#[tokio::test]
async fn payload_survives_producer_disconnect() {
    let relay = spawn_relay(test_config(TenancyMode::Multi)).await;
    let mut producer = connect_producer(&relay).await;

    producer
        .send(Message::text(r#"{"identifier":"room1","message":"last words"}"#))
        .await
        .expect("send frame");
    wait_for_pending(&relay.store, 1).await;
    producer.close(None).await.expect("close");

    assert_eq!(poll(&relay, "identifier=room1").await.1, "last words");
    assert_eq!(poll(&relay, "identifier=room1").await.1, "");
}
