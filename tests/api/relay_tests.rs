//! Relay WebSocket Tests
//!
//! End-to-end tests over real connections: acknowledgement, registration,
//! point-to-point forwarding, silent drops, and heartbeat reaping.

use std::net::SocketAddr;
use std::time::Duration;

use futures::{SinkExt, StreamExt};
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tokio::net::TcpStream;
use tokio::time::timeout;
use tokio_test::assert_ok;
use tokio_tungstenite::{connect_async, tungstenite::Message, MaybeTlsStream, WebSocketStream};

use crate::common::spawn_relay;

type Ws = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Heartbeat long enough to never interfere with routing tests.
const QUIET_HEARTBEAT_SECS: u64 = 60;

/// Time to let the single-threaded relay loop process a frame.
const SETTLE: Duration = Duration::from_millis(100);

async fn connect(addr: SocketAddr) -> Ws {
    let (ws, _) = assert_ok!(connect_async(format!("ws://{addr}/ws")).await);
    ws
}

async fn send_json(ws: &mut Ws, value: Value) {
    assert_ok!(ws.send(Message::Text(value.to_string().into())).await);
}

/// Next text frame as JSON, with a generous deadline.
async fn next_json(ws: &mut Ws) -> Value {
    let deadline = Duration::from_secs(5);
    loop {
        let frame = timeout(deadline, ws.next())
            .await
            .expect("timed out waiting for frame")
            .expect("connection closed unexpectedly")
            .expect("websocket error");
        if let Message::Text(text) = frame {
            return serde_json::from_str(&text).expect("frame should be JSON");
        }
    }
}

/// Connect and consume the connection acknowledgement.
async fn connect_ready(addr: SocketAddr) -> Ws {
    let mut ws = connect(addr).await;
    let ack = next_json(&mut ws).await;
    assert_eq!(ack["type"], "connection");
    ws
}

#[tokio::test]
async fn ack_is_the_first_frame_on_connect() {
    let addr = spawn_relay(QUIET_HEARTBEAT_SECS).await;
    let mut ws = connect(addr).await;

    let ack = next_json(&mut ws).await;

    assert_eq!(
        ack,
        json!({"type": "connection", "message": "Connected to server"})
    );
}

#[tokio::test]
async fn identified_client_receives_forwarded_frames_verbatim() {
    let addr = spawn_relay(QUIET_HEARTBEAT_SECS).await;

    let mut receiver = connect_ready(addr).await;
    send_json(&mut receiver, json!({"sender_id": "u1"})).await;
    tokio::time::sleep(SETTLE).await;

    let mut sender = connect_ready(addr).await;
    send_json(&mut sender, json!({"receiver_id": "u1", "text": "hi"})).await;

    let forwarded = next_json(&mut receiver).await;
    assert_eq!(forwarded, json!({"receiver_id": "u1", "text": "hi"}));
}

#[tokio::test]
async fn unknown_receiver_is_dropped_without_breaking_the_stream() {
    let addr = spawn_relay(QUIET_HEARTBEAT_SECS).await;

    let mut client = connect_ready(addr).await;
    send_json(&mut client, json!({"sender_id": "a"})).await;
    tokio::time::sleep(SETTLE).await;

    // A frame for a ghost, then one for ourselves; only the second lands
    send_json(&mut client, json!({"receiver_id": "ghost", "text": "lost"})).await;
    send_json(&mut client, json!({"receiver_id": "a", "text": "kept"})).await;

    let delivered = next_json(&mut client).await;
    assert_eq!(delivered["text"], "kept");
}

#[tokio::test]
async fn malformed_frames_are_nonfatal() {
    let addr = spawn_relay(QUIET_HEARTBEAT_SECS).await;

    let mut client = connect_ready(addr).await;
    assert_ok!(client.send(Message::Text("not json".into())).await);
    tokio::time::sleep(SETTLE).await;

    // Connection survives and still routes
    send_json(&mut client, json!({"sender_id": "a"})).await;
    tokio::time::sleep(SETTLE).await;
    send_json(&mut client, json!({"receiver_id": "a", "text": "alive"})).await;

    let delivered = next_json(&mut client).await;
    assert_eq!(delivered["text"], "alive");
}

#[tokio::test]
async fn reidentification_is_last_writer_wins() {
    let addr = spawn_relay(QUIET_HEARTBEAT_SECS).await;

    let mut first = connect_ready(addr).await;
    send_json(&mut first, json!({"sender_id": "u1"})).await;
    tokio::time::sleep(SETTLE).await;

    let mut second = connect_ready(addr).await;
    send_json(&mut second, json!({"sender_id": "u1"})).await;
    tokio::time::sleep(SETTLE).await;

    let mut sender = connect_ready(addr).await;
    send_json(&mut sender, json!({"receiver_id": "u1", "text": "hello"})).await;

    // The most recent registration receives the frame
    let delivered = next_json(&mut second).await;
    assert_eq!(delivered["text"], "hello");

    // The stale registration receives nothing
    let nothing = timeout(Duration::from_millis(300), first.next()).await;
    assert!(nothing.is_err(), "stale connection should stay silent");
}

#[tokio::test]
async fn silent_client_is_reaped_by_heartbeat() {
    let addr = spawn_relay(1).await;
    let mut ws = connect_ready(addr).await;

    // Never answer pings; the server must close us within two intervals
    let reaped = timeout(Duration::from_secs(5), async {
        loop {
            match ws.next().await {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => continue,
                Some(Err(_)) => break,
            }
        }
    })
    .await;

    assert!(reaped.is_ok(), "server never closed a silent connection");
}

#[tokio::test]
async fn pong_keeps_the_connection_alive() {
    let addr = spawn_relay(1).await;
    let mut ws = connect_ready(addr).await;

    // Answer every ping for a few heartbeat intervals
    let deadline = tokio::time::Instant::now() + Duration::from_millis(3500);
    while tokio::time::Instant::now() < deadline {
        let frame = match timeout(Duration::from_millis(500), ws.next()).await {
            Err(_) => continue, // quiet interval, still connected
            Ok(frame) => frame,
        };
        match frame {
            Some(Ok(Message::Text(text))) => {
                let value: Value = serde_json::from_str(&text).expect("frame should be JSON");
                assert_eq!(value["type"], "ping");
                send_json(&mut ws, json!({"type": "pong"})).await;
            }
            Some(Ok(Message::Close(_))) | None => {
                panic!("responsive connection was closed by heartbeat");
            }
            Some(Ok(_)) => {}
            Some(Err(e)) => panic!("websocket error: {e}"),
        }
    }
}
