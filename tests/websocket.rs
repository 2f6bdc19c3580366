// -------------------------------------------------------------------------------------------------
//  Copyright (C) 2015-2026 Nautech Systems Pty Ltd. All rights reserved.
//  https://nautechsystems.io
//
//  Licensed under the GNU Lesser General Public License Version 3.0 (the "License");
//  You may not use this file except in compliance with the License.
//  You may obtain a copy of the License at https://www.gnu.org/licenses/lgpl-3.0.en.html
//
//  Unless required by applicable law or agreed to in writing, software
//  distributed under the License is distributed on an "AS IS" BASIS,
//  WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
//  See the License for the specific language governing permissions and
//  limitations under the License.
// -------------------------------------------------------------------------------------------------

//! Integration tests for the Capital.com WebSocket client using a mock Axum server.

use std::{
    future::Future,
    net::SocketAddr,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use axum::{
    Router,
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
    routing::get,
};
use capitalcom::{
    common::{CapitalComResolution, CapitalComSessionTokens, CapitalComWsDestination},
    websocket::{CapitalComWebSocketClient, CapitalComWsError, CapitalComWsEvent},
};
use futures_util::{Stream, StreamExt, pin_mut};
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use ustr::Ustr;

// ------------------------------------------------------------------------------------------------
// Test Server State
// ------------------------------------------------------------------------------------------------

#[derive(Clone, Default)]
struct TestServerState {
    /// Total connections accepted, never decremented.
    total_connections: Arc<AtomicUsize>,
    /// Connections currently open.
    active_connections: Arc<AtomicUsize>,
    /// Every text frame received, tagged with the connection ordinal.
    frames: Arc<tokio::sync::Mutex<Vec<(usize, Value)>>>,
    /// Close each connection immediately after the upgrade completes.
    close_on_accept: Arc<AtomicBool>,
    /// Close the connection right after responding to the next request.
    drop_next_connection: Arc<AtomicBool>,
    /// Raw frames to send before the next ping acknowledgement.
    inject_on_ping: Arc<tokio::sync::Mutex<Vec<String>>>,
}

// ------------------------------------------------------------------------------------------------
// Mock WebSocket Handler
// ------------------------------------------------------------------------------------------------

async fn handle_ws_upgrade(
    ws: WebSocketUpgrade,
    State(state): State<Arc<TestServerState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<TestServerState>) {
    let connection = state.total_connections.fetch_add(1, Ordering::Relaxed) + 1;
    state.active_connections.fetch_add(1, Ordering::Relaxed);

    if state.close_on_accept.load(Ordering::Relaxed) {
        let _ = socket.send(Message::Close(None)).await;
        state.active_connections.fetch_sub(1, Ordering::Relaxed);
        return;
    }

    while let Some(message) = socket.recv().await {
        let Ok(message) = message else { break };

        match message {
            Message::Text(text) => {
                let Ok(frame) = serde_json::from_str::<Value>(&text) else {
                    continue;
                };
                state.frames.lock().await.push((connection, frame.clone()));

                if respond(&mut socket, &state, &frame).await.is_err() {
                    break;
                }

                if state.drop_next_connection.swap(false, Ordering::Relaxed) {
                    let _ = socket.send(Message::Close(None)).await;
                    break;
                }
            }
            Message::Ping(data) => {
                if socket.send(Message::Pong(data)).await.is_err() {
                    break;
                }
            }
            Message::Close(_) => break,
            _ => {}
        }
    }

    state.active_connections.fetch_sub(1, Ordering::Relaxed);
}

async fn respond(
    socket: &mut WebSocket,
    state: &TestServerState,
    frame: &Value,
) -> Result<(), axum::Error> {
    let destination = frame["destination"].as_str().unwrap_or_default();
    let correlation_id = frame["correlationId"].clone();

    match destination {
        "marketData.subscribe"
        | "marketData.unsubscribe"
        | "OHLCMarketData.subscribe"
        | "OHLCMarketData.unsubscribe" => {
            let epics = frame_epics(frame);
            let subscriptions: serde_json::Map<String, Value> = epics
                .iter()
                .map(|epic| (epic.clone(), Value::String("PROCESSED".to_string())))
                .collect();

            let response = json!({
                "status": "OK",
                "destination": destination,
                "correlationId": correlation_id,
                "payload": { "subscriptions": subscriptions }
            });
            socket
                .send(Message::Text(response.to_string().into()))
                .await?;

            // A quote follows each successful market data subscription
            if destination == "marketData.subscribe" {
                for epic in &epics {
                    socket
                        .send(Message::Text(quote_json(epic).to_string().into()))
                        .await?;
                }
            }
        }
        "ping" => {
            let injected: Vec<String> = state.inject_on_ping.lock().await.drain(..).collect();
            for raw in injected {
                socket.send(Message::Text(raw.into())).await?;
            }

            let response = json!({
                "status": "OK",
                "destination": "ping",
                "correlationId": correlation_id,
                "payload": {}
            });
            socket
                .send(Message::Text(response.to_string().into()))
                .await?;
        }
        _ => {}
    }

    Ok(())
}

fn frame_epics(frame: &Value) -> Vec<String> {
    frame["payload"]["epics"]
        .as_array()
        .map(|epics| {
            epics
                .iter()
                .filter_map(|epic| epic.as_str().map(ToString::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn quote_json(epic: &str) -> Value {
    json!({
        "status": "OK",
        "destination": "quote",
        "payload": {
            "epic": epic,
            "product": "CFD",
            "bid": 1738.55,
            "bidQty": 2.0,
            "ofr": 1738.70,
            "ofrQty": 2.0,
            "timestamp": 1653312712487_i64
        }
    })
}

async fn start_ws_server(state: Arc<TestServerState>) -> SocketAddr {
    let router = Router::new()
        .route("/connect", get(handle_ws_upgrade))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind websocket listener");
    let addr = listener.local_addr().expect("missing local addr");

    tokio::spawn(async move {
        axum::serve(listener, router)
            .await
            .expect("websocket server failed");
    });

    tokio::time::sleep(Duration::from_millis(50)).await;
    addr
}

// ------------------------------------------------------------------------------------------------
// Test Helpers
// ------------------------------------------------------------------------------------------------

fn test_tokens() -> CapitalComSessionTokens {
    CapitalComSessionTokens::with_account("test-cst", "test-security-token", "account-1")
}

fn create_test_client(addr: SocketAddr) -> CapitalComWebSocketClient {
    CapitalComWebSocketClient::new(
        Some(format!("ws://{addr}/connect")),
        test_tokens(),
        Some(50), // reconnect_delay_ms
        Some(5),  // max_reconnect_attempts
        Some(0),  // auto ping disabled
    )
}

async fn wait_until_async<F, Fut>(condition: F, timeout: Duration)
where
    F: Fn() -> Fut,
    Fut: Future<Output = bool>,
{
    let deadline = tokio::time::Instant::now() + timeout;
    loop {
        if condition().await {
            return;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "timed out waiting for condition"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

async fn next_event<S>(stream: &mut S) -> CapitalComWsEvent
where
    S: Stream<Item = CapitalComWsEvent> + Unpin,
{
    tokio::time::timeout(Duration::from_secs(5), stream.next())
        .await
        .expect("no event received")
        .expect("stream ended unexpectedly")
}

async fn ping_frame_count(state: &TestServerState) -> usize {
    state
        .frames
        .lock()
        .await
        .iter()
        .filter(|(_, frame)| frame["destination"] == "ping")
        .count()
}

// ================================================================================================
// Connection Tests
// ================================================================================================

#[tokio::test]
async fn test_websocket_connect_and_disconnect() {
    let state = Arc::new(TestServerState::default());
    let addr = start_ws_server(state.clone()).await;

    let mut client = create_test_client(addr);
    assert!(!client.is_active());

    client.connect().await.expect("connect failed");
    client.wait_until_active(5.0).await.expect("client inactive");

    wait_until_async(
        || {
            let state = state.clone();
            async move { state.active_connections.load(Ordering::Relaxed) == 1 }
        },
        Duration::from_secs(2),
    )
    .await;

    client.disconnect().await.expect("disconnect failed");
    assert!(!client.is_active());

    wait_until_async(
        || {
            let state = state.clone();
            async move { state.active_connections.load(Ordering::Relaxed) == 0 }
        },
        Duration::from_secs(2),
    )
    .await;
}

#[tokio::test]
async fn test_connect_twice_returns_error() {
    let state = Arc::new(TestServerState::default());
    let addr = start_ws_server(state.clone()).await;

    let mut client = create_test_client(addr);
    client.connect().await.expect("connect failed");
    client.wait_until_active(5.0).await.expect("client inactive");

    let result = client.connect().await;
    let error = result.expect_err("second connect should fail");
    assert!(error.to_string().contains("Already connected"));

    client.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
async fn test_wait_until_active_timeout() {
    let client = CapitalComWebSocketClient::new(
        Some("ws://127.0.0.1:9/connect".to_string()),
        test_tokens(),
        Some(50),
        Some(5),
        Some(0),
    );

    let result = client.wait_until_active(0.1).await;
    assert!(result.is_err(), "expected timeout error");
}

// ================================================================================================
// Subscription Tests
// ================================================================================================

#[tokio::test]
async fn test_subscribe_before_connect_registers_for_replay() {
    let state = Arc::new(TestServerState::default());
    let addr = start_ws_server(state.clone()).await;

    let mut client = create_test_client(addr);

    let result = client.subscribe_market_data(&["GOLD"]).await;
    let error = result.expect_err("subscribe should fail while disconnected");
    assert!(error.to_string().contains("not connected"));
    assert_eq!(client.subscription_count(), 1);

    client.connect().await.expect("connect failed");
    client.wait_until_active(5.0).await.expect("client inactive");

    // The entry registered while offline is sent once the connection is up
    wait_until_async(
        || {
            let state = state.clone();
            async move {
                state.frames.lock().await.iter().any(|(_, frame)| {
                    frame["destination"] == "marketData.subscribe"
                        && frame["payload"]["epics"] == json!(["GOLD"])
                })
            }
        },
        Duration::from_secs(2),
    )
    .await;

    client.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
async fn test_subscribe_receives_ack_and_quote() {
    let state = Arc::new(TestServerState::default());
    let addr = start_ws_server(state.clone()).await;

    let mut client = create_test_client(addr);
    client.connect().await.expect("connect failed");
    client.wait_until_active(5.0).await.expect("client inactive");

    let stream = client.stream();
    pin_mut!(stream);

    client
        .subscribe_market_data(&["GOLD"])
        .await
        .expect("subscribe failed");

    let mut saw_ack = false;
    loop {
        match next_event(&mut stream).await {
            CapitalComWsEvent::SubscriptionAck(ack) => {
                assert_eq!(ack.destination, CapitalComWsDestination::MarketDataSubscribe);
                assert_eq!(
                    ack.subscriptions
                        .get(&Ustr::from("GOLD"))
                        .map(String::as_str),
                    Some("PROCESSED")
                );
                saw_ack = true;
            }
            CapitalComWsEvent::Quote(quote) => {
                assert_eq!(quote.epic, Ustr::from("GOLD"));
                assert_eq!(quote.bid, dec!(1738.55));
                assert_eq!(quote.ofr, dec!(1738.70));
                break;
            }
            _ => {}
        }
    }
    assert!(saw_ack, "expected subscription ack before quote");

    client.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
async fn test_ohlc_subscribe_frame_shape_on_wire() {
    let state = Arc::new(TestServerState::default());
    let addr = start_ws_server(state.clone()).await;

    let mut client = create_test_client(addr);
    client.connect().await.expect("connect failed");
    client.wait_until_active(5.0).await.expect("client inactive");

    client
        .subscribe_ohlc_data(&["GOLD"], &[CapitalComResolution::Minute], None)
        .await
        .expect("subscribe failed");

    wait_until_async(
        || {
            let state = state.clone();
            async move {
                state
                    .frames
                    .lock()
                    .await
                    .iter()
                    .any(|(_, frame)| frame["destination"] == "OHLCMarketData.subscribe")
            }
        },
        Duration::from_secs(2),
    )
    .await;

    let frames = state.frames.lock().await;
    let frame = frames
        .iter()
        .find(|(_, frame)| frame["destination"] == "OHLCMarketData.subscribe")
        .map(|(_, frame)| frame.clone())
        .expect("missing subscribe frame");
    drop(frames);

    assert_eq!(frame["payload"]["epics"], json!(["GOLD"]));
    assert_eq!(frame["payload"]["resolutions"], json!(["MINUTE"]));
    assert_eq!(frame["payload"]["type"], "classic");
    assert_eq!(frame["cst"], "test-cst");
    assert_eq!(frame["securityToken"], "test-security-token");

    client.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
async fn test_unsubscribed_entries_are_not_replayed() {
    let state = Arc::new(TestServerState::default());
    let addr = start_ws_server(state.clone()).await;

    let mut client = create_test_client(addr);
    client.connect().await.expect("connect failed");
    client.wait_until_active(5.0).await.expect("client inactive");

    client
        .subscribe_market_data(&["GOLD", "SILVER"])
        .await
        .expect("subscribe failed");
    assert_eq!(client.subscription_count(), 2);

    wait_until_async(
        || {
            let state = state.clone();
            async move {
                state
                    .frames
                    .lock()
                    .await
                    .iter()
                    .any(|(_, frame)| frame["destination"] == "marketData.subscribe")
            }
        },
        Duration::from_secs(2),
    )
    .await;

    // Drop the connection right after the unsubscribe is acknowledged
    state.drop_next_connection.store(true, Ordering::Relaxed);
    client
        .unsubscribe_market_data(&["GOLD"])
        .await
        .expect("unsubscribe failed");
    assert_eq!(client.subscription_count(), 1);

    wait_until_async(
        || {
            let state = state.clone();
            async move { state.total_connections.load(Ordering::Relaxed) >= 2 }
        },
        Duration::from_secs(5),
    )
    .await;

    wait_until_async(
        || {
            let state = state.clone();
            async move {
                state.frames.lock().await.iter().any(|(connection, frame)| {
                    *connection >= 2 && frame["destination"] == "marketData.subscribe"
                })
            }
        },
        Duration::from_secs(5),
    )
    .await;

    // Only the surviving entry is replayed on the new connection
    let frames = state.frames.lock().await;
    let replayed: Vec<Value> = frames
        .iter()
        .filter(|(connection, frame)| {
            *connection >= 2 && frame["destination"] == "marketData.subscribe"
        })
        .map(|(_, frame)| frame["payload"]["epics"].clone())
        .collect();
    drop(frames);

    assert!(!replayed.is_empty());
    assert!(replayed.iter().all(|epics| *epics == json!(["SILVER"])));

    client.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
async fn test_disconnect_clears_subscription_table() {
    let state = Arc::new(TestServerState::default());
    let addr = start_ws_server(state.clone()).await;

    let mut client = create_test_client(addr);
    client.connect().await.expect("connect failed");
    client.wait_until_active(5.0).await.expect("client inactive");

    client
        .subscribe_market_data(&["GOLD"])
        .await
        .expect("subscribe failed");
    assert_eq!(client.subscription_count(), 1);

    client.disconnect().await.expect("disconnect failed");

    assert!(!client.is_active());
    assert_eq!(client.subscription_count(), 0);
}

// ================================================================================================
// Ping Tests
// ================================================================================================

#[tokio::test]
async fn test_ping_before_connect_errors() {
    let state = Arc::new(TestServerState::default());
    let addr = start_ws_server(state.clone()).await;

    let client = create_test_client(addr);

    let result = client.ping().await;
    assert!(matches!(result, Err(CapitalComWsError::NotConnected)));
}

#[tokio::test]
async fn test_ping_round_trip() {
    let state = Arc::new(TestServerState::default());
    let addr = start_ws_server(state.clone()).await;

    let mut client = create_test_client(addr);
    client.connect().await.expect("connect failed");
    client.wait_until_active(5.0).await.expect("client inactive");

    let stream = client.stream();
    pin_mut!(stream);

    client.ping().await.expect("ping failed");

    loop {
        if let CapitalComWsEvent::PingAck { correlation_id } = next_event(&mut stream).await {
            assert!(correlation_id.is_some());
            break;
        }
    }

    // The ping frame carries the envelope without a payload field
    let frames = state.frames.lock().await;
    let frame = frames
        .iter()
        .find(|(_, frame)| frame["destination"] == "ping")
        .map(|(_, frame)| frame.clone())
        .expect("missing ping frame");
    drop(frames);

    assert!(frame.get("payload").is_none());
    assert_eq!(frame["cst"], "test-cst");

    client.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
async fn test_auto_ping_sends_keep_alive() {
    let state = Arc::new(TestServerState::default());
    let addr = start_ws_server(state.clone()).await;

    let mut client = CapitalComWebSocketClient::new(
        Some(format!("ws://{addr}/connect")),
        test_tokens(),
        Some(50),
        Some(5),
        Some(100), // auto ping every 100ms
    );
    client.connect().await.expect("connect failed");
    client.wait_until_active(5.0).await.expect("client inactive");

    // No explicit ping call; the timer produces one
    wait_until_async(
        || {
            let state = state.clone();
            async move {
                state
                    .frames
                    .lock()
                    .await
                    .iter()
                    .any(|(_, frame)| frame["destination"] == "ping")
            }
        },
        Duration::from_secs(3),
    )
    .await;

    client.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
async fn test_start_and_stop_auto_ping_at_runtime() {
    let state = Arc::new(TestServerState::default());
    let addr = start_ws_server(state.clone()).await;

    // Auto ping disabled at construction
    let mut client = create_test_client(addr);
    client.connect().await.expect("connect failed");
    client.wait_until_active(5.0).await.expect("client inactive");

    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(ping_frame_count(&state).await, 0);

    client.start_auto_ping(100).await;

    wait_until_async(
        || {
            let state = state.clone();
            async move { ping_frame_count(&state).await >= 2 }
        },
        Duration::from_secs(3),
    )
    .await;

    client.stop_auto_ping().await;

    // A tick already in flight when the stop lands may still arrive
    tokio::time::sleep(Duration::from_millis(200)).await;
    let count_after_stop = ping_frame_count(&state).await;

    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(ping_frame_count(&state).await, count_after_stop);

    client.disconnect().await.expect("disconnect failed");
}

#[tokio::test]
async fn test_update_tokens_applied_to_subsequent_frames() {
    let state = Arc::new(TestServerState::default());
    let addr = start_ws_server(state.clone()).await;

    let mut client = create_test_client(addr);
    client.connect().await.expect("connect failed");
    client.wait_until_active(5.0).await.expect("client inactive");

    client.update_tokens("cst-2".to_string(), "token-2".to_string());
    client.ping().await.expect("ping failed");

    wait_until_async(
        || {
            let state = state.clone();
            async move {
                state.frames.lock().await.iter().any(|(_, frame)| {
                    frame["destination"] == "ping"
                        && frame["cst"] == "cst-2"
                        && frame["securityToken"] == "token-2"
                })
            }
        },
        Duration::from_secs(2),
    )
    .await;

    client.disconnect().await.expect("disconnect failed");
}

// ================================================================================================
// Error Handling Tests
// ================================================================================================

#[tokio::test]
async fn test_malformed_frame_emits_error_and_survives() {
    let state = Arc::new(TestServerState::default());
    state
        .inject_on_ping
        .lock()
        .await
        .push("{not json".to_string());

    let addr = start_ws_server(state.clone()).await;

    let mut client = create_test_client(addr);
    client.connect().await.expect("connect failed");
    client.wait_until_active(5.0).await.expect("client inactive");

    let stream = client.stream();
    pin_mut!(stream);

    client.ping().await.expect("ping failed");

    let mut error_count = 0;
    loop {
        match next_event(&mut stream).await {
            CapitalComWsEvent::Error(_) => error_count += 1,
            CapitalComWsEvent::PingAck { .. } => break,
            _ => {}
        }
    }
    assert_eq!(
        error_count, 1,
        "one malformed frame should produce one error event"
    );

    // The connection survives the bad frame
    assert!(client.is_active());
    client
        .subscribe_market_data(&["GOLD"])
        .await
        .expect("subscribe failed");

    loop {
        match next_event(&mut stream).await {
            CapitalComWsEvent::Quote(quote) => {
                assert_eq!(quote.epic, Ustr::from("GOLD"));
                break;
            }
            CapitalComWsEvent::Error(e) => panic!("unexpected error: {e}"),
            _ => {}
        }
    }

    assert_eq!(state.total_connections.load(Ordering::Relaxed), 1);

    client.disconnect().await.expect("disconnect failed");
}

// ================================================================================================
// Reconnection Tests
// ================================================================================================

#[tokio::test]
async fn test_reconnect_exhaustion_stops_after_max_attempts() {
    let state = Arc::new(TestServerState::default());
    state.close_on_accept.store(true, Ordering::Relaxed);

    let addr = start_ws_server(state.clone()).await;

    let mut client = create_test_client(addr);
    client.connect().await.expect("connect failed");

    let stream = client.stream();
    pin_mut!(stream);

    let mut connections = 0;
    let max = loop {
        match next_event(&mut stream).await {
            CapitalComWsEvent::Connected | CapitalComWsEvent::Reconnected => connections += 1,
            CapitalComWsEvent::Error(CapitalComWsError::MaxReconnectionAttempts(max)) => break max,
            _ => {}
        }
    };

    assert_eq!(max, 5);
    assert_eq!(connections, 5);

    // No further dial attempts once the budget is spent
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(state.total_connections.load(Ordering::Relaxed), 5);
    assert!(!client.is_active());
}
