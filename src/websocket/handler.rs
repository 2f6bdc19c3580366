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

//! WebSocket feed handler for Capital.com.
//!
//! The handler runs in a dedicated Tokio task and exclusively owns the socket.
//! It drives the full connection lifecycle: the token handshake, subscription
//! replay after a reconnect, the keep-alive ping timer, and the bounded
//! fixed-delay reconnection policy. Every ended connection (the initial dial
//! included) consumes one reconnection attempt; once the budget is spent a
//! terminal error is emitted and the handler exits.

use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering},
    },
    time::Duration,
};

use arc_swap::ArcSwap;
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{
        Message,
        client::IntoClientRequest,
        http::{HeaderName, HeaderValue},
    },
};
use ustr::Ustr;

use super::{
    error::CapitalComWsError,
    messages::{
        CapitalComSubscription, CapitalComWsEvent, CapitalComWsRequest, parse_ws_message,
    },
};
use crate::common::{
    credential::CapitalComSessionTokens,
    enums::{CapitalComOhlcType, CapitalComResolution},
};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// Commands sent from the client to the handler.
#[derive(Debug, Clone)]
pub enum HandlerCommand {
    /// Send subscribe requests for the given table entries.
    Subscribe(Vec<CapitalComSubscription>),
    /// Send unsubscribe requests for the given table entries.
    Unsubscribe(Vec<CapitalComSubscription>),
    /// Send a single keep-alive ping.
    Ping,
    /// Enable or retime the automatic keep-alive ping.
    StartAutoPing {
        /// Ping period in milliseconds.
        interval_ms: u64,
    },
    /// Disable the automatic keep-alive ping.
    StopAutoPing,
    /// Close the connection and stop the handler.
    Disconnect,
}

/// Outcome of driving one established connection.
enum DriveOutcome {
    /// Deliberate shutdown, the handler exits without reconnecting.
    Stop,
    /// The connection ended unexpectedly.
    ConnectionLost,
}

/// Capital.com WebSocket feed handler.
#[allow(missing_debug_implementations)]
pub struct CapitalComWsFeedHandler {
    url: String,
    tokens: Arc<ArcSwap<CapitalComSessionTokens>>,
    subscriptions: Arc<DashMap<CapitalComSubscription, ()>>,
    active: Arc<AtomicBool>,
    signal: Arc<AtomicBool>,
    reconnect_delay_ms: u64,
    max_reconnect_attempts: u32,
    reconnect_attempts: Arc<AtomicU32>,
    auto_ping_ms: Arc<AtomicU64>,
    correlation_counter: u64,
    cmd_rx: tokio::sync::mpsc::UnboundedReceiver<HandlerCommand>,
    out_tx: tokio::sync::mpsc::UnboundedSender<CapitalComWsEvent>,
}

impl CapitalComWsFeedHandler {
    /// Creates a new feed handler.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        url: String,
        tokens: Arc<ArcSwap<CapitalComSessionTokens>>,
        subscriptions: Arc<DashMap<CapitalComSubscription, ()>>,
        active: Arc<AtomicBool>,
        signal: Arc<AtomicBool>,
        reconnect_delay_ms: u64,
        max_reconnect_attempts: u32,
        reconnect_attempts: Arc<AtomicU32>,
        auto_ping_ms: Arc<AtomicU64>,
        cmd_rx: tokio::sync::mpsc::UnboundedReceiver<HandlerCommand>,
        out_tx: tokio::sync::mpsc::UnboundedSender<CapitalComWsEvent>,
    ) -> Self {
        Self {
            url,
            tokens,
            subscriptions,
            active,
            signal,
            reconnect_delay_ms,
            max_reconnect_attempts,
            reconnect_attempts,
            auto_ping_ms,
            correlation_counter: 0,
            cmd_rx,
            out_tx,
        }
    }

    /// Runs the connection lifecycle until shutdown or reconnect exhaustion.
    pub async fn run(mut self) {
        let mut connected_before = false;

        loop {
            if self.signal.load(Ordering::Relaxed) {
                break;
            }

            match self.dial().await {
                Ok(mut ws) => {
                    tracing::info!(url = %self.url, "WebSocket connected");
                    self.active.store(true, Ordering::SeqCst);
                    if connected_before {
                        self.emit(CapitalComWsEvent::Reconnected);
                    } else {
                        connected_before = true;
                        self.emit(CapitalComWsEvent::Connected);
                    }

                    let outcome = match self.replay_subscriptions(&mut ws).await {
                        Ok(()) => self.drive(&mut ws).await,
                        Err(e) => {
                            self.emit(CapitalComWsEvent::Error(e));
                            DriveOutcome::ConnectionLost
                        }
                    };

                    self.active.store(false, Ordering::SeqCst);
                    self.emit(CapitalComWsEvent::Disconnected);

                    if matches!(outcome, DriveOutcome::Stop) {
                        break;
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "WebSocket connection failed");
                    self.emit(CapitalComWsEvent::Error(e));
                }
            }

            let attempts = self.reconnect_attempts.fetch_add(1, Ordering::SeqCst) + 1;
            if attempts >= self.max_reconnect_attempts {
                tracing::error!(
                    attempts,
                    max_attempts = self.max_reconnect_attempts,
                    "Max reconnection attempts exceeded"
                );
                self.emit(CapitalComWsEvent::Error(
                    CapitalComWsError::MaxReconnectionAttempts(self.max_reconnect_attempts),
                ));
                break;
            }

            tracing::warn!(
                attempts,
                max_attempts = self.max_reconnect_attempts,
                delay_ms = self.reconnect_delay_ms,
                "Connection ended, reconnecting after delay"
            );
            if self.wait_reconnect_delay().await {
                break;
            }
        }

        self.active.store(false, Ordering::SeqCst);
        tracing::debug!("Feed handler stopped");
    }

    /// Opens the socket, passing the session token pair as handshake headers.
    async fn dial(&self) -> Result<WsStream, CapitalComWsError> {
        let tokens = self.tokens.load();
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| CapitalComWsError::Transport(e.to_string()))?;

        let cst = HeaderValue::from_str(&tokens.cst)
            .map_err(|e| CapitalComWsError::Authentication(format!("Invalid CST token: {e}")))?;
        let security_token = HeaderValue::from_str(&tokens.security_token).map_err(|e| {
            CapitalComWsError::Authentication(format!("Invalid security token: {e}"))
        })?;

        // Header names must be lowercase for from_static
        let headers = request.headers_mut();
        headers.insert(HeaderName::from_static("cst"), cst);
        headers.insert(HeaderName::from_static("x-security-token"), security_token);

        let (ws, _response) = connect_async(request)
            .await
            .map_err(|e| CapitalComWsError::Transport(e.to_string()))?;

        Ok(ws)
    }

    /// Processes commands, inbound frames, and the ping timer for one connection.
    async fn drive(&mut self, ws: &mut WsStream) -> DriveOutcome {
        let mut ping_timer = self.make_ping_timer();

        loop {
            tokio::select! {
                cmd = self.cmd_rx.recv() => {
                    let Some(cmd) = cmd else {
                        let _ = ws.close(None).await;
                        return DriveOutcome::Stop;
                    };
                    match cmd {
                        HandlerCommand::Subscribe(subscriptions) => {
                            if let Err(e) = self.send_subscribe_frames(ws, &subscriptions).await {
                                self.emit(CapitalComWsEvent::Error(e));
                                return DriveOutcome::ConnectionLost;
                            }
                        }
                        HandlerCommand::Unsubscribe(subscriptions) => {
                            if let Err(e) = self.send_unsubscribe_frames(ws, &subscriptions).await {
                                self.emit(CapitalComWsEvent::Error(e));
                                return DriveOutcome::ConnectionLost;
                            }
                        }
                        HandlerCommand::Ping => {
                            if let Err(e) = self.send_ping(ws).await {
                                self.emit(CapitalComWsEvent::Error(e));
                                return DriveOutcome::ConnectionLost;
                            }
                        }
                        HandlerCommand::StartAutoPing { interval_ms } => {
                            self.auto_ping_ms.store(interval_ms, Ordering::Relaxed);
                            ping_timer = self.make_ping_timer();
                        }
                        HandlerCommand::StopAutoPing => {
                            self.auto_ping_ms.store(0, Ordering::Relaxed);
                            ping_timer = None;
                        }
                        HandlerCommand::Disconnect => {
                            tracing::debug!("Disconnecting WebSocket");
                            let _ = ws.close(None).await;
                            return DriveOutcome::Stop;
                        }
                    }
                }
                message = ws.next() => {
                    match message {
                        Some(Ok(Message::Text(text))) => self.handle_text(text.as_str()),
                        Some(Ok(Message::Ping(data))) => {
                            if let Err(e) = ws.send(Message::Pong(data)).await {
                                tracing::warn!(error = %e, "Failed to send pong");
                                return DriveOutcome::ConnectionLost;
                            }
                        }
                        Some(Ok(Message::Close(frame))) => {
                            tracing::info!(?frame, "Received close frame");
                            return DriveOutcome::ConnectionLost;
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            self.emit(CapitalComWsEvent::Error(CapitalComWsError::Transport(
                                e.to_string(),
                            )));
                            return DriveOutcome::ConnectionLost;
                        }
                        None => {
                            tracing::info!("WebSocket stream ended");
                            return DriveOutcome::ConnectionLost;
                        }
                    }
                }
                () = tick(&mut ping_timer) => {
                    if let Err(e) = self.send_ping(ws).await {
                        self.emit(CapitalComWsEvent::Error(e));
                        return DriveOutcome::ConnectionLost;
                    }
                }
            }
        }
    }

    /// Waits out the reconnect delay, still honoring a disconnect request.
    ///
    /// Returns `true` if shutdown was requested during the delay.
    async fn wait_reconnect_delay(&mut self) -> bool {
        let delay = tokio::time::sleep(Duration::from_millis(self.reconnect_delay_ms));
        tokio::pin!(delay);

        loop {
            tokio::select! {
                () = &mut delay => return false,
                cmd = self.cmd_rx.recv() => match cmd {
                    Some(HandlerCommand::Disconnect) | None => return true,
                    Some(HandlerCommand::StartAutoPing { interval_ms }) => {
                        self.auto_ping_ms.store(interval_ms, Ordering::Relaxed);
                    }
                    Some(HandlerCommand::StopAutoPing) => {
                        self.auto_ping_ms.store(0, Ordering::Relaxed);
                    }
                    // Offline; the subscription table replays on reconnect
                    Some(_) => {}
                },
            }
        }
    }

    fn make_ping_timer(&self) -> Option<tokio::time::Interval> {
        let interval_ms = self.auto_ping_ms.load(Ordering::Relaxed);
        if interval_ms == 0 {
            return None;
        }
        let period = Duration::from_millis(interval_ms);
        Some(tokio::time::interval_at(
            tokio::time::Instant::now() + period,
            period,
        ))
    }

    fn handle_text(&mut self, text: &str) {
        match parse_ws_message(text) {
            Ok(event) => {
                if let CapitalComWsEvent::Error(ref e) = event {
                    tracing::warn!(error = %e, "Venue reported error");
                }
                self.emit(event);
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to parse message");
                self.emit(CapitalComWsEvent::Error(e));
            }
        }
    }

    /// Re-sends subscribe requests for every entry in the table.
    async fn replay_subscriptions(&mut self, ws: &mut WsStream) -> Result<(), CapitalComWsError> {
        let entries: Vec<CapitalComSubscription> =
            self.subscriptions.iter().map(|entry| *entry.key()).collect();
        if entries.is_empty() {
            return Ok(());
        }

        tracing::info!(count = entries.len(), "Replaying subscriptions");
        self.send_subscribe_frames(ws, &entries).await
    }

    async fn send_subscribe_frames(
        &mut self,
        ws: &mut WsStream,
        subscriptions: &[CapitalComSubscription],
    ) -> Result<(), CapitalComWsError> {
        for text in self.subscribe_frames(subscriptions)? {
            self.send_text(ws, text).await?;
        }
        Ok(())
    }

    async fn send_unsubscribe_frames(
        &mut self,
        ws: &mut WsStream,
        subscriptions: &[CapitalComSubscription],
    ) -> Result<(), CapitalComWsError> {
        for text in self.unsubscribe_frames(subscriptions)? {
            self.send_text(ws, text).await?;
        }
        Ok(())
    }

    async fn send_ping(&mut self, ws: &mut WsStream) -> Result<(), CapitalComWsError> {
        let tokens = self.tokens.load();
        let request = CapitalComWsRequest::ping(self.next_correlation_id(), &tokens);
        self.send_text(ws, request.to_text()?).await
    }

    async fn send_text(&self, ws: &mut WsStream, text: String) -> Result<(), CapitalComWsError> {
        ws.send(Message::Text(text.into()))
            .await
            .map_err(|e| CapitalComWsError::Send(e.to_string()))
    }

    /// Builds subscribe frames, one per destination group, with fresh
    /// correlation IDs and the current token pair.
    fn subscribe_frames(
        &mut self,
        subscriptions: &[CapitalComSubscription],
    ) -> Result<Vec<String>, CapitalComWsError> {
        let grouped = group_subscriptions(subscriptions);
        let tokens = self.tokens.load();
        let mut frames = Vec::new();

        if !grouped.market_data.is_empty() {
            let request = CapitalComWsRequest::market_data_subscribe(
                grouped.market_data,
                next_correlation_id(&mut self.correlation_counter),
                &tokens,
            );
            frames.push(request.to_text()?);
        }

        for ((resolution, ohlc_type), epics) in grouped.ohlc {
            let request = CapitalComWsRequest::ohlc_subscribe(
                epics,
                vec![resolution],
                ohlc_type,
                next_correlation_id(&mut self.correlation_counter),
                &tokens,
            );
            frames.push(request.to_text()?);
        }

        Ok(frames)
    }

    fn unsubscribe_frames(
        &mut self,
        subscriptions: &[CapitalComSubscription],
    ) -> Result<Vec<String>, CapitalComWsError> {
        let grouped = group_subscriptions(subscriptions);
        let tokens = self.tokens.load();
        let mut frames = Vec::new();

        if !grouped.market_data.is_empty() {
            let request = CapitalComWsRequest::market_data_unsubscribe(
                grouped.market_data,
                next_correlation_id(&mut self.correlation_counter),
                &tokens,
            );
            frames.push(request.to_text()?);
        }

        for ((resolution, ohlc_type), epics) in grouped.ohlc {
            let request = CapitalComWsRequest::ohlc_unsubscribe(
                epics,
                vec![resolution],
                vec![ohlc_type],
                next_correlation_id(&mut self.correlation_counter),
                &tokens,
            );
            frames.push(request.to_text()?);
        }

        Ok(frames)
    }

    fn next_correlation_id(&mut self) -> String {
        next_correlation_id(&mut self.correlation_counter)
    }

    fn emit(&self, event: CapitalComWsEvent) {
        if self.out_tx.send(event).is_err() {
            tracing::debug!("Event receiver dropped");
        }
    }
}

fn next_correlation_id(counter: &mut u64) -> String {
    *counter += 1;
    counter.to_string()
}

async fn tick(timer: &mut Option<tokio::time::Interval>) {
    match timer {
        Some(timer) => {
            timer.tick().await;
        }
        None => std::future::pending::<()>().await,
    }
}

/// Subscription entries grouped per outbound frame.
struct GroupedSubscriptions {
    market_data: Vec<Ustr>,
    ohlc: Vec<((CapitalComResolution, CapitalComOhlcType), Vec<Ustr>)>,
}

fn group_subscriptions(subscriptions: &[CapitalComSubscription]) -> GroupedSubscriptions {
    let mut market_data: Vec<Ustr> = Vec::new();
    let mut ohlc_groups: HashMap<(CapitalComResolution, CapitalComOhlcType), Vec<Ustr>> =
        HashMap::new();

    for subscription in subscriptions {
        match subscription {
            CapitalComSubscription::MarketData { epic } => market_data.push(*epic),
            CapitalComSubscription::Ohlc {
                epic,
                resolution,
                ohlc_type,
            } => ohlc_groups
                .entry((*resolution, *ohlc_type))
                .or_default()
                .push(*epic),
        }
    }

    market_data.sort_by(|a, b| a.as_str().cmp(b.as_str()));
    market_data.dedup();

    let mut ohlc: Vec<_> = ohlc_groups.into_iter().collect();
    for (_, epics) in &mut ohlc {
        epics.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        epics.dedup();
    }
    ohlc.sort_by(|a, b| {
        (a.0.0.as_ref(), a.0.1.as_ref()).cmp(&(b.0.0.as_ref(), b.0.1.as_ref()))
    });

    GroupedSubscriptions { market_data, ohlc }
}
