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

//! WebSocket client for the Capital.com streaming API.
//!
//! The [`CapitalComWebSocketClient`] provides real-time quote and OHLC bar
//! subscriptions. Authentication reuses the `CST` / `X-SECURITY-TOKEN` pair
//! obtained from a REST session; the pair is sent as handshake headers and
//! inside every request frame. The client keeps a table of active
//! subscriptions and replays it after each reconnect.

use std::{
    fmt::Debug,
    sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, AtomicU64, Ordering},
    },
    time::Duration,
};

use arc_swap::ArcSwap;
use dashmap::DashMap;
use futures_util::Stream;
use ustr::Ustr;

use super::{
    error::{CapitalComWsError, CapitalComWsResult},
    handler::{CapitalComWsFeedHandler, HandlerCommand},
    messages::{CapitalComSubscription, CapitalComWsEvent},
};
use crate::common::{
    consts::{DEFAULT_AUTO_PING_INTERVAL_MS, DEFAULT_MAX_RECONNECT_ATTEMPTS,
        DEFAULT_RECONNECT_DELAY_MS, get_ws_url},
    credential::CapitalComSessionTokens,
    enums::{CapitalComOhlcType, CapitalComResolution},
};

/// WebSocket client for connecting to Capital.com.
#[derive(Clone)]
pub struct CapitalComWebSocketClient {
    url: String,
    tokens: Arc<ArcSwap<CapitalComSessionTokens>>,
    reconnect_delay_ms: u64,
    max_reconnect_attempts: u32,
    auto_ping_ms: Arc<AtomicU64>,
    active: Arc<AtomicBool>,
    signal: Arc<AtomicBool>,
    subscriptions: Arc<DashMap<CapitalComSubscription, ()>>,
    reconnect_attempts: Arc<AtomicU32>,
    cmd_tx: Arc<tokio::sync::RwLock<tokio::sync::mpsc::UnboundedSender<HandlerCommand>>>,
    out_rx: Option<Arc<tokio::sync::mpsc::UnboundedReceiver<CapitalComWsEvent>>>,
    task_handle: Option<Arc<tokio::task::JoinHandle<()>>>,
}

impl Debug for CapitalComWebSocketClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(CapitalComWebSocketClient))
            .field("url", &self.url)
            .field("is_active", &self.is_active())
            .field("subscriptions", &self.subscriptions.len())
            .finish_non_exhaustive()
    }
}

impl CapitalComWebSocketClient {
    /// Creates a new [`CapitalComWebSocketClient`] instance.
    ///
    /// A `None` URL selects the live streaming endpoint. A `None` auto-ping
    /// interval enables the default 540 second keep-alive; pass `Some(0)` to
    /// disable automatic pings.
    #[must_use]
    pub fn new(
        url: Option<String>,
        tokens: CapitalComSessionTokens,
        reconnect_delay_ms: Option<u64>,
        max_reconnect_attempts: Option<u32>,
        auto_ping_interval_ms: Option<u64>,
    ) -> Self {
        Self {
            url: url.unwrap_or_else(|| get_ws_url(false).to_string()),
            tokens: Arc::new(ArcSwap::from_pointee(tokens)),
            reconnect_delay_ms: reconnect_delay_ms.unwrap_or(DEFAULT_RECONNECT_DELAY_MS),
            max_reconnect_attempts: max_reconnect_attempts
                .unwrap_or(DEFAULT_MAX_RECONNECT_ATTEMPTS),
            auto_ping_ms: Arc::new(AtomicU64::new(
                auto_ping_interval_ms.unwrap_or(DEFAULT_AUTO_PING_INTERVAL_MS),
            )),
            active: Arc::new(AtomicBool::new(false)),
            signal: Arc::new(AtomicBool::new(false)),
            subscriptions: Arc::new(DashMap::new()),
            reconnect_attempts: Arc::new(AtomicU32::new(0)),
            cmd_tx: {
                let (tx, _) = tokio::sync::mpsc::unbounded_channel();
                Arc::new(tokio::sync::RwLock::new(tx))
            },
            out_rx: None,
            task_handle: None,
        }
    }

    /// Creates a new [`CapitalComWebSocketClient`] from a client configuration.
    #[must_use]
    pub fn from_config(
        config: &crate::config::CapitalComClientConfig,
        tokens: CapitalComSessionTokens,
    ) -> Self {
        Self::new(
            Some(config.ws_url()),
            tokens,
            config.reconnect_delay_ms,
            config.max_reconnect_attempts,
            config.auto_ping_interval_ms,
        )
    }

    /// Returns the WebSocket URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns whether the connection is currently established.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst)
    }

    /// Returns the number of entries in the subscription table.
    #[must_use]
    pub fn subscription_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Returns a snapshot of the subscription table.
    #[must_use]
    pub fn subscriptions(&self) -> Vec<CapitalComSubscription> {
        self.subscriptions.iter().map(|entry| *entry.key()).collect()
    }

    /// Replaces the session token pair used for the handshake and all
    /// subsequent request frames.
    ///
    /// The active account recorded on the old pair is carried over. An
    /// established connection is not interrupted; the new pair applies from
    /// the next outbound frame or reconnect.
    pub fn update_tokens(&self, cst: String, security_token: String) {
        let account_id = self.tokens.load().account_id.clone();
        let mut tokens = CapitalComSessionTokens::new(cst, security_token);
        tokens.account_id = account_id;
        self.tokens.store(Arc::new(tokens));
        tracing::debug!("Session tokens updated");
    }

    /// Connects to the Capital.com streaming API.
    ///
    /// The connection is established by a background task; use
    /// [`wait_until_active`](Self::wait_until_active) to await readiness.
    /// Connection failures consume reconnection attempts and surface as
    /// [`CapitalComWsEvent::Error`] events on the stream.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is already connected.
    pub async fn connect(&mut self) -> CapitalComWsResult<()> {
        if self.is_active() {
            return Err(CapitalComWsError::ClientError(
                "Already connected".to_string(),
            ));
        }

        tracing::info!(url = %self.url, "Connecting to Capital.com WebSocket");
        self.signal.store(false, Ordering::Relaxed);

        let (cmd_tx, cmd_rx) = tokio::sync::mpsc::unbounded_channel();
        let (out_tx, out_rx) = tokio::sync::mpsc::unbounded_channel();
        *self.cmd_tx.write().await = cmd_tx;
        self.out_rx = Some(Arc::new(out_rx));

        let handler = CapitalComWsFeedHandler::new(
            self.url.clone(),
            self.tokens.clone(),
            self.subscriptions.clone(),
            self.active.clone(),
            self.signal.clone(),
            self.reconnect_delay_ms,
            self.max_reconnect_attempts,
            self.reconnect_attempts.clone(),
            self.auto_ping_ms.clone(),
            cmd_rx,
            out_tx,
        );

        let task_handle = tokio::spawn(handler.run());
        self.task_handle = Some(Arc::new(task_handle));

        Ok(())
    }

    /// Closes the connection and clears the subscription table.
    ///
    /// # Errors
    ///
    /// Returns an error if the close operation fails.
    pub async fn disconnect(&self) -> CapitalComWsResult<()> {
        tracing::info!("Disconnecting Capital.com WebSocket");
        self.signal.store(true, Ordering::Relaxed);
        self.subscriptions.clear();

        let _ = self.cmd_tx.read().await.send(HandlerCommand::Disconnect);

        let _ = tokio::time::timeout(Duration::from_secs(5), async {
            while self.active.load(Ordering::SeqCst) {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await;

        Ok(())
    }

    /// Waits until the connection is established or the timeout expires.
    ///
    /// # Errors
    ///
    /// Returns an error if the timeout expires before the connection is up.
    pub async fn wait_until_active(&self, timeout_secs: f64) -> CapitalComWsResult<()> {
        let timeout = Duration::from_secs_f64(timeout_secs);

        tokio::time::timeout(timeout, async {
            while !self.is_active() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .map_err(|_| {
            CapitalComWsError::Timeout(format!(
                "WebSocket connection timeout after {timeout_secs} seconds"
            ))
        })?;

        Ok(())
    }

    /// Returns the stream of events produced by the connection.
    ///
    /// # Panics
    ///
    /// Panics if called before `connect()` or if called twice.
    pub fn stream(&mut self) -> impl Stream<Item = CapitalComWsEvent> + 'static {
        let rx = self
            .out_rx
            .take()
            .expect("Event stream receiver already taken or not connected");
        let mut rx = Arc::try_unwrap(rx).expect("Cannot take ownership - other references exist");

        async_stream::stream! {
            while let Some(event) = rx.recv().await {
                yield event;
            }
        }
    }

    /// Subscribes to live quotes for the given epics.
    ///
    /// The entries are recorded in the subscription table before the request
    /// is sent, so they are replayed once a connection is established.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected; the entries stay
    /// registered for replay.
    pub async fn subscribe_market_data(&self, epics: &[&str]) -> CapitalComWsResult<()> {
        let subscriptions: Vec<CapitalComSubscription> = epics
            .iter()
            .map(|epic| CapitalComSubscription::MarketData {
                epic: Ustr::from(epic),
            })
            .collect();

        self.send_subscribe(subscriptions).await
    }

    /// Unsubscribes from live quotes for the given epics.
    ///
    /// The entries are removed from the subscription table immediately, so a
    /// later reconnect will not replay them.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected.
    pub async fn unsubscribe_market_data(&self, epics: &[&str]) -> CapitalComWsResult<()> {
        let subscriptions: Vec<CapitalComSubscription> = epics
            .iter()
            .map(|epic| CapitalComSubscription::MarketData {
                epic: Ustr::from(epic),
            })
            .collect();

        self.send_unsubscribe(subscriptions).await
    }

    /// Subscribes to OHLC bars for the given epics and resolutions.
    ///
    /// An empty resolution list subscribes at the default minute resolution.
    /// One table entry is kept per epic and resolution pair.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected; the entries stay
    /// registered for replay.
    pub async fn subscribe_ohlc_data(
        &self,
        epics: &[&str],
        resolutions: &[CapitalComResolution],
        ohlc_type: Option<CapitalComOhlcType>,
    ) -> CapitalComWsResult<()> {
        let subscriptions = ohlc_entries(epics, resolutions, ohlc_type);
        self.send_subscribe(subscriptions).await
    }

    /// Unsubscribes from OHLC bars for the given epics and resolutions.
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected.
    pub async fn unsubscribe_ohlc_data(
        &self,
        epics: &[&str],
        resolutions: &[CapitalComResolution],
        ohlc_type: Option<CapitalComOhlcType>,
    ) -> CapitalComWsResult<()> {
        let subscriptions = ohlc_entries(epics, resolutions, ohlc_type);
        self.send_unsubscribe(subscriptions).await
    }

    /// Sends a keep-alive ping; the venue answers with a
    /// [`CapitalComWsEvent::PingAck`].
    ///
    /// # Errors
    ///
    /// Returns an error if the client is not connected.
    pub async fn ping(&self) -> CapitalComWsResult<()> {
        if !self.is_active() {
            return Err(CapitalComWsError::NotConnected);
        }

        self.cmd_tx
            .read()
            .await
            .send(HandlerCommand::Ping)
            .map_err(|e| CapitalComWsError::Send(e.to_string()))
    }

    /// Enables or retimes the automatic keep-alive ping.
    ///
    /// Takes effect immediately when connected, otherwise from the next
    /// connection.
    pub async fn start_auto_ping(&self, interval_ms: u64) {
        self.auto_ping_ms.store(interval_ms, Ordering::Relaxed);
        let _ = self
            .cmd_tx
            .read()
            .await
            .send(HandlerCommand::StartAutoPing { interval_ms });
    }

    /// Disables the automatic keep-alive ping.
    pub async fn stop_auto_ping(&self) {
        self.auto_ping_ms.store(0, Ordering::Relaxed);
        let _ = self.cmd_tx.read().await.send(HandlerCommand::StopAutoPing);
    }

    async fn send_subscribe(
        &self,
        subscriptions: Vec<CapitalComSubscription>,
    ) -> CapitalComWsResult<()> {
        // Register first so the entries replay once connected
        for subscription in &subscriptions {
            self.subscriptions.insert(*subscription, ());
        }

        if !self.is_active() {
            return Err(CapitalComWsError::NotConnected);
        }

        self.cmd_tx
            .read()
            .await
            .send(HandlerCommand::Subscribe(subscriptions))
            .map_err(|e| CapitalComWsError::Send(e.to_string()))
    }

    async fn send_unsubscribe(
        &self,
        subscriptions: Vec<CapitalComSubscription>,
    ) -> CapitalComWsResult<()> {
        for subscription in &subscriptions {
            self.subscriptions.remove(subscription);
        }

        if !self.is_active() {
            return Err(CapitalComWsError::NotConnected);
        }

        self.cmd_tx
            .read()
            .await
            .send(HandlerCommand::Unsubscribe(subscriptions))
            .map_err(|e| CapitalComWsError::Send(e.to_string()))
    }
}

fn ohlc_entries(
    epics: &[&str],
    resolutions: &[CapitalComResolution],
    ohlc_type: Option<CapitalComOhlcType>,
) -> Vec<CapitalComSubscription> {
    let ohlc_type = ohlc_type.unwrap_or_default();
    let resolutions = if resolutions.is_empty() {
        vec![CapitalComResolution::default()]
    } else {
        resolutions.to_vec()
    };

    epics
        .iter()
        .flat_map(|epic| {
            resolutions
                .iter()
                .map(|resolution| CapitalComSubscription::Ohlc {
                    epic: Ustr::from(epic),
                    resolution: *resolution,
                    ohlc_type,
                })
                .collect::<Vec<_>>()
        })
        .collect()
}
