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

//! Configuration structures for the Capital.com clients.

use crate::common::consts::{
    DEFAULT_AUTO_PING_INTERVAL_MS, DEFAULT_MAX_RECONNECT_ATTEMPTS, DEFAULT_RECONNECT_DELAY_MS,
    get_http_base_url, get_ws_url,
};

/// Configuration for the Capital.com HTTP and WebSocket clients.
#[derive(Clone)]
pub struct CapitalComClientConfig {
    /// Optional API key for authenticated requests.
    pub api_key: Option<String>,
    /// Optional account identifier (login email) for session creation.
    pub identifier: Option<String>,
    /// Optional account password for session creation.
    pub password: Option<String>,
    /// Use the demo environment (default: false).
    pub demo: bool,
    /// Optional override for the REST base URL.
    pub base_url_http: Option<String>,
    /// Optional override for the streaming WebSocket URL.
    pub base_url_ws: Option<String>,
    /// Optional REST timeout in seconds.
    pub http_timeout_secs: Option<u64>,
    /// Delay between WebSocket reconnection attempts in milliseconds.
    pub reconnect_delay_ms: Option<u64>,
    /// Maximum WebSocket reconnection attempts before giving up.
    pub max_reconnect_attempts: Option<u32>,
    /// Interval for the WebSocket keep-alive ping in milliseconds.
    pub auto_ping_interval_ms: Option<u64>,
}

impl std::fmt::Debug for CapitalComClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(CapitalComClientConfig))
            .field("api_key", &self.api_key.as_deref().map(|_| "<redacted>"))
            .field("identifier", &self.identifier)
            .field("password", &self.password.as_deref().map(|_| "<redacted>"))
            .field("demo", &self.demo)
            .field("base_url_http", &self.base_url_http)
            .field("base_url_ws", &self.base_url_ws)
            .field("http_timeout_secs", &self.http_timeout_secs)
            .field("reconnect_delay_ms", &self.reconnect_delay_ms)
            .field("max_reconnect_attempts", &self.max_reconnect_attempts)
            .field("auto_ping_interval_ms", &self.auto_ping_interval_ms)
            .finish()
    }
}

impl Default for CapitalComClientConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            identifier: None,
            password: None,
            demo: false,
            base_url_http: None,
            base_url_ws: None,
            http_timeout_secs: Some(60),
            reconnect_delay_ms: Some(DEFAULT_RECONNECT_DELAY_MS),
            max_reconnect_attempts: Some(DEFAULT_MAX_RECONNECT_ATTEMPTS),
            auto_ping_interval_ms: Some(DEFAULT_AUTO_PING_INTERVAL_MS),
        }
    }
}

impl CapitalComClientConfig {
    /// Creates a configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if API key, identifier, and password are all available.
    #[must_use]
    pub fn has_api_credentials(&self) -> bool {
        self.api_key.is_some() && self.identifier.is_some() && self.password.is_some()
    }

    /// Returns the REST base URL, considering overrides and environment.
    #[must_use]
    pub fn http_base_url(&self) -> String {
        self.base_url_http
            .clone()
            .unwrap_or_else(|| get_http_base_url(self.demo).to_string())
    }

    /// Returns the streaming WebSocket URL, considering overrides and environment.
    #[must_use]
    pub fn ws_url(&self) -> String {
        self.base_url_ws
            .clone()
            .unwrap_or_else(|| get_ws_url(self.demo).to_string())
    }
}
