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

//! Capital.com WebSocket client error types.

use thiserror::Error;
use tokio_tungstenite::tungstenite;

/// Error types for the Capital.com WebSocket client.
#[derive(Debug, Clone, Error)]
pub enum CapitalComWsError {
    /// Client is not connected.
    #[error("WebSocket is not connected")]
    NotConnected,
    /// Transport-level error during WebSocket communication.
    #[error("Transport error: {0}")]
    Transport(String),
    /// Failed to send a message over the WebSocket.
    #[error("Send error: {0}")]
    Send(String),
    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(String),
    /// Session token pair was rejected during the handshake.
    #[error("Authentication error: {0}")]
    Authentication(String),
    /// Generic client error.
    #[error("Client error: {0}")]
    ClientError(String),
    /// Error frame returned by the venue.
    #[error("Capital.com error: {0}")]
    VenueError(String),
    /// The reconnection budget is spent; the connection stays down.
    #[error("Max reconnection attempts ({0}) exceeded")]
    MaxReconnectionAttempts(u32),
    /// Request timeout.
    #[error("Timeout: {0}")]
    Timeout(String),
}

impl From<tungstenite::Error> for CapitalComWsError {
    fn from(error: tungstenite::Error) -> Self {
        Self::Transport(error.to_string())
    }
}

impl From<serde_json::Error> for CapitalComWsError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<String> for CapitalComWsError {
    fn from(msg: String) -> Self {
        Self::ClientError(msg)
    }
}

/// Result type alias for Capital.com WebSocket operations.
pub type CapitalComWsResult<T> = Result<T, CapitalComWsError>;
