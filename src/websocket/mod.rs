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
//! This module provides a two-layer WebSocket client architecture:
//! - Outer client: manages the subscription table and session tokens
//! - Inner handler: I/O boundary running in a dedicated Tokio task
//!
//! Features:
//! - Live quote and OHLC bar streams
//! - Session token authentication (`CST` / `X-SECURITY-TOKEN`)
//! - Automatic reconnection with subscription replay
//! - Keep-alive ping with an optional automatic schedule
//! - Message parsing and routing
//!
//! # Official documentation
//!
//! See: <https://open-api.capital.com>

pub mod client;
pub mod error;
pub mod handler;
pub mod messages;

pub use client::CapitalComWebSocketClient;
pub use error::{CapitalComWsError, CapitalComWsResult};
pub use handler::HandlerCommand;
pub use messages::{
    CapitalComOhlcBar, CapitalComQuote, CapitalComSubscription, CapitalComSubscriptionAck,
    CapitalComWsEvent,
};
