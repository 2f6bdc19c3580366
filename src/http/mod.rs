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

//! HTTP/REST client implementation for the Capital.com API.
//!
//! This module provides an HTTP client for the Capital.com REST endpoints, including:
//!
//! - Session management (login, account switching, logout, keep-alive pings).
//! - Account information (balances, preferences, activity and transaction history).
//! - Dealing (positions, working orders, deal confirmations).
//! - Market data queries (market search and details, historical prices, client sentiment).
//! - Watchlist management.
//!
//! Authentication uses the `X-CAP-API-KEY` header plus a `CST` / `X-SECURITY-TOKEN`
//! pair issued in the `POST /session` response headers.
//!
//! # Official documentation
//!
//! See: <https://open-api.capital.com>

pub mod client;
pub mod error;
pub mod models;
pub mod query;

pub use client::CapitalComHttpClient;
pub use error::CapitalComHttpError;
