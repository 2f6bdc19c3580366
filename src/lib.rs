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

//! Client library for the [Capital.com](https://capital.com) trading API.
//!
//! [Capital.com](https://capital.com) is a regulated CFD trading platform covering shares,
//! indices, commodities, forex, and cryptocurrencies. This crate provides client bindings
//! (HTTP & WebSocket), data models, and helper utilities that wrap the official
//! Capital.com Open API.
//!
//! - [`http`]: REST client for session management, account information, dealing, market
//!   data, and watchlists.
//! - [`websocket`]: streaming client for live quotes and OHLC bars with automatic
//!   reconnection and subscription replay.
//!
//! Authentication is session based: `POST /session` exchanges the account identifier and
//! password (under an application API key) for a `CST` / `X-SECURITY-TOKEN` pair. The
//! HTTP client attaches the pair to every authenticated request, and the WebSocket
//! client embeds it in every outbound frame.
//!
//! # Documentation
//!
//! - API reference: <https://open-api.capital.com>

#![warn(rustc::all)]
#![deny(unsafe_code)]
#![deny(nonstandard_style)]
#![deny(missing_debug_implementations)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![deny(rustdoc::broken_intra_doc_links)]

pub mod common;
pub mod config;
pub mod http;
pub mod websocket;
