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

//! Core constants shared across the Capital.com client components.

pub const CAPITALCOM: &str = "CAPITALCOM";

// HTTP endpoints (versioned path prefix included)
pub const CAPITALCOM_HTTP_URL: &str = "https://api-capital.backend-capital.com/api/v1";
pub const CAPITALCOM_HTTP_DEMO_URL: &str = "https://demo-api-capital.backend-capital.com/api/v1";

// Streaming WebSocket endpoints
pub const CAPITALCOM_WS_URL: &str = "wss://api-streaming-capital.backend-capital.com/connect";
pub const CAPITALCOM_WS_DEMO_URL: &str =
    "wss://demo-api-streaming-capital.backend-capital.com/connect";

// Authentication header names
pub const HEADER_API_KEY: &str = "X-CAP-API-KEY";
pub const HEADER_CST: &str = "CST";
pub const HEADER_SECURITY_TOKEN: &str = "X-SECURITY-TOKEN";

// Environment variable names for credential fallback
pub const ENV_API_KEY: &str = "CAPITALCOM_API_KEY";
pub const ENV_IDENTIFIER: &str = "CAPITALCOM_IDENTIFIER";
pub const ENV_PASSWORD: &str = "CAPITALCOM_PASSWORD";

/// Default reconnect delay between attempts in milliseconds.
pub const DEFAULT_RECONNECT_DELAY_MS: u64 = 5_000;

/// Default maximum number of reconnection attempts before the client gives up.
pub const DEFAULT_MAX_RECONNECT_ATTEMPTS: u32 = 5;

/// Default auto-ping interval in milliseconds (the venue drops idle streams
/// after ten minutes).
pub const DEFAULT_AUTO_PING_INTERVAL_MS: u64 = 540_000;

/// Returns the HTTP base URL for the given environment.
#[must_use]
pub const fn get_http_base_url(demo: bool) -> &'static str {
    if demo {
        CAPITALCOM_HTTP_DEMO_URL
    } else {
        CAPITALCOM_HTTP_URL
    }
}

/// Returns the streaming WebSocket URL for the given environment.
#[must_use]
pub const fn get_ws_url(demo: bool) -> &'static str {
    if demo {
        CAPITALCOM_WS_DEMO_URL
    } else {
        CAPITALCOM_WS_URL
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case(false, CAPITALCOM_HTTP_URL)]
    #[case(true, CAPITALCOM_HTTP_DEMO_URL)]
    fn test_get_http_base_url(#[case] demo: bool, #[case] expected: &str) {
        assert_eq!(get_http_base_url(demo), expected);
    }

    #[rstest]
    #[case(false, CAPITALCOM_WS_URL)]
    #[case(true, CAPITALCOM_WS_DEMO_URL)]
    fn test_get_ws_url(#[case] demo: bool, #[case] expected: &str) {
        assert_eq!(get_ws_url(demo), expected);
    }

    #[rstest]
    fn test_urls_carry_versioned_path() {
        assert!(CAPITALCOM_HTTP_URL.ends_with("/api/v1"));
        assert!(CAPITALCOM_HTTP_DEMO_URL.ends_with("/api/v1"));
    }
}
