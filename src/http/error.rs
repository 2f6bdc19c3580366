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

//! Error structures and enumerations for the Capital.com HTTP integration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Represents the JSON structure of an error response returned by the Capital.com API.
///
/// The venue reports errors as a single dot-separated code, for example
/// `error.invalid.details` or `error.null-leverages`.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct CapitalComErrorResponse {
    /// Error code identifying the failure.
    #[serde(rename = "errorCode")]
    pub error_code: String,
}

/// A typed error enumeration for the Capital.com HTTP client.
#[derive(Debug, Clone, Error)]
pub enum CapitalComHttpError {
    /// Error variant when credentials are missing but the request is authenticated.
    #[error("Missing credentials for authenticated request")]
    MissingCredentials,
    /// Error variant when an authenticated request is made without an active session.
    #[error("No active session, create a session first")]
    MissingSession,
    /// The venue rejected the session tokens; the stored session has been cleared.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    /// Errors returned directly by the Capital.com API.
    #[error("Capital.com API error: {error_code}")]
    VenueError { error_code: String },
    /// Failure during JSON serialization/deserialization.
    #[error("JSON error: {0}")]
    JsonError(String),
    /// Parameter validation error.
    #[error("Parameter validation error: {0}")]
    ValidationError(String),
    /// Generic network error.
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Any unknown HTTP status or unexpected response from Capital.com.
    #[error("Unexpected HTTP status code {status}: {body}")]
    UnexpectedStatus { status: u16, body: String },
}

impl From<reqwest::Error> for CapitalComHttpError {
    fn from(error: reqwest::Error) -> Self {
        Self::NetworkError(error.to_string())
    }
}

impl From<serde_json::Error> for CapitalComHttpError {
    fn from(error: serde_json::Error) -> Self {
        Self::JsonError(error.to_string())
    }
}

impl From<String> for CapitalComHttpError {
    fn from(error: String) -> Self {
        Self::ValidationError(error)
    }
}

impl From<CapitalComErrorResponse> for CapitalComHttpError {
    fn from(error: CapitalComErrorResponse) -> Self {
        Self::VenueError {
            error_code: error.error_code,
        }
    }
}
