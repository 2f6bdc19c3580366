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

//! Capital.com API credential and session token storage.

use core::fmt::Debug;

use base64::{Engine, engine::general_purpose::STANDARD as BASE64_STANDARD};
use zeroize::ZeroizeOnDrop;

/// Login credentials for the Capital.com API.
///
/// The API key identifies the application, while the identifier (account
/// email) and password authenticate the user when creating a session.
#[derive(Clone, ZeroizeOnDrop)]
pub struct CapitalComCredential {
    api_key: Box<str>,
    identifier: Box<str>,
    password: Box<str>,
}

impl Debug for CapitalComCredential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(CapitalComCredential))
            .field("api_key", &self.masked_api_key())
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}

impl CapitalComCredential {
    /// Creates a new [`CapitalComCredential`] instance.
    #[must_use]
    pub fn new(
        api_key: impl Into<String>,
        identifier: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            api_key: api_key.into().into_boxed_str(),
            identifier: identifier.into().into_boxed_str(),
            password: password.into().into_boxed_str(),
        }
    }

    /// Returns the API key associated with this credential.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    /// Returns the account identifier (email) associated with this credential.
    #[must_use]
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Returns the account password associated with this credential.
    ///
    /// # Safety
    ///
    /// The password should be handled carefully and never logged or exposed.
    #[must_use]
    pub fn password(&self) -> &str {
        &self.password
    }

    /// Returns a masked version of the API key for logging purposes.
    ///
    /// Shows first 4 and last 4 characters with ellipsis in between.
    /// For keys shorter than 8 characters, shows asterisks only.
    #[must_use]
    pub fn masked_api_key(&self) -> String {
        let key = self.api_key.as_ref();
        let len = key.len();

        if len <= 8 {
            "*".repeat(len)
        } else {
            format!("{}...{}", &key[..4], &key[len - 4..])
        }
    }

    /// Returns the password in the venue obfuscated form for the given
    /// encryption-key timestamp.
    ///
    /// This is a reversible base64 encoding of `"<password>|<timestamp>"`,
    /// matching the venue's demo login flow. It is obfuscation, not
    /// encryption; do not rely on it for secrecy.
    #[must_use]
    pub fn obfuscated_password(&self, timestamp: i64) -> String {
        encode_password(&self.password, timestamp)
    }
}

/// Encodes a password with the venue's reversible obfuscation scheme.
#[must_use]
pub fn encode_password(password: &str, timestamp: i64) -> String {
    BASE64_STANDARD.encode(format!("{password}|{timestamp}"))
}

/// The session token pair issued by the venue on successful login.
///
/// Both values arrive in the login response headers (`CST` and
/// `X-SECURITY-TOKEN`) and must accompany every authenticated REST call and
/// every outbound streaming frame. The pair is ephemeral and never persisted.
#[derive(Clone, PartialEq, Eq)]
pub struct CapitalComSessionTokens {
    /// Client session token (`CST` header value).
    pub cst: String,
    /// Account security token (`X-SECURITY-TOKEN` header value).
    pub security_token: String,
    /// The active account for this session, when known.
    pub account_id: Option<String>,
}

impl Debug for CapitalComSessionTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(CapitalComSessionTokens))
            .field("cst", &"<redacted>")
            .field("security_token", &"<redacted>")
            .field("account_id", &self.account_id)
            .finish()
    }
}

impl CapitalComSessionTokens {
    /// Creates a new [`CapitalComSessionTokens`] instance.
    #[must_use]
    pub fn new(cst: impl Into<String>, security_token: impl Into<String>) -> Self {
        Self {
            cst: cst.into(),
            security_token: security_token.into(),
            account_id: None,
        }
    }

    /// Creates a new [`CapitalComSessionTokens`] instance with an account ID.
    #[must_use]
    pub fn with_account(
        cst: impl Into<String>,
        security_token: impl Into<String>,
        account_id: impl Into<String>,
    ) -> Self {
        Self {
            cst: cst.into(),
            security_token: security_token.into(),
            account_id: Some(account_id.into()),
        }
    }
}
