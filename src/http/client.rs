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

//! Provides the HTTP client integration for the Capital.com REST API.

use std::{fmt::Debug, sync::Arc, time::Duration};

use arc_swap::ArcSwapOption;
use reqwest::Method;
use rust_decimal::Decimal;
use serde::{Serialize, de::DeserializeOwned};

use super::{
    error::{CapitalComErrorResponse, CapitalComHttpError},
    models::{
        CapitalComAccountPreferences, CapitalComAccountsResponse, CapitalComActivityHistory,
        CapitalComClientSentiment, CapitalComClientSentimentsResponse,
        CapitalComCreateSessionRequest, CapitalComCreateSessionResponse,
        CapitalComCreateWatchlistResponse, CapitalComDealConfirmation, CapitalComDealReference,
        CapitalComEncryptionKey, CapitalComLogoutResponse, CapitalComMarketDetails,
        CapitalComMarketNavigationResponse, CapitalComMarketsResponse, CapitalComPingResponse,
        CapitalComPositionWithMarket, CapitalComPositionsResponse,
        CapitalComPreferencesUpdateResponse, CapitalComPricesResponse, CapitalComServerTime,
        CapitalComSessionDetails, CapitalComSwitchAccountRequest, CapitalComSwitchAccountResponse,
        CapitalComTopUpRequest, CapitalComTopUpResponse, CapitalComTransactionHistory,
        CapitalComWatchlistActionResponse, CapitalComWatchlistDetails,
        CapitalComWatchlistsResponse, CapitalComWorkingOrdersResponse,
    },
    query::{
        CreatePositionRequest, CreateWatchlistRequest, CreateWorkingOrderRequest,
        GetActivityHistoryParams, GetPricesParams, GetTransactionHistoryParams, MarketSearchParams,
        UpdateAccountPreferencesRequest, UpdatePositionRequest, UpdateWorkingOrderRequest,
    },
};
use crate::{
    common::{
        consts::{
            ENV_API_KEY, ENV_IDENTIFIER, ENV_PASSWORD, HEADER_API_KEY, HEADER_CST,
            HEADER_SECURITY_TOKEN, get_http_base_url, get_ws_url,
        },
        credential::{CapitalComCredential, CapitalComSessionTokens},
    },
    websocket::CapitalComWebSocketClient,
};

/// HTTP client for the Capital.com REST API.
///
/// The client holds the API key credential and, once a session has been
/// created, the `CST` / `X-SECURITY-TOKEN` pair returned by the venue in the
/// login response headers. The pair is attached to every authenticated
/// request; any 401 response clears it so the caller must authenticate again
/// explicitly. Clones share the session state.
#[derive(Clone)]
pub struct CapitalComHttpClient {
    base_url: String,
    ws_url: String,
    client: reqwest::Client,
    credential: Option<CapitalComCredential>,
    session: Arc<ArcSwapOption<CapitalComSessionTokens>>,
    reconnect_delay_ms: Option<u64>,
    max_reconnect_attempts: Option<u32>,
    auto_ping_interval_ms: Option<u64>,
}

impl Default for CapitalComHttpClient {
    fn default() -> Self {
        Self::new(None, false, Some(60)).expect("Failed to create default CapitalComHttpClient")
    }
}

impl Debug for CapitalComHttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct(stringify!(CapitalComHttpClient))
            .field("base_url", &self.base_url)
            .field("has_credentials", &self.credential.is_some())
            .field("has_session", &self.session.load().is_some())
            .finish()
    }
}

impl CapitalComHttpClient {
    /// Creates a new [`CapitalComHttpClient`] without credentials.
    ///
    /// Only the public endpoints (`GET /time`) are usable without an API key.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new(
        base_url: Option<String>,
        demo: bool,
        timeout_secs: Option<u64>,
    ) -> Result<Self, CapitalComHttpError> {
        Ok(Self {
            base_url: base_url.unwrap_or_else(|| get_http_base_url(demo).to_string()),
            ws_url: get_ws_url(demo).to_string(),
            client: Self::build_client(timeout_secs)?,
            credential: None,
            session: Arc::new(ArcSwapOption::empty()),
            reconnect_delay_ms: None,
            max_reconnect_attempts: None,
            auto_ping_interval_ms: None,
        })
    }

    /// Creates a new [`CapitalComHttpClient`] with explicit credentials.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn with_credentials(
        api_key: String,
        identifier: String,
        password: String,
        base_url: Option<String>,
        demo: bool,
        timeout_secs: Option<u64>,
    ) -> Result<Self, CapitalComHttpError> {
        Ok(Self {
            base_url: base_url.unwrap_or_else(|| get_http_base_url(demo).to_string()),
            ws_url: get_ws_url(demo).to_string(),
            client: Self::build_client(timeout_secs)?,
            credential: Some(CapitalComCredential::new(api_key, identifier, password)),
            session: Arc::new(ArcSwapOption::empty()),
            reconnect_delay_ms: None,
            max_reconnect_attempts: None,
            auto_ping_interval_ms: None,
        })
    }

    /// Creates a new [`CapitalComHttpClient`] with credentials from environment variables.
    ///
    /// Missing values are loaded from `CAPITALCOM_API_KEY`, `CAPITALCOM_IDENTIFIER`,
    /// and `CAPITALCOM_PASSWORD`. When no complete credential set can be resolved
    /// an unauthenticated client is returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn new_with_env(
        api_key: Option<String>,
        identifier: Option<String>,
        password: Option<String>,
        demo: bool,
        timeout_secs: Option<u64>,
    ) -> Result<Self, CapitalComHttpError> {
        let api_key = api_key.or_else(|| std::env::var(ENV_API_KEY).ok());
        let identifier = identifier.or_else(|| std::env::var(ENV_IDENTIFIER).ok());
        let password = password.or_else(|| std::env::var(ENV_PASSWORD).ok());

        if let (Some(key), Some(identifier), Some(password)) = (api_key, identifier, password) {
            Self::with_credentials(key, identifier, password, None, demo, timeout_secs)
        } else {
            Self::new(None, demo, timeout_secs)
        }
    }

    /// Creates a new [`CapitalComHttpClient`] from a client configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be created.
    pub fn from_config(
        config: &crate::config::CapitalComClientConfig,
    ) -> Result<Self, CapitalComHttpError> {
        let credential = match (&config.api_key, &config.identifier, &config.password) {
            (Some(key), Some(identifier), Some(password)) => Some(CapitalComCredential::new(
                key.clone(),
                identifier.clone(),
                password.clone(),
            )),
            _ => None,
        };

        Ok(Self {
            base_url: config.http_base_url(),
            ws_url: config.ws_url(),
            client: Self::build_client(config.http_timeout_secs)?,
            credential,
            session: Arc::new(ArcSwapOption::empty()),
            reconnect_delay_ms: config.reconnect_delay_ms,
            max_reconnect_attempts: config.max_reconnect_attempts,
            auto_ping_interval_ms: config.auto_ping_interval_ms,
        })
    }

    fn build_client(timeout_secs: Option<u64>) -> Result<reqwest::Client, CapitalComHttpError> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs.unwrap_or(60)))
            .build()
            .map_err(|e| {
                CapitalComHttpError::NetworkError(format!("Failed to create HTTP client: {e}"))
            })
    }

    /// Returns the base URL for this client.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns `true` if an active session is held.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.load().is_some()
    }

    /// Returns a copy of the current session tokens, if any.
    #[must_use]
    pub fn session_tokens(&self) -> Option<CapitalComSessionTokens> {
        self.session.load().as_deref().cloned()
    }

    /// Returns the active account ID recorded for the current session, if any.
    #[must_use]
    pub fn active_account_id(&self) -> Option<String> {
        self.session
            .load()
            .as_deref()
            .and_then(|tokens| tokens.account_id.clone())
    }

    /// Builds a streaming client carrying the current session tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if no active session is held.
    pub fn streaming_client(&self) -> Result<CapitalComWebSocketClient, CapitalComHttpError> {
        let tokens = self
            .session_tokens()
            .ok_or(CapitalComHttpError::MissingSession)?;

        Ok(CapitalComWebSocketClient::new(
            Some(self.ws_url.clone()),
            tokens,
            self.reconnect_delay_ms,
            self.max_reconnect_attempts,
            self.auto_ping_interval_ms,
        ))
    }

    async fn send_request<T: DeserializeOwned, P: Serialize>(
        &self,
        method: Method,
        endpoint: &str,
        params: Option<&P>,
        body: Option<Vec<u8>>,
        authenticate: bool,
    ) -> Result<T, CapitalComHttpError> {
        let url = format!("{}{endpoint}", self.base_url);

        let query = params
            .map(serde_urlencoded::to_string)
            .transpose()
            .map_err(|e| {
                CapitalComHttpError::JsonError(format!("Failed to serialize params: {e}"))
            })?;
        let full_url = match query {
            Some(ref query) if !query.is_empty() => format!("{url}?{query}"),
            _ => url,
        };

        tracing::debug!(method = %method, endpoint = %endpoint, "Sending request");

        let mut request = self.client.request(method, full_url);

        if let Some(credential) = &self.credential {
            request = request.header(HEADER_API_KEY, credential.api_key());
        }

        if authenticate {
            let guard = self.session.load();
            let tokens = guard.as_deref().ok_or(CapitalComHttpError::MissingSession)?;
            request = request
                .header(HEADER_CST, tokens.cst.as_str())
                .header(HEADER_SECURITY_TOKEN, tokens.security_token.as_str());
        }

        if let Some(body) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, "application/json")
                .body(body);
        }

        let response = request
            .send()
            .await
            .map_err(|e| CapitalComHttpError::NetworkError(e.to_string()))?;

        let status = response.status();
        let response_body = response
            .text()
            .await
            .map_err(|e| CapitalComHttpError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(self.map_error_response(endpoint, status.as_u16(), response_body));
        }

        serde_json::from_str(&response_body).map_err(|e| {
            CapitalComHttpError::JsonError(format!(
                "Failed to deserialize response: {e}\nBody: {response_body}"
            ))
        })
    }

    /// Maps a non-2xx response to a typed error, clearing the session on 401.
    fn map_error_response(
        &self,
        endpoint: &str,
        status: u16,
        body: String,
    ) -> CapitalComHttpError {
        let error_code = serde_json::from_str::<CapitalComErrorResponse>(&body)
            .ok()
            .map(|e| e.error_code);

        if status == 401 {
            self.session.store(None);
            tracing::warn!(
                endpoint = %endpoint,
                error_code = ?error_code,
                "Unauthorized response, session cleared"
            );
            return CapitalComHttpError::Unauthorized(error_code.unwrap_or(body));
        }

        match error_code {
            Some(error_code) => {
                tracing::warn!(
                    endpoint = %endpoint,
                    status = status,
                    error_code = %error_code,
                    "Capital.com error response"
                );
                CapitalComHttpError::VenueError { error_code }
            }
            None => CapitalComHttpError::UnexpectedStatus { status, body },
        }
    }

    /// Fetches the server time.
    ///
    /// # Endpoint
    /// `GET /time`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn get_server_time(&self) -> Result<CapitalComServerTime, CapitalComHttpError> {
        self.send_request::<CapitalComServerTime, ()>(Method::GET, "/time", None, None, false)
            .await
    }

    /// Pings the service to keep the session alive.
    ///
    /// # Endpoint
    /// `GET /ping`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn ping(&self) -> Result<CapitalComPingResponse, CapitalComHttpError> {
        self.send_request::<CapitalComPingResponse, ()>(Method::GET, "/ping", None, None, true)
            .await
    }

    /// Fetches the password encryption key and its timestamp.
    ///
    /// # Endpoint
    /// `GET /session/encryptionKey`
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response cannot be parsed.
    pub async fn get_encryption_key(
        &self,
    ) -> Result<CapitalComEncryptionKey, CapitalComHttpError> {
        self.send_request::<CapitalComEncryptionKey, ()>(
            Method::GET,
            "/session/encryptionKey",
            None,
            None,
            false,
        )
        .await
    }

    /// Creates a trading session, storing the token pair from the response headers.
    ///
    /// The password is sent in plain form over TLS.
    ///
    /// # Endpoint
    /// `POST /session`
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing, the login is rejected, or
    /// the response is missing the session token headers.
    pub async fn create_session(
        &self,
    ) -> Result<CapitalComCreateSessionResponse, CapitalComHttpError> {
        let credential = self
            .credential
            .as_ref()
            .ok_or(CapitalComHttpError::MissingCredentials)?;

        let request = CapitalComCreateSessionRequest {
            identifier: credential.identifier().to_string(),
            password: credential.password().to_string(),
            encrypted_password: None,
        };

        self.login(&request).await
    }

    /// Creates a trading session using the obfuscated password form.
    ///
    /// Fetches the encryption key timestamp and sends
    /// `base64("<password>|<timestamp>")` with `encryptedPassword: true`. This
    /// mirrors the venue login flow but remains reversible obfuscation rather
    /// than real encryption; it adds no secrecy over the plain variant.
    ///
    /// # Endpoint
    /// `GET /session/encryptionKey` + `POST /session`
    ///
    /// # Errors
    ///
    /// Returns an error if credentials are missing, the login is rejected, or
    /// the response is missing the session token headers.
    pub async fn create_session_encrypted(
        &self,
    ) -> Result<CapitalComCreateSessionResponse, CapitalComHttpError> {
        let credential = self
            .credential
            .as_ref()
            .ok_or(CapitalComHttpError::MissingCredentials)?;

        let encryption_key = self.get_encryption_key().await?;
        let request = CapitalComCreateSessionRequest {
            identifier: credential.identifier().to_string(),
            password: credential.obfuscated_password(encryption_key.time_stamp),
            encrypted_password: Some(true),
        };

        self.login(&request).await
    }

    async fn login(
        &self,
        request: &CapitalComCreateSessionRequest,
    ) -> Result<CapitalComCreateSessionResponse, CapitalComHttpError> {
        let credential = self
            .credential
            .as_ref()
            .ok_or(CapitalComHttpError::MissingCredentials)?;
        let url = format!("{}/session", self.base_url);

        tracing::debug!(
            identifier = %credential.identifier(),
            api_key = %credential.masked_api_key(),
            "Creating session"
        );

        let body = serde_json::to_vec(request)?;
        let response = self
            .client
            .post(url)
            .header(HEADER_API_KEY, credential.api_key())
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .await
            .map_err(|e| CapitalComHttpError::NetworkError(e.to_string()))?;

        let status = response.status();

        // The token pair lives in the response headers, not the body
        let cst = header_value(&response, HEADER_CST);
        let security_token = header_value(&response, HEADER_SECURITY_TOKEN);

        let response_body = response
            .text()
            .await
            .map_err(|e| CapitalComHttpError::NetworkError(e.to_string()))?;

        if !status.is_success() {
            return Err(self.map_error_response("/session", status.as_u16(), response_body));
        }

        let parsed: CapitalComCreateSessionResponse = serde_json::from_str(&response_body)
            .map_err(|e| {
                CapitalComHttpError::JsonError(format!(
                    "Failed to deserialize response: {e}\nBody: {response_body}"
                ))
            })?;

        let (Some(cst), Some(security_token)) = (cst, security_token) else {
            return Err(CapitalComHttpError::Unauthorized(
                "Login response missing session token headers".to_string(),
            ));
        };

        let tokens = CapitalComSessionTokens::with_account(
            cst,
            security_token,
            parsed.current_account_id.clone(),
        );
        self.session.store(Some(Arc::new(tokens)));

        tracing::info!(
            account_id = %parsed.current_account_id,
            "Session created"
        );

        Ok(parsed)
    }

    /// Fetches details of the current session.
    ///
    /// # Endpoint
    /// `GET /session`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_session_details(
        &self,
    ) -> Result<CapitalComSessionDetails, CapitalComHttpError> {
        self.send_request::<CapitalComSessionDetails, ()>(
            Method::GET,
            "/session",
            None,
            None,
            true,
        )
        .await
    }

    /// Switches the active account for the session.
    ///
    /// On success the stored session is updated to carry the new account ID.
    ///
    /// # Endpoint
    /// `PUT /session`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn switch_account(
        &self,
        account_id: impl Into<String>,
    ) -> Result<CapitalComSwitchAccountResponse, CapitalComHttpError> {
        let account_id = account_id.into();
        let request = CapitalComSwitchAccountRequest {
            account_id: account_id.clone(),
        };
        let body = serde_json::to_vec(&request)?;

        let response = self
            .send_request::<CapitalComSwitchAccountResponse, ()>(
                Method::PUT,
                "/session",
                None,
                Some(body),
                true,
            )
            .await?;

        if let Some(tokens) = self.session.load().as_deref() {
            let mut tokens = tokens.clone();
            tokens.account_id = Some(account_id.clone());
            self.session.store(Some(Arc::new(tokens)));
        }
        tracing::info!(account_id = %account_id, "Switched active account");

        Ok(response)
    }

    /// Logs out, invalidating the session on the venue and clearing the stored tokens.
    ///
    /// # Endpoint
    /// `DELETE /session`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn logout(&self) -> Result<CapitalComLogoutResponse, CapitalComHttpError> {
        let response = self
            .send_request::<CapitalComLogoutResponse, ()>(
                Method::DELETE,
                "/session",
                None,
                None,
                true,
            )
            .await?;

        self.session.store(None);
        tracing::info!("Session closed");

        Ok(response)
    }

    /// Fetches all accounts for the login.
    ///
    /// # Endpoint
    /// `GET /accounts`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_accounts(&self) -> Result<CapitalComAccountsResponse, CapitalComHttpError> {
        self.send_request::<CapitalComAccountsResponse, ()>(
            Method::GET,
            "/accounts",
            None,
            None,
            true,
        )
        .await
    }

    /// Fetches the account preferences (hedging mode and leverages).
    ///
    /// # Endpoint
    /// `GET /accounts/preferences`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_account_preferences(
        &self,
    ) -> Result<CapitalComAccountPreferences, CapitalComHttpError> {
        self.send_request::<CapitalComAccountPreferences, ()>(
            Method::GET,
            "/accounts/preferences",
            None,
            None,
            true,
        )
        .await
    }

    /// Updates the account preferences.
    ///
    /// # Endpoint
    /// `PUT /accounts/preferences`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn update_account_preferences(
        &self,
        request: UpdateAccountPreferencesRequest,
    ) -> Result<CapitalComPreferencesUpdateResponse, CapitalComHttpError> {
        let body = serde_json::to_vec(&request)?;
        self.send_request::<CapitalComPreferencesUpdateResponse, ()>(
            Method::PUT,
            "/accounts/preferences",
            None,
            Some(body),
            true,
        )
        .await
    }

    /// Tops up a demo account balance.
    ///
    /// # Endpoint
    /// `POST /accounts/topUp`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn top_up_demo_account(
        &self,
        amount: Decimal,
    ) -> Result<CapitalComTopUpResponse, CapitalComHttpError> {
        let body = serde_json::to_vec(&CapitalComTopUpRequest { amount })?;
        self.send_request::<CapitalComTopUpResponse, ()>(
            Method::POST,
            "/accounts/topUp",
            None,
            Some(body),
            true,
        )
        .await
    }

    /// Fetches the account activity history.
    ///
    /// # Endpoint
    /// `GET /history/activity`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_activity_history(
        &self,
        params: GetActivityHistoryParams,
    ) -> Result<CapitalComActivityHistory, CapitalComHttpError> {
        self.send_request(Method::GET, "/history/activity", Some(&params), None, true)
            .await
    }

    /// Fetches the account transaction history.
    ///
    /// # Endpoint
    /// `GET /history/transactions`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_transaction_history(
        &self,
        params: GetTransactionHistoryParams,
    ) -> Result<CapitalComTransactionHistory, CapitalComHttpError> {
        self.send_request(
            Method::GET,
            "/history/transactions",
            Some(&params),
            None,
            true,
        )
        .await
    }

    /// Fetches the confirmation for a deal reference.
    ///
    /// # Endpoint
    /// `GET /confirms/{dealReference}`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_confirmation(
        &self,
        deal_reference: &str,
    ) -> Result<CapitalComDealConfirmation, CapitalComHttpError> {
        let endpoint = format!("/confirms/{deal_reference}");
        self.send_request::<CapitalComDealConfirmation, ()>(
            Method::GET,
            &endpoint,
            None,
            None,
            true,
        )
        .await
    }

    /// Fetches all open positions for the active account.
    ///
    /// # Endpoint
    /// `GET /positions`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_positions(&self) -> Result<CapitalComPositionsResponse, CapitalComHttpError> {
        self.send_request::<CapitalComPositionsResponse, ()>(
            Method::GET,
            "/positions",
            None,
            None,
            true,
        )
        .await
    }

    /// Fetches a single open position by deal ID.
    ///
    /// # Endpoint
    /// `GET /positions/{dealId}`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_position(
        &self,
        deal_id: &str,
    ) -> Result<CapitalComPositionWithMarket, CapitalComHttpError> {
        let endpoint = format!("/positions/{deal_id}");
        self.send_request::<CapitalComPositionWithMarket, ()>(
            Method::GET,
            &endpoint,
            None,
            None,
            true,
        )
        .await
    }

    /// Opens a new position.
    ///
    /// # Endpoint
    /// `POST /positions`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn create_position(
        &self,
        request: CreatePositionRequest,
    ) -> Result<CapitalComDealReference, CapitalComHttpError> {
        let body = serde_json::to_vec(&request)?;
        self.send_request::<CapitalComDealReference, ()>(
            Method::POST,
            "/positions",
            None,
            Some(body),
            true,
        )
        .await
    }

    /// Updates the stop and take-profit levels of an open position.
    ///
    /// # Endpoint
    /// `PUT /positions/{dealId}`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn update_position(
        &self,
        deal_id: &str,
        request: UpdatePositionRequest,
    ) -> Result<CapitalComDealReference, CapitalComHttpError> {
        let endpoint = format!("/positions/{deal_id}");
        let body = serde_json::to_vec(&request)?;
        self.send_request::<CapitalComDealReference, ()>(
            Method::PUT,
            &endpoint,
            None,
            Some(body),
            true,
        )
        .await
    }

    /// Closes an open position.
    ///
    /// # Endpoint
    /// `DELETE /positions/{dealId}`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn close_position(
        &self,
        deal_id: &str,
    ) -> Result<CapitalComDealReference, CapitalComHttpError> {
        let endpoint = format!("/positions/{deal_id}");
        self.send_request::<CapitalComDealReference, ()>(
            Method::DELETE,
            &endpoint,
            None,
            None,
            true,
        )
        .await
    }

    /// Fetches all working orders for the active account.
    ///
    /// # Endpoint
    /// `GET /workingorders`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_working_orders(
        &self,
    ) -> Result<CapitalComWorkingOrdersResponse, CapitalComHttpError> {
        self.send_request::<CapitalComWorkingOrdersResponse, ()>(
            Method::GET,
            "/workingorders",
            None,
            None,
            true,
        )
        .await
    }

    /// Places a new working order.
    ///
    /// # Endpoint
    /// `POST /workingorders`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn create_working_order(
        &self,
        request: CreateWorkingOrderRequest,
    ) -> Result<CapitalComDealReference, CapitalComHttpError> {
        let body = serde_json::to_vec(&request)?;
        self.send_request::<CapitalComDealReference, ()>(
            Method::POST,
            "/workingorders",
            None,
            Some(body),
            true,
        )
        .await
    }

    /// Updates a working order.
    ///
    /// # Endpoint
    /// `PUT /workingorders/{dealId}`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn update_working_order(
        &self,
        deal_id: &str,
        request: UpdateWorkingOrderRequest,
    ) -> Result<CapitalComDealReference, CapitalComHttpError> {
        let endpoint = format!("/workingorders/{deal_id}");
        let body = serde_json::to_vec(&request)?;
        self.send_request::<CapitalComDealReference, ()>(
            Method::PUT,
            &endpoint,
            None,
            Some(body),
            true,
        )
        .await
    }

    /// Cancels a working order.
    ///
    /// # Endpoint
    /// `DELETE /workingorders/{dealId}`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn cancel_working_order(
        &self,
        deal_id: &str,
    ) -> Result<CapitalComDealReference, CapitalComHttpError> {
        let endpoint = format!("/workingorders/{deal_id}");
        self.send_request::<CapitalComDealReference, ()>(
            Method::DELETE,
            &endpoint,
            None,
            None,
            true,
        )
        .await
    }

    /// Searches markets by free text or epics.
    ///
    /// # Endpoint
    /// `GET /markets`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn search_markets(
        &self,
        params: MarketSearchParams,
    ) -> Result<CapitalComMarketsResponse, CapitalComHttpError> {
        self.send_request(Method::GET, "/markets", Some(&params), None, true)
            .await
    }

    /// Fetches full details for a single market.
    ///
    /// # Endpoint
    /// `GET /markets/{epic}`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_market_details(
        &self,
        epic: &str,
    ) -> Result<CapitalComMarketDetails, CapitalComHttpError> {
        let endpoint = format!("/markets/{epic}");
        self.send_request::<CapitalComMarketDetails, ()>(Method::GET, &endpoint, None, None, true)
            .await
    }

    /// Fetches historical price bars for a market.
    ///
    /// # Endpoint
    /// `GET /prices/{epic}`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_prices(
        &self,
        epic: &str,
        params: GetPricesParams,
    ) -> Result<CapitalComPricesResponse, CapitalComHttpError> {
        let endpoint = format!("/prices/{epic}");
        self.send_request(Method::GET, &endpoint, Some(&params), None, true)
            .await
    }

    /// Fetches client sentiment for a set of markets.
    ///
    /// # Endpoint
    /// `GET /clientsentiment`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_client_sentiments(
        &self,
        market_ids: &[&str],
    ) -> Result<CapitalComClientSentimentsResponse, CapitalComHttpError> {
        let params = [("marketIds", market_ids.join(","))];
        self.send_request(Method::GET, "/clientsentiment", Some(&params), None, true)
            .await
    }

    /// Fetches client sentiment for a single market.
    ///
    /// # Endpoint
    /// `GET /clientsentiment/{marketId}`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_client_sentiment(
        &self,
        market_id: &str,
    ) -> Result<CapitalComClientSentiment, CapitalComHttpError> {
        let endpoint = format!("/clientsentiment/{market_id}");
        self.send_request::<CapitalComClientSentiment, ()>(
            Method::GET,
            &endpoint,
            None,
            None,
            true,
        )
        .await
    }

    /// Fetches the top level of the market navigation hierarchy.
    ///
    /// # Endpoint
    /// `GET /marketnavigation`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_market_navigation(
        &self,
    ) -> Result<CapitalComMarketNavigationResponse, CapitalComHttpError> {
        self.send_request::<CapitalComMarketNavigationResponse, ()>(
            Method::GET,
            "/marketnavigation",
            None,
            None,
            true,
        )
        .await
    }

    /// Fetches one node of the market navigation hierarchy.
    ///
    /// # Endpoint
    /// `GET /marketnavigation/{nodeId}`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_market_navigation_node(
        &self,
        node_id: &str,
        limit: Option<u32>,
    ) -> Result<CapitalComMarketNavigationResponse, CapitalComHttpError> {
        let endpoint = format!("/marketnavigation/{node_id}");
        let params = limit.map(|limit| [("limit", limit)]);
        self.send_request(Method::GET, &endpoint, params.as_ref(), None, true)
            .await
    }

    /// Fetches all watchlists for the account.
    ///
    /// # Endpoint
    /// `GET /watchlists`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_watchlists(
        &self,
    ) -> Result<CapitalComWatchlistsResponse, CapitalComHttpError> {
        self.send_request::<CapitalComWatchlistsResponse, ()>(
            Method::GET,
            "/watchlists",
            None,
            None,
            true,
        )
        .await
    }

    /// Creates a new watchlist.
    ///
    /// # Endpoint
    /// `POST /watchlists`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn create_watchlist(
        &self,
        request: CreateWatchlistRequest,
    ) -> Result<CapitalComCreateWatchlistResponse, CapitalComHttpError> {
        let body = serde_json::to_vec(&request)?;
        self.send_request::<CapitalComCreateWatchlistResponse, ()>(
            Method::POST,
            "/watchlists",
            None,
            Some(body),
            true,
        )
        .await
    }

    /// Fetches the markets in a watchlist.
    ///
    /// # Endpoint
    /// `GET /watchlists/{watchlistId}`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn get_watchlist(
        &self,
        watchlist_id: &str,
    ) -> Result<CapitalComWatchlistDetails, CapitalComHttpError> {
        let endpoint = format!("/watchlists/{watchlist_id}");
        self.send_request::<CapitalComWatchlistDetails, ()>(
            Method::GET,
            &endpoint,
            None,
            None,
            true,
        )
        .await
    }

    /// Adds a market to a watchlist.
    ///
    /// # Endpoint
    /// `PUT /watchlists/{watchlistId}`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn add_market_to_watchlist(
        &self,
        watchlist_id: &str,
        epic: &str,
    ) -> Result<CapitalComWatchlistActionResponse, CapitalComHttpError> {
        let endpoint = format!("/watchlists/{watchlist_id}");
        let body = serde_json::to_vec(&serde_json::json!({ "epic": epic }))?;
        self.send_request::<CapitalComWatchlistActionResponse, ()>(
            Method::PUT,
            &endpoint,
            None,
            Some(body),
            true,
        )
        .await
    }

    /// Deletes a watchlist.
    ///
    /// # Endpoint
    /// `DELETE /watchlists/{watchlistId}`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn delete_watchlist(
        &self,
        watchlist_id: &str,
    ) -> Result<CapitalComWatchlistActionResponse, CapitalComHttpError> {
        let endpoint = format!("/watchlists/{watchlist_id}");
        self.send_request::<CapitalComWatchlistActionResponse, ()>(
            Method::DELETE,
            &endpoint,
            None,
            None,
            true,
        )
        .await
    }

    /// Removes a market from a watchlist.
    ///
    /// # Endpoint
    /// `DELETE /watchlists/{watchlistId}/{epic}`
    ///
    /// # Errors
    ///
    /// Returns an error if no session is held or the request fails.
    pub async fn remove_market_from_watchlist(
        &self,
        watchlist_id: &str,
        epic: &str,
    ) -> Result<CapitalComWatchlistActionResponse, CapitalComHttpError> {
        let endpoint = format!("/watchlists/{watchlist_id}/{epic}");
        self.send_request::<CapitalComWatchlistActionResponse, ()>(
            Method::DELETE,
            &endpoint,
            None,
            None,
            true,
        )
        .await
    }
}

fn header_value(response: &reqwest::Response, name: &str) -> Option<String> {
    response
        .headers()
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToString::to_string)
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_client_creation() {
        let client = CapitalComHttpClient::default();

        assert!(client.credential.is_none());
        assert!(!client.is_authenticated());
        assert_eq!(
            client.base_url(),
            "https://api-capital.backend-capital.com/api/v1"
        );
    }

    #[rstest]
    fn test_client_with_credentials() {
        let client = CapitalComHttpClient::with_credentials(
            "test_api_key".to_string(),
            "trader@example.com".to_string(),
            "password".to_string(),
            None,
            true,
            Some(30),
        )
        .unwrap();

        assert!(client.credential.is_some());
        assert!(!client.is_authenticated());
        assert_eq!(
            client.base_url(),
            "https://demo-api-capital.backend-capital.com/api/v1"
        );
    }

    #[rstest]
    fn test_streaming_client_requires_session() {
        let client = CapitalComHttpClient::default();
        let result = client.streaming_client();

        assert!(matches!(result, Err(CapitalComHttpError::MissingSession)));
    }

    #[rstest]
    fn test_debug_does_not_leak_tokens() {
        let client = CapitalComHttpClient::with_credentials(
            "test_api_key".to_string(),
            "trader@example.com".to_string(),
            "password".to_string(),
            None,
            false,
            None,
        )
        .unwrap();

        let debug_string = format!("{client:?}");
        assert!(!debug_string.contains("password"));
        assert!(debug_string.contains("has_credentials: true"));
        assert!(debug_string.contains("has_session: false"));
    }
}
