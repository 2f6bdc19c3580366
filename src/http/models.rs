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

//! Data transfer objects for deserializing Capital.com HTTP API payloads.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use crate::common::enums::{
    CapitalComAffectedDealStatus, CapitalComDealState, CapitalComDealStatus, CapitalComDirection,
    CapitalComInstrumentType, CapitalComMarketStatus, CapitalComOrderType,
};

/// Response payload returned by `GET /time`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComServerTime {
    /// Server time in milliseconds since the UNIX epoch.
    pub server_time: i64,
}

/// Response payload returned by `GET /ping`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComPingResponse {
    /// Ping outcome, `OK` on success.
    pub status: String,
}

/// Response payload returned by `GET /session/encryptionKey`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComEncryptionKey {
    /// RSA public key in base64 (unused by the placeholder encoding).
    pub encryption_key: String,
    /// Timestamp to fold into the encoded password, milliseconds since epoch.
    pub time_stamp: i64,
}

/// Request body for the `POST /session` endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComCreateSessionRequest {
    /// Account identifier (login email).
    pub identifier: String,
    /// Account password, either plain or in the obfuscated form.
    pub password: String,
    /// Whether `password` carries the obfuscated encoding.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub encrypted_password: Option<bool>,
}

/// Account balance figures shared by session and account payloads.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComAccountBalance {
    /// Total account balance.
    pub balance: Decimal,
    /// Deposited funds.
    #[serde(default)]
    pub deposit: Option<Decimal>,
    /// Current unrealized profit and loss.
    #[serde(default)]
    pub profit_loss: Option<Decimal>,
    /// Funds available for trading.
    #[serde(default)]
    pub available: Option<Decimal>,
}

/// Abbreviated account entry inside the `POST /session` response.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComSessionAccount {
    /// Account identifier.
    pub account_id: String,
    /// Account display name.
    pub account_name: String,
    /// Whether this is the preferred (default) account.
    pub preferred: bool,
    /// Account type, for example `CFD`.
    pub account_type: String,
}

/// Response body returned by `POST /session`.
///
/// The session tokens themselves arrive in the `CST` and `X-SECURITY-TOKEN`
/// response headers, not in this body.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComCreateSessionResponse {
    /// Account type of the current account.
    pub account_type: String,
    /// Balance details for the current account.
    pub account_info: CapitalComAccountBalance,
    /// ISO currency code of the current account.
    pub currency_iso_code: String,
    /// Display symbol of the account currency.
    #[serde(default)]
    pub currency_symbol: Option<String>,
    /// Identifier of the currently active account.
    pub current_account_id: String,
    /// Host for the streaming API.
    #[serde(default)]
    pub streaming_host: Option<String>,
    /// All accounts belonging to this login.
    #[serde(default)]
    pub accounts: Vec<CapitalComSessionAccount>,
    /// Client identifier.
    pub client_id: String,
    /// Timezone offset of the account in hours.
    #[serde(default)]
    pub timezone_offset: i64,
    /// Whether the login has active demo accounts.
    #[serde(default)]
    pub has_active_demo_accounts: Option<bool>,
    /// Whether the login has active live accounts.
    #[serde(default)]
    pub has_active_live_accounts: Option<bool>,
    /// Whether trailing stops are enabled for the account.
    #[serde(default)]
    pub trailing_stops_enabled: Option<bool>,
}

/// Response payload returned by `GET /session`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComSessionDetails {
    /// Client identifier.
    pub client_id: String,
    /// Identifier of the currently active account.
    pub account_id: String,
    /// Timezone offset of the account in hours.
    #[serde(default)]
    pub timezone_offset: i64,
    /// Account locale.
    #[serde(default)]
    pub locale: Option<String>,
    /// ISO currency code of the active account.
    #[serde(default)]
    pub currency: Option<String>,
    /// Streaming API endpoint for this session.
    #[serde(default)]
    pub stream_endpoint: Option<String>,
}

/// Request body for the `PUT /session` endpoint.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComSwitchAccountRequest {
    /// Identifier of the account to activate.
    pub account_id: String,
}

/// Response payload returned by `PUT /session`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComSwitchAccountResponse {
    /// Whether trailing stops are enabled on the new account.
    #[serde(default)]
    pub trailing_stops_enabled: Option<bool>,
    /// Whether dealing is enabled on the new account.
    #[serde(default)]
    pub dealing_enabled: Option<bool>,
    /// Whether the login has active demo accounts.
    #[serde(default)]
    pub has_active_demo_accounts: Option<bool>,
    /// Whether the login has active live accounts.
    #[serde(default)]
    pub has_active_live_accounts: Option<bool>,
}

/// Response payload returned by `DELETE /session`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComLogoutResponse {
    /// Logout outcome, `SUCCESS` on success.
    pub status: String,
}

/// Single trading account, as returned by `GET /accounts`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComAccount {
    /// Account identifier.
    pub account_id: String,
    /// Account display name.
    pub account_name: String,
    /// Account status, for example `ENABLED`.
    #[serde(default)]
    pub status: Option<String>,
    /// Account type, for example `CFD`.
    pub account_type: String,
    /// Whether this is the preferred (default) account.
    pub preferred: bool,
    /// Balance details for the account.
    pub balance: CapitalComAccountBalance,
    /// ISO currency code of the account.
    #[serde(default)]
    pub currency: Option<String>,
    /// Display symbol of the account currency.
    #[serde(default)]
    pub symbol: Option<String>,
}

/// Response payload returned by `GET /accounts`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComAccountsResponse {
    /// All accounts belonging to this login.
    pub accounts: Vec<CapitalComAccount>,
}

/// Leverage setting for one instrument type.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComLeverage {
    /// Currently selected leverage.
    pub current: u32,
    /// Leverage values the account may select.
    #[serde(default)]
    pub available: Vec<u32>,
}

/// Response payload returned by `GET /accounts/preferences`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComAccountPreferences {
    /// Whether hedging mode is enabled.
    pub hedging_mode: bool,
    /// Leverage settings per instrument type.
    #[serde(default)]
    pub leverages: HashMap<CapitalComInstrumentType, CapitalComLeverage>,
}

/// Response payload returned by `PUT /accounts/preferences`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComPreferencesUpdateResponse {
    /// Update outcome, `SUCCESS` on success.
    pub status: String,
}

/// Request body for the `POST /accounts/topUp` endpoint (demo accounts only).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComTopUpRequest {
    /// Amount to add to the demo account balance.
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
}

/// Response payload returned by `POST /accounts/topUp`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComTopUpResponse {
    /// Whether the top-up succeeded.
    pub successful: bool,
}

/// Single account activity record.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComActivity {
    /// Activity timestamp in the account timezone.
    pub date: NaiveDateTime,
    /// Activity timestamp in UTC.
    #[serde(default, rename = "dateUTC")]
    pub date_utc: Option<NaiveDateTime>,
    /// Instrument epic the activity relates to.
    pub epic: Ustr,
    /// Deal identifier.
    pub deal_id: String,
    /// Activity source, for example `USER` or `SYSTEM`.
    #[serde(default)]
    pub source: Option<String>,
    /// Activity type, for example `POSITION` or `WORKING_ORDER`.
    #[serde(rename = "type")]
    pub activity_type: String,
    /// Activity status, for example `ACCEPTED`.
    #[serde(default)]
    pub status: Option<String>,
    /// Extended detail payload, present when `detailed=true` was requested.
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// Response payload returned by `GET /history/activity`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComActivityHistory {
    /// Activity records matching the query.
    pub activities: Vec<CapitalComActivity>,
}

/// Single account transaction record.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComTransaction {
    /// Transaction timestamp in the account timezone.
    pub date: NaiveDateTime,
    /// Transaction timestamp in UTC.
    #[serde(default, rename = "dateUtc")]
    pub date_utc: Option<NaiveDateTime>,
    /// Instrument name, or the currency for cash movements.
    #[serde(default)]
    pub instrument_name: Option<String>,
    /// Transaction type, for example `TRADE` or `DEPOSIT`.
    pub transaction_type: String,
    /// Free-text note attached by the venue.
    #[serde(default)]
    pub note: Option<String>,
    /// Venue reference for the transaction.
    #[serde(default)]
    pub reference: Option<String>,
    /// Transaction size.
    #[serde(default)]
    pub size: Option<Decimal>,
    /// Transaction status.
    #[serde(default)]
    pub status: Option<String>,
    /// Transaction currency.
    #[serde(default)]
    pub currency: Option<String>,
}

/// Response payload returned by `GET /history/transactions`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComTransactionHistory {
    /// Transaction records matching the query.
    pub transactions: Vec<CapitalComTransaction>,
}

/// A deal affected by another deal, for example a closed counterpart.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComAffectedDeal {
    /// Affected deal identifier.
    pub deal_id: String,
    /// What happened to the affected deal.
    pub status: CapitalComAffectedDealStatus,
}

/// Response payload returned by `GET /confirms/{dealReference}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComDealConfirmation {
    /// Confirmation timestamp.
    pub date: NaiveDateTime,
    /// Lifecycle state of the deal.
    pub status: CapitalComDealState,
    /// Whether the deal was accepted or rejected.
    pub deal_status: CapitalComDealStatus,
    /// Instrument epic.
    pub epic: Ustr,
    /// Deal reference echoed from the original request.
    pub deal_reference: String,
    /// Deal identifier assigned by the venue.
    pub deal_id: String,
    /// Other deals affected by this one.
    #[serde(default)]
    pub affected_deals: Vec<CapitalComAffectedDeal>,
    /// Execution level.
    #[serde(default)]
    pub level: Option<Decimal>,
    /// Deal size.
    #[serde(default)]
    pub size: Option<Decimal>,
    /// Deal direction.
    #[serde(default)]
    pub direction: Option<CapitalComDirection>,
    /// Whether a guaranteed stop is attached.
    #[serde(default)]
    pub guaranteed_stop: Option<bool>,
    /// Whether a trailing stop is attached.
    #[serde(default)]
    pub trailing_stop: Option<bool>,
    /// Rejection reason when `deal_status` is `REJECTED`.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Deal reference returned by all position and working order mutations.
///
/// Pass the reference to `GET /confirms/{dealReference}` to learn the outcome.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComDealReference {
    /// Reference for the submitted deal.
    pub deal_reference: String,
}

/// An open position.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComPosition {
    /// Contract size of the instrument.
    #[serde(default)]
    pub contract_size: Option<Decimal>,
    /// Creation timestamp in the account timezone.
    pub created_date: NaiveDateTime,
    /// Creation timestamp in UTC.
    #[serde(default, rename = "createdDateUTC")]
    pub created_date_utc: Option<NaiveDateTime>,
    /// Deal identifier.
    pub deal_id: String,
    /// Deal reference from the opening request.
    #[serde(default)]
    pub deal_reference: Option<String>,
    /// Position size.
    pub size: Decimal,
    /// Position leverage.
    #[serde(default)]
    pub leverage: Option<Decimal>,
    /// Unrealized profit and loss.
    #[serde(default)]
    pub upl: Option<Decimal>,
    /// Position direction.
    pub direction: CapitalComDirection,
    /// Open level.
    pub level: Decimal,
    /// Position currency.
    #[serde(default)]
    pub currency: Option<String>,
    /// Whether a guaranteed stop is attached.
    #[serde(default)]
    pub guaranteed_stop: Option<bool>,
    /// Whether a trailing stop is attached.
    #[serde(default)]
    pub trailing_stop: Option<bool>,
    /// Stop level, if set.
    #[serde(default)]
    pub stop_level: Option<Decimal>,
    /// Take-profit level, if set.
    #[serde(default)]
    pub profit_level: Option<Decimal>,
}

/// Condensed market description attached to positions, orders, and searches.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComMarketSummary {
    /// Human-readable instrument name.
    pub instrument_name: String,
    /// Expiry, `-` for non-expiring markets.
    #[serde(default)]
    pub expiry: Option<String>,
    /// Current market status.
    pub market_status: CapitalComMarketStatus,
    /// Instrument epic.
    pub epic: Ustr,
    /// Instrument type.
    #[serde(default)]
    pub instrument_type: Option<CapitalComInstrumentType>,
    /// Lot size of the instrument.
    #[serde(default)]
    pub lot_size: Option<Decimal>,
    /// Session high.
    #[serde(default)]
    pub high: Option<Decimal>,
    /// Session low.
    #[serde(default)]
    pub low: Option<Decimal>,
    /// Percentage change on the day.
    #[serde(default)]
    pub percentage_change: Option<Decimal>,
    /// Net change on the day.
    #[serde(default)]
    pub net_change: Option<Decimal>,
    /// Current bid price.
    #[serde(default)]
    pub bid: Option<Decimal>,
    /// Current offer price.
    #[serde(default)]
    pub offer: Option<Decimal>,
    /// Last update timestamp in the account timezone.
    #[serde(default)]
    pub update_time: Option<NaiveDateTime>,
    /// Last update timestamp in UTC.
    #[serde(default, rename = "updateTimeUTC")]
    pub update_time_utc: Option<NaiveDateTime>,
    /// Price delay in minutes.
    #[serde(default)]
    pub delay_time: i64,
    /// Whether streaming prices are available for the market.
    #[serde(default)]
    pub streaming_prices_available: bool,
    /// Price scaling factor.
    #[serde(default)]
    pub scaling_factor: Option<Decimal>,
}

/// A position paired with its market description.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComPositionWithMarket {
    /// The open position.
    pub position: CapitalComPosition,
    /// Market the position is held in.
    pub market: CapitalComMarketSummary,
}

/// Response payload returned by `GET /positions`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComPositionsResponse {
    /// All open positions for the active account.
    pub positions: Vec<CapitalComPositionWithMarket>,
}

/// A working order awaiting execution.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComWorkingOrder {
    /// Deal identifier.
    pub deal_id: String,
    /// Order direction.
    pub direction: CapitalComDirection,
    /// Instrument epic.
    pub epic: Ustr,
    /// Order size.
    pub order_size: Decimal,
    /// Order entry level.
    pub order_level: Decimal,
    /// Order type (`LIMIT` or `STOP`).
    pub order_type: CapitalComOrderType,
    /// Time in force, for example `GOOD_TILL_CANCELLED` or `GOOD_TILL_DATE`.
    #[serde(default)]
    pub time_in_force: Option<String>,
    /// Expiry timestamp for `GOOD_TILL_DATE` orders.
    #[serde(default)]
    pub good_till_date: Option<NaiveDateTime>,
    /// Creation timestamp in the account timezone.
    #[serde(default)]
    pub created_date: Option<NaiveDateTime>,
    /// Creation timestamp in UTC.
    #[serde(default, rename = "createdDateUTC")]
    pub created_date_utc: Option<NaiveDateTime>,
    /// Order leverage.
    #[serde(default)]
    pub leverage: Option<Decimal>,
    /// Whether a guaranteed stop is attached.
    #[serde(default)]
    pub guaranteed_stop: Option<bool>,
    /// Whether a trailing stop is attached.
    #[serde(default)]
    pub trailing_stop: Option<bool>,
    /// Stop distance, if set.
    #[serde(default)]
    pub stop_distance: Option<Decimal>,
    /// Take-profit distance, if set.
    #[serde(default)]
    pub profit_distance: Option<Decimal>,
    /// Stop level, if set.
    #[serde(default)]
    pub stop_level: Option<Decimal>,
    /// Take-profit level, if set.
    #[serde(default)]
    pub profit_level: Option<Decimal>,
    /// Order currency code.
    #[serde(default)]
    pub currency_code: Option<String>,
}

/// A working order paired with its market description.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComWorkingOrderWithMarket {
    /// The working order.
    pub working_order_data: CapitalComWorkingOrder,
    /// Market the order targets.
    pub market_data: CapitalComMarketSummary,
}

/// Response payload returned by `GET /workingorders`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComWorkingOrdersResponse {
    /// All working orders for the active account.
    pub working_orders: Vec<CapitalComWorkingOrderWithMarket>,
}

/// Response payload returned by `GET /markets` (search).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComMarketsResponse {
    /// Markets matching the search.
    pub markets: Vec<CapitalComMarketSummary>,
}

/// Overnight fee (swap) details for an instrument.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComOvernightFee {
    /// Rate applied to long positions.
    #[serde(default)]
    pub long_rate: Option<Decimal>,
    /// Rate applied to short positions.
    #[serde(default)]
    pub short_rate: Option<Decimal>,
    /// Timestamp of the next swap charge, milliseconds since epoch.
    #[serde(default)]
    pub swap_charge_timestamp: Option<i64>,
    /// Interval between swap charges in minutes.
    #[serde(default)]
    pub swap_charge_interval: Option<i64>,
}

/// Full instrument description inside `GET /markets/{epic}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComInstrumentDetails {
    /// Instrument epic.
    pub epic: Ustr,
    /// Expiry, `-` for non-expiring markets.
    #[serde(default)]
    pub expiry: Option<String>,
    /// Human-readable instrument name.
    pub name: String,
    /// Lot size of the instrument.
    #[serde(default)]
    pub lot_size: Option<Decimal>,
    /// Instrument type.
    #[serde(rename = "type")]
    pub instrument_type: CapitalComInstrumentType,
    /// Whether guaranteed stops may be attached.
    #[serde(default)]
    pub guaranteed_stop_allowed: bool,
    /// Whether streaming prices are available.
    #[serde(default)]
    pub streaming_prices_available: bool,
    /// Instrument currency.
    #[serde(default)]
    pub currency: Option<String>,
    /// Margin requirement factor.
    #[serde(default)]
    pub margin_factor: Option<Decimal>,
    /// Unit for the margin factor, for example `PERCENTAGE`.
    #[serde(default)]
    pub margin_factor_unit: Option<String>,
    /// Trading hours per weekday.
    #[serde(default)]
    pub opening_hours: Option<HashMap<String, Vec<String>>>,
    /// Overnight fee details.
    #[serde(default)]
    pub overnight_fee: Option<CapitalComOvernightFee>,
}

/// One dealing rule value with its unit.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComDealingRule {
    /// Unit of the rule value, for example `POINTS` or `PERCENTAGE`.
    pub unit: String,
    /// Rule value.
    pub value: Decimal,
}

/// Dealing rules inside `GET /markets/{epic}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComDealingRules {
    /// Minimum step distance for stops and limits.
    #[serde(default)]
    pub min_step_distance: Option<CapitalComDealingRule>,
    /// Minimum deal size.
    #[serde(default)]
    pub min_deal_size: Option<CapitalComDealingRule>,
    /// Maximum deal size.
    #[serde(default)]
    pub max_deal_size: Option<CapitalComDealingRule>,
    /// Minimum deal size increment.
    #[serde(default)]
    pub min_size_increment: Option<CapitalComDealingRule>,
    /// Minimum distance for guaranteed stops.
    #[serde(default)]
    pub min_guaranteed_stop_distance: Option<CapitalComDealingRule>,
    /// Minimum distance for stops and take-profits.
    #[serde(default)]
    pub min_stop_or_profit_distance: Option<CapitalComDealingRule>,
    /// Maximum distance for stops and take-profits.
    #[serde(default)]
    pub max_stop_or_profit_distance: Option<CapitalComDealingRule>,
    /// Market order dealing preference.
    #[serde(default)]
    pub market_order_preference: Option<String>,
    /// Trailing stop dealing preference.
    #[serde(default)]
    pub trailing_stops_preference: Option<String>,
}

/// Market snapshot inside `GET /markets/{epic}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComMarketSnapshot {
    /// Current market status.
    pub market_status: CapitalComMarketStatus,
    /// Net change on the day.
    #[serde(default)]
    pub net_change: Option<Decimal>,
    /// Percentage change on the day.
    #[serde(default)]
    pub percentage_change: Option<Decimal>,
    /// Snapshot timestamp.
    #[serde(default)]
    pub update_time: Option<NaiveDateTime>,
    /// Price delay in minutes.
    #[serde(default)]
    pub delay_time: i64,
    /// Current bid price.
    #[serde(default)]
    pub bid: Option<Decimal>,
    /// Current offer price.
    #[serde(default)]
    pub offer: Option<Decimal>,
    /// Session high.
    #[serde(default)]
    pub high: Option<Decimal>,
    /// Session low.
    #[serde(default)]
    pub low: Option<Decimal>,
    /// Number of decimal places in quoted prices.
    #[serde(default)]
    pub decimal_places_factor: Option<i64>,
    /// Price scaling factor.
    #[serde(default)]
    pub scaling_factor: Option<Decimal>,
}

/// Response payload returned by `GET /markets/{epic}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComMarketDetails {
    /// Full instrument description.
    pub instrument: CapitalComInstrumentDetails,
    /// Dealing rules for the market.
    pub dealing_rules: CapitalComDealingRules,
    /// Current market snapshot.
    pub snapshot: CapitalComMarketSnapshot,
}

/// Bid and ask for one side of a price bar.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComPricePoint {
    /// Bid price.
    #[serde(default)]
    pub bid: Option<Decimal>,
    /// Ask price.
    #[serde(default)]
    pub ask: Option<Decimal>,
}

/// Single historical price bar.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComPriceBar {
    /// Bar timestamp in the account timezone.
    pub snapshot_time: NaiveDateTime,
    /// Bar timestamp in UTC.
    #[serde(default, rename = "snapshotTimeUTC")]
    pub snapshot_time_utc: Option<NaiveDateTime>,
    /// Opening price.
    pub open_price: CapitalComPricePoint,
    /// Closing price.
    pub close_price: CapitalComPricePoint,
    /// Session high price.
    pub high_price: CapitalComPricePoint,
    /// Session low price.
    pub low_price: CapitalComPricePoint,
    /// Traded volume over the bar.
    #[serde(default)]
    pub last_traded_volume: Option<i64>,
}

/// Response payload returned by `GET /prices/{epic}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComPricesResponse {
    /// Historical bars, oldest first.
    pub prices: Vec<CapitalComPriceBar>,
    /// Type of the requested instrument.
    #[serde(default)]
    pub instrument_type: Option<CapitalComInstrumentType>,
}

/// Client sentiment for one market.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComClientSentiment {
    /// Market identifier.
    pub market_id: String,
    /// Percentage of client positions that are long.
    pub long_position_percentage: Decimal,
    /// Percentage of client positions that are short.
    pub short_position_percentage: Decimal,
}

/// Response payload returned by `GET /clientsentiment`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComClientSentimentsResponse {
    /// Sentiment per requested market.
    pub client_sentiments: Vec<CapitalComClientSentiment>,
}

/// One node in the market navigation hierarchy.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComNavigationNode {
    /// Node identifier.
    pub id: String,
    /// Node display name.
    pub name: String,
}

/// Response payload returned by `GET /marketnavigation` and
/// `GET /marketnavigation/{nodeId}`.
///
/// Inner nodes carry `nodes`, leaf nodes carry `markets`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComMarketNavigationResponse {
    /// Child nodes, when the node is not a leaf.
    #[serde(default)]
    pub nodes: Option<Vec<CapitalComNavigationNode>>,
    /// Markets under a leaf node.
    #[serde(default)]
    pub markets: Option<Vec<CapitalComMarketSummary>>,
}

/// Single watchlist descriptor.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComWatchlist {
    /// Watchlist identifier.
    pub id: String,
    /// Watchlist display name.
    pub name: String,
    /// Whether the watchlist can be modified.
    #[serde(default)]
    pub editable: bool,
    /// Whether the watchlist can be deleted.
    #[serde(default)]
    pub deleteable: bool,
    /// Whether this is a venue-provided default watchlist.
    #[serde(default)]
    pub default_system_watchlist: bool,
}

/// Response payload returned by `GET /watchlists`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComWatchlistsResponse {
    /// All watchlists for the account.
    pub watchlists: Vec<CapitalComWatchlist>,
}

/// Response payload returned by `GET /watchlists/{watchlistId}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComWatchlistDetails {
    /// Markets in the watchlist.
    pub markets: Vec<CapitalComMarketSummary>,
}

/// Response payload returned by `POST /watchlists`.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComCreateWatchlistResponse {
    /// Identifier of the new watchlist.
    pub watchlist_id: String,
    /// Creation outcome, `SUCCESS` on success.
    #[serde(default)]
    pub status: Option<String>,
}

/// Generic status response for watchlist mutations.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CapitalComWatchlistActionResponse {
    /// Mutation outcome, `SUCCESS` on success.
    pub status: String,
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn test_parse_create_session_response() {
        let json = include_str!("../../test_data/http_create_session.json");
        let response: CapitalComCreateSessionResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.current_account_id, "12345678901234567");
        assert_eq!(response.account_type, "CFD");
        assert_eq!(response.currency_iso_code, "USD");
        assert_eq!(response.accounts.len(), 2);
        assert!(response.accounts[0].preferred);
    }

    #[rstest]
    fn test_parse_positions_response() {
        let json = include_str!("../../test_data/http_get_positions.json");
        let response: CapitalComPositionsResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.positions.len(), 1);
        let entry = &response.positions[0];
        assert_eq!(entry.position.deal_id, "00018387-0001-54c4-0000-000080560014");
        assert_eq!(entry.position.direction, CapitalComDirection::Buy);
        assert_eq!(entry.market.epic, Ustr::from("SILVER"));
        assert_eq!(entry.market.market_status, CapitalComMarketStatus::Tradeable);
    }

    #[rstest]
    fn test_parse_working_orders_response() {
        let json = include_str!("../../test_data/http_get_working_orders.json");
        let response: CapitalComWorkingOrdersResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.working_orders.len(), 1);
        let entry = &response.working_orders[0];
        assert_eq!(entry.working_order_data.order_type, CapitalComOrderType::Limit);
        assert_eq!(entry.working_order_data.direction, CapitalComDirection::Buy);
        assert_eq!(entry.market_data.epic, Ustr::from("GOLD"));
    }

    #[rstest]
    fn test_parse_market_details_response() {
        let json = include_str!("../../test_data/http_get_market_details.json");
        let response: CapitalComMarketDetails = serde_json::from_str(json).unwrap();

        assert_eq!(response.instrument.epic, Ustr::from("GOLD"));
        assert_eq!(
            response.instrument.instrument_type,
            CapitalComInstrumentType::Commodities
        );
        assert!(response.instrument.guaranteed_stop_allowed);
        assert_eq!(response.snapshot.market_status, CapitalComMarketStatus::Tradeable);
        assert!(response.dealing_rules.min_deal_size.is_some());
    }

    #[rstest]
    fn test_parse_prices_response() {
        let json = include_str!("../../test_data/http_get_prices.json");
        let response: CapitalComPricesResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.prices.len(), 2);
        let bar = &response.prices[0];
        assert!(bar.open_price.bid.is_some());
        assert!(bar.last_traded_volume.is_some());
        assert_eq!(
            response.instrument_type,
            Some(CapitalComInstrumentType::Commodities)
        );
    }

    #[rstest]
    fn test_parse_deal_confirmation() {
        let json = include_str!("../../test_data/http_get_confirmation.json");
        let confirmation: CapitalComDealConfirmation = serde_json::from_str(json).unwrap();

        assert_eq!(confirmation.deal_status, CapitalComDealStatus::Accepted);
        assert_eq!(confirmation.status, CapitalComDealState::Open);
        assert_eq!(confirmation.epic, Ustr::from("SILVER"));
        assert_eq!(confirmation.affected_deals.len(), 1);
    }

    #[rstest]
    fn test_parse_accounts_response() {
        let json = include_str!("../../test_data/http_get_accounts.json");
        let response: CapitalComAccountsResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.accounts.len(), 2);
        assert!(response.accounts[0].preferred);
        assert!(response.accounts[0].balance.balance > Decimal::ZERO);
    }

    #[rstest]
    fn test_parse_account_preferences() {
        let json = r#"{
            "hedgingMode": false,
            "leverages": {
                "SHARES": {"current": 5, "available": [1, 2, 3, 5]},
                "CURRENCIES": {"current": 20, "available": [1, 10, 20, 30]}
            }
        }"#;
        let preferences: CapitalComAccountPreferences = serde_json::from_str(json).unwrap();

        assert!(!preferences.hedging_mode);
        assert_eq!(
            preferences.leverages[&CapitalComInstrumentType::Shares].current,
            5
        );
        assert_eq!(
            preferences.leverages[&CapitalComInstrumentType::Currencies]
                .available
                .len(),
            4
        );
    }

    #[rstest]
    fn test_parse_server_time() {
        let json = r#"{"serverTime": 1649259764171}"#;
        let time: CapitalComServerTime = serde_json::from_str(json).unwrap();

        assert_eq!(time.server_time, 1_649_259_764_171);
    }

    #[rstest]
    fn test_parse_deal_reference() {
        let json = r#"{"dealReference": "o_98c0de50-9cd5-4481-8d81-890c525eeb49"}"#;
        let reference: CapitalComDealReference = serde_json::from_str(json).unwrap();

        assert_eq!(reference.deal_reference, "o_98c0de50-9cd5-4481-8d81-890c525eeb49");
    }

    #[rstest]
    fn test_parse_market_navigation() {
        let json = r#"{
            "nodes": [
                {"id": "hierarchy_v1.commodities_group", "name": "commodities"},
                {"id": "hierarchy_v1.currencies_group", "name": "currencies"}
            ]
        }"#;
        let response: CapitalComMarketNavigationResponse = serde_json::from_str(json).unwrap();

        let nodes = response.nodes.unwrap();
        assert_eq!(nodes.len(), 2);
        assert_eq!(nodes[0].name, "commodities");
        assert!(response.markets.is_none());
    }

    #[rstest]
    fn test_parse_client_sentiment() {
        let json = r#"{
            "clientSentiments": [
                {"marketId": "SILVER", "longPositionPercentage": 91.85, "shortPositionPercentage": 8.15}
            ]
        }"#;
        let response: CapitalComClientSentimentsResponse = serde_json::from_str(json).unwrap();

        assert_eq!(response.client_sentiments.len(), 1);
        assert_eq!(response.client_sentiments[0].market_id, "SILVER");
    }
}
