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

//! Enumerations that model Capital.com string enums across HTTP and WebSocket payloads.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Deal direction for positions and working orders.
///
/// # References
/// - <https://open-api.capital.com/#tag/Trading/paths/~1api~1v1~1positions/post>
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CapitalComDirection {
    /// Buy (long) direction.
    Buy,
    /// Sell (short) direction.
    Sell,
}

impl CapitalComDirection {
    /// Returns the opposite direction.
    #[must_use]
    pub const fn opposite(&self) -> Self {
        match self {
            Self::Buy => Self::Sell,
            Self::Sell => Self::Buy,
        }
    }
}

/// Working order type.
///
/// # References
/// - <https://open-api.capital.com/#tag/Trading/paths/~1api~1v1~1workingorders/post>
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CapitalComOrderType {
    /// Limit order, executes at the specified level or better.
    Limit,
    /// Stop order, executes once the market reaches the specified level.
    Stop,
}

/// Price bar resolution for historical prices and OHLC subscriptions.
///
/// The venue uses an underscore between unit and multiplier, so the variants
/// carry explicit serialization names.
///
/// # References
/// - <https://open-api.capital.com/#tag/Markets-Info-greater-Prices>
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum CapitalComResolution {
    /// 1-minute bars.
    #[default]
    #[serde(rename = "MINUTE")]
    #[strum(serialize = "MINUTE")]
    Minute,
    /// 5-minute bars.
    #[serde(rename = "MINUTE_5")]
    #[strum(serialize = "MINUTE_5")]
    Minute5,
    /// 15-minute bars.
    #[serde(rename = "MINUTE_15")]
    #[strum(serialize = "MINUTE_15")]
    Minute15,
    /// 30-minute bars.
    #[serde(rename = "MINUTE_30")]
    #[strum(serialize = "MINUTE_30")]
    Minute30,
    /// 1-hour bars.
    #[serde(rename = "HOUR")]
    #[strum(serialize = "HOUR")]
    Hour,
    /// 4-hour bars.
    #[serde(rename = "HOUR_4")]
    #[strum(serialize = "HOUR_4")]
    Hour4,
    /// Daily bars.
    #[serde(rename = "DAY")]
    #[strum(serialize = "DAY")]
    Day,
    /// Weekly bars.
    #[serde(rename = "WEEK")]
    #[strum(serialize = "WEEK")]
    Week,
}

/// Instrument type of a market.
///
/// # References
/// - <https://open-api.capital.com/#tag/Markets-Info-greater-Markets>
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CapitalComInstrumentType {
    /// Equity shares.
    Shares,
    /// Currency pairs.
    Currencies,
    /// Stock indices.
    Indices,
    /// Cryptocurrency pairs.
    Cryptocurrencies,
    /// Commodities.
    Commodities,
}

/// Market trading status.
///
/// # References
/// - <https://open-api.capital.com/#tag/Markets-Info-greater-Markets>
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CapitalComMarketStatus {
    /// Market is open for trading.
    Tradeable,
    /// Market is closed.
    Closed,
    /// Market trading is suspended.
    Suspended,
}

/// Outcome of a deal as reported by the confirms endpoint.
///
/// # References
/// - <https://open-api.capital.com/#tag/Trading/paths/~1api~1v1~1confirms~1{dealReference}/get>
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CapitalComDealStatus {
    /// Deal was accepted by the venue.
    Accepted,
    /// Deal was rejected by the venue.
    Rejected,
}

/// Lifecycle state of a deal as reported by the confirms endpoint.
///
/// # References
/// - <https://open-api.capital.com/#tag/Trading/paths/~1api~1v1~1confirms~1{dealReference}/get>
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CapitalComDealState {
    /// Deal is open.
    Open,
    /// Deal has been amended.
    Amended,
    /// Deal has been partially closed.
    PartiallyClosed,
    /// Deal has been closed.
    Closed,
    /// Deal has been deleted.
    Deleted,
}

/// What happened to a deal affected by another deal.
///
/// Note this is a different value set from [`CapitalComDealState`]: affected
/// deals report `OPENED` rather than `OPEN`.
///
/// # References
/// - <https://open-api.capital.com/#tag/Trading/paths/~1api~1v1~1confirms~1{dealReference}/get>
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum CapitalComAffectedDealStatus {
    /// The affected deal was opened.
    Opened,
    /// The affected deal was amended.
    Amended,
    /// The affected deal was partially closed.
    PartiallyClosed,
    /// The affected deal was fully closed.
    FullyClosed,
    /// The affected deal was deleted.
    Deleted,
}

/// OHLC bar construction type for streaming subscriptions.
///
/// # References
/// - <https://open-api.capital.com/#tag/WebSocket-API/OHLCMarketData.subscribe>
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum CapitalComOhlcType {
    /// Standard OHLC bars.
    #[default]
    #[serde(rename = "classic")]
    #[strum(serialize = "classic")]
    Classic,
    /// Heikin-Ashi smoothed bars.
    #[serde(rename = "heikin-ashi")]
    #[strum(serialize = "heikin-ashi")]
    HeikinAshi,
}

/// Price side an OHLC bar was derived from.
///
/// # References
/// - <https://open-api.capital.com/#tag/WebSocket-API/ohlc.event>
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CapitalComPriceType {
    /// Bars built from bid prices.
    Bid,
    /// Bars built from ask (offer) prices.
    Ask,
}

/// WebSocket message destination.
///
/// Outbound frames carry one of the request destinations, while inbound
/// frames echo the request destination or use one of the event destinations.
///
/// # References
/// - <https://open-api.capital.com/#tag/WebSocket-API>
#[derive(
    Clone,
    Copy,
    Debug,
    Display,
    Eq,
    PartialEq,
    Hash,
    AsRefStr,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
pub enum CapitalComWsDestination {
    /// Subscribe to quote updates.
    #[serde(rename = "marketData.subscribe")]
    #[strum(serialize = "marketData.subscribe")]
    MarketDataSubscribe,
    /// Unsubscribe from quote updates.
    #[serde(rename = "marketData.unsubscribe")]
    #[strum(serialize = "marketData.unsubscribe")]
    MarketDataUnsubscribe,
    /// Subscribe to OHLC bar updates.
    #[serde(rename = "OHLCMarketData.subscribe")]
    #[strum(serialize = "OHLCMarketData.subscribe")]
    OhlcMarketDataSubscribe,
    /// Unsubscribe from OHLC bar updates.
    #[serde(rename = "OHLCMarketData.unsubscribe")]
    #[strum(serialize = "OHLCMarketData.unsubscribe")]
    OhlcMarketDataUnsubscribe,
    /// Keep the session alive.
    #[serde(rename = "ping")]
    #[strum(serialize = "ping")]
    Ping,
    /// Quote update event (inbound only).
    #[serde(rename = "quote")]
    #[strum(serialize = "quote")]
    Quote,
    /// OHLC bar event (inbound only).
    #[serde(rename = "ohlc.event")]
    #[strum(serialize = "ohlc.event")]
    OhlcEvent,
}
