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

//! Capital.com HTTP API query parameter and request body builders.

use std::collections::HashMap;

use derive_builder::Builder;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::common::enums::{
    CapitalComDirection, CapitalComInstrumentType, CapitalComOrderType, CapitalComResolution,
};

/// Query parameters for the `GET /markets` endpoint.
///
/// At least one of `search_term` or `epics` should be supplied, otherwise the
/// venue returns the full (large) market list.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(rename_all = "camelCase")]
pub struct MarketSearchParams {
    /// Free-text search over instrument names and epics.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    /// Comma-separated list of epics (maximum 50).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub epics: Option<String>,
}

impl MarketSearchParams {
    /// Creates a new builder for [`MarketSearchParams`].
    #[must_use]
    pub fn builder() -> MarketSearchParamsBuilder {
        MarketSearchParamsBuilder::default()
    }

    /// Creates parameters searching by free text.
    #[must_use]
    pub fn from_search_term(search_term: impl Into<String>) -> Self {
        Self {
            search_term: Some(search_term.into()),
            epics: None,
        }
    }

    /// Creates parameters filtering by specific epics.
    #[must_use]
    pub fn from_epics(epics: &[&str]) -> Self {
        Self {
            search_term: None,
            epics: Some(epics.join(",")),
        }
    }
}

/// Query parameters for the `GET /prices/{epic}` endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Builder)]
#[builder(setter(into, strip_option), default)]
pub struct GetPricesParams {
    /// Bar resolution (default `MINUTE`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resolution: Option<CapitalComResolution>,
    /// Maximum number of bars to return (default 10, maximum 1000).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max: Option<u32>,
    /// Start of the requested range, format `2022-02-24T00:00:00`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// End of the requested range, format `2022-02-24T00:00:00`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
}

impl GetPricesParams {
    /// Creates a new builder for [`GetPricesParams`].
    #[must_use]
    pub fn builder() -> GetPricesParamsBuilder {
        GetPricesParamsBuilder::default()
    }

    /// Creates parameters for the most recent `max` bars at `resolution`.
    #[must_use]
    pub fn new(resolution: CapitalComResolution, max: u32) -> Self {
        Self {
            resolution: Some(resolution),
            max: Some(max),
            from: None,
            to: None,
        }
    }
}

/// Query parameters for the `GET /history/activity` endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(rename_all = "camelCase")]
pub struct GetActivityHistoryParams {
    /// Start of the requested range, format `2022-02-24T00:00:00`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// End of the requested range, format `2022-02-24T00:00:00`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Look-back window in seconds when no explicit range is given (maximum 86400).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_period: Option<u64>,
    /// Whether to return detailed activity records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detailed: Option<bool>,
    /// Filter by a single deal ID.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deal_id: Option<String>,
    /// FIQL filter expression, for example `epic==GOLD`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filter: Option<String>,
}

impl GetActivityHistoryParams {
    /// Creates a new builder for [`GetActivityHistoryParams`].
    #[must_use]
    pub fn builder() -> GetActivityHistoryParamsBuilder {
        GetActivityHistoryParamsBuilder::default()
    }
}

/// Query parameters for the `GET /history/transactions` endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(rename_all = "camelCase")]
pub struct GetTransactionHistoryParams {
    /// Start of the requested range, format `2022-02-24T00:00:00`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from: Option<String>,
    /// End of the requested range, format `2022-02-24T00:00:00`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to: Option<String>,
    /// Look-back window in seconds when no explicit range is given.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_period: Option<u64>,
    /// Transaction type filter, for example `TRADE` or `DEPOSIT`.
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub transaction_type: Option<String>,
}

impl GetTransactionHistoryParams {
    /// Creates a new builder for [`GetTransactionHistoryParams`].
    #[must_use]
    pub fn builder() -> GetTransactionHistoryParamsBuilder {
        GetTransactionHistoryParamsBuilder::default()
    }
}

/// Request body for the `POST /positions` endpoint.
#[derive(Clone, Debug, Deserialize, Serialize, Builder)]
#[builder(setter(into, strip_option))]
#[serde(rename_all = "camelCase")]
pub struct CreatePositionRequest {
    /// Instrument epic to trade.
    pub epic: String,
    /// Deal direction.
    pub direction: CapitalComDirection,
    /// Deal size.
    #[serde(with = "rust_decimal::serde::float")]
    pub size: Decimal,
    /// Whether to attach a guaranteed stop (incurs a fee when triggered).
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub guaranteed_stop: Option<bool>,
    /// Whether to attach a trailing stop.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub trailing_stop: Option<bool>,
    /// Absolute stop level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[builder(default)]
    pub stop_level: Option<Decimal>,
    /// Stop distance from the open level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[builder(default)]
    pub stop_distance: Option<Decimal>,
    /// Maximum loss amount for the stop.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[builder(default)]
    pub stop_amount: Option<Decimal>,
    /// Absolute take-profit level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[builder(default)]
    pub profit_level: Option<Decimal>,
    /// Take-profit distance from the open level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[builder(default)]
    pub profit_distance: Option<Decimal>,
    /// Expected profit amount for the take-profit.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[builder(default)]
    pub profit_amount: Option<Decimal>,
}

impl CreatePositionRequest {
    /// Creates a new builder for [`CreatePositionRequest`].
    #[must_use]
    pub fn builder() -> CreatePositionRequestBuilder {
        CreatePositionRequestBuilder::default()
    }

    /// Creates a plain market position request without stops or limits.
    #[must_use]
    pub fn new(epic: impl Into<String>, direction: CapitalComDirection, size: Decimal) -> Self {
        Self {
            epic: epic.into(),
            direction,
            size,
            guaranteed_stop: None,
            trailing_stop: None,
            stop_level: None,
            stop_distance: None,
            stop_amount: None,
            profit_level: None,
            profit_distance: None,
            profit_amount: None,
        }
    }
}

/// Request body for the `PUT /positions/{dealId}` endpoint.
///
/// Only the supplied fields are changed; omitted fields keep their current
/// values on the venue side.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePositionRequest {
    /// Whether the stop is guaranteed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guaranteed_stop: Option<bool>,
    /// Whether the stop trails the market.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_stop: Option<bool>,
    /// Absolute stop level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_level: Option<Decimal>,
    /// Stop distance from the current level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_distance: Option<Decimal>,
    /// Maximum loss amount for the stop.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_amount: Option<Decimal>,
    /// Absolute take-profit level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub profit_level: Option<Decimal>,
    /// Take-profit distance from the current level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub profit_distance: Option<Decimal>,
    /// Expected profit amount for the take-profit.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub profit_amount: Option<Decimal>,
}

impl UpdatePositionRequest {
    /// Creates a new builder for [`UpdatePositionRequest`].
    #[must_use]
    pub fn builder() -> UpdatePositionRequestBuilder {
        UpdatePositionRequestBuilder::default()
    }
}

/// Request body for the `POST /workingorders` endpoint.
#[derive(Clone, Debug, Deserialize, Serialize, Builder)]
#[builder(setter(into, strip_option))]
#[serde(rename_all = "camelCase")]
pub struct CreateWorkingOrderRequest {
    /// Instrument epic to trade.
    pub epic: String,
    /// Deal direction.
    pub direction: CapitalComDirection,
    /// Order type (`LIMIT` or `STOP`).
    #[serde(rename = "type")]
    pub order_type: CapitalComOrderType,
    /// Deal size.
    #[serde(with = "rust_decimal::serde::float")]
    pub size: Decimal,
    /// Order entry level.
    #[serde(with = "rust_decimal::serde::float")]
    pub level: Decimal,
    /// Expiry timestamp, format `2022-06-09T01:01:00`.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub good_till_date: Option<String>,
    /// Whether to attach a guaranteed stop.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub guaranteed_stop: Option<bool>,
    /// Whether to attach a trailing stop.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub trailing_stop: Option<bool>,
    /// Absolute stop level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[builder(default)]
    pub stop_level: Option<Decimal>,
    /// Stop distance from the entry level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[builder(default)]
    pub stop_distance: Option<Decimal>,
    /// Maximum loss amount for the stop.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[builder(default)]
    pub stop_amount: Option<Decimal>,
    /// Absolute take-profit level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[builder(default)]
    pub profit_level: Option<Decimal>,
    /// Take-profit distance from the entry level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[builder(default)]
    pub profit_distance: Option<Decimal>,
    /// Expected profit amount for the take-profit.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    #[builder(default)]
    pub profit_amount: Option<Decimal>,
}

impl CreateWorkingOrderRequest {
    /// Creates a new builder for [`CreateWorkingOrderRequest`].
    #[must_use]
    pub fn builder() -> CreateWorkingOrderRequestBuilder {
        CreateWorkingOrderRequestBuilder::default()
    }

    /// Creates a plain working order request without stops or limits.
    #[must_use]
    pub fn new(
        epic: impl Into<String>,
        direction: CapitalComDirection,
        order_type: CapitalComOrderType,
        size: Decimal,
        level: Decimal,
    ) -> Self {
        Self {
            epic: epic.into(),
            direction,
            order_type,
            size,
            level,
            good_till_date: None,
            guaranteed_stop: None,
            trailing_stop: None,
            stop_level: None,
            stop_distance: None,
            stop_amount: None,
            profit_level: None,
            profit_distance: None,
            profit_amount: None,
        }
    }
}

/// Request body for the `PUT /workingorders/{dealId}` endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateWorkingOrderRequest {
    /// Order entry level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub level: Option<Decimal>,
    /// Expiry timestamp, format `2022-06-09T01:01:00`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub good_till_date: Option<String>,
    /// Whether the stop is guaranteed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guaranteed_stop: Option<bool>,
    /// Whether the stop trails the market.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trailing_stop: Option<bool>,
    /// Absolute stop level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_level: Option<Decimal>,
    /// Stop distance from the entry level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_distance: Option<Decimal>,
    /// Maximum loss amount for the stop.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub stop_amount: Option<Decimal>,
    /// Absolute take-profit level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub profit_level: Option<Decimal>,
    /// Take-profit distance from the entry level.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub profit_distance: Option<Decimal>,
    /// Expected profit amount for the take-profit.
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub profit_amount: Option<Decimal>,
}

impl UpdateWorkingOrderRequest {
    /// Creates a new builder for [`UpdateWorkingOrderRequest`].
    #[must_use]
    pub fn builder() -> UpdateWorkingOrderRequestBuilder {
        UpdateWorkingOrderRequestBuilder::default()
    }
}

/// Request body for the `PUT /accounts/preferences` endpoint.
#[derive(Clone, Debug, Default, Deserialize, Serialize, Builder)]
#[builder(setter(into, strip_option), default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAccountPreferencesRequest {
    /// Leverage per instrument type.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub leverages: Option<HashMap<CapitalComInstrumentType, u32>>,
    /// Whether hedging mode is enabled.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hedging_mode: Option<bool>,
}

impl UpdateAccountPreferencesRequest {
    /// Creates a new builder for [`UpdateAccountPreferencesRequest`].
    #[must_use]
    pub fn builder() -> UpdateAccountPreferencesRequestBuilder {
        UpdateAccountPreferencesRequestBuilder::default()
    }
}

/// Request body for the `POST /watchlists` endpoint.
#[derive(Clone, Debug, Deserialize, Serialize, Builder)]
#[builder(setter(into, strip_option))]
#[serde(rename_all = "camelCase")]
pub struct CreateWatchlistRequest {
    /// Watchlist display name (maximum 20 characters).
    pub name: String,
    /// Epics to seed the watchlist with.
    #[serde(skip_serializing_if = "Option::is_none")]
    #[builder(default)]
    pub epics: Option<Vec<String>>,
}

impl CreateWatchlistRequest {
    /// Creates a new builder for [`CreateWatchlistRequest`].
    #[must_use]
    pub fn builder() -> CreateWatchlistRequestBuilder {
        CreateWatchlistRequestBuilder::default()
    }

    /// Creates an empty watchlist request with the given name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            epics: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal::prelude::FromPrimitive;

    use super::*;

    #[rstest]
    fn test_market_search_params_query_string() {
        let params = MarketSearchParams::from_epics(&["GOLD", "SILVER"]);
        let query = serde_urlencoded::to_string(&params).unwrap();

        assert_eq!(query, "epics=GOLD%2CSILVER");
    }

    #[rstest]
    fn test_get_prices_params_query_string() {
        let params = GetPricesParams::builder()
            .resolution(CapitalComResolution::Hour4)
            .max(100u32)
            .from("2022-02-24T00:00:00")
            .build()
            .unwrap();
        let query = serde_urlencoded::to_string(&params).unwrap();

        assert_eq!(query, "resolution=HOUR_4&max=100&from=2022-02-24T00%3A00%3A00");
    }

    #[rstest]
    fn test_activity_history_params_renames() {
        let params = GetActivityHistoryParams::builder()
            .last_period(3600u64)
            .deal_id("00018387-0001-54c4-0000-000080560014")
            .build()
            .unwrap();
        let query = serde_urlencoded::to_string(&params).unwrap();

        assert!(query.contains("lastPeriod=3600"));
        assert!(query.contains("dealId="));
    }

    #[rstest]
    fn test_transaction_history_type_rename() {
        let params = GetTransactionHistoryParams::builder()
            .transaction_type("TRADE")
            .build()
            .unwrap();
        let query = serde_urlencoded::to_string(&params).unwrap();

        assert_eq!(query, "type=TRADE");
    }

    #[rstest]
    fn test_create_position_request_serialization() {
        let request = CreatePositionRequest::builder()
            .epic("SILVER")
            .direction(CapitalComDirection::Buy)
            .size(Decimal::from_f64(1.5).unwrap())
            .stop_level(Decimal::from_f64(20.1).unwrap())
            .build()
            .unwrap();

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["epic"], "SILVER");
        assert_eq!(json["direction"], "BUY");
        assert_eq!(json["size"], 1.5);
        assert_eq!(json["stopLevel"], 20.1);
        assert!(json.get("profitLevel").is_none());
        assert!(json.get("guaranteedStop").is_none());
    }

    #[rstest]
    fn test_create_working_order_request_serialization() {
        let request = CreateWorkingOrderRequest::new(
            "GOLD",
            CapitalComDirection::Sell,
            CapitalComOrderType::Limit,
            Decimal::ONE,
            Decimal::from_f64(1900.0).unwrap(),
        );

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["epic"], "GOLD");
        assert_eq!(json["direction"], "SELL");
        assert_eq!(json["type"], "LIMIT");
        assert_eq!(json["size"], 1.0);
        assert_eq!(json["level"], 1900.0);
    }

    #[rstest]
    fn test_update_position_request_omits_unset_fields() {
        let request = UpdatePositionRequest::builder()
            .profit_level(Decimal::from_f64(2000.0).unwrap())
            .build()
            .unwrap();

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["profitLevel"], 2000.0);
        assert_eq!(json.as_object().unwrap().len(), 1);
    }

    #[rstest]
    fn test_update_account_preferences_request_serialization() {
        let mut leverages = HashMap::new();
        leverages.insert(CapitalComInstrumentType::Shares, 5);

        let request = UpdateAccountPreferencesRequest::builder()
            .leverages(leverages)
            .hedging_mode(false)
            .build()
            .unwrap();

        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["leverages"]["SHARES"], 5);
        assert_eq!(json["hedgingMode"], false);
    }
}
