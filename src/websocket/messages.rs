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

//! Data structures for Capital.com WebSocket messages.
//!
//! Every outbound frame shares one envelope: a `destination` naming the
//! operation, a client-assigned `correlationId`, the session token pair, and
//! an operation-specific `payload`. Inbound frames echo the envelope with a
//! `status` of `OK` or `ERROR`.

use std::{collections::HashMap, str::FromStr};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use ustr::Ustr;

use super::error::CapitalComWsError;
use crate::common::{
    credential::CapitalComSessionTokens,
    enums::{CapitalComOhlcType, CapitalComPriceType, CapitalComResolution, CapitalComWsDestination},
};

/// Outbound WebSocket request envelope.
#[derive(Debug, Clone, Serialize)]
pub struct CapitalComWsRequest<T> {
    /// Operation to perform.
    pub destination: CapitalComWsDestination,
    /// Client-assigned ID echoed back in the matching response.
    #[serde(rename = "correlationId")]
    pub correlation_id: String,
    /// Session CST token.
    pub cst: String,
    /// Session security token.
    #[serde(rename = "securityToken")]
    pub security_token: String,
    /// Operation payload, omitted for ping.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<T>,
}

impl<T: Serialize> CapitalComWsRequest<T> {
    /// Serializes the request to its wire form.
    ///
    /// # Errors
    ///
    /// Returns an error if JSON serialization fails.
    pub fn to_text(&self) -> Result<String, CapitalComWsError> {
        serde_json::to_string(self).map_err(Into::into)
    }
}

/// Payload for market data subscribe and unsubscribe requests.
#[derive(Debug, Clone, Serialize)]
pub struct CapitalComMarketDataSubscription {
    /// Epics to subscribe to (maximum 40 active per connection).
    pub epics: Vec<Ustr>,
}

/// Payload for OHLC subscribe requests.
#[derive(Debug, Clone, Serialize)]
pub struct CapitalComOhlcSubscription {
    /// Epics to subscribe to.
    pub epics: Vec<Ustr>,
    /// Bar resolutions to receive.
    pub resolutions: Vec<CapitalComResolution>,
    /// Bar aggregation type.
    #[serde(rename = "type")]
    pub ohlc_type: CapitalComOhlcType,
}

/// Payload for OHLC unsubscribe requests.
///
/// Unlike subscribe, the venue takes the aggregation types as an array here.
#[derive(Debug, Clone, Serialize)]
pub struct CapitalComOhlcUnsubscription {
    /// Epics to unsubscribe from.
    pub epics: Vec<Ustr>,
    /// Bar resolutions to stop receiving.
    pub resolutions: Vec<CapitalComResolution>,
    /// Bar aggregation types to stop receiving.
    pub types: Vec<CapitalComOhlcType>,
}

impl CapitalComWsRequest<CapitalComMarketDataSubscription> {
    /// Builds a `marketData.subscribe` request.
    #[must_use]
    pub fn market_data_subscribe(
        epics: Vec<Ustr>,
        correlation_id: String,
        tokens: &CapitalComSessionTokens,
    ) -> Self {
        Self {
            destination: CapitalComWsDestination::MarketDataSubscribe,
            correlation_id,
            cst: tokens.cst.clone(),
            security_token: tokens.security_token.clone(),
            payload: Some(CapitalComMarketDataSubscription { epics }),
        }
    }

    /// Builds a `marketData.unsubscribe` request.
    #[must_use]
    pub fn market_data_unsubscribe(
        epics: Vec<Ustr>,
        correlation_id: String,
        tokens: &CapitalComSessionTokens,
    ) -> Self {
        Self {
            destination: CapitalComWsDestination::MarketDataUnsubscribe,
            correlation_id,
            cst: tokens.cst.clone(),
            security_token: tokens.security_token.clone(),
            payload: Some(CapitalComMarketDataSubscription { epics }),
        }
    }
}

impl CapitalComWsRequest<CapitalComOhlcSubscription> {
    /// Builds an `OHLCMarketData.subscribe` request.
    #[must_use]
    pub fn ohlc_subscribe(
        epics: Vec<Ustr>,
        resolutions: Vec<CapitalComResolution>,
        ohlc_type: CapitalComOhlcType,
        correlation_id: String,
        tokens: &CapitalComSessionTokens,
    ) -> Self {
        Self {
            destination: CapitalComWsDestination::OhlcMarketDataSubscribe,
            correlation_id,
            cst: tokens.cst.clone(),
            security_token: tokens.security_token.clone(),
            payload: Some(CapitalComOhlcSubscription {
                epics,
                resolutions,
                ohlc_type,
            }),
        }
    }
}

impl CapitalComWsRequest<CapitalComOhlcUnsubscription> {
    /// Builds an `OHLCMarketData.unsubscribe` request.
    #[must_use]
    pub fn ohlc_unsubscribe(
        epics: Vec<Ustr>,
        resolutions: Vec<CapitalComResolution>,
        types: Vec<CapitalComOhlcType>,
        correlation_id: String,
        tokens: &CapitalComSessionTokens,
    ) -> Self {
        Self {
            destination: CapitalComWsDestination::OhlcMarketDataUnsubscribe,
            correlation_id,
            cst: tokens.cst.clone(),
            security_token: tokens.security_token.clone(),
            payload: Some(CapitalComOhlcUnsubscription {
                epics,
                resolutions,
                types,
            }),
        }
    }
}

impl CapitalComWsRequest<()> {
    /// Builds a `ping` request (no payload).
    #[must_use]
    pub fn ping(correlation_id: String, tokens: &CapitalComSessionTokens) -> Self {
        Self {
            destination: CapitalComWsDestination::Ping,
            correlation_id,
            cst: tokens.cst.clone(),
            security_token: tokens.security_token.clone(),
            payload: None,
        }
    }
}

/// One entry in the client subscription table.
///
/// The table carries the subscriptions to replay after a reconnect; entries
/// are added before a subscribe request is sent and removed on unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapitalComSubscription {
    /// Live bid/offer quotes for an epic.
    MarketData {
        /// Instrument epic.
        epic: Ustr,
    },
    /// Live OHLC bars for an epic at one resolution.
    Ohlc {
        /// Instrument epic.
        epic: Ustr,
        /// Bar resolution.
        resolution: CapitalComResolution,
        /// Bar aggregation type.
        ohlc_type: CapitalComOhlcType,
    },
}

/// Raw inbound WebSocket frame.
#[derive(Debug, Clone, Deserialize)]
pub struct CapitalComWsMessage {
    /// Response status, `OK` or `ERROR`.
    #[serde(default)]
    pub status: Option<String>,
    /// Destination the frame belongs to.
    pub destination: String,
    /// Correlation ID echoed from the request, absent on data pushes.
    #[serde(default, rename = "correlationId")]
    pub correlation_id: Option<String>,
    /// Destination-specific payload.
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Top of book quote update from the `quote` destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComQuote {
    /// Instrument epic.
    pub epic: Ustr,
    /// Product type (e.g. "CFD").
    #[serde(default)]
    pub product: Option<String>,
    /// Bid price.
    pub bid: Decimal,
    /// Quantity available at the bid.
    #[serde(default)]
    pub bid_qty: Option<Decimal>,
    /// Offer price.
    pub ofr: Decimal,
    /// Quantity available at the offer.
    #[serde(default)]
    pub ofr_qty: Option<Decimal>,
    /// Quote timestamp in milliseconds since the epoch.
    pub timestamp: i64,
}

/// OHLC bar update from the `ohlc.event` destination.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CapitalComOhlcBar {
    /// Bar resolution.
    pub resolution: CapitalComResolution,
    /// Instrument epic.
    pub epic: Ustr,
    /// Bar aggregation type.
    #[serde(rename = "type")]
    pub ohlc_type: CapitalComOhlcType,
    /// Side of book the bar is built from.
    pub price_type: CapitalComPriceType,
    /// Bar timestamp in milliseconds since the epoch.
    pub t: i64,
    /// Open price.
    pub o: Decimal,
    /// High price.
    pub h: Decimal,
    /// Low price.
    pub l: Decimal,
    /// Close price.
    pub c: Decimal,
}

/// Subscription acknowledgement with the per-epic outcome.
#[derive(Debug, Clone)]
pub struct CapitalComSubscriptionAck {
    /// The subscribe or unsubscribe destination acknowledged.
    pub destination: CapitalComWsDestination,
    /// Correlation ID echoed from the request.
    pub correlation_id: Option<String>,
    /// Per-epic status, `PROCESSED` on success or an error string.
    pub subscriptions: HashMap<Ustr, String>,
}

#[derive(Debug, Deserialize)]
struct SubscriptionsPayload {
    #[serde(default)]
    subscriptions: HashMap<Ustr, String>,
}

#[derive(Debug, Deserialize)]
struct ErrorPayload {
    #[serde(default)]
    error: Option<String>,
}

/// Events emitted on the client event stream.
#[derive(Debug, Clone)]
pub enum CapitalComWsEvent {
    /// Initial connection established.
    Connected,
    /// Connection re-established after an unexpected drop.
    Reconnected,
    /// Connection closed.
    Disconnected,
    /// Top of book quote update.
    Quote(CapitalComQuote),
    /// OHLC bar update.
    Ohlc(CapitalComOhlcBar),
    /// Subscription acknowledgement.
    SubscriptionAck(CapitalComSubscriptionAck),
    /// Ping acknowledgement.
    PingAck {
        /// Correlation ID echoed from the ping request.
        correlation_id: Option<String>,
    },
    /// Unrecognized message passed through for debugging.
    Message(serde_json::Value),
    /// Non-fatal error surfaced on the event stream.
    Error(CapitalComWsError),
}

/// Parses a raw inbound frame into an event.
///
/// Frames with an unrecognized shape but valid JSON are passed through as
/// [`CapitalComWsEvent::Message`]; only invalid JSON or an undecodable payload
/// for a known destination produce an error.
///
/// # Errors
///
/// Returns an error if the text is not valid JSON or a known destination
/// carries a payload that fails to deserialize.
pub fn parse_ws_message(text: &str) -> Result<CapitalComWsEvent, CapitalComWsError> {
    let value: serde_json::Value = serde_json::from_str(text)?;

    let Ok(message) = serde_json::from_value::<CapitalComWsMessage>(value.clone()) else {
        return Ok(CapitalComWsEvent::Message(value));
    };

    let is_error = message.status.as_deref() == Some("ERROR");

    match CapitalComWsDestination::from_str(&message.destination) {
        Ok(CapitalComWsDestination::Quote) => {
            let quote: CapitalComQuote = serde_json::from_value(message.payload)?;
            Ok(CapitalComWsEvent::Quote(quote))
        }
        Ok(CapitalComWsDestination::OhlcEvent) => {
            let bar: CapitalComOhlcBar = serde_json::from_value(message.payload)?;
            Ok(CapitalComWsEvent::Ohlc(bar))
        }
        Ok(CapitalComWsDestination::Ping) => {
            if is_error {
                Ok(CapitalComWsEvent::Error(CapitalComWsError::VenueError(
                    error_text(&message.payload),
                )))
            } else {
                Ok(CapitalComWsEvent::PingAck {
                    correlation_id: message.correlation_id,
                })
            }
        }
        Ok(destination) => {
            // Remaining destinations are subscribe/unsubscribe acknowledgements
            let payload: SubscriptionsPayload = serde_json::from_value(message.payload.clone())
                .unwrap_or(SubscriptionsPayload {
                    subscriptions: HashMap::new(),
                });

            if payload.subscriptions.is_empty() && is_error {
                return Ok(CapitalComWsEvent::Error(CapitalComWsError::VenueError(
                    error_text(&message.payload),
                )));
            }

            Ok(CapitalComWsEvent::SubscriptionAck(
                CapitalComSubscriptionAck {
                    destination,
                    correlation_id: message.correlation_id,
                    subscriptions: payload.subscriptions,
                },
            ))
        }
        Err(_) => {
            if is_error {
                Ok(CapitalComWsEvent::Error(CapitalComWsError::VenueError(
                    error_text(&message.payload),
                )))
            } else {
                Ok(CapitalComWsEvent::Message(value))
            }
        }
    }
}

fn error_text(payload: &serde_json::Value) -> String {
    serde_json::from_value::<ErrorPayload>(payload.clone())
        .ok()
        .and_then(|p| p.error)
        .unwrap_or_else(|| payload.to_string())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use super::*;

    fn test_tokens() -> CapitalComSessionTokens {
        CapitalComSessionTokens::new("a".to_string(), "b".to_string())
    }

    #[rstest]
    fn test_market_data_subscribe_frame_shape() {
        let request = CapitalComWsRequest::market_data_subscribe(
            vec![Ustr::from("GOLD")],
            "1".to_string(),
            &test_tokens(),
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "destination": "marketData.subscribe",
                "correlationId": "1",
                "cst": "a",
                "securityToken": "b",
                "payload": {
                    "epics": ["GOLD"]
                }
            })
        );
    }

    #[rstest]
    fn test_ping_frame_has_no_payload() {
        let request = CapitalComWsRequest::ping("7".to_string(), &test_tokens());

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            json!({
                "destination": "ping",
                "correlationId": "7",
                "cst": "a",
                "securityToken": "b"
            })
        );
    }

    #[rstest]
    fn test_ohlc_subscribe_frame_shape() {
        let request = CapitalComWsRequest::ohlc_subscribe(
            vec![Ustr::from("GOLD"), Ustr::from("SILVER")],
            vec![CapitalComResolution::Minute, CapitalComResolution::Hour],
            CapitalComOhlcType::Classic,
            "2".to_string(),
            &test_tokens(),
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["destination"], "OHLCMarketData.subscribe");
        assert_eq!(value["payload"]["epics"], json!(["GOLD", "SILVER"]));
        assert_eq!(value["payload"]["resolutions"], json!(["MINUTE", "HOUR"]));
        assert_eq!(value["payload"]["type"], "classic");
    }

    #[rstest]
    fn test_ohlc_unsubscribe_takes_types_array() {
        let request = CapitalComWsRequest::ohlc_unsubscribe(
            vec![Ustr::from("GOLD")],
            vec![CapitalComResolution::Minute5],
            vec![CapitalComOhlcType::HeikinAshi],
            "3".to_string(),
            &test_tokens(),
        );

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["destination"], "OHLCMarketData.unsubscribe");
        assert_eq!(value["payload"]["resolutions"], json!(["MINUTE_5"]));
        assert_eq!(value["payload"]["types"], json!(["heikin-ashi"]));
        assert!(value["payload"].get("type").is_none());
    }

    #[rstest]
    fn test_parse_quote() {
        let json = include_str!("../../test_data/ws_quote.json");

        let event = parse_ws_message(json).unwrap();
        let CapitalComWsEvent::Quote(quote) = event else {
            panic!("Expected quote event");
        };

        assert_eq!(quote.epic, Ustr::from("GOLD"));
        assert_eq!(quote.product.as_deref(), Some("CFD"));
        assert_eq!(quote.bid, dec!(1738.55));
        assert_eq!(quote.ofr, dec!(1738.70));
        assert_eq!(quote.bid_qty, Some(dec!(2)));
        assert_eq!(quote.timestamp, 1_653_312_712_487);
    }

    #[rstest]
    fn test_parse_ohlc_event() {
        let json = include_str!("../../test_data/ws_ohlc_event.json");

        let event = parse_ws_message(json).unwrap();
        let CapitalComWsEvent::Ohlc(bar) = event else {
            panic!("Expected OHLC event");
        };

        assert_eq!(bar.epic, Ustr::from("GOLD"));
        assert_eq!(bar.resolution, CapitalComResolution::Minute);
        assert_eq!(bar.ohlc_type, CapitalComOhlcType::Classic);
        assert_eq!(bar.price_type, CapitalComPriceType::Bid);
        assert_eq!(bar.o, dec!(1738.50));
        assert_eq!(bar.c, dec!(1738.55));
    }

    #[rstest]
    fn test_parse_subscription_ack() {
        let json = include_str!("../../test_data/ws_subscribe_response.json");

        let event = parse_ws_message(json).unwrap();
        let CapitalComWsEvent::SubscriptionAck(ack) = event else {
            panic!("Expected subscription ack");
        };

        assert_eq!(
            ack.destination,
            CapitalComWsDestination::MarketDataSubscribe
        );
        assert_eq!(ack.correlation_id.as_deref(), Some("1"));
        assert_eq!(
            ack.subscriptions.get(&Ustr::from("GOLD")).map(String::as_str),
            Some("PROCESSED")
        );
    }

    #[rstest]
    fn test_parse_ping_ack() {
        let json = include_str!("../../test_data/ws_ping_response.json");

        let event = parse_ws_message(json).unwrap();
        assert!(matches!(
            event,
            CapitalComWsEvent::PingAck {
                correlation_id: Some(ref id)
            } if id == "2"
        ));
    }

    #[rstest]
    fn test_parse_error_frame() {
        let json = r#"{
            "status": "ERROR",
            "destination": "marketData.subscribe",
            "correlationId": "4",
            "payload": {
                "error": "websocket.session.invalid"
            }
        }"#;

        let event = parse_ws_message(json).unwrap();
        let CapitalComWsEvent::Error(CapitalComWsError::VenueError(error)) = event else {
            panic!("Expected venue error event");
        };
        assert_eq!(error, "websocket.session.invalid");
    }

    #[rstest]
    fn test_parse_malformed_json_is_error() {
        let result = parse_ws_message("{not json");
        assert!(matches!(result, Err(CapitalComWsError::Json(_))));
    }

    #[rstest]
    fn test_parse_unknown_destination_passes_through() {
        let json = r#"{"status": "OK", "destination": "server.notice", "payload": {"text": "hello"}}"#;

        let event = parse_ws_message(json).unwrap();
        assert!(matches!(event, CapitalComWsEvent::Message(_)));
    }
}
