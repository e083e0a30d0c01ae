//! Stream protocol messages and wire codec
//!
//! Inbound payloads are decoded once, at the transport boundary, into the
//! [`MarketDataEvent`] enum; everything downstream matches on the variants.
//! Wire field names follow the API's JSON mapping (camelCase, int64 carried
//! as either number or string).

use crate::config::ConfigError;
use crate::orderbook::{OrderBookUpdate, OrderLevel, Quotation};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Subscription action sent in the handshake
pub const SUBSCRIPTION_ACTION_SUBSCRIBE: &str = "SUBSCRIPTION_ACTION_SUBSCRIBE";
/// Status reported for a successfully registered subscription
pub const SUBSCRIPTION_STATUS_SUCCESS: &str = "SUBSCRIPTION_STATUS_SUCCESS";

/// Streaming errors surfaced to the subscribe caller
#[derive(Debug, Error)]
pub enum StreamError {
    /// Configuration was unusable before a session could be opened
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    /// Connecting or authenticating against the stream endpoint failed
    #[error("failed to open market data stream: {0}")]
    Connect(String),
    /// The transport failed while the session was open
    #[error("market data transport failed: {0}")]
    Transport(String),
    /// An outbound request could not be encoded
    #[error("failed to encode stream request: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Outbound protocol messages produced by the request source
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketDataRequest {
    /// Subscribe to order book updates for one instrument
    SubscribeOrderBook { instrument_id: String, depth: u32 },
    /// Keeps the outbound half of the session open between requests.
    /// Never written to the wire.
    KeepAlive,
}

/// Inbound events yielded by an open session
#[derive(Debug, Clone)]
pub enum MarketDataEvent {
    /// An order book snapshot for the subscribed instrument
    OrderBook(OrderBookUpdate),
    /// Acknowledgment of the subscribe handshake
    SubscriptionResult(SubscribeOrderBookResult),
    /// Anything the client does not act on (server pings included)
    Other,
}

/// One item on the inbound channel: an event, or a transport failure
pub type StreamEvent = Result<MarketDataEvent, StreamError>;

/// Acknowledgment payload for an order book subscribe request
#[derive(Debug, Clone)]
pub struct SubscribeOrderBookResult {
    /// Per-instrument subscription outcomes
    pub subscriptions: Vec<OrderBookSubscription>,
}

/// Outcome of one instrument subscription
#[derive(Debug, Clone)]
pub struct OrderBookSubscription {
    /// Instrument uid echoed by the server, when present
    pub instrument_uid: Option<String>,
    /// Raw subscription status string
    pub status: String,
}

impl OrderBookSubscription {
    /// True when the server registered the subscription
    pub fn is_success(&self) -> bool {
        self.status == SUBSCRIPTION_STATUS_SUCCESS
    }
}

/// Encode an outbound request as a wire frame.
///
/// Returns `None` for messages that exist only to keep the producer alive.
pub fn encode_request(request: &MarketDataRequest) -> Result<Option<String>, StreamError> {
    match request {
        MarketDataRequest::SubscribeOrderBook {
            instrument_id,
            depth,
        } => {
            let wire = WireRequest {
                subscribe_order_book_request: WireSubscribeRequest {
                    subscription_action: SUBSCRIPTION_ACTION_SUBSCRIBE,
                    instruments: vec![WireInstrument {
                        instrument_id,
                        depth: *depth,
                    }],
                },
            };
            Ok(Some(serde_json::to_string(&wire)?))
        }
        MarketDataRequest::KeepAlive => Ok(None),
    }
}

/// Decode an inbound wire frame.
///
/// Unknown or malformed payloads decode to [`MarketDataEvent::Other`]; a bad
/// frame must not take down the session.
pub fn decode_event(text: &str) -> MarketDataEvent {
    let wire: WireEvent = match serde_json::from_str(text) {
        Ok(wire) => wire,
        Err(error) => {
            tracing::debug!(
                error = %error,
                preview = %text.chars().take(100).collect::<String>(),
                "unrecognized stream payload"
            );
            return MarketDataEvent::Other;
        }
    };

    if let Some(book) = wire.orderbook {
        return MarketDataEvent::OrderBook(book.into_update());
    }
    if let Some(response) = wire.subscribe_order_book_response {
        return MarketDataEvent::SubscriptionResult(response.into_result());
    }
    MarketDataEvent::Other
}

/// Outbound envelope
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireRequest<'a> {
    subscribe_order_book_request: WireSubscribeRequest<'a>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireSubscribeRequest<'a> {
    subscription_action: &'a str,
    instruments: Vec<WireInstrument<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct WireInstrument<'a> {
    instrument_id: &'a str,
    depth: u32,
}

/// Inbound envelope; exactly one payload field is populated per frame
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireEvent {
    orderbook: Option<WireOrderBook>,
    subscribe_order_book_response: Option<WireSubscribeResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireOrderBook {
    figi: String,
    #[serde(default)]
    depth: u32,
    #[serde(default)]
    bids: Vec<WireOrder>,
    #[serde(default)]
    asks: Vec<WireOrder>,
    time: Option<String>,
}

impl WireOrderBook {
    fn into_update(self) -> OrderBookUpdate {
        let time = self
            .time
            .as_deref()
            .and_then(|t| DateTime::parse_from_rfc3339(t).ok())
            .map(|t| t.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        OrderBookUpdate {
            figi: self.figi,
            depth: self.depth,
            bids: self.bids.into_iter().map(WireOrder::into_level).collect(),
            asks: self.asks.into_iter().map(WireOrder::into_level).collect(),
            time,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireOrder {
    price: WireQuotation,
    #[serde(default, deserialize_with = "flexible_i64")]
    quantity: i64,
}

impl WireOrder {
    fn into_level(self) -> OrderLevel {
        OrderLevel {
            price: Quotation::new(self.price.units, self.price.nano),
            quantity: self.quantity,
        }
    }
}

#[derive(Debug, Deserialize)]
struct WireQuotation {
    #[serde(default, deserialize_with = "flexible_i64")]
    units: i64,
    #[serde(default)]
    nano: i32,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSubscribeResponse {
    #[serde(default)]
    order_book_subscriptions: Vec<WireSubscription>,
}

impl WireSubscribeResponse {
    fn into_result(self) -> SubscribeOrderBookResult {
        SubscribeOrderBookResult {
            subscriptions: self
                .order_book_subscriptions
                .into_iter()
                .map(|s| OrderBookSubscription {
                    instrument_uid: s.instrument_uid.filter(|uid| !uid.is_empty()),
                    status: s.subscription_status,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireSubscription {
    instrument_uid: Option<String>,
    #[serde(default)]
    subscription_status: String,
}

/// int64 arrives as a JSON number or as a quoted string
fn flexible_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(i64),
        String(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::String(s) => s.parse().map_err(serde::de::Error::custom),
    }
}
