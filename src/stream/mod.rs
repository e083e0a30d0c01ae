//! Market data streaming module
//!
//! A duplex session against the market data feed: an outbound request source
//! (subscribe handshake plus keep-alive), a transport binding, a dispatch
//! loop for inbound events, and a cooperative shutdown flag tying the three
//! together.

mod client;
mod dispatcher;
mod requests;
mod shutdown;
mod transport;
mod types;

pub use client::{
    OrderBookStream, StreamConfig, DEFAULT_DEPTH, PRODUCTION_STREAM_URL, SANDBOX_STREAM_URL,
};
pub use dispatcher::run_dispatch_loop;
pub use requests::spawn_request_source;
pub use shutdown::ShutdownFlag;
pub use transport::{MarketDataTransport, WsTransport};
pub use types::{
    decode_event, encode_request, MarketDataEvent, MarketDataRequest, OrderBookSubscription,
    StreamError, StreamEvent, SubscribeOrderBookResult,
};
