//! Order book stream client
//!
//! One client drives one streaming session: it spawns the request source,
//! opens the duplex transport, and runs the dispatch loop until the session
//! ends or [`OrderBookStream::stop`] is called.

use super::dispatcher::run_dispatch_loop;
use super::requests::spawn_request_source;
use super::shutdown::ShutdownFlag;
use super::transport::{MarketDataTransport, WsTransport};
use super::types::StreamError;
use crate::config::{Config, ConfigError};
use crate::orderbook::OrderBookUpdate;
use std::future::Future;
use std::time::Duration;

/// Production market data stream endpoint
pub const PRODUCTION_STREAM_URL: &str = "wss://invest-public-api.tinkoff.ru/ws/market-data-stream";
/// Sandbox market data stream endpoint
pub const SANDBOX_STREAM_URL: &str =
    "wss://sandbox-invest-public-api.tinkoff.ru/ws/market-data-stream";

/// Book depth requested when the caller does not pick one
pub const DEFAULT_DEPTH: u32 = 10;

/// Streaming session tuning
#[derive(Debug, Clone)]
pub struct StreamConfig {
    /// Stream endpoint URL
    pub ws_url: String,
    /// Interval between keep-alive ticks of the request source
    pub keepalive_interval: Duration,
    /// Inbound event channel buffer size
    pub buffer_size: usize,
}

impl StreamConfig {
    /// Endpoint and defaults for the selected environment
    pub fn for_environment(use_sandbox: bool) -> Self {
        let ws_url = if use_sandbox {
            SANDBOX_STREAM_URL
        } else {
            PRODUCTION_STREAM_URL
        };
        Self {
            ws_url: ws_url.to_string(),
            keepalive_interval: Duration::from_secs(1),
            buffer_size: 256,
        }
    }

    /// Set the keep-alive interval
    pub fn keepalive_interval(mut self, d: Duration) -> Self {
        self.keepalive_interval = d;
        self
    }

    /// Set the inbound buffer size
    pub fn buffer_size(mut self, n: usize) -> Self {
        self.buffer_size = n;
        self
    }
}

/// Client for one order book streaming session
pub struct OrderBookStream {
    api_token: String,
    app_name: String,
    stream_config: StreamConfig,
    shutdown: ShutdownFlag,
}

impl OrderBookStream {
    /// Create a client for the environment selected by the configuration
    pub fn new(config: &Config) -> Self {
        let mode = if config.use_sandbox {
            "sandbox"
        } else {
            "production"
        };
        tracing::info!(mode, app_name = %config.app_name, "initializing order book stream");
        Self::with_stream_config(config, StreamConfig::for_environment(config.use_sandbox))
    }

    /// Create a client with explicit stream tuning
    pub fn with_stream_config(config: &Config, stream_config: StreamConfig) -> Self {
        Self {
            api_token: config.api_token.clone(),
            app_name: config.app_name.clone(),
            stream_config,
            shutdown: ShutdownFlag::new(),
        }
    }

    /// Handle for requesting shutdown from another task
    pub fn shutdown_handle(&self) -> ShutdownFlag {
        self.shutdown.clone()
    }

    /// Signal the running session to stop. Idempotent, fire-and-forget.
    pub fn stop(&self) {
        self.shutdown.stop();
        tracing::info!("stop signal sent");
    }

    /// Subscribe to order book updates and dispatch them to `callback`.
    ///
    /// Suspends until the session ends: server close, [`stop`], or an
    /// unrecoverable transport failure (returned as [`StreamError`]). The
    /// callback is awaited per update; its errors are logged and contained.
    ///
    /// [`stop`]: OrderBookStream::stop
    pub async fn subscribe_to_orderbook<F, Fut>(
        &self,
        instrument_id: &str,
        depth: u32,
        callback: F,
    ) -> Result<(), StreamError>
    where
        F: FnMut(OrderBookUpdate) -> Fut + Send,
        Fut: Future<Output = anyhow::Result<()>> + Send,
    {
        let transport = WsTransport::new(
            self.stream_config.ws_url.clone(),
            self.api_token.clone(),
            self.app_name.clone(),
        )
        .buffer_size(self.stream_config.buffer_size);

        self.subscribe_with_transport(&transport, instrument_id, depth, callback)
            .await
    }

    /// Subscribe over an explicit transport.
    ///
    /// The session is released on every exit path, and the shutdown flag
    /// always ends set so later inspection never sees a stale running state.
    pub async fn subscribe_with_transport<T, F, Fut>(
        &self,
        transport: &T,
        instrument_id: &str,
        depth: u32,
        callback: F,
    ) -> Result<(), StreamError>
    where
        T: MarketDataTransport + ?Sized,
        F: FnMut(OrderBookUpdate) -> Fut + Send,
        Fut: Future<Output = anyhow::Result<()>> + Send,
    {
        if self.api_token.trim().is_empty() {
            self.shutdown.stop();
            return Err(StreamError::Config(ConfigError::MissingToken));
        }

        let requests = spawn_request_source(
            instrument_id,
            depth,
            self.stream_config.keepalive_interval,
            self.shutdown.clone(),
        );

        let events = match transport.open(requests).await {
            Ok(events) => events,
            Err(error) => {
                self.shutdown.stop();
                return Err(error);
            }
        };

        tracing::info!(instrument_id = %instrument_id, depth, "order book subscription sent");

        let result = run_dispatch_loop(events, instrument_id, &self.shutdown, callback).await;

        // Dropping `events` above (by return) releases the transport; the
        // flag must read stopped regardless of how the loop ended.
        self.shutdown.stop();

        match &result {
            Ok(()) => tracing::info!("order book stream stopped"),
            Err(error) => tracing::error!(error = %error, "order book stream failed"),
        }
        result
    }
}
