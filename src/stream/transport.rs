//! Duplex transport binding for the market data stream
//!
//! The stream endpoint is treated as an opaque bidirectional channel of typed
//! messages; [`MarketDataTransport`] is the seam, [`WsTransport`] the
//! production WebSocket binding.

use super::types::{decode_event, encode_request, MarketDataRequest, StreamError, StreamEvent};
use async_trait::async_trait;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::header::AUTHORIZATION;
use tokio_tungstenite::tungstenite::http::HeaderValue;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};
use uuid::Uuid;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;
type WsSource = SplitStream<WebSocketStream<MaybeTlsStream<TcpStream>>>;

/// One open duplex session: outbound requests in, inbound events out.
///
/// The returned receiver lives as long as the session; dropping it (or
/// closing the request channel) releases the underlying connection.
#[async_trait]
pub trait MarketDataTransport: Send + Sync {
    /// Open a session, binding `requests` to the outbound half
    async fn open(
        &self,
        requests: mpsc::Receiver<MarketDataRequest>,
    ) -> Result<mpsc::Receiver<StreamEvent>, StreamError>;
}

/// WebSocket binding against the configured stream endpoint
pub struct WsTransport {
    url: String,
    api_token: String,
    app_name: String,
    buffer_size: usize,
}

impl WsTransport {
    /// Create a transport for the given endpoint and credentials
    pub fn new(
        url: impl Into<String>,
        api_token: impl Into<String>,
        app_name: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            api_token: api_token.into(),
            app_name: app_name.into(),
            buffer_size: 256,
        }
    }

    /// Set the inbound channel buffer size
    pub fn buffer_size(mut self, n: usize) -> Self {
        self.buffer_size = n;
        self
    }

    fn build_request(
        &self,
        tracking_id: &str,
    ) -> Result<tokio_tungstenite::tungstenite::handshake::client::Request, StreamError> {
        let mut request = self
            .url
            .as_str()
            .into_client_request()
            .map_err(|e| StreamError::Connect(e.to_string()))?;

        let bearer = HeaderValue::from_str(&format!("Bearer {}", self.api_token))
            .map_err(|_| StreamError::Connect("API token is not a valid header value".into()))?;
        let app_name = HeaderValue::from_str(&self.app_name)
            .map_err(|_| StreamError::Connect("app name is not a valid header value".into()))?;
        let tracking = HeaderValue::from_str(tracking_id)
            .map_err(|_| StreamError::Connect("tracking id is not a valid header value".into()))?;

        let headers = request.headers_mut();
        headers.insert(AUTHORIZATION, bearer);
        headers.insert("x-app-name", app_name);
        headers.insert("x-tracking-id", tracking);
        Ok(request)
    }
}

#[async_trait]
impl MarketDataTransport for WsTransport {
    async fn open(
        &self,
        requests: mpsc::Receiver<MarketDataRequest>,
    ) -> Result<mpsc::Receiver<StreamEvent>, StreamError> {
        let tracking_id = Uuid::new_v4().to_string();
        let request = self.build_request(&tracking_id)?;

        tracing::debug!(url = %self.url, tracking_id = %tracking_id, "connecting to market data stream");

        let (ws_stream, _response) = connect_async(request)
            .await
            .map_err(|e| StreamError::Connect(e.to_string()))?;

        tracing::info!(tracking_id = %tracking_id, "market data stream connected");

        let (write, read) = ws_stream.split();
        let (tx, rx) = mpsc::channel(self.buffer_size);

        tokio::spawn(run_io_loop(write, read, requests, tx));

        Ok(rx)
    }
}

/// Multiplex the socket: drain outbound requests, decode inbound frames.
///
/// No read timeout is applied; a stalled remote blocks until the connection
/// itself drops.
async fn run_io_loop(
    mut write: WsSink,
    mut read: WsSource,
    mut requests: mpsc::Receiver<MarketDataRequest>,
    tx: mpsc::Sender<StreamEvent>,
) {
    loop {
        tokio::select! {
            request = requests.recv() => {
                match request {
                    Some(request) => match encode_request(&request) {
                        // Keep-alive ticks only hold the outbound half open
                        Ok(None) => {}
                        Ok(Some(frame)) => {
                            if let Err(e) = write.send(Message::Text(frame)).await {
                                let _ = tx.send(Err(StreamError::Transport(e.to_string()))).await;
                                break;
                            }
                        }
                        Err(e) => {
                            let _ = tx.send(Err(e)).await;
                            break;
                        }
                    },
                    None => {
                        // Request source ended: the session is being torn down
                        tracing::debug!("request channel closed, closing stream");
                        let _ = write.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
            incoming = read.next() => {
                match incoming {
                    Some(Ok(Message::Text(text))) => {
                        if tx.send(Ok(decode_event(&text))).await.is_err() {
                            tracing::debug!("event receiver dropped, closing stream");
                            let _ = write.send(Message::Close(None)).await;
                            break;
                        }
                    }
                    Some(Ok(Message::Ping(payload))) => {
                        if write.send(Message::Pong(payload)).await.is_err() {
                            let _ = tx
                                .send(Err(StreamError::Transport("pong send failed".into())))
                                .await;
                            break;
                        }
                    }
                    Some(Ok(Message::Close(_))) => {
                        tracing::info!("server closed the stream");
                        break;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        let _ = tx.send(Err(StreamError::Transport(e.to_string()))).await;
                        break;
                    }
                    None => {
                        tracing::info!("stream ended");
                        break;
                    }
                }
            }
        }
    }
}
