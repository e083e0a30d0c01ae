//! Integration tests for the order book streaming session
//!
//! Drive full sessions through a scripted transport: no network, real
//! request source, dispatcher, and shutdown wiring.

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tinvest_bot::config::{Config, ConfigError};
use tinvest_bot::orderbook::{OrderBookUpdate, OrderLevel, Quotation};
use tinvest_bot::stream::{
    MarketDataEvent, MarketDataRequest, MarketDataTransport, OrderBookStream,
    OrderBookSubscription, StreamConfig, StreamError, StreamEvent, SubscribeOrderBookResult,
};
use tokio::sync::mpsc;
use tokio::time::timeout;

fn test_config() -> Config {
    Config {
        api_token: "t.secret".to_string(),
        use_sandbox: true,
        app_name: "tinvest-bot".to_string(),
        log_level: "info".to_string(),
        metrics_port: None,
    }
}

fn fast_client() -> OrderBookStream {
    let stream_config =
        StreamConfig::for_environment(true).keepalive_interval(Duration::from_millis(10));
    OrderBookStream::with_stream_config(&test_config(), stream_config)
}

fn update_with_sides(figi: &str) -> OrderBookUpdate {
    let mut update = OrderBookUpdate::new(figi);
    update.bids = vec![OrderLevel {
        price: Quotation::new(100, 0),
        quantity: 1,
    }];
    update.asks = vec![OrderLevel {
        price: Quotation::new(101, 0),
        quantity: 1,
    }];
    update
}

/// Transport that replays a scripted inbound sequence and records every
/// outbound request it sees.
struct ScriptedTransport {
    events: Mutex<Option<Vec<StreamEvent>>>,
    recorded: Arc<Mutex<Vec<MarketDataRequest>>>,
    /// Keep the inbound channel open after the script runs out, instead of
    /// ending the stream.
    hold_open: bool,
}

impl ScriptedTransport {
    fn new(events: Vec<StreamEvent>) -> Self {
        Self {
            events: Mutex::new(Some(events)),
            recorded: Arc::new(Mutex::new(Vec::new())),
            hold_open: false,
        }
    }

    fn held_open(events: Vec<StreamEvent>) -> Self {
        Self {
            hold_open: true,
            ..Self::new(events)
        }
    }

    fn recorded(&self) -> Arc<Mutex<Vec<MarketDataRequest>>> {
        self.recorded.clone()
    }
}

#[async_trait]
impl MarketDataTransport for ScriptedTransport {
    async fn open(
        &self,
        mut requests: mpsc::Receiver<MarketDataRequest>,
    ) -> Result<mpsc::Receiver<StreamEvent>, StreamError> {
        let scripted = self
            .events
            .lock()
            .unwrap()
            .take()
            .expect("transport opened twice");
        let recorded = self.recorded.clone();
        let hold_open = self.hold_open;
        let (tx, rx) = mpsc::channel(256);

        tokio::spawn(async move {
            for event in scripted {
                if tx.send(event).await.is_err() {
                    return;
                }
            }
            if !hold_open {
                drop(tx);
            }
            // Drain the outbound half until the session is torn down; when
            // hold_open is set, `tx` stays alive until then.
            while let Some(request) = requests.recv().await {
                recorded.lock().unwrap().push(request);
            }
        });

        Ok(rx)
    }
}

/// Transport that must never be opened
struct UnreachableTransport {
    opened: AtomicBool,
}

#[async_trait]
impl MarketDataTransport for UnreachableTransport {
    async fn open(
        &self,
        _requests: mpsc::Receiver<MarketDataRequest>,
    ) -> Result<mpsc::Receiver<StreamEvent>, StreamError> {
        self.opened.store(true, Ordering::SeqCst);
        Err(StreamError::Connect("should not be reached".to_string()))
    }
}

#[tokio::test]
async fn test_session_delivers_updates_in_order() {
    let transport = ScriptedTransport::new(vec![
        Ok(MarketDataEvent::OrderBook(update_with_sides("U1"))),
        Ok(MarketDataEvent::OrderBook(update_with_sides("U2"))),
        Ok(MarketDataEvent::OrderBook(update_with_sides("U3"))),
    ]);
    let client = fast_client();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_callback = seen.clone();

    let result = client
        .subscribe_with_transport(&transport, "FIGI", 10, move |update| {
            let seen = seen_in_callback.clone();
            async move {
                seen.lock().unwrap().push(update.figi);
                Ok(())
            }
        })
        .await;

    assert!(result.is_ok());
    assert_eq!(*seen.lock().unwrap(), vec!["U1", "U2", "U3"]);
    assert!(client.shutdown_handle().is_stopped());
}

#[tokio::test]
async fn test_callback_errors_never_end_the_session() {
    let events = (0..100)
        .map(|_| Ok(MarketDataEvent::OrderBook(update_with_sides("FIGI"))))
        .collect();
    let transport = ScriptedTransport::new(events);
    let client = fast_client();

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_callback = calls.clone();

    let result = client
        .subscribe_with_transport(&transport, "FIGI", 10, move |_| {
            let calls = calls_in_callback.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                anyhow::bail!("handler always fails")
            }
        })
        .await;

    assert!(result.is_ok(), "callback errors must stay contained");
    assert_eq!(calls.load(Ordering::SeqCst), 100);
}

#[tokio::test]
async fn test_handshake_is_first_and_only_subscribe() {
    let transport = ScriptedTransport::held_open(vec![]);
    let recorded = transport.recorded();
    let client = fast_client();

    let (result, ()) = tokio::join!(
        client.subscribe_with_transport(&transport, "BBG004730N88", 20, |_| async { Ok(()) }),
        async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            client.stop();
        }
    );
    assert!(result.is_ok());

    // The producer unwinds within one keep-alive interval of the stop.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let requests = recorded.lock().unwrap();
    assert!(
        !requests.is_empty(),
        "transport should have seen the handshake"
    );
    assert_eq!(
        requests[0],
        MarketDataRequest::SubscribeOrderBook {
            instrument_id: "BBG004730N88".to_string(),
            depth: 20,
        }
    );

    let subscribe_count = requests
        .iter()
        .filter(|r| matches!(r, MarketDataRequest::SubscribeOrderBook { .. }))
        .count();
    assert_eq!(subscribe_count, 1, "exactly one subscribe per session");
    assert!(requests[1..]
        .iter()
        .all(|r| matches!(r, MarketDataRequest::KeepAlive)));
}

#[tokio::test]
async fn test_stop_unwinds_an_idle_session() {
    let transport = ScriptedTransport::held_open(vec![]);
    let client = fast_client();

    let (result, ()) = tokio::join!(
        async {
            timeout(
                Duration::from_secs(5),
                client.subscribe_with_transport(&transport, "FIGI", 10, |_| async { Ok(()) }),
            )
            .await
            .expect("session must unwind after stop")
        },
        async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            // Repeated stops are no-ops.
            client.stop();
            client.stop();
            client.stop();
        }
    );

    assert!(result.is_ok());
    assert!(client.shutdown_handle().is_stopped());
}

#[tokio::test]
async fn test_stop_before_subscribe_delivers_nothing() {
    let transport = ScriptedTransport::new(vec![Ok(MarketDataEvent::OrderBook(
        update_with_sides("FIGI"),
    ))]);
    let client = fast_client();
    client.stop();

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_callback = calls.clone();

    let result = client
        .subscribe_with_transport(&transport, "FIGI", 10, move |_| {
            let calls = calls_in_callback.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;

    assert!(result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_transport_error_surfaces_to_the_caller() {
    let transport = ScriptedTransport::new(vec![
        Ok(MarketDataEvent::OrderBook(update_with_sides("FIGI"))),
        Err(StreamError::Transport("connection reset".to_string())),
    ]);
    let client = fast_client();

    let result = client
        .subscribe_with_transport(&transport, "FIGI", 10, |_| async { Ok(()) })
        .await;

    assert!(matches!(result, Err(StreamError::Transport(_))));
    assert!(client.shutdown_handle().is_stopped());
}

#[tokio::test]
async fn test_failed_subscription_status_does_not_abort() {
    let transport = ScriptedTransport::new(vec![
        Ok(MarketDataEvent::SubscriptionResult(
            SubscribeOrderBookResult {
                subscriptions: vec![OrderBookSubscription {
                    instrument_uid: None,
                    status: "SUBSCRIPTION_STATUS_DEPTH_IS_INVALID".to_string(),
                }],
            },
        )),
        Ok(MarketDataEvent::OrderBook(update_with_sides("FIGI"))),
    ]);
    let client = fast_client();

    let calls = Arc::new(AtomicUsize::new(0));
    let calls_in_callback = calls.clone();

    let result = client
        .subscribe_with_transport(&transport, "FIGI", 10, move |_| {
            let calls = calls_in_callback.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok(())
            }
        })
        .await;

    assert!(result.is_ok());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_one_sided_updates_never_reach_the_callback() {
    let mut no_asks = update_with_sides("NO-ASKS");
    no_asks.asks.clear();
    let mut no_bids = update_with_sides("NO-BIDS");
    no_bids.bids.clear();

    let transport = ScriptedTransport::new(vec![
        Ok(MarketDataEvent::OrderBook(no_asks)),
        Ok(MarketDataEvent::OrderBook(no_bids)),
        Ok(MarketDataEvent::OrderBook(update_with_sides("FULL"))),
    ]);
    let client = fast_client();

    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_callback = seen.clone();

    client
        .subscribe_with_transport(&transport, "FIGI", 10, move |update| {
            let seen = seen_in_callback.clone();
            async move {
                seen.lock().unwrap().push(update.figi);
                Ok(())
            }
        })
        .await
        .unwrap();

    assert_eq!(*seen.lock().unwrap(), vec!["FULL"]);
}

#[tokio::test]
async fn test_missing_token_fails_before_any_session() {
    let mut config = test_config();
    config.api_token = String::new();
    let client = OrderBookStream::new(&config);

    let transport = UnreachableTransport {
        opened: AtomicBool::new(false),
    };

    let result = client
        .subscribe_with_transport(&transport, "FIGI", 10, |_| async { Ok(()) })
        .await;

    assert!(matches!(
        result,
        Err(StreamError::Config(ConfigError::MissingToken))
    ));
    assert!(
        !transport.opened.load(Ordering::SeqCst),
        "no session may be opened without a token"
    );
}
