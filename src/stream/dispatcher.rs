//! Inbound event dispatch loop
//!
//! Drives one session's inbound sequence: order book updates go to the user
//! callback, subscription results are validated and logged, everything else
//! is ignored. A failing callback never takes the stream down.

use super::shutdown::ShutdownFlag;
use super::types::{MarketDataEvent, StreamError, StreamEvent};
use crate::orderbook::OrderBookUpdate;
use crate::telemetry::{self, CounterMetric};
use std::future::Future;
use tokio::sync::mpsc;

/// Consume events until the stream ends, a transport error surfaces, or the
/// shutdown flag is set.
///
/// The callback is awaited per update, so updates are handled strictly in
/// arrival order. Callback errors are logged and counted, nothing more.
pub async fn run_dispatch_loop<F, Fut>(
    mut events: mpsc::Receiver<StreamEvent>,
    instrument_id: &str,
    shutdown: &ShutdownFlag,
    mut callback: F,
) -> Result<(), StreamError>
where
    F: FnMut(OrderBookUpdate) -> Fut + Send,
    Fut: Future<Output = anyhow::Result<()>> + Send,
{
    loop {
        tokio::select! {
            // The stop signal wins over a ready event, so no callback runs
            // after the flag is observed.
            biased;

            _ = shutdown.stopped() => {
                tracing::info!("stop signal received, draining stream");
                return Ok(());
            }
            event = events.recv() => match event {
                None => {
                    tracing::info!("market data stream ended");
                    return Ok(());
                }
                Some(Err(error)) => return Err(error),
                Some(Ok(MarketDataEvent::OrderBook(update))) => {
                    if !update.has_both_sides() {
                        continue;
                    }
                    telemetry::increment(CounterMetric::OrderBookUpdates);
                    if let Err(error) = callback(update).await {
                        telemetry::increment(CounterMetric::CallbackErrors);
                        tracing::error!(error = %error, "order book callback failed");
                    }
                }
                Some(Ok(MarketDataEvent::SubscriptionResult(result))) => {
                    telemetry::increment(CounterMetric::SubscriptionAcks);
                    for subscription in &result.subscriptions {
                        let instrument = subscription
                            .instrument_uid
                            .as_deref()
                            .unwrap_or(instrument_id);
                        if subscription.is_success() {
                            tracing::info!(
                                instrument = %instrument,
                                status = %subscription.status,
                                "order book subscription confirmed"
                            );
                        } else {
                            tracing::warn!(
                                instrument = %instrument,
                                status = %subscription.status,
                                "order book subscription not successful"
                            );
                        }
                    }
                }
                Some(Ok(MarketDataEvent::Other)) => {}
            }
        }
    }
}
