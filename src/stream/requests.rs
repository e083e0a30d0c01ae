//! Subscription request source
//!
//! Produces the outbound half of a streaming session: one subscribe
//! handshake, then periodic keep-alive ticks. The producer must outlive any
//! quiet stretch of the session, because ending the outbound flow tells the
//! server the whole session is done.

use super::shutdown::ShutdownFlag;
use super::types::MarketDataRequest;
use crate::telemetry::{self, CounterMetric};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

/// Outbound channel depth; requests are tiny and infrequent
const REQUEST_BUFFER: usize = 8;

/// Spawn the request producer for one session.
///
/// The first message is always the subscribe handshake; after that the task
/// emits a keep-alive tick per interval until the flag is set or the session
/// side of the channel is dropped.
pub fn spawn_request_source(
    instrument_id: impl Into<String>,
    depth: u32,
    keepalive_interval: Duration,
    shutdown: ShutdownFlag,
) -> mpsc::Receiver<MarketDataRequest> {
    let (tx, rx) = mpsc::channel(REQUEST_BUFFER);
    let instrument_id = instrument_id.into();

    tokio::spawn(async move {
        let subscribe = MarketDataRequest::SubscribeOrderBook {
            instrument_id,
            depth,
        };
        if tx.send(subscribe).await.is_err() {
            return;
        }

        let mut tick = tokio::time::interval(keepalive_interval);
        tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
        // The first interval tick completes immediately; consume it so the
        // first keep-alive lands one full interval after the handshake.
        tick.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.stopped() => {
                    tracing::debug!("request source stopping");
                    break;
                }
                _ = tick.tick() => {
                    telemetry::increment(CounterMetric::KeepAliveTicks);
                    if tx.send(MarketDataRequest::KeepAlive).await.is_err() {
                        tracing::debug!("session closed, request source stopping");
                        break;
                    }
                }
            }
        }
    });

    rx
}
