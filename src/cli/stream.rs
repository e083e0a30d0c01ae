//! Stream command implementation

use crate::config::Config;
use crate::orderbook::OrderBookUpdate;
use crate::stream::{OrderBookStream, DEFAULT_DEPTH};
use clap::Args;

#[derive(Args, Debug)]
pub struct StreamArgs {
    /// Instrument identifier (FIGI) to subscribe to
    #[arg(short, long, default_value = "BBG004730N88")]
    pub instrument_id: String,

    /// Order book depth to request
    #[arg(short, long, default_value_t = DEFAULT_DEPTH)]
    pub depth: u32,
}

impl StreamArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let stream = OrderBookStream::new(config);
        let shutdown = stream.shutdown_handle();

        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::info!("Interrupt received, stopping stream");
                shutdown.stop();
            }
        });

        tracing::info!(
            instrument_id = %self.instrument_id,
            depth = self.depth,
            "Starting order book stream (Ctrl+C to stop)"
        );

        stream
            .subscribe_to_orderbook(&self.instrument_id, self.depth, print_orderbook_snapshot)
            .await?;

        Ok(())
    }
}

/// Print the top of the book for each update
async fn print_orderbook_snapshot(update: OrderBookUpdate) -> anyhow::Result<()> {
    if let (Some(bid), Some(ask)) = (update.best_bid(), update.best_ask()) {
        println!(
            "[{}] Bid: {} x{} | Ask: {} x{} | Time: {}",
            update.figi, bid.price, bid.quantity, ask.price, ask.quantity, update.time
        );
    }
    Ok(())
}
