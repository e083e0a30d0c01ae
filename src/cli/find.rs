//! Find command implementation

use crate::config::Config;
use crate::instruments::InstrumentsClient;
use clap::Args;

#[derive(Args, Debug)]
pub struct FindArgs {
    /// Ticker or free-text query
    #[arg(default_value = "SBER")]
    pub ticker: String,

    /// Maximum number of matches to print
    #[arg(short, long, default_value_t = 10)]
    pub limit: usize,
}

impl FindArgs {
    pub async fn execute(&self, config: &Config) -> anyhow::Result<()> {
        let client = InstrumentsClient::new(config);
        let instruments = client.find_instrument(&self.ticker).await?;

        if instruments.is_empty() {
            println!("No instruments found for '{}'", self.ticker);
            return Ok(());
        }

        println!("Found {} instruments:\n", instruments.len());
        for (i, instrument) in instruments.iter().take(self.limit).enumerate() {
            println!("{}. {} - {}", i + 1, instrument.ticker, instrument.name);
            println!("   FIGI: {}", instrument.figi);
            println!("   UID:  {}", instrument.uid);
            println!("   Type: {}", instrument.instrument_type);
            println!();
        }

        Ok(())
    }
}
