//! CLI interface for tinvest-bot
//!
//! Provides subcommands for:
//! - `stream`: Subscribe to an instrument's order book and print snapshots
//! - `find`: Look up instruments by ticker
//! - `config`: Show the effective configuration

mod find;
mod stream;

pub use find::FindArgs;
pub use stream::StreamArgs;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "tinvest-bot")]
#[command(about = "Order book streaming bot for the T-Invest market data API")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Subscribe to an instrument's order book stream
    Stream(StreamArgs),
    /// Look up instruments by ticker
    Find(FindArgs),
    /// Show the effective configuration
    Config,
}
