use clap::Parser;
use tinvest_bot::cli::{Cli, Commands};
use tinvest_bot::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Seed the environment from .env before reading configuration
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;

    // Initialize telemetry
    let _guard = tinvest_bot::telemetry::init_telemetry(&config)?;

    match cli.command {
        Commands::Stream(args) => {
            args.execute(&config).await?;
        }
        Commands::Find(args) => {
            args.execute(&config).await?;
        }
        Commands::Config => {
            let mode = if config.use_sandbox {
                "sandbox"
            } else {
                "production"
            };
            println!("Current configuration:");
            println!("  Token: {}...", config.masked_token());
            println!("  Mode: {}", mode);
            println!("  App name: {}", config.app_name);
            println!("  Log level: {}", config.log_level);
            match config.metrics_port {
                Some(port) => println!("  Metrics port: {}", port),
                None => println!("  Metrics: disabled"),
            }
        }
    }

    Ok(())
}
