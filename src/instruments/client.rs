//! REST client for instrument lookup
//!
//! Resolves a ticker or free-text query to a list of instruments with their
//! identifiers. This is a plain request/response call, separate from the
//! streaming session.

use crate::config::Config;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use uuid::Uuid;

/// Production REST endpoint
pub const PRODUCTION_REST_URL: &str = "https://invest-public-api.tinkoff.ru/rest";
/// Sandbox REST endpoint
pub const SANDBOX_REST_URL: &str = "https://sandbox-invest-public-api.tinkoff.ru/rest";

/// Service path of the lookup call
const FIND_INSTRUMENT_PATH: &str =
    "tinkoff.public.invest.api.contract.v1.InstrumentsService/FindInstrument";

/// Configuration for the instruments client
#[derive(Debug, Clone)]
pub struct InstrumentsConfig {
    /// Base URL for the REST API
    pub base_url: String,
    /// Request timeout
    pub timeout: Duration,
}

impl InstrumentsConfig {
    /// Endpoint for the selected environment
    pub fn for_environment(use_sandbox: bool) -> Self {
        let base_url = if use_sandbox {
            SANDBOX_REST_URL
        } else {
            PRODUCTION_REST_URL
        };
        Self {
            base_url: base_url.to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl Default for InstrumentsConfig {
    fn default() -> Self {
        Self::for_environment(false)
    }
}

/// A tradable instrument returned by the lookup
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    /// FIGI identifier
    #[serde(default)]
    pub figi: String,
    /// Exchange ticker
    #[serde(default)]
    pub ticker: String,
    /// API-wide unique identifier
    #[serde(default)]
    pub uid: String,
    /// Human-readable name
    #[serde(default)]
    pub name: String,
    /// Instrument type (share, bond, etf, ...)
    #[serde(default)]
    pub instrument_type: String,
}

/// Client for the instruments service
pub struct InstrumentsClient {
    config: InstrumentsConfig,
    api_token: String,
    app_name: String,
    client: Client,
}

impl InstrumentsClient {
    /// Create a client for the environment selected by the configuration
    pub fn new(config: &Config) -> Self {
        Self::with_config(config, InstrumentsConfig::for_environment(config.use_sandbox))
    }

    /// Create a client with an explicit endpoint configuration
    pub fn with_config(config: &Config, instruments_config: InstrumentsConfig) -> Self {
        let client = Client::builder()
            .timeout(instruments_config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            config: instruments_config,
            api_token: config.api_token.clone(),
            app_name: config.app_name.clone(),
            client,
        }
    }

    /// Find instruments matching a ticker or free-text query
    pub async fn find_instrument(&self, query: &str) -> anyhow::Result<Vec<Instrument>> {
        let url = format!("{}/{}", self.config.base_url, FIND_INSTRUMENT_PATH);

        tracing::debug!(url = %url, query = %query, "Looking up instruments");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_token)
            .header("x-app-name", &self.app_name)
            .header("x-tracking-id", Uuid::new_v4().to_string())
            .json(&serde_json::json!({ "query": query }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("Instruments API error: {} - {}", status, body);
        }

        let found: FindInstrumentResponse = response.json().await?;

        tracing::info!(
            query = %query,
            instrument_count = found.instruments.len(),
            "Instrument lookup finished"
        );

        Ok(found.instruments)
    }
}

/// Lookup response envelope
#[derive(Debug, Deserialize)]
struct FindInstrumentResponse {
    #[serde(default)]
    instruments: Vec<Instrument>,
}
