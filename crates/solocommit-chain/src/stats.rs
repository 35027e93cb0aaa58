//! Block explorer stats: current best height and block time.

use std::time::Duration;

use chrono::NaiveDateTime;
use serde::Deserialize;
use solocommit_types::{ChainTip, CommitError, Result};
use tracing::debug;

/// Blockchair stats endpoint for Bitcoin Cash mainnet.
pub const DEFAULT_STATS_URL: &str = "https://api.blockchair.com/bitcoin-cash/stats";

/// Explorer block times are UTC without a zone suffix.
const BLOCK_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const OPERATION: &str = "stats";

#[derive(Debug, Deserialize)]
struct StatsResponse {
    data: StatsData,
}

#[derive(Debug, Deserialize)]
struct StatsData {
    best_block_height: u64,
    best_block_time: String,
}

/// Client for a Blockchair-compatible stats endpoint.
#[derive(Debug, Clone)]
pub struct StatsClient {
    http: reqwest::Client,
    url: String,
}

impl StatsClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CommitError::Configuration(format!("HTTP client: {e}")))?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch the current chain tip.
    pub async fn tip(&self) -> Result<ChainTip> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|e| CommitError::provider(OPERATION, e))?;
        let body = response
            .text()
            .await
            .map_err(|e| CommitError::provider(OPERATION, e))?;
        let tip = parse_stats(&body)?;
        debug!(height = tip.height, time = %tip.time, url = %self.url, "Fetched chain tip");
        Ok(tip)
    }
}

/// Decode a stats response body.
pub fn parse_stats(body: &str) -> Result<ChainTip> {
    let stats: StatsResponse =
        serde_json::from_str(body).map_err(|e| CommitError::provider(OPERATION, e))?;
    let time = NaiveDateTime::parse_from_str(&stats.data.best_block_time, BLOCK_TIME_FORMAT)
        .map_err(|e| {
            CommitError::provider(
                OPERATION,
                format!("block time '{}': {e}", stats.data.best_block_time),
            )
        })?
        .and_utc();
    Ok(ChainTip {
        height: stats.data.best_block_height,
        time,
    })
}
