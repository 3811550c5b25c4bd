// src/explorer.rs
use alloy::primitives::Address;
use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::ExplorerError;
use crate::models::{PageParams, TokenTransferPage, TransactionPage};

const MAX_RETRY_DELAY: Duration = Duration::from_secs(30);

/// Doubling delay for retry `attempt` (0-based), capped at `MAX_RETRY_DELAY`
fn backoff_delay(base: Duration, attempt: u32) -> Duration {
    base.saturating_mul(2u32.saturating_pow(attempt)).min(MAX_RETRY_DELAY)
}

/// Read-only view of a block explorer's address endpoints
#[async_trait]
pub trait Explorer: Send + Sync {
    /// One page of the address's transactions, newest first. `None` fetches the first page.
    async fn transactions(
        &self,
        address: &Address,
        cursor: Option<&PageParams>,
    ) -> Result<TransactionPage, ExplorerError>;

    /// One page of the address's token transfers, newest first.
    async fn token_transfers(
        &self,
        address: &Address,
        cursor: Option<&PageParams>,
    ) -> Result<TokenTransferPage, ExplorerError>;
}

/// Blockscout v2 REST client
#[derive(Debug, Clone)]
pub struct BlockscoutClient {
    client: Client,
    base_url: Url,
    max_retries: u32,
    retry_base_delay: Duration,
}

impl BlockscoutClient {
    pub fn new(cfg: &Config) -> Result<Self, ExplorerError> {
        let base_url = Url::parse(cfg.explorer_url.trim_end_matches('/'))
            .map_err(|e| ExplorerError::InvalidUrl(format!("{}: {}", cfg.explorer_url, e)))?;

        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.request_timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url,
            max_retries: cfg.max_retries,
            retry_base_delay: Duration::from_millis(cfg.retry_base_delay_ms),
        })
    }

    fn endpoint(&self, address: &Address, resource: &str) -> String {
        format!(
            "{}/api/v2/addresses/{}/{}",
            self.base_url.as_str().trim_end_matches('/'),
            address.to_checksum(None),
            resource
        )
    }

    /// GET a page, retrying transport failures, 429 and 5xx with exponential backoff
    async fn get_page<T: DeserializeOwned>(
        &self,
        url: &str,
        cursor: Option<&PageParams>,
    ) -> Result<T, ExplorerError> {
        let query = cursor.map(PageParams::to_query).unwrap_or_default();
        let mut attempt: u32 = 0;

        loop {
            match self.get_once(url, &query).await {
                Ok(page) => return Ok(page),
                Err(e) if e.is_retryable() && attempt < self.max_retries => {
                    let delay = backoff_delay(self.retry_base_delay, attempt);
                    attempt += 1;
                    warn!(
                        "⚠️ Explorer request failed (attempt {}): {}. Retrying in {:?}...",
                        attempt, e, delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    async fn get_once<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(String, String)],
    ) -> Result<T, ExplorerError> {
        info!("📡 GET {} {:?}", url, query);

        let resp = self
            .client
            .get(url)
            .query(query)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ExplorerError::RateLimited);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ExplorerError::Status { status, body });
        }

        let text = resp.text().await.map_err(from_reqwest)?;
        debug!("📩 Explorer response: {} bytes", text.len());

        Ok(serde_json::from_str(&text)?)
    }
}

fn from_reqwest(e: reqwest::Error) -> ExplorerError {
    if e.is_timeout() {
        ExplorerError::Timeout
    } else {
        ExplorerError::Http(e)
    }
}

#[async_trait]
impl Explorer for BlockscoutClient {
    async fn transactions(
        &self,
        address: &Address,
        cursor: Option<&PageParams>,
    ) -> Result<TransactionPage, ExplorerError> {
        let url = self.endpoint(address, "transactions");
        self.get_page(&url, cursor).await
    }

    async fn token_transfers(
        &self,
        address: &Address,
        cursor: Option<&PageParams>,
    ) -> Result<TokenTransferPage, ExplorerError> {
        let url = self.endpoint(address, "token-transfers");
        self.get_page(&url, cursor).await
    }
}
