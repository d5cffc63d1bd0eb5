use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{AppError, Result};

use super::{price_normalizer::normalize_price, retry::RetryPolicy};

/// Anything that can quote the current market price of an item.
#[async_trait]
pub trait PriceSource: Send + Sync {
    /// `None` means "unavailable"; callers never see the reason.
    async fn fetch_price(&self, appid: u32, market_hash_name: &str, currency: u32) -> Option<f64>;
}

#[derive(Clone)]
pub struct SteamMarketClient {
    http: Client,
    base_url: String,
    retry: RetryPolicy,
}

impl SteamMarketClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration, retry: RetryPolicy) -> Self {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            retry,
        }
    }

    async fn price_overview(
        &self,
        appid: u32,
        market_hash_name: &str,
        currency: u32,
    ) -> Result<PriceOverview> {
        let url = format!("{}/market/priceoverview/", self.base_url);
        let appid = appid.to_string();
        let currency = currency.to_string();

        let mut attempt = 1;
        loop {
            let res = self
                .http
                .get(&url)
                .query(&[
                    ("appid", appid.as_str()),
                    ("currency", currency.as_str()),
                    ("market_hash_name", market_hash_name),
                ])
                .send()
                .await
                .map_err(|e| AppError::UpstreamUnavailable(e.to_string()))?;

            let status = res.status();
            if self.retry.is_retryable(status) {
                let Some(delay) = self.retry.delay_after(attempt) else {
                    return Err(AppError::UpstreamUnavailable(format!(
                        "rate limited after {attempt} attempts"
                    )));
                };
                debug!(attempt, ?delay, item = market_hash_name, "steam rate limited, backing off");
                tokio::time::sleep(delay).await;
                attempt += 1;
                continue;
            }

            if status != StatusCode::OK {
                return Err(AppError::UpstreamUnavailable(format!("status {status}")));
            }

            return res
                .json::<PriceOverview>()
                .await
                .map_err(|e| AppError::UpstreamUnavailable(e.to_string()));
        }
    }
}

#[async_trait]
impl PriceSource for SteamMarketClient {
    async fn fetch_price(&self, appid: u32, market_hash_name: &str, currency: u32) -> Option<f64> {
        let overview = match self.price_overview(appid, market_hash_name, currency).await {
            Ok(o) => o,
            Err(e) => {
                warn!(appid, item = market_hash_name, currency, error = %e, "price fetch failed");
                return None;
            }
        };

        if !overview.success {
            warn!(appid, item = market_hash_name, currency, "steam reported success=false");
            return None;
        }

        let Some(raw) = overview.preferred_price() else {
            warn!(appid, item = market_hash_name, currency, "no lowest/median price in response");
            return None;
        };

        let price = normalize_price(raw);
        match price {
            Some(p) => debug!(appid, item = market_hash_name, currency, raw, price = p, "price fetched"),
            None => warn!(appid, item = market_hash_name, currency, raw, "unparseable price"),
        }
        price
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct PriceOverview {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub lowest_price: Option<String>,
    #[serde(default)]
    pub median_price: Option<String>,
    #[serde(default)]
    pub volume: Option<String>,
}

impl PriceOverview {
    pub fn preferred_price(&self) -> Option<&str> {
        self.lowest_price
            .as_deref()
            .or(self.median_price.as_deref())
    }
}
