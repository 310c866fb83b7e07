use anyhow::{Result, anyhow};
use async_trait::async_trait;
use reqwest::Url;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, instrument};

use super::util::with_retry;
use crate::core::cache::Cache;
use crate::core::catalog::Catalog;
use crate::core::rate::{RateProvider, Rates};

const RETRIES: usize = 2;
const RETRY_DELAY_MS: u64 = 250;

/// Latest rates from openexchangerates.org, quoted against the catalog's base currency.
pub struct OpenExchangeRatesProvider {
    base_url: String,
    app_id: String,
    base: &'static str,
    symbols: Vec<&'static str>,
    cache: Arc<Cache<Rates>>,
    client: reqwest::Client,
}

impl OpenExchangeRatesProvider {
    pub fn new(
        base_url: &str,
        app_id: &str,
        catalog: &Catalog,
        cache: Arc<Cache<Rates>>,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("fx-trader/0.1")
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(OpenExchangeRatesProvider {
            base_url: base_url.trim_end_matches('/').to_string(),
            app_id: app_id.to_string(),
            base: catalog.base_currency().code,
            symbols: catalog.fx_codes(),
            cache,
            client,
        })
    }

    fn latest_url(&self) -> Result<Url> {
        let symbols = self.symbols.join(",");
        let url = Url::parse_with_params(
            &format!("{}/api/latest.json", self.base_url),
            &[
                ("app_id", self.app_id.as_str()),
                ("base", self.base),
                ("symbols", symbols.as_str()),
            ],
        )?;
        Ok(url)
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: Option<HashMap<String, serde_json::Number>>,
}

fn parse_rate(code: &str, number: &serde_json::Number) -> Result<Decimal> {
    let text = number.to_string();
    Decimal::from_str(&text)
        .or_else(|_| Decimal::from_scientific(&text))
        .map_err(|e| anyhow!("Invalid rate {} for {}: {}", text, code, e))
}

#[async_trait]
impl RateProvider for OpenExchangeRatesProvider {
    #[instrument(name = "OerRatesFetch", skip(self), fields(base = %self.base))]
    async fn get_rates(&self) -> Result<Rates> {
        let url = self.latest_url()?;
        debug!("Requesting rates from {}", url.path());

        let response = with_retry(|| self.client.get(url.clone()).send(), RETRIES, RETRY_DELAY_MS)
            .await
            .map_err(|e| anyhow!("Request error: {} for rates of base {}", e, self.base))?;

        let status = response.status();
        let text = response.text().await?;
        if !status.is_success() {
            debug!(%status, body = %text, "Rates request rejected");
            return Err(anyhow!("HTTP error: {} for rates of base {}", status, self.base));
        }

        let data: LatestResponse = serde_json::from_str(&text)
            .map_err(|e| anyhow!("Failed to parse JSON response for rates: {}", e))?;
        let raw = data.rates.ok_or_else(|| {
            debug!(body = %text, "No rates in API response");
            anyhow!("No \"rates\" in API response")
        })?;

        let mut rates = Rates::new();
        for code in &self.symbols {
            match raw.get(*code) {
                Some(number) => {
                    rates.insert(code.to_string(), parse_rate(code, number)?);
                }
                None => debug!("{} not found in returned rates", code),
            }
        }

        self.cache.put(rates.clone()).await;
        Ok(rates)
    }

    async fn get_rates_cached(&self) -> Result<Rates> {
        if let Some(cached) = self.cache.get().await {
            return Ok(cached);
        }
        self.get_rates().await
    }
}
