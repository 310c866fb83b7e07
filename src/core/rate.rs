//! Exchange rate provider abstraction

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// FX code to units of that currency per one unit of the base currency.
pub type Rates = BTreeMap<String, Decimal>;

#[async_trait]
pub trait RateProvider: Send + Sync {
    /// Current rates for every FX currency, always fetched fresh.
    async fn get_rates(&self) -> Result<Rates>;

    /// Rates for display purposes. Providers may serve a recent snapshot.
    async fn get_rates_cached(&self) -> Result<Rates> {
        self.get_rates().await
    }

    async fn get_rate(&self, code: &str) -> Result<Decimal> {
        let rates = self.get_rates().await?;
        rates
            .get(code)
            .copied()
            .ok_or_else(|| anyhow!("{code} not found in returned rates"))
    }
}
