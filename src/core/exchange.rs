//! Quoting and settlement of exchanges against a user's portfolio

use crate::core::catalog::{Catalog, CurrencyDescriptor};
use crate::core::convert::Converter;
use crate::core::error::{FxError, Result};
use crate::core::portfolio::PortfolioStore;
use crate::core::quantity::parse_sell_quantity;
use crate::core::quote::{QUOTE_VALIDITY_SECS, Quote, QuoteState};
use crate::core::rate::RateProvider;
use crate::core::session::Session;
use crate::core::value::CurrencyValue;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, error, info, instrument};

/// Balances written by a successful settlement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settlement {
    pub bought: CurrencyValue,
    pub sold: CurrencyValue,
    pub state: QuoteState,
}

/// Drives the quote/confirm cycle for one session at a time.
pub struct Trader<'a> {
    catalog: &'a Catalog,
    store: &'a dyn PortfolioStore,
    rates: &'a dyn RateProvider,
}

impl<'a> Trader<'a> {
    pub fn new(
        catalog: &'a Catalog,
        store: &'a dyn PortfolioStore,
        rates: &'a dyn RateProvider,
    ) -> Self {
        Self {
            catalog,
            store,
            rates,
        }
    }

    pub fn balance(&self, session: &Session, currency: CurrencyDescriptor) -> Result<CurrencyValue> {
        self.store.get_balance(session, currency)
    }

    /// Quotes spending `spend` of the base currency on `fx`.
    pub async fn quote_buy(
        &self,
        session: &Session,
        fx: CurrencyDescriptor,
        spend: &str,
    ) -> Result<Quote> {
        self.require_fx(fx)?;
        let sold = parse_sell_quantity(self.catalog.base_currency(), spend)?;
        self.ensure_sufficient(session, &sold)?;

        let rate = self.fetch_rate(fx).await?;
        let bought = Converter::new(self.catalog).to_fx(&sold, fx, rate)?;
        reject_empty(&bought, &sold, spend)?;
        let quote = Quote::new(bought, sold, rate, Utc::now())?;
        debug!(%quote, "Buy quote issued");
        Ok(quote)
    }

    /// Quotes selling `amount` of `fx` for the base currency.
    pub async fn quote_sell(
        &self,
        session: &Session,
        fx: CurrencyDescriptor,
        amount: &str,
    ) -> Result<Quote> {
        self.require_fx(fx)?;
        let sold = parse_sell_quantity(fx, amount)?;
        self.ensure_sufficient(session, &sold)?;

        let rate = self.fetch_rate(fx).await?;
        let bought = Converter::new(self.catalog).to_base(&sold, rate)?;
        reject_empty(&bought, &sold, amount)?;
        let quote = Quote::new(bought, sold, rate, Utc::now())?;
        debug!(%quote, "Sell quote issued");
        Ok(quote)
    }

    /// Fails with `InsufficientFunds` unless the current balance covers `amount`.
    /// Returns the balance that was checked.
    pub fn ensure_sufficient(
        &self,
        session: &Session,
        amount: &CurrencyValue,
    ) -> Result<CurrencyValue> {
        let balance = self.store.get_balance(session, amount.currency())?;
        if balance.amount() < amount.amount() {
            return Err(FxError::InsufficientFunds {
                currency: amount.currency().code,
                available: balance.amount(),
                required: amount.amount(),
            });
        }
        Ok(balance)
    }

    pub fn execute(&self, session: &Session, quote: Quote) -> Result<Settlement> {
        self.execute_at(session, quote, Utc::now())
    }

    /// Settles `quote` as of `now`. Expired quotes never execute. Balances are
    /// re-read and the sold side is re-checked for sufficiency, since they may
    /// have moved since the quote was issued.
    #[instrument(skip(self, quote), fields(user = %session.username(), quote = %quote))]
    pub fn execute_at(
        &self,
        session: &Session,
        quote: Quote,
        now: DateTime<Utc>,
    ) -> Result<Settlement> {
        if quote.is_expired_at(now) {
            info!("Quote expired before confirmation");
            return Err(FxError::QuoteExpired(QUOTE_VALIDITY_SECS));
        }

        let current_bought = self.store.get_balance(session, quote.bought().currency())?;
        let current_sold = self.ensure_sufficient(session, quote.sold())?;

        let bought = CurrencyValue::new(
            quote.bought().currency(),
            current_bought.amount() + quote.bought().amount(),
        )?;
        let sold = CurrencyValue::new(
            quote.sold().currency(),
            current_sold.amount() - quote.sold().amount(),
        )?;

        self.store
            .apply_two_sided_update(session, &bought, &sold)
            .map_err(|e| {
                error!(error = %e, "Two-sided balance update failed");
                FxError::SettlementFailed(e.to_string())
            })?;

        info!(bought = %bought, sold = %sold, "Exchange settled");
        Ok(Settlement {
            bought,
            sold,
            state: QuoteState::Executed,
        })
    }

    fn require_fx(&self, fx: CurrencyDescriptor) -> Result<()> {
        if self.catalog.is_base(&fx) {
            return Err(FxError::UnsupportedConversion {
                from: fx.code,
                direction: "to itself: pick an FX currency",
            });
        }
        Ok(())
    }

    async fn fetch_rate(&self, currency: CurrencyDescriptor) -> Result<Decimal> {
        let rate = self
            .rates
            .get_rate(currency.code)
            .await
            .map_err(|e| FxError::RateUnavailable {
                currency: currency.code,
                reason: e.to_string(),
            })?;
        if rate <= Decimal::ZERO {
            return Err(FxError::RateUnavailable {
                currency: currency.code,
                reason: format!("non-positive rate {rate}"),
            });
        }
        Ok(rate)
    }
}

/// A quantity too small to buy anything after truncation is not worth quoting.
fn reject_empty(bought: &CurrencyValue, sold: &CurrencyValue, raw: &str) -> Result<()> {
    if bought.is_zero() {
        debug!(%bought, %sold, "Quote would buy nothing");
        return Err(FxError::InvalidQuantityString {
            currency: sold.currency().code,
            value: raw.to_string(),
        });
    }
    Ok(())
}
