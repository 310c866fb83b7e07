//! Time-limited exchange proposals

use crate::core::error::{FxError, Result};
use crate::core::value::CurrencyValue;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use std::fmt::Display;

/// Seconds a quote stays executable after it was issued.
pub const QUOTE_VALIDITY_SECS: i64 = 10;

pub fn quote_validity() -> Duration {
    Duration::seconds(QUOTE_VALIDITY_SECS)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteState {
    Proposed,
    Expired,
    Executed,
    Aborted,
}

impl Display for QuoteState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                QuoteState::Proposed => "proposed",
                QuoteState::Expired => "expired",
                QuoteState::Executed => "executed",
                QuoteState::Aborted => "aborted",
            }
        )
    }
}

/// A proposed exchange of `sold` for `bought` at `rate`.
///
/// Deliberately not `Clone`: executing or declining a quote consumes it.
#[derive(Debug, PartialEq, Eq)]
pub struct Quote {
    bought: CurrencyValue,
    sold: CurrencyValue,
    rate: Decimal,
    quoted_at: DateTime<Utc>,
}

impl Quote {
    pub fn new(
        bought: CurrencyValue,
        sold: CurrencyValue,
        rate: Decimal,
        quoted_at: DateTime<Utc>,
    ) -> Result<Self> {
        if bought.currency() == sold.currency() {
            return Err(FxError::SameCurrencyExchange(bought.currency().code));
        }
        Ok(Self {
            bought,
            sold,
            rate,
            quoted_at,
        })
    }

    pub fn bought(&self) -> &CurrencyValue {
        &self.bought
    }

    pub fn sold(&self) -> &CurrencyValue {
        &self.sold
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }

    pub fn quoted_at(&self) -> DateTime<Utc> {
        self.quoted_at
    }

    /// Expired once strictly more than the validity window has elapsed.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now - self.quoted_at > quote_validity()
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// State of a quote that has not been consumed yet.
    pub fn state_at(&self, now: DateTime<Utc>) -> QuoteState {
        if self.is_expired_at(now) {
            QuoteState::Expired
        } else {
            QuoteState::Proposed
        }
    }

    /// Declines the quote. Balances are untouched.
    #[must_use]
    pub fn decline(self) -> QuoteState {
        QuoteState::Aborted
    }
}

impl Display for Quote {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} @ {} => {} {}",
            self.sold.currency().code,
            self.sold,
            self.rate,
            self.bought.currency().code,
            self.bought
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::catalog::Catalog;
    use rust_decimal_macros::dec;

    fn quote_at(quoted_at: DateTime<Utc>) -> Quote {
        let catalog = Catalog::standard();
        let eur = CurrencyValue::new(catalog.resolve("EUR").unwrap(), dec!(92.10)).unwrap();
        let usd = CurrencyValue::new(catalog.base_currency(), dec!(100.00)).unwrap();
        Quote::new(eur, usd, dec!(0.9210), quoted_at).unwrap()
    }

    #[test]
    fn test_same_currency_is_rejected() {
        let usd = Catalog::standard().base_currency();
        let a = CurrencyValue::new(usd, dec!(1.00)).unwrap();
        let b = CurrencyValue::new(usd, dec!(2.00)).unwrap();
        assert_eq!(
            Quote::new(a, b, dec!(1), Utc::now()),
            Err(FxError::SameCurrencyExchange("USD"))
        );
    }

    #[test]
    fn test_expiry_window() {
        let now = Utc::now();
        assert!(!quote_at(now).is_expired_at(now));
        assert!(!quote_at(now - Duration::seconds(9)).is_expired_at(now));
        assert!(!quote_at(now - Duration::seconds(10)).is_expired_at(now));
        assert!(quote_at(now - Duration::milliseconds(10_001)).is_expired_at(now));
        assert!(quote_at(now - Duration::seconds(11)).is_expired_at(now));
        assert!(quote_at(now - Duration::hours(1)).is_expired());
    }

    #[test]
    fn test_state_transitions() {
        let now = Utc::now();
        assert_eq!(quote_at(now).state_at(now), QuoteState::Proposed);
        assert_eq!(
            quote_at(now - Duration::seconds(30)).state_at(now),
            QuoteState::Expired
        );
        assert_eq!(quote_at(now).decline(), QuoteState::Aborted);
    }

    #[test]
    fn test_display() {
        let quote = quote_at(Utc::now());
        assert_eq!(quote.to_string(), "USD 100.00 @ 0.9210 => EUR 92.10");
        assert_eq!(QuoteState::Executed.to_string(), "executed");
    }
}
