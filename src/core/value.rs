//! Amounts bound to a currency at that currency's exact precision

use crate::core::catalog::CurrencyDescriptor;
use crate::core::error::{FxError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt::Display;
use std::str::FromStr;

/// An amount of one currency whose scale always equals the currency's
/// `decimal_places`. `1.5` and `1` are both invalid USD values; `1.50` and
/// `1.00` are the canonical forms.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CurrencyValue {
    currency: CurrencyDescriptor,
    amount: Decimal,
}

/// The precision check shared by every construction path.
fn check_precision(currency: &CurrencyDescriptor, amount: Decimal) -> Result<()> {
    if amount.scale() != currency.decimal_places {
        return Err(FxError::InvalidPrecision {
            currency: currency.code,
            amount,
            expected: currency.decimal_places,
        });
    }
    Ok(())
}

fn parse_decimal(currency: &CurrencyDescriptor, raw: &str) -> Result<Decimal> {
    Decimal::from_str(raw.trim()).map_err(|_| FxError::InvalidQuantityString {
        currency: currency.code,
        value: raw.to_string(),
    })
}

impl CurrencyValue {
    pub fn new(currency: CurrencyDescriptor, amount: Decimal) -> Result<Self> {
        check_precision(&currency, amount)?;
        Ok(Self { currency, amount })
    }

    /// Zero at the currency's precision.
    pub fn zero(currency: CurrencyDescriptor) -> Self {
        Self {
            currency,
            amount: Decimal::new(0, currency.decimal_places),
        }
    }

    /// Parses a string that is already in canonical form. Any fractional digit
    /// count other than `decimal_places` is rejected.
    pub fn parse_exact(currency: CurrencyDescriptor, raw: &str) -> Result<Self> {
        let amount = parse_decimal(&currency, raw)?;
        Self::new(currency, amount)
    }

    /// Parses a numeric string and quantizes it to the currency's precision,
    /// rounding half away from zero. Callers handling user input must reject
    /// over-precise strings first (see [`crate::core::quantity`]).
    pub fn parse_quantized(currency: CurrencyDescriptor, raw: &str) -> Result<Self> {
        let amount = parse_decimal(&currency, raw)?;
        Self::new(currency, quantize(amount, &currency, RoundingStrategy::MidpointAwayFromZero))
    }

    pub fn currency(&self) -> CurrencyDescriptor {
        self.currency
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Replaces the amount, re-validating precision. On error the value is unchanged.
    pub fn set_amount(&mut self, amount: Decimal) -> Result<()> {
        check_precision(&self.currency, amount)?;
        self.amount = amount;
        Ok(())
    }

    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }

    pub fn is_positive(&self) -> bool {
        self.amount > Decimal::ZERO
    }
}

/// Brings `amount` to exactly `currency.decimal_places` using `strategy`.
/// Only rounds when the amount is more precise than the currency; less
/// precise amounts are padded with trailing zeros.
pub(crate) fn quantize(
    amount: Decimal,
    currency: &CurrencyDescriptor,
    strategy: RoundingStrategy,
) -> Decimal {
    let mut quantized = amount.round_dp_with_strategy(currency.decimal_places, strategy);
    quantized.rescale(currency.decimal_places);
    quantized
}

impl Display for CurrencyValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.amount)
    }
}
