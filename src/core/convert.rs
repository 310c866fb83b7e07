//! Rate-based conversion between the base currency and FX currencies
//!
//! Rates are quoted as units of FX per one unit of base. Both directions
//! round toward zero so the user is never credited more than the exact
//! conversion entitles them to.

use crate::core::catalog::{Catalog, CurrencyDescriptor};
use crate::core::error::{FxError, Result};
use crate::core::value::{CurrencyValue, quantize};
use rust_decimal::{Decimal, RoundingStrategy};

pub struct Converter<'a> {
    catalog: &'a Catalog,
}

impl<'a> Converter<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// FX amount divided by `rate`, truncated to the base currency's precision.
    pub fn to_base(&self, fx_value: &CurrencyValue, rate: Decimal) -> Result<CurrencyValue> {
        if self.catalog.is_base(&fx_value.currency()) {
            return Err(FxError::UnsupportedConversion {
                from: fx_value.currency().code,
                direction: "to base: already the base currency",
            });
        }
        let base = self.catalog.base_currency();
        let exact = fx_value
            .amount()
            .checked_div(rate)
            .ok_or_else(|| invalid_rate(fx_value, rate))?;
        CurrencyValue::new(base, truncate(exact, &base))
    }

    /// Base amount multiplied by `rate`, truncated to `target`'s precision.
    pub fn to_fx(
        &self,
        base_value: &CurrencyValue,
        target: CurrencyDescriptor,
        rate: Decimal,
    ) -> Result<CurrencyValue> {
        if !self.catalog.is_base(&base_value.currency()) {
            return Err(FxError::UnsupportedConversion {
                from: base_value.currency().code,
                direction: "to FX: only the base currency converts to FX",
            });
        }
        if self.catalog.is_base(&target) {
            return Err(FxError::UnsupportedConversion {
                from: base_value.currency().code,
                direction: "to FX: target is the base currency",
            });
        }
        let exact = base_value
            .amount()
            .checked_mul(rate)
            .ok_or_else(|| invalid_rate(base_value, rate))?;
        CurrencyValue::new(target, truncate(exact, &target))
    }
}

fn truncate(amount: Decimal, currency: &CurrencyDescriptor) -> Decimal {
    quantize(amount, currency, RoundingStrategy::ToZero)
}

fn invalid_rate(value: &CurrencyValue, rate: Decimal) -> FxError {
    FxError::RateUnavailable {
        currency: value.currency().code,
        reason: format!("rate {rate} cannot be applied to {value}"),
    }
}
