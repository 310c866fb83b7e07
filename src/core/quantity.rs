//! Validation of user-entered sell quantities
//!
//! Runs on raw input before a [`CurrencyValue`] is built, so that strings like
//! `"1"` for a two-decimal currency are accepted here and canonicalised, rather
//! than being rejected by the strict precision check of the value type.

use crate::core::catalog::CurrencyDescriptor;
use crate::core::error::{FxError, Result};
use crate::core::value::CurrencyValue;
use regex::Regex;
use std::sync::LazyLock;
use tracing::error;

/// Unsigned decimal with an optional fractional part, which is captured.
static SELL_QUANTITY: LazyLock<std::result::Result<Regex, regex::Error>> =
    LazyLock::new(|| Regex::new(r"^[0-9]+(\.([0-9]*))?$"));

/// Whether `raw` is an acceptable positive amount of `currency` to sell.
///
/// Zero-decimal currencies take plain ASCII digits only. Others take digits
/// with an optional fractional part of at most `decimal_places` significant
/// digits; trailing zeros past that are allowed since they add no precision.
/// Anything equal to zero is rejected.
pub fn is_valid_sell_quantity(currency: &CurrencyDescriptor, raw: &str) -> bool {
    let re = match &*SELL_QUANTITY {
        Ok(re) => re,
        Err(e) => {
            error!(error = %e, "Sell quantity pattern failed to compile");
            return false;
        }
    };
    let Some(caps) = re.captures(raw) else {
        return false;
    };
    let grammar_ok = match (caps.get(1), caps.get(2)) {
        (None, _) => true,
        (Some(_), _) if currency.decimal_places == 0 => false,
        (Some(_), fraction) => {
            let significant = fraction.map_or("", |f| f.as_str().trim_end_matches('0'));
            significant.len() <= currency.decimal_places as usize
        }
    };

    grammar_ok && !is_zero(raw)
}

fn is_zero(raw: &str) -> bool {
    raw.chars().all(|c| c == '0' || c == '.')
}

/// Validates `raw` and builds the canonical value for it.
pub fn parse_sell_quantity(currency: CurrencyDescriptor, raw: &str) -> Result<CurrencyValue> {
    if !is_valid_sell_quantity(&currency, raw) {
        return Err(FxError::InvalidQuantityString {
            currency: currency.code,
            value: raw.to_string(),
        });
    }
    CurrencyValue::parse_quantized(currency, raw)
}
