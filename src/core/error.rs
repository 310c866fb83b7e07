//! Error kinds produced by the exchange core

use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FxError {
    #[error("amount {amount} must have exactly {expected} decimal places for {currency}")]
    InvalidPrecision {
        currency: &'static str,
        amount: Decimal,
        expected: u32,
    },

    #[error("invalid quantity '{value}' for {currency}")]
    InvalidQuantityString {
        currency: &'static str,
        value: String,
    },

    #[error("cannot convert {from} {direction}")]
    UnsupportedConversion {
        from: &'static str,
        direction: &'static str,
    },

    #[error("cannot exchange {0} for itself")]
    SameCurrencyExchange(&'static str),

    #[error("quote expired after {0} seconds")]
    QuoteExpired(i64),

    #[error("settlement failed: {0}")]
    SettlementFailed(String),

    #[error("rate unavailable for {currency}: {reason}")]
    RateUnavailable {
        currency: &'static str,
        reason: String,
    },

    #[error("currency not found: '{0}'")]
    CurrencyNotFound(String),

    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    #[error("insufficient funds: {currency} {available} available, {required} required")]
    InsufficientFunds {
        currency: &'static str,
        available: Decimal,
        required: Decimal,
    },

    #[error("invalid username '{0}': use letters, digits, '.', '_' or '-'")]
    InvalidUsername(String),

    #[error("no portfolio for user '{0}'")]
    PortfolioNotFound(String),

    #[error("portfolio already exists for user '{0}'")]
    PortfolioExists(String),
}

pub type Result<T> = std::result::Result<T, FxError>;
