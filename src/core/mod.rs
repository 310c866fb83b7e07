//! Core business logic: currencies, values, conversion, quotes and settlement

pub mod cache;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod error;
pub mod exchange;
pub mod log;
pub mod portfolio;
pub mod quantity;
pub mod quote;
pub mod rate;
pub mod session;
pub mod value;

// Re-export main types for cleaner imports
pub use catalog::{Catalog, CurrencyDescriptor};
pub use convert::Converter;
pub use error::{FxError, Result};
pub use exchange::{Settlement, Trader};
pub use portfolio::PortfolioStore;
pub use quote::{Quote, QuoteState};
pub use rate::{RateProvider, Rates};
pub use session::Session;
pub use value::CurrencyValue;
