pub mod open_exchange_rates;
pub mod util;

pub use open_exchange_rates::OpenExchangeRatesProvider;
