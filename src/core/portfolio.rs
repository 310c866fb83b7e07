//! Per-user balance storage abstraction

use crate::core::catalog::{Catalog, CurrencyDescriptor};
use crate::core::error::Result;
use crate::core::session::Session;
use crate::core::value::CurrencyValue;

/// Durable balances, one per (user, currency).
///
/// Implementations must make [`PortfolioStore::apply_two_sided_update`]
/// all-or-nothing: after a failure both balances read back unchanged.
pub trait PortfolioStore: Send + Sync {
    /// Seeds a portfolio with every catalog currency's initial balance.
    fn create_portfolio(&self, session: &Session, catalog: &Catalog) -> Result<()>;

    fn portfolio_exists(&self, session: &Session) -> Result<bool>;

    /// All balances in catalog order.
    fn portfolio(&self, session: &Session, catalog: &Catalog) -> Result<Vec<CurrencyValue>>;

    fn get_balance(&self, session: &Session, currency: CurrencyDescriptor)
    -> Result<CurrencyValue>;

    /// Writes both balances together or neither.
    fn apply_two_sided_update(
        &self,
        session: &Session,
        first: &CurrencyValue,
        second: &CurrencyValue,
    ) -> Result<()>;
}

/// Initial balances for a new portfolio, canonicalised to each currency's precision.
pub fn initial_balances(catalog: &Catalog) -> Result<Vec<CurrencyValue>> {
    catalog
        .all()
        .iter()
        .map(|c| CurrencyValue::parse_quantized(*c, c.initial_balance))
        .collect()
}
