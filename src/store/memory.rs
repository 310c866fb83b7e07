use crate::core::catalog::{Catalog, CurrencyDescriptor};
use crate::core::error::{FxError, Result};
use crate::core::portfolio::{PortfolioStore, initial_balances};
use crate::core::session::Session;
use crate::core::value::CurrencyValue;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use tracing::debug;

type Balances = HashMap<&'static str, CurrencyValue>;

/// In-memory portfolio store. Nothing survives the process.
#[derive(Default)]
pub struct MemoryPortfolioStore {
    inner: RwLock<HashMap<String, Balances>>,
}

impl MemoryPortfolioStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn poisoned<T>(_: PoisonError<T>) -> FxError {
    FxError::StorageUnavailable("portfolio lock poisoned".to_string())
}

impl PortfolioStore for MemoryPortfolioStore {
    fn create_portfolio(&self, session: &Session, catalog: &Catalog) -> Result<()> {
        let balances = initial_balances(catalog)?;
        let mut portfolios = self.inner.write().map_err(poisoned)?;
        if portfolios.contains_key(session.username()) {
            return Err(FxError::PortfolioExists(session.username().to_string()));
        }
        portfolios.insert(
            session.username().to_string(),
            balances.into_iter().map(|b| (b.currency().code, b)).collect(),
        );
        debug!(user = session.username(), "Portfolio created");
        Ok(())
    }

    fn portfolio_exists(&self, session: &Session) -> Result<bool> {
        let portfolios = self.inner.read().map_err(poisoned)?;
        Ok(portfolios.contains_key(session.username()))
    }

    fn portfolio(&self, session: &Session, catalog: &Catalog) -> Result<Vec<CurrencyValue>> {
        catalog
            .all()
            .iter()
            .map(|c| self.get_balance(session, *c))
            .collect()
    }

    fn get_balance(
        &self,
        session: &Session,
        currency: CurrencyDescriptor,
    ) -> Result<CurrencyValue> {
        let portfolios = self.inner.read().map_err(poisoned)?;
        portfolios
            .get(session.username())
            .and_then(|balances| balances.get(currency.code))
            .copied()
            .ok_or_else(|| FxError::PortfolioNotFound(session.username().to_string()))
    }

    fn apply_two_sided_update(
        &self,
        session: &Session,
        first: &CurrencyValue,
        second: &CurrencyValue,
    ) -> Result<()> {
        let mut portfolios = self.inner.write().map_err(poisoned)?;
        let balances = portfolios
            .get_mut(session.username())
            .filter(|b| {
                b.contains_key(first.currency().code) && b.contains_key(second.currency().code)
            })
            .ok_or_else(|| FxError::PortfolioNotFound(session.username().to_string()))?;

        balances.insert(first.currency().code, *first);
        balances.insert(second.currency().code, *second);
        Ok(())
    }
}
