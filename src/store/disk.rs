use crate::core::catalog::{Catalog, CurrencyDescriptor};
use crate::core::error::{FxError, Result};
use crate::core::portfolio::{PortfolioStore, initial_balances};
use crate::core::session::Session;
use crate::core::value::CurrencyValue;
use fjall::{Keyspace, PartitionCreateOptions, PartitionHandle, PersistMode};
use std::path::Path;
use tracing::debug;

const PORTFOLIO_PARTITION: &str = "portfolio";

/// Portfolio store on a fjall keyspace. One key per (user, currency), holding
/// the canonical amount string. Every write is a single batch synced to disk
/// as part of its commit, so a failed commit leaves no row changed.
pub struct DiskPortfolioStore {
    keyspace: Keyspace,
    partition: PartitionHandle,
}

fn storage(e: impl std::fmt::Display) -> FxError {
    FxError::StorageUnavailable(e.to_string())
}

fn balance_key(session: &Session, currency: &CurrencyDescriptor) -> String {
    format!("{}/{}", session.username(), currency.code)
}

impl DiskPortfolioStore {
    pub fn open(path: &Path) -> anyhow::Result<Self> {
        std::fs::create_dir_all(path)?;
        let keyspace = fjall::Config::new(path).open()?;
        let partition =
            keyspace.open_partition(PORTFOLIO_PARTITION, PartitionCreateOptions::default())?;
        debug!("Opened portfolio store at {}", path.display());
        Ok(Self {
            keyspace,
            partition,
        })
    }

    fn contains(&self, key: &str) -> Result<bool> {
        self.partition.contains_key(key).map_err(storage)
    }
}

impl PortfolioStore for DiskPortfolioStore {
    fn create_portfolio(&self, session: &Session, catalog: &Catalog) -> Result<()> {
        if self.portfolio_exists(session)? {
            return Err(FxError::PortfolioExists(session.username().to_string()));
        }

        let mut batch = self.keyspace.batch().durability(Some(PersistMode::SyncAll));
        for balance in initial_balances(catalog)? {
            batch.insert(
                &self.partition,
                balance_key(session, &balance.currency()),
                balance.to_string(),
            );
        }
        batch.commit().map_err(storage)?;
        debug!(user = session.username(), "Portfolio created");
        Ok(())
    }

    fn portfolio_exists(&self, session: &Session) -> Result<bool> {
        let prefix = format!("{}/", session.username());
        self.partition
            .prefix(prefix)
            .next()
            .transpose()
            .map(|first| first.is_some())
            .map_err(storage)
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
        let key = balance_key(session, &currency);
        let raw = self
            .partition
            .get(&key)
            .map_err(storage)?
            .ok_or_else(|| FxError::PortfolioNotFound(session.username().to_string()))?;
        let text = std::str::from_utf8(&raw).map_err(storage)?;
        CurrencyValue::parse_exact(currency, text)
            .map_err(|e| storage(format!("corrupt balance under {key}: {e}")))
    }

    fn apply_two_sided_update(
        &self,
        session: &Session,
        first: &CurrencyValue,
        second: &CurrencyValue,
    ) -> Result<()> {
        let first_key = balance_key(session, &first.currency());
        let second_key = balance_key(session, &second.currency());
        if !self.contains(&first_key)? || !self.contains(&second_key)? {
            return Err(FxError::PortfolioNotFound(session.username().to_string()));
        }

        let mut batch = self.keyspace.batch().durability(Some(PersistMode::SyncAll));
        batch.insert(&self.partition, first_key, first.to_string());
        batch.insert(&self.partition, second_key, second.to_string());
        batch.commit().map_err(storage)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use tempfile::tempdir;

    #[test]
    fn test_disk_store_create_and_read() {
        let dir = tempdir().unwrap();
        let store = DiskPortfolioStore::open(dir.path()).unwrap();
        let catalog = Catalog::standard();
        let session = Session::new("alice").unwrap();

        assert!(!store.portfolio_exists(&session).unwrap());
        store.create_portfolio(&session, catalog).unwrap();
        assert!(store.portfolio_exists(&session).unwrap());

        let balances = store.portfolio(&session, catalog).unwrap();
        assert_eq!(balances, initial_balances(catalog).unwrap());
        assert_eq!(
            store.create_portfolio(&session, catalog),
            Err(FxError::PortfolioExists("alice".to_string()))
        );
    }

    #[test]
    fn test_disk_store_users_are_isolated() {
        let dir = tempdir().unwrap();
        let store = DiskPortfolioStore::open(dir.path()).unwrap();
        let catalog = Catalog::standard();
        let alice = Session::new("alice").unwrap();
        let alicia = Session::new("alicia").unwrap();
        store.create_portfolio(&alice, catalog).unwrap();

        assert!(!store.portfolio_exists(&alicia).unwrap());
        assert_eq!(
            store.get_balance(&alicia, catalog.base_currency()),
            Err(FxError::PortfolioNotFound("alicia".to_string()))
        );
    }

    #[test]
    fn test_disk_store_two_sided_update_survives_reopen() {
        let dir = tempdir().unwrap();
        let catalog = Catalog::standard();
        let session = Session::new("alice").unwrap();
        let jpy = catalog.resolve("JPY").unwrap();
        let new_jpy = CurrencyValue::new(jpy, dec!(15000)).unwrap();
        let new_usd = CurrencyValue::new(catalog.base_currency(), dec!(9900.00)).unwrap();

        {
            let store = DiskPortfolioStore::open(dir.path()).unwrap();
            store.create_portfolio(&session, catalog).unwrap();
            store.apply_two_sided_update(&session, &new_jpy, &new_usd).unwrap();
        }

        let store = DiskPortfolioStore::open(dir.path()).unwrap();
        assert_eq!(store.get_balance(&session, jpy).unwrap(), new_jpy);
        assert_eq!(store.get_balance(&session, catalog.base_currency()).unwrap(), new_usd);
    }

    #[test]
    fn test_disk_store_update_without_portfolio_writes_nothing() {
        let dir = tempdir().unwrap();
        let store = DiskPortfolioStore::open(dir.path()).unwrap();
        let catalog = Catalog::standard();
        let session = Session::new("nobody").unwrap();
        let usd = CurrencyValue::new(catalog.base_currency(), dec!(1.00)).unwrap();
        let eur = CurrencyValue::new(catalog.resolve("EUR").unwrap(), dec!(1.00)).unwrap();

        assert!(store.apply_two_sided_update(&session, &usd, &eur).is_err());
        assert!(!store.portfolio_exists(&session).unwrap());
    }

    #[test]
    fn test_disk_store_update_with_missing_row_keeps_other_row() {
        let dir = tempdir().unwrap();
        let standard = Catalog::standard();
        let without_jpy = Catalog::new(
            standard
                .all()
                .iter()
                .filter(|c| c.code != "JPY")
                .copied()
                .collect(),
            "USD",
        )
        .unwrap();
        let session = Session::new("alice").unwrap();
        let eur = standard.resolve("EUR").unwrap();
        let jpy = standard.resolve("JPY").unwrap();

        {
            let store = DiskPortfolioStore::open(dir.path()).unwrap();
            store.create_portfolio(&session, &without_jpy).unwrap();
            let result = store.apply_two_sided_update(
                &session,
                &CurrencyValue::new(eur, dec!(50.00)).unwrap(),
                &CurrencyValue::new(jpy, dec!(7)).unwrap(),
            );
            assert_eq!(result, Err(FxError::PortfolioNotFound("alice".to_string())));
        }

        let store = DiskPortfolioStore::open(dir.path()).unwrap();
        assert_eq!(store.get_balance(&session, eur).unwrap().to_string(), "0.00");
        assert!(store.get_balance(&session, jpy).is_err());
    }
}
