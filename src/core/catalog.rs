//! Supported currencies and their fixed-point precision

use crate::core::error::{FxError, Result};
use rust_decimal::Decimal;
use std::fmt::Display;
use std::sync::LazyLock;

/// Static description of one supported currency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CurrencyDescriptor {
    pub code: &'static str,
    pub decimal_places: u32,
    pub symbol: &'static str,
    /// Starting balance for a newly created portfolio.
    pub initial_balance: &'static str,
}

impl CurrencyDescriptor {
    pub const fn new(
        code: &'static str,
        decimal_places: u32,
        symbol: &'static str,
        initial_balance: &'static str,
    ) -> Self {
        Self {
            code,
            decimal_places,
            symbol,
            initial_balance,
        }
    }

    /// Smallest representable increment, `10^-decimal_places`.
    pub fn quantization_unit(&self) -> Decimal {
        Decimal::new(1, self.decimal_places)
    }
}

impl Display for CurrencyDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code)
    }
}

const STANDARD_CURRENCIES: [CurrencyDescriptor; 7] = [
    CurrencyDescriptor::new("AUD", 2, "AU$", "0"),
    CurrencyDescriptor::new("CAD", 2, "CA$", "0"),
    CurrencyDescriptor::new("CHF", 2, "SFr", "0"),
    CurrencyDescriptor::new("EUR", 2, "€", "0"),
    CurrencyDescriptor::new("GBP", 2, "£", "0"),
    CurrencyDescriptor::new("JPY", 0, "¥", "0"),
    CurrencyDescriptor::new("USD", 2, "$", "10000"),
];

const STANDARD_BASE: &str = "USD";

static STANDARD: LazyLock<Catalog> = LazyLock::new(|| Catalog {
    currencies: STANDARD_CURRENCIES.to_vec(),
    base: STANDARD_CURRENCIES
        .iter()
        .position(|c| c.code == STANDARD_BASE)
        .unwrap_or_default(),
});

/// Immutable registry of currencies, one of which is the base currency.
#[derive(Debug, Clone)]
pub struct Catalog {
    currencies: Vec<CurrencyDescriptor>,
    base: usize,
}

impl Catalog {
    /// The process-wide catalog of supported currencies.
    pub fn standard() -> &'static Catalog {
        &STANDARD
    }

    /// Builds a catalog from `currencies`, designating `base_code` as the base.
    /// Returns `None` if the base code is not among the currencies or a code repeats.
    pub fn new(currencies: Vec<CurrencyDescriptor>, base_code: &str) -> Option<Self> {
        let base = currencies.iter().position(|c| c.code == base_code)?;
        let has_duplicates = currencies
            .iter()
            .enumerate()
            .any(|(i, c)| currencies[i + 1..].iter().any(|o| o.code == c.code));
        if has_duplicates {
            return None;
        }
        Some(Self { currencies, base })
    }

    /// Case-insensitive lookup with surrounding whitespace ignored.
    pub fn resolve(&self, code: &str) -> Option<CurrencyDescriptor> {
        let code = code.trim();
        self.currencies
            .iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
            .copied()
    }

    /// Like [`Catalog::resolve`] but restricted to FX currencies.
    pub fn resolve_fx(&self, code: &str) -> Result<CurrencyDescriptor> {
        self.resolve(code)
            .filter(|c| !self.is_base(c))
            .ok_or_else(|| FxError::CurrencyNotFound(code.trim().to_string()))
    }

    pub fn base_currency(&self) -> CurrencyDescriptor {
        self.currencies[self.base]
    }

    pub fn is_base(&self, descriptor: &CurrencyDescriptor) -> bool {
        descriptor.code == self.currencies[self.base].code
    }

    pub fn fx_currencies(&self) -> impl Iterator<Item = CurrencyDescriptor> + '_ {
        self.currencies
            .iter()
            .enumerate()
            .filter(move |(i, _)| *i != self.base)
            .map(|(_, c)| *c)
    }

    pub fn fx_codes(&self) -> Vec<&'static str> {
        self.fx_currencies().map(|c| c.code).collect()
    }

    /// All currencies in declaration order.
    pub fn all(&self) -> &[CurrencyDescriptor] {
        &self.currencies
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::str::FromStr;

    #[test]
    fn test_standard_catalog_base_is_usd() {
        let catalog = Catalog::standard();
        let usd = catalog.base_currency();
        assert_eq!(usd.code, "USD");
        assert_eq!(usd.decimal_places, 2);
        assert_eq!(usd.quantization_unit(), dec!(0.01));
        assert_eq!(usd.symbol, "$");
        assert_eq!(usd.initial_balance, "10000");
    }

    #[test]
    fn test_fx_currencies_exclude_base() {
        let catalog = Catalog::standard();
        assert_eq!(
            catalog.fx_codes(),
            vec!["AUD", "CAD", "CHF", "EUR", "GBP", "JPY"]
        );
        assert!(catalog.fx_currencies().all(|c| !catalog.is_base(&c)));
    }

    #[test]
    fn test_initial_balances_fit_precision() {
        for currency in Catalog::standard().all() {
            let initial = Decimal::from_str(currency.initial_balance)
                .unwrap_or_else(|_| panic!("initial balance of {currency} isn't a number"));
            assert!(!initial.is_sign_negative());
            assert!(initial.normalize().scale() <= currency.decimal_places);
        }
    }

    #[test]
    fn test_quantization_unit_zero_places() {
        let jpy = Catalog::standard().resolve("JPY").unwrap();
        assert_eq!(jpy.quantization_unit(), Decimal::ONE);
        assert_eq!(jpy.quantization_unit().scale(), 0);
    }

    #[test]
    fn test_resolve_is_case_insensitive_and_trimmed() {
        let catalog = Catalog::standard();
        for input in ["USD", "Usd", "usd", " USD", "  Usd ", "  usd   "] {
            assert_eq!(catalog.resolve(input).map(|c| c.code), Some("USD"));
        }
    }

    #[test]
    fn test_resolve_unknown_returns_none() {
        let catalog = Catalog::standard();
        for input in ["us d", "dollar", "U.S.D", "MUR", "$", "", " ", "0"] {
            assert!(catalog.resolve(input).is_none(), "resolved '{input}'");
        }
    }

    #[test]
    fn test_resolve_fx_rejects_base() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.resolve_fx(" eur ").unwrap().code, "EUR");
        assert_eq!(
            catalog.resolve_fx("usd"),
            Err(FxError::CurrencyNotFound("usd".to_string()))
        );
    }

    #[test]
    fn test_new_catalog_validates_base_and_duplicates() {
        let a = CurrencyDescriptor::new("AAA", 2, "A", "0");
        let b = CurrencyDescriptor::new("BBB", 3, "B", "0");
        assert!(Catalog::new(vec![a, b], "CCC").is_none());
        assert!(Catalog::new(vec![a, a], "AAA").is_none());

        let catalog = Catalog::new(vec![a, b], "BBB").unwrap();
        assert_eq!(catalog.base_currency(), b);
        assert_eq!(catalog.fx_codes(), vec!["AAA"]);
    }
}
