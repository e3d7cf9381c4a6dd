//! Exchange rate table.

use std::collections::HashMap;

use serde::Deserialize;

use super::CurrencyCode;

/// A snapshot of exchange rates, all expressed relative to one base
/// currency.
///
/// A code absent from the table is *unknown*: callers must surface that
/// as an error rather than substitute a default rate.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(transparent)]
pub struct RateTable {
    rates: HashMap<CurrencyCode, f64>,
}

impl RateTable {
    #[must_use]
    pub fn new(rates: HashMap<CurrencyCode, f64>) -> Self {
        Self { rates }
    }

    /// Rate for `code` against the base currency, if known.
    #[must_use]
    pub fn rate(&self, code: &CurrencyCode) -> Option<f64> {
        self.rates.get(code).copied()
    }

    #[must_use]
    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.rates.contains_key(code)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rates.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rates.len()
    }
}

impl FromIterator<(CurrencyCode, f64)> for RateTable {
    fn from_iter<I: IntoIterator<Item = (CurrencyCode, f64)>>(iter: I) -> Self {
        Self {
            rates: iter.into_iter().collect(),
        }
    }
}
