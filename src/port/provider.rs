//! Rate provider port.

use async_trait::async_trait;

use crate::domain::{CurrencyCode, RateTable};
use crate::error::RateError;

/// Fetches a full rate table expressed in the given base currency.
///
/// Pure I/O boundary: the core assumes nothing about the transport, only
/// this request/response contract. Failures are transient; the cache
/// keeps serving its previous table.
#[async_trait]
pub trait RateProvider: Send + Sync {
    async fn fetch(&self, base: &CurrencyCode) -> Result<RateTable, RateError>;
}
