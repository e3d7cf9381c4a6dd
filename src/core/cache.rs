//! Time-based rate cache and conversion arithmetic.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::info;

use crate::domain::{CurrencyCode, RateTable};
use crate::error::RateError;
use crate::port::RateProvider;

struct Snapshot {
    table: Arc<RateTable>,
    refreshed_at: Option<DateTime<Utc>>,
}

/// Shared cache of the provider's rate table with staleness tracking.
///
/// Created once at process start and shared by every user-facing flow
/// plus the alert evaluator. Readers always see either the previous
/// table or the fully replaced one: a refresh swaps the whole snapshot
/// under a write lock, never mutating entries in place.
pub struct RateCache {
    provider: Arc<dyn RateProvider>,
    base: CurrencyCode,
    staleness: chrono::Duration,
    snapshot: RwLock<Snapshot>,
    /// Serializes concurrent refresh attempts so a stale burst performs
    /// one provider round trip, not one per caller.
    refresh_gate: tokio::sync::Mutex<()>,
}

impl RateCache {
    #[must_use]
    pub fn new(provider: Arc<dyn RateProvider>, base: CurrencyCode, staleness: Duration) -> Self {
        let staleness =
            chrono::Duration::from_std(staleness).unwrap_or_else(|_| chrono::Duration::hours(1));
        Self {
            provider,
            base,
            staleness,
            snapshot: RwLock::new(Snapshot {
                table: Arc::new(RateTable::default()),
                refreshed_at: None,
            }),
            refresh_gate: tokio::sync::Mutex::new(()),
        }
    }

    #[must_use]
    pub fn base(&self) -> &CurrencyCode {
        &self.base
    }

    /// Current table snapshot. Cheap: clones an `Arc`.
    #[must_use]
    pub fn table(&self) -> Arc<RateTable> {
        self.snapshot.read().table.clone()
    }

    /// Rate for `code` against the base currency, if currently known.
    #[must_use]
    pub fn rate(&self, code: &CurrencyCode) -> Option<f64> {
        self.snapshot.read().table.rate(code)
    }

    #[must_use]
    pub fn contains(&self, code: &CurrencyCode) -> bool {
        self.snapshot.read().table.contains(code)
    }

    /// True if never refreshed or older than the staleness window.
    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.snapshot.read().refreshed_at {
            None => true,
            Some(at) => now - at > self.staleness,
        }
    }

    /// Fetch a fresh table from the provider and swap it in atomically.
    ///
    /// On failure the previous table and timestamp are left untouched;
    /// callers keep serving stale data rather than hard-failing.
    pub async fn refresh(&self) -> Result<(), RateError> {
        let table = self.provider.fetch(&self.base).await?;
        let count = table.len();

        let mut snapshot = self.snapshot.write();
        snapshot.table = Arc::new(table);
        snapshot.refreshed_at = Some(Utc::now());
        drop(snapshot);

        info!(currencies = count, base = %self.base, "rate table refreshed");
        Ok(())
    }

    /// Refresh only if the cached table is stale.
    ///
    /// The only suspension point in the conversation flows; at most one
    /// provider round trip per stale interaction.
    pub async fn ensure_fresh(&self) -> Result<(), RateError> {
        if !self.is_expired() {
            return Ok(());
        }
        let _gate = self.refresh_gate.lock().await;
        if !self.is_expired() {
            // Another caller refreshed while we waited for the gate.
            return Ok(());
        }
        self.refresh().await
    }

    /// Convert `amount` between two currencies via the base.
    ///
    /// Same-currency conversion is an identity short-circuit and needs
    /// no rate entry, even on an empty table. Otherwise both codes must
    /// be present; an absent code is an [`RateError::UnknownCurrency`],
    /// never an assumed rate.
    pub fn convert(
        &self,
        amount: f64,
        from: &CurrencyCode,
        to: &CurrencyCode,
    ) -> Result<f64, RateError> {
        if from == to {
            return Ok(amount);
        }
        let table = self.table();
        let rate_from = table.rate(from).ok_or_else(|| RateError::UnknownCurrency {
            code: from.to_string(),
        })?;
        let rate_to = table.rate(to).ok_or_else(|| RateError::UnknownCurrency {
            code: to.to_string(),
        })?;
        // All rates share the base, so the cross rate is base-normalized.
        Ok(amount / rate_from * rate_to)
    }
}
