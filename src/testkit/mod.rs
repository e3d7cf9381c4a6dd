//! Test doubles for the crate's ports.
//!
//! Compiled behind the `testkit` feature; the integration suites enable
//! it through the self dev-dependency.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{
    AlertId, AlertRule, Comparator, CurrencyCode, HistoryEntry, Language, RateTable, Theme,
    UserId, UserProfile,
};
use crate::error::{DeliveryError, RateError, StoreError};
use crate::port::{Notifier, PreferenceStore, RateProvider};

/// Provider serving a fixed table, optionally switched into failure mode.
pub struct StaticRateProvider {
    table: Mutex<RateTable>,
    failing: AtomicBool,
}

impl StaticRateProvider {
    #[must_use]
    pub fn new(table: RateTable) -> Self {
        Self {
            table: Mutex::new(table),
            failing: AtomicBool::new(false),
        }
    }

    /// Build a provider from `(code, rate)` pairs.
    #[must_use]
    pub fn with_rates(pairs: &[(&str, f64)]) -> Self {
        let table = pairs
            .iter()
            .filter_map(|(code, rate)| Some((CurrencyCode::parse(code)?, *rate)))
            .collect();
        Self::new(table)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_table(&self, table: RateTable) {
        *self.table.lock() = table;
    }
}

#[async_trait]
impl RateProvider for StaticRateProvider {
    async fn fetch(&self, _base: &CurrencyCode) -> Result<RateTable, RateError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RateError::Fetch("static provider failing".into()));
        }
        Ok(self.table.lock().clone())
    }
}

#[derive(Default)]
struct MemoryState {
    profiles: HashMap<UserId, UserProfile>,
    history: HashMap<UserId, Vec<HistoryEntry>>,
    alerts: Vec<AlertRule>,
    next_alert_id: i64,
}

/// In-memory preference store with the same contract as the SQLite one.
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    history_cap: usize,
    failing: AtomicBool,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::with_history_cap(10)
    }

    #[must_use]
    pub fn with_history_cap(history_cap: usize) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            history_cap,
            failing: AtomicBool::new(false),
        }
    }

    /// Make every store operation fail, for degradation tests.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Connection("memory store failing".into()));
        }
        Ok(())
    }

    fn default_profile(user: UserId) -> UserProfile {
        UserProfile {
            user_id: user,
            language: Language::default(),
            theme: Theme::default(),
            favorites: ["USD", "EUR", "RUB"]
                .iter()
                .filter_map(|c| CurrencyCode::parse(c))
                .collect(),
        }
    }
}

#[async_trait]
impl PreferenceStore for MemoryStore {
    async fn profile(&self, user: UserId) -> Result<UserProfile, StoreError> {
        self.check()?;
        let mut state = self.state.lock();
        Ok(state
            .profiles
            .entry(user)
            .or_insert_with(|| Self::default_profile(user))
            .clone())
    }

    async fn set_language(&self, user: UserId, language: Language) -> Result<(), StoreError> {
        self.check()?;
        let mut state = self.state.lock();
        state
            .profiles
            .entry(user)
            .or_insert_with(|| Self::default_profile(user))
            .language = language;
        Ok(())
    }

    async fn set_theme(&self, user: UserId, theme: Theme) -> Result<(), StoreError> {
        self.check()?;
        let mut state = self.state.lock();
        state
            .profiles
            .entry(user)
            .or_insert_with(|| Self::default_profile(user))
            .theme = theme;
        Ok(())
    }

    async fn set_favorites(
        &self,
        user: UserId,
        favorites: Vec<CurrencyCode>,
    ) -> Result<(), StoreError> {
        self.check()?;
        let mut state = self.state.lock();
        state
            .profiles
            .entry(user)
            .or_insert_with(|| Self::default_profile(user))
            .favorites = favorites;
        Ok(())
    }

    async fn append_history(&self, user: UserId, entry: HistoryEntry) -> Result<(), StoreError> {
        self.check()?;
        let mut state = self.state.lock();
        let entries = state.history.entry(user).or_default();
        entries.insert(0, entry);
        entries.truncate(self.history_cap);
        Ok(())
    }

    async fn history(&self, user: UserId) -> Result<Vec<HistoryEntry>, StoreError> {
        self.check()?;
        Ok(self
            .state
            .lock()
            .history
            .get(&user)
            .cloned()
            .unwrap_or_default())
    }

    async fn insert_alert(
        &self,
        user: UserId,
        currency: CurrencyCode,
        comparator: Comparator,
        threshold: f64,
    ) -> Result<AlertRule, StoreError> {
        self.check()?;
        let mut state = self.state.lock();
        state.next_alert_id += 1;
        let rule = AlertRule {
            id: AlertId(state.next_alert_id),
            user_id: user,
            currency,
            comparator,
            threshold,
        };
        state.alerts.push(rule.clone());
        Ok(rule)
    }

    async fn list_all_alerts(&self) -> Result<Vec<AlertRule>, StoreError> {
        self.check()?;
        Ok(self.state.lock().alerts.clone())
    }

    async fn list_alerts(&self, user: UserId) -> Result<Vec<AlertRule>, StoreError> {
        self.check()?;
        Ok(self
            .state
            .lock()
            .alerts
            .iter()
            .filter(|rule| rule.user_id == user)
            .cloned()
            .collect())
    }

    async fn delete_alert(&self, user: UserId, id: AlertId) -> Result<bool, StoreError> {
        self.check()?;
        let mut state = self.state.lock();
        let before = state.alerts.len();
        state
            .alerts
            .retain(|rule| !(rule.id == id && rule.user_id == user));
        Ok(state.alerts.len() < before)
    }
}

/// Thread-safe delivery collector for notification assertions in tests.
#[derive(Default)]
pub struct RecordingNotifier {
    delivered: Mutex<Vec<(UserId, String)>>,
    failing: AtomicBool,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    #[must_use]
    pub fn delivered(&self) -> Vec<(UserId, String)> {
        self.delivered.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.delivered.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.delivered.lock().is_empty()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, user: UserId, text: &str) -> Result<(), DeliveryError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(DeliveryError("recording notifier failing".into()));
        }
        self.delivered.lock().push((user, text.to_string()));
        Ok(())
    }
}
