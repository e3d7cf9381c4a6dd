//! Preference store port.

use async_trait::async_trait;

use crate::domain::{
    AlertId, AlertRule, Comparator, CurrencyCode, HistoryEntry, Language, Theme, UserId,
    UserProfile,
};
use crate::error::StoreError;

/// Persistence operations for profiles, history, and alert rules.
///
/// # Implementation Notes
///
/// - Implementations must be thread-safe (`Send + Sync`)
/// - `profile` creates the row on first access with configured defaults
/// - `append_history` trims each user's history to the configured cap
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// Get the user's profile, creating it with defaults if absent.
    async fn profile(&self, user: UserId) -> Result<UserProfile, StoreError>;

    /// Update the language preference.
    async fn set_language(&self, user: UserId, language: Language) -> Result<(), StoreError>;

    /// Update the theme preference.
    async fn set_theme(&self, user: UserId, theme: Theme) -> Result<(), StoreError>;

    /// Replace the favorite currency list. The list must be non-empty.
    async fn set_favorites(
        &self,
        user: UserId,
        favorites: Vec<CurrencyCode>,
    ) -> Result<(), StoreError>;

    /// Append a conversion record, trimming to the history cap.
    async fn append_history(&self, user: UserId, entry: HistoryEntry) -> Result<(), StoreError>;

    /// History entries for the user, newest first, capped.
    async fn history(&self, user: UserId) -> Result<Vec<HistoryEntry>, StoreError>;

    /// Insert a new alert rule and return it with its assigned id.
    async fn insert_alert(
        &self,
        user: UserId,
        currency: CurrencyCode,
        comparator: Comparator,
        threshold: f64,
    ) -> Result<AlertRule, StoreError>;

    /// All alert rules across all users, for the evaluator.
    async fn list_all_alerts(&self) -> Result<Vec<AlertRule>, StoreError>;

    /// Alert rules owned by one user.
    async fn list_alerts(&self, user: UserId) -> Result<Vec<AlertRule>, StoreError>;

    /// Delete an alert rule. Returns true if the rule existed and was
    /// owned by `user`.
    async fn delete_alert(&self, user: UserId, id: AlertId) -> Result<bool, StoreError>;
}
