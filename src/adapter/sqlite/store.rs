//! SQLite-backed preference store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{
    AlertId, AlertRule, Comparator, CurrencyCode, HistoryEntry, Language, Theme, UserId,
    UserProfile,
};
use crate::error::StoreError;
use crate::port::PreferenceStore;

use super::model::{AlertRow, HistoryRow, NewAlertRow, NewHistoryRow, ProfileRow};
use super::schema::{alerts, history, profiles};
use super::DbPool;

/// Values assigned to a profile created on first access.
#[derive(Debug, Clone)]
pub struct StoreDefaults {
    pub language: Language,
    pub favorites: Vec<CurrencyCode>,
}

/// Preference store backed by SQLite via Diesel.
pub struct SqliteStore {
    pool: DbPool,
    history_cap: usize,
    defaults: StoreDefaults,
}

impl SqliteStore {
    #[must_use]
    pub fn new(pool: DbPool, history_cap: usize, defaults: StoreDefaults) -> Self {
        Self {
            pool,
            history_cap,
            defaults,
        }
    }

    fn conn(
        &self,
    ) -> Result<diesel::r2d2::PooledConnection<diesel::r2d2::ConnectionManager<SqliteConnection>>, StoreError>
    {
        self.pool
            .get()
            .map_err(|e| StoreError::Connection(e.to_string()))
    }

    fn profile_from_row(row: ProfileRow) -> Result<UserProfile, StoreError> {
        let favorites: Vec<String> =
            serde_json::from_str(&row.favorites).map_err(|e| StoreError::Serialize(e.to_string()))?;
        let favorites = favorites
            .iter()
            .filter_map(|c| CurrencyCode::parse(c))
            .collect();
        Ok(UserProfile {
            user_id: UserId(row.user_id),
            language: Language::from_str_or_default(&row.language),
            theme: Theme::from_str_or_default(&row.theme),
            favorites,
        })
    }

    fn favorites_json(favorites: &[CurrencyCode]) -> Result<String, StoreError> {
        let codes: Vec<&str> = favorites.iter().map(CurrencyCode::as_str).collect();
        serde_json::to_string(&codes).map_err(|e| StoreError::Serialize(e.to_string()))
    }

    fn history_from_row(row: HistoryRow) -> Result<HistoryEntry, StoreError> {
        let at: DateTime<Utc> = DateTime::parse_from_rfc3339(&row.created_at)
            .map_err(|e| StoreError::Serialize(e.to_string()))?
            .with_timezone(&Utc);
        let from = CurrencyCode::parse(&row.from_code)
            .ok_or_else(|| StoreError::Serialize(format!("bad code `{}`", row.from_code)))?;
        let to = CurrencyCode::parse(&row.to_code)
            .ok_or_else(|| StoreError::Serialize(format!("bad code `{}`", row.to_code)))?;
        Ok(HistoryEntry {
            from,
            to,
            amount: row.amount,
            result: row.result,
            at,
        })
    }

    fn alert_from_row(row: AlertRow) -> Result<AlertRule, StoreError> {
        let currency = CurrencyCode::parse(&row.currency)
            .ok_or_else(|| StoreError::Serialize(format!("bad code `{}`", row.currency)))?;
        let comparator = Comparator::parse(&row.comparator)
            .ok_or_else(|| StoreError::Serialize(format!("bad comparator `{}`", row.comparator)))?;
        Ok(AlertRule {
            id: AlertId(row.id),
            user_id: UserId(row.user_id),
            currency,
            comparator,
            threshold: row.threshold,
        })
    }

    /// Row for a profile created on first access.
    fn default_profile_row(&self, user: UserId) -> Result<ProfileRow, StoreError> {
        Ok(ProfileRow {
            user_id: user.0,
            language: self.defaults.language.as_str().to_string(),
            theme: Theme::default().as_str().to_string(),
            favorites: Self::favorites_json(&self.defaults.favorites)?,
        })
    }
}

#[derive(QueryableByName)]
struct LastInsertRowId {
    #[diesel(sql_type = diesel::sql_types::BigInt)]
    id: i64,
}

#[async_trait]
impl PreferenceStore for SqliteStore {
    async fn profile(&self, user: UserId) -> Result<UserProfile, StoreError> {
        let mut conn = self.conn()?;

        let existing: Option<ProfileRow> = profiles::table
            .find(user.0)
            .first(&mut conn)
            .optional()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        match existing {
            Some(row) => Self::profile_from_row(row),
            None => {
                let row = self.default_profile_row(user)?;
                diesel::insert_into(profiles::table)
                    .values(&row)
                    .execute(&mut conn)
                    .map_err(|e| StoreError::Database(e.to_string()))?;
                Self::profile_from_row(row)
            }
        }
    }

    async fn set_language(&self, user: UserId, language: Language) -> Result<(), StoreError> {
        // Make sure the row exists before updating a single column.
        self.profile(user).await?;
        let mut conn = self.conn()?;
        diesel::update(profiles::table.find(user.0))
            .set(profiles::language.eq(language.as_str()))
            .execute(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    async fn set_theme(&self, user: UserId, theme: Theme) -> Result<(), StoreError> {
        self.profile(user).await?;
        let mut conn = self.conn()?;
        diesel::update(profiles::table.find(user.0))
            .set(profiles::theme.eq(theme.as_str()))
            .execute(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    async fn set_favorites(
        &self,
        user: UserId,
        favorites: Vec<CurrencyCode>,
    ) -> Result<(), StoreError> {
        self.profile(user).await?;
        let json = Self::favorites_json(&favorites)?;
        let mut conn = self.conn()?;
        diesel::update(profiles::table.find(user.0))
            .set(profiles::favorites.eq(json))
            .execute(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(())
    }

    async fn append_history(&self, user: UserId, entry: HistoryEntry) -> Result<(), StoreError> {
        let mut conn = self.conn()?;

        let row = NewHistoryRow {
            user_id: user.0,
            from_code: entry.from.to_string(),
            to_code: entry.to.to_string(),
            amount: entry.amount,
            result: entry.result,
            created_at: entry.at.to_rfc3339(),
        };
        diesel::insert_into(history::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        // Trim to the newest `history_cap` entries for this user.
        let keep: Vec<i64> = history::table
            .filter(history::user_id.eq(user.0))
            .order(history::id.desc())
            .limit(self.history_cap as i64)
            .select(history::id)
            .load(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        diesel::delete(
            history::table
                .filter(history::user_id.eq(user.0))
                .filter(history::id.ne_all(keep)),
        )
        .execute(&mut conn)
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    async fn history(&self, user: UserId) -> Result<Vec<HistoryEntry>, StoreError> {
        let mut conn = self.conn()?;
        let rows: Vec<HistoryRow> = history::table
            .filter(history::user_id.eq(user.0))
            .order(history::id.desc())
            .limit(self.history_cap as i64)
            .load(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        rows.into_iter().map(Self::history_from_row).collect()
    }

    async fn insert_alert(
        &self,
        user: UserId,
        currency: CurrencyCode,
        comparator: Comparator,
        threshold: f64,
    ) -> Result<AlertRule, StoreError> {
        let mut conn = self.conn()?;

        let row = NewAlertRow {
            user_id: user.0,
            currency: currency.to_string(),
            comparator: comparator.symbol().to_string(),
            threshold,
            created_at: Utc::now().to_rfc3339(),
        };
        diesel::insert_into(alerts::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let id: i64 = diesel::sql_query("SELECT last_insert_rowid() AS id")
            .get_result::<LastInsertRowId>(&mut conn)
            .map(|row| row.id)
            .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(AlertRule {
            id: AlertId(id),
            user_id: user,
            currency,
            comparator,
            threshold,
        })
    }

    async fn list_all_alerts(&self) -> Result<Vec<AlertRule>, StoreError> {
        let mut conn = self.conn()?;
        let rows: Vec<AlertRow> = alerts::table
            .order(alerts::id.asc())
            .load(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        rows.into_iter().map(Self::alert_from_row).collect()
    }

    async fn list_alerts(&self, user: UserId) -> Result<Vec<AlertRule>, StoreError> {
        let mut conn = self.conn()?;
        let rows: Vec<AlertRow> = alerts::table
            .filter(alerts::user_id.eq(user.0))
            .order(alerts::id.asc())
            .load(&mut conn)
            .map_err(|e| StoreError::Database(e.to_string()))?;
        rows.into_iter().map(Self::alert_from_row).collect()
    }

    async fn delete_alert(&self, user: UserId, id: AlertId) -> Result<bool, StoreError> {
        let mut conn = self.conn()?;
        let deleted = diesel::delete(
            alerts::table
                .find(id.0)
                .filter(alerts::user_id.eq(user.0)),
        )
        .execute(&mut conn)
        .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(deleted > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::super::{create_pool, prepare_database};
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    fn store_at(path: &std::path::Path) -> SqliteStore {
        let pool = create_pool(path.to_str().unwrap()).unwrap();
        prepare_database(&pool).unwrap();
        SqliteStore::new(
            pool,
            3,
            StoreDefaults {
                language: Language::Ru,
                favorites: vec![code("USD"), code("EUR"), code("RUB")],
            },
        )
    }

    #[tokio::test]
    async fn profile_created_on_first_access() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir.path().join("bot.db"));

        let profile = store.profile(UserId(7)).await.unwrap();
        assert_eq!(profile.user_id, UserId(7));
        assert_eq!(profile.language, Language::Ru);
        assert_eq!(profile.favorites.len(), 3);

        // Second access returns the same row.
        let again = store.profile(UserId(7)).await.unwrap();
        assert_eq!(profile, again);
    }

    #[tokio::test]
    async fn language_and_favorites_persist() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir.path().join("bot.db"));

        store.set_language(UserId(7), Language::En).await.unwrap();
        store
            .set_favorites(UserId(7), vec![code("GBP"), code("JPY")])
            .await
            .unwrap();

        let profile = store.profile(UserId(7)).await.unwrap();
        assert_eq!(profile.language, Language::En);
        assert_eq!(profile.favorites, vec![code("GBP"), code("JPY")]);
    }

    #[tokio::test]
    async fn history_trimmed_to_cap_newest_first() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir.path().join("bot.db"));

        for i in 0..5 {
            store
                .append_history(
                    UserId(7),
                    HistoryEntry {
                        from: code("USD"),
                        to: code("EUR"),
                        amount: f64::from(i),
                        result: f64::from(i) * 0.9,
                        at: Utc::now(),
                    },
                )
                .await
                .unwrap();
        }

        let entries = store.history(UserId(7)).await.unwrap();
        assert_eq!(entries.len(), 3);
        let amounts: Vec<f64> = entries.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![4.0, 3.0, 2.0]);
    }

    #[tokio::test]
    async fn history_is_per_user() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir.path().join("bot.db"));

        store
            .append_history(
                UserId(1),
                HistoryEntry {
                    from: code("USD"),
                    to: code("EUR"),
                    amount: 10.0,
                    result: 9.0,
                    at: Utc::now(),
                },
            )
            .await
            .unwrap();

        assert_eq!(store.history(UserId(1)).await.unwrap().len(), 1);
        assert!(store.history(UserId(2)).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn alert_round_trip_and_ownership() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_at(&dir.path().join("bot.db"));

        let rule = store
            .insert_alert(UserId(1), code("EUR"), Comparator::Above, 0.8)
            .await
            .unwrap();
        // Duplicates are allowed.
        let dup = store
            .insert_alert(UserId(1), code("EUR"), Comparator::Above, 0.8)
            .await
            .unwrap();
        assert_ne!(rule.id, dup.id);

        assert_eq!(store.list_alerts(UserId(1)).await.unwrap().len(), 2);
        assert_eq!(store.list_all_alerts().await.unwrap().len(), 2);

        // Another user cannot delete someone else's rule.
        assert!(!store.delete_alert(UserId(2), rule.id).await.unwrap());
        assert!(store.delete_alert(UserId(1), rule.id).await.unwrap());
        assert!(!store.delete_alert(UserId(1), rule.id).await.unwrap());
        assert_eq!(store.list_alerts(UserId(1)).await.unwrap().len(), 1);
    }
}
