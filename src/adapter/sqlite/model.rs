//! Diesel row types for the SQLite store.

use diesel::prelude::*;

use super::schema::{alerts, history, profiles};

#[derive(Debug, Queryable, Insertable, AsChangeset)]
#[diesel(table_name = profiles)]
pub struct ProfileRow {
    pub user_id: i64,
    pub language: String,
    pub theme: String,
    /// JSON array of currency codes.
    pub favorites: String,
}

#[derive(Debug, Queryable)]
#[diesel(table_name = history)]
pub struct HistoryRow {
    pub id: i64,
    pub user_id: i64,
    pub from_code: String,
    pub to_code: String,
    pub amount: f64,
    pub result: f64,
    pub created_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = history)]
pub struct NewHistoryRow {
    pub user_id: i64,
    pub from_code: String,
    pub to_code: String,
    pub amount: f64,
    pub result: f64,
    pub created_at: String,
}

#[derive(Debug, Queryable)]
#[diesel(table_name = alerts)]
pub struct AlertRow {
    pub id: i64,
    pub user_id: i64,
    pub currency: String,
    pub comparator: String,
    pub threshold: f64,
    pub created_at: String,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = alerts)]
pub struct NewAlertRow {
    pub user_id: i64,
    pub currency: String,
    pub comparator: String,
    pub threshold: f64,
    pub created_at: String,
}
