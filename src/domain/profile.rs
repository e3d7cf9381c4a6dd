//! User profile, preferences, and conversion history.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::CurrencyCode;

/// Stable user identifier supplied by the transport layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Supported reply locales.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Ru,
    En,
}

impl Language {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ru => "ru",
            Self::En => "en",
        }
    }

    #[must_use]
    pub fn from_str_or_default(value: &str) -> Self {
        match value {
            "en" => Self::En,
            _ => Self::Ru,
        }
    }

    /// The other supported locale, used by the language toggle command.
    #[must_use]
    pub fn toggled(self) -> Self {
        match self {
            Self::Ru => Self::En,
            Self::En => Self::Ru,
        }
    }
}

/// Display theme preference.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    #[must_use]
    pub fn from_str_or_default(value: &str) -> Self {
        match value {
            "dark" => Self::Dark,
            _ => Self::Light,
        }
    }
}

/// Persisted per-user preferences.
///
/// Created on first access with defaults from configuration; `favorites`
/// is never empty.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProfile {
    pub user_id: UserId,
    pub language: Language,
    pub theme: Theme,
    pub favorites: Vec<CurrencyCode>,
}

/// One completed conversion, retained newest-first up to a configured cap.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub from: CurrencyCode,
    pub to: CurrencyCode,
    pub amount: f64,
    pub result: f64,
    pub at: DateTime<Utc>,
}
