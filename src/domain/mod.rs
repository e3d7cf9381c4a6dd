//! Transport-agnostic domain types.
//!
//! These types carry no I/O concerns and are shared between the core
//! services, the persistence adapter, and the Telegram adapter.

mod alert;
mod currency;
mod profile;
mod rates;

pub use alert::{AlertId, AlertRule, Comparator};
pub use currency::CurrencyCode;
pub use profile::{HistoryEntry, Language, Theme, UserId, UserProfile};
pub use rates::RateTable;
