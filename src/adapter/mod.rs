//! Adapters binding the ports to real infrastructure.

pub mod provider;
pub mod sqlite;

#[cfg(feature = "telegram")]
pub mod telegram;

pub use provider::HttpRateProvider;
pub use sqlite::{SqliteStore, StoreDefaults};
