//! Cambio - Telegram currency conversion with rate alerts.
//!
//! This crate implements a conversational currency bot: a time-based
//! rate cache over a remote provider, a per-user dialogue state machine
//! collecting conversion requests across turns, and a periodic alert
//! evaluator notifying users when a rate crosses a threshold.
//!
//! # Architecture
//!
//! The core is transport-agnostic and talks to the outside world only
//! through ports:
//!
//! - **`core::cache`** - `RateCache`: staleness tracking + conversion math
//! - **`core::engine`** - `ConversationEngine`: the dialogue state machine
//! - **`core::alerts`** - `AlertEvaluator`: the threshold polling loop
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from TOML with env overrides
//! - [`domain`] - Plain types: currencies, rate tables, profiles, alerts
//! - [`error`] - Error types for the crate
//! - [`port`] - Trait boundaries: provider, store, notifier, messages
//! - [`core`] - Cache, conversation engine, expression evaluator, alerts
//! - [`adapter`] - HTTP provider, SQLite store, Telegram transport
//!
//! # Features
//!
//! - `telegram` - Enable the Telegram transport adapter (default)
//! - `testkit` - In-memory port implementations for tests
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use cambio::adapter::HttpRateProvider;
//! use cambio::config::Config;
//! use cambio::core::RateCache;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load("config.toml")?;
//! let provider = HttpRateProvider::new(&config.provider.api_url, config.request_timeout())?;
//! let cache = Arc::new(RateCache::new(
//!     Arc::new(provider),
//!     config.base_currency(),
//!     config.staleness(),
//! ));
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod port;

#[cfg(feature = "testkit")]
pub mod testkit;
