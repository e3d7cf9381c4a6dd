//! Ports: trait boundaries between the core and its collaborators.
//!
//! The core only ever talks to the rate provider, the preference store,
//! and the notification transport through these traits, so every adapter
//! (HTTP, SQLite, Telegram, test doubles) is swappable.

mod message;
mod notifier;
mod provider;
mod store;

pub use message::{CallbackData, InlineButton, InlineSuggestion, Keyboard, Reply};
pub use notifier::Notifier;
pub use provider::RateProvider;
pub use store::PreferenceStore;
