//! Telegram transport adapter.
//!
//! Requires the `telegram` feature to be enabled.

mod bot;
mod notifier;

pub use bot::run_dispatcher;
pub use notifier::TelegramNotifier;
