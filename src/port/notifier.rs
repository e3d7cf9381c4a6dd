//! Notifier port for asynchronous alert delivery.

use async_trait::async_trait;

use crate::domain::UserId;
use crate::error::DeliveryError;

/// Delivers a text message to a user outside any conversation flow.
///
/// Delivery either succeeds or fails; the alert evaluator owns the
/// retry policy (a failed rule is kept and re-evaluated next cycle), so
/// implementations owe no retries of their own.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn deliver(&self, user: UserId, text: &str) -> Result<(), DeliveryError>;
}
