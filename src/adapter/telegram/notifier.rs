//! Telegram alert delivery.

use async_trait::async_trait;
use teloxide::prelude::*;

use crate::domain::UserId;
use crate::error::DeliveryError;
use crate::port::Notifier;

/// Notifier that sends alert messages directly to a user's chat.
///
/// No internal retries: the alert evaluator keeps the rule and retries
/// on its next cycle, so delivery outcome must be reported truthfully.
pub struct TelegramNotifier {
    bot: Bot,
}

impl TelegramNotifier {
    #[must_use]
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn deliver(&self, user: UserId, text: &str) -> Result<(), DeliveryError> {
        self.bot
            .send_message(ChatId(user.0), text)
            .await
            .map(|_| ())
            .map_err(|e| DeliveryError(e.to_string()))
    }
}
