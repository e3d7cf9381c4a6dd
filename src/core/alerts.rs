//! Periodic alert evaluation.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::domain::Language;
use crate::port::{Notifier, PreferenceStore};

use super::cache::RateCache;
use super::text;

/// Polls persisted alert rules against the cached rate table and fires
/// notifications, independent of any user interaction.
///
/// Delivery is at-least-once across failures: a rule is deleted only
/// after its notification was sent, and kept for the next cycle
/// otherwise. There is no backoff and no attempt cap; a known
/// limitation.
pub struct AlertEvaluator {
    cache: Arc<RateCache>,
    store: Arc<dyn PreferenceStore>,
    notifier: Arc<dyn Notifier>,
    poll_interval: Duration,
    initial_delay: Duration,
}

impl AlertEvaluator {
    #[must_use]
    pub fn new(
        cache: Arc<RateCache>,
        store: Arc<dyn PreferenceStore>,
        notifier: Arc<dyn Notifier>,
        poll_interval: Duration,
        initial_delay: Duration,
    ) -> Self {
        Self {
            cache,
            store,
            notifier,
            poll_interval,
            initial_delay,
        }
    }

    /// Run the evaluation loop forever. Spawned as an independent task.
    pub async fn run(&self) {
        info!(
            poll_interval_secs = self.poll_interval.as_secs(),
            "alert evaluator started"
        );
        tokio::time::sleep(self.initial_delay).await;
        let mut ticker = tokio::time::interval(self.poll_interval);
        loop {
            ticker.tick().await;
            self.run_cycle().await;
        }
    }

    /// One evaluation pass over all persisted rules.
    ///
    /// Uses whatever table is cached: no forced refresh, and a currency
    /// missing from the table is a normal skip, not a failure.
    pub async fn run_cycle(&self) {
        let rules = match self.store.list_all_alerts().await {
            Ok(rules) => rules,
            Err(e) => {
                warn!(error = %e, "failed to load alert rules, skipping cycle");
                return;
            }
        };
        if rules.is_empty() {
            return;
        }

        let table = self.cache.table();
        for rule in rules {
            let Some(rate) = table.rate(&rule.currency) else {
                debug!(alert_id = rule.id.0, currency = %rule.currency, "currency not cached, skipping rule");
                continue;
            };
            if !rule.is_satisfied_by(rate) {
                continue;
            }

            let language = match self.store.profile(rule.user_id).await {
                Ok(profile) => profile.language,
                Err(_) => Language::default(),
            };
            let message = text::alert_fired(language, &rule, rate);

            match self.notifier.deliver(rule.user_id, &message).await {
                Ok(()) => {
                    info!(alert_id = rule.id.0, user_id = rule.user_id.0, rate, "alert fired");
                    if let Err(e) = self.store.delete_alert(rule.user_id, rule.id).await {
                        // The rule may fire again next cycle; at-least-once
                        // is the contract here.
                        warn!(alert_id = rule.id.0, error = %e, "failed to delete fired alert");
                    }
                }
                Err(e) => {
                    warn!(
                        alert_id = rule.id.0,
                        user_id = rule.user_id.0,
                        error = %e,
                        "alert delivery failed, will retry next cycle"
                    );
                }
            }
        }
    }
}
