//! Alert evaluation cycles against in-memory ports.

use std::sync::Arc;
use std::time::Duration;

use cambio::core::{AlertEvaluator, RateCache};
use cambio::domain::{Comparator, CurrencyCode, Language, UserId};
use cambio::port::PreferenceStore;
use cambio::testkit::{MemoryStore, RecordingNotifier, StaticRateProvider};

const USER: UserId = UserId(42);

fn code(s: &str) -> CurrencyCode {
    CurrencyCode::parse(s).unwrap()
}

struct Fixture {
    evaluator: AlertEvaluator,
    provider: Arc<StaticRateProvider>,
    store: Arc<MemoryStore>,
    notifier: Arc<RecordingNotifier>,
    cache: Arc<RateCache>,
}

async fn fixture() -> Fixture {
    let provider = Arc::new(StaticRateProvider::with_rates(&[
        ("USD", 1.0),
        ("EUR", 0.9),
        ("RUB", 90.0),
    ]));
    let store = Arc::new(MemoryStore::new());
    let notifier = Arc::new(RecordingNotifier::new());
    let cache = Arc::new(RateCache::new(
        provider.clone(),
        code("USD"),
        Duration::from_secs(3600),
    ));
    cache.refresh().await.unwrap();
    let evaluator = AlertEvaluator::new(
        cache.clone(),
        store.clone(),
        notifier.clone(),
        Duration::from_secs(60),
        Duration::from_secs(10),
    );
    Fixture {
        evaluator,
        provider,
        store,
        notifier,
        cache,
    }
}

#[tokio::test]
async fn satisfied_rule_fires_once_and_is_removed() {
    let fx = fixture().await;
    fx.store
        .insert_alert(USER, code("EUR"), Comparator::Above, 0.8)
        .await
        .unwrap();

    fx.evaluator.run_cycle().await;

    let delivered = fx.notifier.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, USER);
    assert!(delivered[0].1.contains("EUR"), "{}", delivered[0].1);
    assert!(fx.store.list_all_alerts().await.unwrap().is_empty());

    // The observation was consumed; nothing fires again.
    fx.evaluator.run_cycle().await;
    assert_eq!(fx.notifier.len(), 1);
}

#[tokio::test]
async fn below_comparator_fires_when_rate_drops_under_threshold() {
    let fx = fixture().await;
    fx.store
        .insert_alert(USER, code("RUB"), Comparator::Below, 100.0)
        .await
        .unwrap();

    fx.evaluator.run_cycle().await;
    assert_eq!(fx.notifier.len(), 1);
}

#[tokio::test]
async fn unsatisfied_rule_is_kept_silent() {
    let fx = fixture().await;
    fx.store
        .insert_alert(USER, code("EUR"), Comparator::Above, 2.0)
        .await
        .unwrap();

    fx.evaluator.run_cycle().await;

    assert!(fx.notifier.is_empty());
    assert_eq!(fx.store.list_all_alerts().await.unwrap().len(), 1);
}

#[tokio::test]
async fn rule_on_uncached_currency_is_skipped_not_dropped() {
    let fx = fixture().await;
    fx.store
        .insert_alert(USER, code("JPY"), Comparator::Above, 100.0)
        .await
        .unwrap();

    fx.evaluator.run_cycle().await;
    assert!(fx.notifier.is_empty());
    assert_eq!(fx.store.list_all_alerts().await.unwrap().len(), 1);

    // Once the provider starts quoting JPY, the rule fires normally.
    fx.provider.set_table(
        [(code("USD"), 1.0), (code("JPY"), 150.0)]
            .into_iter()
            .collect(),
    );
    fx.cache.refresh().await.unwrap();
    fx.evaluator.run_cycle().await;

    assert_eq!(fx.notifier.len(), 1);
    assert!(fx.store.list_all_alerts().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_delivery_retries_on_the_next_cycle() {
    let fx = fixture().await;
    fx.store
        .insert_alert(USER, code("EUR"), Comparator::Above, 0.8)
        .await
        .unwrap();

    fx.notifier.set_failing(true);
    fx.evaluator.run_cycle().await;
    assert!(fx.notifier.is_empty());
    assert_eq!(fx.store.list_all_alerts().await.unwrap().len(), 1);

    fx.notifier.set_failing(false);
    fx.evaluator.run_cycle().await;
    assert_eq!(fx.notifier.len(), 1);
    assert!(fx.store.list_all_alerts().await.unwrap().is_empty());
}

#[tokio::test]
async fn store_outage_skips_the_cycle_quietly() {
    let fx = fixture().await;
    fx.store
        .insert_alert(USER, code("EUR"), Comparator::Above, 0.8)
        .await
        .unwrap();

    fx.store.set_failing(true);
    fx.evaluator.run_cycle().await;
    assert!(fx.notifier.is_empty());

    fx.store.set_failing(false);
    fx.evaluator.run_cycle().await;
    assert_eq!(fx.notifier.len(), 1);
}

#[tokio::test]
async fn notification_uses_the_rule_owners_language() {
    let fx = fixture().await;
    fx.store.set_language(USER, Language::En).await.unwrap();
    fx.store
        .insert_alert(USER, code("EUR"), Comparator::Above, 0.8)
        .await
        .unwrap();

    fx.evaluator.run_cycle().await;

    let delivered = fx.notifier.delivered();
    assert_eq!(delivered.len(), 1);
    assert!(delivered[0].1.contains("is now"), "{}", delivered[0].1);
}

#[tokio::test]
async fn independent_rules_for_multiple_users() {
    let fx = fixture().await;
    let other = UserId(7);
    fx.store
        .insert_alert(USER, code("EUR"), Comparator::Above, 0.8)
        .await
        .unwrap();
    fx.store
        .insert_alert(other, code("EUR"), Comparator::Above, 2.0)
        .await
        .unwrap();

    fx.evaluator.run_cycle().await;

    let delivered = fx.notifier.delivered();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].0, USER);
    assert_eq!(fx.store.list_alerts(other).await.unwrap().len(), 1);
}
