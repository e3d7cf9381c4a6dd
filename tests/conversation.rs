//! End-to-end conversation flows against in-memory ports.

use std::sync::Arc;
use std::time::Duration;

use cambio::core::{ConversationEngine, EngineConfig, RateCache};
use cambio::domain::{CurrencyCode, UserId};
use cambio::port::{CallbackData, Keyboard, PreferenceStore, Reply};
use cambio::testkit::{MemoryStore, StaticRateProvider};

const USER: UserId = UserId(42);

fn code(s: &str) -> CurrencyCode {
    CurrencyCode::parse(s).unwrap()
}

struct Fixture {
    engine: ConversationEngine,
    store: Arc<MemoryStore>,
}

/// Engine over a fixed table (base USD) and an in-memory store.
async fn fixture() -> Fixture {
    let provider = Arc::new(StaticRateProvider::with_rates(&[
        ("USD", 1.0),
        ("EUR", 0.9),
        ("RUB", 90.0),
        ("GBP", 0.8),
    ]));
    let store = Arc::new(MemoryStore::new());
    let cache = Arc::new(RateCache::new(
        provider,
        code("USD"),
        Duration::from_secs(3600),
    ));
    cache.refresh().await.unwrap();
    let engine = ConversationEngine::new(
        cache,
        store.clone(),
        EngineConfig {
            target_keyboard_limit: 3,
            showcase: vec![code("EUR"), code("RUB"), code("GBP")],
        },
    );
    Fixture { engine, store }
}

fn has_reply_keyboard(reply: &Reply) -> bool {
    matches!(reply.keyboard, Some(Keyboard::Reply(_)))
}

#[tokio::test]
async fn step_by_step_conversion_records_history_and_resets() {
    let fx = fixture().await;

    let reply = fx.engine.handle_text(USER, "/convert").await;
    assert!(reply.text.contains("100 USD"), "{}", reply.text);

    let reply = fx.engine.handle_text(USER, "100 USD").await;
    assert!(has_reply_keyboard(&reply), "expected target keyboard");

    let reply = fx.engine.handle_text(USER, "EUR").await;
    assert!(reply.text.contains("✅ 100.00 USD = 90.00 EUR"), "{}", reply.text);
    assert!(matches!(reply.keyboard, Some(Keyboard::Inline(_))));

    let history = fx.store.history(USER).await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].from, code("USD"));
    assert_eq!(history[0].result, 90.0);

    // Session is back to idle: arbitrary text gets the hint, not a
    // format complaint.
    let reply = fx.engine.handle_text(USER, "hello there").await;
    assert!(reply.text.contains("🤔"), "{}", reply.text);
}

#[tokio::test]
async fn malformed_amount_keeps_the_prompt_alive() {
    let fx = fixture().await;
    fx.engine.handle_text(USER, "/convert").await;

    let reply = fx.engine.handle_text(USER, "a lot of money").await;
    assert!(reply.text.starts_with("❌"), "{}", reply.text);

    // Still awaiting the amount.
    let reply = fx.engine.handle_text(USER, "50 RUB").await;
    assert!(has_reply_keyboard(&reply), "expected target keyboard");
}

#[tokio::test]
async fn idle_amount_shortcut_skips_the_amount_prompt() {
    let fx = fixture().await;

    let reply = fx.engine.handle_text(USER, "100 USD").await;
    assert!(has_reply_keyboard(&reply), "expected target keyboard");

    let reply = fx.engine.handle_text(USER, "RUB").await;
    assert!(reply.text.contains("= 9000.00 RUB"), "{}", reply.text);
}

#[tokio::test]
async fn unknown_source_currency_is_rejected_without_a_session() {
    let fx = fixture().await;

    let reply = fx.engine.handle_text(USER, "100 XXX").await;
    assert!(reply.text.contains("XXX"), "{}", reply.text);

    // No target collection was started.
    let reply = fx.engine.handle_text(USER, "EUR").await;
    assert!(reply.text.contains("🤔"), "{}", reply.text);
}

#[tokio::test]
async fn cancel_button_returns_to_the_main_menu() {
    let fx = fixture().await;
    fx.engine.handle_text(USER, "/convert").await;

    let reply = fx.engine.handle_text(USER, "Назад").await;
    assert!(reply.text.starts_with("👋"), "{}", reply.text);
    assert!(has_reply_keyboard(&reply));
}

#[tokio::test]
async fn swap_callback_reverses_without_touching_history() {
    let fx = fixture().await;
    fx.engine.handle_text(USER, "100 USD").await;
    fx.engine.handle_text(USER, "EUR").await;
    assert_eq!(fx.store.history(USER).await.unwrap().len(), 1);

    let reply = fx
        .engine
        .handle_callback(
            USER,
            CallbackData::Swap {
                amount: 100.0,
                from: code("USD"),
                to: code("EUR"),
            },
        )
        .await;
    assert!(reply.text.contains("✅ 100.00 EUR = 111.11 USD"), "{}", reply.text);
    assert_eq!(fx.store.history(USER).await.unwrap().len(), 1);
}

#[tokio::test]
async fn convert_again_callback_restarts_the_flow() {
    let fx = fixture().await;
    fx.engine.handle_text(USER, "100 USD").await;
    fx.engine.handle_text(USER, "EUR").await;

    let reply = fx
        .engine
        .handle_callback(USER, CallbackData::ConvertAgain)
        .await;
    assert!(reply.text.contains("100 USD"), "{}", reply.text);

    let reply = fx.engine.handle_text(USER, "50 EUR").await;
    assert!(has_reply_keyboard(&reply), "expected target keyboard");
}

#[tokio::test]
async fn favorite_flow_collects_source_target_amount() {
    let fx = fixture().await;

    let reply = fx.engine.handle_text(USER, "/favorite").await;
    assert!(has_reply_keyboard(&reply), "expected favorites keyboard");

    fx.engine.handle_text(USER, "USD").await;
    fx.engine.handle_text(USER, "EUR").await;
    let reply = fx.engine.handle_text(USER, "200").await;
    assert!(reply.text.contains("✅ 200.00 USD = 180.00 EUR"), "{}", reply.text);
}

#[tokio::test]
async fn calc_flow_evaluates_the_expression_first() {
    let fx = fixture().await;
    fx.engine.handle_text(USER, "/calc").await;

    let reply = fx.engine.handle_text(USER, "(100 + 50) USD to EUR").await;
    assert!(reply.text.contains("✅ 150.00 USD = 135.00 EUR"), "{}", reply.text);
}

#[tokio::test]
async fn calc_rejects_anything_but_arithmetic() {
    let fx = fixture().await;
    fx.engine.handle_text(USER, "/calc").await;

    let reply = fx
        .engine
        .handle_text(USER, "__import__('os') USD to EUR")
        .await;
    assert!(reply.text.starts_with("❌"), "{}", reply.text);

    let reply = fx.engine.handle_text(USER, "1 / 0 USD to EUR").await;
    assert!(reply.text.starts_with("❌"), "{}", reply.text);
}

#[tokio::test]
async fn alert_commands_round_trip() {
    let fx = fixture().await;

    let reply = fx.engine.handle_text(USER, "/alert EUR > 0.8").await;
    assert!(reply.text.contains("#1"), "{}", reply.text);

    let reply = fx.engine.handle_text(USER, "/alerts").await;
    assert!(reply.text.contains("#1 EUR > 0.8"), "{}", reply.text);

    let reply = fx.engine.handle_text(USER, "/unalert 1").await;
    assert!(reply.text.contains("🗑"), "{}", reply.text);

    let reply = fx.engine.handle_text(USER, "/unalert 1").await;
    assert!(reply.text.starts_with("❌"), "{}", reply.text);
}

#[tokio::test]
async fn alert_prompt_collects_the_condition() {
    let fx = fixture().await;

    fx.engine.handle_text(USER, "/alert").await;
    let reply = fx.engine.handle_text(USER, "RUB < 100").await;
    assert!(reply.text.contains("RUB < 100"), "{}", reply.text);
    assert_eq!(fx.store.list_alerts(USER).await.unwrap().len(), 1);
}

#[tokio::test]
async fn history_lists_newest_first() {
    let fx = fixture().await;
    fx.engine.handle_text(USER, "100 USD").await;
    fx.engine.handle_text(USER, "EUR").await;
    fx.engine.handle_text(USER, "10 EUR").await;
    fx.engine.handle_text(USER, "RUB").await;

    let reply = fx.engine.handle_text(USER, "/history").await;
    let lines: Vec<&str> = reply.text.lines().collect();
    assert_eq!(lines.len(), 3, "{}", reply.text);
    assert!(lines[1].contains("10.00 EUR"), "{}", lines[1]);
    assert!(lines[2].contains("100.00 USD"), "{}", lines[2]);
}

#[tokio::test]
async fn setfav_validates_against_the_rate_table() {
    let fx = fixture().await;

    let reply = fx.engine.handle_text(USER, "/setfav USD GBP").await;
    assert!(reply.text.contains("USD, GBP"), "{}", reply.text);

    let reply = fx.engine.handle_text(USER, "/setfav USD XXX").await;
    assert!(reply.text.contains("XXX"), "{}", reply.text);
    // The failed update left the previous list in place.
    let profile = fx.store.profile(USER).await.unwrap();
    assert_eq!(profile.favorites, vec![code("USD"), code("GBP")]);
}

#[tokio::test]
async fn lang_toggles_and_localizes_replies() {
    let fx = fixture().await;

    let reply = fx.engine.handle_text(USER, "/lang").await;
    assert!(reply.text.contains("English"), "{}", reply.text);

    let reply = fx.engine.handle_text(USER, "gibberish").await;
    assert!(reply.text.contains("Try 100 USD"), "{}", reply.text);

    let reply = fx.engine.handle_text(USER, "/lang").await;
    assert!(reply.text.contains("русский"), "{}", reply.text);
}

#[tokio::test]
async fn conversions_survive_storage_degradation() {
    let fx = fixture().await;
    fx.store.set_failing(true);

    let reply = fx.engine.handle_text(USER, "100 USD").await;
    assert!(has_reply_keyboard(&reply), "expected target keyboard");

    // History append fails inside, the conversion still completes.
    let reply = fx.engine.handle_text(USER, "EUR").await;
    assert!(reply.text.contains("✅ 100.00 USD = 90.00 EUR"), "{}", reply.text);

    // Explicit store commands do report the outage.
    let reply = fx.engine.handle_text(USER, "/history").await;
    assert!(reply.text.contains("😔"), "{}", reply.text);
}

#[tokio::test]
async fn sessions_are_isolated_per_user() {
    let fx = fixture().await;
    let other = UserId(7);

    fx.engine.handle_text(USER, "/convert").await;
    // The other user is still idle.
    let reply = fx.engine.handle_text(other, "gibberish").await;
    assert!(reply.text.contains("🤔"), "{}", reply.text);

    // And the first user's collection was not disturbed.
    let reply = fx.engine.handle_text(USER, "100 USD").await;
    assert!(has_reply_keyboard(&reply), "expected target keyboard");
}

#[tokio::test]
async fn inline_queries_answer_without_any_session() {
    let fx = fixture().await;

    assert!(fx.engine.handle_inline("   ").await.is_empty());

    let suggestions = fx.engine.handle_inline("50 EUR to RUB").await;
    assert_eq!(suggestions.len(), 1);
    assert!(suggestions[0].message.contains("5000.00 RUB"), "{}", suggestions[0].message);
}
