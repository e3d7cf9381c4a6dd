//! Localized user-facing strings.
//!
//! Two locales, Russian first (matching the original audience). Every
//! reply the engine produces goes through this module so the transport
//! layer never formats text itself.

use crate::domain::{AlertRule, CurrencyCode, HistoryEntry, Language};

/// Persistent main-menu actions, matched back from button-press text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuAction {
    Convert,
    Rates,
    Help,
}

const MENU_CONVERT_RU: &str = "💱 Конвертировать валюту";
const MENU_CONVERT_EN: &str = "💱 Convert currency";
const MENU_RATES_RU: &str = "📊 Курсы валют";
const MENU_RATES_EN: &str = "📊 Exchange rates";
const MENU_HELP_RU: &str = "ℹ️ Помощь";
const MENU_HELP_EN: &str = "ℹ️ Help";
const CANCEL_RU: &str = "Назад";
const CANCEL_EN: &str = "Back";

/// Main-menu keyboard rows for a locale.
#[must_use]
pub fn menu_rows(lang: Language) -> Vec<Vec<String>> {
    let (convert, rates, help) = match lang {
        Language::Ru => (MENU_CONVERT_RU, MENU_RATES_RU, MENU_HELP_RU),
        Language::En => (MENU_CONVERT_EN, MENU_RATES_EN, MENU_HELP_EN),
    };
    vec![
        vec![convert.to_string()],
        vec![rates.to_string()],
        vec![help.to_string()],
    ]
}

/// Match button-press text against menu labels of either locale, so a
/// stale keyboard keeps working after a language toggle.
#[must_use]
pub fn match_menu(text: &str) -> Option<MenuAction> {
    match text {
        MENU_CONVERT_RU | MENU_CONVERT_EN => Some(MenuAction::Convert),
        MENU_RATES_RU | MENU_RATES_EN => Some(MenuAction::Rates),
        MENU_HELP_RU | MENU_HELP_EN => Some(MenuAction::Help),
        _ => None,
    }
}

#[must_use]
pub fn cancel_label(lang: Language) -> &'static str {
    match lang {
        Language::Ru => CANCEL_RU,
        Language::En => CANCEL_EN,
    }
}

/// Cancel tokens of either locale are honored in every state.
#[must_use]
pub fn is_cancel(text: &str) -> bool {
    text == CANCEL_RU || text == CANCEL_EN
}

#[must_use]
pub fn greeting(lang: Language) -> String {
    match lang {
        Language::Ru => "👋 Привет! Я — CurrencyBot.\n\
             Могу мгновенно конвертировать валюты, показать курсы \
             и предупредить, когда курс пересечёт порог.\n\
             Выбери действие:"
            .into(),
        Language::En => "👋 Hi! I'm CurrencyBot.\n\
             I convert currencies instantly, show live rates \
             and ping you when a rate crosses a threshold.\n\
             Pick an action:"
            .into(),
    }
}

#[must_use]
pub fn help(lang: Language) -> String {
    match lang {
        Language::Ru => "📘 CurrencyBot — помощь\n\n\
             • /convert — пошаговая конвертация\n\
             • /favorite — конвертация по избранным валютам\n\
             • /calc — выражение: 100 + 50 USD to EUR\n\
             • /rates — курсы валют\n\
             • /alert EUR > 0.8 — уведомление о курсе\n\
             • /alerts, /unalert <id> — мои уведомления\n\
             • /history — последние конвертации\n\
             • /favorites — избранные валюты\n\
             • /lang — переключить язык\n\n\
             Можно сразу написать: 100 USD\n\
             В любом чате: @бот 50 EUR to RUB"
            .into(),
        Language::En => "📘 CurrencyBot — help\n\n\
             • /convert — step-by-step conversion\n\
             • /favorite — convert using your favorites\n\
             • /calc — expression: 100 + 50 USD to EUR\n\
             • /rates — exchange rates\n\
             • /alert EUR > 0.8 — rate alert\n\
             • /alerts, /unalert <id> — my alerts\n\
             • /history — recent conversions\n\
             • /favorites — favorite currencies\n\
             • /lang — switch language\n\n\
             Or just type: 100 USD\n\
             In any chat: @bot 50 EUR to RUB"
            .into(),
    }
}

#[must_use]
pub fn rates_header(lang: Language, base: &CurrencyCode) -> String {
    match lang {
        Language::Ru => format!("Курс {base} на сегодня:"),
        Language::En => format!("{base} rates today:"),
    }
}

#[must_use]
pub fn rate_line(base: &CurrencyCode, code: &CurrencyCode, rate: f64) -> String {
    format!("💵 1 {base} = {rate:.4} {code}")
}

#[must_use]
pub fn rates_unavailable(lang: Language) -> String {
    match lang {
        Language::Ru => "😔 Курсы сейчас недоступны, попробуйте позже.".into(),
        Language::En => "😔 Rates are unavailable right now, try again later.".into(),
    }
}

#[must_use]
pub fn ask_amount(lang: Language) -> String {
    match lang {
        Language::Ru => "Введите сумму и валюту:\nНапример: 100 USD".into(),
        Language::En => "Enter an amount and currency:\nFor example: 100 USD".into(),
    }
}

#[must_use]
pub fn bad_amount_format(lang: Language) -> String {
    match lang {
        Language::Ru => "❌ Неверный формат. Пример: 100 USD".into(),
        Language::En => "❌ Wrong format. Example: 100 USD".into(),
    }
}

#[must_use]
pub fn unknown_currency(lang: Language, code: &CurrencyCode) -> String {
    match lang {
        Language::Ru => format!("❌ Неизвестная валюта {code}. Попробуй ещё."),
        Language::En => format!("❌ Unknown currency {code}. Try another one."),
    }
}

/// For raw input that is not even shaped like a currency code.
#[must_use]
pub fn unknown_currency_input(lang: Language, input: &str) -> String {
    match lang {
        Language::Ru => format!("❌ Не похоже на код валюты: {input}. Пример: EUR"),
        Language::En => format!("❌ Not a currency code: {input}. Example: EUR"),
    }
}

#[must_use]
pub fn choose_target(lang: Language, amount: f64, from: &CurrencyCode) -> String {
    match lang {
        Language::Ru => {
            format!("Сумма: {amount} {from}\nТеперь укажи, в какую валюту конвертировать:")
        }
        Language::En => format!("Amount: {amount} {from}\nNow pick the target currency:"),
    }
}

#[must_use]
pub fn conversion_result(
    amount: f64,
    from: &CurrencyCode,
    result: f64,
    to: &CurrencyCode,
) -> String {
    format!("✅ {amount:.2} {from} = {result:.2} {to}")
}

#[must_use]
pub fn swap_label(lang: Language) -> String {
    match lang {
        Language::Ru => "🔄 Поменять местами".into(),
        Language::En => "🔄 Swap".into(),
    }
}

#[must_use]
pub fn convert_again_label(lang: Language) -> String {
    match lang {
        Language::Ru => "🔁 Конвертировать снова".into(),
        Language::En => "🔁 Convert again".into(),
    }
}

#[must_use]
pub fn ask_favorite_source(lang: Language) -> String {
    match lang {
        Language::Ru => "Выбери исходную валюту:".into(),
        Language::En => "Pick the source currency:".into(),
    }
}

#[must_use]
pub fn ask_favorite_target(lang: Language, from: &CurrencyCode) -> String {
    match lang {
        Language::Ru => format!("Исходная валюта: {from}\nТеперь выбери целевую валюту:"),
        Language::En => format!("Source: {from}\nNow pick the target currency:"),
    }
}

#[must_use]
pub fn ask_favorite_amount(lang: Language, from: &CurrencyCode, to: &CurrencyCode) -> String {
    match lang {
        Language::Ru => format!("{from} → {to}\nВведите сумму:"),
        Language::En => format!("{from} → {to}\nEnter the amount:"),
    }
}

#[must_use]
pub fn bad_plain_amount(lang: Language) -> String {
    match lang {
        Language::Ru => "❌ Нужно число. Пример: 100 или 99.5".into(),
        Language::En => "❌ Expected a number. Example: 100 or 99.5".into(),
    }
}

#[must_use]
pub fn ask_calc(lang: Language) -> String {
    match lang {
        Language::Ru => "Введите выражение:\nНапример: 100 + 50 USD to EUR".into(),
        Language::En => "Enter an expression:\nFor example: 100 + 50 USD to EUR".into(),
    }
}

#[must_use]
pub fn bad_calc_format(lang: Language) -> String {
    match lang {
        Language::Ru => "❌ Не понял. Формат: <выражение> <из> to <в>\n\
             Пример: (100 + 50) * 2 USD to EUR"
            .into(),
        Language::En => "❌ Could not parse. Format: <expression> <from> to <to>\n\
             Example: (100 + 50) * 2 USD to EUR"
            .into(),
    }
}

#[must_use]
pub fn bad_expression(lang: Language, detail: &str) -> String {
    match lang {
        Language::Ru => format!("❌ Ошибка в выражении: {detail}"),
        Language::En => format!("❌ Expression error: {detail}"),
    }
}

#[must_use]
pub fn ask_alert(lang: Language) -> String {
    match lang {
        Language::Ru => "Задайте условие:\nНапример: EUR > 0.8 или RUB < 90".into(),
        Language::En => "Set a condition:\nFor example: EUR > 0.8 or RUB < 90".into(),
    }
}

#[must_use]
pub fn bad_alert_format(lang: Language) -> String {
    match lang {
        Language::Ru => "❌ Формат: <валюта> <знак> <порог>. Пример: EUR > 0.8".into(),
        Language::En => "❌ Format: <currency> <sign> <threshold>. Example: EUR > 0.8".into(),
    }
}

#[must_use]
pub fn alert_created(lang: Language, rule: &AlertRule) -> String {
    match lang {
        Language::Ru => format!(
            "🔔 Уведомление #{} создано: {} {} {}",
            rule.id,
            rule.currency,
            rule.comparator.symbol(),
            rule.threshold
        ),
        Language::En => format!(
            "🔔 Alert #{} created: {} {} {}",
            rule.id,
            rule.currency,
            rule.comparator.symbol(),
            rule.threshold
        ),
    }
}

#[must_use]
pub fn alerts_empty(lang: Language) -> String {
    match lang {
        Language::Ru => "У вас нет активных уведомлений.".into(),
        Language::En => "You have no active alerts.".into(),
    }
}

#[must_use]
pub fn alerts_header(lang: Language) -> String {
    match lang {
        Language::Ru => "🔔 Активные уведомления:".into(),
        Language::En => "🔔 Active alerts:".into(),
    }
}

#[must_use]
pub fn alert_line(rule: &AlertRule) -> String {
    format!(
        "#{} {} {} {}",
        rule.id,
        rule.currency,
        rule.comparator.symbol(),
        rule.threshold
    )
}

#[must_use]
pub fn alert_deleted(lang: Language) -> String {
    match lang {
        Language::Ru => "🗑 Уведомление удалено.".into(),
        Language::En => "🗑 Alert deleted.".into(),
    }
}

#[must_use]
pub fn alert_not_found(lang: Language) -> String {
    match lang {
        Language::Ru => "❌ Уведомление не найдено.".into(),
        Language::En => "❌ Alert not found.".into(),
    }
}

#[must_use]
pub fn alert_fired(lang: Language, rule: &AlertRule, rate: f64) -> String {
    match lang {
        Language::Ru => format!(
            "🔔 Курс {} сейчас {rate:.4}: условие {} {} выполнено!",
            rule.currency,
            rule.comparator.symbol(),
            rule.threshold
        ),
        Language::En => format!(
            "🔔 {} is now {rate:.4}: condition {} {} met!",
            rule.currency,
            rule.comparator.symbol(),
            rule.threshold
        ),
    }
}

#[must_use]
pub fn history_empty(lang: Language) -> String {
    match lang {
        Language::Ru => "История пока пуста.".into(),
        Language::En => "No history yet.".into(),
    }
}

#[must_use]
pub fn history_header(lang: Language) -> String {
    match lang {
        Language::Ru => "🕘 Последние конвертации:".into(),
        Language::En => "🕘 Recent conversions:".into(),
    }
}

#[must_use]
pub fn history_line(entry: &HistoryEntry) -> String {
    format!(
        "{} · {:.2} {} → {:.2} {}",
        entry.at.format("%Y-%m-%d %H:%M"),
        entry.amount,
        entry.from,
        entry.result,
        entry.to
    )
}

#[must_use]
pub fn favorites_list(lang: Language, favorites: &[CurrencyCode]) -> String {
    let list = favorites
        .iter()
        .map(CurrencyCode::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    match lang {
        Language::Ru => format!("⭐ Избранные валюты: {list}"),
        Language::En => format!("⭐ Favorite currencies: {list}"),
    }
}

#[must_use]
pub fn language_set(lang: Language) -> String {
    match lang {
        Language::Ru => "🌐 Язык переключён на русский.".into(),
        Language::En => "🌐 Language switched to English.".into(),
    }
}

#[must_use]
pub fn unknown_text_hint(lang: Language) -> String {
    match lang {
        Language::Ru => "🤔 Не понял. Напишите 100 USD или /help.".into(),
        Language::En => "🤔 Not sure what you mean. Try 100 USD or /help.".into(),
    }
}

#[must_use]
pub fn bad_command(lang: Language, detail: &str) -> String {
    match lang {
        Language::Ru => format!("❌ Неверная команда: {detail}\nСм. /help"),
        Language::En => format!("❌ Invalid command: {detail}\nSee /help"),
    }
}

#[must_use]
pub fn storage_unavailable(lang: Language) -> String {
    match lang {
        Language::Ru => "😔 Хранилище временно недоступно, попробуйте позже.".into(),
        Language::En => "😔 Storage is temporarily unavailable, try again later.".into(),
    }
}

/// Inline-mode fallback card shown when the query matches nothing.
#[must_use]
pub fn inline_examples() -> (String, String, String) {
    (
        "Examples".into(),
        "100 USD · 50 EUR to RUB".into(),
        "Examples:\n• 100 USD\n• 50 EUR to RUB".into(),
    )
}
