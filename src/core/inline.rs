//! Inline-query answering.
//!
//! Pure over a table snapshot; the engine refreshes the cache first.
//! Three lexical forms, tried in priority order:
//!
//! 1. `100 USD to RUB` (or `в`) — one exact conversion card
//! 2. `100 USD` — fan-out over the showcase currencies minus the source
//! 3. `USD` — a single-rate card against the base
//!
//! Unknown currencies yield no card (never a substituted rate); when
//! nothing matches, a usage-examples card is returned instead.

use crate::domain::{CurrencyCode, RateTable};
use crate::port::InlineSuggestion;

use super::engine::parse_amount_currency;
use super::text;

/// Build suggestion cards for a non-empty inline query.
#[must_use]
pub fn answer(
    query: &str,
    table: &RateTable,
    base: &CurrencyCode,
    showcase: &[CurrencyCode],
) -> Vec<InlineSuggestion> {
    let mut results = Vec::new();

    if let Some((amount, from, to)) = parse_full_form(query) {
        if let Some(result) = convert_with(table, amount, &from, &to) {
            results.push(InlineSuggestion {
                id: "convert".into(),
                title: format!("{amount} {from} → {to}"),
                description: format!("{result:.2} {to}"),
                message: format!("{amount} {from} = {result:.2} {to}"),
            });
        }
    } else if let Some((amount, from)) = parse_amount_currency(query) {
        for to in showcase {
            if *to == from {
                continue;
            }
            if let Some(result) = convert_with(table, amount, &from, to) {
                results.push(InlineSuggestion {
                    id: format!("{from}_{to}_{amount}"),
                    title: format!("{amount} {from}"),
                    description: format!("→ {result:.2} {to}"),
                    message: format!("{amount} {from} = {result:.2} {to}"),
                });
            }
        }
    } else if let Some(code) = CurrencyCode::parse(query) {
        if let Some(rate) = table.rate(&code).filter(|r| *r > 0.0) {
            let inverse = 1.0 / rate;
            results.push(InlineSuggestion {
                id: code.to_string(),
                title: format!("{code} rate"),
                description: format!("1 {code} = {inverse:.4} {base}"),
                message: format!("1 {code} = {inverse:.4} {base}"),
            });
        }
    }

    if results.is_empty() {
        let (title, description, message) = text::inline_examples();
        results.push(InlineSuggestion {
            id: "help".into(),
            title,
            description,
            message,
        });
    }

    results
}

/// `<amount> <from> to|в <to>` with the amount possibly glued to the
/// source code.
fn parse_full_form(query: &str) -> Option<(f64, CurrencyCode, CurrencyCode)> {
    let tokens: Vec<&str> = query.split_whitespace().collect();
    let separator = tokens
        .iter()
        .position(|t| t.eq_ignore_ascii_case("to") || t.eq_ignore_ascii_case("в"))?;
    if separator + 2 != tokens.len() {
        return None;
    }
    let (amount, from) = parse_amount_currency(&tokens[..separator].join(" "))?;
    let to = CurrencyCode::parse(tokens[separator + 1])?;
    Some((amount, from, to))
}

/// Base-normalized conversion over a bare table; `None` on unknown codes.
fn convert_with(table: &RateTable, amount: f64, from: &CurrencyCode, to: &CurrencyCode) -> Option<f64> {
    if from == to {
        return Some(amount);
    }
    let rate_from = table.rate(from)?;
    let rate_to = table.rate(to)?;
    Some(amount / rate_from * rate_to)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    fn table() -> RateTable {
        [(code("USD"), 1.0), (code("EUR"), 0.9), (code("RUB"), 90.0)]
            .into_iter()
            .collect()
    }

    fn showcase() -> Vec<CurrencyCode> {
        vec![code("EUR"), code("RUB"), code("GBP")]
    }

    #[test]
    fn full_form_yields_single_card() {
        let results = answer("100 USD to EUR", &table(), &code("USD"), &showcase());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "convert");
        assert_eq!(results[0].message, "100 USD = 90.00 EUR");
    }

    #[test]
    fn full_form_accepts_russian_separator() {
        let results = answer("10 EUR в RUB", &table(), &code("USD"), &showcase());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].message, "10 EUR = 1000.00 RUB");
    }

    #[test]
    fn amount_form_fans_out_over_known_showcase() {
        let results = answer("100 USD", &table(), &code("USD"), &showcase());
        // GBP is not in the table and the source is excluded.
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.id.starts_with("USD_")));
    }

    #[test]
    fn source_currency_excluded_from_fan_out() {
        let results = answer("5 EUR", &table(), &code("USD"), &showcase());
        assert!(results.iter().all(|r| !r.id.starts_with("EUR_EUR")));
    }

    #[test]
    fn bare_code_yields_rate_card() {
        let results = answer("EUR", &table(), &code("USD"), &showcase());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].id, "EUR");
        assert!(results[0].description.contains("1.1111"));
    }

    #[test]
    fn unknown_currency_falls_back_to_help() {
        for query in ["100 XXX to EUR", "100 XXX", "XXX", "what is this"] {
            let results = answer(query, &table(), &code("USD"), &showcase());
            assert_eq!(results.len(), 1, "query `{query}`");
            assert_eq!(results[0].id, "help");
        }
    }
}
