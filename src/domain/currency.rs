//! Currency code newtype.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Three-letter uppercase currency code (ISO-4217 shaped, not validated
/// against a real list — the rate table is the source of truth for what
/// currencies exist).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CurrencyCode(String);

impl CurrencyCode {
    /// Parse a code from user input, normalizing to uppercase.
    ///
    /// Returns `None` unless the input is exactly three ASCII letters.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        if trimmed.len() == 3 && trimmed.chars().all(|c| c.is_ascii_alphabetic()) {
            Some(Self(trimmed.to_ascii_uppercase()))
        } else {
            None
        }
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_normalizes_case() {
        assert_eq!(CurrencyCode::parse("usd").unwrap().as_str(), "USD");
        assert_eq!(CurrencyCode::parse(" EUR ").unwrap().as_str(), "EUR");
    }

    #[test]
    fn parse_rejects_wrong_shape() {
        assert!(CurrencyCode::parse("US").is_none());
        assert!(CurrencyCode::parse("USDT").is_none());
        assert!(CurrencyCode::parse("U5D").is_none());
        assert!(CurrencyCode::parse("").is_none());
    }
}
