//! Rate alert rules.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{CurrencyCode, UserId};

/// Storage-assigned alert rule identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AlertId(pub i64);

impl fmt::Display for AlertId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Threshold comparison direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Comparator {
    Above,
    Below,
}

impl Comparator {
    /// True when `rate` satisfies the comparison against `threshold`.
    #[must_use]
    pub fn matches(self, rate: f64, threshold: f64) -> bool {
        match self {
            Self::Above => rate > threshold,
            Self::Below => rate < threshold,
        }
    }

    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Self::Above => ">",
            Self::Below => "<",
        }
    }

    /// Parse the comparator symbol used in the `/alert` command.
    #[must_use]
    pub fn parse(input: &str) -> Option<Self> {
        match input {
            ">" => Some(Self::Above),
            "<" => Some(Self::Below),
            _ => None,
        }
    }
}

/// A persisted one-shot alert condition.
///
/// Evaluated every polling cycle and deleted once its condition is
/// observed true *and* the notification was delivered. Duplicate rules
/// for the same (user, currency, comparator, threshold) are allowed.
#[derive(Debug, Clone, PartialEq)]
pub struct AlertRule {
    pub id: AlertId,
    pub user_id: UserId,
    pub currency: CurrencyCode,
    pub comparator: Comparator,
    pub threshold: f64,
}

impl AlertRule {
    /// True when `rate` satisfies this rule's condition.
    #[must_use]
    pub fn is_satisfied_by(&self, rate: f64) -> bool {
        self.comparator.matches(rate, self.threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparator_matches() {
        assert!(Comparator::Above.matches(0.9, 0.8));
        assert!(!Comparator::Above.matches(0.8, 0.8));
        assert!(Comparator::Below.matches(0.7, 0.8));
        assert!(!Comparator::Below.matches(0.8, 0.8));
    }

    #[test]
    fn comparator_parse() {
        assert_eq!(Comparator::parse(">"), Some(Comparator::Above));
        assert_eq!(Comparator::parse("<"), Some(Comparator::Below));
        assert_eq!(Comparator::parse(">="), None);
    }
}
