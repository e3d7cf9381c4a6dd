//! Inbound/outbound message contract between the core and the transport.
//!
//! The core produces [`Reply`] values; the transport renders them as chat
//! messages with the appropriate keyboard markup. Inline buttons carry an
//! opaque [`CallbackData`] token the core parses back on the next
//! button-press event.

use crate::domain::CurrencyCode;

/// One outbound message.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub text: String,
    pub keyboard: Option<Keyboard>,
}

impl Reply {
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            keyboard: None,
        }
    }

    #[must_use]
    pub fn with_keyboard(text: impl Into<String>, keyboard: Keyboard) -> Self {
        Self {
            text: text.into(),
            keyboard: Some(keyboard),
        }
    }
}

/// Keyboard markup attached to a reply.
#[derive(Debug, Clone, PartialEq)]
pub enum Keyboard {
    /// Persistent menu buttons, rendered as rows of labels. Pressing one
    /// sends its label back as ordinary text.
    Reply(Vec<Vec<String>>),
    /// One-shot inline buttons attached to the message.
    Inline(Vec<Vec<InlineButton>>),
}

/// A single inline button.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineButton {
    pub label: String,
    pub data: CallbackData,
}

impl InlineButton {
    #[must_use]
    pub fn new(label: impl Into<String>, data: CallbackData) -> Self {
        Self {
            label: label.into(),
            data,
        }
    }
}

/// Typed callback token carried by inline buttons.
///
/// Encoded into the opaque string the chat platform echoes back on a
/// button press; `parse` is the inverse of `encode`.
#[derive(Debug, Clone, PartialEq)]
pub enum CallbackData {
    /// Re-run the last conversion in the opposite direction.
    Swap {
        amount: f64,
        from: CurrencyCode,
        to: CurrencyCode,
    },
    /// Restart the conversion flow from the amount prompt.
    ConvertAgain,
}

impl CallbackData {
    #[must_use]
    pub fn encode(&self) -> String {
        match self {
            Self::Swap { amount, from, to } => format!("swap:{amount}:{from}:{to}"),
            Self::ConvertAgain => "again".into(),
        }
    }

    /// Parse a callback token previously produced by [`encode`].
    ///
    /// Returns `None` for unrecognized or mangled tokens; the transport
    /// drops those silently.
    ///
    /// [`encode`]: Self::encode
    #[must_use]
    pub fn parse(token: &str) -> Option<Self> {
        if token == "again" {
            return Some(Self::ConvertAgain);
        }
        let rest = token.strip_prefix("swap:")?;
        let mut parts = rest.splitn(3, ':');
        let amount: f64 = parts.next()?.parse().ok()?;
        let from = CurrencyCode::parse(parts.next()?)?;
        let to = CurrencyCode::parse(parts.next()?)?;
        Some(Self::Swap { amount, from, to })
    }
}

/// One inline-query suggestion card.
#[derive(Debug, Clone, PartialEq)]
pub struct InlineSuggestion {
    /// Stable id within one answer batch.
    pub id: String,
    pub title: String,
    pub description: String,
    /// Text sent into the chat when the suggestion is picked.
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn code(s: &str) -> CurrencyCode {
        CurrencyCode::parse(s).unwrap()
    }

    #[test]
    fn callback_round_trip() {
        let swap = CallbackData::Swap {
            amount: 100.5,
            from: code("USD"),
            to: code("EUR"),
        };
        assert_eq!(CallbackData::parse(&swap.encode()), Some(swap));
        assert_eq!(
            CallbackData::parse(&CallbackData::ConvertAgain.encode()),
            Some(CallbackData::ConvertAgain)
        );
    }

    #[test]
    fn callback_encoding_is_stable() {
        let swap = CallbackData::Swap {
            amount: 100.0,
            from: code("USD"),
            to: code("EUR"),
        };
        assert_eq!(swap.encode(), "swap:100:USD:EUR");
    }

    #[test]
    fn parse_rejects_mangled_tokens() {
        assert_eq!(CallbackData::parse(""), None);
        assert_eq!(CallbackData::parse("swap:"), None);
        assert_eq!(CallbackData::parse("swap:abc:USD:EUR"), None);
        assert_eq!(CallbackData::parse("swap:10:US:EUR"), None);
        assert_eq!(CallbackData::parse("swap:10:USD"), None);
        assert_eq!(CallbackData::parse("other:1"), None);
    }
}
