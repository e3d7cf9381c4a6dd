use thiserror::Error;

use crate::core::expr::ExprError;

/// Configuration-related errors with structured variants.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("missing required field: {field}")]
    MissingField { field: &'static str },

    #[error("invalid value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to read config file: {0}")]
    ReadFile(#[source] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[source] toml::de::Error),
}

/// Rate cache and provider errors.
///
/// Fetch failures are transient: callers keep serving the previously
/// cached table and retry on the next staleness check.
#[derive(Error, Debug)]
pub enum RateError {
    #[error("rate provider request failed: {0}")]
    Fetch(String),

    #[error("rate provider returned status {0}")]
    Status(u16),

    #[error("rate provider returned malformed payload: {0}")]
    MalformedPayload(String),

    #[error("unknown currency `{code}`")]
    UnknownCurrency { code: String },
}

/// User input errors, resolved locally by the conversation engine and
/// surfaced as a localized reply without touching session state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("could not parse `{input}`")]
    Malformed { input: String },

    #[error(transparent)]
    Expression(#[from] ExprError),
}

/// Persistence errors. Storage degradation is never fatal to an
/// interaction: conversions still complete even if a history append fails.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("serialization error: {0}")]
    Serialize(String),
}

/// Notification delivery failure. The alert evaluator retries the rule
/// on the next cycle; delivery errors never reach user-facing flows.
#[derive(Error, Debug)]
#[error("notification delivery failed: {0}")]
pub struct DeliveryError(pub String);

#[derive(Error, Debug)]
pub enum Error {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Rate(#[from] RateError),

    #[error(transparent)]
    Input(#[from] InputError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Delivery(#[from] DeliveryError),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
