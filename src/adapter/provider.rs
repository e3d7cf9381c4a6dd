//! HTTP rate provider adapter.
//!
//! Talks to an exchangerate-api style endpoint: `GET {api_url}/{BASE}`
//! returns `{"base": "USD", "rates": {"EUR": 0.9, ...}}`.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::domain::{CurrencyCode, RateTable};
use crate::error::RateError;
use crate::port::RateProvider;

#[derive(Debug, Deserialize)]
struct RatesPayload {
    rates: HashMap<String, f64>,
}

/// Rate provider backed by a REST endpoint.
pub struct HttpRateProvider {
    client: reqwest::Client,
    api_url: String,
}

impl HttpRateProvider {
    /// Create a provider with a bounded per-request timeout, so a slow
    /// upstream cannot stall stale interactions indefinitely.
    pub fn new(api_url: &str, timeout: std::time::Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl RateProvider for HttpRateProvider {
    async fn fetch(&self, base: &CurrencyCode) -> Result<RateTable, RateError> {
        let url = format!("{}/{base}", self.api_url);
        debug!(%url, "fetching rate table");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| RateError::Fetch(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RateError::Status(status.as_u16()));
        }

        let payload: RatesPayload = response
            .json()
            .await
            .map_err(|e| RateError::MalformedPayload(e.to_string()))?;

        let table: RateTable = payload
            .rates
            .into_iter()
            .filter_map(|(code, rate)| {
                // Drop entries the rest of the system could never use:
                // malformed codes and non-positive rates.
                let code = CurrencyCode::parse(&code)?;
                (rate > 0.0 && rate.is_finite()).then_some((code, rate))
            })
            .collect();

        if table.is_empty() {
            return Err(RateError::MalformedPayload("empty rate table".into()));
        }

        Ok(table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_deserializes() {
        let json = r#"{"base":"USD","date":"2026-08-23","rates":{"EUR":0.9,"RUB":90.0}}"#;
        let payload: RatesPayload = serde_json::from_str(json).unwrap();
        assert_eq!(payload.rates.len(), 2);
        assert_eq!(payload.rates["EUR"], 0.9);
    }
}
