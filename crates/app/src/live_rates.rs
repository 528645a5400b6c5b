//! HTTP client for the live exchange-rate provider.
//!
//! The provider answers `GET <url>` with `{"rates": {"USD": 36.25, ...}}`.
//! Values may be JSON numbers or decimal strings.

use std::{collections::BTreeMap, str::FromStr, time::Duration};

use async_trait::async_trait;
use engine::{CurrencyCode, LiveRates, RateError, RateMap};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::settings::{Quote, Rates};

#[derive(Debug, Deserialize)]
struct RatesResponse {
    rates: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct HttpLiveRates {
    http: reqwest::Client,
    url: String,
    quote: Quote,
}

impl HttpLiveRates {
    pub fn new(settings: &Rates, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: settings.url.clone(),
            quote: settings.quote,
        })
    }
}

#[async_trait]
impl LiveRates for HttpLiveRates {
    async fn fetch_live_rates(&self) -> Result<RateMap, RateError> {
        let response = self
            .http
            .get(&self.url)
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(|err| RateError::Source(err.to_string()))?;

        let body = response
            .json::<RatesResponse>()
            .await
            .map_err(|err| RateError::Source(err.to_string()))?;

        Ok(convert(body.rates, self.quote))
    }
}

fn quote_value(value: &Value) -> Option<Decimal> {
    match value {
        Value::Number(number) => Decimal::from_str(&number.to_string())
            .or_else(|_| Decimal::from_scientific(&number.to_string()))
            .ok(),
        Value::String(raw) => Decimal::from_str(raw.trim()).ok(),
        _ => None,
    }
}

/// Adapts provider quotes to base units per one unit of each currency.
/// Unparsable codes and non-positive quotes are skipped. Inverted quotes keep
/// the full precision of `Decimal`, rounding happens only on money.
fn convert(quotes: BTreeMap<String, Value>, quote: Quote) -> RateMap {
    let mut rates = RateMap::default();
    for (code, value) in quotes {
        let Ok(currency) = CurrencyCode::try_from(code.as_str()) else {
            tracing::warn!("skipping live rate for invalid currency {code}");
            continue;
        };
        let Some(rate) = quote_value(&value).filter(|rate| rate.is_sign_positive() && !rate.is_zero())
        else {
            tracing::warn!("skipping invalid live rate for {currency}: {value}");
            continue;
        };
        let rate = match quote {
            Quote::BasePerUnit => rate,
            Quote::UnitsPerBase => Decimal::ONE / rate,
        };
        rates.insert(currency, rate);
    }
    rates
}
