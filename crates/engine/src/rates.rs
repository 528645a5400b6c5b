//! Exchange rates.
//!
//! A [`RateMap`] maps a currency to the number of **base units per one unit**
//! of that currency (`USD -> 36.25` means 1 USD = 36.25 THB). Expenses freeze
//! a rate map when they are created; every later conversion of that expense
//! reads the frozen snapshot so historical settlements never drift.
//!
//! [`RateResolver`] is the only component that decides which rates apply. It
//! never fails: when neither a snapshot nor the live source is usable it
//! returns `{THB: 1}` and reports [`RateOrigin::Fallback`].

use std::{collections::BTreeMap, str::FromStr, sync::Arc, time::Duration};

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{CurrencyCode, RateError};

/// Default bound for a live rate lookup.
pub const DEFAULT_RATE_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RateMap(BTreeMap<CurrencyCode, Decimal>);

impl RateMap {
    /// The identity map: only the base currency, at rate 1.
    #[must_use]
    pub fn base() -> Self {
        Self(BTreeMap::from([(CurrencyCode::BASE, Decimal::ONE)]))
    }

    /// Rate for `currency`, or 1 when the map has no entry for it.
    #[must_use]
    pub fn rate(&self, currency: CurrencyCode) -> Decimal {
        match self.0.get(&currency) {
            Some(rate) => *rate,
            None => {
                if !currency.is_base() {
                    tracing::debug!("no rate for {currency}, converting 1:1");
                }
                Decimal::ONE
            }
        }
    }

    #[must_use]
    pub fn get(&self, currency: CurrencyCode) -> Option<Decimal> {
        self.0.get(&currency).copied()
    }

    pub fn insert(&mut self, currency: CurrencyCode, rate: Decimal) {
        self.0.insert(currency, rate);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&CurrencyCode, &Decimal)> {
        self.0.iter()
    }

    /// Ensures the base currency is present at rate 1.
    #[must_use]
    pub fn with_base(mut self) -> Self {
        self.0.insert(CurrencyCode::BASE, Decimal::ONE);
        self
    }

    /// Parses a frozen snapshot stored as a JSON object.
    ///
    /// Values may be decimal strings (`"36.25"`) or JSON numbers; numbers are
    /// read through their textual form so no binary float is involved. Any
    /// malformed code or non-positive rate rejects the whole snapshot.
    pub fn parse_snapshot(raw: &str) -> Result<Self, RateError> {
        let object: serde_json::Map<String, serde_json::Value> = serde_json::from_str(raw)
            .map_err(|err| RateError::InvalidSnapshot(err.to_string()))?;

        let mut rates = BTreeMap::new();
        for (code, value) in object {
            let currency = CurrencyCode::try_from(code.as_str())
                .map_err(|err| RateError::InvalidSnapshot(err.to_string()))?;
            let rate = parse_rate(&value).ok_or_else(|| {
                RateError::InvalidSnapshot(format!("invalid rate for {currency}: {value}"))
            })?;
            rates.insert(currency, rate);
        }
        Ok(Self(rates))
    }

    /// Serializes the map in the snapshot format read by [`RateMap::parse_snapshot`].
    #[must_use]
    pub fn to_snapshot(&self) -> String {
        let object: serde_json::Map<String, serde_json::Value> = self
            .0
            .iter()
            .map(|(code, rate)| {
                (
                    code.to_string(),
                    serde_json::Value::String(rate.normalize().to_string()),
                )
            })
            .collect();
        serde_json::Value::Object(object).to_string()
    }
}

impl FromIterator<(CurrencyCode, Decimal)> for RateMap {
    fn from_iter<T: IntoIterator<Item = (CurrencyCode, Decimal)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Reads one rate value, accepting a decimal string or a JSON number.
pub(crate) fn parse_rate(value: &serde_json::Value) -> Option<Decimal> {
    let rate = match value {
        serde_json::Value::String(s) => Decimal::from_str(s.trim()).ok()?,
        serde_json::Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()?
        }
        _ => return None,
    };
    (rate > Decimal::ZERO).then_some(rate)
}

/// Where a resolved rate map came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateOrigin {
    /// The expense's frozen snapshot.
    Snapshot,
    /// A fresh lookup on the live source.
    Live,
    /// Neither was usable; every currency converts 1:1.
    Fallback,
}

impl RateOrigin {
    #[must_use]
    pub fn is_degraded(self) -> bool {
        matches!(self, Self::Fallback)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedRates {
    pub rates: RateMap,
    pub origin: RateOrigin,
}

impl ResolvedRates {
    fn fallback() -> Self {
        Self {
            rates: RateMap::base(),
            origin: RateOrigin::Fallback,
        }
    }
}

/// External source of current exchange rates.
///
/// Implementations must return rates in the engine's quoting convention
/// (base units per one unit of the currency).
#[async_trait]
pub trait LiveRates: Send + Sync {
    async fn fetch_live_rates(&self) -> Result<RateMap, RateError>;
}

/// A fixed rate table, useful as a configured source or in tests.
#[derive(Clone, Debug, Default)]
pub struct StaticRates(pub RateMap);

#[async_trait]
impl LiveRates for StaticRates {
    async fn fetch_live_rates(&self) -> Result<RateMap, RateError> {
        Ok(self.0.clone())
    }
}

#[derive(Clone)]
pub struct RateResolver {
    live: Option<Arc<dyn LiveRates>>,
    timeout: Duration,
}

impl std::fmt::Debug for RateResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateResolver")
            .field("live", &self.live.is_some())
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Default for RateResolver {
    fn default() -> Self {
        Self::new(None, DEFAULT_RATE_TIMEOUT)
    }
}

impl RateResolver {
    #[must_use]
    pub fn new(live: Option<Arc<dyn LiveRates>>, timeout: Duration) -> Self {
        Self { live, timeout }
    }

    /// Rates that apply to an expense.
    ///
    /// A non-empty, parsable snapshot is returned verbatim without touching
    /// the live source.
    pub async fn rates_for(&self, snapshot: Option<&str>) -> ResolvedRates {
        if let Some(raw) = snapshot.map(str::trim).filter(|s| !s.is_empty()) {
            match RateMap::parse_snapshot(raw) {
                Ok(rates) if !rates.is_empty() => {
                    return ResolvedRates {
                        rates,
                        origin: RateOrigin::Snapshot,
                    };
                }
                Ok(_) => tracing::warn!("empty rate snapshot, resolving live rates"),
                Err(err) => tracing::warn!("{err}, resolving live rates"),
            }
        }
        self.live_or_fallback().await
    }

    /// Captures the rates to freeze on a new expense.
    pub async fn lock_rates(&self) -> ResolvedRates {
        let mut resolved = self.live_or_fallback().await;
        resolved.rates = resolved.rates.with_base();
        resolved
    }

    /// Live rates for ad-hoc conversions, with the same fallback guarantee.
    pub async fn live_or_fallback(&self) -> ResolvedRates {
        let Some(live) = self.live.as_ref() else {
            tracing::warn!("no live rate source configured, using 1:1 rates");
            return ResolvedRates::fallback();
        };

        let fetched = match tokio::time::timeout(self.timeout, live.fetch_live_rates()).await {
            Ok(result) => result,
            Err(_) => Err(RateError::Timeout),
        };

        match fetched {
            Ok(rates) if !rates.is_empty() => ResolvedRates {
                rates,
                origin: RateOrigin::Live,
            },
            Ok(_) => {
                tracing::warn!("live rate source returned no rates, using 1:1 rates");
                ResolvedRates::fallback()
            }
            Err(err) => {
                tracing::warn!("{err}, using 1:1 rates");
                ResolvedRates::fallback()
            }
        }
    }
}
