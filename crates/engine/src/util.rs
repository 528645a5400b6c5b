//! Internal helpers for model validation and conversion.
//!
//! These utilities are **not** part of the public API. They centralize
//! parsing of stored values so every entity enforces the same invariants.

use std::str::FromStr;

use rust_decimal::Decimal;
use uuid::Uuid;

use crate::{CurrencyCode, EngineError, ResultEngine};

/// Parse a UUID from storage and return a labeled error on failure.
pub(crate) fn parse_uuid(value: &str, label: &str) -> ResultEngine<Uuid> {
    Uuid::parse_str(value).map_err(|_| EngineError::KeyNotFound(format!("{label} not exists")))
}

/// Parse a currency code stored in the DB.
pub(crate) fn model_currency(value: &str) -> ResultEngine<CurrencyCode> {
    CurrencyCode::try_from(value)
}

/// Parse a percent stored as decimal text.
pub(crate) fn model_percent(value: Option<&str>) -> ResultEngine<Option<Decimal>> {
    value
        .map(|raw| {
            Decimal::from_str(raw.trim())
                .map_err(|_| EngineError::InvalidShare(format!("invalid stored percent: {raw}")))
        })
        .transpose()
}

pub(crate) fn normalize_required_name(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidAmount(format!(
            "{label} name must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn normalize_optional_text(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
}
