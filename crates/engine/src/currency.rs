use std::fmt;

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// ISO-like currency code of an expense item or a rate entry.
///
/// Codes are three ASCII letters, stored uppercase. The engine does not keep
/// a closed list of currencies: any well-formed code is accepted and a code
/// without a rate converts 1:1 into the base currency.
///
/// # Examples
///
/// ```rust
/// use engine::CurrencyCode;
///
/// let usd = CurrencyCode::try_from(" usd ").unwrap();
/// assert_eq!(usd.as_str(), "USD");
/// assert!(CurrencyCode::try_from("DOLLARS").is_err());
/// assert_eq!(CurrencyCode::default(), CurrencyCode::base());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyCode([u8; 3]);

impl CurrencyCode {
    /// The base currency every settlement figure is expressed in.
    pub const BASE: CurrencyCode = CurrencyCode(*b"THB");

    #[must_use]
    pub const fn base() -> Self {
        Self::BASE
    }

    #[must_use]
    pub fn is_base(self) -> bool {
        self == Self::BASE
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        // Constructors only accept ASCII letters.
        std::str::from_utf8(&self.0).unwrap_or("THB")
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::BASE
    }
}

impl fmt::Display for CurrencyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for CurrencyCode {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let trimmed = value.trim();
        let bytes = trimmed.as_bytes();
        if bytes.len() != 3 || !bytes.iter().all(u8::is_ascii_alphabetic) {
            return Err(EngineError::InvalidCurrency(format!(
                "expected a 3-letter code, got \"{trimmed}\""
            )));
        }
        let mut code = [0u8; 3];
        for (dst, src) in code.iter_mut().zip(bytes) {
            *dst = src.to_ascii_uppercase();
        }
        Ok(Self(code))
    }
}

impl TryFrom<String> for CurrencyCode {
    type Error = EngineError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::try_from(value.as_str())
    }
}

impl From<CurrencyCode> for String {
    fn from(value: CurrencyCode) -> Self {
        value.as_str().to_string()
    }
}

/// Parse an optional currency, falling back to the base currency when the
/// caller omitted it.
pub fn currency_or_base(value: Option<&str>) -> Result<CurrencyCode, EngineError> {
    match value.map(str::trim).filter(|s| !s.is_empty()) {
        Some(code) => CurrencyCode::try_from(code),
        None => Ok(CurrencyCode::BASE),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_uppercases() {
        assert_eq!(CurrencyCode::try_from("jpy").unwrap().as_str(), "JPY");
        assert_eq!(CurrencyCode::try_from("THB").unwrap(), CurrencyCode::BASE);
    }

    #[test]
    fn rejects_malformed_codes() {
        assert!(CurrencyCode::try_from("").is_err());
        assert!(CurrencyCode::try_from("US").is_err());
        assert!(CurrencyCode::try_from("U5D").is_err());
    }

    #[test]
    fn missing_currency_defaults_to_base() {
        assert_eq!(currency_or_base(None).unwrap(), CurrencyCode::BASE);
        assert_eq!(currency_or_base(Some("  ")).unwrap(), CurrencyCode::BASE);
        assert_eq!(currency_or_base(Some("usd")).unwrap().as_str(), "USD");
    }

    #[test]
    fn serde_uses_plain_code() {
        let code = CurrencyCode::try_from("EUR").unwrap();
        assert_eq!(serde_json::to_string(&code).unwrap(), "\"EUR\"");
        let back: CurrencyCode = serde_json::from_str("\"eur\"").unwrap();
        assert_eq!(back, code);
    }
}
