//! Handles settings for the application. Configuration is read from an
//! optional `settings.toml` and from `SPESE_` environment variables
//! (`SPESE_SERVER__PORT=3000`).
//!
//! ```toml
//! [app]
//! level = "info"
//!
//! [server]
//! bind = "127.0.0.1"
//! port = 3000
//! database = { sqlite = "./spese.db" }
//!
//! [rates]
//! url = "https://rates.example/latest?base=THB"
//! timeout_ms = 3000
//! quote = "units_per_base"
//! ```
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

/// How the provider quotes each currency against the base.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quote {
    /// `USD: 36.25` means 1 USD = 36.25 THB.
    #[default]
    BasePerUnit,
    /// `USD: 0.0276` means 1 THB = 0.0276 USD.
    UnitsPerBase,
}

#[derive(Debug, Deserialize)]
pub struct Rates {
    pub url: String,
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub quote: Quote,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub app: App,
    pub server: Option<Server>,
    pub rates: Option<Rates>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let settings = Config::builder()
            .add_source(File::with_name("settings").required(false))
            .add_source(Environment::with_prefix("SPESE").separator("__"))
            .build()?;

        settings.try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use config::FileFormat;

    use super::*;

    fn parse(raw: &str) -> Settings {
        Config::builder()
            .add_source(File::from_str(raw, FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap()
    }

    #[test]
    fn full_settings() {
        let settings = parse(
            r#"
            [app]
            level = "debug"

            [server]
            port = 3000
            database = { sqlite = "./spese.db" }

            [rates]
            url = "http://localhost/rates"
            timeout_ms = 500
            quote = "units_per_base"
            "#,
        );

        assert_eq!(settings.app.level, "debug");
        let server = settings.server.unwrap();
        assert_eq!(server.port, 3000);
        assert!(server.bind.is_none());
        assert!(matches!(server.database, Database::Sqlite(path) if path == "./spese.db"));
        let rates = settings.rates.unwrap();
        assert_eq!(rates.timeout_ms, Some(500));
        assert_eq!(rates.quote, Quote::UnitsPerBase);
    }

    #[test]
    fn rates_are_optional() {
        let settings = parse(
            r#"
            [server]
            port = 8080
            database = "memory"
            "#,
        );

        assert_eq!(settings.app.level, "info");
        assert!(matches!(settings.server.unwrap().database, Database::Memory));
        assert!(settings.rates.is_none());
    }
}
